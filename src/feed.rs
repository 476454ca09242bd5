//! Live updates feed
//!
//! Announces the latest event of each kind once. Entries are kept in
//! insertion order and the oldest is evicted when the buffer is full. The
//! "new" highlight only affects presentation.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::tracking::{EventKind, TrackingEvent};

pub const DEFAULT_FEED_CAPACITY: usize = 10;
pub const DEFAULT_HIGHLIGHT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct FeedEntry {
    /// `<kind>-<event id>`
    pub id: String,
    pub event: TrackingEvent,
    highlight_until: Instant,
}

impl FeedEntry {
    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.event.timestamp()
    }

    /// Whether the entry is still inside its highlight window
    pub fn is_new(&self, now: Instant) -> bool {
        now < self.highlight_until
    }

    pub fn title(&self) -> &'static str {
        match self.kind() {
            EventKind::PainAssessment => "Pain Assessment Recorded",
            EventKind::SleepQuality => "Sleep Quality Logged",
            EventKind::MoodAssessment => "Mood Assessment Updated",
        }
    }

    /// One-line description of the reading
    pub fn summary(&self) -> String {
        match &self.event {
            TrackingEvent::Pain(a) => {
                format!("Level {}/10 - {}", a.reading.pain_level, a.reading.location)
            }
            TrackingEvent::Sleep(a) => format!(
                "Quality {}/10 - {}h sleep",
                a.reading.sleep_quality, a.reading.hours_slept
            ),
            TrackingEvent::Mood(a) => format!(
                "Mood {}/10, Energy {}/10",
                a.reading.mood_rating, a.reading.energy_level
            ),
        }
    }

    /// Secondary lines shown under the summary
    pub fn details(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match &self.event {
            TrackingEvent::Pain(a) => {
                lines.push(a.reading.quality.clone());
                if let Some(triggers) = non_empty(&a.reading.triggers) {
                    lines.push(format!("Triggers: {}", triggers));
                }
            }
            TrackingEvent::Sleep(a) => {
                if let Some(wake_ups) = a.reading.wake_ups {
                    lines.push(format!("{} wake-ups", wake_ups));
                }
                if let Some(factors) = non_empty(&a.reading.sleep_factors) {
                    lines.push(format!("Factors: {}", factors));
                }
            }
            TrackingEvent::Mood(a) => {
                lines.push(format!(
                    "Activities: {}/10, Social: {}/10",
                    a.reading.daily_activities_completion, a.reading.social_engagement
                ));
                if let Some(coping) = non_empty(&a.reading.emotional_coping) {
                    lines.push(format!("Coping: {}", coping));
                }
            }
        }
        lines
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Bounded FIFO of announced events
#[derive(Debug)]
pub struct LiveFeed {
    entries: VecDeque<FeedEntry>,
    capacity: usize,
    highlight: Duration,
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY, DEFAULT_HIGHLIGHT)
    }
}

impl LiveFeed {
    pub fn new(capacity: usize, highlight: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            highlight,
        }
    }

    /// Announce every `latest` event not already in the buffer.
    ///
    /// Returns how many entries were added.
    pub fn observe<'a>(
        &mut self,
        latest: impl IntoIterator<Item = &'a TrackingEvent>,
        now: Instant,
    ) -> usize {
        let mut added = 0;
        for event in latest {
            if self.contains(event.kind(), event.id()) {
                continue;
            }
            self.entries.push_back(FeedEntry {
                id: format!("{}-{}", event.kind().short_name(), event.id()),
                event: event.clone(),
                highlight_until: now + self.highlight,
            });
            added += 1;
            while self.entries.len() > self.capacity {
                self.entries.pop_front();
            }
        }
        added
    }

    pub fn contains(&self, kind: EventKind, id: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.kind() == kind && e.event.id() == id)
    }

    /// Entries newest first
    pub fn entries(&self) -> impl Iterator<Item = &FeedEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry is still highlighted
    pub fn has_new(&self, now: Instant) -> bool {
        self.entries.iter().any(|e| e.is_new(now))
    }
}
