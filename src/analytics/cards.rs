//! Metric card view models: latest score, trend and context per kind

use chrono::{DateTime, Utc};

use super::trend::{trend, Trend};
use crate::tracking::{EventKind, MoodReading, PainReading, Reading, SleepReading, TrackingData};

#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub kind: EventKind,
    pub title: &'static str,
    pub subtitle: &'static str,
    /// Latest primary score
    pub value: Option<u8>,
    pub trend: Trend,
    /// Labelled context lines of the latest reading
    pub details: Vec<(&'static str, String)>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Cards for pain, sleep and mood, in that order
pub fn metric_cards(data: &TrackingData) -> [MetricCard; 3] {
    [
        card::<PainReading>(data, "Pain Level", "Current assessment"),
        card::<SleepReading>(data, "Sleep Quality", "Last night's rest"),
        card::<MoodReading>(data, "Mood & Energy", "Current wellbeing"),
    ]
}

fn card<T: Reading + CardDetails>(
    data: &TrackingData,
    title: &'static str,
    subtitle: &'static str,
) -> MetricCard {
    let latest = data.latest::<T>();
    let previous = data.previous::<T>();
    let score = |a: &crate::tracking::Assessment<T>| f64::from(a.reading.score());

    MetricCard {
        kind: T::KIND,
        title,
        subtitle,
        value: latest.map(|a| a.reading.score()),
        trend: trend(latest.map(score), previous.map(score), T::KIND.inverted()),
        details: latest.map(|a| a.reading.details()).unwrap_or_default(),
        updated_at: latest.map(|a| a.timestamp),
    }
}

trait CardDetails {
    fn details(&self) -> Vec<(&'static str, String)>;
}

/// Free-text fields the agent sends as "" when the patient said nothing
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl CardDetails for PainReading {
    fn details(&self) -> Vec<(&'static str, String)> {
        let mut details = vec![
            ("Location", self.location.clone()),
            ("Quality", self.quality.clone()),
        ];
        if let Some(triggers) = non_empty(&self.triggers) {
            details.push(("Triggers", triggers.to_string()));
        }
        details
    }
}

impl CardDetails for SleepReading {
    fn details(&self) -> Vec<(&'static str, String)> {
        let mut details = vec![("Duration", format!("{}h", self.hours_slept))];
        if let Some(wake_ups) = self.wake_ups {
            details.push(("Wake-ups", wake_ups.to_string()));
        }
        if let Some(factors) = non_empty(&self.sleep_factors) {
            details.push(("Factors", factors.to_string()));
        }
        details
    }
}

impl CardDetails for MoodReading {
    fn details(&self) -> Vec<(&'static str, String)> {
        let mut details = vec![
            ("Energy", format!("{}/10", self.energy_level)),
            ("Activities", format!("{}/10", self.daily_activities_completion)),
            ("Social", format!("{}/10", self.social_engagement)),
        ];
        if let Some(coping) = non_empty(&self.emotional_coping) {
            details.push(("Coping", coping.to_string()));
        }
        details
    }
}
