//! Dashboard state owner.
//!
//! The transport adapter delivers `SessionEvent`s over a channel; the single
//! consumer of that channel calls `Dashboard::handle`. User actions (demo
//! data, clear, window selection) go through the same owner, so the store
//! has exactly one writer.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::analytics::{build_series, metric_cards, DailyBucket, MetricCard, Window};
use crate::config::DashboardConfig;
use crate::feed::{FeedEntry, LiveFeed};
use crate::protocol::EventDecoder;
use crate::tracking::{demo, EventKind, SlotStorage, TrackingData, TrackingEvent, TrackingStore};
use crate::Result;

/// Signals from the real-time session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected,
    Disconnected,
    /// Raw data-channel payload
    Message(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub connection: ConnectionState,
    pub window: Window,
    pub cards: [MetricCard; 3],
    pub series: Vec<DailyBucket>,
    /// Total events per kind: pain, sleep, mood
    pub totals: [usize; 3],
    pub announcement: Option<&'static str>,
    /// Feed entries newest first, paired with their highlight flag
    pub feed: Vec<(FeedEntry, bool)>,
}

pub struct Dashboard {
    store: TrackingStore,
    decoder: EventDecoder,
    feed: LiveFeed,
    connection: ConnectionState,
    /// Payloads that arrived before the session reported connected
    pending: VecDeque<Vec<u8>>,
    pending_limit: usize,
    window: Window,
    highlight: Duration,
    announcement: Option<(&'static str, Instant)>,
}

impl Dashboard {
    /// Open the store described by `config` and restore its snapshot.
    pub async fn open(config: &DashboardConfig) -> Result<Self> {
        let slots = SlotStorage::open(&config.data_dir).await?;
        let store = TrackingStore::open(slots, config.storage_key.clone()).await;
        let mut feed = LiveFeed::new(config.feed_capacity, config.highlight());
        feed.observe(&store.data().latest_events(), Instant::now());

        Ok(Self {
            store,
            decoder: EventDecoder::new(),
            feed,
            connection: ConnectionState::Disconnected,
            pending: VecDeque::new(),
            pending_limit: config.pending_limit,
            window: config.default_window,
            highlight: config.highlight(),
            announcement: None,
        })
    }

    /// Apply one session signal. Returns the events it recorded.
    pub async fn handle(&mut self, event: SessionEvent) -> Vec<TrackingEvent> {
        match event {
            SessionEvent::Connected => {
                info!("Session connected");
                self.connection = ConnectionState::Connected;
                let mut recorded = Vec::new();
                while let Some(payload) = self.pending.pop_front() {
                    recorded.extend(self.ingest(&payload).await);
                }
                recorded
            }
            SessionEvent::Disconnected => {
                info!("Session disconnected");
                self.connection = ConnectionState::Disconnected;
                Vec::new()
            }
            SessionEvent::Message(payload) => {
                if self.connection == ConnectionState::Connected {
                    return self.ingest(&payload).await.into_iter().collect();
                }
                self.buffer(payload);
                Vec::new()
            }
        }
    }

    fn buffer(&mut self, payload: Vec<u8>) {
        if self.pending_limit == 0 {
            debug!("Dropping message received before session connected");
            return;
        }
        if self.pending.len() >= self.pending_limit {
            warn!("Pre-connect buffer full; dropping oldest message");
            self.pending.pop_front();
        }
        self.pending.push_back(payload);
    }

    async fn ingest(&mut self, payload: &[u8]) -> Option<TrackingEvent> {
        let mut event = self.decoder.decode_or_log(payload, Utc::now())?;
        ensure_unique_id(self.store.data(), &mut event);
        self.store.append(event.clone()).await;
        self.announce(event.kind());
        self.refresh_feed();
        Some(event)
    }

    /// Append the sample events.
    pub async fn add_demo_data(&mut self) {
        let events = demo::demo_events(Utc::now());
        info!("Adding {} demo events", events.len());
        self.store.extend(events).await;
        self.refresh_feed();
    }

    /// Drop all tracking data and the stored snapshot.
    pub async fn clear(&mut self) {
        self.store.clear().await;
        self.announcement = None;
    }

    pub fn set_window(&mut self, window: Window) {
        self.window = window;
    }

    pub fn cycle_window(&mut self) {
        self.window = self.window.next();
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn data(&self) -> &TrackingData {
        self.store.data()
    }

    pub fn feed(&self) -> &LiveFeed {
        &self.feed
    }

    /// Derive the view models for the current state.
    pub fn view(&self, now: Instant) -> DashboardView {
        let data = self.store.data();
        DashboardView {
            connection: self.connection,
            window: self.window,
            cards: metric_cards(data),
            series: build_series(data, self.window),
            totals: EventKind::ALL.map(|kind| data.len(kind)),
            announcement: self
                .announcement
                .filter(|(_, until)| now < *until)
                .map(|(text, _)| text),
            feed: self
                .feed
                .entries()
                .map(|entry| (entry.clone(), entry.is_new(now)))
                .collect(),
        }
    }

    fn announce(&mut self, kind: EventKind) {
        let text = match kind {
            EventKind::PainAssessment => "New pain assessment recorded",
            EventKind::SleepQuality => "Sleep quality logged",
            EventKind::MoodAssessment => "Mood assessment updated",
        };
        self.announcement = Some((text, Instant::now() + self.highlight));
    }

    fn refresh_feed(&mut self) {
        let latest = self.store.data().latest_events();
        self.feed.observe(&latest, Instant::now());
    }
}

/// Suffix the id until no event of the same kind already uses it.
///
/// Covers ids restored from a snapshot written by an earlier run.
fn ensure_unique_id(data: &TrackingData, event: &mut TrackingEvent) {
    if !data.contains_id(event.kind(), event.id()) {
        return;
    }
    let base = event.id().to_string();
    let mut n = 1;
    let mut candidate = format!("{}-{}", base, n);
    while data.contains_id(event.kind(), &candidate) {
        n += 1;
        candidate = format!("{}-{}", base, n);
    }
    debug!("Id {} already recorded; using {}", base, candidate);
    event.set_id(candidate);
}
