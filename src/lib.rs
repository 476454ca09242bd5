//! Healthdash - live health tracking dashboard
//!
//! Listens to a voice-therapy session and turns its structured messages into:
//! - Pain, sleep and mood records persisted across restarts
//! - Per-day averages over 7/30/90 day windows
//! - Trend signals and a deduplicated feed of recent updates

pub mod analytics;
pub mod config;
pub mod feed;
pub mod protocol;
pub mod report;
pub mod session;
pub mod tracking;
pub mod transport;
pub mod tui;

pub use analytics::{build_series, metric_cards, trend, DailyBucket, MetricCard, Trend, TrendDirection, Window};
pub use config::DashboardConfig;
pub use feed::{FeedEntry, LiveFeed};
pub use protocol::{DecodeError, EventDecoder};
pub use session::{ConnectionState, Dashboard, DashboardView, SessionEvent};
pub use tracking::{EventKind, TrackingData, TrackingEvent, TrackingStore};

/// Result type for Healthdash operations
pub type Result<T> = std::result::Result<T, HealthdashError>;

/// Errors that can occur in Healthdash
#[derive(Debug, thiserror::Error)]
pub enum HealthdashError {
    #[error("Failed to read tracking snapshot: {0}")]
    PersistenceRead(String),

    #[error("Failed to write tracking snapshot: {0}")]
    PersistenceWrite(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
