//! Analytics module
//!
//! Pure view-model derivations over `TrackingData`: the per-day series, trend
//! comparison and metric cards. Nothing here holds state.

mod aggregator;
mod cards;
mod trend;

pub use aggregator::{build_series, build_series_at, DailyBucket, Window};
pub use cards::{metric_cards, MetricCard};
pub use trend::{trend, Trend, TrendDirection};
