//! Tracking module
//!
//! Assessment data model, the persisted tracking store and demo data.

pub mod demo;
mod store;
mod types;

pub use store::{SlotStorage, TrackingStore};
pub use types::{
    Assessment, EventKind, MoodAssessment, MoodReading, PainAssessment, PainReading, Reading,
    SleepQuality, SleepReading, TrackingData, TrackingEvent,
};
