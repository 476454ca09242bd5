//! Inbound message protocol for the voice session data channel
//!
//! Each message is a UTF-8 JSON envelope:
//! `{ "type": "pain_assessment" | "sleep_quality" | "mood_assessment", "data": { ... } }`
//! The agent never sends ids or timestamps; both are assigned on arrival.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::tracking::{
    Assessment, EventKind, MoodReading, PainReading, Reading, SleepReading, TrackingEvent,
};

/// Message type tags
pub mod message_types {
    pub const PAIN_ASSESSMENT: &str = "pain_assessment";
    pub const SLEEP_QUALITY: &str = "sleep_quality";
    pub const MOOD_ASSESSMENT: &str = "mood_assessment";
}

/// Highest valid score on every 0-10 scale
pub const MAX_SCORE: u8 = 10;

/// Raw message envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Why an inbound message was dropped
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("payload is not a message envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("{kind} message carries no data")]
    MissingData { kind: EventKind },

    #[error("invalid {kind} data: {source}")]
    Payload {
        kind: EventKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: String },
}

/// Turns raw payloads into typed tracking events.
///
/// Ids are `<type>-<arrival millis>`. A message arriving at or before the
/// newest millisecond already used (a burst, or the clock stepping back) gets
/// `<type>-<newest millis>-<n>` so ids stay unique.
#[derive(Debug, Default)]
pub struct EventDecoder {
    /// Highest arrival millisecond used for an id so far
    last_millis: Option<i64>,
    burst: u32,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one payload received at `now`.
    ///
    /// Returns `Ok(None)` for envelopes with an unrecognized type.
    pub fn decode(
        &mut self,
        payload: &[u8],
        now: DateTime<Utc>,
    ) -> Result<Option<TrackingEvent>, DecodeError> {
        let text = std::str::from_utf8(payload)?;
        let envelope: Envelope =
            serde_json::from_str(text.trim()).map_err(DecodeError::Envelope)?;

        let kind = match envelope.kind.parse::<EventKind>() {
            Ok(kind) => kind,
            Err(_) => {
                debug!("Ignoring message with unknown type {:?}", envelope.kind);
                return Ok(None);
            }
        };

        let data = envelope
            .data
            .filter(|d| !d.is_null())
            .ok_or(DecodeError::MissingData { kind })?;

        let event = match kind {
            EventKind::PainAssessment => {
                let reading: PainReading = parse_reading(data)?;
                reading.validate()?;
                TrackingEvent::Pain(self.stamp(reading, now))
            }
            EventKind::SleepQuality => {
                let reading: SleepReading = parse_reading(data)?;
                reading.validate()?;
                TrackingEvent::Sleep(self.stamp(reading, now))
            }
            EventKind::MoodAssessment => {
                let reading: MoodReading = parse_reading(data)?;
                reading.validate()?;
                TrackingEvent::Mood(self.stamp(reading, now))
            }
        };
        Ok(Some(event))
    }

    /// Decode, logging and dropping anything malformed.
    pub fn decode_or_log(&mut self, payload: &[u8], now: DateTime<Utc>) -> Option<TrackingEvent> {
        match self.decode(payload, now) {
            Ok(event) => event,
            Err(e) => {
                warn!("Dropping inbound message: {}", e);
                None
            }
        }
    }

    fn stamp<T: Reading>(&mut self, reading: T, now: DateTime<Utc>) -> Assessment<T> {
        let millis = now.timestamp_millis();
        let timestamp = DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or(now);

        let id = match self.last_millis {
            Some(last) if millis <= last => {
                self.burst += 1;
                format!("{}-{}-{}", T::KIND, last, self.burst)
            }
            _ => {
                self.last_millis = Some(millis);
                self.burst = 0;
                format!("{}-{}", T::KIND, millis)
            }
        };

        Assessment {
            id,
            timestamp,
            reading,
        }
    }
}

fn parse_reading<T: Reading + DeserializeOwned>(data: Value) -> Result<T, DecodeError> {
    serde_json::from_value(data).map_err(|source| DecodeError::Payload {
        kind: T::KIND,
        source,
    })
}

trait Validate {
    fn validate(&self) -> Result<(), DecodeError>;
}

fn check_score(field: &'static str, value: u8) -> Result<(), DecodeError> {
    if value > MAX_SCORE {
        return Err(DecodeError::OutOfRange {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

impl Validate for PainReading {
    fn validate(&self) -> Result<(), DecodeError> {
        check_score("painLevel", self.pain_level)
    }
}

impl Validate for SleepReading {
    fn validate(&self) -> Result<(), DecodeError> {
        check_score("sleepQuality", self.sleep_quality)?;
        if !self.hours_slept.is_finite() || self.hours_slept < 0.0 {
            return Err(DecodeError::OutOfRange {
                field: "hoursSlept",
                value: self.hours_slept.to_string(),
            });
        }
        Ok(())
    }
}

impl Validate for MoodReading {
    fn validate(&self) -> Result<(), DecodeError> {
        check_score("moodRating", self.mood_rating)?;
        check_score("energyLevel", self.energy_level)?;
        check_score("dailyActivitiesCompletion", self.daily_activities_completion)?;
        check_score("socialEngagement", self.social_engagement)
    }
}
