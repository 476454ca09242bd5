//! Assessment records and the three ordered sequences that own them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::protocol::message_types;

/// Kind tag carried by every inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PainAssessment,
    SleepQuality,
    MoodAssessment,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [
        EventKind::PainAssessment,
        EventKind::SleepQuality,
        EventKind::MoodAssessment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PainAssessment => message_types::PAIN_ASSESSMENT,
            Self::SleepQuality => message_types::SLEEP_QUALITY,
            Self::MoodAssessment => message_types::MOOD_ASSESSMENT,
        }
    }

    /// Short name used in ids and chart legends
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::PainAssessment => "pain",
            Self::SleepQuality => "sleep",
            Self::MoodAssessment => "mood",
        }
    }

    /// Lower is better for pain; higher is better for the rest
    pub fn inverted(&self) -> bool {
        matches!(self, Self::PainAssessment)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            message_types::PAIN_ASSESSMENT => Ok(Self::PainAssessment),
            message_types::SLEEP_QUALITY => Ok(Self::SleepQuality),
            message_types::MOOD_ASSESSMENT => Ok(Self::MoodAssessment),
            other => Err(format!("unknown event type: {}", other)),
        }
    }
}

/// Kind-specific payload of an assessment
pub trait Reading: Sized {
    const KIND: EventKind;

    /// The 0-10 score charted and compared for trends
    fn score(&self) -> u8;

    /// The sequence of this kind inside a `TrackingData`
    fn sequence(data: &TrackingData) -> &[Assessment<Self>];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainReading {
    pub pain_level: u8,
    pub location: String,
    pub quality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coping_strategies: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepReading {
    pub sleep_quality: u8,
    pub hours_slept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_onset_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wake_ups: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_factors: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodReading {
    pub mood_rating: u8,
    pub energy_level: u8,
    pub daily_activities_completion: u8,
    pub social_engagement: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_coping: Option<String>,
}

impl Reading for PainReading {
    const KIND: EventKind = EventKind::PainAssessment;

    fn score(&self) -> u8 {
        self.pain_level
    }

    fn sequence(data: &TrackingData) -> &[Assessment<Self>] {
        &data.pain_assessments
    }
}

impl Reading for SleepReading {
    const KIND: EventKind = EventKind::SleepQuality;

    fn score(&self) -> u8 {
        self.sleep_quality
    }

    fn sequence(data: &TrackingData) -> &[Assessment<Self>] {
        &data.sleep_quality
    }
}

impl Reading for MoodReading {
    const KIND: EventKind = EventKind::MoodAssessment;

    fn score(&self) -> u8 {
        self.mood_rating
    }

    fn sequence(data: &TrackingData) -> &[Assessment<Self>] {
        &data.mood_assessments
    }
}

/// One recorded assessment: identity and arrival time plus the reading.
///
/// On disk the reading fields sit next to `id` and `timestamp` in a single
/// flat object, with the timestamp as an ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment<T> {
    pub id: String,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub reading: T,
}

pub type PainAssessment = Assessment<PainReading>;
pub type SleepQuality = Assessment<SleepReading>;
pub type MoodAssessment = Assessment<MoodReading>;

/// A decoded event tagged with its kind
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingEvent {
    Pain(PainAssessment),
    Sleep(SleepQuality),
    Mood(MoodAssessment),
}

impl TrackingEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Pain(_) => EventKind::PainAssessment,
            Self::Sleep(_) => EventKind::SleepQuality,
            Self::Mood(_) => EventKind::MoodAssessment,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Pain(a) => &a.id,
            Self::Sleep(a) => &a.id,
            Self::Mood(a) => &a.id,
        }
    }

    /// Replace the id, keeping everything else
    pub fn set_id(&mut self, id: String) {
        match self {
            Self::Pain(a) => a.id = id,
            Self::Sleep(a) => a.id = id,
            Self::Mood(a) => a.id = id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Pain(a) => a.timestamp,
            Self::Sleep(a) => a.timestamp,
            Self::Mood(a) => a.timestamp,
        }
    }

    pub fn score(&self) -> u8 {
        match self {
            Self::Pain(a) => a.reading.score(),
            Self::Sleep(a) => a.reading.score(),
            Self::Mood(a) => a.reading.score(),
        }
    }
}

/// The three assessment sequences, each in arrival order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingData {
    #[serde(default)]
    pub pain_assessments: Vec<PainAssessment>,
    #[serde(default)]
    pub sleep_quality: Vec<SleepQuality>,
    #[serde(default)]
    pub mood_assessments: Vec<MoodAssessment>,
}

impl TrackingData {
    /// Append an event at the tail of its kind's sequence
    pub fn push(&mut self, event: TrackingEvent) {
        match event {
            TrackingEvent::Pain(a) => self.pain_assessments.push(a),
            TrackingEvent::Sleep(a) => self.sleep_quality.push(a),
            TrackingEvent::Mood(a) => self.mood_assessments.push(a),
        }
    }

    pub fn sequence<T: Reading>(&self) -> &[Assessment<T>] {
        T::sequence(self)
    }

    pub fn latest<T: Reading>(&self) -> Option<&Assessment<T>> {
        self.sequence::<T>().last()
    }

    /// The entry before the latest one
    pub fn previous<T: Reading>(&self) -> Option<&Assessment<T>> {
        let seq = self.sequence::<T>();
        seq.len().checked_sub(2).map(|i| &seq[i])
    }

    pub fn len(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::PainAssessment => self.pain_assessments.len(),
            EventKind::SleepQuality => self.sleep_quality.len(),
            EventKind::MoodAssessment => self.mood_assessments.len(),
        }
    }

    pub fn total_len(&self) -> usize {
        EventKind::ALL.iter().map(|k| self.len(*k)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    pub fn contains_id(&self, kind: EventKind, id: &str) -> bool {
        match kind {
            EventKind::PainAssessment => self.pain_assessments.iter().any(|a| a.id == id),
            EventKind::SleepQuality => self.sleep_quality.iter().any(|a| a.id == id),
            EventKind::MoodAssessment => self.mood_assessments.iter().any(|a| a.id == id),
        }
    }

    /// The most recent event of each kind that has one (pain, sleep, mood order)
    pub fn latest_events(&self) -> Vec<TrackingEvent> {
        let mut events = Vec::with_capacity(3);
        if let Some(a) = self.latest::<PainReading>() {
            events.push(TrackingEvent::Pain(a.clone()));
        }
        if let Some(a) = self.latest::<SleepReading>() {
            events.push(TrackingEvent::Sleep(a.clone()));
        }
        if let Some(a) = self.latest::<MoodReading>() {
            events.push(TrackingEvent::Mood(a.clone()));
        }
        events
    }
}

/// ISO-8601 timestamps with millisecond precision
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pain(id: &str, level: u8) -> PainAssessment {
        Assessment {
            id: id.to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
            reading: PainReading {
                pain_level: level,
                location: "neck".to_string(),
                quality: "sharp".to_string(),
                triggers: None,
                coping_strategies: Some("stretching".to_string()),
            },
        }
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
        assert!("weather_report".parse::<EventKind>().is_err());
        assert!(EventKind::PainAssessment.inverted());
        assert!(!EventKind::MoodAssessment.inverted());
    }

    #[test]
    fn test_push_routes_by_kind() {
        let mut data = TrackingData::default();
        data.push(TrackingEvent::Pain(pain("p1", 4)));
        assert_eq!(data.len(EventKind::PainAssessment), 1);
        assert_eq!(data.len(EventKind::SleepQuality), 0);
        assert_eq!(data.len(EventKind::MoodAssessment), 0);
        assert!(data.contains_id(EventKind::PainAssessment, "p1"));
        assert!(!data.contains_id(EventKind::MoodAssessment, "p1"));
    }

    #[test]
    fn test_latest_and_previous() {
        let mut data = TrackingData::default();
        assert!(data.latest::<PainReading>().is_none());
        data.push(TrackingEvent::Pain(pain("p1", 4)));
        assert!(data.previous::<PainReading>().is_none());
        data.push(TrackingEvent::Pain(pain("p2", 6)));
        assert_eq!(data.latest::<PainReading>().unwrap().id, "p2");
        assert_eq!(data.previous::<PainReading>().unwrap().id, "p1");
        assert_eq!(data.latest_events().len(), 1);
    }

    #[test]
    fn test_disk_shape_is_flat_camel_case() {
        let json = serde_json::to_value(pain("p1", 4)).unwrap();
        assert_eq!(json["id"], "p1");
        assert_eq!(json["painLevel"], 4);
        assert_eq!(json["copingStrategies"], "stretching");
        assert_eq!(json["timestamp"], "2026-10-18T09:30:00.000Z");
        assert!(json.get("triggers").is_none());
    }

    #[test]
    fn test_snapshot_with_missing_sequences_loads() {
        let data: TrackingData = serde_json::from_str(
            r#"{"sleepQuality":[{"id":"s1","timestamp":"2026-10-18T07:00:00.000Z","sleepQuality":7,"hoursSlept":8}]}"#,
        )
        .unwrap();
        assert!(data.pain_assessments.is_empty());
        assert_eq!(data.sleep_quality[0].reading.hours_slept, 8.0);
        assert_eq!(data.sleep_quality[0].reading.wake_ups, None);
    }
}
