//! Integration tests for Healthdash

use chrono::{NaiveDate, TimeZone, Utc};
use healthdash::analytics::build_series_at;
use healthdash::tracking::SlotStorage;
use healthdash::transport::pump_lines;
use healthdash::{
    trend, ConnectionState, Dashboard, DashboardConfig, EventDecoder, EventKind, LiveFeed,
    SessionEvent, TrackingData, TrackingStore, TrendDirection, Window,
};
use pretty_assertions::assert_eq;
use std::time::Instant;
use tempfile::TempDir;
use tokio::sync::mpsc;

const PAIN: &str = r#"{"type":"pain_assessment","data":{"painLevel":6,"location":"lower back","quality":"dull aching","triggers":"sitting","copingStrategies":"heat"}}"#;
const SLEEP: &str = r#"{"type":"sleep_quality","data":{"sleepQuality":7,"hoursSlept":7.5,"sleepOnsetMinutes":20,"wakeUps":2,"sleepFactors":""}}"#;
const MOOD: &str = r#"{"type":"mood_assessment","data":{"moodRating":6,"energyLevel":5,"dailyActivitiesCompletion":7,"socialEngagement":4,"emotionalCoping":"walks"}}"#;

fn config(dir: &TempDir) -> DashboardConfig {
    DashboardConfig::default().with_data_dir(dir.path().to_path_buf())
}

fn lengths(data: &TrackingData) -> [usize; 3] {
    EventKind::ALL.map(|kind| data.len(kind))
}

/// Each valid message grows only its own sequence
#[tokio::test]
async fn test_append_grows_matching_sequence_only() {
    let temp_dir = TempDir::new().unwrap();
    let slots = SlotStorage::open(temp_dir.path()).await.unwrap();
    let mut store = TrackingStore::open(slots, "therapist-tracking-data").await;
    let mut decoder = EventDecoder::new();
    let now = Utc::now();

    let cases = [(PAIN, [1, 0, 0]), (SLEEP, [1, 1, 0]), (MOOD, [1, 1, 1]), (PAIN, [2, 1, 1])];
    for (i, (payload, expected)) in cases.into_iter().enumerate() {
        let event = decoder
            .decode(payload.as_bytes(), now + chrono::Duration::milliseconds(i as i64))
            .unwrap()
            .unwrap();
        store.append(event).await;
        assert_eq!(lengths(store.data()), expected);
    }
}

/// Malformed payloads never change state
#[tokio::test]
async fn test_malformed_payloads_leave_state_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let mut dash = Dashboard::open(&config(&temp_dir)).await.unwrap();
    dash.handle(SessionEvent::Connected).await;
    dash.handle(SessionEvent::Message(MOOD.as_bytes().to_vec())).await;
    let before = dash.data().clone();

    let bad: Vec<Vec<u8>> = vec![
        vec![0xff, 0xfe, 0x7b],
        b"{\"type\":\"pain_assessment\",\"data\":{\"painLevel\":".to_vec(),
        b"not json".to_vec(),
        b"{\"type\":\"weather\",\"data\":{}}".to_vec(),
        b"{\"type\":\"pain_assessment\",\"data\":{\"painLevel\":11,\"location\":\"x\",\"quality\":\"y\"}}"
            .to_vec(),
        b"{\"type\":\"sleep_quality\"}".to_vec(),
    ];
    for payload in bad {
        assert!(dash.handle(SessionEvent::Message(payload)).await.is_empty());
    }
    assert_eq!(dash.data(), &before);
}

/// Window lengths, anchoring and averaging
#[tokio::test]
async fn test_series_buckets() {
    let mut decoder = EventDecoder::new();
    let mut data = TrackingData::default();
    let day = Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap();
    for (level, offset) in [(4, 0), (6, 3)] {
        let payload = format!(
            r#"{{"type":"pain_assessment","data":{{"painLevel":{},"location":"knee","quality":"sharp"}}}}"#,
            level
        );
        let event = decoder
            .decode(payload.as_bytes(), day + chrono::Duration::hours(offset))
            .unwrap()
            .unwrap();
        data.push(event);
    }

    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let week = build_series_at(&data, Window::Week, today, &Utc);
    let month = build_series_at(&data, Window::Month, today, &Utc);
    assert_eq!(week.len(), 7);
    assert_eq!(month.len(), 30);
    assert_eq!(week.last().unwrap().date, today);
    assert_eq!(month.last().unwrap().date, today);

    let oct15 = week
        .iter()
        .find(|b| b.date == NaiveDate::from_ymd_opt(2026, 10, 15).unwrap())
        .unwrap();
    assert_eq!(oct15.pain, Some(5.0));
    assert_eq!(oct15.pain_count, 2);
    assert_eq!(oct15.sleep, None);
    assert_eq!(week.last().unwrap().pain, None);
}

#[test]
fn test_trend_directions() {
    assert_eq!(trend(Some(6.0), Some(4.0), true).direction, TrendDirection::Worsening);
    assert_eq!(trend(Some(6.0), Some(4.0), false).direction, TrendDirection::Improving);
    assert_eq!(trend(Some(5.0), Some(5.0), false).direction, TrendDirection::Unchanged);
    assert_eq!(trend(None, Some(5.0), false).direction, TrendDirection::NoTrend);
}

/// Feed dedup and capacity over many observations
#[tokio::test]
async fn test_feed_dedup_and_capacity() {
    let mut decoder = EventDecoder::new();
    let mut feed = LiveFeed::default();
    let now = Utc::now();

    let first = decoder.decode(PAIN.as_bytes(), now).unwrap().unwrap();
    feed.observe([&first], Instant::now());
    feed.observe([&first], Instant::now());
    assert_eq!(feed.len(), 1);

    for i in 1..=25 {
        let event = decoder
            .decode(SLEEP.as_bytes(), now + chrono::Duration::seconds(i))
            .unwrap()
            .unwrap();
        feed.observe([&event], Instant::now());
        assert!(feed.len() <= 10);
    }
    assert_eq!(feed.len(), 10);
    // The pain entry was the oldest and is gone
    assert!(!feed.contains(EventKind::PainAssessment, first.id()));
}

/// save then load reproduces the data, timestamps to the millisecond
#[tokio::test]
async fn test_snapshot_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let slots = SlotStorage::open(temp_dir.path()).await.unwrap();
    let mut store = TrackingStore::open(slots.clone(), "therapist-tracking-data").await;
    let mut decoder = EventDecoder::new();
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 15).unwrap()
        + chrono::Duration::milliseconds(123);

    for (i, payload) in [PAIN, SLEEP, MOOD].iter().enumerate() {
        let event = decoder
            .decode(payload.as_bytes(), now + chrono::Duration::milliseconds(i as i64))
            .unwrap()
            .unwrap();
        store.append(event).await;
    }
    store.save().await.unwrap();

    let reopened = TrackingStore::open(slots, "therapist-tracking-data").await;
    assert_eq!(reopened.data(), store.data());
    assert_eq!(reopened.load().await.unwrap(), *store.data());
    assert_eq!(
        reopened.data().pain_assessments[0].timestamp.timestamp_millis(),
        now.timestamp_millis()
    );

    // Stored under camelCase keys
    let raw = std::fs::read_to_string(temp_dir.path().join("therapist-tracking-data.json")).unwrap();
    assert!(raw.contains("\"painAssessments\""));
    assert!(raw.contains("\"hoursSlept\":7.5"));
}

#[tokio::test]
async fn test_clear_then_load_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let mut dash = Dashboard::open(&config(&temp_dir)).await.unwrap();
    dash.add_demo_data().await;
    dash.clear().await;

    let slots = SlotStorage::open(temp_dir.path()).await.unwrap();
    let store = TrackingStore::open(slots, "therapist-tracking-data").await;
    assert_eq!(store.load().await.unwrap(), TrackingData::default());
}

/// Corrupt snapshot: the dashboard starts empty and stays usable
#[tokio::test]
async fn test_corrupt_snapshot_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("therapist-tracking-data.json"), "{oops").unwrap();

    let mut dash = Dashboard::open(&config(&temp_dir)).await.unwrap();
    assert!(dash.data().is_empty());
    dash.handle(SessionEvent::Connected).await;
    dash.handle(SessionEvent::Message(PAIN.as_bytes().to_vec())).await;
    assert_eq!(lengths(dash.data()), [1, 0, 0]);
}

/// A full session through the line transport into the dashboard
#[tokio::test]
async fn test_transport_to_dashboard() {
    let temp_dir = TempDir::new().unwrap();
    let mut dash = Dashboard::open(&config(&temp_dir)).await.unwrap();

    let input = format!("{}\n{}\n\nbroken\n{}\n", PAIN, SLEEP, MOOD);
    let (tx, mut rx) = mpsc::channel(16);
    let forwarded = pump_lines(input.as_bytes(), &tx).await.unwrap();
    drop(tx);
    assert_eq!(forwarded, 4);

    let mut recorded = 0;
    while let Some(event) = rx.recv().await {
        recorded += dash.handle(event).await.len();
    }
    assert_eq!(recorded, 3);
    assert_eq!(dash.connection(), ConnectionState::Disconnected);

    let view = dash.view(Instant::now());
    assert_eq!(view.totals, [1, 1, 1]);
    assert_eq!(view.feed.len(), 3);
    assert_eq!(view.cards[1].value, Some(7));
    // Empty free text is kept in storage but not shown
    assert_eq!(dash.data().sleep_quality[0].reading.sleep_factors.as_deref(), Some(""));
    assert!(view.cards[1].details.iter().all(|(label, _)| *label != "Factors"));

    // Restart: data survives, feed is rebuilt from the latest events
    let reopened = Dashboard::open(&config(&temp_dir)).await.unwrap();
    assert_eq!(lengths(reopened.data()), [1, 1, 1]);
    assert_eq!(reopened.feed().len(), 3);
}
