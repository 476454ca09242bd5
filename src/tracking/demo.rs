//! Sample assessments for trying the dashboard without a live session

use chrono::{DateTime, Duration, Utc};

use super::types::{Assessment, MoodReading, PainReading, SleepReading, TrackingEvent};

/// Two events per kind, stamped 24h and 12h before `now`.
pub fn demo_events(now: DateTime<Utc>) -> Vec<TrackingEvent> {
    let millis = now.timestamp_millis();
    let day_ago = now - Duration::hours(24);
    let half_day_ago = now - Duration::hours(12);
    let id = |kind: &str, n: u8| format!("demo-{}-{}-{}", kind, millis, n);

    vec![
        TrackingEvent::Pain(Assessment {
            id: id("pain", 1),
            timestamp: day_ago,
            reading: PainReading {
                pain_level: 6,
                location: "lower back".to_string(),
                quality: "dull aching".to_string(),
                triggers: Some("sitting too long".to_string()),
                coping_strategies: Some("heat therapy".to_string()),
            },
        }),
        TrackingEvent::Pain(Assessment {
            id: id("pain", 2),
            timestamp: half_day_ago,
            reading: PainReading {
                pain_level: 4,
                location: "neck".to_string(),
                quality: "sharp".to_string(),
                triggers: Some("stress".to_string()),
                coping_strategies: Some("breathing exercises".to_string()),
            },
        }),
        TrackingEvent::Sleep(Assessment {
            id: id("sleep", 1),
            timestamp: day_ago,
            reading: SleepReading {
                sleep_quality: 6,
                hours_slept: 7.5,
                sleep_onset_minutes: Some(30),
                wake_ups: Some(2),
                sleep_factors: Some("pain flare".to_string()),
            },
        }),
        TrackingEvent::Sleep(Assessment {
            id: id("sleep", 2),
            timestamp: half_day_ago,
            reading: SleepReading {
                sleep_quality: 8,
                hours_slept: 8.0,
                sleep_onset_minutes: Some(15),
                wake_ups: Some(1),
                sleep_factors: Some("good sleep hygiene".to_string()),
            },
        }),
        TrackingEvent::Mood(Assessment {
            id: id("mood", 1),
            timestamp: day_ago,
            reading: MoodReading {
                mood_rating: 5,
                energy_level: 4,
                daily_activities_completion: 6,
                social_engagement: 3,
                emotional_coping: Some("journaling".to_string()),
            },
        }),
        TrackingEvent::Mood(Assessment {
            id: id("mood", 2),
            timestamp: half_day_ago,
            reading: MoodReading {
                mood_rating: 7,
                energy_level: 6,
                daily_activities_completion: 8,
                social_engagement: 7,
                emotional_coping: Some("mindfulness".to_string()),
            },
        }),
    ]
}
