//! Per-day time series over a trailing window of calendar days

use chrono::{Duration, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::tracking::{Assessment, EventKind, MoodReading, PainReading, Reading, SleepReading, TrackingData};

/// Trailing window of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Window {
    #[default]
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl Window {
    pub const ALL: [Window; 3] = [Window::Week, Window::Month, Window::Quarter];

    pub fn days(&self) -> usize {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Week => "7 Days",
            Self::Month => "30 Days",
            Self::Quarter => "90 Days",
        }
    }

    /// The next window, wrapping around
    pub fn next(&self) -> Self {
        match self {
            Self::Week => Self::Month,
            Self::Month => Self::Quarter,
            Self::Quarter => Self::Week,
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days())
    }
}

impl FromStr for Window {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" | "7" => Ok(Self::Week),
            "30d" | "30" => Ok(Self::Month),
            "90d" | "90" => Ok(Self::Quarter),
            other => Err(format!("unknown window '{}', expected 7d, 30d or 90d", other)),
        }
    }
}

/// One calendar day of aggregated scores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    /// Average score, None when the day has no events of that kind
    pub pain: Option<f64>,
    pub sleep: Option<f64>,
    pub mood: Option<f64>,
    pub pain_count: usize,
    pub sleep_count: usize,
    pub mood_count: usize,
}

impl DailyBucket {
    /// Short axis label, e.g. `10/19`
    pub fn label(&self) -> String {
        self.date.format("%m/%d").to_string()
    }

    /// Long label, e.g. `Oct 19, 2026`
    pub fn full_label(&self) -> String {
        self.date.format("%b %d, %Y").to_string()
    }

    pub fn average(&self, kind: EventKind) -> Option<f64> {
        match kind {
            EventKind::PainAssessment => self.pain,
            EventKind::SleepQuality => self.sleep,
            EventKind::MoodAssessment => self.mood,
        }
    }

    pub fn count(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::PainAssessment => self.pain_count,
            EventKind::SleepQuality => self.sleep_count,
            EventKind::MoodAssessment => self.mood_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pain_count + self.sleep_count + self.mood_count == 0
    }
}

/// Build the series for `window` ending today in the local timezone.
pub fn build_series(data: &TrackingData, window: Window) -> Vec<DailyBucket> {
    build_series_at(data, window, Local::now().date_naive(), &Local)
}

/// Build exactly `window.days()` buckets, oldest first, the last one being
/// `today`. Events are assigned to calendar days in `tz`.
pub fn build_series_at<Tz: TimeZone>(
    data: &TrackingData,
    window: Window,
    today: NaiveDate,
    tz: &Tz,
) -> Vec<DailyBucket> {
    let days = window.days();
    let first = today - Duration::days(days as i64 - 1);

    let pain = tally::<PainReading, Tz>(data, first, days, tz);
    let sleep = tally::<SleepReading, Tz>(data, first, days, tz);
    let mood = tally::<MoodReading, Tz>(data, first, days, tz);

    (0..days)
        .map(|i| DailyBucket {
            date: first + Duration::days(i as i64),
            pain: pain[i].average(),
            sleep: sleep[i].average(),
            mood: mood[i].average(),
            pain_count: pain[i].count,
            sleep_count: sleep[i].count,
            mood_count: mood[i].count,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
struct DayTotal {
    sum: u32,
    count: usize,
}

impl DayTotal {
    fn average(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(round_one_decimal(f64::from(self.sum) / self.count as f64))
    }
}

fn tally<T: Reading, Tz: TimeZone>(
    data: &TrackingData,
    first: NaiveDate,
    days: usize,
    tz: &Tz,
) -> Vec<DayTotal> {
    let mut totals = vec![DayTotal::default(); days];
    for event in data.sequence::<T>() {
        if let Some(total) = day_offset(event, first, tz).and_then(|i| totals.get_mut(i)) {
            total.sum += u32::from(event.reading.score());
            total.count += 1;
        }
    }
    totals
}

fn day_offset<T, Tz: TimeZone>(event: &Assessment<T>, first: NaiveDate, tz: &Tz) -> Option<usize> {
    let day = event.timestamp.with_timezone(tz).date_naive();
    usize::try_from(day.signed_duration_since(first).num_days()).ok()
}

/// Round to one decimal place, halves away from zero
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
