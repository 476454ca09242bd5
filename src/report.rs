//! Plain-text rendering of the dashboard, used when no terminal UI runs.

use std::fmt::Write;

use chrono::Local;

use crate::analytics::MetricCard;
use crate::feed::FeedEntry;
use crate::session::{ConnectionState, DashboardView};
use crate::tracking::EventKind;

/// Format a score for display, `--` when absent
pub fn format_score(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "--".to_string(),
    }
}

/// One line describing a feed entry
pub fn feed_line(entry: &FeedEntry) -> String {
    format!(
        "[{}] {}: {}",
        entry.timestamp().with_timezone(&Local).format("%H:%M:%S"),
        entry.title(),
        entry.summary()
    )
}

fn card_block(out: &mut String, card: &MetricCard) {
    let value = card
        .value
        .map(|v| format!("{}/10", v))
        .unwrap_or_else(|| "--".to_string());
    let _ = writeln!(out, "{} ({}): {}  {}", card.title, card.subtitle, value, card.trend.text());
    for (label, text) in &card.details {
        let _ = writeln!(out, "    {}: {}", label, text);
    }
}

/// Render the whole view as a multi-line text report.
pub fn render_summary(view: &DashboardView) -> String {
    let mut out = String::new();
    let connection = match view.connection {
        ConnectionState::Connected => "connected",
        ConnectionState::Disconnected => "disconnected",
    };
    let _ = writeln!(out, "Health dashboard (session {})", connection);
    let _ = writeln!(out);

    for card in &view.cards {
        card_block(&mut out, card);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Trends - last {}", view.window.label());
    let _ = writeln!(out, "{:<8} {:>6} {:>6} {:>6}", "Day", "Pain", "Sleep", "Mood");
    for bucket in view.series.iter().filter(|b| !b.is_empty()) {
        let _ = writeln!(
            out,
            "{:<8} {:>6} {:>6} {:>6}",
            bucket.label(),
            format_score(bucket.pain),
            format_score(bucket.sleep),
            format_score(bucket.mood)
        );
    }
    let [pain, sleep, mood] = view.totals;
    let _ = writeln!(
        out,
        "Recorded: {} {}, {} {}, {} {}",
        pain,
        EventKind::PainAssessment.short_name(),
        sleep,
        EventKind::SleepQuality.short_name(),
        mood,
        EventKind::MoodAssessment.short_name()
    );

    if !view.feed.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Live updates");
        for (entry, _) in &view.feed {
            let _ = writeln!(out, "  {}", feed_line(entry));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::session::Dashboard;
    use std::time::Instant;
    use tempfile::TempDir;

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(6.5)), "6.5");
        assert_eq!(format_score(Some(0.0)), "0.0");
        assert_eq!(format_score(None), "--");
    }

    #[tokio::test]
    async fn test_empty_summary() {
        let dir = TempDir::new().unwrap();
        let config = DashboardConfig::default().with_data_dir(dir.path().to_path_buf());
        let dash = Dashboard::open(&config).await.unwrap();
        let text = render_summary(&dash.view(Instant::now()));

        assert!(text.contains("session disconnected"));
        assert!(text.contains("Pain Level (Current assessment): --  No trend"));
        assert!(text.contains("Recorded: 0 pain, 0 sleep, 0 mood"));
        assert!(!text.contains("Live updates"));
    }

    #[tokio::test]
    async fn test_summary_with_demo_data() {
        let dir = TempDir::new().unwrap();
        let config = DashboardConfig::default().with_data_dir(dir.path().to_path_buf());
        let mut dash = Dashboard::open(&config).await.unwrap();
        dash.add_demo_data().await;
        let text = render_summary(&dash.view(Instant::now()));

        assert!(text.contains("Pain Level (Current assessment): 4/10  ↑2 better"));
        assert!(text.contains("    Location: neck"));
        assert!(text.contains("Recorded: 2 pain, 2 sleep, 2 mood"));
        assert!(text.contains("Pain Assessment Recorded: Level 4/10 - neck"));
    }
}
