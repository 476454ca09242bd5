//! Custom widgets for the TUI

use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;
use crate::analytics::{DailyBucket, MetricCard, Window};
use crate::feed::FeedEntry;
use crate::session::ConnectionState;
use crate::tracking::EventKind;

fn kind_label(kind: EventKind) -> &'static str {
    match kind {
        EventKind::PainAssessment => "Pain",
        EventKind::SleepQuality => "Sleep",
        EventKind::MoodAssessment => "Mood",
    }
}

/// Header bar with title, window tabs and connection state
pub struct HeaderBar {
    pub window: Window,
    pub connection: ConnectionState,
}

impl Widget for HeaderBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let mut spans = vec![
            Span::styled("◆ ", Theme::accent()),
            Span::styled("Health Dashboard", Theme::title()),
            Span::raw("   "),
        ];
        for window in Window::ALL {
            let style = if window == self.window {
                Theme::selected_tab()
            } else {
                Theme::muted()
            };
            spans.push(Span::styled(format!(" {} ", window.label()), style));
            spans.push(Span::raw(" "));
        }
        buf.set_line(area.x + 1, area.y, &Line::from(spans), area.width.saturating_sub(2));

        let (dot, text, style) = match self.connection {
            ConnectionState::Connected => ("● ", "Live", Theme::success()),
            ConnectionState::Disconnected => ("○ ", "Offline", Theme::muted()),
        };
        let width = (dot.width() + text.width()) as u16;
        let x = area.x + area.width.saturating_sub(width + 1);
        let line = Line::from(vec![Span::styled(dot, style), Span::styled(text, style)]);
        buf.set_line(x, area.y, &line, width);
    }
}

/// Status bar: the current announcement, or where the session is expected
pub struct StatusBar<'a> {
    pub announcement: Option<&'a str>,
    pub connection: ConnectionState,
    pub listen_addr: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = match (self.announcement, self.connection) {
            (Some(text), _) => Line::from(vec![
                Span::styled("★ ", Theme::new_badge()),
                Span::styled(text, Theme::bold()),
            ]),
            (None, ConnectionState::Connected) => Line::from(vec![
                Span::styled("● ", Theme::success()),
                Span::styled("Session active - waiting for assessments", Theme::muted()),
            ]),
            (None, ConnectionState::Disconnected) => Line::from(vec![
                Span::styled("○ ", Theme::muted()),
                Span::styled(
                    format!("Waiting for a session on {}", self.listen_addr),
                    Theme::muted(),
                ),
            ]),
        };
        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));
    }
}

/// One metric card: latest score, trend and context of a kind
pub struct MetricCardWidget<'a> {
    pub card: &'a MetricCard,
    /// A new event of this kind was just recorded
    pub highlighted: bool,
}

impl Widget for MetricCardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let card = self.card;
        let kind_style = Theme::kind(card.kind);
        let border = if self.highlighted {
            kind_style.add_modifier(Modifier::BOLD)
        } else {
            Theme::border()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(
                format!(" {} ", card.title),
                kind_style.add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        block.render(area, buf);

        let value = match card.value {
            Some(v) => format!("{}/10", v),
            None => "--".to_string(),
        };
        let mut lines = vec![
            Line::from(Span::styled(card.subtitle, Theme::muted())),
            Line::from(vec![
                Span::styled(value, kind_style.add_modifier(Modifier::BOLD)),
                Span::raw("  "),
                Span::styled(card.trend.text(), Theme::trend(card.trend.direction)),
            ]),
        ];
        for (label, text) in &card.details {
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", label), Theme::muted()),
                Span::styled(text.clone(), Theme::text()),
            ]));
        }
        if let Some(updated) = card.updated_at {
            let local = updated.with_timezone(&Local);
            lines.push(Line::from(Span::styled(
                format!("Updated {}", local.format("%b %d %H:%M")),
                Theme::muted(),
            )));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

/// Split a kind's daily averages into contiguous runs of days with data.
///
/// Points are `(bucket index, average)`. Days without data end a run so the
/// chart shows a gap instead of bridging it.
pub fn segments(series: &[DailyBucket], kind: EventKind) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, bucket) in series.iter().enumerate() {
        match bucket.average(kind) {
            Some(avg) => current.push((i as f64, avg)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// First, middle and last day labels
fn axis_labels(series: &[DailyBucket]) -> Vec<String> {
    match series {
        [] => Vec::new(),
        [only] => vec![only.label()],
        _ => vec![
            series[0].label(),
            series[series.len() / 2].label(),
            series[series.len() - 1].label(),
        ],
    }
}

/// Line chart of the daily averages over the selected window
pub struct TrendChart<'a> {
    pub series: &'a [DailyBucket],
    pub window: Window,
    /// Total events per kind: pain, sleep, mood
    pub totals: [usize; 3],
}

impl Widget for TrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(
                format!(" Trends - Last {} ", self.window.label()),
                Theme::title(),
            ));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height < 2 || inner.width < 10 {
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let mut summary = Vec::new();
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            if i > 0 {
                summary.push(Span::styled(" │ ", Theme::muted()));
            }
            summary.push(Span::styled(
                format!("{}: {}", kind_label(*kind), self.totals[i]),
                Theme::kind(*kind),
            ));
        }
        summary.push(Span::styled(" recorded", Theme::muted()));
        buf.set_line(chunks[1].x, chunks[1].y, &Line::from(summary), chunks[1].width);

        if self.series.iter().all(DailyBucket::is_empty) {
            let empty = Paragraph::new(vec![
                Line::from(Span::styled("No data in this window yet", Theme::muted())),
                Line::from(Span::styled("Press d to add demo data", Theme::muted())),
            ]);
            empty.render(chunks[0], buf);
            return;
        }

        let runs: Vec<(EventKind, Vec<Vec<(f64, f64)>>)> = EventKind::ALL
            .iter()
            .map(|kind| (*kind, segments(self.series, *kind)))
            .collect();

        let mut datasets = Vec::new();
        for (kind, kind_runs) in &runs {
            for (i, run) in kind_runs.iter().enumerate() {
                let mut line = Dataset::default()
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Theme::kind(*kind))
                    .data(run);
                // One legend entry per kind
                if i == 0 {
                    line = line.name(kind_label(*kind));
                }
                datasets.push(line);
                datasets.push(
                    Dataset::default()
                        .marker(Marker::Dot)
                        .graph_type(GraphType::Scatter)
                        .style(Theme::kind(*kind))
                        .data(run),
                );
            }
        }

        let max_x = self.series.len().saturating_sub(1).max(1) as f64;
        let chart = Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .style(Theme::muted())
                    .bounds([0.0, max_x])
                    .labels(axis_labels(self.series)),
            )
            .y_axis(
                Axis::default()
                    .style(Theme::muted())
                    .bounds([0.0, 10.0])
                    .labels(["0", "5", "10"]),
            );
        chart.render(chunks[0], buf);
    }
}

/// Recent updates, newest first
pub struct FeedPanel<'a> {
    pub items: &'a [(FeedEntry, bool)],
}

impl Widget for FeedPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(" Live Updates ", Theme::title()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.items.is_empty() {
            Paragraph::new(Span::styled("Waiting for session updates...", Theme::muted()))
                .render(inner, buf);
            return;
        }

        let mut lines = Vec::new();
        for (entry, is_new) in self.items {
            let time = entry.timestamp().with_timezone(&Local).format("%H:%M:%S");
            let mut header = vec![
                Span::styled("● ", Theme::kind(entry.kind())),
                Span::styled(entry.title(), Theme::bold()),
                Span::styled(format!(" {}", time), Theme::muted()),
            ];
            if *is_new {
                header.push(Span::raw(" "));
                header.push(Span::styled(" NEW ", Theme::new_badge()));
            }
            lines.push(Line::from(header));
            lines.push(Line::from(Span::styled(
                format!("  {}", entry.summary()),
                Theme::text(),
            )));
            for detail in entry.details() {
                lines.push(Line::from(Span::styled(format!("  {}", detail), Theme::muted())));
            }
            lines.push(Line::from(""));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

/// Help bar showing key bindings
pub struct HelpBar;

impl Widget for HelpBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bindings = [
            ("1/2/3", "Window"),
            ("Tab", "Next window"),
            ("d", "Demo data"),
            ("c", "Clear"),
            ("q", "Quit"),
        ];

        let mut spans = vec![Span::raw(" ")];
        for (i, (key, desc)) in bindings.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", Theme::muted()));
            }
            spans.push(Span::styled(*key, Theme::key()));
            spans.push(Span::styled(format!(" {}", desc), Theme::key_desc()));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
