//! Terminal User Interface module
//!
//! Full-screen dashboard: metric cards, the trend chart and the live feed.

mod app;
mod theme;
mod widgets;

pub use app::{action_for, draw_dashboard, Action, App};
pub use theme::Theme;
pub use widgets::segments;
