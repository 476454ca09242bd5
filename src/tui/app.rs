//! Main TUI application

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info};

use super::widgets::{FeedPanel, HeaderBar, HelpBar, MetricCardWidget, StatusBar, TrendChart};
use crate::analytics::Window;
use crate::session::{Dashboard, DashboardView, SessionEvent};

/// What a key press asks the dashboard to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SetWindow(Window),
    CycleWindow,
    AddDemoData,
    Clear,
}

/// Map a key press to an action.
pub fn action_for(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('1') => Some(Action::SetWindow(Window::Week)),
        KeyCode::Char('2') => Some(Action::SetWindow(Window::Month)),
        KeyCode::Char('3') => Some(Action::SetWindow(Window::Quarter)),
        KeyCode::Tab => Some(Action::CycleWindow),
        KeyCode::Char('d') => Some(Action::AddDemoData),
        KeyCode::Char('c') => Some(Action::Clear),
        _ => None,
    }
}

/// Lay out and render one frame of the dashboard.
pub fn draw_dashboard(f: &mut Frame, view: &DashboardView, listen_addr: &str) {
    let size = f.area();

    // Main layout: header, status, cards, charts, help
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(1), // Status
            Constraint::Length(9), // Cards
            Constraint::Min(8),    // Chart and feed
            Constraint::Length(1), // Help
        ])
        .split(size);

    f.render_widget(
        HeaderBar {
            window: view.window,
            connection: view.connection,
        },
        main_chunks[0],
    );
    f.render_widget(
        StatusBar {
            announcement: view.announcement,
            connection: view.connection,
            listen_addr,
        },
        main_chunks[1],
    );

    let card_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(main_chunks[2]);
    for (card, area) in view.cards.iter().zip(card_chunks.iter()) {
        let highlighted = view
            .feed
            .iter()
            .any(|(entry, is_new)| *is_new && entry.kind() == card.kind);
        f.render_widget(MetricCardWidget { card, highlighted }, *area);
    }

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(main_chunks[3]);
    f.render_widget(
        TrendChart {
            series: &view.series,
            window: view.window,
            totals: view.totals,
        },
        content_chunks[0],
    );
    f.render_widget(FeedPanel { items: &view.feed }, content_chunks[1]);

    f.render_widget(HelpBar, main_chunks[4]);
}

/// Main application state
pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    dashboard: Dashboard,
    events_rx: mpsc::Receiver<SessionEvent>,
    listen_addr: String,
    should_quit: bool,
}

impl App {
    /// Take over the terminal.
    pub fn new(
        dashboard: Dashboard,
        events_rx: mpsc::Receiver<SessionEvent>,
        listen_addr: impl Into<String>,
    ) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            dashboard,
            events_rx,
            listen_addr: listen_addr.into(),
            should_quit: false,
        })
    }

    /// Run the main event loop
    pub async fn run(&mut self) -> io::Result<()> {
        // Short poll timeout so session messages show up promptly
        let poll_timeout = Duration::from_millis(50);

        while !self.should_quit {
            self.check_session().await;

            let view = self.dashboard.view(Instant::now());
            let listen_addr = self.listen_addr.as_str();
            self.terminal
                .draw(|f| draw_dashboard(f, &view, listen_addr))?;

            if event::poll(poll_timeout)? {
                if let Event::Key(key) = event::read()? {
                    if let Some(action) = action_for(key) {
                        self.perform(action).await;
                    }
                }
            }
        }

        info!("Dashboard closed");
        Ok(())
    }

    /// Apply every session event queued since the last frame
    async fn check_session(&mut self) {
        loop {
            match self.events_rx.try_recv() {
                Ok(event) => {
                    self.dashboard.handle(event).await;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("Session transport closed");
                    break;
                }
            }
        }
    }

    async fn perform(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::SetWindow(window) => self.dashboard.set_window(window),
            Action::CycleWindow => self.dashboard.cycle_window(),
            Action::AddDemoData => self.dashboard.add_demo_data().await,
            Action::Clear => self.dashboard.clear().await,
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}
