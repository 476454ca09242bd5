//! Healthdash CLI
//!
//! Live health tracking dashboard fed by a voice-therapy session.

use clap::Parser;
use healthdash::report::{feed_line, render_summary};
use healthdash::transport::{serve_tcp, spawn_stdin};
use healthdash::tui::App;
use healthdash::{Dashboard, DashboardConfig, SessionEvent, TrackingEvent, Window};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Healthdash - live pain, sleep and mood dashboard
#[derive(Parser, Debug)]
#[command(name = "healthdash")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the tracking snapshot and log file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Path to the config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chart window shown at startup (7d, 30d or 90d)
    #[arg(long)]
    window: Option<Window>,

    /// Address to accept session connections on
    #[arg(long)]
    listen: Option<String>,

    /// Disable TUI and read session messages from stdin
    #[arg(long)]
    no_tui: bool,

    /// Add demo data before starting
    #[arg(long)]
    demo: bool,

    /// Clear all tracking data before starting
    #[arg(long)]
    clear: bool,

    /// Verbose output: debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if cli.no_tui {
        init_logging(cli.verbose, None)?;
        run_plain_mode(cli, config).await
    } else {
        std::fs::create_dir_all(&config.data_dir)?;
        init_logging(cli.verbose, Some(&config.log_file()))?;
        run_tui_mode(cli, config).await
    }
}

/// Config file first, then command line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<DashboardConfig> {
    let mut config = match cli.config.clone().or_else(DashboardConfig::default_path) {
        Some(path) => DashboardConfig::load(&path)?,
        None => DashboardConfig::default(),
    };

    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir.clone());
    }
    if let Some(window) = cli.window {
        config = config.with_window(window);
    }
    if let Some(addr) = &cli.listen {
        config = config.with_listen_addr(addr.clone());
    }
    Ok(config)
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }
    Ok(())
}

/// Apply the one-shot `--clear` / `--demo` actions
async fn prepare(cli: &Cli, dashboard: &mut Dashboard) {
    if cli.clear {
        dashboard.clear().await;
    }
    if cli.demo {
        dashboard.add_demo_data().await;
    }
}

async fn run_tui_mode(cli: Cli, config: DashboardConfig) -> anyhow::Result<()> {
    info!("Starting Healthdash (TUI mode)");
    let mut dashboard = Dashboard::open(&config).await?;
    prepare(&cli, &mut dashboard).await;

    let (events_tx, events_rx) = mpsc::channel::<SessionEvent>(64);

    // Run the transport in background
    let listen_addr = config.listen_addr.clone();
    let transport_handle = tokio::spawn(async move {
        if let Err(e) = serve_tcp(&listen_addr, events_tx).await {
            error!("Session listener failed: {}", e);
        }
    });

    // Run TUI (this blocks until quit)
    let mut app = App::new(dashboard, events_rx, config.listen_addr.clone())?;
    let result = app.run().await;

    transport_handle.abort();
    result.map_err(Into::into)
}

async fn run_plain_mode(cli: Cli, config: DashboardConfig) -> anyhow::Result<()> {
    info!("Starting Healthdash (plain mode)");
    info!("Data directory: {:?}", config.data_dir);

    let mut dashboard = Dashboard::open(&config).await?;
    prepare(&cli, &mut dashboard).await;

    let (events_tx, mut events_rx) = mpsc::channel::<SessionEvent>(64);
    let stdin_handle = spawn_stdin(events_tx);

    while let Some(event) = events_rx.recv().await {
        for recorded in dashboard.handle(event).await {
            echo_event(&dashboard, &recorded);
        }
    }
    let _ = stdin_handle.await;

    print!("{}", render_summary(&dashboard.view(Instant::now())));
    Ok(())
}

fn echo_event(dashboard: &Dashboard, event: &TrackingEvent) {
    let entry = dashboard
        .feed()
        .entries()
        .find(|e| e.kind() == event.kind() && e.event.id() == event.id());
    match entry {
        Some(entry) => println!("{}", feed_line(entry)),
        None => println!("Recorded {} {}", event.kind(), event.id()),
    }
}
