// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use laglens_core::geo::GeometryStore;
use laglens_core::{HostRegistry, LatencyHistory, MapRasterizer};
use parking_lot::RwLock;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::watch;

use laglens_tui::config::{Overrides, Settings};
use laglens_tui::export::{default_export_path, export_statistics};
use laglens_tui::monitor::Coordinator;
use laglens_tui::probe::TcpProber;
use laglens_tui::ui::{self, Theme};
use laglens_tui::{events, logging, App};

#[derive(Parser, Debug)]
#[command(name = "laglens")]
#[command(about = "Live network latency monitor with an ASCII world map")]
struct Args {
    /// Settings file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Time between probe rounds (e.g., "5s", "1m")
    #[arg(short, long)]
    interval: Option<String>,

    /// Per-probe timeout, must be shorter than the interval (e.g., "4s", "800ms")
    #[arg(short, long)]
    timeout: Option<String>,

    /// TCP port to connect to on each host
    #[arg(short, long)]
    port: Option<u16>,

    /// Land GeoJSON to draw instead of the bundled map
    #[arg(long)]
    geojson: Option<PathBuf>,

    /// Log file (the terminal is reserved for the dashboard)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level filter, overridden by RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Run one probe round, export statistics to JSON and exit
    #[arg(short, long, num_args = 0..=1, value_name = "PATH")]
    export: Option<Option<PathBuf>>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        probe_interval: args.interval,
        probe_timeout: args.timeout,
        probe_port: args.port,
        geojson: args.geojson,
        log_file: args.log_file,
        log_level: args.log_level,
    };
    let settings = Settings::load(args.config.as_deref(), &overrides)?;

    if let Some(warning) = logging::init(&settings.log_file, &settings.log_level) {
        eprintln!("{}", warning);
    }
    tracing::info!(
        hosts = settings.hosts.len(),
        interval = ?settings.probe_interval,
        timeout = ?settings.probe_timeout,
        port = settings.probe_port,
        "starting laglens"
    );

    let store = match settings.geojson.as_ref() {
        Some(path) => GeometryStore::load(path)
            .with_context(|| format!("Failed to load land geometry from {}", path.display()))?,
        None => GeometryStore::bundled().context("Failed to load bundled land geometry")?,
    };
    tracing::info!(polygons = store.len(), "land geometry loaded");
    let map = Arc::new(MapRasterizer::new(store));

    let registry = HostRegistry::from_hosts(settings.hosts.clone());
    let history = Arc::new(LatencyHistory::new());
    for host in registry.list() {
        history.ensure_host(&host.name);
    }
    let registry = Arc::new(RwLock::new(registry));

    let coordinator = Arc::new(Coordinator::new(
        registry.clone(),
        history.clone(),
        Arc::new(TcpProber::new(settings.probe_port)),
        settings.monitor(),
    )?);

    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        let export_path = export_path.unwrap_or_else(|| default_export_path(SystemTime::now()));
        let report = rt.block_on(coordinator.run_round());
        export_statistics(&export_path, &registry.read(), &history, settings.stats_window)?;
        println!(
            "Probed {} hosts ({} failed), statistics written to: {}",
            report.results.len(),
            report.failures(),
            export_path.display()
        );
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = {
        let _guard = rt.enter();
        coordinator.spawn(shutdown_rx)
    };

    let app = App::new(registry, history, map, &settings)
        .with_reports(handle.reports)
        .with_theme(Theme::auto_detect());

    let result = run_tui(app);

    // Signal shutdown
    let _ = shutdown_tx.send(true);
    rt.shutdown_timeout(Duration::from_secs(1));
    tracing::info!("laglens exited");

    result
}

/// Run the dashboard until the user quits
fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    events::handle_mouse_event(app, mouse, ui::CONTENT_START_ROW);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Pick up a completed round, if any
        let _ = app.reload_data();
    }

    Ok(())
}
