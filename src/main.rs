use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyCode};
use tokio::sync::{mpsc, watch};

use realtime_chart::config::Config;
use realtime_chart::event::WidgetEvent;
use realtime_chart::host::FrameLatch;
use realtime_chart::model::snapshot::ConfigSnapshot;
use realtime_chart::presenter::ChartPresenter;
use realtime_chart::stream::WsTransport;
use realtime_chart::ui::{self, ChartView};
use realtime_chart::widget::ChartWidget;

type TerminalWidget = ChartWidget<WsTransport, FrameLatch>;

fn read_snapshot(path: &Path) -> Result<ConfigSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    ConfigSnapshot::from_json(&raw)
        .with_context(|| format!("invalid host snapshot in {}", path.display()))
}

/// Plays the host frame's re-render loop: re-pushes the snapshot file every
/// time it changes on disk.
async fn watch_snapshot(
    path: PathBuf,
    interval: Duration,
    event_tx: mpsc::Sender<WidgetEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut last_modified: Option<SystemTime> = None;
    loop {
        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
        if modified.is_some() && modified != last_modified {
            last_modified = modified;
            match read_snapshot(&path) {
                Ok(snapshot) => {
                    tracing::info!(
                        path = %path.display(),
                        stock_code = %snapshot.stock_code(),
                        "Host pushed configuration"
                    );
                    if event_tx.send(WidgetEvent::Configure(snapshot)).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = ?e, "Ignoring host snapshot"),
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => break,
        }
    }
}

fn instrument_label(widget: &TerminalWidget) -> String {
    match widget.current_config() {
        Some(cfg) if !cfg.stock_name().is_empty() => {
            format!("{} ({})", cfg.stock_name(), cfg.stock_code())
        }
        Some(cfg) => cfg.stock_code().to_string(),
        None => "not configured".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required by rustls 0.23+)
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure config/default.toml exists or set REALTIME_CHART_CONFIG");
            std::process::exit(1);
        }
    };

    // Init tracing (log to file so it doesn't interfere with TUI)
    let log_file = std::fs::File::create(&config.logging.file)
        .with_context(|| format!("failed to create {}", config.logging.file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.logging.level.as_str())
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    tracing::info!(
        snapshot = %config.host.snapshot_path.display(),
        "Starting realtime-chart"
    );

    let (event_tx, mut event_rx) = mpsc::channel::<WidgetEvent>(config.stream.event_buffer);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let transport = WsTransport::new(event_tx.clone(), config.stream.connect_timeout());
    let presenter = ChartPresenter::new(config.chart.clone());
    let mut widget: TerminalWidget =
        ChartWidget::with_presenter(transport, FrameLatch::new(), presenter);
    widget.mount();

    tokio::spawn(watch_snapshot(
        config.host.snapshot_path.clone(),
        Duration::from_millis(config.host.poll_interval_ms),
        event_tx.clone(),
        shutdown_rx.clone(),
    ));

    // Ctrl+C handler
    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_shutdown.send(true);
    });

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut widget, &mut event_rx, &shutdown_rx, &config);
    ratatui::restore();

    widget.teardown();
    let _ = shutdown_tx.send(true);
    // Let the connection task flush its close frame.
    tokio::time::sleep(Duration::from_millis(100)).await;
    result
}

fn run(
    terminal: &mut ratatui::DefaultTerminal,
    widget: &mut TerminalWidget,
    event_rx: &mut mpsc::Receiver<WidgetEvent>,
    shutdown_rx: &watch::Receiver<bool>,
    config: &Config,
) -> Result<()> {
    let mut last_update: Option<String> = None;

    loop {
        let ticks_before = widget.ticks_received();
        while let Ok(evt) = event_rx.try_recv() {
            widget.handle(evt);
        }
        if widget.ticks_received() != ticks_before {
            last_update = Some(chrono::Local::now().format("%H:%M:%S").to_string());
        }
        if *shutdown_rx.borrow() {
            return Ok(());
        }

        let instrument = instrument_label(widget);
        let view = ChartView {
            frame: widget.host().frame(),
            frame_height_px: widget.host().height(),
            px_per_row: config.ui.px_per_row,
            instrument: &instrument,
            connection: widget.connection_state(),
            tick_count: widget.ticks_received(),
            last_update: last_update.as_deref(),
        };
        terminal.draw(|frame| ui::render(frame, &view))?;

        if crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms))? {
            if let Event::Key(key) = crossterm::event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => {
                        tracing::info!("User quit");
                        return Ok(());
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        match read_snapshot(&config.host.snapshot_path) {
                            Ok(snapshot) => widget.apply(snapshot),
                            Err(e) => {
                                tracing::warn!(error = ?e, "Manual reload failed")
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}
