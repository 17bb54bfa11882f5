mod announce;
mod app;
mod components;
mod config;
mod error;
mod event;
mod handler;
mod navigation;
mod preview;
mod reorder;
mod staging;
mod submit;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::config::AppConfig;
use crate::event::{Event, EventHandler};
use crate::tui::{install_panic_hook, Tui};

/// Stage, preview, reorder and submit file attachments from the terminal.
#[derive(Parser, Debug)]
#[command(name = "stager", version, about)]
struct Cli {
    /// Files to stage on startup
    paths: Vec<PathBuf>,

    /// Stage an already-hosted resource by URL (repeatable)
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Path to a config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable mouse capture
    #[arg(long)]
    no_mouse: bool,

    /// Where submissions write their manifest
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Log file (default: $TMPDIR/stager.log)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Flags that override every config file.
    fn overrides(&self) -> AppConfig {
        let mut config = AppConfig::default();
        if self.no_mouse {
            config.general.mouse = Some(false);
        }
        config.general.manifest_path = self.manifest.as_ref().map(|p| p.display().to_string());
        config
    }
}

/// stderr belongs to the TUI, so logs go to a file.
fn init_logging(path: Option<PathBuf>) -> error::Result<()> {
    let path = path.unwrap_or_else(|| std::env::temp_dir().join("stager.log"));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::File::create(&path)?;
    let filter = EnvFilter::try_from_env("STAGER_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.clone())?;

    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    info!(
        paths = cli.paths.len(),
        urls = cli.urls.len(),
        "starting stager"
    );

    install_panic_hook();

    let mut tui = Tui::new(config.mouse_enabled())?;
    let mut events = EventHandler::new(Duration::from_millis(16));
    let mut app = App::new(config).with_event_sender(events.sender());

    if !cli.paths.is_empty() {
        app.stage_paths(cli.paths);
    }
    if !cli.urls.is_empty() {
        app.stage_urls(cli.urls);
    }

    loop {
        tui.terminal_mut().draw(|frame| {
            ui::render(&mut app, frame);
        })?;

        let event = events.next().await?;
        let now = Instant::now();
        app.tick(now);
        match event {
            Event::Key(key) => handler::handle_key_event(&mut app, key, now),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse, now),
            Event::Paste(text) => app.handle_paste(&text),
            Event::Tick => {}
            Event::Resize(_, _) => {}
            Event::Decoded { id, result } => app.handle_decoded(id, result),
            Event::Submitted(outcome) => app.handle_submitted(outcome),
        }

        if app.should_quit {
            break;
        }
    }

    app.clear_session();
    info!(
        created = app.registry.total_created(),
        revoked = app.registry.total_revoked(),
        live = app.registry.live_count(),
        "session closed"
    );
    tui.restore()?;
    Ok(())
}
