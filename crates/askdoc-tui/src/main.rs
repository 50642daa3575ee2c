use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use askdoc_core::{ai, wellness, Config, History, LocalStore, Theme};

mod app;
mod handler;
mod input;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "askdoc")]
#[command(version, about = "A supportive wellness companion for the terminal")]
struct Cli {
    /// Directory holding mood logs, journal entries and the log file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Gemini model to use
    #[arg(long)]
    model: Option<String>,

    /// Color theme
    #[arg(long, value_parser = ["dark", "light"])]
    theme: Option<String>,

    /// Write logs here instead of <data-dir>/askdoc.log
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Route tracing output to a file; the terminal belongs to the UI.
fn init_logging(data_dir: &Path, log_file: Option<&Path>) -> Result<WorkerGuard> {
    let path = log_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| data_dir.join("askdoc.log"));
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("invalid log file path: {}", path.display()))?;
    std::fs::create_dir_all(dir)?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a local .env file
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let (settings, config_error) = match Config::load() {
        Ok(settings) => (settings, None),
        Err(e) => (Config::new(), Some(e)),
    };
    let data_dir = match cli.data_dir.clone() {
        Some(dir) => dir,
        None => settings.data_dir()?,
    };

    let _guard = init_logging(&data_dir, cli.log_file.as_deref())?;
    info!(version = env!("CARGO_PKG_VERSION"), data_dir = %data_dir.display(), "askdoc starting");
    if let Some(e) = config_error {
        warn!(error = %e, "failed to read config file, using defaults");
    }
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded .env");
    }

    if let Some(model) = &cli.model {
        ai::set_default_model(model);
    }

    let store = LocalStore::open(&data_dir)?;
    // Command line wins, then the last toggle, then the config file
    let theme = cli
        .theme
        .as_deref()
        .and_then(Theme::from_str)
        .or_else(|| store.load_theme())
        .or_else(|| settings.theme())
        .unwrap_or_default();
    let history = History::load(store);
    info!(
        moods = history.moods().len(),
        journals = history.journals().len(),
        "history loaded"
    );

    let session = wellness::companion_session(&settings);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(history, theme, events.sender(), session);

    let result = run(&mut terminal, &mut app, &mut events).await;

    app.abort_tasks();
    tui::restore()?;
    info!("askdoc exiting");
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}
