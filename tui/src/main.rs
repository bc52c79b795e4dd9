//! Companion TUI Entry Point
//!
//! Launches the terminal chat with the mental health companion.
//!
//! # Usage
//!
//! ```bash
//! # Key from the environment
//! COMPANION_API_KEY=... companion
//!
//! # Custom endpoint and config file
//! companion --endpoint https://example.test/v1/generate --config ./companion.toml
//!
//! # Verbose logging (written to the log file, never the terminal)
//! RUST_LOG=debug companion
//! ```

use std::fs;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use companion_core::{
    default_config_path, default_log_path, load_config_from_path, ChatSession, CompanionConfig,
    ConfigOverrides, GeminiBackend, SessionConfig,
};
use companion_tui::App;

/// Companion - a supportive chat in your terminal
#[derive(Parser, Debug)]
#[command(name = "companion")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "COMPANION_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Completion endpoint URL
    #[arg(short = 'e', long, value_name = "URL")]
    endpoint: Option<String>,

    /// API key sent with every request
    #[arg(short = 'k', long, value_name = "KEY")]
    api_key: Option<String>,

    /// Log file path
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Start without the companion's greeting
    #[arg(long)]
    no_greeting: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ref endpoint) = self.endpoint {
            overrides = overrides.with_endpoint(endpoint.clone());
        }
        if let Some(ref key) = self.api_key {
            overrides = overrides.with_api_key(key.clone());
        }
        if let Some(ref path) = self.log_file {
            overrides = overrides.with_log_file(path.clone());
        }
        if self.no_greeting {
            overrides = overrides.without_greeting();
        }
        overrides
    }
}

/// Route tracing output to a file so it never corrupts the screen
fn init_logging(config: &CompanionConfig) -> Result<Option<PathBuf>> {
    let Some(path) = config.log_file.clone().or_else(default_log_path) else {
        return Ok(None);
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {parent:?}"))?;
    }
    let file = open_log(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(Some(path))
}

fn open_log(path: &Path) -> Result<fs::File> {
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {path:?}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration: CLI > env > file > defaults
    let config_path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(config_path).context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let log_path = init_logging(&config)?;
    info!(
        endpoint = %config.endpoint,
        source = ?config.source(),
        log = ?log_path,
        "Starting companion"
    );

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: companion requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means stdin or stdout is piped, or SSH ran without -t.");
        std::process::exit(1);
    }

    let mut app = build_app(&config);

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Propagate any errors
    result
}

/// Wire the backend, session and update channel together
fn build_app(config: &CompanionConfig) -> App<GeminiBackend> {
    let backend = GeminiBackend::from_config(config);
    let (tx, rx) = mpsc::channel(config.update_buffer);
    let session = ChatSession::new(backend, SessionConfig::from(config), tx);
    let app = App::new(session, rx);

    if config.has_api_key() {
        app
    } else {
        warn!("No API key configured; requests will be rejected by the endpoint");
        app.with_status_note("No API key set (COMPANION_API_KEY)")
    }
}
