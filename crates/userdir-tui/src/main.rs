//! userdir - a terminal directory of random user profiles.
//!
//! Fetches a batch of people from randomuser.me, keeps them in a local user
//! table and shows them as a grid of deletable cards.

mod app;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use userdir_core::{Config, Directory, UserStore};

use app::{App, AppState};
use ui::cards::columns_for_width;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log level used when neither RUST_LOG nor the config sets one
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Log file written inside the data directory while the TUI runs
const LOG_FILE: &str = "userdir.log";

const USAGE: &str = "\
Usage: userdir [OPTION]

With no option, opens the interactive directory.

Options:
  --sync           Load users (fetching if the local table is empty) and print them
  --refresh        Replace the local table with a fresh batch and print it
  --dump           Print the stored users as JSON
  --write-config   Write the current configuration file
  -h, --help       Show this help
";

fn env_filter(config: &Config) -> EnvFilter {
    // RUST_LOG wins over the configured level
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))
    })
}

/// Route tracing output to a file so it never draws over the TUI
fn init_file_tracing(config: &Config, log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter(config))
        .init();

    Ok(guard)
}

/// Headless commands log to stderr alongside their output
fn init_stderr_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter(config))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    let option = args.get(1).map(String::as_str);
    if is_help(option) {
        print!("{}", USAGE);
        return Ok(());
    }

    let mut config = Config::load()?;

    match option {
        None => {}
        Some("--write-config") => return write_config(&config),
        Some(flag @ ("--sync" | "--refresh" | "--dump")) => {
            config.apply_env_overrides();
            init_stderr_tracing(&config);
            return match flag {
                "--dump" => dump_users(&config).await,
                "--refresh" => run_headless(&config, true).await,
                _ => run_headless(&config, false).await,
            };
        }
        Some(other) => {
            eprint!("{}", USAGE);
            bail!("Unknown option: {}", other);
        }
    }

    config.apply_env_overrides();

    // Initialize logging
    let _guard = init_file_tracing(&config, &config.data_dir()?)?;
    info!("userdir starting");

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(&config).await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start_initial_load();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("userdir shutting down");
    Ok(())
}

/// Checked before the config file is read
fn is_help(option: Option<&str>) -> bool {
    matches!(option, Some("-h") | Some("--help"))
}

/// Write the loaded configuration (without env overrides) to disk
fn write_config(config: &Config) -> Result<()> {
    config.save()?;
    println!("Wrote {}", Config::config_path()?.display());
    Ok(())
}

/// Run an initial load or a refresh without the TUI and print the result
async fn run_headless(config: &Config, force_refresh: bool) -> Result<()> {
    let store = app::open_store(config)?;
    let service = app::build_service(config, store)?;
    let mut directory = Directory::new(service);

    if force_refresh {
        directory.refresh().await;
    } else {
        directory.initial_load().await;
    }

    let state = directory.state();
    for user in &state.users {
        println!(
            "{:<36}  {:<28}  {:<40}  {}",
            user.id,
            user.full_name(),
            user.email,
            userdir_core::utils::format_phone(&user.phone)
        );
    }
    eprintln!("{} users", state.users.len());

    if let Some(ref error) = state.error {
        bail!("{}", error);
    }
    Ok(())
}

/// Dump the stored users as JSON
async fn dump_users(config: &Config) -> Result<()> {
    let store = app::open_store(config)?;
    let users = store.read_all().await?;
    println!("{}", serde_json::to_string_pretty(&users)?);
    eprintln!("{} users in {}", users.len(), store.path().display());
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| {
            app.grid_columns = columns_for_width(f.area().width);
            render(f, app);
        })?;
        app.tick = app.tick.wrapping_add(1);

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_flags() {
        assert!(is_help(Some("-h")));
        assert!(is_help(Some("--help")));
        assert!(!is_help(Some("--sync")));
        assert!(!is_help(None));
    }
}
