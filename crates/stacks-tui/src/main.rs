//! Stacks - a terminal front end for the school library.
//!
//! Students browse the catalog and check out books; librarians manage
//! loans, the catalog and user accounts. All data lives behind the library's
//! REST API.

mod app;
mod forms;
mod ui;

#[cfg(test)]
mod test_support;

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stacks_core::utils::format_datetime;
use stacks_core::{ApiClient, Config, SessionStore};

use app::{login_error_message, App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE: &str = "stacks.log";

/// Initialize the tracing subscriber for logging.
///
/// The terminal belongs to the UI, so logs go to a daily file under the data
/// directory. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = Config::data_dir().ok().map(|dir| init_tracing(&dir));
    info!("Stacks starting");

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    let session = SessionStore::new(config.token_store()?);

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match parse_command(args.get(1).map(String::as_str))? {
        Some(CliCommand::Login) => return cli_login(config, session).await,
        Some(CliCommand::Logout) => return cli_logout(session),
        Some(CliCommand::Whoami) => return cli_whoami(session),
        None => {}
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app, restore the session and show the home path
    let result = match App::new(config, session) {
        Ok(mut app) => {
            app.start();
            run_app(&mut terminal, &mut app).await
        }
        Err(e) => Err(e),
    };

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

    info!("Stacks shutting down");
    Ok(())
}

/// One-shot commands run instead of the terminal UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CliCommand {
    Login,
    Logout,
    Whoami,
}

/// Map the first argument to a command. An unrecognized option is an error.
fn parse_command(arg: Option<&str>) -> Result<Option<CliCommand>> {
    match arg {
        None => Ok(None),
        Some("--login") => Ok(Some(CliCommand::Login)),
        Some("--logout") => Ok(Some(CliCommand::Logout)),
        Some("--whoami") => Ok(Some(CliCommand::Whoami)),
        Some(other) => {
            anyhow::bail!("Unknown option: {}\nUsage: stacks [--login | --logout | --whoami]", other)
        }
    }
}

/// Log in from the command line and persist the token
async fn cli_login(mut config: Config, mut session: SessionStore) -> Result<()> {
    let default_username = config.resolved_username();
    let username = prompt_username(default_username.as_deref())?;
    let password = rpassword::prompt_password("Password: ")?;

    let api = ApiClient::new(&config.resolved_api_url())?;
    session.initialize();
    session
        .login(&api, &username, &password)
        .await
        .map_err(|e| anyhow::anyhow!(login_error_message(&e)))?;

    config.last_username = Some(username);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    let name = session
        .current_identity()
        .map(|identity| identity.full_name())
        .unwrap_or_default();
    println!("Login successful! Welcome, {}.", name);
    Ok(())
}

fn cli_logout(mut session: SessionStore) -> Result<()> {
    session.initialize();
    session.logout();
    println!("Logged out.");
    Ok(())
}

fn cli_whoami(mut session: SessionStore) -> Result<()> {
    session.initialize();
    match session.current_identity() {
        Some(identity) => {
            println!("{} ({})", identity.full_name(), identity.username);
            println!("Role: {}", identity.role.display_name());
            if let Some(expires_at) = session.expires_at() {
                println!("Session valid until {}", format_datetime(&expires_at));
            }
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

fn prompt_username(default: Option<&str>) -> Result<String> {
    match default {
        Some(name) => print!("Username [{}]: ", name),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let username = username.trim();

    match (username.is_empty(), default) {
        (true, Some(name)) => Ok(name.to_string()),
        (true, None) => anyhow::bail!("Username required"),
        (false, _) => Ok(username.to_string()),
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Apply completed page requests
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
