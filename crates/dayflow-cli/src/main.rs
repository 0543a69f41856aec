//! DayFlow HRMS command line front end.
//!
//! Drives the session core the way the web frontend does: the stored
//! credential is validated once at startup, then the requested command runs
//! against the resulting session.

mod navigator;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dayflow_core::auth::{GuardDecision, RouteGuard, SessionManager, SessionState};
use dayflow_core::navigation::{nav_items, Route};
use dayflow_core::secrets::{generate_secret, DEFAULT_SECRET_BYTES};
use dayflow_core::{ApiClient, Config, TokenBackend};

use navigator::TerminalNavigator;

/// Directory for a rolling log file, in addition to stderr
const ENV_LOG_DIR: &str = "DAYFLOW_LOG_DIR";

/// Password source for non-interactive logins
const ENV_PASSWORD: &str = "DAYFLOW_PASSWORD";

#[derive(Debug, Parser)]
#[command(name = "dayflow", version, about = "DayFlow HRMS session tools")]
struct Cli {
    /// API base URL (overrides config and DAYFLOW_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Credential storage: file, keyring or memory
    #[arg(long, global = true)]
    token_backend: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and store the credential
    Login {
        /// Email or employee identifier (defaults to the last one used)
        #[arg(short, long)]
        identifier: Option<String>,
    },
    /// Sign out and remove the stored credential
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Check whether a view may be opened with the current session
    Visit {
        /// View path, e.g. /payroll
        path: String,
    },
    /// List the navigation available to the current session
    Nav,
    /// Print a random hex secret for server configuration
    GenSecret {
        /// Secret length in bytes
        #[arg(short, long, default_value_t = DEFAULT_SECRET_BYTES)]
        bytes: usize,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// The returned guard must live until exit so the file writer flushes.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr));

    match std::env::var(ENV_LOG_DIR) {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "dayflow.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        Err(_) => {
            registry.init();
            None
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });

    if let Some(ref url) = cli.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(ref backend) = cli.token_backend {
        config.token_backend = backend.parse::<TokenBackend>()?;
    }
    debug!(api = %config.api_base_url, backend = ?config.token_backend, "Config loaded");
    Ok(config)
}

/// The single composition root: one token store, one client, one manager
fn build_session(config: &Config) -> Result<SessionManager> {
    let tokens = config.token_store()?;
    let api = ApiClient::from_config(config, Arc::clone(&tokens))
        .context("Failed to create API client")?;
    Ok(SessionManager::new(
        api,
        tokens,
        Arc::new(TerminalNavigator::new()),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing();

    if let Command::GenSecret { bytes } = cli.command {
        println!("{}", generate_secret(bytes)?);
        return Ok(());
    }

    let config = load_config(&cli)?;
    let session = build_session(&config)?;

    info!("Checking stored session");
    let current = session.check_session().await;

    match cli.command {
        Command::Login { identifier } => {
            let identifier = match identifier.or_else(|| config.last_identifier.clone()) {
                Some(identifier) => identifier,
                None => prompt_identifier()?,
            };
            let password = match std::env::var(ENV_PASSWORD) {
                Ok(password) => password,
                Err(_) => rpassword::prompt_password("Password: ")?,
            };

            match session.login(&identifier, &password).await {
                Ok(user) => {
                    if let Err(e) = Config::remember_identifier(&identifier) {
                        tracing::warn!(error = %e, "Failed to save config");
                    }
                    println!("Signed in as {} ({})", user.display_name(), user.role);
                }
                Err(e) => bail!("{}", e.user_message()),
            }
        }
        Command::Logout => {
            session.logout();
            println!("Signed out");
        }
        Command::Whoami => match current.state() {
            SessionState::Authenticated(user) => {
                println!("{}", serde_json::to_string_pretty(user)?);
            }
            SessionState::Anonymous | SessionState::Bootstrapping => {
                println!("Not signed in");
            }
        },
        Command::Visit { path } => {
            let route = Route::from_path(&path)
                .with_context(|| format!("No such view: {}", path))?;
            let navigator = TerminalNavigator::new();
            let mut sessions = session.subscribe();
            let decision = RouteGuard::for_route(route)
                .resolve(&mut sessions, &navigator)
                .await;

            match decision {
                GuardDecision::Render => println!("{} ({}): allowed", route.title(), route.path()),
                GuardDecision::Redirect { to, .. } => {
                    println!("{} ({}): redirected to {}", route.title(), route.path(), to)
                }
                GuardDecision::Loading => println!("{}: still loading", route.title()),
            }
        }
        Command::Nav => {
            let items = nav_items(&current);
            if items.is_empty() {
                println!("Not signed in");
            }
            for item in items {
                println!("{:<12} {}", item.title, item.path);
            }
        }
        // Handled before the session check
        Command::GenSecret { .. } => {}
    }

    Ok(())
}

fn prompt_identifier() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;

    let mut identifier = String::new();
    io::stdin().read_line(&mut identifier)?;
    Ok(identifier.trim().to_string())
}
