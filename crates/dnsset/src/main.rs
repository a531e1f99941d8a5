// # dnsset - DNS Address Setter
//
// Thin front end over dnsset-core. It is responsible for:
// 1. Parsing the command line and initializing logging
// 2. Loading configuration and asking for a missing API token
// 3. Choosing the provider and the domain/IP sources
// 4. Running one pass and turning its outcome into an exit code
//
// Reconciliation logic lives in dnsset-core, never here.
//
// ## Environment
//
// - `CLOUDFLARE_API_TOKEN`: API token (overrides the config file)
// - `DNSSET_CONFIG_DIR`: Directory holding `config.toml`
// - `DNSSET_CADDYFILE_PATH`: Default Caddyfile location
// - `DNSSET_DEFAULT_TTL`: Default record TTL in seconds (0 = automatic)
// - `DNSSET_LOG_LEVEL`: trace, debug, info, warn or error (default warn)
// - `DNSSET_MODE`: `dry-run` to make no changes at the provider
//
// ## Example
//
// ```bash
// export CLOUDFLARE_API_TOKEN=your_token
//
// dnsset sync --caddyfile /etc/caddy/Caddyfile --select all \
//     --ip-source api --record-types both --dns-only
// ```

mod cli;
mod commands;
mod prompt;

use anyhow::{Result, bail};
use clap::Parser;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Cli, Command};
use crate::commands::App;

/// Log level variable
const ENV_LOG_LEVEL: &str = "DNSSET_LOG_LEVEL";

/// Run mode variable; `dry-run` is the only recognized value
const ENV_MODE: &str = "DNSSET_MODE";

/// Exit codes for the ways a run can end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DnssetExitCode {
    /// Every selected record converged
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// The pass was aborted before any record was touched
    PassAborted = 2,
    /// The pass ran but at least one address lookup or record failed
    PartialFailure = 3,
}

impl From<DnssetExitCode> for ExitCode {
    fn from(code: DnssetExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Pick the log level from `-v` flags or the environment
///
/// # Parameters
///
/// - `verbose`: Number of `-v` flags; takes precedence when non-zero
/// - `env_level`: Value of `DNSSET_LOG_LEVEL`, if set
fn log_level(verbose: u8, env_level: Option<&str>) -> Result<Level> {
    match verbose {
        0 => {}
        1 => return Ok(Level::INFO),
        2 => return Ok(Level::DEBUG),
        _ => return Ok(Level::TRACE),
    }

    let Some(level) = env_level else {
        return Ok(Level::WARN);
    };

    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => bail!(
            "{ENV_LOG_LEVEL} '{level}' is not valid. \
            Valid levels: trace, debug, info, warn, error"
        ),
    }
}

/// Whether the provider must be built without write access
fn dry_run_requested(flag: bool, mode: Option<&str>) -> bool {
    flag || mode.is_some_and(|mode| mode.eq_ignore_ascii_case("dry-run"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match log_level(cli.global.verbose, env::var(ENV_LOG_LEVEL).ok().as_deref()) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return DnssetExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return DnssetExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnssetExitCode::ConfigError.into();
        }
    };

    rt.block_on(run(cli)).into()
}

/// Set up and dispatch the requested command
async fn run(cli: Cli) -> DnssetExitCode {
    let dry_run = dry_run_requested(cli.global.dry_run, env::var(ENV_MODE).ok().as_deref());

    let app = match App::init(&cli.global, dry_run) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            return DnssetExitCode::ConfigError;
        }
    };

    let result = match cli.selected_command() {
        Command::Sync(args) => commands::sync::run(&app, args).await,
        Command::List(args) => commands::list::run(&app, args).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            DnssetExitCode::PassAborted
        }
    }
}
