mod chat;
mod cli;
mod route;
mod setup;
mod transcribe;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use movi_assistant::AgentClient;
use movi_common::MoviError;
use movi_config::schema::{LogLevel, MoviConfig};
use tracing_subscriber::EnvFilter;

use cli::Command;

/// Load environment variables from a .env file (KEY=VALUE lines).
///
/// Variables already set in the environment win.
fn load_dotenv() {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidates = [
        PathBuf::from(".env"),
        // workspace root, two levels up from crates/movi-app/
        manifest_dir.join("..").join("..").join(".env"),
    ];

    for path in &candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for (key, value) in parse_dotenv(&contents) {
                if std::env::var_os(key).is_none() {
                    std::env::set_var(key, value);
                }
            }
            return;
        }
    }
}

fn parse_dotenv(contents: &str) -> Vec<(&str, &str)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.strip_prefix("export ").unwrap_or(line).split_once('='))
        .map(|(key, value)| {
            (
                key.trim(),
                value.trim().trim_matches('"').trim_matches('\''),
            )
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// `--log-level` wins, then `RUST_LOG`, then the configured level.
fn log_filter(cli_level: Option<&str>, config_level: LogLevel) -> EnvFilter {
    if let Some(level) = cli_level {
        let directive = if level.contains('=') || level.contains(',') {
            level.to_string()
        } else {
            format!("movi={level}")
        };
        match EnvFilter::try_new(&directive) {
            Ok(filter) => return filter,
            Err(e) => eprintln!("ignoring invalid --log-level '{level}': {e}"),
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level.directive()))
}

fn load_config(path: Option<&Path>) -> movi_common::Result<MoviConfig> {
    match movi_config::load_config(path) {
        Ok(config) => Ok(config),
        // an explicit --config must exist and parse
        Err(e) if path.is_some() => Err(e.into()),
        Err(e) => {
            eprintln!("config load failed, using defaults: {e}");
            let mut config = MoviConfig::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }
}

async fn check_health(config: &MoviConfig) -> movi_common::Result<()> {
    let endpoint = setup::agent_endpoint(&config.agent);
    let url = endpoint.health_url.clone();
    let client = AgentClient::http(endpoint).map_err(|e| MoviError::Agent(e.to_string()))?;
    client
        .health()
        .await
        .map_err(|e| MoviError::Agent(format!("{url}: {e}")))?;
    println!("agent at {} is healthy", config.agent.base_url);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();
    let args = cli::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("movi: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.log_level.as_deref(), config.logging.level))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Movi v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(ref path) = args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    // the loader ran before logging was up
    if let Err(e) = movi_config::validation::validate(&config) {
        tracing::warn!("config validation warning: {e}");
    }

    let result = match args.command {
        Command::Chat { page, tts } => chat::run(&config, page, tts).await,
        Command::Health => check_health(&config).await,
        Command::Route { coords } => route::run(&config.routing, &coords).await,
        Command::Transcribe { files } => transcribe::run(&config.speech, files).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
