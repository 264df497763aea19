use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "MUNGEHUB_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/mungehub.toml";
const ENV_PREFIX: &str = "MUNGEHUB";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;

    load_secrets(&mut config);

    Ok(config)
}

/// The API token only ever comes from the environment
fn load_secrets(config: &mut Config) {
    if let Ok(token) = env::var("MUNGEHUB_TOKEN") {
        config.github.token = Some(token);
    }

    if config.github.token.is_none() {
        if let Ok(token) = env::var("GITHUB_TOKEN") {
            config.github.token = Some(token);
        }
    }
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // MUNGEHUB__GITHUB__ORG -> github.org
    // MUNGEHUB__MUNGE__HANDLERS=summary,lgtm -> munge.handlers
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .list_separator(",")
            .with_list_parse_key("munge.handlers")
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}
