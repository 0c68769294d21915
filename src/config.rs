use crate::types::{AppConfig, StartupError};
use config::{Config, ConfigError, Environment};

/// Longest accepted token lifetime: one year
pub const MAX_TOKEN_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

impl From<ConfigError> for StartupError {
    fn from(err: ConfigError) -> Self {
        StartupError::Config(err.to_string())
    }
}

/// Load the app configuration from the process environment
pub fn load_config() -> Result<AppConfig, StartupError> {
    load_config_from(environment())
}

fn environment() -> Environment {
    Environment::default()
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("cors_origins")
}

fn load_config_from(env: Environment) -> Result<AppConfig, StartupError> {
    let defaults = AppConfig::default();

    // 1. Defaults, then environment overrides
    let settings = Config::builder()
        .set_default("bind_address", defaults.bind_address)?
        .set_default("api_prefix", defaults.api_prefix)?
        .set_default("jwt_secret", defaults.jwt_secret)?
        .set_default("token_ttl_seconds", defaults.token_ttl_seconds)?
        .set_default("cors_origins", defaults.cors_origins)?
        .set_default("status_mapping", "typed")?
        .add_source(env)
        .build()?;

    // 2. Deserialize into the typed config
    let config: AppConfig = settings.try_deserialize()?;

    // 3. Validate the config
    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<(), StartupError> {
    if config.jwt_secret.is_empty() {
        return Err(StartupError::Config("JWT secret can't be empty".to_string()));
    }

    if config.token_ttl_seconds <= 0 {
        return Err(StartupError::Config("Token TTL must be positive".to_string()));
    }

    if config.token_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
        return Err(StartupError::Config(format!(
            "Token TTL can't exceed {} seconds",
            MAX_TOKEN_TTL_SECONDS
        )));
    }

    if !config.api_prefix.is_empty() && !config.api_prefix.starts_with('/') {
        return Err(StartupError::Config(format!(
            "API prefix must start with '/': {}",
            config.api_prefix
        )));
    }

    Ok(())
}
