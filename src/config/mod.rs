mod types;

pub use types::*;

use crate::Result;
use std::env;
use tracing::debug;

pub const ACCOUNT_ID_ENV: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const API_TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    let mut config = load_from(&config_path).await?;
    apply_env_overrides(&mut config, |name| env::var(name).ok());

    Ok(config)
}

/// Reads a YAML config file without consulting the environment.
pub async fn load_from(config_path: &str) -> Result<Config> {
    debug!("Loading configuration from: {}", config_path);

    let config_str = tokio::fs::read_to_string(config_path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;

    Ok(config)
}

/// Environment values win over the file when set and non-empty.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(account_id) = lookup(ACCOUNT_ID_ENV).filter(|v| !v.is_empty()) {
        debug!("Using account id from {}", ACCOUNT_ID_ENV);
        config.cloudflare.account_id = Some(account_id);
    }
    if let Some(api_token) = lookup(API_TOKEN_ENV).filter(|v| !v.is_empty()) {
        debug!("Using API token from {}", API_TOKEN_ENV);
        config.cloudflare.api_token = Some(api_token);
    }
}
