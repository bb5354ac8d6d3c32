use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub ip_lookup: IpLookupConfig,
}

/// Settings for the best-effort public IP lookup used in audit context.
#[derive(Debug, Deserialize, Clone)]
pub struct IpLookupConfig {
    #[serde(default = "default_ip_lookup_enabled")]
    pub enabled: bool,
    #[serde(default = "default_ip_lookup_url")]
    pub url: String,
    #[serde(default = "default_ip_lookup_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ip_lookup_enabled() -> bool {
    false
}

fn default_ip_lookup_url() -> String {
    "https://api.ipify.org".to_string()
}

fn default_ip_lookup_timeout_ms() -> u64 {
    1500
}

impl Default for IpLookupConfig {
    fn default() -> Self {
        Self {
            enabled: default_ip_lookup_enabled(),
            url: default_ip_lookup_url(),
            timeout_ms: default_ip_lookup_timeout_ms(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
