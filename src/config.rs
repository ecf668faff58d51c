use crate::config_validator::ConfigValidator;
use crate::error::ShortenerResult;
use clap::Parser;
use std::net::SocketAddr;

#[derive(Debug, Clone, Parser)]
#[command(name = "shortener", version, about = "URL shortening service with expiring links")]
pub struct Config {
    /// Server bind address
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3001")]
    pub bind_addr: SocketAddr,

    /// Public prefix used to build short links
    #[arg(long, env = "BASE_URL", default_value = "http://localhost:3001")]
    pub base_url: String,

    /// Link lifetime applied when a request does not specify one
    #[arg(long, env = "DEFAULT_VALIDITY_MINUTES", default_value_t = 30)]
    pub default_validity_minutes: i64,

    /// Length of generated shortcodes
    #[arg(long, env = "SHORTCODE_LENGTH", default_value_t = 5)]
    pub shortcode_length: usize,

    /// Random codes tried before giving up on a creation
    #[arg(long, env = "MAX_GENERATION_ATTEMPTS", default_value_t = 5)]
    pub max_generation_attempts: u32,

    /// Remote log collector endpoint; remote logging is off when unset
    #[arg(long, env = "TELEMETRY_URL")]
    pub telemetry_url: Option<String>,

    /// Bearer token for the log collector
    #[arg(long, env = "ACCESS_TOKEN", hide_env_values = true)]
    pub telemetry_token: Option<String>,

    /// Log level for the shortener crate
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            base_url: "http://localhost:3001".to_string(),
            default_validity_minutes: 30,
            shortcode_length: 5,
            max_generation_attempts: 5,
            telemetry_url: None,
            telemetry_token: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> ShortenerResult<()> {
        ConfigValidator::validate_base_url(&self.base_url)?;
        ConfigValidator::validate_validity(self.default_validity_minutes)?;
        ConfigValidator::validate_shortcode_length(self.shortcode_length)?;
        ConfigValidator::validate_generation_attempts(self.max_generation_attempts)?;
        if let Some(url) = &self.telemetry_url {
            ConfigValidator::validate_telemetry_url(url)?;
        }
        Ok(())
    }
}
