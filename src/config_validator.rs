use crate::error::ShortenerError;
use crate::validation::is_valid_url;

pub const MAX_SHORTCODE_LENGTH: usize = 32;

/// Validates configuration values for consistency and correctness
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the public base URL short links are built from
    pub fn validate_base_url(url: &str) -> Result<(), ShortenerError> {
        if url.is_empty() {
            return Err(ShortenerError::Configuration(
                "Base URL cannot be empty".to_string(),
            ));
        }

        if !is_valid_url(url) {
            return Err(ShortenerError::Configuration(
                "Base URL must start with 'http://' or 'https://'".to_string(),
            ));
        }

        Ok(())
    }

    pub fn validate_validity(minutes: i64) -> Result<(), ShortenerError> {
        if minutes < 1 {
            return Err(ShortenerError::Configuration(
                "Default validity must be at least 1 minute".to_string(),
            ));
        }

        Ok(())
    }

    pub fn validate_shortcode_length(length: usize) -> Result<(), ShortenerError> {
        if length == 0 || length > MAX_SHORTCODE_LENGTH {
            return Err(ShortenerError::Configuration(format!(
                "Shortcode length must be between 1 and {}",
                MAX_SHORTCODE_LENGTH
            )));
        }

        Ok(())
    }

    pub fn validate_generation_attempts(attempts: u32) -> Result<(), ShortenerError> {
        if attempts == 0 {
            return Err(ShortenerError::Configuration(
                "Generation attempts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates the log collector endpoint
    pub fn validate_telemetry_url(url: &str) -> Result<(), ShortenerError> {
        if !is_valid_url(url) {
            return Err(ShortenerError::Configuration(
                "Telemetry URL must start with 'http://' or 'https://'".to_string(),
            ));
        }

        Ok(())
    }
}
