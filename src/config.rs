//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DB_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `KEY_GENERATION_ATTEMPTS` (optional): how many fresh keys to try when the
///   generated `api_key` collides with an existing one, defaults to 3
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_key_generation_attempts")]
    pub key_generation_attempts: u32,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_key_generation_attempts() -> u32 {
    3
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    /// Build a Config from an explicit set of `(NAME, value)` pairs.
    ///
    /// Field names are converted automatically: database_url -> DATABASE_URL
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = envy::from_iter::<_, Config>(vars)?;
        // At least one key must be generated per create
        config.key_generation_attempts = config.key_generation_attempts.max(1);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = Config::from_vars(vars(&[("DATABASE_URL", "postgres://localhost/keys")]))
            .unwrap();

        assert_eq!(config.database_url, "postgres://localhost/keys");
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.key_generation_attempts, 3);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(Config::from_vars(vars(&[("SERVER_PORT", "8080")])).is_err());
    }

    #[test]
    fn zero_generation_attempts_is_raised_to_one() {
        let config = Config::from_vars(vars(&[
            ("DATABASE_URL", "postgres://localhost/keys"),
            ("KEY_GENERATION_ATTEMPTS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.key_generation_attempts, 1);
    }
}
