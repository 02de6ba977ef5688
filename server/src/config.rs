use aldente_core::{BlobError, BlobStoreConfig, FetchFailurePolicy, SaveOptions};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Blob(#[from] BlobError),
}

/// Server settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub blob: BlobStoreConfig,
    pub save: SaveOptions,
}

impl Config {
    /// Environment variables:
    /// - `BIND_ADDR` (default `0.0.0.0`), `PORT` (default 3000)
    /// - `ALDENTE_FETCH_FAILURE`: "empty" (default) or "fail"
    /// - `ALDENTE_SAVE_ATTEMPTS`: write attempts per save (default 3)
    /// - blob store settings, see [`BlobStoreConfig::from_env`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let blob = BlobStoreConfig::from_env()?;
        let defaults = SaveOptions::default();

        let save = SaveOptions {
            key: blob.key.clone(),
            fetch_failure: try_load::<FetchFailurePolicy>("ALDENTE_FETCH_FAILURE", "empty")?,
            max_attempts: try_load("ALDENTE_SAVE_ATTEMPTS", &defaults.max_attempts.to_string())?,
        };

        if save.fetch_failure == FetchFailurePolicy::TreatAsEmpty {
            warn!("ALDENTE_FETCH_FAILURE=empty: a failed read of the repository will be saved over");
        }

        Ok(Self {
            bind_addr: try_load("BIND_ADDR", "0.0.0.0")?,
            port: try_load("PORT", "3000")?,
            blob,
            save,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        debug!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        value: value.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_load_default() {
        let port: u16 = try_load("ALDENTE_TEST_UNSET_PORT", "3000").unwrap();
        assert_eq!(port, 3000);
    }

    #[test]
    fn test_try_load_invalid_default_reports_key() {
        let err = try_load::<u16>("ALDENTE_TEST_UNSET_PORT", "not-a-port").unwrap_err();
        assert!(err.to_string().contains("ALDENTE_TEST_UNSET_PORT"));
    }

    #[test]
    fn test_listen_addr() {
        let config = Config {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            blob: BlobStoreConfig::default(),
            save: SaveOptions::default(),
        };
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
    }
}
