//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::error::ConfigError;

/// Maximum bio length, in characters.
pub const BIO_MAX_CHARS: usize = 2000;

/// Default cap on a selected profile photo (5 MiB).
pub const DEFAULT_MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Per-screen limits for the profile step.
#[derive(Debug, Clone)]
pub struct StepConfig {
    /// Hard cap on the bio field; longer input is truncated.
    pub bio_max_chars: usize,
    /// Largest image accepted for preview encoding.
    pub max_photo_bytes: usize,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            bio_max_chars: BIO_MAX_CHARS,
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
        }
    }
}

impl StepConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bio_max_chars: defaults.bio_max_chars,
            max_photo_bytes: env_or("ONBOARDING_MAX_PHOTO_BYTES", defaults.max_photo_bytes),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path of the libSQL database file.
    pub db_path: PathBuf,
    /// Port the HTTP server binds on.
    pub port: u16,
    pub step: StepConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/onboarding.db"),
            port: 8080,
            step: StepConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Build config from `ONBOARDING_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let db_path = std::env::var("ONBOARDING_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        Self {
            db_path,
            port: env_or("ONBOARDING_PORT", defaults.port),
            step: StepConfig::from_env(),
        }
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ONBOARDING_PORT".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }
        if self.step.max_photo_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ONBOARDING_MAX_PHOTO_BYTES".to_string(),
                message: "photo limit must be at least one byte".to_string(),
            });
        }
        Ok(())
    }
}

/// Read and parse an environment variable, keeping `default` when it is
/// unset or unparseable.
fn env_or<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "Invalid config value, using default");
            default
        }),
        Err(_) => default,
    }
}
