use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use facebank_core::auth::domain::auth_policy::{AuthPolicy, PolicyError};
use facebank_core::shared::constants::{
    DEFAULT_AUTHORIZED_IDENTITY, DEFAULT_INITIAL_BALANCE, DEFAULT_LOCK_TIME_SECS,
    DEFAULT_MAX_ATTEMPTS,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(#[from] PolicyError),
}

/// Kiosk settings file. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub authorized_identity: String,
    pub max_attempts: u32,
    pub lock_time_secs: u64,
    pub initial_balance: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            authorized_identity: DEFAULT_AUTHORIZED_IDENTITY.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lock_time_secs: DEFAULT_LOCK_TIME_SECS,
            initial_balance: DEFAULT_INITIAL_BALANCE,
        }
    }
}

impl AuthConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceBank").join("config.json"))
    }

    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::load_from(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_policy(&self) -> Result<AuthPolicy, ConfigError> {
        Ok(AuthPolicy::new(
            self.authorized_identity.clone(),
            self.max_attempts,
            Duration::from_secs(self.lock_time_secs),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"authorized_identity": "Asha", "lock_time_secs": 30}"#).unwrap();

        let config = AuthConfig::load(Some(&path)).unwrap();
        assert_eq!(config.authorized_identity, "Asha");
        assert_eq!(config.lock_time_secs, 30);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_balance, 5000);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AuthConfig::load(Some(&dir.path().join("absent.json")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AuthConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_to_policy_rejects_zero_attempts() {
        let config = AuthConfig {
            max_attempts: 0,
            ..AuthConfig::default()
        };
        assert!(matches!(
            config.to_policy(),
            Err(ConfigError::Invalid(PolicyError::ZeroMaxAttempts))
        ));
    }

    #[test]
    fn test_to_policy() {
        let policy = AuthConfig::default().to_policy().unwrap();
        assert_eq!(policy.authorized_identity(), "Gopal");
        assert_eq!(policy.lock_time(), Duration::from_secs(10));
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = AuthConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert_eq!(serde_json::from_str::<AuthConfig>(&json).unwrap(), config);
    }
}
