use std::time::Duration;

use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_AUTHORIZED_IDENTITY, DEFAULT_LOCK_TIME_SECS, DEFAULT_MAX_ATTEMPTS,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PolicyError {
    #[error("authorized identity must not be empty")]
    EmptyIdentity,
    #[error("max attempts must be at least 1")]
    ZeroMaxAttempts,
}

/// Who may pass, how many failures are tolerated, and how long a lockout
/// lasts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthPolicy {
    authorized_identity: String,
    max_attempts: u32,
    lock_time: Duration,
}

impl AuthPolicy {
    pub fn new(
        authorized_identity: impl Into<String>,
        max_attempts: u32,
        lock_time: Duration,
    ) -> Result<Self, PolicyError> {
        let authorized_identity = authorized_identity.into();
        if authorized_identity.trim().is_empty() {
            return Err(PolicyError::EmptyIdentity);
        }
        if max_attempts == 0 {
            return Err(PolicyError::ZeroMaxAttempts);
        }
        Ok(Self {
            authorized_identity,
            max_attempts,
            lock_time,
        })
    }

    pub fn authorized_identity(&self) -> &str {
        &self.authorized_identity
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn lock_time(&self) -> Duration {
        self.lock_time
    }
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            authorized_identity: DEFAULT_AUTHORIZED_IDENTITY.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lock_time: Duration::from_secs(DEFAULT_LOCK_TIME_SECS),
        }
    }
}
