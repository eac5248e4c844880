use std::time::{Duration, Instant};

/// Lockout state. A lock always carries its start time, so "locked without
/// a start time" cannot be represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthState {
    Unlocked { failed_attempts: u32 },
    Locked { since: Instant, failed_attempts: u32 },
}

impl AuthState {
    pub fn failed_attempts(&self) -> u32 {
        match *self {
            AuthState::Unlocked { failed_attempts } | AuthState::Locked { failed_attempts, .. } => {
                failed_attempts
            }
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, AuthState::Locked { .. })
    }

    /// True once `lock_time` has fully elapsed since the lock began.
    pub fn lock_expired(&self, now: Instant, lock_time: Duration) -> bool {
        match *self {
            AuthState::Locked { since, .. } => now.saturating_duration_since(since) >= lock_time,
            AuthState::Unlocked { .. } => false,
        }
    }
}

impl Default for AuthState {
    fn default() -> Self {
        AuthState::Unlocked { failed_attempts: 0 }
    }
}

/// Access decision for one evaluated face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Granted,
    Denied,
    Locked,
}
