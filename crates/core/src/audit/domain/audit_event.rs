use serde::{Deserialize, Serialize};

use crate::shared::constants::AUDIT_TIMESTAMP_FORMAT;

pub const STATUS_GRANTED: &str = "ACCESS GRANTED";
pub const STATUS_DENIED: &str = "ACCESS DENIED";
pub const STATUS_FRAUD_ALERT: &str = "FRAUD ALERT";

/// One append-only audit record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub user: String,
    pub status: String,
    pub timestamp: String,
}

impl AuditEvent {
    /// Stamped with the current local time.
    pub fn new(user: impl Into<String>, status: impl Into<String>) -> Self {
        let timestamp = chrono::Local::now()
            .format(AUDIT_TIMESTAMP_FORMAT)
            .to_string();
        Self::at(user, status, timestamp)
    }

    pub fn at(
        user: impl Into<String>,
        status: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            status: status.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn balance_check(user: &str, balance: i64) -> Self {
        Self::new(user, format!("BALANCE CHECK: {balance}"))
    }

    pub fn withdraw(user: &str, amount: i64) -> Self {
        Self::new(user, format!("WITHDRAW: {amount}"))
    }

    pub fn deposit(user: &str, amount: i64) -> Self {
        Self::new(user, format!("DEPOSIT: {amount}"))
    }
}
