//! Cloud audit sink writing to a Firestore collection through the REST API.
//!
//! Each event becomes one auto-id document in `login_logs` with string
//! fields `user`, `status` and `timestamp`.
use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::audit::domain::audit_event::AuditEvent;
use crate::audit::domain::audit_sink::AuditSink;
use crate::shared::constants::AUDIT_COLLECTION;

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const PROJECT_ID_ENV: &str = "FIREBASE_PROJECT_ID";
pub const ACCESS_TOKEN_ENV: &str = "FIREBASE_ACCESS_TOKEN";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FirestoreConfigError {
    #[error("Firestore audit needs a project id (--firestore-project or {PROJECT_ID_ENV})")]
    MissingProjectId,
    #[error("Firestore audit needs an access token in {ACCESS_TOKEN_ENV}")]
    MissingAccessToken,
}

#[derive(Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    /// OAuth2 bearer token with Firestore write scope. Short-lived.
    pub access_token: String,
}

impl fmt::Debug for FirestoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirestoreConfig")
            .field("project_id", &self.project_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl FirestoreConfig {
    /// Reads `FIREBASE_ACCESS_TOKEN`, and `FIREBASE_PROJECT_ID` unless a
    /// project is given.
    pub fn from_env(project_id: Option<String>) -> Result<Self, FirestoreConfigError> {
        Self::from_vars(project_id, |name| std::env::var(name).ok())
    }

    fn from_vars(
        project_id: Option<String>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, FirestoreConfigError> {
        let project_id = project_id
            .or_else(|| var(PROJECT_ID_ENV))
            .filter(|p| !p.is_empty())
            .ok_or(FirestoreConfigError::MissingProjectId)?;
        let access_token = var(ACCESS_TOKEN_ENV)
            .filter(|t| !t.is_empty())
            .ok_or(FirestoreConfigError::MissingAccessToken)?;
        Ok(Self {
            project_id,
            access_token,
        })
    }

    fn documents_url(&self, base_url: &str) -> String {
        format!(
            "{base_url}/projects/{}/databases/(default)/documents/{AUDIT_COLLECTION}",
            self.project_id
        )
    }
}

pub struct FirestoreAuditSink {
    config: FirestoreConfig,
    base_url: String,
    http: reqwest::blocking::Client,
}

impl FirestoreAuditSink {
    pub fn new(config: FirestoreConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        log::info!(
            "Audit events go to Firestore project {} ({AUDIT_COLLECTION})",
            config.project_id
        );
        Ok(Self {
            config,
            base_url: FIRESTORE_BASE_URL.to_string(),
            http,
        })
    }

    fn post(&self, event: &AuditEvent) -> Result<(), reqwest::Error> {
        self.http
            .post(self.config.documents_url(&self.base_url))
            .bearer_auth(&self.config.access_token)
            .json(&document_body(event))
            .send()?
            .error_for_status()?;
        Ok(())
    }
}

impl AuditSink for FirestoreAuditSink {
    fn append(&mut self, event: AuditEvent) {
        match self.post(&event) {
            Ok(()) => {}
            Err(e) if e.status() == Some(reqwest::StatusCode::UNAUTHORIZED) => {
                log::warn!(
                    "Audit event {:?} rejected: access token expired or invalid",
                    event.status
                );
            }
            Err(e) => log::warn!("Failed to write audit event {:?}: {e}", event.status),
        }
    }
}

fn document_body(event: &AuditEvent) -> serde_json::Value {
    serde_json::json!({
        "fields": {
            "user": { "stringValue": event.user },
            "status": { "stringValue": event.status },
            "timestamp": { "stringValue": event.timestamp },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FirestoreConfig {
        FirestoreConfig {
            project_id: "facebank-demo".into(),
            access_token: "token".into(),
        }
    }

    #[test]
    fn test_documents_url() {
        assert_eq!(
            config().documents_url(FIRESTORE_BASE_URL),
            "https://firestore.googleapis.com/v1/projects/facebank-demo/databases/(default)/documents/login_logs"
        );
    }

    fn env(name: &str) -> Option<String> {
        match name {
            PROJECT_ID_ENV => Some("env-project".into()),
            ACCESS_TOKEN_ENV => Some("secret-token".into()),
            _ => None,
        }
    }

    #[test]
    fn test_from_vars_prefers_explicit_project() {
        let config = FirestoreConfig::from_vars(Some("cli-project".into()), env).unwrap();
        assert_eq!(config.project_id, "cli-project");
        assert_eq!(config.access_token, "secret-token");

        let config = FirestoreConfig::from_vars(None, env).unwrap();
        assert_eq!(config.project_id, "env-project");
    }

    #[test]
    fn test_from_vars_reports_missing_values() {
        assert_eq!(
            FirestoreConfig::from_vars(None, |_| None).unwrap_err(),
            FirestoreConfigError::MissingProjectId
        );
        assert_eq!(
            FirestoreConfig::from_vars(Some("p".into()), |_| Some(String::new())).unwrap_err(),
            FirestoreConfigError::MissingAccessToken
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let printed = format!("{:?}", FirestoreConfig::from_vars(None, env).unwrap());
        assert!(printed.contains("env-project"));
        assert!(!printed.contains("secret-token"));
    }

    #[test]
    fn test_document_body_uses_string_values() {
        let event = AuditEvent::at("Gopal", "ACCESS GRANTED", "2024-05-01 10:00:00");
        let body = document_body(&event);
        assert_eq!(body["fields"]["user"]["stringValue"], "Gopal");
        assert_eq!(body["fields"]["status"]["stringValue"], "ACCESS GRANTED");
        assert_eq!(
            body["fields"]["timestamp"]["stringValue"],
            "2024-05-01 10:00:00"
        );
    }

    #[test]
    fn test_append_swallows_delivery_failure() {
        let mut sink = FirestoreAuditSink::new(config()).unwrap();
        // nothing listens on port 1
        sink.base_url = "http://127.0.0.1:1/v1".into();
        sink.append(AuditEvent::at("Unknown", "ACCESS DENIED", "t"));
    }
}
