use std::time::Instant;

use crate::audit::domain::audit_event::{
    AuditEvent, STATUS_DENIED, STATUS_FRAUD_ALERT, STATUS_GRANTED,
};
use crate::audit::domain::audit_sink::AuditSink;
use crate::recognition::domain::face_sample::FaceSample;
use crate::recognition::domain::identity_oracle::{Identification, IdentityOracle};
use crate::shared::constants::UNKNOWN_USER;
use crate::shared::frame::Frame;
use crate::shared::region::FaceRegion;

use super::auth_policy::AuthPolicy;
use super::auth_state::{AuthState, Verdict};

/// Result of evaluating one face.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub verdict: Verdict,
    /// Consecutive failures after this evaluation.
    pub failed_attempts: u32,
    /// `None` when the oracle was skipped because the machine is locked.
    pub identification: Option<Identification>,
}

impl Evaluation {
    /// Overlay text for this face.
    pub fn label(&self) -> String {
        match self.verdict {
            Verdict::Granted => STATUS_GRANTED.to_string(),
            Verdict::Denied => format!("{STATUS_DENIED} ({})", self.failed_attempts),
            Verdict::Locked => format!("{STATUS_FRAUD_ALERT} - SYSTEM LOCKED"),
        }
    }
}

/// Lockout state machine. Sole owner and writer of [`AuthState`].
///
/// Each located face goes through [`Authenticator::evaluate`]:
///
/// 1. An expired lock is cleared first (back to zero failures).
/// 2. While locked, the verdict is `Locked` and the oracle is not consulted.
/// 3. Otherwise the face is normalized and classified. A unanimous match on
///    the authorized identity grants access and clears the failure count;
///    anything else counts as a failure, and reaching the limit locks.
pub struct Authenticator {
    policy: AuthPolicy,
    state: AuthState,
    last_verdict: Option<Verdict>,
}

impl Authenticator {
    pub fn new(policy: AuthPolicy) -> Self {
        Self {
            policy,
            state: AuthState::default(),
            last_verdict: None,
        }
    }

    pub fn policy(&self) -> &AuthPolicy {
        &self.policy
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn last_verdict(&self) -> Option<Verdict> {
        self.last_verdict
    }

    /// The session menu may open only right after a grant, while unlocked.
    pub fn is_session_allowed(&self) -> bool {
        self.last_verdict == Some(Verdict::Granted) && !self.state.is_locked()
    }

    /// Evaluate one face region of `frame` at time `now`.
    ///
    /// Oracle or normalization errors leave the state untouched.
    pub fn evaluate(
        &mut self,
        frame: &Frame,
        region: &FaceRegion,
        now: Instant,
        oracle: &mut dyn IdentityOracle,
        audit: &mut dyn AuditSink,
    ) -> Result<Evaluation, Box<dyn std::error::Error>> {
        if self.state.lock_expired(now, self.policy.lock_time()) {
            log::info!("Lock expired, accepting attempts again");
            self.state = AuthState::default();
        }

        let failed_attempts = match self.state {
            AuthState::Locked {
                failed_attempts, ..
            } => {
                self.last_verdict = Some(Verdict::Locked);
                return Ok(Evaluation {
                    verdict: Verdict::Locked,
                    failed_attempts,
                    identification: None,
                });
            }
            AuthState::Unlocked { failed_attempts } => failed_attempts,
        };

        let sample = FaceSample::from_frame(frame, region)?;
        let identification = oracle.classify(&sample)?;
        let authorized = self.policy.authorized_identity().to_string();

        let evaluation = if identification.is(&authorized) {
            log::info!("Access granted to {authorized}");
            self.state = AuthState::Unlocked { failed_attempts: 0 };
            audit.append(AuditEvent::new(authorized, STATUS_GRANTED));
            Evaluation {
                verdict: Verdict::Granted,
                failed_attempts: 0,
                identification: Some(identification),
            }
        } else {
            let failed_attempts = failed_attempts.saturating_add(1);
            match &identification {
                Identification::Unanimous(other) => {
                    log::info!("Access denied ({failed_attempts}): recognised {other}")
                }
                Identification::Split(predictions) => {
                    log::info!("Access denied ({failed_attempts}): classifiers split {predictions:?}")
                }
            }
            audit.append(AuditEvent::new(UNKNOWN_USER, STATUS_DENIED));

            let verdict = if failed_attempts >= self.policy.max_attempts() {
                log::warn!(
                    "{failed_attempts} failed attempts, locking for {:?}",
                    self.policy.lock_time()
                );
                self.state = AuthState::Locked {
                    since: now,
                    failed_attempts,
                };
                audit.append(AuditEvent::new(UNKNOWN_USER, STATUS_FRAUD_ALERT));
                Verdict::Locked
            } else {
                self.state = AuthState::Unlocked { failed_attempts };
                Verdict::Denied
            };
            Evaluation {
                verdict,
                failed_attempts,
                identification: Some(identification),
            }
        };

        self.last_verdict = Some(evaluation.verdict);
        Ok(evaluation)
    }
}
