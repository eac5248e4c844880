use crate::audit::domain::audit_event::AuditEvent;
use crate::audit::domain::audit_sink::AuditSink;

/// Writes audit events through the `log` facade under the `audit` target.
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn append(&mut self, event: AuditEvent) {
        log::info!(
            target: "audit",
            "[AUDIT] user={} status={} timestamp={}",
            event.user,
            event.status,
            event.timestamp
        );
    }
}
