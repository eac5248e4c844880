use super::audit_event::AuditEvent;

/// Append-only event log.
///
/// Fire-and-forget: delivery failures are the sink's concern and never
/// reach the caller.
pub trait AuditSink: Send {
    fn append(&mut self, event: AuditEvent);
}

/// Keeps events in memory, in append order.
#[derive(Default)]
pub struct MemoryAuditSink {
    events: Vec<AuditEvent>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    pub fn statuses(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.status.as_str()).collect()
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&mut self, event: AuditEvent) {
        self.events.push(event);
    }
}
