pub mod audit_event;
pub mod audit_sink;
