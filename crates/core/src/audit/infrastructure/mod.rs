pub mod firestore_audit_sink;
pub mod jsonl_audit_sink;
pub mod log_audit_sink;
