use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::audit::domain::audit_event::AuditEvent;
use crate::audit::domain::audit_sink::AuditSink;

/// Appends one JSON object per line to a local file. Existing content is
/// kept; each event is flushed as it is written.
pub struct JsonlAuditSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonlAuditSink {
    pub fn open(path: &Path) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        log::info!("Audit events go to {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    fn write_line(&mut self, event: &AuditEvent) -> Result<(), Box<dyn std::error::Error>> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl AuditSink for JsonlAuditSink {
    fn append(&mut self, event: AuditEvent) {
        if let Err(e) = self.write_line(&event) {
            log::warn!("Failed to append audit event to {}: {e}", self.path.display());
        }
    }
}
