//! Log records captured before the tracing subscriber exists.
//!
//! Provisioning runs while the host is still building its configuration, so
//! records are buffered here and replayed into `tracing` once, when the host
//! signals that logging is initialized.

use tracing::{debug, error, info, warn, Level};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredRecord {
    pub level: Level,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct DeferredLog {
    records: Vec<DeferredRecord>,
    replayed: bool,
}

impl DeferredLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.record(Level::DEBUG, message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(Level::INFO, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(Level::WARN, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(Level::ERROR, message.into());
    }

    fn record(&mut self, level: Level, message: String) {
        if self.replayed {
            emit(level, &message);
        } else {
            self.records.push(DeferredRecord { level, message });
        }
    }

    pub fn records(&self) -> &[DeferredRecord] {
        &self.records
    }

    /// Emit buffered records through `tracing`; later records go straight through.
    /// Returns how many records were replayed.
    pub fn replay(&mut self) -> usize {
        if self.replayed {
            return 0;
        }
        self.replayed = true;
        let records = std::mem::take(&mut self.records);
        for record in &records {
            emit(record.level, &record.message);
        }
        records.len()
    }
}

fn emit(level: Level, message: &str) {
    if level == Level::ERROR {
        error!(target: "wavefront_provisioner::account", "{}", message);
    } else if level == Level::WARN {
        warn!(target: "wavefront_provisioner::account", "{}", message);
    } else if level == Level::INFO {
        info!(target: "wavefront_provisioner::account", "{}", message);
    } else {
        debug!(target: "wavefront_provisioner::account", "{}", message);
    }
}
