//! Audit trail storage.

use std::sync::Mutex;

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::AuditEntry;

/// Append-only storage for audit entries.
///
/// `append` must be all-or-nothing: either every entry of the batch is
/// stored or none is and an error is returned. The service calls it before
/// committing a mutation, so a failing sink aborts the mutation.
pub trait AuditSink: Send + Sync {
    /// Appends a batch of entries atomically.
    ///
    /// # Errors
    ///
    /// Returns `AuditWriteFailure` if the batch could not be stored.
    fn append(&self, entries: &[AuditEntry]) -> EngineResult<()>;
}

/// An [`AuditSink`] kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry in append order.
    pub fn entries(&self) -> EngineResult<Vec<AuditEntry>> {
        Ok(self.lock()?.clone())
    }

    /// Entries for one employee-day, in append order.
    pub fn entries_for(&self, employee_id: &str, date: NaiveDate) -> EngineResult<Vec<AuditEntry>> {
        Ok(self
            .lock()?
            .iter()
            .filter(|e| e.employee_id == employee_id && e.date == date)
            .cloned()
            .collect())
    }

    /// Number of stored entries.
    pub fn len(&self) -> EngineResult<usize> {
        Ok(self.lock()?.len())
    }

    /// True if no entry has been stored.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> EngineResult<std::sync::MutexGuard<'_, Vec<AuditEntry>>> {
        self.entries.lock().map_err(|_| EngineError::AuditWriteFailure {
            message: "audit log lock poisoned".to_string(),
        })
    }
}

impl AuditSink for InMemoryAuditLog {
    fn append(&self, entries: &[AuditEntry]) -> EngineResult<()> {
        self.lock()?.extend_from_slice(entries);
        Ok(())
    }
}
