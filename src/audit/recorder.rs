//! Field-level change capture.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{AuditEntry, AuditField};

/// Collects the audit entries of one mutation.
///
/// Old values are captured by the caller before the mutation is applied;
/// the recorder only diffs them against the new values and stamps every
/// entry with the same actor and time.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, Utc};
/// use roster_engine::audit::AuditRecorder;
/// use roster_engine::models::AuditField;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let mut recorder = AuditRecorder::new("rquispe", Utc::now());
/// recorder.record("12345678", date, AuditField::Code, "T", "DL");
/// recorder.record("12345678", date, AuditField::Note, "", "");
///
/// let entries = recorder.finish();
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].old_value, "T");
/// ```
#[derive(Debug)]
pub struct AuditRecorder {
    actor: String,
    at: DateTime<Utc>,
    entries: Vec<AuditEntry>,
}

impl AuditRecorder {
    /// Starts a recorder for one mutation by `actor` at `at`.
    pub fn new(actor: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            actor: actor.into(),
            at,
            entries: Vec::new(),
        }
    }

    /// Records a change of `field`, or nothing if the value did not change.
    ///
    /// Returns true if an entry was added.
    pub fn record(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
        field: AuditField,
        old_value: &str,
        new_value: &str,
    ) -> bool {
        if old_value == new_value {
            return false;
        }

        self.entries.push(AuditEntry {
            id: Uuid::new_v4(),
            employee_id: employee_id.to_string(),
            date,
            field,
            old_value: old_value.to_string(),
            new_value: new_value.to_string(),
            actor: self.actor.clone(),
            recorded_at: self.at,
        });
        true
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the collected entries in recording order.
    pub fn finish(self) -> Vec<AuditEntry> {
        self.entries
    }
}
