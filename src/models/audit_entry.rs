//! Audit entry model.
//!
//! Audit entries are append-only: the engine creates them and never changes
//! or deletes them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The record field an audit entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditField {
    /// The attendance code.
    Code,
    /// The free-text note.
    Note,
    /// The approval state.
    State,
}

impl std::fmt::Display for AuditField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditField::Code => write!(f, "code"),
            AuditField::Note => write!(f, "note"),
            AuditField::State => write!(f, "state"),
        }
    }
}

/// One field-level change to one employee-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique identifier for this entry.
    pub id: Uuid,
    /// The employee whose roster changed.
    pub employee_id: String,
    /// The roster day that changed.
    pub date: NaiveDate,
    /// The field that changed.
    pub field: AuditField,
    /// Value before the change; empty when the record was created.
    pub old_value: String,
    /// Value after the change.
    pub new_value: String,
    /// The user who made the change.
    pub actor: String,
    /// When the change was recorded.
    pub recorded_at: DateTime<Utc>,
}
