//! Audit trail for roster changes.
//!
//! Every committed mutation produces one [`AuditEntry`](crate::models::AuditEntry)
//! per changed field. [`AuditRecorder`] builds the entries; an [`AuditSink`]
//! stores them before the mutation is committed.

mod recorder;
mod sink;

pub use recorder::AuditRecorder;
pub use sink::{AuditSink, InMemoryAuditLog};
