//! Error types for the Roster Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every terminal outcome of a roster operation. None of them is retried
//! by the engine; the caller decides how to present them.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which leave balance a rejected mutation would have overdrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveKind {
    /// The fixed balance recorded at the cutoff date, drawn by `DLA`.
    Accumulated,
    /// The pending balance (cutoff + earned - consumed), drawn by `DL`.
    Earned,
}

impl std::fmt::Display for LeaveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaveKind::Accumulated => write!(f, "accumulated"),
            LeaveKind::Earned => write!(f, "pending"),
        }
    }
}

/// The main error type for the Roster Engine.
///
/// # Example
///
/// ```
/// use roster_engine::error::EngineError;
///
/// let error = EngineError::ConsecutiveLimitExceeded {
///     run_length: 8,
///     limit: 7,
/// };
/// assert_eq!(
///     error.to_string(),
///     "Maximum 7 consecutive accumulated-leave days exceeded: run of 8 days"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A value supplied by the caller has the wrong shape.
    #[error("Invalid {field} '{value}': {message}")]
    InvalidFormat {
        /// The field or concept that was malformed (e.g. "shift regimen").
        field: String,
        /// The offending input.
        value: String,
        /// What was expected instead.
        message: String,
    },

    /// The actor may not perform the operation on this employee or date.
    #[error("Permission denied for '{actor}' on employee '{employee_id}' at {date}: {reason}")]
    PermissionDenied {
        /// The acting user.
        actor: String,
        /// The employee whose roster was targeted.
        employee_id: String,
        /// The targeted day.
        date: NaiveDate,
        /// Why the request was refused.
        reason: String,
    },

    /// Applying the mutation would leave a leave balance negative.
    #[error("Insufficient {kind} balance: would-be balance {}", display_balance(.kind, .balance))]
    InsufficientBalance {
        /// The balance that would be overdrawn.
        kind: LeaveKind,
        /// The unrounded balance the mutation would produce.
        balance: Decimal,
    },

    /// Applying the mutation would create an overlong run of `DLA` days.
    #[error("Maximum {limit} consecutive accumulated-leave days exceeded: run of {run_length} days")]
    ConsecutiveLimitExceeded {
        /// The longest run found with the candidate date included.
        run_length: usize,
        /// The configured maximum run.
        limit: usize,
    },

    /// A record already exists for this employee and date.
    #[error("Duplicate roster record for employee '{employee_id}' on {date}")]
    DuplicateRecord {
        /// The employee.
        employee_id: String,
        /// The date that already carries a record.
        date: NaiveDate,
    },

    /// The audit trail could not be written; nothing was committed.
    #[error("Audit write failed: {message}")]
    AuditWriteFailure {
        /// A description of the storage failure.
        message: String,
    },

    /// The record is not in a state that allows the requested transition.
    #[error("Cannot {action} record for employee '{employee_id}' on {date}: state is {from}")]
    InvalidStateTransition {
        /// The employee.
        employee_id: String,
        /// The record's date.
        date: NaiveDate,
        /// The record's current state.
        from: String,
        /// The attempted transition (e.g. "approve").
        action: String,
    },

    /// No record exists for this employee and date.
    #[error("No roster record for employee '{employee_id}' on {date}")]
    RecordNotFound {
        /// The employee.
        employee_id: String,
        /// The requested date.
        date: NaiveDate,
    },

    /// The employee is unknown to the engine.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The requested employee identifier.
        employee_id: String,
    },

    /// The day precedes the employee's hire date.
    #[error("Cannot record {date} for employee '{employee_id}': before hire date {hire_date}")]
    OutsideEmployment {
        /// The employee.
        employee_id: String,
        /// The requested date.
        date: NaiveDate,
        /// The employee's hire date.
        hire_date: NaiveDate,
    },

    /// The in-memory store could not be accessed.
    #[error("Roster store unavailable: {message}")]
    StoreUnavailable {
        /// A description of the failure.
        message: String,
    },
}

/// Pending balances are shown as whole days; accumulated balances keep their decimals.
fn display_balance(kind: &LeaveKind, balance: &Decimal) -> String {
    match kind {
        LeaveKind::Earned => balance
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_string(),
        LeaveKind::Accumulated => balance.normalize().to_string(),
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
