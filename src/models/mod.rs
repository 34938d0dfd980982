//! Core data models for the Roster Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod actor;
mod attendance;
mod audit_entry;
mod employee;
mod shift_regimen;

pub use actor::{Actor, Area};
pub use attendance::{AttendanceCode, AttendanceRecord, EntryState, parse_code};
pub use audit_entry::{AuditEntry, AuditField};
pub use employee::{DocumentType, Employee, EmploymentStatus};
pub use shift_regimen::{
    DEFAULT_SHIFT_REGIMEN, MAX_REGIMEN_DAYS, REMOTE_WORK_REGIMEN, ShiftRegimen,
};
