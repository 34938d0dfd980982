//! Attendance records and the closed attendance-code set.
//!
//! Each (employee, date) pair carries at most one [`AttendanceRecord`]. The
//! record's [`AttendanceCode`] drives accrual; its [`EntryState`] tracks the
//! approval lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The code recorded for one employee-day.
///
/// Codes are parsed case-insensitively and normalized to their uppercase
/// short form, which is also how they serialize.
///
/// # Example
///
/// ```
/// use roster_engine::models::AttendanceCode;
///
/// let code: AttendanceCode = " dla ".parse().unwrap();
/// assert_eq!(code, AttendanceCode::AccumulatedLeave);
/// assert_eq!(code.to_string(), "DLA");
/// assert!("XYZ".parse::<AttendanceCode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttendanceCode {
    /// On-site work; accrues under the employee's regimen.
    #[serde(rename = "T")]
    OnSiteWork,
    /// Remote work; accrues at the fixed 5x2 ratio.
    #[serde(rename = "TR")]
    RemoteWork,
    /// A rest day drawn from the pending (earned) balance.
    #[serde(rename = "DL")]
    EarnedLeave,
    /// A rest day drawn from the balance held at the cutoff date.
    #[serde(rename = "DLA")]
    AccumulatedLeave,
    /// Compensation for extended hours.
    #[serde(rename = "DOL")]
    ExtendedHoursCompensation,
    /// Medical rest backed by a certificate.
    #[serde(rename = "DM")]
    MedicalRest,
    /// Approved vacation.
    #[serde(rename = "V")]
    Vacation,
    /// Non-recoverable public holiday.
    #[serde(rename = "F")]
    Holiday,
    /// Public holiday worked off on another day.
    #[serde(rename = "FC")]
    CompensableHoliday,
    /// Permission.
    #[serde(rename = "P")]
    Permission,
    /// Unjustified absence.
    #[serde(rename = "I")]
    Absence,
    /// License.
    #[serde(rename = "L")]
    License,
}

impl AttendanceCode {
    /// Every code, in catalogue order.
    pub const ALL: [AttendanceCode; 12] = [
        AttendanceCode::OnSiteWork,
        AttendanceCode::RemoteWork,
        AttendanceCode::EarnedLeave,
        AttendanceCode::AccumulatedLeave,
        AttendanceCode::ExtendedHoursCompensation,
        AttendanceCode::MedicalRest,
        AttendanceCode::Vacation,
        AttendanceCode::Holiday,
        AttendanceCode::CompensableHoliday,
        AttendanceCode::Permission,
        AttendanceCode::Absence,
        AttendanceCode::License,
    ];

    /// The uppercase short code.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceCode::OnSiteWork => "T",
            AttendanceCode::RemoteWork => "TR",
            AttendanceCode::EarnedLeave => "DL",
            AttendanceCode::AccumulatedLeave => "DLA",
            AttendanceCode::ExtendedHoursCompensation => "DOL",
            AttendanceCode::MedicalRest => "DM",
            AttendanceCode::Vacation => "V",
            AttendanceCode::Holiday => "F",
            AttendanceCode::CompensableHoliday => "FC",
            AttendanceCode::Permission => "P",
            AttendanceCode::Absence => "I",
            AttendanceCode::License => "L",
        }
    }

    /// A human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            AttendanceCode::OnSiteWork => "On-site work",
            AttendanceCode::RemoteWork => "Remote work",
            AttendanceCode::EarnedLeave => "Earned rest day",
            AttendanceCode::AccumulatedLeave => "Accumulated rest day",
            AttendanceCode::ExtendedHoursCompensation => "Extended hours compensation",
            AttendanceCode::MedicalRest => "Medical rest",
            AttendanceCode::Vacation => "Vacation",
            AttendanceCode::Holiday => "Non-recoverable holiday",
            AttendanceCode::CompensableHoliday => "Compensable holiday",
            AttendanceCode::Permission => "Permission",
            AttendanceCode::Absence => "Absence",
            AttendanceCode::License => "License",
        }
    }

    /// True for the codes that earn rest days.
    pub fn accrues_rest(&self) -> bool {
        matches!(self, AttendanceCode::OnSiteWork | AttendanceCode::RemoteWork)
    }

    /// True for the codes that draw down a leave balance.
    pub fn draws_leave(&self) -> bool {
        matches!(
            self,
            AttendanceCode::EarnedLeave | AttendanceCode::AccumulatedLeave
        )
    }
}

impl std::fmt::Display for AttendanceCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttendanceCode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        AttendanceCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == normalized)
            .ok_or_else(|| EngineError::InvalidFormat {
                field: "attendance code".to_string(),
                value: s.to_string(),
                message: format!(
                    "valid codes are {}",
                    AttendanceCode::ALL
                        .iter()
                        .map(AttendanceCode::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }
}

/// Where a record sits in the approval lifecycle.
///
/// There is no rejected state: rejecting a pending record deletes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    /// Proposed by the employee, not yet submitted.
    Draft,
    /// Submitted and awaiting a manager or administrator.
    Pending,
    /// In force.
    Approved,
}

impl std::fmt::Display for EntryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryState::Draft => write!(f, "draft"),
            EntryState::Pending => write!(f, "pending"),
            EntryState::Approved => write!(f, "approved"),
        }
    }
}

/// One employee-day on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The employee this day belongs to.
    pub employee_id: String,
    /// The calendar day.
    pub date: NaiveDate,
    /// The attendance code.
    pub code: AttendanceCode,
    /// Free-text note.
    #[serde(default)]
    pub note: String,
    /// Approval state.
    pub state: EntryState,
    /// The user who last changed the record.
    #[serde(default)]
    pub modified_by: Option<String>,
    /// The user who approved the record.
    #[serde(default)]
    pub approved_by: Option<String>,
    /// When the record was approved.
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
}

impl AttendanceRecord {
    /// Creates an approved record with no provenance, as imported history.
    ///
    /// # Example
    ///
    /// ```
    /// use roster_engine::models::{AttendanceCode, AttendanceRecord, EntryState};
    /// use chrono::NaiveDate;
    ///
    /// let record = AttendanceRecord::new(
    ///     "12345678",
    ///     NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
    ///     AttendanceCode::OnSiteWork,
    /// );
    /// assert_eq!(record.state, EntryState::Approved);
    /// ```
    pub fn new(employee_id: impl Into<String>, date: NaiveDate, code: AttendanceCode) -> Self {
        Self {
            employee_id: employee_id.into(),
            date,
            code,
            note: String::new(),
            state: EntryState::Approved,
            modified_by: None,
            approved_by: None,
            approved_at: None,
        }
    }

    /// Returns the same record in another state.
    pub fn with_state(mut self, state: EntryState) -> Self {
        self.state = state;
        self
    }

    /// True if the record awaits approval.
    pub fn is_pending(&self) -> bool {
        self.state == EntryState::Pending
    }
}

/// Parses a caller-supplied code, trimming and uppercasing it.
pub fn parse_code(raw: &str) -> EngineResult<AttendanceCode> {
    raw.parse()
}
