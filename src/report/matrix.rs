//! Month-wide roster matrix.
//!
//! One row per employee, one cell per calendar day of the month, plus the
//! accrual totals. Totals are computed over the employee's whole history;
//! the cells only show the requested month.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculation::{AccrualSummary, CodeTally, accrue};
use crate::config::RosterPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceCode, AttendanceRecord, Employee, EntryState, REMOTE_WORK_REGIMEN, ShiftRegimen,
};

/// Which employees appear in the matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixFilter {
    /// Skip employees that are not active.
    #[serde(default = "default_active_only")]
    pub active_only: bool,
    /// Case-insensitive substring matched against document number and name.
    #[serde(default)]
    pub search: Option<String>,
}

fn default_active_only() -> bool {
    true
}

impl Default for MatrixFilter {
    fn default() -> Self {
        Self {
            active_only: true,
            search: None,
        }
    }
}

impl MatrixFilter {
    /// Every employee, active or not.
    pub fn all() -> Self {
        Self {
            active_only: false,
            search: None,
        }
    }

    /// Returns a copy that also matches `search`.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// True if `employee` passes the filter.
    pub fn matches(&self, employee: &Employee) -> bool {
        if self.active_only && !employee.is_active() {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                employee.id.to_lowercase().contains(&needle)
                    || employee.full_name.to_lowercase().contains(&needle)
            }
        }
    }
}

/// One day of one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixCell {
    /// The day.
    pub date: NaiveDate,
    /// The recorded code; `None` for a day with no record.
    pub code: Option<AttendanceCode>,
    /// The record's state; `None` for a day with no record.
    pub state: Option<EntryState>,
}

/// One employee's month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRow {
    /// Document number.
    pub employee_id: String,
    /// Full name.
    pub full_name: String,
    /// The regimen used for accrual.
    pub regimen: ShiftRegimen,
    /// One cell per day of the month, in order.
    pub cells: Vec<MatrixCell>,
    /// Code counts within the month.
    pub month_tally: CodeTally,
    /// Rest days earned by the month's work alone.
    pub earned_in_month: u32,
    /// All-time balances.
    pub summary: AccrualSummary,
}

/// A month of roster rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMatrix {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-based.
    pub month: u32,
    /// Every day of the month, in order.
    pub days: Vec<NaiveDate>,
    /// Rows ordered by full name.
    pub rows: Vec<MatrixRow>,
}

/// Builds [`RosterMatrix`] reports. Read-only.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use roster_engine::config::RosterPolicy;
/// use roster_engine::models::Employee;
/// use roster_engine::report::MatrixBuilder;
///
/// let policy = RosterPolicy::default();
/// let employees = vec![Employee::new("12345678", "QUISPE MAMANI, ROSA")];
///
/// let matrix = MatrixBuilder::new(&policy)
///     .build(&employees, &HashMap::new(), 2026, 2)
///     .unwrap();
/// assert_eq!(matrix.days.len(), 28);
/// assert!(matrix.rows[0].cells.iter().all(|c| c.code.is_none()));
/// ```
#[derive(Debug, Clone)]
pub struct MatrixBuilder<'a> {
    policy: &'a RosterPolicy,
    filter: MatrixFilter,
}

impl<'a> MatrixBuilder<'a> {
    /// A builder with the default filter (active employees only).
    pub fn new(policy: &'a RosterPolicy) -> Self {
        Self {
            policy,
            filter: MatrixFilter::default(),
        }
    }

    /// Replaces the filter.
    pub fn with_filter(mut self, filter: MatrixFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Builds the matrix for `year`/`month`.
    ///
    /// `histories` maps employee ids to their full history; an employee
    /// missing from it has an empty history.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` if `month` is not 1 to 12 or the year is out of range.
    pub fn build(
        &self,
        employees: &[Employee],
        histories: &HashMap<String, Vec<AttendanceRecord>>,
        year: i32,
        month: u32,
    ) -> EngineResult<RosterMatrix> {
        let days = month_days(year, month)?;

        let mut rows: Vec<MatrixRow> = employees
            .iter()
            .filter(|employee| self.filter.matches(employee))
            .map(|employee| {
                let history = histories
                    .get(&employee.id)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                self.build_row(employee, history, &days)
            })
            .collect();

        rows.sort_by(|a, b| {
            a.full_name
                .cmp(&b.full_name)
                .then_with(|| a.employee_id.cmp(&b.employee_id))
        });

        debug!(year, month, rows = rows.len(), "Built roster matrix");

        Ok(RosterMatrix {
            year,
            month,
            days,
            rows,
        })
    }

    /// Builds a single row; `days` must be the days of one month.
    pub fn build_row(
        &self,
        employee: &Employee,
        history: &[AttendanceRecord],
        days: &[NaiveDate],
    ) -> MatrixRow {
        let by_date: HashMap<NaiveDate, &AttendanceRecord> =
            history.iter().map(|r| (r.date, r)).collect();

        let cells: Vec<MatrixCell> = days
            .iter()
            .map(|date| {
                let record = by_date.get(date);
                MatrixCell {
                    date: *date,
                    code: record.map(|r| r.code),
                    state: record.map(|r| r.state),
                }
            })
            .collect();

        let month_tally = CodeTally::from_codes(cells.iter().filter_map(|c| c.code));
        let regimen = employee.effective_regimen(self.policy.default_regimen);
        let earned_in_month = accrue(
            &month_tally,
            regimen,
            REMOTE_WORK_REGIMEN,
            self.policy.rounding,
        )
        .earned_rest_days;

        MatrixRow {
            employee_id: employee.id.clone(),
            full_name: employee.full_name.clone(),
            regimen,
            cells,
            month_tally,
            earned_in_month,
            summary: AccrualSummary::compute(employee, history, self.policy),
        }
    }
}

/// Every calendar day of `year`/`month`.
///
/// # Errors
///
/// `InvalidFormat` for a month outside 1 to 12 or an unrepresentable year.
pub fn month_days(year: i32, month: u32) -> EngineResult<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| EngineError::InvalidFormat {
        field: "month".to_string(),
        value: format!("{year}-{month}"),
        message: "expected a month between 1 and 12".to_string(),
    })?;

    Ok(first
        .iter_days()
        .take_while(|d| d.month() == month)
        .collect())
}
