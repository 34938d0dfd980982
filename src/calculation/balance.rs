//! Leave balance validation.
//!
//! Checks run against the history with the target date's existing record
//! removed and the candidate code added back once, so editing a day to the
//! code it already has never double-counts.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::RosterPolicy;
use crate::error::{EngineError, EngineResult, LeaveKind};
use crate::models::{AttendanceCode, AttendanceRecord, Employee};

use super::accrual::{AccrualSummary, CodeTally};

/// Validates that setting `code` on `date` keeps every balance invariant.
///
/// Only `DLA` and `DL` are checked; every other code passes.
///
/// - `DLA` requires `cutoff - (DLA days + 1) >= 0` and that no run of
///   calendar-consecutive `DLA` dates, including `date`, exceeds the
///   configured limit.
/// - `DL` requires the pending balance with the new day counted to stay
///   non-negative, compared unrounded.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use roster_engine::calculation::validate_mutation;
/// use roster_engine::config::RosterPolicy;
/// use roster_engine::error::EngineError;
/// use roster_engine::models::{AttendanceCode, Employee};
///
/// let employee = Employee::new("12345678", "QUISPE MAMANI, ROSA");
/// let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
///
/// // Nothing earned and no cutoff balance: earned leave is not available.
/// let result = validate_mutation(
///     &employee,
///     &[],
///     date,
///     AttendanceCode::EarnedLeave,
///     &RosterPolicy::default(),
/// );
/// assert!(matches!(result, Err(EngineError::InsufficientBalance { .. })));
/// ```
pub fn validate_mutation(
    employee: &Employee,
    history: &[AttendanceRecord],
    date: NaiveDate,
    code: AttendanceCode,
    policy: &RosterPolicy,
) -> EngineResult<()> {
    if !code.draws_leave() {
        return Ok(());
    }

    let others: Vec<&AttendanceRecord> = history.iter().filter(|r| r.date != date).collect();
    let tally = CodeTally::from_codes(others.iter().map(|r| r.code).chain(std::iter::once(code)));

    match code {
        AttendanceCode::AccumulatedLeave => {
            let balance =
                employee.leave_balance_cutoff - Decimal::from(tally.accumulated_leave);
            if balance < Decimal::ZERO {
                warn!(
                    target: "roster::business",
                    employee_id = %employee.id,
                    %date,
                    %balance,
                    "Accumulated leave balance would go negative"
                );
                return Err(EngineError::InsufficientBalance {
                    kind: LeaveKind::Accumulated,
                    balance,
                });
            }

            let dates = others
                .iter()
                .filter(|r| r.code == AttendanceCode::AccumulatedLeave)
                .map(|r| r.date)
                .chain(std::iter::once(date));
            let run_length = longest_consecutive_run(dates);
            if run_length > policy.max_consecutive_accumulated_leave {
                warn!(
                    target: "roster::business",
                    employee_id = %employee.id,
                    %date,
                    run_length,
                    limit = policy.max_consecutive_accumulated_leave,
                    "Consecutive accumulated leave limit exceeded"
                );
                return Err(EngineError::ConsecutiveLimitExceeded {
                    run_length,
                    limit: policy.max_consecutive_accumulated_leave,
                });
            }
        }
        AttendanceCode::EarnedLeave => {
            let summary = AccrualSummary::from_tally(employee, &tally, policy);
            if summary.pending_balance < Decimal::ZERO {
                warn!(
                    target: "roster::business",
                    employee_id = %employee.id,
                    %date,
                    balance = %summary.pending_balance,
                    "Pending balance would go negative"
                );
                return Err(EngineError::InsufficientBalance {
                    kind: LeaveKind::Earned,
                    balance: summary.pending_balance,
                });
            }
        }
        _ => {}
    }

    debug!(employee_id = %employee.id, %date, %code, "Leave mutation validated");
    Ok(())
}

/// Length of the longest run of calendar-consecutive dates.
///
/// Duplicates are ignored; an empty input yields 0.
pub fn longest_consecutive_run<I>(dates: I) -> usize
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut sorted: Vec<NaiveDate> = dates.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<NaiveDate> = None;

    for date in sorted {
        current = match previous {
            Some(prev) if date - prev == Duration::days(1) => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(date);
    }

    longest
}
