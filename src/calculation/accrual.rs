//! Rest-day accrual.
//!
//! This module converts an attendance history into earned rest days and the
//! balances derived from them. Every function here is pure: it reads the
//! history it is given and nothing else, so it can be re-run after every
//! mutation without caching hazards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RosterPolicy;
use crate::models::{AttendanceCode, AttendanceRecord, Employee, REMOTE_WORK_REGIMEN, ShiftRegimen};

use super::RoundingPolicy;

/// Occurrence counts of the codes that matter for accrual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTally {
    /// Days coded `T`.
    pub onsite_work: u32,
    /// Days coded `TR`.
    pub remote_work: u32,
    /// Days coded `DL`.
    pub earned_leave: u32,
    /// Days coded `DLA`.
    pub accumulated_leave: u32,
}

impl CodeTally {
    /// Counts codes from any iterator of codes.
    pub fn from_codes<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = AttendanceCode>,
    {
        codes.into_iter().fold(Self::default(), |mut tally, code| {
            match code {
                AttendanceCode::OnSiteWork => tally.onsite_work += 1,
                AttendanceCode::RemoteWork => tally.remote_work += 1,
                AttendanceCode::EarnedLeave => tally.earned_leave += 1,
                AttendanceCode::AccumulatedLeave => tally.accumulated_leave += 1,
                _ => {}
            }
            tally
        })
    }

    /// Counts the codes of a history.
    pub fn from_history(history: &[AttendanceRecord]) -> Self {
        Self::from_codes(history.iter().map(|record| record.code))
    }
}

/// The result of an accrual computation.
///
/// The two fractional contributions are kept so callers can explain how the
/// whole-day total was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualBreakdown {
    /// The regimen used for on-site work.
    pub regimen: ShiftRegimen,
    /// On-site days counted.
    pub onsite_days: u32,
    /// Remote days counted.
    pub remote_days: u32,
    /// Rest earned by on-site work, unrounded.
    pub onsite_earned: Decimal,
    /// Rest earned by remote work, unrounded.
    pub remote_earned: Decimal,
    /// The rounded total.
    pub earned_rest_days: u32,
}

/// Computes earned rest days from a tally.
///
/// On-site days earn `rest/work` of a day each under `regimen`; remote days
/// earn under `remote` regardless of the employee's regimen. The two
/// fractions are summed exactly and rounded once with `rounding`.
///
/// # Example
///
/// ```
/// use roster_engine::calculation::{accrue, CodeTally, RoundingPolicy};
/// use roster_engine::models::{ShiftRegimen, REMOTE_WORK_REGIMEN};
///
/// let tally = CodeTally { onsite_work: 9, remote_work: 5, ..CodeTally::default() };
/// let regimen = ShiftRegimen::parse("21x7").unwrap();
///
/// let breakdown = accrue(&tally, regimen, REMOTE_WORK_REGIMEN, RoundingPolicy::HalfAwayFromZero);
/// // 9 / 3 = 3 and 5 / 2.5 = 2
/// assert_eq!(breakdown.earned_rest_days, 5);
/// ```
pub fn accrue(
    tally: &CodeTally,
    regimen: ShiftRegimen,
    remote: ShiftRegimen,
    rounding: RoundingPolicy,
) -> AccrualBreakdown {
    let onsite = u64::from(tally.onsite_work);
    let remote_days = u64::from(tally.remote_work);
    let (work, rest) = (u64::from(regimen.work_days()), u64::from(regimen.rest_days()));
    let (remote_work, remote_rest) = (u64::from(remote.work_days()), u64::from(remote.rest_days()));

    // onsite*rest/work + remote*remote_rest/remote_work over a common denominator
    let numerator = onsite * rest * remote_work + remote_days * remote_rest * work;
    let denominator = work * remote_work;
    let earned = rounding.round_ratio(numerator, denominator);

    AccrualBreakdown {
        regimen,
        onsite_days: tally.onsite_work,
        remote_days: tally.remote_work,
        onsite_earned: regimen.earned_for(tally.onsite_work),
        remote_earned: remote.earned_for(tally.remote_work),
        earned_rest_days: u32::try_from(earned).unwrap_or(u32::MAX),
    }
}

/// Earned rest days for a history under the given regimen and policy.
pub fn earned_rest_days(
    history: &[AttendanceRecord],
    regimen: ShiftRegimen,
    policy: &RosterPolicy,
) -> u32 {
    accrue(
        &CodeTally::from_history(history),
        regimen,
        REMOTE_WORK_REGIMEN,
        policy.rounding,
    )
    .earned_rest_days
}

/// Number of `DL` days in the history.
pub fn consumed_earned_leave_days(history: &[AttendanceRecord]) -> u32 {
    CodeTally::from_history(history).earned_leave
}

/// Number of `DLA` days in the history.
pub fn consumed_accumulated_leave_days(history: &[AttendanceRecord]) -> u32 {
    CodeTally::from_history(history).accumulated_leave
}

/// The net days available: `(cutoff - DLA) + earned - DL`.
///
/// Kept unrounded; the cutoff may carry a fraction.
pub fn pending_balance(
    leave_balance_cutoff: Decimal,
    earned_rest_days: u32,
    consumed_earned_leave_days: u32,
    consumed_accumulated_leave_days: u32,
) -> Decimal {
    (leave_balance_cutoff - Decimal::from(consumed_accumulated_leave_days))
        + Decimal::from(earned_rest_days)
        - Decimal::from(consumed_earned_leave_days)
}

/// Every derived balance for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualSummary {
    /// The manually set balance at the cutoff date.
    pub leave_balance_cutoff: Decimal,
    /// Rest days earned by worked days.
    pub earned_rest_days: u32,
    /// `DL` days taken.
    pub consumed_earned_leave_days: u32,
    /// `DLA` days taken.
    pub consumed_accumulated_leave_days: u32,
    /// Cutoff balance left after `DLA` days.
    pub accumulated_balance: Decimal,
    /// Days available, unrounded.
    pub pending_balance: Decimal,
}

impl AccrualSummary {
    /// Computes the summary for an employee's full history.
    pub fn compute(employee: &Employee, history: &[AttendanceRecord], policy: &RosterPolicy) -> Self {
        Self::from_tally(employee, &CodeTally::from_history(history), policy)
    }

    /// Computes the summary from an already-built tally.
    pub fn from_tally(employee: &Employee, tally: &CodeTally, policy: &RosterPolicy) -> Self {
        let regimen = employee.effective_regimen(policy.default_regimen);
        let earned = accrue(tally, regimen, REMOTE_WORK_REGIMEN, policy.rounding).earned_rest_days;
        let cutoff = employee.leave_balance_cutoff;

        Self {
            leave_balance_cutoff: cutoff,
            earned_rest_days: earned,
            consumed_earned_leave_days: tally.earned_leave,
            consumed_accumulated_leave_days: tally.accumulated_leave,
            accumulated_balance: cutoff - Decimal::from(tally.accumulated_leave),
            pending_balance: pending_balance(
                cutoff,
                earned,
                tally.earned_leave,
                tally.accumulated_leave,
            ),
        }
    }

    /// The pending balance as shown to end users: a whole number of days.
    pub fn pending_balance_display(&self) -> Decimal {
        RoundingPolicy::HalfAwayFromZero.round(self.pending_balance)
    }
}
