//! Calculation logic for the Roster Engine.
//!
//! This module contains the pure rule functions: converting an attendance
//! history into earned rest days and balances, validating leave-drawing
//! mutations against those balances, and the rounding policy applied to
//! fractional accrual totals.

mod accrual;
mod balance;
mod rounding;

pub use accrual::{
    AccrualBreakdown, AccrualSummary, CodeTally, accrue, consumed_accumulated_leave_days,
    consumed_earned_leave_days, earned_rest_days, pending_balance,
};
pub use balance::{longest_consecutive_run, validate_mutation};
pub use rounding::RoundingPolicy;
