//! Configuration types for the roster engine.
//!
//! This module contains the strongly-typed policy structure that is
//! deserialized from the YAML configuration file.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculation::RoundingPolicy;
use crate::models::{DEFAULT_SHIFT_REGIMEN, ShiftRegimen};

/// Default maximum run of consecutive accumulated-leave days.
pub const DEFAULT_MAX_CONSECUTIVE_ACCUMULATED_LEAVE: usize = 7;

/// Default earliest date non-administrators may edit.
pub fn default_go_live_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn default_regimen() -> ShiftRegimen {
    DEFAULT_SHIFT_REGIMEN
}

fn default_max_consecutive() -> usize {
    DEFAULT_MAX_CONSECUTIVE_ACCUMULATED_LEAVE
}

/// The business policy the engine enforces.
///
/// Every field has a default, so an empty `policy.yaml` yields
/// [`RosterPolicy::default`]. Remote work always accrues at
/// [`REMOTE_WORK_REGIMEN`](crate::models::REMOTE_WORK_REGIMEN) and is not
/// configurable; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RosterPolicy {
    /// Earliest date non-administrators may edit.
    #[serde(default = "default_go_live_date")]
    pub go_live_date: NaiveDate,
    /// Regimen used when an employee has none or it does not parse.
    #[serde(default = "default_regimen")]
    pub default_regimen: ShiftRegimen,
    /// Longest allowed run of consecutive accumulated-leave days.
    #[serde(default = "default_max_consecutive")]
    pub max_consecutive_accumulated_leave: usize,
    /// How fractional earned-rest totals are rounded.
    #[serde(default)]
    pub rounding: RoundingPolicy,
}

impl Default for RosterPolicy {
    fn default() -> Self {
        Self {
            go_live_date: default_go_live_date(),
            default_regimen: DEFAULT_SHIFT_REGIMEN,
            max_consecutive_accumulated_leave: DEFAULT_MAX_CONSECUTIVE_ACCUMULATED_LEAVE,
            rounding: RoundingPolicy::default(),
        }
    }
}
