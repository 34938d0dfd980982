//! Shift regimen model.
//!
//! A shift regimen is the work:rest ratio (written "NxM", e.g. "21x7") that
//! governs how many rest days on-site work earns.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Largest value accepted for either side of a regimen.
pub const MAX_REGIMEN_DAYS: u32 = 31;

/// The regimen applied when an employee has none configured or it cannot be
/// parsed: 21 days on, 7 days off (3 worked days earn 1 rest day).
pub const DEFAULT_SHIFT_REGIMEN: ShiftRegimen = ShiftRegimen {
    work_days: 21,
    rest_days: 7,
};

/// The fixed ratio for remote work: 5 worked days earn 2 rest days,
/// regardless of the employee's own regimen.
pub const REMOTE_WORK_REGIMEN: ShiftRegimen = ShiftRegimen {
    work_days: 5,
    rest_days: 2,
};

/// A work:rest day ratio.
///
/// Serialized as its compact "NxM" notation.
///
/// # Examples
///
/// ```
/// use roster_engine::models::ShiftRegimen;
///
/// let regimen = ShiftRegimen::parse("14x7").unwrap();
/// assert_eq!(regimen.work_days(), 14);
/// assert_eq!(regimen.rest_days(), 7);
/// assert_eq!(regimen.to_string(), "14x7");
///
/// assert!(ShiftRegimen::parse("0x7").is_err());
/// assert!(ShiftRegimen::parse("40x2").is_err());
/// assert!(ShiftRegimen::parse("abc").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShiftRegimen {
    work_days: u32,
    rest_days: u32,
}

impl ShiftRegimen {
    /// Creates a regimen, checking both sides are within `1..=31`.
    pub fn new(work_days: u32, rest_days: u32) -> EngineResult<Self> {
        let notation = format!("{}x{}", work_days, rest_days);
        check_days(&notation, "work", work_days)?;
        check_days(&notation, "rest", rest_days)?;
        Ok(Self {
            work_days,
            rest_days,
        })
    }

    /// Parses the "NxM" notation.
    ///
    /// Surrounding whitespace is ignored. Each side must be one or two
    /// decimal digits with a value between 1 and 31; anything else fails
    /// with [`EngineError::InvalidFormat`].
    pub fn parse(notation: &str) -> EngineResult<Self> {
        let trimmed = notation.trim();
        let (work, rest) = trimmed
            .split_once('x')
            .ok_or_else(|| invalid(notation, "expected the form NxM, e.g. 21x7"))?;

        let work_days = parse_side(notation, work)?;
        let rest_days = parse_side(notation, rest)?;

        check_days(notation, "work", work_days)?;
        check_days(notation, "rest", rest_days)?;

        Ok(Self {
            work_days,
            rest_days,
        })
    }

    /// Days worked per cycle.
    pub fn work_days(&self) -> u32 {
        self.work_days
    }

    /// Days of rest per cycle.
    pub fn rest_days(&self) -> u32 {
        self.rest_days
    }

    /// Rest days earned by `worked` days under this ratio, unrounded.
    ///
    /// ```
    /// use roster_engine::models::ShiftRegimen;
    /// use rust_decimal::Decimal;
    ///
    /// let regimen = ShiftRegimen::parse("21x7").unwrap();
    /// assert_eq!(regimen.earned_for(6), Decimal::from(2));
    /// ```
    pub fn earned_for(&self, worked: u32) -> Decimal {
        Decimal::from(u64::from(worked) * u64::from(self.rest_days))
            / Decimal::from(self.work_days)
    }

    /// True when the regimen has more rest than work days, which is legal
    /// but almost always a data-entry mistake.
    pub fn is_unusual(&self) -> bool {
        self.work_days < self.rest_days
    }
}

fn invalid(notation: &str, message: &str) -> EngineError {
    EngineError::InvalidFormat {
        field: "shift regimen".to_string(),
        value: notation.to_string(),
        message: message.to_string(),
    }
}

fn parse_side(notation: &str, side: &str) -> EngineResult<u32> {
    if side.is_empty() || side.len() > 2 || !side.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(notation, "expected the form NxM, e.g. 21x7"));
    }
    side.parse::<u32>()
        .map_err(|_| invalid(notation, "expected the form NxM, e.g. 21x7"))
}

fn check_days(notation: &str, side: &str, days: u32) -> EngineResult<()> {
    if days == 0 || days > MAX_REGIMEN_DAYS {
        return Err(invalid(
            notation,
            &format!("{} days must be between 1 and {}", side, MAX_REGIMEN_DAYS),
        ));
    }
    Ok(())
}

impl std::fmt::Display for ShiftRegimen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.work_days, self.rest_days)
    }
}

impl std::str::FromStr for ShiftRegimen {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShiftRegimen {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShiftRegimen> for String {
    fn from(regimen: ShiftRegimen) -> Self {
        regimen.to_string()
    }
}
