//! Employee model and related types.
//!
//! Employees are owned by the HR domain. The engine reads them but never
//! changes them; `leave_balance_cutoff` in particular is set by hand and is
//! never derived.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};

use super::ShiftRegimen;

/// Represents the employment status of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    /// Currently employed and rostered.
    Active,
    /// Temporarily not rostered.
    Inactive,
    /// Suspended from duty.
    Suspended,
    /// Employment has ended.
    Terminated,
}

/// The kind of identity document the employee id was issued from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// National identity card: exactly 8 digits.
    #[default]
    Dni,
    /// Foreigner's card: 9 to 12 digits.
    Ce,
    /// Passport: 5 to 20 characters.
    Passport,
}

impl DocumentType {
    /// Checks that `number` has the shape this document type requires.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_engine::models::DocumentType;
    ///
    /// assert!(DocumentType::Dni.validate("12345678").is_ok());
    /// assert!(DocumentType::Dni.validate("1234").is_err());
    /// assert!(DocumentType::Ce.validate("123456789").is_ok());
    /// assert!(DocumentType::Passport.validate("ABCD12345").is_ok());
    /// ```
    pub fn validate(&self, number: &str) -> EngineResult<()> {
        let number = number.trim();
        let all_digits = !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit());

        let (ok, message) = match self {
            DocumentType::Dni => (
                all_digits && number.len() == 8,
                "a DNI must have exactly 8 digits",
            ),
            DocumentType::Ce => (
                all_digits && (9..=12).contains(&number.len()),
                "a CE must have between 9 and 12 digits",
            ),
            DocumentType::Passport => (
                (5..=20).contains(&number.chars().count()),
                "a passport number must have between 5 and 20 characters",
            ),
        };

        if ok {
            Ok(())
        } else {
            Err(EngineError::InvalidFormat {
                field: "document number".to_string(),
                value: number.to_string(),
                message: message.to_string(),
            })
        }
    }
}

/// Represents an employee whose roster is tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Document number; unique and immutable once issued.
    pub id: String,
    /// The kind of document `id` was issued from.
    #[serde(default)]
    pub document_type: DocumentType,
    /// Full name, surnames first.
    pub full_name: String,
    /// Employment status.
    pub status: EmploymentStatus,
    /// Configured shift regimen in "NxM" notation, if any.
    #[serde(default)]
    pub shift_regimen: Option<String>,
    /// Accumulated leave as of the fixed cutoff date.
    pub leave_balance_cutoff: Decimal,
    /// First day of employment; no roster day may precede it.
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
}

impl Employee {
    /// An active DNI holder with no regimen, no hire date and a zero cutoff.
    pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            document_type: DocumentType::Dni,
            full_name: full_name.into(),
            status: EmploymentStatus::Active,
            shift_regimen: None,
            leave_balance_cutoff: Decimal::ZERO,
            hire_date: None,
        }
    }

    /// Returns true if the employee is currently active.
    pub fn is_active(&self) -> bool {
        self.status == EmploymentStatus::Active
    }

    /// Parses the configured regimen, if any.
    ///
    /// A blank string counts as absent.
    pub fn shift_regimen(&self) -> EngineResult<Option<ShiftRegimen>> {
        match self.shift_regimen.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(notation) => ShiftRegimen::parse(notation).map(Some),
        }
    }

    /// Returns the regimen used for accrual, falling back to `default` when
    /// the employee has none or it does not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_engine::models::{
    ///     DEFAULT_SHIFT_REGIMEN, DocumentType, Employee, EmploymentStatus, ShiftRegimen,
    /// };
    /// use rust_decimal::Decimal;
    ///
    /// let mut employee = Employee {
    ///     id: "12345678".to_string(),
    ///     document_type: DocumentType::Dni,
    ///     full_name: "QUISPE MAMANI, ROSA".to_string(),
    ///     status: EmploymentStatus::Active,
    ///     shift_regimen: Some("14x7".to_string()),
    ///     leave_balance_cutoff: Decimal::ZERO,
    ///     hire_date: None,
    /// };
    /// assert_eq!(
    ///     employee.effective_regimen(DEFAULT_SHIFT_REGIMEN),
    ///     ShiftRegimen::parse("14x7").unwrap()
    /// );
    ///
    /// employee.shift_regimen = Some("garbage".to_string());
    /// assert_eq!(employee.effective_regimen(DEFAULT_SHIFT_REGIMEN), DEFAULT_SHIFT_REGIMEN);
    /// ```
    pub fn effective_regimen(&self, default: ShiftRegimen) -> ShiftRegimen {
        match self.shift_regimen() {
            Ok(Some(regimen)) => regimen,
            Ok(None) => {
                debug!(employee_id = %self.id, default = %default, "No shift regimen configured, using default");
                default
            }
            Err(err) => {
                warn!(
                    employee_id = %self.id,
                    error = %err,
                    default = %default,
                    "Unparseable shift regimen, using default"
                );
                default
            }
        }
    }

    /// Validates the fields the engine relies on.
    ///
    /// Checks the document number against its type, that the cutoff balance
    /// is not negative, and that a configured regimen parses.
    pub fn validate(&self) -> EngineResult<()> {
        self.document_type.validate(&self.id)?;

        if self.leave_balance_cutoff < Decimal::ZERO {
            return Err(EngineError::InvalidFormat {
                field: "leave balance cutoff".to_string(),
                value: self.leave_balance_cutoff.to_string(),
                message: "must not be negative".to_string(),
            });
        }

        if let Some(regimen) = self.shift_regimen()? {
            if regimen.is_unusual() {
                warn!(
                    employee_id = %self.id,
                    regimen = %regimen,
                    "Unusual shift regimen: fewer work days than rest days"
                );
            }
        }

        Ok(())
    }
}
