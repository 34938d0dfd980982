//! Caller identity and organizational scope.
//!
//! The engine never authenticates anyone. It receives an already-resolved
//! [`Actor`] whose manager scope is a plain set of employee ids, derived
//! from the [`Area`]s the actor is responsible for.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// An organizational area.
///
/// An area owns a *set* of responsible employees; any of them manages every
/// member of the area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    /// Area name, unique.
    pub name: String,
    /// Inactive areas grant no scope.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Employee ids responsible for the area.
    #[serde(default)]
    pub responsibles: BTreeSet<String>,
    /// Employee ids assigned to the area.
    #[serde(default)]
    pub members: BTreeSet<String>,
}

fn default_active() -> bool {
    true
}

impl Area {
    /// True if `employee_id` is one of the area's responsibles.
    pub fn is_responsible(&self, employee_id: &str) -> bool {
        self.responsibles.contains(employee_id)
    }
}

/// The user performing a roster operation.
///
/// # Example
///
/// ```
/// use roster_engine::models::{Actor, Area};
/// use std::collections::BTreeSet;
///
/// let area = Area {
///     name: "Maintenance".to_string(),
///     active: true,
///     responsibles: BTreeSet::from(["11111111".to_string()]),
///     members: BTreeSet::from(["22222222".to_string(), "33333333".to_string()]),
/// };
///
/// let manager = Actor::from_areas("mlopez", Some("11111111".to_string()), false, &[area]);
/// assert!(manager.is_manager_of("22222222"));
/// assert!(!manager.is_manager_of("44444444"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Login of the user, recorded in audit entries.
    pub user_id: String,
    /// The employee record linked to this user, if any.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Administrators may edit any day and approve anything.
    #[serde(default)]
    pub is_admin: bool,
    /// Employees this actor manages.
    #[serde(default)]
    pub managed_employees: BTreeSet<String>,
}

impl Actor {
    /// An administrator with no linked employee.
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            employee_id: None,
            is_admin: true,
            managed_employees: BTreeSet::new(),
        }
    }

    /// A regular employee acting on their own roster.
    pub fn employee(user_id: impl Into<String>, employee_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            employee_id: Some(employee_id.into()),
            is_admin: false,
            managed_employees: BTreeSet::new(),
        }
    }

    /// Resolves the manager scope from area responsibility.
    ///
    /// The scope is the union of the members of every active area whose
    /// responsible set contains `employee_id`.
    pub fn from_areas(
        user_id: impl Into<String>,
        employee_id: Option<String>,
        is_admin: bool,
        areas: &[Area],
    ) -> Self {
        let managed_employees = match employee_id.as_deref() {
            Some(id) => areas
                .iter()
                .filter(|area| area.active && area.is_responsible(id))
                .flat_map(|area| area.members.iter().cloned())
                .collect(),
            None => BTreeSet::new(),
        };

        Self {
            user_id: user_id.into(),
            employee_id,
            is_admin,
            managed_employees,
        }
    }

    /// True if the actor's linked employee is `employee_id`.
    pub fn owns(&self, employee_id: &str) -> bool {
        self.employee_id.as_deref() == Some(employee_id)
    }

    /// True if `employee_id` is in the actor's manager scope.
    pub fn is_manager_of(&self, employee_id: &str) -> bool {
        self.managed_employees.contains(employee_id)
    }

    /// True if the actor manages anyone at all.
    pub fn is_manager(&self) -> bool {
        !self.managed_employees.is_empty()
    }

    /// True if the actor may approve or reject records of `employee_id`.
    ///
    /// Only administrators may act on their own roster.
    pub fn can_approve_for(&self, employee_id: &str) -> bool {
        self.is_admin || (self.is_manager_of(employee_id) && !self.owns(employee_id))
    }
}
