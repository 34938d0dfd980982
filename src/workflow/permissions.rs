//! Who may touch which roster day.

use chrono::NaiveDate;
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::models::Actor;

/// Checks that `actor` may edit `employee_id`'s roster on `date`.
///
/// Administrators may edit any day. Everyone else is limited to `today` or
/// later, never before `go_live`, and only for their own roster or an
/// employee in their manager scope.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use roster_engine::models::Actor;
/// use roster_engine::workflow::check_edit_permission;
///
/// let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
/// let go_live = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// let actor = Actor::employee("rquispe", "12345678");
///
/// assert!(check_edit_permission(&actor, "12345678", today, today, go_live).is_ok());
/// let yesterday = today.pred_opt().unwrap();
/// assert!(check_edit_permission(&actor, "12345678", yesterday, today, go_live).is_err());
/// ```
pub fn check_edit_permission(
    actor: &Actor,
    employee_id: &str,
    date: NaiveDate,
    today: NaiveDate,
    go_live: NaiveDate,
) -> EngineResult<()> {
    if actor.is_admin {
        return Ok(());
    }

    if date < go_live {
        return Err(denied(
            actor,
            employee_id,
            date,
            format!("days before {go_live} can only be edited by an administrator"),
        ));
    }

    if date < today {
        return Err(denied(
            actor,
            employee_id,
            date,
            "past days can only be edited by an administrator".to_string(),
        ));
    }

    if !actor.owns(employee_id) && !actor.is_manager_of(employee_id) {
        return Err(denied(
            actor,
            employee_id,
            date,
            "employee is outside the actor's scope".to_string(),
        ));
    }

    Ok(())
}

/// Checks that `actor` may approve or reject `employee_id`'s pending days.
pub fn check_approval_permission(
    actor: &Actor,
    employee_id: &str,
    date: NaiveDate,
) -> EngineResult<()> {
    if actor.can_approve_for(employee_id) {
        Ok(())
    } else {
        Err(denied(
            actor,
            employee_id,
            date,
            "only an administrator or a manager of the employee may approve or reject".to_string(),
        ))
    }
}

/// Checks that `actor` owns the roster being submitted.
pub fn check_submit_permission(
    actor: &Actor,
    employee_id: &str,
    today: NaiveDate,
) -> EngineResult<()> {
    if actor.owns(employee_id) {
        Ok(())
    } else {
        Err(denied(
            actor,
            employee_id,
            today,
            "only the employee may submit their own drafts".to_string(),
        ))
    }
}

fn denied(actor: &Actor, employee_id: &str, date: NaiveDate, reason: String) -> EngineError {
    warn!(
        target: "roster::security",
        actor = %actor.user_id,
        employee_id,
        %date,
        reason = %reason,
        "Permission denied"
    );
    EngineError::PermissionDenied {
        actor: actor.user_id.clone(),
        employee_id: employee_id.to_string(),
        date,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn make_date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    fn go_live() -> NaiveDate {
        make_date(1, 1)
    }

    fn today() -> NaiveDate {
        make_date(3, 10)
    }

    fn manager_of(ids: &[&str]) -> Actor {
        Actor {
            managed_employees: ids.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            ..Actor::employee("mlopez", "11111111")
        }
    }

    fn reason_of(result: EngineResult<()>) -> String {
        match result {
            Err(EngineError::PermissionDenied { reason, .. }) => reason,
            other => panic!("Expected PermissionDenied, got {:?}", other),
        }
    }

    #[test]
    fn test_admin_may_edit_any_date() {
        let admin = Actor::admin("root");
        let old = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(check_edit_permission(&admin, "22222222", old, today(), go_live()).is_ok());
        assert!(check_edit_permission(&admin, "22222222", make_date(3, 1), today(), go_live()).is_ok());
    }

    #[test]
    fn test_owner_may_edit_today_and_future() {
        let actor = Actor::employee("rquispe", "22222222");
        assert!(check_edit_permission(&actor, "22222222", today(), today(), go_live()).is_ok());
        assert!(check_edit_permission(&actor, "22222222", make_date(4, 1), today(), go_live()).is_ok());
    }

    #[test]
    fn test_past_date_is_denied() {
        let actor = Actor::employee("rquispe", "22222222");
        let reason = reason_of(check_edit_permission(
            &actor,
            "22222222",
            make_date(3, 9),
            today(),
            go_live(),
        ));
        assert!(reason.contains("past days"));
    }

    #[test]
    fn test_pre_go_live_is_denied_even_when_today_is_earlier() {
        let actor = Actor::employee("rquispe", "22222222");
        let early_today = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 12, 15).unwrap();

        let reason = reason_of(check_edit_permission(&actor, "22222222", date, early_today, go_live()));
        assert!(reason.contains("2026-01-01"));
    }

    #[test]
    fn test_out_of_scope_is_denied() {
        let actor = manager_of(&["33333333"]);
        let reason = reason_of(check_edit_permission(
            &actor,
            "22222222",
            today(),
            today(),
            go_live(),
        ));
        assert!(reason.contains("scope"));
    }

    #[test]
    fn test_manager_may_edit_scope() {
        let actor = manager_of(&["22222222"]);
        assert!(check_edit_permission(&actor, "22222222", today(), today(), go_live()).is_ok());
    }

    #[test]
    fn test_denial_carries_context() {
        let actor = Actor::employee("rquispe", "22222222");
        match check_edit_permission(&actor, "33333333", today(), today(), go_live()) {
            Err(EngineError::PermissionDenied {
                actor,
                employee_id,
                date,
                ..
            }) => {
                assert_eq!(actor, "rquispe");
                assert_eq!(employee_id, "33333333");
                assert_eq!(date, today());
            }
            other => panic!("Expected PermissionDenied, got {:?}", other),
        }
    }

    #[test]
    fn test_approval_permission() {
        assert!(check_approval_permission(&Actor::admin("root"), "22222222", today()).is_ok());
        assert!(check_approval_permission(&manager_of(&["22222222"]), "22222222", today()).is_ok());
        assert!(check_approval_permission(&manager_of(&["33333333"]), "22222222", today()).is_err());
        assert!(
            check_approval_permission(&Actor::employee("rquispe", "22222222"), "22222222", today())
                .is_err()
        );
    }

    #[test]
    fn test_submit_is_owner_only() {
        assert!(check_submit_permission(&Actor::employee("rquispe", "22222222"), "22222222", today()).is_ok());
        assert!(check_submit_permission(&Actor::admin("root"), "22222222", today()).is_err());
        assert!(check_submit_permission(&manager_of(&["22222222"]), "22222222", today()).is_err());
    }
}
