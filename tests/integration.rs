//! Integration tests for the Roster Engine.
//!
//! These tests drive [`RosterService`] end to end:
//! - Proposal states for owners, managers and administrators
//! - Submit, approve and reject
//! - Balance and consecutive-day rules
//! - Edit windows (past days, go-live)
//! - Audit atomicity
//! - Matrix round trips
//! - Concurrent mutations

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use roster_engine::audit::{AuditSink, InMemoryAuditLog};
use roster_engine::config::{ConfigLoader, RosterPolicy};
use roster_engine::error::{EngineError, EngineResult, LeaveKind};
use roster_engine::models::{
    Actor, Area, AttendanceCode, AttendanceRecord, AuditEntry, AuditField, Employee, EntryState,
};
use roster_engine::report::MatrixFilter;
use roster_engine::service::RosterService;

// =============================================================================
// Test Helpers
// =============================================================================

const OWNER_ID: &str = "22222222";
const MANAGER_ID: &str = "11111111";
const OTHER_ID: &str = "33333333";

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn make_date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).unwrap()
}

fn today() -> NaiveDate {
    make_date(3, 2)
}

fn employee(id: &str, name: &str, cutoff: &str) -> Employee {
    Employee {
        leave_balance_cutoff: decimal(cutoff),
        shift_regimen: Some("21x7".to_string()),
        ..Employee::new(id, name)
    }
}

fn owner() -> Actor {
    Actor::employee("aalva", OWNER_ID)
}

fn manager() -> Actor {
    let area = Area {
        name: "Operations".to_string(),
        active: true,
        responsibles: BTreeSet::from([MANAGER_ID.to_string()]),
        members: BTreeSet::from([OWNER_ID.to_string(), MANAGER_ID.to_string()]),
    };
    Actor::from_areas("mlopez", Some(MANAGER_ID.to_string()), false, &[area])
}

fn admin() -> Actor {
    Actor::admin("root")
}

fn create_service() -> RosterService<InMemoryAuditLog> {
    let config = ConfigLoader::load("./config/roster").expect("Failed to load config");
    let service = RosterService::new(config, InMemoryAuditLog::new());
    service
        .register_employee(employee(OWNER_ID, "ALVA, ANA", "5"))
        .unwrap();
    service
        .register_employee(employee(MANAGER_ID, "LOPEZ, MARIO", "0"))
        .unwrap();
    service
        .register_employee(employee(OTHER_ID, "ZAPATA, LUIS", "0"))
        .unwrap();
    service
}

/// Seeds approved on-site work days ending the day before `today()`.
fn seed_work_days(service: &RosterService<InMemoryAuditLog>, id: &str, count: i64) {
    let records = (1..=count)
        .map(|i| AttendanceRecord::new(id, today() - Duration::days(i), AttendanceCode::OnSiteWork))
        .collect();
    service.import_records(id, records).unwrap();
}

/// A sink that refuses every write.
#[derive(Debug, Default)]
struct FailingAuditSink {
    failing: AtomicBool,
    inner: InMemoryAuditLog,
}

impl AuditSink for FailingAuditSink {
    fn append(&self, entries: &[AuditEntry]) -> EngineResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EngineError::AuditWriteFailure {
                message: "audit store offline".to_string(),
            });
        }
        self.inner.append(entries)
    }
}

// =============================================================================
// SECTION 1: Proposal states
// =============================================================================

#[test]
fn test_owner_proposal_is_draft() {
    let service = create_service();
    let outcome = service
        .propose(&owner(), OWNER_ID, today(), "t", "", today())
        .unwrap();

    assert!(outcome.created);
    assert!(outcome.changed);
    assert_eq!(outcome.record.code, AttendanceCode::OnSiteWork);
    assert_eq!(outcome.record.state, EntryState::Draft);
    assert!(outcome.record.approved_by.is_none());
}

#[test]
fn test_admin_proposal_is_approved() {
    let service = create_service();
    let outcome = service
        .propose(&admin(), OWNER_ID, today(), "V", "annual", today())
        .unwrap();

    assert_eq!(outcome.record.state, EntryState::Approved);
    assert_eq!(outcome.record.approved_by.as_deref(), Some("root"));
    assert!(outcome.record.approved_at.is_some());
}

#[test]
fn test_manager_proposal_for_staff_is_approved() {
    let service = create_service();
    let outcome = service
        .propose(&manager(), OWNER_ID, today(), "TR", "", today())
        .unwrap();

    assert_eq!(outcome.record.state, EntryState::Approved);
    assert_eq!(outcome.record.approved_by.as_deref(), Some("mlopez"));
}

#[test]
fn test_manager_own_proposal_is_draft() {
    let service = create_service();
    let outcome = service
        .propose(&manager(), MANAGER_ID, today(), "T", "", today())
        .unwrap();
    assert_eq!(outcome.record.state, EntryState::Draft);
}

#[test]
fn test_outcome_carries_recomputed_summary() {
    let service = create_service();
    seed_work_days(&service, OWNER_ID, 5);

    let outcome = service
        .propose(&admin(), OWNER_ID, today(), "T", "", today())
        .unwrap();
    // 6 T at 3:1 = 2 earned; 5 + 2 = 7
    assert_eq!(outcome.summary.earned_rest_days, 2);
    assert_eq!(outcome.summary.pending_balance, decimal("7"));
}

// =============================================================================
// SECTION 2: Edit windows
// =============================================================================

#[test]
fn test_past_day_is_denied_for_owner() {
    let service = create_service();
    let result = service.propose(&owner(), OWNER_ID, make_date(3, 1), "T", "", today());
    assert!(matches!(result, Err(EngineError::PermissionDenied { .. })));
    assert!(service.audit().is_empty().unwrap());
}

#[test]
fn test_admin_may_edit_past_day() {
    let service = create_service();
    assert!(
        service
            .propose(&admin(), OWNER_ID, make_date(2, 1), "T", "", today())
            .is_ok()
    );
}

#[test]
fn test_pre_go_live_is_denied_for_every_non_admin() {
    let service = create_service();
    let early_today = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();

    for actor in [owner(), manager()] {
        let result = service.propose(&actor, OWNER_ID, date, "T", "", early_today);
        assert!(
            matches!(result, Err(EngineError::PermissionDenied { .. })),
            "{} should be denied",
            actor.user_id
        );
    }
    assert!(service.propose(&admin(), OWNER_ID, date, "T", "", early_today).is_ok());
}

#[test]
fn test_out_of_scope_employee_is_denied() {
    let service = create_service();
    let result = service.propose(&manager(), OTHER_ID, today(), "T", "", today());
    assert!(matches!(result, Err(EngineError::PermissionDenied { .. })));
}

// =============================================================================
// SECTION 3: Balance rules
// =============================================================================

#[test]
fn test_cutoff_five_allows_five_dla_days() {
    let service = create_service();

    for i in 0..5 {
        let date = today() + Duration::days(i);
        service
            .propose(&admin(), OWNER_ID, date, "DLA", "", today())
            .unwrap();
    }

    let sixth = today() + Duration::days(5);
    match service.propose(&admin(), OWNER_ID, sixth, "DLA", "", today()) {
        Err(EngineError::InsufficientBalance { kind, balance }) => {
            assert_eq!(kind, LeaveKind::Accumulated);
            assert_eq!(balance, decimal("-1"));
        }
        other => panic!("Expected InsufficientBalance, got {:?}", other),
    }
    assert!(service.record(OWNER_ID, sixth).unwrap().is_none());
}

#[test]
fn test_eighth_consecutive_dla_is_rejected() {
    let service = create_service();
    service
        .register_employee(employee(OWNER_ID, "ALVA, ANA", "20"))
        .unwrap();

    for i in 0..7 {
        service
            .propose(&admin(), OWNER_ID, today() + Duration::days(i), "DLA", "", today())
            .unwrap();
    }

    let eighth = today() + Duration::days(7);
    match service.propose(&admin(), OWNER_ID, eighth, "DLA", "", today()) {
        Err(EngineError::ConsecutiveLimitExceeded { run_length, limit }) => {
            assert_eq!(run_length, 8);
            assert_eq!(limit, 7);
        }
        other => panic!("Expected ConsecutiveLimitExceeded, got {:?}", other),
    }

    let after_gap = today() + Duration::days(8);
    assert!(
        service
            .propose(&admin(), OWNER_ID, after_gap, "DLA", "", today())
            .is_ok()
    );
}

#[test]
fn test_dl_requires_pending_balance() {
    let service = create_service();

    // No cutoff and nothing earned
    let result = service.propose(&admin(), OTHER_ID, today(), "DL", "", today());
    assert!(matches!(
        result,
        Err(EngineError::InsufficientBalance {
            kind: LeaveKind::Earned,
            ..
        })
    ));

    seed_work_days(&service, OTHER_ID, 3);
    assert!(service.propose(&admin(), OTHER_ID, today(), "DL", "", today()).is_ok());
    assert_eq!(service.summary(OTHER_ID).unwrap().pending_balance, decimal("0"));
}

#[test]
fn test_leave_rules_apply_to_admins() {
    let service = create_service();
    let result = service.propose(&admin(), OTHER_ID, today(), "DLA", "", today());
    assert!(matches!(result, Err(EngineError::InsufficientBalance { .. })));
}

// =============================================================================
// SECTION 4: Submit / approve / reject
// =============================================================================

#[test]
fn test_full_approval_lifecycle() {
    let service = create_service();
    let tomorrow = today() + Duration::days(1);

    service.propose(&owner(), OWNER_ID, today(), "T", "", today()).unwrap();
    service.propose(&owner(), OWNER_ID, tomorrow, "TR", "", today()).unwrap();

    let submitted = service.submit(&owner(), OWNER_ID, today()).unwrap();
    assert_eq!(submitted.len(), 2);
    assert!(submitted.iter().all(|r| r.state == EntryState::Pending));

    let queue = service.pending_approvals(&manager()).unwrap();
    assert_eq!(
        queue.iter().map(|r| r.date).collect::<Vec<_>>(),
        vec![today(), tomorrow]
    );
    assert!(service.pending_approvals(&owner()).unwrap().is_empty());

    let approved = service.approve(&manager(), OWNER_ID, today()).unwrap();
    assert_eq!(approved.record.state, EntryState::Approved);
    assert_eq!(approved.record.approved_by.as_deref(), Some("mlopez"));

    let removed = service
        .reject(&manager(), OWNER_ID, tomorrow, "worked on site")
        .unwrap();
    assert_eq!(removed.code, AttendanceCode::RemoteWork);
    assert!(service.record(OWNER_ID, tomorrow).unwrap().is_none());

    let trace = service.audit().entries_for(OWNER_ID, tomorrow).unwrap();
    let last = trace.last().unwrap();
    assert_eq!(last.field, AuditField::State);
    assert_eq!(last.old_value, "pending");
    assert_eq!(last.new_value, "rejected: worked on site");
    assert_eq!(last.actor, "mlopez");
}

#[test]
fn test_approve_non_pending_fails() {
    let service = create_service();
    service.propose(&owner(), OWNER_ID, today(), "T", "", today()).unwrap();

    let result = service.approve(&admin(), OWNER_ID, today());
    assert!(matches!(
        result,
        Err(EngineError::InvalidStateTransition { .. })
    ));
}

#[test]
fn test_owner_cannot_approve_own_pending() {
    let service = create_service();
    service.propose(&owner(), OWNER_ID, today(), "T", "", today()).unwrap();
    service.submit(&owner(), OWNER_ID, today()).unwrap();

    let result = service.approve(&owner(), OWNER_ID, today());
    assert!(matches!(result, Err(EngineError::PermissionDenied { .. })));
}

#[test]
fn test_manager_cannot_approve_own_pending() {
    let service = create_service();
    let draft = service
        .propose(&manager(), MANAGER_ID, today(), "T", "", today())
        .unwrap();
    assert_eq!(draft.record.state, EntryState::Draft);
    service.submit(&manager(), MANAGER_ID, today()).unwrap();

    assert!(matches!(
        service.approve(&manager(), MANAGER_ID, today()),
        Err(EngineError::PermissionDenied { .. })
    ));
    assert!(matches!(
        service.reject(&manager(), MANAGER_ID, today(), "mine"),
        Err(EngineError::PermissionDenied { .. })
    ));
    assert!(service.pending_approvals(&manager()).unwrap().is_empty());

    let approved = service.approve(&admin(), MANAGER_ID, today()).unwrap();
    assert_eq!(approved.record.approved_by.as_deref(), Some("root"));
}

#[test]
fn test_unauthorized_approve_of_missing_day_is_denied() {
    let service = create_service();
    let other = Actor::employee("lzapata", OTHER_ID);

    assert!(matches!(
        service.approve(&other, OWNER_ID, today()),
        Err(EngineError::PermissionDenied { .. })
    ));
    assert!(matches!(
        service.approve(&admin(), OWNER_ID, today()),
        Err(EngineError::RecordNotFound { .. })
    ));
}

#[test]
fn test_submit_is_owner_only_and_empty_without_drafts() {
    let service = create_service();
    assert!(service.submit(&owner(), OWNER_ID, today()).unwrap().is_empty());
    assert!(matches!(
        service.submit(&admin(), OWNER_ID, today()),
        Err(EngineError::PermissionDenied { .. })
    ));
}

#[test]
fn test_admin_sees_every_pending_record() {
    let service = create_service();
    service.propose(&owner(), OWNER_ID, today(), "T", "", today()).unwrap();
    service.submit(&owner(), OWNER_ID, today()).unwrap();

    let other = Actor::employee("lzapata", OTHER_ID);
    service.propose(&other, OTHER_ID, today(), "T", "", today()).unwrap();
    service.submit(&other, OTHER_ID, today()).unwrap();

    let queue = service.pending_approvals(&admin()).unwrap();
    let ids: Vec<_> = queue.iter().map(|r| r.employee_id.as_str()).collect();
    assert_eq!(ids, vec![OWNER_ID, OTHER_ID]);
}

// =============================================================================
// SECTION 5: Create-only path and idempotence
// =============================================================================

#[test]
fn test_create_rejects_existing_day() {
    let service = create_service();
    service.create(&owner(), OWNER_ID, today(), "T", "", today()).unwrap();

    match service.create(&owner(), OWNER_ID, today(), "TR", "", today()) {
        Err(EngineError::DuplicateRecord { employee_id, date }) => {
            assert_eq!(employee_id, OWNER_ID);
            assert_eq!(date, today());
        }
        other => panic!("Expected DuplicateRecord, got {:?}", other),
    }
}

#[test]
fn test_identical_resubmission_adds_no_audit_entry() {
    let service = create_service();
    service.propose(&owner(), OWNER_ID, today(), "T", "", today()).unwrap();
    let before = service.audit().entries_for(OWNER_ID, today()).unwrap();

    let outcome = service.propose(&owner(), OWNER_ID, today(), "T", "", today()).unwrap();
    assert!(!outcome.changed);
    assert_eq!(outcome.record.state, EntryState::Draft);

    let after = service.audit().entries_for(OWNER_ID, today()).unwrap();
    assert_eq!(before, after);
    assert!(after.iter().all(|e| e.old_value != e.new_value));
}

#[test]
fn test_admin_reproposal_of_owner_draft_is_approved() {
    let service = create_service();
    let day = make_date(3, 5);
    service.propose(&owner(), OWNER_ID, day, "T", "", today()).unwrap();

    let outcome = service.propose(&admin(), OWNER_ID, day, "T", "", today()).unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.record.state, EntryState::Approved);
    assert_eq!(outcome.record.approved_by.as_deref(), Some("root"));
    assert!(outcome.record.approved_at.is_some());

    let admin_entries: Vec<_> = service
        .audit()
        .entries_for(OWNER_ID, day)
        .unwrap()
        .into_iter()
        .filter(|e| e.actor == "root")
        .collect();
    assert_eq!(admin_entries.len(), 1);
    assert_eq!(admin_entries[0].field, AuditField::State);
    assert_eq!(admin_entries[0].old_value, "draft");
    assert_eq!(admin_entries[0].new_value, "approved");
}

#[test]
fn test_manager_reproposal_of_staff_pending_is_approved() {
    let service = create_service();
    service.propose(&owner(), OWNER_ID, today(), "TR", "", today()).unwrap();
    service.submit(&owner(), OWNER_ID, today()).unwrap();

    let outcome = service
        .propose(&manager(), OWNER_ID, today(), "TR", "", today())
        .unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.record.state, EntryState::Approved);
    assert_eq!(outcome.record.approved_by.as_deref(), Some("mlopez"));
}

// =============================================================================
// SECTION 6: Audit atomicity
// =============================================================================

#[test]
fn test_audit_failure_aborts_mutation() {
    let sink = FailingAuditSink::default();
    let service = RosterService::with_policy(RosterPolicy::default(), sink);
    service
        .register_employee(employee(OWNER_ID, "ALVA, ANA", "5"))
        .unwrap();

    service.propose(&owner(), OWNER_ID, today(), "T", "", today()).unwrap();
    service.audit().failing.store(true, Ordering::SeqCst);

    let result = service.propose(&owner(), OWNER_ID, today(), "TR", "", today());
    assert!(matches!(result, Err(EngineError::AuditWriteFailure { .. })));
    assert_eq!(
        service.record(OWNER_ID, today()).unwrap().unwrap().code,
        AttendanceCode::OnSiteWork
    );

    let submit = service.submit(&owner(), OWNER_ID, today());
    assert!(matches!(submit, Err(EngineError::AuditWriteFailure { .. })));
    assert_eq!(
        service.record(OWNER_ID, today()).unwrap().unwrap().state,
        EntryState::Draft
    );
    assert_eq!(service.audit().inner.len().unwrap(), 2);
}

// =============================================================================
// SECTION 7: Matrix
// =============================================================================

#[test]
fn test_matrix_reflects_mutation_immediately() {
    let service = create_service();
    seed_work_days(&service, OWNER_ID, 6);

    let before = service.month_matrix(2026, 3, MatrixFilter::default()).unwrap();
    let row = before.rows.iter().find(|r| r.employee_id == OWNER_ID).unwrap();
    assert_eq!(row.cells[1].code, None);
    // 6 T at 3:1 = 2 earned; 5 + 2 = 7
    assert_eq!(row.summary.pending_balance, decimal("7"));

    service.propose(&owner(), OWNER_ID, today(), "DL", "", today()).unwrap();

    let after = service.month_matrix(2026, 3, MatrixFilter::default()).unwrap();
    let row = after.rows.iter().find(|r| r.employee_id == OWNER_ID).unwrap();
    assert_eq!(row.cells[1].code, Some(AttendanceCode::EarnedLeave));
    assert_eq!(row.cells[1].state, Some(EntryState::Draft));
    assert_eq!(row.summary.pending_balance, decimal("6"));
    assert_eq!(row.month_tally.earned_leave, 1);
}

#[test]
fn test_matrix_rows_by_name() {
    let service = create_service();
    let matrix = service.month_matrix(2026, 3, MatrixFilter::default()).unwrap();
    let names: Vec<_> = matrix.rows.iter().map(|r| r.full_name.as_str()).collect();
    assert_eq!(names, vec!["ALVA, ANA", "LOPEZ, MARIO", "ZAPATA, LUIS"]);
    assert_eq!(matrix.days.len(), 31);
}

#[test]
fn test_matrix_invalid_month() {
    let service = create_service();
    assert!(matches!(
        service.month_matrix(2026, 13, MatrixFilter::default()),
        Err(EngineError::InvalidFormat { .. })
    ));
}

// =============================================================================
// SECTION 8: Concurrency
// =============================================================================

#[test]
fn test_concurrent_dla_requests_respect_balance() {
    let service = Arc::new(create_service());

    // Cutoff is 5: of ten concurrent DLA requests on distinct days, five win
    let handles: Vec<_> = (0..10)
        .map(|i| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let date = today() + Duration::days(i * 2);
                service.propose(&admin(), OWNER_ID, date, "DLA", "", today())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let committed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(committed, 5);
    assert!(results.iter().all(|r| matches!(
        r,
        Ok(_) | Err(EngineError::InsufficientBalance { .. })
    )));

    let summary = service.summary(OWNER_ID).unwrap();
    assert_eq!(summary.consumed_accumulated_leave_days, 5);
    assert_eq!(summary.accumulated_balance, decimal("0"));
}

#[test]
fn test_concurrent_writes_to_same_day_keep_one_record() {
    let service = Arc::new(create_service());

    let handles: Vec<_> = ["T", "TR", "V", "P"]
        .into_iter()
        .map(|code| {
            let service = Arc::clone(&service);
            thread::spawn(move || service.propose(&admin(), OTHER_ID, today(), code, "", today()))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let history = service.history(OTHER_ID).unwrap();
    assert_eq!(history.len(), 1);

    // Each committed write left a code trace whose old value is the previous write's new value
    let trace: Vec<_> = service
        .audit()
        .entries_for(OTHER_ID, today())
        .unwrap()
        .into_iter()
        .filter(|e| e.field == AuditField::Code)
        .collect();
    assert_eq!(trace.len(), 4);
    assert_eq!(trace[0].old_value, "");
    for pair in trace.windows(2) {
        assert_eq!(pair[0].new_value, pair[1].old_value);
    }
    assert_eq!(trace[3].new_value, history[0].code.as_str());
}
