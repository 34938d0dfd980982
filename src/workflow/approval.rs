//! The approval state machine.
//!
//! Records move `Draft -> Pending -> Approved`. Administrators, and managers
//! acting on someone in their scope, skip straight to `Approved`. Rejecting a
//! pending record deletes it.
//!
//! Every function here is a planner: it takes the current record and returns
//! the record to commit together with its audit entries. Nothing is stored;
//! the caller commits the plan once the audit entries are written.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::AuditRecorder;
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, AttendanceCode, AttendanceRecord, AuditEntry, AuditField, EntryState};

use super::permissions::{check_approval_permission, check_submit_permission};

/// The state a proposal by `actor` for `employee_id` lands in.
///
/// An actor never approves their own days: a manager editing their own
/// roster gets a draft like everyone else.
///
/// # Example
///
/// ```
/// use roster_engine::models::{Actor, EntryState};
/// use roster_engine::workflow::resolve_proposal_state;
///
/// let employee = Actor::employee("rquispe", "12345678");
/// assert_eq!(resolve_proposal_state(&employee, "12345678"), EntryState::Draft);
/// assert_eq!(resolve_proposal_state(&Actor::admin("root"), "12345678"), EntryState::Approved);
/// ```
pub fn resolve_proposal_state(actor: &Actor, employee_id: &str) -> EntryState {
    if actor.can_approve_for(employee_id) {
        EntryState::Approved
    } else {
        EntryState::Draft
    }
}

/// A single-record mutation ready to commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationPlan {
    /// The record as it will be stored.
    pub record: AttendanceRecord,
    /// The record it replaces, if any.
    pub previous: Option<AttendanceRecord>,
    /// One entry per changed field.
    pub audit_entries: Vec<AuditEntry>,
    /// False when the mutation is a no-op and nothing needs committing.
    pub changed: bool,
}

/// A rejection ready to commit: the record is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionPlan {
    /// The record that will be deleted.
    pub removed: AttendanceRecord,
    /// The rejection trace.
    pub audit_entries: Vec<AuditEntry>,
}

/// A bulk submission ready to commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitPlan {
    /// Every former draft, now pending.
    pub records: Vec<AttendanceRecord>,
    /// One state entry per record.
    pub audit_entries: Vec<AuditEntry>,
}

/// Plans setting `code` and `note` on `employee_id`'s `date`.
///
/// Permission and balance checks must already have passed. A request is a
/// no-op only when the record already carries the code, the note and the
/// state this actor's proposal would resolve to; then no audit entry is
/// produced.
pub fn plan_proposal(
    actor: &Actor,
    employee_id: &str,
    date: NaiveDate,
    code: AttendanceCode,
    note: &str,
    previous: Option<&AttendanceRecord>,
    now: DateTime<Utc>,
) -> MutationPlan {
    let state = resolve_proposal_state(actor, employee_id);

    if let Some(prev) = previous {
        if prev.code == code && prev.note == note && prev.state == state {
            return MutationPlan {
                record: prev.clone(),
                previous: Some(prev.clone()),
                audit_entries: Vec::new(),
                changed: false,
            };
        }
    }

    let approved = state == EntryState::Approved;
    let record = AttendanceRecord {
        employee_id: employee_id.to_string(),
        date,
        code,
        note: note.to_string(),
        state,
        modified_by: Some(actor.user_id.clone()),
        approved_by: approved.then(|| actor.user_id.clone()),
        approved_at: approved.then_some(now),
    };

    let (old_code, old_note, old_state) = match previous {
        Some(prev) => (prev.code.to_string(), prev.note.as_str(), prev.state.to_string()),
        None => (String::new(), "", String::new()),
    };

    let mut recorder = AuditRecorder::new(actor.user_id.as_str(), now);
    recorder.record(employee_id, date, AuditField::Code, &old_code, code.as_str());
    recorder.record(employee_id, date, AuditField::Note, old_note, note);
    recorder.record(employee_id, date, AuditField::State, &old_state, &state.to_string());

    MutationPlan {
        record,
        previous: previous.cloned(),
        audit_entries: recorder.finish(),
        changed: true,
    }
}

/// Plans `Pending -> Approved` for `record`.
///
/// # Errors
///
/// `PermissionDenied` unless `actor` is an administrator or manages the
/// employee; `InvalidStateTransition` unless the record is pending.
pub fn plan_approval(
    actor: &Actor,
    record: &AttendanceRecord,
    now: DateTime<Utc>,
) -> EngineResult<MutationPlan> {
    check_approval_permission(actor, &record.employee_id, record.date)?;
    require_pending(record, "approve")?;

    let mut approved = record.clone();
    approved.state = EntryState::Approved;
    approved.approved_by = Some(actor.user_id.clone());
    approved.approved_at = Some(now);

    let mut recorder = AuditRecorder::new(actor.user_id.as_str(), now);
    recorder.record(
        &record.employee_id,
        record.date,
        AuditField::State,
        &EntryState::Pending.to_string(),
        &EntryState::Approved.to_string(),
    );

    Ok(MutationPlan {
        record: approved,
        previous: Some(record.clone()),
        audit_entries: recorder.finish(),
        changed: true,
    })
}

/// Plans the deletion of a pending `record`.
///
/// The trace keeps the removed code and the reason: the code goes to empty
/// and the state goes to `rejected: {reason}`.
///
/// # Errors
///
/// Same as [`plan_approval`].
pub fn plan_rejection(
    actor: &Actor,
    record: &AttendanceRecord,
    reason: &str,
    now: DateTime<Utc>,
) -> EngineResult<RejectionPlan> {
    check_approval_permission(actor, &record.employee_id, record.date)?;
    require_pending(record, "reject")?;

    let mut recorder = AuditRecorder::new(actor.user_id.as_str(), now);
    recorder.record(&record.employee_id, record.date, AuditField::Code, record.code.as_str(), "");
    recorder.record(
        &record.employee_id,
        record.date,
        AuditField::State,
        &EntryState::Pending.to_string(),
        &format!("rejected: {}", reason.trim()),
    );

    Ok(RejectionPlan {
        removed: record.clone(),
        audit_entries: recorder.finish(),
    })
}

/// Plans moving every draft among `records` to pending.
///
/// Records in other states are left out. With no drafts the plan is empty.
///
/// # Errors
///
/// `PermissionDenied` unless `actor` owns the roster.
pub fn plan_submit<'a, I>(
    actor: &Actor,
    employee_id: &str,
    records: I,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> EngineResult<SubmitPlan>
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    check_submit_permission(actor, employee_id, today)?;

    let mut recorder = AuditRecorder::new(actor.user_id.as_str(), now);
    let records: Vec<AttendanceRecord> = records
        .into_iter()
        .filter(|r| r.employee_id == employee_id && r.state == EntryState::Draft)
        .map(|r| {
            recorder.record(
                employee_id,
                r.date,
                AuditField::State,
                &EntryState::Draft.to_string(),
                &EntryState::Pending.to_string(),
            );
            r.clone().with_state(EntryState::Pending)
        })
        .collect();

    Ok(SubmitPlan {
        records,
        audit_entries: recorder.finish(),
    })
}

fn require_pending(record: &AttendanceRecord, action: &str) -> EngineResult<()> {
    if record.is_pending() {
        Ok(())
    } else {
        Err(EngineError::InvalidStateTransition {
            employee_id: record.employee_id.clone(),
            date: record.date,
            from: record.state.to_string(),
            action: action.to_string(),
        })
    }
}
