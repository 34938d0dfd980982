//! The roster service: the only place where mutations are committed.
//!
//! Each employee's records live behind their own mutex. A mutation holds
//! that mutex from loading the history through validation, the audit write
//! and the commit, so two requests for the same employee are serialized and
//! a reader sees either all of a mutation or none of it. Requests for
//! different employees do not contend.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::audit::AuditSink;
use crate::calculation::{AccrualSummary, validate_mutation};
use crate::config::{ConfigLoader, RosterPolicy};
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, AttendanceRecord, Employee, EntryState, parse_code};
use crate::report::{MatrixBuilder, MatrixFilter, RosterMatrix};
use crate::workflow::{
    check_approval_permission, check_edit_permission, plan_approval, plan_proposal,
    plan_rejection, plan_submit,
};

/// The result of a single-day mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// The record as committed.
    pub record: AttendanceRecord,
    /// True if the day had no record before.
    pub created: bool,
    /// False if the request was a no-op and nothing was committed.
    pub changed: bool,
    /// The employee's balances after the mutation.
    pub summary: AccrualSummary,
}

#[derive(Debug)]
struct EmployeeLedger {
    employee: Employee,
    records: BTreeMap<NaiveDate, AttendanceRecord>,
}

impl EmployeeLedger {
    fn history(&self) -> Vec<AttendanceRecord> {
        self.records.values().cloned().collect()
    }

    fn summary(&self, policy: &RosterPolicy) -> AccrualSummary {
        AccrualSummary::compute(&self.employee, &self.history(), policy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Upsert,
    CreateOnly,
}

/// In-memory roster store enforcing the accrual, balance and approval rules.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use roster_engine::audit::InMemoryAuditLog;
/// use roster_engine::config::RosterPolicy;
/// use roster_engine::models::{Actor, EntryState, Employee};
/// use roster_engine::service::RosterService;
///
/// let service = RosterService::with_policy(RosterPolicy::default(), InMemoryAuditLog::new());
/// service.register_employee(Employee::new("12345678", "QUISPE MAMANI, ROSA"))?;
///
/// let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let actor = Actor::employee("rquispe", "12345678");
/// let outcome = service.propose(&actor, "12345678", today, "t", "", today)?;
///
/// assert_eq!(outcome.record.state, EntryState::Draft);
/// assert_eq!(service.audit().len()?, 2);
/// # Ok::<(), roster_engine::error::EngineError>(())
/// ```
#[derive(Debug)]
pub struct RosterService<S: AuditSink> {
    policy: RosterPolicy,
    audit: S,
    ledgers: RwLock<HashMap<String, Arc<Mutex<EmployeeLedger>>>>,
}

impl<S: AuditSink> RosterService<S> {
    /// Creates a service using a loaded configuration.
    pub fn new(config: ConfigLoader, audit: S) -> Self {
        Self::with_policy(config.into_policy(), audit)
    }

    /// Creates a service with an explicit policy.
    pub fn with_policy(policy: RosterPolicy, audit: S) -> Self {
        Self {
            policy,
            audit,
            ledgers: RwLock::new(HashMap::new()),
        }
    }

    /// The policy in force.
    pub fn policy(&self) -> &RosterPolicy {
        &self.policy
    }

    /// The audit sink.
    pub fn audit(&self) -> &S {
        &self.audit
    }

    /// Adds an employee, or replaces their details keeping their records.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` if the employee fails [`Employee::validate`].
    pub fn register_employee(&self, employee: Employee) -> EngineResult<()> {
        employee.validate()?;

        let existing = {
            let mut ledgers = self.write_ledgers()?;
            match ledgers.get(&employee.id).cloned() {
                Some(ledger) => ledger,
                None => {
                    debug!(employee_id = %employee.id, "Registered employee");
                    ledgers.insert(
                        employee.id.clone(),
                        Arc::new(Mutex::new(EmployeeLedger {
                            employee,
                            records: BTreeMap::new(),
                        })),
                    );
                    return Ok(());
                }
            }
        };

        lock_ledger(&existing)?.employee = employee;
        Ok(())
    }

    /// Loads existing records as-is, without checks or audit entries.
    ///
    /// Used to seed the store from an external system of record.
    ///
    /// # Errors
    ///
    /// `EmployeeNotFound` for an unknown employee; `DuplicateRecord` if a
    /// day already has a record, in which case nothing is imported.
    pub fn import_records(
        &self,
        employee_id: &str,
        records: Vec<AttendanceRecord>,
    ) -> EngineResult<usize> {
        let ledger = self.ledger(employee_id)?;
        let mut ledger = lock_ledger(&ledger)?;

        let mut incoming = BTreeMap::new();
        for mut record in records {
            if ledger.records.contains_key(&record.date) || incoming.contains_key(&record.date) {
                return Err(EngineError::DuplicateRecord {
                    employee_id: employee_id.to_string(),
                    date: record.date,
                });
            }
            record.employee_id = employee_id.to_string();
            incoming.insert(record.date, record);
        }

        let count = incoming.len();
        ledger.records.extend(incoming);
        info!(target: "roster::business", employee_id, count, "Imported roster records");
        Ok(count)
    }

    /// Sets a day's code and note, creating or updating the record.
    ///
    /// Checks run in order: code, permission, employment dates, balances.
    /// The resulting state follows the approval rules; the audit entries are
    /// written before the record is committed.
    ///
    /// # Errors
    ///
    /// `InvalidFormat`, `PermissionDenied`, `EmployeeNotFound`,
    /// `OutsideEmployment`, `InsufficientBalance`,
    /// `ConsecutiveLimitExceeded`, `AuditWriteFailure`.
    pub fn propose(
        &self,
        actor: &Actor,
        employee_id: &str,
        date: NaiveDate,
        code: &str,
        note: &str,
        today: NaiveDate,
    ) -> EngineResult<MutationOutcome> {
        self.write_day(actor, employee_id, date, code, note, today, WriteMode::Upsert)
    }

    /// Like [`propose`](Self::propose), but only for a day with no record.
    ///
    /// # Errors
    ///
    /// `DuplicateRecord` if the day already has a record, plus every error
    /// of `propose`.
    pub fn create(
        &self,
        actor: &Actor,
        employee_id: &str,
        date: NaiveDate,
        code: &str,
        note: &str,
        today: NaiveDate,
    ) -> EngineResult<MutationOutcome> {
        self.write_day(actor, employee_id, date, code, note, today, WriteMode::CreateOnly)
    }

    #[allow(clippy::too_many_arguments)]
    fn write_day(
        &self,
        actor: &Actor,
        employee_id: &str,
        date: NaiveDate,
        raw_code: &str,
        note: &str,
        today: NaiveDate,
        mode: WriteMode,
    ) -> EngineResult<MutationOutcome> {
        let code = parse_code(raw_code)?;
        check_edit_permission(actor, employee_id, date, today, self.policy.go_live_date)?;

        let ledger = self.ledger(employee_id)?;
        let mut ledger = lock_ledger(&ledger)?;

        if let Some(hire_date) = ledger.employee.hire_date {
            if date < hire_date {
                warn!(
                    target: "roster::business",
                    employee_id,
                    %date,
                    %hire_date,
                    "Roster day precedes hire date"
                );
                return Err(EngineError::OutsideEmployment {
                    employee_id: employee_id.to_string(),
                    date,
                    hire_date,
                });
            }
        }

        let previous = ledger.records.get(&date).cloned();
        if mode == WriteMode::CreateOnly && previous.is_some() {
            return Err(EngineError::DuplicateRecord {
                employee_id: employee_id.to_string(),
                date,
            });
        }

        let plan = plan_proposal(actor, employee_id, date, code, note, previous.as_ref(), Utc::now());
        if !plan.changed {
            debug!(employee_id, %date, %code, "Roster day unchanged");
            return Ok(MutationOutcome {
                record: plan.record,
                created: false,
                changed: false,
                summary: ledger.summary(&self.policy),
            });
        }

        validate_mutation(&ledger.employee, &ledger.history(), date, code, &self.policy)?;

        self.audit.append(&plan.audit_entries)?;
        ledger.records.insert(date, plan.record.clone());
        let summary = ledger.summary(&self.policy);

        info!(
            target: "roster::business",
            actor = %actor.user_id,
            employee_id,
            %date,
            old_code = %previous.as_ref().map(|r| r.code.as_str()).unwrap_or(""),
            new_code = %code,
            state = %plan.record.state,
            pending_balance = %summary.pending_balance,
            "Roster day updated"
        );

        Ok(MutationOutcome {
            record: plan.record,
            created: previous.is_none(),
            changed: true,
            summary,
        })
    }

    /// Moves all of the employee's drafts to pending, atomically.
    ///
    /// Returns the submitted records; empty if there were no drafts.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless `actor` owns the roster;
    /// `EmployeeNotFound`; `AuditWriteFailure`, in which case nothing moves.
    pub fn submit(
        &self,
        actor: &Actor,
        employee_id: &str,
        today: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        let ledger = self.ledger(employee_id)?;
        let mut ledger = lock_ledger(&ledger)?;

        let plan = plan_submit(actor, employee_id, ledger.records.values(), today, Utc::now())?;
        if plan.records.is_empty() {
            debug!(employee_id, "No drafts to submit");
            return Ok(Vec::new());
        }

        self.audit.append(&plan.audit_entries)?;
        for record in &plan.records {
            ledger.records.insert(record.date, record.clone());
        }

        info!(
            target: "roster::business",
            actor = %actor.user_id,
            employee_id,
            count = plan.records.len(),
            "Drafts submitted for approval"
        );
        Ok(plan.records)
    }

    /// Approves a pending day.
    ///
    /// # Errors
    ///
    /// `PermissionDenied`, checked before the record is looked up;
    /// `EmployeeNotFound`, `RecordNotFound`, `InvalidStateTransition`,
    /// `AuditWriteFailure`.
    pub fn approve(
        &self,
        actor: &Actor,
        employee_id: &str,
        date: NaiveDate,
    ) -> EngineResult<MutationOutcome> {
        check_approval_permission(actor, employee_id, date)?;
        let ledger = self.ledger(employee_id)?;
        let mut ledger = lock_ledger(&ledger)?;

        let current = existing_record(&ledger, employee_id, date)?;
        let plan = plan_approval(actor, current, Utc::now())?;

        self.audit.append(&plan.audit_entries)?;
        ledger.records.insert(date, plan.record.clone());

        info!(
            target: "roster::business",
            actor = %actor.user_id,
            employee_id,
            %date,
            code = %plan.record.code,
            "Roster day approved"
        );

        Ok(MutationOutcome {
            record: plan.record,
            created: false,
            changed: true,
            summary: ledger.summary(&self.policy),
        })
    }

    /// Rejects a pending day, deleting it. Returns the removed record.
    ///
    /// # Errors
    ///
    /// Same as [`approve`](Self::approve).
    pub fn reject(
        &self,
        actor: &Actor,
        employee_id: &str,
        date: NaiveDate,
        reason: &str,
    ) -> EngineResult<AttendanceRecord> {
        check_approval_permission(actor, employee_id, date)?;
        let ledger = self.ledger(employee_id)?;
        let mut ledger = lock_ledger(&ledger)?;

        let current = existing_record(&ledger, employee_id, date)?;
        let plan = plan_rejection(actor, current, reason, Utc::now())?;

        self.audit.append(&plan.audit_entries)?;
        ledger.records.remove(&date);

        info!(
            target: "roster::business",
            actor = %actor.user_id,
            employee_id,
            %date,
            code = %plan.removed.code,
            reason,
            "Roster day rejected"
        );
        Ok(plan.removed)
    }

    /// The employee's details.
    pub fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
        let ledger = self.ledger(employee_id)?;
        let ledger = lock_ledger(&ledger)?;
        Ok(ledger.employee.clone())
    }

    /// The employee's full history, ordered by date.
    pub fn history(&self, employee_id: &str) -> EngineResult<Vec<AttendanceRecord>> {
        let ledger = self.ledger(employee_id)?;
        let ledger = lock_ledger(&ledger)?;
        Ok(ledger.history())
    }

    /// The record for one day, if any.
    pub fn record(&self, employee_id: &str, date: NaiveDate) -> EngineResult<Option<AttendanceRecord>> {
        let ledger = self.ledger(employee_id)?;
        let ledger = lock_ledger(&ledger)?;
        Ok(ledger.records.get(&date).cloned())
    }

    /// The employee's current balances.
    pub fn summary(&self, employee_id: &str) -> EngineResult<AccrualSummary> {
        let ledger = self.ledger(employee_id)?;
        let ledger = lock_ledger(&ledger)?;
        Ok(ledger.summary(&self.policy))
    }

    /// Builds the roster matrix for a month.
    ///
    /// Each employee is snapshotted under their own lock, so every row is
    /// consistent with some point between mutations.
    pub fn month_matrix(
        &self,
        year: i32,
        month: u32,
        filter: MatrixFilter,
    ) -> EngineResult<RosterMatrix> {
        let ledgers: Vec<Arc<Mutex<EmployeeLedger>>> =
            self.read_ledgers()?.values().cloned().collect();

        let mut employees = Vec::with_capacity(ledgers.len());
        let mut histories = HashMap::with_capacity(ledgers.len());
        for ledger in &ledgers {
            let ledger = lock_ledger(ledger)?;
            if !filter.matches(&ledger.employee) {
                continue;
            }
            histories.insert(ledger.employee.id.clone(), ledger.history());
            employees.push(ledger.employee.clone());
        }

        MatrixBuilder::new(&self.policy)
            .with_filter(filter)
            .build(&employees, &histories, year, month)
    }

    /// Every pending record `actor` may approve, by date then employee.
    pub fn pending_approvals(&self, actor: &Actor) -> EngineResult<Vec<AttendanceRecord>> {
        let ledgers: Vec<Arc<Mutex<EmployeeLedger>>> = self
            .read_ledgers()?
            .iter()
            .filter(|(id, _)| actor.can_approve_for(id))
            .map(|(_, ledger)| Arc::clone(ledger))
            .collect();

        let mut pending = Vec::new();
        for ledger in &ledgers {
            let ledger = lock_ledger(ledger)?;
            pending.extend(
                ledger
                    .records
                    .values()
                    .filter(|r| r.state == EntryState::Pending)
                    .cloned(),
            );
        }

        pending.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.employee_id.cmp(&b.employee_id)));
        Ok(pending)
    }

    fn ledger(&self, employee_id: &str) -> EngineResult<Arc<Mutex<EmployeeLedger>>> {
        self.read_ledgers()?
            .get(employee_id)
            .cloned()
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })
    }

    fn read_ledgers(
        &self,
    ) -> EngineResult<std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Mutex<EmployeeLedger>>>>>
    {
        self.ledgers.read().map_err(|_| EngineError::StoreUnavailable {
            message: "employee index lock poisoned".to_string(),
        })
    }

    fn write_ledgers(
        &self,
    ) -> EngineResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<Mutex<EmployeeLedger>>>>>
    {
        self.ledgers.write().map_err(|_| EngineError::StoreUnavailable {
            message: "employee index lock poisoned".to_string(),
        })
    }
}

fn lock_ledger(ledger: &Mutex<EmployeeLedger>) -> EngineResult<MutexGuard<'_, EmployeeLedger>> {
    ledger.lock().map_err(|_| EngineError::StoreUnavailable {
        message: "employee ledger lock poisoned".to_string(),
    })
}

fn existing_record<'a>(
    ledger: &'a EmployeeLedger,
    employee_id: &str,
    date: NaiveDate,
) -> EngineResult<&'a AttendanceRecord> {
    ledger
        .records
        .get(&date)
        .ok_or_else(|| EngineError::RecordNotFound {
            employee_id: employee_id.to_string(),
            date,
        })
}
