//! In-memory persistence with transactional commit semantics.
//!
//! The engine is invoked by independent, concurrent request handlers. Every
//! mutating operation that touches more than one entity (leave approval's
//! ledger debit plus shift cancellation, swap approval's three-record update)
//! must apply completely or not at all. [`Store::transaction`] provides that:
//! the closure mutates a clone of the database and the clone replaces the
//! shared state only when the closure returns `Ok`. The write lock serializes
//! whole transactions, so every read-then-decide sequence revalidates inside
//! the same unit as its write and no interleaving can breach an invariant.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AvailabilityBlock, Employee, LeaveBalance, LeaveRequest, LeaveType, OvertimeRecord,
    OvertimeStrategy, Shift, SwapRequest, TimeEntry,
};

/// One line of the append-only audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique identifier for the entry.
    pub id: Uuid,
    /// When the action happened.
    pub at: DateTime<Utc>,
    /// The acting employee.
    pub actor_id: String,
    /// Machine-readable action name (e.g. `leave.approve`).
    pub action: String,
    /// Human-readable description of what happened and why.
    pub detail: String,
}

/// The complete persisted state, one collection per entity.
#[derive(Debug, Clone, Default)]
pub struct Database {
    /// Employee directory, keyed by employee id.
    pub employees: HashMap<String, Employee>,
    /// Shifts, keyed by shift id.
    pub shifts: HashMap<Uuid, Shift>,
    /// Recurring availability rules.
    pub availability_blocks: Vec<AvailabilityBlock>,
    /// Leave reference data, keyed by code.
    pub leave_types: HashMap<String, LeaveType>,
    /// Balance ledger, keyed by (employee, leave code, year).
    pub leave_balances: HashMap<(String, String, i32), LeaveBalance>,
    /// Leave requests, keyed by request id.
    pub leave_requests: HashMap<Uuid, LeaveRequest>,
    /// Swap requests, keyed by swap id.
    pub swap_requests: HashMap<Uuid, SwapRequest>,
    /// Weekly overtime snapshots, keyed by (employee, week start, strategy).
    pub overtime_records: HashMap<(String, NaiveDate, OvertimeStrategy), OvertimeRecord>,
    /// Clock-in/clock-out records.
    pub time_entries: Vec<TimeEntry>,
    /// Append-only audit log.
    pub audit_log: Vec<AuditEntry>,
}

impl Database {
    /// Looks up an employee, mapping absence to `NotFound`.
    pub fn employee(&self, id: &str) -> EngineResult<&Employee> {
        self.employees.get(id).ok_or_else(|| EngineError::NotFound {
            entity: "employee".to_string(),
            id: id.to_string(),
        })
    }

    /// Looks up a shift, mapping absence to `NotFound`.
    pub fn shift(&self, id: Uuid) -> EngineResult<&Shift> {
        self.shifts.get(&id).ok_or_else(|| EngineError::NotFound {
            entity: "shift".to_string(),
            id: id.to_string(),
        })
    }

    /// Looks up a leave type, mapping absence to `NotFound`.
    pub fn leave_type(&self, code: &str) -> EngineResult<&LeaveType> {
        self.leave_types
            .get(code)
            .ok_or_else(|| EngineError::NotFound {
                entity: "leave type".to_string(),
                id: code.to_string(),
            })
    }

    /// Looks up a leave request, mapping absence to `NotFound`.
    pub fn leave_request(&self, id: Uuid) -> EngineResult<&LeaveRequest> {
        self.leave_requests
            .get(&id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "leave request".to_string(),
                id: id.to_string(),
            })
    }

    /// Looks up a swap request, mapping absence to `NotFound`.
    pub fn swap_request(&self, id: Uuid) -> EngineResult<&SwapRequest> {
        self.swap_requests
            .get(&id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "swap request".to_string(),
                id: id.to_string(),
            })
    }

    /// Looks up a balance row, mapping absence to `NotFound`.
    pub fn leave_balance(
        &self,
        employee_id: &str,
        leave_code: &str,
        year: i32,
    ) -> EngineResult<&LeaveBalance> {
        self.leave_balances
            .get(&(employee_id.to_string(), leave_code.to_string(), year))
            .ok_or_else(|| EngineError::NotFound {
                entity: "leave balance".to_string(),
                id: format!("{employee_id}/{leave_code}/{year}"),
            })
    }

    /// All shifts belonging to an employee.
    pub fn shifts_for(&self, employee_id: &str) -> impl Iterator<Item = &Shift> {
        self.shifts
            .values()
            .filter(move |s| s.employee_id == employee_id)
    }

    /// Availability blocks for an employee on a weekday.
    pub fn blocks_for(
        &self,
        employee_id: &str,
        day: Weekday,
    ) -> impl Iterator<Item = &AvailabilityBlock> {
        self.availability_blocks
            .iter()
            .filter(move |b| b.employee_id == employee_id && b.day == day)
    }

    /// Appends an audit entry.
    pub fn record_audit(&mut self, actor_id: &str, action: &str, detail: String) {
        self.audit_log.push(AuditEntry {
            id: Uuid::new_v4(),
            at: Utc::now(),
            actor_id: actor_id.to_string(),
            action: action.to_string(),
            detail,
        });
    }
}

/// Shared handle to the persisted state.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<Database>>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with an initial database.
    pub fn with_database(database: Database) -> Self {
        Self {
            inner: Arc::new(RwLock::new(database)),
        }
    }

    /// Runs a read-only closure against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&Database) -> R) -> R {
        let guard = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Runs a mutating closure as one atomic unit.
    ///
    /// The closure receives a working copy of the database. On `Ok` the copy
    /// replaces the shared state; on `Err` the shared state is untouched, so
    /// a failure at any step of a multi-entity mutation leaves every record
    /// as it was before the call.
    pub fn transaction<R>(
        &self,
        f: impl FnOnce(&mut Database) -> EngineResult<R>,
    ) -> EngineResult<R> {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut working = guard.clone();
        let result = f(&mut working)?;
        *guard = working;
        Ok(result)
    }
}
