//! Employee directory record, roles, and access scoping.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The role an actor holds, driving the scope of records they may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Individual contributor: may only see and act on their own records.
    Employee,
    /// Line manager: scoped to their department.
    Manager,
    /// Administrator: unrestricted.
    Admin,
}

/// An employee subject to scheduling.
///
/// Directory management (hiring, rate changes) is an external concern; the
/// engine only reads these records for scoping, overtime caps, and pay
/// estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Department the employee belongs to.
    pub department: String,
    /// The role the employee acts with.
    pub role: Role,
    /// Weekly minutes cap before overtime applies.
    pub max_weekly_minutes: i64,
    /// Base hourly pay rate.
    pub hourly_rate: Decimal,
}

/// A pre-authenticated caller, resolved from the employee directory at the
/// request boundary. Identity/session issuance is external to this engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    /// The acting employee's id.
    pub employee_id: String,
    /// The acting employee's role.
    pub role: Role,
    /// The acting employee's department.
    pub department: String,
}

impl Actor {
    /// Builds an actor from a directory record.
    pub fn from_employee(employee: &Employee) -> Self {
        Self {
            employee_id: employee.id.clone(),
            role: employee.role,
            department: employee.department.clone(),
        }
    }

    /// Returns the record scope this actor's role grants.
    pub fn scope(&self) -> AccessScope {
        match self.role {
            Role::Admin => AccessScope::All,
            Role::Manager => AccessScope::Department {
                department: self.department.clone(),
            },
            Role::Employee => AccessScope::SelfOnly {
                employee_id: self.employee_id.clone(),
            },
        }
    }

    /// True for managers and admins.
    pub fn is_privileged(&self) -> bool {
        matches!(self.role, Role::Manager | Role::Admin)
    }
}

/// A pre-resolved record scope: everything, one employee, or one department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessScope {
    /// Unrestricted access.
    All,
    /// Access restricted to one employee's own records.
    #[serde(rename = "self")]
    SelfOnly {
        /// The employee whose records are visible.
        employee_id: String,
    },
    /// Access restricted to one department.
    Department {
        /// The visible department.
        department: String,
    },
}

impl AccessScope {
    /// Whether a record owned by the given employee is visible in this scope.
    pub fn permits(&self, employee: &Employee) -> bool {
        match self {
            AccessScope::All => true,
            AccessScope::SelfOnly { employee_id } => *employee_id == employee.id,
            AccessScope::Department { department } => *department == employee.department,
        }
    }
}
