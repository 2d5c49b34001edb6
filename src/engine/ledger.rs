//! Leave balance ledger operations.
//!
//! A balance row tracks accrued, carried, adjusted, and used minutes per
//! (employee, leave code, year). The remaining balance is the signed sum
//! `accrued + carry + adjusted - used`, unclamped; it must never drop below
//! zero after a mutation.

use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, LeaveBalance};
use crate::store::Store;

/// Result of a balance adjustment.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceAdjustment {
    /// The balance row after the adjustment.
    #[serde(flatten)]
    pub balance: LeaveBalance,
    /// The remaining balance after the adjustment.
    pub remaining_minutes: i64,
}

/// Applies a signed manual adjustment to a balance row.
///
/// Rejects with `NotFound` when the row does not exist and with
/// [`EngineError::NegativeBalance`] when the adjustment would leave the
/// remaining balance below zero; a rejected adjustment changes nothing.
/// An accepted adjustment appends an audit entry capturing the delta, the
/// reason, and the resulting remaining balance.
pub fn adjust_balance(
    store: &Store,
    actor: &Actor,
    employee_id: &str,
    leave_code: &str,
    year: i32,
    delta_minutes: i64,
    reason: &str,
) -> EngineResult<BalanceAdjustment> {
    store.transaction(|db| {
        let balance = db.leave_balance(employee_id, leave_code, year)?.clone();
        let new_adjusted = balance.adjusted_minutes + delta_minutes;
        let remaining_after = balance.accrued_minutes + balance.carry_minutes + new_adjusted
            - balance.used_minutes;
        if remaining_after < 0 {
            return Err(EngineError::NegativeBalance { remaining_after });
        }

        let updated = LeaveBalance {
            adjusted_minutes: new_adjusted,
            ..balance
        };
        db.leave_balances.insert(
            (
                employee_id.to_string(),
                leave_code.to_string(),
                year,
            ),
            updated.clone(),
        );
        db.record_audit(
            &actor.employee_id,
            "balance.adjust",
            format!(
                "adjusted {employee_id}/{leave_code}/{year} by {delta_minutes} minutes \
                 ({reason}); {remaining_after} minutes remaining"
            ),
        );

        Ok(BalanceAdjustment {
            balance: updated,
            remaining_minutes: remaining_after,
        })
    })
}
