//! Scheduling conflict and balance engine for workforce rosters.
//!
//! This crate coordinates work shifts, recurring availability rules, paid and
//! unpaid leave balances, shift swaps, and weekly overtime accounting. It owns
//! the temporal arithmetic (half-open interval overlap, fixed-offset local
//! time), the invariant protection across entities (no double booking, never
//! a negative leave balance), and the multi-step atomic mutations (leave
//! approval debiting the ledger and cancelling conflicting shifts, swap
//! approval reassigning a shift).

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
pub mod time;
