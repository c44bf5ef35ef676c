//! Core types used throughout the ledger
//!
//! Type aliases that give semantic meaning to the primitive values flowing
//! between the store, the fee policy and the transfer engine.

/// Account identity - the primary key of every account record.
///
/// Emails are stored trimmed and lowercased (see [`crate::account::validation`]).
pub type Email = String;

/// Principal or fee in the smallest currency unit.
///
/// Operation inputs are unsigned: a zero or negative transfer is a validation
/// error, never a value the engine carries around.
pub type Amount = u64;

/// Stored balance value in the smallest currency unit.
///
/// Signed so deltas and the admin `system_balance` counter share one type.
/// Account `balance` never goes below zero as a result of a core operation.
pub type Units = i64;

/// Convert an operation amount into stored units.
///
/// Returns `None` when the amount does not fit the signed column.
#[inline]
pub fn to_units(amount: Amount) -> Option<Units> {
    Units::try_from(amount).ok()
}
