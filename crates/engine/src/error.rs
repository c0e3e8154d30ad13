//! The module contains the errors the engine can throw.
//!
//! The split calculator fails with:
//!
//! - [`InvalidAmount`] when the total is not positive or a custom share is negative.
//! - [`EmptyParticipants`] when nobody is left to split the expense with.
//! - [`NotATripMember`] when the payer or a participant is not on the roster.
//! - [`SplitMismatch`] when custom shares do not add up to the total.
//!
//! The ledger only fails with [`InvariantViolation`], which means an expense
//! reached it without going through the split calculator.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`EmptyParticipants`]: EngineError::EmptyParticipants
//!  [`NotATripMember`]: EngineError::NotATripMember
//!  [`SplitMismatch`]: EngineError::SplitMismatch
//!  [`InvariantViolation`]: EngineError::InvariantViolation
use thiserror::Error;
use uuid::Uuid;

use crate::{MemberId, MoneyCents};

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Expense has no participants")]
    EmptyParticipants,
    #[error("\"{0}\" is not a member of the trip")]
    NotATripMember(MemberId),
    #[error("Shares sum to {sum}, expected {expected}")]
    SplitMismatch {
        sum: MoneyCents,
        expected: MoneyCents,
    },
    #[error("Expense {expense_id} violates the ledger invariants: {reason}")]
    InvariantViolation { expense_id: Uuid, reason: String },
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
}

impl EngineError {
    /// `true` for failures caused by the caller's input, which should be shown
    /// to the user at expense-creation time.
    ///
    /// `InvariantViolation` is the only upstream-defect error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        !matches!(self, Self::InvariantViolation { .. })
    }
}
