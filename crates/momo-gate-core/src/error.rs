//! Error types for the payment gate.

use crate::ids::IdError;

/// Result type for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;

/// Errors returned synchronously by gate operations.
///
/// Failures of the remote payment flow never surface here; they end the
/// attempt in a terminal `GateState::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The payer phone number does not match the required digit pattern.
    #[error("invalid payer phone: expected {expected} digits")]
    InvalidPhone {
        /// Required number of digits.
        expected: usize,
    },

    /// The fee amount is not positive.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// The gate is not waiting for input (already processing or finished).
    #[error("gate is not awaiting input")]
    NotAwaitingInput,

    /// Only a failed gate can be reset.
    #[error("gate can only be reset after a failed attempt")]
    NotFailed,

    /// The gate has been torn down.
    #[error("gate has been torn down")]
    TornDown,

    /// Unknown purpose context tag.
    #[error("unknown purpose: {0}")]
    UnknownPurpose(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
