//! Core types for the MoMo payment gate.
//!
//! This crate provides the foundational types used throughout the gate:
//!
//! - **Identifiers**: `UserId`, `GateId`, `ExternalReference`, `ProviderReferenceId`
//! - **Requests**: `PaymentRequest`, `PayerPhone`, `PurposeContext`, `Currency`
//! - **Status**: `ProviderStatus`, `SessionStatus`, `GateState`, `FailureReason`
//! - **Sessions**: `PaymentSession`
//! - **Ports**: `AccessTokenProvider`, `PaymentInitiator`, `PaymentStatusProbe`
//!
//! # Amounts
//!
//! Fees are integer minor units of RWF (`i64`). A fee must be positive.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod payment;
pub mod ports;
pub mod session;
pub mod status;

pub use error::{GateError, Result};
pub use ids::{ExternalReference, GateId, IdError, ProviderReferenceId, UserId};
pub use payment::{
    Currency, PayerPhone, PaymentRequest, PurposeContext, DEFAULT_FEE_MINOR, PAYER_PHONE_DIGITS,
};
pub use ports::{
    AccessToken, AccessTokenProvider, InitiatePayment, InitiationReceipt, PaymentInitiator,
    PaymentStatusProbe, RemoteError,
};
pub use session::PaymentSession;
pub use status::{FailureReason, GateState, ProviderStatus, SessionStatus};
