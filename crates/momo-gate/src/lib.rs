//! MoMo payment gate.
//!
//! A [`PaymentGate`] drives one mobile-money payment from the payer's phone
//! number to a terminal outcome:
//!
//! 1. obtain an access token,
//! 2. submit a request-to-pay with a fresh external reference,
//! 3. poll the status every [`PollPolicy::interval`] up to
//!    [`PollPolicy::max_attempts`] times.
//!
//! On success the caller's [`Continuation`] runs exactly once. Every failure
//! ends in `GateState::Failed` with a short reason; nothing is retried
//! automatically. Tearing the gate down stops polling and disarms the
//! continuation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use momo_gate::{Continuation, GateBackend, GateConfig, PayerContext, PaymentGate, PollPolicy};
//! use momo_gate_core::PurposeContext;
//!
//! # async fn example(backend: GateBackend) -> Result<(), momo_gate_core::GateError> {
//! let gate = PaymentGate::new(
//!     backend,
//!     GateConfig::new(1000, PurposeContext::Contact)?,
//!     PollPolicy::default(),
//!     PayerContext::default(),
//!     Continuation::new(|| println!("contact details unlocked")),
//! );
//!
//! gate.submit_phone("250788123456")?;
//! let outcome = gate.wait_for_outcome().await;
//! println!("{}", outcome.status_line());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod attempt;
mod backend;
mod config;
mod continuation;
mod gate;

pub use backend::GateBackend;
pub use config::{GateConfig, PayerContext, PollPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};
pub use continuation::Continuation;
pub use gate::PaymentGate;
