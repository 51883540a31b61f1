//! HTTP API for MoMo payment gates.
//!
//! A client opens a gate for some paid content (a listing to publish, a
//! lease, a landlord's contact details), submits the payer's MoMo number and
//! polls the gate until the payment settles. A confirmed payment records an
//! unlock that the client can check afterwards.
//!
//! # Authentication
//!
//! Every `/v1` route requires a marketplace session JWT (HS256) in the
//! `Authorization: Bearer` header.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Axum handlers all return Result
#![allow(clippy::missing_errors_doc)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod registry;
pub mod routes;
pub mod state;

pub use config::{FeeSchedule, ServiceConfig};
pub use error::ApiError;
pub use ledger::{Unlock, UnlockLedger};
pub use registry::{GateEntry, GateLimitReached, GateRegistry};
pub use routes::create_router;
pub use state::AppState;
