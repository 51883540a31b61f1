//! MTN MoMo Collection API client.
//!
//! This crate implements the remote operations of the payment gate
//! (`AccessTokenProvider`, `PaymentInitiator`, `PaymentStatusProbe`) against
//! the MoMo Collection API.
//!
//! # Example
//!
//! ```no_run
//! use momo_gate_client::{MomoClient, MomoConfig};
//! use momo_gate_core::AccessTokenProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MomoClient::new(MomoConfig::new(
//!     "subscription-key",
//!     "api-user-uuid",
//!     "api-key",
//! ))?;
//!
//! let token = client.obtain_access_token().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod config;
mod error;
mod types;

pub use client::MomoClient;
pub use config::{MomoConfig, SANDBOX_BASE_URL};
pub use error::ClientError;
pub use types::*;
