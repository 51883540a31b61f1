//! Remote operations consumed by the payment gate.
//!
//! The gate only knows these three traits. `momo-gate-client` implements
//! them for MTN MoMo; tests implement them with scripted fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{ExternalReference, ProviderReferenceId};
use crate::payment::{Currency, PayerPhone};
use crate::status::ProviderStatus;

/// Short-lived bearer token for the provider API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building an `Authorization` header.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Arguments of a request-to-pay.
#[derive(Debug, Clone)]
pub struct InitiatePayment {
    /// Token from [`AccessTokenProvider::obtain_access_token`].
    pub access_token: AccessToken,
    /// Amount in minor units.
    pub amount_minor: i64,
    /// Currency.
    pub currency: Currency,
    /// Caller-generated reference, unique per attempt.
    pub external_reference: ExternalReference,
    /// Payer MSISDN.
    pub payer_phone: PayerPhone,
    /// Message shown to the payer.
    pub payer_message: String,
}

/// Provider answer to a request-to-pay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InitiationReceipt {
    /// Reference for status queries. `None` means the provider did not
    /// acknowledge the request in a usable way.
    pub provider_reference_id: Option<ProviderReferenceId>,
}

/// Failure of a remote operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The provider answered, but refused the operation.
    #[error("provider refused request ({status}): {message}")]
    Rejected {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider error text.
        message: String,
    },

    /// Transport, decoding or any other unexpected failure.
    #[error("{0}")]
    Unexpected(String),
}

/// Exchanges stored credentials for a bearer token.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Obtain a fresh access token.
    async fn obtain_access_token(&self) -> Result<AccessToken, RemoteError>;
}

/// Submits a request-to-pay.
#[async_trait]
pub trait PaymentInitiator: Send + Sync {
    /// Ask the payer to approve a payment.
    async fn initiate_payment(
        &self,
        request: &InitiatePayment,
    ) -> Result<InitiationReceipt, RemoteError>;
}

/// Reads the status of a request-to-pay.
#[async_trait]
pub trait PaymentStatusProbe: Send + Sync {
    /// Query the current status.
    async fn query_payment_status(
        &self,
        access_token: &AccessToken,
        reference: &ProviderReferenceId,
    ) -> Result<ProviderStatus, RemoteError>;
}
