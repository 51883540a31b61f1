//! Request and response types for the MoMo Collection API.

use serde::{Deserialize, Serialize};

/// `POST /token/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token.
    pub access_token: String,
    /// Token type (`access_token`).
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Party identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    /// Always `MSISDN` for this gate.
    pub party_id_type: String,
    /// Phone number.
    pub party_id: String,
}

impl Party {
    /// A phone-number party.
    #[must_use]
    pub fn msisdn(number: impl Into<String>) -> Self {
        Self {
            party_id_type: "MSISDN".to_string(),
            party_id: number.into(),
        }
    }
}

/// `POST /requesttopay` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestToPay {
    /// Amount as a decimal string.
    pub amount: String,
    /// ISO 4217 currency.
    pub currency: String,
    /// Caller-generated reference.
    pub external_id: String,
    /// Who pays.
    pub payer: Party,
    /// Shown to the payer.
    pub payer_message: String,
    /// Shown on the payee statement.
    pub payee_note: String,
}

/// `GET /requesttopay/{referenceId}` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestToPayStatus {
    /// `PENDING`, `SUCCESSFUL`, `FAILED` or `REJECTED`.
    pub status: String,
    /// Provider transaction id once successful.
    #[serde(default)]
    pub financial_transaction_id: Option<String>,
    /// Echo of the external reference.
    #[serde(default)]
    pub external_id: Option<String>,
    /// Amount echoed back.
    #[serde(default)]
    pub amount: Option<String>,
    /// Currency echoed back.
    #[serde(default)]
    pub currency: Option<String>,
    /// Failure reason; a string or an object depending on the environment.
    #[serde(default)]
    pub reason: Option<serde_json::Value>,
}

/// MoMo error body.
#[derive(Debug, Clone, Deserialize)]
pub struct MomoErrorResponse {
    /// Error code, e.g. `RESOURCE_NOT_FOUND`.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
}
