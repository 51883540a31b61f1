//! Payment and gate status types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status reported by the provider for a request-to-pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderStatus {
    /// The payer has not approved yet.
    Pending,
    /// The payment went through.
    Successful,
    /// The payment failed on the provider side.
    Failed,
    /// The payer (or provider) rejected the request.
    Rejected,
}

impl ProviderStatus {
    /// Parse a provider status string.
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(Self::Pending),
            "SUCCESSFUL" => Some(Self::Successful),
            "FAILED" => Some(Self::Failed),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Status of a payment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Authorising, initiating or polling.
    #[default]
    Pending,
    /// Confirmed by the provider.
    Successful,
    /// Provider reported FAILED.
    Failed,
    /// Provider reported REJECTED.
    Rejected,
    /// Still pending after the last allowed poll.
    TimedOut,
    /// A remote call failed before a business outcome was known.
    Error,
}

impl SessionStatus {
    /// Whether no further transition can occur.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Why an attempt ended without a payment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// Access token could not be obtained.
    TokenError,
    /// The provider refused the request or returned no reference id.
    InitiationError,
    /// Provider reported REJECTED.
    Rejected,
    /// Provider reported FAILED.
    Failed,
    /// Still pending after the maximum number of polls.
    Timeout,
    /// An unexpected error from one of the remote calls.
    Exception(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenError => f.write_str("token error"),
            Self::InitiationError => f.write_str("initiation error"),
            Self::Rejected => f.write_str("rejected"),
            Self::Failed => f.write_str("failed"),
            Self::Timeout => f.write_str("timeout"),
            Self::Exception(message) => write!(f, "exception: {message}"),
        }
    }
}

/// User-facing projection of a gate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GateState {
    /// Waiting for a valid payer phone number.
    #[default]
    AwaitingInput,
    /// An attempt is in flight. `attempt` is 0 until the first poll.
    Processing {
        /// Polls issued so far.
        attempt: u32,
        /// Poll ceiling.
        max_attempts: u32,
    },
    /// Payment confirmed; content unlocked.
    Succeeded,
    /// Attempt ended without payment.
    Failed {
        /// Human-readable reason.
        reason: FailureReason,
    },
}

impl GateState {
    /// Whether the state ends an attempt.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed { .. })
    }

    /// Snake-case state tag, as serialized.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AwaitingInput => "awaiting_input",
            Self::Processing { .. } => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }

    /// Failure reason, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// One line of text describing the state to the payer.
    #[must_use]
    pub fn status_line(&self) -> String {
        match self {
            Self::AwaitingInput => "Enter your MTN MoMo number".to_string(),
            Self::Processing { attempt: 0, .. } => "Processing payment...".to_string(),
            Self::Processing {
                attempt,
                max_attempts,
            } => format!("Processing payment... (try {attempt}/{max_attempts})"),
            Self::Succeeded => "Payment successful!".to_string(),
            Self::Failed { reason } => format!("Payment failed: {reason}"),
        }
    }
}
