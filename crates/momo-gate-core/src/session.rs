//! Payment session: the mutable record of one payment attempt.

use crate::ids::{ExternalReference, ProviderReferenceId};
use crate::ports::AccessToken;
use crate::status::{FailureReason, GateState, ProviderStatus, SessionStatus};

/// State of a single payment attempt.
///
/// A session belongs to exactly one gate and one attempt. It is never reused:
/// a retry always starts from a new session with a new external reference.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    /// Reference sent to the provider as `externalId`.
    pub external_reference: ExternalReference,
    /// Bearer token for this attempt, once obtained.
    pub access_token: Option<AccessToken>,
    /// Provider reference, once the request-to-pay was accepted.
    pub provider_reference_id: Option<ProviderReferenceId>,
    /// Current status.
    pub status: SessionStatus,
    /// Status probes issued so far.
    pub attempts_polled: u32,
    /// Set when `status` is `Error`.
    pub failure: Option<FailureReason>,
}

impl PaymentSession {
    /// Open a session for the given external reference.
    #[must_use]
    pub fn new(external_reference: ExternalReference) -> Self {
        Self {
            external_reference,
            access_token: None,
            provider_reference_id: None,
            status: SessionStatus::Pending,
            attempts_polled: 0,
            failure: None,
        }
    }

    /// End the session with a remote-call failure.
    pub fn fail(&mut self, reason: FailureReason) {
        self.status = SessionStatus::Error;
        self.failure = Some(reason);
    }

    /// Fold a probe result into the session.
    ///
    /// `PENDING` on the last allowed poll turns into `TimedOut`.
    pub fn record_poll(&mut self, status: ProviderStatus, max_attempts: u32) {
        self.status = match status {
            ProviderStatus::Successful => SessionStatus::Successful,
            ProviderStatus::Failed => SessionStatus::Failed,
            ProviderStatus::Rejected => SessionStatus::Rejected,
            ProviderStatus::Pending if self.attempts_polled >= max_attempts => {
                SessionStatus::TimedOut
            }
            ProviderStatus::Pending => SessionStatus::Pending,
        };
    }

    /// Gate state derived from the session.
    #[must_use]
    pub fn gate_state(&self, max_attempts: u32) -> GateState {
        match self.status {
            SessionStatus::Pending => GateState::Processing {
                attempt: self.attempts_polled,
                max_attempts,
            },
            SessionStatus::Successful => GateState::Succeeded,
            SessionStatus::Failed => GateState::Failed {
                reason: FailureReason::Failed,
            },
            SessionStatus::Rejected => GateState::Failed {
                reason: FailureReason::Rejected,
            },
            SessionStatus::TimedOut => GateState::Failed {
                reason: FailureReason::Timeout,
            },
            SessionStatus::Error => GateState::Failed {
                reason: self
                    .failure
                    .clone()
                    .unwrap_or_else(|| FailureReason::Exception("unknown error".into())),
            },
        }
    }
}
