//! One payment attempt: token, request-to-pay, then the poll loop.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use momo_gate_core::{
    FailureReason, GateState, InitiatePayment, PaymentRequest, PaymentSession, RemoteError,
};

use crate::backend::GateBackend;
use crate::config::PollPolicy;

/// Everything one attempt needs. Owns its session for its whole life.
pub(crate) struct Attempt {
    pub(crate) backend: GateBackend,
    pub(crate) request: PaymentRequest,
    pub(crate) policy: PollPolicy,
    pub(crate) cancel: CancellationToken,
    pub(crate) state: Arc<watch::Sender<GateState>>,
}

impl Attempt {
    /// Drive the attempt to a terminal state.
    ///
    /// Returns `None` if the attempt was cancelled; nothing is published after
    /// cancellation.
    pub(crate) async fn run(self) -> Option<GateState> {
        let max_attempts = self.policy.max_attempts;
        let mut session = PaymentSession::new(self.request.external_reference.clone());

        info!(
            external_reference = %session.external_reference,
            amount_minor = self.request.amount_minor,
            "Payment attempt started"
        );

        let token = match self.guarded(self.backend.tokens.obtain_access_token()).await? {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to obtain access token");
                session.fail(classify(e, FailureReason::TokenError));
                return Some(session.gate_state(max_attempts));
            }
        };
        session.access_token = Some(token.clone());

        let initiate = InitiatePayment {
            access_token: token.clone(),
            amount_minor: self.request.amount_minor,
            currency: self.request.currency,
            external_reference: self.request.external_reference.clone(),
            payer_phone: self.request.payer_phone.clone(),
            payer_message: self.request.payer_message(),
        };

        let receipt = match self
            .guarded(self.backend.initiator.initiate_payment(&initiate))
            .await?
        {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(error = %e, "Failed to initiate payment");
                session.fail(classify(e, FailureReason::InitiationError));
                return Some(session.gate_state(max_attempts));
            }
        };

        let Some(reference) = receipt.provider_reference_id else {
            warn!("Provider accepted the request without a reference id");
            session.fail(FailureReason::InitiationError);
            return Some(session.gate_state(max_attempts));
        };
        debug!(provider_reference_id = %reference, "Payment initiated");
        session.provider_reference_id = Some(reference.clone());

        while !session.status.is_terminal() {
            self.guarded(tokio::time::sleep(self.policy.interval)).await?;

            session.attempts_polled += 1;
            self.publish(session.gate_state(max_attempts));

            match self
                .guarded(self.backend.probe.query_payment_status(&token, &reference))
                .await?
            {
                Ok(status) => {
                    debug!(
                        attempt = session.attempts_polled,
                        max_attempts,
                        status = ?status,
                        "Payment status polled"
                    );
                    session.record_poll(status, max_attempts);
                }
                Err(e) => {
                    warn!(attempt = session.attempts_polled, error = %e, "Status probe failed");
                    session.fail(FailureReason::Exception(e.to_string()));
                }
            }
        }

        let outcome = session.gate_state(max_attempts);
        info!(
            attempts_polled = session.attempts_polled,
            outcome = %outcome.status_line(),
            "Payment attempt finished"
        );
        Some(outcome)
    }

    /// Await `fut` unless the attempt is cancelled first.
    async fn guarded<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                debug!("Payment attempt cancelled");
                None
            }
            output = fut => Some(output),
        }
    }

    fn publish(&self, state: GateState) {
        if !self.cancel.is_cancelled() {
            self.state.send_replace(state);
        }
    }
}

/// A refusal by the provider keeps the step's own reason; anything else is
/// reported as an exception.
fn classify(error: RemoteError, refused: FailureReason) -> FailureReason {
    match error {
        RemoteError::Rejected { .. } => refused,
        RemoteError::Unexpected(message) => FailureReason::Exception(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refusals_keep_step_reason() {
        let refused = RemoteError::Rejected {
            status: 500,
            message: "nope".into(),
        };
        assert_eq!(
            classify(refused, FailureReason::TokenError),
            FailureReason::TokenError
        );
        assert_eq!(
            classify(
                RemoteError::Unexpected("dns".into()),
                FailureReason::TokenError
            ),
            FailureReason::Exception("dns".into())
        );
    }
}
