//! The remote operations a gate talks to.

use std::fmt;
use std::sync::Arc;

use momo_gate_core::{AccessTokenProvider, PaymentInitiator, PaymentStatusProbe};

/// Bundle of the three remote operations.
#[derive(Clone)]
pub struct GateBackend {
    /// Access token source.
    pub tokens: Arc<dyn AccessTokenProvider>,
    /// Request-to-pay submitter.
    pub initiator: Arc<dyn PaymentInitiator>,
    /// Status reader.
    pub probe: Arc<dyn PaymentStatusProbe>,
}

impl GateBackend {
    /// Bundle three independent implementations.
    #[must_use]
    pub fn new(
        tokens: Arc<dyn AccessTokenProvider>,
        initiator: Arc<dyn PaymentInitiator>,
        probe: Arc<dyn PaymentStatusProbe>,
    ) -> Self {
        Self {
            tokens,
            initiator,
            probe,
        }
    }

    /// Use one client for all three operations.
    #[must_use]
    pub fn shared<T>(client: Arc<T>) -> Self
    where
        T: AccessTokenProvider + PaymentInitiator + PaymentStatusProbe + 'static,
    {
        Self {
            tokens: client.clone(),
            initiator: client.clone(),
            probe: client,
        }
    }
}

impl fmt::Debug for GateBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateBackend").finish_non_exhaustive()
    }
}
