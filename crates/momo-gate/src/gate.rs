//! The payment gate state machine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

use momo_gate_core::{GateError, GateId, GateState, PayerPhone, PaymentRequest};

use crate::attempt::Attempt;
use crate::backend::GateBackend;
use crate::config::{GateConfig, PayerContext, PollPolicy};
use crate::continuation::Continuation;

/// Blocks content until a MoMo payment is confirmed.
///
/// A gate starts in `AwaitingInput`. A valid payer phone starts an attempt
/// that runs on its own task; the current [`GateState`] is observable through
/// [`PaymentGate::subscribe`]. On success the continuation fires exactly once.
///
/// Dropping the gate tears it down.
pub struct PaymentGate {
    id: GateId,
    config: GateConfig,
    policy: PollPolicy,
    payer: PayerContext,
    backend: GateBackend,
    state: Arc<watch::Sender<GateState>>,
    continuation: Arc<Continuation>,
    cancel: CancellationToken,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    phone_draft: String,
    task: Option<JoinHandle<()>>,
}

impl PaymentGate {
    /// Create a gate in `AwaitingInput`.
    #[must_use]
    pub fn new(
        backend: GateBackend,
        config: GateConfig,
        policy: PollPolicy,
        payer: PayerContext,
        continuation: Continuation,
    ) -> Self {
        let (state, _) = watch::channel(GateState::AwaitingInput);

        Self {
            id: GateId::generate(),
            config,
            policy,
            payer,
            backend,
            state: Arc::new(state),
            continuation: Arc::new(continuation),
            cancel: CancellationToken::new(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Use a caller-chosen identifier, e.g. one the continuation refers to.
    #[must_use]
    pub fn with_id(mut self, id: GateId) -> Self {
        self.id = id;
        self
    }

    /// Gate identifier.
    #[must_use]
    pub const fn id(&self) -> GateId {
        self.id
    }

    /// Fee and purpose.
    #[must_use]
    pub const fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Polling policy.
    #[must_use]
    pub const fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// The session this gate was opened for.
    #[must_use]
    pub const fn payer(&self) -> &PayerContext {
        &self.payer
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> GateState {
        self.state.borrow().clone()
    }

    /// Watch state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.state.subscribe()
    }

    /// Whether the gate has been torn down.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Update the phone draft. Returns whether submission is enabled.
    pub fn set_phone(&self, input: &str) -> bool {
        let mut inner = self.lock();
        input.clone_into(&mut inner.phone_draft);
        PayerPhone::is_valid(input) && self.can_submit()
    }

    /// Submit the current phone draft.
    ///
    /// # Errors
    ///
    /// See [`PaymentGate::submit_phone`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn submit(&self) -> Result<(), GateError> {
        let draft = self.lock().phone_draft.clone();
        self.submit_phone(&draft)
    }

    /// Start a payment attempt for `input`.
    ///
    /// # Errors
    ///
    /// - `TornDown` after [`PaymentGate::teardown`].
    /// - `InvalidPhone` if `input` is not a valid MSISDN; the gate stays in
    ///   `AwaitingInput` and no remote call is made.
    /// - `NotAwaitingInput` if an attempt is running or the gate has finished.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn submit_phone(&self, input: &str) -> Result<(), GateError> {
        if self.is_torn_down() {
            return Err(GateError::TornDown);
        }

        let payer_phone = PayerPhone::parse(input)?;

        let mut inner = self.lock();
        if !self.can_submit() {
            return Err(GateError::NotAwaitingInput);
        }

        let request =
            PaymentRequest::new(self.config.fee_minor(), payer_phone, self.config.purpose())?;
        input.clone_into(&mut inner.phone_draft);

        self.state.send_replace(GateState::Processing {
            attempt: 0,
            max_attempts: self.policy.max_attempts,
        });

        let span = info_span!(
            "payment_attempt",
            gate_id = %self.id,
            purpose = %self.config.purpose(),
            user_id = ?self.payer.user_id,
        );

        let attempt = Attempt {
            backend: self.backend.clone(),
            request,
            policy: self.policy,
            cancel: self.cancel.child_token(),
            state: Arc::clone(&self.state),
        };
        let cancel = self.cancel.clone();
        let state = Arc::clone(&self.state);
        let continuation = Arc::clone(&self.continuation);

        let task = tokio::spawn(
            async move {
                let Some(outcome) = attempt.run().await else {
                    return;
                };
                if cancel.is_cancelled() {
                    return;
                }
                if outcome == GateState::Succeeded {
                    if !continuation.fire() {
                        return;
                    }
                    info!("Content unlocked");
                }
                state.send_replace(outcome);
            }
            .instrument(span),
        );

        inner.task = Some(task);
        Ok(())
    }

    /// Return a failed gate to `AwaitingInput` so the payer can start over.
    ///
    /// The next submission opens a new session with a new external reference.
    ///
    /// # Errors
    ///
    /// - `TornDown` after [`PaymentGate::teardown`].
    /// - `NotFailed` unless the last attempt failed.
    pub fn reset(&self) -> Result<(), GateError> {
        if self.is_torn_down() {
            return Err(GateError::TornDown);
        }

        let _inner = self.lock();
        if self.state.borrow().failure().is_none() {
            return Err(GateError::NotFailed);
        }
        self.state.send_replace(GateState::AwaitingInput);
        debug!(gate_id = %self.id, "Gate reset for a new attempt");
        Ok(())
    }

    /// Stop any running attempt and disarm the continuation.
    ///
    /// Idempotent. No poll is issued and no state is published afterwards.
    pub fn teardown(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        self.continuation.discard();
        self.lock().task.take();
        debug!(gate_id = %self.id, "Gate torn down");
    }

    /// Wait until the current attempt ends.
    ///
    /// Resolves immediately with the current state if the gate is not
    /// processing, or when the gate is torn down.
    pub async fn wait_for_outcome(&self) -> GateState {
        let mut rx = self.subscribe();
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {}
            _ = rx.wait_for(|state| !matches!(state, GateState::Processing { .. })) => {}
        }
        self.state()
    }

    fn can_submit(&self) -> bool {
        !self.is_torn_down() && *self.state.borrow() == GateState::AwaitingInput
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PaymentGate {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for PaymentGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentGate")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
