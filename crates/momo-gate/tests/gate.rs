//! Payment gate behaviour against a scripted backend.
//!
//! Time is paused, so the 3 second poll interval costs nothing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use momo_gate::{Continuation, GateBackend, GateConfig, PayerContext, PaymentGate, PollPolicy};
use momo_gate_core::{
    AccessToken, AccessTokenProvider, FailureReason, GateError, GateId, GateState, InitiatePayment,
    InitiationReceipt, PaymentInitiator, PaymentStatusProbe, ProviderReferenceId,
    ProviderStatus, PurposeContext, RemoteError,
};

const VALID_PHONE: &str = "250788123456";

// ============================================================================
// Scripted backend
// ============================================================================

/// Replays queued answers; falls back to a token, a fresh reference and
/// `PENDING` once a queue runs dry.
#[derive(Default)]
struct Scripted {
    tokens: Mutex<VecDeque<Result<AccessToken, RemoteError>>>,
    receipts: Mutex<VecDeque<Result<InitiationReceipt, RemoteError>>>,
    statuses: Mutex<VecDeque<Result<ProviderStatus, RemoteError>>>,
    token_calls: AtomicUsize,
    initiations: Mutex<Vec<InitiatePayment>>,
    polls: Mutex<Vec<ProviderReferenceId>>,
}

impl Scripted {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_statuses(statuses: impl IntoIterator<Item = ProviderStatus>) -> Arc<Self> {
        let scripted = Self::default();
        scripted
            .statuses
            .lock()
            .unwrap()
            .extend(statuses.into_iter().map(Ok));
        Arc::new(scripted)
    }

    fn push_token(&self, answer: Result<AccessToken, RemoteError>) {
        self.tokens.lock().unwrap().push_back(answer);
    }

    fn push_receipt(&self, answer: Result<InitiationReceipt, RemoteError>) {
        self.receipts.lock().unwrap().push_back(answer);
    }

    fn push_status(&self, answer: Result<ProviderStatus, RemoteError>) {
        self.statuses.lock().unwrap().push_back(answer);
    }

    fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    fn initiations(&self) -> Vec<InitiatePayment> {
        self.initiations.lock().unwrap().clone()
    }

    fn polls(&self) -> Vec<ProviderReferenceId> {
        self.polls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccessTokenProvider for Scripted {
    async fn obtain_access_token(&self) -> Result<AccessToken, RemoteError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AccessToken::new("token")))
    }
}

#[async_trait]
impl PaymentInitiator for Scripted {
    async fn initiate_payment(
        &self,
        request: &InitiatePayment,
    ) -> Result<InitiationReceipt, RemoteError> {
        self.initiations.lock().unwrap().push(request.clone());
        self.receipts.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(InitiationReceipt {
                provider_reference_id: Some(ProviderReferenceId::new(
                    uuid::Uuid::new_v4().to_string(),
                )),
            })
        })
    }
}

#[async_trait]
impl PaymentStatusProbe for Scripted {
    async fn query_payment_status(
        &self,
        _access_token: &AccessToken,
        reference: &ProviderReferenceId,
    ) -> Result<ProviderStatus, RemoteError> {
        self.polls.lock().unwrap().push(reference.clone());
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(ProviderStatus::Pending))
    }
}

struct Harness {
    gate: PaymentGate,
    backend: Arc<Scripted>,
    unlocked: Arc<AtomicUsize>,
}

impl Harness {
    fn new(backend: Arc<Scripted>) -> Self {
        Self::with_purpose(backend, PurposeContext::Contact)
    }

    fn with_purpose(backend: Arc<Scripted>, purpose: PurposeContext) -> Self {
        let unlocked = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&unlocked);
        let gate = PaymentGate::new(
            GateBackend::shared(Arc::clone(&backend)),
            GateConfig::new(1000, purpose).unwrap(),
            PollPolicy::default(),
            PayerContext::default(),
            Continuation::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        Self {
            gate,
            backend,
            unlocked,
        }
    }

    fn unlocked(&self) -> usize {
        self.unlocked.load(Ordering::SeqCst)
    }
}

fn failed(reason: FailureReason) -> GateState {
    GateState::Failed { reason }
}

// ============================================================================
// Input validation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn short_phone_is_rejected_without_remote_calls() {
    let h = Harness::new(Scripted::new());

    assert!(!h.gate.set_phone("12345"));
    assert_eq!(
        h.gate.submit(),
        Err(GateError::InvalidPhone { expected: 12 })
    );
    assert_eq!(h.gate.state(), GateState::AwaitingInput);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.backend.token_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn twelve_digit_phone_enables_submission() {
    let h = Harness::new(Scripted::with_statuses([ProviderStatus::Successful]));

    assert!(h.gate.set_phone(VALID_PHONE));
    h.gate.submit().unwrap();

    assert!(matches!(h.gate.state(), GateState::Processing { .. }));
    assert!(!h.gate.set_phone(VALID_PHONE));
}

// ============================================================================
// Outcomes
// ============================================================================

#[tokio::test(start_paused = true)]
async fn success_on_first_poll_fires_continuation_once() {
    let h = Harness::new(Scripted::with_statuses([ProviderStatus::Successful]));

    h.gate.submit_phone(VALID_PHONE).unwrap();
    let outcome = h.gate.wait_for_outcome().await;

    assert_eq!(outcome, GateState::Succeeded);
    assert_eq!(h.unlocked(), 1);
    assert_eq!(h.backend.polls().len(), 1);

    let initiations = h.backend.initiations();
    assert_eq!(initiations.len(), 1);
    assert_eq!(initiations[0].amount_minor, 1000);
    assert_eq!(initiations[0].currency.code(), "RWF");
    assert_eq!(initiations[0].payer_phone.as_str(), VALID_PHONE);
    assert_eq!(initiations[0].payer_message, "KigaliCribs contact-info fee");
    assert_eq!(
        initiations[0].external_reference.namespace(),
        "kc-contact"
    );
}

#[tokio::test(start_paused = true)]
async fn pending_for_every_attempt_times_out() {
    let h = Harness::new(Scripted::new());
    let started = Instant::now();

    h.gate.submit_phone(VALID_PHONE).unwrap();
    let outcome = h.gate.wait_for_outcome().await;

    assert_eq!(outcome, failed(FailureReason::Timeout));
    assert_eq!(h.backend.polls().len(), 10);
    assert_eq!(h.unlocked(), 0);

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(30));
    assert!(elapsed < Duration::from_secs(31));
}

#[tokio::test(start_paused = true)]
async fn rejection_on_third_poll_stops_polling() {
    let h = Harness::new(Scripted::with_statuses([
        ProviderStatus::Pending,
        ProviderStatus::Pending,
        ProviderStatus::Rejected,
    ]));

    h.gate.submit_phone(VALID_PHONE).unwrap();
    assert_eq!(
        h.gate.wait_for_outcome().await,
        failed(FailureReason::Rejected)
    );

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.backend.polls().len(), 3);
    assert_eq!(h.unlocked(), 0);
}

#[tokio::test(start_paused = true)]
async fn provider_failure_is_reported_as_failed() {
    let h = Harness::new(Scripted::with_statuses([ProviderStatus::Failed]));

    h.gate.submit_phone(VALID_PHONE).unwrap();
    assert_eq!(h.gate.wait_for_outcome().await, failed(FailureReason::Failed));
    assert_eq!(
        h.gate.state().status_line(),
        "Payment failed: failed"
    );
}

#[tokio::test(start_paused = true)]
async fn missing_reference_fails_initiation_without_polling() {
    let backend = Scripted::new();
    backend.push_receipt(Ok(InitiationReceipt {
        provider_reference_id: None,
    }));
    let h = Harness::new(backend);

    h.gate.submit_phone(VALID_PHONE).unwrap();
    assert_eq!(
        h.gate.wait_for_outcome().await,
        failed(FailureReason::InitiationError)
    );

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(h.backend.polls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn refused_initiation_is_an_initiation_error() {
    let backend = Scripted::new();
    backend.push_receipt(Err(RemoteError::Rejected {
        status: 400,
        message: "PAYER_NOT_FOUND".into(),
    }));
    let h = Harness::new(backend);

    h.gate.submit_phone(VALID_PHONE).unwrap();
    assert_eq!(
        h.gate.wait_for_outcome().await,
        failed(FailureReason::InitiationError)
    );
    assert!(h.backend.polls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn refused_token_is_a_token_error() {
    let backend = Scripted::new();
    backend.push_token(Err(RemoteError::Rejected {
        status: 401,
        message: "invalid credentials".into(),
    }));
    let h = Harness::new(backend);

    h.gate.submit_phone(VALID_PHONE).unwrap();
    assert_eq!(
        h.gate.wait_for_outcome().await,
        failed(FailureReason::TokenError)
    );
    assert!(h.backend.initiations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn transport_error_while_authorising_is_an_exception() {
    let backend = Scripted::new();
    backend.push_token(Err(RemoteError::Unexpected("connection refused".into())));
    let h = Harness::new(backend);

    h.gate.submit_phone(VALID_PHONE).unwrap();
    let outcome = h.gate.wait_for_outcome().await;

    assert_eq!(
        outcome,
        failed(FailureReason::Exception("connection refused".into()))
    );
    assert_eq!(
        outcome.status_line(),
        "Payment failed: exception: connection refused"
    );
}

#[tokio::test(start_paused = true)]
async fn probe_error_ends_the_loop() {
    let backend = Scripted::new();
    backend.push_status(Ok(ProviderStatus::Pending));
    backend.push_status(Err(RemoteError::Unexpected("timed out".into())));
    let h = Harness::new(backend);

    h.gate.submit_phone(VALID_PHONE).unwrap();
    assert_eq!(
        h.gate.wait_for_outcome().await,
        failed(FailureReason::Exception("timed out".into()))
    );

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.backend.polls().len(), 2);
}

// ============================================================================
// Progress
// ============================================================================

#[tokio::test(start_paused = true)]
async fn progress_is_observable_while_polling() {
    let h = Harness::new(Scripted::with_statuses([
        ProviderStatus::Pending,
        ProviderStatus::Successful,
    ]));
    let mut rx = h.gate.subscribe();

    h.gate.submit_phone(VALID_PHONE).unwrap();

    let seen = rx
        .wait_for(|state| matches!(state, GateState::Processing { attempt: 1, .. }))
        .await
        .unwrap()
        .clone();
    assert_eq!(seen.status_line(), "Processing payment... (try 1/10)");

    assert_eq!(h.gate.wait_for_outcome().await, GateState::Succeeded);
}

// ============================================================================
// Teardown and retries
// ============================================================================

#[tokio::test(start_paused = true)]
async fn teardown_mid_poll_stops_polling_and_never_unlocks() {
    let backend = Scripted::new();
    for _ in 0..2 {
        backend.push_status(Ok(ProviderStatus::Pending));
    }
    backend.push_status(Ok(ProviderStatus::Successful));
    let h = Harness::new(backend);
    let mut rx = h.gate.subscribe();

    h.gate.submit_phone(VALID_PHONE).unwrap();
    rx.wait_for(|state| matches!(state, GateState::Processing { attempt: 2, .. }))
        .await
        .unwrap();

    h.gate.teardown();
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(h.backend.polls().len(), 2);
    assert_eq!(h.unlocked(), 0);
    assert!(matches!(h.gate.state(), GateState::Processing { attempt: 2, .. }));
    assert_eq!(h.gate.submit_phone(VALID_PHONE), Err(GateError::TornDown));
}

#[tokio::test(start_paused = true)]
async fn teardown_after_success_does_not_fire_again() {
    let h = Harness::new(Scripted::with_statuses([ProviderStatus::Successful]));

    h.gate.submit_phone(VALID_PHONE).unwrap();
    assert_eq!(h.gate.wait_for_outcome().await, GateState::Succeeded);

    h.gate.teardown();
    h.gate.teardown();

    assert_eq!(h.unlocked(), 1);
    assert_eq!(h.gate.state(), GateState::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn continuation_may_release_the_last_gate_handle() {
    let backend = Scripted::with_statuses([ProviderStatus::Successful]);
    let slot: Arc<Mutex<Option<Arc<PaymentGate>>>> = Arc::default();
    let release = Arc::clone(&slot);
    let id = GateId::generate();

    let gate = PaymentGate::new(
        GateBackend::shared(Arc::clone(&backend)),
        GateConfig::default(),
        PollPolicy::default(),
        PayerContext::default(),
        Continuation::new(move || {
            release.lock().unwrap().take();
        }),
    )
    .with_id(id);
    assert_eq!(gate.id(), id);

    let mut rx = gate.subscribe();
    gate.submit_phone(VALID_PHONE).unwrap();
    *slot.lock().unwrap() = Some(Arc::new(gate));

    let outcome = rx.wait_for(GateState::is_terminal).await.unwrap().clone();

    assert_eq!(outcome, GateState::Succeeded);
    assert!(slot.lock().unwrap().is_none());
    assert_eq!(backend.polls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_gate_abandons_the_attempt() {
    let h = Harness::new(Scripted::new());
    let Harness {
        gate,
        backend,
        unlocked,
    } = h;

    gate.submit_phone(VALID_PHONE).unwrap();
    tokio::time::sleep(Duration::from_millis(3500)).await;
    drop(gate);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(backend.polls().len(), 1);
    assert_eq!(unlocked.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn retry_after_timeout_uses_fresh_references() {
    let backend = Scripted::with_statuses(
        std::iter::repeat(ProviderStatus::Pending)
            .take(10)
            .chain([ProviderStatus::Successful]),
    );
    let h = Harness::new(backend);

    h.gate.submit_phone(VALID_PHONE).unwrap();
    assert_eq!(
        h.gate.wait_for_outcome().await,
        failed(FailureReason::Timeout)
    );
    assert_eq!(h.gate.submit_phone(VALID_PHONE), Err(GateError::NotAwaitingInput));

    h.gate.reset().unwrap();
    assert_eq!(h.gate.state(), GateState::AwaitingInput);
    h.gate.submit_phone(VALID_PHONE).unwrap();
    assert_eq!(h.gate.wait_for_outcome().await, GateState::Succeeded);

    let initiations = h.backend.initiations();
    assert_eq!(initiations.len(), 2);
    assert_ne!(
        initiations[0].external_reference,
        initiations[1].external_reference
    );

    let polls = h.backend.polls();
    assert_eq!(polls.len(), 11);
    assert!(polls[..10].iter().all(|r| *r == polls[0]));
    assert_ne!(polls[10], polls[0]);

    assert_eq!(h.backend.token_calls(), 2);
    assert_eq!(h.unlocked(), 1);
}

#[tokio::test(start_paused = true)]
async fn reset_requires_a_failed_attempt() {
    let h = Harness::with_purpose(
        Scripted::with_statuses([ProviderStatus::Successful]),
        PurposeContext::Lease,
    );

    assert_eq!(h.gate.reset(), Err(GateError::NotFailed));

    h.gate.submit_phone(VALID_PHONE).unwrap();
    assert_eq!(h.gate.reset(), Err(GateError::NotFailed));
    assert_eq!(h.gate.wait_for_outcome().await, GateState::Succeeded);
    assert_eq!(h.gate.reset(), Err(GateError::NotFailed));
}
