//! Common test utilities for gate service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum_test::TestServer;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use momo_gate::{GateBackend, PollPolicy};
use momo_gate_core::{
    AccessToken, AccessTokenProvider, InitiatePayment, InitiationReceipt, PaymentInitiator,
    PaymentStatusProbe, ProviderReferenceId, ProviderStatus, RemoteError, UserId,
};
use momo_gate_service::{create_router, AppState, ServiceConfig};

/// Shared secret for JWT tests.
pub const AUTH_SECRET: &str = "test-session-secret";

/// In-process MoMo stand-in that settles every payment the same way.
pub struct FakeMomo {
    outcome: ProviderStatus,
    initiations: AtomicUsize,
    polls: AtomicUsize,
}

impl FakeMomo {
    pub fn settling_as(outcome: ProviderStatus) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            initiations: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
        })
    }

    pub fn initiations(&self) -> usize {
        self.initiations.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccessTokenProvider for FakeMomo {
    async fn obtain_access_token(&self) -> Result<AccessToken, RemoteError> {
        Ok(AccessToken::new("fake-token"))
    }
}

#[async_trait]
impl PaymentInitiator for FakeMomo {
    async fn initiate_payment(
        &self,
        _request: &InitiatePayment,
    ) -> Result<InitiationReceipt, RemoteError> {
        let n = self.initiations.fetch_add(1, Ordering::SeqCst);
        Ok(InitiationReceipt {
            provider_reference_id: Some(ProviderReferenceId::new(format!("ref-{n}"))),
        })
    }
}

#[async_trait]
impl PaymentStatusProbe for FakeMomo {
    async fn query_payment_status(
        &self,
        _access_token: &AccessToken,
        _reference: &ProviderReferenceId,
    ) -> Result<ProviderStatus, RemoteError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(self.outcome)
    }
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The fake provider behind the gates, if any.
    pub momo: Option<Arc<FakeMomo>>,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
}

impl TestHarness {
    /// Harness whose payments succeed on the first poll.
    pub fn new() -> Self {
        Self::settling_as(ProviderStatus::Successful)
    }

    /// Harness whose payments settle with `outcome` on every poll.
    pub fn settling_as(outcome: ProviderStatus) -> Self {
        let momo = FakeMomo::settling_as(outcome);
        Self::build(Some(momo), PollPolicy::new(Duration::from_millis(5), 3))
    }

    /// Harness whose payments stay processing for the length of a test.
    pub fn never_settling() -> Self {
        let momo = FakeMomo::settling_as(ProviderStatus::Pending);
        Self::build(Some(momo), PollPolicy::new(Duration::from_secs(1), 600))
    }

    /// Harness without MoMo credentials.
    pub fn without_momo() -> Self {
        Self::build(None, PollPolicy::default())
    }

    fn build(momo: Option<Arc<FakeMomo>>, poll_policy: PollPolicy) -> Self {
        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            auth_secret: Some(AUTH_SECRET.into()),
            poll_policy,
            ..ServiceConfig::default()
        };

        let backend = momo.clone().map(GateBackend::shared);
        let state = AppState::with_backend(config, backend);

        let server = TestServer::new(create_router(state)).expect("Failed to create test server");

        Self {
            server,
            momo,
            test_user_id: UserId::generate(),
        }
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> HeaderValue {
        bearer(&session_token(&self.test_user_id.to_string(), AUTH_SECRET, 3600))
    }

    /// Get a different user's auth header (for testing isolation).
    pub fn other_user_auth_header() -> HeaderValue {
        bearer(&session_token(&UserId::generate().to_string(), AUTH_SECRET, 3600))
    }

    /// Open a gate and return its id.
    pub async fn open_gate(&self, purpose: &str, target: &str) -> String {
        let response = self.try_open_gate(purpose, target).await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        body["gate_id"].as_str().expect("gate_id").to_string()
    }

    /// Submit a payer phone to a gate.
    pub async fn submit(&self, gate_id: &str, phone: &str) -> axum_test::TestResponse {
        self.server
            .post(&format!("/v1/gates/{gate_id}/submit"))
            .add_header(AUTHORIZATION, self.user_auth_header())
            .json(&json!({ "payer_phone": phone }))
            .await
    }

    /// Fetch a gate view.
    pub async fn gate(&self, gate_id: &str) -> Value {
        let response = self
            .server
            .get(&format!("/v1/gates/{gate_id}"))
            .add_header(AUTHORIZATION, self.user_auth_header())
            .await;
        response.assert_status_ok();
        response.json()
    }

    /// Open-gate request, without asserting on the outcome.
    pub async fn try_open_gate(&self, purpose: &str, target: &str) -> axum_test::TestResponse {
        self.server
            .post("/v1/gates")
            .add_header(AUTHORIZATION, self.user_auth_header())
            .json(&json!({ "purpose": purpose, "target": target }))
            .await
    }

    /// Gates the service still holds, as reported by `/health`.
    pub async fn open_gates(&self) -> u64 {
        let body: Value = self.server.get("/health").await.json();
        body["open_gates"].as_u64().expect("open_gates")
    }

    /// Poll a gate until the service lets go of it, as it does on success.
    pub async fn wait_for_release(&self, gate_id: &str) {
        for _ in 0..400 {
            let response = self
                .server
                .get(&format!("/v1/gates/{gate_id}"))
                .add_header(AUTHORIZATION, self.user_auth_header())
                .await;
            if response.status_code() == axum::http::StatusCode::NOT_FOUND {
                return;
            }
            let view: Value = response.json();
            assert_ne!(view["state"], "failed", "gate {gate_id} failed");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("gate {gate_id} was never released");
    }

    /// Poll a gate until its attempt ends.
    pub async fn wait_for_outcome(&self, gate_id: &str) -> Value {
        for _ in 0..400 {
            let view = self.gate(gate_id).await;
            if view["state"] != "processing" {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("gate {gate_id} never left processing");
    }
}

/// Sign a session token for `sub`, expiring `ttl_seconds` from now.
pub fn session_token(sub: &str, secret: &str, ttl_seconds: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({ "sub": sub, "iat": now, "exp": now + ttl_seconds });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign token")
}

/// `Authorization` header value for a token.
pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).expect("Invalid header value")
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
