//! Payment gate handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use momo_gate::{Continuation, GateConfig, PayerContext, PaymentGate};
use momo_gate_core::{Currency, GateId, GateState, PurposeContext};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::ledger::Unlock;
use crate::registry::GateEntry;
use crate::state::AppState;

/// Longest accepted unlock target.
const MAX_TARGET_LEN: usize = 128;

/// Open gate request.
#[derive(Debug, Deserialize)]
pub struct CreateGateRequest {
    /// `list`, `lease`, `contact` or `generic`.
    pub purpose: String,
    /// Identifier of the content the fee unlocks.
    pub target: String,
}

/// Submit request.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Payer MSISDN, 12 digits.
    pub payer_phone: String,
}

/// What the payer sees.
#[derive(Debug, Serialize)]
pub struct GateView {
    /// Gate ID.
    pub gate_id: String,
    /// Purpose tag.
    pub purpose: PurposeContext,
    /// Content the fee unlocks.
    pub target: String,
    /// Fee in minor units.
    pub fee_minor: i64,
    /// Currency code.
    pub currency: &'static str,
    /// Heading.
    pub title: &'static str,
    /// Payment prompt.
    pub prompt: String,
    /// `awaiting_input`, `processing`, `succeeded` or `failed`.
    pub state: &'static str,
    /// One line describing the state.
    pub status_line: String,
    /// Polls issued so far while processing.
    pub attempt: Option<u32>,
    /// Poll ceiling.
    pub max_attempts: u32,
    /// Failure reason.
    pub reason: Option<String>,
    /// When the gate was opened.
    pub created_at: DateTime<Utc>,
}

impl From<&GateEntry> for GateView {
    fn from(entry: &GateEntry) -> Self {
        let gate = &entry.gate;
        let config = gate.config();
        let state = gate.state();

        let attempt = match &state {
            GateState::Processing { attempt, .. } => Some(*attempt),
            _ => None,
        };

        Self {
            gate_id: gate.id().to_string(),
            purpose: config.purpose(),
            target: entry.target.clone(),
            fee_minor: config.fee_minor(),
            currency: Currency::Rwf.code(),
            title: config.title(),
            prompt: config.prompt(),
            state: state.name(),
            status_line: state.status_line(),
            attempt,
            max_attempts: gate.policy().max_attempts,
            reason: state.failure().map(ToString::to_string),
            created_at: entry.created_at,
        }
    }
}

/// Open a payment gate for the caller.
pub async fn create_gate(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<CreateGateRequest>,
) -> Result<(StatusCode, Json<GateView>), ApiError> {
    let purpose: PurposeContext = request.purpose.parse()?;
    let target = request.target.trim().to_string();
    if target.is_empty() || target.len() > MAX_TARGET_LEN {
        return Err(ApiError::BadRequest(format!(
            "target must be 1 to {MAX_TARGET_LEN} characters"
        )));
    }

    let backend = state
        .backend
        .clone()
        .ok_or_else(|| ApiError::ExternalService("MoMo is not configured".into()))?;

    let config = GateConfig::new(state.config.fees.fee_for(purpose), purpose)?;

    let gate_id = GateId::generate();

    let continuation = {
        let ledger = Arc::clone(&state.unlocks);
        let gates = Arc::clone(&state.gates);
        let user_id = auth.user_id;
        let target = target.clone();
        Continuation::new(move || {
            ledger.grant(Unlock {
                user_id,
                purpose,
                target,
                granted_at: Utc::now(),
            });
            gates.release(gate_id);
        })
    };

    let gate = PaymentGate::new(
        backend,
        config,
        state.config.poll_policy,
        PayerContext::user(auth.user_id),
        continuation,
    )
    .with_id(gate_id);

    let entry = GateEntry {
        owner: auth.user_id,
        target,
        gate: Arc::new(gate),
        created_at: Utc::now(),
    };

    let view = GateView::from(&entry);
    state.gates.insert(entry)?;

    tracing::info!(
        gate_id = %gate_id,
        user_id = %auth.user_id,
        purpose = %purpose,
        target = %view.target,
        fee_minor = config.fee_minor(),
        "Payment gate opened"
    );

    Ok((StatusCode::CREATED, Json(view)))
}

/// Get one of the caller's gates.
///
/// A gate whose payment succeeded is released, so this returns 404 for it;
/// the unlock endpoint records the success.
pub async fn get_gate(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(gate_id): Path<String>,
) -> Result<Json<GateView>, ApiError> {
    let entry = find_gate(&state, &auth, &gate_id)?;
    Ok(Json(GateView::from(&entry)))
}

/// Start a payment attempt.
pub async fn submit_payment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(gate_id): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<GateView>), ApiError> {
    let entry = find_gate(&state, &auth, &gate_id)?;

    entry.gate.submit_phone(request.payer_phone.trim())?;

    Ok((StatusCode::ACCEPTED, Json(GateView::from(&entry))))
}

/// Return a failed gate to input.
pub async fn reset_gate(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(gate_id): Path<String>,
) -> Result<Json<GateView>, ApiError> {
    let entry = find_gate(&state, &auth, &gate_id)?;

    entry.gate.reset()?;

    Ok(Json(GateView::from(&entry)))
}

/// Close a gate, abandoning any attempt in flight.
pub async fn close_gate(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(gate_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_gate_id(&gate_id)?;

    if !state.gates.close(id, auth.user_id) {
        return Err(ApiError::NotFound(format!("gate not found: {gate_id}")));
    }

    tracing::info!(gate_id = %id, user_id = %auth.user_id, "Payment gate closed");
    Ok(StatusCode::NO_CONTENT)
}

fn find_gate(state: &AppState, auth: &AuthUser, gate_id: &str) -> Result<GateEntry, ApiError> {
    let id = parse_gate_id(gate_id)?;
    state
        .gates
        .get(id, auth.user_id)
        .ok_or_else(|| ApiError::NotFound(format!("gate not found: {gate_id}")))
}

fn parse_gate_id(gate_id: &str) -> Result<GateId, ApiError> {
    gate_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid gate id: {gate_id}")))
}
