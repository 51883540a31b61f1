//! Unlock lookups.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use momo_gate_core::PurposeContext;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Unlock status response.
#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    /// Whether the caller has paid for this content.
    pub unlocked: bool,
    /// When the payment was confirmed.
    pub granted_at: Option<DateTime<Utc>>,
}

/// Check whether the caller has unlocked `target` for `purpose`.
pub async fn get_unlock(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path((purpose, target)): Path<(String, String)>,
) -> Result<Json<UnlockResponse>, ApiError> {
    let purpose: PurposeContext = purpose.parse()?;
    let unlock = state.unlocks.get(auth.user_id, purpose, target.trim());

    Ok(Json(UnlockResponse {
        unlocked: unlock.is_some(),
        granted_at: unlock.map(|u| u.granted_at),
    }))
}
