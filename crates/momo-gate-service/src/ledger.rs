//! Unlocked content, recorded when a gate's payment succeeds.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use momo_gate_core::{PurposeContext, UserId};

/// Content a user has paid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unlock {
    /// Who paid.
    pub user_id: UserId,
    /// What the fee was for.
    pub purpose: PurposeContext,
    /// Listing, property or other identifier the fee unlocks.
    pub target: String,
    /// When the payment was confirmed.
    pub granted_at: DateTime<Utc>,
}

type UnlockKey = (UserId, PurposeContext, String);

/// In-memory record of unlocks.
///
/// Written from gate continuations, which run synchronously on the attempt
/// task, so this uses a blocking lock held only for the map access.
#[derive(Debug, Default)]
pub struct UnlockLedger {
    unlocks: RwLock<HashMap<UnlockKey, Unlock>>,
}

impl UnlockLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an unlock. The first grant wins; repeats keep the original time.
    pub fn grant(&self, unlock: Unlock) {
        let key = (unlock.user_id, unlock.purpose, unlock.target.clone());
        let mut unlocks = self.unlocks.write().unwrap_or_else(PoisonError::into_inner);

        if unlocks.contains_key(&key) {
            tracing::debug!(
                user_id = %unlock.user_id,
                purpose = %unlock.purpose,
                target = %unlock.target,
                "Content already unlocked"
            );
            return;
        }

        tracing::info!(
            user_id = %unlock.user_id,
            purpose = %unlock.purpose,
            target = %unlock.target,
            "Content unlocked"
        );
        unlocks.insert(key, unlock);
    }

    /// Look up an unlock.
    #[must_use]
    pub fn get(&self, user_id: UserId, purpose: PurposeContext, target: &str) -> Option<Unlock> {
        self.unlocks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(user_id, purpose, target.to_string()))
            .cloned()
    }
}
