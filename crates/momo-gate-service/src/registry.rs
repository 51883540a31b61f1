//! Live gates, keyed by id.
//!
//! A gate leaves the registry when its owner closes it, when its payment
//! succeeds, or when the owner opens more than the per-user limit and it is
//! the oldest one not processing.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use momo_gate::PaymentGate;
use momo_gate_core::{GateId, GateState, UserId};

/// A gate and who opened it.
#[derive(Debug, Clone)]
pub struct GateEntry {
    /// The user the gate belongs to.
    pub owner: UserId,
    /// What paying unlocks.
    pub target: String,
    /// The gate itself.
    pub gate: Arc<PaymentGate>,
    /// When the gate was opened.
    pub created_at: DateTime<Utc>,
}

/// Every gate the owner holds is mid-payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{limit} payment gates already processing")]
pub struct GateLimitReached {
    /// Gates allowed per user.
    pub limit: usize,
}

/// Gates that are still in use.
#[derive(Debug)]
pub struct GateRegistry {
    gates: RwLock<HashMap<GateId, GateEntry>>,
    per_owner: usize,
}

impl GateRegistry {
    /// Create an empty registry holding at most `per_owner` gates per user.
    #[must_use]
    pub fn new(per_owner: usize) -> Self {
        Self {
            gates: RwLock::default(),
            per_owner: per_owner.max(1),
        }
    }

    /// Register a gate.
    ///
    /// If the owner is at the limit, their oldest gate that is not
    /// processing is torn down to make room.
    ///
    /// # Errors
    ///
    /// Returns [`GateLimitReached`] if all of the owner's gates are
    /// processing.
    pub fn insert(&self, entry: GateEntry) -> Result<(), GateLimitReached> {
        let evicted = {
            let mut gates = self.gates.write().unwrap_or_else(PoisonError::into_inner);

            let mut owned: Vec<&GateEntry> = gates
                .values()
                .filter(|existing| existing.owner == entry.owner)
                .collect();

            let evicted = if owned.len() >= self.per_owner {
                owned.sort_by_key(|existing| existing.created_at);
                let victim = owned
                    .into_iter()
                    .find(|existing| !matches!(existing.gate.state(), GateState::Processing { .. }))
                    .map(|existing| existing.gate.id())
                    .ok_or(GateLimitReached {
                        limit: self.per_owner,
                    })?;
                gates.remove(&victim)
            } else {
                None
            };

            gates.insert(entry.gate.id(), entry);
            evicted
        };

        if let Some(old) = evicted {
            tracing::info!(
                gate_id = %old.gate.id(),
                user_id = %old.owner,
                "Payment gate evicted"
            );
            old.gate.teardown();
        }
        Ok(())
    }

    /// Look up a gate owned by `owner`. Other users' gates are invisible.
    pub fn get(&self, id: GateId, owner: UserId) -> Option<GateEntry> {
        self.gates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .filter(|entry| entry.owner == owner)
            .cloned()
    }

    /// Tear down and forget a gate owned by `owner`.
    ///
    /// Returns `false` if there was no such gate.
    pub fn close(&self, id: GateId, owner: UserId) -> bool {
        let removed = {
            let mut gates = self.gates.write().unwrap_or_else(PoisonError::into_inner);
            match gates.get(&id) {
                Some(entry) if entry.owner == owner => gates.remove(&id),
                _ => None,
            }
        };
        match removed {
            Some(entry) => {
                entry.gate.teardown();
                true
            }
            None => false,
        }
    }

    /// Forget a gate whose payment went through.
    ///
    /// The gate is not torn down here; the last handle dropping does that.
    pub fn release(&self, id: GateId) {
        let removed = self
            .gates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        drop(removed);
    }

    /// Number of gates in use.
    #[must_use]
    pub fn len(&self) -> usize {
        self.gates.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no gates are in use.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
