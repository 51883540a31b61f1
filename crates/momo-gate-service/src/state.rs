//! Application state.

use std::sync::Arc;

use momo_gate::GateBackend;
use momo_gate_client::MomoClient;

use crate::config::ServiceConfig;
use crate::ledger::UnlockLedger;
use crate::registry::GateRegistry;

/// Application state shared across handlers.
pub struct AppState {
    /// Service configuration.
    pub config: ServiceConfig,

    /// Remote payment operations (optional).
    pub backend: Option<GateBackend>,

    /// Gates in use.
    pub gates: Arc<GateRegistry>,

    /// Paid-for content.
    pub unlocks: Arc<UnlockLedger>,
}

impl AppState {
    /// Create the application state, connecting to MoMo if configured.
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        let backend = config
            .momo
            .clone()
            .and_then(|momo| match MomoClient::new(momo) {
                Ok(client) => {
                    tracing::info!("MoMo integration enabled");
                    Some(GateBackend::shared(Arc::new(client)))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create MoMo client");
                    None
                }
            });

        if backend.is_none() {
            tracing::warn!("MoMo not configured - payment gates will not be available");
        }

        Self::with_backend(config, backend)
    }

    /// Create the application state with an explicit backend.
    #[must_use]
    pub fn with_backend(config: ServiceConfig, backend: Option<GateBackend>) -> Self {
        Self {
            gates: Arc::new(GateRegistry::new(config.max_gates_per_user)),
            config,
            backend,
            unlocks: Arc::new(UnlockLedger::new()),
        }
    }

    /// Check if MoMo is configured.
    #[must_use]
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }
}
