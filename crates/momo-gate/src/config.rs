//! Gate and polling configuration.

use std::time::Duration;

use momo_gate_core::{Currency, GateError, PurposeContext, UserId, DEFAULT_FEE_MINOR};

/// Delay between two status probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Status probes issued before an attempt times out.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// What a gate charges for and how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    fee_minor: i64,
    purpose: PurposeContext,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            fee_minor: DEFAULT_FEE_MINOR,
            purpose: PurposeContext::Generic,
        }
    }
}

impl GateConfig {
    /// Create a gate configuration.
    ///
    /// # Errors
    ///
    /// Returns `GateError::InvalidAmount` if the fee is not positive.
    pub fn new(fee_minor: i64, purpose: PurposeContext) -> Result<Self, GateError> {
        if fee_minor <= 0 {
            return Err(GateError::InvalidAmount(fee_minor));
        }
        Ok(Self { fee_minor, purpose })
    }

    /// Fee in minor units.
    #[must_use]
    pub const fn fee_minor(&self) -> i64 {
        self.fee_minor
    }

    /// What the fee unlocks.
    #[must_use]
    pub const fn purpose(&self) -> PurposeContext {
        self.purpose
    }

    /// Heading for the payment prompt.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.purpose.title()
    }

    /// Payment prompt with the fee.
    #[must_use]
    pub fn prompt(&self) -> String {
        self.purpose.prompt(self.fee_minor, Currency::Rwf)
    }
}

/// Fixed-delay polling: no backoff, no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before each status probe.
    pub interval: Duration,
    /// Probes before giving up with a timeout. At least 1.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    /// Create a policy. `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Longest time an attempt can spend polling.
    #[must_use]
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// The caller's session, passed into the gate explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PayerContext {
    /// Authenticated marketplace user, if any.
    pub user_id: Option<UserId>,
}

impl PayerContext {
    /// Context for an authenticated user.
    #[must_use]
    pub const fn user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }
}
