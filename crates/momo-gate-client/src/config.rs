//! MoMo API configuration.

use serde::{Deserialize, Serialize};

/// Sandbox Collection API.
pub const SANDBOX_BASE_URL: &str = "https://sandbox.momodeveloper.mtn.com/collection/v1_0";

/// Configuration for the MoMo Collection API.
#[derive(Clone, Serialize, Deserialize)]
pub struct MomoConfig {
    /// Collection API base URL (default: the sandbox).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// `Ocp-Apim-Subscription-Key` for the Collection product.
    pub subscription_key: String,

    /// API user (UUID) used for token requests.
    pub api_user: String,

    /// API key paired with the API user.
    pub api_key: String,

    /// `X-Target-Environment` (default: `sandbox`).
    #[serde(default = "default_target_environment")]
    pub target_environment: String,

    /// Optional `X-Callback-Url` sent with each request-to-pay.
    #[serde(default)]
    pub callback_url: Option<String>,

    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    SANDBOX_BASE_URL.to_string()
}

fn default_target_environment() -> String {
    "sandbox".to_string()
}

const fn default_timeout_seconds() -> u64 {
    30
}

impl MomoConfig {
    /// Create a sandbox configuration with the given credentials.
    #[must_use]
    pub fn new(
        subscription_key: impl Into<String>,
        api_user: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: default_base_url(),
            subscription_key: subscription_key.into(),
            api_user: api_user.into(),
            api_key: api_key.into(),
            target_environment: default_target_environment(),
            callback_url: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }

    /// Read the configuration from `MOMO_*` environment variables.
    ///
    /// Returns `None` unless the subscription key, API user and API key are
    /// all set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let subscription_key = std::env::var("MOMO_SUBSCRIPTION_KEY").ok()?;
        let api_user = std::env::var("MOMO_API_USER").ok()?;
        let api_key = std::env::var("MOMO_API_KEY").ok()?;

        let mut config = Self::new(subscription_key, api_user, api_key);
        if let Ok(url) = std::env::var("MOMO_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(env) = std::env::var("MOMO_TARGET_ENV") {
            config.target_environment = env;
        }
        config.callback_url = std::env::var("MOMO_CALLBACK_URL").ok();
        Some(config)
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the target environment.
    #[must_use]
    pub fn with_target_environment(mut self, env: impl Into<String>) -> Self {
        self.target_environment = env.into();
        self
    }

    /// Set the callback URL.
    #[must_use]
    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

impl std::fmt::Debug for MomoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MomoConfig")
            .field("base_url", &self.base_url)
            .field("api_user", &self.api_user)
            .field("target_environment", &self.target_environment)
            .field("callback_url", &self.callback_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish_non_exhaustive()
    }
}
