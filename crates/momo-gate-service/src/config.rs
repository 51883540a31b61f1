//! Service configuration.

use std::path::Path;
use std::time::Duration;

use momo_gate::{PollPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use momo_gate_client::MomoConfig;
use momo_gate_core::{PurposeContext, DEFAULT_FEE_MINOR};

/// Gates one user may hold at once unless `MAX_GATES_PER_USER` says otherwise.
pub const DEFAULT_MAX_GATES_PER_USER: usize = 5;

/// Fee charged per purpose, in minor units of RWF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    /// Publishing a listing.
    pub list: i64,
    /// Starting a lease.
    pub lease: i64,
    /// Revealing a landlord's contact details.
    pub contact: i64,
    /// Anything else.
    pub generic: i64,
}

impl FeeSchedule {
    /// Fee for a purpose.
    #[must_use]
    pub const fn fee_for(&self, purpose: PurposeContext) -> i64 {
        match purpose {
            PurposeContext::List => self.list,
            PurposeContext::Lease => self.lease,
            PurposeContext::Contact => self.contact,
            PurposeContext::Generic => self.generic,
        }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            list: DEFAULT_FEE_MINOR,
            lease: DEFAULT_FEE_MINOR,
            contact: DEFAULT_FEE_MINOR,
            generic: DEFAULT_FEE_MINOR,
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// HS256 secret shared with the marketplace session issuer.
    pub auth_secret: Option<String>,

    /// Expected `iss` claim, if any.
    pub auth_issuer: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Status polling policy for every gate.
    pub poll_policy: PollPolicy,

    /// Fee per purpose.
    pub fees: FeeSchedule,

    /// Gates one user may hold at once (default: 5).
    pub max_gates_per_user: usize,

    /// MoMo Collection API settings (optional).
    pub momo: Option<MomoConfig>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = FeeSchedule::default();

        let interval = env_parse("POLL_INTERVAL_MS")
            .map_or(DEFAULT_POLL_INTERVAL, Duration::from_millis);
        let max_attempts = env_parse("POLL_MAX_ATTEMPTS").unwrap_or(DEFAULT_MAX_ATTEMPTS);

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            auth_secret: std::env::var("AUTH_SECRET").ok(),
            auth_issuer: std::env::var("AUTH_ISSUER").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_parse("MAX_BODY_BYTES").unwrap_or(64 * 1024),
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS").unwrap_or(30),
            poll_policy: PollPolicy::new(interval, max_attempts),
            fees: FeeSchedule {
                list: positive_fee("FEE_LIST", env_parse("FEE_LIST"), defaults.list),
                lease: positive_fee("FEE_LEASE", env_parse("FEE_LEASE"), defaults.lease),
                contact: positive_fee("FEE_CONTACT", env_parse("FEE_CONTACT"), defaults.contact),
                generic: positive_fee("FEE_GENERIC", env_parse("FEE_GENERIC"), defaults.generic),
            },
            max_gates_per_user: env_parse("MAX_GATES_PER_USER")
                .unwrap_or(DEFAULT_MAX_GATES_PER_USER)
                .max(1),
            momo: load_momo_secrets(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            auth_secret: None,
            auth_issuer: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
            poll_policy: PollPolicy::default(),
            fees: FeeSchedule::default(),
            max_gates_per_user: DEFAULT_MAX_GATES_PER_USER,
            momo: None,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// A configured fee, or `default` if it is missing or not positive.
fn positive_fee(key: &str, value: Option<i64>, default: i64) -> i64 {
    match value {
        Some(fee) if fee > 0 => fee,
        Some(fee) => {
            tracing::warn!(key = %key, fee, fallback = default, "Fee must be positive, using default");
            default
        }
        None => default,
    }
}

/// Load MoMo credentials from file or environment.
fn load_momo_secrets() -> Option<MomoConfig> {
    let secret_paths = [
        ".secrets/momo.json",
        "momo-gate/.secrets/momo.json",
        "../.secrets/momo.json",
    ];

    for path in &secret_paths {
        if let Ok(config) = load_secrets_file::<MomoConfig>(path) {
            tracing::info!(path = %path, "Loaded MoMo secrets from file");
            return Some(config);
        }
    }

    tracing::debug!("MoMo secrets file not found, using environment variables");
    MomoConfig::from_env()
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
