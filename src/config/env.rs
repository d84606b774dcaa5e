//! Environment-level overrides for remote manifest fetches.

use std::time::Duration;

use tracing::{info, warn};

/// Prefix of all builder environment variables.
pub const ENV_PREFIX: &str = "SSBUILDER";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_AUTH_SCHEME: &str = "token";

/// HTTP settings used when fetching remote version manifests.
///
/// Captured once at startup and passed explicitly; aggregation never
/// reads the environment itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Overall request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Accept invalid TLS certificates
    pub insecure_skip_verify: bool,
    /// Credential sent in the `Authorization` header
    pub apikey: Option<String>,
    /// Scheme written before the credential (`token`, `Bearer`)
    pub auth_scheme: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            insecure_skip_verify: false,
            apikey: None,
            auth_scheme: DEFAULT_AUTH_SCHEME.to_string(),
        }
    }
}

impl FetchSettings {
    /// Read settings from the process environment.
    ///
    /// `SSBUILDER_APIKEY` wins over the configured key.
    pub fn from_env(config_apikey: Option<&str>) -> Self {
        Self::from_lookup(config_apikey, |key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(config_apikey: Option<&str>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}_{}", ENV_PREFIX, name));
        let mut settings = Self::default();

        if var("INSECURE_SKIPVERIFY").as_deref() == Some("1") {
            info!("SSBUILDER_INSECURE_SKIPVERIFY set, TLS certificates will not be verified");
            settings.insecure_skip_verify = true;
        }

        if let Some(raw) = var("HTTP_TIMEOUT").filter(|v| !v.is_empty()) {
            match raw.trim().parse::<u64>() {
                Ok(0) => {
                    info!("SSBUILDER_HTTP_TIMEOUT is 0, requests will not time out");
                    settings.timeout = None;
                }
                Ok(secs) => {
                    info!(timeout_secs = secs, "using SSBUILDER_HTTP_TIMEOUT");
                    settings.timeout = Some(Duration::from_secs(secs));
                }
                Err(_) => warn!(value = %raw, "ignoring invalid SSBUILDER_HTTP_TIMEOUT"),
            }
        }

        if let Some(scheme) = var("AUTH_SCHEME").filter(|v| !v.is_empty()) {
            settings.auth_scheme = scheme;
        }

        settings.apikey = var("APIKEY")
            .filter(|v| !v.is_empty())
            .or_else(|| config_apikey.filter(|k| !k.is_empty()).map(str::to_string));

        settings
    }

    /// Value of the `Authorization` header, if a credential is configured.
    pub fn authorization(&self) -> Option<String> {
        self.apikey
            .as_ref()
            .map(|key| format!("{} {}", self.auth_scheme, key))
    }
}
