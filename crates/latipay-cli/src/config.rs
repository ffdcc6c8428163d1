use std::env;
use std::time::Duration;

use url::Url;

use latipay::{Credentials, Endpoints, API_BASE};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct CliConfig {
    /// Merchant api key (signing secret)
    pub api_key: String,
    pub user_id: String,
    pub wallet_id: String,
    /// Gateway host, e.g. a sandbox
    pub api_base: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("api_key", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("wallet_id", &self.wallet_id)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CliConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` uses the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|s| !s.trim().is_empty())
                .ok_or(ConfigError::MissingRequired(key))
        };

        let api_key = required("LATIPAY_API_KEY")?;
        let user_id = required("LATIPAY_USER_ID")?;
        let wallet_id = required("LATIPAY_WALLET_ID")?;

        let api_base = lookup("LATIPAY_API_BASE")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| API_BASE.to_string());
        Url::parse(&api_base).map_err(|_| ConfigError::InvalidUrl(api_base.clone()))?;

        let timeout_secs = match lookup("LATIPAY_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            user_id,
            wallet_id,
            api_base,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.api_key, &self.user_id, &self.wallet_id)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.api_base)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid timeout (expected positive whole seconds): {0}")]
    InvalidTimeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("LATIPAY_API_KEY", "7EE1"),
        ("LATIPAY_USER_ID", "U007331000"),
        ("LATIPAY_WALLET_ID", "W007331000"),
    ];

    #[test]
    fn defaults() {
        let config = CliConfig::from_lookup(lookup(BASE)).unwrap();
        assert_eq!(config.api_base, "https://api.latipay.net");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.credentials().user_id, "U007331000");
    }

    #[test]
    fn missing_api_key() {
        let err = CliConfig::from_lookup(lookup(&BASE[1..])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired("LATIPAY_API_KEY")));
    }

    #[test]
    fn rejects_bad_url_and_timeout() {
        let mut vars = BASE.to_vec();
        vars.push(("LATIPAY_API_BASE", "not a url"));
        assert!(matches!(
            CliConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidUrl(_))
        ));

        let mut vars = BASE.to_vec();
        vars.push(("LATIPAY_TIMEOUT_SECS", "0"));
        assert!(matches!(
            CliConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn overrides() {
        let mut vars = BASE.to_vec();
        vars.push(("LATIPAY_API_BASE", "https://sandbox.latipay.test"));
        vars.push(("LATIPAY_TIMEOUT_SECS", "5"));
        let config = CliConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(
            config.endpoints().refund_url(),
            "https://sandbox.latipay.test/refund"
        );
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = CliConfig::from_lookup(lookup(BASE)).unwrap();
        assert!(!format!("{config:?}").contains("7EE1"));
    }
}
