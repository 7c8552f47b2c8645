use anyhow::{Context, Result};
use std::time::Duration;

use crate::constants::{
    API_BASE_ENV, API_KEY_ENV, DEFAULT_TIMEOUT_SECS, MET_OFFICE_API_BASE, TIMEOUT_ENV,
};

/// Runtime settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// DataHub API key. Absence is reported per request, not at startup.
    pub api_key: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: MET_OFFICE_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();

        let api_base = match read(API_BASE_ENV) {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => defaults.api_base,
        };

        let timeout = match read(TIMEOUT_ENV) {
            Some(raw) => {
                let secs: u64 = raw.parse().with_context(|| {
                    format!("{TIMEOUT_ENV} must be a whole number of seconds, got '{raw}'")
                })?;
                anyhow::ensure!(secs > 0, "{TIMEOUT_ENV} must be greater than zero");
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        Ok(Self {
            api_key: read(API_KEY_ENV),
            api_base,
            timeout,
        })
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_base, endpoint)
    }
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
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = Config::from_lookup(lookup(&[])).expect("empty env is valid");

        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.api_base, MET_OFFICE_API_BASE);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = Config::from_lookup(lookup(&[(API_KEY_ENV, "   ")])).unwrap();
        assert!(cfg.api_key.is_none());

        let cfg = Config::from_lookup(lookup(&[(API_KEY_ENV, " KEY ")])).unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));
    }

    #[test]
    fn base_override_drops_trailing_slash() {
        let cfg = Config::from_lookup(lookup(&[(API_BASE_ENV, "http://127.0.0.1:9000/point/")]))
            .unwrap();

        assert_eq!(cfg.endpoint_url("hourly"), "http://127.0.0.1:9000/point/hourly");
    }

    #[test]
    fn timeout_override_is_parsed() {
        let cfg = Config::from_lookup(lookup(&[(TIMEOUT_ENV, "5")])).unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let err = Config::from_lookup(lookup(&[(TIMEOUT_ENV, "soon")])).unwrap_err();
        assert!(err.to_string().contains("must be a whole number of seconds"));

        let err = Config::from_lookup(lookup(&[(TIMEOUT_ENV, "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }
}
