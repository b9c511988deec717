//! Process configuration from environment variables.

use std::net::SocketAddr;

use crate::providers::DEFAULT_USER_AGENT;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Error reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid BIND_ADDR {value:?}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub places_api_key: Option<String>,
    pub geocoding_api_key: Option<String>,
    pub llm_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub nominatim_user_agent: String,
}

impl AppConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read through an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let shared_key = var("GOOGLE_API_KEY");
        let bind = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::BindAddr {
                value: bind.clone(),
                source,
            })?;

        Ok(Self {
            bind_addr,
            places_api_key: var("GOOGLE_PLACES_API_KEY").or_else(|| shared_key.clone()),
            geocoding_api_key: var("GOOGLE_GEOCODING_API_KEY").or(shared_key),
            llm_url: var("LLM_EXTRACTION_URL"),
            llm_api_key: var("LLM_API_KEY"),
            nominatim_user_agent: var("NOMINATIM_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.places_api_key, None);
        assert_eq!(config.geocoding_api_key, None);
        assert_eq!(config.llm_url, None);
        assert_eq!(config.nominatim_user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn shared_key_fills_both() {
        let config = load(&[("GOOGLE_API_KEY", "shared")]).unwrap();
        assert_eq!(config.places_api_key.as_deref(), Some("shared"));
        assert_eq!(config.geocoding_api_key.as_deref(), Some("shared"));
    }

    #[test]
    fn specific_keys_win() {
        let config = load(&[
            ("GOOGLE_API_KEY", "shared"),
            ("GOOGLE_PLACES_API_KEY", "places"),
            ("GOOGLE_GEOCODING_API_KEY", "   "),
        ])
        .unwrap();
        assert_eq!(config.places_api_key.as_deref(), Some("places"));
        assert_eq!(config.geocoding_api_key.as_deref(), Some("shared"));
    }

    #[test]
    fn bad_bind_addr_is_an_error() {
        let err = load(&[("BIND_ADDR", "localhost")]).unwrap_err();
        assert!(err.to_string().contains("localhost"));
    }

    #[test]
    fn llm_settings() {
        let config = load(&[
            ("LLM_EXTRACTION_URL", "http://llm.internal/extract"),
            ("LLM_API_KEY", "t"),
            ("BIND_ADDR", "0.0.0.0:8080"),
        ])
        .unwrap();
        assert_eq!(config.llm_url.as_deref(), Some("http://llm.internal/extract"));
        assert_eq!(config.llm_api_key.as_deref(), Some("t"));
        assert_eq!(config.bind_addr.port(), 8080);
    }
}
