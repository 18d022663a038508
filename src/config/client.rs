//! Backend connection settings loaded from environment variables.
//!
//! Reads `BEVERAGE_API_URL`, `BEVERAGE_API_KEY` and `BEVERAGE_LOCATION_ID` (usually from the
//! `.env` file). The settings are built once at startup and handed to the sync client; nothing
//! reads them from the environment afterwards.

use crate::api::{LocationId, http::DEFAULT_API_URL};
use crate::errors::{Error, Result};

/// Settings needed to talk to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API
    pub api_url: String,
    /// Static API key sent as `X-API-Key`
    pub api_key: String,
    /// Location forced for this session; persisted as the new preference when set
    pub location_override: Option<LocationId>,
}

impl ClientConfig {
    /// Loads the settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the settings through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    /// Returns `Error::Config` when the API key is missing or blank, or when the location
    /// override is not an integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("BEVERAGE_API_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let api_key = lookup("BEVERAGE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config {
                message: "BEVERAGE_API_KEY must be set".to_string(),
            })?;

        let location_override = lookup("BEVERAGE_LOCATION_ID")
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                raw.trim().parse::<LocationId>().map_err(|e| Error::Config {
                    message: format!("BEVERAGE_LOCATION_ID '{raw}' is not a valid id: {e}"),
                })
            })
            .transpose()?;

        Ok(Self {
            api_url,
            api_key,
            location_override,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let config = ClientConfig::from_lookup(lookup_from(&[("BEVERAGE_API_KEY", "secret")]))
            .unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.location_override, None);
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let result = ClientConfig::from_lookup(lookup_from(&[("BEVERAGE_API_KEY", "  ")]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_location_override_parsed() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("BEVERAGE_API_KEY", "secret"),
            ("BEVERAGE_API_URL", "http://localhost:3000/api"),
            ("BEVERAGE_LOCATION_ID", " 3 "),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.location_override, Some(3));
    }

    #[test]
    fn test_invalid_location_override_is_config_error() {
        let result = ClientConfig::from_lookup(lookup_from(&[
            ("BEVERAGE_API_KEY", "secret"),
            ("BEVERAGE_LOCATION_ID", "kitchen"),
        ]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
