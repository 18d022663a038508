//! Beverage catalog and pricing loaded from config.toml
//!
//! The backend accepts any beverage type string; the catalog only drives autocompletion and
//! the defaults preselected in dialogs. Prices are used for display (amount due before
//! paying, coffee purchase cost); the backend computes the authoritative amounts.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Beverage types offered in autocompletion, in display order
    pub beverages: Vec<BeverageConfig>,
    /// Beverage type used for new people and when a person has none recorded
    pub default_beverage: String,
    /// Display prices
    pub pricing: PricingConfig,
}

/// A single beverage type in the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct BeverageConfig {
    /// Beverage type name as the backend knows it
    pub name: String,
}

/// Prices used for display
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Price of one beverage, in kroner
    pub per_beverage: f64,
    /// Price of one bag of coffee, in kroner
    pub per_coffee_bag: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            per_beverage: 10.0,
            per_coffee_bag: 1.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            beverages: ["Cola", "Cola Zero"]
                .into_iter()
                .map(|name| BeverageConfig {
                    name: name.to_string(),
                })
                .collect(),
            default_beverage: "Cola".to_string(),
            pricing: PricingConfig::default(),
        }
    }
}

impl Config {
    /// Beverage names in catalog order.
    pub fn beverage_names(&self) -> impl Iterator<Item = &str> {
        self.beverages.iter().map(|b| b.name.as_str())
    }
}

/// Loads the beverage configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the beverage configuration from ./config.toml, using the built-in catalog when the
/// file does not exist.
pub fn load_default_config() -> Result<Config> {
    let path = Path::new("config.toml");
    if !path.exists() {
        info!("No config.toml found; using the built-in beverage catalog.");
        return Ok(Config::default());
    }
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_beverage_config() {
        let toml_str = r#"
            default_beverage = "Pepsi Max"

            [pricing]
            per_beverage = 15.0

            [[beverages]]
            name = "Pepsi Max"

            [[beverages]]
            name = "Solo"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_beverage, "Pepsi Max");
        assert_eq!(
            config.beverage_names().collect::<Vec<_>>(),
            vec!["Pepsi Max", "Solo"]
        );
        assert_eq!(config.pricing.per_beverage, 15.0);
        // Unspecified price keeps its default
        assert_eq!(config.pricing.per_coffee_bag, 1.0);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.default_beverage, "Cola");
        assert_eq!(
            config.beverage_names().collect::<Vec<_>>(),
            vec!["Cola", "Cola Zero"]
        );
        assert_eq!(config.pricing.per_beverage, 10.0);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("does/not/exist.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
