//! Pricing configuration.
//!
//! Loaded from `dropship.toml` (or a `.json` file). Every section is
//! optional; rules and shipping rates are layered over the builtin
//! registry and rate card.

use crate::error::PricingError;
use crate::money::Currency;
use crate::orchestrator::DEFAULT_DESTINATION;
use crate::rules::{PricingRule, RuleRegistry};
use crate::shipping::{ShippingTable, DEFAULT_SHIPPING_METHOD};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Store currency, used for display.
    #[serde(default)]
    pub currency: Currency,

    /// Destination selected on startup.
    #[serde(default = "default_destination")]
    pub default_destination: String,

    /// Shipping method selected on startup.
    #[serde(default = "default_shipping_method")]
    pub default_shipping_method: String,

    /// Result cache settings.
    #[serde(default)]
    pub cache: CacheSettings,

    /// Replacement for the builtin default rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_rule: Option<PricingRule>,

    /// Destination overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub destinations: BTreeMap<String, PricingRule>,

    /// Category overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, PricingRule>,

    /// Shipping rate overrides.
    #[serde(default)]
    pub shipping: ShippingTable,
}

fn default_destination() -> String {
    DEFAULT_DESTINATION.to_string()
}

fn default_shipping_method() -> String {
    DEFAULT_SHIPPING_METHOD.to_string()
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            default_destination: default_destination(),
            default_shipping_method: default_shipping_method(),
            cache: CacheSettings::default(),
            default_rule: None,
            destinations: BTreeMap::new(),
            categories: BTreeMap::new(),
            shipping: ShippingTable::empty(),
        }
    }
}

/// Stale-while-revalidate cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Key namespace.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Seconds an entry is served without revalidation.
    #[serde(default = "default_stale_secs")]
    pub stale_secs: u64,

    /// Seconds until an entry is evicted.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// File backing the cache (CLI only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn default_prefix() -> String {
    "dropship:swr:".to_string()
}

fn default_stale_secs() -> u64 {
    60
}

fn default_ttl_secs() -> u64 {
    300
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            stale_secs: default_stale_secs(),
            ttl_secs: default_ttl_secs(),
            path: None,
        }
    }
}

impl PricingConfig {
    /// Load config from a file. `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PricingError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| PricingError::ConfigIo {
            path: display.clone(),
            source,
        })?;

        let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
        let config = if is_json {
            serde_json::from_str(&content).map_err(|e| PricingError::ConfigParse {
                path: display,
                message: e.to_string(),
            })?
        } else {
            toml::from_str(&content).map_err(|e| PricingError::ConfigParse {
                path: display,
                message: e.to_string(),
            })?
        };

        Ok(config)
    }

    /// Save config to a file, choosing the format from the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PricingError> {
        let path = path.as_ref();
        let content = if path.extension().and_then(|e| e.to_str()) == Some("json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content).map_err(|source| PricingError::ConfigIo {
            path: path.display().to_string(),
            source,
        })
    }

    /// Builtin registry with this config's overrides applied.
    pub fn registry(&self) -> RuleRegistry {
        let mut registry = RuleRegistry::builtin();
        if let Some(rule) = &self.default_rule {
            registry.set_default(rule.clone());
        }
        for (destination, rule) in &self.destinations {
            registry.set_destination(destination.clone(), rule.clone());
        }
        for (category, rule) in &self.categories {
            registry.set_category(category.clone(), rule.clone());
        }
        registry
    }

    /// Builtin rate card with this config's overrides applied.
    pub fn shipping_table(&self) -> ShippingTable {
        let mut table = ShippingTable::builtin();
        table.merge(&self.shipping);
        table
    }

    /// Check the config for inconsistencies.
    pub fn validate(&self) -> Result<(), PricingError> {
        self.registry().validate()?;

        if self.cache.ttl_secs == 0 {
            return Err(PricingError::InvalidConfig(
                "cache.ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.cache.stale_secs > self.cache.ttl_secs {
            return Err(PricingError::InvalidConfig(format!(
                "cache.stale_secs ({}) exceeds cache.ttl_secs ({})",
                self.cache.stale_secs, self.cache.ttl_secs
            )));
        }

        let table = self.shipping_table();
        if table.method(&self.default_shipping_method).is_none() {
            return Err(PricingError::InvalidConfig(format!(
                "unknown default_shipping_method '{}'",
                self.default_shipping_method
            )));
        }

        for (method, rates) in table.methods() {
            let negative = std::iter::once(rates.default)
                .chain(rates.destinations.values().copied())
                .any(|cost| !cost.is_finite() || cost < 0.0);
            if negative {
                return Err(PricingError::InvalidConfig(format!(
                    "shipping method '{}' has a negative or non-finite rate",
                    method
                )));
            }
        }

        Ok(())
    }
}

/// Generate a starter `dropship.toml`.
pub fn generate_default_config() -> String {
    format!(
        r#"# Dropship pricing configuration

currency = "USD"
default_destination = "{destination}"
default_shipping_method = "{method}"

[cache]
prefix = "dropship:swr:"
stale_secs = 60
ttl_secs = 300
path = ".dropship/cache.json"

# Replaces the builtin "Standard margin" rule.
[default_rule]
id = "default"
name = "Standard margin"
type = "percentage"
profit_margin_percentage = 30.0
compare_at_price_multiplier = 1.3

[destinations."Germany"]
id = "dest-de"
name = "DE fixed markup"
type = "fixed"
fixed_markup = 6.0
compare_at_price_multiplier = 1.25

[categories.jewelry]
id = "cat-jewelry"
name = "Jewelry formula"
type = "formula"

[shipping.DHL]
default = 12.0
"United States" = 8.5
"#,
        destination = DEFAULT_DESTINATION,
        method = DEFAULT_SHIPPING_METHOD,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleKind;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: PricingConfig = toml::from_str("").unwrap();
        assert_eq!(config, PricingConfig::default());
        assert_eq!(config.registry(), RuleRegistry::builtin());
        assert_eq!(config.shipping_table(), ShippingTable::builtin());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generated_config_parses_and_validates() {
        let config: PricingConfig = toml::from_str(&generate_default_config()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache.path.as_deref(), Some(".dropship/cache.json"));
        assert_eq!(
            config.registry().resolve("germany", None).kind,
            RuleKind::Fixed { fixed_markup: 6.0 }
        );
    }

    #[test]
    fn test_overrides_layer_over_builtin() {
        let config: PricingConfig = toml::from_str(
            r#"
            [destinations."France"]
            name = "FR margin"
            type = "percentage"
            profit_margin_percentage = 25.0

            [shipping."La Poste"]
            default = 5.0
            "#,
        )
        .unwrap();

        let registry = config.registry();
        assert_eq!(registry.resolve("France", None).name, "FR margin");
        assert_eq!(registry.resolve("Germany", None).id.as_str(), "dest-de");

        let table = config.shipping_table();
        assert_eq!(table.cost("France", "La Poste"), 5.0);
        assert_eq!(table.cost("United States", "DHL"), 8.5);
    }

    #[test]
    fn test_validate_rejects_stale_beyond_ttl() {
        let mut config = PricingConfig::default();
        config.cache.stale_secs = 600;
        assert!(matches!(
            config.validate(),
            Err(PricingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_rule() {
        let mut config = PricingConfig::default();
        config
            .destinations
            .insert("Spain".to_string(), PricingRule::percentage("bad", 120.0));
        assert!(matches!(
            config.validate(),
            Err(PricingError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_default_method() {
        let config = PricingConfig {
            default_shipping_method: "Teleport".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
