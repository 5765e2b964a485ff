//! Rule registry keyed by destination and category.

use crate::error::PricingError;
use crate::rules::PricingRule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where a registry entry applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleScope {
    /// Fallback for everything without an override.
    Default,
    /// Shipping destination (country name).
    Destination(String),
    /// Product category.
    Category(String),
}

impl fmt::Display for RuleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleScope::Default => write!(f, "default"),
            RuleScope::Destination(d) => write!(f, "destination:{}", d),
            RuleScope::Category(c) => write!(f, "category:{}", c),
        }
    }
}

/// A small registry of pricing rules.
///
/// Resolution order: destination override, category override, default.
/// Keys compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRegistry {
    default_rule: PricingRule,
    #[serde(default)]
    destinations: BTreeMap<String, PricingRule>,
    #[serde(default)]
    categories: BTreeMap<String, PricingRule>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleRegistry {
    /// Create a registry with only a default rule.
    pub fn new(default_rule: PricingRule) -> Self {
        Self {
            default_rule,
            destinations: BTreeMap::new(),
            categories: BTreeMap::new(),
        }
    }

    /// The reference registry shipped with the dashboard.
    pub fn builtin() -> Self {
        Self::new(PricingRule::percentage("Standard margin", 30.0).with_id("default"))
            .with_destination(
                "United States",
                PricingRule::percentage("US margin", 35.0)
                    .with_id("dest-us")
                    .with_minimum_price(4.99),
            )
            .with_destination(
                "United Kingdom",
                PricingRule::percentage("UK margin", 32.0).with_id("dest-uk"),
            )
            .with_destination(
                "Germany",
                PricingRule::fixed("DE fixed markup", 6.0)
                    .with_id("dest-de")
                    .with_compare_at_multiplier(1.25),
            )
            .with_category(
                "electronics",
                PricingRule::fixed("Electronics markup", 8.0)
                    .with_id("cat-electronics")
                    .with_maximum_price(499.99),
            )
            .with_category(
                "jewelry",
                PricingRule::formula("Jewelry formula").with_id("cat-jewelry"),
            )
    }

    /// Add or replace a destination override.
    pub fn with_destination(mut self, destination: impl Into<String>, rule: PricingRule) -> Self {
        self.set_destination(destination, rule);
        self
    }

    /// Add or replace a category override.
    pub fn with_category(mut self, category: impl Into<String>, rule: PricingRule) -> Self {
        self.set_category(category, rule);
        self
    }

    pub fn set_default(&mut self, rule: PricingRule) {
        self.default_rule = rule;
    }

    pub fn set_destination(&mut self, destination: impl Into<String>, rule: PricingRule) {
        let destination = destination.into();
        self.destinations
            .retain(|k, _| !k.eq_ignore_ascii_case(&destination));
        self.destinations.insert(destination, rule);
    }

    pub fn set_category(&mut self, category: impl Into<String>, rule: PricingRule) {
        let category = category.into();
        self.categories
            .retain(|k, _| !k.eq_ignore_ascii_case(&category));
        self.categories.insert(category, rule);
    }

    /// The fallback rule.
    pub fn default_rule(&self) -> &PricingRule {
        &self.default_rule
    }

    /// Resolve the rule for a destination and optional category.
    pub fn resolve(&self, destination: &str, category: Option<&str>) -> &PricingRule {
        if let Some(rule) = lookup(&self.destinations, destination) {
            return rule;
        }
        if let Some(rule) = category.and_then(|c| lookup(&self.categories, c)) {
            return rule;
        }
        &self.default_rule
    }

    /// Find a rule by id anywhere in the registry.
    pub fn find(&self, id: &str) -> Option<&PricingRule> {
        self.entries()
            .into_iter()
            .map(|(_, rule)| rule)
            .find(|rule| rule.id.as_str() == id)
    }

    /// All rules with their scope, default first.
    pub fn entries(&self) -> Vec<(RuleScope, &PricingRule)> {
        let mut entries = vec![(RuleScope::Default, &self.default_rule)];
        entries.extend(
            self.destinations
                .iter()
                .map(|(k, r)| (RuleScope::Destination(k.clone()), r)),
        );
        entries.extend(
            self.categories
                .iter()
                .map(|(k, r)| (RuleScope::Category(k.clone()), r)),
        );
        entries
    }

    /// Validate every rule in the registry.
    pub fn validate(&self) -> Result<(), PricingError> {
        self.entries()
            .into_iter()
            .try_for_each(|(_, rule)| rule.validate())
    }
}

fn lookup<'a>(map: &'a BTreeMap<String, PricingRule>, key: &str) -> Option<&'a PricingRule> {
    map.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, rule)| rule)
}
