//! Flat shipping cost lookup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Method used when the requested one is unknown.
pub const DEFAULT_SHIPPING_METHOD: &str = "AliExpress standard shipping";

/// Per-destination rates for one shipping method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodRates {
    /// Rate for destinations without their own entry.
    pub default: f64,
    /// Destination (country name) to flat cost.
    #[serde(flatten)]
    pub destinations: BTreeMap<String, f64>,
}

impl MethodRates {
    pub fn new(default: f64) -> Self {
        Self {
            default,
            destinations: BTreeMap::new(),
        }
    }

    pub fn with_rate(mut self, destination: impl Into<String>, cost: f64) -> Self {
        self.set_rate(destination, cost);
        self
    }

    pub fn set_rate(&mut self, destination: impl Into<String>, cost: f64) {
        let destination = destination.into();
        self.destinations
            .retain(|k, _| !k.eq_ignore_ascii_case(&destination));
        self.destinations.insert(destination, cost);
    }

    /// Rate for a destination, falling back to the method default.
    pub fn rate(&self, destination: &str) -> f64 {
        self.destinations
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(destination))
            .map(|(_, cost)| *cost)
            .unwrap_or(self.default)
    }
}

/// Two-level table: shipping method -> destination -> cost.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShippingTable {
    methods: BTreeMap<String, MethodRates>,
}

impl ShippingTable {
    /// Create an empty table.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The reference rate card.
    pub fn builtin() -> Self {
        Self::empty()
            .with_method(
                DEFAULT_SHIPPING_METHOD,
                rates(4.00, [3.50, 3.80, 3.90, 4.20, 4.50]),
            )
            .with_method("ePacket", rates(3.00, [2.50, 2.80, 3.00, 3.20, 3.50]))
            .with_method(
                "AliExpress premium shipping",
                rates(7.00, [6.00, 6.50, 6.50, 7.00, 7.50]),
            )
            .with_method("DHL", rates(12.00, [8.50, 9.00, 9.00, 10.00, 11.00]))
            .with_method("FedEx", rates(12.50, [9.00, 9.50, 9.50, 10.50, 11.50]))
    }

    /// Add or replace a method.
    pub fn with_method(mut self, method: impl Into<String>, rates: MethodRates) -> Self {
        self.set_method(method, rates);
        self
    }

    pub fn set_method(&mut self, method: impl Into<String>, rates: MethodRates) {
        let method = method.into();
        self.methods.retain(|k, _| !k.eq_ignore_ascii_case(&method));
        self.methods.insert(method, rates);
    }

    /// Merge another table over this one, destination by destination.
    pub fn merge(&mut self, overrides: &ShippingTable) {
        for (method, incoming) in &overrides.methods {
            match self.method_mut(method) {
                Some(existing) => {
                    existing.default = incoming.default;
                    for (destination, cost) in &incoming.destinations {
                        existing.set_rate(destination.clone(), *cost);
                    }
                }
                None => {
                    self.methods.insert(method.clone(), incoming.clone());
                }
            }
        }
    }

    /// Rates for a method, if known.
    pub fn method(&self, method: &str) -> Option<&MethodRates> {
        self.methods
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(method))
            .map(|(_, rates)| rates)
    }

    fn method_mut(&mut self, method: &str) -> Option<&mut MethodRates> {
        self.methods
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(method))
            .map(|(_, rates)| rates)
    }

    /// Known method names.
    pub fn methods(&self) -> impl Iterator<Item = (&str, &MethodRates)> {
        self.methods.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resolve a flat cost. Never fails.
    ///
    /// Unknown methods use [`DEFAULT_SHIPPING_METHOD`]; unknown destinations
    /// use the method's default. A table without the fallback method
    /// resolves unknown methods to zero.
    pub fn cost(&self, destination: &str, method: &str) -> f64 {
        self.method(method)
            .or_else(|| self.method(DEFAULT_SHIPPING_METHOD))
            .map(|rates| rates.rate(destination))
            .unwrap_or(0.0)
    }
}

const BUILTIN_DESTINATIONS: [&str; 5] = [
    "United States",
    "United Kingdom",
    "Germany",
    "Canada",
    "Australia",
];

fn rates(default: f64, costs: [f64; 5]) -> MethodRates {
    BUILTIN_DESTINATIONS
        .iter()
        .zip(costs)
        .fold(MethodRates::new(default), |rates, (destination, cost)| {
            rates.with_rate(*destination, cost)
        })
}

/// Resolve a shipping cost against the builtin rate card.
pub fn calculate_shipping_cost(destination: &str, shipping_method: &str) -> f64 {
    static TABLE: OnceLock<ShippingTable> = OnceLock::new();
    TABLE
        .get_or_init(ShippingTable::builtin)
        .cost(destination, shipping_method)
}
