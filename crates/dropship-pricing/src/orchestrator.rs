//! Variant repricing orchestrator.
//!
//! Owns a working set of variants plus the destination, shipping method and
//! rule selection, and reprices every variant whenever one of them changes.
//! Operations that reprice return a [`PricingUpdate`]; persisting or
//! rendering it is up to the caller.

use crate::calculator::{calculate_pricing, PricingCalculationResult};
use crate::config::PricingConfig;
use crate::error::PricingError;
use crate::ids::VariantId;
use crate::rules::{PricingRule, RuleRegistry};
use crate::shipping::{ShippingTable, DEFAULT_SHIPPING_METHOD};
use crate::variant::ProductVariant;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Destination used until the caller picks one.
pub const DEFAULT_DESTINATION: &str = "United States";

/// Whether a rule drives prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "rule", rename_all = "lowercase")]
pub enum PricingMode {
    /// Variants sell at landed cost.
    Disabled,
    /// Variants are priced by the resolved rule.
    Enabled(PricingRule),
}

impl PricingMode {
    pub fn is_enabled(&self) -> bool {
        matches!(self, PricingMode::Enabled(_))
    }

    /// The active rule, if any.
    pub fn rule(&self) -> Option<&PricingRule> {
        match self {
            PricingMode::Enabled(rule) => Some(rule),
            PricingMode::Disabled => None,
        }
    }
}

/// Calculation result for one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantPricing {
    pub variant_id: VariantId,
    pub sku: String,
    pub shipping_cost: f64,
    pub result: PricingCalculationResult,
}

/// Snapshot emitted after every repricing pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingUpdate {
    /// Variants with refreshed derived prices.
    pub variants: Vec<ProductVariant>,
    /// Per-variant results, in variant order.
    pub results: Vec<VariantPricing>,
}

/// Stateful pricing engine for a set of variants.
#[derive(Debug, Clone)]
pub struct PricingOrchestrator {
    registry: RuleRegistry,
    shipping: ShippingTable,
    mode: PricingMode,
    destination: String,
    shipping_method: String,
    category: Option<String>,
    variants: Vec<ProductVariant>,
    results: Vec<VariantPricing>,
}

impl Default for PricingOrchestrator {
    fn default() -> Self {
        Self::new(RuleRegistry::builtin(), ShippingTable::builtin())
    }
}

impl PricingOrchestrator {
    /// Create an orchestrator with pricing disabled.
    pub fn new(registry: RuleRegistry, shipping: ShippingTable) -> Self {
        Self {
            registry,
            shipping,
            mode: PricingMode::Disabled,
            destination: DEFAULT_DESTINATION.to_string(),
            shipping_method: DEFAULT_SHIPPING_METHOD.to_string(),
            category: None,
            variants: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Create an orchestrator from loaded configuration.
    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(config.registry(), config.shipping_table())
            .with_destination(config.default_destination.clone())
            .with_shipping_method(config.default_shipping_method.clone())
    }

    /// Set the initial destination without repricing.
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Set the initial shipping method without repricing.
    pub fn with_shipping_method(mut self, method: impl Into<String>) -> Self {
        self.shipping_method = method.into();
        self
    }

    /// Set the initial category without repricing.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn mode(&self) -> &PricingMode {
        &self.mode
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn shipping_method(&self) -> &str {
        &self.shipping_method
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn variants(&self) -> &[ProductVariant] {
        &self.variants
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Results of the last repricing pass.
    pub fn pricing_results(&self) -> &[VariantPricing] {
        &self.results
    }

    /// Shipping cost for the current destination and method.
    pub fn current_shipping_cost(&self) -> f64 {
        self.shipping.cost(&self.destination, &self.shipping_method)
    }

    /// Change destination; with a rule active, re-resolve it and reprice.
    pub fn update_destination(&mut self, destination: impl Into<String>) -> Option<PricingUpdate> {
        self.destination = destination.into();
        if !self.mode.is_enabled() {
            return None;
        }
        self.mode = PricingMode::Enabled(self.resolve_rule());
        Some(self.recalculate_pricing())
    }

    /// Change shipping method; with a rule active, reprice.
    pub fn update_shipping_method(&mut self, method: impl Into<String>) -> Option<PricingUpdate> {
        self.shipping_method = method.into();
        if !self.mode.is_enabled() {
            return None;
        }
        Some(self.recalculate_pricing())
    }

    /// Change category; with a rule active, re-resolve it and reprice.
    pub fn update_category(&mut self, category: Option<String>) -> Option<PricingUpdate> {
        self.category = category;
        if !self.mode.is_enabled() {
            return None;
        }
        self.mode = PricingMode::Enabled(self.resolve_rule());
        Some(self.recalculate_pricing())
    }

    /// Switch rule pricing on or off and reprice immediately.
    pub fn toggle_pricing_rule(&mut self, enabled: bool) -> PricingUpdate {
        self.mode = if enabled {
            PricingMode::Enabled(self.resolve_rule())
        } else {
            PricingMode::Disabled
        };
        self.recalculate_pricing()
    }

    /// Install a specific rule (e.g. one edited by the merchant) and reprice.
    pub fn apply_rule(&mut self, rule: PricingRule) -> PricingUpdate {
        self.mode = if rule.enabled {
            PricingMode::Enabled(rule)
        } else {
            PricingMode::Disabled
        };
        self.recalculate_pricing()
    }

    /// Replace the working set; with a rule active, reprice.
    ///
    /// With pricing disabled the new variants keep their incoming prices and
    /// previous results are dropped.
    pub fn update_variants(&mut self, variants: Vec<ProductVariant>) -> Option<PricingUpdate> {
        self.variants = variants;
        if !self.mode.is_enabled() {
            self.results.clear();
            return None;
        }
        Some(self.recalculate_pricing())
    }

    /// Change one variant's supplier cost; with a rule active, reprice.
    pub fn update_supplier_price(
        &mut self,
        id: &VariantId,
        supplier_price: f64,
    ) -> Result<Option<PricingUpdate>, PricingError> {
        let variant = self
            .variants
            .iter_mut()
            .find(|v| &v.id == id)
            .ok_or_else(|| PricingError::VariantNotFound(id.to_string()))?;
        variant.supplier_price = supplier_price;

        if !self.mode.is_enabled() {
            return Ok(None);
        }
        Ok(Some(self.recalculate_pricing()))
    }

    /// Reprice every variant under the current mode.
    pub fn recalculate_pricing(&mut self) -> PricingUpdate {
        let shipping_cost = self.current_shipping_cost();
        let rule = self.mode.rule();

        self.results = self
            .variants
            .iter_mut()
            .map(|variant| {
                let result = calculate_pricing(variant.supplier_price, shipping_cost, rule);
                variant.apply(shipping_cost, &result);
                VariantPricing {
                    variant_id: variant.id.clone(),
                    sku: variant.sku.clone(),
                    shipping_cost,
                    result,
                }
            })
            .collect();

        debug!(
            variants = self.variants.len(),
            destination = %self.destination,
            shipping_method = %self.shipping_method,
            rule = rule.map(|r| r.id.as_str()).unwrap_or("none"),
            "Repriced variants"
        );

        PricingUpdate {
            variants: self.variants.clone(),
            results: self.results.clone(),
        }
    }

    fn resolve_rule(&self) -> PricingRule {
        self.registry
            .resolve(&self.destination, self.category.as_deref())
            .clone()
    }
}
