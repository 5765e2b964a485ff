//! Pricing engine for dropshipping catalogs.
//!
//! This crate turns supplier costs into sale prices:
//!
//! - **Rules**: percentage-margin, fixed-markup and formula pricing rules,
//!   resolved per destination or category from a [`RuleRegistry`]
//! - **Shipping**: flat shipping costs per (method, destination)
//! - **Calculator**: [`calculate_pricing`] and its validating twin
//! - **Orchestrator**: keeps a working set of variants repriced as the
//!   destination, shipping method or rule selection changes
//!
//! # Example
//!
//! ```rust
//! use dropship_pricing::prelude::*;
//!
//! let rule = PricingRule::percentage("Standard margin", 40.0);
//! let result = calculate_pricing(10.0, 2.0, Some(&rule));
//!
//! assert_eq!(result.calculated_price, 20.0);
//! assert_eq!(result.compare_at_price, 26.0);
//! assert_eq!(result.markup, 66.67);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod calculator;
pub mod config;
pub mod orchestrator;
pub mod rules;
pub mod shipping;
pub mod variant;

pub use calculator::{calculate_pricing, try_calculate_pricing, PricingCalculationResult};
pub use config::{generate_default_config, CacheSettings, PricingConfig};
pub use error::PricingError;
pub use ids::*;
pub use money::Currency;
pub use orchestrator::{PricingMode, PricingOrchestrator, PricingUpdate, VariantPricing};
pub use rules::{PricingRule, RuleKind, RuleRegistry, RuleScope};
pub use shipping::{calculate_shipping_cost, MethodRates, ShippingTable, DEFAULT_SHIPPING_METHOD};
pub use variant::ProductVariant;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::PricingError;
    pub use crate::ids::*;
    pub use crate::money::{round_half_up, Currency};

    pub use crate::calculator::{calculate_pricing, try_calculate_pricing, PricingCalculationResult};
    pub use crate::config::{CacheSettings, PricingConfig};
    pub use crate::orchestrator::{PricingMode, PricingOrchestrator, PricingUpdate, VariantPricing};
    pub use crate::rules::{PricingRule, RuleKind, RuleRegistry};
    pub use crate::shipping::{calculate_shipping_cost, MethodRates, ShippingTable, DEFAULT_SHIPPING_METHOD};
    pub use crate::variant::ProductVariant;
}
