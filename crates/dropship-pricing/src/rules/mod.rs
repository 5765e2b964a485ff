//! Pricing rule module.
//!
//! Contains the rule record and the registry that resolves a rule for a
//! destination or product category.

mod registry;
mod rule;

pub use registry::{RuleRegistry, RuleScope};
pub use rule::{PricingRule, RuleKind, DEFAULT_COMPARE_AT_MULTIPLIER, FORMULA_MULTIPLIER};
