//! Pricing rule types.

use crate::ids::RuleId;
use crate::PricingError;
use serde::{Deserialize, Serialize};

/// Compare-at multiplier used when a rule does not set one.
pub const DEFAULT_COMPARE_AT_MULTIPLIER: f64 = 1.3;

/// Markup-on-cost applied by [`RuleKind::Formula`] rules.
pub const FORMULA_MULTIPLIER: f64 = 1.4;

/// How a rule turns a cost basis into a sale price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuleKind {
    /// Price such that `(price - cost) / price` equals the margin.
    Percentage { profit_margin_percentage: f64 },
    /// Flat amount added on top of cost.
    Fixed { fixed_markup: f64 },
    /// Fixed 40% markup on cost.
    Formula,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Percentage { .. } => "percentage",
            RuleKind::Fixed { .. } => "fixed",
            RuleKind::Formula => "formula",
        }
    }

    /// Short human description of the rule parameters.
    pub fn describe(&self) -> String {
        match self {
            RuleKind::Percentage {
                profit_margin_percentage,
            } => format!("{}% margin", profit_margin_percentage),
            RuleKind::Fixed { fixed_markup } => format!("+{:.2} markup", fixed_markup),
            RuleKind::Formula => format!("cost x {}", FORMULA_MULTIPLIER),
        }
    }
}

/// A declarative pricing rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRule {
    /// Unique rule identifier.
    #[serde(default = "RuleId::generate")]
    pub id: RuleId,
    /// Display name.
    pub name: String,
    /// Calculation branch and its parameter.
    #[serde(flatten)]
    pub kind: RuleKind,
    /// Lower price bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_price: Option<f64>,
    /// Upper price bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_price: Option<f64>,
    /// Multiplier for the compare-at ("was") price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price_multiplier: Option<f64>,
    /// Disabled rules price at cost.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl PricingRule {
    /// Create an enabled rule of the given kind.
    pub fn new(name: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            id: RuleId::generate(),
            name: name.into(),
            kind,
            minimum_price: None,
            maximum_price: None,
            compare_at_price_multiplier: Some(DEFAULT_COMPARE_AT_MULTIPLIER),
            enabled: true,
        }
    }

    /// Create a margin-target rule.
    pub fn percentage(name: impl Into<String>, profit_margin_percentage: f64) -> Self {
        Self::new(
            name,
            RuleKind::Percentage {
                profit_margin_percentage,
            },
        )
    }

    /// Create a fixed-markup rule.
    pub fn fixed(name: impl Into<String>, fixed_markup: f64) -> Self {
        Self::new(name, RuleKind::Fixed { fixed_markup })
    }

    /// Create a formula rule.
    pub fn formula(name: impl Into<String>) -> Self {
        Self::new(name, RuleKind::Formula)
    }

    pub fn with_id(mut self, id: impl Into<RuleId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_minimum_price(mut self, price: f64) -> Self {
        self.minimum_price = Some(price);
        self
    }

    pub fn with_maximum_price(mut self, price: f64) -> Self {
        self.maximum_price = Some(price);
        self
    }

    pub fn with_compare_at_multiplier(mut self, multiplier: f64) -> Self {
        self.compare_at_price_multiplier = Some(multiplier);
        self
    }

    /// Mark the rule enabled or disabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Effective compare-at multiplier.
    pub fn compare_at_multiplier(&self) -> f64 {
        self.compare_at_price_multiplier
            .unwrap_or(DEFAULT_COMPARE_AT_MULTIPLIER)
    }

    /// Apply the rule formula to a cost basis, before bounds.
    pub fn apply(&self, cost: f64) -> f64 {
        match self.kind {
            RuleKind::Percentage {
                profit_margin_percentage,
            } => cost / (1.0 - profit_margin_percentage / 100.0),
            RuleKind::Fixed { fixed_markup } => cost + fixed_markup,
            RuleKind::Formula => cost * FORMULA_MULTIPLIER,
        }
    }

    /// Clamp a price into the rule bounds.
    ///
    /// Bounds win over the margin target, and the minimum is applied last so
    /// an inverted pair resolves to the minimum.
    pub fn clamp(&self, price: f64) -> f64 {
        let mut price = price;
        if let Some(max) = self.maximum_price {
            if price > max {
                price = max;
            }
        }
        if let Some(min) = self.minimum_price {
            if price < min {
                price = min;
            }
        }
        price
    }

    /// Check parameters that would otherwise produce NaN or infinite prices.
    pub fn validate(&self) -> Result<(), PricingError> {
        match self.kind {
            RuleKind::Percentage {
                profit_margin_percentage: m,
            } if !(0.0..100.0).contains(&m) => {
                return Err(self.invalid(format!("profit margin must be in [0, 100), got {}", m)));
            }
            RuleKind::Fixed { fixed_markup } if !fixed_markup.is_finite() => {
                return Err(self.invalid("fixed markup must be finite".to_string()));
            }
            _ => {}
        }

        if let (Some(min), Some(max)) = (self.minimum_price, self.maximum_price) {
            if min > max {
                return Err(self.invalid(format!(
                    "minimum price {} exceeds maximum price {}",
                    min, max
                )));
            }
        }

        if let Some(multiplier) = self.compare_at_price_multiplier {
            if !multiplier.is_finite() || multiplier <= 0.0 {
                return Err(self.invalid("compare-at multiplier must be positive".to_string()));
            }
        }

        Ok(())
    }

    fn invalid(&self, reason: String) -> PricingError {
        PricingError::InvalidRule {
            rule: self.name.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_by_kind() {
        assert!((PricingRule::percentage("p", 40.0).apply(12.0) - 20.0).abs() < 1e-9);
        assert_eq!(PricingRule::fixed("f", 5.0).apply(12.0), 17.0);
        assert!((PricingRule::formula("x").apply(10.0) - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamp() {
        let rule = PricingRule::fixed("f", 0.0)
            .with_minimum_price(5.0)
            .with_maximum_price(10.0);
        assert_eq!(rule.clamp(2.0), 5.0);
        assert_eq!(rule.clamp(7.5), 7.5);
        assert_eq!(rule.clamp(12.0), 10.0);
    }

    #[test]
    fn test_default_multiplier() {
        let mut rule = PricingRule::formula("x");
        rule.compare_at_price_multiplier = None;
        assert_eq!(rule.compare_at_multiplier(), DEFAULT_COMPARE_AT_MULTIPLIER);
    }

    #[test]
    fn test_validate() {
        assert!(PricingRule::percentage("ok", 30.0).validate().is_ok());
        assert!(matches!(
            PricingRule::percentage("bad", 100.0).validate(),
            Err(PricingError::InvalidRule { rule, .. }) if rule == "bad"
        ));
        assert!(PricingRule::percentage("neg", -1.0).validate().is_err());
        assert!(PricingRule::fixed("inv", 1.0)
            .with_minimum_price(20.0)
            .with_maximum_price(10.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_deserialize_flattened_kind() {
        let json = r#"{
            "id": "us",
            "name": "US margin",
            "type": "percentage",
            "profit_margin_percentage": 35.0,
            "minimum_price": 4.99
        }"#;
        let rule: PricingRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.id.as_str(), "us");
        assert_eq!(
            rule.kind,
            RuleKind::Percentage {
                profit_margin_percentage: 35.0
            }
        );
        assert_eq!(rule.minimum_price, Some(4.99));
        assert!(rule.enabled);
    }

    #[test]
    fn test_deserialize_formula_without_id() {
        let rule: PricingRule =
            serde_json::from_str(r#"{"name": "Jewelry", "type": "formula"}"#).unwrap();
        assert_eq!(rule.kind, RuleKind::Formula);
        assert!(rule.id.as_str().starts_with("rule_"));
    }
}
