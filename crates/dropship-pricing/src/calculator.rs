//! Sale price calculation from a cost basis and a rule.

use crate::error::PricingError;
use crate::money::round2;
use crate::rules::{PricingRule, RuleKind};
use serde::{Deserialize, Serialize};

/// Compare-at multiplier applied when no rule is active.
pub const DISABLED_COMPARE_AT_MULTIPLIER: f64 = 1.2;

/// Derived prices for one cost basis. All values rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingCalculationResult {
    /// Cost basis: supplier price plus shipping.
    pub original_price: f64,
    /// Sale price after the rule and bounds.
    pub calculated_price: f64,
    /// "Was" price shown next to the sale price.
    pub compare_at_price: f64,
    /// Profit as a percentage of the sale price.
    pub profit_margin: f64,
    /// Sale price minus cost basis.
    pub profit_amount: f64,
    /// Profit as a percentage of the cost basis.
    pub markup: f64,
}

impl PricingCalculationResult {
    /// Whether the margin reaches `target` percent, within rounding.
    pub fn meets_margin(&self, target: f64) -> bool {
        self.profit_margin + 0.005 >= target
    }

    fn at_cost(cost: f64) -> Self {
        Self {
            original_price: round2(cost),
            calculated_price: round2(cost),
            compare_at_price: round2(cost * DISABLED_COMPARE_AT_MULTIPLIER),
            profit_margin: 0.0,
            profit_amount: 0.0,
            markup: 0.0,
        }
    }
}

/// Calculate the sale price for a supplier cost.
///
/// Without an enabled rule the product sells at cost. Inputs are not
/// validated: NaN or negative prices flow through to the result. Use
/// [`try_calculate_pricing`] to reject them.
pub fn calculate_pricing(
    supplier_price: f64,
    shipping_cost: f64,
    rule: Option<&PricingRule>,
) -> PricingCalculationResult {
    let cost = supplier_price + shipping_cost;

    let rule = match rule {
        Some(rule) if rule.enabled => rule,
        _ => return PricingCalculationResult::at_cost(cost),
    };

    let calculated = rule.clamp(rule.apply(cost));
    let compare_at = calculated * rule.compare_at_multiplier();
    let profit = calculated - cost;

    PricingCalculationResult {
        original_price: round2(cost),
        calculated_price: round2(calculated),
        compare_at_price: round2(compare_at),
        profit_margin: round2(percent_of(profit, calculated)),
        profit_amount: round2(profit),
        markup: round2(percent_of(profit, cost)),
    }
}

/// Validating variant of [`calculate_pricing`].
pub fn try_calculate_pricing(
    supplier_price: f64,
    shipping_cost: f64,
    rule: Option<&PricingRule>,
) -> Result<PricingCalculationResult, PricingError> {
    check_price("supplier_price", supplier_price)?;
    check_price("shipping_cost", shipping_cost)?;

    if let Some(rule) = rule.filter(|r| r.enabled) {
        if let RuleKind::Percentage {
            profit_margin_percentage: m,
        } = rule.kind
        {
            if !(0.0..100.0).contains(&m) {
                return Err(PricingError::InvalidMargin(m));
            }
        }
    }

    Ok(calculate_pricing(supplier_price, shipping_cost, rule))
}

fn check_price(field: &'static str, value: f64) -> Result<(), PricingError> {
    if !value.is_finite() || value < 0.0 {
        return Err(PricingError::InvalidInput { field, value });
    }
    Ok(())
}

// A zero base means nothing to take a share of; NaN inputs still propagate.
fn percent_of(part: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        part / base * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forty_percent() -> PricingRule {
        PricingRule::percentage("40%", 40.0).with_compare_at_multiplier(1.3)
    }

    #[test]
    fn test_percentage_scenario() {
        let result = calculate_pricing(10.0, 2.0, Some(&forty_percent()));

        assert_eq!(result.original_price, 12.0);
        assert_eq!(result.calculated_price, 20.0);
        assert_eq!(result.compare_at_price, 26.0);
        assert_eq!(result.profit_amount, 8.0);
        assert_eq!(result.profit_margin, 40.0);
        assert_eq!(result.markup, 66.67);
    }

    #[test]
    fn test_minimum_clamp_drives_compare_at() {
        let rule = forty_percent().with_minimum_price(25.0);
        let result = calculate_pricing(10.0, 2.0, Some(&rule));

        assert_eq!(result.calculated_price, 25.0);
        assert_eq!(result.compare_at_price, 32.5);
        assert_eq!(result.profit_amount, 13.0);
        assert_eq!(result.profit_margin, 52.0);
    }

    #[test]
    fn test_maximum_clamp_is_exact() {
        let rule = forty_percent().with_maximum_price(15.0);
        let result = calculate_pricing(10.0, 2.0, Some(&rule));
        assert_eq!(result.calculated_price, 15.0);
    }

    #[test]
    fn test_no_rule_sells_at_cost() {
        let result = calculate_pricing(10.0, 2.5, None);

        assert_eq!(result.calculated_price, 12.5);
        assert_eq!(result.compare_at_price, 15.0);
        assert_eq!(result.profit_margin, 0.0);
        assert_eq!(result.profit_amount, 0.0);
        assert_eq!(result.markup, 0.0);
    }

    #[test]
    fn test_disabled_rule_sells_at_cost() {
        let rule = forty_percent().with_enabled(false);
        let result = calculate_pricing(10.0, 2.0, Some(&rule));
        assert_eq!(result, calculate_pricing(10.0, 2.0, None));
    }

    #[test]
    fn test_fixed_markup() {
        let rule = PricingRule::fixed("fixed", 5.0);
        let result = calculate_pricing(10.0, 2.0, Some(&rule));

        assert_eq!(result.calculated_price, 17.0);
        assert_eq!(result.compare_at_price, 22.1);
        assert_eq!(result.markup, 41.67);
        assert_eq!(result.profit_margin, 29.41);
    }

    #[test]
    fn test_formula_is_forty_percent_markup() {
        let rule = PricingRule::formula("formula");
        let result = calculate_pricing(10.0, 0.0, Some(&rule));

        assert_eq!(result.calculated_price, 14.0);
        assert_eq!(result.markup, 40.0);
    }

    #[test]
    fn test_margin_target_property() {
        for m in [5.0, 12.5, 30.0, 47.0, 65.0, 90.0] {
            let rule = PricingRule::percentage("m", m);
            for (supplier, shipping) in [(0.99, 0.0), (7.35, 3.5), (129.0, 12.0)] {
                let result = calculate_pricing(supplier, shipping, Some(&rule));
                assert!(
                    (result.profit_margin - m).abs() <= 0.05,
                    "m={} supplier={} margin={}",
                    m,
                    supplier,
                    result.profit_margin
                );
            }
        }
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let rule = forty_percent().with_maximum_price(100.0);
        let a = calculate_pricing(33.33, 4.2, Some(&rule));
        let b = calculate_pricing(33.33, 4.2, Some(&rule));
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_cost_does_not_produce_nan() {
        let rule = PricingRule::fixed("zero", 0.0);
        let result = calculate_pricing(0.0, 0.0, Some(&rule));
        assert_eq!(result.profit_margin, 0.0);
        assert_eq!(result.markup, 0.0);
    }

    #[test]
    fn test_nan_propagates() {
        let result = calculate_pricing(f64::NAN, 0.0, Some(&forty_percent()));
        assert!(result.calculated_price.is_nan());
    }

    #[test]
    fn test_try_calculate_rejects_bad_input() {
        assert!(matches!(
            try_calculate_pricing(-1.0, 0.0, None),
            Err(PricingError::InvalidInput {
                field: "supplier_price",
                ..
            })
        ));
        assert!(matches!(
            try_calculate_pricing(1.0, f64::NAN, None),
            Err(PricingError::InvalidInput {
                field: "shipping_cost",
                ..
            })
        ));
        let full_margin = PricingRule::percentage("100", 100.0);
        assert!(matches!(
            try_calculate_pricing(1.0, 0.0, Some(&full_margin)),
            Err(PricingError::InvalidMargin(_))
        ));
    }

    #[test]
    fn test_try_calculate_matches_infallible() {
        let rule = forty_percent();
        let checked = try_calculate_pricing(10.0, 2.0, Some(&rule)).unwrap();
        assert_eq!(checked, calculate_pricing(10.0, 2.0, Some(&rule)));
    }

    #[test]
    fn test_meets_margin() {
        let result = calculate_pricing(10.0, 2.0, Some(&forty_percent()));
        assert!(result.meets_margin(40.0));
        assert!(!result.meets_margin(41.0));
    }
}
