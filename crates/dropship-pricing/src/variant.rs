//! Product variant working set.

use crate::calculator::PricingCalculationResult;
use crate::ids::VariantId;
use serde::{Deserialize, Serialize};

/// A supplier variant being priced for import.
///
/// `supplier_price` is the only input; every other price field is
/// overwritten on each recalculation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Unique variant identifier.
    pub id: VariantId,
    /// Stock keeping unit.
    pub sku: String,
    /// Variant title (e.g., "Red / XL").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Unit cost from the supplier.
    pub supplier_price: f64,
    /// Sale price.
    #[serde(default)]
    pub current_price: f64,
    /// Compare-at price.
    #[serde(default)]
    pub compare_at_price: f64,
    /// Profit margin percentage.
    #[serde(default)]
    pub profit_margin: f64,
    /// Shipping cost used for the last pass.
    #[serde(default)]
    pub shipping_cost: f64,
}

impl ProductVariant {
    /// Create a variant priced at cost until the first recalculation.
    pub fn new(id: impl Into<VariantId>, sku: impl Into<String>, supplier_price: f64) -> Self {
        Self {
            id: id.into(),
            sku: sku.into(),
            title: None,
            supplier_price,
            current_price: supplier_price,
            compare_at_price: supplier_price,
            profit_margin: 0.0,
            shipping_cost: 0.0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Copy derived prices from a calculation result.
    pub fn apply(&mut self, shipping_cost: f64, result: &PricingCalculationResult) {
        self.shipping_cost = shipping_cost;
        self.current_price = result.calculated_price;
        self.compare_at_price = result.compare_at_price;
        self.profit_margin = result.profit_margin;
    }

    /// Cost basis including shipping.
    pub fn landed_cost(&self) -> f64 {
        self.supplier_price + self.shipping_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::calculate_pricing;
    use crate::rules::PricingRule;

    #[test]
    fn test_apply_result() {
        let mut variant = ProductVariant::new("v1", "SKU-1", 10.0);
        let result = calculate_pricing(10.0, 2.0, Some(&PricingRule::percentage("m", 40.0)));
        variant.apply(2.0, &result);

        assert_eq!(variant.current_price, 20.0);
        assert_eq!(variant.compare_at_price, 26.0);
        assert_eq!(variant.profit_margin, 40.0);
        assert_eq!(variant.landed_cost(), 12.0);
    }

    #[test]
    fn test_deserialize_input_only() {
        let variant: ProductVariant =
            serde_json::from_str(r#"{"id": "v9", "sku": "AE-9", "supplier_price": 3.25}"#)
                .unwrap();
        assert_eq!(variant.supplier_price, 3.25);
        assert_eq!(variant.current_price, 0.0);
        assert!(variant.title.is_none());
    }
}
