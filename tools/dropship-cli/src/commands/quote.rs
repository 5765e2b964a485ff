//! Single-price quote command.

use anyhow::{anyhow, Result};
use dropship_pricing::{
    try_calculate_pricing, Currency, PricingCalculationResult, PricingError, PricingRule,
};
use serde::Serialize;

use super::QuoteArgs;
use crate::context::Context;
use crate::output::margin_badge;

#[derive(Debug, Serialize)]
struct Quote {
    currency: Currency,
    destination: String,
    shipping_method: String,
    shipping_cost: f64,
    rule: Option<PricingRule>,
    #[serde(flatten)]
    result: PricingCalculationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    meets_target: Option<bool>,
}

/// Run the quote command.
pub fn run(args: QuoteArgs, ctx: &Context) -> Result<()> {
    let quote = build_quote(&args, ctx)?;

    if ctx.output.is_json() {
        ctx.output.json(&quote);
        return Ok(());
    }

    let currency = quote.currency;
    ctx.output.header("Quote");
    ctx.output.kv("Destination", &quote.destination);
    ctx.output.kv(
        "Shipping",
        &format!("{} ({})", currency.format(quote.shipping_cost), quote.shipping_method),
    );
    match &quote.rule {
        Some(rule) => ctx
            .output
            .kv("Rule", &format!("{} [{}] {}", rule.name, rule.id, rule.kind.describe())),
        None => ctx.output.kv("Rule", "none (priced at cost)"),
    }

    let result = &quote.result;
    ctx.output.kv("Cost basis", &currency.format(result.original_price));
    ctx.output.kv("Price", &currency.format(result.calculated_price));
    ctx.output.kv("Compare at", &currency.format(result.compare_at_price));
    ctx.output.kv("Profit", &currency.format(result.profit_amount));
    ctx.output.kv("Margin", &margin_badge(result.profit_margin, args.target_margin));
    ctx.output.kv("Markup", &format!("{:.2}%", result.markup));

    if quote.meets_target == Some(false) {
        ctx.output.warn(&format!(
            "Margin {:.2}% is below the {:.2}% target",
            result.profit_margin,
            args.target_margin.unwrap_or_default()
        ));
    }

    Ok(())
}

fn build_quote(args: &QuoteArgs, ctx: &Context) -> Result<Quote> {
    let currency = match &args.currency {
        Some(code) => {
            Currency::from_code(code).ok_or_else(|| anyhow!("Unknown currency: {}", code))?
        }
        None => ctx.config.currency,
    };
    let destination = args
        .destination
        .clone()
        .unwrap_or_else(|| ctx.config.default_destination.clone());
    let shipping_method = args
        .method
        .clone()
        .unwrap_or_else(|| ctx.config.default_shipping_method.clone());

    let shipping_cost = match args.shipping {
        Some(cost) => cost,
        None => ctx.config.shipping_table().cost(&destination, &shipping_method),
    };
    ctx.output
        .debug(&format!("Shipping {} to {}: {}", shipping_method, destination, shipping_cost));

    let registry = ctx.config.registry();
    let rule = if args.disabled {
        None
    } else if let Some(id) = &args.rule {
        let rule = registry
            .find(id)
            .ok_or_else(|| PricingError::RuleNotFound(id.clone()))?;
        Some(rule.clone())
    } else {
        Some(
            registry
                .resolve(&destination, args.category.as_deref())
                .clone(),
        )
    };

    let result = try_calculate_pricing(args.price, shipping_cost, rule.as_ref())?;
    let meets_target = args.target_margin.map(|target| result.meets_margin(target));

    Ok(Quote {
        currency,
        destination,
        shipping_method,
        shipping_cost,
        rule,
        result,
        meets_target,
    })
}
