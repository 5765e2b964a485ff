//! Rule listing command.

use anyhow::Result;
use console::style;
use dropship_pricing::{PricingRule, RuleRegistry};
use serde::Serialize;

use super::RulesArgs;
use crate::context::Context;

#[derive(Serialize)]
struct RuleRow<'a> {
    scope: String,
    resolved: bool,
    #[serde(flatten)]
    rule: &'a PricingRule,
}

/// Run the rules command.
pub fn run(args: RulesArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.config.registry();
    let rows = rule_rows(&registry, &args);

    if ctx.output.is_json() {
        ctx.output.json(&rows);
        return Ok(());
    }

    let currency = ctx.config.currency;
    ctx.output.header("Pricing rules");
    let widths = [28, 16, 24, 18, 20];
    ctx.output
        .table_row(&["Scope", "Id", "Name", "Rule", "Bounds"], &widths);

    for row in &rows {
        let bounds = match (row.rule.minimum_price, row.rule.maximum_price) {
            (Some(min), Some(max)) => {
                format!("{} - {}", currency.format(min), currency.format(max))
            }
            (Some(min), None) => format!(">= {}", currency.format(min)),
            (None, Some(max)) => format!("<= {}", currency.format(max)),
            (None, None) => "-".to_string(),
        };
        let scope = if row.resolved {
            format!("{} {}", style("*").green(), row.scope)
        } else {
            row.scope.clone()
        };
        let describe = row.rule.kind.describe();
        ctx.output.table_row(
            &[&scope, row.rule.id.as_str(), &row.rule.name, &describe, &bounds],
            &widths,
        );
    }

    if let Some(destination) = &args.destination {
        ctx.output.info(&format!(
            "* marks the rule used for {}{}",
            destination,
            args.category
                .as_deref()
                .map(|c| format!(" / {}", c))
                .unwrap_or_default()
        ));
    }

    Ok(())
}

fn rule_rows<'a>(registry: &'a RuleRegistry, args: &RulesArgs) -> Vec<RuleRow<'a>> {
    let resolved = args
        .destination
        .as_deref()
        .map(|d| registry.resolve(d, args.category.as_deref()).id.clone());

    registry
        .entries()
        .into_iter()
        .map(|(scope, rule)| RuleRow {
            scope: scope.to_string(),
            resolved: resolved.as_ref() == Some(&rule.id),
            rule,
        })
        .collect()
}
