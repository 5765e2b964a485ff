//! Shipping rate lookup command.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Result};
use dropship_pricing::ShippingTable;
use serde::Serialize;

use super::ShippingArgs;
use crate::context::Context;

#[derive(Serialize)]
struct Rate {
    method: String,
    destination: String,
    cost: f64,
}

/// Run the shipping command.
pub fn run(args: ShippingArgs, ctx: &Context) -> Result<()> {
    let table = ctx.config.shipping_table();

    match (&args.destination, &args.method) {
        (Some(destination), Some(method)) => {
            if table.method(method).is_none() {
                ctx.output.warn(&format!(
                    "Unknown shipping method '{}', using {}",
                    method, ctx.config.default_shipping_method
                ));
            }
            let rate = Rate {
                method: method.clone(),
                destination: destination.clone(),
                cost: table.cost(destination, method),
            };
            if ctx.output.is_json() {
                ctx.output.json(&rate);
            } else {
                println!("{}", ctx.config.currency.format(rate.cost));
            }
        }
        (Some(destination), None) => {
            let rates: Vec<Rate> = table
                .methods()
                .map(|(method, _)| Rate {
                    method: method.to_string(),
                    destination: destination.clone(),
                    cost: table.cost(destination, method),
                })
                .collect();
            print_rates(&rates, ctx);
        }
        (None, method) => {
            if let Some(method) = method {
                if table.method(method).is_none() {
                    bail!("Unknown shipping method: {}", method);
                }
            }
            print_table(&table, method.as_deref(), ctx);
        }
    }

    Ok(())
}

fn print_rates(rates: &[Rate], ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&rates);
        return;
    }

    let widths = [32, 10];
    for rate in rates {
        ctx.output.table_row(
            &[&rate.method, &ctx.config.currency.format(rate.cost)],
            &widths,
        );
    }
}

fn print_table(table: &ShippingTable, only: Option<&str>, ctx: &Context) {
    let methods: Vec<_> = table
        .methods()
        .filter(|(name, _)| only.map_or(true, |m| name.eq_ignore_ascii_case(m)))
        .collect();

    if ctx.output.is_json() {
        let rates: BTreeMap<&str, _> = methods.iter().copied().collect();
        ctx.output.json(&rates);
        return;
    }

    let destinations: BTreeSet<&str> = methods
        .iter()
        .flat_map(|(_, rates)| rates.destinations.keys().map(String::as_str))
        .collect();

    let mut header = vec!["Method"];
    header.extend(destinations.iter().copied());
    header.push("Other");
    let mut widths = vec![30];
    widths.extend(header[1..].iter().map(|h| h.len().max(8)));

    ctx.output.header("Shipping rates");
    ctx.output.table_row(&header, &widths);

    let currency = ctx.config.currency;
    for (name, rates) in methods {
        let mut cols = vec![name.to_string()];
        cols.extend(destinations.iter().map(|d| {
            rates
                .destinations
                .get(*d)
                .map(|cost| currency.format(*cost))
                .unwrap_or_else(|| "-".to_string())
        }));
        cols.push(currency.format(rates.default));
        let cols: Vec<&str> = cols.iter().map(String::as_str).collect();
        ctx.output.table_row(&cols, &widths);
    }
}
