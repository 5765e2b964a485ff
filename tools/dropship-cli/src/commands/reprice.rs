//! Bulk repricing of variant files.

use std::collections::hash_map::DefaultHasher;
use std::convert::Infallible;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;

use anyhow::{Context as _, Result};
use dropship_cache::{cache_key, CacheStatus, KvStore, SwrCache};
use dropship_pricing::{PricingMode, PricingOrchestrator, PricingUpdate, ProductVariant, RuleKind};
use serde::Serialize;

use super::RepriceArgs;
use crate::context::Context;
use crate::output::{cache_badge, margin_badge};

#[derive(Serialize)]
struct RepricedFile {
    input: String,
    cache: Option<CacheStatus>,
    #[serde(flatten)]
    update: PricingUpdate,
}

/// Run the reprice command.
pub fn run(args: RepriceArgs, ctx: &Context) -> Result<()> {
    let mut orchestrator = ctx.orchestrator();
    if let Some(destination) = &args.destination {
        orchestrator = orchestrator.with_destination(destination.clone());
    }
    if let Some(method) = &args.method {
        orchestrator = orchestrator.with_shipping_method(method.clone());
    }
    if let Some(category) = &args.category {
        orchestrator = orchestrator.with_category(category.clone());
    }
    orchestrator.toggle_pricing_rule(!args.disabled);

    let cache = if args.no_cache {
        None
    } else {
        Some(ctx.open_cache()?)
    };

    let pb = ctx.output.progress(args.inputs.len() as u64, "Repricing");
    let mut files = Vec::with_capacity(args.inputs.len());

    for input in &args.inputs {
        pb.set_message(input.clone());
        let path = ctx.resolve_path(input);
        let variants = load_variants(&path)?;

        let (update, status) = match &cache {
            Some(cache) => reprice_cached(cache, ctx, &mut orchestrator, variants)?,
            None => (reprice(&mut orchestrator, variants), None),
        };

        files.push(RepricedFile {
            input: input.clone(),
            cache: status,
            update,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    if let Some(output) = &args.output {
        let variants: Vec<&ProductVariant> =
            files.iter().flat_map(|f| f.update.variants.iter()).collect();
        let path = ctx.resolve_path(output);
        let content = serde_json::to_string_pretty(&variants)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        ctx.output
            .success(&format!("Wrote {} variants to {}", variants.len(), path.display()));
    }

    if ctx.output.is_json() {
        ctx.output.json(&files);
        return Ok(());
    }

    print_summary(&files, &orchestrator, ctx);
    Ok(())
}

fn load_variants(path: &Path) -> Result<Vec<ProductVariant>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read variants: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse variants: {}", path.display()))
}

fn reprice(orchestrator: &mut PricingOrchestrator, variants: Vec<ProductVariant>) -> PricingUpdate {
    match orchestrator.update_variants(variants) {
        Some(update) => update,
        None => orchestrator.recalculate_pricing(),
    }
}

/// Serve from the cache. Stale results are recomputed and written back.
fn reprice_cached<S: KvStore>(
    cache: &SwrCache<S>,
    ctx: &Context,
    orchestrator: &mut PricingOrchestrator,
    variants: Vec<ProductVariant>,
) -> Result<(PricingUpdate, Option<CacheStatus>)> {
    let key = cache_key!(
        "pricing",
        orchestrator.destination(),
        orchestrator.shipping_method(),
        orchestrator.category().unwrap_or("-"),
        fingerprint(orchestrator.mode(), orchestrator.current_shipping_cost(), &variants)
    );
    let policy = ctx.cache_policy();

    let (update, status) = cache.get_or_fetch(&key, &policy, || {
        Ok::<_, Infallible>(reprice(orchestrator, variants.clone()))
    })?;
    ctx.output.debug(&format!("{} {}", status, key));

    if status != CacheStatus::Stale {
        return Ok((update, Some(status)));
    }

    let refreshed = cache.revalidate(&key, &policy, || {
        Ok::<_, Infallible>(reprice(orchestrator, variants))
    })?;
    Ok((refreshed.unwrap_or(update), Some(status)))
}

/// Hash of everything that affects the result, so config or input edits
/// never hit an old entry.
///
/// Rule ids and names are left out: a config rule without an id gets a
/// fresh one on every load.
fn fingerprint(mode: &PricingMode, shipping_cost: f64, variants: &[ProductVariant]) -> String {
    let mut hasher = DefaultHasher::new();
    match mode {
        PricingMode::Disabled => 0u8.hash(&mut hasher),
        PricingMode::Enabled(rule) => {
            1u8.hash(&mut hasher);
            hash_rule_kind(&rule.kind, &mut hasher);
            rule.minimum_price.map(f64::to_bits).hash(&mut hasher);
            rule.maximum_price.map(f64::to_bits).hash(&mut hasher);
            rule.compare_at_price_multiplier.map(f64::to_bits).hash(&mut hasher);
            rule.enabled.hash(&mut hasher);
        }
    }
    shipping_cost.to_bits().hash(&mut hasher);
    for variant in variants {
        variant.id.as_str().hash(&mut hasher);
        variant.sku.hash(&mut hasher);
        variant.supplier_price.to_bits().hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

fn hash_rule_kind(kind: &RuleKind, hasher: &mut DefaultHasher) {
    kind.as_str().hash(hasher);
    match *kind {
        RuleKind::Percentage {
            profit_margin_percentage,
        } => profit_margin_percentage.to_bits().hash(hasher),
        RuleKind::Fixed { fixed_markup } => fixed_markup.to_bits().hash(hasher),
        RuleKind::Formula => {}
    }
}

fn print_summary(files: &[RepricedFile], orchestrator: &PricingOrchestrator, ctx: &Context) {
    let currency = ctx.config.currency;
    let rule = match orchestrator.mode().rule() {
        Some(rule) => format!("{} ({})", rule.name, rule.kind.describe()),
        None => "none (priced at cost)".to_string(),
    };

    ctx.output.header("Repriced variants");
    ctx.output.kv("Destination", orchestrator.destination());
    ctx.output.kv("Shipping method", orchestrator.shipping_method());
    ctx.output.kv("Rule", &rule);

    let widths = [16, 10, 10, 10, 12, 10];
    for file in files {
        let status = file.cache.map(cache_badge).unwrap_or_else(|| "-".to_string());
        ctx.output.info(&format!("{} [{}]", file.input, status));
        ctx.output.table_row(
            &["SKU", "Cost", "Shipping", "Price", "Compare at", "Margin"],
            &widths,
        );
        for pricing in &file.update.results {
            let cost = currency.format(pricing.result.original_price - pricing.shipping_cost);
            let shipping = currency.format(pricing.shipping_cost);
            let price = currency.format(pricing.result.calculated_price);
            let compare_at = currency.format(pricing.result.compare_at_price);
            let margin = margin_badge(pricing.result.profit_margin, None);
            ctx.output.table_row(
                &[&pricing.sku, &cost, &shipping, &price, &compare_at, &margin],
                &widths,
            );
        }
    }

    let total: usize = files.iter().map(|f| f.update.variants.len()).sum();
    ctx.output
        .success(&format!("Repriced {} variants from {} file(s)", total, files.len()));
}
