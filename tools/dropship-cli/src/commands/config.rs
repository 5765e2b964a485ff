//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};
use dialoguer::Confirm;
use dropship_pricing::{generate_default_config, PricingConfig};

use super::{ConfigArgs, ConfigCommand};
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "none (builtin defaults)"),
    }
    ctx.output.kv("currency", ctx.config.currency.code());
    ctx.output
        .kv("default_destination", &ctx.config.default_destination);
    ctx.output.kv(
        "default_shipping_method",
        &ctx.config.default_shipping_method,
    );

    // Cache section
    ctx.output.info("");
    ctx.output.info("[cache]");
    ctx.output.kv("prefix", &ctx.config.cache.prefix);
    ctx.output
        .kv("stale_secs", &ctx.config.cache.stale_secs.to_string());
    ctx.output.kv("ttl_secs", &ctx.config.cache.ttl_secs.to_string());
    ctx.output
        .kv("path", &ctx.cache_path().display().to_string());

    // Rule overrides
    if let Some(rule) = &ctx.config.default_rule {
        ctx.output.info("");
        ctx.output.info("[default_rule]");
        ctx.output
            .kv(rule.id.as_str(), &format!("{} ({})", rule.name, rule.kind.describe()));
    }
    for (section, rules) in [
        ("destinations", &ctx.config.destinations),
        ("categories", &ctx.config.categories),
    ] {
        if rules.is_empty() {
            continue;
        }
        ctx.output.info("");
        ctx.output.info(&format!("[{}]", section));
        for (key, rule) in rules {
            ctx.output
                .kv(key, &format!("{} ({})", rule.name, rule.kind.describe()));
        }
    }

    // Shipping overrides
    let overrides: Vec<_> = ctx.config.shipping.methods().collect();
    if !overrides.is_empty() {
        ctx.output.info("");
        ctx.output.info("[shipping]");
        for (method, rates) in overrides {
            ctx.output.kv(
                method,
                &format!(
                    "{} destination rate(s), default {}",
                    rates.destinations.len(),
                    ctx.config.currency.format(rates.default)
                ),
            );
        }
    }

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        if ctx.output.is_json() {
            bail!(
                "Config file already exists: {}. Use --force to overwrite.",
                config_path.display()
            );
        }

        let confirmed = Confirm::new()
            .with_prompt(format!("Overwrite {}?", config_path.display()))
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Config init cancelled");
            return Ok(());
        }
    }

    fs::write(&config_path, generate_default_config())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    if ctx.output.is_json() {
        ctx.output
            .json(&serde_json::json!({ "created": config_path.display().to_string() }));
    } else {
        ctx.output
            .success(&format!("Created: {}", config_path.display()));
    }

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = check_config(&ctx.config);

    // Print results
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "valid": errors.is_empty(),
            "errors": errors,
            "warnings": warnings,
        }));
    } else if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

fn check_config(config: &PricingConfig) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Err(e) = config.validate() {
        errors.push(e.to_string());
    }

    // Destination without an explicit rate prices shipping at the default
    let table = config.shipping_table();
    let known = table
        .methods()
        .any(|(_, rates)| {
            rates
                .destinations
                .keys()
                .any(|d| d.eq_ignore_ascii_case(&config.default_destination))
        });
    if !known {
        warnings.push(format!(
            "default_destination '{}' has no explicit shipping rates",
            config.default_destination
        ));
    }

    if config.cache.stale_secs == 0 {
        warnings.push("cache.stale_secs is 0, every cached result is stale".to_string());
    }

    (errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_clean() {
        let (errors, warnings) = check_config(&PricingConfig::default());
        assert!(errors.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_generated_config_is_clean() {
        let config: PricingConfig = toml::from_str(&generate_default_config()).unwrap();
        let (errors, _) = check_config(&config);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_check_config_reports_errors_and_warnings() {
        let mut config = PricingConfig::default();
        config.default_destination = "Narnia".to_string();
        config.cache.stale_secs = 600;

        let (errors, warnings) = check_config(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("stale_secs"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Narnia"));
    }
}
