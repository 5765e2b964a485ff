//! Result cache management commands.

use anyhow::{bail, Result};
use dialoguer::Confirm;

use super::{CacheArgs, CacheCommand};
use crate::context::Context;
use crate::output::{format_bytes, format_duration};

/// Run the cache command.
pub fn run(args: CacheArgs, ctx: &Context) -> Result<()> {
    let cache = ctx.open_cache()?;

    match args.command {
        CacheCommand::Stats => {
            let stats = cache.stats();
            if ctx.output.is_json() {
                ctx.output.json(&stats);
                return Ok(());
            }

            ctx.output.header("Result cache");
            ctx.output.kv("File", &ctx.cache_path().display().to_string());
            ctx.output.kv("Prefix", cache.prefix());
            ctx.output.kv(
                "Policy",
                &format!(
                    "fresh for {}, evicted after {}",
                    format_duration(ctx.config.cache.stale_secs),
                    format_duration(ctx.config.cache.ttl_secs)
                ),
            );
            ctx.output.kv("Entries", &stats.entries.to_string());
            ctx.output.kv("Fresh", &stats.fresh.to_string());
            ctx.output.kv("Stale", &stats.stale.to_string());
            ctx.output.kv("Expired", &stats.expired.to_string());
            if stats.corrupt > 0 {
                ctx.output.kv("Unreadable", &stats.corrupt.to_string());
            }
            ctx.output.kv("Size", &format_bytes(stats.bytes as u64));
        }
        CacheCommand::Clear { yes } => {
            if !yes {
                if ctx.output.is_json() {
                    bail!("Refusing to clear the cache without --yes in JSON mode");
                }

                let confirmed = Confirm::new()
                    .with_prompt("Remove every cached result?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    ctx.output.warn("Cache clear cancelled");
                    return Ok(());
                }
            }

            let removed = cache.clear();
            report(ctx, "cleared", removed);
        }
        CacheCommand::ClearExpired => {
            let removed = cache.clear_expired();
            report(ctx, "cleared", removed);
        }
        CacheCommand::Invalidate { prefix } => {
            let removed = cache.invalidate_prefix(&prefix);
            report(ctx, "invalidated", removed);
        }
    }

    Ok(())
}

fn report(ctx: &Context, action: &str, removed: usize) {
    if ctx.output.is_json() {
        ctx.output
            .json(&serde_json::json!({ "action": action, "removed": removed }));
        return;
    }

    let noun = if removed == 1 { "entry" } else { "entries" };
    ctx.output
        .success(&format!("{} cache {}: {}", removed, noun, action));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Output;
    use dropship_pricing::PricingConfig;
    use std::time::Duration;

    fn ctx(dir: &tempfile::TempDir) -> Context {
        Context {
            config: PricingConfig::default(),
            config_path: None,
            output: Output::new(false, true),
            cwd: dir.path().to_path_buf(),
        }
    }

    fn clear(yes: bool) -> CacheArgs {
        CacheArgs {
            command: CacheCommand::Clear { yes },
        }
    }

    #[test]
    fn test_json_clear_requires_yes() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(&dir);
        ctx.open_cache()
            .unwrap()
            .set("pricing:France", &42u64, Duration::from_secs(60));

        assert!(run(clear(false), &ctx).is_err());
        assert_eq!(ctx.open_cache().unwrap().get::<u64>("pricing:France"), Some(42));

        run(clear(true), &ctx).unwrap();
        assert_eq!(ctx.open_cache().unwrap().get::<u64>("pricing:France"), None);
    }
}
