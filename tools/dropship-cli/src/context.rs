//! CLI execution context.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use dropship_cache::{CachePolicy, JsonFileStore, SwrCache};
use dropship_pricing::{PricingConfig, PricingOrchestrator};
use tracing::{debug, warn};

use crate::output::Output;

/// Config file names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["dropship.toml", ".dropship.toml", "dropship.json"];

const DEFAULT_CACHE_PATH: &str = ".dropship/cache.json";

/// Execution context for CLI commands.
pub struct Context {
    /// Pricing configuration.
    pub config: PricingConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from an explicit config file or the nearest one found.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            let path = resolve(&cwd, path);
            let config = PricingConfig::load(&path)?;
            (config, Some(path))
        } else {
            match find_config(&cwd) {
                Some((path, config)) => (config, Some(path)),
                None => (PricingConfig::default(), None),
            }
        };

        if let Some(path) = &config_path {
            debug!(path = %path.display(), "Loaded config");
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Orchestrator seeded from the loaded config.
    pub fn orchestrator(&self) -> PricingOrchestrator {
        PricingOrchestrator::from_config(&self.config)
    }

    /// Cache file location. Relative paths resolve against the config
    /// file's directory, or the working directory without one.
    pub fn cache_path(&self) -> PathBuf {
        let base = self
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(&self.cwd);
        let path = self
            .config
            .cache
            .path
            .as_deref()
            .unwrap_or(DEFAULT_CACHE_PATH);
        resolve(base, path)
    }

    /// Open the file-backed result cache.
    pub fn open_cache(&self) -> Result<SwrCache<JsonFileStore>> {
        let path = self.cache_path();
        let store = JsonFileStore::open(&path)
            .with_context(|| format!("Failed to open cache: {}", path.display()))?;
        Ok(SwrCache::new(store).with_prefix(self.config.cache.prefix.clone()))
    }

    /// Freshness policy from the cache settings.
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::new(Duration::from_secs(self.config.cache.ttl_secs))
            .with_stale_time(Duration::from_secs(self.config.cache.stale_secs))
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        resolve(&self.cwd, path)
    }
}

fn resolve(base: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Find a config file in the directory tree.
fn find_config(start: &Path) -> Option<(PathBuf, PricingConfig)> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if !config_path.exists() {
                continue;
            }
            match PricingConfig::load(&config_path) {
                Ok(config) => return Some((config_path, config)),
                Err(e) => warn!(error = %e, "Skipping unreadable config"),
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("dropship.toml"),
            "default_destination = \"Germany\"\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (path, config) = find_config(&nested).unwrap();
        assert_eq!(path, dir.path().join("dropship.toml"));
        assert_eq!(config.default_destination, "Germany");
    }

    #[test]
    fn test_find_config_skips_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dropship.toml"), "cache = 3").unwrap();
        std::fs::write(dir.path().join("dropship.json"), "{}").unwrap();

        let (path, _) = find_config(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("dropship.json"));
    }

    #[test]
    fn test_cache_path_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("dropship.toml");
        let ctx = Context {
            config: PricingConfig::default(),
            config_path: Some(config_path),
            output: Output::new(false, true),
            cwd: PathBuf::from("/somewhere/else"),
        };
        assert_eq!(ctx.cache_path(), dir.path().join(".dropship/cache.json"));
    }

    #[test]
    fn test_cache_policy_from_settings() {
        let mut config = PricingConfig::default();
        config.cache.ttl_secs = 120;
        config.cache.stale_secs = 30;
        let ctx = Context {
            config,
            config_path: None,
            output: Output::new(false, true),
            cwd: PathBuf::from("/tmp"),
        };
        let policy = ctx.cache_policy();
        assert_eq!(policy.ttl, Duration::from_secs(120));
        assert_eq!(policy.stale_time, Duration::from_secs(30));
    }
}
