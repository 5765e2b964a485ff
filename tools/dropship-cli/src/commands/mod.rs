//! CLI command implementations.

pub mod cache;
pub mod config;
pub mod quote;
pub mod reprice;
pub mod rules;
pub mod shipping;

use clap::{Args, Subcommand};

/// Arguments for the quote command.
#[derive(Args)]
pub struct QuoteArgs {
    /// Supplier unit cost.
    #[arg(short, long)]
    pub price: f64,

    /// Flat shipping cost (skips the rate lookup).
    #[arg(short, long, conflicts_with_all = ["destination", "method"])]
    pub shipping: Option<f64>,

    /// Shipping destination (default: from config).
    #[arg(short, long)]
    pub destination: Option<String>,

    /// Shipping method (default: from config).
    #[arg(short, long)]
    pub method: Option<String>,

    /// Product category used for rule resolution.
    #[arg(long)]
    pub category: Option<String>,

    /// Use a specific rule by id.
    #[arg(short, long, conflicts_with = "disabled")]
    pub rule: Option<String>,

    /// Price at cost, without a rule.
    #[arg(long)]
    pub disabled: bool,

    /// Warn when the margin falls below this percentage.
    #[arg(long)]
    pub target_margin: Option<f64>,

    /// Display currency code (default: from config).
    #[arg(long)]
    pub currency: Option<String>,
}

/// Arguments for the reprice command.
#[derive(Args)]
pub struct RepriceArgs {
    /// JSON files with an array of variants.
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Shipping destination (default: from config).
    #[arg(short, long)]
    pub destination: Option<String>,

    /// Shipping method (default: from config).
    #[arg(short, long)]
    pub method: Option<String>,

    /// Product category used for rule resolution.
    #[arg(long)]
    pub category: Option<String>,

    /// Price at cost, without a rule.
    #[arg(long)]
    pub disabled: bool,

    /// Write repriced variants to this file.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Skip the result cache.
    #[arg(long)]
    pub no_cache: bool,
}

/// Arguments for the rules command.
#[derive(Args)]
pub struct RulesArgs {
    /// Highlight the rule resolved for this destination.
    #[arg(short, long)]
    pub destination: Option<String>,

    /// Category used together with `--destination`.
    #[arg(long, requires = "destination")]
    pub category: Option<String>,
}

/// Arguments for the shipping command.
#[derive(Args)]
pub struct ShippingArgs {
    /// Destination to look up.
    #[arg(short, long)]
    pub destination: Option<String>,

    /// Shipping method to look up.
    #[arg(short, long)]
    pub method: Option<String>,
}

/// Arguments for the cache command.
#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Show cache statistics.
    Stats,
    /// Remove every cached entry.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove expired entries.
    ClearExpired,
    /// Remove entries whose key starts with a prefix.
    Invalidate {
        /// Key prefix (e.g. "pricing:Germany").
        prefix: String,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Overwrite an existing config without asking.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
