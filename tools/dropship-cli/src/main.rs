//! Dropship CLI - price supplier variants from the command line.
//!
//! Commands:
//! - `dropship quote` - Price a single supplier cost
//! - `dropship reprice` - Reprice variant files through the result cache
//! - `dropship rules` - List pricing rules
//! - `dropship shipping` - Look up shipping rates
//! - `dropship cache` - Inspect or clear the result cache
//! - `dropship config` - Manage configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use commands::{CacheArgs, ConfigArgs, QuoteArgs, RepriceArgs, RulesArgs, ShippingArgs};

/// Dropship CLI - Price supplier products for import
#[derive(Parser)]
#[command(name = "dropship")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a supplier cost
    Quote(QuoteArgs),

    /// Reprice variant files
    Reprice(RepriceArgs),

    /// List pricing rules
    Rules(RulesArgs),

    /// Look up shipping rates
    Shipping(ShippingArgs),

    /// Inspect or clear the result cache
    Cache(CacheArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let ctx = match context::Context::load(cli.config.as_deref(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Quote(args) => commands::quote::run(args, &ctx),
        Commands::Reprice(args) => commands::reprice::run(args, &ctx),
        Commands::Rules(args) => commands::rules::run(args, &ctx),
        Commands::Shipping(args) => commands::shipping::run(args, &ctx),
        Commands::Cache(args) => commands::cache::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
