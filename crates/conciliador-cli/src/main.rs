//! CLI application for bank statement reconciliation.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, identities, normalize, parse, reconcile};

/// Conciliador - Reconcile bank statements against accounting records
#[derive(Parser)]
#[command(name = "conciliador")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract transactions from statement page text
    Parse(parse::ParseArgs),

    /// Normalize spreadsheet rows into canonical records
    Normalize(normalize::NormalizeArgs),

    /// Match a statement against a record set
    Reconcile(reconcile::ReconcileArgs),

    /// Find new client identities in a portal export
    Identities(identities::IdentitiesArgs),

    /// Parse many statements at once
    Batch(batch::BatchArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Parse(args) => parse::run(args, config_path),
        Commands::Normalize(args) => normalize::run(args),
        Commands::Reconcile(args) => reconcile::run(args, config_path),
        Commands::Identities(args) => identities::run(args, config_path),
        Commands::Batch(args) => batch::run(args, config_path),
        Commands::Config(args) => config::run(args, config_path),
    }
}
