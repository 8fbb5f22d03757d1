use anyhow::Result;
use clap::{Parser, Subcommand};
use cristin_reports::{collab, fetch, report};

#[derive(Parser)]
#[command(name = "cristin-reports")]
#[command(about = "Fetch Cristin publications, build CSV reports, analyse collaboration")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch publications for each person in a Cristin ID list
    Persons(fetch::PersonsArgs),
    /// Fetch publications for one organizational unit
    Unit(fetch::UnitArgs),
    /// Compute collaboration statistics for one organizational unit
    Collab(collab::CollabArgs),
    /// Split a combined report into one file per person
    Split(report::SplitArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    match cli.command {
        Commands::Persons(args) => fetch::run_persons(args),
        Commands::Unit(args) => fetch::run_unit(args),
        Commands::Collab(args) => collab::run(args),
        Commands::Split(args) => report::run_split(args),
    }
}
