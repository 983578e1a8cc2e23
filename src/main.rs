use anyhow::Result;
use clap::{Parser, Subcommand};
use lasp::algorithm::search;

#[derive(Parser)]
#[command(name = "lasp")]
#[command(version = "0.1.0")]
#[command(about = "Parallel seed-and-extend local alignment search for protein collections", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Protein vs protein (gapped)
    Search(search::SearchArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => {
            search::run(args)?;
        }
    }
    Ok(())
}
