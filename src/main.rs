use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use pollmatch::{
    config::{FilterArgs, FilterConfig},
    pipeline, preprocess,
};

#[derive(Debug, Parser)]
#[command(about = "Match polling places against POI data and drop address mismatches")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalise a raw UTF-16 polling place export
    Preprocess {
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Join matched records with POI shards and filter by street address
    Filter(FilterArgs),
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();
    match cli.command {
        Command::Preprocess { input, output } => {
            let output = output.unwrap_or_else(|| preprocess::default_output(&input));
            preprocess::run(&input, &output)?;
        }
        Command::Filter(args) => {
            let config = FilterConfig::try_from(args)?;
            let summary = pipeline::run(&config)?;
            println!("{summary}");
        }
    }

    Ok(())
}
