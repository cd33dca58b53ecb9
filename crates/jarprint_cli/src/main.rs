// jarprint CLI entry point
use anyhow::Result;
use clap::Parser;

use jarprint_cli::logging::init_logging;
use jarprint_cli::{run_extract, run_hash, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let report = match cli.command {
        Commands::Extract { input, output } => {
            let mut config = input.into_config();
            config.output = output;
            run_extract(&config)?
        }
        Commands::Hash { input, expect } => run_hash(&input.into_config(), expect.as_deref())?,
    };

    println!("{}", report);
    Ok(())
}
