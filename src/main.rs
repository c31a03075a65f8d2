use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use doclink::cli::commands;
use doclink::cli::{Cli, Commands};
use doclink::logging;

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let discovery = cli.discovery_config();

    match cli.command {
        Commands::Check { ref path } => {
            let (output, has_errors) =
                commands::run_check(&canonical(path), &discovery, cli.config.as_deref(), &cli.format)?;
            println!("{}", output);
            if has_errors {
                std::process::exit(1);
            }
        }

        Commands::Resolve {
            ref file,
            ref context,
            ref root,
            ref link,
        } => {
            let output = commands::run_resolve(
                &canonical(root),
                &discovery,
                file,
                context.as_deref(),
                link,
                &cli.format,
            )?;
            println!("{}", output);
        }

        Commands::Symbols { ref path } => {
            let output = commands::run_symbols(&canonical(path), &discovery, &cli.format)?;
            println!("{}", output);
        }
    }

    Ok(())
}
