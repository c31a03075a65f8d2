use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::discovery::DiscoveryConfig;

pub mod commands;
pub mod output;

#[derive(Parser)]
#[command(
    name = "doclink",
    version,
    about = "Resolve and check Javadoc cross-references ({@link}, {@value}, @see)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Include only files matching this glob
    #[arg(long, global = true)]
    pub include: Vec<String>,

    /// Exclude files matching this glob
    #[arg(long, global = true)]
    pub exclude: Vec<String>,

    /// Path to config file (default: .doclink/config.toml or doclink.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log resolution steps to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            include: self.include.clone(),
            exclude: self.exclude.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report doc-comment references that do not resolve
    Check {
        /// Project path (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Resolve one link expression as if written inside a type
    Resolve {
        /// Source file the link appears in
        #[arg(long)]
        file: PathBuf,
        /// Enclosing type path within the file, e.g. `Outer.Inner`
        /// (default: the file's first top-level type)
        #[arg(long)]
        context: Option<String>,
        /// Project root
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Link expression, e.g. `Foo#bar(int)`
        link: String,
    },

    /// List the declared types and members of the project
    Symbols {
        /// Project path (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Compact,
}
