//! Command-line interface for xmlsift
//!
//! Global flags, subcommand dispatch and logging set-up. Each command lives in
//! its own module under [`commands`].

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};

pub mod commands;
pub mod output;

pub use output::Output;

use commands::{config, filter, version};

#[derive(Parser)]
#[command(
    name = "xmlsift",
    version = env!("CARGO_PKG_VERSION"),
    about = "Decide which XML documents enter an XML-to-CSV conversion run",
    long_about = "xmlsift applies a configurable tree of path and XPath filters to candidate \
                  files: path filters run before a file is read, content filters run on the \
                  parsed document."
)]
pub struct Cli {
    /// Run as if started in <DIR> instead of current working directory
    #[arg(short = 'C', long = "directory", global = true)]
    pub directory: Option<String>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply the filter chain to files and directories
    Filter(filter::FilterArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Show version information
    Version,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        // Change directory if specified
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir).with_context(|| format!("Cannot change directory to {dir}"))?;
        }

        setup_logging(self.verbose, self.quiet);

        let output = Output::new(self.verbose > 0, self.quiet);

        match self.command {
            Some(Commands::Filter(args)) => filter::execute(args, self.config.as_deref(), &output).await,
            Some(Commands::Config(args)) => config::execute(args, self.config.as_deref(), &output).await,
            Some(Commands::Version) => version::execute(&output).await,
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info,ignore=warn,globset=warn"),
        2 => tracing_subscriber::EnvFilter::new("debug,ignore=warn,globset=warn"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    // Logs go to stderr; stdout carries the report
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
