//! Configuration command implementations

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::Output;
use crate::config::{ConfigFormat, XmlsiftConfig};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Display current merged configuration
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
    /// Validate configuration and print the filter tree
    Validate,
}

pub async fn execute(args: ConfigArgs, custom_config: Option<&str>, output: &Output) -> Result<()> {
    match args.command {
        ConfigCommand::Show { format } => {
            let config = XmlsiftConfig::load(custom_config)?;
            println!("{}", format.render(&config)?);
        }
        ConfigCommand::Validate => {
            let config = XmlsiftConfig::load(custom_config)?;
            config.validate().context("Configuration is invalid")?;
            let chain = config.build_chain()?;

            output.success("Configuration is valid");

            output.category("Run");
            output.key_value("On error:", &format!("{:?}", config.run.on_error).to_lowercase(), false);
            let threads = match config.run.max_threads {
                0 => format!("auto ({}% of cores)", config.run.thread_percentage),
                n => n.to_string(),
            };
            output.key_value("Threads:", &threads, false);
            output.key_value(
                "Document parsing:",
                if chain.needs_document() { "required" } else { "skipped" },
                chain.needs_document(),
            );

            output.category("Filters");
            if chain.is_empty() {
                output.info("No filters configured, every candidate is admitted");
            }
            for line in chain.describe_tree() {
                output.list_item(&line);
            }
        }
    }

    Ok(())
}
