//! Filter command implementation
//!
//! Discovers candidates, runs them through the configured chain and reports
//! which documents are admitted.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use crate::chain;
use crate::cli::Output;
use crate::config::{OnError, XmlsiftConfig};
use crate::discovery::discover;
use crate::report::RunReport;

/// How the run result is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Styled list of admitted documents
    Text,
    /// Full report with every decision and the run statistics
    Json,
    /// Admitted paths only, one per line
    Files,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Files or directories to filter (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Print run statistics after the admitted list (text format)
    #[arg(long)]
    pub stats: bool,

    /// Maximum worker threads (overrides run.max_threads)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// What to do when a candidate cannot be parsed or evaluated
    #[arg(long, value_enum)]
    pub on_error: Option<OnError>,
}

pub async fn execute(args: FilterArgs, custom_config: Option<&str>, output: &Output) -> Result<()> {
    let mut config = XmlsiftConfig::load(custom_config)?;

    if let Some(threads) = args.threads {
        config.run.max_threads = threads;
    }
    if let Some(on_error) = args.on_error {
        config.run.on_error = on_error;
    }
    config.validate().context("Invalid filter configuration")?;

    let inputs = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths
    };

    let discovery = discover(&inputs, &config.input);
    for warning in &discovery.warnings {
        output.warning(warning);
    }
    output.verbose(&format!("Evaluating {} candidate(s)", discovery.candidates.len()));

    let candidates = discovery.candidates;
    let report = tokio::task::spawn_blocking(move || chain::run(&config, candidates))
        .await
        .context("Filter run did not complete")??;

    match args.format {
        ReportFormat::Text => print_text(&report, args.stats, output),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Files => {
            for path in report.admitted() {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

fn print_text(report: &RunReport, show_stats: bool, output: &Output) {
    if report.candidates.is_empty() {
        output.info("No candidates found");
        return;
    }

    output.header("Admitted documents");
    for candidate in &report.candidates {
        output.decision(
            &candidate.path.display().to_string(),
            candidate.admission.label(),
            candidate.admission.is_admitted(),
        );
    }

    output.blank_line();
    let stats = &report.stats;
    if stats.failures() > 0 {
        output.warning(&format!("{} candidate(s) could not be evaluated", stats.failures()));
    }
    output.success(&format!(
        "{} of {} candidate(s) admitted",
        stats.admitted, stats.candidates
    ));

    if show_stats {
        output.category("Statistics");
        output.summary_stats("Candidates", stats.candidates);
        output.summary_stats("Admitted", stats.admitted);
        output.summary_stats("Rejected by path", stats.rejected_by_path);
        output.summary_stats("Rejected by content", stats.rejected_by_content);
        output.summary_stats("Parse failures", stats.parse_failures);
        output.summary_stats("Evaluation failures", stats.evaluation_failures);
        output.key_value("Duration:", &format!("{}ms", stats.duration_ms), false);
    }
}
