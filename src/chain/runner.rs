use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;

use super::evaluate_candidate;
use crate::config::{OnError, XmlsiftConfig};
use crate::parallel::{ParallelConfig, ParallelProcessor};
use crate::report::{CandidateReport, RunReport};

/// Apply the configured chain to every candidate
///
/// Each worker builds its own chain from `config`. Candidates that fail to
/// parse or evaluate are logged; under `on_error = "abort"` the run then fails
/// naming the first of them in input order.
pub fn run(config: &XmlsiftConfig, candidates: Vec<PathBuf>) -> Result<RunReport> {
    let start = Instant::now();
    let processor = ParallelProcessor::new(ParallelConfig::from(&config.run));

    let reports = processor.process_with_init(
        candidates,
        || Ok(config.build_chain()?),
        |chain, path| CandidateReport {
            admission: evaluate_candidate(chain, &path),
            path,
        },
        "Filtering",
    )?;

    let report = RunReport::new(reports, start.elapsed());

    for (candidate, reason) in report.failures() {
        tracing::warn!(
            "{} ({}): {}",
            candidate.path.display(),
            candidate.admission.label(),
            reason
        );
    }

    tracing::info!(
        "Filtered {} candidate(s): {} admitted, {} failed in {}ms",
        report.stats.candidates,
        report.stats.admitted,
        report.stats.failures(),
        report.stats.duration_ms
    );

    if config.run.on_error == OnError::Abort {
        if let Some((failure, reason)) = report.first_failure() {
            anyhow::bail!(
                "Aborting: {} ({}): {}",
                failure.path.display(),
                failure.admission.label(),
                reason
            );
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Admission;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
        [[filters]]
        type = "path"
        pattern = '\.xml$'

        [[filters]]
        type = "content"
        query = "/Test"
    "#;

    fn fixtures() -> anyhow::Result<(TempDir, Vec<PathBuf>)> {
        let temp_dir = TempDir::new()?;
        let files = [
            ("a.xml", "<Test/>"),
            ("b.xml", "<Other/>"),
            ("c.txt", "<Test/>"),
            ("d.xml", "<Test>"),
            ("e.xml", "<Test><Child/></Test>"),
        ];

        let mut paths = Vec::new();
        for (name, body) in files {
            let path = temp_dir.path().join(name);
            fs::write(&path, body)?;
            paths.push(path);
        }
        Ok((temp_dir, paths))
    }

    #[test]
    fn test_run_skips_failures() -> anyhow::Result<()> {
        let (_temp_dir, paths) = fixtures()?;
        let config = XmlsiftConfig::from_toml_str(CONFIG)?;

        let report = run(&config, paths.clone())?;
        let outcomes: Vec<&Admission> = report.candidates.iter().map(|c| &c.admission).collect();

        assert_eq!(outcomes[0], &Admission::Admitted);
        assert_eq!(outcomes[1], &Admission::RejectedByContent);
        assert_eq!(outcomes[2], &Admission::RejectedByPath);
        assert!(matches!(outcomes[3], Admission::ParseFailed { .. }));
        assert_eq!(outcomes[4], &Admission::Admitted);

        let admitted: Vec<PathBuf> = report.admitted().map(PathBuf::from).collect();
        assert_eq!(admitted, vec![paths[0].clone(), paths[4].clone()]);
        assert_eq!(report.stats.parse_failures, 1);
        Ok(())
    }

    #[test]
    fn test_run_aborts_on_failure() -> anyhow::Result<()> {
        let (_temp_dir, paths) = fixtures()?;
        let mut config = XmlsiftConfig::from_toml_str(CONFIG)?;
        config.run.on_error = OnError::Abort;

        let err = run(&config, paths).unwrap_err();
        assert!(err.to_string().contains("d.xml"));
        assert!(err.to_string().contains("parse failed"));
        Ok(())
    }

    #[test]
    fn test_parallel_run_matches_sequential() -> anyhow::Result<()> {
        let (_temp_dir, paths) = fixtures()?;
        let mut config = XmlsiftConfig::from_toml_str(CONFIG)?;

        let sequential = run(&config, paths.clone())?;

        config.run.parallel_threshold = 0;
        config.run.max_threads = 3;
        let parallel = run(&config, paths)?;

        assert_eq!(sequential.candidates, parallel.candidates);
        Ok(())
    }

    #[test]
    fn test_invalid_chain_fails_the_run() {
        let config = XmlsiftConfig::from_toml_str("[[filters]]\ntype = \"path\"\n").unwrap();
        assert!(run(&config, vec![PathBuf::from("a.xml")]).is_err());
    }
}
