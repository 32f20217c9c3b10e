//! Run results
//!
//! Per-candidate admissions plus the aggregate counters printed by
//! `xmlsift filter --stats` and embedded in JSON output.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::chain::Admission;

/// Decision for a single candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub admission: Admission,
}

/// Aggregate counters for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub candidates: usize,
    pub admitted: usize,
    pub rejected_by_path: usize,
    pub rejected_by_content: usize,
    pub parse_failures: usize,
    pub evaluation_failures: usize,
    pub duration_ms: u64,
}

impl RunStats {
    pub fn record(&mut self, admission: &Admission) {
        self.candidates += 1;
        match admission {
            Admission::Admitted => self.admitted += 1,
            Admission::RejectedByPath => self.rejected_by_path += 1,
            Admission::RejectedByContent => self.rejected_by_content += 1,
            Admission::ParseFailed { .. } => self.parse_failures += 1,
            Admission::EvaluationFailed { .. } => self.evaluation_failures += 1,
        }
    }

    pub fn failures(&self) -> usize {
        self.parse_failures + self.evaluation_failures
    }
}

/// Everything a run produced, in candidate order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub candidates: Vec<CandidateReport>,
    pub stats: RunStats,
}

impl RunReport {
    pub fn new(candidates: Vec<CandidateReport>, duration: Duration) -> Self {
        let mut stats = RunStats::default();
        for report in &candidates {
            stats.record(&report.admission);
        }
        stats.duration_ms = duration.as_millis() as u64;

        Self { candidates, stats }
    }

    /// Paths that made it through both phases
    pub fn admitted(&self) -> impl Iterator<Item = &Path> {
        self.candidates
            .iter()
            .filter(|report| report.admission.is_admitted())
            .map(|report| report.path.as_path())
    }

    /// Candidates that could not be parsed or evaluated, with the reason
    pub fn failures(&self) -> impl Iterator<Item = (&CandidateReport, &str)> {
        self.candidates
            .iter()
            .filter_map(|report| report.admission.reason().map(|reason| (report, reason)))
    }

    /// First candidate that could not be parsed or evaluated
    pub fn first_failure(&self) -> Option<(&CandidateReport, &str)> {
        self.failures().next()
    }
}
