//! Run report: the ordered result records plus their summary.

use serde::Serialize;
use std::path::Path;

use crate::models::{ResultRecord, RunSummary};
use crate::pipeline::PipelineError;

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// One record per processed file, in processing order
    pub results: Vec<ResultRecord>,

    /// Counters folded from `results`
    pub summary: RunSummary,

    /// Success percentage over files with a confirmed DOI
    pub accuracy: Option<f64>,
}

impl RunReport {
    pub fn new(results: Vec<ResultRecord>) -> Self {
        let summary = RunSummary::from_records(&results);
        Self {
            accuracy: summary.accuracy(),
            results,
            summary,
        }
    }

    /// The closing summary block printed after a run.
    pub fn render_summary(&self) -> String {
        let s = &self.summary;
        format!(
            "Accuracy: {} ({}/{})\n\
             Number of pdfs processed: {}\n\
             Number of successes: {}\n\
             Number of times the LLM was used to extract DOI: {}\n\
             Number of dois not found: {}\n\
             Number of title mismatch: {}\n",
            s.accuracy_label(),
            s.successful_matches,
            s.total_processed,
            s.total_processed,
            s.successful_matches,
            s.llm_doi_extractions,
            s.doi_not_found,
            s.failed_with_values,
        )
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), PipelineError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| PipelineError::WriteReport {
            path: path.to_path_buf(),
            source,
        })
    }
}
