//! Aggregate statistics over a run.

use serde::{Deserialize, Serialize};

use crate::models::{ResultRecord, Status};

/// Counters folded from the result records of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Files with a confirmed DOI (the accuracy denominator)
    pub total_processed: usize,

    /// Files whose titles matched
    pub successful_matches: usize,

    /// Files whose DOI stage fell back to the language model
    pub llm_doi_extractions: usize,

    /// Files with no confirmed DOI
    pub doi_not_found: usize,

    /// Files that failed after their DOI was confirmed
    pub failed_with_values: usize,
}

impl RunSummary {
    /// Fold a sequence of records into counters.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ResultRecord>,
    {
        records.into_iter().fold(Self::default(), |mut acc, record| {
            if record.llm_doi_extraction {
                acc.llm_doi_extractions += 1;
            }
            if record.status.has_doi() {
                acc.total_processed += 1;
            }
            match record.status {
                Status::Success => acc.successful_matches += 1,
                Status::DoiNotFound => acc.doi_not_found += 1,
                s if s.is_failure_with_doi() => acc.failed_with_values += 1,
                _ => {}
            }
            acc
        })
    }

    /// Percentage of files with a confirmed DOI whose titles matched.
    ///
    /// `None` when no file had a confirmed DOI.
    pub fn accuracy(&self) -> Option<f64> {
        if self.total_processed == 0 {
            return None;
        }
        Some(self.successful_matches as f64 / self.total_processed as f64 * 100.0)
    }

    /// Accuracy formatted with two decimals, or `N/A`.
    pub fn accuracy_label(&self) -> String {
        match self.accuracy() {
            Some(pct) => format!("{:.2}%", pct),
            None => "N/A".to_string(),
        }
    }
}
