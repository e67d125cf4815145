//! Per-file verification results.

use serde::{Deserialize, Serialize};

/// Placeholder written to a record's `doi` field when no DOI was confirmed
pub const DOI_NOT_FOUND: &str = "DOI not found";

/// Terminal status of one processed PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Success")]
    Success,
    #[serde(rename = "DOI not found")]
    DoiNotFound,
    #[serde(rename = "Fail (PDF text extraction failed)")]
    PdfTextExtractionFailed,
    #[serde(rename = "Fail (ChatGPT title extraction failed)")]
    TitleExtractionFailed,
    #[serde(rename = "Fail (Titles do not match)")]
    TitlesDoNotMatch,
}

impl Status {
    /// Returns the display label of the status
    pub fn label(&self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::DoiNotFound => "DOI not found",
            Status::PdfTextExtractionFailed => "Fail (PDF text extraction failed)",
            Status::TitleExtractionFailed => "Fail (ChatGPT title extraction failed)",
            Status::TitlesDoNotMatch => "Fail (Titles do not match)",
        }
    }

    /// Whether a DOI was confirmed before this status was reached
    pub fn has_doi(&self) -> bool {
        !matches!(self, Status::DoiNotFound)
    }

    /// Failure reached after a DOI was confirmed
    pub fn is_failure_with_doi(&self) -> bool {
        matches!(
            self,
            Status::PdfTextExtractionFailed
                | Status::TitleExtractionFailed
                | Status::TitlesDoNotMatch
        )
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of the DOI stage for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoiOutcome {
    /// DOI confirmed by the registry
    Found {
        doi: String,
        registry_title: String,
        via_llm: bool,
    },
    /// No DOI the registry would confirm
    NotFound { llm_attempted: bool },
    /// The document could not be read at all
    ExtractionFailed { reason: String },
}

impl DoiOutcome {
    /// Whether the language model fallback ran
    pub fn used_llm(&self) -> bool {
        match self {
            DoiOutcome::Found { via_llm, .. } => *via_llm,
            DoiOutcome::NotFound { llm_attempted } => *llm_attempted,
            DoiOutcome::ExtractionFailed { .. } => false,
        }
    }
}

/// Result of processing one PDF
///
/// Created once per file and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// File name within the processed folder
    pub filename: String,

    /// Confirmed DOI, or [`DOI_NOT_FOUND`]
    pub doi: String,

    /// Title registered for the DOI
    pub registry_title: Option<String>,

    /// Title the language model read off the first page
    pub derived_title: Option<String>,

    /// Terminal status
    pub status: Status,

    /// Whether the language model fallback ran during DOI extraction
    #[serde(default)]
    pub llm_doi_extraction: bool,
}

impl ResultRecord {
    /// Record for a file whose DOI stage produced nothing usable
    pub fn doi_not_found(filename: &str, llm_doi_extraction: bool) -> Self {
        Self {
            filename: filename.to_string(),
            doi: DOI_NOT_FOUND.to_string(),
            registry_title: None,
            derived_title: None,
            status: Status::DoiNotFound,
            llm_doi_extraction,
        }
    }

    /// Record for a file whose DOI was confirmed
    pub fn with_doi(
        filename: &str,
        doi: &str,
        registry_title: &str,
        derived_title: Option<String>,
        status: Status,
        llm_doi_extraction: bool,
    ) -> Self {
        Self {
            filename: filename.to_string(),
            doi: doi.to_string(),
            registry_title: Some(registry_title.to_string()),
            derived_title,
            status,
            llm_doi_extraction,
        }
    }
}
