//! Per-file verification pipeline.
//!
//! For every PDF in a folder:
//!
//! 1. Find a DOI: scan the first [`DOI_SCAN_PAGES`] pages with the DOI
//!    pattern, and if that yields nothing the registry confirms, ask the
//!    language model using the first [`FALLBACK_PAGES`] pages
//! 2. Take the first page's raw text
//! 3. Have the language model read the title off it
//! 4. Have the language model compare that title with the registry's
//!
//! Each file ends in exactly one [`ResultRecord`]. Files are processed one
//! at a time in file-name order.

mod report;

pub use report::RunReport;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::llm::LlmTasks;
use crate::models::{DoiOutcome, ResultRecord, Status};
use crate::sources::{SourceError, TitleRegistry};
use crate::text::{find_doi, normalize_page_text, truncate_chars};
use crate::utils::{Document, DocumentReader};

/// Pages scanned with the DOI pattern.
pub const DOI_SCAN_PAGES: usize = 5;

/// Pages whose text is handed to the language model DOI fallback.
pub const FALLBACK_PAGES: usize = 3;

/// Character budget for the fallback prompt text.
pub const FALLBACK_TEXT_CHARS: usize = 3000;

/// Errors that abort a whole run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Cannot read folder {}: {source}", .path.display())]
    ReadFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write report {}: {source}", .path.display())]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The verification pipeline and its collaborators.
#[derive(Clone)]
pub struct Pipeline {
    reader: Arc<dyn DocumentReader>,
    registry: Arc<dyn TitleRegistry>,
    llm: LlmTasks,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("registry", &self.registry.name())
            .field("llm", &self.llm)
            .finish()
    }
}

impl Pipeline {
    pub fn new(
        reader: Arc<dyn DocumentReader>,
        registry: Arc<dyn TitleRegistry>,
        llm: LlmTasks,
    ) -> Self {
        Self {
            reader,
            registry,
            llm,
        }
    }

    /// Process every PDF in `folder`.
    pub async fn run(&self, folder: &Path) -> Result<RunReport, PipelineError> {
        self.run_with(folder, |_| {}).await
    }

    /// Process every PDF in `folder`, handing each record to `on_record` as
    /// soon as it is produced.
    pub async fn run_with<F>(
        &self,
        folder: &Path,
        mut on_record: F,
    ) -> Result<RunReport, PipelineError>
    where
        F: FnMut(&ResultRecord),
    {
        let files = pdf_files(folder)?;
        tracing::debug!("Found {} PDF files in {}", files.len(), folder.display());

        let mut records = Vec::with_capacity(files.len());
        for path in files {
            let record = self.process_file(&path).await;
            on_record(&record);
            records.push(record);
        }

        Ok(RunReport::new(records))
    }

    /// Run the whole state machine for one file.
    pub async fn process_file(&self, path: &Path) -> ResultRecord {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        tracing::info!("Processing {}...", filename);

        let document = match Document::open(self.reader.as_ref(), path, DOI_SCAN_PAGES) {
            Ok(document) => document,
            Err(e) => {
                let outcome = DoiOutcome::ExtractionFailed {
                    reason: e.to_string(),
                };
                return finish_without_doi(&filename, &outcome);
            }
        };

        let (doi, registry_title, via_llm) = match self.extract_doi(&document).await {
            DoiOutcome::Found {
                doi,
                registry_title,
                via_llm,
            } => (doi, registry_title, via_llm),
            outcome => return finish_without_doi(&filename, &outcome),
        };

        let (derived_title, status) = match document.first_page_text() {
            None => {
                tracing::warn!("No text extracted from first page of {}", filename);
                (None, Status::PdfTextExtractionFailed)
            }
            Some(first_page) => match self.llm.extract_title(first_page).await {
                None => (None, Status::TitleExtractionFailed),
                Some(title) => {
                    let status = if self.llm.titles_match(&registry_title, &title).await {
                        Status::Success
                    } else {
                        Status::TitlesDoNotMatch
                    };
                    (Some(title), status)
                }
            },
        };

        tracing::info!("{}: {}", filename, status);
        ResultRecord::with_doi(
            &filename,
            &doi,
            &registry_title,
            derived_title,
            status,
            via_llm,
        )
    }

    /// Find a DOI the registry confirms.
    ///
    /// The first page with any pattern match decides the pattern stage: if
    /// its DOI is not confirmed, later pages are not tried and the language
    /// model fallback runs instead.
    pub async fn extract_doi(&self, document: &Document) -> DoiOutcome {
        for page in document.pages(DOI_SCAN_PAGES) {
            if page.is_empty() {
                continue;
            }

            let Some(doi) = find_doi(&normalize_page_text(page)) else {
                continue;
            };
            tracing::info!("extracted doi from {}: {}", document.path().display(), doi);

            if let Some(registry_title) = self.confirm(&doi).await {
                return DoiOutcome::Found {
                    doi,
                    registry_title,
                    via_llm: false,
                };
            }
            break;
        }

        let text = fallback_text(document);
        let Some(doi) = self.llm.extract_doi(&text).await else {
            tracing::info!("LLM could not get DOI: {}", document.path().display());
            return DoiOutcome::NotFound {
                llm_attempted: true,
            };
        };
        tracing::info!(
            "DOI extracted by LLM from {}: {}",
            document.path().display(),
            doi
        );

        match self.confirm(&doi).await {
            Some(registry_title) => DoiOutcome::Found {
                doi,
                registry_title,
                via_llm: true,
            },
            None => {
                tracing::info!("Invalid DOI extracted by LLM: {}", doi);
                DoiOutcome::NotFound {
                    llm_attempted: true,
                }
            }
        }
    }

    /// Registry title for `doi`; every failure becomes `None`.
    async fn confirm(&self, doi: &str) -> Option<String> {
        match self.registry.title_for_doi(doi).await {
            Ok(title) => Some(title),
            Err(SourceError::NotFound(msg)) => {
                tracing::info!("No title found in {} for {}", self.registry.name(), msg);
                None
            }
            Err(e) => {
                tracing::warn!(
                    "exception while using {} for title {}: {}",
                    self.registry.name(),
                    doi,
                    e
                );
                None
            }
        }
    }
}

/// Normalized text of the first [`FALLBACK_PAGES`] pages, each followed by
/// a space, cut to [`FALLBACK_TEXT_CHARS`] characters.
pub fn fallback_text(document: &Document) -> String {
    let mut collected = String::new();
    for page in document.pages(FALLBACK_PAGES) {
        if page.is_empty() {
            continue;
        }
        collected.push_str(&normalize_page_text(page));
        collected.push(' ');
    }
    truncate_chars(&collected, FALLBACK_TEXT_CHARS).to_string()
}

fn finish_without_doi(filename: &str, outcome: &DoiOutcome) -> ResultRecord {
    if let DoiOutcome::ExtractionFailed { reason } = outcome {
        tracing::warn!("exception: {}: {}", filename, reason);
    }
    let record = ResultRecord::doi_not_found(filename, outcome.used_llm());
    tracing::info!("{}: {}", filename, record.status);
    record
}

/// PDF files directly inside `folder`, sorted by file name.
///
/// The extension check ignores case; directories are skipped.
pub fn pdf_files(folder: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let read_folder_error = |source: std::io::Error| PipelineError::ReadFolder {
        path: folder.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder).map_err(read_folder_error)? {
        let entry = entry.map_err(read_folder_error)?;
        let is_pdf = entry
            .file_name()
            .to_string_lossy()
            .to_lowercase()
            .ends_with(".pdf");
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_pdf && !is_dir {
            files.push(entry.path());
        }
    }

    files.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));
    Ok(files)
}
