//! Terminal output for the command-line front end.
//!
//! Colours and icons are only emitted when stdout is a terminal, so
//! redirected output stays plain text.

use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::models::{ResultRecord, Status};
use crate::pipeline::RunReport;

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Icon shown in front of a result line.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::DoiNotFound => "○",
        Status::PdfTextExtractionFailed => "⚠",
        Status::TitleExtractionFailed => "⚠",
        Status::TitlesDoNotMatch => "✗",
    }
}

/// One line describing a finished file.
///
/// Plain form: `<filename>: <status> [<doi>]`, with ` (LLM)` appended when
/// the DOI came from the language model.
pub fn format_record(record: &ResultRecord, color: bool) -> String {
    let llm = if record.llm_doi_extraction {
        " (LLM)"
    } else {
        ""
    };

    if !color {
        return format!(
            "{}: {} [{}]{}",
            record.filename, record.status, record.doi, llm
        );
    }

    let icon = status_icon(record.status);
    let icon = match record.status {
        Status::Success => icon.green().bold().to_string(),
        Status::DoiNotFound => icon.white().dimmed().to_string(),
        Status::TitlesDoNotMatch => icon.red().bold().to_string(),
        _ => icon.yellow().bold().to_string(),
    };

    format!(
        "{} {}: {} [{}]{}",
        icon,
        record.filename.bold(),
        record.status,
        record.doi.cyan(),
        llm.magenta()
    )
}

/// Print one finished file.
pub fn print_record(record: &ResultRecord) {
    println!("{}", format_record(record, is_terminal()));
    if let (Some(expected), Some(found)) = (&record.registry_title, &record.derived_title) {
        if record.status == Status::TitlesDoNotMatch {
            println!("    registry: {}", expected);
            println!("    document: {}", found);
        }
    }
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    if is_terminal() {
        println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
    } else {
        println!("=== {} ===", title);
    }
}

/// Print the closing summary block.
pub fn print_summary(report: &RunReport) {
    print_section("Summary");
    print!("{}", report.render_summary());
}
