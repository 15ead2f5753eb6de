//! Text summary builder for CLI output.
//!
//! Formats human-readable lines for generation results, history and catalogs.

use crate::catalog;
use crate::model::{GenerationResult, HistoryEntry};
use crate::progress::ProgressSnapshot;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Pre-formatted lines for text output.
pub struct TextSummary {
    pub lines: Vec<String>,
}

fn format_time(t: &OffsetDateTime) -> String {
    t.format(&Rfc3339).unwrap_or_else(|_| "-".into())
}

/// One progress line, e.g. `[ 42%] Perfecting every detail...`.
pub fn progress_line(snap: &ProgressSnapshot) -> String {
    format!("[{:>3.0}%] {}", snap.percent.floor(), snap.message())
}

pub fn build_text_summary(title: &str, result: &GenerationResult) -> TextSummary {
    let mut lines = vec![
        format!("Presentation ready: {title}"),
        format!("File: {}", result.artifact_filename),
        format!("Slides: {}", result.slide_count),
    ];
    if let Some(chapters) = result.chapters_detected {
        lines.push(format!("Chapters detected: {chapters}"));
    }
    if let Some(pdf) = result.pdf_filename.as_deref() {
        lines.push(format!("PDF: {pdf}"));
    }
    lines.push(format!("Created: {}", format_time(&result.created_at)));
    TextSummary { lines }
}

pub fn build_history_summary(entries: &[HistoryEntry]) -> TextSummary {
    if entries.is_empty() {
        return TextSummary {
            lines: vec!["No presentations yet".to_string()],
        };
    }
    let lines = entries
        .iter()
        .map(|e| {
            let template = catalog::template(&e.template_id)
                .map(|t| t.name)
                .unwrap_or(e.template_id.as_str());
            format!(
                "{id}  {created}  {slides:>2} slides  {template:<16}  {title}  ({file})",
                id = e.id,
                created = format_time(&e.created_at),
                slides = e.slide_count,
                title = e.title,
                file = e.artifact_filename,
            )
        })
        .collect();
    TextSummary { lines }
}

pub fn build_catalog_summary() -> TextSummary {
    let mut lines = vec!["Templates:".to_string()];
    lines.extend(
        catalog::TEMPLATES
            .iter()
            .map(|t| format!("  {:<18} {:<18} {}", t.id, t.name, t.description)),
    );
    lines.push("Color schemes:".to_string());
    lines.extend(
        catalog::COLOR_SCHEMES
            .iter()
            .map(|c| format!("  {:<18} {:<18} {}", c.id, c.name, c.primary)),
    );
    TextSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn summary_includes_optional_fields_only_when_present() {
        let mut result = GenerationResult {
            artifact_filename: "deck.pptx".into(),
            slide_count: 8,
            chapters_detected: None,
            pdf_filename: None,
            created_at: datetime!(2024-03-02 10:30 UTC),
        };
        let lines = build_text_summary("Rust", &result).lines;
        assert_eq!(lines.len(), 4);
        assert!(lines.contains(&"Slides: 8".to_string()));

        result.chapters_detected = Some(2);
        result.pdf_filename = Some("deck.pdf".into());
        let lines = build_text_summary("Rust", &result).lines;
        assert!(lines.contains(&"Chapters detected: 2".to_string()));
        assert!(lines.contains(&"PDF: deck.pdf".to_string()));
    }

    #[test]
    fn progress_line_rounds_down() {
        let snap = ProgressSnapshot {
            run: 1,
            percent: 42.9,
            message_index: 4,
            finished: false,
        };
        assert_eq!(progress_line(&snap), "[ 42%] Perfecting every detail...");
    }

    #[test]
    fn empty_history_has_placeholder() {
        assert_eq!(build_history_summary(&[]).lines, vec!["No presentations yet"]);
    }
}
