use std::fmt::{self, Write};

use crate::models::WordReport;

/// Human-readable report. `limit` caps only the ranked section.
pub fn render(report: &WordReport, limit: Option<usize>) -> String {
    let mut out = String::new();
    // fmt::Write for String never fails.
    let _ = write_report(&mut out, report, limit);
    out
}

fn write_report(out: &mut String, report: &WordReport, limit: Option<usize>) -> fmt::Result {
    writeln!(out, "Document: {}/{}", report.source.file_path, report.source.file_name)?;
    writeln!(out, "SHA-256:  {}", report.fingerprint)?;
    writeln!(out, "Generated: {}", report.generated_at.to_rfc3339())?;
    writeln!(out)?;

    writeln!(out, "Morphemes:")?;
    writeln!(out, "{}", report.plain_text)?;
    writeln!(out)?;

    writeln!(out, "Nouns before deduplication: {}", report.total_tokens)?;
    writeln!(out, "Nouns after deduplication:  {}", report.distinct_tokens)?;
    writeln!(out)?;

    writeln!(out, "Counts:")?;
    for (token, count) in report.frequencies.iter() {
        writeln!(out, "  {} : {}", token, count)?;
    }
    writeln!(out)?;

    let shown = match limit {
        Some(n) => report.ranked.top(n),
        None => report.ranked.entries(),
    };
    writeln!(out, "Most frequent nouns:")?;
    if shown.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (position, entry) in shown.iter().enumerate() {
        writeln!(out, "  {:>3}. {} ({})", position + 1, entry.token, entry.count)?;
    }
    if shown.len() < report.ranked.len() {
        writeln!(out, "  ... {} more", report.ranked.len() - shown.len())?;
    }
    Ok(())
}
