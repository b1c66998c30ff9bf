//! Plain-text table rendering for `cwmed show`.

use colored::Colorize;
use cwmed_vocab::{CrosswalkHeader, CrosswalkResolver, CrosswalkRow};

const NULL: &str = "-";
const MAX_CELL: usize = 48;

fn clip(value: &str) -> String {
    if value.chars().count() <= MAX_CELL {
        return value.to_string();
    }
    let mut out: String = value.chars().take(MAX_CELL - 1).collect();
    out.push('…');
    out
}

/// Render `rows` as left-aligned columns. Null cells print as `-`.
pub fn render_table<'a>(
    header: &CrosswalkHeader,
    rows: impl IntoIterator<Item = &'a CrosswalkRow>,
) -> String {
    let columns = header.columns();
    let cells: Vec<[String; 6]> = rows
        .into_iter()
        .map(|row| row.fields().map(|f| clip(f.unwrap_or(NULL))))
        .collect();

    let mut widths = columns.clone().map(|c| c.chars().count());
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let head: Vec<String> = columns
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{c:<w$}"))
        .collect();
    out.push_str(&head.join("  ").bold().to_string());
    out.push('\n');

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

pub fn render_summary(resolver: &CrosswalkResolver) -> String {
    let summary = resolver.summary();
    let mut out = format!(
        "{} -> {}: {} source rows -> {} crosswalk rows ({} mapped, {} failed)",
        resolver.source_vocab().bold(),
        resolver.target_vocab().bold(),
        summary.source_rows,
        summary.output_rows,
        summary.mapped_rows.to_string().green(),
        summary.failed_rows.to_string().red(),
    );
    if summary.ambiguous_sources > 0 {
        out.push_str(&format!(
            "; {} source codes map to more than one target",
            summary.ambiguous_sources.to_string().yellow()
        ));
    }
    out
}
