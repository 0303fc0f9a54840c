//! Report Export Module
//! Writes every chart kind as a PNG plus a plain-text report into a folder.

use crate::charts::projector::{classify_columns, project, ChartKind, ProjectionError};
use crate::charts::renderer::{RenderError, StaticChartRenderer};
use crate::data::Table;
use crate::stats::query::format_number;
use crate::stats::StatsCalculator;
use rayon::prelude::*;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to render chart: {0}")]
    Render(#[from] RenderError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// Files written by an export, and the chart kinds left out.
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
    pub skipped: Vec<ChartKind>,
}

/// File-system friendly stem for a table name.
pub fn file_stem(table_name: &str) -> String {
    let stem: String = table_name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if stem.is_empty() {
        "table".to_string()
    } else {
        stem
    }
}

/// Render all chart kinds in parallel and write them, with a text report,
/// into `dir`.
pub fn export_report(
    table: &Table,
    dir: &Path,
    size: (u32, u32),
) -> Result<ExportSummary, ExportError> {
    fs::create_dir_all(dir)?;
    let stem = file_stem(&table.name);

    let rendered: Vec<(ChartKind, Option<Vec<u8>>)> = ChartKind::ALL
        .par_iter()
        .map(|&kind| {
            let bytes = match project(table, kind, None) {
                Ok(projection) => {
                    let title = format!("{} - {}", table.name, kind.label());
                    StaticChartRenderer::render_png(&projection, kind, &title, size.0, size.1)
                        .map(Some)
                }
                Err(e) => {
                    warn!(kind = %kind, error = %e, "chart skipped");
                    Ok(None)
                }
            };
            bytes.map(|b| (kind, b))
        })
        .collect::<Result<_, RenderError>>()?;

    let mut summary = ExportSummary::default();
    for (kind, bytes) in rendered {
        match bytes {
            Some(png) => {
                let path = dir.join(format!("{}_{}.png", stem, kind.slug()));
                fs::write(&path, png)?;
                summary.files.push(path);
            }
            None => summary.skipped.push(kind),
        }
    }

    summary.files.push(write_report_text(table, dir)?);
    info!(
        dir = %dir.display(),
        files = summary.files.len(),
        skipped = summary.skipped.len(),
        "report exported"
    );
    Ok(summary)
}

/// Write `<table>_report.txt` into `dir` and return its path.
pub fn write_report_text(table: &Table, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!("{}_report.txt", file_stem(&table.name)));
    fs::write(&path, report_text(table))?;
    Ok(path)
}

/// Plain-text report: headline statistics then one line per numeric column.
pub fn report_text(table: &Table) -> String {
    let classification = classify_columns(table);
    let mut out = String::new();

    let _ = writeln!(out, "VARIES Report: {}", table.name);
    let _ = writeln!(out, "Visibility: {}", table.visibility);
    let _ = writeln!(out, "Created: {}", table.created_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "Rows: {}", table.row_count());
    let _ = writeln!(out, "Columns: {}", table.column_count());
    let _ = writeln!(out);

    match StatsCalculator::compute_report_statistics(table, &classification) {
        Ok(stats) => {
            let _ = writeln!(out, "Statistics ({})", stats.column);
            let _ = writeln!(out, "  Count:   {}", stats.count);
            let _ = writeln!(out, "  Sum:     {}", format_number(stats.sum));
            let _ = writeln!(out, "  Average: {}", format_number(stats.average));
            let _ = writeln!(out, "  Median:  {}", format_number(stats.median));
            let _ = writeln!(out, "  Min:     {}", format_number(stats.min));
            let _ = writeln!(out, "  Max:     {}", format_number(stats.max));
        }
        Err(e) => {
            let _ = writeln!(out, "Statistics unavailable: {}", e);
        }
    }

    let all = StatsCalculator::compute_all_column_statistics(table, &classification);
    if !all.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Column summary");
        for s in &all {
            let _ = writeln!(
                out,
                "  {}: n={} sum={} avg={} min={} max={} std={:.2}",
                s.column,
                s.count,
                format_number(s.sum),
                format_number(s.average),
                format_number(s.min),
                format_number(s.max),
                s.std_dev
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{demo_table, TableVisibility};

    #[test]
    fn test_file_stem_sanitizes_name() {
        assert_eq!(file_stem("Sales Records"), "sales_records");
        assert_eq!(file_stem("Q1/Q2"), "q1_q2");
        assert_eq!(file_stem("   "), "table");
    }

    #[test]
    fn test_report_text_lists_statistics() {
        let text = report_text(&demo_table());
        assert!(text.contains("VARIES Report: Sales Records"));
        assert!(text.contains("Rows: 6"));
        assert!(text.contains("Statistics (ID)"));
        assert!(text.contains("Revenue: n=6 sum=35600"));
    }

    #[test]
    fn test_report_text_without_numeric_column() {
        let mut table = Table::new("Notes", TableVisibility::Personal);
        table.add_typed_column("Body", crate::data::ColumnType::Text).unwrap();
        table.delete_column(0).unwrap();
        let text = report_text(&table);
        assert!(text.contains("Statistics unavailable"));
        assert!(!text.contains("Column summary"));
    }

    #[test]
    fn test_export_report_skips_unprojectable_kinds() {
        let mut table = Table::new("Field Notes", TableVisibility::Personal);
        table.add_typed_column("Body", crate::data::ColumnType::Text).unwrap();
        table.delete_column(0).unwrap();
        table.add_row();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("field_notes");
        let summary = export_report(&table, &out, (640, 480)).unwrap();

        assert_eq!(summary.skipped.len(), ChartKind::ALL.len());
        for kind in ChartKind::ALL {
            assert!(summary.skipped.contains(&kind), "{} not skipped", kind.label());
        }
        assert_eq!(summary.files, vec![out.join("field_notes_report.txt")]);

        let written: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(written, vec!["field_notes_report.txt".to_string()]);
    }

    #[test]
    fn test_write_report_text_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report_text(&demo_table(), dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "sales_records_report.txt");
        let body = fs::read_to_string(path).unwrap();
        assert!(body.starts_with("VARIES Report"));
    }
}
