//! Charts module - projection of tables into chart data, and rendering

pub mod export;
mod plotter;
pub mod projector;
mod renderer;

use projector::PALETTE_SIZE;

pub use export::{export_report, ExportError, ExportSummary};
pub use plotter::ChartPlotter;
pub use projector::{
    build_histogram, build_ogive, build_pie_series, build_series, classify_columns, project,
    ChartKind, ChartProjection, ColumnClassification, HistogramBin, OgivePoint, PieSlice,
    ProjectionError, SeriesPoint,
};
pub use renderer::{RenderError, StaticChartRenderer};

/// Vault palette: gold, crimson, slate, navy, then accents.
pub const PALETTE_RGB: [(u8, u8, u8); PALETTE_SIZE] = [
    (230, 180, 52),
    (219, 36, 36),
    (123, 139, 158),
    (71, 87, 133),
    (26, 188, 156),
    (155, 89, 182),
    (243, 156, 18),
    (46, 204, 113),
];

/// Category name for an axis position, blank between categories.
pub(crate) fn category_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_label() {
        let labels = vec!["Jan".to_string(), "Feb".to_string()];
        assert_eq!(category_label(&labels, 1.0), "Feb");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_label(&labels, 5.0), "");
    }
}
