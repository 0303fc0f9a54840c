//! Chart Projector Module
//! Derives chart-ready view models from a table snapshot.
//!
//! Every function here is a pure function of its inputs: the table is never
//! mutated and nothing is cached, so classification is recomputed on each
//! call. Unparsable numeric cells resolve to `0` through
//! [`numeric_or_zero`].

use crate::data::cell::is_numeric_cell;
use crate::data::{numeric_or_zero, ColumnType, Table};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Number of distinct colors charts cycle through.
pub const PALETTE_SIZE: usize = 8;

/// Label used when a series row has no label value.
pub const MISSING_LABEL: &str = "N/A";

const MIN_BINS: usize = 3;
const MAX_BINS: usize = 8;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("No numeric column available")]
    NoNumericColumn,
    #[error("Dataset has no rows")]
    EmptyDataset,
}

/// Visualization kinds offered by the analytics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    #[default]
    Bar,
    Column,
    Pie,
    Line,
    Area,
    Histogram,
    Frequency,
    Ogive,
}

impl ChartKind {
    pub const ALL: [ChartKind; 8] = [
        ChartKind::Bar,
        ChartKind::Column,
        ChartKind::Pie,
        ChartKind::Line,
        ChartKind::Area,
        ChartKind::Histogram,
        ChartKind::Frequency,
        ChartKind::Ogive,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar",
            ChartKind::Column => "Column",
            ChartKind::Pie => "Pie",
            ChartKind::Line => "Line",
            ChartKind::Area => "Area",
            ChartKind::Histogram => "Histogram",
            ChartKind::Frequency => "Frequency Polygon",
            ChartKind::Ogive => "Ogive",
        }
    }

    /// Lowercase identifier used in file names.
    pub fn slug(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Column => "column",
            ChartKind::Pie => "pie",
            ChartKind::Line => "line",
            ChartKind::Area => "area",
            ChartKind::Histogram => "histogram",
            ChartKind::Frequency => "frequency",
            ChartKind::Ogive => "ogive",
        }
    }

    /// Whether the kind charts a single chosen column.
    pub fn uses_chosen_column(self) -> bool {
        matches!(
            self,
            ChartKind::Pie | ChartKind::Histogram | ChartKind::Frequency | ChartKind::Ogive
        )
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Numeric and label-candidate column names, in table column order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnClassification {
    pub numeric: Vec<String>,
    pub labels: Vec<String>,
}

impl ColumnClassification {
    pub fn has_numeric(&self) -> bool {
        !self.numeric.is_empty()
    }

    /// Column that names each row: the first label candidate, else the
    /// table's first column.
    pub fn label_column<'a>(&'a self, table: &'a Table) -> Option<&'a str> {
        self.labels
            .first()
            .map(String::as_str)
            .or_else(|| table.columns().first().map(|c| c.name.as_str()))
    }

    /// Resolve the chosen column, defaulting to the first numeric column when
    /// unset or not numeric.
    pub fn resolve_numeric<'a>(&'a self, chosen: Option<&str>) -> Result<&'a str, ProjectionError> {
        if let Some(chosen) = chosen {
            if let Some(found) = self.numeric.iter().find(|c| c.as_str() == chosen) {
                return Ok(found.as_str());
            }
            debug!(column = chosen, "chosen column is not numeric, using default");
        }
        self.numeric
            .first()
            .map(String::as_str)
            .ok_or(ProjectionError::NoNumericColumn)
    }
}

/// One row of a multi-series chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    /// `(column, value)` in numeric column order.
    pub values: Vec<(String, f64)>,
}

impl SeriesPoint {
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| *v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub color_index: usize,
}

/// Contiguous value range with its observation count.
///
/// Ranges are half-open except for the last bin, which includes its upper
/// bound.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub range_low: f64,
    pub range_high: f64,
    pub frequency: usize,
}

impl HistogramBin {
    /// Rounded bounds, e.g. `"10-20"`.
    pub fn label(&self) -> String {
        format!(
            "{}-{}",
            self.range_low.round() as i64,
            self.range_high.round() as i64
        )
    }

    pub fn midpoint(&self) -> f64 {
        (self.range_low + self.range_high) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgivePoint {
    pub range_label: String,
    pub cumulative_frequency: usize,
}

/// Chart-ready data for one [`ChartKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChartProjection {
    /// Bar, column, line and area charts.
    Series {
        columns: Vec<String>,
        points: Vec<SeriesPoint>,
    },
    Pie {
        column: String,
        slices: Vec<PieSlice>,
    },
    Histogram {
        column: String,
        bins: Vec<HistogramBin>,
    },
    /// Frequency polygon over histogram bins.
    Frequency {
        column: String,
        bins: Vec<HistogramBin>,
    },
    Ogive {
        column: String,
        points: Vec<OgivePoint>,
    },
}

impl ChartProjection {
    pub fn is_empty(&self) -> bool {
        match self {
            ChartProjection::Series { points, .. } => points.is_empty(),
            ChartProjection::Pie { slices, .. } => slices.is_empty(),
            ChartProjection::Histogram { bins, .. } | ChartProjection::Frequency { bins, .. } => {
                bins.is_empty()
            }
            ChartProjection::Ogive { points, .. } => points.is_empty(),
        }
    }
}

/// Split columns into numeric and label candidates.
///
/// A column is numeric when declared `number`, or when the table has rows and
/// every row holds a non-empty finite number for it.
pub fn classify_columns(table: &Table) -> ColumnClassification {
    let mut classification = ColumnClassification::default();
    let has_rows = table.row_count() > 0;

    for column in table.columns() {
        let declared = column.column_type == ColumnType::Number;
        let detected = has_rows
            && table
                .rows()
                .iter()
                .all(|row| is_numeric_cell(row.get(&column.name).map(String::as_str)));

        if declared || detected {
            classification.numeric.push(column.name.clone());
        } else {
            classification.labels.push(column.name.clone());
        }
    }

    classification
}

fn row_label(table: &Table, label_column: Option<&str>, row: usize) -> Option<String> {
    let column = label_column?;
    table
        .cell(row, column)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Values of one column for every row, with the lossy zero default.
pub fn column_values(table: &Table, column: &str) -> Vec<f64> {
    (0..table.row_count())
        .map(|row| numeric_or_zero(table.cell(row, column)))
        .collect()
}

/// One entry per row with a value for each numeric column.
pub fn build_series(table: &Table, classification: &ColumnClassification) -> Vec<SeriesPoint> {
    let label_column = classification.label_column(table);

    (0..table.row_count())
        .map(|row| SeriesPoint {
            label: row_label(table, label_column, row)
                .unwrap_or_else(|| MISSING_LABEL.to_string()),
            values: classification
                .numeric
                .iter()
                .map(|col| (col.clone(), numeric_or_zero(table.cell(row, col))))
                .collect(),
        })
        .collect()
}

/// One slice per row for the chosen numeric column.
pub fn build_pie_series(
    table: &Table,
    classification: &ColumnClassification,
    chosen: Option<&str>,
) -> Result<Vec<PieSlice>, ProjectionError> {
    let column = classification.resolve_numeric(chosen)?;
    let label_column = classification.label_column(table);

    Ok((0..table.row_count())
        .map(|row| PieSlice {
            label: row_label(table, label_column, row)
                .unwrap_or_else(|| format!("Item {}", row + 1)),
            value: numeric_or_zero(table.cell(row, column)),
            color_index: row % PALETTE_SIZE,
        })
        .collect())
}

/// Bin the chosen column's values.
///
/// Uses `clamp(ceil(sqrt(n)), 3, 8)` bins of equal width over `[min, max]`;
/// when every value is equal the width falls back to `1`.
pub fn build_histogram(
    table: &Table,
    classification: &ColumnClassification,
    chosen: Option<&str>,
) -> Result<Vec<HistogramBin>, ProjectionError> {
    let column = classification.resolve_numeric(chosen)?;
    Ok(histogram_bins(&column_values(table, column)))
}

/// Histogram over raw values. Every value lands in exactly one bin.
pub fn histogram_bins(values: &[f64]) -> Vec<HistogramBin> {
    if values.is_empty() {
        return Vec::new();
    }

    let bin_count = ((values.len() as f64).sqrt().ceil() as usize).clamp(MIN_BINS, MAX_BINS);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut width = (max - min) / bin_count as f64;
    if width == 0.0 {
        width = 1.0;
    }

    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            range_low: min + i as f64 * width,
            range_high: min + (i + 1) as f64 * width,
            frequency: 0,
        })
        .collect();

    for &v in values {
        // The last bin is closed on the right, so `max` clamps into it.
        let mut idx = (((v - min) / width).floor() as usize).min(bin_count - 1);
        // Settle rounding against the stored edges so counts match the ranges.
        while idx + 1 < bin_count && v >= bins[idx + 1].range_low {
            idx += 1;
        }
        while idx > 0 && v < bins[idx].range_low {
            idx -= 1;
        }
        bins[idx].frequency += 1;
    }

    bins
}

/// Running total of bin frequencies, in bin order.
pub fn build_ogive(bins: &[HistogramBin]) -> Vec<OgivePoint> {
    bins.iter()
        .scan(0usize, |total, bin| {
            *total += bin.frequency;
            Some(OgivePoint {
                range_label: bin.label(),
                cumulative_frequency: *total,
            })
        })
        .collect()
}

/// Classify the table and build the projection for `kind`.
pub fn project(
    table: &Table,
    kind: ChartKind,
    chosen: Option<&str>,
) -> Result<ChartProjection, ProjectionError> {
    let classification = classify_columns(table);
    if !classification.has_numeric() {
        return Err(ProjectionError::NoNumericColumn);
    }

    let projection = match kind {
        ChartKind::Bar | ChartKind::Column | ChartKind::Line | ChartKind::Area => {
            ChartProjection::Series {
                columns: classification.numeric.clone(),
                points: build_series(table, &classification),
            }
        }
        ChartKind::Pie => ChartProjection::Pie {
            column: classification.resolve_numeric(chosen)?.to_string(),
            slices: build_pie_series(table, &classification, chosen)?,
        },
        ChartKind::Histogram => ChartProjection::Histogram {
            column: classification.resolve_numeric(chosen)?.to_string(),
            bins: build_histogram(table, &classification, chosen)?,
        },
        ChartKind::Frequency => ChartProjection::Frequency {
            column: classification.resolve_numeric(chosen)?.to_string(),
            bins: build_histogram(table, &classification, chosen)?,
        },
        ChartKind::Ogive => {
            let bins = build_histogram(table, &classification, chosen)?;
            ChartProjection::Ogive {
                column: classification.resolve_numeric(chosen)?.to_string(),
                points: build_ogive(&bins),
            }
        }
    };

    Ok(projection)
}
