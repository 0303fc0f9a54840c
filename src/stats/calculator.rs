//! Statistics Calculator Module
//! Aggregate statistics over numeric table columns for the report view.

use crate::charts::projector::{column_values, ColumnClassification, ProjectionError};
use crate::data::Table;
use rayon::prelude::*;
use statrs::statistics::Statistics;

/// Aggregates for one numeric column.
///
/// `count` includes rows whose cell coerced to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportStatistics {
    pub column: String,
    pub count: usize,
    pub sum: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub std_dev: f64,
}

/// Handles statistical calculations for table reports.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(
        column: &str,
        values: &[f64],
    ) -> Result<ReportStatistics, ProjectionError> {
        let n = values.len();
        if n == 0 {
            return Err(ProjectionError::EmptyDataset);
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let sum: f64 = values.iter().sum();
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        // Sample standard deviation; a single value has no spread.
        let std_dev = if n > 1 { values.std_dev() } else { 0.0 };

        Ok(ReportStatistics {
            column: column.to_string(),
            count: n,
            sum,
            average: sum / n as f64,
            min: sorted[0],
            max: sorted[n - 1],
            median,
            std_dev,
        })
    }

    /// Statistics for the first numeric column.
    pub fn compute_report_statistics(
        table: &Table,
        classification: &ColumnClassification,
    ) -> Result<ReportStatistics, ProjectionError> {
        let column = classification
            .numeric
            .first()
            .ok_or(ProjectionError::NoNumericColumn)?;
        Self::compute_descriptive_stats(column, &column_values(table, column))
    }

    /// Statistics for every numeric column, in column order, computed in
    /// parallel.
    pub fn compute_all_column_statistics(
        table: &Table,
        classification: &ColumnClassification,
    ) -> Vec<ReportStatistics> {
        classification
            .numeric
            .par_iter()
            .filter_map(|column| {
                Self::compute_descriptive_stats(column, &column_values(table, column)).ok()
            })
            .collect()
    }
}

/// Free-function form of [`StatsCalculator::compute_report_statistics`].
pub fn compute_report_statistics(
    table: &Table,
    classification: &ColumnClassification,
) -> Result<ReportStatistics, ProjectionError> {
    StatsCalculator::compute_report_statistics(table, classification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::projector::classify_columns;
    use crate::data::{Column, ColumnType};

    fn revenue(values: &[&str]) -> Table {
        let mut table = Table::from_parts(
            "Sales",
            vec![
                Column::new("Month", ColumnType::Text),
                Column::new("Revenue", ColumnType::Number),
            ],
            Vec::new(),
        )
        .unwrap();
        for v in values {
            table.push_row([("Month", "m"), ("Revenue", *v)]).unwrap();
        }
        table
    }

    #[test]
    fn test_report_statistics_odd_count() {
        let table = revenue(&["10", "20", "30"]);
        let stats = compute_report_statistics(&table, &classify_columns(&table)).unwrap();

        assert_eq!(stats.column, "Revenue");
        assert_eq!(stats.sum, 60.0);
        assert_eq!(stats.average, 20.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.median, 20.0);
        assert_eq!(stats.count, 3);
        assert!((stats.std_dev - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_statistics_even_median() {
        let table = revenue(&["40", "10", "30", "20"]);
        let stats = compute_report_statistics(&table, &classify_columns(&table)).unwrap();
        assert_eq!(stats.median, 25.0);
    }

    #[test]
    fn test_report_statistics_counts_zero_defaults() {
        let table = revenue(&["10", "bad", "20"]);
        let stats = compute_report_statistics(&table, &classify_columns(&table)).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.average, 10.0);
    }

    #[test]
    fn test_report_statistics_errors() {
        let empty = revenue(&[]);
        assert_eq!(
            compute_report_statistics(&empty, &classify_columns(&empty)),
            Err(ProjectionError::EmptyDataset)
        );

        let text_only = Table::from_parts(
            "Names",
            vec![Column::new("Name", ColumnType::Text)],
            Vec::new(),
        )
        .unwrap();
        assert_eq!(
            compute_report_statistics(&text_only, &classify_columns(&text_only)),
            Err(ProjectionError::NoNumericColumn)
        );
    }

    #[test]
    fn test_all_column_statistics_keeps_column_order() {
        let mut table = revenue(&["1", "2"]);
        table.add_typed_column("Units", ColumnType::Number).unwrap();
        let stats =
            StatsCalculator::compute_all_column_statistics(&table, &classify_columns(&table));
        let names: Vec<&str> = stats.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(names, vec!["Revenue", "Units"]);
        assert_eq!(stats[1].sum, 0.0);
    }
}
