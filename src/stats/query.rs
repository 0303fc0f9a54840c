//! Query Heuristic Module
//! Keyword-driven "AI query" simulation over the first numeric column.
//!
//! This is a rule table, not a parser: the first rule whose keyword appears
//! (case-insensitively) in the query text wins.

use crate::charts::projector::{column_values, ColumnClassification, ProjectionError};
use crate::data::Table;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryAggregation {
    Sum,
    Average,
    Count,
    Max,
    Min,
}

impl QueryAggregation {
    pub fn sql_name(self) -> &'static str {
        match self {
            QueryAggregation::Sum => "SUM",
            QueryAggregation::Average => "AVG",
            QueryAggregation::Count => "COUNT",
            QueryAggregation::Max => "MAX",
            QueryAggregation::Min => "MIN",
        }
    }

    pub fn needs_numeric_column(self) -> bool {
        !matches!(self, QueryAggregation::Count)
    }
}

impl fmt::Display for QueryAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// Keyword rules in priority order.
pub const QUERY_RULES: &[(&[&str], QueryAggregation)] = &[
    (&["total", "sum"], QueryAggregation::Sum),
    (&["average", "avg", "mean"], QueryAggregation::Average),
    (&["count"], QueryAggregation::Count),
    (&["max"], QueryAggregation::Max),
    (&["min"], QueryAggregation::Min),
];

/// The aggregation selected for a query, `None` for the fallback.
pub fn match_query(query: &str) -> Option<QueryAggregation> {
    let query = query.to_lowercase();
    QUERY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| query.contains(k)))
        .map(|(_, aggregation)| *aggregation)
}

/// Integral values print without decimals, others with two.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

fn first_numeric(classification: &ColumnClassification) -> Result<&str, ProjectionError> {
    classification
        .numeric
        .first()
        .map(String::as_str)
        .ok_or(ProjectionError::NoNumericColumn)
}

/// Answer a free-text query with a one-line aggregate.
pub fn generate_query_result(
    table: &Table,
    classification: &ColumnClassification,
    query: &str,
) -> Result<String, ProjectionError> {
    let Some(aggregation) = match_query(query) else {
        return Ok(format!(
            "{} records found in {}",
            table.row_count(),
            table.name
        ));
    };
    debug!(%aggregation, query, "query matched");

    if aggregation == QueryAggregation::Count {
        return Ok(format!("COUNT(*) = {}", table.row_count()));
    }

    let column = first_numeric(classification)?;
    let values = column_values(table, column);

    let result = match aggregation {
        QueryAggregation::Sum => Some(values.iter().sum::<f64>()),
        QueryAggregation::Average if values.is_empty() => None,
        QueryAggregation::Average => Some(values.iter().sum::<f64>() / values.len() as f64),
        QueryAggregation::Max => values.iter().copied().reduce(f64::max),
        QueryAggregation::Min => values.iter().copied().reduce(f64::min),
        QueryAggregation::Count => Some(values.len() as f64),
    };

    Ok(format!(
        "{}({}) = {}",
        aggregation,
        column,
        result.map(format_number).unwrap_or_else(|| "n/a".to_string())
    ))
}

/// Pseudo-SQL preview of what the query would run.
pub fn describe_query(
    table: &Table,
    classification: &ColumnClassification,
    query: &str,
) -> String {
    match match_query(query) {
        Some(QueryAggregation::Count) | None => {
            format!("SELECT COUNT(*) FROM \"{}\";", table.name)
        }
        Some(aggregation) => match first_numeric(classification) {
            Ok(column) => format!(
                "SELECT {}(\"{}\") FROM \"{}\";",
                aggregation, column, table.name
            ),
            Err(_) => format!("-- no numeric column in \"{}\"", table.name),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::projector::classify_columns;
    use crate::data::{Column, ColumnType};

    fn revenue() -> Table {
        let mut table = Table::from_parts(
            "Sales",
            vec![
                Column::new("Region", ColumnType::Text),
                Column::new("Revenue", ColumnType::Number),
            ],
            Vec::new(),
        )
        .unwrap();
        table.push_row([("Region", "North"), ("Revenue", "100")]).unwrap();
        table.push_row([("Region", "South"), ("Revenue", "200")]).unwrap();
        table
    }

    fn ask(table: &Table, query: &str) -> Result<String, ProjectionError> {
        generate_query_result(table, &classify_columns(table), query)
    }

    #[test]
    fn test_match_query_priority() {
        assert_eq!(match_query("Show me the TOTAL"), Some(QueryAggregation::Sum));
        assert_eq!(match_query("mean of max"), Some(QueryAggregation::Average));
        assert_eq!(match_query("count the max"), Some(QueryAggregation::Count));
        assert_eq!(match_query("max and min"), Some(QueryAggregation::Max));
        assert_eq!(match_query("minimum"), Some(QueryAggregation::Min));
        assert_eq!(match_query("list everything"), None);
    }

    #[test]
    fn test_total_revenue_query() {
        let result = ask(&revenue(), "show me the total revenue").unwrap();
        assert!(result.contains("300"), "{}", result);
        assert_eq!(result, "SUM(Revenue) = 300");
    }

    #[test]
    fn test_other_aggregations() {
        let table = revenue();
        assert_eq!(ask(&table, "average please").unwrap(), "AVG(Revenue) = 150");
        assert_eq!(ask(&table, "how many? count").unwrap(), "COUNT(*) = 2");
        assert_eq!(ask(&table, "max").unwrap(), "MAX(Revenue) = 200");
        assert_eq!(ask(&table, "min").unwrap(), "MIN(Revenue) = 100");
        assert_eq!(ask(&table, "anything").unwrap(), "2 records found in Sales");
    }

    #[test]
    fn test_count_and_fallback_need_no_numeric_column() {
        let table = Table::from_parts(
            "Names",
            vec![Column::new("Name", ColumnType::Text)],
            Vec::new(),
        )
        .unwrap();
        assert_eq!(ask(&table, "count").unwrap(), "COUNT(*) = 0");
        assert_eq!(ask(&table, "hello").unwrap(), "0 records found in Names");
        assert_eq!(ask(&table, "sum"), Err(ProjectionError::NoNumericColumn));
    }

    #[test]
    fn test_empty_rows_do_not_divide_by_zero() {
        let table = Table::new("Empty", crate::data::TableVisibility::Personal);
        assert_eq!(ask(&table, "avg").unwrap(), "AVG(ID) = n/a");
        assert_eq!(ask(&table, "sum").unwrap(), "SUM(ID) = 0");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(300.0), "300");
        assert_eq!(format_number(2.5), "2.50");
        assert_eq!(format_number(-4.0), "-4");
    }

    #[test]
    fn test_describe_query() {
        let table = revenue();
        let c = classify_columns(&table);
        assert_eq!(
            describe_query(&table, &c, "total revenue"),
            "SELECT SUM(\"Revenue\") FROM \"Sales\";"
        );
        assert_eq!(
            describe_query(&table, &c, "show all"),
            "SELECT COUNT(*) FROM \"Sales\";"
        );
    }
}
