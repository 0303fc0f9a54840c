//! CSV Import/Export Module
//! Moves tables in and out of CSV files using Polars.

use crate::data::table::{Column, ColumnType, Row, Table, TableError, TableVisibility};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid table: {0}")]
    Table(#[from] TableError),
    #[error("CSV file has no columns")]
    NoColumns,
}

/// Map an inferred Polars dtype onto a declared column type.
fn column_type_for(dtype: &DataType) -> ColumnType {
    match dtype {
        DataType::Float32
        | DataType::Float64
        | DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => ColumnType::Number,
        DataType::Boolean => ColumnType::Boolean,
        DataType::Date | DataType::Datetime(_, _) => ColumnType::Date,
        _ => ColumnType::Text,
    }
}

/// Load a CSV file into a table named after the file stem.
///
/// Column types come from schema inference; every cell is kept as its string
/// rendering and nulls become empty cells.
pub fn import_csv(path: &Path) -> Result<Table, LoaderError> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()?
        .collect()?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Imported".to_string());

    let table = table_from_dataframe(&name, &df)?;
    info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "imported CSV"
    );
    Ok(table)
}

/// Convert a DataFrame to a string-celled table.
pub fn table_from_dataframe(name: &str, df: &DataFrame) -> Result<Table, LoaderError> {
    if df.width() == 0 {
        return Err(LoaderError::NoColumns);
    }

    let mut columns = Vec::with_capacity(df.width());
    let mut rows: Vec<Row> = vec![Row::new(); df.height()];

    for col in df.get_columns() {
        let col_name = col.name().to_string();
        columns.push(Column::new(col_name.clone(), column_type_for(col.dtype())));

        let as_str = col.cast(&DataType::String)?;
        let ca = as_str.str()?;
        for (i, value) in ca.into_iter().enumerate() {
            rows[i].insert(col_name.clone(), value.unwrap_or_default().to_string());
        }
    }

    let mut table = Table::from_parts(name, columns, rows)?;
    table.visibility = TableVisibility::Personal;
    Ok(table)
}

/// Build a DataFrame with one string column per table column.
pub fn table_to_dataframe(table: &Table) -> Result<DataFrame, LoaderError> {
    let columns: Vec<polars::prelude::Column> = table
        .columns()
        .iter()
        .map(|c| {
            let values: Vec<String> = table
                .rows()
                .iter()
                .map(|row| row.get(&c.name).cloned().unwrap_or_default())
                .collect();
            polars::prelude::Column::new(c.name.as_str().into(), values)
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Write a table to a CSV file, columns in table order.
pub fn export_csv(table: &Table, path: &Path) -> Result<(), LoaderError> {
    let mut df = table_to_dataframe(table)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
    info!(path = %path.display(), rows = table.row_count(), "exported CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_import_csv_infers_types_and_keeps_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Month,Revenue,Active").unwrap();
        writeln!(file, "Jan,100,true").unwrap();
        writeln!(file, "Feb,250,false").unwrap();
        drop(file);

        let table = import_csv(&path).unwrap();
        assert_eq!(table.name, "sales");
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.columns()[0].column_type, ColumnType::Text);
        assert_eq!(table.columns()[1].column_type, ColumnType::Number);
        assert_eq!(table.columns()[2].column_type, ColumnType::Boolean);
        assert_eq!(table.cell(1, "Month"), Some("Feb"));
        assert_eq!(table.cell(1, "Revenue"), Some("250"));
    }

    #[test]
    fn test_export_then_import_preserves_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");

        let mut table = Table::new("ledger", TableVisibility::Personal);
        table.add_typed_column("Item", ColumnType::Text).unwrap();
        table.push_row([("ID", "1"), ("Item", "Gold")]).unwrap();
        table.push_row([("ID", "2"), ("Item", "Silver")]).unwrap();

        export_csv(&table, &path).unwrap();
        let loaded = import_csv(&path).unwrap();

        assert_eq!(loaded.row_count(), 2);
        assert_eq!(loaded.cell(0, "Item"), Some("Gold"));
        assert_eq!(loaded.cell(1, "ID"), Some("2"));
    }
}
