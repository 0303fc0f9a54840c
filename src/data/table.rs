//! Table Model Module
//! Named, typed columns over rows of string cells, plus the editor mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Name of the identifier column every new table starts with.
pub const DEFAULT_COLUMN_NAME: &str = "ID";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Column name cannot be empty")]
    EmptyColumnName,
    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),
    #[error("Column index {0} out of range")]
    ColumnOutOfRange(usize),
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
    #[error("Row index {0} out of range")]
    RowOutOfRange(usize),
    #[error("A table must keep at least one column")]
    LastColumn,
}

/// Declared type of a column. Not enforced on cell values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Date,
    Boolean,
    Email,
}

impl ColumnType {
    pub const ALL: [ColumnType; 5] = [
        ColumnType::Text,
        ColumnType::Number,
        ColumnType::Date,
        ColumnType::Boolean,
        ColumnType::Email,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
            ColumnType::Email => "email",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Personal tables are private to the user; public ones are shareable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableVisibility {
    #[default]
    Personal,
    Public,
}

impl fmt::Display for TableVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableVisibility::Personal => f.write_str("personal"),
            TableVisibility::Public => f.write_str("public"),
        }
    }
}

/// Column name → raw cell string.
pub type Row = BTreeMap<String, String>;

/// In-memory tabular dataset.
///
/// Column names are unique, there is always at least one column and no row
/// holds a key for a column that does not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub visibility: TableVisibility,
    pub created_at: DateTime<Utc>,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the default numeric `ID` column.
    pub fn new(name: impl Into<String>, visibility: TableVisibility) -> Self {
        Self {
            name: name.into(),
            visibility,
            created_at: Utc::now(),
            columns: vec![Column::new(DEFAULT_COLUMN_NAME, ColumnType::Number)],
            rows: Vec::new(),
        }
    }

    /// Build a table from explicit columns and rows.
    ///
    /// Rows are normalized to the column set: unknown keys are dropped.
    pub fn from_parts(
        name: impl Into<String>,
        columns: Vec<Column>,
        rows: Vec<Row>,
    ) -> Result<Self, TableError> {
        if columns.is_empty() {
            return Err(TableError::LastColumn);
        }
        for (i, column) in columns.iter().enumerate() {
            if column.name.trim().is_empty() {
                return Err(TableError::EmptyColumnName);
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
        }

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.retain(|key, _| columns.iter().any(|c| &c.name == key));
                row
            })
            .collect();

        Ok(Self {
            name: name.into(),
            visibility: TableVisibility::default(),
            created_at: Utc::now(),
            columns,
            rows,
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Raw cell value, `None` when the row has no value for the column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Append a `Field {n}` text column; every row gets an empty cell.
    pub fn add_column(&mut self) -> &Column {
        let mut n = self.columns.len() + 1;
        let mut name = format!("Field {}", n);
        while self.has_column(&name) {
            n += 1;
            name = format!("Field {}", n);
        }
        debug!(table = %self.name, column = %name, "adding column");

        for row in &mut self.rows {
            row.insert(name.clone(), String::new());
        }
        self.columns.push(Column::new(name, ColumnType::Text));
        &self.columns[self.columns.len() - 1]
    }

    /// Append a column with an explicit name and type.
    pub fn add_typed_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
    ) -> Result<&Column, TableError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TableError::EmptyColumnName);
        }
        if self.has_column(name) {
            return Err(TableError::DuplicateColumn(name.to_string()));
        }

        for row in &mut self.rows {
            row.insert(name.to_string(), String::new());
        }
        self.columns.push(Column::new(name, column_type));
        Ok(&self.columns[self.columns.len() - 1])
    }

    /// Rename a column and re-key every row.
    ///
    /// Renaming to the current name is a no-op.
    pub fn rename_column(&mut self, index: usize, new_name: &str) -> Result<(), TableError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(TableError::EmptyColumnName);
        }
        let old_name = self
            .columns
            .get(index)
            .ok_or(TableError::ColumnOutOfRange(index))?
            .name
            .clone();
        if old_name == new_name {
            return Ok(());
        }
        if self.has_column(new_name) {
            return Err(TableError::DuplicateColumn(new_name.to_string()));
        }
        debug!(table = %self.name, from = %old_name, to = %new_name, "renaming column");

        for row in &mut self.rows {
            if let Some(value) = row.remove(&old_name) {
                row.insert(new_name.to_string(), value);
            }
        }
        self.columns[index].name = new_name.to_string();
        Ok(())
    }

    pub fn set_column_type(
        &mut self,
        index: usize,
        column_type: ColumnType,
    ) -> Result<(), TableError> {
        let column = self
            .columns
            .get_mut(index)
            .ok_or(TableError::ColumnOutOfRange(index))?;
        column.column_type = column_type;
        Ok(())
    }

    /// Delete a column and its cells. The last column cannot be deleted.
    pub fn delete_column(&mut self, index: usize) -> Result<Column, TableError> {
        if index >= self.columns.len() {
            return Err(TableError::ColumnOutOfRange(index));
        }
        if self.columns.len() <= 1 {
            return Err(TableError::LastColumn);
        }

        let removed = self.columns.remove(index);
        for row in &mut self.rows {
            row.remove(&removed.name);
        }
        debug!(table = %self.name, column = %removed.name, "deleted column");
        Ok(removed)
    }

    /// Append a row with an empty cell for every column. Returns its index.
    pub fn add_row(&mut self) -> usize {
        let row = self
            .columns
            .iter()
            .map(|c| (c.name.clone(), String::new()))
            .collect();
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Append a row from `(column, value)` pairs. Unknown columns are rejected.
    pub fn push_row<I, K, V>(&mut self, cells: I) -> Result<usize, TableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut row = Row::new();
        for (key, value) in cells {
            let key = key.into();
            if !self.has_column(&key) {
                return Err(TableError::UnknownColumn(key));
            }
            row.insert(key, value.into());
        }
        self.rows.push(row);
        Ok(self.rows.len() - 1)
    }

    pub fn update_cell(
        &mut self,
        row: usize,
        column: &str,
        value: impl Into<String>,
    ) -> Result<(), TableError> {
        if !self.has_column(column) {
            return Err(TableError::UnknownColumn(column.to_string()));
        }
        let target = self.rows.get_mut(row).ok_or(TableError::RowOutOfRange(row))?;
        target.insert(column.to_string(), value.into());
        Ok(())
    }

    pub fn delete_row(&mut self, row: usize) -> Result<Row, TableError> {
        if row >= self.rows.len() {
            return Err(TableError::RowOutOfRange(row));
        }
        Ok(self.rows.remove(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revenue_table() -> Table {
        let mut table = Table::from_parts(
            "Sales",
            vec![
                Column::new("Month", ColumnType::Text),
                Column::new("Revenue", ColumnType::Number),
            ],
            Vec::new(),
        )
        .unwrap();
        table.push_row([("Month", "Jan"), ("Revenue", "100")]).unwrap();
        table.push_row([("Month", "Feb"), ("Revenue", "200")]).unwrap();
        table
    }

    #[test]
    fn test_new_table_has_default_id_column() {
        let table = Table::new("Accounts", TableVisibility::Public);
        assert_eq!(table.column_count(), 1);
        assert_eq!(table.columns()[0].name, DEFAULT_COLUMN_NAME);
        assert_eq!(table.columns()[0].column_type, ColumnType::Number);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_add_column_fills_existing_rows() {
        let mut table = revenue_table();
        let name = table.add_column().name.clone();
        assert_eq!(name, "Field 3");
        assert!(table.rows().iter().all(|r| r.get("Field 3") == Some(&String::new())));
    }

    #[test]
    fn test_add_column_skips_taken_names() {
        let mut table = Table::from_parts(
            "T",
            vec![
                Column::new("ID", ColumnType::Number),
                Column::new("Field 3", ColumnType::Text),
            ],
            Vec::new(),
        )
        .unwrap();
        assert_eq!(table.add_column().name, "Field 4");
    }

    #[test]
    fn test_rename_column_rekeys_rows() {
        let mut table = revenue_table();
        table.rename_column(1, "Total Revenue").unwrap();

        assert_eq!(table.columns()[1].name, "Total Revenue");
        for row in table.rows() {
            assert!(!row.contains_key("Revenue"));
        }
        assert_eq!(table.cell(0, "Total Revenue"), Some("100"));
    }

    #[test]
    fn test_rename_column_rejects_duplicates_and_blanks() {
        let mut table = revenue_table();
        assert_eq!(
            table.rename_column(1, "Month"),
            Err(TableError::DuplicateColumn("Month".to_string()))
        );
        assert_eq!(table.rename_column(1, "   "), Err(TableError::EmptyColumnName));
        assert_eq!(table.rename_column(1, " Revenue "), Ok(()));
        assert_eq!(table.columns()[1].name, "Revenue");
    }

    #[test]
    fn test_delete_column_removes_cells() {
        let mut table = revenue_table();
        table.delete_column(0).unwrap();
        assert_eq!(table.column_count(), 1);
        assert!(table.rows().iter().all(|r| !r.contains_key("Month")));
    }

    #[test]
    fn test_delete_last_column_rejected() {
        let mut table = Table::new("Solo", TableVisibility::Personal);
        assert_eq!(table.delete_column(0), Err(TableError::LastColumn));
        assert_eq!(table.column_count(), 1);
    }

    #[test]
    fn test_row_operations() {
        let mut table = revenue_table();
        let idx = table.add_row();
        assert_eq!(idx, 2);
        assert_eq!(table.cell(2, "Month"), Some(""));

        table.update_cell(2, "Revenue", "300").unwrap();
        assert_eq!(table.cell(2, "Revenue"), Some("300"));
        assert_eq!(
            table.update_cell(2, "Missing", "x"),
            Err(TableError::UnknownColumn("Missing".to_string()))
        );
        assert_eq!(table.update_cell(9, "Month", "x"), Err(TableError::RowOutOfRange(9)));

        let removed = table.delete_row(0).unwrap();
        assert_eq!(removed.get("Month").map(String::as_str), Some("Jan"));
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_from_parts_validates_columns() {
        assert_eq!(
            Table::from_parts("Empty", Vec::new(), Vec::new()),
            Err(TableError::LastColumn)
        );
        let dup = Table::from_parts(
            "Dup",
            vec![
                Column::new("A", ColumnType::Text),
                Column::new("A", ColumnType::Number),
            ],
            Vec::new(),
        );
        assert_eq!(dup, Err(TableError::DuplicateColumn("A".to_string())));
    }
}
