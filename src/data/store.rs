//! Table Store Module
//! Repository interface over tables; the editor and the analytics view both
//! go through it instead of holding tables directly.

use crate::data::table::{ColumnType, Table, TableError, TableVisibility};
use std::fmt;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Table {0} not found")]
    NotFound(TableId),
    #[error("Table name cannot be empty")]
    EmptyName,
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub u64);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single caller-driven edit applied to a stored table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableMutation {
    AddColumn,
    AddTypedColumn { name: String, column_type: ColumnType },
    RenameColumn { index: usize, name: String },
    SetColumnType { index: usize, column_type: ColumnType },
    DeleteColumn(usize),
    AddRow,
    UpdateCell { row: usize, column: String, value: String },
    DeleteRow(usize),
}

impl TableMutation {
    fn apply_to(self, table: &mut Table) -> Result<(), TableError> {
        match self {
            TableMutation::AddColumn => {
                table.add_column();
            }
            TableMutation::AddTypedColumn { name, column_type } => {
                table.add_typed_column(&name, column_type)?;
            }
            TableMutation::RenameColumn { index, name } => table.rename_column(index, &name)?,
            TableMutation::SetColumnType { index, column_type } => {
                table.set_column_type(index, column_type)?
            }
            TableMutation::DeleteColumn(index) => {
                table.delete_column(index)?;
            }
            TableMutation::AddRow => {
                table.add_row();
            }
            TableMutation::UpdateCell { row, column, value } => {
                table.update_cell(row, &column, value)?
            }
            TableMutation::DeleteRow(row) => {
                table.delete_row(row)?;
            }
        }
        Ok(())
    }
}

/// Storage seam for tables.
pub trait TableStore {
    fn create(&mut self, name: &str, visibility: TableVisibility) -> Result<TableId, StoreError>;

    /// Insert a fully built table (e.g. from a CSV import).
    fn insert(&mut self, table: Table) -> TableId;

    fn get(&self, id: TableId) -> Result<&Table, StoreError>;

    /// Apply a mutation atomically: on error the stored table is unchanged.
    fn apply(&mut self, id: TableId, mutation: TableMutation) -> Result<&Table, StoreError>;

    fn delete(&mut self, id: TableId) -> Result<Table, StoreError>;

    /// Ids in creation order.
    fn list(&self) -> Vec<TableId>;
}

/// Process-lifetime table store.
#[derive(Debug, Default)]
pub struct InMemoryTableStore {
    tables: Vec<(TableId, Table)>,
    next_id: u64,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a small revenue table.
    pub fn with_demo_table() -> Self {
        let mut store = Self::new();
        store.insert(demo_table());
        store
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn position(&self, id: TableId) -> Result<usize, StoreError> {
        self.tables
            .iter()
            .position(|(tid, _)| *tid == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn allocate_id(&mut self) -> TableId {
        self.next_id += 1;
        TableId(self.next_id)
    }
}

impl TableStore for InMemoryTableStore {
    fn create(&mut self, name: &str, visibility: TableVisibility) -> Result<TableId, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        Ok(self.insert(Table::new(name, visibility)))
    }

    fn insert(&mut self, table: Table) -> TableId {
        let id = self.allocate_id();
        info!(%id, name = %table.name, "table stored");
        self.tables.push((id, table));
        id
    }

    fn get(&self, id: TableId) -> Result<&Table, StoreError> {
        let pos = self.position(id)?;
        Ok(&self.tables[pos].1)
    }

    fn apply(&mut self, id: TableId, mutation: TableMutation) -> Result<&Table, StoreError> {
        let pos = self.position(id)?;
        // Table mutations validate before touching state, so a failed
        // mutation leaves the stored table intact.
        mutation.apply_to(&mut self.tables[pos].1)?;
        Ok(&self.tables[pos].1)
    }

    fn delete(&mut self, id: TableId) -> Result<Table, StoreError> {
        let pos = self.position(id)?;
        let (_, table) = self.tables.remove(pos);
        info!(%id, name = %table.name, "table deleted");
        Ok(table)
    }

    fn list(&self) -> Vec<TableId> {
        self.tables.iter().map(|(id, _)| *id).collect()
    }
}

/// Sample monthly revenue table shown on first launch.
pub fn demo_table() -> Table {
    use crate::data::table::Column;

    let columns = vec![
        Column::new("ID", ColumnType::Number),
        Column::new("Month", ColumnType::Text),
        Column::new("Revenue", ColumnType::Number),
        Column::new("Expenses", ColumnType::Number),
    ];
    let data = [
        ("1", "Jan", "4200", "3100"),
        ("2", "Feb", "5800", "3900"),
        ("3", "Mar", "3900", "3500"),
        ("4", "Apr", "7200", "4100"),
        ("5", "May", "6100", "4400"),
        ("6", "Jun", "8400", "4700"),
    ];
    let rows = data
        .iter()
        .map(|(id, month, revenue, expenses)| {
            [
                ("ID", *id),
                ("Month", *month),
                ("Revenue", *revenue),
                ("Expenses", *expenses),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
        })
        .collect();

    Table::from_parts("Sales Records", columns, rows)
        .unwrap_or_else(|_| Table::new("Sales Records", TableVisibility::Personal))
}
