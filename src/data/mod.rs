//! Data module - table model, table store and CSV import/export

pub mod cell;
pub mod loader;
pub mod store;
pub mod table;

pub use cell::{numeric_or_zero, parse_numeric_cell, CellParseError};
pub use loader::{export_csv, import_csv, LoaderError};
pub use store::{demo_table, InMemoryTableStore, StoreError, TableId, TableMutation, TableStore};
pub use table::{Column, ColumnType, Row, Table, TableError, TableVisibility};
