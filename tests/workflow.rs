//! Editor, persistence and export flows as the application drives them.

use std::fs;
use varies_vault::charts::export::write_report_text;
use varies_vault::config::AppConfig;
use varies_vault::data::{
    export_csv, import_csv, ColumnType, InMemoryTableStore, TableMutation, TableStore,
    TableVisibility,
};
use varies_vault::stats::{describe_query, generate_query_result, match_query, QueryAggregation};
use varies_vault::charts::classify_columns;
use varies_vault::vault::{VaultEntry, VaultStorage};

#[test]
fn test_editor_session_then_csv_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = InMemoryTableStore::new();
    let id = store.create("Inventory", TableVisibility::Public).unwrap();

    store
        .apply(
            id,
            TableMutation::AddTypedColumn {
                name: "Item".to_string(),
                column_type: ColumnType::Text,
            },
        )
        .unwrap();
    store
        .apply(
            id,
            TableMutation::AddTypedColumn {
                name: "Qty".to_string(),
                column_type: ColumnType::Number,
            },
        )
        .unwrap();
    for (i, (item, qty)) in [("Bolts", "40"), ("Nuts", "60")].into_iter().enumerate() {
        store.apply(id, TableMutation::AddRow).unwrap();
        for (column, value) in [("ID", (i + 1).to_string()), ("Item", item.into()), ("Qty", qty.into())] {
            store
                .apply(
                    id,
                    TableMutation::UpdateCell {
                        row: i,
                        column: column.to_string(),
                        value,
                    },
                )
                .unwrap();
        }
    }

    let path = dir.path().join("inventory.csv");
    export_csv(store.get(id).unwrap(), &path).unwrap();
    let imported = import_csv(&path).unwrap();
    let imported_id = store.insert(imported);

    let table = store.get(imported_id).unwrap();
    assert_eq!(table.name, "inventory");
    assert_eq!(table.cell(1, "Item"), Some("Nuts"));
    let classification = classify_columns(table);
    assert_eq!(classification.numeric, vec!["ID", "Qty"]);
    assert_eq!(
        generate_query_result(table, &classification, "sum").unwrap(),
        "SUM(ID) = 3"
    );
    assert_eq!(store.list(), vec![id, imported_id]);
}

#[test]
fn test_query_rules_follow_priority() {
    assert_eq!(match_query("max and min"), Some(QueryAggregation::Max));
    assert_eq!(match_query("average total"), Some(QueryAggregation::Sum));
    assert_eq!(match_query("MEAN of it"), Some(QueryAggregation::Average));
    assert_eq!(match_query("hello"), None);

    let table = varies_vault::data::demo_table();
    let classification = classify_columns(&table);
    assert_eq!(
        describe_query(&table, &classification, "count rows"),
        "SELECT COUNT(*) FROM \"Sales Records\";"
    );
    assert_eq!(
        generate_query_result(&table, &classification, "hello").unwrap(),
        "6 records found in Sales Records"
    );
}

#[test]
fn test_vault_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    VaultStorage::new(dir.path())
        .register_user(VaultEntry::new("Ada", "424242", "ada@example.com", None, "1234"))
        .unwrap();

    let reopened = VaultStorage::new(dir.path());
    assert_eq!(reopened.entries().unwrap().len(), 1);
    assert!(reopened.validate_login("ADA", "424242").is_ok());
    assert!(reopened.validate_login("Ada", "424243").is_err());
}

#[test]
fn test_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let config = AppConfig {
        export_dir: dir.path().join("out"),
        log_filter: "varies_vault=debug".to_string(),
        ..AppConfig::default()
    };
    config.save_to(&path).unwrap();
    assert_eq!(AppConfig::load_from(&path).unwrap(), config);
}

#[test]
fn test_report_text_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_report_text(&varies_vault::data::demo_table(), dir.path()).unwrap();
    let body = fs::read_to_string(path).unwrap();
    assert!(body.contains("Count:   6"));
    assert!(body.contains("Sum:     21"));
    assert!(body.contains("Revenue: n=6"));
}
