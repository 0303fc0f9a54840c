//! End-to-end checks of the chart projector and report helpers through the
//! public API.

use varies_vault::charts::projector::histogram_bins;
use varies_vault::charts::{
    build_histogram, build_ogive, build_pie_series, classify_columns, project, ChartKind,
    ChartProjection, ProjectionError,
};
use varies_vault::data::{
    Column, ColumnType, InMemoryTableStore, Row, Table, TableError, TableMutation, TableStore,
    TableVisibility,
};
use varies_vault::stats::{generate_query_result, StatsCalculator};

fn table(columns: &[(&str, ColumnType)], rows: &[&[(&str, &str)]]) -> Table {
    let columns = columns
        .iter()
        .map(|(name, ty)| Column::new(*name, *ty))
        .collect();
    let rows = rows
        .iter()
        .map(|cells| {
            cells
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Row>()
        })
        .collect();
    Table::from_parts("Sales", columns, rows).unwrap()
}

fn single_column(name: &str, values: &[&str]) -> Table {
    let rows: Vec<Vec<(&str, &str)>> = values.iter().map(|v| vec![(name, *v)]).collect();
    let rows: Vec<&[(&str, &str)]> = rows.iter().map(Vec::as_slice).collect();
    table(&[(name, ColumnType::Number)], &rows)
}

#[test]
fn test_classification_is_deterministic() {
    let t = table(
        &[
            ("Month", ColumnType::Text),
            ("Revenue", ColumnType::Text),
            ("Note", ColumnType::Text),
        ],
        &[
            &[("Month", "Jan"), ("Revenue", "100"), ("Note", "ok")],
            &[("Month", "Feb"), ("Revenue", "2.5"), ("Note", "")],
        ],
    );
    let first = classify_columns(&t);
    let second = classify_columns(&t);
    assert_eq!(first, second);
    assert_eq!(first.numeric, vec!["Revenue"]);
    assert_eq!(first.labels, vec!["Month", "Note"]);
}

#[test]
fn test_histogram_counts_every_value_once() {
    let samples: [&[f64]; 5] = [
        &[1.0],
        &[5.0, 5.0, 5.0],
        &[0.0, 10.0],
        &[-3.5, 2.0, 7.25, 7.25, 100.0, 42.0, 0.1],
        &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0],
    ];
    for values in samples {
        let bins = histogram_bins(values);
        let total: usize = bins.iter().map(|b| b.frequency).sum();
        assert_eq!(total, values.len(), "values {:?}", values);
        assert!((3..=8).contains(&bins.len()));

        let ogive = build_ogive(&bins);
        assert_eq!(ogive.last().unwrap().cumulative_frequency, values.len());
    }
}

#[test]
fn test_histogram_max_lands_in_last_bin() {
    let t = single_column("Score", &["0", "5", "10", "oops"]);
    let c = classify_columns(&t);
    let bins = build_histogram(&t, &c, None).unwrap();
    assert_eq!(bins.iter().map(|b| b.frequency).sum::<usize>(), 4);
    // "oops" coerces to 0 and joins the first bin.
    assert_eq!(bins[0].frequency, 2);
    assert_eq!(bins.last().unwrap().frequency, 1);
}

#[test]
fn test_ogive_from_projection_matches_row_count() {
    let t = single_column("Score", &["3", "9", "27", "81", "243"]);
    match project(&t, ChartKind::Ogive, Some("Score")).unwrap() {
        ChartProjection::Ogive { column, points } => {
            assert_eq!(column, "Score");
            assert_eq!(points.last().unwrap().cumulative_frequency, 5);
        }
        other => panic!("unexpected projection {:?}", other),
    }
}

#[test]
fn test_report_statistics_examples() {
    let t = single_column("Value", &["10", "20", "30"]);
    let stats = StatsCalculator::compute_report_statistics(&t, &classify_columns(&t)).unwrap();
    assert_eq!(stats.sum, 60.0);
    assert_eq!(stats.average, 20.0);
    assert_eq!(stats.min, 10.0);
    assert_eq!(stats.max, 30.0);
    assert_eq!(stats.median, 20.0);
    assert_eq!(stats.count, 3);

    let t = single_column("Value", &["10", "20", "30", "40"]);
    let stats = StatsCalculator::compute_report_statistics(&t, &classify_columns(&t)).unwrap();
    assert_eq!(stats.median, 25.0);
}

#[test]
fn test_report_statistics_on_empty_table() {
    let t = single_column("Value", &[]);
    assert_eq!(
        StatsCalculator::compute_report_statistics(&t, &classify_columns(&t)),
        Err(ProjectionError::EmptyDataset)
    );
}

#[test]
fn test_rename_rekeys_rows_through_store() {
    let mut store = InMemoryTableStore::new();
    let id = store.insert(single_column("Revenue", &["100"]));

    let t = store
        .apply(
            id,
            TableMutation::RenameColumn {
                index: 0,
                name: "Total Revenue".to_string(),
            },
        )
        .unwrap();
    assert_eq!(t.rows()[0].get("Total Revenue").map(String::as_str), Some("100"));
    assert!(!t.rows()[0].contains_key("Revenue"));
}

#[test]
fn test_total_query_sums_first_numeric_column() {
    let t = single_column("Revenue", &["100", "200"]);
    let result = generate_query_result(&t, &classify_columns(&t), "show me the total revenue")
        .unwrap();
    assert!(result.contains("300"), "{}", result);
}

#[test]
fn test_pie_without_numeric_column_is_an_error() {
    let t = table(
        &[("Name", ColumnType::Text)],
        &[&[("Name", "Ada")], &[("Name", "Grace")]],
    );
    let c = classify_columns(&t);
    assert_eq!(
        build_pie_series(&t, &c, None),
        Err(ProjectionError::NoNumericColumn)
    );
    assert_eq!(
        project(&t, ChartKind::Pie, None),
        Err(ProjectionError::NoNumericColumn)
    );
}

#[test]
fn test_column_deletion_rules() {
    let mut store = InMemoryTableStore::new();
    let id = store.insert(table(
        &[("Name", ColumnType::Text), ("Score", ColumnType::Text)],
        &[&[("Name", "Ada"), ("Score", "9")]],
    ));
    assert_eq!(classify_columns(store.get(id).unwrap()).numeric, vec!["Score"]);

    let t = store.apply(id, TableMutation::DeleteColumn(1)).unwrap();
    assert!(classify_columns(t).numeric.is_empty());
    assert!(!t.rows()[0].contains_key("Score"));

    let only = store.create("Solo", TableVisibility::Personal).unwrap();
    let err = store.apply(only, TableMutation::DeleteColumn(0)).unwrap_err();
    assert_eq!(err.to_string(), TableError::LastColumn.to_string());
    assert_eq!(store.get(only).unwrap().column_count(), 1);
}
