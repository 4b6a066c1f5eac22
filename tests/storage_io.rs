use std::fs;
use tempfile::tempdir;
use wbtrade::figures::Figure;
use wbtrade::models::Observation;
use wbtrade::pipeline::assemble;
use wbtrade::storage;
use wbtrade::table::SeriesTable;
use wbtrade::{Indicator, TableError};

fn sample(n: usize) -> SeriesTable {
    SeriesTable {
        metric: "bal_of_pmts".into(),
        rows: (0..n)
            .map(|i| Observation {
                country: "Singapore".into(),
                year: 2000 + i as i32,
                value: Some(-1.5e9 + i as f64),
            })
            .collect(),
    }
}

#[test]
fn save_table_csv_writes_header_and_rows() {
    let dir = tempdir().unwrap();
    let path = storage::table_path(dir.path(), Indicator::BalanceOfPayments);
    assert!(path.ends_with("bal_of_pmts.csv"));

    let table = sample(3);
    storage::save_table_csv(&table, &path).unwrap();
    let txt = fs::read_to_string(&path).unwrap();
    assert!(txt.starts_with("country,year,bal_of_pmts\n"));
    assert_eq!(txt.lines().count(), 1 + table.rows.len());

    let back = storage::load_table_csv(&path).unwrap();
    assert_eq!(back, table);
}

#[test]
fn load_table_csv_reports_shape_mismatch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("two.csv");
    fs::write(&path, "country,year\nJapan,2000\n").unwrap();
    let err = storage::load_table_csv(&path).unwrap_err();
    assert_eq!(
        err.downcast_ref::<TableError>(),
        Some(&TableError::ShapeMismatch {
            expected: 3,
            found: 2
        })
    );
}

#[test]
fn save_figures_json_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("figures.json");
    let table = sample(2);
    let figures = assemble(&[None, None, None, Some(&table)]);
    storage::save_figures_json(&figures, &path).unwrap();

    let back: Vec<Figure> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back, figures);
    assert_eq!(back[3].data.len(), 1);
}

#[test]
fn load_table_csv_rejects_row_wider_than_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wide_row.csv");
    fs::write(&path, "country,year,m\nJapan,2000,100,999\n").unwrap();
    let err = storage::load_table_csv(&path).unwrap_err();
    assert_eq!(
        err.downcast_ref::<TableError>(),
        Some(&TableError::ShapeMismatch {
            expected: 3,
            found: 4
        })
    );
}

#[test]
fn save_tables_keeps_going_after_one_failure() {
    let dir = tempdir().unwrap();
    // A directory where the export-taxes CSV should go makes that write fail.
    fs::create_dir(storage::table_path(dir.path(), Indicator::ExportTaxes)).unwrap();

    let a = sample(2);
    let b = sample(1);
    let saved = storage::save_tables(
        dir.path(),
        &[
            (Indicator::ExportTaxes, &a),
            (Indicator::BalanceOfPayments, &b),
        ],
    )
    .unwrap();

    let expected = storage::table_path(dir.path(), Indicator::BalanceOfPayments);
    assert_eq!(saved, vec![expected.clone()]);
    assert_eq!(storage::load_table_csv(&expected).unwrap(), b);
}
