//! End-to-end import tests against an in-memory SQLite database.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use quarterly::{
    FinancialStore, Importer, MetricSlot, Quarter, QuarterKey, SqliteStore, UNKNOWN_CATEGORY,
};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn export_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "ACME_Tech.csv",
        "\
;2022Q4;2023Q1;LTM
Дата отчета;31.12.2022;31.03.2023;
Капитализация, млрд руб;1 000,5;1 100;1 200
Выручка;250;-;900
Чистая прибыль;40;0.00;
Долг;10;12;
Чистый долг;8;9;
P/E;5,5;6;
ROE, %;12%;13%;
",
    );
    fs::create_dir(dir.path().join("banks")).unwrap();
    write(
        &dir.path().join("banks"),
        "Bank.CSV",
        ";2023-Q1\nДолг;500\nEBITDA;70\n",
    );
    write(dir.path(), "Empty_Retail.csv", ";2023Q1\n");
    write(dir.path(), "notes.txt", "not an export");
    dir
}

#[tokio::test]
async fn test_import_tree() {
    let dir = export_tree();
    let store = Arc::new(SqliteStore::in_memory().unwrap());

    let summary = Importer::new(store.clone()).run(dir.path()).await.unwrap();

    assert_eq!(summary.files_parsed, 2);
    assert_eq!(summary.files_failed, 1);
    assert_eq!(summary.records_parsed, 3);
    assert_eq!(summary.records_written, 3);
    assert_eq!(summary.records_failed, 0);

    let q4 = store
        .get("ACME", QuarterKey::new(2022, Quarter::Q4))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(q4.category, "Tech");
    assert_eq!(q4.capitalization, Some(1000.5));
    assert_eq!(q4.revenue, Some(250.0));
    assert_eq!(q4.net_profit, Some(40.0));
    assert_eq!(q4.debt, Some(10.0));
    assert_eq!(q4.pe, Some(5.5));
    assert_eq!(q4.roe, Some(12.0));

    let q1 = store
        .get("ACME", QuarterKey::new(2023, Quarter::Q1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(q1.revenue, None);
    assert_eq!(q1.net_profit, None);
    assert_eq!(q1.debt, Some(12.0));

    let bank = store
        .get("Bank", QuarterKey::new(2023, Quarter::Q1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bank.category, UNKNOWN_CATEGORY);
    assert_eq!(bank.debt, Some(500.0));
    assert_eq!(bank.ebitda, Some(70.0));

    assert_eq!(store.companies().await.unwrap(), vec!["ACME", "Bank"]);
    assert_eq!(
        store.categories().await.unwrap(),
        vec!["Tech".to_string(), UNKNOWN_CATEGORY.to_string()]
    );
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    let dir = export_tree();
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let importer = Importer::new(store.clone());

    importer.run(dir.path()).await.unwrap();
    let first = store.metric_series(MetricSlot::Debt, &[]).await.unwrap();

    importer.run(dir.path()).await.unwrap();
    let second = store.metric_series(MetricSlot::Debt, &[]).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second.len(), 3);
}

#[tokio::test]
async fn test_later_import_fills_gaps_without_erasing() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let importer = Importer::new(store.clone());

    let first = TempDir::new().unwrap();
    write(first.path(), "ACME_Tech.csv", ";2023Q1\nВыручка;100\nP/E;7\n");
    importer.run(first.path()).await.unwrap();

    let second = TempDir::new().unwrap();
    write(second.path(), "ACME_Energy.csv", ";2023Q1\nВыручка;-\nROE;15\n");
    importer.run(second.path()).await.unwrap();

    let record = store
        .get("ACME", QuarterKey::new(2023, Quarter::Q1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.revenue, Some(100.0));
    assert_eq!(record.pe, Some(7.0));
    assert_eq!(record.roe, Some(15.0));
    assert_eq!(record.category, "Tech");
}

#[tokio::test]
async fn test_series_filtered_and_ordered() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Beta_X.csv", ";2023Q2;2023Q1\nВыручка;2;1\n");
    write(dir.path(), "Alpha_X.csv", ";2023Q1\nВыручка;5\n");

    let store = Arc::new(SqliteStore::in_memory().unwrap());
    Importer::new(store.clone()).run(dir.path()).await.unwrap();

    let all = store.metric_series(MetricSlot::Revenue, &[]).await.unwrap();
    let order: Vec<(Quarter, &str)> = all
        .iter()
        .map(|p| (p.quarter, p.company.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            (Quarter::Q1, "Alpha"),
            (Quarter::Q1, "Beta"),
            (Quarter::Q2, "Beta"),
        ]
    );

    let beta = store
        .metric_series(MetricSlot::Revenue, &["Beta".to_string()])
        .await
        .unwrap();
    assert_eq!(beta.len(), 2);
    assert!(beta.iter().all(|p| p.company == "Beta"));
}

#[tokio::test]
async fn test_annotations_outlive_deleted_records() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "ACME_Tech.csv", ";2023Q1\nВыручка;100\n");

    let store = Arc::new(SqliteStore::in_memory().unwrap());
    Importer::new(store.clone()).run(dir.path()).await.unwrap();
    store.set_company_note("ACME", "spin-off pending").await.unwrap();
    store.set_company_color("ACME", "#1f77b4").await.unwrap();

    assert_eq!(store.delete_company("ACME").await.unwrap(), 1);
    assert!(store.companies().await.unwrap().is_empty());
    assert_eq!(
        store.company_note("ACME").await.unwrap().as_deref(),
        Some("spin-off pending")
    );
    assert_eq!(store.company_color("ACME").await.unwrap(), "#1f77b4");
}
