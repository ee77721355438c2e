// ==========================================
// 产物发布集成测试
// ==========================================
// 测试目标: 管道产出 → CSV + SQLite + 数据字典 + 运行摘要
// ==========================================


use std::fs;
use tempfile::TempDir;
use test_helpers::{config_for, create_raw_dir};
use trade_etl::repository::{SqliteTableStore, DATA_DICTIONARY_FILE, RUN_SUMMARY_FILE};
use trade_etl::{logging, publish_outputs, Pipeline, PublishOptions, RunSummary};

const TABLES: [&str; 5] = [
    "dim_product",
    "dim_sector",
    "fact_exports",
    "fact_imports",
    "fact_trademap",
];

#[test]
fn test_publish_writes_all_artifacts() {
    logging::init_test();

    println!("\n=== 测试：完整发布流程 ===");

    // 步骤 1: 运行管道
    let raw = create_raw_dir().expect("Failed to create raw dir");
    let out = TempDir::new().unwrap();
    let config = config_for(raw.path(), out.path());
    let output = Pipeline::new(config.clone()).run().unwrap();

    // 步骤 2: 发布
    let summary = RunSummary::start(&config.raw_dir).with_output(&output);
    let summary = publish_outputs(&config, &output, summary, PublishOptions::default())
        .expect("Publish should succeed");

    // 步骤 3: CSV
    for name in TABLES {
        assert!(out.path().join(format!("{}.csv", name)).exists(), "{}", name);
    }
    let exports = fs::read_to_string(out.path().join("fact_exports.csv")).unwrap();
    assert_eq!(exports.lines().count(), 4);
    assert!(exports.contains("Camarones congelados"));

    // 步骤 4: SQLite 行数与内存表一致
    let store = SqliteTableStore::open(&config.sqlite_path).unwrap();
    for (name, rows) in output.tables.row_counts() {
        assert_eq!(store.row_count(name).unwrap(), rows as i64, "{}", name);
    }

    // 步骤 5: 数据字典与运行摘要
    let dictionary = fs::read_to_string(out.path().join(DATA_DICTIONARY_FILE)).unwrap();
    for name in TABLES {
        assert!(dictionary.contains(&format!("## {}", name)));
    }

    let json = fs::read_to_string(out.path().join(RUN_SUMMARY_FILE)).unwrap();
    let restored: RunSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.run_id, summary.run_id);
    assert!(restored.finished_at.is_some());
    assert_eq!(restored.total_rows(), 2 + 97 + 3 + 1 + 2);
    // 5 CSV + SQLite + 数据字典
    assert_eq!(restored.outputs.len(), 7);

    println!("✓ 发布完成: {} 行", restored.total_rows());
}

#[test]
fn test_publish_skip_sqlite() {
    let raw = create_raw_dir().unwrap();
    let out = TempDir::new().unwrap();
    let config = config_for(raw.path(), out.path());
    let output = Pipeline::new(config.clone()).run().unwrap();

    let summary = RunSummary::start(&config.raw_dir).with_output(&output);
    let summary =
        publish_outputs(&config, &output, summary, PublishOptions { skip_sqlite: true }).unwrap();

    assert!(!config.sqlite_path.exists());
    assert!(out.path().join("dim_sector.csv").exists());
    assert_eq!(summary.outputs.len(), 6);
}

#[test]
fn test_republish_replaces_sqlite_tables() {
    let raw = create_raw_dir().unwrap();
    let out = TempDir::new().unwrap();
    let config = config_for(raw.path(), out.path());

    for _ in 0..2 {
        let output = Pipeline::new(config.clone()).run().unwrap();
        let summary = RunSummary::start(&config.raw_dir).with_output(&output);
        publish_outputs(&config, &output, summary, PublishOptions::default()).unwrap();
    }

    // 重复发布不累加行
    let store = SqliteTableStore::open(&config.sqlite_path).unwrap();
    assert_eq!(store.row_count("fact_exports").unwrap(), 3);
    assert_eq!(store.row_count("dim_product").unwrap(), 2);
}

#[test]
fn test_publish_empty_raw_dir_keeps_schemas() {
    let raw = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let config = config_for(raw.path(), out.path());
    let output = Pipeline::new(config.clone()).run().unwrap();

    let summary = RunSummary::start(&config.raw_dir).with_output(&output);
    publish_outputs(&config, &output, summary, PublishOptions::default()).unwrap();

    // 空表仍写出表头
    let sectors = fs::read_to_string(out.path().join("dim_sector.csv")).unwrap();
    assert_eq!(sectors.trim_end(), "code2,section,sector_industry");

    let store = SqliteTableStore::open(&config.sqlite_path).unwrap();
    let columns = store.table_columns("fact_imports").unwrap();
    assert!(columns.iter().any(|(name, _)| name == "cif_value"));
    assert_eq!(store.row_count("fact_imports").unwrap(), 0);
}
