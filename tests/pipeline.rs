use std::fs;

use serde_json::json;
use storefront_etl::EtlError;
use storefront_etl::config::EtlConfig;
use storefront_etl::io::{samples, snapshot, source};
use storefront_etl::model::{ConsolidatedRecord, SourceKind};
use storefront_etl::pipeline::Pipeline;
use tempfile::tempdir;

fn write_json(path: &std::path::Path, value: &serde_json::Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).expect("fixture written");
}

#[test]
fn get_before_run_reports_not_found() {
    let temp_dir = tempdir().expect("temporary directory");
    let pipeline = Pipeline::new(EtlConfig::in_directory(temp_dir.path()));

    let error = pipeline.get().expect_err("no snapshot yet");

    assert!(matches!(error, EtlError::SnapshotNotFound(_)));
}

#[test]
fn run_consolidates_sample_sources() {
    let temp_dir = tempdir().expect("temporary directory");
    let config = EtlConfig::in_directory(temp_dir.path());
    let created = samples::write_samples(&config).expect("samples written");
    assert_eq!(created, vec![config.primary_path.clone(), config.patch_path.clone()]);

    let pipeline = Pipeline::new(config);
    let report = pipeline.run();

    assert_eq!(report.processed_count, 3);
    assert!(report.persisted);

    let records = pipeline.get().expect("snapshot loaded");
    let ids: Vec<i64> = records.iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let laptop = &records[0];
    assert_eq!(laptop.category, "Ноутбуки");
    assert_eq!(laptop.price, 24500.0);
    assert_eq!(laptop.price_change_percentage, Some(-5.77));
    assert_eq!(laptop.supplier.as_deref(), Some("SupplierX"));

    let phone = &records[1];
    assert_eq!(phone.stock, 30);
    assert_eq!(phone.supplier.as_deref(), Some("SupplierZ"));

    let watch = &records[2];
    assert_eq!(watch.name, "Smartwatch Epsilon");
    assert_eq!(watch.category, "Носимі пристрої");
}

#[test]
fn snapshot_lists_absent_optionals_as_null() {
    let temp_dir = tempdir().expect("temporary directory");
    let config = EtlConfig::in_directory(temp_dir.path());
    write_json(
        &config.primary_path,
        &json!([{"id": 1, "name": "A laptop", "category": "Laptops", "price": 100, "stock": 5}]),
    );
    write_json(&config.patch_path, &json!([{"product_id": 1, "old_price": 100, "price": 90}]));

    let report = Pipeline::new(config.clone()).run();
    assert_eq!(report.processed_count, 1);

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.snapshot_path).unwrap()).unwrap();
    assert_eq!(
        written,
        json!([{
            "id": 1,
            "name": "A laptop",
            "category": "Ноутбуки",
            "price": 90.0,
            "stock": 5,
            "description": null,
            "supplier": null,
            "price_change_percentage": -10.0
        }])
    );
}

#[test]
fn run_without_sources_persists_empty_snapshot() {
    let temp_dir = tempdir().expect("temporary directory");
    let pipeline = Pipeline::new(EtlConfig::in_directory(temp_dir.path()));

    let report = pipeline.run();

    assert_eq!(report.processed_count, 0);
    assert!(report.persisted);
    assert!(pipeline.get().expect("empty snapshot").is_empty());
}

#[test]
fn malformed_source_counts_as_empty() {
    let temp_dir = tempdir().expect("temporary directory");
    let config = EtlConfig::in_directory(temp_dir.path());
    fs::write(&config.primary_path, "{ not json").unwrap();
    write_json(&config.patch_path, &json!({"product_id": 1}));

    assert!(source::read_records(&config.primary_path, SourceKind::Primary).is_empty());
    assert!(matches!(
        source::try_read_records(&config.patch_path),
        Err(EtlError::SourceUnavailable { .. })
    ));
    assert_eq!(Pipeline::new(config).run().processed_count, 0);
}

#[test]
fn run_overwrites_previous_snapshot() {
    let temp_dir = tempdir().expect("temporary directory");
    let config = EtlConfig::in_directory(temp_dir.path());
    write_json(
        &config.primary_path,
        &json!([
            {"id": 1, "name": "Laptop Alpha", "category": "Laptops", "price": 10, "stock": 1},
            {"id": 2, "name": "Phone Beta", "category": "Phones", "price": 10, "stock": 1}
        ]),
    );
    let pipeline = Pipeline::new(config.clone());
    assert_eq!(pipeline.run().processed_count, 2);

    write_json(
        &config.primary_path,
        &json!([{"id": 1, "name": "Laptop Alpha", "category": "Laptops", "price": 10, "stock": 1}]),
    );
    assert_eq!(pipeline.run().processed_count, 1);
    assert_eq!(pipeline.get().unwrap().len(), 1);
}

#[test]
fn failed_write_is_reported_but_not_raised() {
    let temp_dir = tempdir().expect("temporary directory");
    let mut config = EtlConfig::in_directory(temp_dir.path());
    config.snapshot_path = temp_dir.path().join("missing").join("snapshot.json");

    let report = Pipeline::new(config).run();

    assert_eq!(report.processed_count, 0);
    assert!(!report.persisted);
}

#[test]
fn corrupted_snapshot_is_a_parse_error() {
    let temp_dir = tempdir().expect("temporary directory");
    let config = EtlConfig::in_directory(temp_dir.path());
    let pipeline = Pipeline::new(config.clone());

    fs::write(&config.snapshot_path, "[{\"id\": 1").unwrap();
    assert!(matches!(
        pipeline.get(),
        Err(EtlError::SnapshotParse { .. })
    ));

    let mut invalid = ConsolidatedRecord::new(1, "Laptop Alpha", "Ноутбуки", 10.0, 1);
    invalid.stock = -1;
    fs::write(
        &config.snapshot_path,
        serde_json::to_string(&vec![invalid]).unwrap(),
    )
    .unwrap();
    assert!(matches!(
        pipeline.get(),
        Err(EtlError::SnapshotParse { .. })
    ));
}

#[test]
fn samples_do_not_overwrite_existing_sources() {
    let temp_dir = tempdir().expect("temporary directory");
    let config = EtlConfig::in_directory(temp_dir.path());
    write_json(&config.primary_path, &json!([]));

    let created = samples::write_samples(&config).expect("samples written");

    assert_eq!(created, vec![config.patch_path.clone()]);
    assert_eq!(fs::read_to_string(&config.primary_path).unwrap().trim(), "[]");
}

#[test]
fn written_snapshot_round_trips_through_loader() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("snapshot.json");
    let mut record = ConsolidatedRecord::new(3, "Watch One", "Носимі пристрої", 7500.0, 30);
    record.description = Some("Latest generation smartwatch.".into());

    snapshot::write_snapshot(&path, std::slice::from_ref(&record)).expect("snapshot written");

    assert_eq!(snapshot::load_persisted(&path).unwrap(), vec![record]);
}

#[test]
fn duplicate_snapshot_ids_are_a_parse_error() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("snapshot.json");
    let first = ConsolidatedRecord::new(1, "Laptop Alpha", "Ноутбуки", 10.0, 1);
    let second = ConsolidatedRecord::new(1, "Phone Beta", "Смартфони", 20.0, 2);
    fs::write(&path, serde_json::to_string(&vec![first, second]).unwrap()).unwrap();

    assert!(matches!(
        snapshot::load_persisted(&path),
        Err(EtlError::SnapshotParse { .. })
    ));
}

#[cfg(unix)]
#[test]
fn snapshot_write_keeps_readable_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("snapshot.json");
    let record = ConsolidatedRecord::new(1, "Laptop Alpha", "Ноутбуки", 10.0, 1);

    snapshot::write_snapshot(&path, std::slice::from_ref(&record)).expect("snapshot written");
    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);

    fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
    snapshot::write_snapshot(&path, std::slice::from_ref(&record)).expect("snapshot rewritten");
    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}
