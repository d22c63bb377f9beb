use std::path::PathBuf;

use chrono::NaiveDate;

use raiz_crm::config::AppConfig;
use raiz_crm::domain::customer::NewCustomer;
use raiz_crm::domain::order::NewOrder;
use raiz_crm::domain::order_item::NewOrderItem;
use raiz_crm::repository::{CustomerReader, CustomerWriter, DieselRepository, OrderReader, OrderWriter};
use raiz_crm::services::backup::{
    BACKUP_FILE_NAME, BackupError, backup_database, merge_external_store, restore_if_missing,
};

mod common;

fn midnight(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

#[test]
fn test_backup_copies_and_overwrites() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("store.db");
    let backup_folder = dir.path().join("respaldos");

    std::fs::write(&db_path, b"first generation").expect("write store");

    let config = AppConfig {
        backup_folder: Some(backup_folder.clone()),
    };

    let destination = backup_database(&config, &db_path).expect("backup succeeds");
    assert_eq!(destination, backup_folder.join(BACKUP_FILE_NAME));
    assert_eq!(
        std::fs::read(&destination).expect("read backup"),
        b"first generation"
    );

    // A second backup overwrites the previous copy.
    std::fs::write(&db_path, b"second generation").expect("write store");
    backup_database(&config, &db_path).expect("backup succeeds");
    assert_eq!(
        std::fs::read(&destination).expect("read backup"),
        b"second generation"
    );
}

#[test]
fn test_backup_requires_configuration_and_store() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("store.db");

    let unconfigured = AppConfig::default();
    assert!(matches!(
        backup_database(&unconfigured, &db_path),
        Err(BackupError::NoBackupFolder)
    ));

    let config = AppConfig {
        backup_folder: Some(dir.path().join("respaldos")),
    };
    assert!(matches!(
        backup_database(&config, &db_path),
        Err(BackupError::MissingDatabase(_))
    ));
}

#[test]
fn test_restore_if_missing_preconditions_are_silent() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("store.db");
    let backup_folder = dir.path().join("respaldos");

    // No folder configured.
    assert!(
        restore_if_missing(&AppConfig::default(), &db_path)
            .expect("no-op")
            .is_none()
    );

    let config = AppConfig {
        backup_folder: Some(backup_folder.clone()),
    };

    // Folder configured but no backup file.
    assert!(
        restore_if_missing(&config, &db_path)
            .expect("no-op")
            .is_none()
    );

    // Backup exists and the store is absent: it gets copied into place.
    std::fs::create_dir_all(&backup_folder).expect("create folder");
    std::fs::write(backup_folder.join(BACKUP_FILE_NAME), b"saved data").expect("write backup");

    let restored = restore_if_missing(&config, &db_path).expect("restore succeeds");
    assert!(restored.is_some());
    assert_eq!(std::fs::read(&db_path).expect("read store"), b"saved data");

    // The store exists now, so another restore is a no-op.
    std::fs::write(&db_path, b"live edits").expect("write store");
    assert!(
        restore_if_missing(&config, &db_path)
            .expect("no-op")
            .is_none()
    );
    assert_eq!(std::fs::read(&db_path).expect("read store"), b"live edits");
}

#[test]
fn test_merge_deduplicates_by_rut_name_code_and_tuple() {
    let live_db = common::TestDb::new("test_merge_live.db");
    let external_db = common::TestDb::new("test_merge_external.db");

    let live = DieselRepository::new(live_db.pool());
    let external = DieselRepository::new(external_db.pool());

    // Live store: Ana (by RUT), Bernardo (by name) and one of Ana's
    // orders with one item.
    let live_ana = live
        .create_customer(&NewCustomer::new("Ana P.").with_rut("123456785"))
        .unwrap();
    live.create_customer(&NewCustomer::new("Bernardo Soto"))
        .unwrap();
    live.create_order(
        &NewOrder::new("P20250301-001", live_ana.id, midnight(2025, 3, 1))
            .with_items(vec![NewOrderItem::new("Mesa raíz", 1, 4_500_000)]),
    )
    .unwrap();

    // External store: same Ana under a different spelling but the same
    // RUT, Bernardo matched by name, and a brand-new Carla.
    let ext_ana = external
        .create_customer(&NewCustomer::new("Ana Pérez").with_rut("12.345.678-5"))
        .unwrap();
    external
        .create_customer(&NewCustomer::new("Bernardo Soto"))
        .unwrap();
    let ext_carla = external
        .create_customer(&NewCustomer::new("Carla Muñoz"))
        .unwrap();

    // Known order with one duplicate item and one new item, plus a new
    // order for Carla.
    external
        .create_order(
            &NewOrder::new("P20250301-001", ext_ana.id, midnight(2025, 3, 1)).with_items(vec![
                NewOrderItem::new("Mesa raíz", 1, 4_500_000),
                NewOrderItem::new("Espejo", 1, 800_000),
            ]),
        )
        .unwrap();
    external
        .create_order(
            &NewOrder::new("P20250315-001", ext_carla.id, midnight(2025, 3, 15))
                .with_items(vec![NewOrderItem::new("Banco", 2, 600_000)]),
        )
        .unwrap();

    let summary = merge_external_store(&live, std::path::Path::new("test_merge_external.db"))
        .expect("merge succeeds");

    assert_eq!(summary.customers_added, 1); // only Carla
    assert_eq!(summary.orders_added, 1); // only Carla's order
    assert_eq!(summary.items_added, 2); // Espejo + Banco

    assert_eq!(live.list_customers().unwrap().len(), 3);
    assert_eq!(live.list_orders().unwrap().len(), 2);

    let ana_order = live
        .find_order_by_code("P20250301-001")
        .unwrap()
        .expect("order present");
    assert_eq!(ana_order.customer_id, live_ana.id);
    assert_eq!(ana_order.items.len(), 2);

    let carla = live
        .find_customer_by_name("Carla Muñoz")
        .unwrap()
        .expect("customer merged");
    let carla_order = live
        .find_order_by_code("P20250315-001")
        .unwrap()
        .expect("order merged");
    assert_eq!(carla_order.customer_id, carla.id);

    // Merging the same file again adds nothing.
    let again = merge_external_store(&live, std::path::Path::new("test_merge_external.db"))
        .expect("merge succeeds");
    assert_eq!(again.customers_added, 0);
    assert_eq!(again.orders_added, 0);
    assert_eq!(again.items_added, 0);
}

#[test]
fn test_merge_rejects_a_missing_file() {
    let live_db = common::TestDb::new("test_merge_missing_source.db");
    let live = DieselRepository::new(live_db.pool());

    let result = merge_external_store(&live, &PathBuf::from("no_such_store.db"));

    assert!(result.is_err());
}
