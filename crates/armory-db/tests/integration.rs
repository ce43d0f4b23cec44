//! Offline tests for armory-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use armory_core::{AppConfig, Environment, Product};
use armory_db::{PoolConfig, ProductRow, SyncRunRow};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        request_timeout_secs: 30,
        feed_host: "ftps.rsrgroup.com".to_string(),
        feed_port: 2222,
        feed_user: None,
        feed_pass: None,
        feed_http_mirror: None,
        feed_dir: PathBuf::from("./data/feed"),
        search_app_id: None,
        search_admin_key: None,
        search_index_name: "products".to_string(),
        search_host: None,
        index_batch_size: 500,
        index_batch_delay_ms: 100,
        search_max_retries: 3,
        search_backoff_base_ms: 500,
        media_endpoint: None,
        media_region: "us-east-1".to_string(),
        media_bucket: None,
        media_access_key: None,
        media_secret_key: None,
        image_dir: PathBuf::from("./data/images"),
        pricing_rules_path: None,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`SyncRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn sync_run_row_has_expected_fields() {
    let row = SyncRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        run_type: "feed-ingest".to_string(),
        trigger_source: "cli".to_string(),
        status: "queued".to_string(),
        started_at: None,
        completed_at: None,
        records_processed: 0_i32,
        records_failed: 0_i32,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.run_type, "feed-ingest");
    assert_eq!(row.trigger_source, "cli");
    assert_eq!(row.status, "queued");
    assert!(row.started_at.is_none());
    assert!(row.completed_at.is_none());
    assert_eq!(row.records_processed, 0);
    assert_eq!(row.records_failed, 0);
    assert!(row.error_message.is_none());
}

fn make_product_row() -> ProductRow {
    let mut row = ProductRow {
        id: 42_i64,
        rsr_stock_number: "GLOCK19GEN5".to_string(),
        sku: "PA195S201".to_string(),
        upc: Some("764503026911".to_string()),
        name: "GLOCK 19 GEN5 9MM 15RD".to_string(),
        description: Some("GLOCK 19 GEN5 9MM 15RD".to_string()),
        full_description: None,
        category: "Handguns".to_string(),
        department_number: Some(1),
        subcategory_name: None,
        manufacturer: Some("GLOCK".to_string()),
        manufacturer_part_number: Some("PA195S201".to_string()),
        model: Some("19 GEN5".to_string()),
        price_wholesale: Decimal::new(43000, 2),
        price_map: Some(Decimal::new(53900, 2)),
        price_msrp: Some(Decimal::new(61900, 2)),
        price_bronze: Decimal::new(63900, 2),
        price_gold: Decimal::new(55900, 2),
        price_platinum: Decimal::new(45000, 2),
        stock_quantity: 12,
        in_stock: true,
        allocated: false,
        drop_shippable: true,
        requires_ffl: true,
        caliber: Some("9mm".to_string()),
        capacity: Some("15".to_string()),
        barrel_length: None,
        finish: Some("Black".to_string()),
        frame_size: Some("Compact".to_string()),
        action_type: None,
        sight_type: None,
        weight_oz: Some(Decimal::new(3000, 2)),
        image_name: Some("GLOCK19GEN5.jpg".to_string()),
        tags: vec!["GLOCK".to_string(), "19 GEN5".to_string()],
        state_restrictions: vec!["CA".to_string(), "MA".to_string()],
        ground_ship_only: false,
        adult_signature_required: true,
        prop65: false,
        new_item: false,
        date_entered: NaiveDate::from_ymd_opt(2023, 4, 12),
        content_hash: String::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    row.content_hash = Product::from(row.clone()).content_hash();
    row
}

#[test]
fn product_row_converts_to_product_losslessly() {
    let row = make_product_row();
    let product = Product::from(row.clone());

    assert_eq!(product.rsr_stock_number, row.rsr_stock_number);
    assert_eq!(product.sku, row.sku);
    assert_eq!(product.category, row.category);
    assert_eq!(product.price_bronze, row.price_bronze);
    assert_eq!(product.stock_quantity, row.stock_quantity);
    assert_eq!(product.tags, row.tags);
    assert_eq!(product.state_restrictions, row.state_restrictions);
    assert_eq!(product.date_entered, row.date_entered);
}

#[test]
fn stored_hash_matches_recomputed_hash() {
    // The row carries the fingerprint the upsert stored; converting back to
    // a product and hashing again must agree, otherwise reconciliation would
    // see phantom drift.
    let row = make_product_row();
    let recomputed = Product::from(row.clone()).content_hash();
    assert_eq!(row.content_hash, recomputed);
}
