use armory_core::pricing::PricingRules;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::*;

fn dec(raw: &str) -> Decimal {
    raw.parse().unwrap()
}

/// A well-stocked handgun record with distinct part and stock numbers.
fn record() -> InventoryRecord {
    InventoryRecord {
        stock_number: "GLOCK19G5".to_owned(),
        upc: Some("764503037108".to_owned()),
        description: "GLOCK 19 GEN5 9MM 15RD 3 MAGS FS".to_owned(),
        department: Some(1),
        manufacturer_id: Some("GLOCK".to_owned()),
        price_msrp: Some(dec("619.00")),
        price_wholesale: Some(dec("430.00")),
        weight_oz: Some(dec("30.16")),
        quantity: 25,
        model: Some("G19".to_owned()),
        manufacturer_name: Some("Glock Inc".to_owned()),
        manufacturer_part_number: Some("PA195S203".to_owned()),
        status: None,
        full_description: Some("The GLOCK 19 Gen5 pistol in 9mm Luger.".to_owned()),
        image_name: Some("GLOCK19G5.jpg".to_owned()),
        restricted_states: vec!["CA".to_owned(), "MA".to_owned()],
        ground_ship_only: false,
        adult_signature_required: false,
        blocked_from_drop_ship: false,
        date_entered: Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
        price_map: Some(dec("539.00")),
        image_disclaimer: false,
        shipping_length: None,
        shipping_width: None,
        shipping_height: None,
        prop65: false,
        vendor_approval_required: false,
    }
}

/// Normalizer pinned to 2024-02-01 with default pricing rules.
fn normalizer() -> Normalizer {
    Normalizer::new(
        PricingRules::default(),
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
    )
}

#[test]
fn normalizes_a_complete_record() {
    let product = normalizer().normalize(&record()).unwrap();

    assert_eq!(product.rsr_stock_number, "GLOCK19G5");
    assert_eq!(product.sku, "PA195S203");
    assert_eq!(product.name, "GLOCK 19 GEN5 9MM 15RD 3 MAGS FS");
    assert_eq!(product.category, "Handguns");
    assert_eq!(product.department_number, Some(1));

    assert_eq!(product.price_wholesale, dec("430.00"));
    assert_eq!(product.price_platinum, dec("450.00"));
    assert_eq!(product.price_gold, dec("559.00"));
    assert_eq!(product.price_bronze, dec("639.00"));

    assert_eq!(product.stock_quantity, 25);
    assert!(product.in_stock);
    assert!(product.drop_shippable);
    assert!(product.requires_ffl);
    assert!(product.new_item);

    assert_eq!(product.caliber.as_deref(), Some("9mm"));
    assert_eq!(product.capacity.as_deref(), Some("15RD"));
    assert_eq!(product.sight_type.as_deref(), Some("Fixed"));
    assert_eq!(product.state_restrictions, vec!["CA", "MA"]);

    assert!(product.tags.contains(&"Handguns".to_owned()));
    assert!(product.tags.contains(&"Glock Inc".to_owned()));
    assert!(product.tags.contains(&"9mm".to_owned()));
}

#[test]
fn sku_falls_back_to_stock_number() {
    let mut missing = record();
    missing.manufacturer_part_number = None;
    assert_eq!(normalizer().normalize(&missing).unwrap().sku, "GLOCK19G5");

    let mut same = record();
    same.manufacturer_part_number = Some("GLOCK19G5".to_owned());
    assert_eq!(normalizer().normalize(&same).unwrap().sku, "GLOCK19G5");
}

#[test]
fn missing_wholesale_price_is_a_normalization_error() {
    let mut bad = record();
    bad.price_wholesale = None;

    match normalizer().normalize(&bad) {
        Err(FeedError::Normalization { stock_number, .. }) => {
            assert_eq!(stock_number, "GLOCK19G5");
        }
        other => panic!("expected Normalization error, got {other:?}"),
    }
}

#[test]
fn zero_quantity_is_out_of_stock() {
    let mut empty = record();
    empty.quantity = 0;

    let product = normalizer().normalize(&empty).unwrap();
    assert_eq!(product.stock_quantity, 0);
    assert!(!product.in_stock);
}

#[test]
fn vendor_status_flags_become_tags() {
    let mut allocated = record();
    allocated.status = Some("Allocated".to_owned());
    let product = normalizer().normalize(&allocated).unwrap();
    assert!(product.allocated);
    assert!(product.tags.contains(&"Allocated".to_owned()));

    let mut closeout = record();
    closeout.status = Some("Closeout".to_owned());
    let product = normalizer().normalize(&closeout).unwrap();
    assert!(!product.allocated);
    assert!(product.tags.contains(&"Closeout".to_owned()));
}

#[test]
fn items_outside_the_window_are_not_new() {
    let mut old = record();
    old.date_entered = Some(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
    assert!(!normalizer().normalize(&old).unwrap().new_item);

    let mut undated = record();
    undated.date_entered = None;
    assert!(!normalizer().normalize(&undated).unwrap().new_item);
}

#[test]
fn disclaimer_images_are_dropped() {
    let mut placeholder = record();
    placeholder.image_disclaimer = true;

    let product = normalizer().normalize(&placeholder).unwrap();
    assert_eq!(product.image_name, None);
}

#[test]
fn blocked_drop_ship_inverts_to_drop_shippable() {
    let mut blocked = record();
    blocked.blocked_from_drop_ship = true;
    assert!(!normalizer().normalize(&blocked).unwrap().drop_shippable);
}

#[test]
fn nfa_department_routes_to_nfa_category() {
    let mut suppressor = record();
    suppressor.description = "SILENCERCO OMEGA 300 SUPPRESSOR".to_owned();
    suppressor.department = Some(6);
    suppressor.manufacturer_part_number = Some("SU1589".to_owned());

    let product = normalizer().normalize(&suppressor).unwrap();
    assert_eq!(product.category, "NFA Products");
    assert!(product.requires_ffl);
}

#[test]
fn accessory_departments_do_not_require_ffl() {
    let mut magazine = record();
    magazine.description = "MAGPUL PMAG 30RD 5.56 BLACK MAGAZINE".to_owned();
    magazine.department = Some(10);
    magazine.manufacturer_name = Some("Magpul Industries".to_owned());

    let product = normalizer().normalize(&magazine).unwrap();
    assert_eq!(product.category, "Magazines");
    assert!(!product.requires_ffl);
    assert_eq!(product.capacity.as_deref(), Some("30RD"));
}

#[test]
fn attributes_are_scanned_in_the_expanded_description_too() {
    let mut terse = record();
    terse.description = "GLOCK 19 GEN5".to_owned();
    terse.full_description = Some("Chambered in 9mm with a 15RD magazine.".to_owned());

    let product = normalizer().normalize(&terse).unwrap();
    assert_eq!(product.caliber.as_deref(), Some("9mm"));
    assert_eq!(product.capacity.as_deref(), Some("15RD"));
}
