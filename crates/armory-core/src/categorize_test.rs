use rust_decimal::Decimal;

use super::*;

fn rules() -> CategoryRules {
    CategoryRules::new()
}

fn product(name: &str, department: Option<i32>, category: &str) -> Product {
    Product {
        rsr_stock_number: "RSR0001".to_string(),
        sku: "MPN0001".to_string(),
        upc: None,
        name: name.to_string(),
        description: None,
        full_description: None,
        category: category.to_string(),
        department_number: department,
        subcategory_name: None,
        manufacturer: None,
        manufacturer_part_number: Some("MPN0001".to_string()),
        model: None,
        price_wholesale: Decimal::new(10000, 2),
        price_map: None,
        price_msrp: None,
        price_bronze: Decimal::new(13000, 2),
        price_gold: Decimal::new(11500, 2),
        price_platinum: Decimal::new(10500, 2),
        stock_quantity: 3,
        in_stock: true,
        allocated: false,
        drop_shippable: true,
        requires_ffl: department.is_some_and(taxonomy::requires_ffl),
        caliber: None,
        capacity: None,
        barrel_length: None,
        finish: None,
        frame_size: None,
        action_type: None,
        sight_type: None,
        weight_oz: None,
        image_name: None,
        tags: Vec::new(),
        state_restrictions: Vec::new(),
        ground_ship_only: false,
        adult_signature_required: false,
        prop65: false,
        new_item: false,
        date_entered: None,
    }
}

#[test]
fn nfa_department_always_wins() {
    let r = rules().resolve("BANISH 30 MULTI-CALIBER", Some(6), "Accessories");
    assert_eq!(r.category, "NFA Products");
    assert_eq!(r.reason, "nfa-item");
}

#[test]
fn suppressor_keyword_pulls_from_firearm_placement() {
    let r = rules().resolve("DEAD AIR SANDMAN-S SUPPRESSOR", None, "Rifles");
    assert_eq!(r.category, "NFA Products");
    assert_eq!(r.reason, "nfa-item");
}

#[test]
fn suppressor_accessory_outside_firearm_placement_is_left_alone() {
    let r = rules().resolve("SUPPRESSOR COVER 7IN", Some(13), "Misc. Accessories");
    assert_eq!(r.category, "Misc. Accessories");
    assert_eq!(r.reason, "unchanged");
}

#[test]
fn magazine_is_rescued_out_of_long_guns() {
    let r = rules().resolve("MAGPUL PMAG 30RD MAGAZINE", Some(5), "Long Guns");
    assert_eq!(r.category, "Magazines");
    assert_eq!(r.reason, "accessory-keyword");
}

#[test]
fn scope_is_rescued_into_optics() {
    let r = rules().resolve("VORTEX CROSSFIRE II 3-9X40 SCOPE", Some(5), "Long Guns");
    assert_eq!(r.category, "Optics");
    assert_eq!(r.reason, "accessory-keyword");
}

#[test]
fn firearm_model_name_exempts_from_accessory_rescue() {
    let r = rules().resolve("GLOCK 19 GEN5 W/ EXTENDED GRIP", Some(1), "Handguns");
    assert_eq!(r.category, "Handguns");
    assert_eq!(r.reason, "handgun-department");
}

#[test]
fn derringer_is_not_an_accessory() {
    let r = rules().resolve("BOND ARMS ROUGHNECK DERRINGER 45ACP", Some(1), "Handguns");
    assert_eq!(r.category, "Handguns");
}

#[test]
fn firearm_is_never_rescued_into_the_catch_all() {
    // "target" is an accessory word but the subdivision finds no concrete
    // bucket; a firearm-department item must not land in Accessories.
    let r = rules().resolve("USED COLT TROOPER W/ FACTORY TARGET", Some(2), "Used Handguns");
    assert_eq!(r.category, "Used Handguns");
    assert_eq!(r.reason, "firearm-department");
}

#[test]
fn handgun_department_pins_handguns() {
    let r = rules().resolve("SIG SAUER P365 9MM 10RD", Some(1), "Accessories");
    assert_eq!(r.category, "Handguns");
    assert_eq!(r.reason, "handgun-department");
}

#[test]
fn long_gun_department_splits_on_shotgun_evidence() {
    let r = rules().resolve("MOSSBERG 500 FIELD 12GA 28IN", Some(5), "Long Guns");
    assert_eq!(r.category, "Shotguns");
    assert_eq!(r.reason, "long-gun-department");
}

#[test]
fn long_gun_department_defaults_to_rifles() {
    let r = rules().resolve("HENRY GOLDEN BOY 22LR", Some(5), "Long Guns");
    assert_eq!(r.category, "Rifles");
}

#[test]
fn four_ten_bore_is_a_shotgun() {
    let r = rules().resolve("SAVAGE STEVENS 301 .410 SINGLE SHOT", Some(5), "Long Guns");
    assert_eq!(r.category, "Shotguns");
}

#[test]
fn stripped_upper_in_long_gun_department_is_a_conversion_part() {
    let r = rules().resolve("AERO PRECISION COMPLETE UPPER 5.56 16IN", Some(5), "Long Guns");
    assert_eq!(r.category, "Upper Receivers & Conversion Kits");
}

#[test]
fn parts_keyword_relocates_from_the_default_bucket() {
    let r = rules().resolve("CMC SINGLE STAGE TRIGGER FLAT", None, "Accessories");
    assert_eq!(r.category, "Parts");
    assert_eq!(r.reason, "parts-keyword");
}

#[test]
fn upper_keyword_routes_to_conversion_kits() {
    let r = rules().resolve("STRIPPED UPPER RECEIVER BLEM", None, "");
    assert_eq!(r.category, "Upper Receivers & Conversion Kits");
    assert_eq!(r.reason, "parts-keyword");
}

#[test]
fn used_long_gun_department_pins_its_taxonomy_slot() {
    let r = rules().resolve("RUGER 10/22 CARBINE USED", Some(3), "Accessories");
    assert_eq!(r.category, "Used Long Guns");
    assert_eq!(r.reason, "firearm-department");
}

#[test]
fn recognized_current_category_is_kept() {
    let r = rules().resolve("PELICAN V800 VAULT DOUBLE RIFLE CASE", Some(40), "Hard Gun Cases");
    assert_eq!(r.category, "Hard Gun Cases");
    assert_eq!(r.reason, "unchanged");
}

#[test]
fn default_bucket_falls_back_to_the_department_category() {
    let r = rules().resolve("FEDERAL XM193 5.56 55GR 20RD", Some(18), "Accessories");
    assert_eq!(r.category, "Ammunition");
    assert_eq!(r.reason, "department-default");
}

#[test]
fn analyze_reports_a_move_with_reason() {
    let p = product("VORTEX STRIKE EAGLE 1-8X24 SCOPE", Some(5), "Long Guns");
    let change = rules().analyze(&p).expect("expected a category change");
    assert_eq!(change.from, "Long Guns");
    assert_eq!(change.to, "Optics");
    assert_eq!(change.reason, "accessory-keyword");
    assert_eq!(change.rsr_stock_number, "RSR0001");
}

#[test]
fn analyze_returns_none_when_already_settled() {
    let p = product("GLOCK 19 GEN5 9MM 15RD", Some(1), "Handguns");
    assert!(rules().analyze(&p).is_none());
}
