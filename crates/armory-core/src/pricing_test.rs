use super::*;

fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal literal")
}

fn inputs(wholesale: &str, map: Option<&str>, msrp: Option<&str>) -> PriceInputs {
    PriceInputs {
        wholesale: dec(wholesale),
        map: map.map(dec),
        msrp: msrp.map(dec),
    }
}

#[test]
fn default_rules_are_flat_twenty_with_ten_dollar_threshold() {
    let rules = PricingRules::default();
    assert_eq!(rules.bronze.kind, MarkupKind::Flat);
    assert_eq!(rules.bronze.value, dec("20.00"));
    assert_eq!(rules.price_threshold, dec("10.00"));
    assert_eq!(rules.low_price_bronze_pct, dec("25.00"));
    assert_eq!(rules.low_price_gold_pct, dec("15.00"));
    assert_eq!(rules.low_price_platinum_pct, dec("5.00"));
}

#[test]
fn all_three_reference_prices_anchor_each_tier() {
    let rules = PricingRules::default();
    let tiers = price_tiers(inputs("430.00", Some("539.00"), Some("619.00")), &rules).unwrap();
    assert_eq!(tiers.platinum, dec("450.00"));
    assert_eq!(tiers.gold, dec("559.00"));
    assert_eq!(tiers.bronze, dec("639.00"));
}

#[test]
fn missing_map_uses_wholesale_msrp_midpoint_for_gold() {
    let rules = PricingRules::default();
    let tiers = price_tiers(inputs("100.00", None, Some("200.00")), &rules).unwrap();
    assert_eq!(tiers.platinum, dec("120.00"));
    // midpoint 150.00 + flat 20
    assert_eq!(tiers.gold, dec("170.00"));
    assert_eq!(tiers.bronze, dec("220.00"));
}

#[test]
fn wholesale_only_uses_percentage_anchors() {
    let rules = PricingRules::default();
    let tiers = price_tiers(inputs("100.00", None, None), &rules).unwrap();
    assert_eq!(tiers.platinum, dec("120.00"));
    // 100 * 1.15 + 20
    assert_eq!(tiers.gold, dec("135.00"));
    // 100 * 1.30 + 20
    assert_eq!(tiers.bronze, dec("150.00"));
}

#[test]
fn map_without_msrp_falls_back_to_wholesale_anchors() {
    let rules = PricingRules::default();
    let with_map = price_tiers(inputs("100.00", Some("150.00"), None), &rules).unwrap();
    let without = price_tiers(inputs("100.00", None, None), &rules).unwrap();
    assert_eq!(with_map, without);
}

#[test]
fn low_priced_items_use_percentage_regime() {
    let rules = PricingRules::default();
    let tiers = price_tiers(inputs("4.00", Some("5.00"), Some("8.00")), &rules).unwrap();
    assert_eq!(tiers.platinum, dec("4.20"));
    assert_eq!(tiers.gold, dec("5.75"));
    assert_eq!(tiers.bronze, dec("10.00"));
}

#[test]
fn tiers_are_clamped_monotone_when_map_exceeds_msrp() {
    let rules = PricingRules::default();
    // Dirty vendor data: MAP above MSRP would put gold above bronze.
    let tiers = price_tiers(inputs("430.00", Some("700.00"), Some("619.00")), &rules).unwrap();
    assert_eq!(tiers.bronze, dec("639.00"));
    assert_eq!(tiers.gold, dec("639.00"));
    assert!(tiers.platinum <= tiers.gold);
}

#[test]
fn percentage_markup_kind_is_applied() {
    let rules = PricingRules {
        bronze: TierMarkup {
            kind: MarkupKind::Percentage,
            value: dec("10.00"),
        },
        ..PricingRules::default()
    };
    let tiers = price_tiers(inputs("100.00", Some("150.00"), Some("200.00")), &rules).unwrap();
    assert_eq!(tiers.bronze, dec("220.00"));
}

#[test]
fn zero_wholesale_is_rejected() {
    let rules = PricingRules::default();
    let result = price_tiers(inputs("0.00", None, Some("100.00")), &rules);
    assert!(matches!(
        result,
        Err(PricingError::NonPositiveWholesale { .. })
    ));
}

#[test]
fn rounding_is_half_up_to_cents() {
    let rules = PricingRules::default();
    // 3.33 * 1.05 = 3.4965 -> 3.50
    let tiers = price_tiers(inputs("3.33", Some("5.00"), Some("8.00")), &rules).unwrap();
    assert_eq!(tiers.platinum, dec("3.50"));
}

#[test]
fn yaml_rules_override_parses() {
    let yaml = r"
bronze: { kind: percentage, value: 12.5 }
gold: { kind: flat, value: 15.00 }
platinum: { kind: flat, value: 10.00 }
price_threshold: 5.00
low_price_bronze_pct: 30.00
low_price_gold_pct: 20.00
low_price_platinum_pct: 10.00
";
    let rules: PricingRules = serde_yaml::from_str(yaml).expect("parseable rules");
    assert_eq!(rules.bronze.kind, MarkupKind::Percentage);
    assert_eq!(rules.bronze.value, dec("12.5"));
    assert_eq!(rules.price_threshold, dec("5.00"));
}

#[test]
fn validation_rejects_negative_markup() {
    let rules = PricingRules {
        gold: TierMarkup {
            kind: MarkupKind::Flat,
            value: dec("-1.00"),
        },
        ..PricingRules::default()
    };
    let err = validate_rules(&rules).unwrap_err();
    assert!(err.to_string().contains("gold markup"));
}

#[test]
fn validation_rejects_out_of_range_low_price_pct() {
    let rules = PricingRules {
        low_price_bronze_pct: dec("150.00"),
        ..PricingRules::default()
    };
    let err = validate_rules(&rules).unwrap_err();
    assert!(err.to_string().contains("low_price_bronze_pct"));
}
