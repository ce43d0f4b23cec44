use super::*;

fn extractor() -> AttributeExtractor {
    AttributeExtractor::new()
}

#[test]
fn extracts_caliber_from_common_tokens() {
    let cases = [
        ("GLOCK 19 GEN5 9MM 15RD", "9mm"),
        ("SIG 1911 45ACP 8RD NS", "45 ACP"),
        ("RUGER 10/22 CARB 22LR 18.5\"", "22 LR"),
        ("AR15 5.56 NATO 16\" 30RD", "5.56 NATO"),
        ("MOSSBERG 500 12 GAUGE 28\"", "12 Gauge"),
        ("HENRY 45-70 GOVT LEVER", ""),
        ("S&W 686 357 MAG 6\"", "357 Mag"),
        ("SIG P229 357 SIG 12RD", "357 Sig"),
        ("RUGER AMER 6.5 CREEDMOOR 22\"", "6.5 Creedmoor"),
        ("AERO UPPER 300 BLACKOUT", "300 Blackout"),
    ];
    let extractor = extractor();
    for (description, expected) in cases {
        let caliber = extractor.extract(description).caliber;
        if expected.is_empty() {
            assert_eq!(caliber, None, "{description}");
        } else {
            assert_eq!(caliber.as_deref(), Some(expected), "{description}");
        }
    }
}

#[test]
fn caliber_tokens_respect_boundaries() {
    let extractor = extractor();
    // 19MM is not 9mm, 2556 is not 556.
    assert_eq!(extractor.extract("WATCH BAND 19MM").caliber, None);
    assert_eq!(extractor.extract("PART NO 2556X").caliber, None);
}

#[test]
fn extracts_capacity_and_barrel_length() {
    let extractor = extractor();

    let attrs = extractor.extract("GLOCK 19 GEN5 9MM 15RD 4.02\" BBL");
    assert_eq!(attrs.capacity.as_deref(), Some("15RD"));
    assert_eq!(attrs.barrel_length.as_deref(), Some("4.02\""));

    let attrs = extractor.extract("S&W 642 38 SPECIAL 5 SHOT 1.87 IN");
    assert_eq!(attrs.capacity.as_deref(), Some("5RD"));
    assert_eq!(attrs.barrel_length.as_deref(), Some("1.87\""));

    let attrs = extractor.extract("PMAG 30 ROUND MAGAZINE");
    assert_eq!(attrs.capacity.as_deref(), Some("30RD"));
    assert_eq!(attrs.barrel_length, None);
}

#[test]
fn finish_terms_do_not_match_inside_words() {
    let extractor = extractor();
    assert_eq!(extractor.extract("TITAN ALLOY FRAME").finish, None);
    assert_eq!(
        extractor.extract("BLACKHAWK HOLSTER 300 BLACKOUT").finish,
        None
    );
    assert_eq!(
        extractor.extract("CZ75 COMPACT BLACK").finish.as_deref(),
        Some("Black")
    );
}

#[test]
fn subcompact_wins_over_compact() {
    let extractor = extractor();
    assert_eq!(
        extractor.extract("XD 9MM SUB-COMPACT").frame_size.as_deref(),
        Some("Subcompact")
    );
    assert_eq!(
        extractor.extract("P365 MICRO COMPACT").frame_size.as_deref(),
        Some("Micro")
    );
    assert_eq!(
        extractor.extract("CZ75 COMPACT").frame_size.as_deref(),
        Some("Compact")
    );
}

#[test]
fn extracts_action_and_sight_types() {
    let extractor = extractor();

    let attrs = extractor.extract("REM 870 PUMP 12GA 28\"");
    assert_eq!(attrs.action_type.as_deref(), Some("Pump Action"));

    let attrs = extractor.extract("GLOCK 17 GEN5 9MM 17RD NS");
    assert_eq!(attrs.sight_type.as_deref(), Some("Night Sights"));

    let attrs = extractor.extract("GLOCK 19 GEN5 9MM 15RD 3 MAGS FS");
    assert_eq!(attrs.sight_type.as_deref(), Some("Fixed"));
}

#[test]
fn cleaning_gear_yields_no_attributes() {
    let attrs = extractor().extract("HOPPES NO 9 BORE SOLVENT 4OZ");
    assert_eq!(attrs, Attributes::default());
}
