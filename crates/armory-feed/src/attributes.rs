//! Token extraction for filterable product attributes.
//!
//! Vendor descriptions are terse all-caps strings ("GLOCK 19 GEN5 9MM
//! 15RD 3 MAGS FS"). These helpers pull out the handful of attributes the
//! storefront filters on. Term tables are matched first-hit with token
//! boundaries on both sides, so `TITANIUM` never reads as finish `Tan`
//! and `19MM` never reads as caliber `9mm`.

use regex::Regex;

/// Caliber tokens, most specific first. The first term found wins.
const CALIBER_TERMS: &[(&str, &str)] = &[
    ("357 SIG", "357 Sig"),
    ("357 MAG", "357 Mag"),
    ("357MAG", "357 Mag"),
    ("357", "357 Mag"),
    ("38 SPECIAL", "38 Special"),
    ("38 SPL", "38 Special"),
    ("38SPL", "38 Special"),
    ("44 MAG", "44 Mag"),
    ("44MAG", "44 Mag"),
    ("45 ACP", "45 ACP"),
    ("45ACP", "45 ACP"),
    ("45 AUTO", "45 ACP"),
    ("45 COLT", "45 Colt"),
    ("45LC", "45 Colt"),
    ("380 ACP", "380 ACP"),
    ("380ACP", "380 ACP"),
    ("380 AUTO", "380 ACP"),
    ("40 S&W", "40 S&W"),
    ("40SW", "40 S&W"),
    ("40 SW", "40 S&W"),
    ("32 ACP", "32 ACP"),
    ("25 ACP", "25 ACP"),
    ("10MM", "10mm"),
    ("9MM", "9mm"),
    ("5.7X28", "5.7x28"),
    ("22 WMR", "22 WMR"),
    ("22WMR", "22 WMR"),
    ("22 MAG", "22 WMR"),
    ("22 LR", "22 LR"),
    ("22LR", "22 LR"),
    ("17 HMR", "17 HMR"),
    ("17HMR", "17 HMR"),
    ("5.56X45", "5.56 NATO"),
    ("5.56", "5.56 NATO"),
    ("556NATO", "5.56 NATO"),
    ("556", "5.56 NATO"),
    ("223 REM", "223 Rem"),
    ("223", "223 Rem"),
    ("300 BLACKOUT", "300 Blackout"),
    ("300 BLK", "300 Blackout"),
    ("300BLK", "300 Blackout"),
    ("308 WIN", "308 Win"),
    ("308", "308 Win"),
    ("7.62X39", "7.62x39"),
    ("762X39", "7.62x39"),
    ("6.5 CREEDMOOR", "6.5 Creedmoor"),
    ("6.5CM", "6.5 Creedmoor"),
    ("30-06", "30-06"),
    ("270 WIN", "270 Win"),
    ("243 WIN", "243 Win"),
    ("7MM REM", "7mm Rem Mag"),
    ("50 BMG", "50 BMG"),
    ("12 GAUGE", "12 Gauge"),
    ("12 GA", "12 Gauge"),
    ("12GA", "12 Gauge"),
    ("20 GAUGE", "20 Gauge"),
    ("20 GA", "20 Gauge"),
    ("20GA", "20 Gauge"),
    ("28 GA", "28 Gauge"),
    ("28GA", "28 Gauge"),
    ("410 BORE", "410 Bore"),
    ("410 GA", "410 Bore"),
    ("410GA", "410 Bore"),
    ("410", "410 Bore"),
];

const FINISH_TERMS: &[(&str, &str)] = &[
    ("STAINLESS", "Stainless"),
    ("BLUED", "Blued"),
    ("NICKEL", "Nickel"),
    ("CERAKOTE", "Cerakote"),
    ("OD GREEN", "OD Green"),
    ("ODG", "OD Green"),
    ("FDE", "FDE"),
    ("COYOTE", "Coyote"),
    ("TUNGSTEN", "Tungsten"),
    ("GRAY", "Gray"),
    ("GREY", "Gray"),
    ("TAN", "Tan"),
    ("BLACK", "Black"),
];

/// `SUB-COMPACT` must come before `COMPACT`: the shorter term also matches
/// inside the hyphenated one.
const FRAME_TERMS: &[(&str, &str)] = &[
    ("SUB-COMPACT", "Subcompact"),
    ("SUBCOMPACT", "Subcompact"),
    ("SUB COMPACT", "Subcompact"),
    ("MICRO", "Micro"),
    ("COMPACT", "Compact"),
    ("FULL SIZE", "Full Size"),
    ("FULL-SIZE", "Full Size"),
    ("FULLSIZE", "Full Size"),
];

const ACTION_TERMS: &[(&str, &str)] = &[
    ("SEMI-AUTO", "Semi-Auto"),
    ("SEMI AUTO", "Semi-Auto"),
    ("SEMIAUTO", "Semi-Auto"),
    ("BOLT ACTION", "Bolt Action"),
    ("BOLT-ACTION", "Bolt Action"),
    ("BOLT", "Bolt Action"),
    ("PUMP", "Pump Action"),
    ("LEVER", "Lever Action"),
    ("REVOLVER", "Revolver"),
    ("SINGLE SHOT", "Single Shot"),
    ("BREAK OPEN", "Break Open"),
    ("BREAK-OPEN", "Break Open"),
];

/// `NS` and `FS` are the vendor's shorthand for night and fixed sights.
const SIGHT_TERMS: &[(&str, &str)] = &[
    ("NIGHT SIGHTS", "Night Sights"),
    ("NIGHT SIGHT", "Night Sights"),
    ("NS", "Night Sights"),
    ("FIBER OPTIC", "Fiber Optic"),
    ("OPTIC READY", "Optic Ready"),
    ("RED DOT", "Red Dot"),
    ("ADJUSTABLE SIGHTS", "Adjustable"),
    ("ADJ SIGHTS", "Adjustable"),
    ("FIXED SIGHTS", "Fixed"),
    ("FS", "Fixed"),
];

/// Attributes recovered from one description.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Attributes {
    pub caliber: Option<String>,
    pub capacity: Option<String>,
    pub barrel_length: Option<String>,
    pub finish: Option<String>,
    pub frame_size: Option<String>,
    pub action_type: Option<String>,
    pub sight_type: Option<String>,
}

/// Compiled attribute patterns. Build once per run, not per record.
pub(crate) struct AttributeExtractor {
    capacity: Regex,
    barrel_length: Regex,
}

impl AttributeExtractor {
    pub(crate) fn new() -> Self {
        Self {
            capacity: Regex::new(r"\b(\d{1,3})\s*(?:RD|RDS|ROUND|ROUNDS|SHOT)\b")
                .expect("valid capacity regex"),
            barrel_length: Regex::new(r#"\b(\d{1,2}(?:\.\d{1,2})?)\s*(?:"|IN\b|INCH(?:ES)?\b)"#)
                .expect("valid barrel length regex"),
        }
    }

    pub(crate) fn extract(&self, text: &str) -> Attributes {
        let upper = text.to_uppercase();
        Attributes {
            caliber: lookup(&upper, CALIBER_TERMS),
            capacity: self
                .capacity
                .captures(&upper)
                .and_then(|caps| caps.get(1))
                .map(|rounds| format!("{}RD", rounds.as_str())),
            barrel_length: self
                .barrel_length
                .captures(&upper)
                .and_then(|caps| caps.get(1))
                .map(|length| format!("{}\"", length.as_str())),
            finish: lookup(&upper, FINISH_TERMS),
            frame_size: lookup(&upper, FRAME_TERMS),
            action_type: lookup(&upper, ACTION_TERMS),
            sight_type: lookup(&upper, SIGHT_TERMS),
        }
    }
}

fn lookup(upper: &str, table: &[(&str, &str)]) -> Option<String> {
    table
        .iter()
        .find(|(term, _)| has_term(upper, term))
        .map(|(_, canonical)| (*canonical).to_owned())
}

/// Returns `true` when `term` occurs in `text` with a non-alphanumeric
/// character (or the string edge) on both sides.
fn has_term(text: &str, term: &str) -> bool {
    let bytes = text.as_bytes();
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find(term) {
        let start = search_from + rel;
        let end = start + term.len();
        let left_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let right_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        if left_ok && right_ok {
            return true;
        }
        search_from = start + 1;
    }
    false
}

#[cfg(test)]
#[path = "attributes_test.rs"]
mod tests;
