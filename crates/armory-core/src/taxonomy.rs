//! Canonical vendor-department taxonomy.
//!
//! The distributor tags every feed record with a numeric department code
//! (zero-padded in the wire format). This module is the single mapping from
//! those codes to storefront categories and compliance flags; nothing else in
//! the workspace hard-codes department semantics.

/// Category used when a department code is unknown or absent.
pub const DEFAULT_CATEGORY: &str = "Accessories";

/// Parse a raw department field into a department number.
///
/// The feed zero-pads codes (`"01"`, `"05"`); both padded and bare forms
/// parse to the same number. Returns `None` for empty or non-numeric input.
#[must_use]
pub fn parse_department(code: &str) -> Option<i32> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i32>().ok()
}

/// The canonical department → category mapping.
///
/// Unknown departments fall back to [`DEFAULT_CATEGORY`].
#[must_use]
pub fn category_for_department(department: i32) -> &'static str {
    match department {
        1 => "Handguns",
        2 => "Used Handguns",
        3 => "Used Long Guns",
        4 => "Tasers",
        5 => "Long Guns",
        6 => "NFA Products",
        7 => "Black Powder",
        8 => "Optics",
        9 | 31 => "Optical Accessories",
        10 => "Magazines",
        11 => "Grips, Pads, Stocks, Bipods",
        12 => "Soft Gun Cases, Packs, Bags",
        13 => "Misc. Accessories",
        14 => "Holsters & Pouches",
        15 => "Reloading Equipment",
        16 => "Black Powder Accessories",
        17 => "Closeout Accessories",
        18 => "Ammunition",
        19 => "Survival & Camping Supplies",
        20 => "Lights, Lasers & Batteries",
        21 => "Cleaning Equipment",
        22 => "Airguns",
        23 => "Knives & Tools",
        24 => "High Capacity Magazines",
        25 => "Safes & Security",
        26 => "Safety & Protection",
        27 => "Non-Lethal Defense",
        28 => "Binoculars",
        29 => "Spotting Scopes",
        30 => "Sights",
        32 => "Barrels, Choke Tubes & Muzzle Devices",
        33 => "Clothing",
        34 => "Parts",
        35 => "Slings & Swivels",
        36 => "Electronics",
        38 => "Books, Software & DVDs",
        39 => "Targets",
        40 => "Hard Gun Cases",
        41 => "Upper Receivers & Conversion Kits",
        42 => "SBR Barrels & Upper Receivers",
        43 => "Upper Receivers & Conversion Kits - High Capacity",
        _ => DEFAULT_CATEGORY,
    }
}

/// Whether products in this department must transfer through an FFL dealer.
#[must_use]
pub fn requires_ffl(department: i32) -> bool {
    matches!(department, 1 | 2 | 3 | 5 | 6 | 7 | 41 | 42 | 43)
}

/// Whether this department holds complete firearms (as opposed to receivers,
/// parts, or accessories). Used by the rules engine to refuse accessory
/// fallbacks for guns.
#[must_use]
pub fn is_firearm_department(department: i32) -> bool {
    matches!(department, 1 | 2 | 3 | 5 | 6 | 7)
}
