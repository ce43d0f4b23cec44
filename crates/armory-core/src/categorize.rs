//! Category rules engine.
//!
//! One ordered rule set decides catalog placement for every product. Rules
//! run in a fixed precedence, the first match wins, and every outcome carries
//! a machine-readable reason so report and apply flows can explain a move.
//! Firearm departments never resolve to an accessory bucket.

use regex::Regex;
use serde::Serialize;

use crate::product::Product;
use crate::taxonomy::{self, DEFAULT_CATEGORY};

/// Department code the vendor reserves for NFA-regulated items.
const NFA_DEPARTMENT: i32 = 6;

/// Name patterns that mark an item as a firearm model even when the name
/// also contains accessory words ("GLOCK 19 GEN5 W/ EXTENDED GRIP" is still
/// a pistol). Matched against the lowercased name.
const FIREARM_MODEL_PATTERNS: &[&str] = &[
    r"glock\s*\d+",
    r"sig\s*(p\d+|m\d+)",
    r"m&p",
    r"ruger\s*(lcp|sr\d+|gp\d+|security)",
    r"colt\s*(1911|python|anaconda)",
    r"beretta\s*(92|m9|apx)",
    r"\bar-?\d+",
    r"\bak-?\d+",
    r"\bm(1|4|16)\b",
    r"\d+(\.\d+)?\s*(mm|acp|mag|special|gauge|ga)\s+(pistol|rifle|shotgun|revolver|carbine)",
];

/// Words that mark an item as an accessory rather than a firearm. Substring
/// matched, so short words that appear inside gun names (ring in derringer)
/// must stay out of this list.
const ACCESSORY_KEYWORDS: &[&str] = &[
    "scope", "optic", "sight", "red dot", "mount", "rail", "magazine",
    "grip", "stock", "pad", "bipod", "holster", "pouch", "case", "bag",
    "pack", "light", "laser", "battery", "cleaning", "brush", "solvent",
    "kit", "sling", "swivel", "target", "choke tube",
];

/// Words that mark an item as a gun part.
const PART_KEYWORDS: &[&str] = &[
    "trigger", "spring", "barrel", "upper", "lower", "receiver",
];

/// Categories that hold complete firearms. An item parked in one of these is
/// treated as a firearm placement for rescue purposes.
const FIREARM_CATEGORIES: &[&str] = &[
    "Handguns",
    "Used Handguns",
    "Long Guns",
    "Used Long Guns",
    "Rifles",
    "Shotguns",
    "NFA Products",
    "Black Powder",
];

const SHOTGUN_GAUGES: &[&str] = &[
    "12 ga", "12ga", "16 ga", "16ga", "20 ga", "20ga", "28 ga", "28ga",
    "10 ga", "10ga", ".410", "410 bore",
];

const SHOTGUN_KEYWORDS: &[&str] = &["shotgun", "side by side", "over under", "o/u", "sxs"];

/// Outcome of running the rules for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub category: String,
    /// Which rule decided the category, e.g. `"accessory-keyword"`.
    pub reason: &'static str,
}

/// Audit record for one recategorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryChange {
    pub rsr_stock_number: String,
    pub sku: String,
    pub name: String,
    pub from: String,
    pub to: String,
    pub reason: &'static str,
}

/// The compiled rule set. Build once, run per product.
pub struct CategoryRules {
    firearm_models: Vec<Regex>,
}

impl CategoryRules {
    #[must_use]
    pub fn new() -> Self {
        let firearm_models = FIREARM_MODEL_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern).expect("valid firearm model regex"))
            .collect();
        Self { firearm_models }
    }

    /// Decide the category for a product given its name, vendor department,
    /// and currently stored category. Always returns a resolution; when no
    /// rule fires the current category is kept (reason `"unchanged"`).
    #[must_use]
    pub fn resolve(&self, name: &str, department: Option<i32>, current: &str) -> Resolution {
        let lower = name.to_lowercase();
        let firearm_placement = is_firearm_placement(current, department);

        // NFA department, or NFA words on an item placed as a firearm.
        if department == Some(NFA_DEPARTMENT) || (firearm_placement && is_nfa(&lower)) {
            return Resolution {
                category: "NFA Products".to_string(),
                reason: "nfa-item",
            };
        }

        // Accessory rescue runs before the firearm department rules: accessory
        // words pull an item out of a firearm placement unless the name reads
        // like a firearm model. A firearm-department item may only be rescued
        // into a concrete bucket, never the catch-all.
        if firearm_placement
            && has_accessory_keyword(&lower)
            && !self.matches_firearm_model(&lower)
        {
            let category = accessory_category(&lower);
            if category != DEFAULT_CATEGORY
                || !department.is_some_and(taxonomy::is_firearm_department)
            {
                return Resolution {
                    category: category.to_string(),
                    reason: "accessory-keyword",
                };
            }
        }

        if department == Some(1) {
            return Resolution {
                category: "Handguns".to_string(),
                reason: "handgun-department",
            };
        }

        if department == Some(5) {
            return Resolution {
                category: long_gun_category(&lower).to_string(),
                reason: "long-gun-department",
            };
        }

        // Part words relocate items sitting in a firearm placement or the
        // default bucket. Departments that own these words (barrels, uppers)
        // already carry a real category and are left alone.
        if (firearm_placement || current.is_empty() || current == DEFAULT_CATEGORY)
            && has_part_keyword(&lower)
        {
            return Resolution {
                category: part_category(&lower).to_string(),
                reason: "parts-keyword",
            };
        }

        // Remaining firearm departments (used guns, black powder) pin to
        // their taxonomy slot so a firearm can never sit in Accessories.
        if let Some(dept) = department.filter(|d| taxonomy::is_firearm_department(*d)) {
            return Resolution {
                category: taxonomy::category_for_department(dept).to_string(),
                reason: "firearm-department",
            };
        }

        if !current.is_empty() && current != DEFAULT_CATEGORY {
            return Resolution {
                category: current.to_string(),
                reason: "unchanged",
            };
        }

        let fallback = department.map_or(DEFAULT_CATEGORY, taxonomy::category_for_department);
        Resolution {
            category: fallback.to_string(),
            reason: "department-default",
        }
    }

    /// Run the rules for one product and report the move, if any.
    #[must_use]
    pub fn analyze(&self, product: &Product) -> Option<CategoryChange> {
        let resolution = self.resolve(&product.name, product.department_number, &product.category);
        if resolution.category == product.category {
            return None;
        }
        Some(CategoryChange {
            rsr_stock_number: product.rsr_stock_number.clone(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            from: product.category.clone(),
            to: resolution.category,
            reason: resolution.reason,
        })
    }

    fn matches_firearm_model(&self, lower: &str) -> bool {
        self.firearm_models.iter().any(|re| re.is_match(lower))
    }
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self::new()
    }
}

fn is_firearm_placement(current: &str, department: Option<i32>) -> bool {
    FIREARM_CATEGORIES.contains(&current)
        || department.is_some_and(taxonomy::is_firearm_department)
}

fn is_nfa(lower: &str) -> bool {
    lower.contains("suppressor")
        || lower.contains("silencer")
        || lower.contains("short barrel")
        || has_word(lower, "sbr")
}

fn has_accessory_keyword(lower: &str) -> bool {
    ACCESSORY_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn has_part_keyword(lower: &str) -> bool {
    PART_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Subdivide a rescued accessory by its strongest keyword, first match wins.
fn accessory_category(lower: &str) -> &'static str {
    if lower.contains("magazine") || has_word(lower, "mag") {
        return "Magazines";
    }
    if lower.contains("scope")
        || lower.contains("optic")
        || lower.contains("sight")
        || lower.contains("red dot")
    {
        return "Optics";
    }
    if lower.contains("holster") || lower.contains("pouch") {
        return "Holsters & Pouches";
    }
    if lower.contains("case") || lower.contains("bag") || lower.contains("pack") {
        if lower.contains("hard") {
            return "Hard Gun Cases";
        }
        return "Soft Gun Cases, Packs, Bags";
    }
    if lower.contains("cleaning") || lower.contains("brush") || lower.contains("solvent") {
        return "Cleaning Equipment";
    }
    if lower.contains("grip")
        || lower.contains("stock")
        || lower.contains("pad")
        || lower.contains("bipod")
    {
        return "Grips, Pads, Stocks, Bipods";
    }
    if lower.contains("light") || lower.contains("laser") || lower.contains("battery") {
        return "Lights, Lasers & Batteries";
    }
    if lower.contains("sling") || lower.contains("swivel") {
        return "Slings & Swivels";
    }
    if has_part_keyword(lower) {
        return part_category(lower);
    }
    DEFAULT_CATEGORY
}

fn part_category(lower: &str) -> &'static str {
    if lower.contains("upper") {
        return "Upper Receivers & Conversion Kits";
    }
    "Parts"
}

/// Department 5 holds every long gun. Split on shotgun evidence; rifle
/// evidence and the department default agree on `Rifles`, so only shotgun
/// markers need checking. Receiver and part words are checked first because
/// stripped uppers and barrels ship under this department too.
fn long_gun_category(lower: &str) -> &'static str {
    if has_part_keyword(lower) {
        return part_category(lower);
    }
    if is_shotgun(lower) {
        return "Shotguns";
    }
    "Rifles"
}

fn is_shotgun(lower: &str) -> bool {
    SHOTGUN_GAUGES.iter().any(|g| lower.contains(g))
        || SHOTGUN_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn has_word(lower: &str, word: &str) -> bool {
    lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|w| w == word)
}

#[cfg(test)]
#[path = "categorize_test.rs"]
mod tests;
