//! Tier-price derivation from vendor reference prices.
//!
//! Every customer-facing price is derived here and nowhere else: platinum
//! anchors to the dealer (wholesale) price, gold to MAP, bronze to MSRP,
//! with documented fallbacks when the vendor omits a reference price. The
//! rules themselves ship as code defaults and may be overridden by a YAML
//! file (`ARMORY_PRICING_RULES`), validated on load.

use std::path::Path;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupKind {
    Flat,
    Percentage,
}

/// Markup applied on top of a tier's anchor price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierMarkup {
    pub kind: MarkupKind,
    pub value: Decimal,
}

/// The pricing rule set. One instance is the source of truth for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRules {
    pub bronze: TierMarkup,
    pub gold: TierMarkup,
    pub platinum: TierMarkup,
    /// Below this anchor price the percentage regime applies regardless of
    /// the configured markup kind.
    pub price_threshold: Decimal,
    pub low_price_bronze_pct: Decimal,
    pub low_price_gold_pct: Decimal,
    pub low_price_platinum_pct: Decimal,
}

impl Default for PricingRules {
    fn default() -> Self {
        fn flat_twenty() -> TierMarkup {
            TierMarkup {
                kind: MarkupKind::Flat,
                value: Decimal::new(2000, 2),
            }
        }
        Self {
            bronze: flat_twenty(),
            gold: flat_twenty(),
            platinum: flat_twenty(),
            price_threshold: Decimal::new(1000, 2),
            low_price_bronze_pct: Decimal::new(2500, 2),
            low_price_gold_pct: Decimal::new(1500, 2),
            low_price_platinum_pct: Decimal::new(500, 2),
        }
    }
}

/// Vendor reference prices for one product, as parsed from the feed.
#[derive(Debug, Clone, Copy)]
pub struct PriceInputs {
    pub wholesale: Decimal,
    pub map: Option<Decimal>,
    pub msrp: Option<Decimal>,
}

/// The three derived customer-facing prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPricing {
    pub bronze: Decimal,
    pub gold: Decimal,
    pub platinum: Decimal,
}

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("wholesale price must be positive, got {wholesale}")]
    NonPositiveWholesale { wholesale: Decimal },
}

/// Load pricing rules, falling back to the built-in defaults when no
/// override file is configured.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_pricing_rules(path: Option<&Path>) -> Result<PricingRules, ConfigError> {
    let Some(path) = path else {
        return Ok(PricingRules::default());
    };

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RulesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let rules: PricingRules = serde_yaml::from_str(&content)?;
    validate_rules(&rules)?;
    Ok(rules)
}

fn validate_rules(rules: &PricingRules) -> Result<(), ConfigError> {
    let tiers = [
        ("bronze", &rules.bronze),
        ("gold", &rules.gold),
        ("platinum", &rules.platinum),
    ];
    for (name, markup) in tiers {
        if markup.value.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "{name} markup value must be non-negative, got {}",
                markup.value
            )));
        }
    }
    if rules.price_threshold.is_sign_negative() {
        return Err(ConfigError::Validation(format!(
            "price_threshold must be non-negative, got {}",
            rules.price_threshold
        )));
    }
    for (name, pct) in [
        ("low_price_bronze_pct", rules.low_price_bronze_pct),
        ("low_price_gold_pct", rules.low_price_gold_pct),
        ("low_price_platinum_pct", rules.low_price_platinum_pct),
    ] {
        if pct.is_sign_negative() || pct > Decimal::ONE_HUNDRED {
            return Err(ConfigError::Validation(format!(
                "{name} must be between 0 and 100, got {pct}"
            )));
        }
    }
    Ok(())
}

/// Derive the three tier prices for one product.
///
/// Anchors: platinum ← wholesale, gold ← MAP, bronze ← MSRP. Without MAP the
/// gold anchor is the wholesale/MSRP midpoint; with only a wholesale price
/// the gold and bronze anchors are wholesale +15% and +30%. After markup the
/// tiers are clamped so `bronze ≥ gold ≥ platinum` holds even on dirty
/// vendor data (MAP above MSRP happens), then rounded half-up to cents.
///
/// # Errors
///
/// Returns [`PricingError::NonPositiveWholesale`] when the feed carries no
/// usable wholesale price; such records are rejected, not priced.
pub fn price_tiers(inputs: PriceInputs, rules: &PricingRules) -> Result<TierPricing, PricingError> {
    if inputs.wholesale <= Decimal::ZERO {
        return Err(PricingError::NonPositiveWholesale {
            wholesale: inputs.wholesale,
        });
    }

    let wholesale = inputs.wholesale;
    let (platinum_anchor, gold_anchor, bronze_anchor) = match (inputs.map, inputs.msrp) {
        (Some(map), Some(msrp)) => (wholesale, map, msrp),
        (None, Some(msrp)) => (wholesale, (wholesale + msrp) / Decimal::TWO, msrp),
        _ => (
            wholesale,
            wholesale * Decimal::new(115, 2),
            wholesale * Decimal::new(130, 2),
        ),
    };

    let bronze = apply_markup(
        bronze_anchor,
        &rules.bronze,
        rules.price_threshold,
        rules.low_price_bronze_pct,
    );
    let gold = apply_markup(
        gold_anchor,
        &rules.gold,
        rules.price_threshold,
        rules.low_price_gold_pct,
    );
    let platinum = apply_markup(
        platinum_anchor,
        &rules.platinum,
        rules.price_threshold,
        rules.low_price_platinum_pct,
    );

    let bronze = round_cents(bronze);
    let gold = round_cents(gold).min(bronze);
    let platinum = round_cents(platinum).min(gold);

    Ok(TierPricing {
        bronze,
        gold,
        platinum,
    })
}

fn apply_markup(base: Decimal, markup: &TierMarkup, threshold: Decimal, low_pct: Decimal) -> Decimal {
    if base < threshold {
        return base * (Decimal::ONE + low_pct / Decimal::ONE_HUNDRED);
    }
    match markup.kind {
        MarkupKind::Percentage => base * (Decimal::ONE + markup.value / Decimal::ONE_HUNDRED),
        MarkupKind::Flat => base + markup.value,
    }
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
#[path = "pricing_test.rs"]
mod tests;
