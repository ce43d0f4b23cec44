//! Typed rows produced by schema-validated feed parsing.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One validated row of the full inventory file.
///
/// Field names follow the vendor layout; empty feed fields become `None`
/// rather than empty strings so downstream code never has to re-check.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRecord {
    /// Distributor stock number. Guaranteed non-empty.
    pub stock_number: String,
    pub upc: Option<String>,
    /// Short catalog description. Doubles as the product title.
    pub description: String,
    /// Vendor department code, when present and numeric.
    pub department: Option<i32>,
    pub manufacturer_id: Option<String>,
    pub price_msrp: Option<Decimal>,
    /// Dealer price. Required for pricing; rows without it still parse
    /// and are rejected at normalization instead.
    pub price_wholesale: Option<Decimal>,
    pub weight_oz: Option<Decimal>,
    pub quantity: i32,
    pub model: Option<String>,
    pub manufacturer_name: Option<String>,
    pub manufacturer_part_number: Option<String>,
    /// Vendor status flag: `Allocated`, `Closeout`, or `Deleted`.
    pub status: Option<String>,
    /// Expanded marketing description.
    pub full_description: Option<String>,
    pub image_name: Option<String>,
    /// Two-letter codes of states where the item cannot be sold.
    pub restricted_states: Vec<String>,
    pub ground_ship_only: bool,
    pub adult_signature_required: bool,
    pub blocked_from_drop_ship: bool,
    pub date_entered: Option<NaiveDate>,
    /// Minimum advertised price.
    pub price_map: Option<Decimal>,
    /// `true` when the vendor image is a placeholder, not a product photo.
    pub image_disclaimer: bool,
    pub shipping_length: Option<Decimal>,
    pub shipping_width: Option<Decimal>,
    pub shipping_height: Option<Decimal>,
    pub prop65: bool,
    pub vendor_approval_required: bool,
}

/// One row of the intraday quantity file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityRecord {
    pub stock_number: String,
    pub quantity: i32,
}

/// One row of the deletions file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedRecord {
    pub stock_number: String,
    /// Description as published in the deletions file, for log context.
    pub description: String,
}
