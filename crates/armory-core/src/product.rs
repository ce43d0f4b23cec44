use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A catalog product normalized from the distributor feed.
///
/// This is the canonical in-memory shape; the relational row and the search
/// document are both projections of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Distributor stock number — the stable vendor identifier and the
    /// natural key for upserts. Never reassigned.
    pub rsr_stock_number: String,
    /// Locally assigned identifier. Must be the manufacturer part number
    /// whenever the feed provides one distinct from the stock number.
    pub sku: String,
    pub upc: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// Vendor's expanded marketing description, when present.
    pub full_description: Option<String>,
    pub category: String,
    /// Vendor department code, normalized (leading zeros stripped).
    pub department_number: Option<i32>,
    pub subcategory_name: Option<String>,
    pub manufacturer: Option<String>,
    pub manufacturer_part_number: Option<String>,
    pub model: Option<String>,
    /// Dealer (wholesale) price from the feed.
    pub price_wholesale: Decimal,
    /// Minimum advertised price, when the vendor publishes one.
    pub price_map: Option<Decimal>,
    pub price_msrp: Option<Decimal>,
    pub price_bronze: Decimal,
    pub price_gold: Decimal,
    /// Wholesale-member tier. Present on every product but never rendered
    /// for anonymous storefront traffic.
    pub price_platinum: Decimal,
    pub stock_quantity: i32,
    pub in_stock: bool,
    /// Vendor has the item on allocation (constrained supply).
    pub allocated: bool,
    pub drop_shippable: bool,
    pub requires_ffl: bool,
    pub caliber: Option<String>,
    pub capacity: Option<String>,
    pub barrel_length: Option<String>,
    pub finish: Option<String>,
    pub frame_size: Option<String>,
    pub action_type: Option<String>,
    pub sight_type: Option<String>,
    /// Shipping weight in ounces, as the feed reports it.
    pub weight_oz: Option<Decimal>,
    /// Vendor image file name (e.g. `"GLOCK19GEN5.jpg"`).
    pub image_name: Option<String>,
    pub tags: Vec<String>,
    /// Two-letter codes of states where the vendor bars shipment.
    pub state_restrictions: Vec<String>,
    pub ground_ship_only: bool,
    pub adult_signature_required: bool,
    pub prop65: bool,
    pub new_item: bool,
    pub date_entered: Option<NaiveDate>,
}

impl Product {
    /// Returns `true` when the local identifier is a real manufacturer part
    /// number rather than a fallback copy of the vendor stock number.
    #[must_use]
    pub fn has_distinct_sku(&self) -> bool {
        self.sku != self.rsr_stock_number
    }

    /// Returns `true` when this row violates the identity invariant: the SKU
    /// collapsed onto the vendor stock number even though the feed carries a
    /// usable manufacturer part number.
    #[must_use]
    pub fn sku_is_corrupted(&self) -> bool {
        if self.has_distinct_sku() {
            return false;
        }
        self.manufacturer_part_number
            .as_deref()
            .is_some_and(|mpn| !mpn.trim().is_empty() && mpn != self.rsr_stock_number)
    }

    /// Returns `true` if shipment to the given two-letter state code is barred.
    #[must_use]
    pub fn restricted_in(&self, state: &str) -> bool {
        self.state_restrictions.iter().any(|s| s == state)
    }

    /// Stable fingerprint over every feed-derived field, hex-encoded SHA-256.
    ///
    /// The relational row stores this value and the search document carries
    /// it, so idempotent upserts and index reconciliation both reduce to a
    /// string compare. Money fields are formatted to two decimal places so
    /// decimal-scale differences between parsed and stored values cannot
    /// change the hash.
    #[must_use]
    pub fn content_hash(&self) -> String {
        fn money(value: Decimal) -> String {
            format!("{value:.2}")
        }
        fn opt_money(value: Option<Decimal>) -> String {
            value.map_or(String::new(), money)
        }
        fn opt(value: Option<&str>) -> String {
            value.unwrap_or_default().to_string()
        }

        let fields = [
            self.rsr_stock_number.clone(),
            self.sku.clone(),
            opt(self.upc.as_deref()),
            self.name.clone(),
            opt(self.description.as_deref()),
            opt(self.full_description.as_deref()),
            self.category.clone(),
            self.department_number.map_or(String::new(), |d| d.to_string()),
            opt(self.subcategory_name.as_deref()),
            opt(self.manufacturer.as_deref()),
            opt(self.manufacturer_part_number.as_deref()),
            opt(self.model.as_deref()),
            money(self.price_wholesale),
            opt_money(self.price_map),
            opt_money(self.price_msrp),
            money(self.price_bronze),
            money(self.price_gold),
            money(self.price_platinum),
            self.stock_quantity.to_string(),
            self.in_stock.to_string(),
            self.allocated.to_string(),
            self.drop_shippable.to_string(),
            self.requires_ffl.to_string(),
            opt(self.caliber.as_deref()),
            opt(self.capacity.as_deref()),
            opt(self.barrel_length.as_deref()),
            opt(self.finish.as_deref()),
            opt(self.frame_size.as_deref()),
            opt(self.action_type.as_deref()),
            opt(self.sight_type.as_deref()),
            opt_money(self.weight_oz),
            opt(self.image_name.as_deref()),
            self.tags.join(","),
            self.state_restrictions.join(","),
            self.ground_ship_only.to_string(),
            self.adult_signature_required.to_string(),
            self.prop65.to_string(),
            self.new_item.to_string(),
            self.date_entered.map_or(String::new(), |d| d.to_string()),
        ];

        let input = fields.join("\x00");
        format!("{:x}", Sha256::digest(input.as_bytes()))
    }
}
