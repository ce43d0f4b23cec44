//! The indexed document shape and the canonical index settings.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use armory_core::Product;

/// A catalog product as the search index stores it.
///
/// `objectID` is the vendor stock number: it never changes, so SKU repair
/// and category moves are content updates rather than identity changes.
/// Tier prices travel as two-decimal strings, rendered verbatim by the
/// storefront. `contentHash` is the product's stored fingerprint (see
/// [`Product::content_hash`]); reconciliation compares it against the
/// database without rebuilding documents.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDoc {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub sku: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mpn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upc: Option<String>,
    pub price_bronze: String,
    pub price_gold: String,
    pub price_platinum: String,
    pub in_stock: bool,
    pub quantity: i32,
    pub drop_shippable: bool,
    #[serde(rename = "requiresFFL")]
    pub requires_ffl: bool,
    pub new_item: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caliber: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barrel_length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sight_type: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    pub state_restrictions: Vec<String>,
    pub content_hash: String,
}

impl From<&Product> for ProductDoc {
    fn from(product: &Product) -> Self {
        fn money(value: Decimal) -> String {
            format!("{value:.2}")
        }

        Self {
            object_id: product.rsr_stock_number.clone(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            subcategory: product.subcategory_name.clone(),
            manufacturer: product.manufacturer.clone(),
            mpn: product.manufacturer_part_number.clone(),
            upc: product.upc.clone(),
            price_bronze: money(product.price_bronze),
            price_gold: money(product.price_gold),
            price_platinum: money(product.price_platinum),
            in_stock: product.in_stock,
            quantity: product.stock_quantity,
            drop_shippable: product.drop_shippable,
            requires_ffl: product.requires_ffl,
            new_item: product.new_item,
            caliber: product.caliber.clone(),
            capacity: product.capacity.clone(),
            barrel_length: product.barrel_length.clone(),
            finish: product.finish.clone(),
            frame_size: product.frame_size.clone(),
            action_type: product.action_type.clone(),
            sight_type: product.sight_type.clone(),
            tags: product.tags.clone(),
            image_name: product.image_name.clone(),
            state_restrictions: product.state_restrictions.clone(),
            content_hash: product.content_hash(),
        }
    }
}

/// The one source of truth for index settings.
///
/// `index settings` pushes exactly this document; changing search behavior
/// means changing it here and re-running that command.
#[must_use]
pub fn index_settings() -> Value {
    serde_json::json!({
        "searchableAttributes": [
            "unordered(name)",
            "unordered(sku)",
            "unordered(mpn)",
            "unordered(upc)",
            "unordered(manufacturer)",
            "unordered(category)",
            "unordered(tags)"
        ],
        "attributesForFaceting": [
            "searchable(category)",
            "searchable(manufacturer)",
            "inStock",
            "filterOnly(requiresFFL)",
            "caliber",
            "actionType",
            "finish",
            "priceBronze"
        ],
        "customRanking": [
            "desc(inStock)",
            "asc(priceBronze)"
        ],
        "hitsPerPage": 24,
        "paginationLimitedTo": 1000
    })
}
