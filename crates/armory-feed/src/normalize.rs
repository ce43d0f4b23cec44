//! Conversion from validated feed records to catalog products.
//!
//! All catalog semantics live in `armory-core`; this module wires the
//! vendor layout into them: department taxonomy, category rules, tier
//! pricing, SKU selection, and attribute extraction.

use chrono::NaiveDate;

use armory_core::pricing::{self, PriceInputs, PricingRules};
use armory_core::taxonomy;
use armory_core::{CategoryRules, Product};

use crate::attributes::AttributeExtractor;
use crate::error::FeedError;
use crate::record::InventoryRecord;

/// Items entered into the vendor catalog within this many days of `today`
/// count as new arrivals.
const NEW_ITEM_WINDOW_DAYS: i64 = 30;

/// Converts inventory records into [`Product`]s under a fixed rule set.
///
/// Build one per ingest run: category rules and attribute patterns are
/// compiled once, and `today` is pinned so every record in the run agrees
/// on what counts as a new arrival.
pub struct Normalizer {
    rules: CategoryRules,
    pricing: PricingRules,
    attributes: AttributeExtractor,
    today: NaiveDate,
}

impl Normalizer {
    #[must_use]
    pub fn new(pricing: PricingRules, today: NaiveDate) -> Self {
        Self {
            rules: CategoryRules::new(),
            pricing,
            attributes: AttributeExtractor::new(),
            today,
        }
    }

    /// Converts one record into a catalog product.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Normalization`] when the record has no usable
    /// wholesale price; every price tier derives from it.
    pub fn normalize(&self, record: &InventoryRecord) -> Result<Product, FeedError> {
        let Some(wholesale) = record.price_wholesale else {
            return Err(FeedError::Normalization {
                stock_number: record.stock_number.clone(),
                reason: "missing wholesale price".to_owned(),
            });
        };

        let tiers = pricing::price_tiers(
            PriceInputs {
                wholesale,
                map: record.price_map,
                msrp: record.price_msrp,
            },
            &self.pricing,
        )
        .map_err(|err| FeedError::Normalization {
            stock_number: record.stock_number.clone(),
            reason: err.to_string(),
        })?;

        let default_category = record
            .department
            .map_or(taxonomy::DEFAULT_CATEGORY, taxonomy::category_for_department);
        let resolution = self
            .rules
            .resolve(&record.description, record.department, default_category);

        // The local SKU is the manufacturer part number whenever the feed
        // provides one distinct from the stock number.
        let sku = record
            .manufacturer_part_number
            .as_deref()
            .filter(|mpn| *mpn != record.stock_number)
            .unwrap_or(&record.stock_number)
            .to_owned();

        // Scan the expanded description too; calibers are often spelled
        // out there and only abbreviated in the short one.
        let attrs = match &record.full_description {
            Some(full) => self
                .attributes
                .extract(&format!("{} {}", record.description, full)),
            None => self.attributes.extract(&record.description),
        };

        let status = record.status.as_deref().unwrap_or("");
        let allocated = status.eq_ignore_ascii_case("allocated");
        let closeout = status.eq_ignore_ascii_case("closeout");

        let mut tags = vec![resolution.category.clone()];
        if let Some(manufacturer) = &record.manufacturer_name {
            tags.push(manufacturer.clone());
        }
        for attr in [&attrs.caliber, &attrs.action_type] {
            if let Some(value) = attr {
                tags.push(value.clone());
            }
        }
        if allocated {
            tags.push("Allocated".to_owned());
        }
        if closeout {
            tags.push("Closeout".to_owned());
        }

        let new_item = record
            .date_entered
            .is_some_and(|entered| (self.today - entered).num_days() <= NEW_ITEM_WINDOW_DAYS);

        // A disclaimer image is a vendor placeholder, not a product photo.
        let image_name = if record.image_disclaimer {
            None
        } else {
            record.image_name.clone()
        };

        Ok(Product {
            rsr_stock_number: record.stock_number.clone(),
            sku,
            upc: record.upc.clone(),
            name: record.description.clone(),
            description: Some(record.description.clone()),
            full_description: record.full_description.clone(),
            category: resolution.category,
            department_number: record.department,
            // Not present in the inventory layout; carried for data sourced
            // from the vendor attribute files.
            subcategory_name: None,
            manufacturer: record.manufacturer_name.clone(),
            manufacturer_part_number: record.manufacturer_part_number.clone(),
            model: record.model.clone(),
            price_wholesale: wholesale,
            price_map: record.price_map,
            price_msrp: record.price_msrp,
            price_bronze: tiers.bronze,
            price_gold: tiers.gold,
            price_platinum: tiers.platinum,
            stock_quantity: record.quantity,
            in_stock: record.quantity > 0,
            allocated,
            drop_shippable: !record.blocked_from_drop_ship,
            requires_ffl: record.department.is_some_and(taxonomy::requires_ffl),
            caliber: attrs.caliber,
            capacity: attrs.capacity,
            barrel_length: attrs.barrel_length,
            finish: attrs.finish,
            frame_size: attrs.frame_size,
            action_type: attrs.action_type,
            sight_type: attrs.sight_type,
            weight_oz: record.weight_oz,
            image_name,
            tags,
            state_restrictions: record.restricted_states.clone(),
            ground_ship_only: record.ground_ship_only,
            adult_signature_required: record.adult_signature_required,
            prop65: record.prop65,
            new_item,
            date_entered: record.date_entered,
        })
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
