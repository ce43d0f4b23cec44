//! Database operations for the `products` table.
//!
//! All writes go through [`upsert_product`], keyed on the vendor stock
//! number and gated on the content hash, so replays of the same feed are
//! no-ops and `updated_at` only moves when a field actually changed.

use armory_core::pricing::TierPricing;
use armory_core::Product;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

const PRODUCT_COLUMNS: &str =
    "id, rsr_stock_number, sku, upc, name, description, full_description, \
     category, department_number, subcategory_name, manufacturer, \
     manufacturer_part_number, model, price_wholesale, price_map, price_msrp, \
     price_bronze, price_gold, price_platinum, stock_quantity, in_stock, \
     allocated, drop_shippable, requires_ffl, caliber, capacity, \
     barrel_length, finish, frame_size, action_type, sight_type, weight_oz, \
     image_name, tags, state_restrictions, ground_ship_only, \
     adult_signature_required, prop65, new_item, date_entered, content_hash, \
     created_at, updated_at";

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub rsr_stock_number: String,
    pub sku: String,
    pub upc: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub full_description: Option<String>,
    pub category: String,
    pub department_number: Option<i32>,
    pub subcategory_name: Option<String>,
    pub manufacturer: Option<String>,
    pub manufacturer_part_number: Option<String>,
    pub model: Option<String>,
    pub price_wholesale: Decimal,
    pub price_map: Option<Decimal>,
    pub price_msrp: Option<Decimal>,
    pub price_bronze: Decimal,
    pub price_gold: Decimal,
    pub price_platinum: Decimal,
    pub stock_quantity: i32,
    pub in_stock: bool,
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
    pub weight_oz: Option<Decimal>,
    pub image_name: Option<String>,
    pub tags: Vec<String>,
    pub state_restrictions: Vec<String>,
    pub ground_ship_only: bool,
    pub adult_signature_required: bool,
    pub prop65: bool,
    pub new_item: bool,
    pub date_entered: Option<NaiveDate>,
    /// Fingerprint of the feed-derived fields as stored. See
    /// [`Product::content_hash`].
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            rsr_stock_number: row.rsr_stock_number,
            sku: row.sku,
            upc: row.upc,
            name: row.name,
            description: row.description,
            full_description: row.full_description,
            category: row.category,
            department_number: row.department_number,
            subcategory_name: row.subcategory_name,
            manufacturer: row.manufacturer,
            manufacturer_part_number: row.manufacturer_part_number,
            model: row.model,
            price_wholesale: row.price_wholesale,
            price_map: row.price_map,
            price_msrp: row.price_msrp,
            price_bronze: row.price_bronze,
            price_gold: row.price_gold,
            price_platinum: row.price_platinum,
            stock_quantity: row.stock_quantity,
            in_stock: row.in_stock,
            allocated: row.allocated,
            drop_shippable: row.drop_shippable,
            requires_ffl: row.requires_ffl,
            caliber: row.caliber,
            capacity: row.capacity,
            barrel_length: row.barrel_length,
            finish: row.finish,
            frame_size: row.frame_size,
            action_type: row.action_type,
            sight_type: row.sight_type,
            weight_oz: row.weight_oz,
            image_name: row.image_name,
            tags: row.tags,
            state_restrictions: row.state_restrictions,
            ground_ship_only: row.ground_ship_only,
            adult_signature_required: row.adult_signature_required,
            prop65: row.prop65,
            new_item: row.new_item,
            date_entered: row.date_entered,
        }
    }
}

/// Lightweight projection for index reconciliation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StockHashRow {
    pub rsr_stock_number: String,
    pub content_hash: String,
}

/// Product totals for status output.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct ProductCounts {
    pub total: i64,
    pub in_stock: i64,
}

/// How an upsert landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// The stored content hash already matched; the row was left untouched.
    Unchanged,
}

/// How a targeted single-row mutation landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutateOutcome {
    Updated,
    /// The mutation produced no field change; the row was left untouched.
    Unchanged,
    /// No row exists for the stock number.
    Missing,
}

// ---------------------------------------------------------------------------
// products operations
// ---------------------------------------------------------------------------

/// Upserts a product row keyed on `rsr_stock_number`.
///
/// The update is gated on the content hash: when the stored hash equals the
/// incoming one, nothing is written and `updated_at` keeps its old value, so
/// replaying an unchanged feed is a no-op row by row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_product(pool: &PgPool, product: &Product) -> Result<UpsertOutcome, DbError> {
    let content_hash = product.content_hash();

    // On insert created_at and updated_at share the transaction timestamp;
    // any later update moves updated_at. The unchanged case returns no row
    // because the DO UPDATE WHERE gate filters it out.
    let inserted: Option<bool> = sqlx::query_scalar::<_, bool>(
        "INSERT INTO products \
             (rsr_stock_number, sku, upc, name, description, full_description, \
              category, department_number, subcategory_name, manufacturer, \
              manufacturer_part_number, model, price_wholesale, price_map, \
              price_msrp, price_bronze, price_gold, price_platinum, \
              stock_quantity, in_stock, allocated, drop_shippable, \
              requires_ffl, caliber, capacity, barrel_length, finish, \
              frame_size, action_type, sight_type, weight_oz, image_name, \
              tags, state_restrictions, ground_ship_only, \
              adult_signature_required, prop65, new_item, date_entered, \
              content_hash) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, \
                 $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, \
                 $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, \
                 $31, $32, $33, $34, $35, $36, $37, $38, $39, $40) \
         ON CONFLICT (rsr_stock_number) DO UPDATE SET \
             sku                      = EXCLUDED.sku, \
             upc                      = EXCLUDED.upc, \
             name                     = EXCLUDED.name, \
             description              = EXCLUDED.description, \
             full_description         = EXCLUDED.full_description, \
             category                 = EXCLUDED.category, \
             department_number        = EXCLUDED.department_number, \
             subcategory_name         = EXCLUDED.subcategory_name, \
             manufacturer             = EXCLUDED.manufacturer, \
             manufacturer_part_number = EXCLUDED.manufacturer_part_number, \
             model                    = EXCLUDED.model, \
             price_wholesale          = EXCLUDED.price_wholesale, \
             price_map                = EXCLUDED.price_map, \
             price_msrp               = EXCLUDED.price_msrp, \
             price_bronze             = EXCLUDED.price_bronze, \
             price_gold               = EXCLUDED.price_gold, \
             price_platinum           = EXCLUDED.price_platinum, \
             stock_quantity           = EXCLUDED.stock_quantity, \
             in_stock                 = EXCLUDED.in_stock, \
             allocated                = EXCLUDED.allocated, \
             drop_shippable           = EXCLUDED.drop_shippable, \
             requires_ffl             = EXCLUDED.requires_ffl, \
             caliber                  = EXCLUDED.caliber, \
             capacity                 = EXCLUDED.capacity, \
             barrel_length            = EXCLUDED.barrel_length, \
             finish                   = EXCLUDED.finish, \
             frame_size               = EXCLUDED.frame_size, \
             action_type              = EXCLUDED.action_type, \
             sight_type               = EXCLUDED.sight_type, \
             weight_oz                = EXCLUDED.weight_oz, \
             image_name               = EXCLUDED.image_name, \
             tags                     = EXCLUDED.tags, \
             state_restrictions       = EXCLUDED.state_restrictions, \
             ground_ship_only         = EXCLUDED.ground_ship_only, \
             adult_signature_required = EXCLUDED.adult_signature_required, \
             prop65                   = EXCLUDED.prop65, \
             new_item                 = EXCLUDED.new_item, \
             date_entered             = EXCLUDED.date_entered, \
             content_hash             = EXCLUDED.content_hash, \
             updated_at               = NOW() \
         WHERE products.content_hash IS DISTINCT FROM EXCLUDED.content_hash \
         RETURNING (created_at = updated_at)",
    )
    .bind(&product.rsr_stock_number)
    .bind(&product.sku)
    .bind(&product.upc)
    .bind(&product.name)
    .bind(&product.description)
    .bind(&product.full_description)
    .bind(&product.category)
    .bind(product.department_number)
    .bind(&product.subcategory_name)
    .bind(&product.manufacturer)
    .bind(&product.manufacturer_part_number)
    .bind(&product.model)
    .bind(product.price_wholesale)
    .bind(product.price_map)
    .bind(product.price_msrp)
    .bind(product.price_bronze)
    .bind(product.price_gold)
    .bind(product.price_platinum)
    .bind(product.stock_quantity)
    .bind(product.in_stock)
    .bind(product.allocated)
    .bind(product.drop_shippable)
    .bind(product.requires_ffl)
    .bind(&product.caliber)
    .bind(&product.capacity)
    .bind(&product.barrel_length)
    .bind(&product.finish)
    .bind(&product.frame_size)
    .bind(&product.action_type)
    .bind(&product.sight_type)
    .bind(product.weight_oz)
    .bind(&product.image_name)
    .bind(&product.tags)
    .bind(&product.state_restrictions)
    .bind(product.ground_ship_only)
    .bind(product.adult_signature_required)
    .bind(product.prop65)
    .bind(product.new_item)
    .bind(product.date_entered)
    .bind(&content_hash)
    .fetch_optional(pool)
    .await?;

    Ok(match inserted {
        Some(true) => UpsertOutcome::Inserted,
        Some(false) => UpsertOutcome::Updated,
        None => UpsertOutcome::Unchanged,
    })
}

/// Returns one page of products ordered by stock number.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<ProductRow>, DbError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         ORDER BY rsr_stock_number \
         LIMIT $1 OFFSET $2"
    );
    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns the products matching the given vendor stock numbers.
///
/// Missing stock numbers are silently absent from the result; callers that
/// care about the difference compare lengths.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products_by_stock_numbers(
    pool: &PgPool,
    stock_numbers: &[String],
) -> Result<Vec<ProductRow>, DbError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE rsr_stock_number = ANY($1) \
         ORDER BY rsr_stock_number"
    );
    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(stock_numbers)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns `(stock number, content hash)` for every product, ordered by
/// stock number. This is the local side of index reconciliation.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_stock_hashes(pool: &PgPool) -> Result<Vec<StockHashRow>, DbError> {
    let rows = sqlx::query_as::<_, StockHashRow>(
        "SELECT rsr_stock_number, content_hash FROM products ORDER BY rsr_stock_number",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns total and in-stock product counts.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_products(pool: &PgPool) -> Result<ProductCounts, DbError> {
    let counts = sqlx::query_as::<_, ProductCounts>(
        "SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE in_stock) AS in_stock FROM products",
    )
    .fetch_one(pool)
    .await?;

    Ok(counts)
}

/// Returns rows whose SKU collapsed onto the vendor stock number even though
/// a usable manufacturer part number is stored, ordered by stock number.
///
/// The predicate is the SQL mirror of [`Product::sku_is_corrupted`].
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_corrupted_skus(pool: &PgPool) -> Result<Vec<ProductRow>, DbError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE sku = rsr_stock_number \
           AND manufacturer_part_number IS NOT NULL \
           AND btrim(manufacturer_part_number) <> '' \
           AND manufacturer_part_number <> rsr_stock_number \
         ORDER BY rsr_stock_number"
    );
    let rows = sqlx::query_as::<_, ProductRow>(&sql).fetch_all(pool).await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Targeted mutations
// ---------------------------------------------------------------------------

/// Fetches one row, applies `apply` to the in-memory product, and persists
/// the result through [`upsert_product`], so the stored content hash always
/// matches the stored fields. Fetch and write are separate statements; the
/// maintenance commands run as a single sequential writer.
async fn mutate_product<F>(
    pool: &PgPool,
    stock_number: &str,
    apply: F,
) -> Result<MutateOutcome, DbError>
where
    F: FnOnce(&mut Product),
{
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE rsr_stock_number = $1");
    let Some(row) = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(stock_number)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(MutateOutcome::Missing);
    };

    let mut product = Product::from(row);
    apply(&mut product);

    Ok(match upsert_product(pool, &product).await? {
        UpsertOutcome::Unchanged => MutateOutcome::Unchanged,
        UpsertOutcome::Inserted | UpsertOutcome::Updated => MutateOutcome::Updated,
    })
}

/// Sets the stock quantity for one product; `in_stock` follows it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the lookup or write fails.
pub async fn update_quantity(
    pool: &PgPool,
    stock_number: &str,
    quantity: i32,
) -> Result<MutateOutcome, DbError> {
    mutate_product(pool, stock_number, |product| {
        product.stock_quantity = quantity;
        product.in_stock = quantity > 0;
    })
    .await
}

/// Marks a product out of stock when the vendor deletes it from the feed.
///
/// Deletions are soft: the quantity is zeroed and the row stays, so order
/// history and the search document keep resolving.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the lookup or write fails.
pub async fn mark_out_of_stock(pool: &PgPool, stock_number: &str) -> Result<MutateOutcome, DbError> {
    update_quantity(pool, stock_number, 0).await
}

/// Reassigns the SKU for one product.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the lookup or write fails.
pub async fn repair_sku(
    pool: &PgPool,
    stock_number: &str,
    new_sku: &str,
) -> Result<MutateOutcome, DbError> {
    mutate_product(pool, stock_number, |product| {
        product.sku = new_sku.to_owned();
    })
    .await
}

/// Moves a product to a new category; the matching category tag follows it.
///
/// Normalization stores the category as a tag, so the rename swaps that tag
/// in place (and prepends one when an older row never carried it).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the lookup or write fails.
pub async fn update_category(
    pool: &PgPool,
    stock_number: &str,
    category: &str,
) -> Result<MutateOutcome, DbError> {
    mutate_product(pool, stock_number, |product| {
        let old = std::mem::replace(&mut product.category, category.to_owned());
        let mut swapped = false;
        for tag in &mut product.tags {
            if *tag == old {
                tag.clone_from(&product.category);
                swapped = true;
            }
        }
        if !swapped {
            product.tags.insert(0, product.category.clone());
        }
    })
    .await
}

/// Overwrites the derived tier prices for one product.
///
/// Reference prices (wholesale, MAP, MSRP) stay as the feed delivered them;
/// only the customer-facing tiers move.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the lookup or write fails.
pub async fn update_pricing(
    pool: &PgPool,
    stock_number: &str,
    tiers: TierPricing,
) -> Result<MutateOutcome, DbError> {
    mutate_product(pool, stock_number, |product| {
        product.price_bronze = tiers.bronze;
        product.price_gold = tiers.gold;
        product.price_platinum = tiers.platinum;
    })
    .await
}
