//! Schema-validated parsing for the vendor feed files.
//!
//! The inventory layout is declared once as named field positions instead
//! of bare indexes scattered through the code. Rows that fail validation
//! are skipped and reported with their line numbers; a file whose every
//! row fails is treated as a layout change and rejected outright.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use armory_core::taxonomy;

use crate::error::FeedError;
use crate::files::FeedFile;
use crate::record::{DeletedRecord, InventoryRecord, QuantityRecord};

/// Declared width of the inventory layout. Rows may carry trailing extras
/// (ignored); rows with fewer fields are rejected.
pub const INVENTORY_FIELD_COUNT: usize = 77;

/// 0-based field positions in the inventory layout, as documented by the
/// vendor. This is the single place the layout is spelled out.
mod field {
    pub const STOCK_NUMBER: usize = 0;
    pub const UPC: usize = 1;
    pub const DESCRIPTION: usize = 2;
    pub const DEPARTMENT: usize = 3;
    pub const MANUFACTURER_ID: usize = 4;
    pub const MSRP: usize = 5;
    pub const WHOLESALE: usize = 6;
    pub const WEIGHT_OZ: usize = 7;
    pub const QUANTITY: usize = 8;
    pub const MODEL: usize = 9;
    pub const MANUFACTURER_NAME: usize = 10;
    pub const MANUFACTURER_PART_NUMBER: usize = 11;
    pub const STATUS: usize = 12;
    pub const FULL_DESCRIPTION: usize = 13;
    pub const IMAGE_NAME: usize = 14;
    /// First of 51 consecutive state flag columns.
    pub const STATE_FLAGS_START: usize = 15;
    pub const GROUND_SHIP_ONLY: usize = 66;
    pub const ADULT_SIGNATURE: usize = 67;
    pub const BLOCKED_FROM_DROP_SHIP: usize = 68;
    pub const DATE_ENTERED: usize = 69;
    pub const RETAIL_MAP: usize = 70;
    pub const IMAGE_DISCLAIMER: usize = 71;
    pub const SHIPPING_LENGTH: usize = 72;
    pub const SHIPPING_WIDTH: usize = 73;
    pub const SHIPPING_HEIGHT: usize = 74;
    pub const PROP65: usize = 75;
    pub const VENDOR_APPROVAL: usize = 76;
}

/// Two-letter codes for the 51 state flag columns, in feed order:
/// alphabetical by state name, District of Columbia included.
pub(crate) const STATE_CODES: [&str; 51] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH",
    "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

/// One rejected row: where it was and why it was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number in the source file.
    pub line: u64,
    pub reason: String,
}

/// Outcome of parsing one feed file. Valid rows land in `records`;
/// rejected rows are described in `errors`.
#[derive(Debug)]
pub struct ParseReport<T> {
    pub records: Vec<T>,
    pub errors: Vec<RowError>,
}

impl<T> ParseReport<T> {
    #[must_use]
    pub fn parsed(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.errors.len()
    }
}

/// Parses the full inventory file.
///
/// Rows with at least [`INVENTORY_FIELD_COUNT`] fields, a non-empty stock
/// number, and parseable department/price/quantity/date fields become
/// [`InventoryRecord`]s; everything else is skipped and reported. Extra
/// trailing fields are tolerated.
///
/// # Errors
///
/// - [`FeedError::EmptyFile`] — the file has no rows at all. An inventory
///   dump is never legitimately empty.
/// - [`FeedError::AllRowsInvalid`] — every row was rejected.
pub fn parse_inventory(input: &str) -> Result<ParseReport<InventoryRecord>, FeedError> {
    if input.trim().is_empty() {
        return Err(FeedError::EmptyFile {
            file: FeedFile::Inventory.file_name(),
        });
    }
    let report = read_rows(semicolon_reader(input), inventory_record);
    if report.records.is_empty() {
        return Err(FeedError::AllRowsInvalid {
            file: FeedFile::Inventory.file_name(),
            total: report.errors.len(),
        });
    }
    Ok(report)
}

/// Parses the intraday quantity file: `stock_number,quantity` per line,
/// no header. Malformed lines are skipped and reported.
///
/// # Errors
///
/// - [`FeedError::EmptyFile`] — the file has no rows at all.
/// - [`FeedError::AllRowsInvalid`] — every row was rejected.
pub fn parse_quantities(input: &str) -> Result<ParseReport<QuantityRecord>, FeedError> {
    if input.trim().is_empty() {
        return Err(FeedError::EmptyFile {
            file: FeedFile::Quantities.file_name(),
        });
    }
    let report = read_rows(comma_reader(input), quantity_record);
    if report.records.is_empty() {
        return Err(FeedError::AllRowsInvalid {
            file: FeedFile::Quantities.file_name(),
            total: report.errors.len(),
        });
    }
    Ok(report)
}

/// Parses the deletions file: `stock_number;description;DELETED` per line.
///
/// An empty file is a normal day with no deletions and yields an empty
/// report, not an error.
///
/// # Errors
///
/// Returns [`FeedError::AllRowsInvalid`] when the file has rows but every
/// one was rejected.
pub fn parse_deletions(input: &str) -> Result<ParseReport<DeletedRecord>, FeedError> {
    if input.trim().is_empty() {
        return Ok(ParseReport {
            records: Vec::new(),
            errors: Vec::new(),
        });
    }
    let report = read_rows(semicolon_reader(input), deleted_record);
    if report.records.is_empty() {
        return Err(FeedError::AllRowsInvalid {
            file: FeedFile::Deletions.file_name(),
            total: report.errors.len(),
        });
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Row readers
// ---------------------------------------------------------------------------

/// Quoting is disabled for both readers: the vendor never quotes fields,
/// and descriptions contain bare double-quote characters (barrel lengths).
fn semicolon_reader(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(input.as_bytes())
}

fn comma_reader(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(input.as_bytes())
}

fn read_rows<T, F>(mut reader: csv::Reader<&[u8]>, convert: F) -> ParseReport<T>
where
    F: Fn(&csv::StringRecord) -> Result<T, String>,
{
    let mut records = Vec::new();
    let mut errors = Vec::new();
    let mut line = 0u64;

    for result in reader.records() {
        line += 1;
        match result {
            Ok(row) => {
                let at = row.position().map_or(line, csv::Position::line);
                match convert(&row) {
                    Ok(record) => records.push(record),
                    Err(reason) => errors.push(RowError { line: at, reason }),
                }
            }
            Err(err) => {
                let at = err.position().map_or(line, csv::Position::line);
                errors.push(RowError {
                    line: at,
                    reason: err.to_string(),
                });
            }
        }
    }

    ParseReport { records, errors }
}

// ---------------------------------------------------------------------------
// Row validation
// ---------------------------------------------------------------------------

fn inventory_record(row: &csv::StringRecord) -> Result<InventoryRecord, String> {
    if row.len() < INVENTORY_FIELD_COUNT {
        return Err(format!(
            "expected {INVENTORY_FIELD_COUNT} fields, got {}",
            row.len()
        ));
    }

    let stock_number = text(row, field::STOCK_NUMBER);
    if stock_number.is_empty() {
        return Err("empty stock number".to_owned());
    }

    let department = match optional(row, field::DEPARTMENT) {
        None => None,
        Some(raw) => Some(
            taxonomy::parse_department(&raw)
                .ok_or_else(|| format!("department: not a number: {raw:?}"))?,
        ),
    };

    let date_entered = match optional(row, field::DATE_ENTERED) {
        None => None,
        Some(raw) => Some(
            NaiveDate::parse_from_str(&raw, "%Y%m%d")
                .map_err(|_| format!("date entered: not yyyymmdd: {raw:?}"))?,
        ),
    };

    let restricted_states = STATE_CODES
        .iter()
        .enumerate()
        .filter(|&(offset, _)| flag(row, field::STATE_FLAGS_START + offset))
        .map(|(_, code)| (*code).to_owned())
        .collect();

    Ok(InventoryRecord {
        stock_number: stock_number.to_owned(),
        upc: optional(row, field::UPC),
        description: text(row, field::DESCRIPTION).to_owned(),
        department,
        manufacturer_id: optional(row, field::MANUFACTURER_ID),
        price_msrp: decimal(row, field::MSRP, "msrp")?,
        price_wholesale: decimal(row, field::WHOLESALE, "wholesale price")?,
        weight_oz: decimal(row, field::WEIGHT_OZ, "weight")?,
        quantity: quantity_value(text(row, field::QUANTITY))?,
        model: optional(row, field::MODEL),
        manufacturer_name: optional(row, field::MANUFACTURER_NAME),
        manufacturer_part_number: optional(row, field::MANUFACTURER_PART_NUMBER),
        status: optional(row, field::STATUS),
        full_description: optional(row, field::FULL_DESCRIPTION),
        image_name: optional(row, field::IMAGE_NAME),
        restricted_states,
        ground_ship_only: flag(row, field::GROUND_SHIP_ONLY),
        adult_signature_required: flag(row, field::ADULT_SIGNATURE),
        blocked_from_drop_ship: flag(row, field::BLOCKED_FROM_DROP_SHIP),
        date_entered,
        price_map: decimal(row, field::RETAIL_MAP, "retail map")?,
        image_disclaimer: flag(row, field::IMAGE_DISCLAIMER),
        shipping_length: decimal(row, field::SHIPPING_LENGTH, "shipping length")?,
        shipping_width: decimal(row, field::SHIPPING_WIDTH, "shipping width")?,
        shipping_height: decimal(row, field::SHIPPING_HEIGHT, "shipping height")?,
        prop65: flag(row, field::PROP65),
        vendor_approval_required: flag(row, field::VENDOR_APPROVAL),
    })
}

fn quantity_record(row: &csv::StringRecord) -> Result<QuantityRecord, String> {
    if row.len() < 2 {
        return Err(format!("expected 2 fields, got {}", row.len()));
    }
    let stock_number = text(row, 0);
    if stock_number.is_empty() {
        return Err("empty stock number".to_owned());
    }
    Ok(QuantityRecord {
        stock_number: stock_number.to_owned(),
        quantity: quantity_value(text(row, 1))?,
    })
}

fn deleted_record(row: &csv::StringRecord) -> Result<DeletedRecord, String> {
    if row.len() < 3 {
        return Err(format!("expected 3 fields, got {}", row.len()));
    }
    let stock_number = text(row, 0);
    if stock_number.is_empty() {
        return Err("empty stock number".to_owned());
    }
    let marker = text(row, 2);
    if marker != "DELETED" {
        return Err(format!("expected DELETED marker, got {marker:?}"));
    }
    Ok(DeletedRecord {
        stock_number: stock_number.to_owned(),
        description: text(row, 1).to_owned(),
    })
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn text(row: &csv::StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("").trim()
}

fn optional(row: &csv::StringRecord, idx: usize) -> Option<String> {
    let value = text(row, idx);
    (!value.is_empty()).then(|| value.to_owned())
}

fn flag(row: &csv::StringRecord, idx: usize) -> bool {
    text(row, idx).eq_ignore_ascii_case("y")
}

fn decimal(row: &csv::StringRecord, idx: usize, name: &str) -> Result<Option<Decimal>, String> {
    let raw = text(row, idx);
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<Decimal>()
        .map(Some)
        .map_err(|_| format!("{name}: not a decimal: {raw:?}"))
}

fn quantity_value(raw: &str) -> Result<i32, String> {
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<i32>()
        .map_err(|_| format!("quantity: not an integer: {raw:?}"))
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
