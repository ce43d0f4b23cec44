pub mod error;
pub mod fetch;
pub mod files;
pub mod normalize;
pub mod parse;
pub mod record;

mod attributes;

pub use error::FeedError;
pub use fetch::{FeedSource, FtpsSource, HttpSource, PullReport, PulledFile};
pub use files::FeedFile;
pub use normalize::Normalizer;
pub use parse::{parse_deletions, parse_inventory, parse_quantities, ParseReport, RowError};
pub use record::{DeletedRecord, InventoryRecord, QuantityRecord};
