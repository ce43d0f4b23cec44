use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read pricing rules file {path}: {source}")]
    RulesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse pricing rules file: {0}")]
    RulesFileParse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

pub mod app_config;
pub mod categorize;
pub mod config;
pub mod pricing;
pub mod product;
pub mod taxonomy;

pub use app_config::{AppConfig, Environment};
pub use categorize::{CategoryChange, CategoryRules, Resolution};
pub use config::{load_app_config, load_app_config_from_env};
pub use pricing::{
    load_pricing_rules, price_tiers, MarkupKind, PriceInputs, PricingError, PricingRules,
    TierPricing,
};
pub use product::Product;
pub use taxonomy::{
    category_for_department, is_firearm_department, parse_department, requires_ffl,
    DEFAULT_CATEGORY,
};
