/// Optional project configuration file at the project root
pub const CONFIG_FILE: &str = "offers.json";

/// Directory holding the CSV inputs, relative to the project root
pub const DATA_DIR: &str = "data";

/// Brand to category mapping
pub const BRAND_CATEGORY_FILE: &str = "brand_category.csv";

/// Category hierarchy
pub const CATEGORIES_FILE: &str = "categories.csv";

/// Offers with their retailer and brand
pub const OFFER_RETAILER_FILE: &str = "offer_retailer.csv";

/// Default relevance model (cross-encoder)
pub const DEFAULT_MODEL: &str = "bge-reranker-base";

/// Sentence the label is inserted into before scoring
pub const DEFAULT_HYPOTHESIS_TEMPLATE: &str = "This example is {}.";

/// Minimum score (exclusive) for retailer matches
pub const RETAILER_THRESHOLD: f32 = 0.70;

/// Minimum score (exclusive) for brand matches
pub const BRAND_THRESHOLD: f32 = 0.65;

/// Minimum score (exclusive) for category matches
pub const CATEGORY_THRESHOLD: f32 = 0.60;

pub mod columns {
    pub const RETAILER: &str = "RETAILER";
    pub const OFFER: &str = "OFFER";
    pub const BRAND: &str = "BRAND";
    pub const BRAND_BELONGS_TO_CATEGORY: &str = "BRAND_BELONGS_TO_CATEGORY";
    pub const PRODUCT_CATEGORY: &str = "PRODUCT_CATEGORY";
    pub const IS_CHILD_CATEGORY_TO: &str = "IS_CHILD_CATEGORY_TO";
}
