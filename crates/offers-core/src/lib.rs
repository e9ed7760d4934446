//! offers-core: zero-shot offer search library
//!
//! This library loads the offers dataset from CSV, groups it by retailer,
//! brand and category, and filters candidate offers with a pre-trained
//! relevance model.

pub mod classify;
pub mod config;
pub mod consts;
pub mod discover;
pub mod index;
pub mod load;
pub mod search;

pub use classify::{Classifier, load_classifier};
pub use config::{Config, Thresholds};
pub use consts::*;
pub use discover::find_project_root;
pub use index::OfferIndex;
pub use search::{ScoredOffer, SearchKind, SearchReport, Searcher};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum OffersError {
    #[error("Not in an offers project (no offers.json or data/offer_retailer.csv found)")]
    NotInProject,

    #[error("Already initialized: {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Config error: {0}")]
    Config(String),

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing column {column} in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Please enter a {0} name.")]
    EmptyQuery(SearchKind),

    #[error("No offers found for this {kind}.")]
    NotFound { kind: SearchKind, key: String },

    #[error("No {0} keys to sample from")]
    EmptyDataset(SearchKind),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OffersError {
    /// Whether this is a user-level condition the front end reports as a
    /// warning instead of aborting.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::EmptyQuery(_) | Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, OffersError>;
