//! Search functionality
//!
//! Each search looks the normalized query up in one mapping, scores every
//! candidate offer against the query and keeps the ones above the
//! threshold for that kind of search. Results keep candidate order.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::{Classifier, OfferIndex, OffersError, Result, Thresholds};

/// What the query names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    Retailer,
    Brand,
    Category,
}

impl SearchKind {
    pub const ALL: [SearchKind; 3] = [Self::Retailer, Self::Brand, Self::Category];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retailer => "retailer",
            Self::Brand => "brand",
            Self::Category => "category",
        }
    }

    /// Trim the query; retailer and brand keys are stored upper-case.
    pub fn normalize(&self, query: &str) -> String {
        let trimmed = query.trim();
        match self {
            Self::Retailer | Self::Brand => trimmed.to_uppercase(),
            Self::Category => trimmed.to_string(),
        }
    }

    pub fn threshold(&self, thresholds: &Thresholds) -> f32 {
        match self {
            Self::Retailer => thresholds.retailer,
            Self::Brand => thresholds.brand,
            Self::Category => thresholds.category,
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retailer" => Ok(Self::Retailer),
            "brand" => Ok(Self::Brand),
            "category" => Ok(Self::Category),
            other => Err(format!(
                "unknown search kind: {} (expected retailer, brand or category)",
                other
            )),
        }
    }
}

/// An offer that passed the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredOffer {
    pub offer: String,
    pub score: f32,
}

/// Outcome of a search that found its key.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub kind: SearchKind,
    /// The key actually looked up
    pub query: String,
    /// Number of candidates scored
    pub candidates: usize,
    /// Passing offers in candidate order
    pub matches: Vec<ScoredOffer>,
    /// Sibling categories, only for category searches without matches
    pub suggestions: Vec<String>,
}

impl SearchReport {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Progress events emitted while scoring.
#[derive(Debug, Clone, Copy)]
pub enum ProgressEvent {
    /// About to score candidate `current` of `total` (1-based).
    Scoring { current: usize, total: usize },
}

/// Type alias for progress callback.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send>;

/// Runs searches against a fixed index with one classifier.
pub struct Searcher<C> {
    index: OfferIndex,
    classifier: C,
    thresholds: Thresholds,
    progress_callback: Option<ProgressCallback>,
}

impl<C: Classifier> Searcher<C> {
    pub fn new(index: OfferIndex, classifier: C, thresholds: Thresholds) -> Self {
        Self {
            index,
            classifier,
            thresholds,
            progress_callback: None,
        }
    }

    pub fn index(&self) -> &OfferIndex {
        &self.index
    }

    /// Set a callback to receive progress updates while scoring.
    pub fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.progress_callback = Some(callback);
    }

    fn emit_progress(&self, event: ProgressEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }

    /// Normalize the query, look it up and filter its candidates.
    pub fn search(&self, kind: SearchKind, query: &str) -> Result<SearchReport> {
        let key = kind.normalize(query);
        if key.is_empty() {
            return Err(OffersError::EmptyQuery(kind));
        }
        self.search_exact(kind, &key)
    }

    pub fn search_retailer(&self, query: &str) -> Result<SearchReport> {
        self.search(SearchKind::Retailer, query)
    }

    pub fn search_brand(&self, query: &str) -> Result<SearchReport> {
        self.search(SearchKind::Brand, query)
    }

    pub fn search_category(&self, query: &str) -> Result<SearchReport> {
        self.search(SearchKind::Category, query)
    }

    /// Pick a uniformly random key of the given kind.
    pub fn random_key<R: Rng + ?Sized>(&self, kind: SearchKind, rng: &mut R) -> Option<&str> {
        self.index.keys(kind).choose(rng).copied()
    }

    /// Search with a random key; the key is used exactly as stored.
    pub fn random_search<R: Rng + ?Sized>(
        &self,
        kind: SearchKind,
        rng: &mut R,
    ) -> Result<SearchReport> {
        let key = self
            .random_key(kind, rng)
            .ok_or(OffersError::EmptyDataset(kind))?;
        self.search_exact(kind, key)
    }

    /// Look the key up as given, without normalization.
    pub fn search_exact(&self, kind: SearchKind, key: &str) -> Result<SearchReport> {
        let candidates = self
            .index
            .offers_for(kind, key)
            .ok_or_else(|| OffersError::NotFound {
                kind,
                key: key.to_string(),
            })?;

        let threshold = kind.threshold(&self.thresholds);
        let total = candidates.len();
        let mut matches = Vec::new();

        for (i, offer) in candidates.iter().enumerate() {
            self.emit_progress(ProgressEvent::Scoring {
                current: i + 1,
                total,
            });

            let score = self.classifier.score(offer, key)?;
            tracing::debug!(%kind, key = %key, score, offer, "Scored candidate");

            if score > threshold {
                matches.push(ScoredOffer {
                    offer: offer.to_string(),
                    score,
                });
            }
        }

        let suggestions = if matches.is_empty() && kind == SearchKind::Category {
            self.index
                .sibling_categories(key)
                .into_iter()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };

        tracing::info!(
            %kind,
            key = %key,
            candidates = total,
            matches = matches.len(),
            "Search complete"
        );

        Ok(SearchReport {
            kind,
            query: key.to_string(),
            candidates: total,
            matches,
            suggestions,
        })
    }
}
