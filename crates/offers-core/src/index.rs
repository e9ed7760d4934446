//! In-memory index: group offers by retailer, brand and category

use std::collections::BTreeMap;
use std::path::Path;

use crate::load::{self, Table};
use crate::{columns, Config, Result, SearchKind};

/// Key to values, keys sorted, values in input row order.
pub type Grouping = BTreeMap<String, Vec<String>>;

/// Group the rows of a table by one column, collecting another.
///
/// Rows with a missing key or value are skipped. Duplicate keys accumulate.
pub fn group_by(table: &Table, key_column: &str, value_column: &str) -> Result<Grouping> {
    let keys = table.column(key_column)?;
    let values = table.column(value_column)?;

    let mut grouping = Grouping::new();
    for (key, value) in keys.into_iter().zip(values) {
        if let (Some(key), Some(value)) = (key, value) {
            grouping
                .entry(key.to_string())
                .or_default()
                .push(value.to_string());
        }
    }
    Ok(grouping)
}

/// Counts reported by `offers status`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub retailers: usize,
    pub brands: usize,
    pub categories: usize,
    pub offers: usize,
    pub parent_categories: usize,
}

/// The three lookup mappings plus the category hierarchy.
///
/// Built once and never mutated afterwards.
#[derive(Debug, Default, Clone)]
pub struct OfferIndex {
    offers_by_retailer: Grouping,
    offers_by_brand: Grouping,
    brands_by_category: Grouping,
    children_by_parent: Grouping,
    /// Offer rows with an OFFER cell, whether or not they have a brand
    offer_count: usize,
}

impl OfferIndex {
    /// Build the index from the three cleaned tables.
    pub fn build(
        brand_categories: &Table,
        categories: &Table,
        offer_retailer: &Table,
    ) -> Result<Self> {
        let offer_count = offer_retailer
            .column(columns::OFFER)?
            .iter()
            .filter(|offer| offer.is_some())
            .count();

        Ok(Self {
            offers_by_retailer: group_by(offer_retailer, columns::RETAILER, columns::OFFER)?,
            offers_by_brand: group_by(offer_retailer, columns::BRAND, columns::OFFER)?,
            brands_by_category: group_by(
                brand_categories,
                columns::BRAND_BELONGS_TO_CATEGORY,
                columns::BRAND,
            )?,
            children_by_parent: group_by(
                categories,
                columns::IS_CHILD_CATEGORY_TO,
                columns::PRODUCT_CATEGORY,
            )?,
            offer_count,
        })
    }

    /// Read the configured CSV files under `root` and build the index.
    pub fn load(config: &Config, root: &Path) -> Result<Self> {
        let brand_categories =
            load::read_and_clean(&config.data_file(root, &config.brand_category_file))?;
        let categories = load::read_and_clean(&config.data_file(root, &config.categories_file))?;
        let offer_retailer =
            load::read_and_clean(&config.data_file(root, &config.offer_retailer_file))?;

        let index = Self::build(&brand_categories, &categories, &offer_retailer)?;
        let stats = index.stats();
        tracing::info!(
            retailers = stats.retailers,
            brands = stats.brands,
            categories = stats.categories,
            offers = stats.offers,
            "Index built"
        );
        Ok(index)
    }

    fn grouping(&self, kind: SearchKind) -> &Grouping {
        match kind {
            SearchKind::Retailer => &self.offers_by_retailer,
            SearchKind::Brand => &self.offers_by_brand,
            SearchKind::Category => &self.brands_by_category,
        }
    }

    /// Keys searchable for a kind, in key order.
    pub fn keys(&self, kind: SearchKind) -> Vec<&str> {
        self.grouping(kind).keys().map(String::as_str).collect()
    }

    pub fn contains(&self, kind: SearchKind, key: &str) -> bool {
        self.grouping(kind).contains_key(key)
    }

    pub fn retailers(&self) -> Vec<&str> {
        self.keys(SearchKind::Retailer)
    }

    pub fn brands(&self) -> Vec<&str> {
        self.keys(SearchKind::Brand)
    }

    pub fn categories(&self) -> Vec<&str> {
        self.keys(SearchKind::Category)
    }

    /// Brands listed under a category.
    pub fn brands_in(&self, category: &str) -> Option<&[String]> {
        self.brands_by_category.get(category).map(Vec::as_slice)
    }

    /// Candidate offers for a key, or `None` if the key is unknown.
    ///
    /// Category candidates are the offers of every brand under the
    /// category, concatenated in brand order. Duplicates are kept.
    pub fn offers_for(&self, kind: SearchKind, key: &str) -> Option<Vec<&str>> {
        match kind {
            SearchKind::Retailer | SearchKind::Brand => self
                .grouping(kind)
                .get(key)
                .map(|offers| offers.iter().map(String::as_str).collect()),
            SearchKind::Category => self.category_offers(key),
        }
    }

    /// Offers of every brand under a category.
    pub fn category_offers(&self, category: &str) -> Option<Vec<&str>> {
        let brands = self.brands_in(category)?;
        Some(
            brands
                .iter()
                .filter_map(|brand| self.offers_by_brand.get(brand))
                .flatten()
                .map(String::as_str)
                .collect(),
        )
    }

    /// Categories sharing a parent with `category`.
    ///
    /// Uses the first parent (in key order) whose children include the
    /// category; the category itself is left out.
    pub fn sibling_categories(&self, category: &str) -> Vec<&str> {
        self.children_by_parent
            .values()
            .find(|children| children.iter().any(|c| c == category))
            .map(|children| {
                children
                    .iter()
                    .map(String::as_str)
                    .filter(|c| *c != category)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            retailers: self.offers_by_retailer.len(),
            brands: self.offers_by_brand.len(),
            categories: self.brands_by_category.len(),
            offers: self.offer_count,
            parent_categories: self.children_by_parent.len(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::load::parse_and_clean;

    pub(crate) const OFFER_RETAILER: &str = "\
OFFER,RETAILER,BRAND
\"Spend $50 on a Full-Priced new Club Membership\",SAMS CLUB,SAMS CLUB
\"Beyond Meat® Plant-Based products, spend $25\",,BEYOND MEAT
Good Humor Viennetta Frozen Vanilla Cake,WALMART,GOOD HUMOR
Beyond Steak Plant-Based seared tips,,BEYOND MEAT
\"Back to the Roots Soil, select varieties\",WALMART,BACK TO THE ROOTS
Good Humor Viennetta Frozen Vanilla Cake,TARGET,BREYERS
";

    pub(crate) const BRAND_CATEGORY: &str = "\
BRAND,BRAND_BELONGS_TO_CATEGORY,RECEIPTS
BEYOND MEAT,Plant-Based Meat,1000
GOOD HUMOR,Frozen Desserts,500
BREYERS,Frozen Desserts,400
MISSING BRAND,Frozen Desserts,10
BACK TO THE ROOTS,Garden,20
";

    pub(crate) const CATEGORIES: &str = "\
CATEGORY_ID,PRODUCT_CATEGORY,IS_CHILD_CATEGORY_TO
1,Frozen Desserts,Frozen
2,Frozen Meals,Frozen
3,Frozen Vegetables,Frozen
4,Plant-Based Meat,Meat & Seafood
5,Garden,Home
";

    fn table(content: &str, name: &str) -> Table {
        parse_and_clean(content.as_bytes(), Path::new(name)).unwrap()
    }

    fn index_with_offers(offer_retailer: &str) -> OfferIndex {
        let offers = table(offer_retailer, "offer_retailer.csv");
        let brands = table(BRAND_CATEGORY, "brand_category.csv");
        let categories = table(CATEGORIES, "categories.csv");
        OfferIndex::build(&brands, &categories, &offers).unwrap()
    }

    pub(crate) fn fixture_index() -> OfferIndex {
        index_with_offers(OFFER_RETAILER)
    }

    #[test]
    fn test_group_by_keeps_row_order_and_duplicates() {
        let rows = table("K,V\nb,1\na,2\nb,3\nb,1\n", "t.csv");
        let grouping = group_by(&rows, "K", "V").unwrap();

        assert_eq!(grouping.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(grouping["b"], vec!["1", "3", "1"]);
    }

    #[test]
    fn test_group_by_skips_missing() {
        let rows = table("K,V\n,1\na,\na,2\n", "t.csv");
        let grouping = group_by(&rows, "K", "V").unwrap();

        assert_eq!(grouping.len(), 1);
        assert_eq!(grouping["a"], vec!["2"]);
    }

    #[test]
    fn test_retailer_keys_skip_missing_retailers() {
        let index = fixture_index();
        assert_eq!(index.retailers(), vec!["SAMS CLUB", "TARGET", "WALMART"]);
        assert_eq!(
            index.offers_for(SearchKind::Retailer, "WALMART").unwrap(),
            vec![
                "Good Humor Viennetta Frozen Vanilla Cake",
                "Back to the Roots Soil, select varieties",
            ]
        );
    }

    #[test]
    fn test_offers_are_cleaned() {
        let index = fixture_index();
        let offers = index.offers_for(SearchKind::Brand, "BEYOND MEAT").unwrap();
        assert_eq!(
            offers,
            vec![
                "Beyond Meat Plant-Based products, spend $25",
                "Beyond Steak Plant-Based seared tips",
            ]
        );
    }

    #[test]
    fn test_category_offers_concatenate_brands() {
        let index = fixture_index();
        let offers = index.category_offers("Frozen Desserts").unwrap();
        // GOOD HUMOR then BREYERS; MISSING BRAND has no offers.
        assert_eq!(
            offers,
            vec![
                "Good Humor Viennetta Frozen Vanilla Cake",
                "Good Humor Viennetta Frozen Vanilla Cake",
            ]
        );
    }

    #[test]
    fn test_unknown_keys() {
        let index = fixture_index();
        assert!(index.offers_for(SearchKind::Retailer, "walmart").is_none());
        assert!(index.offers_for(SearchKind::Category, "frozen desserts").is_none());
        assert!(!index.contains(SearchKind::Brand, "NOPE"));
    }

    #[test]
    fn test_sibling_categories() {
        let index = fixture_index();
        assert_eq!(
            index.sibling_categories("Frozen Desserts"),
            vec!["Frozen Meals", "Frozen Vegetables"]
        );
        assert!(index.sibling_categories("Garden").is_empty());
        assert!(index.sibling_categories("Unknown").is_empty());
    }

    #[test]
    fn test_stats() {
        let index = fixture_index();
        assert_eq!(
            index.stats(),
            IndexStats {
                retailers: 3,
                brands: 5,
                categories: 3,
                offers: 6,
                parent_categories: 3,
            }
        );
    }

    #[test]
    fn test_stats_count_offers_without_brand() {
        // Brandless offers still count; a row without an offer does not.
        let index = index_with_offers(
            "OFFER,RETAILER,BRAND\nSpend $5,WALMART,\nBuy two,,ACME\n,TARGET,ACME\n",
        );

        let stats = index.stats();
        assert_eq!(stats.offers, 2);
        assert_eq!(stats.retailers, 1);
        assert_eq!(stats.brands, 1);
    }

    #[test]
    fn test_load_from_disk() {
        let temp = std::env::temp_dir().join("offers_test_index_load");
        let _ = std::fs::remove_dir_all(&temp);
        let data = temp.join(crate::DATA_DIR);
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(data.join(crate::OFFER_RETAILER_FILE), OFFER_RETAILER).unwrap();
        std::fs::write(data.join(crate::BRAND_CATEGORY_FILE), BRAND_CATEGORY).unwrap();
        std::fs::write(data.join(crate::CATEGORIES_FILE), CATEGORIES).unwrap();

        let index = OfferIndex::load(&Config::default(), &temp).unwrap();
        assert_eq!(index.stats().retailers, 3);

        std::fs::remove_dir_all(&temp).unwrap();
    }

    #[test]
    fn test_load_missing_column() {
        let temp = std::env::temp_dir().join("offers_test_index_missing_column");
        let _ = std::fs::remove_dir_all(&temp);
        let data = temp.join(crate::DATA_DIR);
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(data.join(crate::OFFER_RETAILER_FILE), "OFFER,BRAND\nx,y\n").unwrap();
        std::fs::write(data.join(crate::BRAND_CATEGORY_FILE), BRAND_CATEGORY).unwrap();
        std::fs::write(data.join(crate::CATEGORIES_FILE), CATEGORIES).unwrap();

        let result = OfferIndex::load(&Config::default(), &temp);
        assert!(matches!(
            result,
            Err(crate::OffersError::MissingColumn { column, .. }) if column == "RETAILER"
        ));

        std::fs::remove_dir_all(&temp).unwrap();
    }
}
