//! Configuration handling for offers.json

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    discover, OffersError, Result, BRAND_CATEGORY_FILE, BRAND_THRESHOLD, CATEGORIES_FILE,
    CATEGORY_THRESHOLD, DATA_DIR, DEFAULT_HYPOTHESIS_TEMPLATE, DEFAULT_MODEL, OFFER_RETAILER_FILE,
    RETAILER_THRESHOLD,
};

/// Configuration stored in offers.json at the project root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the CSV inputs (relative to the project root)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_brand_category_file")]
    pub brand_category_file: String,

    #[serde(default = "default_categories_file")]
    pub categories_file: String,

    #[serde(default = "default_offer_retailer_file")]
    pub offer_retailer_file: String,

    /// Relevance model name (fastembed model ID)
    #[serde(default = "default_model")]
    pub model: String,

    /// Sentence the label is inserted into, `{}` marks the label
    #[serde(default = "default_hypothesis_template")]
    pub hypothesis_template: String,

    /// Per-search-kind minimum scores
    #[serde(default)]
    pub thresholds: Thresholds,
}

/// Scores must be strictly greater than these to count as a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_retailer_threshold")]
    pub retailer: f32,
    #[serde(default = "default_brand_threshold")]
    pub brand: f32,
    #[serde(default = "default_category_threshold")]
    pub category: f32,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DATA_DIR)
}

fn default_brand_category_file() -> String {
    BRAND_CATEGORY_FILE.to_string()
}

fn default_categories_file() -> String {
    CATEGORIES_FILE.to_string()
}

fn default_offer_retailer_file() -> String {
    OFFER_RETAILER_FILE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_hypothesis_template() -> String {
    DEFAULT_HYPOTHESIS_TEMPLATE.to_string()
}

fn default_retailer_threshold() -> f32 {
    RETAILER_THRESHOLD
}

fn default_brand_threshold() -> f32 {
    BRAND_THRESHOLD
}

fn default_category_threshold() -> f32 {
    CATEGORY_THRESHOLD
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            retailer: default_retailer_threshold(),
            brand: default_brand_threshold(),
            category: default_category_threshold(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            brand_category_file: default_brand_category_file(),
            categories_file: default_categories_file(),
            offer_retailer_file: default_offer_retailer_file(),
            model: default_model(),
            hypothesis_template: default_hypothesis_template(),
            thresholds: Thresholds::default(),
        }
    }
}

impl Config {
    /// Load config from the project root, falling back to defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = discover::config_path(root);
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Self = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the project root.
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = discover::config_path(root);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Write a default offers.json into `root`; never overwrites.
    pub fn init(root: &Path) -> Result<Self> {
        let path = discover::config_path(root);
        if path.exists() {
            return Err(OffersError::AlreadyInitialized(path));
        }
        let config = Self::default();
        config.save(root)?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.hypothesis_template.contains("{}") {
            return Err(OffersError::Config(format!(
                "hypothesis_template must contain {{}}: {:?}",
                self.hypothesis_template
            )));
        }
        for (name, value) in [
            ("retailer", self.thresholds.retailer),
            ("brand", self.thresholds.brand),
            ("category", self.thresholds.category),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(OffersError::Config(format!(
                    "threshold for {} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Resolved path of a data file under the data directory.
    pub fn data_file(&self, root: &Path, name: &str) -> PathBuf {
        root.join(&self.data_dir).join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CONFIG_FILE;
    use std::fs;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = std::env::temp_dir().join("offers_test_config_default");
        let _ = fs::remove_dir_all(&temp);
        fs::create_dir_all(&temp).unwrap();

        let config = Config::load(&temp).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.thresholds, Thresholds::default());
        assert_eq!(config.data_dir, PathBuf::from("data"));

        fs::remove_dir_all(&temp).unwrap();
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = std::env::temp_dir().join("offers_test_config_partial");
        let _ = fs::remove_dir_all(&temp);
        fs::create_dir_all(&temp).unwrap();
        fs::write(
            temp.join(CONFIG_FILE),
            r#"{ "data_dir": "fixtures", "thresholds": { "brand": 0.5 } }"#,
        )
        .unwrap();

        let config = Config::load(&temp).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("fixtures"));
        assert_eq!(config.thresholds.brand, 0.5);
        assert_eq!(config.thresholds.retailer, RETAILER_THRESHOLD);
        assert_eq!(config.offer_retailer_file, OFFER_RETAILER_FILE);

        fs::remove_dir_all(&temp).unwrap();
    }

    #[test]
    fn test_save_then_load() {
        let temp = std::env::temp_dir().join("offers_test_config_save");
        let _ = fs::remove_dir_all(&temp);
        fs::create_dir_all(&temp).unwrap();

        let mut config = Config::default();
        config.model = "all-MiniLM-L6-v2".to_string();
        config.save(&temp).unwrap();

        let loaded = Config::load(&temp).unwrap();
        assert_eq!(loaded.model, "all-MiniLM-L6-v2");

        fs::remove_dir_all(&temp).unwrap();
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = std::env::temp_dir().join("offers_test_config_init");
        let _ = fs::remove_dir_all(&temp);
        fs::create_dir_all(&temp).unwrap();

        Config::init(&temp).unwrap();
        assert!(temp.join(CONFIG_FILE).is_file());
        assert!(matches!(
            Config::init(&temp),
            Err(OffersError::AlreadyInitialized(_))
        ));

        fs::remove_dir_all(&temp).unwrap();
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let temp = std::env::temp_dir().join("offers_test_config_invalid");
        let _ = fs::remove_dir_all(&temp);
        fs::create_dir_all(&temp).unwrap();
        fs::write(
            temp.join(CONFIG_FILE),
            r#"{ "thresholds": { "category": 1.5 } }"#,
        )
        .unwrap();

        assert!(matches!(Config::load(&temp), Err(OffersError::Config(_))));

        fs::remove_dir_all(&temp).unwrap();
    }

    #[test]
    fn test_rejects_template_without_placeholder() {
        let temp = std::env::temp_dir().join("offers_test_config_template");
        let _ = fs::remove_dir_all(&temp);
        fs::create_dir_all(&temp).unwrap();
        fs::write(
            temp.join(CONFIG_FILE),
            r#"{ "hypothesis_template": "This example is about offers." }"#,
        )
        .unwrap();

        assert!(matches!(Config::load(&temp), Err(OffersError::Config(_))));

        fs::remove_dir_all(&temp).unwrap();
    }
}
