//! Discovery module: find the project root by walking up the directory tree

use std::path::{Path, PathBuf};

use crate::{CONFIG_FILE, DATA_DIR, OFFER_RETAILER_FILE, OffersError, Result};

/// Find the project root by walking up from the given path.
///
/// A directory is a project root when it holds an `offers.json` or the
/// default `data/offer_retailer.csv`.
pub fn find_project_root(start: &Path) -> Result<PathBuf> {
    find_root_below(start, None)
}

/// Walk up from `start`, giving up after `ceiling` has been checked.
fn find_root_below(start: &Path, ceiling: Option<&Path>) -> Result<PathBuf> {
    let ceiling = ceiling.map(Path::canonicalize).transpose()?;
    let mut current = start.canonicalize()?;

    loop {
        if is_project_root(&current) {
            return Ok(current);
        }
        if ceiling.as_deref() == Some(current.as_path()) {
            return Err(OffersError::NotInProject);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return Err(OffersError::NotInProject),
        }
    }
}

fn is_project_root(dir: &Path) -> bool {
    config_path(dir).is_file() || dir.join(DATA_DIR).join(OFFER_RETAILER_FILE).is_file()
}

/// Get the config file path.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}
