//! CSV loading and cleaning
//!
//! Every cell is stripped of characters outside a fixed allow-list before it
//! reaches the index. Empty cells are kept as missing values.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use csv::ReaderBuilder;
use regex::Regex;

use crate::{OffersError, Result};

/// Anything outside letters, digits, space and `.,;!?()#$&%'´-`.
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 .,;!?()#$&%'´-]+").expect("valid regex"));

/// Remove every disallowed character from a cell.
pub fn clean_cell(cell: &str) -> String {
    DISALLOWED.replace_all(cell, "").into_owned()
}

/// A cleaned CSV file held in memory.
#[derive(Debug, Clone)]
pub struct Table {
    origin: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column in the header row.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| OffersError::MissingColumn {
                path: self.origin.clone(),
                column: name.to_string(),
            })
    }

    /// All values of a column in row order; `None` marks a missing cell.
    pub fn column(&self, name: &str) -> Result<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).and_then(|c| c.as_deref()))
            .collect())
    }
}

/// Read a CSV file and clean its content.
pub fn read_and_clean(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).map_err(|e| OffersError::Csv {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    let table = parse_and_clean(file, path)?;
    tracing::debug!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Parse CSV from any reader and clean every cell.
pub fn parse_and_clean<R: Read>(reader: R, origin: &Path) -> Result<Table> {
    let csv_err = |source: csv::Error| OffersError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let row = record
            .iter()
            .map(|cell| {
                if cell.is_empty() {
                    None
                } else {
                    Some(clean_cell(cell))
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(Table {
        origin: origin.to_path_buf(),
        headers,
        rows,
    })
}
