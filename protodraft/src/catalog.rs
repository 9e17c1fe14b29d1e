// Catalog loading, persistence, and set-based filtering.
//
// The catalog is a JSON array of protocol records, sorted ascending by the
// `Protocol` key. The importer writes it; the drafter only reads it.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("catalog file {path} contains invalid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize catalog: {0}")]
    Serialize(serde_json::Error),
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One draftable protocol. Field names match the spreadsheet headers, which
/// is also how they appear in the JSON catalog. `Protocol` is the identity
/// key; `Top` and `Bottom` are opaque rules text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Protocol")]
    pub protocol: String,
    #[serde(rename = "Set")]
    pub set: String,
    #[serde(rename = "Top", default)]
    pub top: String,
    #[serde(rename = "Bottom", default)]
    pub bottom: String,
    /// Extra spreadsheet columns, carried through untouched. A BTreeMap
    /// keeps the serialized field order stable across runs.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} - {} ({})",
            self.protocol, self.top, self.bottom, self.set
        )
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load the catalog from a JSON file.
pub fn load(path: &Path) -> Result<Vec<Record>, CatalogError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CatalogError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(CatalogError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    serde_json::from_str(&text).map_err(|e| CatalogError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Save the catalog as pretty-printed JSON.
///
/// Writes to a temp file in the target directory and renames it into place,
/// so a crash mid-write cannot leave a truncated catalog behind.
pub fn save(path: &Path, records: &[Record]) -> Result<(), CatalogError> {
    let json = serde_json::to_string_pretty(records).map_err(CatalogError::Serialize)?;

    let tmp = path.with_extension("tmp");
    let write_err = |e| CatalogError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    std::fs::write(&tmp, json).map_err(write_err)?;
    std::fs::rename(&tmp, path).map_err(write_err)
}

// ---------------------------------------------------------------------------
// Set index and filtering
// ---------------------------------------------------------------------------

/// Distinct `Set` values with their record counts, sorted by set name for
/// stable menu display.
pub fn set_index(records: &[Record]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(&record.set).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect()
}

/// The subset of records whose `Set` is among `sets`, in catalog order.
pub fn filter_by_sets(records: &[Record], sets: &HashSet<String>) -> Vec<Record> {
    records
        .iter()
        .filter(|r| sets.contains(&r.set))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
