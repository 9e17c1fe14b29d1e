// CSV import: convert a spreadsheet export into the JSON catalog.
//
// Re-imports merge rather than overwrite: records already in the catalog win
// over incoming rows with the same `Protocol` key, so hand edits to stored
// entries survive a re-export from the spreadsheet.

use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{self, CatalogError, Record};

/// The column that identifies a record. Rows without a value here are
/// skipped; a header row without the column at all is fatal.
pub const KEY_COLUMN: &str = "Protocol";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("input file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("{path} has no `Protocol` column (header row missing or malformed)")]
    MissingKeyColumn { path: PathBuf },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

// ---------------------------------------------------------------------------
// Import summary
// ---------------------------------------------------------------------------

/// What one import run did. The binary prints these as its diagnostics;
/// tests assert on them directly.
#[derive(Debug)]
pub struct ImportSummary {
    /// Header names after whitespace trimming.
    pub headers: Vec<String>,
    /// Rows that carried a `Protocol` value.
    pub rows_parsed: usize,
    /// CSV line numbers of rows skipped for a missing `Protocol` value.
    pub skipped_rows: Vec<u64>,
    /// Whether the output catalog was created fresh (no previous file).
    pub created: bool,
    /// Records appended to the catalog by this run.
    pub appended: usize,
    /// Records in the catalog after the merge.
    pub total: usize,
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ParsedCsv {
    headers: Vec<String>,
    records: Vec<Record>,
    skipped_rows: Vec<u64>,
}

/// Parse CSV rows into records. Generic over the reader so tests feed
/// in-memory data; `path` is only used for error context. Spreadsheet
/// exports may lead with a UTF-8 BOM, which would otherwise glue itself to
/// the first header name; header whitespace is trimmed by the reader.
fn parse_rows<R: Read>(mut rdr: R, path: &Path) -> Result<ParsedCsv, ImportError> {
    let csv_err = |e| ImportError::Csv {
        path: path.to_path_buf(),
        source: e,
    };

    let mut text = String::new();
    rdr.read_to_string(&mut text).map_err(|e| ImportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    if !headers.iter().any(|h| h == KEY_COLUMN) {
        return Err(ImportError::MissingKeyColumn {
            path: path.to_path_buf(),
        });
    }

    let mut records = Vec::new();
    let mut skipped_rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = result.map_err(csv_err)?;
        let line = row.position().map(|p| p.line()).unwrap_or(i as u64 + 2);

        let mut fields: std::collections::BTreeMap<String, String> = headers
            .iter()
            .cloned()
            .zip(row.iter().map(str::to_string))
            .collect();

        let protocol = fields.remove(KEY_COLUMN).unwrap_or_default();
        if protocol.is_empty() {
            warn!("skipping row {line}: missing `{KEY_COLUMN}` value");
            skipped_rows.push(line);
            continue;
        }

        records.push(Record {
            protocol,
            set: fields.remove("Set").unwrap_or_default(),
            top: fields.remove("Top").unwrap_or_default(),
            bottom: fields.remove("Bottom").unwrap_or_default(),
            extra: fields,
        });
    }

    Ok(ParsedCsv {
        headers,
        records,
        skipped_rows,
    })
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Append incoming records whose key is not already present. Existing
/// records are never replaced. Duplicate keys within `incoming` collapse to
/// the first occurrence, keeping the catalog's uniqueness invariant.
/// Returns the merged catalog and the number of records appended.
pub fn merge(existing: Vec<Record>, incoming: Vec<Record>) -> (Vec<Record>, usize) {
    let mut seen: HashSet<String> = existing.iter().map(|r| r.protocol.clone()).collect();
    let mut merged = existing;
    let mut appended = 0;

    for record in incoming {
        if seen.insert(record.protocol.clone()) {
            merged.push(record);
            appended += 1;
        }
    }

    (merged, appended)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run a full import: parse `csv_path`, merge into the catalog at
/// `json_path` (which need not exist), sort by key, and write the result
/// back atomically.
pub fn run(csv_path: &Path, json_path: &Path) -> Result<ImportSummary, ImportError> {
    let file = match std::fs::File::open(csv_path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ImportError::NotFound {
                path: csv_path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(ImportError::Io {
                path: csv_path.to_path_buf(),
                source: e,
            });
        }
    };

    let parsed = parse_rows(file, csv_path)?;

    let (existing, created) = if json_path.exists() {
        (catalog::load(json_path)?, false)
    } else {
        (Vec::new(), true)
    };

    let rows_parsed = parsed.records.len();
    let (mut merged, appended) = merge(existing, parsed.records);
    merged.sort_by(|a, b| a.protocol.cmp(&b.protocol));

    catalog::save(json_path, &merged)?;
    info!(
        "imported {} of {} rows from {} into {} ({} appended)",
        rows_parsed,
        rows_parsed + parsed.skipped_rows.len(),
        csv_path.display(),
        json_path.display(),
        appended
    );

    Ok(ImportSummary {
        headers: parsed.headers,
        rows_parsed,
        skipped_rows: parsed.skipped_rows,
        created,
        appended,
        total: merged.len(),
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
