// ============================================================
// Layer 4 - Dataset Loader
// ============================================================
// Loads the training dataset from a tab-separated file using the
// csv crate.
//
// Expected layout:
//   Text<TAB>Label            <- header row (required, names free)
//   this is great<TAB>true
//   awful service<TAB>0
//
// Column 0 is free text, column 1 the boolean label. Any row
// with a different column count is rejected with its line number.
// Quoting is disabled so reviews may contain '"' characters.

use std::{fs::File, io, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::error::DatasetLoadError;
use crate::domain::record::Record;
use crate::domain::traits::DatasetSource;

/// Number of columns every row must have: text, label.
const EXPECTED_COLUMNS: usize = 2;

/// Which spellings are accepted in the label column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelFormat {
    /// `true`/`false` or `1`/`0`, case-insensitive
    #[default]
    Auto,
    /// `true`/`false` only
    Words,
    /// `1`/`0` only
    Digits,
}

impl LabelFormat {
    /// Parse one label cell. Returns None when the cell is not a
    /// boolean under this convention.
    pub fn parse(&self, raw: &str) -> Option<bool> {
        let raw = raw.trim();
        let word = || {
            if raw.eq_ignore_ascii_case("true") {
                Some(true)
            } else if raw.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        };
        let digit = || match raw {
            "1" => Some(true),
            "0" => Some(false),
            _   => None,
        };
        match self {
            LabelFormat::Auto   => word().or_else(digit),
            LabelFormat::Words  => word(),
            LabelFormat::Digits => digit(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            LabelFormat::Auto   => "true/false or 1/0",
            LabelFormat::Words  => "true/false",
            LabelFormat::Digits => "1/0",
        }
    }
}

impl FromStr for LabelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto"   => Ok(LabelFormat::Auto),
            "words"  => Ok(LabelFormat::Words),
            "digits" => Ok(LabelFormat::Digits),
            other    => Err(format!(
                "unknown label format '{other}' (expected auto, words or digits)"
            )),
        }
    }
}

/// Loads labelled records from a TSV file.
/// Implements the DatasetSource trait from Layer 3.
pub struct TsvLoader {
    path:         PathBuf,
    label_format: LabelFormat,
}

impl TsvLoader {
    pub fn new(path: impl Into<PathBuf>, label_format: LabelFormat) -> Self {
        Self { path: path.into(), label_format }
    }

    fn malformed(&self, line: u64, reason: impl Into<String>) -> DatasetLoadError {
        DatasetLoadError::Malformed {
            path:   self.path.clone(),
            line,
            reason: reason.into(),
        }
    }

    /// Map a csv error onto the dataset error kinds. I/O failures
    /// stay I/O failures; everything else is a malformed row.
    fn csv_error(&self, err: csv::Error) -> DatasetLoadError {
        let line   = err.position().map(|p| p.line()).unwrap_or(0);
        let reason = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => DatasetLoadError::Io {
                path: self.path.clone(),
                source,
            },
            _ => self.malformed(line, reason),
        }
    }
}

impl DatasetSource for TsvLoader {
    fn load_all(&self) -> Result<Vec<Record>, DatasetLoadError> {
        let file = File::open(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                DatasetLoadError::NotFound { path: self.path.clone() }
            } else {
                DatasetLoadError::Io { path: self.path.clone(), source }
            }
        })?;

        // flexible(true) lets us report the column count ourselves
        // with a clearer message than csv's UnequalLengths error.
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .quoting(false)
            .flexible(true)
            .from_reader(file);

        // ── Header row ────────────────────────────────────────────────────────
        let headers = reader.headers().map_err(|e| self.csv_error(e))?.clone();
        if headers.is_empty() {
            return Err(DatasetLoadError::MissingHeader { path: self.path.clone() });
        }
        if headers.len() != EXPECTED_COLUMNS {
            return Err(self.malformed(
                1,
                format!(
                    "header has {} columns, expected {} (text, label)",
                    headers.len(),
                    EXPECTED_COLUMNS
                ),
            ));
        }

        // ── Data rows ─────────────────────────────────────────────────────────
        let mut records = Vec::new();
        for row in reader.records() {
            let row  = row.map_err(|e| self.csv_error(e))?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);

            if row.len() != EXPECTED_COLUMNS {
                return Err(self.malformed(
                    line,
                    format!("found {} columns, expected {}", row.len(), EXPECTED_COLUMNS),
                ));
            }

            let label = self.label_format.parse(&row[1]).ok_or_else(|| {
                self.malformed(
                    line,
                    format!(
                        "label '{}' is not {}",
                        &row[1],
                        self.label_format.describe()
                    ),
                )
            })?;

            records.push(Record::labeled(&row[0], label));
        }

        if records.is_empty() {
            return Err(DatasetLoadError::Empty { path: self.path.clone() });
        }

        tracing::info!(
            "Loaded {} records from '{}'",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}
