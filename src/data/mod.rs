// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything between the TSV file on disk and the records the
// trainer sees.
//
//   dataset.tsv
//       │
//       ▼
//   TsvLoader         -> reads rows, parses labels
//       │
//       ▼
//   Dataset           -> ordered records
//       │
//       ▼
//   splitter          -> seeded shuffle, train/test split
//
// Preprocessor is used later by the featurizer (Layer 5) but
// lives here because it is plain text cleaning.

/// Loads labelled records from a tab-separated file
pub mod loader;

/// Normalises raw text (case, diacritics, digits, punctuation)
pub mod preprocessor;

/// Ordered records and the one-time train/test split
pub mod dataset;

/// Seeded shuffle + split
pub mod splitter;
