// ============================================================
// Layer 3 - Record Domain Type
// ============================================================
// A single text sample. Records loaded from the dataset always
// carry a label; a record built for scoring has none.

use serde::{Deserialize, Serialize};

/// One row of the sentiment dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Free text, exactly as read from the file or the command line
    pub text: String,

    /// `Some(true)` for the positive class, `Some(false)` for the
    /// negative class, `None` when the record is only being scored
    pub label: Option<bool>,
}

impl Record {
    /// A training/evaluation record with a known label.
    pub fn labeled(text: impl Into<String>, label: bool) -> Self {
        Self {
            text:  text.into(),
            label: Some(label),
        }
    }

    /// A record to be scored; the label is unset.
    pub fn unlabeled(text: impl Into<String>) -> Self {
        Self {
            text:  text.into(),
            label: None,
        }
    }

    pub fn is_labeled(&self) -> bool {
        self.label.is_some()
    }
}
