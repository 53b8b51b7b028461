// ============================================================
// Layer 4 - Text Preprocessor
// ============================================================
// Normalises raw text before it is tokenised and turned into
// n-gram features. Runs identically at training and scoring
// time; the settings are saved inside the model artifact.
//
// Cleaning steps (applied in order):
//   1. Strip diacritics (NFD, then drop combining marks)  [optional]
//   2. Replace tabs and control characters with a space
//   3. Apply the case mode (lower / upper / none)
//   4. Drop digits                                        [optional]
//   5. Drop punctuation and symbols                       [optional]
//   6. Collapse runs of whitespace to one space and trim
//
// The default keeps diacritics, digits and punctuation and only
// lower-cases.

use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// How letters are cased after normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaseMode {
    #[default]
    Lower,
    Upper,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub case_mode:        CaseMode,
    pub keep_diacritics:  bool,
    pub keep_numbers:     bool,
    pub keep_punctuation: bool,
}

impl Preprocessor {
    /// Lower-case only; everything else is kept.
    pub fn new() -> Self {
        Self {
            case_mode:        CaseMode::Lower,
            keep_diacritics:  true,
            keep_numbers:     true,
            keep_punctuation: true,
        }
    }

    pub fn with_case_mode(mut self, case_mode: CaseMode) -> Self {
        self.case_mode = case_mode;
        self
    }

    pub fn with_keep_diacritics(mut self, keep: bool) -> Self {
        self.keep_diacritics = keep;
        self
    }

    pub fn with_keep_numbers(mut self, keep: bool) -> Self {
        self.keep_numbers = keep;
        self
    }

    pub fn with_keep_punctuation(mut self, keep: bool) -> Self {
        self.keep_punctuation = keep;
        self
    }

    /// Clean a raw text string for downstream tokenisation.
    pub fn clean(&self, text: &str) -> String {
        // ── Step 1: Diacritics ────────────────────────────────────────────────
        // NFD splits "é" into "e" + U+0301; dropping the combining
        // mark leaves the base letter.
        let decomposed: String = if self.keep_diacritics {
            text.to_string()
        } else {
            text.nfd().filter(|c| !is_combining_mark(*c)).collect()
        };

        // ── Steps 2-5: Character filtering and casing ─────────────────────────
        let mut filtered = String::with_capacity(decomposed.len());
        for c in decomposed.chars() {
            if c.is_control() || c == '\u{00A0}' || c == '\u{FEFF}' {
                filtered.push(' ');
                continue;
            }
            if !self.keep_numbers && c.is_numeric() {
                continue;
            }
            if !self.keep_punctuation && is_punctuation(c) {
                continue;
            }
            match self.case_mode {
                CaseMode::Lower => filtered.extend(c.to_lowercase()),
                CaseMode::Upper => filtered.extend(c.to_uppercase()),
                CaseMode::None  => filtered.push(c),
            }
        }

        // ── Step 6: Whitespace ────────────────────────────────────────────────
        filtered.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Anything that is neither a letter/digit nor whitespace.
fn is_punctuation(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}
