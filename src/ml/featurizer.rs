// ============================================================
// Layer 5 - Text Featurizer
// ============================================================
// Turns a piece of text into:
//   - the normalised word tokens (shown to the user), and
//   - a sparse n-gram count vector over a vocabulary that is
//     fixed when the featurizer is fitted.
//
// Character n-grams are taken over the normalised text framed by
// a start marker (U+0002) and an end marker (U+0003), so "good"
// with n = 3 gives: [STX]go, goo, ood, od[ETX].
//
// Vocabulary keys are prefixed by kind ("c:" char, "w:" word) so
// a word bigram can never collide with a character n-gram.
// Keys are assigned indices in sorted order, which makes the
// vocabulary (and everything trained on it) independent of hash
// iteration order.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::data::preprocessor::Preprocessor;

pub const START_MARKER: char = '\u{2}';
pub const END_MARKER: char = '\u{3}';

const CHAR_PREFIX: &str = "c:";
const WORD_PREFIX: &str = "w:";

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for",
    "from", "had", "has", "have", "he", "her", "his", "i", "in", "is", "it",
    "its", "me", "my", "of", "on", "or", "our", "she", "so", "that", "the",
    "their", "them", "there", "they", "this", "to", "was", "we", "were",
    "which", "who", "will", "with", "you", "your",
];

/// How n-gram counts become feature values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weighting {
    /// Raw term frequency
    #[default]
    Tf,
    /// Term frequency times smoothed inverse document frequency
    TfIdf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturizerOptions {
    pub preprocessor:         Preprocessor,
    pub char_ngram_length:    Option<usize>,
    /// Emit every length 1..=n instead of only n
    pub char_use_all_lengths: bool,
    pub word_ngram_length:    Option<usize>,
    pub word_use_all_lengths: bool,
    pub remove_stop_words:    bool,
    pub weighting:            Weighting,
    pub normalize_l2:         bool,
    /// Upper bound on vocabulary size; the most frequent n-grams win
    pub max_features:         usize,
}

impl Default for FeaturizerOptions {
    /// Lower-case, keep diacritics/digits/punctuation, character
    /// trigrams only, no word n-grams, no stop-word removal.
    fn default() -> Self {
        Self {
            preprocessor:         Preprocessor::new(),
            char_ngram_length:    Some(3),
            char_use_all_lengths: false,
            word_ngram_length:    None,
            word_use_all_lengths: false,
            remove_stop_words:    false,
            weighting:            Weighting::Tf,
            normalize_l2:         true,
            max_features:         10_000_000,
        }
    }
}

/// Sparse vector with a fixed logical width. Indices are strictly
/// increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub dimension: usize,
    pub indices:   Vec<u32>,
    pub values:    Vec<f64>,
}

impl SparseVector {
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.indices
            .iter()
            .zip(&self.values)
            .map(|(&i, &v)| dense[i as usize] * v)
            .sum()
    }

    pub fn squared_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum()
    }

    /// dense += scale * self
    pub fn add_scaled_to(&self, dense: &mut [f64], scale: f64) {
        for (&i, &v) in self.indices.iter().zip(&self.values) {
            dense[i as usize] += scale * v;
        }
    }
}

/// Featurizer output for one text.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturizedText {
    pub tokens:   Vec<String>,
    pub features: SparseVector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFeaturizer {
    options:    FeaturizerOptions,
    vocabulary: BTreeMap<String, u32>,
    /// One weight per vocabulary slot; empty unless TfIdf
    idf:        Vec<f64>,
}

impl TextFeaturizer {
    /// Build the vocabulary (and IDF table) from training texts.
    pub fn fit<'a>(options: FeaturizerOptions, texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq:  HashMap<String, usize> = HashMap::new();
        let mut documents  = 0usize;

        // Start with an empty vocabulary; extract_keys only needs options.
        let mut featurizer = Self {
            options,
            vocabulary: BTreeMap::new(),
            idf:        Vec::new(),
        };

        for text in texts {
            documents += 1;
            let (_, keys) = featurizer.extract_keys(text);
            for key in keys.iter().collect::<HashSet<&String>>() {
                *doc_freq.entry(key.clone()).or_insert(0) += 1;
            }
            for key in keys {
                *term_freq.entry(key).or_insert(0) += 1;
            }
        }

        // Keep the most frequent n-grams when over the cap; ties
        // broken by key so the choice is deterministic.
        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        if ranked.len() > featurizer.options.max_features {
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            ranked.truncate(featurizer.options.max_features);
        }
        let mut keys: Vec<String> = ranked.into_iter().map(|(k, _)| k).collect();
        keys.sort();

        featurizer.vocabulary = keys
            .into_iter()
            .enumerate()
            .map(|(i, k)| (k, i as u32))
            .collect();

        if featurizer.options.weighting == Weighting::TfIdf {
            // Smoothed IDF: ln((1 + n) / (1 + df)) + 1
            let n = documents as f64;
            let mut idf = vec![1.0; featurizer.vocabulary.len()];
            for (key, &index) in &featurizer.vocabulary {
                let df = doc_freq.get(key).copied().unwrap_or(0) as f64;
                idf[index as usize] = ((1.0 + n) / (1.0 + df)).ln() + 1.0;
            }
            featurizer.idf = idf;
        }

        tracing::info!(
            "Featurizer fitted on {} texts: {} n-gram features",
            documents,
            featurizer.vocabulary.len()
        );
        featurizer
    }

    /// Width of every feature vector this featurizer produces.
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    /// Normalised word tokens of `text`.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let normalized = self.options.preprocessor.clean(text);
        normalized
            .split_whitespace()
            .filter(|t| !(self.options.remove_stop_words && is_stop_word(t)))
            .map(str::to_string)
            .collect()
    }

    pub fn transform(&self, text: &str) -> FeaturizedText {
        let (tokens, keys) = self.extract_keys(text);

        // BTreeMap keeps indices sorted for the sparse layout.
        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for key in &keys {
            if let Some(&index) = self.vocabulary.get(key) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut indices = Vec::with_capacity(counts.len());
        let mut values  = Vec::with_capacity(counts.len());
        for (index, count) in counts {
            let weight = self.idf.get(index as usize).copied().unwrap_or(1.0);
            indices.push(index);
            values.push(count * weight);
        }

        if self.options.normalize_l2 {
            let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                values.iter_mut().for_each(|v| *v /= norm);
            }
        }

        FeaturizedText {
            tokens,
            features: SparseVector { dimension: self.dimension(), indices, values },
        }
    }

    /// Tokens plus every vocabulary key (with repeats) for `text`.
    fn extract_keys(&self, text: &str) -> (Vec<String>, Vec<String>) {
        let tokens = self.tokens(text);
        let mut keys = Vec::new();

        if let Some(n) = self.options.char_ngram_length.filter(|&n| n > 0) {
            // Char n-grams see the tokens re-joined, so stop-word
            // removal applies to both feature kinds.
            let framed: Vec<char> = std::iter::once(START_MARKER)
                .chain(tokens.join(" ").chars())
                .chain(std::iter::once(END_MARKER))
                .collect();
            for len in ngram_lengths(n, self.options.char_use_all_lengths) {
                for window in framed.windows(len) {
                    let mut key = String::with_capacity(CHAR_PREFIX.len() + len * 4);
                    key.push_str(CHAR_PREFIX);
                    key.extend(window.iter());
                    keys.push(key);
                }
            }
        }

        if let Some(n) = self.options.word_ngram_length.filter(|&n| n > 0) {
            for len in ngram_lengths(n, self.options.word_use_all_lengths) {
                for window in tokens.windows(len) {
                    keys.push(format!("{WORD_PREFIX}{}", window.join(" ")));
                }
            }
        }

        (tokens, keys)
    }
}

fn ngram_lengths(n: usize, all_lengths: bool) -> std::ops::RangeInclusive<usize> {
    if all_lengths { 1..=n } else { n..=n }
}

fn is_stop_word(token: &str) -> bool {
    let lower = token.to_lowercase();
    ENGLISH_STOP_WORDS.contains(&lower.as_str())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn fitted(texts: &[&str]) -> TextFeaturizer {
        TextFeaturizer::fit(FeaturizerOptions::default(), texts.iter().copied())
    }

    #[test]
    fn test_char_trigrams_with_markers() {
        let f = fitted(&["Good"]);
        // [STX]go, goo, ood, od[ETX]
        assert_eq!(f.dimension(), 4);
        let out = f.transform("good");
        assert_eq!(out.tokens, vec!["good"]);
        assert_eq!(out.features.nnz(), 4);
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let f   = fitted(&["good product", "bad product"]);
        let out = f.transform("good good product");
        assert!((out.features.squared_norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_ngrams_are_ignored() {
        let f   = fitted(&["abc"]);
        let out = f.transform("xyz");
        assert_eq!(out.features.nnz(), 0);
        assert_eq!(out.features.dimension, f.dimension());
    }

    #[test]
    fn test_empty_text() {
        let f   = fitted(&["good"]);
        let out = f.transform("");
        assert!(out.tokens.is_empty());
        assert_eq!(out.features.nnz(), 0);
    }

    #[test]
    fn test_indices_sorted_and_in_range() {
        let f   = fitted(&["the quick brown fox", "jumps over the lazy dog"]);
        let out = f.transform("the lazy fox");
        assert!(out.features.indices.windows(2).all(|w| w[0] < w[1]));
        assert!(out.features.indices.iter().all(|&i| (i as usize) < f.dimension()));
    }

    #[test]
    fn test_word_ngrams_and_stop_words() {
        let options = FeaturizerOptions {
            char_ngram_length: None,
            word_ngram_length: Some(2),
            word_use_all_lengths: true,
            remove_stop_words: true,
            ..FeaturizerOptions::default()
        };
        let f = TextFeaturizer::fit(options, ["this is a great movie"]);
        // tokens: great, movie -> unigrams great, movie + bigram "great movie"
        assert_eq!(f.dimension(), 3);
        assert_eq!(f.tokens("This is a GREAT movie"), vec!["great", "movie"]);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let options = FeaturizerOptions {
            char_ngram_length: None,
            word_ngram_length: Some(1),
            max_features: 1,
            ..FeaturizerOptions::default()
        };
        let f = TextFeaturizer::fit(options, ["good good bad"]);
        assert_eq!(f.dimension(), 1);
        assert_eq!(f.transform("good").features.nnz(), 1);
        assert_eq!(f.transform("bad").features.nnz(), 0);
    }

    #[test]
    fn test_tfidf_downweights_common_terms() {
        let options = FeaturizerOptions {
            char_ngram_length: None,
            word_ngram_length: Some(1),
            weighting: Weighting::TfIdf,
            normalize_l2: false,
            ..FeaturizerOptions::default()
        };
        let f   = TextFeaturizer::fit(options, ["common rare", "common", "common"]);
        let out = f.transform("common rare");
        // sorted vocabulary: common -> 0, rare -> 1
        assert!(out.features.values[0] < out.features.values[1]);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let texts = ["good product", "bad product", "meh"];
        assert_eq!(fitted(&texts), fitted(&texts));
    }
}
