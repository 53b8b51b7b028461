use serde::{Deserialize, Serialize};

/// Output of scoring one record. Read-only; discarded after display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted class (`true` = positive)
    pub label: bool,

    /// Probability of the positive class, in [0, 1]
    pub probability: f64,

    /// Raw linear score before the sigmoid
    pub score: f64,

    /// Normalised word tokens the featurizer saw
    pub tokens: Vec<String>,

    /// Width of the feature vector (vocabulary size)
    pub feature_count: usize,
}

impl PredictionResult {
    pub fn tokens_joined(&self) -> String {
        self.tokens.join(",")
    }
}

/// Display names for the two classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelNames {
    pub positive: String,
    pub negative: String,
}

impl LabelNames {
    pub fn new(positive: impl Into<String>, negative: impl Into<String>) -> Self {
        Self {
            positive: positive.into(),
            negative: negative.into(),
        }
    }

    pub fn name_for(&self, label: bool) -> &str {
        if label { &self.positive } else { &self.negative }
    }
}

impl Default for LabelNames {
    fn default() -> Self {
        Self::new("positive", "negative")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_names() {
        let names = LabelNames::default();
        assert_eq!(names.name_for(true), "positive");
        assert_eq!(names.name_for(false), "negative");
    }

    #[test]
    fn test_tokens_joined() {
        let p = PredictionResult {
            label:         true,
            probability:   0.9,
            score:         2.2,
            tokens:        vec!["good".into(), "product".into()],
            feature_count: 10,
        };
        assert_eq!(p.tokens_joined(), "good,product");
    }
}
