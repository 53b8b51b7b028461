use serde::{Deserialize, Serialize};

use crate::domain::prediction::PredictionResult;
use crate::domain::record::Record;
use crate::domain::traits::Predictor;
use crate::ml::featurizer::{SparseVector, TextFeaturizer};

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Dense linear scorer: score = w . x + b
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    weights: Vec<f64>,
    bias:    f64,
}

impl LinearClassifier {
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    pub fn dimension(&self) -> usize { self.weights.len() }

    pub fn score(&self, features: &SparseVector) -> f64 {
        features.dot(&self.weights) + self.bias
    }
}

/// The fitted pipeline: featurizer settings + vocabulary, and the
/// classifier trained on its output. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentModel {
    featurizer: TextFeaturizer,
    classifier: LinearClassifier,
}

impl SentimentModel {
    pub fn new(featurizer: TextFeaturizer, classifier: LinearClassifier) -> Self {
        debug_assert_eq!(featurizer.dimension(), classifier.dimension());
        Self { featurizer, classifier }
    }

    pub fn feature_count(&self) -> usize { self.featurizer.dimension() }

    /// True when featurizer and weights agree on the vector width.
    pub fn is_consistent(&self) -> bool {
        self.featurizer.dimension() == self.classifier.dimension()
    }
}

impl Predictor for SentimentModel {
    fn predict(&self, record: &Record) -> PredictionResult {
        let featurized  = self.featurizer.transform(&record.text);
        let score       = self.classifier.score(&featurized.features);
        let probability = sigmoid(score);
        PredictionResult {
            label:         probability > 0.5,
            probability,
            score,
            tokens:        featurized.tokens,
            feature_count: featurized.features.dimension,
        }
    }
}
