// ============================================================
// Layer 3 - Model Schema
// ============================================================
// Describes the columns a trained model reads and produces.
// Saved next to the model in the artifact so a loader can
// check the feature width before any scoring happens.

use serde::{Deserialize, Serialize};

pub const TEXT_COLUMN: &str = "Text";
pub const LABEL_COLUMN: &str = "Label";
pub const FEATURES_COLUMN: &str = "Features";
pub const TOKENS_COLUMN: &str = "OutputTokens";
pub const PREDICTED_LABEL_COLUMN: &str = "PredictedLabel";
pub const SCORE_COLUMN: &str = "Score";
pub const PROBABILITY_COLUMN: &str = "Probability";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    String,
    Boolean,
    Float64,
    /// Fixed-width when `size` is set, variable-length otherwise
    Vector { item: Box<ColumnKind>, size: Option<usize> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: &str, kind: ColumnKind) -> Self {
        Self { name: name.to_string(), kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSchema {
    pub inputs:  Vec<Column>,
    pub outputs: Vec<Column>,
}

impl ModelSchema {
    /// Schema of a sentiment model whose feature vector has
    /// `feature_count` slots.
    pub fn for_features(feature_count: usize) -> Self {
        Self {
            inputs: vec![
                Column::new(TEXT_COLUMN, ColumnKind::String),
                Column::new(LABEL_COLUMN, ColumnKind::Boolean),
            ],
            outputs: vec![
                Column::new(
                    FEATURES_COLUMN,
                    ColumnKind::Vector {
                        item: Box::new(ColumnKind::Float64),
                        size: Some(feature_count),
                    },
                ),
                Column::new(
                    TOKENS_COLUMN,
                    ColumnKind::Vector {
                        item: Box::new(ColumnKind::String),
                        size: None,
                    },
                ),
                Column::new(PREDICTED_LABEL_COLUMN, ColumnKind::Boolean),
                Column::new(SCORE_COLUMN, ColumnKind::Float64),
                Column::new(PROBABILITY_COLUMN, ColumnKind::Float64),
            ],
        }
    }

    /// Declared width of the `Features` output column, if any.
    pub fn feature_width(&self) -> Option<usize> {
        self.outputs
            .iter()
            .find(|c| c.name == FEATURES_COLUMN)
            .and_then(|c| match &c.kind {
                ColumnKind::Vector { size, .. } => *size,
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_width() {
        let schema = ModelSchema::for_features(42);
        assert_eq!(schema.feature_width(), Some(42));
        assert_eq!(schema.inputs.len(), 2);
    }

    #[test]
    fn test_feature_width_missing() {
        let schema = ModelSchema { inputs: Vec::new(), outputs: Vec::new() };
        assert_eq!(schema.feature_width(), None);
    }
}
