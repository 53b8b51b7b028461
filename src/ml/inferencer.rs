// ============================================================
// Layer 5 - Inferencer
// ============================================================
use crate::domain::error::ModelLoadError;
use crate::domain::prediction::PredictionResult;
use crate::domain::record::Record;
use crate::domain::schema::ModelSchema;
use crate::domain::traits::Predictor;
use crate::infra::model_store::ModelStore;
use crate::ml::model::SentimentModel;

/// Single-record prediction over a model loaded from disk.
/// Built once, then reused for every input line.
pub struct PredictionEngine {
    model:  SentimentModel,
    schema: ModelSchema,
}

impl PredictionEngine {
    pub fn new(model: SentimentModel, schema: ModelSchema) -> Self {
        Self { model, schema }
    }

    pub fn from_store(store: &ModelStore) -> Result<Self, ModelLoadError> {
        let artifact = store.load()?;
        tracing::info!(
            path     = %store.path().display(),
            trainer  = %artifact.metadata.trainer,
            features = artifact.model.feature_count(),
            "Model loaded"
        );
        Ok(Self::new(artifact.model, artifact.schema))
    }

    pub fn schema(&self) -> &ModelSchema { &self.schema }

    pub fn feature_count(&self) -> usize { self.model.feature_count() }

    pub fn predict(&self, record: &Record) -> PredictionResult {
        self.model.predict(record)
    }

    pub fn predict_text(&self, text: &str) -> PredictionResult {
        self.predict(&Record::unlabeled(text))
    }
}
