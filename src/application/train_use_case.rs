// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the TSV dataset       (Layer 4 - data)
//   Step 2: Seeded train/test split    (Layer 4 - data)
//   Step 3: Fit featurizer + SDCA      (Layer 5 - ml)
//   Step 4: Score the held-out subset  (Layer 5 - ml)
//   Step 5: Print / log metrics        (Layer 6 - infra)
//   Step 6: Save the model artifact    (Layer 6 - infra)
//
// A failure in steps 1-3 leaves any existing model file
// untouched; the artifact is only written in step 6.

use std::io::Write;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::{Dataset, SplitOptions},
    loader::{LabelFormat, TsvLoader},
};
use crate::domain::schema::ModelSchema;
use crate::domain::traits::{DatasetSource, FitOptions, Trainer};
use crate::infra::{
    metrics::{print_binary_metrics, MetricsLogger, RunMetrics},
    model_store::{ArtifactMetadata, ModelStore},
};
use crate::ml::{
    evaluator::{evaluate, BinaryMetrics},
    featurizer::FeaturizerOptions,
    trainer::{SdcaOptions, SdcaSummary, SdcaTrainer},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a training run depends on. Serialisable so the exact
// configuration is embedded in the saved artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:         String,
    pub model_path:        String,
    pub seed:              u64,
    pub test_fraction:     f64,
    pub label_format:      LabelFormat,
    pub l2_regularization: f64,
    pub max_epochs:        usize,
    pub metrics_log:       Option<String>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        let sdca = SdcaOptions::default();
        Self {
            data_path:         "data/sentiment_train.tsv".to_string(),
            model_path:        "models/sentiment_model.bin".to_string(),
            seed:              1,
            test_fraction:     0.1,
            label_format:      LabelFormat::Auto,
            l2_regularization: sdca.l2_regularization,
            max_epochs:        sdca.max_epochs,
            metrics_log:       None,
        }
    }
}

/// What a finished training run produced.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub train_rows:    usize,
    pub test_rows:     usize,
    pub feature_count: usize,
    pub summary:       SdcaSummary,
    pub metrics:       BinaryMetrics,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline end to end, writing the report to `out`.
    pub fn execute(&self, out: &mut impl Write) -> Result<TrainReport> {
        let cfg = &self.config;

        // ── Step 1: Load the dataset ──────────────────────────────────────────
        tracing::info!("Loading dataset from '{}'", cfg.data_path);
        let loader  = TsvLoader::new(&cfg.data_path, cfg.label_format);
        let records = loader
            .load_all()
            .with_context(|| format!("Failed to load dataset '{}'", cfg.data_path))?;
        let dataset = Dataset::new(records);
        tracing::info!(
            "Loaded {} records ({} positive)",
            dataset.len(),
            dataset.positive_count()
        );

        // ── Step 2: Train / test split ────────────────────────────────────────
        let split = dataset.split(SplitOptions {
            test_fraction: cfg.test_fraction,
            seed:          cfg.seed,
        });
        tracing::info!("Split: {} train, {} test", split.train.len(), split.test.len());

        // ── Step 3: Fit ───────────────────────────────────────────────────────
        let trainer = SdcaTrainer::new(
            FeaturizerOptions::default(),
            SdcaOptions {
                l2_regularization: cfg.l2_regularization,
                max_epochs:        cfg.max_epochs,
                ..SdcaOptions::default()
            },
        );
        let (model, summary) = trainer
            .fit_with_summary(&split.train, &FitOptions { seed: cfg.seed })
            .context("Training failed")?;

        // ── Step 4: Evaluate on the held-out subset ───────────────────────────
        if split.test.is_empty() {
            tracing::warn!("Test set is empty; metrics are reported as zero");
        }
        let metrics = evaluate(&model, &split.test);

        // ── Step 5: Report ────────────────────────────────────────────────────
        print_binary_metrics(trainer.name(), &metrics, out)?;

        let report = TrainReport {
            train_rows:    split.train.len(),
            test_rows:     split.test.len(),
            feature_count: model.feature_count(),
            summary,
            metrics,
        };

        if let Some(path) = &cfg.metrics_log {
            MetricsLogger::new(path)?.log(&RunMetrics {
                seed:       cfg.seed,
                l2:         cfg.l2_regularization,
                train_rows: report.train_rows,
                test_rows:  report.test_rows,
                features:   report.feature_count,
                epochs:     report.summary.epochs,
                converged:  report.summary.converged,
                metrics:    report.metrics.clone(),
            })?;
        }

        // ── Step 6: Save ──────────────────────────────────────────────────────
        let store    = ModelStore::new(&cfg.model_path);
        let schema   = ModelSchema::for_features(model.feature_count());
        let metadata = ArtifactMetadata {
            trainer:       trainer.name().to_string(),
            seed:          cfg.seed,
            training_rows: report.train_rows,
            train_config:  serde_json::to_string_pretty(cfg)?,
            created_by:    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        };
        store
            .save(&model, &schema, &metadata)
            .with_context(|| format!("Failed to save model to '{}'", cfg.model_path))?;

        writeln!(out, "The model is saved to {}", store.path().display())?;
        Ok(report)
    }
}
