// ============================================================
// Layer 1 - CLI Arguments
// ============================================================
// The configuration flags shared by every pipeline step. They
// are flattened into the top-level Cli so one invocation can
// train and then score with the same --model path.
//
// clap's derive macros generate --help text, error messages for
// bad values, and type conversion (string -> u64, f64, ...).

use clap::Args;

use crate::application::train_use_case::TrainConfig;
use crate::data::loader::LabelFormat;
use crate::domain::prediction::LabelNames;

#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Tab-separated training file: header row, then text<TAB>label
    #[arg(long, value_name = "PATH", default_value = "data/sentiment_train.tsv")]
    pub data: String,

    /// Where the trained model is written and read from
    #[arg(long, value_name = "PATH", default_value = "models/sentiment_model.bin")]
    pub model: String,

    /// Seed for the train/test split and the SDCA visit order
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value_t = 0.1, value_parser = parse_test_fraction)]
    pub test_fraction: f64,

    /// Accepted label spellings: auto (true/false or 1/0), words, digits
    #[arg(long, value_name = "FORMAT", default_value = "auto")]
    pub label_format: LabelFormat,

    /// L2 regularisation strength
    #[arg(long, default_value_t = 1e-3, value_parser = parse_l2)]
    pub l2: f64,

    /// Maximum SDCA passes over the training data
    #[arg(long, default_value_t = 100, value_parser = parse_max_epochs)]
    pub max_epochs: usize,

    /// Display name for a positive prediction
    #[arg(long, default_value = "positive")]
    pub positive_name: String,

    /// Display name for a negative prediction
    #[arg(long, default_value = "negative")]
    pub negative_name: String,

    /// Append one row of evaluation metrics per run to this CSV
    #[arg(long, value_name = "PATH")]
    pub metrics_log: Option<String>,
}

// ─── Value Parsers ────────────────────────────────────────────────────────────
// Out-of-range numbers are usage errors, rejected before any step runs.

fn parse_test_fraction(raw: &str) -> Result<f64, String> {
    let v: f64 = raw.parse().map_err(|e| format!("'{raw}' is not a number: {e}"))?;
    if (0.0..1.0).contains(&v) {
        Ok(v)
    } else {
        Err(format!("{v} is outside [0, 1)"))
    }
}

fn parse_l2(raw: &str) -> Result<f64, String> {
    let v: f64 = raw.parse().map_err(|e| format!("'{raw}' is not a number: {e}"))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("{v} must be a finite number greater than 0"))
    }
}

fn parse_max_epochs(raw: &str) -> Result<usize, String> {
    let v: usize = raw.parse().map_err(|e| format!("'{raw}' is not a whole number: {e}"))?;
    if v >= 1 {
        Ok(v)
    } else {
        Err("at least one epoch is required".to_string())
    }
}

/// The application layer never sees clap types.
impl From<&PipelineArgs> for TrainConfig {
    fn from(a: &PipelineArgs) -> Self {
        TrainConfig {
            data_path:         a.data.clone(),
            model_path:        a.model.clone(),
            seed:              a.seed,
            test_fraction:     a.test_fraction,
            label_format:      a.label_format,
            l2_regularization: a.l2,
            max_epochs:        a.max_epochs,
            metrics_log:       a.metrics_log.clone(),
        }
    }
}

impl From<&PipelineArgs> for LabelNames {
    fn from(a: &PipelineArgs) -> Self {
        LabelNames::new(a.positive_name.clone(), a.negative_name.clone())
    }
}
