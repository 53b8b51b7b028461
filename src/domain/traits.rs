// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The orchestration code in Layer 2 only talks to these traits.
// Swapping the in-crate SDCA trainer for another numeric library
// (or a remote scoring call) means implementing Trainer and
// Predictor, nothing else.

use serde::{Deserialize, Serialize};

use crate::domain::error::{DatasetLoadError, TrainError};
use crate::domain::prediction::PredictionResult;
use crate::domain::record::Record;

// ─── DatasetSource ────────────────────────────────────────────────────────────
/// Any component that can load labelled records.
///
/// Implementations:
///   - TsvLoader -> reads a tab-separated file with a header row
pub trait DatasetSource {
    /// Load every record, in file order.
    fn load_all(&self) -> Result<Vec<Record>, DatasetLoadError>;
}

// ─── FitOptions ───────────────────────────────────────────────────────────────
/// Explicit fit-time configuration. The seed travels with the call
/// instead of living in process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitOptions {
    pub seed: u64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self { seed: 1 }
    }
}

// ─── Trainer ──────────────────────────────────────────────────────────────────
/// Fits a model from labelled records.
pub trait Trainer {
    type Model: Predictor;

    /// Short name printed in the metrics banner.
    fn name(&self) -> &str;

    fn fit(&self, training: &[Record], options: &FitOptions) -> Result<Self::Model, TrainError>;
}

// ─── Predictor ────────────────────────────────────────────────────────────────
/// Scores one record at a time. Implementations must not mutate
/// themselves: the same record always gets the same result.
pub trait Predictor {
    fn predict(&self, record: &Record) -> PredictionResult;
}
