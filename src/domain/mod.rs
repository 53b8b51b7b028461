// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust structs, enums, and traits that define the core
// concepts of the sentiment pipeline.
//
// Rules for this layer:
//   - NO file formats (TSV, model artifact) here
//   - NO numeric training code
//   - Only data types, error types, and the capability traits
//     the other layers implement
//
// The classifier itself hides behind two operations:
//   Trainer::fit(records)   -> model
//   Predictor::predict(rec) -> PredictionResult
// so the orchestration in Layer 2 never sees the numerics.

// One row of the dataset: text plus an optional label
pub mod record;

// The per-record scoring output and display names for labels
pub mod prediction;

// Named, typed columns saved alongside a trained model
pub mod schema;

// Typed errors for each pipeline step
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
