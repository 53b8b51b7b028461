// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the application layer that
// don't belong to any one business layer:
//
//   model_store.rs - Saving and loading the trained model
//                    One checksummed binary file holding the
//                    schema, the fitted featurizer + weights and
//                    the config that produced them. Writes go
//                    through a temp file and a rename.
//
//   metrics.rs     - Evaluation reporting
//                    Prints the metrics banner after training and
//                    optionally appends a row per run to a CSV
//                    file for comparing runs.

/// Model artifact saving and loading
pub mod model_store;

/// Metrics console report and CSV run log
pub mod metrics;
