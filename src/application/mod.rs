// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal:
// training a model, or scoring text with a saved one.
//
// Rules for this layer:
//   - No ML math here (that's Layer 5)
//   - No argument parsing or exit codes (that's Layer 1)
//   - Output goes to a caller-supplied writer, never straight
//     to stdout
//   - Only workflow coordination

/// Load -> split -> fit -> evaluate -> save
pub mod train_use_case;

/// Single-check and interactive scoring
pub mod score_use_case;
