// ============================================================
// Layer 5 - ML / Model Layer
// ============================================================
// Everything that turns text into numbers and numbers into a
// sentiment decision. Nothing outside this layer knows how the
// feature vector is built or how the weights were found.
//
//   featurizer.rs  - text -> sparse n-gram vector
//                    character trigrams + word unigrams,
//                    TF / TF-IDF weighting, L2 normalisation
//
//   model.rs       - the fitted pipeline (featurizer + linear
//                    classifier) and the logistic link
//
//   trainer.rs     - SDCA logistic regression
//                    dual coordinate ascent with a duality-gap
//                    stopping rule
//
//   evaluator.rs   - held-out scoring: accuracy, AUC, F1,
//                    log loss and friends
//
//   inferencer.rs  - prediction engine built from a saved
//                    artifact

/// Text -> sparse feature vector
pub mod featurizer;

/// Fitted sentiment model and linear scorer
pub mod model;

/// SDCA logistic regression trainer
pub mod trainer;

/// Binary classification metrics
pub mod evaluator;

/// Prediction engine over a loaded artifact
pub mod inferencer;
