// ============================================================
// Layer 5 - SDCA Logistic Regression Trainer
// ============================================================
// Fits an L2-regularised logistic regression with stochastic
// dual coordinate ascent (Shalev-Shwartz & Zhang, 2013).
//
// Primal:
//   P(w) = (1/n) Σ log(1 + exp(-y_i w·x_i)) + (λ/2)‖w‖²
//
// Each example owns a dual variable b_i ∈ [0, 1] and
//   w = (1/(λn)) Σ y_i b_i x_i
//
// One coordinate step picks example i and solves the 1-D problem
//   ln((1 - b')/b') - y_i w·x_i - (b' - b_i) ‖x_i‖²/(λn) = 0
// for b' (bracketed Newton), then moves w by y_i (b' - b_i) x_i/(λn).
//
// The dual objective
//   D(b) = (1/n) Σ H(b_i) - (λ/2)‖w‖²,   H = binary entropy
// never exceeds P(w), so P - D (the duality gap) bounds how far
// we are from the optimum and serves as the stopping rule.
//
// The bias is an extra feature fixed at 1 and is regularised like
// the other weights. Examples are visited in a fresh shuffled
// order every epoch, seeded from FitOptions.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::error::TrainError;
use crate::domain::record::Record;
use crate::domain::traits::{FitOptions, Trainer};
use crate::ml::featurizer::{FeaturizerOptions, SparseVector, TextFeaturizer};
use crate::ml::model::{LinearClassifier, SentimentModel};

/// Dual variables are kept strictly inside (0, 1).
const DUAL_EPSILON: f64 = 1e-12;
const MAX_NEWTON_STEPS: usize = 50;
const NEWTON_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdcaOptions {
    pub l2_regularization: f64,
    pub max_epochs:        usize,
    /// Stop once the duality gap drops below this
    pub tolerance:         f64,
    pub fit_bias:          bool,
}

impl Default for SdcaOptions {
    fn default() -> Self {
        Self {
            l2_regularization: 1e-3,
            max_epochs:        100,
            tolerance:         1e-4,
            fit_bias:          true,
        }
    }
}

/// How the solver finished.
#[derive(Debug, Clone, PartialEq)]
pub struct SdcaSummary {
    pub epochs:       usize,
    pub converged:    bool,
    pub primal:       f64,
    pub duality_gap:  f64,
}

/// Featurizer + SDCA solver behind the Trainer trait.
#[derive(Debug, Clone, Default)]
pub struct SdcaTrainer {
    featurizer: FeaturizerOptions,
    sdca:       SdcaOptions,
}

impl SdcaTrainer {
    pub fn new(featurizer: FeaturizerOptions, sdca: SdcaOptions) -> Self {
        Self { featurizer, sdca }
    }

    /// Run SDCA on already-featurized examples. `labels` are ±1.
    pub fn solve(
        &self,
        examples:  &[SparseVector],
        labels:    &[f64],
        dimension: usize,
        seed:      u64,
    ) -> (LinearClassifier, SdcaSummary) {
        let n      = examples.len();
        let lambda = self.sdca.l2_regularization.max(f64::MIN_POSITIVE);
        let scale  = 1.0 / (lambda * n as f64);
        let bias_term = if self.sdca.fit_bias { 1.0 } else { 0.0 };

        let mut weights = vec![0.0; dimension];
        let mut bias    = 0.0;
        let mut duals   = vec![0.0; n];

        // ‖x_i‖² including the constant bias feature
        let sq_norms: Vec<f64> = examples
            .iter()
            .map(|x| x.squared_norm() + bias_term)
            .collect();

        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);

        let mut summary = SdcaSummary {
            epochs:      0,
            converged:   false,
            primal:      f64::NAN,
            duality_gap: f64::INFINITY,
        };

        for epoch in 1..=self.sdca.max_epochs {
            order.shuffle(&mut rng);

            for &i in &order {
                let x      = &examples[i];
                let y      = labels[i];
                let margin = y * (x.dot(&weights) + bias * bias_term);
                let q      = sq_norms[i] * scale;

                let current = duals[i];
                let updated = solve_coordinate(current, margin, q);
                let delta   = updated - current;
                if delta == 0.0 {
                    continue;
                }
                duals[i] = updated;

                let step = y * delta * scale;
                x.add_scaled_to(&mut weights, step);
                bias += step * bias_term;
            }

            let (primal, dual) = objectives(examples, labels, &weights, bias, &duals, lambda);
            summary.epochs      = epoch;
            summary.primal      = primal;
            summary.duality_gap = primal - dual;

            tracing::debug!(
                "SDCA epoch {:>3} | primal={:.6} | dual={:.6} | gap={:.3e}",
                epoch, primal, dual, summary.duality_gap,
            );

            if summary.duality_gap <= self.sdca.tolerance {
                summary.converged = true;
                break;
            }
        }

        (LinearClassifier::new(weights, bias), summary)
    }
}

impl SdcaTrainer {
    /// Fit, also returning how the solver finished.
    pub fn fit_with_summary(
        &self,
        training: &[Record],
        options:  &FitOptions,
    ) -> Result<(SentimentModel, SdcaSummary), TrainError> {
        if training.is_empty() {
            return Err(TrainError::EmptyTrainingSet);
        }

        let labels: Vec<f64> = training
            .iter()
            .enumerate()
            .map(|(index, r)| match r.label {
                Some(true)  => Ok(1.0),
                Some(false) => Ok(-1.0),
                None        => Err(TrainError::MissingLabel { index }),
            })
            .collect::<Result<_, _>>()?;

        // ── Step 1: Vocabulary from the training texts only ───────────────────
        let featurizer = TextFeaturizer::fit(
            self.featurizer.clone(),
            training.iter().map(|r| r.text.as_str()),
        );

        // ── Step 2: Featurize every training example ──────────────────────────
        let examples: Vec<SparseVector> = training
            .iter()
            .map(|r| featurizer.transform(&r.text).features)
            .collect();

        // ── Step 3: Dual coordinate ascent ────────────────────────────────────
        let (classifier, summary) =
            self.solve(&examples, &labels, featurizer.dimension(), options.seed);

        if summary.converged {
            tracing::info!(
                "SDCA converged after {} epochs (gap {:.3e})",
                summary.epochs, summary.duality_gap
            );
        } else {
            tracing::warn!(
                "SDCA stopped after {} epochs without reaching tolerance (gap {:.3e})",
                summary.epochs, summary.duality_gap
            );
        }

        Ok((SentimentModel::new(featurizer, classifier), summary))
    }
}

impl Trainer for SdcaTrainer {
    type Model = SentimentModel;

    fn name(&self) -> &str {
        "SdcaLogisticRegression"
    }

    fn fit(&self, training: &[Record], options: &FitOptions) -> Result<SentimentModel, TrainError> {
        self.fit_with_summary(training, options).map(|(model, _)| model)
    }
}

/// Solve ln((1-b)/b) - margin - (b - current)·q = 0 for b in (0, 1).
///
/// The left side is strictly decreasing in b, so a Newton step
/// that leaves the current bracket is replaced by bisection.
fn solve_coordinate(current: f64, margin: f64, q: f64) -> f64 {
    let mut lo = 0.0;
    let mut hi = 1.0;
    let mut b  = if current > DUAL_EPSILON && current < 1.0 - DUAL_EPSILON {
        current
    } else {
        0.5
    };

    for _ in 0..MAX_NEWTON_STEPS {
        let g = ((1.0 - b) / b).ln() - margin - (b - current) * q;
        if g.abs() < NEWTON_TOLERANCE {
            break;
        }
        if g > 0.0 { lo = b; } else { hi = b; }

        let slope = -1.0 / (b * (1.0 - b)) - q;
        let next  = b - g / slope;
        b = if next > lo && next < hi { next } else { 0.5 * (lo + hi) };
    }

    b.clamp(DUAL_EPSILON, 1.0 - DUAL_EPSILON)
}

/// Primal and dual objective values for the current iterate.
fn objectives(
    examples: &[SparseVector],
    labels:   &[f64],
    weights:  &[f64],
    bias:     f64,
    duals:    &[f64],
    lambda:   f64,
) -> (f64, f64) {
    let n   = examples.len() as f64;
    let reg = 0.5 * lambda * (weights.iter().map(|w| w * w).sum::<f64>() + bias * bias);

    let loss: f64 = examples
        .iter()
        .zip(labels)
        .map(|(x, &y)| log1p_exp(-y * (x.dot(weights) + bias)))
        .sum::<f64>()
        / n;

    let entropy: f64 = duals.iter().map(|&b| binary_entropy(b)).sum::<f64>() / n;

    (loss + reg, entropy - reg)
}

/// ln(1 + e^z) without overflow.
fn log1p_exp(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

fn binary_entropy(b: f64) -> f64 {
    let term = |p: f64| if p > 0.0 { -p * p.ln() } else { 0.0 };
    term(b) + term(1.0 - b)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::traits::Predictor;

    fn reviews() -> Vec<Record> {
        vec![
            Record::labeled("good product, works great", true),
            Record::labeled("great value and good quality", true),
            Record::labeled("excellent, I love it", true),
            Record::labeled("really good, would buy again", true),
            Record::labeled("love this great thing", true),
            Record::labeled("bad product, broke quickly", false),
            Record::labeled("terrible quality, awful", false),
            Record::labeled("awful, I hate it", false),
            Record::labeled("really bad, would not buy again", false),
            Record::labeled("hate this terrible thing", false),
        ]
    }

    #[test]
    fn test_coordinate_solution_satisfies_optimality() {
        let (current, margin, q) = (0.2, 0.3, 5.0);
        let b = solve_coordinate(current, margin, q);
        let g = ((1.0 - b) / b).ln() - margin - (b - current) * q;
        assert!(g.abs() < 1e-8);
        assert!(b > 0.0 && b < 1.0);
    }

    #[test]
    fn test_coordinate_from_zero_dual() {
        let b = solve_coordinate(0.0, 0.0, 1000.0);
        assert!(b > 0.0 && b < 0.5);
    }

    #[test]
    fn test_duality_gap_is_small_after_training() {
        let trainer = SdcaTrainer::new(
            FeaturizerOptions::default(),
            SdcaOptions { l2_regularization: 0.1, max_epochs: 200, ..SdcaOptions::default() },
        );
        let data     = reviews();
        let feats    = TextFeaturizer::fit(FeaturizerOptions::default(), data.iter().map(|r| r.text.as_str()));
        let examples: Vec<_> = data.iter().map(|r| feats.transform(&r.text).features).collect();
        let labels: Vec<f64> = data.iter().map(|r| if r.label == Some(true) { 1.0 } else { -1.0 }).collect();

        let (_, summary) = trainer.solve(&examples, &labels, feats.dimension(), 1);
        assert!(summary.converged, "gap {}", summary.duality_gap);
        assert!(summary.duality_gap >= -1e-9);
    }

    #[test]
    fn test_fits_training_data() {
        let data    = reviews();
        let trainer = SdcaTrainer::new(
            FeaturizerOptions::default(),
            SdcaOptions { l2_regularization: 0.01, max_epochs: 200, ..SdcaOptions::default() },
        );
        let model = trainer.fit(&data, &FitOptions::default()).unwrap();
        for record in &data {
            let p = model.predict(record);
            assert_eq!(Some(p.label), record.label, "misclassified '{}'", record.text);
        }
    }

    #[test]
    fn test_same_seed_same_model() {
        let data = reviews();
        let a = SdcaTrainer::default().fit(&data, &FitOptions { seed: 3 }).unwrap();
        let b = SdcaTrainer::default().fit(&data, &FitOptions { seed: 3 }).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_training_set() {
        let err = SdcaTrainer::default().fit(&[], &FitOptions::default()).unwrap_err();
        assert_eq!(err, TrainError::EmptyTrainingSet);
    }

    #[test]
    fn test_missing_label() {
        let data = vec![Record::labeled("good", true), Record::unlabeled("??")];
        let err  = SdcaTrainer::default().fit(&data, &FitOptions::default()).unwrap_err();
        assert_eq!(err, TrainError::MissingLabel { index: 1 });
    }
}
