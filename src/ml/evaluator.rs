// ============================================================
// Layer 5 - Binary Classification Evaluator
// ============================================================
// Scores the held-out records and reduces (label, probability)
// pairs to the usual binary metrics. Decisions use a 0.5
// probability threshold.
//
// AUC is the Mann-Whitney statistic with average ranks for tied
// scores; AUPRC is average precision over distinct score cut-offs.
// Both are undefined (None) unless the set has both classes.

use serde::{Deserialize, Serialize};

use crate::domain::record::Record;
use crate::domain::traits::Predictor;

const PROBABILITY_CLAMP: f64 = 1e-15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp:  usize,
    pub tn:  usize,
    pub fp:  usize,
    pub fn_: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryMetrics {
    pub sample_count:       usize,
    pub confusion:          ConfusionMatrix,
    pub accuracy:           f64,
    pub auc:                Option<f64>,
    pub auprc:              Option<f64>,
    pub f1_score:           f64,
    pub positive_precision: f64,
    pub positive_recall:    f64,
    pub negative_precision: f64,
    pub negative_recall:    f64,
    pub log_loss:           f64,
    pub log_loss_reduction: f64,
}

/// Score every labelled record with `model` and compute metrics.
/// Records without a label are skipped.
pub fn evaluate<P: Predictor>(model: &P, test: &[Record]) -> BinaryMetrics {
    let pairs: Vec<(bool, f64)> = test
        .iter()
        .filter_map(|r| r.label.map(|label| (label, model.predict(r).probability)))
        .collect();
    compute_metrics(&pairs)
}

/// Metrics from (true label, predicted probability) pairs.
pub fn compute_metrics(pairs: &[(bool, f64)]) -> BinaryMetrics {
    let mut cm = ConfusionMatrix::default();
    for &(truth, p) in pairs {
        match (truth, p > 0.5) {
            (true, true)   => cm.tp  += 1,
            (false, false) => cm.tn  += 1,
            (false, true)  => cm.fp  += 1,
            (true, false)  => cm.fn_ += 1,
        }
    }

    let positive_precision = ratio(cm.tp, cm.tp + cm.fp);
    let positive_recall    = ratio(cm.tp, cm.tp + cm.fn_);
    let f1_score = if positive_precision + positive_recall > 0.0 {
        2.0 * positive_precision * positive_recall / (positive_precision + positive_recall)
    } else {
        0.0
    };

    let log_loss = mean_log_loss(pairs);
    let prior    = prior_log_loss(pairs);
    let log_loss_reduction = if prior > 0.0 { (prior - log_loss) / prior } else { 0.0 };

    BinaryMetrics {
        sample_count: pairs.len(),
        confusion:    cm,
        accuracy:     ratio(cm.tp + cm.tn, cm.total()),
        auc:          auc(pairs),
        auprc:        auprc(pairs),
        f1_score,
        positive_precision,
        positive_recall,
        negative_precision: ratio(cm.tn, cm.tn + cm.fn_),
        negative_recall:    ratio(cm.tn, cm.tn + cm.fp),
        log_loss,
        log_loss_reduction,
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 { 0.0 } else { num as f64 / denom as f64 }
}

fn mean_log_loss(pairs: &[(bool, f64)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let total: f64 = pairs
        .iter()
        .map(|&(truth, p)| {
            let p = p.clamp(PROBABILITY_CLAMP, 1.0 - PROBABILITY_CLAMP);
            if truth { -p.ln() } else { -(1.0 - p).ln() }
        })
        .sum();
    total / pairs.len() as f64
}

/// Log loss of always predicting the test-set positive rate.
fn prior_log_loss(pairs: &[(bool, f64)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let rate = pairs.iter().filter(|(t, _)| *t).count() as f64 / pairs.len() as f64;
    let term = |p: f64| if p > 0.0 { -p * p.ln() } else { 0.0 };
    term(rate) + term(1.0 - rate)
}

fn class_counts(pairs: &[(bool, f64)]) -> (usize, usize) {
    let positives = pairs.iter().filter(|(t, _)| *t).count();
    (positives, pairs.len() - positives)
}

fn auc(pairs: &[(bool, f64)]) -> Option<f64> {
    let (positives, negatives) = class_counts(pairs);
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut sorted: Vec<(bool, f64)> = pairs.to_vec();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));

    // Sum of 1-based ranks of the positives, ties share the average rank.
    let mut rank_sum = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j + 1 < sorted.len() && sorted[j + 1].1 == sorted[i].1 {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        let tied_positives = sorted[i..=j].iter().filter(|(t, _)| *t).count();
        rank_sum += avg_rank * tied_positives as f64;
        i = j + 1;
    }

    let p = positives as f64;
    let n = negatives as f64;
    Some((rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}

fn auprc(pairs: &[(bool, f64)]) -> Option<f64> {
    let (positives, negatives) = class_counts(pairs);
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut sorted: Vec<(bool, f64)> = pairs.to_vec();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut area        = 0.0;
    let mut tp          = 0usize;
    let mut seen        = 0usize;
    let mut prev_recall = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        // Consume a whole group of tied scores as one threshold.
        let score = sorted[i].1;
        while i < sorted.len() && sorted[i].1 == score {
            if sorted[i].0 {
                tp += 1;
            }
            seen += 1;
            i += 1;
        }
        let recall    = tp as f64 / positives as f64;
        let precision = tp as f64 / seen as f64;
        area += (recall - prev_recall) * precision;
        prev_recall = recall;
    }
    Some(area)
}
