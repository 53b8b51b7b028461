// ============================================================
// Layer 6 - Metrics Reporting
// ============================================================
// Two outputs for the evaluation of one training run:
//
//   1. A console report, printed after every training run:
//
//   ************************************************************
//   *       Metrics for SdcaLogisticRegression binary classification model
//   *-----------------------------------------------------------
//   *       Accuracy: 83.33%
//   *       Area Under Curve:      90.00%
//   ...
//   ************************************************************
//
//   2. An optional CSV run log (--metrics-log). One row per run,
//      appended, so repeated runs with different seeds or
//      regularisation can be compared side by side:
//
//   seed,l2,train_rows,test_rows,features,epochs,converged,accuracy,auc,f1,log_loss
//   1,0.001000,900,100,4211,37,true,0.830000,0.901200,0.824100,0.402100
//
// Undefined metrics (AUC on a one-class test set) are printed as
// "n/a" and left empty in the CSV.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

use crate::ml::evaluator::BinaryMetrics;

const CSV_HEADER: &str =
    "seed,l2,train_rows,test_rows,features,epochs,converged,accuracy,auc,f1,log_loss";

/// One row of the run log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    pub seed:       u64,
    pub l2:         f64,
    pub train_rows: usize,
    pub test_rows:  usize,
    /// Vocabulary size of the fitted featurizer
    pub features:   usize,
    /// SDCA epochs actually run
    pub epochs:     usize,
    pub converged:  bool,
    pub metrics:    BinaryMetrics,
}

/// Appends one row per training run to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let csv_path = path.into();

        if let Some(dir) = csv_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;
        }

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create metrics log '{}'", csv_path.display()))?;
            writeln!(f, "{CSV_HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, run: &RunMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open metrics log '{}'", self.csv_path.display()))?;

        let m = &run.metrics;
        writeln!(
            f,
            "{},{:.6},{},{},{},{},{},{:.6},{},{:.6},{:.6}",
            run.seed,
            run.l2,
            run.train_rows,
            run.test_rows,
            run.features,
            run.epochs,
            run.converged,
            m.accuracy,
            m.auc.map(|v| format!("{v:.6}")).unwrap_or_default(),
            m.f1_score,
            m.log_loss,
        )?;

        tracing::debug!(
            "Logged run metrics: accuracy={:.4}, log_loss={:.4}",
            m.accuracy,
            m.log_loss,
        );
        Ok(())
    }
}

fn percent(v: f64) -> String {
    format!("{:.2}%", v * 100.0)
}

fn optional_percent(v: Option<f64>) -> String {
    v.map(percent).unwrap_or_else(|| "n/a".to_string())
}

/// Print the evaluation banner for one model.
pub fn print_binary_metrics(
    trainer_name: &str,
    m:            &BinaryMetrics,
    out:          &mut impl Write,
) -> std::io::Result<()> {
    let rule = "*".repeat(60);
    writeln!(out, "{rule}")?;
    writeln!(out, "*       Metrics for {trainer_name} binary classification model")?;
    writeln!(out, "*-----------------------------------------------------------")?;
    writeln!(out, "*       Accuracy: {}", percent(m.accuracy))?;
    writeln!(out, "*       Area Under Curve:      {}", optional_percent(m.auc))?;
    writeln!(out, "*       Area under Precision recall Curve:  {}", optional_percent(m.auprc))?;
    writeln!(out, "*       F1Score:  {}", percent(m.f1_score))?;
    writeln!(out, "*       LogLoss:  {:.2}", m.log_loss)?;
    writeln!(out, "*       LogLossReduction:  {:.2}", m.log_loss_reduction)?;
    writeln!(out, "*       PositivePrecision:  {:.2}", m.positive_precision)?;
    writeln!(out, "*       PositiveRecall:  {:.2}", m.positive_recall)?;
    writeln!(out, "*       NegativePrecision:  {:.2}", m.negative_precision)?;
    writeln!(out, "*       NegativeRecall:  {:.2}", m.negative_recall)?;
    let c = &m.confusion;
    writeln!(
        out,
        "*       Confusion: TP={} FP={} TN={} FN={} ({} samples)",
        c.tp, c.fp, c.tn, c.fn_, m.sample_count
    )?;
    writeln!(out, "{rule}")
}
