// ============================================================
// Layer 2 - Score Use Case
// ============================================================
// Loads a saved model once and scores text with it, either a
// single string (--check) or line by line from an input stream
// (--interactive). Reader and writer are passed in, so the
// interactive loop runs the same against stdin or a test buffer.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use crate::domain::prediction::{LabelNames, PredictionResult};
use crate::infra::model_store::ModelStore;
use crate::ml::inferencer::PredictionEngine;

pub const INTERACTIVE_PROMPT: &str = "Enter text to classify, empty line to quit:";

pub struct ScoreUseCase {
    engine: PredictionEngine,
    names:  LabelNames,
}

impl ScoreUseCase {
    pub fn new(engine: PredictionEngine, names: LabelNames) -> Self {
        Self { engine, names }
    }

    pub fn load(model_path: &str, names: LabelNames) -> Result<Self> {
        let store  = ModelStore::new(model_path);
        let engine = PredictionEngine::from_store(&store)
            .with_context(|| format!("Failed to load model '{model_path}'"))?;
        Ok(Self::new(engine, names))
    }

    pub fn predict(&self, text: &str) -> PredictionResult {
        self.engine.predict_text(text)
    }

    /// Score one text and print the single-prediction block.
    pub fn check(&self, text: &str, out: &mut impl Write) -> Result<PredictionResult> {
        let result = self.predict(text);
        tracing::debug!(
            "Scored {:?}: score={:.4}, probability={:.4}",
            text, result.score, result.probability
        );

        writeln!(out, "Number of Features: {}", result.feature_count)?;
        writeln!(out, "Tokens: {}", result.tokens_joined())?;
        writeln!(out, "=============== Single Prediction ===============")?;
        writeln!(
            out,
            "Text: {} | Prediction: {} | Probability: {:.4}",
            text,
            self.names.name_for(result.label),
            result.probability
        )?;
        writeln!(out, "================ End of Process ================")?;
        Ok(result)
    }

    /// Score lines from `input` until an empty line or end of input.
    /// Returns the number of lines scored.
    pub fn interactive(&self, mut input: impl BufRead, out: &mut impl Write) -> Result<usize> {
        writeln!(out, "{INTERACTIVE_PROMPT}")?;
        out.flush()?;

        let mut scored = 0;
        let mut line   = String::new();
        loop {
            line.clear();
            let read = input.read_line(&mut line).context("Failed to read input")?;
            if read == 0 {
                break;
            }
            let text = line
                .strip_suffix('\n')
                .map(|t| t.strip_suffix('\r').unwrap_or(t))
                .unwrap_or(line.as_str());
            if text.is_empty() {
                break;
            }

            let result = self.predict(text);
            writeln!(
                out,
                "Text: {} | Features: {} | Tokens: {} | Prediction: {} | Probability: {:.4}",
                text,
                result.feature_count,
                result.tokens_joined(),
                self.names.name_for(result.label),
                result.probability
            )?;
            out.flush()?;
            scored += 1;
        }

        tracing::info!("Interactive session ended after {} predictions", scored);
        Ok(scored)
    }
}
