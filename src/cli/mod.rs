// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses flags with clap,
// runs the requested steps in order and turns failures into a
// process exit code. All real work is delegated to Layer 2.
//
//   -t / --train        train on --data, save to --model
//   -c / --check TEXT   score one text with the saved model
//   -i / --interactive  score lines from stdin until an empty line
//
// Steps run as train -> check, or train -> interactive. Scoring
// is skipped when training fails. --check wins over --interactive
// when both are given.

pub mod commands;

use std::io::{self, BufRead, Write};

use clap::Parser;

use crate::application::{
    score_use_case::ScoreUseCase,
    train_use_case::{TrainConfig, TrainUseCase},
};
use crate::domain::error::{DatasetLoadError, ModelLoadError, ModelSaveError};
use commands::PipelineArgs;

// ─── Exit Codes ───────────────────────────────────────────────────────────────
pub const EXIT_OK:            i32 = 0;
pub const EXIT_FAILURE:       i32 = 1;
/// clap's own code for a usage error
pub const EXIT_USAGE:         i32 = 2;
pub const EXIT_DATASET_LOAD:  i32 = 3;
pub const EXIT_MODEL_LOAD:    i32 = 4;
pub const EXIT_MODEL_SAVE:    i32 = 5;

#[derive(Parser, Debug)]
#[command(
    name = "sentiment-cli",
    version,
    about = "Train a binary sentiment classifier on a TSV file, then score text with it."
)]
pub struct Cli {
    /// Train a model and save it to --model
    #[arg(short, long)]
    pub train: bool,

    /// Score a single text with the saved model
    #[arg(short, long, value_name = "TEXT")]
    pub check: Option<String>,

    /// Score lines read from stdin until an empty line
    #[arg(short, long)]
    pub interactive: bool,

    #[command(flatten)]
    pub args: PipelineArgs,
}

impl Cli {
    /// Run against the process's stdin/stdout and return the exit code.
    pub fn run(self) -> i32 {
        let stdin  = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), &mut stdout.lock())
    }

    /// Run the requested steps with injected I/O.
    pub fn run_with(&self, input: impl BufRead, out: &mut impl Write) -> i32 {
        if !self.train && self.check.is_none() && !self.interactive {
            tracing::warn!("Nothing to do; pass --train, --check or --interactive");
            return EXIT_OK;
        }

        let train_exit = if self.train { self.run_train(out) } else { EXIT_OK };
        if train_exit != EXIT_OK {
            return train_exit;
        }

        if let Some(text) = &self.check {
            return self.run_check(text, out);
        }
        if self.interactive {
            return self.run_interactive(input, out);
        }
        train_exit
    }

    fn run_train(&self, out: &mut impl Write) -> i32 {
        let config: TrainConfig = (&self.args).into();
        tracing::info!("Training on '{}'", config.data_path);
        if let Ok(json) = serde_json::to_string(&config) {
            tracing::debug!("Train config: {json}");
        }

        match TrainUseCase::new(config).execute(out) {
            Ok(report) => {
                tracing::info!(
                    "Training complete: {} train rows, {} test rows, {} features",
                    report.train_rows, report.test_rows, report.feature_count
                );
                EXIT_OK
            }
            Err(e) => report_failure(&e),
        }
    }

    fn load_scorer(&self) -> Result<ScoreUseCase, i32> {
        ScoreUseCase::load(&self.args.model, (&self.args).into()).map_err(|e| report_failure(&e))
    }

    fn run_check(&self, text: &str, out: &mut impl Write) -> i32 {
        let scorer = match self.load_scorer() {
            Ok(s)     => s,
            Err(code) => return code,
        };
        match scorer.check(text, out) {
            Ok(_)  => EXIT_OK,
            Err(e) => report_failure(&e),
        }
    }

    fn run_interactive(&self, input: impl BufRead, out: &mut impl Write) -> i32 {
        let scorer = match self.load_scorer() {
            Ok(s)     => s,
            Err(code) => return code,
        };
        match scorer.interactive(input, out) {
            Ok(_)  => EXIT_OK,
            Err(e) => report_failure(&e),
        }
    }
}

/// Print and log a failed step, returning its exit code.
fn report_failure(err: &anyhow::Error) -> i32 {
    tracing::error!("{err:#}");
    eprintln!("error: {err:#}");
    exit_code_for(err)
}

/// Pick the exit code from the first typed error in the chain.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if cause.is::<DatasetLoadError>() {
            return EXIT_DATASET_LOAD;
        }
        if cause.is::<ModelLoadError>() {
            return EXIT_MODEL_LOAD;
        }
        if cause.is::<ModelSaveError>() {
            return EXIT_MODEL_SAVE;
        }
    }
    EXIT_FAILURE
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io::Cursor, path::PathBuf};

    use crate::domain::error::TrainError;

    const SAMPLE_TSV: &str = "\
SentimentText\tSentiment
good product, works great\t1
great value and good quality\t1
excellent, I love it\t1
really good, would buy again\t1
love this great thing\t1
nice and good\t1
bad product, broke quickly\t0
terrible quality, awful\t0
awful, I hate it\t0
really bad, would not buy again\t0
hate this terrible thing\t0
poor and bad\t0
";

    struct Fixture {
        _dir:  tempfile::TempDir,
        data:  PathBuf,
        model: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir   = tempfile::tempdir().unwrap();
        let data  = dir.path().join("train.tsv");
        let model = dir.path().join("models").join("sentiment.bin");
        fs::write(&data, SAMPLE_TSV).unwrap();
        Fixture { _dir: dir, data, model }
    }

    fn cli(fx: &Fixture, extra: &[&str]) -> Cli {
        let mut argv = vec![
            "sentiment-cli".to_string(),
            "--data".to_string(),
            fx.data.display().to_string(),
            "--model".to_string(),
            fx.model.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        Cli::try_parse_from(argv).unwrap()
    }

    fn run(cli: &Cli, input: &str) -> (i32, String) {
        let mut out = Vec::new();
        let code = cli.run_with(Cursor::new(input.to_string()), &mut out);
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_train_then_check() {
        let fx = fixture();
        let (code, out) = run(&cli(&fx, &["-t", "-c", "good product"]), "");
        assert_eq!(code, EXIT_OK);
        assert!(out.contains("Metrics for SdcaLogisticRegression"));
        assert!(out.contains("=============== Single Prediction ==============="));
        assert!(out.contains("Text: good product | Prediction: "));
        assert!(fx.model.exists());
    }

    #[test]
    fn test_train_then_interactive() {
        let fx = fixture();
        let (code, out) = run(&cli(&fx, &["--train", "--interactive"]), "good product\nbad product\n\n");
        assert_eq!(code, EXIT_OK);
        assert_eq!(out.lines().filter(|l| l.starts_with("Text: ")).count(), 2);
    }

    #[test]
    fn test_check_uses_custom_label_names() {
        let fx = fixture();
        assert_eq!(run(&cli(&fx, &["-t"]), "").0, EXIT_OK);

        let (code, out) = run(
            &cli(&fx, &["-c", "hate it", "--positive-name", "Toxic", "--negative-name", "Non Toxic"]),
            "",
        );
        assert_eq!(code, EXIT_OK);
        let line = out.lines().find(|l| l.starts_with("Text: ")).unwrap();
        assert!(line.contains("| Prediction: Toxic |") || line.contains("| Prediction: Non Toxic |"));
    }

    #[test]
    fn test_check_without_model_fails() {
        let fx = fixture();
        let (code, out) = run(&cli(&fx, &["-c", "good product"]), "");
        assert_eq!(code, EXIT_MODEL_LOAD);
        assert!(!out.contains("Prediction"));
    }

    #[test]
    fn test_interactive_with_empty_model_path_fails() {
        let cli = Cli::try_parse_from(["sentiment-cli", "-i", "--model", ""]).unwrap();
        let (code, out) = run(&cli, "good product\n");
        assert_eq!(code, EXIT_MODEL_LOAD);
        assert!(!out.contains("Prediction"));
    }

    #[test]
    fn test_malformed_dataset_keeps_previous_model() {
        let fx = fixture();
        assert_eq!(run(&cli(&fx, &["-t"]), "").0, EXIT_OK);
        let before = fs::read(&fx.model).unwrap();

        fs::write(&fx.data, "SentimentText\tSentiment\ngood\t1\textra column\n").unwrap();
        let (code, out) = run(&cli(&fx, &["-t", "-c", "good"]), "");
        assert_eq!(code, EXIT_DATASET_LOAD);
        assert!(!out.contains("Prediction"));
        assert_eq!(fs::read(&fx.model).unwrap(), before);
    }

    #[test]
    fn test_malformed_dataset_creates_no_model() {
        let fx = fixture();
        fs::write(&fx.data, "SentimentText\tSentiment\ngood\tmaybe\n").unwrap();
        assert_eq!(run(&cli(&fx, &["-t"]), "").0, EXIT_DATASET_LOAD);
        assert!(!fx.model.exists());
    }

    #[test]
    fn test_nothing_requested() {
        let fx = fixture();
        assert_eq!(run(&cli(&fx, &[]), "").0, EXIT_OK);
    }

    #[test]
    fn test_bad_flags_are_usage_errors() {
        let err = Cli::try_parse_from(["sentiment-cli", "--seed", "abc"]).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);

        let err = Cli::try_parse_from(["sentiment-cli", "--label-format", "yes/no"]).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);

        let err = Cli::try_parse_from(["sentiment-cli", "--help"]).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_OK);
    }

    #[test]
    fn test_out_of_range_numbers_are_usage_errors() {
        let rejected: [&[&str]; 7] = [
            &["--test-fraction", "5"],
            &["--test-fraction", "1"],
            &["--test-fraction", "-0.1"],
            &["--l2", "0"],
            &["--l2", "-1"],
            &["--l2", "inf"],
            &["--max-epochs", "0"],
        ];
        for extra in rejected {
            let argv = ["sentiment-cli", "-t"].iter().chain(extra.iter()).copied();
            let err  = Cli::try_parse_from(argv).unwrap_err();
            assert_eq!(err.exit_code(), EXIT_USAGE, "accepted {extra:?}");
        }

        let ok = Cli::try_parse_from([
            "sentiment-cli", "--test-fraction", "0", "--l2", "0.5", "--max-epochs", "1",
        ])
        .unwrap();
        assert_eq!(ok.args.test_fraction, 0.0);
        assert_eq!(ok.args.l2, 0.5);
        assert_eq!(ok.args.max_epochs, 1);
    }

    #[test]
    fn test_save_failure_reports_metrics_and_scores_nothing() {
        let fx = fixture();
        // An existing directory cannot be replaced by the model file.
        fs::create_dir_all(&fx.model).unwrap();

        let (code, out) = run(&cli(&fx, &["-t", "-c", "good"]), "");

        assert_eq!(code, EXIT_MODEL_SAVE);
        assert!(out.contains("Accuracy"));
        assert!(!out.contains("Prediction"));
        assert!(fx.model.is_dir());
        assert!(!fx.model.with_file_name("sentiment.bin.tmp").exists());
    }

    #[test]
    fn test_exit_code_walks_the_chain() {
        let save = anyhow::Error::new(ModelSaveError::Encode { reason: "x".into() })
            .context("Failed to save model");
        assert_eq!(exit_code_for(&save), EXIT_MODEL_SAVE);

        let train = anyhow::Error::new(TrainError::EmptyTrainingSet).context("Training failed");
        assert_eq!(exit_code_for(&train), EXIT_FAILURE);
    }
}
