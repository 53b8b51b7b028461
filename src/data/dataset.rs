use serde::{Deserialize, Serialize};

use crate::data::splitter::split_train_test;
use crate::domain::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    pub test_fraction: f64,
    pub seed:          u64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self { test_fraction: 0.1, seed: 1 }
    }
}

/// Ordered records as loaded from the file.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
}

/// Result of splitting a Dataset once.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Vec<Record>,
    pub test:  Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self { Self { records } }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn records(&self) -> &[Record] { &self.records }

    pub fn positive_count(&self) -> usize {
        self.records.iter().filter(|r| r.label == Some(true)).count()
    }

    pub fn split(self, options: SplitOptions) -> TrainTestSplit {
        let (train, test) = split_train_test(self.records, options.test_fraction, options.seed);
        TrainTestSplit { train, test }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> Dataset {
        Dataset::new((0..n).map(|i| Record::labeled(format!("row {i}"), i % 2 == 0)).collect())
    }

    #[test]
    fn test_positive_count() {
        assert_eq!(sample(5).positive_count(), 3);
    }

    #[test]
    fn test_split_is_repeatable() {
        let a = sample(30).split(SplitOptions::default());
        let b = sample(30).split(SplitOptions::default());
        assert_eq!(a.train, b.train);
        assert_eq!(a.test, b.test);
        assert_eq!(a.test.len(), 3);
    }
}
