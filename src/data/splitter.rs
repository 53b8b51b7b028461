// ============================================================
// Layer 4 - Train/Test Splitter
// ============================================================
// Shuffles samples and splits them into two sets:
//   - Training set: used to fit the classifier
//   - Test set:     held out to measure performance
//
// The shuffle is driven by a StdRng seeded from the caller's
// seed, so the same input and seed always give the same split.
// Nothing here touches a thread-local or global RNG.
//
// Split ratio: 90% training, 10% test by default (configurable)

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, test).
///
/// The test set gets `round(len * test_fraction)` items; the
/// fraction is clamped to [0, 1].
pub fn split_train_test<T>(
    mut samples:   Vec<T>,
    test_fraction: f64,
    seed:          u64,
) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total      = samples.len();
    let fraction   = if test_fraction.is_finite() { test_fraction.clamp(0.0, 1.0) } else { 0.0 };
    let test_count = ((total as f64) * fraction).round() as usize;
    let split_at   = total - test_count.min(total);

    // split_off(n) leaves [0..n) in samples and returns [n..total)
    let test = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} test (seed {})",
        samples.len(),
        test.len(),
        seed,
    );

    (samples, test)
}
