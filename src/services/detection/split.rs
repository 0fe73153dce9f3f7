// Train/Test Split
// Stratified, seeded hold-out split over example indices.

use crate::models::Label;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::error::{DetectorError, Result};

pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split example indices so that the test set keeps the class ratio of
/// `labels`. The test set holds `ceil(test_size * n)` examples; per-class
/// shares are rounded down and the remainder goes to the classes with the
/// largest fractional share.
pub fn stratified_split(labels: &[Label], test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(DetectorError::InvalidTestSize(test_size));
    }

    let n = labels.len();
    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test == 0 {
        return Err(DetectorError::EmptySplit("test"));
    }
    if n_test >= n {
        return Err(DetectorError::EmptySplit("train"));
    }

    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); Label::ALL.len()];
    for (idx, label) in labels.iter().enumerate() {
        by_class[label.index()].push(idx);
    }
    if let Some(missing) = Label::ALL.iter().find(|l| by_class[l.index()].is_empty()) {
        return Err(DetectorError::SingleClass(missing.as_str()));
    }

    let allocation = allocate_test_counts(&by_class, n, n_test);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (members, take) in by_class.iter_mut().zip(allocation) {
        members.shuffle(&mut rng);
        test.extend_from_slice(&members[..take]);
        train.extend_from_slice(&members[take..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(TrainTestSplit { train, test })
}

fn allocate_test_counts(by_class: &[Vec<usize>], n: usize, n_test: usize) -> Vec<usize> {
    let shares: Vec<f64> = by_class
        .iter()
        .map(|members| members.len() as f64 * n_test as f64 / n as f64)
        .collect();
    let mut allocation: Vec<usize> = shares.iter().map(|s| s.floor() as usize).collect();

    let mut order: Vec<usize> = (0..by_class.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = shares[a] - shares[a].floor();
        let fb = shares[b] - shares[b].floor();
        fb.partial_cmp(&fa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut remaining = n_test.saturating_sub(allocation.iter().sum());
    while remaining > 0 {
        let mut progressed = false;
        for &c in &order {
            if remaining == 0 {
                break;
            }
            if allocation[c] < by_class[c].len() {
                allocation[c] += 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    allocation
}
