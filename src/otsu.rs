//! Multilevel Otsu thresholding.
//!
//! The between-class objective is separable over contiguous classes, so the
//! score of every interval `[i, j]` is tabulated once and the search only
//! adds table entries. The search itself is exhaustive: it walks every
//! strictly increasing split vector in lexicographic order and keeps the
//! first one reaching the maximum.

use log::{debug, trace};

use crate::error::ThresholdError;
use crate::histogram::Histogram;
use crate::{stats, ThresholdSearch, NGRAY};

#[derive(Clone, Copy, Debug, Default)]
pub struct Otsu;

impl ThresholdSearch for Otsu {
    fn find_thresholds(&self, hist: &Histogram, n: usize) -> Result<Vec<u8>, ThresholdError> {
        compute_otsu_thresholds(hist, n)
    }
}

/// Return the `n` ascending thresholds maximizing `Σ S(class)² / P(class)`.
///
/// # Errors
/// Returns [`ThresholdError::TooManyThresholds`] if `n` exceeds
/// [`crate::MAX_THRESHOLDS`]. A zero count is treated as one.
pub fn compute_otsu_thresholds(hist: &Histogram, n: usize) -> Result<Vec<u8>, ThresholdError> {
    let n = crate::clamp_threshold_count(n)?;
    let tables = LookupTables::build(hist);

    let mut search = Search {
        tables: &tables,
        n,
        current: vec![0; n],
        best: (1..=n).collect(),
        best_score: f64::NEG_INFINITY,
    };
    search.descend(0, 0, 0.0);

    let Search {
        mut best,
        best_score,
        ..
    } = search;
    best.sort_unstable();
    stats::center_in_gaps(hist, &mut best);
    debug!("otsu: n={n} thresholds={best:?} score={best_score}");

    Ok(best.into_iter().map(|t| t as u8).collect())
}

/// Per-interval class scores, indexed `[i * NGRAY + j]` for `i <= j`.
struct LookupTables {
    score: Vec<f64>,
}

impl LookupTables {
    fn build(hist: &Histogram) -> Self {
        let counts = hist.counts();
        let mut mass = vec![0u64; NGRAY * NGRAY];
        let mut moment = vec![0u64; NGRAY * NGRAY];

        // Row 0 holds the cumulative sums; every other interval is a difference
        // of two of its entries.
        let mut acc_mass = 0u64;
        let mut acc_moment = 0u64;
        for (level, &count) in counts.iter().enumerate() {
            acc_mass += count;
            acc_moment += level as u64 * count;
            mass[level] = acc_mass;
            moment[level] = acc_moment;
        }
        for i in 1..NGRAY {
            for j in i..NGRAY {
                mass[i * NGRAY + j] = mass[j] - mass[i - 1];
                moment[i * NGRAY + j] = moment[j] - moment[i - 1];
            }
        }

        let mut score = vec![0.0; NGRAY * NGRAY];
        for i in 0..NGRAY {
            for j in i..NGRAY {
                let at = i * NGRAY + j;
                if mass[at] > 0 {
                    score[at] = stats::class_score(mass[at], moment[at], hist.total());
                }
            }
        }
        trace!("otsu: built {NGRAY}x{NGRAY} lookup tables");

        Self { score }
    }

    #[inline]
    fn score(&self, first: usize, last: usize) -> f64 {
        self.score[first * NGRAY + last]
    }
}

struct Search<'a> {
    tables: &'a LookupTables,
    n: usize,
    current: Vec<usize>,
    best: Vec<usize>,
    best_score: f64,
}

impl Search<'_> {
    /// Place split `depth` for the class starting at `class_start`; `acc` is
    /// the score of the classes already closed.
    fn descend(&mut self, depth: usize, class_start: usize, acc: f64) {
        // Leave one level per remaining split plus a non-empty tail class.
        let last = NGRAY - 2 - (self.n - 1 - depth);
        let first = class_start.max(1);

        if depth + 1 == self.n {
            for split in first..=last {
                let total = acc
                    + self.tables.score(class_start, split)
                    + self.tables.score(split + 1, NGRAY - 1);
                if total > self.best_score {
                    self.best_score = total;
                    self.current[depth] = split;
                    self.best.copy_from_slice(&self.current);
                }
            }
        } else {
            for split in first..=last {
                self.current[depth] = split;
                self.descend(depth + 1, split + 1, acc + self.tables.score(class_start, split));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::objective;
    use crate::test_support::{mixture, peaks};
    use crate::MAX_THRESHOLDS;
    use approx::assert_relative_eq;

    /// Single-threshold Otsu in its textbook form.
    fn classical_otsu(hist: &Histogram) -> usize {
        let prob = hist.normalized();
        let mean = hist.mean();
        let mut w_b = 0.0;
        let mut m_b = 0.0;
        let mut best = (f64::MIN, 0);
        for (t, &p) in prob.iter().enumerate().take(NGRAY - 1) {
            w_b += p;
            m_b += t as f64 * p;
            let w_f = 1.0 - w_b;
            if w_b <= 0.0 || w_f <= 0.0 {
                continue;
            }
            let sigma = (mean * w_b - m_b).powi(2) / (w_b * w_f);
            if sigma > best.0 {
                best = (sigma, t);
            }
        }
        best.1
    }

    #[test]
    fn thresholds_are_increasing_and_in_range() {
        let hist = mixture(&[(40.0, 8.0, 300.0), (110.0, 15.0, 200.0), (200.0, 10.0, 250.0)]);
        for n in 1..=3 {
            let th = compute_otsu_thresholds(&hist, n).unwrap();
            assert_eq!(th.len(), n);
            assert!(th.windows(2).all(|w| w[0] < w[1]), "{th:?}");
            assert!(th.iter().all(|&t| (1..=254).contains(&t)), "{th:?}");
        }
    }

    #[test]
    fn single_threshold_matches_classical_otsu() {
        let hist = mixture(&[(70.0, 12.0, 400.0), (170.0, 20.0, 250.0)]);
        let th = compute_otsu_thresholds(&hist, 1).unwrap();
        let classical = classical_otsu(&hist);
        assert!((th[0] as i64 - classical as i64).abs() <= 1, "{th:?} vs {classical}");
    }

    #[test]
    fn two_deltas_split_at_midpoint() {
        let hist = peaks(&[(50, 1000), (200, 1000)]);
        assert_eq!(compute_otsu_thresholds(&hist, 1).unwrap(), vec![125]);
    }

    #[test]
    fn two_thresholds_beat_every_pair() {
        let hist = mixture(&[(30.0, 6.0, 100.0), (128.0, 9.0, 60.0), (220.0, 5.0, 90.0)]);
        let th = compute_otsu_thresholds(&hist, 2).unwrap();
        let found = objective(&hist, &th);

        let mut best = f64::MIN;
        for a in 1u8..=253 {
            for b in a + 1..=254 {
                best = best.max(objective(&hist, &[a, b]));
            }
        }
        assert_relative_eq!(found, best, max_relative = 1e-12);
    }

    #[test]
    fn tie_resolves_to_lowest_split() {
        // {10}{11,12}{200} and {10,11}{12}{200} score exactly the same; 10
        // and 11 are adjacent so the first split cannot be re-centered.
        let hist = peaks(&[(10, 1), (11, 1), (12, 1), (200, 1)]);
        let split_low = objective(&hist, &[10, 12]);
        assert_eq!(split_low, objective(&hist, &[11, 12]));
        assert_eq!(compute_otsu_thresholds(&hist, 2).unwrap(), vec![10, 106]);
    }

    #[test]
    fn degenerate_histogram_keeps_first_enumerated() {
        let hist = peaks(&[(100, 42)]);
        assert_eq!(compute_otsu_thresholds(&hist, 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn zero_count_is_clamped_to_one() {
        let hist = peaks(&[(50, 1), (200, 1)]);
        assert_eq!(compute_otsu_thresholds(&hist, 0).unwrap().len(), 1);
    }

    #[test]
    fn too_many_thresholds_are_rejected() {
        let hist = peaks(&[(50, 1), (200, 1)]);
        assert_eq!(
            compute_otsu_thresholds(&hist, MAX_THRESHOLDS + 1),
            Err(ThresholdError::TooManyThresholds {
                requested: MAX_THRESHOLDS + 1,
                max: MAX_THRESHOLDS
            })
        );
    }
}
