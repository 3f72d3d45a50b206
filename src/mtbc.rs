//! Multilevel thresholding by dynamic programming (MTBC).
//!
//! Optimizes the same between-class objective as [`crate::otsu`], but fills
//! a table `C(t, j)` holding the best score of `[0, t]` cut into `j` classes
//! with the `j`-th class ending at `t`. The search is polynomial in the
//! threshold count instead of exponential.

use log::debug;

use crate::error::ThresholdError;
use crate::histogram::Histogram;
use crate::{stats, ThresholdSearch, NGRAY};

#[derive(Clone, Copy, Debug, Default)]
pub struct Mtbc;

impl ThresholdSearch for Mtbc {
    fn find_thresholds(&self, hist: &Histogram, n: usize) -> Result<Vec<u8>, ThresholdError> {
        compute_mtbc_thresholds(hist, n)
    }
}

/// Feasible end level of each class: class `j` of `n + 1` may end anywhere
/// in `[min[j], max[j]]` and still leave one level for each later class.
/// Index 0 is unused; the last class always ends at 255.
fn threshold_ranges(n: usize) -> (Vec<usize>, Vec<usize>) {
    let classes = n + 1;
    let mut min = vec![0; classes + 1];
    let mut max = vec![0; classes + 1];
    for j in 1..classes {
        min[j] = j;
        max[j] = NGRAY - 1 - classes + j;
    }
    min[classes] = NGRAY - 1;
    max[classes] = NGRAY - 1;
    (min, max)
}

/// Same contract as [`crate::otsu::compute_otsu_thresholds`].
pub fn compute_mtbc_thresholds(hist: &Histogram, n: usize) -> Result<Vec<u8>, ThresholdError> {
    let n = crate::clamp_threshold_count(n)?;
    let classes = n + 1;
    let width = classes + 1;
    let (min_t, max_t) = threshold_ranges(n);
    let counts = hist.counts();
    let total = hist.total();

    let mut best = vec![f64::NEG_INFINITY; NGRAY * width];
    let mut from = vec![0usize; NGRAY * width];

    // First class always starts at level 0.
    let mut count = 0u64;
    let mut moment = 0u64;
    for t in 0..=max_t[1] {
        count += counts[t];
        moment += t as u64 * counts[t];
        if t >= min_t[1] {
            best[t * width + 1] = stats::class_score(count, moment, total);
        }
    }

    for j in 2..=classes {
        for t in min_t[j]..=max_t[j] {
            let lo = min_t[j - 1];
            let hi = max_t[j - 1].min(t - 1);

            // Running sums over the class [i + 1, t]; it grows as i walks down.
            let mut count = 0u64;
            let mut moment = 0u64;
            for level in hi + 1..=t {
                count += counts[level];
                moment += level as u64 * counts[level];
            }

            let mut cell = f64::NEG_INFINITY;
            let mut arg = hi;
            for i in (lo..=hi).rev() {
                let candidate = best[i * width + j - 1] + stats::class_score(count, moment, total);
                if candidate >= cell {
                    cell = candidate;
                    arg = i;
                }
                count += counts[i];
                moment += i as u64 * counts[i];
            }

            best[t * width + j] = cell;
            from[t * width + j] = arg;
        }
    }

    let mut thresholds = vec![0usize; n];
    let mut end = NGRAY - 1;
    for j in (2..=classes).rev() {
        end = from[end * width + j];
        thresholds[j - 2] = end;
    }
    debug!(
        "mtbc: n={n} thresholds={thresholds:?} score={}",
        best[(NGRAY - 1) * width + classes]
    );

    stats::center_in_gaps(hist, &mut thresholds);
    Ok(thresholds.into_iter().map(|t| t as u8).collect())
}
