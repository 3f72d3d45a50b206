//! Kittler–Illingworth minimum-error thresholding.
//!
//! Models the histogram as two Gaussian classes and picks the split that
//! minimizes
//!
//! ```text
//! H(t) = [q1·ln(var1) + q2·ln(var2)] / 2 − q1·ln(q1) − q2·ln(q2)
//! ```
//!
//! Class weights, means and variances are carried forward one level at a
//! time, so every candidate costs O(1) after an O(depth) setup.

use log::{debug, warn};

use crate::error::ThresholdError;
use crate::histogram::Histogram;
use crate::{ThresholdSearch, NGRAY};

/// Threshold returned when the histogram cannot hold two classes.
pub const DEGENERATE_THRESHOLD: u8 = (NGRAY - 1) as u8;

/// Binary minimum-error search. Always yields exactly one threshold.
#[derive(Clone, Copy, Debug, Default)]
pub struct Kittler;

impl ThresholdSearch for Kittler {
    fn find_thresholds(&self, hist: &Histogram, _n: usize) -> Result<Vec<u8>, ThresholdError> {
        Ok(vec![compute_kittler_threshold(hist)])
    }
}

/// Prepare the histogram and run [`minimum_error_threshold`].
///
/// The top bin is treated as saturation and dropped; the rest is
/// renormalized before the global mean is taken.
pub fn compute_kittler_threshold(hist: &Histogram) -> u8 {
    let mut prob = hist.normalized();
    prob[NGRAY - 1] = 0.0;

    let mass: f64 = prob.iter().sum();
    if mass <= 0.0 {
        warn!("kittler: every pixel is saturated");
        return DEGENERATE_THRESHOLD;
    }
    for p in prob.iter_mut() {
        *p /= mass;
    }

    let mean = prob
        .iter()
        .enumerate()
        .map(|(level, &p)| level as f64 * p)
        .sum();

    minimum_error_threshold(&prob, mean)
}

#[derive(Clone, Copy, Debug)]
struct Class {
    weight: f64,
    mean: f64,
    var: f64,
}

impl Class {
    fn entropy_term(&self) -> f64 {
        self.weight * self.var.ln() / 2.0 - self.weight * self.weight.ln()
    }

    fn is_valid(&self) -> bool {
        self.weight > 0.0 && self.var > 0.0
    }
}

/// Minimize the Kittler criterion over a normalized histogram with global
/// mean `mean`.
///
/// Candidates lie strictly between the first and last levels `i` where both
/// `p[i]` and `p[i + 1]` are populated, so each class holds at least two
/// distinct levels. Returns [`DEGENERATE_THRESHOLD`] if that range is empty.
///
/// The returned level is the last one of the lower class, while
/// [`crate::segment`] sends a pixel equal to a threshold to the upper band.
/// Unlike the multilevel searches the result is not moved off a run of
/// empty levels: the first minimum of the scan is returned as is.
pub fn minimum_error_threshold(prob: &[f64; NGRAY], mean: f64) -> u8 {
    let mut pairs = (1..NGRAY - 1).filter(|&i| prob[i] > 0.0 && prob[i + 1] > 0.0);
    let Some(first) = pairs.next() else {
        warn!("kittler: no adjacent populated levels");
        return DEGENERATE_THRESHOLD;
    };
    let last = pairs.last().unwrap_or(first);
    if last < first + 2 {
        warn!("kittler: populated range [{first}, {last}] too narrow");
        return DEGENERATE_THRESHOLD;
    }

    let total: f64 = prob.iter().sum();

    // Lower class at t = first.
    let weight: f64 = prob[..=first].iter().sum();
    let lower_mean = prob[..=first]
        .iter()
        .enumerate()
        .map(|(level, &p)| level as f64 * p)
        .sum::<f64>()
        / weight;
    let lower_var = prob[..=first]
        .iter()
        .enumerate()
        .map(|(level, &p)| (level as f64 - lower_mean).powi(2) * p)
        .sum::<f64>()
        / weight;
    let mut lower = Class {
        weight,
        mean: lower_mean,
        var: lower_var,
    };

    let weight = total - lower.weight;
    let upper_mean = (mean - lower.weight * lower.mean) / weight;
    let upper_var = prob
        .iter()
        .enumerate()
        .skip(first + 1)
        .map(|(level, &p)| (level as f64 - upper_mean).powi(2) * p)
        .sum::<f64>()
        / weight;
    let mut upper = Class {
        weight,
        mean: upper_mean,
        var: upper_var,
    };

    let mut best = (f64::INFINITY, DEGENERATE_THRESHOLD);
    for t in first + 1..last {
        let p = prob[t];
        let x = t as f64;

        let weight = lower.weight + p;
        let mean_next = (lower.weight * lower.mean + x * p) / weight;
        lower = Class {
            weight,
            mean: mean_next,
            var: (lower.weight * (lower.var + (lower.mean - mean_next).powi(2))
                + p * (x - mean_next).powi(2))
                / weight,
        };

        let weight = upper.weight - p;
        let mean_next = (mean - lower.weight * lower.mean) / weight;
        upper = Class {
            weight,
            mean: mean_next,
            var: (upper.weight * (upper.var + (upper.mean - mean_next).powi(2))
                - p * (x - mean_next).powi(2))
                / weight,
        };

        if !lower.is_valid() || !upper.is_valid() {
            continue;
        }
        let h = lower.entropy_term() + upper.entropy_term();
        if h.is_finite() && h < best.0 {
            best = (h, t as u8);
        }
    }

    debug!(
        "kittler: range=[{first}, {last}] threshold={} criterion={}",
        best.1, best.0
    );
    best.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mixture, peaks};

    #[test]
    fn splits_two_gaussians_between_modes() {
        let hist = mixture(&[(60.0, 10.0, 1000.0), (180.0, 15.0, 800.0)]);
        let t = compute_kittler_threshold(&hist);
        assert!(t > 60 && t < 180, "threshold {t}");
    }

    #[test]
    fn overlapping_gaussians_land_in_the_valley() {
        let hist = mixture(&[(80.0, 20.0, 1000.0), (160.0, 20.0, 1000.0)]);
        let t = compute_kittler_threshold(&hist);
        assert!((110..=130).contains(&t), "threshold {t}");
    }

    #[test]
    fn saturated_bin_is_ignored() {
        let base = mixture(&[(70.0, 18.0, 1000.0), (170.0, 22.0, 800.0)]);
        let mut counts = *base.counts();
        counts[NGRAY - 1] += 1_000_000;
        let saturated = Histogram::from_counts(counts).unwrap();
        let with = compute_kittler_threshold(&saturated) as i32;
        let without = compute_kittler_threshold(&base) as i32;
        assert!((with - without).abs() <= 1, "{with} vs {without}");
    }

    #[test]
    fn tied_run_keeps_first_minimum() {
        // Levels 63..=89 are empty, so every split in 62..=89 gives the same
        // classes; the scan must stop at the start of the run.
        let hist = peaks(&[(60, 5), (61, 5), (62, 5), (90, 5), (91, 5), (92, 5)]);
        assert_eq!(compute_kittler_threshold(&hist), 62);
    }

    #[test]
    fn single_level_is_degenerate() {
        assert_eq!(compute_kittler_threshold(&peaks(&[(100, 50)])), DEGENERATE_THRESHOLD);
    }

    #[test]
    fn single_adjacent_pair_is_degenerate() {
        let hist = peaks(&[(10, 5), (11, 5), (80, 3)]);
        assert_eq!(compute_kittler_threshold(&hist), DEGENERATE_THRESHOLD);
    }

    #[test]
    fn all_saturated_is_degenerate() {
        assert_eq!(compute_kittler_threshold(&peaks(&[(255, 9)])), DEGENERATE_THRESHOLD);
    }

    #[test]
    fn requested_count_is_ignored() {
        let hist = mixture(&[(60.0, 10.0, 1000.0), (180.0, 15.0, 800.0)]);
        let th = Kittler.find_thresholds(&hist, 5).unwrap();
        assert_eq!(th.len(), 1);
    }
}
