use crate::histogram::Histogram;
use crate::NGRAY;

/// Contribution `(Σ i·p_i)² / Σ p_i` of one class to the Otsu objective.
///
/// `count` and `moment` are the integer sums `Σ h_i` and `Σ i·h_i` over the
/// class; an empty class contributes zero.
#[inline]
pub fn class_score(count: u64, moment: u64, total: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let moment = moment as f64;
    moment * moment / (count as f64 * total as f64)
}

/// Sum of class scores over the partition induced by ascending `thresholds`.
///
/// Class `k` spans `(t_{k-1}, t_k]`, the first class starts at level 0 and
/// the last one ends at level 255.
pub fn objective(hist: &Histogram, thresholds: &[u8]) -> f64 {
    let counts = hist.counts();
    let mut score = 0.0;
    let mut start = 0usize;

    for end in thresholds
        .iter()
        .map(|&t| t as usize)
        .chain(std::iter::once(NGRAY - 1))
    {
        let mut count = 0u64;
        let mut moment = 0u64;
        for level in start..=end {
            count += counts[level];
            moment += level as u64 * counts[level];
        }
        score += class_score(count, moment, hist.total());
        start = end + 1;
    }

    score
}

/// Between-class variance `Σ ω_k μ_k² − μ_T²` of a threshold set.
pub fn between_class_variance(hist: &Histogram, thresholds: &[u8]) -> f64 {
    let mean = hist.mean();
    objective(hist, thresholds) - mean * mean
}

/// Move thresholds that sit in an empty run between two populated levels to
/// the middle of that run.
///
/// Class membership is unchanged, so the objective is too. `thresholds` must
/// be strictly increasing.
pub fn center_in_gaps(hist: &Histogram, thresholds: &mut [usize]) {
    let counts = hist.counts();

    for k in 0..thresholds.len() {
        let t = thresholds[k];
        let floor = if k == 0 { 0 } else { thresholds[k - 1] + 1 };
        let ceil = thresholds.get(k + 1).copied().unwrap_or(NGRAY - 1);

        let Some(lower) = (floor..=t).rev().find(|&level| counts[level] > 0) else {
            continue;
        };
        let Some(upper) = (t + 1..=ceil).find(|&level| counts[level] > 0) else {
            continue;
        };

        let hi = (upper - 1).min(NGRAY - 2);
        if hi > lower {
            thresholds[k] = (lower + hi + 1) / 2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::peaks;
    use approx::assert_relative_eq;

    #[test]
    fn empty_class_scores_zero() {
        assert_eq!(class_score(0, 0, 100), 0.0);
    }

    #[test]
    fn objective_of_two_deltas() {
        let hist = peaks(&[(50, 1), (200, 1)]);
        // ω = 0.5 each, μ = 50 and 200.
        let expected = 0.5 * 50.0 * 50.0 + 0.5 * 200.0 * 200.0;
        assert_relative_eq!(objective(&hist, &[100]), expected);
        // Both peaks in one class.
        assert_relative_eq!(objective(&hist, &[10]), 125.0 * 125.0);
    }

    #[test]
    fn between_class_variance_matches_direct_formula() {
        let hist = peaks(&[(20, 3), (40, 1), (180, 2), (230, 4)]);
        let thresholds = [60u8, 200];
        let prob = hist.normalized();
        let mean = hist.mean();

        let mut direct = 0.0;
        let mut start = 0usize;
        for end in [60usize, 200, 255] {
            let w: f64 = (start..=end).map(|i| prob[i]).sum();
            let m: f64 = (start..=end).map(|i| i as f64 * prob[i]).sum();
            if w > 0.0 {
                direct += w * (m / w - mean).powi(2);
            }
            start = end + 1;
        }

        assert_relative_eq!(
            between_class_variance(&hist, &thresholds),
            direct,
            max_relative = 1e-9
        );
    }

    #[test]
    fn gap_threshold_moves_to_center() {
        let hist = peaks(&[(50, 5), (200, 5)]);
        let mut thresholds = [50usize];
        center_in_gaps(&hist, &mut thresholds);
        assert_eq!(thresholds, [125]);
    }

    #[test]
    fn threshold_without_mass_below_stays() {
        let hist = peaks(&[(100, 5)]);
        let mut thresholds = [1usize, 2];
        center_in_gaps(&hist, &mut thresholds);
        assert_eq!(thresholds, [1, 2]);
    }

    #[test]
    fn adjacent_populated_levels_leave_threshold_alone() {
        let hist = peaks(&[(10, 1), (11, 1), (90, 1)]);
        let mut thresholds = [10usize];
        center_in_gaps(&hist, &mut thresholds);
        assert_eq!(thresholds, [10]);
    }
}
