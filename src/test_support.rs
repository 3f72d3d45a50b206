//! Synthetic histograms shared by the unit tests.

use crate::histogram::Histogram;
use crate::NGRAY;

/// Histogram with the given `(level, count)` spikes and nothing else.
pub fn peaks(levels: &[(usize, u64)]) -> Histogram {
    let mut counts = [0u64; NGRAY];
    for &(level, count) in levels {
        counts[level] += count;
    }
    Histogram::from_counts(counts).unwrap()
}

/// Sum of sampled Gaussians `(mean, sigma, height)`, rounded to counts.
pub fn mixture(modes: &[(f64, f64, f64)]) -> Histogram {
    let mut counts = [0u64; NGRAY];
    for (level, count) in counts.iter_mut().enumerate() {
        let x = level as f64;
        let density: f64 = modes
            .iter()
            .map(|&(mean, sigma, height)| height * (-(x - mean).powi(2) / (2.0 * sigma * sigma)).exp())
            .sum();
        *count = density.round() as u64;
    }
    Histogram::from_counts(counts).unwrap()
}
