//! 256-bin intensity histograms.
//!
//! Every search in this crate starts from a [`Histogram`]. It keeps the raw
//! counts so interval sums can be formed exactly in integers, and hands out
//! the probability-normalized form where an algorithm needs it.

use image::GrayImage;

use crate::error::ThresholdError;
use crate::NGRAY;

/// Frequency table of gray levels `0..=255`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; NGRAY],
    total: u64,
}

impl Histogram {
    pub fn from_image(gray_img: &GrayImage) -> Result<Self, ThresholdError> {
        Self::from_pixels(gray_img.as_raw())
    }

    pub fn from_pixels(pixels: &[u8]) -> Result<Self, ThresholdError> {
        let mut counts = [0u64; NGRAY];
        for &intensity in pixels {
            counts[intensity as usize] += 1;
        }
        Self::from_counts(counts)
    }

    /// Fails with [`ThresholdError::EmptyImage`] when every count is zero.
    pub fn from_counts(counts: [u64; NGRAY]) -> Result<Self, ThresholdError> {
        let total: u64 = counts.iter().sum();
        if total == 0 {
            return Err(ThresholdError::EmptyImage);
        }
        Ok(Self { counts, total })
    }

    pub fn counts(&self) -> &[u64; NGRAY] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Probability of each gray level (count / total).
    pub fn normalized(&self) -> [f64; NGRAY] {
        let total = self.total as f64;
        self.counts.map(|count| count as f64 / total)
    }

    pub fn mean(&self) -> f64 {
        let moment: u64 = self
            .counts
            .iter()
            .enumerate()
            .map(|(level, &count)| level as u64 * count)
            .sum();
        moment as f64 / self.total as f64
    }

    pub fn populated_levels(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }
}
