//! Multilevel gray-level thresholding from image histograms.
//!
//! Three searches pick thresholds from a [`Histogram`]:
//!
//! - [`otsu`]: exhaustive multilevel Otsu over interval lookup tables,
//! - [`mtbc`]: the same objective solved by dynamic programming,
//! - [`kittler`]: binary minimum-error thresholding.
//!
//! [`segment`] then quantizes an image into the resulting bands and
//! [`colorize`](colorize::colorize) paints the bands for display.

use std::fmt;
use std::str::FromStr;

pub mod colorize;
pub mod error;
pub mod histogram;
pub mod kittler;
pub mod mtbc;
pub mod otsu;
pub mod segment;
pub mod stats;

#[cfg(test)]
mod test_support;

pub use error::{ParseMethodError, ThresholdError};
pub use histogram::Histogram;
pub use segment::segment;

pub const NGRAY: usize = 256;

/// Largest threshold count that still leaves one level per class.
pub const MAX_THRESHOLDS: usize = NGRAY - 2;

/// A strategy that places thresholds on a histogram.
pub trait ThresholdSearch {
    fn find_thresholds(&self, hist: &Histogram, n: usize) -> Result<Vec<u8>, ThresholdError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Otsu,
    Mtbc,
    Kittler,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Otsu => "otsu",
            Method::Mtbc => "mtbc",
            Method::Kittler => "kittler",
        }
    }

    fn search(&self) -> &'static dyn ThresholdSearch {
        match self {
            Method::Otsu => &otsu::Otsu,
            Method::Mtbc => &mtbc::Mtbc,
            Method::Kittler => &kittler::Kittler,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "otsu" => Ok(Method::Otsu),
            "mtbc" => Ok(Method::Mtbc),
            "kittler" => Ok(Method::Kittler),
            _ => Err(ParseMethodError(s.to_string())),
        }
    }
}

pub fn find_thresholds(
    method: Method,
    hist: &Histogram,
    n: usize,
) -> Result<Vec<u8>, ThresholdError> {
    method.search().find_thresholds(hist, n)
}

/// Clamp a zero count to one and reject counts the gray range cannot hold.
///
/// # Errors
/// Returns [`ThresholdError::TooManyThresholds`] when `n > MAX_THRESHOLDS`.
pub fn clamp_threshold_count(n: usize) -> Result<usize, ThresholdError> {
    match n {
        0 => {
            log::warn!("threshold count 0 clamped to 1");
            Ok(1)
        }
        n if n > MAX_THRESHOLDS => Err(ThresholdError::TooManyThresholds {
            requested: n,
            max: MAX_THRESHOLDS,
        }),
        n => Ok(n),
    }
}
