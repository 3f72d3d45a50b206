use thiserror::Error;

/// Errors raised before a threshold search is entered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThresholdError {
    /// The image holds no pixels, so no probability histogram exists.
    #[error("image has no pixels")]
    EmptyImage,

    /// More thresholds were requested than the gray range can separate.
    #[error("{requested} thresholds requested, at most {max} fit in the gray range")]
    TooManyThresholds {
        requested: usize,
        max: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown method `{0}`, expected otsu, mtbc or kittler")]
pub struct ParseMethodError(pub String);
