use std::path::PathBuf;

use clap::Parser;
use histoseg::Method;

/// Multilevel histogram thresholding and segmentation of grayscale images.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Images or folders of images. A file picker opens when none are given.
    pub inputs: Vec<PathBuf>,

    /// Threshold search: otsu, mtbc or kittler.
    #[arg(short, long, default_value_t = Method::Otsu)]
    pub method: Method,

    /// Number of thresholds. Values below 1 are treated as 1.
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    pub thresholds: i64,

    /// Segmented image output. A folder when several images are processed.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pseudo-colorize the segmented output.
    #[arg(short, long, default_value_t = false)]
    pub colorize: bool,

    /// Seed for the colorization palette.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Semi-thresholding: pixels above the highest threshold keep their value.
    #[arg(short, long, default_value_t = false)]
    pub semi: bool,

    /// Plot the histogram with threshold markers. A folder when several
    /// images are processed.
    #[arg(long)]
    pub histogram: Option<PathBuf>,

    /// Append one CSV row per image with thresholds, objective and timing.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Open the written output image in the system viewer.
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// Log level: error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Requested threshold count, clamped to at least one.
    pub fn threshold_count(&self) -> usize {
        if self.thresholds < 1 {
            log::warn!("threshold count {} clamped to 1", self.thresholds);
            1
        } else {
            usize::try_from(self.thresholds).unwrap_or(usize::MAX)
        }
    }
}
