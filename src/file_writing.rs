use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use histoseg::Method;

/// Append `image,method,n,objective,[t1;t2;..],millis` to `file_path`.
pub fn writeln(
    file_path: &Path,
    image_name: &str,
    method: Method,
    thresholds: &[u8],
    duration: Duration,
    objective_value: f64,
) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(file_path)?;
    writeln!(
        file,
        "{image_name},{method},{},{objective_value},[{}],{}",
        thresholds.len(),
        thresholds
            .iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>()
            .join(";"),
        duration.as_secs_f64() * 1000.0,
    )
}
