use std::path::Path;

use histoseg::Histogram;
use plotters::prelude::*;

/// Plot the histogram bars with a red line at each threshold.
pub fn draw_histogram_with_thresholds(
    hist: &Histogram,
    thresholds: &[u8],
    output_path: &Path,
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(output_path, (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_count = hist.counts().iter().copied().max().unwrap_or(0);
    let top = max_count + max_count / 10 + 1;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(0u64..256u64, 0u64..top)?;

    chart.draw_series(hist.counts().iter().enumerate().map(|(x, &y)| {
        let x0 = x as u64;
        Rectangle::new([(x0, 0), (x0 + 1, y)], BLUE.mix(0.5).filled())
    }))?;

    for &threshold in thresholds {
        let x = threshold as u64;
        chart.draw_series(LineSeries::new(vec![(x, 0), (x, max_count)], &RED))?;
    }

    root.present()?;
    log::info!("histogram saved to {}", output_path.display());
    Ok(())
}
