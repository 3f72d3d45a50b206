use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use histoseg::{colorize::colorize, find_thresholds, segment, stats, Histogram};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rfd::FileDialog;

mod cli;
mod file_writing;
mod histogram_drawer;

use cli::Cli;

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

fn run() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(LevelFilter::Warn))
        .init();

    let inputs = collect_inputs(&cli.inputs)?;
    if inputs.is_empty() {
        info!("no image selected");
        return Ok(());
    }

    let n = cli.threshold_count();
    let multiple = inputs.len() > 1;
    if multiple {
        for dir in [&cli.output, &cli.histogram].into_iter().flatten() {
            fs::create_dir_all(dir)
                .with_context(|| format!("cannot create directory {}", dir.display()))?;
        }
        if cli.output.is_some() || cli.histogram.is_some() {
            for stem in colliding_stems(&inputs) {
                warn!("several inputs named `{stem}`: their outputs overwrite each other");
            }
        }
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let pb = if multiple {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.white/gray} {pos:>7}/{len:7} {msg}",
        )?);
        Some(pb)
    } else {
        None
    };

    for img_path in &inputs {
        let line = process_image(&cli, img_path, n, multiple, &mut rng)?;
        match &pb {
            Some(pb) => {
                pb.println(line);
                pb.inc(1);
            }
            None => println!("{line}"),
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Application error: {e:#}");
        std::process::exit(1);
    }
}

/// Expand folders to their image files. Falls back to a file picker.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if inputs.is_empty() {
        let picked = FileDialog::new()
            .add_filter("image", &IMAGE_EXTENSIONS)
            .pick_files()
            .unwrap_or_default();
        return Ok(picked);
    }

    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in fs::read_dir(input)
                .with_context(|| format!("cannot read directory {}", input.display()))?
            {
                let path = entry?.path();
                if path.is_file() && has_image_extension(&path) {
                    found.push(path);
                }
            }
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
}

fn file_stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// Stems shared by more than one input; batch outputs are named by stem.
fn colliding_stems(inputs: &[PathBuf]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut colliding = BTreeSet::new();
    for path in inputs {
        let stem = file_stem_of(path);
        if !seen.insert(stem.clone()) {
            colliding.insert(stem);
        }
    }
    colliding.into_iter().collect()
}

/// With several inputs `base` is a folder and the file is named after the
/// image; otherwise `base` is the file itself.
fn output_path(base: &Path, file_stem: &str, suffix: &str, multiple: bool) -> PathBuf {
    if multiple {
        base.join(format!("{file_stem}_{suffix}.png"))
    } else {
        base.to_path_buf()
    }
}

/// Threshold one image, write the requested artifacts and return the line
/// to print.
fn process_image(
    cli: &Cli,
    img_path: &Path,
    n: usize,
    multiple: bool,
    rng: &mut StdRng,
) -> Result<String> {
    let mut gray_img = image::open(img_path)
        .with_context(|| format!("cannot open image {}", img_path.display()))?
        .to_luma8();
    let hist = Histogram::from_image(&gray_img)
        .with_context(|| format!("cannot threshold {}", img_path.display()))?;
    let file_stem = file_stem_of(img_path);

    let start_time = Instant::now();
    let thresholds = find_thresholds(cli.method, &hist, n)?;
    let duration = start_time.elapsed();
    info!(
        "{file_stem}: {} thresholds {thresholds:?} in {duration:?}",
        cli.method
    );

    if let Some(report) = &cli.report {
        file_writing::writeln(
            report,
            &file_stem,
            cli.method,
            &thresholds,
            duration,
            stats::objective(&hist, &thresholds),
        )
        .with_context(|| format!("cannot append to {}", report.display()))?;
    }

    if let Some(base) = &cli.histogram {
        let histogram_path = output_path(base, &file_stem, "histogram", multiple);
        histogram_drawer::draw_histogram_with_thresholds(&hist, &thresholds, &histogram_path)
            .with_context(|| format!("cannot plot {}", histogram_path.display()))?;
    }

    if let Some(base) = &cli.output {
        segment(&mut gray_img, &thresholds, cli.semi);
        let segmented_path = output_path(base, &file_stem, cli.method.as_str(), multiple);
        let saved = if cli.colorize {
            colorize(&gray_img, rng).save(&segmented_path)
        } else {
            gray_img.save(&segmented_path)
        };
        saved.with_context(|| format!("cannot save {}", segmented_path.display()))?;

        if cli.show {
            open::that(&segmented_path)
                .with_context(|| format!("cannot open {}", segmented_path.display()))?;
        }
    }

    let line = thresholds
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(if multiple {
        format!("{file_stem}: {line}")
    } else {
        line
    })
}
