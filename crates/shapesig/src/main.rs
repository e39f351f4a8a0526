//! shapesig: command-line front end for the shape-signature pipeline.
//!
//! Binarizes silhouette images, renders the traced contour, prints the
//! complex boundary signature, and writes or compares Fourier shape
//! descriptors. Labelled descriptors written by `describe --label` can be
//! scored with a leave-one-out nearest-neighbour run (`evaluate`).
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin shapesig -- describe --label square square.png -o square.json
//! cargo run --release --bin shapesig -- compare a.png b.png
//! cargo run --release --bin shapesig -- evaluate samples/*.json
//! ```
//!
//! Set `RUST_LOG=debug` to see per-stage pipeline logging.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};
use shapesig_pipeline::{
    ContourTracerKind, Descriptor, Evaluation, INVALID_DISTANCE, PipelineConfig, RgbaImage,
    Sample,
};

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Number of signature samples printed in the plain-text report.
const SIGNATURE_PREVIEW: usize = 8;

/// Fourier shape descriptors from silhouette images.
#[derive(Parser)]
#[command(name = "shapesig", version)]
struct Cli {
    #[command(flatten)]
    pipeline: PipelineArgs,

    #[command(subcommand)]
    command: Command,
}

/// Pipeline parameters shared by every subcommand.
#[derive(Args)]
struct PipelineArgs {
    /// Smoothing kernel size before thresholding (odd).
    #[arg(long, global = true, default_value_t = PipelineConfig::DEFAULT_BLUR_KERNEL_SIZE)]
    blur_kernel_size: u32,

    /// Closing structuring-element size (odd).
    #[arg(long, global = true, default_value_t = PipelineConfig::DEFAULT_CLOSE_KERNEL_SIZE)]
    close_kernel_size: u32,

    /// Number of dilate/erode passes in the closing step.
    #[arg(long, global = true, default_value_t = PipelineConfig::DEFAULT_CLOSE_ITERATIONS)]
    close_iterations: u32,

    /// Contour tracing algorithm.
    #[arg(long, global = true, value_enum, default_value_t = Tracer::BorderFollowing)]
    tracer: Tracer,

    /// Descriptor length.
    #[arg(long, global = true, default_value_t = PipelineConfig::DEFAULT_DESCRIPTOR_LEN)]
    descriptor_len: usize,

    /// Stroke width of the contour overlay in pixels.
    #[arg(long, global = true, default_value_t = PipelineConfig::DEFAULT_CONTOUR_THICKNESS)]
    contour_thickness: f32,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// Missing fields take their default values.
    #[arg(long, global = true)]
    config_json: Option<String>,
}

/// Contour tracing algorithm selection.
#[derive(Clone, Copy, ValueEnum)]
enum Tracer {
    /// Suzuki-Abe border following, outer borders only.
    BorderFollowing,
}

#[derive(Subcommand)]
enum Command {
    /// Write the binarized mask as an image.
    Binarize {
        /// Input image (PNG, JPEG, BMP, WebP).
        image: PathBuf,
        /// Output image path (PNG recommended).
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write the selected contour drawn on a blank canvas.
    Contour {
        /// Input image (PNG, JPEG, BMP, WebP).
        image: PathBuf,
        /// Output image path (PNG recommended).
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the centroid-relative complex signature.
    Signature {
        /// Input image (PNG, JPEG, BMP, WebP).
        image: PathBuf,
        /// Print the full interleaved signature as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print or write the normalized descriptor as JSON.
    Describe {
        /// Input image (PNG, JPEG, BMP, WebP).
        image: PathBuf,
        /// Descriptor length; zero or negative selects the default of 32.
        #[arg(short = 'k', value_name = "K", allow_negative_numbers = true)]
        k: Option<i32>,
        /// Wrap the descriptor in a labelled sample for `evaluate`.
        #[arg(long)]
        label: Option<String>,
        /// Write JSON to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the descriptor distance between two images (-1 when invalid).
    Compare {
        /// First image.
        a: PathBuf,
        /// Second image.
        b: PathBuf,
        /// Descriptor length; zero or negative selects the default of 32.
        #[arg(short = 'k', value_name = "K", allow_negative_numbers = true)]
        k: Option<i32>,
    },
    /// Leave-one-out nearest-neighbour accuracy over labelled samples.
    Evaluate {
        /// JSON files each holding one sample or an array of samples.
        #[arg(required = true)]
        samples: Vec<PathBuf>,
    },
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. The result is validated either
/// way.
fn config_from_cli(args: &PipelineArgs) -> CliResult<PipelineConfig> {
    let config: PipelineConfig = if let Some(ref json) = args.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        PipelineConfig {
            blur_kernel_size: args.blur_kernel_size,
            close_kernel_size: args.close_kernel_size,
            close_iterations: args.close_iterations,
            contour_tracer: match args.tracer {
                Tracer::BorderFollowing => ContourTracerKind::BorderFollowing,
            },
            descriptor_len: args.descriptor_len,
            contour_thickness: args.contour_thickness,
        }
    };
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let config = config_from_cli(&cli.pipeline)?;

    match &cli.command {
        Command::Binarize { image, output } => {
            let mask = shapesig_pipeline::binarize(&load_image(image)?, &config);
            save_image(&mask, output)
        }
        Command::Contour { image, output } => {
            let overlay = shapesig_pipeline::find_contour_overlay(&load_image(image)?, &config);
            save_image(&overlay, output)
        }
        Command::Signature { image, json } => {
            let signature =
                shapesig_pipeline::compute_complex_signature(&load_image(image)?, &config);
            if *json {
                println!("{}", serde_json::to_string(&signature)?);
            } else {
                print_signature(&signature);
            }
            Ok(())
        }
        Command::Describe {
            image,
            k,
            label,
            output,
        } => {
            let descriptor = describe(image, &config, *k)?;
            if descriptor.is_empty() {
                warn!("no shape found in {}", image.display());
            }
            let json = match label {
                Some(label) => serde_json::to_string_pretty(&Sample {
                    label: label.clone(),
                    descriptor,
                })?,
                None => serde_json::to_string_pretty(&descriptor)?,
            };
            match output {
                Some(path) => {
                    std::fs::write(path, &json)
                        .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
                    info!("descriptor written to {}", path.display());
                }
                None => println!("{json}"),
            }
            Ok(())
        }
        Command::Compare { a, b, k } => {
            let da = describe(a, &config, *k)?;
            let db = describe(b, &config, *k)?;
            let distance =
                shapesig_pipeline::euclidean_distance(Some(da.values()), Some(db.values()));
            if (distance - INVALID_DISTANCE).abs() < f32::EPSILON {
                warn!(
                    "descriptors are not comparable ({} vs {} entries)",
                    da.len(),
                    db.len()
                );
            }
            println!("{distance}");
            Ok(())
        }
        Command::Evaluate { samples } => {
            let mut all = Vec::new();
            for path in samples {
                all.extend(load_samples(path)?);
            }
            let evaluation = shapesig_pipeline::evaluate::leave_one_out(&all)?;
            print_evaluation(&evaluation);
            Ok(())
        }
    }
}

fn load_image(path: &Path) -> CliResult<RgbaImage> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    info!("read {} ({} bytes)", path.display(), bytes.len());
    Ok(shapesig_pipeline::raster::decode_rgba(&bytes)?)
}

fn save_image(image: &RgbaImage, path: &Path) -> CliResult<()> {
    image
        .save(path)
        .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
    info!(
        "wrote {}x{} image to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}

/// Descriptor of the shape in `path`, `k` entries long when given.
fn describe(path: &Path, config: &PipelineConfig, k: Option<i32>) -> CliResult<Descriptor> {
    let image = load_image(path)?;
    let mut config = config.clone();
    if let Some(k) = k {
        config.descriptor_len = shapesig_pipeline::descriptor::resolve_len(k);
    }
    Ok(shapesig_pipeline::analyze(&image, &config).descriptor)
}

/// Read one sample or an array of samples from a JSON file.
fn load_samples(path: &Path) -> CliResult<Vec<Sample>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    if let Ok(many) = serde_json::from_str::<Vec<Sample>>(&text) {
        return Ok(many);
    }
    let one: Sample = serde_json::from_str(&text)
        .map_err(|e| format!("Error parsing samples in {}: {e}", path.display()))?;
    Ok(vec![one])
}

fn print_signature(interleaved: &[f32]) {
    let samples: Vec<(f32, f32)> = interleaved
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();
    println!("{} samples", samples.len());
    for (i, (re, im)) in samples.iter().take(SIGNATURE_PREVIEW).enumerate() {
        println!("{i:>4}  {re:>10.3} {im:>+10.3}i");
    }
    if samples.len() > SIGNATURE_PREVIEW {
        println!("   ... {} more", samples.len() - SIGNATURE_PREVIEW);
    }
}

/// Print accuracy followed by an `actual x predicted` confusion table.
fn print_evaluation(evaluation: &Evaluation) {
    println!("Samples:  {}", evaluation.total);
    println!(
        "Accuracy: {:.2}% ({}/{})",
        evaluation.accuracy(),
        evaluation.correct,
        evaluation.total
    );
    println!();

    let labels = evaluation.labels();
    let unmatched = labels
        .iter()
        .any(|actual| evaluation.count(actual, None) > 0);

    let header = "actual \\ predicted";
    let width = labels
        .iter()
        .map(|l| l.len())
        .chain([header.len(), "(none)".len()])
        .max()
        .unwrap_or(0);

    let mut line = format!("{header:<width$}");
    for label in &labels {
        line.push_str(&format!("  {label:>width$}"));
    }
    if unmatched {
        line.push_str(&format!("  {:>width$}", "(none)"));
    }
    println!("{line}");
    println!("{}", "-".repeat(line.len()));

    for actual in &labels {
        let mut row = format!("{actual:<width$}");
        for predicted in &labels {
            let n = evaluation.count(actual, Some(*predicted));
            row.push_str(&format!("  {n:>width$}"));
        }
        if unmatched {
            let n = evaluation.count(actual, None);
            row.push_str(&format!("  {n:>width$}"));
        }
        println!("{row}");
    }
}
