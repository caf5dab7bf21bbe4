//! CLI application for face authenticity classification.
//!
//! Usage:
//!   veriface <image>                    # Human-readable output
//!   veriface <image> --json             # JSON output
//!   veriface <image> -o verdict.json    # Save to file

use clap::Parser;
use image::imageops::FilterType;
use serde::Serialize;
use std::path::PathBuf;
use veriface::{laplacian_variance, FaceImage, GrayImage, Predictor, Verdict, IMAGE_SIZE};

#[derive(Parser, Debug)]
#[command(name = "veriface")]
#[command(author, version, about = "Classify a face image as REAL or AI-GENERATED", long_about = None)]
struct Args {
    /// Input image file
    #[arg(required = true)]
    image: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Classifier artifact path
    #[arg(long, default_value = "models/classifier.bin")]
    model: PathBuf,

    /// Standardizer artifact path
    #[arg(long, default_value = "models/scaler.bin")]
    scaler: PathBuf,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output {
    image: String,
    width: u32,
    height: u32,
    label: String,
    confidence: f64,
    explanation: String,
    debug_variance: f64,
    debug_prob: f64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    // Load artifacts
    if args.verbose {
        eprintln!(
            "Loading artifacts from {:?} and {:?}...",
            args.scaler, args.model
        );
    }
    let predictor = Predictor::load(&args.scaler, &args.model)?;

    // Load image
    if args.verbose {
        eprintln!("Loading image {:?}...", args.image);
    }
    let img = image::open(&args.image)?;
    let (width, height) = (img.width(), img.height());

    // Sharpness is measured on the full-resolution grayscale, before the
    // resize, matching the training-time distribution.
    let gray_full = img.to_luma8();
    let gray = GrayImage::new(gray_full.into_raw(), width, height);
    let sharpness = laplacian_variance(&gray);

    let rgb = img
        .resize_exact(IMAGE_SIZE, IMAGE_SIZE, FilterType::Triangle)
        .to_rgb8();
    let face = FaceImage::from_rgb(rgb.into_raw())?;

    if args.verbose {
        eprintln!("Classifying ({}x{}, variance {:.2})...", width, height, sharpness);
    }
    let verdict = predictor.classify(&face, sharpness)?;

    let output = Output {
        image: args.image.display().to_string(),
        width,
        height,
        label: verdict.label.to_string(),
        confidence: verdict.confidence,
        explanation: verdict.explanation.clone(),
        debug_variance: verdict.sharpness,
        debug_prob: verdict.probability,
    };

    // Generate output
    let output_str = if args.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(&output, &verdict)
    };

    // Write output
    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        if args.verbose {
            eprintln!("Output written to {:?}", path);
        }
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn format_human_readable(output: &Output, verdict: &Verdict) -> String {
    let mut s = String::new();
    s.push_str(&format!("Image: {} ({}x{})\n", output.image, output.width, output.height));
    s.push_str(&format!(
        "Verdict: {} (confidence {:.1}%)\n",
        verdict.label,
        verdict.confidence * 100.0
    ));
    s.push_str(&format!("Reason: {}\n", verdict.explanation));
    s.push_str(&format!(
        "Signals: sharpness variance {:.2}, model probability {:.4}",
        verdict.sharpness, verdict.probability
    ));
    s
}
