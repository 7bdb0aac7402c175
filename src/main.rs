//! yolo-tflite CLI entry point.

use clap::Parser;
use std::path::PathBuf;
use yolo_tflite::cli::{format_bytes, styles, OutputFormat};
use yolo_tflite::{ConvertError, Pipeline, Result};

#[derive(Parser)]
#[command(name = "yolo-tflite")]
#[command(about = "Convert a YOLO checkpoint to TensorFlow Lite for Android deployment")]
#[command(version)]
struct Cli {
    /// Path to the YOLO .pt weights file
    #[arg(long)]
    weights: PathBuf,

    /// Output .tflite file path
    #[arg(long)]
    output: PathBuf,

    /// Android project root for automatic copy into the asset bundle
    #[arg(long)]
    android_project: Option<PathBuf>,

    /// Suppress non-error output
    #[arg(short, long)]
    quiet: bool,

    /// Summary output format: table, json
    #[arg(long, default_value = "table")]
    format: OutputFormat,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run_convert(&cli) {
        if !cli.quiet {
            eprintln!("{}", styles::error(&e.to_string()));
        }
        std::process::exit(1);
    }
}

fn run_convert(cli: &Cli) -> Result<()> {
    if !cli.weights.exists() {
        return Err(ConvertError::WeightsNotFound { path: cli.weights.clone() });
    }

    let pipeline = Pipeline::new();

    if !cli.quiet {
        println!("{}", styles::header("YOLO → TensorFlow Lite Conversion"));
        println!("\n[1/3] Exporting {} to ONNX...", cli.weights.display());
    }
    let onnx = pipeline.export(&cli.weights)?;
    if !cli.quiet {
        println!("{}", styles::success(&format!("ONNX export complete: {}", onnx.display())));
        println!("\n[2/3] Converting ONNX to TensorFlow Lite...");
    }

    let conversion = pipeline.convert(&onnx, &cli.output)?;
    if !cli.quiet {
        println!(
            "{}",
            styles::success(&format!(
                "TFLite conversion complete: {} ({})",
                conversion.output_path.display(),
                format_bytes(conversion.output_size)
            ))
        );
        println!("\n[3/3] Validating TFLite model...");
    }

    let model = pipeline.validate(&cli.output)?;
    if !cli.quiet {
        println!("{}", styles::success("Model validated successfully"));
        println!("\n{}", model.to_report());
    }

    let mut installed_to = None;
    if let Some(project) = &cli.android_project {
        // Best-effort: a failed copy is reported but never fails the run.
        match pipeline.install(&cli.output, project) {
            Ok(target) => {
                if !cli.quiet {
                    println!(
                        "{}",
                        styles::success(&format!("Copied to Android assets: {}", target.display()))
                    );
                }
                installed_to = Some(target);
            }
            Err(e) => {
                if !cli.quiet {
                    eprintln!(
                        "{}",
                        styles::warn(&format!("Failed to copy to Android assets: {e}"))
                    );
                }
            }
        }
    }

    if cli.format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::json!({
                "output": cli.output.display().to_string(),
                "size_bytes": conversion.output_size,
                "input_shape": model.inputs.first().map(|t| t.shape.clone()),
                "input_type": model.inputs.first().map(|t| t.dtype.to_string()),
                "output_count": model.outputs.len(),
                "installed_to": installed_to.as_ref().map(|p| p.display().to_string()),
            })
        );
    } else if !cli.quiet {
        println!("{}", styles::success("Conversion complete"));
        if installed_to.is_none() {
            println!(
                "{}",
                styles::info(&format!(
                    "Place {} in: app/src/main/assets/{}",
                    cli.output.display(),
                    yolo_tflite::install::ASSET_FILENAME
                ))
            );
        }
    }

    Ok(())
}
