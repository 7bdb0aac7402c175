//! YOLO checkpoint → TensorFlow Lite conversion for Android deployment.
//!
//! This crate chains three external model-conversion tools into one
//! fail-fast pipeline:
//! - Exporting a YOLO `.pt` checkpoint to ONNX (ultralytics `yolo` CLI)
//! - Converting ONNX to a TFLite flat binary (`python -m tf2onnx.convert`)
//! - Validating the binary by reading back its tensor metadata
//!
//! An optional final stage copies the validated binary into an Android
//! project's asset bundle; that copy is best-effort and never fails the run.
//!
//! # Toyota Way Principles
//!
//! - **Andon**: every stage surfaces the external tool's diagnostics on failure
//! - **Jidoka**: a zero exit status is not trusted without the artifact on disk
//! - **SMED**: one command takes a trained checkpoint to a deployable asset

pub mod cli;
pub mod convert;
pub mod error;
pub mod export;
pub mod install;
pub mod pipeline;
pub mod validate;

pub use convert::{ConversionResult, TfliteConverter};
pub use error::{ConvertError, Result};
pub use export::OnnxExporter;
pub use install::install_to_android;
pub use pipeline::{Pipeline, PipelineReport};
pub use validate::{read_model_report, ModelReport, TensorDesc, TensorType};

use std::path::Path;

/// Run the complete conversion pipeline with default tool locations.
pub fn run(
    weights: impl AsRef<Path>,
    output: impl AsRef<Path>,
    android_project: Option<&Path>,
) -> Result<PipelineReport> {
    Pipeline::new().run(weights.as_ref(), output.as_ref(), android_project)
}
