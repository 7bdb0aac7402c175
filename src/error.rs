//! Error types with actionable diagnostics (Andon principle).
//!
//! All errors include contextual information to help users resolve issues
//! without needing to consult external documentation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for conversion pipeline operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while converting a checkpoint for mobile deployment.
///
/// Each variant includes actionable context following the Andon principle
/// of making problems immediately visible and actionable.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Weights file not found at the given path.
    #[error("Weights file not found: {path}\n  → Check the path, or point --weights at a trained checkpoint (e.g. runs/detect/train/weights/best.pt)")]
    WeightsNotFound { path: PathBuf },

    /// ONNX export via the external `yolo` CLI failed.
    #[error("ONNX export failed: {message}\n  → Ensure the ultralytics CLI is installed: pip install ultralytics")]
    ExportFailed { message: String },

    /// TFLite conversion via tf2onnx failed.
    #[error("TFLite conversion failed: {message}\n  → Ensure tf2onnx is installed: pip install tf2onnx tensorflow")]
    ConversionFailed { message: String },

    /// Converter reported success but produced no output file.
    #[error("Converter exited successfully but no file was created at {path}\n  → Check free disk space and the tf2onnx version")]
    OutputMissing { path: PathBuf },

    /// Produced binary is not a loadable TFLite model.
    #[error("Invalid TFLite model at {path}: {message}\n  → Re-run the conversion; a partial write or version mismatch can corrupt the container")]
    InvalidModel { path: PathBuf, message: String },

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Check if this error is user-recoverable.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::WeightsNotFound { .. })
    }

    /// Get the error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::WeightsNotFound { .. } => "E001",
            Self::ExportFailed { .. } => "E010",
            Self::ConversionFailed { .. } => "E011",
            Self::OutputMissing { .. } => "E012",
            Self::InvalidModel { .. } => "E020",
            Self::Io { .. } => "E050",
        }
    }
}
