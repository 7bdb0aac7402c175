//! ONNX export stage.
//!
//! Wraps the external ultralytics `yolo` CLI to export a checkpoint to the
//! ONNX interchange format at the fixed detector input resolution.

use crate::error::{ConvertError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Fixed input resolution for YOLO export (square, pixels).
pub const IMAGE_SIZE: u32 = 640;

/// Exporter for the checkpoint → ONNX stage.
///
/// Delegates to the `yolo` command-line tool. The program can be overridden
/// for installations where the CLI lives outside `PATH` (e.g. a virtualenv).
pub struct OnnxExporter {
    program: String,
}

impl Default for OnnxExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl OnnxExporter {
    /// Create an exporter using the `yolo` CLI from `PATH`.
    pub fn new() -> Self {
        Self { program: "yolo".to_string() }
    }

    /// Override the exporter executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Export a checkpoint to ONNX, returning the path of the exported graph.
    ///
    /// Ultralytics writes the ONNX file next to the checkpoint, so the
    /// returned path is the weights path with an `.onnx` extension. The
    /// exporter reports success based on the tool's exit status alone; the
    /// returned path is handed to the converter unchecked.
    pub fn export(&self, weights: &Path) -> Result<PathBuf> {
        let output = Command::new(&self.program)
            .arg("export")
            .arg(format!("model={}", weights.display()))
            .arg("format=onnx")
            .arg(format!("imgsz={IMAGE_SIZE}"))
            .output()
            .map_err(|e| ConvertError::ExportFailed {
                message: format!("failed to run '{}': {e}", self.program),
            })?;

        if !output.status.success() {
            return Err(ConvertError::ExportFailed { message: diagnostics(&output) });
        }

        Ok(weights.with_extension("onnx"))
    }
}

/// Pull a readable diagnostic out of a finished process, preferring stderr.
fn diagnostics(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            format!("exited with {}", output.status)
        } else {
            trimmed.to_string()
        }
    } else {
        trimmed.to_string()
    }
}
