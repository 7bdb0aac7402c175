//! TFLite conversion stage (SMED principle - quick deployment changeover).
//!
//! Shells out to `python -m tf2onnx.convert` to turn the exported ONNX graph
//! into a TensorFlow Lite flat binary. The external tool's exit status alone
//! is not trusted: conversion only counts as successful when the output file
//! actually exists afterwards.

use crate::error::{ConvertError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Fixed ONNX operator-set version passed to tf2onnx.
pub const OPSET: u32 = 13;

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// ONNX graph that was consumed
    pub input_path: PathBuf,
    /// Produced TFLite binary
    pub output_path: PathBuf,
    /// Input size in bytes
    pub input_size: u64,
    /// Output size in bytes
    pub output_size: u64,
    /// Conversion duration in seconds
    pub duration_secs: f64,
}

impl ConversionResult {
    /// Get size ratio (output/input).
    pub fn size_ratio(&self) -> f64 {
        if self.input_size == 0 {
            return 1.0;
        }
        self.output_size as f64 / self.input_size as f64
    }
}

/// Converter for the ONNX → TFLite stage.
///
/// The Python interpreter can be overridden for virtualenv installations;
/// the tf2onnx invocation itself (module, opset, target flag) is fixed.
pub struct TfliteConverter {
    python: String,
}

impl Default for TfliteConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl TfliteConverter {
    /// Create a converter using `python3` from `PATH`.
    pub fn new() -> Self {
        Self { python: "python3".to_string() }
    }

    /// Override the Python interpreter executable.
    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    /// Convert an ONNX graph to a TFLite binary at `output`.
    ///
    /// Success requires both a zero exit status from tf2onnx and the output
    /// file existing on disk; a zero exit with a missing file is a failure.
    pub fn convert(&self, onnx: &Path, output: &Path) -> Result<ConversionResult> {
        let start = std::time::Instant::now();

        let result = Command::new(&self.python)
            .arg("-m")
            .arg("tf2onnx.convert")
            .arg("--opset")
            .arg(OPSET.to_string())
            .arg("--tflite")
            .arg(output)
            .arg("--input")
            .arg(onnx)
            .output()
            .map_err(|e| ConvertError::ConversionFailed {
                message: format!("failed to run '{}': {e}", self.python),
            })?;

        if !result.status.success() {
            return Err(ConvertError::ConversionFailed { message: diagnostics(&result) });
        }

        if !output.exists() {
            return Err(ConvertError::OutputMissing { path: output.to_path_buf() });
        }

        let input_size = std::fs::metadata(onnx).map(|m| m.len()).unwrap_or(0);
        let output_size = std::fs::metadata(output)
            .map(|m| m.len())
            .map_err(|e| ConvertError::io(format!("reading {}", output.display()), e))?;

        Ok(ConversionResult {
            input_path: onnx.to_path_buf(),
            output_path: output.to_path_buf(),
            input_size,
            output_size,
            duration_secs: start.elapsed().as_secs_f64(),
        })
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

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_convert_interpreter_missing() {
        let converter = TfliteConverter::new().with_python("/nonexistent/python3");
        let err = converter
            .convert(Path::new("model.onnx"), Path::new("model.tflite"))
            .unwrap_err();
        assert_eq!(err.code(), "E011");
        assert!(err.to_string().contains("/nonexistent/python3"));
    }

    #[cfg(unix)]
    #[test]
    fn test_convert_nonzero_exit_surfaces_stderr() {
        let tmp = tempfile::TempDir::new().unwrap();
        let script = write_script(tmp.path(), "python3", "echo 'unsupported op: NMS' >&2; exit 1");

        let converter = TfliteConverter::new().with_python(script.to_str().unwrap());
        let err = converter
            .convert(&tmp.path().join("model.onnx"), &tmp.path().join("model.tflite"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::ConversionFailed { .. }));
        assert!(err.to_string().contains("unsupported op: NMS"));
    }

    #[cfg(unix)]
    #[test]
    fn test_convert_zero_exit_missing_file_is_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let script = write_script(tmp.path(), "python3", "exit 0");

        let converter = TfliteConverter::new().with_python(script.to_str().unwrap());
        let output = tmp.path().join("model.tflite");
        let err = converter.convert(&tmp.path().join("model.onnx"), &output).unwrap_err();
        assert!(matches!(err, ConvertError::OutputMissing { .. }));
        assert_eq!(err.code(), "E012");
    }

    #[cfg(unix)]
    #[test]
    fn test_convert_success_reports_sizes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let onnx = tmp.path().join("model.onnx");
        std::fs::write(&onnx, vec![0u8; 4000]).unwrap();

        let output = tmp.path().join("model.tflite");
        let script = write_script(
            tmp.path(),
            "python3",
            &format!("head -c 2000 /dev/zero > '{}'", output.display()),
        );

        let converter = TfliteConverter::new().with_python(script.to_str().unwrap());
        let result = converter.convert(&onnx, &output).unwrap();

        assert_eq!(result.input_size, 4000);
        assert_eq!(result.output_size, 2000);
        assert!((result.size_ratio() - 0.5).abs() < 1e-9);
        assert_eq!(result.output_path, output);
    }

    #[test]
    fn test_size_ratio_zero_input() {
        let result = ConversionResult {
            input_path: PathBuf::from("in"),
            output_path: PathBuf::from("out"),
            input_size: 0,
            output_size: 1000,
            duration_secs: 0.1,
        };
        assert_eq!(result.size_ratio(), 1.0);
    }
}
