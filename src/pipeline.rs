//! Conversion pipeline execution (Heijunka - level scheduling).
//!
//! Orchestrates the complete workflow: checkpoint → ONNX → TFLite →
//! validation, with the optional copy into an Android asset bundle. Stages
//! run strictly in order and the first hard failure ends the run; only the
//! asset copy is best-effort.

use crate::convert::{ConversionResult, TfliteConverter};
use crate::error::{ConvertError, Result};
use crate::export::OnnxExporter;
use crate::install::install_to_android;
use crate::validate::{read_model_report, ModelReport};
use std::path::{Path, PathBuf};

/// Pipeline execution result.
#[derive(Debug)]
pub struct PipelineReport {
    /// Intermediate ONNX graph produced by the exporter
    pub onnx_path: PathBuf,
    /// Conversion stage outcome (sizes, duration)
    pub conversion: ConversionResult,
    /// Tensor metadata read back from the produced binary
    pub model: ModelReport,
    /// Asset destination when the copy succeeded
    pub installed_to: Option<PathBuf>,
    /// Captured asset-copy failure; never fatal
    pub install_error: Option<String>,
    /// Total execution time in seconds
    pub duration_secs: f64,
}

/// Conversion pipeline orchestrator.
///
/// Owns the two subprocess-backed stages so callers (and tests) can inject
/// alternate tool locations.
pub struct Pipeline {
    exporter: OnnxExporter,
    converter: TfliteConverter,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Create a pipeline using the default tool locations.
    pub fn new() -> Self {
        Self { exporter: OnnxExporter::new(), converter: TfliteConverter::new() }
    }

    /// Replace the export stage.
    pub fn with_exporter(mut self, exporter: OnnxExporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// Replace the conversion stage.
    pub fn with_converter(mut self, converter: TfliteConverter) -> Self {
        self.converter = converter;
        self
    }

    /// Stage 1: export the checkpoint to ONNX.
    pub fn export(&self, weights: &Path) -> Result<PathBuf> {
        self.exporter.export(weights)
    }

    /// Stage 2: convert the ONNX graph to a TFLite binary.
    pub fn convert(&self, onnx: &Path, output: &Path) -> Result<ConversionResult> {
        self.converter.convert(onnx, output)
    }

    /// Stage 3: validate the binary and read back tensor metadata.
    pub fn validate(&self, output: &Path) -> Result<ModelReport> {
        read_model_report(output)
    }

    /// Stage 4 (optional): copy the binary into the Android asset bundle.
    pub fn install(&self, output: &Path, project_root: &Path) -> Result<PathBuf> {
        install_to_android(output, project_root)
    }

    /// Execute the complete pipeline.
    ///
    /// Checks the weights precondition before any external call, then runs
    /// stages 1→2→3 fail-fast. The asset copy runs last when a project root
    /// is given; its failure is recorded in the report, not returned.
    pub fn run(
        &self,
        weights: &Path,
        output: &Path,
        android_project: Option<&Path>,
    ) -> Result<PipelineReport> {
        let start = std::time::Instant::now();

        if !weights.exists() {
            return Err(ConvertError::WeightsNotFound { path: weights.to_path_buf() });
        }

        let onnx_path = self.export(weights)?;
        let conversion = self.convert(&onnx_path, output)?;
        let model = self.validate(output)?;

        let (installed_to, install_error) = match android_project {
            Some(project) => match self.install(output, project) {
                Ok(target) => (Some(target), None),
                Err(e) => (None, Some(e.to_string())),
            },
            None => (None, None),
        };

        Ok(PipelineReport {
            onnx_path,
            conversion,
            model,
            installed_to,
            install_error,
            duration_secs: start.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn marker_script(dir: &Path, name: &str, marker: &Path) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\ntouch '{}'\nexit 0\n", marker.display()))
            .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_missing_weights_fails_before_any_stage() {
        let tmp = tempfile::TempDir::new().unwrap();

        #[cfg(unix)]
        {
            let marker = tmp.path().join("exporter-ran");
            let pipeline = Pipeline::new().with_exporter(
                OnnxExporter::new()
                    .with_program(marker_script(tmp.path(), "yolo", &marker)),
            );

            let err = pipeline
                .run(&tmp.path().join("missing.pt"), &tmp.path().join("out.tflite"), None)
                .unwrap_err();

            assert_eq!(err.code(), "E001");
            assert!(!marker.exists(), "exporter must not run when weights are missing");
        }

        #[cfg(not(unix))]
        {
            let err = Pipeline::new()
                .run(&tmp.path().join("missing.pt"), &tmp.path().join("out.tflite"), None)
                .unwrap_err();
            assert_eq!(err.code(), "E001");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_converter_failure_stops_before_validation() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let weights = tmp.path().join("best.pt");
        std::fs::write(&weights, b"ckpt").unwrap();

        let yolo = tmp.path().join("yolo");
        std::fs::write(&yolo, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&yolo, std::fs::Permissions::from_mode(0o755)).unwrap();

        let python = tmp.path().join("python3");
        std::fs::write(&python, "#!/bin/sh\necho 'conversion blew up' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755)).unwrap();

        // Pre-create a stale output; a converter failure must be reported
        // even though a file exists at the output path.
        let output = tmp.path().join("out.tflite");
        std::fs::write(&output, b"stale").unwrap();

        let pipeline = Pipeline::new()
            .with_exporter(OnnxExporter::new().with_program(yolo.to_str().unwrap()))
            .with_converter(TfliteConverter::new().with_python(python.to_str().unwrap()));

        let err = pipeline.run(&weights, &output, None).unwrap_err();
        assert_eq!(err.code(), "E011");
        assert!(err.to_string().contains("conversion blew up"));
    }
}
