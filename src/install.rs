//! Android asset installation (best-effort final stage).
//!
//! Copies the validated TFLite binary into the fixed assets location the
//! Android detector loads from. The caller treats failure here as a warning,
//! never as a pipeline failure.

use crate::error::{ConvertError, Result};
use std::path::{Path, PathBuf};

/// Filename the Android detector expects inside the asset bundle.
pub const ASSET_FILENAME: &str = "yolo_plate_detector.tflite";

/// Assets directory relative to the Android project root.
pub const ASSET_DIR: &[&str] = &["app", "src", "main", "assets"];

/// Copy a TFLite binary into `<project>/app/src/main/assets/` under the
/// fixed filename, creating the directory tree if needed. Returns the
/// destination path.
pub fn install_to_android(tflite: &Path, project_root: &Path) -> Result<PathBuf> {
    let mut assets_dir = project_root.to_path_buf();
    for part in ASSET_DIR {
        assets_dir.push(part);
    }

    std::fs::create_dir_all(&assets_dir)
        .map_err(|e| ConvertError::io(format!("creating {}", assets_dir.display()), e))?;

    let target = assets_dir.join(ASSET_FILENAME);
    std::fs::copy(tflite, &target).map_err(|e| {
        ConvertError::io(format!("copying {} to {}", tflite.display(), target.display()), e)
    })?;

    Ok(target)
}
