//! JSON run configuration.

use crazy_fours_detect::DetectorParams;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Resolution requested from the camera. Informative only: frames of any
/// size are processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureRequest {
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

fn default_thickness() -> u32 {
    2
}

/// Everything one run needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// ONNX card classifier.
    pub model_path: PathBuf,
    /// An image file or a directory of frames.
    pub input: PathBuf,
    /// Where annotated frames are written, if anywhere.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Where the JSON run report is written, if anywhere.
    #[serde(default)]
    pub report_path: Option<PathBuf>,
    #[serde(default)]
    pub detector: DetectorParams,
    #[serde(default)]
    pub max_frames: Option<usize>,
    #[serde(default = "default_thickness")]
    pub outline_thickness: u32,
    #[serde(default)]
    pub capture: CaptureRequest,
}

impl RunConfig {
    pub fn new(model_path: impl Into<PathBuf>, input: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            input: input.into(),
            output_dir: None,
            report_path: None,
            detector: DetectorParams::default(),
            max_frames: None,
            outline_thickness: default_thickness(),
            capture: CaptureRequest::default(),
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
