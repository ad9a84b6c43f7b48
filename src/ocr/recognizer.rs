//! Recognition engine seam.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use image::{GrayImage, ImageFormat};

use crate::error::Result;
use crate::language::EngineConfig;
use crate::process;

/// A black-box text recognition service.
///
/// Implementations may return an empty string for blank input.
pub trait TextRecognizer: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Recognize the text in `image` with the given engine settings.
    fn recognize(&self, image: &GrayImage, config: &EngineConfig) -> Result<String>;
}

/// Tesseract invoked as a subprocess, text read from stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            timeout: None,
        }
    }
}

impl TesseractCli {
    /// Use `tesseract` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific executable.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Kill the engine if one image takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether the configured executable can be run.
    pub fn is_available(&self) -> bool {
        process::is_available(&self.binary.to_string_lossy())
    }
}

impl TextRecognizer for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &GrayImage, config: &EngineConfig) -> Result<String> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(String::new());
        }

        let input = tempfile::Builder::new()
            .prefix("unscan-")
            .suffix(".png")
            .tempfile()?;
        image.save_with_format(input.path(), ImageFormat::Png)?;

        let mut cmd = Command::new(&self.binary);
        cmd.arg(input.path()).arg("stdout").args(config.to_args());
        let output = process::run(cmd, "tesseract", self.timeout)?;

        Ok(output.stdout_text())
    }
}
