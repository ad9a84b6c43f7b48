//! PDF page rasterization.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use image::DynamicImage;

use crate::detect::detect_format_from_path;
use crate::error::{Error, Result};
use crate::process;

/// Default rendering resolution.
pub const DEFAULT_DPI: u32 = 200;

/// Turns PDF pages into raster images.
pub trait PageRenderer: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self, pdf: &Path) -> Result<u32>;

    /// Render one page (1-based).
    fn render_page(&self, pdf: &Path, page: u32) -> Result<DynamicImage>;
}

/// Renderer backed by poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    binary: PathBuf,
    dpi: u32,
    timeout: Option<Duration>,
}

impl Default for PdftoppmRenderer {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("pdftoppm"),
            dpi: DEFAULT_DPI,
            timeout: None,
        }
    }
}

impl PdftoppmRenderer {
    /// Renderer using `pdftoppm` from `PATH` at the default resolution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `pdftoppm` executable.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the rendering resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi.max(1);
        self
    }

    /// Kill `pdftoppm` if a page takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Rendering resolution.
    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Whether the configured executable can be run.
    pub fn is_available(&self) -> bool {
        process::is_available(&self.binary.to_string_lossy())
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn page_count(&self, pdf: &Path) -> Result<u32> {
        detect_format_from_path(pdf)?;
        let doc = lopdf::Document::load(pdf)?;
        Ok(doc.get_pages().len() as u32)
    }

    fn render_page(&self, pdf: &Path, page: u32) -> Result<DynamicImage> {
        let dir = tempfile::tempdir()?;
        let prefix = dir.path().join("page");
        let page_arg = page.to_string();

        let mut cmd = Command::new(&self.binary);
        cmd.arg("-r")
            .arg(self.dpi.to_string())
            .args(["-f", page_arg.as_str(), "-l", page_arg.as_str()])
            .args(["-png", "-singlefile"])
            .arg(pdf)
            .arg(&prefix);
        process::run(cmd, "pdftoppm", self.timeout)?;

        let png = prefix.with_extension("png");
        if !png.exists() {
            return Err(Error::Render(format!(
                "pdftoppm produced no image for page {} of {}",
                page,
                pdf.display()
            )));
        }
        Ok(image::open(&png)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let r = PdftoppmRenderer::new()
            .with_dpi(0)
            .with_binary("/opt/poppler/bin/pdftoppm")
            .with_timeout(Some(Duration::from_secs(5)));
        assert_eq!(r.dpi(), 1);
        assert_eq!(r.binary, PathBuf::from("/opt/poppler/bin/pdftoppm"));
        assert_eq!(PdftoppmRenderer::default().dpi(), DEFAULT_DPI);
    }

    #[test]
    fn test_page_count_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"<html></html>").unwrap();
        let err = PdftoppmRenderer::new().page_count(&path).unwrap_err();
        assert!(matches!(err, Error::UnknownFormat));
    }

    #[test]
    fn test_page_count_of_broken_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4\nnot really a pdf").unwrap();
        assert!(PdftoppmRenderer::new().page_count(&path).is_err());
    }

    #[test]
    fn test_missing_binary_fails_page() {
        let r = PdftoppmRenderer::new().with_binary("/nonexistent/pdftoppm");
        assert!(!r.is_available());
        assert!(r.render_page(Path::new("missing.pdf"), 1).is_err());
    }
}
