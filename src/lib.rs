//! # unscan
//!
//! Rebuild scanned PDF documents as editable Word documents.
//!
//! Each page is rasterized, cleaned up, searched for ruled tables, and run
//! through a text recognizer: once as a whole for the running prose and
//! once per detected table. The recognized text is assembled into a
//! `.docx` document with language-aware alignment, fonts and, for Farsi,
//! right-to-left shaping.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unscan::{Language, Unscan};
//!
//! fn main() -> unscan::Result<()> {
//!     let summary = Unscan::new()
//!         .with_language(Language::Farsi)
//!         .with_output_dir("converted")
//!         .convert_batch(&["scans/"])?;
//!     println!("{} converted, {} failed", summary.succeeded, summary.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## External tools
//!
//! The shipped collaborators run poppler's `pdftoppm` for rasterization and
//! `tesseract` for recognition. Both sit behind traits
//! ([`raster::PageRenderer`], [`ocr::TextRecognizer`]) so other engines can
//! be plugged into a [`convert::Converter`].

pub mod assemble;
pub mod convert;
pub mod detect;
pub mod error;
pub mod imaging;
pub mod language;
pub mod model;
pub mod ocr;
pub mod process;
pub mod raster;
pub mod render;

// Re-export commonly used types
pub use assemble::{assemble, DocumentAssembler};
pub use convert::{
    BatchSummary, ChannelProgress, ConversionOutcome, ConversionStats, ConvertOptions, Converter,
    FileStage, NoProgress, ProgressEvent, ProgressSink,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use imaging::{preprocess, Rect, TableDetector, TableDetectorConfig, TableRegion};
pub use language::{EngineConfig, Language};
pub use model::{
    Alignment, Block, Document, DocumentStyle, Metadata, PageContent, Paragraph, ParagraphStyle,
    RegionText, Table, TableCell, TableRow,
};
pub use ocr::{RecognitionResult, RegionTextExtractor, TesseractCli, TextRecognizer};
pub use raster::{PageRenderer, PdftoppmRenderer};
pub use render::{DocumentWriter, DocxWriter};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::GrayImage;

/// Detect table regions on an image file.
///
/// The image is preprocessed first, exactly as a rendered page would be.
///
/// # Example
///
/// ```no_run
/// let regions = unscan::detect_tables("page.png").unwrap();
/// for r in &regions {
///     println!("{}x{} at ({}, {})", r.bounds.width, r.bounds.height, r.bounds.x, r.bounds.y);
/// }
/// ```
pub fn detect_tables<P: AsRef<Path>>(path: P) -> Result<Vec<TableRegion>> {
    let image = image::open(path)?;
    Ok(TableDetector::default().detect(&preprocess(&image)))
}

/// Convert one PDF with default tools and options for `language`.
///
/// The output is written next to the input. Errors are reported in the
/// returned outcome, not as `Err`.
pub fn convert_file<P: AsRef<Path>>(path: P, language: Language) -> ConversionOutcome {
    Unscan::new()
        .with_language(language)
        .build()
        .convert_file(path.as_ref(), &NoProgress)
}

/// Builder for a conversion run with the shipped external tools.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use unscan::{Language, Unscan};
///
/// let outcome = Unscan::new()
///     .with_language(Language::German)
///     .with_dpi(300)
///     .with_timeout(Duration::from_secs(120))
///     .without_tables()
///     .convert_file("brief.pdf");
/// println!("{}: {}", outcome.input.display(), outcome.stage);
/// ```
#[derive(Debug, Clone)]
pub struct Unscan {
    options: ConvertOptions,
    tesseract: PathBuf,
    pdftoppm: PathBuf,
}

impl Unscan {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
            tesseract: PathBuf::from("tesseract"),
            pdftoppm: PathBuf::from("pdftoppm"),
        }
    }

    /// Replace all conversion options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the document language.
    pub fn with_language(mut self, language: Language) -> Self {
        self.options = self.options.with_language(language);
        self
    }

    /// Write outputs into `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options = self.options.with_output_dir(dir);
        self
    }

    /// Skip table detection.
    pub fn without_tables(mut self) -> Self {
        self.options = self.options.with_tables(false);
        self
    }

    /// Skip whole-page prose recognition.
    pub fn without_prose(mut self) -> Self {
        self.options = self.options.with_prose(false);
        self
    }

    /// Set the rendering resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.options = self.options.with_dpi(dpi);
        self
    }

    /// Set the number of batch workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.options = self.options.with_workers(workers);
        self
    }

    /// Kill external tools that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_tool_timeout(timeout);
        self
    }

    /// Use a specific `tesseract` executable.
    pub fn with_tesseract(mut self, path: impl Into<PathBuf>) -> Self {
        self.tesseract = path.into();
        self
    }

    /// Use a specific `pdftoppm` executable.
    pub fn with_pdftoppm(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdftoppm = path.into();
        self
    }

    /// The recognizer this builder configures.
    pub fn recognizer(&self) -> TesseractCli {
        TesseractCli::new()
            .with_binary(&self.tesseract)
            .with_timeout(self.options.tool_timeout)
    }

    /// The renderer this builder configures.
    pub fn renderer(&self) -> PdftoppmRenderer {
        PdftoppmRenderer::new()
            .with_binary(&self.pdftoppm)
            .with_dpi(self.options.dpi)
            .with_timeout(self.options.tool_timeout)
    }

    /// Build the converter.
    pub fn build(self) -> Converter {
        let renderer = Arc::new(self.renderer());
        let recognizer = Arc::new(self.recognizer());
        Converter::new(renderer, recognizer, self.options)
    }

    /// Convert one PDF.
    pub fn convert_file<P: AsRef<Path>>(self, path: P) -> ConversionOutcome {
        self.build().convert_file(path.as_ref(), &NoProgress)
    }

    /// Convert files and directories of PDFs (directories non-recursively).
    pub fn convert_batch<P: AsRef<Path>>(self, paths: &[P]) -> Result<BatchSummary> {
        let inputs = detect::expand_inputs(paths, false)?;
        Ok(self.build().convert_batch(&inputs, &NoProgress))
    }

    /// Recognize the text of one image file.
    pub fn recognize_image<P: AsRef<Path>>(&self, path: P) -> Result<RecognitionResult> {
        let image: GrayImage = preprocess(&image::open(path)?);
        RegionTextExtractor::new(Arc::new(self.recognizer())).try_extract(&image, self.options.language)
    }
}

impl Default for Unscan {
    fn default() -> Self {
        Self::new()
    }
}
