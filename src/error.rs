//! Error types for unscan library.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for unscan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting scanned documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error reading the PDF page tree.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Error decoding or encoding a raster image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Error rasterizing a PDF page.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Error recognizing text in an image.
    #[error("Recognition error: {0}")]
    Recognition(String),

    /// An external tool exited unsuccessfully.
    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        /// Tool name
        tool: String,
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// An external tool did not finish before its deadline.
    #[error("{tool} did not finish within {limit:?}")]
    Timeout {
        /// Tool name
        tool: String,
        /// Deadline
        limit: Duration,
    },

    /// Error writing the output document.
    #[error("Document write error: {0}")]
    DocumentWrite(String),

    /// The written document could not be re-opened.
    #[error("Document verification failed: {0}")]
    Verification(String),

    /// Error in the output package container.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Another input in the same run already maps to this output.
    #[error("output path {} already claimed by {}", .output.display(), .owner.display())]
    OutputClaimed {
        /// Canonical output path
        output: PathBuf,
        /// Input that owns the output
        owner: PathBuf,
    },

    /// Unrecognized language tag.
    #[error("Invalid language: {0} (expected fas, eng, deu or math)")]
    InvalidLanguage(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Verification(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownFormat;
        assert_eq!(err.to_string(), "Unknown file format: not a valid PDF");

        let err = Error::Timeout {
            tool: "tesseract".to_string(),
            limit: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "tesseract did not finish within 30s");

        let err = Error::Timeout {
            tool: "pdftoppm".to_string(),
            limit: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "pdftoppm did not finish within 250ms");
    }

    #[test]
    fn test_output_claimed_display() {
        let err = Error::OutputClaimed {
            output: PathBuf::from("out/scan.docx"),
            owner: PathBuf::from("a/scan.pdf"),
        };
        assert_eq!(
            err.to_string(),
            "output path out/scan.docx already claimed by a/scan.pdf"
        );
    }

    #[test]
    fn test_invalid_language_display() {
        let err = Error::InvalidLanguage("klingon".to_string());
        assert!(err.to_string().contains("klingon"));
        assert!(err.to_string().contains("fas, eng, deu or math"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
