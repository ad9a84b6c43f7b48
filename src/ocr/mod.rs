//! Text recognition: engine invocation, RTL shaping, region extraction.

mod extractor;
mod recognizer;
pub mod shaping;

pub use extractor::{RecognitionResult, RegionTextExtractor};
pub use recognizer::{TesseractCli, TextRecognizer};
