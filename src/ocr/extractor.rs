//! Per-region recognition with language profiles.

use std::sync::Arc;

use image::GrayImage;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use super::recognizer::TextRecognizer;
use super::shaping::shape_for;
use crate::error::Result;
use crate::imaging::TableRegion;
use crate::language::Language;

/// Text recognized from one image, tagged with how it was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionResult {
    /// Display-ready text
    pub text: String,

    /// Language profile used
    pub language: Language,

    /// Engine arguments, e.g. `--oem 3 --psm 6 -l eng`
    pub config: String,

    /// True when the recognizer failed and `text` is empty as a result
    pub failed: bool,
}

impl RecognitionResult {
    /// Whether no text was recognized.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Runs the recognizer on pages and regions and shapes the output.
#[derive(Clone)]
pub struct RegionTextExtractor {
    recognizer: Arc<dyn TextRecognizer>,
}

impl RegionTextExtractor {
    /// Wrap a recognition engine.
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }

    /// The underlying engine.
    pub fn recognizer(&self) -> &dyn TextRecognizer {
        self.recognizer.as_ref()
    }

    /// Recognize `image`, propagating engine errors.
    pub fn try_extract(&self, image: &GrayImage, language: Language) -> Result<RecognitionResult> {
        let config = language.engine_config();
        let raw = self.recognizer.recognize(image, &config)?;
        let normalized: String = raw.nfc().collect();
        Ok(RecognitionResult {
            text: shape_for(language, &normalized),
            language,
            config: config.to_string(),
            failed: false,
        })
    }

    /// Recognize `image`. Engine errors are logged and yield empty text.
    pub fn extract(&self, image: &GrayImage, language: Language) -> RecognitionResult {
        self.try_extract(image, language).unwrap_or_else(|e| {
            log::warn!(
                "{} failed on {}x{} image: {}",
                self.recognizer.name(),
                image.width(),
                image.height(),
                e
            );
            RecognitionResult {
                text: String::new(),
                language,
                config: language.engine_config().to_string(),
                failed: true,
            }
        })
    }

    /// Recognize every region independently, in order.
    pub fn extract_all(&self, regions: &[TableRegion], language: Language) -> Vec<RecognitionResult> {
        regions
            .iter()
            .map(|region| self.extract(&region.image, language))
            .collect()
    }
}

impl std::fmt::Debug for RegionTextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionTextExtractor")
            .field("recognizer", &self.recognizer.name())
            .finish()
    }
}
