//! Recognition language profiles.
//!
//! Each language carries everything the pipeline varies on: the recognizer
//! language chain, text direction, paragraph alignment and document font.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::Alignment;

/// OCR engine mode passed to the recognizer (LSTM + legacy, engine default).
pub const ENGINE_MODE: u8 = 3;

/// Page segmentation mode: assume a single uniform block of text.
pub const PAGE_SEGMENTATION_MODE: u8 = 6;

/// Body font size in points, identical for every language.
pub const FONT_SIZE_PT: f32 = 11.0;

/// A supported document language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Farsi, recognized together with Arabic and equations
    #[default]
    Farsi,
    /// English
    English,
    /// German
    German,
    /// English text with equations
    Math,
}

impl Language {
    /// All languages, in CLI listing order.
    pub const ALL: [Language; 4] = [
        Language::Farsi,
        Language::English,
        Language::German,
        Language::Math,
    ];

    /// Short tag used on the command line (`fas`, `eng`, `deu`, `math`).
    pub fn tag(self) -> &'static str {
        match self {
            Language::Farsi => "fas",
            Language::English => "eng",
            Language::German => "deu",
            Language::Math => "math",
        }
    }

    /// Recognizer language chain, `+`-separated.
    pub fn recognition_chain(self) -> &'static str {
        match self {
            Language::Farsi => "fas+ara+equ",
            Language::English => "eng",
            Language::German => "deu",
            Language::Math => "eng+equ",
        }
    }

    /// Whether text in this language is written right to left.
    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Farsi)
    }

    /// Paragraph and table-cell alignment.
    pub fn alignment(self) -> Alignment {
        if self.is_rtl() {
            Alignment::Right
        } else {
            Alignment::Left
        }
    }

    /// Document body font family.
    pub fn font_family(self) -> &'static str {
        if self.is_rtl() {
            "B Nazanin"
        } else {
            "Arial"
        }
    }

    /// Full engine configuration for this language.
    pub fn engine_config(self) -> EngineConfig {
        EngineConfig {
            engine_mode: ENGINE_MODE,
            page_segmentation_mode: PAGE_SEGMENTATION_MODE,
            languages: self.recognition_chain(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fas" | "farsi" | "persian" => Ok(Language::Farsi),
            "eng" | "english" => Ok(Language::English),
            "deu" | "german" => Ok(Language::German),
            "math" => Ok(Language::Math),
            _ => Err(Error::InvalidLanguage(s.to_string())),
        }
    }
}

/// Recognizer settings derived from a [`Language`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    /// OCR engine mode (`--oem`)
    pub engine_mode: u8,
    /// Page segmentation mode (`--psm`)
    pub page_segmentation_mode: u8,
    /// Language chain (`-l`)
    pub languages: &'static str,
}

impl EngineConfig {
    /// Command-line arguments in recognizer order.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "--oem".to_string(),
            self.engine_mode.to_string(),
            "--psm".to_string(),
            self.page_segmentation_mode.to_string(),
            "-l".to_string(),
            self.languages.to_string(),
        ]
    }
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "--oem {} --psm {} -l {}",
            self.engine_mode, self.page_segmentation_mode, self.languages
        )
    }
}
