//! Document-level types.

use super::{Block, Paragraph, Table};
use crate::language::{Language, FONT_SIZE_PT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reconstructed output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,

    /// Global style, chosen once from the language
    pub style: DocumentStyle,

    /// Content blocks in reading order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a new empty document styled for a language.
    pub fn new(language: Language) -> Self {
        Self {
            metadata: Metadata::new(language),
            style: DocumentStyle::for_language(language),
            blocks: Vec::new(),
        }
    }

    /// Add a block to the document.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Add a paragraph to the document.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    /// Add a table to the document.
    pub fn add_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of paragraph blocks.
    pub fn paragraph_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_paragraph()).count()
    }

    /// Number of table blocks.
    pub fn table_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_table()).count()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Document-wide style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStyle {
    /// Body font family
    pub font_family: String,

    /// Body font size in points
    pub font_size_pt: f32,
}

impl DocumentStyle {
    /// Style for a language: Farsi gets a Persian face, everything else Arial.
    pub fn for_language(language: Language) -> Self {
        Self {
            font_family: language.font_family().to_string(),
            font_size_pt: FONT_SIZE_PT,
        }
    }

    /// Font size in WordprocessingML half-points.
    pub fn half_points(&self) -> u32 {
        (self.font_size_pt * 2.0).round() as u32
    }
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Source file name, if known
    pub source: Option<String>,

    /// Recognition language
    pub language: Language,

    /// Number of pages in the source
    pub page_count: u32,

    /// Creation time
    pub created: DateTime<Utc>,
}

impl Metadata {
    /// Create metadata stamped with the current time.
    pub fn new(language: Language) -> Self {
        Self {
            source: None,
            language,
            page_count: 0,
            created: Utc::now(),
        }
    }
}
