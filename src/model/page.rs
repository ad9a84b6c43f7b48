//! Page-level types.

use super::{Paragraph, Table};
use crate::imaging::Rect;
use serde::{Deserialize, Serialize};

/// Recognized content of one page, ready for assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub number: u32,

    /// Whole-page prose text
    pub prose: String,

    /// Table regions detected on the page, in detection order
    pub tables: Vec<RegionText>,
}

impl PageContent {
    /// Create page content with prose only.
    pub fn new(number: u32, prose: impl Into<String>) -> Self {
        Self {
            number,
            prose: prose.into(),
            tables: Vec::new(),
        }
    }

    /// Add a recognized table region.
    pub fn add_table(&mut self, region: RegionText) {
        self.tables.push(region);
    }

    /// Builder variant of [`PageContent::add_table`].
    pub fn with_table(mut self, region: RegionText) -> Self {
        self.add_table(region);
        self
    }

    /// Check if the page carries no text at all.
    pub fn is_empty(&self) -> bool {
        self.prose.trim().is_empty() && self.tables.iter().all(|t| t.text.trim().is_empty())
    }
}

/// The recognized text of one table region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionText {
    /// Region bounds on the page image
    pub bounds: Rect,

    /// Recognized text (empty when recognition failed)
    pub text: String,
}

impl RegionText {
    /// Create region text.
    pub fn new(bounds: Rect, text: impl Into<String>) -> Self {
        Self {
            bounds,
            text: text.into(),
        }
    }
}

/// A content block of the output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// A table
    Table(Table),
}

impl Block {
    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph(_))
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// Get plain text content of the block.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.plain_text().to_string(),
            Block::Table(t) => t.plain_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_content_new() {
        let page = PageContent::new(1, "hello");
        assert_eq!(page.number, 1);
        assert!(page.tables.is_empty());
        assert!(!page.is_empty());
    }

    #[test]
    fn test_page_content_empty() {
        let page = PageContent::new(2, "  \n").with_table(RegionText::new(Rect::default(), ""));
        assert!(page.is_empty());
    }

    #[test]
    fn test_block_variants() {
        let block = Block::Paragraph(Paragraph::with_text("x"));
        assert!(block.is_paragraph());
        assert!(!block.is_table());
        assert_eq!(block.plain_text(), "x");
    }
}
