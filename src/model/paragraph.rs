//! Paragraph-level types.

use serde::{Deserialize, Serialize};

/// A paragraph of recognized text.
///
/// Right-to-left text arrives here already reshaped and in visual order, so
/// paragraphs carry no direction flag of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// The paragraph text, already in display order
    pub text: String,

    /// Paragraph style
    pub style: ParagraphStyle,
}

impl Paragraph {
    /// Create a left-aligned paragraph.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: ParagraphStyle::default(),
        }
    }

    /// Set alignment and return self.
    pub fn align(mut self, alignment: Alignment) -> Self {
        self.style.alignment = alignment;
        self
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> &str {
        &self.text
    }

    /// Check if the paragraph is empty.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Paragraph styling properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Text alignment
    pub alignment: Alignment,
}

/// Text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Right alignment
    Right,
}

impl Alignment {
    /// WordprocessingML `w:jc` value.
    pub fn ooxml_value(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Right => "right",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_builder() {
        let p = Paragraph::with_text("سلام").align(Alignment::Right);
        assert_eq!(p.plain_text(), "سلام");
        assert_eq!(p.style.alignment, Alignment::Right);
    }

    #[test]
    fn test_paragraph_is_empty() {
        assert!(Paragraph::with_text("  \n ").is_empty());
        assert!(!Paragraph::with_text("x").is_empty());
    }

    #[test]
    fn test_alignment_ooxml() {
        assert_eq!(Alignment::Left.ooxml_value(), "left");
        assert_eq!(Alignment::Right.ooxml_value(), "right");
    }
}
