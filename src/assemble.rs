//! Document assembly from recognized pages.
//!
//! Each page contributes its prose paragraphs first, then one
//! single-column table per detected region, in detection order. Alignment
//! and font follow the document language.

use std::sync::LazyLock;

use regex::Regex;

use crate::language::Language;
use crate::model::{Alignment, Document, PageContent, Paragraph, Table};

static BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[^\S\n]*\n").unwrap());

/// Split prose on blank lines into trimmed, non-empty paragraphs.
///
/// A line holding only whitespace counts as blank.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let text = text.replace("\r\n", "\n");
    BLANK_LINE
        .split(&text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rows of a region's single-column table: tabs become `|`, each trimmed
/// non-empty line is one row.
pub fn table_lines(text: &str) -> Vec<String> {
    text.replace('\t', "|")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accumulates pages into one [`Document`].
#[derive(Debug)]
pub struct DocumentAssembler {
    language: Language,
    alignment: Alignment,
    document: Document,
}

impl DocumentAssembler {
    /// Start an empty document for `language`.
    pub fn new(language: Language) -> Self {
        Self {
            language,
            alignment: language.alignment(),
            document: Document::new(language),
        }
    }

    /// Record the source file name in the metadata.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.document.metadata.source = Some(source.into());
        self
    }

    /// Document language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Append prose paragraphs.
    pub fn add_prose(&mut self, text: &str) {
        for para in split_paragraphs(text) {
            self.document
                .add_paragraph(Paragraph::with_text(para).align(self.alignment));
        }
    }

    /// Append one region as a single-column table. Regions without text are skipped.
    pub fn add_region(&mut self, text: &str) {
        let lines = table_lines(text);
        if lines.is_empty() {
            return;
        }
        self.document
            .add_table(Table::single_column(lines, self.alignment));
    }

    /// Append a page: prose first, then its tables.
    pub fn add_page(&mut self, page: &PageContent) {
        self.add_prose(&page.prose);
        for region in &page.tables {
            self.add_region(&region.text);
        }
        self.document.metadata.page_count = self.document.metadata.page_count.max(page.number);
    }

    /// Set the source page count explicitly.
    pub fn set_page_count(&mut self, pages: u32) {
        self.document.metadata.page_count = pages;
    }

    /// Blocks appended so far.
    pub fn block_count(&self) -> usize {
        self.document.blocks.len()
    }

    /// Finish and hand over the document.
    pub fn finish(self) -> Document {
        self.document
    }
}

/// Assemble a document from pages in order.
pub fn assemble(language: Language, pages: &[PageContent]) -> Document {
    let mut assembler = DocumentAssembler::new(language);
    for page in pages {
        assembler.add_page(page);
    }
    assembler.finish()
}
