//! Document model types for reconstructed scan content.
//!
//! This module defines the intermediate representation that bridges page
//! recognition and document writing. The assembler fills a [`Document`]
//! block by block; writers only ever read it.

mod document;
mod page;
mod paragraph;
mod table;

pub use document::{Document, DocumentStyle, Metadata};
pub use page::{Block, PageContent, RegionText};
pub use paragraph::{Alignment, Paragraph, ParagraphStyle};
pub use table::{Table, TableCell, TableRow};
