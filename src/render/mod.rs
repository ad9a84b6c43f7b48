//! Output rendering: the `.docx` package.

pub mod docx;

pub use docx::{read_docx_paragraphs, to_docx_bytes, verify_package, DocumentWriter, DocxWriter};
