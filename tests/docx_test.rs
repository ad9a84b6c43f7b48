//! Output document writing and verification.

use std::fs;

use unscan::render::{read_docx_paragraphs, to_docx_bytes, verify_package, DocumentWriter, DocxWriter};
use unscan::{assemble, Language, PageContent, Rect, RegionText};

fn farsi_pages() -> Vec<PageContent> {
    vec![PageContent::new(1, "\u{FEE1}\u{FEFC}\u{FEB3}\n\nدوم")
        .with_table(RegionText::new(Rect::new(10, 10, 300, 100), "ردیف\tنام\n1\tعلی"))]
}

#[test]
fn test_written_document_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("out.docx");
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    let doc = assemble(Language::Farsi, &farsi_pages());
    let writer = DocxWriter::new();
    writer.write(&doc, &path).unwrap();
    writer.verify(&path).unwrap();

    let paragraphs = read_docx_paragraphs(&path).unwrap();
    assert_eq!(
        paragraphs,
        vec!["\u{FEE1}\u{FEFC}\u{FEB3}", "دوم", "ردیف|نام", "1|علی"]
    );
}

#[test]
fn test_write_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.docx");
    fs::write(&path, b"stale").unwrap();

    let doc = assemble(Language::English, &[PageContent::new(1, "fresh")]);
    DocxWriter::new().write(&doc, &path).unwrap();
    assert_eq!(read_docx_paragraphs(&path).unwrap(), vec!["fresh"]);

    // no stray temporary files next to the output
    let entries = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn test_truncated_package_fails_verification() {
    let doc = assemble(Language::German, &[PageContent::new(1, "Inhalt")]);
    let bytes = to_docx_bytes(&doc).unwrap();
    assert!(verify_package(std::io::Cursor::new(&bytes[..])).is_ok());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cut.docx");
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
    assert!(DocxWriter::new().verify(&path).is_err());
}

#[test]
fn test_document_style_reaches_package() {
    let doc = assemble(Language::Farsi, &farsi_pages());
    let bytes = to_docx_bytes(&doc).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();

    let mut styles = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("word/styles.xml").unwrap(), &mut styles)
        .unwrap();
    assert!(styles.contains("B Nazanin"));
    assert!(styles.contains(r#"<w:sz w:val="22"/>"#));

    let mut body = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("word/document.xml").unwrap(), &mut body)
        .unwrap();
    assert!(body.contains(r#"<w:jc w:val="right"/>"#));
    assert!(body.contains("<w:tbl>"));
}
