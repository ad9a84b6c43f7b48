//! WordprocessingML (`.docx`) output.
//!
//! A package is the minimal set of parts Word needs: content types,
//! relationships, the main document, styles, and core/app properties.
//! Body text is written exactly as held in the model, so RTL text must
//! already be in visual order.

use std::borrow::Cow;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::model::{Alignment, Block, Document, DocumentStyle, Paragraph, Table};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Part names every written package contains.
pub const REQUIRED_PARTS: [&str; 4] = [
    "[Content_Types].xml",
    "_rels/.rels",
    "word/document.xml",
    "word/styles.xml",
];

/// Persists documents and confirms the result can be re-opened.
pub trait DocumentWriter: Send + Sync {
    /// File extension of the output format, without the dot.
    fn extension(&self) -> &str;

    /// Write `doc` to `path`, replacing any existing file.
    fn write(&self, doc: &Document, path: &Path) -> Result<()>;

    /// Re-open a written file and check that it is well formed.
    fn verify(&self, path: &Path) -> Result<()>;
}

/// Writes Office Open XML word-processing packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxWriter;

impl DocxWriter {
    /// Create a writer.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentWriter for DocxWriter {
    fn extension(&self) -> &str {
        "docx"
    }

    fn write(&self, doc: &Document, path: &Path) -> Result<()> {
        let bytes = to_docx_bytes(doc)?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        log::debug!("wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    fn verify(&self, path: &Path) -> Result<()> {
        verify_package(File::open(path)?)
    }
}

/// Serialize a document into an in-memory `.docx` package.
pub fn to_docx_bytes(doc: &Document) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, Cow<'_, str>); 7] = [
        ("[Content_Types].xml", Cow::Borrowed(CONTENT_TYPES)),
        ("_rels/.rels", Cow::Borrowed(PACKAGE_RELS)),
        ("docProps/core.xml", Cow::Owned(core_properties(doc))),
        ("docProps/app.xml", Cow::Borrowed(APP_PROPERTIES)),
        ("word/_rels/document.xml.rels", Cow::Borrowed(DOCUMENT_RELS)),
        ("word/styles.xml", Cow::Owned(styles_xml(&doc.style))),
        ("word/document.xml", Cow::Owned(document_xml(doc))),
    ];

    for (name, content) in parts.iter() {
        zip.start_file(*name, options)
            .map_err(|e| Error::DocumentWrite(format!("{}: {}", name, e)))?;
        zip.write_all(content.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Check that a package has the required parts and a parseable body.
pub fn verify_package<R: Read + Seek>(reader: R) -> Result<()> {
    let mut archive = ZipArchive::new(reader)?;
    for part in REQUIRED_PARTS {
        if archive.by_name(part).is_err() {
            return Err(Error::Verification(format!("missing part {}", part)));
        }
    }

    let xml = read_part(&mut archive, "word/document.xml")?;
    let mut reader = Reader::from_str(&xml);
    let (mut has_document, mut has_body) = (false, false);
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:document" => has_document = true,
                b"w:body" => has_body = true,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !(has_document && has_body) {
        return Err(Error::Verification(
            "word/document.xml has no document body".to_string(),
        ));
    }
    Ok(())
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = archive.by_name(name)?;
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Read back the text of every body paragraph, table cells included.
pub fn read_docx_paragraphs(path: &Path) -> Result<Vec<String>> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let xml = read_part(&mut archive, "word/document.xml")?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => current = Some(String::new()),
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:br" => current.iter_mut().for_each(|p| p.push('\n')),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape()?;
                current.iter_mut().for_each(|p| p.push_str(&text));
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => paragraphs.extend(current.take()),
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(paragraphs)
}

/// Drop characters XML 1.0 cannot carry.
fn xml_safe(text: &str) -> Cow<'_, str> {
    let valid = |c: char| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}');
    if text.chars().all(valid) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| valid(*c)).collect())
    }
}

fn document_xml(doc: &Document) -> String {
    let mut xml = String::with_capacity(1024 + doc.blocks.len() * 128);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<w:document xmlns:w="{}"><w:body>"#, W_NS));
    for block in &doc.blocks {
        match block {
            Block::Paragraph(p) => write_paragraph(&mut xml, p),
            Block::Table(t) => write_table(&mut xml, t),
        }
    }
    xml.push_str(
        r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#,
    );
    xml.push_str("</w:body></w:document>");
    xml
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) {
    write_text_paragraph(xml, paragraph.plain_text(), paragraph.style.alignment);
}

fn write_text_paragraph(xml: &mut String, text: &str, alignment: Alignment) {
    xml.push_str("<w:p>");
    if alignment != Alignment::Left {
        xml.push_str(&format!(r#"<w:pPr><w:jc w:val="{}"/></w:pPr>"#, alignment.ooxml_value()));
    }
    if !text.is_empty() {
        xml.push_str("<w:r>");
        let safe = xml_safe(text);
        for (i, line) in safe.split('\n').enumerate() {
            if i > 0 {
                xml.push_str("<w:br/>");
            }
            if !line.is_empty() {
                xml.push_str(r#"<w:t xml:space="preserve">"#);
                xml.push_str(&escape(line.trim_end_matches('\r')));
                xml.push_str("</w:t>");
            }
        }
        xml.push_str("</w:r>");
    }
    xml.push_str("</w:p>");
}

fn write_table(xml: &mut String, table: &Table) {
    let columns = table.column_count().max(1);
    xml.push_str(r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="5000" w:type="pct"/></w:tblPr><w:tblGrid>"#);
    for _ in 0..columns {
        xml.push_str("<w:gridCol/>");
    }
    xml.push_str("</w:tblGrid>");
    for row in &table.rows {
        xml.push_str("<w:tr>");
        for cell in &row.cells {
            xml.push_str(r#"<w:tc><w:tcPr><w:tcW w:w="0" w:type="auto"/></w:tcPr>"#);
            write_paragraph(xml, &cell.content);
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
}

fn styles_xml(style: &DocumentStyle) -> String {
    let font = escape(&style.font_family);
    let size = style.half_points();
    format!(
        concat!(
            "{decl}<w:styles xmlns:w=\"{ns}\">",
            "<w:docDefaults><w:rPrDefault><w:rPr>",
            "<w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\" w:cs=\"{font}\" w:eastAsia=\"{font}\"/>",
            "<w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/>",
            "</w:rPr></w:rPrDefault><w:pPrDefault/></w:docDefaults>",
            "<w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\"><w:name w:val=\"Normal\"/><w:qFormat/></w:style>",
            "<w:style w:type=\"table\" w:default=\"1\" w:styleId=\"TableNormal\"><w:name w:val=\"Normal Table\"/>",
            "<w:tblPr><w:tblInd w:w=\"0\" w:type=\"dxa\"/><w:tblCellMar><w:left w:w=\"108\" w:type=\"dxa\"/><w:right w:w=\"108\" w:type=\"dxa\"/></w:tblCellMar></w:tblPr></w:style>",
            "<w:style w:type=\"table\" w:styleId=\"TableGrid\"><w:name w:val=\"Table Grid\"/><w:basedOn w:val=\"TableNormal\"/>",
            "<w:tblPr><w:tblBorders>",
            "<w:top w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>",
            "<w:left w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>",
            "<w:bottom w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>",
            "<w:right w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>",
            "<w:insideH w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>",
            "<w:insideV w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>",
            "</w:tblBorders></w:tblPr></w:style>",
            "</w:styles>"
        ),
        decl = XML_DECL,
        ns = W_NS,
        font = font,
        size = size,
    )
}

fn core_properties(doc: &Document) -> String {
    let created = doc.metadata.created.format("%Y-%m-%dT%H:%M:%SZ");
    let title = doc
        .metadata
        .source
        .as_deref()
        .map(|s| escape(s).into_owned())
        .unwrap_or_default();
    format!(
        concat!(
            "{decl}<cp:coreProperties ",
            "xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" ",
            "xmlns:dc=\"http://purl.org/dc/elements/1.1/\" ",
            "xmlns:dcterms=\"http://purl.org/dc/terms/\" ",
            "xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">",
            "<dc:title>{title}</dc:title><dc:language>{lang}</dc:language><dc:creator>unscan</dc:creator>",
            "<dcterms:created xsi:type=\"dcterms:W3CDTF\">{created}</dcterms:created>",
            "<dcterms:modified xsi:type=\"dcterms:W3CDTF\">{created}</dcterms:modified>",
            "</cp:coreProperties>"
        ),
        decl = XML_DECL,
        title = title,
        lang = doc.metadata.language,
        created = created,
    )
}

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
    r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
    r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
    r#"</Types>"#
);

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
    r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>"#,
    r#"</Relationships>"#
);

const DOCUMENT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"</Relationships>"#
);

const APP_PROPERTIES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
    r#"<Application>unscan</Application>"#,
    r#"</Properties>"#
);
