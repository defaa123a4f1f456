//! Write a [`DocxDocument`] as a `.docx` package.
//!
//! A `.docx` file is a ZIP of OOXML parts. The dynamic parts (document body,
//! running headers) are produced with quick-xml so user text is escaped
//! properly; the fixed plumbing parts (content types, relationships,
//! settings) are templates.

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::config::{PageSetup, SectionStart};
use crate::docx::document::{DocxDocument, Fragment, Run};
use crate::docx::styles;
use crate::error::Result;

const WP_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Write the document to a `.docx` file on disk.
pub fn write_docx<P: AsRef<Path>>(doc: &DocxDocument, path: P) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_docx_to_writer(doc, file)
}

/// Write the document to any [`Write`] + [`Seek`] destination.
pub fn write_docx_to_writer<W: Write + Seek>(doc: &DocxDocument, writer: W) -> Result<()> {
    let sections = collect_sections(doc);
    let headers = build_header_parts(&sections)?;
    let document_xml = document_xml(doc, &sections)?;

    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types_xml(&headers).as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(PACKAGE_RELS.as_bytes())?;

    zip.start_file("word/_rels/document.xml.rels", options)?;
    zip.write_all(document_rels_xml(&headers).as_bytes())?;

    zip.start_file("word/document.xml", options)?;
    zip.write_all(document_xml.as_bytes())?;

    zip.start_file("word/styles.xml", options)?;
    zip.write_all(styles::styles_xml().as_bytes())?;

    zip.start_file("word/settings.xml", options)?;
    zip.write_all(settings_xml(doc.page()).as_bytes())?;

    for header in &headers {
        zip.start_file(format!("word/{}", header.file_name), options)?;
        zip.write_all(header.content.as_bytes())?;
    }

    zip.finish()?;
    Ok(())
}

/// One layout section of the output, in order.
struct SectionMeta {
    start: SectionStart,
    header_title: Option<String>,
    /// Relationship ids of the (odd, even) header parts, when the section
    /// has running headers.
    header_rels: Option<(String, String)>,
}

/// A generated header part plus its relationship id.
struct HeaderPart {
    file_name: String,
    rel_id: String,
    content: String,
}

// rId1/rId2 are taken by styles.xml and settings.xml.
const FIRST_HEADER_REL: usize = 3;

fn collect_sections(doc: &DocxDocument) -> Vec<SectionMeta> {
    let mut sections = vec![SectionMeta {
        start: SectionStart::NextPage,
        header_title: None,
        header_rels: None,
    }];

    for fragment in doc.fragments() {
        if let Fragment::SectionBreak { start, header_title } = fragment {
            sections.push(SectionMeta {
                start: *start,
                header_title: header_title.clone(),
                header_rels: None,
            });
        }
    }

    let mut next_rel = FIRST_HEADER_REL;
    for section in &mut sections {
        if section.header_title.is_some() {
            section.header_rels = Some((format!("rId{}", next_rel), format!("rId{}", next_rel + 1)));
            next_rel += 2;
        }
    }

    sections
}

fn build_header_parts(sections: &[SectionMeta]) -> Result<Vec<HeaderPart>> {
    let mut parts = Vec::new();
    for section in sections {
        let (Some(title), Some((odd_rel, even_rel))) =
            (&section.header_title, &section.header_rels)
        else {
            continue;
        };
        parts.push(HeaderPart {
            file_name: format!("header{}.xml", parts.len() + 1),
            rel_id: odd_rel.clone(),
            content: header_xml(title, HeaderSide::Odd)?,
        });
        parts.push(HeaderPart {
            file_name: format!("header{}.xml", parts.len() + 1),
            rel_id: even_rel.clone(),
            content: header_xml(title, HeaderSide::Even)?,
        });
    }
    Ok(parts)
}

// ============================================================================
// word/document.xml
// ============================================================================

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn document_xml(doc: &DocxDocument, sections: &[SectionMeta]) -> Result<String> {
    let mut w = Writer::new(Cursor::new(Vec::new()));
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    start(
        &mut w,
        "w:document",
        &[("xmlns:w", WP_NS), ("xmlns:r", REL_NS)],
    )?;
    start(&mut w, "w:body", &[])?;

    // Bookmark elements need document-unique numeric ids.
    let mut bookmark_counter = 0usize;
    // The sectPr embedded in a break paragraph closes the section before the
    // break; the final section's properties go on the body itself.
    let mut current_section = 0usize;

    for fragment in doc.fragments() {
        match fragment {
            Fragment::Paragraph {
                style,
                runs,
                anchors,
            } => write_paragraph(&mut w, style, runs, anchors, &mut bookmark_counter)?,
            Fragment::SectionBreak { .. } => {
                start(&mut w, "w:p", &[])?;
                start(&mut w, "w:pPr", &[])?;
                write_section_properties(&mut w, doc.page(), &sections[current_section])?;
                end(&mut w, "w:pPr")?;
                end(&mut w, "w:p")?;
                current_section += 1;
            }
        }
    }

    write_section_properties(&mut w, doc.page(), &sections[current_section])?;

    end(&mut w, "w:body")?;
    end(&mut w, "w:document")?;
    finish(w)
}

fn write_paragraph(
    w: &mut XmlWriter,
    style: &str,
    runs: &[Run],
    anchors: &[String],
    bookmark_counter: &mut usize,
) -> Result<()> {
    start(w, "w:p", &[])?;

    start(w, "w:pPr", &[])?;
    empty(w, "w:pStyle", &[("w:val", style)])?;
    end(w, "w:pPr")?;

    // Anchors precede the text runs, so a PAGEREF to any of them reports
    // this paragraph's page.
    for anchor in anchors {
        let id = bookmark_counter.to_string();
        *bookmark_counter += 1;
        empty(w, "w:bookmarkStart", &[("w:id", id.as_str()), ("w:name", anchor)])?;
        empty(w, "w:bookmarkEnd", &[("w:id", id.as_str())])?;
    }

    for run in runs {
        match run {
            Run::Text(content) => {
                start(w, "w:r", &[])?;
                start(w, "w:t", &[("xml:space", "preserve")])?;
                text(w, content)?;
                end(w, "w:t")?;
                end(w, "w:r")?;
            }
            Run::Tab => {
                start(w, "w:r", &[])?;
                empty(w, "w:tab", &[])?;
                end(w, "w:r")?;
            }
            Run::PageRef { target } => write_page_ref(w, target)?,
        }
    }

    end(w, "w:p")?;
    Ok(())
}

/// A PAGEREF field: begin, instruction, separator, placeholder numeral, end.
/// The renderer replaces the placeholder when fields are updated.
fn write_page_ref(w: &mut XmlWriter, target: &str) -> Result<()> {
    field_char(w, "begin")?;

    start(w, "w:r", &[])?;
    start(w, "w:instrText", &[("xml:space", "preserve")])?;
    text(w, &format!(" PAGEREF {} \\h ", target))?;
    end(w, "w:instrText")?;
    end(w, "w:r")?;

    field_char(w, "separate")?;

    start(w, "w:r", &[])?;
    start(w, "w:t", &[])?;
    text(w, "0")?;
    end(w, "w:t")?;
    end(w, "w:r")?;

    field_char(w, "end")?;
    Ok(())
}

fn field_char(w: &mut XmlWriter, kind: &str) -> Result<()> {
    start(w, "w:r", &[])?;
    empty(w, "w:fldChar", &[("w:fldCharType", kind)])?;
    end(w, "w:r")?;
    Ok(())
}

fn write_section_properties(
    w: &mut XmlWriter,
    page: &PageSetup,
    section: &SectionMeta,
) -> Result<()> {
    start(w, "w:sectPr", &[])?;

    if let Some((odd_rel, even_rel)) = &section.header_rels {
        empty(
            w,
            "w:headerReference",
            &[("w:type", "default"), ("r:id", odd_rel.as_str())],
        )?;
        empty(
            w,
            "w:headerReference",
            &[("w:type", "even"), ("r:id", even_rel.as_str())],
        )?;
    }

    let break_type = match section.start {
        SectionStart::NextPage => "nextPage",
        SectionStart::EvenPage => "evenPage",
        SectionStart::OddPage => "oddPage",
    };
    empty(w, "w:type", &[("w:val", break_type)])?;

    let width = page.page_width.to_string();
    let height = page.page_height.to_string();
    empty(
        w,
        "w:pgSz",
        &[("w:w", width.as_str()), ("w:h", height.as_str())],
    )?;

    let top = page.margin_top.to_string();
    let right = page.margin_right.to_string();
    let bottom = page.margin_bottom.to_string();
    let left = page.margin_left.to_string();
    let header = page.header_distance.to_string();
    empty(
        w,
        "w:pgMar",
        &[
            ("w:top", top.as_str()),
            ("w:right", right.as_str()),
            ("w:bottom", bottom.as_str()),
            ("w:left", left.as_str()),
            ("w:header", header.as_str()),
            ("w:footer", header.as_str()),
            ("w:gutter", "0"),
        ],
    )?;

    end(w, "w:sectPr")?;
    Ok(())
}

// ============================================================================
// word/headerN.xml
// ============================================================================

#[derive(Clone, Copy)]
enum HeaderSide {
    /// Recto: title, tab, page number, right-aligned.
    Odd,
    /// Verso: page number, tab, title, left-aligned.
    Even,
}

fn header_xml(title: &str, side: HeaderSide) -> Result<String> {
    let mut w = Writer::new(Cursor::new(Vec::new()));
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    start(&mut w, "w:hdr", &[("xmlns:w", WP_NS), ("xmlns:r", REL_NS)])?;
    start(&mut w, "w:p", &[])?;

    start(&mut w, "w:pPr", &[])?;
    empty(&mut w, "w:pStyle", &[("w:val", styles::PAGE_HEADER)])?;
    let alignment = match side {
        HeaderSide::Odd => "right",
        HeaderSide::Even => "left",
    };
    empty(&mut w, "w:jc", &[("w:val", alignment)])?;
    end(&mut w, "w:pPr")?;

    match side {
        HeaderSide::Odd => {
            write_header_text(&mut w, title)?;
            write_header_tab(&mut w)?;
            write_page_field(&mut w)?;
        }
        HeaderSide::Even => {
            write_page_field(&mut w)?;
            write_header_tab(&mut w)?;
            write_header_text(&mut w, title)?;
        }
    }

    end(&mut w, "w:p")?;
    end(&mut w, "w:hdr")?;
    finish(w)
}

fn write_header_text(w: &mut XmlWriter, content: &str) -> Result<()> {
    start(w, "w:r", &[])?;
    start(w, "w:t", &[("xml:space", "preserve")])?;
    text(w, content)?;
    end(w, "w:t")?;
    end(w, "w:r")?;
    Ok(())
}

fn write_header_tab(w: &mut XmlWriter) -> Result<()> {
    start(w, "w:r", &[])?;
    empty(w, "w:tab", &[])?;
    end(w, "w:r")?;
    Ok(())
}

/// A PAGE field; no separator run, the renderer fills in the numeral.
fn write_page_field(w: &mut XmlWriter) -> Result<()> {
    field_char(w, "begin")?;
    start(w, "w:r", &[])?;
    start(w, "w:instrText", &[("xml:space", "preserve")])?;
    text(w, " PAGE ")?;
    end(w, "w:instrText")?;
    end(w, "w:r")?;
    field_char(w, "end")?;
    Ok(())
}

// ============================================================================
// Fixed parts
// ============================================================================

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

fn content_types_xml(headers: &[HeaderPart]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/>
"#,
    );
    for header in headers {
        xml.push_str(&format!(
            "  <Override PartName=\"/word/{}\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml\"/>\n",
            header.file_name
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn document_rels_xml(headers: &[HeaderPart]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/>
"#,
    );
    for header in headers {
        xml.push_str(&format!(
            "  <Relationship Id=\"{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/header\" Target=\"{}\"/>\n",
            header.rel_id, header.file_name
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn settings_xml(page: &PageSetup) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:settings xmlns:w=\"{}\">\n  <w:evenAndOddHeaders/>\n",
        WP_NS
    );
    if page.mirror_margins {
        xml.push_str("  <w:mirrorMargins/>\n");
    }
    xml.push_str("</w:settings>");
    xml
}

// ============================================================================
// quick-xml helpers
// ============================================================================

fn start(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut element = BytesStart::new(name);
    for attr in attrs {
        element.push_attribute(*attr);
    }
    w.write_event(Event::Start(element))?;
    Ok(())
}

fn empty(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut element = BytesStart::new(name);
    for attr in attrs {
        element.push_attribute(*attr);
    }
    w.write_event(Event::Empty(element))?;
    Ok(())
}

fn end(w: &mut XmlWriter, name: &str) -> Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text(w: &mut XmlWriter, content: &str) -> Result<()> {
    w.write_event(Event::Text(BytesText::new(content)))?;
    Ok(())
}

fn finish(w: XmlWriter) -> Result<String> {
    Ok(String::from_utf8(w.into_inner().into_inner())?)
}
