//! # bindery
//!
//! Convert structured HTML into a print-ready DOCX document.
//!
//! The input is book-shaped HTML: headings, body paragraphs, a table of
//! contents whose entries link to named anchors, and the anchors themselves.
//! The output is a `.docx` package with real Word bookmarks, PAGEREF fields
//! that the renderer resolves to page numbers, per-chapter layout sections,
//! and running headers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bindery::{ConvertOptions, convert};
//!
//! let report = convert("book.html", "book.docx", &ConvertOptions::default()).unwrap();
//! println!("{} paragraphs, {} bookmarks", report.paragraphs, report.bookmarks);
//! ```
//!
//! ## How linkage works
//!
//! Bookmarks in the source carry no text of their own; each one anchors to
//! the *next* piece of emitted content. TOC entries embed forward PAGEREF
//! fields by bookmark name — the page numerals are computed by the renderer,
//! never by this crate. A TOC entry whose target does not exist anywhere in
//! the document, or is never anchored, fails the conversion rather than
//! producing a broken field.

pub mod config;
pub mod content;
pub mod docx;
pub mod error;
pub mod html;
pub mod pipeline;

pub use config::{ConvertOptions, PageSetup, SectionStart};
pub use content::{ContentNode, ParagraphStyle, RawUnit, classify, classify_units};
pub use docx::{DocxDocument, write_docx, write_docx_to_writer};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, Report, Warning};

use std::io::Cursor;
use std::path::Path;

/// Convert an HTML file into a DOCX file.
///
/// Reads and classifies the source, runs the conversion pass, and saves the
/// package. Nothing is written when the pass fails.
pub fn convert<P, Q>(input: P, output: Q, options: &ConvertOptions) -> Result<Report>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let units = html::read_units(input)?;
    let nodes = content::classify_units(&units);

    let mut doc = DocxDocument::new(options.page);
    let report = Pipeline::new(options.clone()).run(&nodes, &mut doc)?;

    docx::write_docx(&doc, output)?;
    Ok(report)
}

/// Convert HTML bytes into an in-memory DOCX package.
///
/// Useful for tests and callers that manage their own I/O.
pub fn convert_bytes(input: &[u8], options: &ConvertOptions) -> Result<(Vec<u8>, Report)> {
    let units = html::read_units_from_bytes(input)?;
    let nodes = content::classify_units(&units);

    let mut doc = DocxDocument::new(options.page);
    let report = Pipeline::new(options.clone()).run(&nodes, &mut doc)?;

    let mut buffer = Cursor::new(Vec::new());
    docx::write_docx_to_writer(&doc, &mut buffer)?;
    Ok((buffer.into_inner(), report))
}
