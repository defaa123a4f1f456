//! HTML input: parse a document and extract raw content units.
//!
//! Parsing uses html5ever, so malformed markup is handled the way a browser
//! would handle it. The reader walks the DOM depth-first in document order
//! and keeps the units the pipeline cares about: headings (`h1`-`h6`), text
//! blocks (`p`), and bare anchors (`a` with an `id`). Everything else is
//! traversed for its descendants but produces no unit of its own.

use std::borrow::Cow;
use std::path::Path;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use percent_encoding::percent_decode_str;

use crate::content::{RawUnit, UnitKind};
use crate::error::{Error, Result};

/// Read an HTML file from disk and extract its content units.
pub fn read_units<P: AsRef<Path>>(path: P) -> Result<Vec<RawUnit>> {
    let bytes = std::fs::read(path)?;
    read_units_from_bytes(&bytes)
}

/// Extract content units from raw HTML bytes.
///
/// Input is decoded as UTF-8 when possible, falling back to Windows-1252
/// (the usual encoding of older ebook sources).
pub fn read_units_from_bytes(bytes: &[u8]) -> Result<Vec<RawUnit>> {
    if bytes.is_empty() {
        return Err(Error::InvalidHtml("input is empty".to_string()));
    }

    let html = decode_text(bytes);
    let dom = parse_document(RcDom::default(), Default::default()).one(html.as_ref());

    // html5ever always synthesizes <html><body>; walk from the body so head
    // content (title, meta) never produces units.
    let root = find_element(&dom.document, "body").unwrap_or_else(|| dom.document.clone());

    let mut units = Vec::new();
    collect_units(&root, false, &mut units);
    Ok(units)
}

/// Decode bytes to a string: UTF-8 first, Windows-1252 as the fallback.
fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }
    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

fn collect_units(node: &Handle, in_blockquote: bool, units: &mut Vec<RawUnit>) {
    for child in node.children.borrow().iter() {
        let NodeData::Element { name, .. } = &child.data else {
            continue;
        };
        let tag = name.local.as_ref();
        let id = attr_value(child, "id");

        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag.as_bytes()[1] - b'0';
                let mut unit = RawUnit::new(UnitKind::Heading(level), text_content(child));
                unit.id = id;
                units.push(unit);
            }
            "p" => {
                let mut unit = RawUnit::new(UnitKind::Block, text_content(child));
                unit.id = id;
                unit.target = first_internal_link(child);
                unit.quote = in_blockquote || has_class(child, "quote");
                units.push(unit);
            }
            "a" => {
                if let Some(id) = id {
                    units.push(RawUnit::new(UnitKind::Anchor, text_content(child)).with_id(id));
                }
            }
            _ => {}
        }

        collect_units(child, in_blockquote || tag == "blockquote", units);
    }
}

/// Concatenated text of every descendant text node.
fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    push_text(node, &mut text);
    text
}

fn push_text(node: &Handle, text: &mut String) {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => text.push_str(&contents.borrow()),
            NodeData::Element { .. } => push_text(child, text),
            _ => {}
        }
    }
}

/// Fragment name of the first descendant `a[href^="#"]`, percent-decoded.
fn first_internal_link(node: &Handle) -> Option<String> {
    for child in node.children.borrow().iter() {
        if let NodeData::Element { name, .. } = &child.data {
            if name.local.as_ref() == "a"
                && let Some(href) = attr_value(child, "href")
                && let Some(fragment) = href.strip_prefix('#')
                && !fragment.is_empty()
            {
                return Some(percent_decode_str(fragment).decode_utf8_lossy().into_owned());
            }
            if let Some(found) = first_internal_link(child) {
                return Some(found);
            }
        }
    }
    None
}

fn attr_value(node: &Handle, key: &str) -> Option<String> {
    let NodeData::Element { attrs, .. } = &node.data else {
        return None;
    };
    attrs
        .borrow()
        .iter()
        .find(|attr| attr.name.local.as_ref() == key)
        .map(|attr| attr.value.to_string())
}

fn has_class(node: &Handle, class: &str) -> bool {
    attr_value(node, "class")
        .is_some_and(|value| value.split_whitespace().any(|token| token == class))
}

/// Depth-first search for the first element with the given local name.
fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        if let NodeData::Element { name, .. } = &child.data {
            if name.local.as_ref() == tag {
                return Some(child.clone());
            }
        }
        if let Some(found) = find_element(child, tag) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_units_in_document_order() {
        let html = b"<html><body>\
            <h1>Title</h1>\
            <p class=\"toc\"><a href=\"#ch1\">I. First</a></p>\
            <h2><a id=\"ch1\"></a>CHAPTER I</h2>\
            <p>Body text.</p>\
            </body></html>";
        let units = read_units_from_bytes(html).unwrap();

        assert_eq!(units.len(), 5);
        assert_eq!(units[0].kind, UnitKind::Heading(1));
        assert_eq!(units[1].kind, UnitKind::Block);
        assert_eq!(units[1].target.as_deref(), Some("ch1"));
        assert_eq!(units[2].kind, UnitKind::Heading(2));
        // The anchor nested in the h2 follows its parent.
        assert_eq!(units[3].kind, UnitKind::Anchor);
        assert_eq!(units[3].id.as_deref(), Some("ch1"));
        assert_eq!(units[4].kind, UnitKind::Block);
    }

    #[test]
    fn head_content_is_ignored() {
        let html = b"<html><head><title>skip me</title></head><body><p>keep</p></body></html>";
        let units = read_units_from_bytes(html).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "keep");
    }

    #[test]
    fn blockquote_marks_nested_paragraphs_as_quotes() {
        let html = b"<body><blockquote><p>quoted</p></blockquote><p>plain</p></body>";
        let units = read_units_from_bytes(html).unwrap();
        assert_eq!(units.len(), 2);
        assert!(units[0].quote);
        assert!(!units[1].quote);
    }

    #[test]
    fn percent_encoded_fragments_are_decoded() {
        let html = b"<body><p><a href=\"#ch%201\">One</a></p></body>";
        let units = read_units_from_bytes(html).unwrap();
        assert_eq!(units[0].target.as_deref(), Some("ch 1"));
    }

    #[test]
    fn malformed_markup_still_yields_units() {
        let html = b"<body><h2>Unclosed<p>next";
        let units = read_units_from_bytes(html).unwrap();
        assert!(units.iter().any(|u| u.kind == UnitKind::Heading(2)));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(read_units_from_bytes(b"").is_err());
    }

    #[test]
    fn windows_1252_input_is_decoded() {
        // 0x92 is a right single quote in CP1252 and invalid UTF-8.
        let html = b"<body><p>Andy\x92s</p></body>";
        let units = read_units_from_bytes(html).unwrap();
        assert_eq!(units[0].text, "Andy\u{2019}s");
    }
}
