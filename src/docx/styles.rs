//! Paragraph style table and `word/styles.xml` generation.
//!
//! The table mirrors the book typesetting defaults: Book Antiqua body text,
//! centered headings, a TOC entry style with a dot-leader tab for the page
//! numeral, and a small italic running-header style. The conversion core
//! only ever names styles by id; everything visual lives here.

pub const NORMAL: &str = "Normal";
pub const HEADING_1: &str = "Heading1";
pub const HEADING_2: &str = "Heading2";
pub const HEADING_3: &str = "Heading3";
pub const TOC_ENTRY: &str = "TocEntry";
pub const QUOTE: &str = "Quote";
pub const PAGE_HEADER: &str = "PageHeader";

/// Style id for a heading of the given level. Levels past 3 share the
/// deepest configured heading look.
pub fn heading(level: u8) -> &'static str {
    match level {
        1 => HEADING_1,
        2 => HEADING_2,
        _ => HEADING_3,
    }
}

const BODY_FONT: &str = "Book Antiqua";

#[derive(Clone, Copy)]
enum Justify {
    Left,
    Center,
    Both,
}

#[derive(Clone, Copy)]
struct TabStop {
    /// Position in twips.
    pos: u32,
    /// `left` or `right`.
    alignment: &'static str,
    /// Leader character name (`dot`), if any.
    leader: Option<&'static str>,
}

/// One row of the style table. Sizes are half-points, distances twips.
struct StyleDef {
    id: &'static str,
    name: &'static str,
    based_on: Option<&'static str>,
    size: u16,
    bold: bool,
    italic: bool,
    justify: Option<Justify>,
    /// 1.15 line spacing expressed as 240ths.
    line: Option<u32>,
    space_before: Option<u32>,
    space_after: Option<u32>,
    first_line_indent: Option<u32>,
    left_indent: Option<u32>,
    right_indent: Option<u32>,
    tabs: &'static [TabStop],
}

const DEFAULT: StyleDef = StyleDef {
    id: "",
    name: "",
    based_on: None,
    size: 20,
    bold: false,
    italic: false,
    justify: None,
    line: None,
    space_before: None,
    space_after: None,
    first_line_indent: None,
    left_indent: None,
    right_indent: None,
    tabs: &[],
};

const STYLES: &[StyleDef] = &[
    // Body text: 10pt justified, 1.15 spacing, 11.5pt after, 0.25" indent.
    StyleDef {
        id: NORMAL,
        name: "Normal",
        justify: Some(Justify::Both),
        line: Some(276),
        space_after: Some(230),
        first_line_indent: Some(360),
        ..DEFAULT
    },
    StyleDef {
        id: HEADING_1,
        name: "Heading 1",
        size: 36,
        bold: true,
        justify: Some(Justify::Center),
        space_before: Some(720),
        space_after: Some(280),
        ..DEFAULT
    },
    StyleDef {
        id: HEADING_2,
        name: "Heading 2",
        size: 32,
        bold: true,
        justify: Some(Justify::Center),
        space_before: Some(720),
        space_after: Some(280),
        ..DEFAULT
    },
    StyleDef {
        id: HEADING_3,
        name: "Heading 3",
        size: 28,
        bold: true,
        justify: Some(Justify::Center),
        space_before: Some(360),
        space_after: Some(280),
        ..DEFAULT
    },
    // TOC entries: fixed left tab for the title, dot-leader right tab for
    // the page numeral.
    StyleDef {
        id: TOC_ENTRY,
        name: "TOC Entry",
        based_on: Some(NORMAL),
        space_after: Some(120),
        first_line_indent: Some(360),
        tabs: &[
            TabStop {
                pos: 1166,
                alignment: "left",
                leader: None,
            },
            TabStop {
                pos: 5760,
                alignment: "right",
                leader: Some("dot"),
            },
        ],
        ..DEFAULT
    },
    StyleDef {
        id: QUOTE,
        name: "Quote",
        based_on: Some(NORMAL),
        italic: true,
        first_line_indent: Some(0),
        left_indent: Some(360),
        right_indent: Some(360),
        ..DEFAULT
    },
    StyleDef {
        id: PAGE_HEADER,
        name: "Page Header",
        size: 18,
        italic: true,
        tabs: &[TabStop {
            pos: 6120,
            alignment: "right",
            leader: None,
        }],
        ..DEFAULT
    },
];

/// Generate the complete `word/styles.xml` part.
pub(crate) fn styles_xml() -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
"#,
    );

    for style in STYLES {
        let default = if style.id == NORMAL {
            " w:default=\"1\""
        } else {
            ""
        };
        xml.push_str(&format!(
            "  <w:style w:type=\"paragraph\"{} w:styleId=\"{}\">\n",
            default, style.id
        ));
        xml.push_str(&format!("    <w:name w:val=\"{}\"/>\n", style.name));
        if let Some(base) = style.based_on {
            xml.push_str(&format!("    <w:basedOn w:val=\"{}\"/>\n", base));
        }
        push_paragraph_properties(&mut xml, style);
        push_run_properties(&mut xml, style);
        xml.push_str("  </w:style>\n");
    }

    xml.push_str("</w:styles>\n");
    xml
}

fn push_paragraph_properties(xml: &mut String, style: &StyleDef) {
    xml.push_str("    <w:pPr>\n");

    if !style.tabs.is_empty() {
        xml.push_str("      <w:tabs>\n");
        for tab in style.tabs {
            match tab.leader {
                Some(leader) => xml.push_str(&format!(
                    "        <w:tab w:val=\"{}\" w:leader=\"{}\" w:pos=\"{}\"/>\n",
                    tab.alignment, leader, tab.pos
                )),
                None => xml.push_str(&format!(
                    "        <w:tab w:val=\"{}\" w:pos=\"{}\"/>\n",
                    tab.alignment, tab.pos
                )),
            }
        }
        xml.push_str("      </w:tabs>\n");
    }

    let mut spacing = String::new();
    if let Some(line) = style.line {
        spacing.push_str(&format!(" w:line=\"{}\" w:lineRule=\"auto\"", line));
    }
    if let Some(before) = style.space_before {
        spacing.push_str(&format!(" w:before=\"{}\"", before));
    }
    if let Some(after) = style.space_after {
        spacing.push_str(&format!(" w:after=\"{}\"", after));
    }
    if !spacing.is_empty() {
        xml.push_str(&format!("      <w:spacing{}/>\n", spacing));
    }

    let mut ind = String::new();
    if let Some(first) = style.first_line_indent {
        ind.push_str(&format!(" w:firstLine=\"{}\"", first));
    }
    if let Some(left) = style.left_indent {
        ind.push_str(&format!(" w:left=\"{}\"", left));
    }
    if let Some(right) = style.right_indent {
        ind.push_str(&format!(" w:right=\"{}\"", right));
    }
    if !ind.is_empty() {
        xml.push_str(&format!("      <w:ind{}/>\n", ind));
    }

    if let Some(justify) = style.justify {
        let val = match justify {
            Justify::Left => "left",
            Justify::Center => "center",
            Justify::Both => "both",
        };
        xml.push_str(&format!("      <w:jc w:val=\"{}\"/>\n", val));
    }

    xml.push_str("    </w:pPr>\n");
}

fn push_run_properties(xml: &mut String, style: &StyleDef) {
    xml.push_str("    <w:rPr>\n");
    xml.push_str(&format!(
        "      <w:rFonts w:ascii=\"{f}\" w:hAnsi=\"{f}\" w:cs=\"{f}\" w:eastAsia=\"{f}\"/>\n",
        f = BODY_FONT
    ));
    if style.bold {
        xml.push_str("      <w:b/>\n");
    }
    if style.italic {
        xml.push_str("      <w:i/>\n");
    }
    xml.push_str("      <w:color w:val=\"000000\"/>\n");
    xml.push_str(&format!("      <w:sz w:val=\"{}\"/>\n", style.size));
    xml.push_str(&format!("      <w:szCs w:val=\"{}\"/>\n", style.size));
    xml.push_str("    </w:rPr>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_levels_clamp_to_deepest_style() {
        assert_eq!(heading(1), HEADING_1);
        assert_eq!(heading(2), HEADING_2);
        assert_eq!(heading(3), HEADING_3);
        assert_eq!(heading(6), HEADING_3);
    }

    #[test]
    fn styles_xml_defines_every_style_id() {
        let xml = styles_xml();
        for id in [
            NORMAL,
            HEADING_1,
            HEADING_2,
            HEADING_3,
            TOC_ENTRY,
            QUOTE,
            PAGE_HEADER,
        ] {
            assert!(
                xml.contains(&format!("w:styleId=\"{}\"", id)),
                "missing style {id}"
            );
        }
    }

    #[test]
    fn toc_entry_has_a_dot_leader_tab() {
        let xml = styles_xml();
        assert!(xml.contains("w:val=\"right\" w:leader=\"dot\" w:pos=\"5760\""));
    }
}
