//! Content model and node classification.
//!
//! The HTML reader produces [`RawUnit`]s in document order; [`classify`] turns
//! each unit into zero or more typed [`ContentNode`]s. Classification is a
//! pure function of the unit: it filters units with no meaningful text,
//! normalizes whitespace, and splits inline bookmark anchors from the content
//! that carries them so that bookmark attachment is always deferred the same
//! way, whether the anchor stood alone or sat on a heading.

/// The discriminable kind of a raw content unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// `h1`..`h6`, with the level number.
    Heading(u8),
    /// A block of body text (`p`).
    Block,
    /// A bare anchor element (`a` with an `id`).
    Anchor,
}

/// A raw content unit as produced by the markup parser.
///
/// Mirrors what the HTML side can observe: kind, optional `id` attribute,
/// text content, the target of the first internal link (for TOC-like units),
/// and class-derived styling hints.
#[derive(Debug, Clone)]
pub struct RawUnit {
    pub kind: UnitKind,
    pub id: Option<String>,
    pub text: String,
    /// Fragment name of the first `href="#..."` link inside the unit,
    /// percent-decoded. Its presence is what makes a block a TOC entry.
    pub target: Option<String>,
    /// The unit's class list contains `quote`, or it sits inside a
    /// `blockquote`.
    pub quote: bool,
}

impl RawUnit {
    pub fn new(kind: UnitKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            id: None,
            text: text.into(),
            target: None,
            quote: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_quote(mut self) -> Self {
        self.quote = true;
        self
    }
}

/// Paragraph styling subtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParagraphStyle {
    #[default]
    Normal,
    Quote,
}

/// A typed node in the classified content stream.
///
/// Invariant: every variant except `Bookmark` carries non-empty
/// whitespace-normalized text. Units that cannot satisfy this are dropped by
/// the classifier and never reach the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    /// A named anchor with no renderable text of its own. Attaches to the
    /// next emitted content fragment.
    Bookmark { id: String },
    /// A heading; level 2 headings may open a new layout section.
    Heading { level: u8, text: String },
    /// A table-of-contents entry referencing a bookmark elsewhere in the
    /// stream. `label` is the numeral prefix ("IV." or "12."), possibly
    /// empty.
    TocEntry {
        label: String,
        text: String,
        target: String,
    },
    /// Body text.
    Paragraph { text: String, style: ParagraphStyle },
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Make a bookmark id safe for use as a Word bookmark name.
///
/// Word rejects names with spaces or punctuation; every non-alphanumeric
/// byte becomes an underscore. Sanitized names are the linkage keys
/// throughout: registration, attachment, and PAGEREF targets all use them.
pub fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Split a leading numeral token ("IV." or "12.") off a TOC entry's text.
///
/// Returns `(label, rest)`. The label is empty when the text does not start
/// with a terminated roman or arabic numeral, or when nothing would remain
/// after the split.
pub fn split_toc_label(text: &str) -> (&str, &str) {
    let Some(first) = text.split_whitespace().next() else {
        return ("", text);
    };
    let Some(numeral) = first.strip_suffix('.') else {
        return ("", text);
    };
    let roman = !numeral.is_empty()
        && numeral
            .chars()
            .all(|c| "IVXLCDM".contains(c.to_ascii_uppercase()));
    let arabic = !numeral.is_empty() && numeral.chars().all(|c| c.is_ascii_digit());
    if !roman && !arabic {
        return ("", text);
    }
    let rest = text[first.len()..].trim_start();
    if rest.is_empty() {
        return ("", text);
    }
    (first, rest)
}

/// Classify one raw unit into zero or more content nodes.
///
/// An empty result means the unit was skipped. A unit that is both a
/// bookmark anchor and textual content yields a `Bookmark` immediately
/// followed by the textual node.
pub fn classify(unit: &RawUnit) -> Vec<ContentNode> {
    let mut nodes = Vec::new();

    if let Some(id) = &unit.id {
        nodes.push(ContentNode::Bookmark { id: id.clone() });
    }

    let text = normalize_text(&unit.text);
    if text.is_empty() {
        return nodes;
    }

    match unit.kind {
        // A bare anchor's text, if any, belongs to its enclosing block.
        UnitKind::Anchor => {}
        UnitKind::Heading(level) => nodes.push(ContentNode::Heading { level, text }),
        UnitKind::Block => match &unit.target {
            Some(target) => {
                let (label, rest) = split_toc_label(&text);
                nodes.push(ContentNode::TocEntry {
                    label: label.to_string(),
                    text: rest.to_string(),
                    target: target.clone(),
                });
            }
            // A block with nowhere to link is body text, whatever its
            // class says.
            None => {
                let style = if unit.quote {
                    ParagraphStyle::Quote
                } else {
                    ParagraphStyle::Normal
                };
                nodes.push(ContentNode::Paragraph { text, style });
            }
        },
    }

    nodes
}

/// Classify an ordered sequence of units into the node stream the pipeline
/// consumes.
pub fn classify_units(units: &[RawUnit]) -> Vec<ContentNode> {
    units.iter().flat_map(classify).collect()
}
