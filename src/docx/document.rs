//! In-memory document model: an append-only sequence of fragments plus a
//! side table of bookmark anchors.
//!
//! The model is built once by the conversion pass and flushed to a `.docx`
//! package at the end. Fragments are never edited in place after they are
//! appended; the one mutation the pass performs on existing state is anchor
//! attachment, which is what realizes deferred bookmark linkage.

use std::collections::HashMap;

use crate::config::{PageSetup, SectionStart};

/// Opaque reference to an appended fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentId(pub(crate) usize);

/// A run of content within a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run {
    Text(String),
    Tab,
    /// A PAGEREF field displaying the page number of the named bookmark.
    /// The numeral itself is computed by the renderer, not by us.
    PageRef { target: String },
}

/// One entry in the output sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Paragraph {
        /// Style id from [`crate::docx::styles`].
        style: &'static str,
        runs: Vec<Run>,
        /// Bookmark names anchored on this paragraph.
        anchors: Vec<String>,
    },
    /// Closes the current layout section; content that follows belongs to a
    /// new section beginning as `start` says.
    SectionBreak {
        start: SectionStart,
        /// Running-header title for the new section. `None` leaves the
        /// section without headers (front matter).
        header_title: Option<String>,
    },
}

/// The document being assembled.
#[derive(Debug, Clone)]
pub struct DocxDocument {
    page: PageSetup,
    fragments: Vec<Fragment>,
    anchors: HashMap<String, FragmentId>,
}

impl DocxDocument {
    pub fn new(page: PageSetup) -> Self {
        Self {
            page,
            fragments: Vec::new(),
            anchors: HashMap::new(),
        }
    }

    pub fn page(&self) -> &PageSetup {
        &self.page
    }

    /// Append a styled paragraph and return its reference.
    pub fn append_paragraph(&mut self, style: &'static str, runs: Vec<Run>) -> FragmentId {
        self.fragments.push(Fragment::Paragraph {
            style,
            runs,
            anchors: Vec::new(),
        });
        FragmentId(self.fragments.len() - 1)
    }

    /// Append a section break. The new section inherits the shared page
    /// geometry and, when `header_title` is set, gets running headers
    /// showing that title.
    pub fn append_section_break(&mut self, start: SectionStart, header_title: Option<String>) {
        self.fragments
            .push(Fragment::SectionBreak { start, header_title });
    }

    /// Anchor a bookmark name on an already-appended paragraph.
    pub fn attach_bookmark(&mut self, fragment: FragmentId, id: &str) {
        if let Some(Fragment::Paragraph { anchors, .. }) = self.fragments.get_mut(fragment.0) {
            anchors.push(id.to_string());
        }
        self.anchors.insert(id.to_string(), fragment);
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// The fragment a bookmark name is anchored on, if any.
    pub fn anchor(&self, id: &str) -> Option<FragmentId> {
        self.anchors.get(id).copied()
    }

    pub fn paragraph_count(&self) -> usize {
        self.fragments
            .iter()
            .filter(|fragment| matches!(fragment, Fragment::Paragraph { .. }))
            .count()
    }

    pub fn section_break_count(&self) -> usize {
        self.fragments
            .iter()
            .filter(|fragment| matches!(fragment, Fragment::SectionBreak { .. }))
            .count()
    }
}
