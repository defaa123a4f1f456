//! The conversion pipeline: one forward pass over the classified node
//! stream.
//!
//! The pipeline owns all per-run state — the pending-bookmark queue, the
//! section state machine, and the bookmark registry — and routes each node
//! to the matching emitter. Bookmarks produce no fragment of their own; they
//! queue up and anchor on the next emitted content, however many of them are
//! waiting. Fatal errors abort the run before anything is written out.

mod registry;
mod section;

pub use registry::BookmarkRegistry;
pub use section::SectionState;

use log::{debug, warn};

use crate::config::{ConvertOptions, SectionStart};
use crate::content::{ContentNode, ParagraphStyle, sanitize_id};
use crate::docx::{DocxDocument, FragmentId, Run, styles};
use crate::error::{Error, Result};

/// Outcome of a completed run: counters for the summary plus any non-fatal
/// warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Report {
    pub paragraphs: usize,
    pub section_breaks: usize,
    pub bookmarks: usize,
    pub toc_references: usize,
    pub toc_seen: bool,
    pub warnings: Vec<Warning>,
}

/// Non-fatal conditions reported after the pass completes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub enum Warning {
    /// The stream ended with bookmarks still queued; they were never
    /// anchored to anything.
    TrailingPendingBookmarks { ids: Vec<String> },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrailingPendingBookmarks { ids } => {
                write!(f, "trailing bookmarks never attached: {}", ids.join(", "))
            }
        }
    }
}

struct TocRef {
    target: String,
    entry: String,
}

/// Single-use conversion pass. Construct one per run; nothing is shared
/// between runs.
pub struct Pipeline {
    options: ConvertOptions,
    registry: BookmarkRegistry,
    section: SectionState,
    pending: Vec<String>,
    toc_refs: Vec<TocRef>,
}

impl Pipeline {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            registry: BookmarkRegistry::new(),
            section: SectionState::new(),
            pending: Vec::new(),
            toc_refs: Vec::new(),
        }
    }

    /// Drive the node stream into `doc`.
    ///
    /// Bookmark names are registered up front in document order, so TOC
    /// entries can reference chapters that appear later in the stream;
    /// emission itself visits every node exactly once, in order, with no
    /// backtracking.
    pub fn run(mut self, nodes: &[ContentNode], doc: &mut DocxDocument) -> Result<Report> {
        for node in nodes {
            if let ContentNode::Bookmark { id } = node {
                self.registry.register(&sanitize_id(id))?;
            }
        }

        for node in nodes {
            match node {
                ContentNode::Bookmark { id } => {
                    // No fragment; the name waits for the next content.
                    self.pending.push(sanitize_id(id));
                }
                ContentNode::Heading { level, text } => self.emit_heading(doc, *level, text)?,
                ContentNode::TocEntry {
                    label,
                    text,
                    target,
                } => self.emit_toc_entry(doc, label, text, target)?,
                ContentNode::Paragraph { text, style } => {
                    self.emit_paragraph(doc, text, *style)?
                }
            }
        }

        for reference in &self.toc_refs {
            self.registry.resolve(&reference.target, &reference.entry)?;
        }

        let mut warnings = Vec::new();
        if !self.pending.is_empty() {
            warn!(
                "stream ended with {} unattached bookmark(s): {}",
                self.pending.len(),
                self.pending.join(", ")
            );
            warnings.push(Warning::TrailingPendingBookmarks {
                ids: std::mem::take(&mut self.pending),
            });
        }

        Ok(Report {
            paragraphs: doc.paragraph_count(),
            section_breaks: doc.section_break_count(),
            bookmarks: self.registry.len(),
            toc_references: self.toc_refs.len(),
            toc_seen: self.section == SectionState::TocSeen,
            warnings,
        })
    }

    fn emit_heading(&mut self, doc: &mut DocxDocument, level: u8, text: &str) -> Result<()> {
        if self.section.breaks_before_heading(level) {
            debug!("section break before heading `{text}`");
            if self.options.force_blank_verso
                && self.options.chapter_break == SectionStart::OddPage
            {
                doc.append_section_break(SectionStart::EvenPage, Some(text.to_string()));
            }
            doc.append_section_break(self.options.chapter_break, Some(text.to_string()));
        }

        let fragment = doc.append_paragraph(styles::heading(level), vec![Run::Text(text.to_string())]);
        self.attach_pending(doc, fragment)
    }

    fn emit_toc_entry(
        &mut self,
        doc: &mut DocxDocument,
        label: &str,
        text: &str,
        target: &str,
    ) -> Result<()> {
        // The first TOC entry flips the section machine before its own
        // fragment is emitted.
        self.section.record_toc_entry();

        let target = sanitize_id(target);
        let entry = if label.is_empty() {
            text.to_string()
        } else {
            format!("{label} {text}")
        };

        // A dangling TOC entry is a structural defect in the source, not a
        // recoverable condition.
        if !self.registry.is_registered(&target) {
            return Err(Error::UnresolvedBookmark { id: target, entry });
        }

        let mut runs = Vec::new();
        if !label.is_empty() {
            runs.push(Run::Text(label.to_string()));
            runs.push(Run::Tab);
        }
        runs.push(Run::Text(text.to_string()));
        runs.push(Run::Tab);
        runs.push(Run::PageRef {
            target: target.clone(),
        });

        let fragment = doc.append_paragraph(styles::TOC_ENTRY, runs);
        self.attach_pending(doc, fragment)?;
        self.toc_refs.push(TocRef { target, entry });
        Ok(())
    }

    fn emit_paragraph(
        &mut self,
        doc: &mut DocxDocument,
        text: &str,
        style: ParagraphStyle,
    ) -> Result<()> {
        let style = match style {
            ParagraphStyle::Normal => styles::NORMAL,
            ParagraphStyle::Quote => styles::QUOTE,
        };
        let fragment = doc.append_paragraph(style, vec![Run::Text(text.to_string())]);
        self.attach_pending(doc, fragment)
    }

    /// Drain the queue onto the fragment just emitted: every waiting name
    /// anchors on the same one.
    fn attach_pending(&mut self, doc: &mut DocxDocument, fragment: FragmentId) -> Result<()> {
        for id in std::mem::take(&mut self.pending) {
            debug!("attaching bookmark `{id}`");
            doc.attach_bookmark(fragment, &id);
            self.registry.mark_attached(&id, fragment)?;
        }
        Ok(())
    }
}
