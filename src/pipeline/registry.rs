//! Bookmark registry: which names exist, and where they ended up.

use std::collections::HashMap;

use crate::docx::FragmentId;
use crate::error::{Error, Result};

/// Tracks every bookmark name in one conversion run and the fragment each
/// one was eventually anchored on.
///
/// Names must be unique within a document; the registry is seeded in
/// document order before emission starts, so a `TocEntry` can check its
/// target exists even when the matching bookmark appears later in the
/// stream.
#[derive(Debug, Default)]
pub struct BookmarkRegistry {
    entries: HashMap<String, Option<FragmentId>>,
}

impl BookmarkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bookmark name. Duplicate names are fatal: the linkage
    /// target would be ambiguous.
    pub fn register(&mut self, id: &str) -> Result<()> {
        if self.entries.contains_key(id) {
            return Err(Error::DuplicateBookmark { id: id.to_string() });
        }
        self.entries.insert(id.to_string(), None);
        Ok(())
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Bind a registered name to the fragment it was anchored on.
    pub fn mark_attached(&mut self, id: &str, fragment: FragmentId) -> Result<()> {
        match self.entries.get_mut(id) {
            Some(slot) => {
                *slot = Some(fragment);
                Ok(())
            }
            None => Err(Error::UnknownBookmark { id: id.to_string() }),
        }
    }

    /// Resolve a name to its anchored fragment. `entry` is the referencing
    /// TOC entry's text, carried into the error for diagnosis.
    pub fn resolve(&self, id: &str, entry: &str) -> Result<FragmentId> {
        match self.entries.get(id) {
            Some(Some(fragment)) => Ok(*fragment),
            _ => Err(Error::UnresolvedBookmark {
                id: id.to_string(),
                entry: entry.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
