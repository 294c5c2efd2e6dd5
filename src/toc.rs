//! Table of contents builder.
//!
//! Entries are appended at the current insertion point. The document
//! builder decides when to descend into subsections and when to come back
//! up; the TOC only keeps track of where the next entry goes, its depth and
//! the deepest level ever used (needed for NCX metadata).

use std::fmt;

/// Index of an entry inside a [`Toc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

/// Where a TOC entry points: a part of the book plus an optional fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocTarget {
    pub part: String,
    pub fragment: Option<String>,
}

impl TocTarget {
    pub fn new(part: impl Into<String>) -> Self {
        Self {
            part: part.into(),
            fragment: None,
        }
    }

    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }
}

impl fmt::Display for TocTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fragment {
            Some(fragment) => write!(f, "{}#{}", self.part, fragment),
            None => f.write_str(&self.part),
        }
    }
}

/// A single entry in the table of contents.
#[derive(Debug, Clone)]
pub struct TocEntry {
    text: String,
    target: TocTarget,
    number: usize,
    parent: Option<EntryId>,
    children: Vec<EntryId>,
}

impl TocEntry {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn target(&self) -> &TocTarget {
        &self.target
    }

    /// Sequence number, unique across the whole TOC and assigned in order
    /// of creation starting at 0.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn parent(&self) -> Option<EntryId> {
        self.parent
    }

    pub fn children(&self) -> &[EntryId] {
        &self.children
    }
}

/// Hierarchical table of contents.
#[derive(Debug, Clone)]
pub struct Toc {
    entries: Vec<TocEntry>,
    top_level: Vec<EntryId>,
    insert_at: Option<EntryId>,
    depth: usize,
    max_depth: usize,
}

impl Default for Toc {
    fn default() -> Self {
        Self::new()
    }
}

impl Toc {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            top_level: Vec::new(),
            insert_at: None,
            depth: 1,
            max_depth: 1,
        }
    }

    /// Depth at which new entries are added (1 for top level).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Deepest level any entry has been added at.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> &TocEntry {
        &self.entries[id.0]
    }

    /// Top level entries in order.
    pub fn top_level(&self) -> impl Iterator<Item = &TocEntry> {
        self.top_level.iter().map(|&id| self.get(id))
    }

    pub fn children<'a>(&'a self, entry: &'a TocEntry) -> impl Iterator<Item = &'a TocEntry> {
        entry.children.iter().map(|&id| self.get(id))
    }

    /// All entries in order of creation.
    pub fn iter(&self) -> impl Iterator<Item = &TocEntry> {
        self.entries.iter()
    }

    /// Append an entry at the current insertion point.
    pub fn new_entry(&mut self, text: impl Into<String>, target: TocTarget) -> EntryId {
        if self.depth > self.max_depth {
            self.max_depth = self.depth;
        }
        let id = EntryId(self.entries.len());
        self.entries.push(TocEntry {
            text: text.into(),
            target,
            number: id.0,
            parent: self.insert_at,
            children: Vec::new(),
        });
        match self.insert_at {
            Some(parent) => self.entries[parent.0].children.push(id),
            None => self.top_level.push(id),
        }
        id
    }

    /// Add new entries as subsections of the most recent entry at the
    /// current level.
    ///
    /// Returns `false` and changes nothing if there is no such entry.
    pub fn begin_subsections(&mut self) -> bool {
        let siblings = match self.insert_at {
            Some(parent) => &self.entries[parent.0].children,
            None => &self.top_level,
        };
        let Some(&last) = siblings.last() else {
            return false;
        };
        self.depth += 1;
        self.insert_at = Some(last);
        true
    }

    /// Add new entries one level higher.
    ///
    /// Callers must pair this with [`Toc::begin_subsections`]; at the top
    /// level it does nothing.
    pub fn end_subsections(&mut self) {
        debug_assert!(self.depth > 1, "end_subsections at top level");
        if let Some(current) = self.insert_at {
            self.depth -= 1;
            self.insert_at = self.entries[current.0].parent;
        }
    }
}
