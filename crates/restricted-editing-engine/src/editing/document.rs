use std::ops::Range;

use thiserror::Error;
use xi_rope::Rope;

use crate::editing::history::{History, HistoryEntry};
use crate::editing::{Cmd, Marker, MarkerStore, Patch, Selection};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Position {position} is outside the document (length {len}) or not on a character boundary")]
    InvalidPosition { position: usize, len: usize },

    #[error("Range {start}..{end} is not a valid range in a document of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("Position {position} is not the end of a block")]
    NotBlockEnd { position: usize },

    #[error("Marker `{name}` already exists")]
    DuplicateMarker { name: String },
}

/// Editing model: text buffer, selection and markers
///
/// The whole document lives in one `xi_rope::Rope`. Blocks (paragraphs) are
/// separated by `\n`, so splitting a block inserts a newline and merging two
/// blocks deletes one. Positions are byte offsets into the buffer.
///
/// Every edit goes through [`Document::apply`], which compiles the command
/// into a delta and moves the selection and all markers through it. That is
/// the only place marker ranges change, which keeps them ordered and valid.
#[derive(Debug, Clone)]
pub struct Document {
    /// Entire document as UTF-8
    pub(crate) buffer: Rope,
    pub(crate) selection: Selection,
    /// Incremented on each edit
    pub(crate) version: u64,
    pub(crate) markers: MarkerStore,
    pub(crate) history: History,
}

impl Default for Document {
    fn default() -> Self {
        Self::from_text("")
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            selection: Selection::collapsed(0),
            version: 0,
            markers: MarkerStore::new(),
            history: History::default(),
        }
    }

    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::from_text(text))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    /// Apply an edit.
    ///
    /// The command is validated and compiled to a delta before anything is
    /// touched, so a rejected command leaves the document unchanged. On success
    /// the previous state is pushed onto the undo history.
    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch, DocumentError> {
        let delta = crate::editing::commands::compile_command(self, &cmd)?;
        let changed = crate::editing::commands::changed_ranges(&delta);

        self.history.record(self.history_entry());

        self.buffer = delta.apply(&self.buffer);
        let removed_markers = self.markers.transform(&delta, self.buffer.len());
        self.selection = self.selection.transform(&delta);
        self.version += 1;

        log::trace!("applied {cmd:?}, version {}", self.version);

        Ok(Patch {
            changed,
            new_selection: self.selection,
            version: self.version,
            removed_markers,
        })
    }

    /// Restore the state before the last edit. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let current = self.history_entry();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone edit. Returns false when there is nothing to
    /// redo.
    pub fn redo(&mut self) -> bool {
        let current = self.history_entry();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the whole content and marker set, dropping history
    pub(crate) fn reset(&mut self, text: &str, markers: Vec<Marker>) {
        self.buffer = Rope::from(text);
        self.markers.clear();
        for marker in markers {
            self.markers.add(marker.name, marker.range);
        }
        self.selection = Selection::collapsed(0);
        self.history.clear();
        self.version += 1;
    }

    fn history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            buffer: self.buffer.clone(),
            markers: self.markers.clone(),
            selection: self.selection,
        }
    }

    fn restore(&mut self, entry: HistoryEntry) {
        self.buffer = entry.buffer;
        self.markers = entry.markers;
        self.selection = entry.selection;
        self.version += 1;
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<(), DocumentError> {
        self.check_position(selection.anchor)?;
        self.check_position(selection.focus)?;
        self.selection = selection;
        Ok(())
    }

    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    /// Register a marker over an existing range of the document
    pub fn add_marker(&mut self, name: &str, range: Range<usize>) -> Result<(), DocumentError> {
        self.check_range(&range)?;
        if self.markers.get(name).is_some() {
            return Err(DocumentError::DuplicateMarker {
                name: name.to_string(),
            });
        }
        self.markers.add(name, range);
        Ok(())
    }

    pub fn remove_marker(&mut self, name: &str) -> Option<Marker> {
        self.markers.remove(name)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Byte ranges of all blocks, excluding the separating newlines.
    ///
    /// An empty document still has one empty block.
    pub fn blocks(&self) -> Vec<Range<usize>> {
        let mut blocks = Vec::new();
        let mut start = 0;
        let mut offset = 0;
        for chunk in self.buffer.iter_chunks(..) {
            for (i, byte) in chunk.bytes().enumerate() {
                if byte == b'\n' {
                    blocks.push(start..offset + i);
                    start = offset + i + 1;
                }
            }
            offset += chunk.len();
        }
        blocks.push(start..self.buffer.len());
        blocks
    }

    /// Slice the buffer to a cow string
    pub fn slice_to_cow(&self, range: Range<usize>) -> std::borrow::Cow<'_, str> {
        let doc_len = self.buffer.len();

        // Clamp range to document bounds to prevent xi-rope panic
        let start = range.start.min(doc_len);
        let end = range.end.min(doc_len).max(start);

        self.buffer.slice_to_cow(start..end)
    }

    pub(crate) fn check_position(&self, position: usize) -> Result<(), DocumentError> {
        let len = self.len();
        if position > len || !self.buffer.is_codepoint_boundary(position) {
            return Err(DocumentError::InvalidPosition { position, len });
        }
        Ok(())
    }

    pub(crate) fn check_range(&self, range: &Range<usize>) -> Result<(), DocumentError> {
        let len = self.len();
        let invalid = DocumentError::InvalidRange {
            start: range.start,
            end: range.end,
            len,
        };
        if range.start > range.end || range.end > len {
            return Err(invalid);
        }
        if !self.buffer.is_codepoint_boundary(range.start)
            || !self.buffer.is_codepoint_boundary(range.end)
        {
            return Err(invalid);
        }
        Ok(())
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        // History is bookkeeping, not content
        self.buffer.to_string() == other.buffer.to_string()
            && self.selection == other.selection
            && self.version == other.version
            && self.markers == other.markers
    }
}
