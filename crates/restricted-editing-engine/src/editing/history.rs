use xi_rope::Rope;

use crate::editing::{MarkerStore, Selection};

const MAX_HISTORY_SIZE: usize = 100;

/// Document state captured before an edit
#[derive(Debug, Clone)]
pub(crate) struct HistoryEntry {
    pub buffer: Rope,
    pub markers: MarkerStore,
    pub selection: Selection,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct History {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
}

impl History {
    /// Record the state before a new edit; clears any redo entries
    pub fn record(&mut self, entry: HistoryEntry) {
        self.redo.clear();
        self.undo.push(entry);

        if self.undo.len() > MAX_HISTORY_SIZE {
            self.undo.remove(0);
        }
    }

    /// Swap `current` for the most recent undo entry
    pub fn undo(&mut self, current: HistoryEntry) -> Option<HistoryEntry> {
        let previous = self.undo.pop()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Swap `current` for the most recent redo entry
    pub fn redo(&mut self, current: HistoryEntry) -> Option<HistoryEntry> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> HistoryEntry {
        HistoryEntry {
            buffer: Rope::from(text),
            markers: MarkerStore::new(),
            selection: Selection::collapsed(0),
        }
    }

    #[test]
    fn test_undo_then_redo_swaps_entries() {
        let mut history = History::default();
        history.record(entry("a"));

        let restored = history.undo(entry("ab")).unwrap();
        assert_eq!(restored.buffer.to_string(), "a");
        assert!(history.can_redo());

        let again = history.redo(entry("a")).unwrap();
        assert_eq!(again.buffer.to_string(), "ab");
        assert!(!history.can_redo());
        assert!(history.can_undo());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::default();
        history.record(entry("a"));
        history.undo(entry("ab"));
        history.record(entry("a"));

        assert!(!history.can_redo());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = History::default();
        for i in 0..(MAX_HISTORY_SIZE + 10) {
            history.record(entry(&i.to_string()));
        }

        let mut count = 0;
        while history.undo(entry("x")).is_some() {
            count += 1;
        }
        assert_eq!(count, MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_empty_history() {
        let mut history = History::default();
        assert!(history.undo(entry("a")).is_none());
        assert!(history.redo(entry("a")).is_none());
    }
}
