use crate::editing::{Marker, Selection};

/// Result of applying a command
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub changed: Vec<std::ops::Range<usize>>,
    pub new_selection: Selection,
    pub version: u64,
    /// Markers whose content was deleted by this edit
    pub removed_markers: Vec<Marker>,
}
