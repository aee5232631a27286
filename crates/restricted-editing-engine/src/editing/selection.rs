use std::ops::Range;

use xi_rope::delta::Transformer;
use xi_rope::{Delta, RopeInfo};

/// Caret or selection as two byte offsets.
///
/// `anchor` is where the selection started, `focus` is where the caret is.
/// The focus may be before the anchor for backward selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub focus: usize,
}

impl Selection {
    pub fn new(anchor: usize, focus: usize) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(at: usize) -> Self {
        Self::new(at, at)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }

    /// Selected range in document order
    pub fn range(&self) -> Range<usize> {
        self.anchor.min(self.focus)..self.anchor.max(self.focus)
    }

    /// Move both ends through an edit; a caret at an insertion point ends up
    /// after the inserted text
    pub(crate) fn transform(&self, delta: &Delta<RopeInfo>) -> Self {
        let mut transformer = Transformer::new(delta);
        Self {
            anchor: transformer.transform(self.anchor, true),
            focus: transformer.transform(self.focus, true),
        }
    }
}
