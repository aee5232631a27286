use std::ops::Range;

use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::{Document, DocumentError};

/// Name of the registry command that gates text input
pub const INPUT_COMMAND: &str = "input";
/// Name of the registry command that gates deletions and block merges
pub const DELETE_COMMAND: &str = "delete";
/// Name of the registry command that gates block splitting
pub const ENTER_COMMAND: &str = "enter";

/// Edits that can be applied to the document
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    InsertText { at: usize, text: String },
    DeleteRange { range: Range<usize> },
    ReplaceRange { range: Range<usize>, text: String },
    /// Split the block containing `at` into two blocks
    SplitBlock { at: usize },
    /// Join the block ending at `at` with the following one
    MergeBlocks { at: usize },
}

impl Cmd {
    /// The registry command that must be enabled for this edit to run
    pub fn command_name(&self) -> &'static str {
        match self {
            Cmd::InsertText { .. } | Cmd::ReplaceRange { .. } => INPUT_COMMAND,
            Cmd::DeleteRange { .. } | Cmd::MergeBlocks { .. } => DELETE_COMMAND,
            Cmd::SplitBlock { .. } => ENTER_COMMAND,
        }
    }
}

/// Compile a command into a delta, validating its positions first
pub(crate) fn compile_command(doc: &Document, cmd: &Cmd) -> Result<Delta<RopeInfo>, DocumentError> {
    let mut builder = Builder::new(doc.len());
    match cmd {
        Cmd::InsertText { at, text } => {
            doc.check_position(*at)?;
            builder.replace(*at..*at, Rope::from(text.as_str()));
        }
        Cmd::DeleteRange { range } => {
            doc.check_range(range)?;
            builder.delete(range.clone());
        }
        Cmd::ReplaceRange { range, text } => {
            doc.check_range(range)?;
            builder.replace(range.clone(), Rope::from(text.as_str()));
        }
        Cmd::SplitBlock { at } => {
            doc.check_position(*at)?;
            builder.replace(*at..*at, Rope::from("\n"));
        }
        Cmd::MergeBlocks { at } => {
            doc.check_position(*at)?;
            if doc.slice_to_cow(*at..*at + 1) != "\n" {
                return Err(DocumentError::NotBlockEnd { position: *at });
            }
            builder.delete(*at..*at + 1);
        }
    }
    Ok(builder.build())
}

/// Byte ranges of inserted text, in post-edit coordinates
pub(crate) fn changed_ranges(delta: &Delta<RopeInfo>) -> Vec<Range<usize>> {
    let mut changed = Vec::new();
    let mut cursor = 0;
    for op in delta.els.iter() {
        match op {
            xi_rope::delta::DeltaElement::Copy(from, to) => {
                cursor += to - from;
            }
            xi_rope::delta::DeltaElement::Insert(inserted) => {
                let start = cursor;
                let end = cursor + inserted.len();
                changed.push(start..end);
                cursor = end;
            }
        }
    }
    changed
}
