pub mod capabilities;
pub mod conversion;
pub mod editing;
pub mod editor;
pub mod events;
pub mod io;
pub mod restricted_editing;
pub mod view;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use capabilities::{Command, CommandRegistry};
pub use editing::{Cmd, Document, DocumentError, Marker, MarkerStore, Patch, Selection};
pub use editor::{Editor, EditorError};
pub use events::Subscription;
pub use io::*;
pub use restricted_editing::{
    GateState, MarkerNameSequence, RestrictedEditing, RestrictedEditingConfig,
};
pub use view::MarkupError;
