//! Markup view tree: the external representation documents are loaded from
//! and rendered to.

pub mod matcher;
pub mod node;
pub mod parser;
pub mod writer;

pub use matcher::{Match, Pattern};
pub use node::{ViewElement, ViewNode};
pub use parser::{MarkupError, parse_markup};
pub use writer::write_markup;
