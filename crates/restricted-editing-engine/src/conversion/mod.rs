//! Conversion between the markup view tree and the document model.
//!
//! Upcasting turns view nodes into a [`ModelFragment`] of text, block breaks
//! and marker boundary placeholders. Downcasting renders a [`Document`]
//! back to view nodes, wrapping marker ranges in highlight elements.
//!
//! [`Document`]: crate::editing::Document

pub mod consumable;
pub mod downcast;
pub mod fragment;
pub mod upcast;

pub use consumable::Consumable;
pub use downcast::{DowncastDispatcher, HighlightDescriptor, MarkerToHighlight};
pub use fragment::{ExtractedContent, ModelFragment, ModelNode};
pub use upcast::{
    Conversion, ConverterId, ElementToMarker, MarkerNamer, ParagraphUpcast, Priority,
    UpcastContext, UpcastConverter, UpcastDispatcher,
};
