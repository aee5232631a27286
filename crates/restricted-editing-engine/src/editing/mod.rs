/*!
 * # Editing Core Module
 *
 * The document model the rest of the engine builds on.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: xi-rope Buffer
 * - The entire document is stored in a single **`xi_rope::Rope`** buffer
 * - Blocks (paragraphs) are separated by `\n`; positions are byte offsets
 * - Edits are expressed as xi-rope **Deltas**
 *
 * ### 2. Command-Based Editing
 * - All edits are represented as **Commands** (`Cmd` enum) that compile to Deltas
 * - Invalid positions are rejected before anything changes
 * - The state before every edit goes onto a bounded undo history
 *
 * ### 3. Markers
 * - **Markers** are named byte ranges that survive edits
 * - Marker ranges are transformed through each Delta with xi-rope's `Transformer`
 * - Boundaries are sticky outwards, so typing at the edge of a marker extends it
 * - A marker whose content is deleted entirely is removed
 *
 * ## Module Structure
 *
 * - **`document`**: `Document` type with buffer, selection, markers and history
 * - **`commands`**: `Cmd` enum and delta compilation
 * - **`markers`**: `Marker` and `MarkerStore`
 * - **`selection`**: `Selection` (anchor + focus)
 * - **`patch`**: Edit result metadata
 *
 * ## Usage Pattern
 *
 * ```rust
 * use restricted_editing_engine::editing::*;
 *
 * let mut doc = Document::from_text("Dear ____,");
 * doc.add_marker("zone:1", 5..9).unwrap();
 *
 * doc.apply(Cmd::InsertText { at: 7, text: "Sam".to_string() }).unwrap();
 *
 * assert_eq!(doc.text(), "Dear __Sam__,");
 * assert_eq!(doc.markers().get("zone:1").unwrap().range, 5..12);
 * ```
 */

pub mod commands;
pub mod document;
pub(crate) mod history;
pub mod markers;
pub mod patch;
pub mod selection;

pub use commands::Cmd;
pub use document::{Document, DocumentError};
pub use markers::{Marker, MarkerStore};
pub use patch::Patch;
pub use selection::Selection;
