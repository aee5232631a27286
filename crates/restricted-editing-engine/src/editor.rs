use std::collections::BTreeSet;
use std::ops::Range;

use thiserror::Error;

use crate::capabilities::{CommandRegistry, REDO_COMMAND, UNDO_COMMAND};
use crate::conversion::{DowncastDispatcher, UpcastDispatcher};
use crate::editing::commands::{DELETE_COMMAND, ENTER_COMMAND, INPUT_COMMAND};
use crate::editing::{Cmd, Document, DocumentError, MarkerStore, Patch, Selection};
use crate::events::{Emitter, Subscription};
use crate::view::{MarkupError, parse_markup, write_markup};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("Command `{name}` is disabled")]
    CommandDisabled { name: String },

    #[error("Unknown command `{name}`")]
    UnknownCommand { name: String },

    #[error("Invalid markup: {0}")]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Called with the selection focus, the current markers and the command
/// registry whenever the selection may have moved
pub type SelectionListener = Box<dyn FnMut(usize, &MarkerStore, &mut CommandRegistry)>;

/// Host-facing editor: a document plus the command registry, conversion
/// pipeline and selection notifications around it.
///
/// Edits issued through [`Editor::execute`], [`Editor::undo`] and
/// [`Editor::redo`] are gated by the command registry. Every operation that
/// may move the selection notifies selection listeners afterwards, once the
/// document and its markers are up to date.
pub struct Editor {
    document: Document,
    commands: CommandRegistry,
    upcast: UpcastDispatcher,
    downcast: DowncastDispatcher,
    selection_listeners: Emitter<SelectionListener>,
    plugins: BTreeSet<String>,
}

impl Default for Editor {
    fn default() -> Self {
        let mut commands = CommandRegistry::new();
        for name in [INPUT_COMMAND, DELETE_COMMAND, ENTER_COMMAND, UNDO_COMMAND, REDO_COMMAND] {
            commands.register(name);
        }

        Self {
            document: Document::new(),
            commands,
            upcast: UpcastDispatcher::new(),
            downcast: DowncastDispatcher::new(),
            selection_listeners: Emitter::new(),
            plugins: BTreeSet::new(),
        }
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn upcast_mut(&mut self) -> &mut UpcastDispatcher {
        &mut self.upcast
    }

    pub fn downcast_mut(&mut self) -> &mut DowncastDispatcher {
        &mut self.downcast
    }

    /// Register an opaque host command. Selection listeners run afterwards so
    /// the new command picks up any gating in effect.
    pub fn register_command(&mut self, name: &str) {
        self.commands.register(name);
        self.fire_selection_change();
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.commands.is_enabled(name)
    }

    /// Check that a registered command may run
    pub fn ensure_enabled(&self, name: &str) -> Result<(), EditorError> {
        match self.commands.get(name) {
            None => Err(EditorError::UnknownCommand {
                name: name.to_string(),
            }),
            Some(command) if !command.is_enabled() => Err(EditorError::CommandDisabled {
                name: name.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    /// Apply an edit if the command gating it is enabled
    pub fn execute(&mut self, cmd: Cmd) -> Result<Patch, EditorError> {
        self.ensure_enabled(cmd.command_name())?;
        let patch = self.document.apply(cmd)?;
        for marker in &patch.removed_markers {
            log::debug!("edit removed marker {}", marker.name);
        }
        self.fire_selection_change();
        Ok(patch)
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.ensure_enabled(UNDO_COMMAND)?;
        let changed = self.document.undo();
        if changed {
            self.fire_selection_change();
        }
        Ok(changed)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.ensure_enabled(REDO_COMMAND)?;
        let changed = self.document.redo();
        if changed {
            self.fire_selection_change();
        }
        Ok(changed)
    }

    /// Replace the document with converted markup. History is dropped and the
    /// caret goes to the start.
    pub fn set_data(&mut self, markup: &str) -> Result<(), EditorError> {
        let nodes = parse_markup(markup)?;
        let content = self.upcast.convert(&nodes).extract();
        log::debug!(
            "loaded {} bytes of text with {} markers",
            content.text.len(),
            content.markers.len()
        );
        self.document.reset(&content.text, content.markers);
        self.fire_selection_change();
        Ok(())
    }

    /// Render the document back to markup
    pub fn get_data(&self) -> String {
        write_markup(&self.downcast.render(&self.document))
    }

    /// Convert markup and insert it at the selection focus.
    ///
    /// Not gated by the command registry. Markers in the inserted content are
    /// registered relative to the insertion point. Nothing is changed unless
    /// the text and every marker can be placed.
    pub fn insert_content(&mut self, markup: &str) -> Result<(), EditorError> {
        let nodes = parse_markup(markup)?;
        let content = self.upcast.convert(&nodes).extract();
        let at = self.document.selection().focus;
        self.document.check_position(at)?;

        let inserted_len = content.text.len();
        let markers: Vec<(String, Range<usize>)> = content
            .markers
            .into_iter()
            .map(|marker| (marker.name, marker.range.start + at..marker.range.end + at))
            .collect();
        let mut names = BTreeSet::new();
        for (name, range) in &markers {
            if self.document.markers().get(name).is_some() || !names.insert(name.as_str()) {
                return Err(DocumentError::DuplicateMarker { name: name.clone() }.into());
            }
            if range.start > range.end || range.end > at + inserted_len {
                return Err(DocumentError::InvalidRange {
                    start: range.start,
                    end: range.end,
                    len: self.document.len() + inserted_len,
                }
                .into());
            }
        }

        if !content.text.is_empty() {
            self.document.apply(Cmd::InsertText {
                at,
                text: content.text,
            })?;
        }
        for (name, range) in markers {
            self.document.add_marker(&name, range)?;
        }

        self.fire_selection_change();
        Ok(())
    }

    pub fn set_selection(&mut self, anchor: usize, focus: usize) -> Result<(), EditorError> {
        self.document.set_selection(Selection::new(anchor, focus))?;
        self.fire_selection_change();
        Ok(())
    }

    pub fn on_selection_change(
        &mut self,
        listener: impl FnMut(usize, &MarkerStore, &mut CommandRegistry) + 'static,
    ) -> Subscription {
        self.selection_listeners.subscribe(Box::new(listener))
    }

    pub fn off(&mut self, subscription: Subscription) -> bool {
        self.selection_listeners.unsubscribe(subscription)
    }

    /// Run an ungated mutation against the document, then notify selection
    /// listeners
    pub fn change<R>(&mut self, f: impl FnOnce(&mut Document) -> R) -> R {
        let result = f(&mut self.document);
        self.fire_selection_change();
        result
    }

    /// Give mutable access to the registry, e.g. to disable commands for a
    /// reason of the host's own
    pub fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    pub fn register_plugin(&mut self, name: &str) {
        self.plugins.insert(name.to_string());
    }

    pub fn unregister_plugin(&mut self, name: &str) -> bool {
        self.plugins.remove(name)
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains(name)
    }

    fn fire_selection_change(&mut self) {
        let focus = self.document.selection().focus;
        let markers = self.document.markers();
        for listener in self.selection_listeners.listeners_mut() {
            listener(focus, markers, &mut self.commands);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    // ============ Command gating tests ============

    #[test]
    fn test_builtin_commands_are_registered() {
        let editor = Editor::new();
        let names: Vec<_> = editor.commands().names().collect();
        assert_eq!(names, vec!["delete", "enter", "input", "redo", "undo"]);
    }

    #[test]
    fn test_execute_applies_enabled_command() {
        let mut editor = Editor::new();
        editor.set_data("<p>ab</p>").unwrap();
        editor
            .execute(Cmd::InsertText {
                at: 1,
                text: "x".to_string(),
            })
            .unwrap();
        assert_eq!(editor.document().text(), "axb");
    }

    #[test]
    fn test_execute_rejects_disabled_command() {
        let mut editor = Editor::new();
        editor.set_data("<p>ab</p>").unwrap();
        editor.commands_mut().register("input").force_disable("ReadOnly");

        let result = editor.execute(Cmd::InsertText {
            at: 1,
            text: "x".to_string(),
        });
        assert_eq!(
            result,
            Err(EditorError::CommandDisabled {
                name: "input".to_string()
            })
        );
        assert_eq!(editor.document().text(), "ab");
    }

    #[test]
    fn test_undo_and_redo() {
        let mut editor = Editor::new();
        editor.set_data("<p>ab</p>").unwrap();
        editor.execute(Cmd::DeleteRange { range: 0..1 }).unwrap();

        assert_eq!(editor.undo(), Ok(true));
        assert_eq!(editor.document().text(), "ab");
        assert_eq!(editor.redo(), Ok(true));
        assert_eq!(editor.document().text(), "b");
        assert_eq!(editor.redo(), Ok(false));
    }

    #[test]
    fn test_ensure_enabled_unknown_command() {
        let editor = Editor::new();
        assert_eq!(
            editor.ensure_enabled("bold"),
            Err(EditorError::UnknownCommand {
                name: "bold".to_string()
            })
        );
    }

    // ============ Data tests ============

    #[test]
    fn test_set_data_clears_history_and_resets_selection() {
        let mut editor = Editor::new();
        editor.set_data("<p>ab</p>").unwrap();
        editor.set_selection(2, 2).unwrap();
        editor.execute(Cmd::SplitBlock { at: 2 }).unwrap();

        editor.set_data("<p>cd</p>").unwrap();
        assert_eq!(editor.undo(), Ok(false));
        assert_eq!(editor.document().selection(), Selection::collapsed(0));
    }

    #[test]
    fn test_get_data_renders_blocks() {
        let mut editor = Editor::new();
        editor.set_data("<p>a &amp; b</p>\n<p>c</p>").unwrap();
        assert_eq!(editor.get_data(), "<p>a &amp; b</p><p>c</p>");
    }

    #[test]
    fn test_set_data_rejects_malformed_markup() {
        let mut editor = Editor::new();
        let result = editor.set_data("<p>a</div>");
        assert!(matches!(result, Err(EditorError::Markup(_))));
    }

    #[test]
    fn test_insert_content_at_focus() {
        let mut editor = Editor::new();
        editor.set_data("<p>ac</p>").unwrap();
        editor.set_selection(1, 1).unwrap();
        editor.insert_content("b").unwrap();

        assert_eq!(editor.document().text(), "abc");
        assert_eq!(editor.document().selection(), Selection::collapsed(2));
    }

    #[test]
    fn test_insert_content_with_clashing_marker_changes_nothing() {
        use crate::conversion::{ElementToMarker, Priority};
        use crate::view::Pattern;

        let mut editor = Editor::new();
        editor.upcast_mut().add(
            Priority::Normal,
            ElementToMarker::new(Pattern::element("span").with_class("zone"), |_| {
                "zone:1".to_string()
            }),
        );
        editor.set_data(r#"<p><span class="zone">a</span>b</p>"#).unwrap();
        editor.set_selection(2, 2).unwrap();

        let result = editor.insert_content(r#"<span class="zone">x</span>"#);

        assert_eq!(
            result,
            Err(EditorError::Document(DocumentError::DuplicateMarker {
                name: "zone:1".to_string()
            }))
        );
        assert_eq!(editor.document().text(), "ab");
        assert_eq!(editor.document().markers().len(), 1);
        assert!(!editor.document().can_undo());
    }

    #[test]
    fn test_insert_content_registers_markers_at_focus() {
        use crate::conversion::{ElementToMarker, Priority};
        use crate::view::Pattern;

        let mut editor = Editor::new();
        editor.upcast_mut().add(
            Priority::Normal,
            ElementToMarker::new(Pattern::element("span").with_class("zone"), |_| {
                "zone:7".to_string()
            }),
        );
        editor.set_data("<p>ab</p>").unwrap();
        editor.set_selection(1, 1).unwrap();
        editor.insert_content(r#"<span class="zone">xy</span>"#).unwrap();

        assert_eq!(editor.document().text(), "axyb");
        assert_eq!(editor.document().markers().get("zone:7").map(|m| m.range), Some(1..3));
    }

    #[test]
    fn test_invalid_selection_is_rejected() {
        let mut editor = Editor::new();
        editor.set_data("<p>ab</p>").unwrap();
        assert!(matches!(
            editor.set_selection(0, 9),
            Err(EditorError::Document(DocumentError::InvalidPosition { .. }))
        ));
    }

    // ============ Selection listener tests ============

    #[test]
    fn test_listeners_see_focus_after_each_change() {
        let mut editor = Editor::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        editor.on_selection_change(move |focus, _, _| sink.borrow_mut().push(focus));

        editor.set_data("<p>abc</p>").unwrap();
        editor.set_selection(0, 2).unwrap();
        editor
            .execute(Cmd::InsertText {
                at: 2,
                text: "x".to_string(),
            })
            .unwrap();

        assert_eq!(*seen.borrow(), vec![0, 2, 3]);
    }

    #[test]
    fn test_off_stops_notifications() {
        let mut editor = Editor::new();
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let subscription = editor.on_selection_change(move |_, _, _| *counter.borrow_mut() += 1);

        editor.set_data("<p>a</p>").unwrap();
        assert!(editor.off(subscription));
        editor.set_selection(1, 1).unwrap();

        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_listener_can_toggle_commands() {
        let mut editor = Editor::new();
        editor.on_selection_change(|focus, _, commands| {
            for command in commands.iter_mut() {
                if focus == 0 {
                    command.force_disable("AtStart");
                } else {
                    command.clear_force_disabled("AtStart");
                }
            }
        });

        editor.set_data("<p>ab</p>").unwrap();
        assert!(!editor.is_enabled("input"));
        editor.set_selection(1, 1).unwrap();
        assert!(editor.is_enabled("input"));
    }

    #[test]
    fn test_unregister_plugin() {
        let mut editor = Editor::new();
        editor.register_plugin("Spelling");
        assert!(editor.has_plugin("Spelling"));
        assert!(editor.unregister_plugin("Spelling"));
        assert!(!editor.has_plugin("Spelling"));
        assert!(!editor.unregister_plugin("Spelling"));
    }

    #[test]
    fn test_change_notifies_listeners() {
        let mut editor = Editor::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        editor.on_selection_change(move |_, markers, _| sink.borrow_mut().push(markers.len()));

        editor.set_data("<p>abc</p>").unwrap();
        editor.change(|doc| doc.add_marker("zone:1", 0..1)).unwrap();

        assert_eq!(*seen.borrow(), vec![0, 1]);
    }
}
