/*!
 * # Restricted Editing
 *
 * Disables editing everywhere except inside exception zones.
 *
 * Exception zones are markers named `restricted-editing-exception:<n>`. In
 * markup they are inline elements carrying the exception class, by default
 * `<span class="exception-marker">...</span>`.
 *
 * ## Flow
 *
 * - **Upcast**: each matching element becomes one marker around its converted
 *   content, named by a [`MarkerNameSequence`]
 * - **Downcast**: each marker is rendered as a fresh highlight element
 * - **Gate**: on every selection change the focus is checked against the
 *   markers and every command outside the allowlist is disabled or enabled
 *   under the `RestrictedMode` reason
 *
 * ```rust
 * use restricted_editing_engine::{Editor, GateState, RestrictedEditing, RestrictedEditingConfig};
 *
 * let mut editor = Editor::new();
 * let mut plugin = RestrictedEditing::new(RestrictedEditingConfig::default());
 * plugin.init(&mut editor);
 *
 * editor.set_data(r#"<p>Dear <span class="exception-marker">name</span>,</p>"#).unwrap();
 * assert_eq!(plugin.state(), GateState::Restricted);
 * assert!(!editor.is_enabled("input"));
 *
 * editor.set_selection(6, 6).unwrap();
 * assert_eq!(plugin.state(), GateState::Unrestricted);
 * assert!(editor.is_enabled("input"));
 * ```
 */

pub mod gate;
pub mod naming;

use std::cell::Cell;
use std::rc::Rc;

use crate::capabilities::{REDO_COMMAND, UNDO_COMMAND};
use crate::conversion::{
    ConverterId, ElementToMarker, HighlightDescriptor, MarkerToHighlight, Priority,
};
use crate::editor::Editor;
use crate::events::Subscription;
use crate::view::Pattern;

pub use gate::{GateState, RESTRICTED_MODE_REASON, apply_gate, clip_to_zone};
pub use naming::{EXCEPTION_GROUP, MarkerNameSequence};

pub const PLUGIN_NAME: &str = "RestrictedEditing";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedEditingConfig {
    /// Element name of exception zones in markup
    pub element: String,
    /// Class marking an element as an exception zone
    pub exception_class: String,
    /// Commands the gate never touches
    pub always_enabled: Vec<String>,
    /// Rendering priority of zone highlights; low renders outermost
    pub highlight_priority: i32,
}

impl Default for RestrictedEditingConfig {
    fn default() -> Self {
        Self {
            element: "span".to_string(),
            exception_class: "exception-marker".to_string(),
            always_enabled: vec![UNDO_COMMAND.to_string(), REDO_COMMAND.to_string()],
            highlight_priority: -10,
        }
    }
}

pub struct RestrictedEditing {
    config: RestrictedEditingConfig,
    names: Rc<MarkerNameSequence>,
    state: Rc<Cell<GateState>>,
    subscription: Option<Subscription>,
    upcast: Option<ConverterId>,
}

impl RestrictedEditing {
    pub fn new(config: RestrictedEditingConfig) -> Self {
        Self {
            config,
            names: Rc::new(MarkerNameSequence::new()),
            state: Rc::new(Cell::new(GateState::Restricted)),
            subscription: None,
            upcast: None,
        }
    }

    pub fn plugin_name() -> &'static str {
        PLUGIN_NAME
    }

    pub fn config(&self) -> &RestrictedEditingConfig {
        &self.config
    }

    /// Last gate decision
    pub fn state(&self) -> GateState {
        self.state.get()
    }

    /// Hook into an editor: register the converters, then gate commands now
    /// and on every selection change
    pub fn init(&mut self, editor: &mut Editor) {
        let names = Rc::clone(&self.names);
        let pattern = Pattern::element(self.config.element.as_str())
            .with_class(self.config.exception_class.as_str());
        let upcast = editor
            .upcast_mut()
            .add(Priority::Normal, ElementToMarker::new(pattern, move |_| names.next()));
        self.upcast = Some(upcast);

        let element = self.config.element.clone();
        let class = self.config.exception_class.clone();
        let priority = self.config.highlight_priority;
        editor.downcast_mut().add(MarkerToHighlight::new(EXCEPTION_GROUP, move |_| {
            HighlightDescriptor {
                element: element.clone(),
                classes: vec![class.clone()],
                priority,
            }
        }));

        let state = Rc::clone(&self.state);
        let always_enabled = self.config.always_enabled.clone();
        let subscription = editor.on_selection_change(move |focus, markers, commands| {
            let next = GateState::for_focus(focus, markers, EXCEPTION_GROUP);
            if state.get() != next {
                log::debug!("restricted editing: {:?} -> {next:?} at {focus}", state.get());
            }
            apply_gate(next, commands, &always_enabled);
            state.set(next);
        });
        self.subscription = Some(subscription);

        editor.register_plugin(PLUGIN_NAME);
        // Gate right away instead of waiting for the first selection change
        editor.change(|_| ());
    }

    /// Undo [`RestrictedEditing::init`]: stop gating, lift this plugin's
    /// disable reason from every command and unregister both converters.
    ///
    /// Markers already in the document stay but are no longer rendered.
    /// Markup loaded afterwards keeps only the text of exception elements.
    pub fn destroy(&mut self, editor: &mut Editor) {
        if let Some(subscription) = self.subscription.take() {
            editor.off(subscription);
        }
        for command in editor.commands_mut().iter_mut() {
            command.clear_force_disabled(RESTRICTED_MODE_REASON);
        }
        if let Some(upcast) = self.upcast.take() {
            editor.upcast_mut().remove(upcast);
        }
        editor.downcast_mut().remove(EXCEPTION_GROUP);
        editor.unregister_plugin(PLUGIN_NAME);
    }
}
