use std::ops::Range;
use std::path::PathBuf;

use anyhow::Result;
use restricted_editing_config::RestrictedEditingSettings;
use restricted_editing_engine::restricted_editing::{EXCEPTION_GROUP, clip_to_zone};
use restricted_editing_engine::{
    Cmd, Editor, EditorError, GateState, RestrictedEditing, RestrictedEditingConfig, io,
};

const OUTSIDE_ZONE: &str = "Outside an editable zone (Tab jumps to the next one)";

pub struct App {
    pub editor: Editor,
    pub plugin: RestrictedEditing,
    pub path: PathBuf,
    pub status: String,
    pub dirty: bool,
}

pub fn engine_config(settings: &RestrictedEditingSettings) -> RestrictedEditingConfig {
    RestrictedEditingConfig {
        element: settings.element.clone(),
        exception_class: settings.exception_class.clone(),
        always_enabled: settings.always_enabled.clone(),
        highlight_priority: settings.highlight_priority,
    }
}

impl App {
    /// Open `path`, starting with an empty document if it does not exist yet
    pub fn new(path: PathBuf, settings: &RestrictedEditingSettings) -> Result<Self> {
        let markup = if path.exists() {
            io::read_document(&path)?
        } else {
            String::new()
        };
        Self::from_markup(path, &markup, settings)
    }

    pub fn from_markup(
        path: PathBuf,
        markup: &str,
        settings: &RestrictedEditingSettings,
    ) -> Result<Self> {
        let mut editor = Editor::new();
        let mut plugin = RestrictedEditing::new(engine_config(settings));
        plugin.init(&mut editor);
        editor.set_data(markup)?;

        let zones = editor.document().markers().in_group(EXCEPTION_GROUP).count();
        log::info!("opened {} with {zones} exception zones", path.display());

        Ok(Self {
            editor,
            plugin,
            path,
            status: format!("{zones} editable zone(s), Tab jumps between them"),
            dirty: false,
        })
    }

    pub fn gate_state(&self) -> GateState {
        self.plugin.state()
    }

    pub fn focus(&self) -> usize {
        self.editor.document().selection().focus
    }

    /// Exception zone ranges in document order
    pub fn zones(&self) -> Vec<Range<usize>> {
        let mut zones: Vec<_> = self
            .editor
            .document()
            .markers()
            .in_group(EXCEPTION_GROUP)
            .map(|marker| marker.range)
            .collect();
        zones.sort_by_key(|range| (range.start, range.end));
        zones
    }

    /// Block index and column (in chars) of the caret
    pub fn caret_line_col(&self) -> (usize, usize) {
        let text = self.editor.document().text();
        let focus = self.focus();
        let line = text[..focus].matches('\n').count();
        let line_start = text[..focus].rfind('\n').map_or(0, |i| i + 1);
        (line, text[line_start..focus].chars().count())
    }

    // ============ Caret movement ============

    pub fn move_left(&mut self) {
        let text = self.editor.document().text();
        let focus = self.focus();
        let target = text[..focus]
            .chars()
            .next_back()
            .map_or(focus, |c| focus - c.len_utf8());
        self.move_to(target);
    }

    pub fn move_right(&mut self) {
        let text = self.editor.document().text();
        let focus = self.focus();
        let target = text[focus..]
            .chars()
            .next()
            .map_or(focus, |c| focus + c.len_utf8());
        self.move_to(target);
    }

    pub fn move_up(&mut self) {
        let (line, column) = self.caret_line_col();
        if line > 0 {
            self.move_to_line(line - 1, column);
        }
    }

    pub fn move_down(&mut self) {
        let (line, column) = self.caret_line_col();
        self.move_to_line(line + 1, column);
    }

    pub fn move_home(&mut self) {
        let (line, _) = self.caret_line_col();
        self.move_to_line(line, 0);
    }

    pub fn move_end(&mut self) {
        let (line, _) = self.caret_line_col();
        self.move_to_line(line, usize::MAX);
    }

    /// Jump to the start of the next exception zone, wrapping around
    pub fn next_zone(&mut self) {
        let focus = self.focus();
        let zones = self.zones();
        let target = zones
            .iter()
            .find(|zone| zone.start > focus)
            .or_else(|| zones.first())
            .map(|zone| zone.start);
        match target {
            Some(start) => self.move_to(start),
            None => self.status = "No editable zones in this document".to_string(),
        }
    }

    /// Jump to the start of the previous exception zone, wrapping around
    pub fn previous_zone(&mut self) {
        let focus = self.focus();
        let zones = self.zones();
        let target = zones
            .iter()
            .rev()
            .find(|zone| zone.start < focus && !zone.contains(&focus))
            .or_else(|| zones.last())
            .map(|zone| zone.start);
        match target {
            Some(start) => self.move_to(start),
            None => self.status = "No editable zones in this document".to_string(),
        }
    }

    fn move_to_line(&mut self, line: usize, column: usize) {
        let blocks = self.editor.document().blocks();
        let Some(block) = blocks.get(line) else {
            return;
        };
        let text = self.editor.document().text();
        let target = text[block.clone()]
            .char_indices()
            .nth(column)
            .map_or(block.end, |(offset, _)| block.start + offset);
        self.move_to(target);
    }

    fn move_to(&mut self, position: usize) {
        if let Err(e) = self.editor.set_selection(position, position) {
            log::warn!("caret move to {position} failed: {e}");
        }
    }

    // ============ Editing ============

    pub fn insert_char(&mut self, c: char) {
        let cmd = match self.selected_range() {
            Some(range) => {
                let Some(range) = self.editable(range) else {
                    return self.reject();
                };
                Cmd::ReplaceRange {
                    range,
                    text: c.to_string(),
                }
            }
            None => Cmd::InsertText {
                at: self.focus(),
                text: c.to_string(),
            },
        };
        self.run(cmd);
    }

    pub fn enter(&mut self) {
        let at = self.focus();
        self.run(Cmd::SplitBlock { at });
    }

    pub fn backspace(&mut self) {
        if let Some(range) = self.selected_range() {
            return self.delete_selection(range);
        }
        let text = self.editor.document().text();
        let focus = self.focus();
        let Some(previous) = text[..focus].chars().next_back() else {
            return;
        };
        self.delete_char(focus - previous.len_utf8(), previous);
    }

    pub fn delete_forward(&mut self) {
        if let Some(range) = self.selected_range() {
            return self.delete_selection(range);
        }
        let text = self.editor.document().text();
        let focus = self.focus();
        let Some(next) = text[focus..].chars().next() else {
            return;
        };
        self.delete_char(focus, next);
    }

    fn delete_selection(&mut self, range: Range<usize>) {
        match self.editable(range) {
            Some(range) => self.run(Cmd::DeleteRange { range }),
            None => self.reject(),
        }
    }

    /// Remove the single char `c` at `at`, or merge blocks when it is a newline
    fn delete_char(&mut self, at: usize, c: char) {
        let range = at..at + c.len_utf8();
        if self.editable(range.clone()) != Some(range.clone()) {
            return self.reject();
        }
        if c == '\n' {
            self.run(Cmd::MergeBlocks { at });
        } else {
            self.run(Cmd::DeleteRange { range });
        }
    }

    pub fn undo(&mut self) {
        match self.editor.undo() {
            Ok(true) => self.dirty = true,
            Ok(false) => self.status = "Nothing to undo".to_string(),
            Err(e) => self.status = e.to_string(),
        }
    }

    pub fn redo(&mut self) {
        match self.editor.redo() {
            Ok(true) => self.dirty = true,
            Ok(false) => self.status = "Nothing to redo".to_string(),
            Err(e) => self.status = e.to_string(),
        }
    }

    pub fn save(&mut self) {
        match io::save_from(&self.editor, &self.path) {
            Ok(()) => {
                self.dirty = false;
                self.status = format!("Saved {}", self.path.display());
            }
            Err(e) => {
                log::error!("save failed: {e}");
                self.status = format!("Save failed: {e}");
            }
        }
    }

    /// Part of `range` inside the exception zone at the caret
    fn editable(&self, range: Range<usize>) -> Option<Range<usize>> {
        clip_to_zone(
            self.editor.document().markers(),
            EXCEPTION_GROUP,
            self.focus(),
            range,
        )
    }

    fn reject(&mut self) {
        self.status = OUTSIDE_ZONE.to_string();
    }

    fn selected_range(&self) -> Option<Range<usize>> {
        let selection = self.editor.document().selection();
        (!selection.is_collapsed()).then(|| selection.range())
    }

    fn run(&mut self, cmd: Cmd) {
        match self.editor.execute(cmd) {
            Ok(_) => {
                self.dirty = true;
                self.status.clear();
            }
            Err(EditorError::CommandDisabled { .. }) => self.reject(),
            Err(e) => self.status = e.to_string(),
        }
    }
}
