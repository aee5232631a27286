use crate::view::ViewElement;

/// Element pattern: an optional element name plus classes that must all be present
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    pub name: Option<String>,
    pub classes: Vec<String>,
}

/// The parts of an element a successful match refers to.
///
/// Converters hand this to the consumption bookkeeping so the same parts are
/// not converted twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub name: bool,
    pub classes: Vec<String>,
}

impl Pattern {
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            classes: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn matches(&self, element: &ViewElement) -> Option<Match> {
        if let Some(name) = &self.name
            && *name != element.name
        {
            return None;
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return None;
        }
        // Patterns without a name match nothing rather than everything
        if self.name.is_none() && self.classes.is_empty() {
            return None;
        }

        Some(Match {
            name: self.name.is_some(),
            classes: self.classes.clone(),
        })
    }
}
