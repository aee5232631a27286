use std::collections::{HashMap, HashSet};

use crate::view::{Match, ViewElement};

#[derive(Debug, Default)]
struct ConsumedParts {
    name: bool,
    classes: HashSet<String>,
}

/// Which parts of which view elements have already been converted.
///
/// Elements are identified by address, so a `Consumable` is only meaningful
/// for the lifetime of one borrowed view tree, i.e. one conversion run.
#[derive(Debug, Default)]
pub struct Consumable {
    consumed: HashMap<usize, ConsumedParts>,
}

fn key(element: &ViewElement) -> usize {
    element as *const ViewElement as usize
}

impl Consumable {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if none of the matched parts has been consumed yet
    pub fn test(&self, element: &ViewElement, matched: &Match) -> bool {
        match self.consumed.get(&key(element)) {
            None => true,
            Some(parts) => {
                !(matched.name && parts.name)
                    && !matched.classes.iter().any(|c| parts.classes.contains(c))
            }
        }
    }

    /// Mark the matched parts as consumed. Returns false, without consuming
    /// anything, if any part was already taken.
    pub fn consume(&mut self, element: &ViewElement, matched: &Match) -> bool {
        if !self.test(element, matched) {
            return false;
        }
        let parts = self.consumed.entry(key(element)).or_default();
        parts.name |= matched.name;
        parts.classes.extend(matched.classes.iter().cloned());
        true
    }

    pub fn is_name_consumed(&self, element: &ViewElement) -> bool {
        self.consumed
            .get(&key(element))
            .is_some_and(|parts| parts.name)
    }
}
