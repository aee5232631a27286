use std::cell::Cell;

/// Marker group of exception zones
pub const EXCEPTION_GROUP: &str = "restricted-editing-exception";

/// Source of exception marker names.
///
/// Names are `restricted-editing-exception:<n>` with `n` counting up from 1.
/// The counter never goes back, so a name is not reissued even after its
/// marker has been removed.
#[derive(Debug, Default)]
pub struct MarkerNameSequence {
    counter: Cell<u64>,
}

impl MarkerNameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> String {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        format!("{EXCEPTION_GROUP}:{n}")
    }

    /// How many names were handed out
    pub fn issued(&self) -> u64 {
        self.counter.get()
    }
}
