use std::collections::BTreeMap;
use std::ops::Range;

use serde::Serialize;
use xi_rope::delta::Transformer;
use xi_rope::{Delta, RopeInfo};

/// A named range in the document buffer that survives edits
///
/// Markers never render on their own; converters decide how (and whether)
/// they show up in markup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub name: String,
    pub range: Range<usize>, // byte range in the rope, start <= end
}

impl Marker {
    /// Group part of the name: everything before the first `:`
    pub fn group(&self) -> &str {
        marker_group(&self.name)
    }

    /// Inclusive position test: both boundaries count as "at" the marker.
    ///
    /// Zero-length markers therefore cover exactly their own position.
    pub fn touches(&self, position: usize) -> bool {
        self.range.start <= position && position <= self.range.end
    }
}

pub(crate) fn marker_group(name: &str) -> &str {
    name.split_once(':').map_or(name, |(group, _)| group)
}

/// Registry of all markers in one document
///
/// Names are unique. Ranges can only be moved by the document when it applies
/// an edit delta, so callers outside the editing core get read access plus
/// `add`/`remove`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkerStore {
    markers: BTreeMap<String, Range<usize>>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new marker.
    ///
    /// # Panics
    ///
    /// Panics if a marker with the same name already exists or if the range is
    /// reversed. Both are programming errors: names come from a sequence that
    /// never repeats.
    pub fn add(&mut self, name: impl Into<String>, range: Range<usize>) {
        let name = name.into();
        assert!(
            range.start <= range.end,
            "marker `{name}` has reversed range {range:?}"
        );
        assert!(
            !self.markers.contains_key(&name),
            "marker `{name}` is already registered"
        );
        log::trace!("marker added: {name} {range:?}");
        self.markers.insert(name, range);
    }

    pub fn get(&self, name: &str) -> Option<Marker> {
        self.markers.get(name).map(|range| Marker {
            name: name.to_string(),
            range: range.clone(),
        })
    }

    pub fn has(&self, name: &str) -> bool {
        self.markers.contains_key(name)
    }

    /// Remove a marker, returning it if it existed
    pub fn remove(&mut self, name: &str) -> Option<Marker> {
        self.markers.remove(name).map(|range| Marker {
            name: name.to_string(),
            range,
        })
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }

    /// All markers in name order
    pub fn iter(&self) -> impl Iterator<Item = Marker> + '_ {
        self.markers.iter().map(|(name, range)| Marker {
            name: name.clone(),
            range: range.clone(),
        })
    }

    /// Markers whose range touches `position` (boundaries included)
    pub fn markers_at_position(&self, position: usize) -> impl Iterator<Item = Marker> + '_ {
        self.markers
            .iter()
            .filter(move |(_, range)| range.start <= position && position <= range.end)
            .map(|(name, range)| Marker {
                name: name.clone(),
                range: range.clone(),
            })
    }

    /// True when at least one marker of `group` touches `position`.
    ///
    /// Short-circuits on the first hit and does not allocate.
    pub fn any_in_group_at(&self, group: &str, position: usize) -> bool {
        self.markers.iter().any(|(name, range)| {
            marker_group(name) == group && range.start <= position && position <= range.end
        })
    }

    /// Markers belonging to `group` (the part of the name before `:`)
    pub fn in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = Marker> + 'a {
        self.iter().filter(move |marker| marker.group() == group)
    }

    /// Move every marker through an edit delta.
    ///
    /// Boundaries are sticky outwards: text inserted exactly at the start or
    /// end of a marker becomes part of it. A marker that had content and is
    /// collapsed by a deletion is removed; markers that were already empty
    /// survive.
    pub(crate) fn transform(&mut self, delta: &Delta<RopeInfo>, new_len: usize) -> Vec<Marker> {
        let mut transformer = Transformer::new(delta);
        let mut collapsed = Vec::new();

        for (name, range) in self.markers.iter_mut() {
            let was_empty = range.is_empty();
            let new_start = transformer.transform(range.start, false).min(new_len);
            let new_end = transformer.transform(range.end, true).min(new_len).max(new_start);

            if new_start != range.start || new_end != range.end {
                log::trace!("marker {name}: {range:?} -> {new_start}..{new_end}");
            }
            *range = new_start..new_end;

            if !was_empty && range.is_empty() {
                collapsed.push(Marker {
                    name: name.clone(),
                    range: range.clone(),
                });
            }
        }

        for marker in &collapsed {
            log::debug!("marker {} collapsed by deletion, removing", marker.name);
            self.markers.remove(&marker.name);
        }

        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xi_rope::Rope;
    use xi_rope::delta::Builder;

    fn store_with(markers: &[(&str, Range<usize>)]) -> MarkerStore {
        let mut store = MarkerStore::new();
        for (name, range) in markers {
            store.add(*name, range.clone());
        }
        store
    }

    fn insert_delta(len: usize, at: usize, text: &str) -> Delta<RopeInfo> {
        let mut builder = Builder::new(len);
        builder.replace(at..at, Rope::from(text));
        builder.build()
    }

    fn delete_delta(len: usize, range: Range<usize>) -> Delta<RopeInfo> {
        let mut builder = Builder::new(len);
        builder.delete(range);
        builder.build()
    }

    #[test]
    fn test_get_missing_marker_is_none() {
        let store = MarkerStore::new();
        assert_eq!(store.get("nope:1"), None);
        assert_eq!(store.markers_at_position(0).count(), 0);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_name_is_fatal() {
        let mut store = MarkerStore::new();
        store.add("zone:1", 0..2);
        store.add("zone:1", 3..4);
    }

    #[test]
    fn test_markers_at_position_includes_boundaries() {
        let store = store_with(&[("zone:1", 2..5), ("zone:2", 7..7), ("other:1", 0..10)]);

        let names_at = |pos| {
            store
                .markers_at_position(pos)
                .map(|m| m.name)
                .collect::<Vec<_>>()
        };

        assert_eq!(names_at(1), vec!["other:1"]);
        assert_eq!(names_at(2), vec!["other:1", "zone:1"]);
        assert_eq!(names_at(5), vec!["other:1", "zone:1"]);
        assert_eq!(names_at(6), vec!["other:1"]);
        assert_eq!(names_at(7), vec!["other:1", "zone:2"]);
        assert!(store.any_in_group_at("zone", 4));
        assert!(!store.any_in_group_at("zone", 6));
    }

    #[test]
    fn test_group_is_name_prefix() {
        let store = store_with(&[("zone:1", 0..1), ("zone:2", 1..2), ("other:1", 0..1)]);
        let zone_names: Vec<_> = store.in_group("zone").map(|m| m.name).collect();
        assert_eq!(zone_names, vec!["zone:1", "zone:2"]);
        assert_eq!(marker_group("plain"), "plain");
    }

    #[test]
    fn test_insert_inside_extends_marker() {
        // "hello world", marker over "world"
        let mut store = store_with(&[("zone:1", 6..11)]);
        store.transform(&insert_delta(11, 8, "XX"), 13);
        assert_eq!(store.get("zone:1").unwrap().range, 6..13);
    }

    #[test]
    fn test_insert_before_shifts_marker() {
        let mut store = store_with(&[("zone:1", 6..11)]);
        store.transform(&insert_delta(11, 0, "abc"), 14);
        assert_eq!(store.get("zone:1").unwrap().range, 9..14);
    }

    #[test]
    fn test_insert_after_leaves_marker() {
        let mut store = store_with(&[("zone:1", 0..5)]);
        store.transform(&insert_delta(11, 8, "abc"), 14);
        assert_eq!(store.get("zone:1").unwrap().range, 0..5);
    }

    #[test]
    fn test_insert_at_boundaries_is_sticky() {
        let mut store = store_with(&[("zone:1", 2..4)]);
        store.transform(&insert_delta(6, 4, "E"), 7);
        assert_eq!(store.get("zone:1").unwrap().range, 2..5);

        store.transform(&insert_delta(7, 2, "S"), 8);
        assert_eq!(store.get("zone:1").unwrap().range, 2..6);
    }

    #[test]
    fn test_insert_into_empty_marker_fills_it() {
        let mut store = store_with(&[("zone:1", 3..3)]);
        store.transform(&insert_delta(5, 3, "abc"), 8);
        assert_eq!(store.get("zone:1").unwrap().range, 3..6);
    }

    #[test]
    fn test_partial_delete_shrinks_marker() {
        let mut store = store_with(&[("zone:1", 2..8)]);
        let collapsed = store.transform(&delete_delta(10, 0..4), 6);
        assert!(collapsed.is_empty());
        assert_eq!(store.get("zone:1").unwrap().range, 0..4);
    }

    #[test]
    fn test_delete_covering_marker_removes_it() {
        let mut store = store_with(&[("zone:1", 2..5), ("zone:2", 6..8)]);
        let collapsed = store.transform(&delete_delta(10, 1..6), 5);

        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].name, "zone:1");
        assert!(!store.has("zone:1"));
        assert_eq!(store.get("zone:2").unwrap().range, 1..3);
    }

    #[test]
    fn test_empty_marker_survives_deletion_around_it() {
        let mut store = store_with(&[("zone:1", 4..4)]);
        let collapsed = store.transform(&delete_delta(8, 2..6), 4);
        assert!(collapsed.is_empty());
        assert_eq!(store.get("zone:1").unwrap().range, 2..2);
    }
}
