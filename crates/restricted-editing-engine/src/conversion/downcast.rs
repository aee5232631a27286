use std::cmp::Reverse;
use std::collections::HashMap;
use std::ops::Range;

use crate::editing::{Document, Marker};
use crate::view::{ViewElement, ViewNode};

/// How a marker should be rendered: an element wrapping the marker's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightDescriptor {
    pub element: String,
    pub classes: Vec<String>,
    /// Lower priorities are rendered further out
    pub priority: i32,
}

impl HighlightDescriptor {
    fn to_element(&self) -> ViewElement {
        let mut element = ViewElement::new(self.element.clone());
        for class in &self.classes {
            element.add_class(class.clone());
        }
        element
    }
}

/// Marker group to highlight converter.
///
/// The view callback runs once per marker on every render, so each marker
/// gets its own descriptor and two markers are never mistaken for one
/// element.
pub struct MarkerToHighlight {
    group: String,
    view: Box<dyn Fn(&Marker) -> HighlightDescriptor>,
}

impl MarkerToHighlight {
    pub fn new(
        group: impl Into<String>,
        view: impl Fn(&Marker) -> HighlightDescriptor + 'static,
    ) -> Self {
        Self {
            group: group.into(),
            view: Box::new(view),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn convert(&self, marker: &Marker) -> HighlightDescriptor {
        (self.view)(marker)
    }
}

/// A marker piece clipped to one block
struct Highlight {
    id: String,
    range: Range<usize>,
    descriptor: HighlightDescriptor,
}

impl Highlight {
    fn nesting_key(&self) -> (i32, usize, Reverse<usize>, &str) {
        (
            self.descriptor.priority,
            self.range.start,
            Reverse(self.range.end),
            self.id.as_str(),
        )
    }
}

struct Open {
    id: String,
    element: ViewElement,
}

/// Renders a document to view nodes: one `<p>` per block, with marker groups
/// that have a registered converter wrapped in highlight elements.
#[derive(Default)]
pub struct DowncastDispatcher {
    highlights: HashMap<String, MarkerToHighlight>,
}

impl DowncastDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter, replacing any earlier one for the same group
    pub fn add(&mut self, converter: MarkerToHighlight) {
        self.highlights.insert(converter.group.clone(), converter);
    }

    pub fn remove(&mut self, group: &str) -> Option<MarkerToHighlight> {
        self.highlights.remove(group)
    }

    pub fn render(&self, document: &Document) -> Vec<ViewNode> {
        let text = document.text();

        let markers: Vec<(Marker, HighlightDescriptor)> = document
            .markers()
            .iter()
            .filter_map(|marker| {
                let converter = self.highlights.get(marker.group())?;
                let descriptor = converter.convert(&marker);
                Some((marker, descriptor))
            })
            .collect();

        document
            .blocks()
            .into_iter()
            .map(|block| ViewNode::Element(render_block(&text, block, &markers)))
            .collect()
    }
}

fn render_block(
    text: &str,
    block: Range<usize>,
    markers: &[(Marker, HighlightDescriptor)],
) -> ViewElement {
    let mut pieces: Vec<Highlight> = Vec::new();
    let mut empties: Vec<Highlight> = Vec::new();

    for (marker, descriptor) in markers {
        let range = &marker.range;
        if range.is_empty() {
            if block.start <= range.start && range.start <= block.end {
                empties.push(Highlight {
                    id: marker.name.clone(),
                    range: range.clone(),
                    descriptor: descriptor.clone(),
                });
            }
            continue;
        }

        let start = range.start.max(block.start);
        let end = range.end.min(block.end);
        if start < end {
            pieces.push(Highlight {
                id: marker.name.clone(),
                range: start..end,
                descriptor: descriptor.clone(),
            });
        }
    }

    pieces.sort_by(|a, b| a.nesting_key().cmp(&b.nesting_key()));
    empties.sort_by(|a, b| a.nesting_key().cmp(&b.nesting_key()));

    let mut points: Vec<usize> = vec![block.start, block.end];
    for piece in &pieces {
        points.push(piece.range.start);
        points.push(piece.range.end);
    }
    points.extend(empties.iter().map(|empty| empty.range.start));
    points.sort_unstable();
    points.dedup();

    let mut paragraph = ViewElement::new("p");
    let mut stack: Vec<Open> = Vec::new();

    for window in points.windows(2) {
        let (from, to) = (window[0], window[1]);
        let wanted: Vec<&Highlight> = pieces
            .iter()
            .filter(|piece| piece.range.start <= from && to <= piece.range.end)
            .collect();

        let common = stack
            .iter()
            .zip(&wanted)
            .take_while(|(open, piece)| open.id == piece.id)
            .count();
        while stack.len() > common {
            close_top(&mut stack, &mut paragraph);
        }

        emit_empties(&empties, from, &mut stack, &mut paragraph);

        for piece in &wanted[common..] {
            stack.push(Open {
                id: piece.id.clone(),
                element: piece.descriptor.to_element(),
            });
        }

        append(&mut stack, &mut paragraph, ViewNode::text(&text[from..to]));
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut paragraph);
    }
    emit_empties(&empties, block.end, &mut stack, &mut paragraph);

    paragraph
}

fn emit_empties(empties: &[Highlight], at: usize, stack: &mut [Open], paragraph: &mut ViewElement) {
    for empty in empties.iter().filter(|empty| empty.range.start == at) {
        append(stack, paragraph, empty.descriptor.to_element().into());
    }
}

fn append(stack: &mut [Open], paragraph: &mut ViewElement, node: ViewNode) {
    match stack.last_mut() {
        Some(open) => open.element.children.push(node),
        None => paragraph.children.push(node),
    }
}

fn close_top(stack: &mut Vec<Open>, paragraph: &mut ViewElement) {
    if let Some(open) = stack.pop() {
        append(stack, paragraph, open.element.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::write_markup;

    fn zone_dispatcher() -> DowncastDispatcher {
        let mut dispatcher = DowncastDispatcher::new();
        dispatcher.add(MarkerToHighlight::new("zone", |_| HighlightDescriptor {
            element: "span".to_string(),
            classes: vec!["zone".to_string()],
            priority: -10,
        }));
        dispatcher
    }

    fn render(dispatcher: &DowncastDispatcher, doc: &Document) -> String {
        write_markup(&dispatcher.render(doc))
    }

    #[test]
    fn test_render_plain_blocks() {
        let doc = Document::from_text("a < b\n\nc");
        insta::assert_snapshot!(render(&zone_dispatcher(), &doc), @"<p>a &lt; b</p><p></p><p>c</p>");
    }

    #[test]
    fn test_render_wraps_marker_range() {
        let mut doc = Document::from_text("Dear Sam,");
        doc.add_marker("zone:1", 5..8).unwrap();
        insta::assert_snapshot!(
            render(&zone_dispatcher(), &doc),
            @r#"<p>Dear <span class="zone">Sam</span>,</p>"#
        );
    }

    #[test]
    fn test_render_ignores_groups_without_converter() {
        let mut doc = Document::from_text("abc");
        doc.add_marker("comment:1", 0..3).unwrap();
        assert_eq!(render(&zone_dispatcher(), &doc), "<p>abc</p>");
    }

    #[test]
    fn test_adjacent_markers_render_separately() {
        let mut doc = Document::from_text("abcd");
        doc.add_marker("zone:1", 0..2).unwrap();
        doc.add_marker("zone:2", 2..4).unwrap();
        insta::assert_snapshot!(
            render(&zone_dispatcher(), &doc),
            @r#"<p><span class="zone">ab</span><span class="zone">cd</span></p>"#
        );
    }

    #[test]
    fn test_nested_markers_render_nested() {
        let mut doc = Document::from_text("abc");
        doc.add_marker("zone:1", 1..2).unwrap();
        doc.add_marker("zone:2", 0..3).unwrap();
        insta::assert_snapshot!(
            render(&zone_dispatcher(), &doc),
            @r#"<p><span class="zone">a<span class="zone">b</span>c</span></p>"#
        );
    }

    #[test]
    fn test_overlapping_markers_split_inner_element() {
        let mut doc = Document::from_text("abcd");
        doc.add_marker("zone:1", 0..3).unwrap();
        doc.add_marker("zone:2", 1..4).unwrap();
        insta::assert_snapshot!(
            render(&zone_dispatcher(), &doc),
            @r#"<p><span class="zone">a<span class="zone">bc</span></span><span class="zone">d</span></p>"#
        );
    }

    #[test]
    fn test_marker_across_blocks_is_clipped_per_block() {
        let mut doc = Document::from_text("ab\ncd");
        doc.add_marker("zone:1", 1..4).unwrap();
        insta::assert_snapshot!(
            render(&zone_dispatcher(), &doc),
            @r#"<p>a<span class="zone">b</span></p><p><span class="zone">c</span>d</p>"#
        );
    }

    #[test]
    fn test_empty_marker_renders_empty_element() {
        let mut doc = Document::from_text("ab");
        doc.add_marker("zone:1", 1..1).unwrap();
        doc.add_marker("zone:2", 2..2).unwrap();
        insta::assert_snapshot!(
            render(&zone_dispatcher(), &doc),
            @r#"<p>a<span class="zone"></span>b<span class="zone"></span></p>"#
        );
    }

    #[test]
    fn test_view_callback_runs_for_every_marker() {
        use std::cell::Cell;
        use std::rc::Rc;

        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut dispatcher = DowncastDispatcher::new();
        dispatcher.add(MarkerToHighlight::new("zone", move |_| {
            counter.set(counter.get() + 1);
            HighlightDescriptor {
                element: "span".to_string(),
                classes: vec![],
                priority: 0,
            }
        }));

        let mut doc = Document::from_text("abcd");
        doc.add_marker("zone:1", 0..1).unwrap();
        doc.add_marker("zone:2", 2..3).unwrap();

        dispatcher.render(&doc);
        dispatcher.render(&doc);
        assert_eq!(calls.get(), 4);
    }
}
