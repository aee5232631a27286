use std::ops::Range;

use crate::conversion::{Consumable, ModelFragment, ModelNode};
use crate::view::{Pattern, ViewElement, ViewNode};

/// Registration priority; higher priorities are tried first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Priority {
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    Highest,
}

/// Outcome of offering an element to a converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// The converter claimed the element; `range` is the converted content in
    /// the fragment and the cursor moves to its end
    Consumed { range: Range<usize> },
    /// Not for this converter; the next one gets a try
    NotConsumed,
}

/// Handle returned by [`UpcastDispatcher::add`]; pass it back to remove the
/// converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConverterId(u64);

/// Markup element to model converter
pub trait UpcastConverter {
    fn convert(&self, element: &ViewElement, cx: &mut UpcastContext<'_>) -> Conversion;
}

struct Registered {
    id: ConverterId,
    priority: Priority,
    converter: Box<dyn UpcastConverter>,
}

/// Ordered registry of upcast converters.
///
/// Text is converted directly. Every element is offered to the registered
/// converters from highest to lowest priority (registration order within a
/// priority) until one consumes it; unclaimed elements are unwrapped and only
/// their children are converted.
pub struct UpcastDispatcher {
    next_id: u64,
    converters: Vec<Registered>,
}

impl Default for UpcastDispatcher {
    fn default() -> Self {
        let mut dispatcher = Self {
            next_id: 0,
            converters: Vec::new(),
        };
        dispatcher.add(Priority::Low, ParagraphUpcast);
        dispatcher
    }
}

impl UpcastDispatcher {
    /// A dispatcher with the built-in paragraph converter
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        priority: Priority,
        converter: impl UpcastConverter + 'static,
    ) -> ConverterId {
        let id = ConverterId(self.next_id);
        self.next_id += 1;
        let index = self
            .converters
            .iter()
            .position(|registered| registered.priority < priority)
            .unwrap_or(self.converters.len());
        self.converters.insert(
            index,
            Registered {
                id,
                priority,
                converter: Box::new(converter),
            },
        );
        id
    }

    /// Returns false if the converter was already removed
    pub fn remove(&mut self, id: ConverterId) -> bool {
        let before = self.converters.len();
        self.converters.retain(|registered| registered.id != id);
        self.converters.len() != before
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Convert a list of view nodes into a model fragment
    pub fn convert(&self, nodes: &[ViewNode]) -> ModelFragment {
        let mut cx = UpcastContext {
            converters: &self.converters,
            nodes: Vec::new(),
            consumable: Consumable::new(),
            cursor: 0,
            has_content: false,
            pending_break: false,
        };
        for node in nodes {
            cx.convert_node(node);
        }
        log::debug!("upcast produced {} model nodes", cx.nodes.len());
        ModelFragment { nodes: cx.nodes }
    }
}

/// State of one conversion run, handed to each converter
pub struct UpcastContext<'a> {
    converters: &'a [Registered],
    nodes: Vec<ModelNode>,
    pub consumable: Consumable,
    cursor: usize,
    has_content: bool,
    pending_break: bool,
}

impl UpcastContext<'_> {
    /// Where the next converted node goes
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Convert all children of `element` at the cursor and return the range
    /// they occupy
    pub fn convert_children(&mut self, element: &ViewElement) -> Range<usize> {
        let start = self.cursor;
        for child in &element.children {
            self.convert_node(child);
        }
        start..self.cursor
    }

    /// Insert a node at an arbitrary position without moving the cursor.
    ///
    /// Positions after `at` shift by one, so callers inserting several nodes
    /// should go from the last position to the first.
    pub fn insert(&mut self, at: usize, node: ModelNode) {
        self.nodes.insert(at, node);
        self.has_content = true;
    }

    /// Insert a node at the cursor and move the cursor past it
    pub fn push(&mut self, node: ModelNode) {
        self.begin_inline();
        self.nodes.insert(self.cursor, node);
        self.cursor += 1;
        self.has_content = true;
    }

    /// Start a new block: separate it from any previous content
    pub fn open_block(&mut self) {
        self.pending_break = false;
        if self.has_content {
            self.nodes.insert(self.cursor, ModelNode::BlockBreak);
            self.cursor += 1;
        }
        self.has_content = true;
    }

    /// End the current block: following inline content starts a new one
    pub fn close_block(&mut self) {
        self.pending_break = true;
    }

    /// Inline content follows: if a block was just closed, start a new one
    pub fn begin_inline(&mut self) {
        if self.pending_break {
            self.pending_break = false;
            self.nodes.insert(self.cursor, ModelNode::BlockBreak);
            self.cursor += 1;
        }
    }

    fn convert_node(&mut self, node: &ViewNode) {
        match node {
            ViewNode::Text(text) => self.convert_text(text),
            ViewNode::Element(element) => self.convert_element(element),
        }
    }

    fn convert_text(&mut self, text: &str) {
        // Formatting whitespace between tags
        if text.contains('\n') && text.trim().is_empty() {
            return;
        }
        let text = text.replace(['\r', '\n'], " ");
        self.push(ModelNode::Text(text));
    }

    fn convert_element(&mut self, element: &ViewElement) {
        let converters = self.converters;
        for registered in converters {
            match registered.converter.convert(element, self) {
                Conversion::Consumed { range } => {
                    self.cursor = range.end;
                    return;
                }
                Conversion::NotConsumed => {}
            }
        }

        log::trace!("no converter for <{}>, converting children only", element.name);
        self.convert_children(element);
    }
}

/// `<p>` to a model block
pub struct ParagraphUpcast;

impl UpcastConverter for ParagraphUpcast {
    fn convert(&self, element: &ViewElement, cx: &mut UpcastContext<'_>) -> Conversion {
        let Some(matched) = Pattern::element("p").matches(element) else {
            return Conversion::NotConsumed;
        };
        if !cx.consumable.consume(element, &matched) {
            return Conversion::NotConsumed;
        }

        cx.open_block();
        let range = cx.convert_children(element);
        cx.close_block();

        Conversion::Consumed { range }
    }
}

/// Names a marker for a matched element
pub type MarkerNamer = Box<dyn Fn(&ViewElement) -> String>;

/// Converts a matching element into a marker around its converted children.
///
/// The element itself leaves no trace in the model apart from two boundary
/// placeholders.
pub struct ElementToMarker {
    pattern: Pattern,
    name: MarkerNamer,
}

impl ElementToMarker {
    pub fn new(pattern: Pattern, name: impl Fn(&ViewElement) -> String + 'static) -> Self {
        Self {
            pattern,
            name: Box::new(name),
        }
    }
}

impl UpcastConverter for ElementToMarker {
    fn convert(&self, element: &ViewElement, cx: &mut UpcastContext<'_>) -> Conversion {
        let Some(matched) = self.pattern.matches(element) else {
            return Conversion::NotConsumed;
        };
        if !cx.consumable.test(element, &matched) {
            return Conversion::NotConsumed;
        }

        cx.begin_inline();
        let content = cx.convert_children(element);
        cx.consumable.consume(element, &matched);

        let name = (self.name)(element);
        log::debug!("upcast <{}> to marker {name}", element.name);

        // End first, so `content.start` is still valid for the start boundary
        cx.insert(content.end, ModelNode::MarkerBoundary { name: name.clone() });
        cx.insert(content.start, ModelNode::MarkerBoundary { name });

        Conversion::Consumed {
            range: content.start..content.end + 2,
        }
    }
}
