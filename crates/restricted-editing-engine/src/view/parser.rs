use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::view::{ViewElement, ViewNode};

/// Elements that never have content or a closing tag
pub(crate) const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "wbr"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    #[error("Unexpected closing tag </{name}> at byte {offset}")]
    UnexpectedClosingTag { name: String, offset: usize },

    #[error("Element <{name}> is never closed")]
    UnclosedElement { name: String },
}

fn tag_regex() -> &'static Regex {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    TAG_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#,
        )
        .expect("Invalid tag regex")
    })
}

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("Invalid attribute regex")
    })
}

/// Parse an HTML fragment into a view tree.
///
/// Only the subset needed for document data is understood: elements with
/// quoted or bare attributes, text with entities, comments (dropped) and void
/// elements. A `<` that does not start a tag is kept as text.
pub fn parse_markup(input: &str) -> Result<Vec<ViewNode>, MarkupError> {
    let mut root: Vec<ViewNode> = Vec::new();
    let mut open: Vec<ViewElement> = Vec::new();
    let mut last_end = 0;

    for captures in tag_regex().captures_iter(input) {
        let Some(whole) = captures.get(0) else {
            continue;
        };

        push_text(&mut root, &mut open, &input[last_end..whole.start()]);
        last_end = whole.end();

        let Some(name) = captures.get(2) else {
            // Comment
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();
        let closing = captures.get(1).is_some_and(|m| !m.as_str().is_empty());

        if closing {
            match open.pop() {
                Some(element) if element.name == name => append(&mut root, &mut open, element.into()),
                _ => {
                    return Err(MarkupError::UnexpectedClosingTag {
                        name,
                        offset: whole.start(),
                    });
                }
            }
            continue;
        }

        let mut element = ViewElement::new(name);
        if let Some(attributes) = captures.get(3) {
            parse_attributes(&mut element, attributes.as_str());
        }

        let self_closing = captures.get(4).is_some_and(|m| !m.as_str().is_empty());
        if self_closing || VOID_ELEMENTS.contains(&element.name.as_str()) {
            append(&mut root, &mut open, element.into());
        } else {
            open.push(element);
        }
    }

    push_text(&mut root, &mut open, &input[last_end..]);

    if let Some(element) = open.pop() {
        return Err(MarkupError::UnclosedElement { name: element.name });
    }

    Ok(root)
}

fn parse_attributes(element: &mut ViewElement, source: &str) {
    for captures in attribute_regex().captures_iter(source) {
        let Some(key) = captures.get(1) else {
            continue;
        };
        let key = key.as_str().to_ascii_lowercase();
        let raw = captures
            .get(2)
            .or_else(|| captures.get(3))
            .or_else(|| captures.get(4))
            .map_or("", |m| m.as_str());
        let value = html_escape::decode_html_entities(raw);

        if key == "class" {
            for class in value.split_whitespace() {
                element.add_class(class);
            }
        } else {
            element.attributes.insert(key, value.into_owned());
        }
    }
}

fn push_text(root: &mut Vec<ViewNode>, open: &mut [ViewElement], raw: &str) {
    if raw.is_empty() {
        return;
    }
    let text = html_escape::decode_html_entities(raw).into_owned();
    append(root, open, ViewNode::Text(text));
}

fn append(root: &mut Vec<ViewNode>, open: &mut [ViewElement], node: ViewNode) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.push(node),
    }
}
