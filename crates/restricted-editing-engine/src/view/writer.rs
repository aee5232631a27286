use crate::view::parser::VOID_ELEMENTS;
use crate::view::{ViewElement, ViewNode};

/// Serialize view nodes back to HTML
pub fn write_markup(nodes: &[ViewNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &ViewNode) {
    match node {
        ViewNode::Text(text) => out.push_str(&html_escape::encode_text(text)),
        ViewNode::Element(element) => write_element(out, element),
    }
}

fn write_element(out: &mut String, element: &ViewElement) {
    out.push('<');
    out.push_str(&element.name);

    if !element.classes.is_empty() {
        write_attribute(out, "class", &element.classes.join(" "));
    }
    for (key, value) in &element.attributes {
        write_attribute(out, key, value);
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.name.as_str()) && element.children.is_empty() {
        return;
    }

    for child in &element.children {
        write_node(out, child);
    }

    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn write_attribute(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&html_escape::encode_double_quoted_attribute(value));
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::parse_markup;

    #[test]
    fn test_write_escapes_text_and_attributes() {
        let element = ViewElement::new("span")
            .with_class("a")
            .with_attribute("title", "say \"hi\"")
            .with_child(ViewNode::text("1 < 2 & 3"));

        insta::assert_snapshot!(
            write_markup(&[element.into()]),
            @r#"<span class="a" title="say &quot;hi&quot;">1 &lt; 2 &amp; 3</span>"#
        );
    }

    #[test]
    fn test_write_void_element() {
        let p = ViewElement::new("p")
            .with_child(ViewNode::text("a"))
            .with_child(ViewElement::new("br"))
            .with_child(ViewNode::text("b"));

        assert_eq!(write_markup(&[p.into()]), "<p>a<br>b</p>");
    }

    #[test]
    fn test_parse_then_write_is_stable() {
        let source = r#"<p>Hello <span class="exception-marker">wo&amp;rld</span></p><p></p>"#;
        let nodes = parse_markup(source).unwrap();
        assert_eq!(write_markup(&nodes), source);
    }
}
