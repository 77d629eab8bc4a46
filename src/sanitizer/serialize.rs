// src/sanitizer/serialize.rs

use super::dom::{Fragment, Node, is_void};

/// Renders the fragment's top-level nodes back to markup, without the
/// synthetic root, trimmed of surrounding whitespace.
///
/// Attribute values are always double-quoted. `<`, `>`, `"` and `'` are
/// escaped in text and attribute values; existing character references are
/// written back unchanged, so re-parsing the output yields the same tree.
pub fn serialize(fragment: &Fragment) -> String {
    let mut out = String::new();
    for node in fragment.children() {
        write_node(&mut out, node);
    }
    out.trim().to_string()
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => escape_into(out, text),
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in element.attributes.iter() {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(out, value);
                out.push('"');
            }
            out.push('>');
            if is_void(&element.tag) {
                return;
            }
            for child in &element.children {
                write_node(out, child);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
