// src/sanitizer/parser.rs

use super::dom::{Attributes, Element, FRAGMENT_ROOT, Fragment, Node, is_void};
use super::token::{StartTag, TokenKind, tokenize};

/// Open elements beyond this depth are not created; their text still is.
pub const MAX_DEPTH: usize = 256;

/// Start tags that close a `p` which is the current element.
fn closes_paragraph(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "div"
            | "dl"
            | "fieldset"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "menu"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "ul"
    )
}

/// Parses a markup fragment into a tree. Never fails.
///
/// Recovery is best effort: stray end tags are ignored, an end tag closes
/// every element opened after its start tag, a block start tag closes an open
/// paragraph, a nested `a` closes the outer one and everything still open at
/// the end of input is closed.
pub fn parse(text: &str) -> Fragment {
    let mut builder = TreeBuilder::new();
    for token in tokenize(text) {
        match token.kind {
            TokenKind::Text => builder.current_mut().push_text(token.raw),
            TokenKind::StartTag(tag) => builder.open(tag),
            TokenKind::EndTag(name) => builder.close(&name),
            TokenKind::Comment => {}
        }
    }
    builder.finish()
}

struct TreeBuilder {
    root: Element,
    /// Elements whose end tag has not been seen yet, innermost last.
    open: Vec<Element>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            root: Element::new(FRAGMENT_ROOT, Attributes::empty()),
            open: Vec::new(),
        }
    }

    fn current_mut(&mut self) -> &mut Element {
        match self.open.last_mut() {
            Some(element) => element,
            None => &mut self.root,
        }
    }

    fn open(&mut self, tag: StartTag) {
        if tag.name == "a" && self.is_open("a") {
            self.close("a");
        }
        if closes_paragraph(&tag.name) && self.current_tag() == Some("p") {
            self.pop();
        }

        let attributes: Attributes = tag.attributes.into_iter().collect();
        let element = Element::new(&tag.name, attributes);
        if is_void(&element.tag) {
            self.current_mut().children.push(Node::Element(element));
        } else if self.open.len() >= MAX_DEPTH {
            tracing::trace!(tag = %element.tag, "nesting limit reached, start tag ignored");
        } else {
            self.open.push(element);
        }
    }

    fn close(&mut self, name: &str) {
        if is_void(name) {
            return;
        }
        if let Some(position) = self.open.iter().rposition(|element| element.tag == name) {
            while self.open.len() > position {
                self.pop();
            }
        }
    }

    fn is_open(&self, name: &str) -> bool {
        self.open.iter().any(|element| element.tag == name)
    }

    fn current_tag(&self) -> Option<&str> {
        self.open.last().map(|element| element.tag.as_str())
    }

    fn pop(&mut self) {
        if let Some(element) = self.open.pop() {
            self.current_mut().children.push(Node::Element(element));
        }
    }

    fn finish(mut self) -> Fragment {
        while !self.open.is_empty() {
            self.pop();
        }
        Fragment { root: self.root }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, attributes: &[(&str, &str)], children: Vec<Node>) -> Node {
        Node::element(tag, attributes.iter().copied().collect(), children)
    }

    #[test]
    fn builds_nested_tree() {
        let fragment = parse(r#"<div class=nothing><p>Hello, <b>world</b></p></div>"#);
        let expected = vec![element(
            "div",
            &[("class", "nothing")],
            vec![element(
                "p",
                &[],
                vec![
                    Node::text("Hello, "),
                    element("b", &[], vec![Node::text("world")]),
                ],
            )],
        )];
        assert_eq!(fragment.children(), expected.as_slice());
        assert_eq!(fragment.root.tag, FRAGMENT_ROOT);
    }

    #[test]
    fn closes_unclosed_and_mismatched_tags() {
        let fragment = parse("<b><i>x</b>y<p>z");
        let expected = vec![
            element("b", &[], vec![element("i", &[], vec![Node::text("x")])]),
            Node::text("y"),
            element("p", &[], vec![Node::text("z")]),
        ];
        assert_eq!(fragment.children(), expected.as_slice());
    }

    #[test]
    fn ignores_stray_end_tags_and_merges_text() {
        let fragment = parse("java</p>script</br>");
        assert_eq!(fragment.children(), &[Node::text("javascript")]);
    }

    #[test]
    fn void_elements_take_no_children() {
        let fragment = parse(r#"<img src="a.png">after<br>x"#);
        let expected = vec![
            element("img", &[("src", "a.png")], vec![]),
            Node::text("after"),
            element("br", &[], vec![]),
            Node::text("x"),
        ];
        assert_eq!(fragment.children(), expected.as_slice());
    }

    #[test]
    fn block_start_closes_paragraph() {
        let fragment = parse("<p>one<div>two</div><p>three");
        let expected = vec![
            element("p", &[], vec![Node::text("one")]),
            element("div", &[], vec![Node::text("two")]),
            element("p", &[], vec![Node::text("three")]),
        ];
        assert_eq!(fragment.children(), expected.as_slice());
    }

    #[test]
    fn nested_anchor_closes_outer_anchor() {
        let fragment = parse(r#"<a href="/1"><b>one<a href="/2">two</a>"#);
        let expected = vec![
            element(
                "a",
                &[("href", "/1")],
                vec![element("b", &[], vec![Node::text("one")])],
            ),
            element("a", &[("href", "/2")], vec![Node::text("two")]),
        ];
        assert_eq!(fragment.children(), expected.as_slice());
    }

    #[test]
    fn duplicate_attributes_last_write_wins() {
        let fragment = parse(r#"<span CLASS="a" class="b">x</span>"#);
        let expected = vec![element("span", &[("class", "b")], vec![Node::text("x")])];
        assert_eq!(fragment.children(), expected.as_slice());
    }

    #[test]
    fn nesting_is_bounded() {
        let input = "<b>".repeat(MAX_DEPTH + 10) + "deep";
        let fragment = parse(&input);

        let mut depth = 0;
        let mut nodes = fragment.children();
        while let Some(Node::Element(element)) = nodes.first() {
            depth += 1;
            nodes = &element.children;
        }
        assert_eq!(depth, MAX_DEPTH);
        assert_eq!(nodes, &[Node::text("deep")]);
    }

    #[test]
    fn empty_input_gives_empty_fragment() {
        assert!(parse("").children().is_empty());
    }
}
