// src/sanitizer/dom.rs

/// Tag of the synthetic element that owns the top-level nodes of a fragment.
/// It never appears in serialized output.
pub const FRAGMENT_ROOT: &str = "#fragment";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn text(data: impl Into<String>) -> Self {
        Node::Text(data.into())
    }

    pub fn element(tag: &str, attributes: Attributes, children: Vec<Node>) -> Self {
        Node::Element(Element {
            tag: tag.to_ascii_lowercase(),
            attributes,
            children,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Attributes,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str, attributes: Attributes) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes,
            children: Vec::new(),
        }
    }

    /// Appends text, extending the last child when it is already a text node.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_owned()));
        }
    }
}

/// Ordered attribute list with unique, lowercase names.
///
/// A repeated name overwrites the earlier value but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.0.retain(|(name, value)| keep(name, value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::empty();
        for (name, value) in iter {
            attributes.insert(name.as_ref(), value);
        }
        attributes
    }
}

/// Parsed markup snippet: a synthetic root owning the top-level nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub root: Element,
}

impl Fragment {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            root: Element {
                tag: FRAGMENT_ROOT.to_string(),
                attributes: Attributes::empty(),
                children,
            },
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.root.children
    }
}

/// Elements that never have content or an end tag.
pub fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_attribute_keeps_position_and_last_value() {
        let attributes: Attributes =
            [("class", "a"), ("TITLE", "t"), ("Class", "b")].into_iter().collect();

        let pairs: Vec<_> = attributes.iter().collect();
        assert_eq!(pairs, vec![("class", "b"), ("title", "t")]);
    }

    #[test]
    fn push_text_merges_adjacent_text() {
        let mut element = Element::new("P", Attributes::empty());
        element.push_text("Hello ");
        element.push_text("");
        element.push_text("World");

        assert_eq!(element.tag, "p");
        assert_eq!(element.children, vec![Node::text("Hello World")]);
    }
}
