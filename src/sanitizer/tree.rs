// src/sanitizer/tree.rs

use std::sync::Arc;

use super::TreeFilter;
use super::dom::{Element, Fragment, Node};
use super::policy::Policy;
use super::prefilter::prefilter;
use super::url::{is_safe_url, is_url_attribute};

/// Enforces `policy` on every element below the synthetic root.
///
/// Elements with a tag outside the policy are removed together with their
/// whole subtree, text included. Kept elements lose every attribute the
/// policy does not list for their tag, and `href`/`src` values that fail URL
/// validation.
pub fn sanitize_tree(fragment: &mut Fragment, policy: &Policy) {
    sanitize_children(&mut fragment.root.children, policy);
}

fn sanitize_children(children: &mut Vec<Node>, policy: &Policy) {
    children.retain(|node| match node {
        Node::Element(element) => policy.allows_tag(&element.tag),
        Node::Text(_) => true,
    });
    for node in children.iter_mut() {
        if let Node::Element(element) = node {
            sanitize_element(element, policy);
        }
    }
}

fn sanitize_element(element: &mut Element, policy: &Policy) {
    let Element {
        tag,
        attributes,
        children,
    } = element;
    let tag = tag.as_str();
    attributes.retain(|name, value| {
        policy.allows_attribute(tag, name) && (!is_url_attribute(name) || is_safe_url(value))
    });
    sanitize_children(children, policy);
}

/// [`sanitize_tree`] as a pipeline stage.
#[derive(Debug, Clone)]
pub struct PolicyEnforcer {
    policy: Arc<Policy>,
}

impl PolicyEnforcer {
    pub fn new(policy: Arc<Policy>) -> Self {
        Self { policy }
    }
}

impl TreeFilter for PolicyEnforcer {
    fn name(&self) -> &'static str {
        "policy"
    }

    fn apply(&self, fragment: &mut Fragment) {
        sanitize_tree(fragment, &self.policy);
    }
}

/// Merges adjacent text nodes and runs [`prefilter`] over the merged text.
///
/// Markup dropped during parsing (stray end tags) or by earlier tree stages
/// can leave two text runs side by side that only match a filter pattern once
/// joined.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextScrub;

impl TreeFilter for TextScrub {
    fn name(&self) -> &'static str {
        "text-scrub"
    }

    fn apply(&self, fragment: &mut Fragment) {
        scrub_children(&mut fragment.root.children);
    }
}

fn scrub_children(children: &mut Vec<Node>) {
    let mut merged: Vec<Node> = Vec::with_capacity(children.len());
    for node in children.drain(..) {
        if let Node::Text(text) = &node {
            if let Some(Node::Text(previous)) = merged.last_mut() {
                previous.push_str(text);
                continue;
            }
        }
        merged.push(node);
    }

    for node in merged.iter_mut() {
        match node {
            Node::Text(text) => *text = prefilter(text),
            Node::Element(element) => scrub_children(&mut element.children),
        }
    }
    merged.retain(|node| !matches!(node, Node::Text(text) if text.is_empty()));
    *children = merged;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitizer::dom::Attributes;

    fn element(tag: &str, attributes: &[(&str, &str)], children: Vec<Node>) -> Node {
        Node::element(tag, attributes.iter().copied().collect(), children)
    }

    #[test]
    fn deletes_disallowed_subtrees_with_text() {
        let mut fragment = Fragment::new(vec![
            Node::text("keep "),
            element("script", &[], vec![Node::text("alert(1)")]),
            element(
                "p",
                &[],
                vec![element("iframe", &[("src", "/x")], vec![Node::text("gone")])],
            ),
        ]);
        sanitize_tree(&mut fragment, &Policy::ad_markup());

        let expected = vec![Node::text("keep "), element("p", &[], vec![])];
        assert_eq!(fragment.children(), expected.as_slice());
    }

    #[test]
    fn strips_attributes_outside_policy() {
        let mut fragment = Fragment::new(vec![element(
            "img",
            &[
                ("src", "http://x.com/a.png"),
                ("onerror", "alert(1)"),
                ("style", "x"),
                ("alt", "Ad"),
            ],
            vec![],
        )]);
        sanitize_tree(&mut fragment, &Policy::ad_markup());

        let expected = vec![element(
            "img",
            &[("src", "http://x.com/a.png"), ("alt", "Ad")],
            vec![],
        )];
        assert_eq!(fragment.children(), expected.as_slice());
    }

    #[test]
    fn validates_url_attributes_independently() {
        let mut fragment = Fragment::new(vec![element(
            "a",
            &[
                ("href", "javascript:alert(1)"),
                ("title", "javascript:is text here"),
                ("target", "_blank"),
            ],
            vec![Node::text("click")],
        )]);
        sanitize_tree(&mut fragment, &Policy::ad_markup());

        let expected = vec![element(
            "a",
            &[("title", "javascript:is text here"), ("target", "_blank")],
            vec![Node::text("click")],
        )];
        assert_eq!(fragment.children(), expected.as_slice());
    }

    #[test]
    fn root_is_not_subject_to_policy() {
        let mut fragment = Fragment::new(vec![Node::text("plain")]);
        sanitize_tree(&mut fragment, &Policy::new());
        assert_eq!(fragment.children(), &[Node::text("plain")]);
    }

    #[test]
    fn text_scrub_merges_and_filters() {
        let mut fragment = Fragment::new(vec![
            Node::text("java"),
            Node::text("script:go"),
            element(
                "b",
                &[],
                vec![Node::text("x onmouseover="), Node::text("'y' z")],
            ),
            Node::text(""),
        ]);
        TextScrub.apply(&mut fragment);

        let expected = vec![
            Node::text("go"),
            Node::Element(Element {
                tag: "b".to_string(),
                attributes: Attributes::empty(),
                children: vec![Node::text("x  z")],
            }),
        ];
        assert_eq!(fragment.children(), expected.as_slice());
    }
}
