// src/sanitizer/policy.rs

use std::collections::{BTreeMap, BTreeSet};

/// Allowed tags and, per tag, the allowed attribute names.
///
/// Tags absent from the table are disallowed. Names are stored lowercase and
/// looked up case-insensitively. A policy is built once and then only read;
/// share it behind an `Arc` instead of mutating it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    tags: BTreeMap<String, BTreeSet<String>>,
}

impl Policy {
    /// An empty policy: every tag is disallowed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows `tag` with the given attributes, replacing any earlier entry.
    pub fn allow_tag<'a>(mut self, tag: &str, attributes: impl IntoIterator<Item = &'a str>) -> Self {
        let attributes = attributes
            .into_iter()
            .map(str::to_ascii_lowercase)
            .collect();
        self.tags.insert(tag.to_ascii_lowercase(), attributes);
        self
    }

    /// The policy for advertisement creative markup.
    pub fn ad_markup() -> Self {
        Policy::new()
            .allow_tag("p", [])
            .allow_tag("br", [])
            .allow_tag("strong", [])
            .allow_tag("b", [])
            .allow_tag("em", [])
            .allow_tag("i", [])
            .allow_tag("a", ["href", "title", "target"])
            .allow_tag("img", ["src", "alt", "width", "height", "class"])
            .allow_tag("div", ["class"])
            .allow_tag("span", ["class"])
    }

    pub fn allows_tag(&self, tag: &str) -> bool {
        self.attributes_for(tag).is_some()
    }

    pub fn allows_attribute(&self, tag: &str, attribute: &str) -> bool {
        self.attributes_for(tag)
            .is_some_and(|allowed| allowed.contains(&attribute.to_ascii_lowercase()))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    fn attributes_for(&self, tag: &str) -> Option<&BTreeSet<String>> {
        self.tags.get(&tag.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ad_markup_table() {
        let policy = Policy::ad_markup();
        let tags: Vec<_> = policy.tags().collect();
        assert_eq!(
            tags,
            vec!["a", "b", "br", "div", "em", "i", "img", "p", "span", "strong"]
        );
        assert!(policy.allows_attribute("a", "href"));
        assert!(policy.allows_attribute("IMG", "Class"));
        assert!(!policy.allows_attribute("p", "class"));
        assert!(!policy.allows_attribute("a", "onclick"));
        assert!(!policy.allows_tag("script"));
        assert!(!policy.allows_attribute("script", "src"));
    }

    #[test]
    fn empty_policy_denies_everything() {
        let policy = Policy::new();
        assert!(!policy.allows_tag("p"));
        assert_eq!(policy.tags().count(), 0);
    }
}
