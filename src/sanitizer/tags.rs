// src/sanitizer/tags.rs

use std::collections::HashSet;

use super::TextFilter;
use super::policy::Policy;
use super::token::{TokenKind, tokenize};

/// Removes the markers of every tag not in `allowed_tags`, keeping the text
/// between them in place. Comments and declarations are dropped.
///
/// Tag names in `allowed_tags` must be lowercase. Attributes of kept tags are
/// left untouched; they are checked later on the parsed tree.
pub fn strip_disallowed_tags(text: &str, allowed_tags: &HashSet<String>) -> String {
    let mut out = String::with_capacity(text.len());
    for token in tokenize(text) {
        let keep = match &token.kind {
            TokenKind::Text => true,
            TokenKind::StartTag(tag) => allowed_tags.contains(&tag.name),
            TokenKind::EndTag(name) => allowed_tags.contains(name),
            TokenKind::Comment => false,
        };
        if keep {
            out.push_str(token.raw);
        }
    }
    out
}

/// [`strip_disallowed_tags`] as a pipeline stage.
#[derive(Debug, Clone)]
pub struct TagAllowlist {
    allowed: HashSet<String>,
}

impl TagAllowlist {
    pub fn new(allowed: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            allowed: allowed
                .into_iter()
                .map(|tag| tag.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_policy(policy: &Policy) -> Self {
        Self::new(policy.tags())
    }
}

impl TextFilter for TagAllowlist {
    fn name(&self) -> &'static str {
        "tag-allowlist"
    }

    fn apply(&self, input: &str) -> String {
        strip_disallowed_tags(input, &self.allowed)
    }
}
