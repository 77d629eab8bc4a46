// src/sanitizer/mod.rs

//! Sanitizer for untrusted advertisement markup.
//!
//! Raw text goes through an ordered list of stages:
//!
//! 1. text filters: [`prefilter`] then [`strip_disallowed_tags`],
//! 2. [`parse`] into a [`Fragment`],
//! 3. tree filters: [`sanitize_tree`] then the text scrub,
//! 4. [`serialize`].
//!
//! Every stage only removes content, except the serializer which normalizes
//! quoting and escaping. The output contains no tag, attribute or URL the
//! [`Policy`] does not allow.

pub mod dom;
pub mod parser;
pub mod policy;
pub mod prefilter;
pub mod serialize;
pub mod tags;
pub mod token;
pub mod tree;
pub mod url;

use std::sync::{Arc, OnceLock};

pub use dom::{Attributes, Element, Fragment, Node};
pub use parser::parse;
pub use policy::Policy;
pub use prefilter::{Prefilter, prefilter};
pub use serialize::serialize;
pub use tags::{TagAllowlist, strip_disallowed_tags};
pub use tree::{PolicyEnforcer, TextScrub, sanitize_tree};
pub use self::url::is_safe_url;

/// Upper bound on rounds of the text filters. Each round of the default
/// filters only deletes, so rounds stop early once nothing changes.
const MAX_TEXT_ROUNDS: usize = 32;

/// Upper bound on full pipeline runs while waiting for a fixed point.
const MAX_PASSES: usize = 4;

/// A string-to-string stage run before parsing.
pub trait TextFilter: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, input: &str) -> String;
}

/// A stage that edits the parsed tree in place.
pub trait TreeFilter: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, fragment: &mut Fragment);
}

/// An ordered pipeline of filters around the fragment parser.
///
/// Holds no per-call state; share one instance across threads.
pub struct Sanitizer {
    text_filters: Vec<Box<dyn TextFilter>>,
    tree_filters: Vec<Box<dyn TreeFilter>>,
}

impl Sanitizer {
    /// The default pipeline for `policy`.
    pub fn new(policy: Policy) -> Self {
        let policy = Arc::new(policy);
        Self::builder()
            .text_filter(Prefilter)
            .text_filter(TagAllowlist::from_policy(&policy))
            .tree_filter(PolicyEnforcer::new(policy))
            .tree_filter(TextScrub)
            .build()
    }

    /// An empty pipeline; the output is the parsed and re-serialized input.
    pub fn builder() -> SanitizerBuilder {
        SanitizerBuilder::default()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.text_filters
            .iter()
            .map(|f| f.name())
            .chain(["parse"])
            .chain(self.tree_filters.iter().map(|f| f.name()))
            .chain(["serialize"])
            .collect()
    }

    /// Sanitizes `raw`. Never fails; the result may be empty.
    ///
    /// The pipeline is re-run on its own output until it stops changing, so
    /// sanitizing an already sanitized string returns it unchanged.
    pub fn sanitize(&self, raw: &str) -> String {
        let mut current = self.run(raw);
        for pass in 1..MAX_PASSES {
            let next = self.run(&current);
            if next == current {
                break;
            }
            tracing::trace!(pass, "sanitized output not yet stable");
            current = next;
        }
        current
    }

    fn run(&self, raw: &str) -> String {
        let text = self.run_text_filters(raw);
        let mut fragment = parse(&text);
        for filter in &self.tree_filters {
            filter.apply(&mut fragment);
        }
        serialize(&fragment)
    }

    fn run_text_filters(&self, raw: &str) -> String {
        let mut current = raw.to_owned();
        for _ in 0..MAX_TEXT_ROUNDS {
            let next = self
                .text_filters
                .iter()
                .fold(current.clone(), |text, filter| filter.apply(&text));
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Sanitizer::new(Policy::ad_markup())
    }
}

impl std::fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sanitizer")
            .field("stages", &self.stage_names())
            .finish()
    }
}

#[derive(Default)]
pub struct SanitizerBuilder {
    text_filters: Vec<Box<dyn TextFilter>>,
    tree_filters: Vec<Box<dyn TreeFilter>>,
}

impl SanitizerBuilder {
    pub fn text_filter(mut self, filter: impl TextFilter + 'static) -> Self {
        self.text_filters.push(Box::new(filter));
        self
    }

    pub fn tree_filter(mut self, filter: impl TreeFilter + 'static) -> Self {
        self.tree_filters.push(Box::new(filter));
        self
    }

    pub fn build(self) -> Sanitizer {
        Sanitizer {
            text_filters: self.text_filters,
            tree_filters: self.tree_filters,
        }
    }
}

/// Sanitizes advertisement markup with the default [`Policy::ad_markup`]
/// pipeline. Always returns a string, possibly empty.
pub fn sanitize_ad_markup(raw: &str) -> String {
    static SANITIZER: OnceLock<Sanitizer> = OnceLock::new();
    SANITIZER.get_or_init(Sanitizer::default).sanitize(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stage_order() {
        assert_eq!(
            Sanitizer::default().stage_names(),
            vec![
                "prefilter",
                "tag-allowlist",
                "parse",
                "policy",
                "text-scrub",
                "serialize"
            ]
        );
    }

    #[test]
    fn empty_pipeline_only_normalizes() {
        let sanitizer = Sanitizer::builder().build();
        assert_eq!(
            sanitizer.sanitize("<script>x</script><P CLASS=a>"),
            r#"<script>x</script><p class="a"></p>"#
        );
    }

    #[test]
    fn custom_policy_is_respected() {
        let sanitizer = Sanitizer::new(Policy::new().allow_tag("em", []));
        assert_eq!(
            sanitizer.sanitize("<p><em class=x>hi</em></p>"),
            "<em>hi</em>"
        );
    }

    #[test]
    fn obfuscated_script_is_never_emitted() {
        let output = sanitize_ad_markup("<scr<script>x</script>ipt>alert(1)</scr<b></b>ipt>");
        assert!(!output.to_ascii_lowercase().contains("<script"));
    }

    #[test]
    fn sanitizer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Sanitizer>();
    }
}
