// src/sanitizer/prefilter.rs

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::TextFilter;

fn script_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex"))
}

fn dangerous_scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // A quoted value starting with the scheme is emptied, its quotes kept.
        Regex::new(
            r#"(?i)"\s*(?:javascript|data|vbscript)\s*:[^"]*"|'\s*(?:javascript|data|vbscript)\s*:[^']*'|(?:javascript|data|vbscript)\s*:"#,
        )
        .expect("valid regex")
    })
}

fn event_handler_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\bon\w+\s*=\s*(?:"[^"]*"|'[^']*')"#).expect("valid regex")
    })
}

/// Textual removal of script blocks, dangerous URL schemes and inline event
/// handlers, independent of any markup structure.
///
/// Runs until nothing more matches, so a removal never leaves behind a new
/// match spliced together from its surroundings.
pub fn prefilter(raw: &str) -> String {
    let mut current = raw.to_owned();
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(input: &str) -> String {
    let without_scripts = script_block_regex().replace_all(input, "");
    let without_schemes =
        dangerous_scheme_regex().replace_all(&without_scripts, |caps: &Captures<'_>| {
            match caps[0].chars().next() {
                Some(quote @ ('"' | '\'')) => format!("{quote}{quote}"),
                _ => String::new(),
            }
        });
    event_handler_regex()
        .replace_all(&without_schemes, "")
        .into_owned()
}

/// [`prefilter`] as a pipeline stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prefilter;

impl TextFilter for Prefilter {
    fn name(&self) -> &'static str {
        "prefilter"
    }

    fn apply(&self, input: &str) -> String {
        prefilter(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_script_blocks_with_content() {
        assert_eq!(
            prefilter("<p>Hello <script>alert(1)</script>World</p>"),
            "<p>Hello World</p>"
        );
        assert_eq!(
            prefilter("a<SCRIPT type=\"text/javascript\">\nx()\n</Script >b<script>y</script>c"),
            "abc"
        );
    }

    #[test]
    fn script_match_is_non_greedy() {
        assert_eq!(
            prefilter("<script>a</script>keep<script>b</script>"),
            "keep"
        );
    }

    #[test]
    fn removes_quoted_dangerous_values() {
        assert_eq!(
            prefilter(r#"<a href="javascript:alert(1)">x</a>"#),
            r#"<a href="">x</a>"#
        );
        assert_eq!(
            prefilter("<img src=' DATA:text/html;base64,xx'>"),
            "<img src=''>"
        );
        assert_eq!(prefilter("<a href=VBScript :msgbox>"), "<a href=msgbox>");
    }

    #[test]
    fn emptied_value_keeps_following_attributes_apart() {
        assert_eq!(
            prefilter(r#"<a href="javascript:alert(1)" title="t">x</a>"#),
            r#"<a href="" title="t">x</a>"#
        );
        assert_eq!(
            prefilter(r#"<a href='vbscript:x' target="_blank">go</a>"#),
            r#"<a href='' target="_blank">go</a>"#
        );
    }

    #[test]
    fn removes_event_handlers() {
        assert_eq!(
            prefilter(r#"<img src="a.png" onerror="alert(1)" ONCLICK='bad()'>"#),
            r#"<img src="a.png"  >"#
        );
        assert_eq!(prefilter(r#"<b buttons="x">"#), r#"<b buttons="x">"#);
    }

    #[test]
    fn removal_cannot_splice_a_new_match() {
        assert_eq!(prefilter("<scr<script></script>ipt>x</script>"), "");
        assert_eq!(prefilter("javadata:script:x"), "x");
    }

    #[test]
    fn plain_text_is_untouched() {
        let text = "Buy one, get one free: only today!";
        assert_eq!(prefilter(text), text);
    }
}
