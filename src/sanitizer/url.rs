// src/sanitizer/url.rs

use std::sync::OnceLock;

use regex::{Captures, Regex};

const DANGEROUS_SCHEMES: [&str; 3] = ["javascript:", "data:", "vbscript:"];

/// Attributes whose value is resolved as a URL.
pub fn is_url_attribute(name: &str) -> bool {
    name.eq_ignore_ascii_case("href") || name.eq_ignore_ascii_case("src")
}

/// Whether a URL attribute value may be kept.
///
/// Accepted values start (after leading whitespace) with `http://`,
/// `https://`, `/`, `./` or an ASCII letter or digit. A dangerous scheme
/// rejects the value even when it was accepted.
pub fn is_safe_url(value: &str) -> bool {
    is_accepted(value) && !is_rejected(value)
}

fn is_accepted(value: &str) -> bool {
    let value = value.trim_start();
    value.starts_with("http://")
        || value.starts_with("https://")
        || value.starts_with('/')
        || value.starts_with("./")
        || value.starts_with(|c: char| c.is_ascii_alphanumeric())
}

fn is_rejected(value: &str) -> bool {
    has_dangerous_scheme(value.trim_start()) || has_dangerous_scheme(&normalize(value))
}

fn has_dangerous_scheme(value: &str) -> bool {
    DANGEROUS_SCHEMES.iter().any(|scheme| {
        value
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// The value as a browser sees it before resolving the URL: character
/// references decoded, ASCII whitespace and control characters dropped.
fn normalize(value: &str) -> String {
    decode_character_references(value)
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect()
}

fn character_reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)&#x([0-9a-f]+);?|&#([0-9]+);?|&([a-z]+);").expect("valid regex")
    })
}

fn decode_character_references(value: &str) -> String {
    character_reference_regex()
        .replace_all(value, |caps: &Captures| {
            let decoded = if let Some(hex) = caps.get(1) {
                Some(decode_code_point(hex.as_str(), 16))
            } else if let Some(decimal) = caps.get(2) {
                Some(decode_code_point(decimal.as_str(), 10))
            } else {
                caps.get(3).and_then(|name| named_reference(name.as_str()))
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn decode_code_point(digits: &str, radix: u32) -> char {
    // Out-of-range references decode to U+FFFD, as in a browser.
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn named_reference(name: &str) -> Option<char> {
    let c = match name.to_ascii_lowercase().as_str() {
        "colon" => ':',
        "tab" => '\t',
        "newline" => '\n',
        "sol" => '/',
        "period" => '.',
        "lpar" => '(',
        "rpar" => ')',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => return None,
    };
    Some(c)
}
