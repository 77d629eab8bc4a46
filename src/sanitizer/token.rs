// src/sanitizer/token.rs

//! Markup tokenizer shared by the tag allowlist pass and the fragment parser,
//! so both stages agree on what counts as a tag.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_till, take_till1, take_until, take_while},
    character::complete::{char, multispace0, satisfy},
    combinator::{map, opt, recognize, success},
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Lowercase tag name.
    pub name: String,
    /// Attributes in source order, names lowercased. Duplicates are kept here.
    pub attributes: Vec<(String, String)>,
    pub self_closing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    StartTag(StartTag),
    EndTag(String),
    /// Comments, `<!...>` declarations and `<?...>` processing instructions.
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// The exact source text of the token.
    pub raw: &'a str,
}

/// Splits markup into tokens. Never fails: anything that does not form a
/// complete tag, including a lone `<`, is text.
///
/// Apart from quoted attribute values, no tag scans past the next `<`, and
/// comment terminators are searched for at most once after the last one, so
/// tokenizing stays linear on unterminated markup.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = input;
    let mut comments_can_close = true;
    while !rest.is_empty() {
        if comments_can_close && rest.starts_with("<!--") && !rest[4..].contains("-->") {
            comments_can_close = false;
        }
        let (remaining, kind) = match markup(rest, comments_can_close) {
            Ok(parsed) => parsed,
            Err(_) => (&rest[text_len(rest)..], TokenKind::Text),
        };
        let raw = &rest[..rest.len() - remaining.len()];
        tokens.push(Token { kind, raw });
        rest = remaining;
    }
    tokens
}

/// Length of the text run at the start of `input`: at least one character,
/// up to the next `<`.
fn text_len(input: &str) -> usize {
    let first = input.chars().next().map_or(0, char::len_utf8);
    input[first..].find('<').map_or(input.len(), |i| i + first)
}

fn markup(input: &str, comments_can_close: bool) -> IResult<&str, TokenKind> {
    if comments_can_close {
        alt((comment, declaration, end_tag, start_tag))(input)
    } else {
        alt((declaration, end_tag, start_tag))(input)
    }
}

fn is_tag_end(c: char) -> bool {
    c == '>' || c == '<'
}

fn comment(input: &str) -> IResult<&str, TokenKind> {
    map(delimited(tag("<!--"), take_until("-->"), tag("-->")), |_| {
        TokenKind::Comment
    })(input)
}

fn declaration(input: &str) -> IResult<&str, TokenKind> {
    map(
        tuple((alt((tag("<!"), tag("<?"))), take_till(is_tag_end), char('>'))),
        |_| TokenKind::Comment,
    )(input)
}

fn is_name_end(c: char) -> bool {
    c.is_ascii_whitespace() || c == '/' || c == '>' || c == '<'
}

fn tag_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(|c| c.is_ascii_alphabetic()), take_till(is_name_end)))(input)
}

fn end_tag(input: &str) -> IResult<&str, TokenKind> {
    let (rest, (_, name, _, _)) =
        tuple((tag("</"), tag_name, take_till(is_tag_end), char('>')))(input)?;
    Ok((rest, TokenKind::EndTag(name.to_ascii_lowercase())))
}

fn start_tag(input: &str) -> IResult<&str, TokenKind> {
    let (rest, _) = char('<')(input)?;
    let (rest, name) = tag_name(rest)?;
    let (rest, attributes) = many0(preceded(attribute_separator, attribute))(rest)?;
    let (rest, trailer) = attribute_separator(rest)?;
    let (rest, _) = char('>')(rest)?;
    Ok((
        rest,
        TokenKind::StartTag(StartTag {
            name: name.to_ascii_lowercase(),
            attributes: attributes
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
                .collect(),
            self_closing: trailer.contains('/'),
        }),
    ))
}

/// Whitespace and stray slashes between attributes.
fn attribute_separator(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_ascii_whitespace() || c == '/')(input)
}

fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
    let (rest, name) = take_till1(|c: char| {
        c.is_ascii_whitespace() || c == '/' || c == '=' || is_tag_end(c)
    })(input)?;
    let (rest, value) = opt(preceded(
        tuple((multispace0, char('='), multispace0)),
        attribute_value,
    ))(rest)?;
    Ok((rest, (name, value.unwrap_or(""))))
}

fn attribute_value(input: &str) -> IResult<&str, &str> {
    alt((double_quoted, single_quoted, unquoted, success("")))(input)
}

fn double_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c: char| c == '"'), char('"'))(input)
}

fn single_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_till(|c: char| c == '\''), char('\''))(input)
}

fn unquoted(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_ascii_whitespace() || is_tag_end(c))(input)
}
