// src/utils/html/tokenizer.rs

//! A small, forgiving HTML tokenizer.
//!
//! It recognizes just enough of HTML to drive the sanitizer: start tags with
//! attributes, end tags, text, and the raw-text elements whose content must
//! never be read as markup. Comments, doctypes and other `<!`/`<?` constructs
//! are consumed and discarded.

/// Elements whose content is opaque text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes", "noscript",
    "plaintext",
];

/// Upper bound on the length of a character reference body (`&...;`).
const MAX_ENTITY_LEN: usize = 32;

/// Named references browsers still decode without a trailing `;`.
const LEGACY_ENTITIES: &[&str] = &["amp", "lt", "gt", "quot", "nbsp", "copy", "reg"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag { name: String, attrs: Vec<Attribute> },
    EndTag { name: String },
    Text(String),
}

/// Outcome of looking at a `<` in the input.
enum Markup {
    Token(Token),
    /// Something was consumed but produces no token (comment, bogus markup,
    /// a tag cut off by the end of input).
    Skipped,
    /// The `<` is plain text.
    NotMarkup,
}

pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    raw_text: Option<String>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_text: None,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_html_whitespace) {
            self.pos += 1;
        }
    }

    /// Advances past the next occurrence of `needle`, or to the end of input.
    fn skip_past(&mut self, needle: &str) {
        match self.input[self.pos..].find(needle) {
            Some(idx) => self.pos += idx + needle.len(),
            None => self.pos = self.input.len(),
        }
    }

    /// Consumes raw text up to (not including) `</name`.
    fn raw_text_until_end(&mut self, name: &str) -> String {
        let input = self.input;
        let rest = &input[self.pos..];
        let end = rest
            .match_indices("</")
            .map(|(idx, _)| idx)
            .find(|&idx| {
                let after = idx + 2;
                let matches_name = rest
                    .get(after..after + name.len())
                    .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name));
                let terminated = rest
                    .as_bytes()
                    .get(after + name.len())
                    .is_none_or(|&b| b == b'/' || b == b'>' || is_html_whitespace(b));
                matches_name && terminated
            })
            .unwrap_or(rest.len());

        self.pos += end;
        rest[..end].to_string()
    }

    fn text(&mut self) -> String {
        let start = self.pos;
        // The first byte may be a `<` that turned out not to be markup.
        let search_from = if self.peek() == Some(b'<') {
            start + 1
        } else {
            start
        };
        let end = self.input[search_from..]
            .find('<')
            .map_or(self.input.len(), |idx| search_from + idx);
        self.pos = end;
        decode_entities(&self.input[start..end])
    }

    fn markup(&mut self) -> Markup {
        let input = self.input;
        let rest = &input[self.pos..];
        let bytes = rest.as_bytes();

        if rest.starts_with("<!--") {
            let body = &rest[4..];
            if body.starts_with('>') {
                self.pos += 5;
            } else if body.starts_with("->") {
                self.pos += 6;
            } else {
                self.pos += 4;
                self.skip_past("-->");
            }
            return Markup::Skipped;
        }

        match bytes.get(1) {
            Some(b'!') | Some(b'?') => {
                self.pos += 1;
                self.skip_past(">");
                Markup::Skipped
            }
            Some(b'/') => match bytes.get(2) {
                Some(b) if b.is_ascii_alphabetic() => {
                    self.pos += 2;
                    match self.tag() {
                        Some((name, _)) => Markup::Token(Token::EndTag { name }),
                        None => self.truncated(),
                    }
                }
                Some(b'>') => {
                    self.pos += 3;
                    Markup::Skipped
                }
                Some(_) => {
                    self.pos += 2;
                    self.skip_past(">");
                    Markup::Skipped
                }
                None => Markup::NotMarkup,
            },
            Some(b) if b.is_ascii_alphabetic() => {
                self.pos += 1;
                match self.tag() {
                    Some((name, attrs)) => {
                        if is_raw_text(&name) {
                            self.raw_text = Some(name.clone());
                        }
                        Markup::Token(Token::StartTag { name, attrs })
                    }
                    None => self.truncated(),
                }
            }
            _ => Markup::NotMarkup,
        }
    }

    /// A tag cut off by the end of input is dropped along with the rest.
    fn truncated(&mut self) -> Markup {
        self.pos = self.input.len();
        Markup::Skipped
    }

    /// Reads a tag name and its attributes, leaving `pos` after the closing
    /// `>`. Returns `None` when the input ends inside the tag.
    fn tag(&mut self) -> Option<(String, Vec<Attribute>)> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| !is_html_whitespace(b) && b != b'/' && b != b'>')
        {
            self.pos += 1;
        }
        let name = self.input[start..self.pos].to_ascii_lowercase();
        let mut attrs: Vec<Attribute> = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek()? {
                b'>' => {
                    self.pos += 1;
                    return Some((name, attrs));
                }
                b'/' => self.pos += 1,
                _ => {
                    let attr = self.attribute()?;
                    if !attrs.iter().any(|existing| existing.name == attr.name) {
                        attrs.push(attr);
                    }
                }
            }
        }
    }

    fn attribute(&mut self) -> Option<Attribute> {
        let start = self.pos;
        // A leading `=` belongs to the name.
        self.pos += 1;
        while self
            .peek()
            .is_some_and(|b| !is_html_whitespace(b) && !matches!(b, b'/' | b'>' | b'='))
        {
            self.pos += 1;
        }
        let name = self.input[start..self.pos].to_ascii_lowercase();

        self.skip_whitespace();
        if self.peek() != Some(b'=') {
            return Some(Attribute::new(name, ""));
        }
        self.pos += 1;
        self.skip_whitespace();

        let value = match self.peek()? {
            quote @ (b'"' | b'\'') => {
                let value_start = self.pos + 1;
                let len = self.input[value_start..].find(quote as char)?;
                self.pos = value_start + len + 1;
                &self.input[value_start..value_start + len]
            }
            _ => {
                let value_start = self.pos;
                while self
                    .peek()
                    .is_some_and(|b| !is_html_whitespace(b) && b != b'>')
                {
                    self.pos += 1;
                }
                &self.input[value_start..self.pos]
            }
        };

        Some(Attribute::new(name, decode_entities(value)))
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(name) = self.raw_text.take() {
                let text = self.raw_text_until_end(&name);
                if !text.is_empty() {
                    return Some(Token::Text(text));
                }
            }

            if self.pos >= self.input.len() {
                return None;
            }

            if self.peek() == Some(b'<') {
                match self.markup() {
                    Markup::Token(token) => return Some(token),
                    Markup::Skipped => continue,
                    Markup::NotMarkup => {}
                }
            }

            return Some(Token::Text(self.text()));
        }
    }
}

/// Whether `name` switches the tokenizer into raw-text mode.
pub fn is_raw_text(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&name)
}

fn is_html_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

/// Decodes character references. Unknown or malformed references are kept
/// as literal text.
pub fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match decode_entity(rest) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// `reference` starts with `&`. Returns the decoded char and the number of
/// bytes consumed.
///
/// Numeric references may omit the `;`, as may the legacy names in
/// [`LEGACY_ENTITIES`] when followed by neither an alphanumeric nor `=`.
/// Anything else without a `;` stays literal, so `&ampx` is kept as written
/// where a browser rendering text would show `&x`.
fn decode_entity(reference: &str) -> Option<(char, usize)> {
    match reference.as_bytes().get(1)? {
        b'#' => decode_numeric(reference.as_bytes()),
        _ => decode_named(reference),
    }
}

fn decode_numeric(bytes: &[u8]) -> Option<(char, usize)> {
    let (radix, start) = match bytes.get(2) {
        Some(b'x' | b'X') => (16, 3),
        _ => (10, 2),
    };
    let digits = bytes[start..]
        .iter()
        .take_while(|&&b| (b as char).is_digit(radix))
        .count();
    if digits == 0 {
        return None;
    }

    let code = bytes[start..start + digits]
        .iter()
        .try_fold(0u32, |acc, &b| {
            acc.checked_mul(radix)?
                .checked_add((b as char).to_digit(radix)?)
        });
    let mut len = start + digits;
    if bytes.get(len) == Some(&b';') {
        len += 1;
    }

    let ch = match code {
        Some(0) | None => '\u{FFFD}',
        Some(code) => char::from_u32(code).unwrap_or('\u{FFFD}'),
    };
    Some((ch, len))
}

fn decode_named(reference: &str) -> Option<(char, usize)> {
    let bytes = reference.as_bytes();
    let name_len = bytes[1..]
        .iter()
        .take(MAX_ENTITY_LEN)
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    if name_len == 0 {
        return None;
    }
    let name = &reference[1..1 + name_len];

    match bytes.get(1 + name_len) {
        Some(b';') => named_entity(name).map(|ch| (ch, name_len + 2)),
        Some(b'=') => None,
        _ if LEGACY_ENTITIES.contains(&name) => named_entity(name).map(|ch| (ch, name_len + 1)),
        _ => None,
    }
}

fn named_entity(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{A0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "lsquo" => '‘',
        "rsquo" => '’',
        "sbquo" => '‚',
        "ldquo" => '“',
        "rdquo" => '”',
        "bdquo" => '„',
        "laquo" => '«',
        "raquo" => '»',
        "bull" => '•',
        "middot" => '·',
        "deg" => '°',
        "times" => '×',
        "euro" => '€',
        _ => return None,
    };
    Some(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Tokenizer::new(input).collect()
    }

    fn start(name: &str, attrs: &[(&str, &str)]) -> Token {
        Token::StartTag {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(name, value)| Attribute::new(*name, *value))
                .collect(),
        }
    }

    fn end(name: &str) -> Token {
        Token::EndTag {
            name: name.to_string(),
        }
    }

    fn text(value: &str) -> Token {
        Token::Text(value.to_string())
    }

    #[test]
    fn quoted_attribute_may_contain_angle_bracket() {
        assert_eq!(
            tokens(r#"<IMG Alt="a > b" src='x.png'>"#),
            vec![start("img", &[("alt", "a > b"), ("src", "x.png")])]
        );
    }

    #[test]
    fn unquoted_and_valueless_attributes() {
        assert_eq!(
            tokens("<a href=/x title = t download>go</a>"),
            vec![
                start("a", &[("href", "/x"), ("title", "t"), ("download", "")]),
                text("go"),
                end("a"),
            ]
        );
    }

    #[test]
    fn first_duplicate_attribute_wins() {
        assert_eq!(
            tokens(r#"<a href="/one" HREF="/two">"#),
            vec![start("a", &[("href", "/one")])]
        );
    }

    #[test]
    fn comments_and_doctype_are_skipped() {
        assert_eq!(
            tokens("<!doctype html>a<!-- <b>hidden</b> -->b<!-->c<?xml x?>d"),
            vec![text("a"), text("b"), text("c"), text("d")]
        );
    }

    #[test]
    fn stray_angle_brackets_are_text() {
        assert_eq!(tokens("1 < 2"), vec![text("1 "), text("< 2")]);
        assert_eq!(tokens("x</"), vec![text("x"), text("</")]);
    }

    #[test]
    fn truncated_tag_is_dropped() {
        assert_eq!(tokens("hi <a href=\"x"), vec![text("hi ")]);
        assert_eq!(tokens("hi <b"), vec![text("hi ")]);
    }

    #[test]
    fn raw_text_is_opaque_until_matching_end_tag() {
        assert_eq!(
            tokens("<script>if (a<b) { x = '</p>'; }</SCRIPT >after"),
            vec![
                start("script", &[]),
                text("if (a<b) { x = '</p>'; }"),
                end("script"),
                text("after"),
            ]
        );
        assert_eq!(
            tokens("<style></styles></style>"),
            vec![start("style", &[]), text("</styles>"), end("style")]
        );
    }

    #[test]
    fn unterminated_raw_text_runs_to_end() {
        assert_eq!(
            tokens("<script>alert(1)"),
            vec![start("script", &[]), text("alert(1)")]
        );
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(
            decode_entities("&lt;b&gt; &amp;amp; &#106;&#x61;&#X76; &nbsp;&hellip;"),
            "<b> &amp; jav \u{A0}…"
        );
    }

    #[test]
    fn malformed_entities_stay_literal() {
        assert_eq!(decode_entities("AT&T &bogus; &#; &#xZZ; &ampx &amp=1"), "AT&T &bogus; &#; &#xZZ; &ampx &amp=1");
        assert_eq!(decode_entities("&#0;&#xD800;&#99999999999;"), "\u{FFFD}\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn references_without_semicolon_are_decoded() {
        assert_eq!(decode_entities("&#x6a&#x61;"), "ja");
        assert_eq!(decode_entities("&#106avascript"), "javascript");
        assert_eq!(decode_entities("a &amp b &lt c &copy"), "a & b < c ©");
        assert_eq!(decode_entities("&hellip &mdash"), "&hellip &mdash");
    }
}
