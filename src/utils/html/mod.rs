// src/utils/html/mod.rs

//! Allow-list HTML sanitizer for post bodies.
//!
//! Input is parsed into a small tree, filtered element by element, and
//! serialized again, so every rule operates on structured nodes rather than
//! substrings. The output only ever contains tags from [`ALLOWED_TAGS`] and
//! attributes from [`allowed_attributes`].

mod tokenizer;
mod tree;

use tokenizer::Attribute;
use tree::{Element, Node};

/// Tags that survive sanitization. Anything else is unwrapped or dropped.
pub const ALLOWED_TAGS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "strong",
    "em",
    "b",
    "i",
    "u",
    "ul",
    "ol",
    "li",
    "a",
    "blockquote",
    "code",
    "pre",
    "img",
    "br",
    "hr",
];

/// Elements removed together with everything inside them. Their content is
/// code or markup, not prose.
const DROP_WITH_CONTENT: &[&str] = &[
    "script",
    "style",
    "template",
    "iframe",
    "object",
    "noscript",
    "noembed",
    "noframes",
    "textarea",
    "title",
    "xmp",
    "plaintext",
];

/// Attributes stripped from every element before anything else.
const PRESENTATIONAL_ATTRIBUTES: &[&str] = &["style", "class", "id"];

const LINK_REL: &str = "noopener noreferrer";
const LINK_TARGET: &str = "_blank";

/// Attributes permitted on a surviving tag.
pub fn allowed_attributes(tag: &str) -> &'static [&'static str] {
    match tag {
        "a" => &["href", "title", "rel", "target"],
        "img" => &["src", "alt", "loading"],
        _ => &[],
    }
}

/// Clean HTML content against the post allow-list.
///
/// * Disallowed elements are unwrapped: the tag goes, its content stays and
///   is filtered by the same rules.
/// * `<script>`, `<style>` and similar elements are removed with their
///   content, as are comments.
/// * Links get `href="#"` instead of a `javascript:` URL and always open in a
///   new tab with `rel="noopener noreferrer"`.
/// * Images with a `data:` source are removed; the rest load lazily.
///
/// Never fails: malformed markup degrades to whatever can be salvaged.
/// Re-cleaning the output returns it unchanged.
pub fn clean_html(input: &str) -> String {
    let input = input.replace('\0', "\u{FFFD}");
    let nodes = tree::parse_fragment(&input);
    tree::serialize(&clean_nodes(nodes))
}

fn clean_nodes(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) => out.push(Node::Text(text)),
            Node::Element(element) => clean_element(element, &mut out),
        }
    }
    out
}

fn clean_element(mut element: Element, out: &mut Vec<Node>) {
    if DROP_WITH_CONTENT.contains(&element.name.as_str()) {
        return;
    }

    strip_global_attributes(&mut element.attrs);

    if !neutralize_urls(&mut element) {
        return;
    }

    // `font` and every other tag outside the allow-list are unwrapped; the
    // promoted children go through the same rules.
    if !ALLOWED_TAGS.contains(&element.name.as_str()) {
        out.extend(clean_nodes(element.children));
        return;
    }

    restrict_attributes(&mut element);
    element.children = clean_nodes(element.children);
    out.push(Node::Element(element));
}

fn strip_global_attributes(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| {
        !PRESENTATIONAL_ATTRIBUTES.contains(&attr.name.as_str()) && !is_event_handler(&attr.name)
    });
}

fn is_event_handler(name: &str) -> bool {
    name.len() > 2 && name.starts_with("on")
}

/// Rewrites script links to `#`. Returns `false` when the element carries a
/// `data:` source and has to go entirely.
fn neutralize_urls(element: &mut Element) -> bool {
    if element
        .attr("src")
        .is_some_and(|src| has_scheme(src, "data:"))
    {
        return false;
    }

    for attr in element.attrs.iter_mut() {
        if attr.name == "href"
            && (has_scheme(&attr.value, "javascript:") || has_scheme(&attr.value, "vbscript:"))
        {
            attr.value = "#".to_string();
        }
    }
    true
}

/// Scheme test the way browsers read URLs: leading whitespace and control
/// characters are ignored, as are tabs and newlines anywhere.
fn has_scheme(url: &str, scheme: &str) -> bool {
    let prefix: String = url
        .trim_start_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .take(scheme.len())
        .collect();
    prefix.eq_ignore_ascii_case(scheme)
}

/// Keeps only allow-listed attributes, in canonical order, and forces the
/// per-tag defaults.
fn restrict_attributes(element: &mut Element) {
    let allowed = allowed_attributes(&element.name);
    let mut attrs = std::mem::take(&mut element.attrs);
    attrs.retain(|attr| allowed.contains(&attr.name.as_str()));

    element.attrs = match element.name.as_str() {
        "a" => {
            let href = take_value(&mut attrs, "href").unwrap_or_else(|| "#".to_string());
            let mut kept = vec![Attribute::new("href", href)];
            if let Some(title) = take_value(&mut attrs, "title") {
                kept.push(Attribute::new("title", title));
            }
            kept.push(Attribute::new("rel", LINK_REL));
            kept.push(Attribute::new("target", LINK_TARGET));
            kept
        }
        "img" => {
            let mut kept = Vec::with_capacity(3);
            if let Some(src) = take_value(&mut attrs, "src") {
                kept.push(Attribute::new("src", src));
            }
            let alt = take_value(&mut attrs, "alt").unwrap_or_default();
            kept.push(Attribute::new("alt", alt));
            kept.push(Attribute::new("loading", "lazy"));
            kept
        }
        _ => Vec::new(),
    };
}

fn take_value(attrs: &mut Vec<Attribute>, name: &str) -> Option<String> {
    let index = attrs.iter().position(|attr| attr.name == name)?;
    Some(attrs.swap_remove(index).value)
}
