// src/utils/html/tree.rs

use super::tokenizer::{self, Attribute, Token, Tokenizer};

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Maximum element nesting kept by the builder. Deeper start tags are ignored
/// and their content lands in the deepest open element. Raw-text elements are
/// still opened past the limit so their content stays contained; they cannot
/// nest further.
const MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    fn new(name: String, attrs: Vec<Attribute>) -> Self {
        Self {
            name,
            attrs,
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

/// Builds a node list from a fragment of HTML.
///
/// This is a plain stack machine: an end tag closes the nearest open element
/// of the same name, unmatched end tags are ignored, and anything still open
/// at the end of input is closed there.
pub fn parse_fragment(input: &str) -> Vec<Node> {
    // stack[0] is a nameless root that collects the top-level nodes.
    let mut stack = vec![Element::new(String::new(), Vec::new())];

    for token in Tokenizer::new(input) {
        match token {
            Token::Text(text) => current(&mut stack).children.push(Node::Text(text)),
            Token::StartTag { name, attrs } => {
                let element = Element::new(name, attrs);
                if element.is_void() {
                    current(&mut stack).children.push(Node::Element(element));
                } else if stack.len() <= MAX_DEPTH || tokenizer::is_raw_text(&element.name) {
                    stack.push(element);
                }
            }
            Token::EndTag { name } => {
                if let Some(index) = stack[1..].iter().rposition(|open| open.name == name) {
                    close_until(&mut stack, index + 1);
                }
            }
        }
    }

    close_until(&mut stack, 1);
    stack.pop().map(|root| root.children).unwrap_or_default()
}

fn current(stack: &mut [Element]) -> &mut Element {
    // The root is never popped before the end of `parse_fragment`.
    let last = stack.len() - 1;
    &mut stack[last]
}

/// Pops open elements until only `depth` remain, attaching each to its parent.
fn close_until(stack: &mut Vec<Element>, depth: usize) {
    while stack.len() > depth.max(1) {
        if let Some(element) = stack.pop() {
            current(stack).children.push(Node::Element(element));
        }
    }
}

/// Serializes nodes back to markup.
pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_nodes(nodes, &mut out);
    out
}

fn write_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => escape_into(text, false, out),
            Node::Element(element) => {
                out.push('<');
                out.push_str(&element.name);
                for attr in &element.attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    escape_into(&attr.value, true, out);
                    out.push('"');
                }
                out.push('>');

                if element.is_void() {
                    continue;
                }

                write_nodes(&element.children, out);
                out.push_str("</");
                out.push_str(&element.name);
                out.push('>');
            }
        }
    }
}

fn escape_into(value: &str, in_attribute: bool, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(name: &str, children: Vec<Node>) -> Node {
        Node::Element(Element::new(name.to_string(), Vec::new()).with_children(children))
    }

    fn text(value: &str) -> Node {
        Node::Text(value.to_string())
    }

    impl Element {
        fn with_children(mut self, children: Vec<Node>) -> Self {
            self.children = children;
            self
        }
    }

    #[test]
    fn end_tag_closes_inner_open_elements() {
        assert_eq!(
            parse_fragment("<b><i>x</b>y</i>"),
            vec![el("b", vec![el("i", vec![text("x")])]), text("y")]
        );
    }

    #[test]
    fn unmatched_end_tags_are_ignored_and_open_tags_closed() {
        assert_eq!(
            parse_fragment("</p>a<ul><li>b"),
            vec![text("a"), el("ul", vec![el("li", vec![text("b")])])]
        );
    }

    #[test]
    fn void_elements_take_no_children() {
        assert_eq!(
            parse_fragment("<p>a<br>b</br></p>"),
            vec![el(
                "p",
                vec![text("a"), el("br", Vec::new()), text("b")]
            )]
        );
    }

    #[test]
    fn nesting_is_capped() {
        let input = "<b>".repeat(MAX_DEPTH * 2) + "deep";
        let mut depth = 0;
        let mut nodes = parse_fragment(&input);
        while let Some(Node::Element(element)) = nodes.pop() {
            depth += 1;
            nodes = element.children;
        }
        assert_eq!(depth, MAX_DEPTH);
    }

    #[test]
    fn serializer_escapes_text_and_attributes() {
        let nodes = vec![
            Node::Element(Element {
                name: "a".to_string(),
                attrs: vec![Attribute::new("title", "\"<&>\"")],
                children: vec![text("1 < 2 & 3 > \"0\"")],
            }),
            el("br", Vec::new()),
        ];
        assert_eq!(
            serialize(&nodes),
            "<a title=\"&quot;&lt;&amp;&gt;&quot;\">1 &lt; 2 &amp; 3 &gt; \"0\"</a><br>"
        );
    }
}
