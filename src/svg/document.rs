//! Owned SVG document tree.
//!
//! Documents are parsed with `quick-xml` into a small element tree that can be
//! cloned, mutated and written back out. Attribute values are stored
//! unescaped; text and CDATA content is kept exactly as it appeared in the
//! source (entity references included), so writing a document back produces
//! the same text it was read from.
//!
//! Everything before the root element (XML declaration, DOCTYPE, processing
//! instructions, comments) is discarded: shapes are always re-embedded into a
//! composite document that writes its own prolog.

use std::fmt;
use std::sync::LazyLock;

use quick_xml::{Reader, escape, events::BytesStart, events::Event};
use regex::Regex;

use super::{SVG_NAMESPACE, XLINK_NAMESPACE};

/// Parse failure description (position + message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tree
// ============================================================================

/// A node inside an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Raw (still escaped) character data.
    Text(String),
    /// Raw CDATA section content.
    CData(String),
    Comment(String),
}

impl From<Element> for Node {
    fn from(elem: Element) -> Self {
        Self::Element(elem)
    }
}

/// An XML element with ordered attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Local name without namespace prefix (`svg:rect` -> `rect`).
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn is(&self, local_name: &str) -> bool {
        self.local_name() == local_name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(key, _)| key == name)
    }

    /// Set an attribute, replacing its value in place if it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attrs.iter().position(|(key, _)| key == name)?;
        Some(self.attrs.remove(index).1)
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Direct child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(elem) => Some(elem),
            _ => None,
        })
    }

    /// Index (into `children`) of the first direct child element with the given local name.
    pub fn position_of(&self, local_name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, Node::Element(elem) if elem.is(local_name)))
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Element> {
        match self.children.get_mut(index) {
            Some(Node::Element(elem)) => Some(elem),
            _ => None,
        }
    }

    /// Visit this element and all descendants (pre-order).
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        f(self);
        for elem in self.elements() {
            elem.walk(f);
        }
    }

    /// Mutable pre-order traversal.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for node in &mut self.children {
            if let Node::Element(elem) = node {
                elem.walk_mut(f);
            }
        }
    }

    /// Concatenated raw text and CDATA content of the direct children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children with a single escaped text node.
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![Node::Text(escape::escape(text).into_owned())];
    }

    /// Serialize the element (and its subtree) into `out`.
    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape::escape(value.as_str()));
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(elem) => elem.write_to(out),
                Node::Text(text) => out.push_str(text),
                Node::CData(text) => {
                    out.push_str("<![CDATA[");
                    out.push_str(text);
                    out.push_str("]]>");
                }
                Node::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(256);
        self.write_to(&mut out);
        out
    }
}

/// A parsed SVG document (root element only).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    /// Parse an SVG document, retrying once with whitespace inside attribute
    /// values normalized.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        match Self::parse_strict(source) {
            Ok(doc) => Ok(doc),
            Err(first) => {
                let repaired = normalize_attribute_whitespace(source);
                if repaired == source {
                    return Err(first);
                }
                Self::parse_strict(&repaired).map_err(|_| first)
            }
        }
    }

    /// Parse without any recovery attempt.
    pub fn parse_strict(source: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                ParseError(format!(
                    "XML parse error at position {}: {}",
                    reader.error_position(),
                    e
                ))
            })?;

            match event {
                Event::Start(start) => stack.push(element_from(&start)?),
                Event::Empty(start) => {
                    let elem = element_from(&start)?;
                    attach(&mut stack, &mut root, elem)?;
                }
                Event::End(_) => {
                    let elem = stack
                        .pop()
                        .ok_or_else(|| ParseError("unexpected closing tag".into()))?;
                    attach(&mut stack, &mut root, elem)?;
                }
                Event::Text(text) => {
                    let raw = utf8(&text)?;
                    push_text(&mut stack, raw)?;
                }
                Event::GeneralRef(reference) => {
                    let raw = format!("&{};", utf8(&reference)?);
                    push_text(&mut stack, &raw)?;
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push(Node::CData(utf8(&data)?.to_string()));
                    }
                }
                Event::Comment(comment) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push(Node::Comment(utf8(&comment)?.to_string()));
                    }
                }
                Event::Eof => break,
                // Declarations, doctype and processing instructions are dropped
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(ParseError(format!("unclosed element <{}>", stack[0].name)));
        }

        let root = root.ok_or_else(|| ParseError("document has no root element".into()))?;
        if !root.is("svg") {
            return Err(ParseError(format!(
                "root element is <{}>, expected <svg>",
                root.name
            )));
        }

        Ok(Self { root })
    }

    pub fn serialize(&self) -> String {
        self.root.serialize()
    }

    /// Serialize as a standalone file, declaring the SVG (and, when used,
    /// XLink) namespace on the root if the document does not.
    pub fn to_standalone(&self) -> String {
        let mut uses_xlink = false;
        self.root.walk(&mut |elem| {
            uses_xlink |= elem.attrs.iter().any(|(key, _)| key.starts_with("xlink:"));
        });

        let missing_svg = !self.root.has_attr("xmlns");
        let missing_xlink = uses_xlink && !self.root.has_attr("xmlns:xlink");
        if !missing_svg && !missing_xlink {
            return self.serialize();
        }

        let mut root = self.root.clone();
        if missing_xlink {
            root.attrs.insert(0, ("xmlns:xlink".to_string(), XLINK_NAMESPACE.to_string()));
        }
        if missing_svg {
            root.attrs.insert(0, ("xmlns".to_string(), SVG_NAMESPACE.to_string()));
        }
        root.serialize()
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|e| ParseError(format!("invalid UTF-8: {e}")))
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, ParseError> {
    let mut elem = Element::new(utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError(format!("malformed attribute: {e}")))?;
        let key = utf8(attr.key.as_ref())?;
        let raw = utf8(&attr.value)?;
        let value = escape::unescape(raw)
            .map_err(|e| ParseError(format!("bad escape in `{key}`: {e}")))?;
        elem.attrs.push((key.to_string(), value.into_owned()));
    }
    Ok(elem)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    elem: Element,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push(Node::Element(elem));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(elem);
            Ok(())
        }
        None => Err(ParseError("document has more than one root element".into())),
    }
}

fn push_text(stack: &mut [Element], raw: &str) -> Result<(), ParseError> {
    let Some(parent) = stack.last_mut() else {
        // Text outside the root element must be whitespace
        if raw.trim().is_empty() {
            return Ok(());
        }
        return Err(ParseError("text content outside of root element".into()));
    };

    // Merge with preceding text so entity references stay in one node
    if let Some(Node::Text(previous)) = parent.children.last_mut() {
        previous.push_str(raw);
    } else {
        parent.push(Node::Text(raw.to_string()));
    }
    Ok(())
}

/// Collapse line breaks and whitespace runs inside quoted attribute values and
/// separate attributes that were written without whitespace between them.
fn normalize_attribute_whitespace(source: &str) -> String {
    static ATTR_VALUE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"(=\s*)("[^"]*"|'[^']*')"#).expect("valid regex"));
    static GLUED_ATTR: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"(["'])([A-Za-z_][\w:.-]*=)"#).expect("valid regex"));
    static WHITESPACE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    let separated = GLUED_ATTR.replace_all(source, "$1 $2");
    ATTR_VALUE
        .replace_all(&separated, |caps: &regex::Captures<'_>| {
            let value = &caps[2];
            let quote = &value[..1];
            let inner = &value[1..value.len() - 1];
            format!(
                "{}{quote}{}{quote}",
                &caps[1],
                WHITESPACE.replace_all(inner.trim(), " ")
            )
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let source = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect id="r" width="10" height="10"/></svg>"#;
        let doc = Document::parse(source).unwrap();
        assert_eq!(doc.root.attr("viewBox"), Some("0 0 10 10"));
        assert_eq!(doc.serialize(), source);
    }

    #[test]
    fn test_prolog_is_dropped() {
        let source = "<?xml version=\"1.0\"?>\n<!DOCTYPE svg>\n<!-- c -->\n<svg><g/></svg>\n";
        let doc = Document::parse(source).unwrap();
        assert_eq!(doc.serialize(), "<svg><g/></svg>");
    }

    #[test]
    fn test_entities_survive_round_trip() {
        let source = "<svg><title>A &amp; B</title><text>&lt;x&gt;</text></svg>";
        let doc = Document::parse(source).unwrap();
        assert_eq!(doc.serialize(), source);
    }

    #[test]
    fn test_attribute_values_are_unescaped() {
        let doc = Document::parse(r#"<svg data-x="a &amp; b"/>"#).unwrap();
        assert_eq!(doc.root.attr("data-x"), Some("a & b"));
        assert_eq!(doc.serialize(), r#"<svg data-x="a &amp; b"/>"#);
    }

    #[test]
    fn test_cdata_and_comments_are_kept() {
        let source = "<svg><style><![CDATA[.a>.b{fill:red}]]></style><!-- note --></svg>";
        let doc = Document::parse(source).unwrap();
        assert_eq!(doc.serialize(), source);
    }

    #[test]
    fn test_rejects_non_svg_root() {
        let err = Document::parse("<html><body/></html>").unwrap_err();
        assert!(err.0.contains("expected <svg>"));
    }

    #[test]
    fn test_rejects_missing_root() {
        assert!(Document::parse("   ").is_err());
        assert!(Document::parse("<svg><g></svg>").is_err());
    }

    #[test]
    fn test_recovery_normalizes_attribute_whitespace() {
        let repaired = normalize_attribute_whitespace("<svg d=\"M0 0\r\n   L1 1\"/>");
        assert_eq!(repaired, "<svg d=\"M0 0 L1 1\"/>");
    }

    #[test]
    fn test_recovery_separates_glued_attributes() {
        let repaired = normalize_attribute_whitespace(r#"<svg width="10"height="5"/>"#);
        assert_eq!(repaired, r#"<svg width="10" height="5"/>"#);
    }

    #[test]
    fn test_set_and_remove_attr() {
        let mut elem = Element::new("svg").with_attr("width", "10");
        elem.set_attr("width", "20");
        elem.set_attr("height", "5");
        assert_eq!(elem.attrs.len(), 2);
        assert_eq!(elem.attr("width"), Some("20"));
        assert_eq!(elem.remove_attr("width"), Some("20".to_string()));
        assert!(!elem.has_attr("width"));
    }

    #[test]
    fn test_standalone_declares_namespaces() {
        let doc = Document::parse(r##"<svg><use xlink:href="#a"/></svg>"##).unwrap();
        assert_eq!(
            doc.to_standalone(),
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#a"/></svg>"##
        );

        let declared = Document::parse(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).unwrap();
        assert_eq!(declared.to_standalone(), declared.serialize());
    }

    #[test]
    fn test_local_name() {
        assert_eq!(Element::new("svg:rect").local_name(), "rect");
        assert!(Element::new("svg").is("svg"));
    }
}
