//! Safe XML Parsing
//!
//! Untrusted documents are parsed into an immutable, namespace-aware tree.
//! Document type declarations are refused outright, so no entity is ever
//! declared, expanded or fetched, and nothing touches the network. After
//! a successful parse the tree is scanned again for entity references that
//! are not one of the five predefined XML entities; any such reference is
//! rejected no matter what the parser reported.

use std::fmt;

use roxmltree::{Document, Node, NodeType, ParsingOptions};
use tracing::debug;

use crate::error::{DocValError, Result};

/// The namespace bound to the reserved `xml` prefix
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Entity names every XML processor knows without a declaration
const PREDEFINED_ENTITIES: [&str; 5] = ["amp", "lt", "gt", "apos", "quot"];

/// A (namespace URI, local name) pair.
///
/// Equality compares both components exactly; prefixes play no part. An
/// element without a namespace has the empty string as its namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualifiedName<'a> {
    pub namespace: &'a str,
    pub local_name: &'a str,
}

impl<'a> QualifiedName<'a> {
    pub const fn new(namespace: &'a str, local_name: &'a str) -> Self {
        Self {
            namespace,
            local_name,
        }
    }

    fn of_element<'input>(node: Node<'a, 'input>) -> Self {
        let name = node.tag_name();
        Self {
            namespace: name.namespace().unwrap_or(""),
            local_name: name.name(),
        }
    }
}

impl fmt::Display for QualifiedName<'_> {
    /// Clark notation, `{namespace}local`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local_name)
        }
    }
}

/// A parsed, immutable XML document borrowing its input.
pub struct XmlDocument<'input> {
    document: Document<'input>,
}

/// Parse untrusted XML from text or raw UTF-8 bytes.
///
/// Text is handled as its UTF-8 bytes, so both inputs share one code path.
pub fn parse<T>(input: &T) -> Result<XmlDocument<'_>>
where
    T: AsRef<[u8]> + ?Sized,
{
    XmlDocument::parse_bytes(input.as_ref())
}

impl<'input> XmlDocument<'input> {
    pub fn parse_bytes(bytes: &'input [u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|e| DocValError::MalformedDocument {
            details: format!("document is not valid UTF-8: {}", e),
        })?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let options = ParsingOptions {
            allow_dtd: false,
            ..ParsingOptions::default()
        };
        let document =
            Document::parse_with_options(text, options).map_err(classify_parse_error)?;

        reject_residual_entities(&document)?;

        debug!(
            root = %QualifiedName::of_element(document.root_element()),
            bytes = bytes.len(),
            "parsed XML document"
        );
        Ok(Self { document })
    }

    /// The document element
    pub fn root(&self) -> Element<'_, 'input> {
        Element {
            node: self.document.root_element(),
        }
    }

    /// Qualified name of the document element
    pub fn root_name(&self) -> QualifiedName<'_> {
        self.root().name()
    }

    /// Resolve an absolute path of child steps below the document element.
    ///
    /// Returns the first matching element in document order, or `None` if
    /// the path does not resolve. An empty path resolves to the root.
    pub fn find(&self, path: &[QualifiedName<'_>]) -> Option<Element<'_, 'input>> {
        find_from(self.document.root_element(), path).map(|node| Element { node })
    }
}

fn find_from<'a, 'input>(
    node: Node<'a, 'input>,
    path: &[QualifiedName<'_>],
) -> Option<Node<'a, 'input>> {
    let Some((step, rest)) = path.split_first() else {
        return Some(node);
    };

    node.children()
        .filter(|child| child.is_element() && QualifiedName::of_element(*child) == *step)
        .find_map(|child| find_from(child, rest))
}

/// An element node within an [`XmlDocument`].
#[derive(Debug, Clone, Copy)]
pub struct Element<'a, 'input> {
    node: Node<'a, 'input>,
}

impl<'a, 'input> Element<'a, 'input> {
    pub fn name(&self) -> QualifiedName<'a> {
        QualifiedName::of_element(self.node)
    }

    /// The text directly inside the element, before any child element.
    pub fn text(&self) -> Option<&'a str> {
        self.node.text()
    }

    /// Child elements in document order
    pub fn child_elements(self) -> impl Iterator<Item = Element<'a, 'input>> {
        self.node
            .children()
            .filter(|child| child.is_element())
            .map(|node| Element { node })
    }

    /// Serialize the element and its subtree as a standalone document.
    ///
    /// Namespaces inherited from ancestors are declared on the element
    /// itself so the output parses on its own.
    pub fn to_xml(&self) -> Vec<u8> {
        let mut out = String::with_capacity(self.node.range().len() + 128);
        write_element(self.node, None, &mut out);
        out.into_bytes()
    }
}

fn classify_parse_error(error: roxmltree::Error) -> DocValError {
    match error {
        roxmltree::Error::DtdDetected => DocValError::ForbiddenContent {
            details: "document type declarations are not allowed".to_string(),
        },
        roxmltree::Error::UnknownEntityReference(name, pos) => DocValError::ForbiddenContent {
            details: format!("entity reference '&{};' at {}", name, pos),
        },
        other => DocValError::MalformedDocument {
            details: other.to_string(),
        },
    }
}

/// Scan every text node and start tag of the tree for entity references
/// that survived parsing.
fn reject_residual_entities(document: &Document<'_>) -> Result<()> {
    let source = document.input_text();

    for node in document.descendants() {
        let range = node.range();
        let Some(raw) = source.get(range.clone()) else {
            continue;
        };
        let found = match node.node_type() {
            NodeType::Text => outside_cdata(raw)
                .into_iter()
                .find_map(find_entity_reference),
            NodeType::Element => find_entity_reference(start_tag(raw)),
            _ => None,
        };
        if let Some(name) = found {
            return Err(DocValError::ForbiddenContent {
                details: format!("entity reference '&{};' at byte {}", name, range.start),
            });
        }
    }

    Ok(())
}

/// First reference in `raw` that is neither a character reference nor a
/// predefined entity.
fn find_entity_reference(raw: &str) -> Option<&str> {
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        let after = &rest[amp + 1..];
        let end = after.find(';')?;
        let name = &after[..end];
        if !name.starts_with('#') && !PREDEFINED_ENTITIES.contains(&name) {
            return Some(name);
        }
        rest = &after[end + 1..];
    }
    None
}

/// Split off CDATA sections, whose content is literal.
fn outside_cdata(mut raw: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    while let Some(start) = raw.find("<![CDATA[") {
        segments.push(&raw[..start]);
        match raw[start..].find("]]>") {
            Some(end) => raw = &raw[start + end + 3..],
            None => return segments,
        }
    }
    segments.push(raw);
    segments
}

/// The start tag of an element's source, up to the first `>` outside quotes.
fn start_tag(raw: &str) -> &str {
    let mut quote = None;
    for (i, c) in raw.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), c) if c == open => quote = None,
            (None, '>') => return &raw[..=i],
            _ => {}
        }
    }
    raw
}

fn write_element(node: Node<'_, '_>, parent: Option<Node<'_, '_>>, out: &mut String) {
    let name = node.tag_name();

    out.push('<');
    if let Some(prefix) = name.namespace().and_then(|uri| element_prefix(node, uri)) {
        out.push_str(prefix);
        out.push(':');
    }
    out.push_str(name.name());

    for ns in node.namespaces() {
        if ns.name() == Some("xml") {
            continue;
        }
        let inherited = parent.is_some_and(|p| {
            p.namespaces()
                .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
        });
        if inherited {
            continue;
        }
        match ns.name() {
            Some(prefix) => {
                out.push_str(" xmlns:");
                out.push_str(prefix);
            }
            None => out.push_str(" xmlns"),
        }
        out.push_str("=\"");
        escape_attribute(ns.uri(), out);
        out.push('"');
    }

    for attr in node.attributes() {
        out.push(' ');
        if let Some(prefix) = attr.namespace().and_then(|uri| attribute_prefix(node, uri)) {
            out.push_str(prefix);
            out.push(':');
        }
        out.push_str(attr.name());
        out.push_str("=\"");
        escape_attribute(attr.value(), out);
        out.push('"');
    }

    if !node.has_children() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    for child in node.children() {
        match child.node_type() {
            NodeType::Element => write_element(child, Some(node), out),
            NodeType::Text => escape_text(child.text().unwrap_or(""), out),
            NodeType::Comment => {
                out.push_str("<!--");
                out.push_str(child.text().unwrap_or(""));
                out.push_str("-->");
            }
            NodeType::PI => {
                if let Some(pi) = child.pi() {
                    out.push_str("<?");
                    out.push_str(pi.target);
                    if let Some(value) = pi.value {
                        out.push(' ');
                        out.push_str(value);
                    }
                    out.push_str("?>");
                }
            }
            NodeType::Root => {}
        }
    }

    out.push_str("</");
    if let Some(prefix) = name.namespace().and_then(|uri| element_prefix(node, uri)) {
        out.push_str(prefix);
        out.push(':');
    }
    out.push_str(name.name());
    out.push('>');
}

/// `None` means the element is written unprefixed, in the default namespace.
fn element_prefix<'a>(node: Node<'a, '_>, uri: &str) -> Option<&'a str> {
    if node
        .namespaces()
        .any(|ns| ns.name().is_none() && ns.uri() == uri)
    {
        return None;
    }
    node.namespaces()
        .find(|ns| ns.uri() == uri)
        .and_then(|ns| ns.name())
}

fn attribute_prefix<'a>(node: Node<'a, '_>, uri: &str) -> Option<&'a str> {
    if uri == XML_NAMESPACE {
        return Some("xml");
    }
    node.namespaces()
        .find(|ns| ns.name().is_some() && ns.uri() == uri)
        .and_then(|ns| ns.name())
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
}
