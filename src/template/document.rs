//! Owned, mutable document tree for instantiated templates.
//!
//! Templates are parsed with `roxmltree` and copied into an owned tree that keeps element and
//! attribute prefixes plus the namespace declarations of every element, so serializing an
//! unmodified document yields an equivalent file that an external rasterizer reads the same way.

use std::fmt::Write as _;
use std::path::Path;

use crate::animation::sequence::{Frame, Mutation, MutationKind};
use crate::foundation::error::{ReelError, ReelResult};
use crate::template::style::InlineStyle;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Possibly prefixed XML name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    /// Split `"xlink:href"` into prefix and local name.
    pub fn parse(name: &str) -> Self {
        match name.split_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => Self {
                prefix: None,
                local: name.to_string(),
            },
        }
    }

    fn write_to(&self, out: &mut String) {
        if let Some(p) = &self.prefix {
            out.push_str(p);
            out.push(':');
        }
        out.push_str(&self.local);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// Namespace declared on an element (`prefix == None` for the default namespace).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        value: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub name: QName,
    pub namespaces: Vec<NamespaceDecl>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    /// Value of an attribute given as `"local"` or `"prefix:local"`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        let name = QName::parse(name);
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set or replace an attribute given as `"local"` or `"prefix:local"`.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = QName::parse(name);
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(a) => a.value = value.to_string(),
            None => self.attributes.push(Attribute {
                name,
                value: value.to_string(),
            }),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Parsed inline style (empty when the element has no `style` attribute).
    pub fn style(&self) -> InlineStyle {
        InlineStyle::parse(self.attribute("style").unwrap_or(""))
    }

    /// Upsert one property of the inline style.
    pub fn set_style_property(&mut self, key: &str, value: &str) {
        let mut style = self.style();
        style.set(key, value);
        self.set_attribute("style", &style.to_string());
    }

    fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.child_elements().find_map(|c| c.find_by_id(id))
    }

    /// Calls `f` on this element and every descendant whose id is `id`, in document order.
    fn visit_by_id_mut(&mut self, id: &str, f: &mut dyn FnMut(&mut Element)) -> usize {
        let mut hits = 0;
        if self.id() == Some(id) {
            f(self);
            hits += 1;
        }
        for child in &mut self.children {
            if let Node::Element(e) = child {
                hits += e.visit_by_id_mut(id, f);
            }
        }
        hits
    }
}

/// Parsed template document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SvgDocument {
    prolog: Vec<Node>,
    root: Element,
}

impl SvgDocument {
    /// Parse instantiated template text. `origin` only names the source in error messages.
    pub fn parse(text: &str, origin: &Path) -> ReelResult<Self> {
        let opts = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(text, opts)
            .map_err(|e| ReelError::template(origin, e.to_string()))?;

        let mut prolog = Vec::new();
        let mut root = None;
        for child in doc.root().children() {
            if child.is_element() {
                root = Some(convert_element(child));
            } else if root.is_none()
                && let Some(node) = convert_node(child)
                && !matches!(node, Node::Text(_))
            {
                prolog.push(node);
            }
        }

        let root =
            root.ok_or_else(|| ReelError::template(origin, "document has no root element"))?;
        Ok(Self { prolog, root })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// First element (document order, root first) whose `id` equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<&Element> {
        self.root.find_by_id(id)
    }

    /// Apply one mutation to every element carrying its id, the root element included.
    ///
    /// Returns the number of elements changed; zero matches is not an error.
    pub fn apply(&mut self, m: &Mutation) -> usize {
        let (key, value) = (m.key.as_str(), m.value.as_str());
        let mut mutate = |el: &mut Element| match m.kind {
            MutationKind::Style => el.set_style_property(key, value),
            MutationKind::Attr => el.set_attribute(key, value),
        };
        self.root.visit_by_id_mut(&m.element_id, &mut mutate)
    }

    /// Apply every mutation of `frame`.
    pub fn apply_frame(&mut self, frame: &Frame) {
        for m in frame.iter() {
            let hits = self.apply(m);
            if hits == 0 {
                tracing::trace!(element = %m.element_id, "mutation matched no element");
            }
        }
    }

    /// Serialize the whole document, including an XML declaration.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        for node in &self.prolog {
            write_node(&mut out, node);
            out.push('\n');
        }
        write_element(&mut out, &self.root);
        out.push('\n');
        out
    }
}

fn convert_node(node: roxmltree::Node<'_, '_>) -> Option<Node> {
    match node.node_type() {
        roxmltree::NodeType::Element => Some(Node::Element(convert_element(node))),
        roxmltree::NodeType::Text => node.text().map(|t| Node::Text(t.to_string())),
        roxmltree::NodeType::Comment => node.text().map(|t| Node::Comment(t.to_string())),
        roxmltree::NodeType::PI => node.pi().map(|pi| Node::ProcessingInstruction {
            target: pi.target.to_string(),
            value: pi.value.map(str::to_string),
        }),
        roxmltree::NodeType::Root => None,
    }
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let prefix = match tag.namespace() {
        Some(uri) if node.lookup_namespace_uri(None) == Some(uri) => None,
        Some(uri) => named_prefix(node, uri),
        None => None,
    };

    let parent_ns: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    let namespaces = node
        .namespaces()
        .filter(|ns| ns.uri() != XML_NS)
        .filter(|ns| !parent_ns.contains(&(ns.name(), ns.uri())))
        .map(|ns| NamespaceDecl {
            prefix: ns.name().map(str::to_string),
            uri: ns.uri().to_string(),
        })
        .collect();

    let attributes = node
        .attributes()
        .map(|a| Attribute {
            name: QName {
                prefix: a.namespace().and_then(|uri| named_prefix(node, uri)),
                local: a.name().to_string(),
            },
            value: a.value().to_string(),
        })
        .collect();

    let children = node.children().filter_map(convert_node).collect();

    Element {
        name: QName {
            prefix,
            local: tag.name().to_string(),
        },
        namespaces,
        attributes,
        children,
    }
}

fn named_prefix(node: roxmltree::Node<'_, '_>, uri: &str) -> Option<String> {
    if uri == XML_NS {
        return Some("xml".to_string());
    }
    node.namespaces()
        .find(|ns| ns.uri() == uri && ns.name().is_some())
        .and_then(|ns| ns.name())
        .map(str::to_string)
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(e) => write_element(out, e),
        Node::Text(t) => escape_into(out, t, false),
        Node::Comment(c) => {
            let _ = write!(out, "<!--{c}-->");
        }
        Node::ProcessingInstruction { target, value } => match value {
            Some(v) => {
                let _ = write!(out, "<?{target} {v}?>");
            }
            None => {
                let _ = write!(out, "<?{target}?>");
            }
        },
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    el.name.write_to(out);
    for ns in &el.namespaces {
        match &ns.prefix {
            Some(p) => {
                let _ = write!(out, " xmlns:{p}=\"");
            }
            None => out.push_str(" xmlns=\""),
        }
        escape_into(out, &ns.uri, true);
        out.push('"');
    }
    for a in &el.attributes {
        out.push(' ');
        a.name.write_to(out);
        out.push_str("=\"");
        escape_into(out, &a.value, true);
        out.push('"');
    }

    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &el.children {
        write_node(out, child);
    }
    out.push_str("</");
    el.name.write_to(out);
    out.push('>');
}

fn escape_into(out: &mut String, text: &str, attr: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            '\n' if attr => out.push_str("&#10;"),
            '\t' if attr => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/document.rs"]
mod tests;
