//! Read-only element tree the compiler walks.
//!
//! Elements live in an arena owned by [`Document`]; [`Element`] is a cheap
//! copyable view that can reach its parent and children.

mod builder;
mod reader;


use rowan::TextRange;

pub use builder::{BuilderNode, DocumentBuilder};
pub use reader::parse;

/// Namespace of the core language. Everything else belongs to extensions.
pub const WXS_NAMESPACE: &str = "http://wixtoolset.org/schemas/v4/wxs";

/// Namespace-qualified name of an element or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: Option<&str>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_owned),
            local: local.into(),
        }
    }

    /// Name in the core namespace.
    pub fn wxs(local: impl Into<String>) -> Self {
        Self::new(Some(WXS_NAMESPACE), local)
    }

    /// Name without a namespace, the usual case for attributes.
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self::new(None, local)
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
    pub range: TextRange,
}

impl Attribute {
    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    pub fn namespace(&self) -> Option<&str> {
        self.name.namespace.as_deref()
    }

    /// Unprefixed attributes and attributes in the core namespace belong to
    /// the element's own vocabulary.
    pub fn is_core(&self) -> bool {
        matches!(self.namespace(), None | Some(WXS_NAMESPACE))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

#[derive(Debug, Clone)]
struct Node {
    name: QName,
    range: TextRange,
    attributes: Vec<Attribute>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    source: Option<String>,
}

impl Document {
    /// Same as [`parse`].
    pub fn parse(source: &str) -> crate::Result<Self> {
        reader::parse(source)
    }

    /// The document element, if there is one.
    pub fn root(&self) -> Option<Element<'_>> {
        if self.nodes.is_empty() {
            return None;
        }
        Some(Element {
            doc: self,
            id: NodeId(0),
        })
    }

    /// Text the document was parsed from, for rendering diagnostics.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub(crate) fn push(&mut self, parent: Option<NodeId>, name: QName, range: TextRange) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            name,
            range,
            attributes: Vec::new(),
            children: Vec::new(),
            parent,
            text: String::new(),
        });
        if let Some(parent) = parent {
            self.node_mut(parent).children.push(id);
        }
        id
    }

    pub(crate) fn push_attribute(&mut self, id: NodeId, attribute: Attribute) {
        self.node_mut(id).attributes.push(attribute);
    }

    pub(crate) fn push_text(&mut self, id: NodeId, text: &str) {
        self.node_mut(id).text.push_str(text);
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }
}

/// Borrowed view of one element.
#[derive(Clone, Copy)]
pub struct Element<'d> {
    doc: &'d Document,
    id: NodeId,
}

impl<'d> Element<'d> {
    fn node(&self) -> &'d Node {
        self.doc.node(self.id)
    }

    pub fn name(&self) -> &'d QName {
        &self.node().name
    }

    pub fn local_name(&self) -> &'d str {
        &self.node().name.local
    }

    pub fn namespace(&self) -> Option<&'d str> {
        self.node().name.namespace.as_deref()
    }

    /// Whether the element belongs to the core language.
    pub fn is_core(&self) -> bool {
        self.namespace() == Some(WXS_NAMESPACE)
    }

    pub fn range(&self) -> TextRange {
        self.node().range
    }

    pub fn attributes(&self) -> &'d [Attribute] {
        &self.node().attributes
    }

    /// Core attribute by local name.
    pub fn attribute(&self, local: &str) -> Option<&'d Attribute> {
        self.attributes()
            .iter()
            .find(|a| a.is_core() && a.local_name() == local)
    }

    pub fn children(&self) -> impl Iterator<Item = Element<'d>> + 'd {
        let doc = self.doc;
        self.node()
            .children
            .iter()
            .map(move |&id| Element { doc, id })
    }

    pub fn parent(&self) -> Option<Element<'d>> {
        self.node().parent.map(|id| Element { doc: self.doc, id })
    }

    /// Index among the parent's children; 0 for the document element.
    pub fn position(&self) -> usize {
        self.node()
            .parent
            .and_then(|parent| self.doc.node(parent).children.iter().position(|&c| c == self.id))
            .unwrap_or(0)
    }

    /// Concatenated character data directly inside the element, trimmed.
    pub fn text(&self) -> &'d str {
        self.node().text.trim()
    }
}

impl std::fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("name", self.name())
            .field("range", &self.range())
            .finish()
    }
}
