use rowan::TextRange;

use super::{Attribute, Document, NodeId, QName};

/// Assemble a [`Document`] in memory, without source text.
///
/// Every element and attribute gets an empty range.
///
/// ```
/// use wixc_compiler::document::{DocumentBuilder, QName};
///
/// let mut builder = DocumentBuilder::new(QName::wxs("Wix"));
/// let fragment = builder.child(builder.root(), QName::wxs("Fragment"));
/// builder.attribute(fragment, QName::unqualified("Id"), "Main");
/// let doc = builder.finish();
/// assert_eq!(doc.root().unwrap().children().count(), 1);
/// ```
#[derive(Debug)]
pub struct DocumentBuilder {
    doc: Document,
}

/// Handle to an element created by a [`DocumentBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderNode(NodeId);

impl DocumentBuilder {
    pub fn new(root: QName) -> Self {
        let mut doc = Document::default();
        doc.push(None, root, TextRange::default());
        Self { doc }
    }

    pub fn root(&self) -> BuilderNode {
        BuilderNode(NodeId(0))
    }

    pub fn child(&mut self, parent: BuilderNode, name: QName) -> BuilderNode {
        BuilderNode(self.doc.push(Some(parent.0), name, TextRange::default()))
    }

    pub fn attribute(
        &mut self,
        node: BuilderNode,
        name: QName,
        value: impl Into<String>,
    ) -> &mut Self {
        self.doc.push_attribute(
            node.0,
            Attribute {
                name,
                value: value.into(),
                range: TextRange::default(),
            },
        );
        self
    }

    pub fn text(&mut self, node: BuilderNode, text: &str) -> &mut Self {
        self.doc.push_text(node.0, text);
        self
    }

    pub fn finish(self) -> Document {
        self.doc
    }
}
