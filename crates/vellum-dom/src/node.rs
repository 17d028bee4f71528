//! Document tree node
//!
//! One arena slot per node: parent back-reference, ordered children,
//! kind-specific payload. Attributes keep insertion order.

use crate::NodeId;

/// A single node in the document arena
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub(crate) parent: NodeId,
    /// Ordered children
    pub(crate) children: Vec<NodeId>,
    /// Node-specific data
    pub(crate) data: NodeData,
}

impl Node {
    pub(crate) fn document() -> Self {
        Self {
            parent: NodeId::NONE,
            children: Vec::new(),
            data: NodeData::Document,
        }
    }

    pub(crate) fn element(name: String) -> Self {
        Self {
            parent: NodeId::NONE,
            children: Vec::new(),
            data: NodeData::Element(ElementData::new(name)),
        }
    }

    pub(crate) fn text(content: String) -> Self {
        Self {
            parent: NodeId::NONE,
            children: Vec::new(),
            data: NodeData::Text(TextData { content }),
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is a text node
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }

    /// Ordered child list
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Parent node, if attached
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        if self.parent.is_valid() {
            Some(self.parent)
        } else {
            None
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Tag name as written
    pub name: String,
    /// Attributes in insertion order
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            attrs: Vec::new(),
        }
    }

    /// Position of an attribute under the given name-equality rule
    pub(crate) fn attr_position(&self, name: &str, eq: impl Fn(&str, &str) -> bool) -> Option<usize> {
        self.attrs.iter().position(|a| eq(&a.name, name))
    }
}

/// Text node data
#[derive(Debug)]
pub struct TextData {
    pub content: String,
}

/// A single name/value attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}
