//! Minimal in-memory document tree.
//!
//! Just enough structure for a form control host: elements with attributes,
//! text, ancestor lookup and sibling insertion. There is no parser and no
//! layout here.

pub mod dom_utils;
mod types;

pub use types::{Id, Node, NodeId};

/// A document root plus an id allocator for nodes created after construction.
#[derive(Clone, Debug)]
pub struct Document {
    root: Node,
    next_id: u32,
}

impl Document {
    /// Wrap `children` in a document node and number everything in document order.
    pub fn new(children: Vec<Node>) -> Self {
        let mut root = Node::Document {
            id: Id(0),
            children,
        };
        let next_id = dom_utils::assign_node_ids(&mut root, 0);
        Self { root, next_id }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn alloc_id(&mut self) -> Id {
        let id = Id(self.next_id);
        self.next_id += 1;
        id
    }

    /// Renumber a detached subtree with ids from this document's allocator.
    pub fn adopt(&mut self, mut node: Node) -> Node {
        self.next_id = dom_utils::assign_node_ids(&mut node, self.next_id);
        node
    }

    pub fn get(&self, id: Id) -> Option<&Node> {
        dom_utils::find(&self.root, id)
    }

    pub fn get_mut(&mut self, id: Id) -> Option<&mut Node> {
        dom_utils::find_mut(&mut self.root, id)
    }

    /// Element whose `id` attribute equals `dom_id`.
    pub fn by_dom_id(&self, dom_id: &str) -> Option<&Node> {
        dom_utils::find_by_attr(&self.root, "id", dom_id)
    }
}

/// Element constructor. Ids are placeholders until the node joins a [`Document`].
pub fn elem(name: &str, attributes: &[(&str, &str)], children: Vec<Node>) -> Node {
    Node::Element {
        id: Id(0),
        name: name.to_string(),
        attributes: attributes
            .iter()
            .map(|(k, v)| (k.to_string(), Some(v.to_string())))
            .collect(),
        children,
    }
}

pub fn text(text: &str) -> Node {
    Node::Text {
        id: Id(0),
        text: text.to_string(),
    }
}
