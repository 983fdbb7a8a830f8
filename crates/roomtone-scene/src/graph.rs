//! Scene-node bookkeeping for anchor-backed content.
//!
//! The graph owns a tree of nodes keyed by [`NodeId`]. Only transforms and
//! parent/child edges are managed here; geometry and materials belong to
//! the render host.

use std::collections::HashMap;

use roomtone_core::{AnchorId, Mat4};

use crate::decorate::DecalKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

#[derive(Debug)]
pub struct SceneNode {
    pub transform: Mat4,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Back-reference to the anchor this node was created for, if any.
    pub anchor: Option<AnchorId>,
    /// Set on decoration nodes so callers can tell variants apart.
    pub decal: Option<DecalKind>,
}

impl SceneNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, SceneNode>,
    root: NodeId,
    next_id: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            SceneNode {
                transform: Mat4::IDENTITY,
                parent: None,
                children: Vec::new(),
                anchor: None,
                decal: None,
            },
        );
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn spawn(&mut self, parent: NodeId, transform: Mat4) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            SceneNode {
                transform,
                parent: Some(parent),
                children: Vec::new(),
                anchor: None,
                decal: None,
            },
        );
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Mat4) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.transform = transform;
        }
    }

    /// Detach `id` from its parent. The node stays in the graph with no
    /// parent edge.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get_mut(&id).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|child| *child != id);
        }
    }

    /// Detach and delete every child of `id`, including their subtrees.
    pub fn remove_children(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        let children = std::mem::take(&mut node.children);
        for child in children {
            self.remove_subtree(child);
        }
    }

    /// Detach `id` from its parent and delete it together with its
    /// subtree.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
        self.remove_subtree(id);
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        for child in node.children {
            self.remove_subtree(child);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use roomtone_core::{Mat4, Vec3};

    use super::SceneGraph;

    #[test]
    fn spawned_nodes_are_linked_to_their_parent() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let child = graph.spawn(root, Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));

        assert_eq!(graph.node(child).expect("child exists").parent(), Some(root));
        assert_eq!(graph.node(root).expect("root exists").children(), &[child]);
    }

    #[test]
    fn detach_clears_the_parent_edge_but_keeps_the_node() {
        let mut graph = SceneGraph::new();
        let child = graph.spawn(graph.root(), Mat4::IDENTITY);

        graph.detach(child);

        assert!(graph.contains(child));
        assert_eq!(graph.node(child).expect("child exists").parent(), None);
        assert!(graph.node(graph.root()).expect("root exists").children().is_empty());
    }

    #[test]
    fn remove_children_deletes_whole_subtrees() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn(graph.root(), Mat4::IDENTITY);
        let child = graph.spawn(parent, Mat4::IDENTITY);
        let grandchild = graph.spawn(child, Mat4::IDENTITY);

        graph.remove_children(parent);

        assert!(graph.contains(parent));
        assert!(!graph.contains(child));
        assert!(!graph.contains(grandchild));
    }
}
