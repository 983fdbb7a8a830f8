//! Converts the raw surface-detection stream into deduplicated, classified
//! anchor state.
//!
//! All events for a session arrive on one ordered sequence and are applied
//! strictly in order; the reconciler has a single writer and needs no
//! internal locking.

use std::collections::{BTreeMap, BTreeSet};

use roomtone_core::{AnchorEvent, AnchorId, Extent, SurfaceAnchor, SurfaceClass};
use tracing::debug;

use crate::graph::{NodeId, SceneGraph};

/// Per-anchor decoration record. Exactly one exists per live anchor.
#[derive(Debug)]
pub struct DecorContainer {
    pub anchor_id: AnchorId,
    pub node: NodeId,
    pub class: SurfaceClass,
    pub extent: Extent,
    /// Flips false -> true exactly once, when decals are first placed.
    pub decorated: bool,
}

/// Ids that newly entered a classification bucket this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipDelta {
    pub class: SurfaceClass,
    pub joined: Vec<AnchorId>,
}

/// Mutable view of one anchor's decoration site: the graph to place decal
/// nodes into and the container guarding idempotence.
pub struct DecorSite<'a> {
    pub graph: &'a mut SceneGraph,
    pub container: &'a mut DecorContainer,
}

#[derive(Debug, Default)]
struct Buckets {
    ceiling: BTreeSet<AnchorId>,
    wall: BTreeSet<AnchorId>,
    floor: BTreeSet<AnchorId>,
    furniture: BTreeSet<AnchorId>,
}

impl Buckets {
    fn for_class(&mut self, class: SurfaceClass) -> Option<&mut BTreeSet<AnchorId>> {
        match class {
            SurfaceClass::Ceiling => Some(&mut self.ceiling),
            SurfaceClass::Wall => Some(&mut self.wall),
            SurfaceClass::Floor => Some(&mut self.floor),
            SurfaceClass::Furniture => Some(&mut self.furniture),
            SurfaceClass::Other => None,
        }
    }

    fn get(&self, class: SurfaceClass) -> Option<&BTreeSet<AnchorId>> {
        match class {
            SurfaceClass::Ceiling => Some(&self.ceiling),
            SurfaceClass::Wall => Some(&self.wall),
            SurfaceClass::Floor => Some(&self.floor),
            SurfaceClass::Furniture => Some(&self.furniture),
            SurfaceClass::Other => None,
        }
    }

    fn remove_everywhere(&mut self, id: AnchorId) {
        self.ceiling.remove(&id);
        self.wall.remove(&id);
        self.floor.remove(&id);
        self.furniture.remove(&id);
    }
}

pub struct AnchorReconciler {
    graph: SceneGraph,
    /// Anchor nodes hang off this child of the graph root.
    origin: NodeId,
    nodes: BTreeMap<AnchorId, NodeId>,
    containers: BTreeMap<AnchorId, DecorContainer>,
    buckets: Buckets,
}

impl AnchorReconciler {
    pub fn new() -> Self {
        let mut graph = SceneGraph::new();
        let origin = graph.spawn(graph.root(), roomtone_core::Mat4::IDENTITY);
        Self {
            graph,
            origin,
            nodes: BTreeMap::new(),
            containers: BTreeMap::new(),
            buckets: Buckets::default(),
        }
    }

    /// Apply one stream event. Returns the membership delta when the
    /// anchor newly entered a classification bucket.
    pub fn consume(&mut self, event: AnchorEvent) -> Option<MembershipDelta> {
        match event {
            AnchorEvent::Added(anchor) | AnchorEvent::Updated(anchor) => self.upsert(anchor),
            AnchorEvent::Removed(id) => {
                self.remove(id);
                None
            },
        }
    }

    fn upsert(&mut self, anchor: SurfaceAnchor) -> Option<MembershipDelta> {
        match self.nodes.get(&anchor.id) {
            Some(&node) => {
                self.graph.set_transform(node, anchor.transform);
                if let Some(container) = self.containers.get_mut(&anchor.id) {
                    container.class = anchor.class;
                    container.extent = anchor.extent;
                }
            },
            None => {
                let node = self.graph.spawn(self.origin, anchor.transform);
                if let Some(scene_node) = self.graph.node_mut(node) {
                    scene_node.anchor = Some(anchor.id);
                }
                self.nodes.insert(anchor.id, node);
                self.containers.insert(
                    anchor.id,
                    DecorContainer {
                        anchor_id: anchor.id,
                        node,
                        class: anchor.class,
                        extent: anchor.extent,
                        decorated: false,
                    },
                );
                debug!(anchor = %anchor.id, "anchor node created");
            },
        }
        self.reclassify(anchor.id, anchor.class)
    }

    /// Move the id into the bucket for `class`, leaving every other
    /// bucket. Returns a delta when the id was not already a member.
    fn reclassify(&mut self, id: AnchorId, class: SurfaceClass) -> Option<MembershipDelta> {
        let already_member = self
            .buckets
            .get(class)
            .is_some_and(|bucket| bucket.contains(&id));
        self.buckets.remove_everywhere(id);
        let bucket = self.buckets.for_class(class)?;
        bucket.insert(id);
        if already_member {
            return None;
        }
        Some(MembershipDelta {
            class,
            joined: vec![id],
        })
    }

    /// Cascade removal: decals are torn down, the anchor node leaves the
    /// tree, and no entry survives in the node map, any bucket, or the
    /// decoration records. Unknown ids are a no-op.
    fn remove(&mut self, id: AnchorId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        self.graph.remove_children(node);
        self.graph.remove(node);
        self.buckets.remove_everywhere(id);
        self.containers.remove(&id);
        debug!(anchor = %id, "anchor removed");
    }

    /// Split borrow used by the decoration engine: the scene graph and the
    /// anchor's container, mutably, at once.
    pub fn site(&mut self, id: AnchorId) -> Option<DecorSite<'_>> {
        let container = self.containers.get_mut(&id)?;
        Some(DecorSite {
            graph: &mut self.graph,
            container,
        })
    }

    pub fn node_id(&self, id: AnchorId) -> Option<NodeId> {
        self.nodes.get(&id).copied()
    }

    pub fn container(&self, id: AnchorId) -> Option<&DecorContainer> {
        self.containers.get(&id)
    }

    pub fn bucket(&self, class: SurfaceClass) -> &BTreeSet<AnchorId> {
        static EMPTY: BTreeSet<AnchorId> = BTreeSet::new();
        self.buckets.get(class).unwrap_or(&EMPTY)
    }

    /// Number of buckets currently containing `id`.
    pub fn bucket_membership(&self, id: AnchorId) -> usize {
        [
            SurfaceClass::Ceiling,
            SurfaceClass::Wall,
            SurfaceClass::Floor,
            SurfaceClass::Furniture,
        ]
        .iter()
        .filter(|class| self.bucket(**class).contains(&id))
        .count()
    }

    pub fn anchor_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }
}

impl Default for AnchorReconciler {
    fn default() -> Self {
        Self::new()
    }
}
