//! Single-root reachability trees.
//!
//! A [`ReachabilityTree`] holds every node reachable from one root within a
//! travel distance budget, each linked to the parent it was first reached
//! through. Trees are produced by a [`TreeBuilder`]; the default
//! [`ShortestPathTreeBuilder`] runs a bounded Dijkstra expansion over a
//! [`RoadNetwork`](crate::network::RoadNetwork).

mod builder;
mod node;
mod object;

pub use builder::{ShortestPathTreeBuilder, TreeBuilder};
pub use node::TreeNode;
pub use object::{ObjectTree, ProbabilityModel};

use crate::error::{ForestError, Result};
use reachforest_types::NodeId;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// A rooted tree stored as a flat id to node table.
#[derive(Debug, Clone)]
pub struct ReachabilityTree {
    root: NodeId,
    nodes: FxHashMap<NodeId, TreeNode>,
}

impl ReachabilityTree {
    /// A tree holding only `root`, at distance 0 with probability 1.
    pub fn new(root: NodeId) -> Self {
        let mut node = TreeNode::new(root, None, 0.0);
        node.set_probability(1.0);

        let mut nodes = FxHashMap::default();
        nodes.insert(root, node);
        Self { root, nodes }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[&self.root]
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }

    /// Children of `id`, empty when `id` is unknown or a leaf.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(TreeNode::children).unwrap_or(&[])
    }

    /// Node ids in breadth-first order from the root.
    pub fn bfs(&self) -> Vec<NodeId> {
        self.bfs_from(self.root)
    }

    /// Node ids of the subtree under `start` in breadth-first order.
    pub fn bfs_from(&self, start: NodeId) -> Vec<NodeId> {
        if !self.contains(start) {
            return Vec::new();
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.children(id).iter().copied());
        }
        order
    }

    /// Attach a new node `id` under `parent` at `distance_km` from the root.
    ///
    /// Used by custom [`TreeBuilder`]s to assemble trees by hand.
    pub fn attach(&mut self, parent: NodeId, id: NodeId, distance_km: f64) -> Result<()> {
        if !self.contains(parent) {
            return Err(ForestError::NodeNotFound(parent));
        }
        if self.contains(id) {
            return Err(ForestError::DuplicateNode(id));
        }
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(ForestError::InvalidInput(format!(
                "distance to root must be finite and non-negative, got {distance_km}"
            )));
        }

        self.link(parent, id, distance_km);
        Ok(())
    }

    /// Split probability evenly among siblings: root 1, child `parent / degree`.
    pub fn assign_uniform_probabilities(&mut self) {
        if let Some(root) = self.nodes.get_mut(&self.root) {
            root.set_probability(1.0);
        }
        for id in self.bfs() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if node.is_leaf() {
                continue;
            }
            let share = node.probability() / node.children().len() as f64;
            let children = node.children().to_vec();
            for child in children {
                if let Some(child) = self.nodes.get_mut(&child) {
                    child.set_probability(share);
                }
            }
        }
    }

    pub(crate) fn link(&mut self, parent: NodeId, id: NodeId, distance_km: f64) {
        assert!(!self.contains(id), "node {id} is already in the tree");
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .unwrap_or_else(|| panic!("parent {parent} of node {id} is not in the tree"));
        parent_node.push_child(id);
        self.nodes
            .insert(id, TreeNode::new(id, Some(parent), distance_km));
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(&id)
    }
}
