//! Multi-root predictive forest for one moving object.
//!
//! The forest keeps one reachability tree per plausible current position and
//! merges them into a single id to node table, so every road node belongs to
//! at most one tree. Each [`PredictiveForest::predict`] call either rebuilds
//! the forest from the region's candidate roots or narrows the existing forest
//! onto the candidates it already holds. Nodes dropped along the way are
//! remembered as excluded and never come back.
//!
//! # Example
//!
//! ```rust
//! use reachforest::{Config, PredictiveForest, PredictionMode, Region, RoadNetwork};
//! use reachforest::Coordinate;
//! use std::sync::Arc;
//!
//! let mut builder = RoadNetwork::builder().grid_size(2);
//! builder
//!     .add_node(1, Coordinate::new(0.000, 0.000))
//!     .add_node(2, Coordinate::new(0.001, 0.000))
//!     .add_node(3, Coordinate::new(0.002, 0.000));
//! builder.add_edge(10, 1, 2).add_edge(11, 2, 3);
//! let network = Arc::new(builder.build().unwrap());
//!
//! let mut forest = PredictiveForest::new(network, &Config::default());
//! let mode = forest.predict(Region::around(0.0, 0.0, 0.01)).unwrap();
//!
//! assert_eq!(mode, PredictionMode::Rebuilt);
//! assert_eq!(forest.root_ids(), vec![1]);
//! assert_eq!(forest[2].probability(), 1.0);
//! ```

use crate::config::Config;
use crate::error::{ForestError, Result};
use crate::network::{RoadIndex, RoadNetwork};
use crate::tree::{ReachabilityTree, ShortestPathTreeBuilder, TreeBuilder, TreeNode};
use reachforest_types::{NodeId, Region};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::collections::hash_map::Values;
use std::ops::Index;
use std::sync::Arc;

/// What a `predict` call did to the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionMode {
    /// The previous forest was excluded and new trees were built.
    Rebuilt,
    /// The forest was narrowed onto candidates it already held.
    Updated,
}

/// Forest counters and a snapshot of its current size.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForestStats {
    /// Number of `predict` calls
    pub predictions: u64,
    /// Number of calls that rebuilt the forest
    pub rebuilds: u64,
    /// Number of calls that narrowed the existing forest
    pub updates: u64,
    /// Nodes currently held
    pub node_count: usize,
    /// Roots currently held
    pub root_count: usize,
    /// Size of the excluded history
    pub excluded_count: usize,
}

/// Predictive forest over a shared, read-only road index.
#[derive(Debug)]
pub struct PredictiveForest<N = RoadNetwork, B = ShortestPathTreeBuilder> {
    network: Arc<N>,
    builder: B,
    nodes: FxHashMap<NodeId, TreeNode>,
    excluded: FxHashSet<NodeId>,
    region: Option<Region>,
    time_range_km: f64,
    probability_threshold: f64,
    predictions: u64,
    rebuilds: u64,
    updates: u64,
}

impl PredictiveForest<RoadNetwork, ShortestPathTreeBuilder> {
    /// Forest expanding shortest-path trees over `network`.
    pub fn new(network: Arc<RoadNetwork>, config: &Config) -> Self {
        Self::with_builder(network, ShortestPathTreeBuilder, config)
    }
}

impl<N, B> PredictiveForest<N, B>
where
    N: RoadIndex,
    B: TreeBuilder<N>,
{
    /// Forest using a custom tree construction strategy.
    pub fn with_builder(network: Arc<N>, builder: B, config: &Config) -> Self {
        Self {
            network,
            builder,
            nodes: FxHashMap::default(),
            excluded: FxHashSet::default(),
            region: None,
            time_range_km: config.time_range_km,
            probability_threshold: config.probability_threshold,
            predictions: 0,
            rebuilds: 0,
            updates: 0,
        }
    }

    /// Update the forest for a newly observed region.
    ///
    /// Rebuilds when the forest is empty or holds none of the region's
    /// candidate roots, otherwise narrows the forest onto the candidates it
    /// holds. Probabilities are reassigned over the whole forest either way.
    pub fn predict(&mut self, region: Region) -> Result<PredictionMode> {
        if !region.is_valid() {
            return Err(ForestError::InvalidInput(format!(
                "region must have a finite center and non-negative radius, got {region:?}"
            )));
        }

        self.region = Some(region);
        let candidates = self.candidates(&region);
        let matched: Vec<NodeId> = candidates
            .iter()
            .copied()
            .filter(|id| self.nodes.contains_key(id))
            .collect();

        let mode = if self.nodes.is_empty() || matched.is_empty() {
            self.build(&candidates);
            self.rebuilds += 1;
            PredictionMode::Rebuilt
        } else {
            self.update(&matched);
            self.updates += 1;
            PredictionMode::Updated
        };

        self.assign_probabilities();
        self.predictions += 1;

        log::debug!(
            "Predict at ({}, {}): {} candidates, {} matched, {:?} to {} nodes in {} trees",
            region.center.lat(),
            region.center.lon(),
            candidates.len(),
            matched.len(),
            mode,
            self.nodes.len(),
            self.root_ids().len()
        );
        Ok(mode)
    }

    /// Drop the forest, the excluded history and the region.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.excluded.clear();
        self.region = None;
    }

    /// Candidate roots: neighbors of the node nearest the region center,
    /// deduplicated in query order and minus the excluded history.
    fn candidates(&self, region: &Region) -> Vec<NodeId> {
        let Some(center) = self.network.nearest(&region.center) else {
            return Vec::new();
        };

        let mut seen = FxHashSet::default();
        self.network
            .neighbors(center, region.radius_km)
            .into_iter()
            .filter(|id| !self.excluded.contains(id) && seen.insert(*id))
            .collect()
    }

    /// Exclude the whole forest, then merge a fresh tree per root.
    fn build(&mut self, roots: &[NodeId]) {
        self.excluded.extend(self.nodes.drain().map(|(id, _)| id));

        for &root in roots {
            let tree = self.builder.build(
                self.network.as_ref(),
                root,
                self.time_range_km,
                self.probability_threshold,
            );
            self.merge(&tree);
        }
    }

    /// Merge `tree` breadth-first, keeping the shorter path for shared nodes.
    fn merge(&mut self, tree: &ReachabilityTree) {
        let root = tree.root_id();
        let mut queue = VecDeque::from([root]);

        while let Some(id) = queue.pop_front() {
            if self.excluded.contains(&id) {
                continue;
            }
            let Some(incoming) = tree.get(id) else {
                continue;
            };

            let existing = self.nodes.get(&id).map(TreeNode::distance_to_root);
            let expand = match existing {
                None => {
                    self.add_node(incoming);
                    true
                }
                Some(distance) if incoming.distance_to_root() < distance => {
                    // Replacing an ancestor of the incoming parent would cut
                    // the branch being merged. Shortest-path trees never get
                    // here; only a custom builder whose distances shrink along
                    // a path can, and the existing copy is kept as is.
                    let cuts_branch = incoming
                        .parent()
                        .is_some_and(|parent| self.is_ancestor(id, parent));
                    if cuts_branch {
                        false
                    } else {
                        log::trace!(
                            "Node {id} moves to tree {root}: {} km beats {distance} km",
                            incoming.distance_to_root()
                        );
                        self.remove_subtree(id, |_| true);
                        self.add_node(incoming);
                        true
                    }
                }
                // Root already reached by an earlier tree: keep that copy
                Some(_) => id == root,
            };

            if expand {
                queue.extend(incoming.children().iter().copied());
            }
        }
    }

    /// Keep only the subtrees under `matched`, excluding everything else.
    fn update(&mut self, matched: &[NodeId]) {
        let mut included = FxHashSet::default();
        for &id in matched {
            assert!(self.nodes.contains_key(&id), "matched node {id} is not in the forest");
            included.extend(self.subtree(id));
        }

        for &id in matched {
            self.detach(id);
        }

        let orphans: Vec<NodeId> = included
            .iter()
            .copied()
            .filter(|id| {
                self.nodes[id]
                    .parent()
                    .is_some_and(|parent| !included.contains(&parent))
            })
            .collect();
        for id in orphans {
            self.detach(id);
        }

        for root in self.root_ids() {
            let removed = self.remove_subtree(root, |id| !included.contains(&id));
            log::trace!("Excluding {} nodes under {root}", removed.len());
            self.excluded.extend(removed);
        }
    }

    /// Roots get `1 / k`, every child `parent / degree`.
    fn assign_probabilities(&mut self) {
        let roots = self.root_ids();
        if roots.is_empty() {
            return;
        }
        let share = 1.0 / roots.len() as f64;

        for root in roots {
            if let Some(node) = self.nodes.get_mut(&root) {
                node.set_probability(share);
            }
            for id in self.subtree(root) {
                let node = &self.nodes[&id];
                if node.is_leaf() {
                    continue;
                }
                let child_share = node.probability() / node.children().len() as f64;
                let children = node.children().to_vec();
                for child in children {
                    if let Some(child) = self.nodes.get_mut(&child) {
                        child.set_probability(child_share);
                    }
                }
            }
        }
    }

    /// Admit a copy of `incoming` under its forest-resident parent.
    fn add_node(&mut self, incoming: &TreeNode) {
        let id = incoming.id();
        assert!(!self.excluded.contains(&id), "node {id} is excluded");
        assert!(!self.nodes.contains_key(&id), "node {id} is already in the forest");

        if let Some(parent) = incoming.parent() {
            let parent_node = self
                .nodes
                .get_mut(&parent)
                .unwrap_or_else(|| panic!("parent {parent} of node {id} is not in the forest"));
            parent_node.push_child(id);
        }
        self.nodes.insert(id, incoming.detached(incoming.parent()));
    }

    /// Remove the nodes of the subtree under `root` that satisfy `condition`,
    /// deepest first. Returns the removed ids in breadth-first order.
    fn remove_subtree(&mut self, root: NodeId, condition: impl Fn(NodeId) -> bool) -> Vec<NodeId> {
        let removed: Vec<NodeId> = self
            .subtree(root)
            .into_iter()
            .filter(|id| condition(*id))
            .collect();
        for &id in removed.iter().rev() {
            self.remove_node(id);
        }
        removed
    }

    fn remove_node(&mut self, id: NodeId) {
        let node = &self[id];
        assert!(
            node.is_leaf(),
            "node {id} still has children {:?}",
            node.children()
        );

        if let Some(parent) = node.parent() {
            let parent_node = self
                .nodes
                .get_mut(&parent)
                .unwrap_or_else(|| panic!("parent {parent} of node {id} is not in the forest"));
            assert!(
                parent_node.remove_child(id),
                "node {id} is missing from its parent's children"
            );
        }
        self.nodes.remove(&id);
    }

    /// Cut `id` loose from its parent, making it a root.
    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get(&id).and_then(TreeNode::parent) else {
            return;
        };
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .unwrap_or_else(|| panic!("parent {parent} of node {id} is not in the forest"));
        assert!(
            parent_node.remove_child(id),
            "node {id} is missing from its parent's children"
        );
        if let Some(node) = self.nodes.get_mut(&id) {
            node.set_parent(None);
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(TreeNode::parent);
        }
        false
    }
}

impl<N, B> PredictiveForest<N, B> {
    /// Root ids, sorted.
    pub fn root_ids(&self) -> Vec<NodeId> {
        let mut roots: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| node.is_root())
            .map(TreeNode::id)
            .collect();
        roots.sort_unstable();
        roots
    }

    /// Root nodes, sorted by id.
    pub fn roots(&self) -> Vec<&TreeNode> {
        self.root_ids()
            .into_iter()
            .filter_map(|id| self.nodes.get(&id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Every node currently held, roots and non-roots, in unspecified order.
    pub fn iter(&self) -> Values<'_, NodeId, TreeNode> {
        self.nodes.values()
    }

    /// Strict lookup.
    pub fn node(&self, id: NodeId) -> Result<&TreeNode> {
        self.nodes.get(&id).ok_or(ForestError::NodeNotFound(id))
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    /// Probability of `id`, 0 when it is not in the forest.
    pub fn probability(&self, id: NodeId) -> f64 {
        self.nodes.get(&id).map_or(0.0, TreeNode::probability)
    }

    /// Probability of `id` as the next step, i.e. when it is a direct child
    /// of one of the roots.
    pub fn next_step(&self, id: NodeId) -> Option<f64> {
        let node = self.nodes.get(&id)?;
        let parent = self.nodes.get(&node.parent()?)?;
        parent.is_root().then_some(node.probability())
    }

    /// Ids of the subtree under `id` in breadth-first order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        if !self.nodes.contains_key(&id) {
            return Vec::new();
        }

        let mut order = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            if let Some(node) = self.nodes.get(&id) {
                queue.extend(node.children().iter().copied());
            }
        }
        order
    }

    /// Ids that can never rejoin the forest until [`clear`](Self::clear).
    pub fn excluded(&self) -> &FxHashSet<NodeId> {
        &self.excluded
    }

    pub fn is_excluded(&self, id: NodeId) -> bool {
        self.excluded.contains(&id)
    }

    /// The region of the last `predict` call.
    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    pub fn time_range(&self) -> f64 {
        self.time_range_km
    }

    pub fn probability_threshold(&self) -> f64 {
        self.probability_threshold
    }

    pub fn network(&self) -> &Arc<N> {
        &self.network
    }

    pub fn stats(&self) -> ForestStats {
        ForestStats {
            predictions: self.predictions,
            rebuilds: self.rebuilds,
            updates: self.updates,
            node_count: self.nodes.len(),
            root_count: self.nodes.values().filter(|node| node.is_root()).count(),
            excluded_count: self.excluded.len(),
        }
    }
}

impl<N, B> Index<NodeId> for PredictiveForest<N, B> {
    type Output = TreeNode;

    fn index(&self, id: NodeId) -> &TreeNode {
        self.nodes
            .get(&id)
            .unwrap_or_else(|| panic!("node {id} is not in the forest"))
    }
}

impl<'a, N, B> IntoIterator for &'a PredictiveForest<N, B> {
    type Item = &'a TreeNode;
    type IntoIter = Values<'a, NodeId, TreeNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.values()
    }
}
