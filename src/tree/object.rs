//! Per-object reachability tree with a movable current root.
//!
//! Instead of keeping probabilities to itself, an [`ObjectTree`] publishes them
//! into the predicted-object bag of every road node it can reach, so the
//! network can answer "which objects may arrive here" for many objects at
//! once. When the object moves one step along the tree, the old records are
//! withdrawn and the subtree under the new position is published again.

use super::{ReachabilityTree, ShortestPathTreeBuilder, TreeBuilder, TreeNode};
use crate::config::Config;
use crate::network::RoadNetwork;
use reachforest_types::{NodeId, ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How a child's probability is derived while publishing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbabilityModel {
    /// `parent / degree`: mass is split along the tree, so it shrinks with depth.
    #[default]
    Uniform,
    /// Network mobility model: every child gets `1 / degree` regardless of depth.
    Nmm,
}

impl ProbabilityModel {
    fn child_probability(self, parent: f64, degree: usize) -> f64 {
        match self {
            ProbabilityModel::Uniform => parent / degree as f64,
            ProbabilityModel::Nmm => 1.0 / degree as f64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectTree {
    tree: ReachabilityTree,
    current: NodeId,
    probability_threshold: f64,
    model: ProbabilityModel,
}

impl ObjectTree {
    /// Wrap an already built tree; the current root starts at the tree root.
    pub fn new(tree: ReachabilityTree, probability_threshold: f64) -> Self {
        Self {
            current: tree.root_id(),
            tree,
            probability_threshold,
            model: ProbabilityModel::default(),
        }
    }

    /// Expand a shortest-path tree from `root` using the configured time range.
    pub fn build(network: &RoadNetwork, root: NodeId, config: &Config) -> Self {
        let tree = ShortestPathTreeBuilder.build(
            network,
            root,
            config.time_range_km,
            config.probability_threshold,
        );
        Self::new(tree, config.probability_threshold)
    }

    pub fn with_model(mut self, model: ProbabilityModel) -> Self {
        self.model = model;
        self
    }

    pub fn model(&self) -> ProbabilityModel {
        self.model
    }

    pub fn tree(&self) -> &ReachabilityTree {
        &self.tree
    }

    /// The node the object is currently at.
    pub fn current(&self) -> &TreeNode {
        &self.tree.nodes[&self.current]
    }

    /// Whether `id` is a direct child of the current root.
    pub fn is_child(&self, id: NodeId) -> bool {
        self.tree.children(self.current).contains(&id)
    }

    /// Probability last published for `id`, 0 when it was not reached.
    pub fn probability(&self, network: &RoadNetwork, object: ObjectId, id: NodeId) -> f64 {
        network
            .node(id)
            .map_or(0.0, |node| node.predicted_probability(object))
    }

    /// Publish `object` into the bags of the nodes reachable from the current root.
    ///
    /// The walk is breadth-first; a child is recorded and expanded further only
    /// while its probability stays above the threshold. Recorded distances are
    /// measured from the current root. Returns the number of records written.
    pub fn assign_probabilities(&mut self, network: &RoadNetwork, object: ObjectId) -> usize {
        let origin = self.current().distance_to_root();
        if let Some(current) = self.tree.node_mut(self.current) {
            current.set_probability(1.0);
        }

        let mut published = 0;
        let mut queue = VecDeque::from([self.current]);
        while let Some(id) = queue.pop_front() {
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            let children = node.children().to_vec();
            let share = self
                .model
                .child_probability(node.probability(), children.len());

            for child in children {
                let Some(child_node) = self.tree.node_mut(child) else {
                    continue;
                };
                child_node.set_probability(share);
                if share <= self.probability_threshold {
                    continue;
                }

                let distance = child_node.distance_to_root() - origin;
                if let Some(road_node) = network.node(child) {
                    road_node.add_predicted_object(object, share, distance);
                    published += 1;
                }
                queue.push_back(child);
            }
        }

        log::trace!(
            "Published object {object} on {published} nodes from {}",
            self.current
        );
        published
    }

    /// Remove `object` from the bags of every node below the current root.
    pub fn withdraw(&self, network: &RoadNetwork, object: ObjectId) {
        for id in self.tree.bfs_from(self.current).into_iter().skip(1) {
            if let Some(node) = network.node(id) {
                node.remove_predicted_object(object);
            }
        }
    }

    /// Move the object one step to `next` and republish.
    ///
    /// The current root only moves when `next` is one of its children;
    /// otherwise the object stays put and its records are refreshed in place.
    /// Returns whether the root moved.
    pub fn advance(&mut self, network: &RoadNetwork, object: ObjectId, next: NodeId) -> bool {
        self.withdraw(network, object);
        let moved = self.is_child(next);
        if moved {
            self.current = next;
        }
        self.assign_probabilities(network, object);
        moved
    }
}
