//! Road network graph with a uniform grid index.
//!
//! The network is built once through [`RoadNetworkBuilder`] and is read-only
//! afterwards, so a single `Arc<RoadNetwork>` can back any number of
//! per-object forests. The only mutable state is each node's bag of
//! predicted objects, which sits behind its own lock.

mod builder;
mod edge;
mod grid;
mod node;

pub use builder::RoadNetworkBuilder;
pub use edge::Edge;
pub use grid::{CellId, GridIndex};
pub use node::{PredictedObjectRecord, RoadNode};

use crate::error::{ForestError, Result};
use reachforest_types::{Coordinate, EdgeId, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};

/// Spatial lookups a predictive forest needs from its road network.
///
/// Implemented by [`RoadNetwork`]; tests substitute scripted implementations.
pub trait RoadIndex {
    /// The node closest to `location`, if one can be found.
    fn nearest(&self, location: &Coordinate) -> Option<NodeId>;

    /// Nodes within `radius_km` of `center`, deduplicated.
    fn neighbors(&self, center: NodeId, radius_km: f64) -> Vec<NodeId>;
}

/// An immutable road graph plus its grid cell index.
#[derive(Debug)]
pub struct RoadNetwork {
    nodes: FxHashMap<NodeId, RoadNode>,
    edges: FxHashMap<EdgeId, Edge>,
    grid: GridIndex,
}

impl RoadNetwork {
    /// Start building a network.
    pub fn builder() -> RoadNetworkBuilder {
        RoadNetworkBuilder::new()
    }

    pub(crate) fn from_parts(
        nodes: FxHashMap<NodeId, RoadNode>,
        edges: FxHashMap<EdgeId, Edge>,
        grid: GridIndex,
    ) -> Self {
        Self { nodes, edges, grid }
    }

    pub fn node(&self, id: NodeId) -> Option<&RoadNode> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RoadNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    /// Outgoing `(neighbor, length_km)` pairs of `id` in adjacency order.
    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|node| node.out_edges().iter())
            .filter_map(|(to, edge)| self.edges.get(edge).map(|e| (*to, e.length_km())))
    }

    /// Great-circle distance between two nodes in kilometers.
    pub fn distance_km(&self, a: NodeId, b: NodeId) -> Result<f64> {
        let a = self.node(a).ok_or(ForestError::NodeNotFound(a))?;
        let b = self.node(b).ok_or(ForestError::NodeNotFound(b))?;
        Ok(a.location().haversine_km(b.location()))
    }

    /// Nearest node to a coordinate, searching only the coordinate's own cell.
    ///
    /// Candidates are the `from` endpoints of the cell's edges; the first one
    /// at minimum distance wins. Returns `None` for an empty or out-of-grid
    /// cell.
    pub fn nearest(&self, lat: f64, lon: f64) -> Option<NodeId> {
        let location = Coordinate::new(lat, lon);
        let Some(cell) = self.grid.cell_of(&location) else {
            log::warn!("Nearest-node query at ({lat}, {lon}) falls outside the grid");
            return None;
        };

        let mut best: Option<(NodeId, f64)> = None;
        for edge_id in self.grid.edges_in(cell) {
            let Some(from) = self.edges.get(edge_id).and_then(|e| self.nodes.get(&e.from()))
            else {
                continue;
            };
            let distance = location.haversine_km(from.location());
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((from.id(), distance));
            }
        }

        best.map(|(id, _)| id)
    }

    /// Whichever endpoint of `edge_id` is closer to the coordinate.
    ///
    /// Ties go to the `to` endpoint.
    pub fn nearest_on_edge(&self, lat: f64, lon: f64, edge_id: EdgeId) -> Result<NodeId> {
        let edge = self
            .edges
            .get(&edge_id)
            .ok_or(ForestError::EdgeNotFound(edge_id))?;
        let location = Coordinate::new(lat, lon);

        let from = self
            .node(edge.from())
            .ok_or(ForestError::NodeNotFound(edge.from()))?;
        let to = self
            .node(edge.to())
            .ok_or(ForestError::NodeNotFound(edge.to()))?;

        if location.haversine_km(from.location()) < location.haversine_km(to.location()) {
            Ok(from.id())
        } else {
            Ok(to.id())
        }
    }

    /// Nodes within `radius_km` of `center`, searching only the center's cell.
    ///
    /// Candidates are the `from` endpoints of the cell's edges, deduplicated in
    /// first-seen order. Unknown centers and empty cells yield no nodes.
    pub fn neighbors_within(&self, center: NodeId, radius_km: f64) -> Vec<NodeId> {
        let Some(center) = self.nodes.get(&center) else {
            return Vec::new();
        };
        let Some(cell) = self.grid.cell_of(center.location()) else {
            return Vec::new();
        };

        let mut seen = FxHashSet::default();
        let mut neighbors = Vec::new();
        for edge_id in self.grid.edges_in(cell) {
            let Some(from) = self.edges.get(edge_id).and_then(|e| self.nodes.get(&e.from()))
            else {
                continue;
            };
            if center.location().haversine_km(from.location()) <= radius_km
                && seen.insert(from.id())
            {
                neighbors.push(from.id());
            }
        }
        neighbors
    }
}

impl RoadIndex for RoadNetwork {
    fn nearest(&self, location: &Coordinate) -> Option<NodeId> {
        RoadNetwork::nearest(self, location.lat(), location.lon())
    }

    fn neighbors(&self, center: NodeId, radius_km: f64) -> Vec<NodeId> {
        self.neighbors_within(center, radius_km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A triangle near the lower corner of a 1°×1° box plus a far segment.
    fn small_network() -> RoadNetwork {
        let mut builder = RoadNetwork::builder().grid_size(10);
        builder
            .add_node(1, Coordinate::new(0.01, 0.01))
            .add_node(2, Coordinate::new(0.02, 0.01))
            .add_node(3, Coordinate::new(0.01, 0.03))
            .add_node(4, Coordinate::new(1.0, 1.0))
            .add_node(5, Coordinate::new(0.99, 0.99));
        builder
            .add_edge(100, 1, 2)
            .add_edge(101, 2, 3)
            .add_edge(102, 3, 1)
            .add_edge(103, 3, 2)
            .add_edge(104, 4, 5);
        builder.build().unwrap()
    }

    #[test]
    fn test_successors_follow_out_edges() {
        let network = small_network();
        let succ: Vec<_> = network.successors(3).collect();
        assert_eq!(succ.len(), 2);
        assert_eq!(succ[0].0, 1);
        assert_eq!(succ[1].0, 2);
        assert_eq!(succ[0].1, network.distance_km(3, 1).unwrap());
        assert_eq!(network.successors(99).count(), 0);
    }

    #[test]
    fn test_nearest_picks_closest_from_endpoint() {
        let network = small_network();
        assert_eq!(network.nearest(0.011, 0.011), Some(1));
        assert_eq!(network.nearest(0.019, 0.011), Some(2));
    }

    #[test]
    fn test_nearest_empty_cell() {
        let network = small_network();
        // Middle of the box: no edge overlaps that cell
        assert_eq!(network.nearest(0.55, 0.25), None);
        // Outside the grid entirely
        assert_eq!(network.nearest(5.0, 5.0), None);
    }

    #[test]
    fn test_nearest_on_edge() {
        let network = small_network();
        assert_eq!(network.nearest_on_edge(0.012, 0.01, 100).unwrap(), 1);
        assert_eq!(network.nearest_on_edge(0.019, 0.01, 100).unwrap(), 2);
        assert!(matches!(
            network.nearest_on_edge(0.0, 0.0, 999),
            Err(ForestError::EdgeNotFound(999))
        ));
    }

    #[test]
    fn test_neighbors_within_radius() {
        let network = small_network();
        let mut near = network.neighbors_within(1, 1.5);
        near.sort();
        // 1 -> 2 is ~1.1 km, 1 -> 3 is ~2.2 km
        assert_eq!(near, vec![1, 2]);

        let mut wide = network.neighbors_within(1, 5.0);
        wide.sort();
        assert_eq!(wide, vec![1, 2, 3]);

        assert!(network.neighbors_within(42, 5.0).is_empty());
    }

    #[test]
    fn test_road_index_trait() {
        let network = small_network();
        let index: &dyn RoadIndex = &network;
        assert_eq!(index.nearest(&Coordinate::new(0.011, 0.011)), Some(1));
        assert!(index.neighbors(1, 0.0).contains(&1));
    }
}
