//! Builder for road networks.
//!
//! Nodes, edges and edge shapes are collected first; `build` validates them,
//! computes edge lengths and bounding boxes, and fills the grid index.

use super::edge::Edge;
use super::grid::GridIndex;
use super::node::RoadNode;
use super::RoadNetwork;
use crate::config::Config;
use crate::error::{ForestError, Result};
use reachforest_types::{Coordinate, EdgeId, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug)]
struct PendingEdge {
    id: EdgeId,
    from: NodeId,
    to: NodeId,
    name: Option<String>,
    kind: Option<String>,
}

/// Builder for [`RoadNetwork`].
///
/// When `bounds` is set, only nodes strictly inside the box are kept, along
/// with the far endpoint of any edge that touches an inside node. Without
/// bounds the grid spans the bounding box of all nodes.
#[derive(Debug)]
pub struct RoadNetworkBuilder {
    grid_size: usize,
    padding_deg: f64,
    bounds: Option<(Coordinate, Coordinate)>,
    nodes: Vec<(NodeId, Coordinate)>,
    edges: Vec<PendingEdge>,
    shapes: FxHashMap<EdgeId, Vec<Coordinate>>,
}

impl RoadNetworkBuilder {
    /// Create a builder with the default grid size and edge padding.
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Create a builder taking grid size and edge padding from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            grid_size: config.grid_size,
            padding_deg: config.bbox_padding_deg,
            bounds: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            shapes: FxHashMap::default(),
        }
    }

    pub fn grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn padding(mut self, padding_deg: f64) -> Self {
        self.padding_deg = padding_deg;
        self
    }

    /// Restrict the network to the box between `min` and `max`.
    pub fn bounds(mut self, min: Coordinate, max: Coordinate) -> Self {
        self.bounds = Some((min, max));
        self
    }

    pub fn add_node(&mut self, id: NodeId, location: Coordinate) -> &mut Self {
        self.nodes.push((id, location));
        self
    }

    pub fn add_edge(&mut self, id: EdgeId, from: NodeId, to: NodeId) -> &mut Self {
        self.edges.push(PendingEdge {
            id,
            from,
            to,
            name: None,
            kind: None,
        });
        self
    }

    /// Add an edge carrying a street name and road class.
    pub fn add_labeled_edge(
        &mut self,
        id: EdgeId,
        from: NodeId,
        to: NodeId,
        name: impl Into<String>,
        kind: impl Into<String>,
    ) -> &mut Self {
        self.edges.push(PendingEdge {
            id,
            from,
            to,
            name: Some(name.into()),
            kind: Some(kind.into()),
        });
        self
    }

    /// Append a shape point to an edge's polyline.
    pub fn add_edge_shape(&mut self, edge: EdgeId, point: Coordinate) -> &mut Self {
        self.shapes.entry(edge).or_default().push(point);
        self
    }

    /// Validate the collected data and build the network.
    pub fn build(self) -> Result<RoadNetwork> {
        if self.grid_size == 0 {
            return Err(ForestError::InvalidConfig(
                "grid_size must be greater than zero".to_string(),
            ));
        }

        let mut all_nodes: FxHashMap<NodeId, Coordinate> = FxHashMap::default();
        for (id, location) in &self.nodes {
            if !location.is_finite() {
                return Err(ForestError::InvalidInput(format!(
                    "node {id} has non-finite coordinates"
                )));
            }
            if all_nodes.insert(*id, *location).is_some() {
                return Err(ForestError::DuplicateNode(*id));
            }
        }

        let (min, max) = match self.bounds {
            Some(bounds) => bounds,
            None => Self::extent(&self.nodes).ok_or_else(|| {
                ForestError::InvalidInput("cannot build a network without nodes or bounds".into())
            })?,
        };

        let inner: FxHashSet<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, location)| self.bounds.is_none() || strictly_inside(location, &min, &max))
            .map(|(id, _)| *id)
            .collect();
        let mut nodes: FxHashMap<NodeId, RoadNode> = self
            .nodes
            .iter()
            .filter(|(id, _)| inner.contains(id))
            .map(|(id, location)| (*id, RoadNode::new(*id, *location)))
            .collect();

        let mut edges: FxHashMap<EdgeId, Edge> = FxHashMap::default();
        let mut grid = GridIndex::new(min, max, self.grid_size);
        let mut shaped = FxHashSet::default();

        for pending in self.edges {
            let from_loc = *all_nodes
                .get(&pending.from)
                .ok_or(ForestError::NodeNotFound(pending.from))?;
            let to_loc = *all_nodes
                .get(&pending.to)
                .ok_or(ForestError::NodeNotFound(pending.to))?;

            if !inner.contains(&pending.from) && !inner.contains(&pending.to) {
                continue;
            }

            let duplicate = ForestError::DuplicateEdge {
                id: pending.id,
                from: pending.from,
                to: pending.to,
            };
            if edges.contains_key(&pending.id) {
                return Err(duplicate);
            }

            nodes
                .entry(pending.from)
                .or_insert_with(|| RoadNode::new(pending.from, from_loc));
            nodes
                .entry(pending.to)
                .or_insert_with(|| RoadNode::new(pending.to, to_loc));

            let added = nodes
                .get_mut(&pending.from)
                .is_some_and(|node| node.push_out_edge(pending.to, pending.id));
            if !added {
                return Err(duplicate);
            }
            if let Some(node) = nodes.get_mut(&pending.to) {
                node.push_in_edge(pending.from, pending.id);
            }

            let mut edge = Edge::new(
                pending.id,
                (pending.from, from_loc),
                (pending.to, to_loc),
                self.padding_deg,
            );
            edge.set_labels(pending.name, pending.kind);
            if let Some(points) = self.shapes.get(&pending.id) {
                for point in points {
                    edge.push_shape_point(*point);
                }
                shaped.insert(pending.id);
            }

            grid.insert_edge(&edge);
            edges.insert(pending.id, edge);
        }

        let orphan_shapes = self
            .shapes
            .keys()
            .filter(|id| !shaped.contains(*id))
            .count();
        if orphan_shapes > 0 {
            log::warn!("Ignoring shape points for {orphan_shapes} unknown edges");
        }
        if edges.is_empty() {
            log::warn!("Road network has no edges; spatial queries will find nothing");
        }

        log::debug!(
            "Built road network: {} nodes, {} edges, {} occupied cells of {}",
            nodes.len(),
            edges.len(),
            grid.occupied_cells(),
            self.grid_size * self.grid_size
        );

        Ok(RoadNetwork::from_parts(nodes, edges, grid))
    }

    fn extent(nodes: &[(NodeId, Coordinate)]) -> Option<(Coordinate, Coordinate)> {
        let (_, first) = nodes.first()?;
        let (mut min_lat, mut min_lon) = (first.lat(), first.lon());
        let (mut max_lat, mut max_lon) = (min_lat, min_lon);
        for (_, c) in nodes {
            min_lat = min_lat.min(c.lat());
            min_lon = min_lon.min(c.lon());
            max_lat = max_lat.max(c.lat());
            max_lon = max_lon.max(c.lon());
        }
        Some((
            Coordinate::new(min_lat, min_lon),
            Coordinate::new(max_lat, max_lon),
        ))
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn strictly_inside(location: &Coordinate, min: &Coordinate, max: &Coordinate) -> bool {
    location.lat() > min.lat()
        && location.lat() < max.lat()
        && location.lon() > min.lon()
        && location.lon() < max.lon()
}
