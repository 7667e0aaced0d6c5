use parking_lot::RwLock;
use reachforest_types::{Coordinate, EdgeId, NodeId, ObjectId};
use rustc_hash::FxHashMap;

/// A prediction recorded on a road node for one moving object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictedObjectRecord {
    pub object_id: ObjectId,
    pub probability: f64,
    /// Travel distance (km) from the object's current root to this node
    pub distance_km: f64,
}

/// A road network intersection or shape point.
///
/// Adjacency is stored in insertion order and keyed by the neighbor node, so
/// a node has at most one outgoing edge to any given neighbor.
#[derive(Debug)]
pub struct RoadNode {
    id: NodeId,
    location: Coordinate,
    out_edges: Vec<(NodeId, EdgeId)>,
    in_edges: Vec<(NodeId, EdgeId)>,
    predicted: RwLock<FxHashMap<ObjectId, PredictedObjectRecord>>,
}

impl RoadNode {
    pub(crate) fn new(id: NodeId, location: Coordinate) -> Self {
        Self {
            id,
            location,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
            predicted: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn location(&self) -> &Coordinate {
        &self.location
    }

    /// Outgoing `(neighbor, edge)` pairs in insertion order.
    pub fn out_edges(&self) -> &[(NodeId, EdgeId)] {
        &self.out_edges
    }

    /// Incoming `(neighbor, edge)` pairs in insertion order.
    pub fn in_edges(&self) -> &[(NodeId, EdgeId)] {
        &self.in_edges
    }

    /// The edge leading from this node to `neighbor`, if any.
    pub fn out_edge_to(&self, neighbor: NodeId) -> Option<EdgeId> {
        self.out_edges
            .iter()
            .find(|(to, _)| *to == neighbor)
            .map(|(_, edge)| *edge)
    }

    /// The edge leading from `neighbor` into this node, if any.
    pub fn in_edge_from(&self, neighbor: NodeId) -> Option<EdgeId> {
        self.in_edges
            .iter()
            .find(|(from, _)| *from == neighbor)
            .map(|(_, edge)| *edge)
    }

    pub(crate) fn push_out_edge(&mut self, to: NodeId, edge: EdgeId) -> bool {
        if self.out_edge_to(to).is_some() {
            return false;
        }
        self.out_edges.push((to, edge));
        true
    }

    pub(crate) fn push_in_edge(&mut self, from: NodeId, edge: EdgeId) -> bool {
        if self.in_edge_from(from).is_some() {
            return false;
        }
        self.in_edges.push((from, edge));
        true
    }

    /// Record a prediction for `object_id`. An existing record is kept.
    pub fn add_predicted_object(&self, object_id: ObjectId, probability: f64, distance_km: f64) {
        self.predicted
            .write()
            .entry(object_id)
            .or_insert(PredictedObjectRecord {
                object_id,
                probability,
                distance_km,
            });
    }

    pub fn remove_predicted_object(&self, object_id: ObjectId) -> Option<PredictedObjectRecord> {
        self.predicted.write().remove(&object_id)
    }

    pub fn predicted_object(&self, object_id: ObjectId) -> Option<PredictedObjectRecord> {
        self.predicted.read().get(&object_id).copied()
    }

    /// Snapshot of every prediction currently recorded on this node.
    pub fn predicted_objects(&self) -> Vec<PredictedObjectRecord> {
        self.predicted.read().values().copied().collect()
    }

    /// Probability recorded for `object_id`, 0 when there is none.
    pub fn predicted_probability(&self, object_id: ObjectId) -> f64 {
        self.predicted
            .read()
            .get(&object_id)
            .map_or(0.0, |record| record.probability)
    }

    pub fn clear_predicted_objects(&self) {
        self.predicted.write().clear();
    }
}
