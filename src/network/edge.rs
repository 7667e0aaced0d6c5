use geo::{Rect, coord};
use reachforest_types::{Coordinate, EdgeId, NodeId};

/// A directed road segment between two nodes.
///
/// The bounding box starts as the endpoints' box padded by a fixed number of
/// degrees and grows to cover every shape point added afterwards.
#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    from: NodeId,
    to: NodeId,
    length_km: f64,
    bbox: Rect<f64>,
    shape: Vec<Coordinate>,
    name: Option<String>,
    kind: Option<String>,
}

impl Edge {
    pub(crate) fn new(
        id: EdgeId,
        from: (NodeId, Coordinate),
        to: (NodeId, Coordinate),
        padding_deg: f64,
    ) -> Self {
        let (from_id, from_loc) = from;
        let (to_id, to_loc) = to;

        let bbox = Rect::new(
            coord! {
                x: from_loc.lon().min(to_loc.lon()) - padding_deg,
                y: from_loc.lat().min(to_loc.lat()) - padding_deg,
            },
            coord! {
                x: from_loc.lon().max(to_loc.lon()) + padding_deg,
                y: from_loc.lat().max(to_loc.lat()) + padding_deg,
            },
        );

        Self {
            id,
            from: from_id,
            to: to_id,
            length_km: from_loc.haversine_km(&to_loc),
            bbox,
            shape: Vec::new(),
            name: None,
            kind: None,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    /// Great-circle length between the endpoints in kilometers.
    pub fn length_km(&self) -> f64 {
        self.length_km
    }

    pub fn bbox(&self) -> &Rect<f64> {
        &self.bbox
    }

    pub fn shape(&self) -> &[Coordinate] {
        &self.shape
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Whether `point` falls inside the (padded) bounding box.
    pub fn bbox_contains(&self, point: &Coordinate) -> bool {
        let min = self.bbox.min();
        let max = self.bbox.max();
        point.lat() >= min.y && point.lat() <= max.y && point.lon() >= min.x && point.lon() <= max.x
    }

    pub(crate) fn push_shape_point(&mut self, point: Coordinate) {
        let min = self.bbox.min();
        let max = self.bbox.max();
        self.bbox = Rect::new(
            coord! { x: min.x.min(point.lon()), y: min.y.min(point.lat()) },
            coord! { x: max.x.max(point.lon()), y: max.y.max(point.lat()) },
        );
        self.shape.push(point);
    }

    pub(crate) fn set_labels(&mut self, name: Option<String>, kind: Option<String>) {
        self.name = name;
        self.kind = kind;
    }
}
