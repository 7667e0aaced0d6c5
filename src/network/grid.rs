//! Uniform grid over the network's bounding box.
//!
//! Every edge is registered in each cell its padded bounding box overlaps, so
//! a point query only has to look at the edges of a single cell. Queries never
//! look at neighboring cells: a node sitting just across a cell boundary is
//! invisible to a query point on the other side.

use super::edge::Edge;
use reachforest_types::{Coordinate, EdgeId};
use rustc_hash::FxHashMap;
use std::ops::RangeInclusive;

/// Cell identifier, `row * grid_size + col`.
pub type CellId = usize;

#[derive(Debug, Clone)]
pub struct GridIndex {
    grid_size: usize,
    min: Coordinate,
    max: Coordinate,
    cell_lat: f64,
    cell_lon: f64,
    cells: FxHashMap<CellId, Vec<EdgeId>>,
}

impl GridIndex {
    /// Create an empty grid spanning `min..=max` with `grid_size` rows and columns.
    pub fn new(min: Coordinate, max: Coordinate, grid_size: usize) -> Self {
        assert!(grid_size > 0, "Grid size must be greater than zero");
        Self {
            grid_size,
            min,
            max,
            cell_lat: (max.lat() - min.lat()) / grid_size as f64,
            cell_lon: (max.lon() - min.lon()) / grid_size as f64,
            cells: FxHashMap::default(),
        }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn min(&self) -> &Coordinate {
        &self.min
    }

    pub fn max(&self) -> &Coordinate {
        &self.max
    }

    /// Register `edge` in every cell its bounding box overlaps.
    ///
    /// Edge ids are unique within a network, so each edge is expected to be
    /// inserted once.
    pub fn insert_edge(&mut self, edge: &Edge) {
        let bbox = edge.bbox();
        let (Some(rows), Some(cols)) = (
            self.span(bbox.min().y, bbox.max().y, self.min.lat(), self.cell_lat),
            self.span(bbox.min().x, bbox.max().x, self.min.lon(), self.cell_lon),
        ) else {
            return;
        };

        for row in rows {
            for col in cols.clone() {
                self.cells
                    .entry(row * self.grid_size + col)
                    .or_default()
                    .push(edge.id());
            }
        }
    }

    /// The cell containing `point`, or `None` when it lies outside the grid.
    pub fn cell_of(&self, point: &Coordinate) -> Option<CellId> {
        let row = Self::axis_index(point.lat(), self.min.lat(), self.max.lat(), self.cell_lat)?;
        let col = Self::axis_index(point.lon(), self.min.lon(), self.max.lon(), self.cell_lon)?;
        let row = row.min(self.grid_size - 1);
        let col = col.min(self.grid_size - 1);
        Some(row * self.grid_size + col)
    }

    /// Edges registered in `cell`, in registration order.
    pub fn edges_in(&self, cell: CellId) -> &[EdgeId] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of cells holding at least one edge.
    pub fn occupied_cells(&self) -> usize {
        self.cells.values().filter(|edges| !edges.is_empty()).count()
    }

    fn axis_index(value: f64, min: f64, max: f64, cell: f64) -> Option<usize> {
        if !value.is_finite() || value < min || value > max {
            return None;
        }
        if cell <= 0.0 {
            return Some(0);
        }
        Some(((value - min) / cell) as usize)
    }

    fn span(&self, low: f64, high: f64, origin: f64, cell: f64) -> Option<RangeInclusive<usize>> {
        let last = self.grid_size as i64 - 1;
        let (first, end) = if cell > 0.0 {
            (
                (((low - origin) / cell) as i64).max(0),
                (((high - origin) / cell) as i64).min(last),
            )
        } else {
            (0, 0)
        };

        if first > end {
            return None;
        }
        Some(first as usize..=end as usize)
    }
}
