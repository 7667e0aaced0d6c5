//! Short-horizon location prediction over road networks.
//!
//! For a moving object, `reachforest` keeps a forest of reachability trees
//! rooted at the road nodes it may currently be at, and assigns every node
//! reachable within a travel distance budget a probability of being visited.
//!
//! ```rust
//! use reachforest::prelude::*;
//! use std::sync::Arc;
//!
//! let mut builder = RoadNetwork::builder();
//! builder
//!     .add_node(1, Coordinate::new(40.000, -74.000))
//!     .add_node(2, Coordinate::new(40.001, -74.000))
//!     .add_node(3, Coordinate::new(40.001, -74.001));
//! builder.add_edge(10, 1, 2).add_edge(11, 2, 3);
//! let network = Arc::new(builder.build()?);
//!
//! let mut forest = PredictiveForest::new(network, &Config::default());
//! forest.predict(Region::around(40.0, -74.0, 0.05))?;
//! assert_eq!(forest.root_ids(), vec![1]);
//! assert_eq!(forest.probability(3), 1.0);
//! # Ok::<(), reachforest::ForestError>(())
//! ```

pub mod config;
pub mod error;
pub mod forest;
pub mod network;
pub mod tracker;
pub mod tree;

pub use config::Config;
pub use error::{ForestError, Result};
pub use forest::{ForestStats, PredictionMode, PredictiveForest};
pub use network::{
    CellId, Edge, GridIndex, PredictedObjectRecord, RoadIndex, RoadNetwork, RoadNetworkBuilder,
    RoadNode,
};
pub use tracker::ObjectTracker;
pub use tree::{
    ObjectTree, ProbabilityModel, ReachabilityTree, ShortestPathTreeBuilder, TreeBuilder,
    TreeNode,
};

pub use reachforest_types::{Coordinate, EdgeId, NodeId, ObjectId, Region};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{Config, ForestError, Result};

    pub use crate::{Coordinate, NodeId, Region};

    pub use crate::{PredictionMode, PredictiveForest};

    pub use crate::{RoadIndex, RoadNetwork};

    pub use crate::{ReachabilityTree, TreeBuilder};

    pub use crate::ObjectTracker;
}
