//! # reachforest-types
//!
//! Core coordinate, region and identifier types shared by the `reachforest`
//! prediction engine and its collaborators (network loaders, experiment
//! harnesses).
//!
//! - **Coordinate**: latitude/longitude pair with great-circle and planar distances
//! - **Region**: a circular query area around an observed position
//! - **Identifiers**: `NodeId`, `EdgeId`, `ObjectId`
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! geometric primitives.
//!
//! ## Examples
//!
//! ```rust
//! use reachforest_types::coordinate::Coordinate;
//! use reachforest_types::region::Region;
//!
//! let seattle = Coordinate::new(47.6062, -122.3321);
//! let tacoma = Coordinate::new(47.2529, -122.4443);
//! assert!(seattle.haversine_km(&tacoma) > 38.0);
//!
//! let region = Region::new(seattle, 0.2);
//! assert_eq!(region.radius_km, 0.2);
//! ```

pub mod coordinate;
pub mod region;

/// Identifier of a road network node.
pub type NodeId = i64;

/// Identifier of a road network edge.
pub type EdgeId = i64;

/// Identifier of a tracked moving object.
pub type ObjectId = u64;

pub use coordinate::Coordinate;
pub use region::Region;
