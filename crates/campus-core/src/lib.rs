//! Campus routing core: building-level and indoor shortest paths over an
//! immutable campus graph.

pub mod error;
pub mod graph;
pub mod indoor;
pub mod loader;
pub mod models;
pub mod router;
pub mod search;
pub mod service;
pub mod spatial;

pub use error::{Endpoint, IndoorError, LoadError, NotFound, RouteError};
pub use graph::{CampusGraph, CampusGraphBuilder};
pub use indoor::{EntrancePolicy, FacingEntrancePolicy, HopContext, IndoorGraph, IndoorPath};
pub use loader::load_campus_dir;
pub use models::{
    Building, Entrance, IndoorNode, IndoorRoute, IndoorStatus, NodeKind, RouteHop, RouteRequest,
    RouteResult,
};
pub use router::{shortest_building_path, BuildingPath};
pub use service::{RouteService, SearchLimits, DEFAULT_MAX_SETTLED_NODES};
pub use spatial::{haversine_distance, GeoPoint};
