//! Error types for loading campus data and computing routes.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Which request field an identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    From,
    To,
    Building,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::From => "from",
            Endpoint::To => "to",
            Endpoint::Building => "building",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by lookups for an identifier that is not in the campus graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("building '{0}' not found")]
pub struct NotFound(pub String);

/// Request-level routing failures. Deterministic: retrying the same request
/// against the same graph reproduces the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("unknown building '{value}' in '{which}'")]
    UnknownBuilding { which: Endpoint, value: String },

    #[error("unknown indoor node '{value}' in building '{building}' ({which})")]
    UnknownNode {
        which: Endpoint,
        building: String,
        value: String,
    },

    #[error("no route found from '{from}' to '{to}'")]
    NoRouteFound { from: String, to: String },

    #[error("route search exceeded the limit of {limit} settled nodes")]
    SearchLimitExceeded { limit: usize },
}

/// Indoor planning failures. The route assembly absorbs these per hop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndoorError {
    #[error("no indoor path in '{building}' from '{from}' to '{to}'")]
    NoIndoorPathFound {
        building: String,
        from: String,
        to: String,
    },

    #[error("indoor search in '{building}' exceeded the limit of {limit} settled nodes")]
    SearchLimitExceeded { building: String, limit: usize },
}

/// Fatal problems in campus data. Raised only while loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("campus file not found in {0}")]
    MissingCampusFile(PathBuf),

    #[error("duplicate building id '{0}'")]
    DuplicateBuilding(String),

    #[error("building '{0}' has invalid coordinates")]
    InvalidLocation(String),

    #[error("edge {from} -> {to} references unknown building '{missing}'")]
    UnknownEdgeEndpoint {
        from: String,
        to: String,
        missing: String,
    },

    #[error("duplicate edge {from} -> {to}")]
    DuplicateEdge { from: String, to: String },

    #[error("edge {from} -> {to} is a self loop")]
    SelfLoop { from: String, to: String },

    #[error("edge {from} -> {to} has invalid weight {weight}")]
    InvalidWeight { from: String, to: String, weight: f64 },

    #[error("indoor data for unknown building '{0}'")]
    UnknownIndoorBuilding(String),

    #[error("building '{building}' has duplicate indoor node '{node}'")]
    DuplicateIndoorNode { building: String, node: String },

    #[error("building '{building}' indoor edge references unknown node '{node}'")]
    UnknownIndoorNode { building: String, node: String },

    #[error("building '{building}' entrance '{node}' is missing from its indoor graph")]
    MissingEntranceNode { building: String, node: String },

    #[error("building '{building}' node '{node}' is declared as an entrance but tagged {kind}")]
    EntranceKindMismatch {
        building: String,
        node: String,
        kind: String,
    },

    #[error("building '{building}' entrance '{node}' faces unknown building '{faces}'")]
    UnknownFacing {
        building: String,
        node: String,
        faces: String,
    },

    #[error("building '{building}' primary entrance '{node}' is not a declared entrance")]
    UnknownPrimaryEntrance { building: String, node: String },
}
