//! Core data models for campus routing.

use serde::{Deserialize, Serialize};

use crate::spatial::GeoPoint;

/// A campus building: reference data loaded at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub location: GeoPoint,
    #[serde(default)]
    pub entrances: Vec<Entrance>,
    /// Defaults to the first declared entrance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_entrance: Option<String>,
}

/// An entrance: an indoor node that opens onto the campus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrance {
    pub node: String,
    /// Neighbouring buildings this entrance opens toward
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl Building {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: GeoPoint::new(lat, lon),
            entrances: Vec::new(),
            primary_entrance: None,
        }
    }

    pub fn with_entrance(mut self, node: impl Into<String>, faces: &[&str]) -> Self {
        self.entrances.push(Entrance {
            node: node.into(),
            faces: faces.iter().map(|s| s.to_string()).collect(),
            location: None,
        });
        self
    }

    /// The designated default entrance, if the building declares any.
    pub fn primary_entrance(&self) -> Option<&str> {
        self.primary_entrance
            .as_deref()
            .or_else(|| self.entrances.first().map(|e| e.node.as_str()))
    }

    pub fn has_entrance(&self, node: &str) -> bool {
        self.entrances.iter().any(|e| e.node == node)
    }
}

/// Indoor node type tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Entrance,
    #[default]
    Corridor,
    Stairs,
    Elevator,
    Room,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeKind::Entrance => "entrance",
            NodeKind::Corridor => "corridor",
            NodeKind::Stairs => "stairs",
            NodeKind::Elevator => "elevator",
            NodeKind::Room => "room",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndoorNode {
    pub id: String,
    pub kind: NodeKind,
}

// === Request/Response types ===

/// Route request as sent by the mobile client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Building id or display name
    pub from: String,
    /// Building id or display name
    pub to: String,
    /// Starting node inside the origin building
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_node: Option<String>,
    /// Destination room inside the destination building
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_node: Option<String>,
}

impl RouteRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            from_node: None,
            to_node: None,
        }
    }
}

/// Outcome of indoor planning for one hop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndoorStatus {
    #[default]
    Routed,
    /// The building has no indoor data
    Unmapped,
    /// Indoor data exists but the entry and exit are not connected
    Disconnected,
    /// Indoor data exists but no entry or exit node could be chosen: the
    /// building declares no entrances and the request named no node
    NoEntrance,
}

impl IndoorStatus {
    pub fn is_routed(&self) -> bool {
        matches!(self, IndoorStatus::Routed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteHop {
    /// Display name
    pub building: String,
    pub building_id: String,
    pub indoor_path: Vec<String>,
    #[serde(default)]
    pub indoor_distance: f64,
    #[serde(default, skip_serializing_if = "IndoorStatus::is_routed")]
    pub indoor_status: IndoorStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub total_distance: f64,
    pub route: Vec<RouteHop>,
}

impl RouteResult {
    pub fn building_ids(&self) -> Vec<&str> {
        self.route.iter().map(|hop| hop.building_id.as_str()).collect()
    }
}

/// Indoor-only route between two nodes of one building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndoorRoute {
    pub building: String,
    pub route: Vec<String>,
    pub total_distance: f64,
    #[serde(default, skip_serializing_if = "IndoorStatus::is_routed")]
    pub indoor_status: IndoorStatus,
}
