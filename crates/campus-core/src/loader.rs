//! Loads campus data from a directory of JSON files.
//!
//! Layout:
//! - `campus.json`: buildings and the edges between them
//! - `<building_id>.json`: indoor floor plan for that building
//!
//! Any problem is a [`LoadError`]; callers must not serve a partial graph.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::LoadError;
use crate::graph::CampusGraph;
use crate::indoor::IndoorGraph;
use crate::models::{Building, NodeKind};

pub const CAMPUS_FILE: &str = "campus.json";

#[derive(Debug, Clone, Deserialize)]
pub struct CampusFile {
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeRecord {
    pub from: String,
    pub to: String,
    /// Straight-line miles when omitted
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FloorPlanFile {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<FloorEdgeRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    /// Untagged nodes become entrances when the building declares them as
    /// such, corridors otherwise
    #[serde(default)]
    pub kind: Option<NodeKind>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FloorEdgeRecord {
    pub from: String,
    pub to: String,
    #[serde(default = "unit_weight")]
    pub weight: f64,
}

fn unit_weight() -> f64 {
    1.0
}

/// Load and validate a campus data directory.
pub fn load_campus_dir(dir: impl AsRef<Path>) -> Result<CampusGraph, LoadError> {
    let dir = dir.as_ref();
    let campus_path = dir.join(CAMPUS_FILE);
    if !campus_path.is_file() {
        return Err(LoadError::MissingCampusFile(dir.to_path_buf()));
    }
    let campus: CampusFile = read_json(&campus_path)?;

    let mut floor_plans = Vec::new();
    for path in floor_plan_paths(dir)? {
        let Some(building_id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        let plan: FloorPlanFile = read_json(&path)?;
        floor_plans.push((building_id, plan));
    }

    let graph = build_campus(campus, floor_plans)?;
    tracing::info!(
        buildings = graph.len(),
        edges = graph.edge_count(),
        indoor = graph.indoor_count(),
        dir = %dir.display(),
        "loaded campus graph"
    );
    Ok(graph)
}

/// Build a validated graph from already-parsed data.
pub fn build_campus(
    campus: CampusFile,
    floor_plans: Vec<(String, FloorPlanFile)>,
) -> Result<CampusGraph, LoadError> {
    let mut builder = CampusGraph::builder();

    let mut indoor = Vec::with_capacity(floor_plans.len());
    for (building_id, plan) in floor_plans {
        let entrances: HashSet<&str> = campus
            .buildings
            .iter()
            .find(|b| b.id == building_id)
            .map(|b| b.entrances.iter().map(|e| e.node.as_str()).collect())
            .unwrap_or_default();
        let graph = build_floor(&building_id, &plan, &entrances)?;
        tracing::debug!(building = %building_id, nodes = graph.nodes().len(), "loaded floor plan");
        indoor.push((building_id, graph));
    }

    for building in campus.buildings {
        builder = builder.building(building);
    }
    for edge in campus.edges {
        builder = builder.edge(edge.from, edge.to, edge.weight);
    }
    for (building_id, graph) in indoor {
        builder = builder.indoor(building_id, graph);
    }
    builder.build()
}

fn build_floor(
    building_id: &str,
    plan: &FloorPlanFile,
    entrances: &HashSet<&str>,
) -> Result<IndoorGraph, LoadError> {
    let mut builder = IndoorGraph::builder(building_id);
    for node in &plan.nodes {
        let kind = node.kind.unwrap_or(if entrances.contains(node.id.as_str()) {
            NodeKind::Entrance
        } else {
            NodeKind::Corridor
        });
        builder.add_node(node.id.clone(), kind)?;
    }
    for edge in &plan.edges {
        builder.add_edge(&edge.from, &edge.to, edge.weight)?;
    }
    Ok(builder.build())
}

fn floor_plan_paths(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let is_campus = path.file_name().is_some_and(|name| name == CAMPUS_FILE);
        if path.is_file() && is_json && !is_campus {
            paths.push(path);
        }
    }
    // read_dir order is platform dependent
    paths.sort();
    Ok(paths)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    const CAMPUS: &str = r#"{
        "buildings": [
            {"id": "iribe", "name": "Iribe Center", "lat": 38.9891976, "lon": -76.9364811},
            {"id": "esj", "name": "Edward St. John", "lat": 38.9870707, "lon": -76.9417084,
             "entrances": [{"node": "0399", "faces": ["iribe"]}, {"node": "1299"}]},
            {"id": "mckeldin", "name": "McKeldin Library", "lat": 38.9858918, "lon": -76.9449387}
        ],
        "edges": [
            {"from": "iribe", "to": "esj", "weight": 0.3},
            {"from": "esj", "to": "mckeldin", "weight": 0.4},
            {"from": "iribe", "to": "mckeldin"}
        ]
    }"#;

    const ESJ: &str = r#"{
        "nodes": [{"id": "0399"}, {"id": "0300"}, {"id": "1299"}, {"id": "1224", "kind": "room"}],
        "edges": [
            {"from": "0399", "to": "0300", "weight": 4},
            {"from": "0300", "to": "1299", "weight": 5},
            {"from": "1299", "to": "1224"}
        ]
    }"#;

    #[test]
    fn loads_campus_and_floor_plans() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), CAMPUS_FILE, CAMPUS);
        write(dir.path(), "esj.json", ESJ);
        write(dir.path(), "notes.txt", "ignored");

        let graph = load_campus_dir(dir.path()).unwrap();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.indoor_count(), 1);

        let esj = graph.indoor_graph("esj").unwrap();
        assert_eq!(esj.node("0399").unwrap().kind, NodeKind::Entrance);
        assert_eq!(esj.node("0300").unwrap().kind, NodeKind::Corridor);
        assert_eq!(esj.node("1224").unwrap().kind, NodeKind::Room);
        assert!(graph.indoor_graph("iribe").is_none());
    }

    #[test]
    fn missing_campus_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "esj.json", ESJ);
        assert!(matches!(
            load_campus_dir(dir.path()),
            Err(LoadError::MissingCampusFile(_))
        ));
    }

    #[test]
    fn malformed_json_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), CAMPUS_FILE, CAMPUS);
        write(dir.path(), "esj.json", "{ not json");
        assert!(matches!(load_campus_dir(dir.path()), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn floor_plan_for_unknown_building_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), CAMPUS_FILE, CAMPUS);
        write(dir.path(), "physics.json", r#"{"nodes": [{"id": "1197"}]}"#);
        assert!(matches!(
            load_campus_dir(dir.path()),
            Err(LoadError::UnknownIndoorBuilding(id)) if id == "physics"
        ));
    }

    #[test]
    fn missing_entrance_node_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), CAMPUS_FILE, CAMPUS);
        write(dir.path(), "esj.json", r#"{"nodes": [{"id": "0399"}], "edges": []}"#);
        assert!(matches!(
            load_campus_dir(dir.path()),
            Err(LoadError::MissingEntranceNode { node, .. }) if node == "1299"
        ));
    }

    #[test]
    fn bundled_data_directory_loads() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
        let graph = load_campus_dir(&dir).unwrap();
        assert_eq!(graph.len(), 9);
        assert_eq!(graph.indoor_count(), 3);
        assert_eq!(graph.components().len(), 1);

        let service = crate::service::RouteService::new(std::sync::Arc::new(graph));
        let result = service
            .route(&crate::models::RouteRequest::new("iribe", "mckeldin"))
            .unwrap();
        assert_eq!(result.building_ids(), vec!["iribe", "esj", "mckeldin"]);
        assert!((result.total_distance - 0.7).abs() < 1e-9);
        assert_eq!(result.route[1].indoor_path, vec!["0399", "0300", "0251", "1200", "1299"]);
    }
}
