//! Campus graph store: buildings, building-level connectivity and the
//! indoor graphs, validated once and read-only afterwards.

use std::collections::{HashMap, HashSet};

use crate::error::{LoadError, NotFound};
use crate::indoor::IndoorGraph;
use crate::models::{Building, NodeKind};
use crate::search::connected_components;

#[derive(Debug, Clone)]
pub struct CampusGraph {
    buildings: Vec<Building>,
    index: HashMap<String, usize>,
    id_folded: HashMap<String, usize>,
    name_folded: HashMap<String, usize>,
    adjacency: Vec<Vec<(usize, f64)>>,
    indoor: Vec<Option<IndoorGraph>>,
    edge_count: usize,
}

impl CampusGraph {
    pub fn builder() -> CampusGraphBuilder {
        CampusGraphBuilder::default()
    }

    /// Look up a building by id, then case-insensitively by id or display name.
    pub fn resolve(&self, identifier: &str) -> Result<&Building, NotFound> {
        self.resolve_index(identifier)
            .map(|idx| &self.buildings[idx])
            .ok_or_else(|| NotFound(identifier.to_string()))
    }

    pub(crate) fn resolve_index(&self, identifier: &str) -> Option<usize> {
        let trimmed = identifier.trim();
        if let Some(&idx) = self.index.get(trimmed) {
            return Some(idx);
        }
        let folded = trimmed.to_lowercase();
        self.id_folded
            .get(&folded)
            .or_else(|| self.name_folded.get(&folded))
            .copied()
    }

    /// Exact-id lookup.
    pub fn building(&self, id: &str) -> Option<&Building> {
        self.index.get(id).map(|&idx| &self.buildings[idx])
    }

    pub(crate) fn building_at(&self, idx: usize) -> &Building {
        &self.buildings[idx]
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Adjacent buildings and edge weights, in data order.
    pub fn neighbors(&self, building_id: &str) -> Result<Vec<(&str, f64)>, NotFound> {
        let idx = self
            .index
            .get(building_id)
            .copied()
            .ok_or_else(|| NotFound(building_id.to_string()))?;
        Ok(self.adjacency[idx]
            .iter()
            .map(|&(next, weight)| (self.buildings[next].id.as_str(), weight))
            .collect())
    }

    /// Indoor topology of a building; `None` when there is no indoor data.
    pub fn indoor_graph(&self, building_id: &str) -> Option<&IndoorGraph> {
        self.index
            .get(building_id)
            .and_then(|&idx| self.indoor[idx].as_ref())
    }

    pub(crate) fn indoor_at(&self, idx: usize) -> Option<&IndoorGraph> {
        self.indoor[idx].as_ref()
    }

    pub(crate) fn adjacency(&self) -> &[Vec<(usize, f64)>] {
        &self.adjacency
    }

    /// Building whose anchor is closest to the given coordinate, with the
    /// distance in meters.
    pub fn nearest_building(&self, lat: f64, lon: f64) -> Option<(&Building, f64)> {
        let target = crate::spatial::GeoPoint::new(lat, lon);
        self.buildings
            .iter()
            .map(|b| (b, b.location.distance_m(&target)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Connected components of the building graph, as building ids.
    pub fn components(&self) -> Vec<Vec<&str>> {
        connected_components(&self.adjacency)
            .into_iter()
            .map(|members| {
                members
                    .into_iter()
                    .map(|idx| self.buildings[idx].id.as_str())
                    .collect()
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn indoor_count(&self) -> usize {
        self.indoor.iter().filter(|g| g.is_some()).count()
    }
}

#[derive(Debug, Default)]
pub struct CampusGraphBuilder {
    buildings: Vec<Building>,
    edges: Vec<(String, String, Option<f64>)>,
    indoor: Vec<(String, IndoorGraph)>,
}

impl CampusGraphBuilder {
    pub fn building(mut self, building: Building) -> Self {
        self.buildings.push(building);
        self
    }

    /// Undirected edge. Without a weight, the straight-line distance
    /// between the two anchors in miles is used.
    pub fn edge(mut self, from: impl Into<String>, to: impl Into<String>, weight: Option<f64>) -> Self {
        self.edges.push((from.into(), to.into(), weight));
        self
    }

    pub fn indoor(mut self, building_id: impl Into<String>, graph: IndoorGraph) -> Self {
        self.indoor.push((building_id.into(), graph));
        self
    }

    pub fn build(self) -> Result<CampusGraph, LoadError> {
        let mut index = HashMap::new();
        let mut id_folded = HashMap::new();
        let mut name_folded = HashMap::new();

        for (idx, building) in self.buildings.iter().enumerate() {
            if index.insert(building.id.clone(), idx).is_some() {
                return Err(LoadError::DuplicateBuilding(building.id.clone()));
            }
            if !building.location.is_valid() {
                return Err(LoadError::InvalidLocation(building.id.clone()));
            }
            id_folded.entry(building.id.to_lowercase()).or_insert(idx);
            name_folded.entry(building.name.to_lowercase()).or_insert(idx);
        }

        for building in &self.buildings {
            for entrance in &building.entrances {
                if let Some(faces) = entrance.faces.iter().find(|f| !index.contains_key(*f)) {
                    return Err(LoadError::UnknownFacing {
                        building: building.id.clone(),
                        node: entrance.node.clone(),
                        faces: faces.clone(),
                    });
                }
            }
            if let Some(primary) = &building.primary_entrance {
                if !building.has_entrance(primary) {
                    return Err(LoadError::UnknownPrimaryEntrance {
                        building: building.id.clone(),
                        node: primary.clone(),
                    });
                }
            }
        }

        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); self.buildings.len()];
        let mut seen = HashSet::new();
        for (from, to, weight) in &self.edges {
            let lookup = |id: &String| {
                index.get(id).copied().ok_or_else(|| LoadError::UnknownEdgeEndpoint {
                    from: from.clone(),
                    to: to.clone(),
                    missing: id.clone(),
                })
            };
            let a = lookup(from)?;
            let b = lookup(to)?;
            if a == b {
                return Err(LoadError::SelfLoop {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
            let weight = weight.unwrap_or_else(|| {
                self.buildings[a]
                    .location
                    .distance_miles(&self.buildings[b].location)
            });
            if !weight.is_finite() || weight < 0.0 {
                return Err(LoadError::InvalidWeight {
                    from: from.clone(),
                    to: to.clone(),
                    weight,
                });
            }
            if !seen.insert((a.min(b), a.max(b))) {
                return Err(LoadError::DuplicateEdge {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
            adjacency[a].push((b, weight));
            adjacency[b].push((a, weight));
        }

        let mut indoor: Vec<Option<IndoorGraph>> = vec![None; self.buildings.len()];
        for (building_id, graph) in self.indoor {
            let idx = index
                .get(&building_id)
                .copied()
                .ok_or_else(|| LoadError::UnknownIndoorBuilding(building_id.clone()))?;
            let building = &self.buildings[idx];
            for entrance in &building.entrances {
                match graph.node(&entrance.node) {
                    None => {
                        return Err(LoadError::MissingEntranceNode {
                            building: building.id.clone(),
                            node: entrance.node.clone(),
                        })
                    }
                    Some(node) if node.kind != NodeKind::Entrance => {
                        return Err(LoadError::EntranceKindMismatch {
                            building: building.id.clone(),
                            node: node.id.clone(),
                            kind: node.kind.to_string(),
                        })
                    }
                    Some(_) => {}
                }
            }
            indoor[idx] = Some(graph);
        }

        Ok(CampusGraph {
            buildings: self.buildings,
            index,
            id_folded,
            name_folded,
            adjacency,
            indoor,
            edge_count: seen.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campus() -> CampusGraph {
        CampusGraph::builder()
            .building(Building::new("iribe", "Iribe Center", 38.9891976, -76.9364811))
            .building(Building::new("esj", "Edward St. John", 38.9870707, -76.9417084))
            .building(Building::new("mckeldin", "McKeldin Library", 38.9858918, -76.9449387))
            .building(Building::new("armory", "Armory", 38.9859315, -76.9390126))
            .edge("iribe", "esj", Some(0.3))
            .edge("esj", "mckeldin", Some(0.4))
            .edge("iribe", "mckeldin", Some(0.9))
            .build()
            .unwrap()
    }

    #[test]
    fn resolve_by_id_and_display_name() {
        let graph = campus();
        assert_eq!(graph.resolve("esj").unwrap().id, "esj");
        assert_eq!(graph.resolve("ESJ").unwrap().id, "esj");
        assert_eq!(graph.resolve("mckeldin library").unwrap().id, "mckeldin");
        assert_eq!(graph.resolve("nowhere"), Err(NotFound("nowhere".into())));
    }

    #[test]
    fn neighbors_keep_data_order() {
        let graph = campus();
        assert_eq!(graph.neighbors("iribe").unwrap(), vec![("esj", 0.3), ("mckeldin", 0.9)]);
        assert!(graph.neighbors("armory").unwrap().is_empty());
        assert!(graph.neighbors("nowhere").is_err());
    }

    #[test]
    fn isolated_building_is_its_own_component() {
        let graph = campus();
        let components = graph.components();
        assert_eq!(components.len(), 2);
        assert!(components.contains(&vec!["armory"]));
    }

    #[test]
    fn nearest_building_by_anchor() {
        let graph = campus();
        let (building, distance_m) = graph.nearest_building(38.98919, -76.93648).unwrap();
        assert_eq!(building.id, "iribe");
        assert!(distance_m < 10.0);
    }

    #[test]
    fn missing_weight_defaults_to_straight_line_miles() {
        let graph = CampusGraph::builder()
            .building(Building::new("iribe", "Iribe Center", 38.9891976, -76.9364811))
            .building(Building::new("esj", "Edward St. John", 38.9870707, -76.9417084))
            .edge("iribe", "esj", None)
            .build()
            .unwrap();
        let (_, weight) = graph.neighbors("iribe").unwrap()[0];
        assert!(weight > 0.25 && weight < 0.4);
    }

    #[test]
    fn rejects_invalid_data() {
        let base = || {
            CampusGraph::builder()
                .building(Building::new("iribe", "Iribe Center", 38.9891976, -76.9364811))
                .building(Building::new("esj", "Edward St. John", 38.9870707, -76.9417084))
        };
        assert!(matches!(
            base().edge("iribe", "ghost", Some(1.0)).build(),
            Err(LoadError::UnknownEdgeEndpoint { missing, .. }) if missing == "ghost"
        ));
        assert!(matches!(
            base().edge("iribe", "esj", Some(-0.1)).build(),
            Err(LoadError::InvalidWeight { .. })
        ));
        assert!(matches!(
            base().edge("iribe", "esj", Some(f64::NAN)).build(),
            Err(LoadError::InvalidWeight { .. })
        ));
        assert!(matches!(
            base().edge("iribe", "esj", None).edge("esj", "iribe", None).build(),
            Err(LoadError::DuplicateEdge { .. })
        ));
        assert!(matches!(
            base()
                .building(Building::new("esj", "Duplicate", 38.0, -76.0))
                .build(),
            Err(LoadError::DuplicateBuilding(id)) if id == "esj"
        ));
        assert!(matches!(
            base()
                .building(Building::new("math", "Math", 38.98, -76.93).with_entrance("1298", &["glenn"]))
                .build(),
            Err(LoadError::UnknownFacing { .. })
        ));
    }

    #[test]
    fn entrance_must_exist_in_indoor_graph() {
        let mut floor = IndoorGraph::builder("math");
        floor.add_node("1298", NodeKind::Entrance).unwrap();
        floor.add_node("1300", NodeKind::Corridor).unwrap();
        let floor = floor.build();

        let result = CampusGraph::builder()
            .building(
                Building::new("math", "Mathematics", 38.9883216, -76.9393313)
                    .with_entrance("1298", &[])
                    .with_entrance("1199", &[]),
            )
            .indoor("math", floor.clone())
            .build();
        assert!(matches!(
            result,
            Err(LoadError::MissingEntranceNode { node, .. }) if node == "1199"
        ));

        let result = CampusGraph::builder()
            .building(Building::new("math", "Mathematics", 38.9883216, -76.9393313).with_entrance("1300", &[]))
            .indoor("math", floor.clone())
            .build();
        assert!(matches!(result, Err(LoadError::EntranceKindMismatch { .. })));

        let result = CampusGraph::builder()
            .building(Building::new("math", "Mathematics", 38.9883216, -76.9393313))
            .indoor("physics", floor)
            .build();
        assert!(matches!(result, Err(LoadError::UnknownIndoorBuilding(id)) if id == "physics"));
    }
}
