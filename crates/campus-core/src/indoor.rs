//! Indoor topology and the per-building path planner.

use std::collections::{HashMap, HashSet};

use crate::error::{IndoorError, LoadError};
use crate::models::{Building, IndoorNode, NodeKind};
use crate::search::{self, SearchFailure};

/// Walkable topology of one building. Immutable once built.
#[derive(Debug, Clone)]
pub struct IndoorGraph {
    nodes: Vec<IndoorNode>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<(usize, f64)>>,
    edge_count: usize,
    unit_weighted: bool,
}

/// A planned indoor segment.
#[derive(Debug, Clone, PartialEq)]
pub struct IndoorPath {
    pub nodes: Vec<String>,
    pub distance: f64,
}

impl IndoorGraph {
    pub fn builder(building: impl Into<String>) -> IndoorGraphBuilder {
        IndoorGraphBuilder {
            building: building.into(),
            nodes: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
            edges: HashSet::new(),
            unit_weighted: true,
        }
    }

    pub fn nodes(&self) -> &[IndoorNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&IndoorNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// True when every edge has weight 1, in which case BFS is used.
    pub fn is_unit_weighted(&self) -> bool {
        self.unit_weighted
    }

    /// Shortest path between two nodes of this building.
    pub fn shortest_path(
        &self,
        building: &str,
        from: &str,
        to: &str,
        max_settled: usize,
    ) -> Result<IndoorPath, IndoorError> {
        let no_path = || IndoorError::NoIndoorPathFound {
            building: building.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        };
        let (Some(&start), Some(&goal)) = (self.index.get(from), self.index.get(to)) else {
            return Err(no_path());
        };

        let result = if self.unit_weighted {
            search::bfs(&self.adjacency, start, goal, max_settled)
        } else {
            search::dijkstra(&self.adjacency, start, goal, max_settled)
        };

        match result {
            Ok(found) => Ok(IndoorPath {
                nodes: found
                    .nodes
                    .into_iter()
                    .map(|idx| self.nodes[idx].id.clone())
                    .collect(),
                distance: found.cost,
            }),
            Err(SearchFailure::Unreachable) => Err(no_path()),
            Err(SearchFailure::LimitExceeded { limit }) => Err(IndoorError::SearchLimitExceeded {
                building: building.to_string(),
                limit,
            }),
        }
    }
}

pub struct IndoorGraphBuilder {
    building: String,
    nodes: Vec<IndoorNode>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<(usize, f64)>>,
    edges: HashSet<(usize, usize)>,
    unit_weighted: bool,
}

impl IndoorGraphBuilder {
    pub fn add_node(&mut self, id: impl Into<String>, kind: NodeKind) -> Result<(), LoadError> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(LoadError::DuplicateIndoorNode {
                building: self.building.clone(),
                node: id,
            });
        }
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(IndoorNode { id, kind });
        self.adjacency.push(Vec::new());
        Ok(())
    }

    pub fn add_edge(&mut self, from: &str, to: &str, weight: f64) -> Result<(), LoadError> {
        let lookup = |node: &str| {
            self.index
                .get(node)
                .copied()
                .ok_or_else(|| LoadError::UnknownIndoorNode {
                    building: self.building.clone(),
                    node: node.to_string(),
                })
        };
        let a = lookup(from)?;
        let b = lookup(to)?;
        let edge_name = || (format!("{}:{}", self.building, from), format!("{}:{}", self.building, to));

        if a == b {
            let (from, to) = edge_name();
            return Err(LoadError::SelfLoop { from, to });
        }
        if !weight.is_finite() || weight < 0.0 {
            let (from, to) = edge_name();
            return Err(LoadError::InvalidWeight { from, to, weight });
        }
        if !self.edges.insert((a.min(b), a.max(b))) {
            let (from, to) = edge_name();
            return Err(LoadError::DuplicateEdge { from, to });
        }

        if weight != 1.0 {
            self.unit_weighted = false;
        }
        self.adjacency[a].push((b, weight));
        self.adjacency[b].push((a, weight));
        Ok(())
    }

    pub fn build(self) -> IndoorGraph {
        IndoorGraph {
            nodes: self.nodes,
            index: self.index,
            adjacency: self.adjacency,
            edge_count: self.edges.len(),
            unit_weighted: self.unit_weighted,
        }
    }
}

// === Entry/exit selection ===

/// Where a building sits within a route.
#[derive(Debug, Clone, Copy)]
pub struct HopContext<'a> {
    pub building: &'a Building,
    pub previous: Option<&'a Building>,
    pub next: Option<&'a Building>,
    /// Requested starting node; only set on the first hop
    pub from_node: Option<&'a str>,
    /// Requested destination room; only set on the last hop
    pub to_node: Option<&'a str>,
}

/// Chooses the indoor nodes a route enters and leaves a building through.
pub trait EntrancePolicy: Send + Sync {
    fn entry<'a>(&self, hop: &HopContext<'a>) -> Option<&'a str>;
    fn exit<'a>(&self, hop: &HopContext<'a>) -> Option<&'a str>;
}

/// Default policy: use the entrance facing the adjacent hop, falling back to
/// the geographically nearest entrance and then the primary entrance.
/// Terminal hops use the requested node or the primary entrance.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacingEntrancePolicy;

impl FacingEntrancePolicy {
    fn toward<'a>(building: &'a Building, neighbor: &Building) -> Option<&'a str> {
        if let Some(entrance) = building
            .entrances
            .iter()
            .find(|e| e.faces.iter().any(|f| f == &neighbor.id))
        {
            return Some(entrance.node.as_str());
        }

        building
            .entrances
            .iter()
            .filter_map(|e| e.location.map(|loc| (e, loc.distance_m(&neighbor.location))))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(e, _)| e.node.as_str())
            .or_else(|| building.primary_entrance())
    }
}

impl EntrancePolicy for FacingEntrancePolicy {
    fn entry<'a>(&self, hop: &HopContext<'a>) -> Option<&'a str> {
        match hop.previous {
            Some(previous) => Self::toward(hop.building, previous),
            None => hop.from_node.or_else(|| hop.building.primary_entrance()),
        }
    }

    fn exit<'a>(&self, hop: &HopContext<'a>) -> Option<&'a str> {
        match hop.next {
            Some(next) => Self::toward(hop.building, next),
            None => hop.to_node.or_else(|| hop.building.primary_entrance()),
        }
    }
}

/// Plan the indoor segment for one hop.
///
/// `Ok(None)` means there is nothing to plan: the building has no indoor
/// data or no usable entry/exit.
pub fn plan_hop(
    graph: Option<&IndoorGraph>,
    policy: &dyn EntrancePolicy,
    hop: &HopContext<'_>,
    max_settled: usize,
) -> Result<Option<IndoorPath>, IndoorError> {
    let Some(graph) = graph.filter(|g| !g.is_empty()) else {
        return Ok(None);
    };
    let (Some(entry), Some(exit)) = (policy.entry(hop), policy.exit(hop)) else {
        return Ok(None);
    };

    graph
        .shortest_path(&hop.building.id, entry, exit, max_settled)
        .map(Some)
}
