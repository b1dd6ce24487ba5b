//! Inter-building router: shortest building sequence across the campus graph.

use crate::error::{Endpoint, RouteError};
use crate::graph::CampusGraph;
use crate::search::{self, SearchFailure};

/// Building-level result of a campus search.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingPath {
    /// Building ids from origin to destination inclusive
    pub buildings: Vec<String>,
    /// Sum of edge weights along the path
    pub distance: f64,
    pub settled: usize,
}

/// Resolve both identifiers, then run Dijkstra over the campus graph.
///
/// Identifiers are resolved before any traversal, so a bad `from` is always
/// reported as `UnknownBuilding` even if `to` is also bad.
pub fn shortest_building_path(
    graph: &CampusGraph,
    from: &str,
    to: &str,
    max_settled: usize,
) -> Result<BuildingPath, RouteError> {
    let start = resolve(graph, Endpoint::From, from)?;
    let goal = resolve(graph, Endpoint::To, to)?;
    let (indices, distance, settled) = route_indices(graph, start, goal, max_settled)?;
    Ok(BuildingPath {
        buildings: indices
            .into_iter()
            .map(|idx| graph.building_at(idx).id.clone())
            .collect(),
        distance,
        settled,
    })
}

pub(crate) fn resolve(graph: &CampusGraph, which: Endpoint, value: &str) -> Result<usize, RouteError> {
    graph
        .resolve_index(value)
        .ok_or_else(|| RouteError::UnknownBuilding {
            which,
            value: value.to_string(),
        })
}

pub(crate) fn route_indices(
    graph: &CampusGraph,
    start: usize,
    goal: usize,
    max_settled: usize,
) -> Result<(Vec<usize>, f64, usize), RouteError> {
    if start == goal {
        return Ok((vec![start], 0.0, 0));
    }

    // Always search from the lower index so a route and its reverse share
    // one path and one floating-point sum.
    let (source, target) = (start.min(goal), start.max(goal));
    match search::dijkstra(graph.adjacency(), source, target, max_settled) {
        Ok(mut found) => {
            if source != start {
                found.nodes.reverse();
            }
            Ok((found.nodes, found.cost, found.settled))
        }
        Err(SearchFailure::Unreachable) => Err(RouteError::NoRouteFound {
            from: graph.building_at(start).id.clone(),
            to: graph.building_at(goal).id.clone(),
        }),
        Err(SearchFailure::LimitExceeded { limit }) => {
            Err(RouteError::SearchLimitExceeded { limit })
        }
    }
}
