//! Route assembly: the single entry point that turns a request into a full
//! building-by-building route with indoor segments.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Endpoint, IndoorError, RouteError};
use crate::graph::CampusGraph;
use crate::indoor::{plan_hop, EntrancePolicy, FacingEntrancePolicy, HopContext};
use crate::models::{IndoorRoute, IndoorStatus, RouteHop, RouteRequest, RouteResult};
use crate::router::{resolve, route_indices};

pub const DEFAULT_MAX_SETTLED_NODES: usize = 10_000;

/// Bounds on the work a single search may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    pub max_settled_nodes: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_settled_nodes: DEFAULT_MAX_SETTLED_NODES,
        }
    }
}

/// Stateless route service over an immutable campus graph snapshot.
#[derive(Clone)]
pub struct RouteService {
    graph: Arc<CampusGraph>,
    policy: Arc<dyn EntrancePolicy>,
    limits: SearchLimits,
}

impl RouteService {
    pub fn new(graph: Arc<CampusGraph>) -> Self {
        Self {
            graph,
            policy: Arc::new(FacingEntrancePolicy),
            limits: SearchLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_policy(mut self, policy: impl EntrancePolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn graph(&self) -> &CampusGraph {
        &self.graph
    }

    pub fn limits(&self) -> SearchLimits {
        self.limits
    }

    /// Compute the route for a request.
    ///
    /// Validation errors (`UnknownBuilding`, `UnknownNode`) are returned
    /// before any search. Indoor planning failures never fail the route;
    /// the affected hop gets an empty path and a non-`routed` status.
    pub fn route(&self, request: &RouteRequest) -> Result<RouteResult, RouteError> {
        let graph = self.graph.as_ref();
        let start = resolve(graph, Endpoint::From, &request.from)?;
        let goal = resolve(graph, Endpoint::To, &request.to)?;

        self.check_node(start, Endpoint::From, request.from_node.as_deref())?;
        self.check_node(goal, Endpoint::To, request.to_node.as_deref())?;

        let max_settled = self.limits.max_settled_nodes;
        let (path, total_distance, settled) = route_indices(graph, start, goal, max_settled)?;

        let last = path.len() - 1;
        let mut route = Vec::with_capacity(path.len());
        for (i, &idx) in path.iter().enumerate() {
            let building = graph.building_at(idx);
            let hop = HopContext {
                building,
                previous: i.checked_sub(1).map(|p| graph.building_at(path[p])),
                next: path.get(i + 1).map(|&n| graph.building_at(n)),
                from_node: request.from_node.as_deref().filter(|_| i == 0),
                to_node: request.to_node.as_deref().filter(|_| i == last),
            };

            let indoor = graph.indoor_at(idx);
            let (indoor_path, indoor_distance, indoor_status) =
                match plan_hop(indoor, self.policy.as_ref(), &hop, max_settled) {
                    Ok(Some(planned)) => (planned.nodes, planned.distance, IndoorStatus::Routed),
                    Ok(None) if indoor.is_some_and(|g| !g.is_empty()) => {
                        (Vec::new(), 0.0, IndoorStatus::NoEntrance)
                    }
                    Ok(None) => (Vec::new(), 0.0, IndoorStatus::Unmapped),
                    Err(err) => {
                        degraded(&err);
                        (Vec::new(), 0.0, IndoorStatus::Disconnected)
                    }
                };

            route.push(RouteHop {
                building: building.name.clone(),
                building_id: building.id.clone(),
                indoor_path,
                indoor_distance,
                indoor_status,
            });
        }

        tracing::debug!(
            from = %graph.building_at(start).id,
            to = %graph.building_at(goal).id,
            hops = route.len(),
            settled,
            total_distance,
            "route computed"
        );

        Ok(RouteResult {
            total_distance,
            route,
        })
    }

    /// Indoor-only route between two nodes of one building.
    pub fn indoor_route(
        &self,
        building: &str,
        from_node: &str,
        to_node: &str,
    ) -> Result<IndoorRoute, RouteError> {
        let idx = resolve(self.graph.as_ref(), Endpoint::Building, building)?;
        let building = self.graph.building_at(idx);

        let Some(indoor) = self.graph.indoor_at(idx).filter(|g| !g.is_empty()) else {
            return Ok(IndoorRoute {
                building: building.id.clone(),
                route: Vec::new(),
                total_distance: 0.0,
                indoor_status: IndoorStatus::Unmapped,
            });
        };

        self.check_node(idx, Endpoint::From, Some(from_node))?;
        self.check_node(idx, Endpoint::To, Some(to_node))?;

        match indoor.shortest_path(&building.id, from_node, to_node, self.limits.max_settled_nodes) {
            Ok(path) => Ok(IndoorRoute {
                building: building.id.clone(),
                route: path.nodes,
                total_distance: path.distance,
                indoor_status: IndoorStatus::Routed,
            }),
            Err(IndoorError::NoIndoorPathFound { .. }) => Ok(IndoorRoute {
                building: building.id.clone(),
                route: Vec::new(),
                total_distance: 0.0,
                indoor_status: IndoorStatus::Disconnected,
            }),
            Err(IndoorError::SearchLimitExceeded { limit, .. }) => {
                Err(RouteError::SearchLimitExceeded { limit })
            }
        }
    }

    fn check_node(&self, idx: usize, which: Endpoint, node: Option<&str>) -> Result<(), RouteError> {
        let Some(node) = node else {
            return Ok(());
        };
        let known = self
            .graph
            .indoor_at(idx)
            .is_some_and(|indoor| indoor.contains(node));
        if known {
            Ok(())
        } else {
            Err(RouteError::UnknownNode {
                which,
                building: self.graph.building_at(idx).id.clone(),
                value: node.to_string(),
            })
        }
    }
}

fn degraded(err: &IndoorError) {
    tracing::warn!(error = %err, "indoor planning failed, returning hop without indoor path");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indoor::IndoorGraph;
    use crate::models::{Building, NodeKind};

    fn floor(building: &str, nodes: &[(&str, NodeKind)], edges: &[(&str, &str, f64)]) -> IndoorGraph {
        let mut builder = IndoorGraph::builder(building);
        for (id, kind) in nodes {
            builder.add_node(*id, *kind).unwrap();
        }
        for (a, b, w) in edges {
            builder.add_edge(a, b, *w).unwrap();
        }
        builder.build()
    }

    /// iribe - esj - mckeldin, plus an expensive direct iribe - mckeldin
    /// edge. esj has indoor data; iribe has a disconnected floor plan;
    /// mckeldin has none. armory is isolated.
    fn campus() -> Arc<CampusGraph> {
        use NodeKind::*;
        let esj = floor(
            "esj",
            &[("0399", Entrance), ("0300", Corridor), ("0250", Stairs), ("1299", Entrance), ("1224", Room)],
            &[("0399", "0300", 4.0), ("0300", "0250", 2.0), ("0250", "1299", 3.0), ("1299", "1224", 1.5)],
        );
        let iribe = floor(
            "iribe",
            &[("main", Entrance), ("west", Entrance), ("lobby", Corridor)],
            &[("main", "lobby", 1.0)],
        );

        let graph = CampusGraph::builder()
            .building(
                Building::new("iribe", "Iribe Center", 38.9891976, -76.9364811)
                    .with_entrance("main", &[])
                    .with_entrance("west", &["esj"]),
            )
            .building(
                Building::new("esj", "Edward St. John", 38.9870707, -76.9417084)
                    .with_entrance("0399", &["iribe"])
                    .with_entrance("1299", &["mckeldin"]),
            )
            .building(Building::new("mckeldin", "McKeldin Library", 38.9858918, -76.9449387))
            .building(Building::new("armory", "Armory", 38.9859315, -76.9390126))
            .edge("iribe", "esj", Some(0.3))
            .edge("esj", "mckeldin", Some(0.4))
            .edge("iribe", "mckeldin", Some(0.9))
            .indoor("esj", esj)
            .indoor("iribe", iribe)
            .build()
            .unwrap();
        Arc::new(graph)
    }

    #[test]
    fn assembles_hops_with_indoor_detail() {
        let service = RouteService::new(campus());
        let result = service.route(&RouteRequest::new("iribe", "mckeldin")).unwrap();

        assert_eq!(result.building_ids(), vec!["iribe", "esj", "mckeldin"]);
        assert!((result.total_distance - 0.7).abs() < 1e-9);

        // iribe: main -> west is disconnected indoors, so the hop degrades
        let iribe = &result.route[0];
        assert_eq!(iribe.building, "Iribe Center");
        assert!(iribe.indoor_path.is_empty());
        assert_eq!(iribe.indoor_status, IndoorStatus::Disconnected);

        let esj = &result.route[1];
        assert_eq!(esj.indoor_path, vec!["0399", "0300", "0250", "1299"]);
        assert_eq!(esj.indoor_distance, 9.0);
        assert_eq!(esj.indoor_status, IndoorStatus::Routed);

        let mckeldin = &result.route[2];
        assert!(mckeldin.indoor_path.is_empty());
        assert_eq!(mckeldin.indoor_status, IndoorStatus::Unmapped);
    }

    #[test]
    fn resolves_display_names() {
        let service = RouteService::new(campus());
        let result = service
            .route(&RouteRequest::new("Iribe Center", "mckeldin library"))
            .unwrap();
        assert_eq!(result.building_ids(), vec!["iribe", "esj", "mckeldin"]);
    }

    #[test]
    fn destination_room_ends_last_hop() {
        let service = RouteService::new(campus());
        let mut request = RouteRequest::new("iribe", "esj");
        request.to_node = Some("1224".into());
        let result = service.route(&request).unwrap();
        assert_eq!(result.route[1].indoor_path, vec!["0399", "0300", "0250", "1299", "1224"]);
    }

    #[test]
    fn same_building_route_uses_requested_nodes() {
        let service = RouteService::new(campus());
        let mut request = RouteRequest::new("esj", "esj");
        request.from_node = Some("0300".into());
        request.to_node = Some("1224".into());
        let result = service.route(&request).unwrap();
        assert_eq!(result.total_distance, 0.0);
        assert_eq!(result.route.len(), 1);
        assert_eq!(result.route[0].indoor_path, vec!["0300", "0250", "1299", "1224"]);
    }

    #[test]
    fn unknown_origin_never_yields_partial_result() {
        let service = RouteService::new(campus());
        let err = service.route(&RouteRequest::new("nonexistent", "iribe")).unwrap_err();
        assert_eq!(
            err,
            RouteError::UnknownBuilding {
                which: Endpoint::From,
                value: "nonexistent".into()
            }
        );
    }

    #[test]
    fn unknown_room_is_a_validation_error() {
        let service = RouteService::new(campus());
        let mut request = RouteRequest::new("iribe", "mckeldin");
        request.to_node = Some("B101".into());
        let err = service.route(&request).unwrap_err();
        assert!(matches!(
            err,
            RouteError::UnknownNode { which: Endpoint::To, ref building, .. } if building == "mckeldin"
        ));
    }

    #[test]
    fn disconnected_campus_reports_no_route() {
        let service = RouteService::new(campus());
        let err = service.route(&RouteRequest::new("armory", "esj")).unwrap_err();
        assert_eq!(
            err,
            RouteError::NoRouteFound {
                from: "armory".into(),
                to: "esj".into()
            }
        );
    }

    #[test]
    fn repeated_requests_are_byte_identical() {
        let service = RouteService::new(campus());
        let request = RouteRequest::new("iribe", "mckeldin");
        let first = serde_json::to_vec(&service.route(&request).unwrap()).unwrap();
        for _ in 0..10 {
            let again = serde_json::to_vec(&service.route(&request).unwrap()).unwrap();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn concurrent_requests_share_one_snapshot() {
        let service = RouteService::new(campus());
        let expected = service.route(&RouteRequest::new("mckeldin", "iribe")).unwrap();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| service.route(&RouteRequest::new("mckeldin", "iribe")).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn routed_status_is_omitted_from_json() {
        let service = RouteService::new(campus());
        let result = service.route(&RouteRequest::new("iribe", "mckeldin")).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["route"][1].get("indoor_status").is_none());
        assert_eq!(json["route"][2]["indoor_status"], "unmapped");
        assert_eq!(json["route"][0]["building"], "Iribe Center");
    }

    #[test]
    fn indoor_only_route() {
        let service = RouteService::new(campus());
        let route = service.indoor_route("esj", "0399", "1224").unwrap();
        assert_eq!(route.route, vec!["0399", "0300", "0250", "1299", "1224"]);
        assert_eq!(route.total_distance, 10.5);

        let route = service.indoor_route("iribe", "main", "west").unwrap();
        assert_eq!(route.indoor_status, IndoorStatus::Disconnected);
        assert!(route.route.is_empty());

        let route = service.indoor_route("mckeldin", "a", "b").unwrap();
        assert_eq!(route.indoor_status, IndoorStatus::Unmapped);

        assert!(matches!(
            service.indoor_route("esj", "0399", "9999"),
            Err(RouteError::UnknownNode { which: Endpoint::To, .. })
        ));
        assert!(matches!(
            service.indoor_route("ghost", "a", "b"),
            Err(RouteError::UnknownBuilding { which: Endpoint::Building, .. })
        ));
    }

    #[test]
    fn indoor_search_cap_degrades_hop() {
        let service = RouteService::new(campus()).with_limits(SearchLimits { max_settled_nodes: 3 });
        let mut request = RouteRequest::new("iribe", "esj");
        request.to_node = Some("1224".into());
        let result = service.route(&request).unwrap();
        assert_eq!(result.building_ids(), vec!["iribe", "esj"]);
        assert_eq!(result.route[1].indoor_status, IndoorStatus::Disconnected);
        assert!(result.route[1].indoor_path.is_empty());
    }

    #[test]
    fn floor_plan_without_entrances_is_not_unmapped() {
        let hjp = floor(
            "hjp",
            &[("0100", NodeKind::Corridor), ("0101", NodeKind::Room)],
            &[("0100", "0101", 1.0)],
        );
        let graph = CampusGraph::builder()
            .building(Building::new("esj", "Edward St. John", 38.9870707, -76.9417084))
            .building(Building::new("hjp", "H.J. Patterson Hall", 38.986903, -76.943769))
            .edge("esj", "hjp", Some(0.3))
            .indoor("hjp", hjp)
            .build()
            .unwrap();
        let service = RouteService::new(Arc::new(graph));

        let result = service.route(&RouteRequest::new("esj", "hjp")).unwrap();
        assert_eq!(result.route[0].indoor_status, IndoorStatus::Unmapped);
        assert_eq!(result.route[1].indoor_status, IndoorStatus::NoEntrance);
        assert!(result.route[1].indoor_path.is_empty());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["route"][1]["indoor_status"], "no_entrance");

        // A requested destination node gives the planner an exit again
        let mut request = RouteRequest::new("hjp", "hjp");
        request.from_node = Some("0100".into());
        request.to_node = Some("0101".into());
        let result = service.route(&request).unwrap();
        assert_eq!(result.route[0].indoor_status, IndoorStatus::Routed);
    }
}
