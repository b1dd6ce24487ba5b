//! REST API routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use campus_core::{Endpoint, GeoPoint, IndoorNode, RouteRequest, RouteError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::api::auth::{self, AdminToken};
use crate::api::errors::ApiError;
use crate::config::Config;
use crate::state::{AppState, Snapshot};

/// Create the API router.
pub fn create_router(config: &Config) -> Router<Arc<AppState>> {
    let admin_token = AdminToken(Arc::new(config.admin_token.clone()));

    let public_routes = Router::new()
        .route("/route", post(route_handler))
        .route("/buildings", get(list_buildings))
        .route("/buildings/nearest", get(nearest_building))
        .route("/nodes", get(list_nodes))
        .route("/v1/status", get(get_status));

    let admin_routes = Router::new()
        .route("/v1/admin/reload", post(admin_reload))
        .layer(middleware::from_fn_with_state(admin_token, auth::require_admin));

    public_routes.merge(admin_routes)
}

// === Request/Response types ===

#[derive(Debug, Deserialize)]
pub struct RouteBody {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    /// Route between two nodes inside this building only
    pub building: Option<String>,
    pub from_node: Option<String>,
    pub to_node: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BuildingSummary {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub indoor: bool,
}

#[derive(Debug, Serialize)]
pub struct BuildingsResponse {
    pub buildings: Vec<BuildingSummary>,
}

#[derive(Debug, Deserialize)]
pub struct NodesQuery {
    pub building: String,
}

#[derive(Debug, Serialize)]
pub struct NodesResponse {
    pub building: String,
    pub nodes: Vec<IndoorNode>,
}

#[derive(Debug, Deserialize)]
pub struct NearestQuery {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Serialize)]
pub struct NearestResponse {
    pub building: String,
    pub name: String,
    pub distance_m: f64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: u64,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
    pub buildings: usize,
    pub edges: usize,
    pub indoor_graphs: usize,
    pub components: usize,
    pub max_settled_nodes: usize,
}

impl StatusResponse {
    fn from_snapshot(snapshot: &Snapshot) -> Self {
        let graph = snapshot.graph();
        Self {
            version: snapshot.version,
            loaded_at: snapshot.loaded_at,
            buildings: graph.len(),
            edges: graph.edge_count(),
            indoor_graphs: graph.indoor_count(),
            components: graph.components().len(),
            max_settled_nodes: snapshot.service.limits().max_settled_nodes,
        }
    }
}

// === Handlers ===

async fn route_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RouteBody>,
) -> Result<Response, ApiError> {
    if body.from.trim().is_empty() {
        return Err(ApiError::MissingField(Endpoint::From));
    }
    if body.to.trim().is_empty() {
        return Err(ApiError::MissingField(Endpoint::To));
    }

    let snapshot = state.snapshot();

    if let Some(building) = body.building.as_deref() {
        let route = snapshot
            .service
            .indoor_route(building, &body.from, &body.to)
            .inspect_err(log_rejection)?;
        return Ok(Json(route).into_response());
    }

    let request = RouteRequest {
        from: body.from,
        to: body.to,
        from_node: body.from_node,
        to_node: body.to_node,
    };
    let result = snapshot.service.route(&request).inspect_err(log_rejection)?;
    tracing::info!(
        from = %request.from,
        to = %request.to,
        hops = result.route.len(),
        total_distance = result.total_distance,
        version = snapshot.version,
        "route served"
    );
    Ok(Json(result).into_response())
}

fn log_rejection(err: &RouteError) {
    tracing::info!(error = %err, "route request rejected");
}

async fn list_buildings(State(state): State<Arc<AppState>>) -> Json<BuildingsResponse> {
    let snapshot = state.snapshot();
    let graph = snapshot.graph();
    let buildings = graph
        .buildings()
        .iter()
        .map(|b| BuildingSummary {
            id: b.id.clone(),
            name: b.name.clone(),
            lat: b.location.lat,
            lon: b.location.lon,
            indoor: graph.indoor_graph(&b.id).is_some(),
        })
        .collect();
    Json(BuildingsResponse { buildings })
}

async fn list_nodes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NodesQuery>,
) -> Result<Json<NodesResponse>, (StatusCode, Json<serde_json::Value>)> {
    let snapshot = state.snapshot();
    let graph = snapshot.graph();
    let building = graph.resolve(&query.building).map_err(|_| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "unknown_building",
                "which": "building",
                "value": query.building
            })),
        )
    })?;

    let nodes = graph
        .indoor_graph(&building.id)
        .map(|indoor| indoor.nodes().to_vec())
        .unwrap_or_default();

    Ok(Json(NodesResponse {
        building: building.id.clone(),
        nodes,
    }))
}

async fn nearest_building(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearestQuery>,
) -> Result<Response, ApiError> {
    if !GeoPoint::new(query.lat, query.lon).is_valid() {
        return Err(ApiError::InvalidCoordinate {
            lat: query.lat,
            lon: query.lon,
        });
    }

    let snapshot = state.snapshot();
    let response = match snapshot.graph().nearest_building(query.lat, query.lon) {
        Some((building, distance_m)) => Json(NearestResponse {
            building: building.id.clone(),
            name: building.name.clone(),
            distance_m,
        })
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no_buildings_loaded" })),
        )
            .into_response(),
    };
    Ok(response)
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse::from_snapshot(&state.snapshot()))
}

// === Admin Handlers ===

/// Reload campus data from disk and swap it in atomically.
async fn admin_reload(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.reload().await {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(json!(StatusResponse::from_snapshot(&snapshot))),
        ),
        Err(err) => {
            tracing::error!("campus reload failed, keeping previous graph: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "reload_failed",
                    "details": format!("{:#}", err),
                    "version": state.snapshot().version
                })),
            )
        }
    }
}
