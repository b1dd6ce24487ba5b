//! Mapping from routing failures to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use campus_core::{Endpoint, RouteError};
use serde_json::json;
use thiserror::Error;

/// Error body returned by the route endpoints.
///
/// Each failure class gets its own status so clients can tell bad input
/// (400) from a valid request with no connectivity (404).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("missing '{0}' in request body")]
    MissingField(Endpoint),

    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Route(RouteError::UnknownBuilding { which, value }) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "unknown_building", "which": which, "value": value }),
            ),
            ApiError::Route(RouteError::UnknownNode {
                which,
                building,
                value,
            }) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "unknown_node",
                    "which": which,
                    "building": building,
                    "value": value
                }),
            ),
            ApiError::Route(RouteError::NoRouteFound { from, to }) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "no_route_found", "from": from, "to": to }),
            ),
            ApiError::Route(RouteError::SearchLimitExceeded { limit }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "search_limit_exceeded", "limit": limit }),
            ),
            ApiError::MissingField(which) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "missing_endpoint", "which": which }),
            ),
            ApiError::InvalidCoordinate { lat, lon } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "invalid_coordinate",
                    "details": "lat must be within [-90, 90], lon within [-180, 180]",
                    "lat": lat,
                    "lon": lon
                }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
