//! Offline campus route queries over a data directory.

use anyhow::{Context, Result};
use campus_core::{CampusGraph, GeoPoint, RouteRequest, RouteService, SearchLimits};
use clap::Subcommand;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Route between two buildings
    Route {
        from: String,
        to: String,
        /// Indoor node to start from in the origin building
        #[arg(long)]
        from_node: Option<String>,
        /// Indoor node to end at in the destination building
        #[arg(long)]
        to_node: Option<String>,
    },
    /// Route between two nodes inside one building
    Indoor {
        building: String,
        from: String,
        to: String,
    },
    /// List buildings
    Buildings,
    /// Nearest building to a coordinate
    Nearest {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lon: f64,
    },
    /// Load the data directory and report what it contains
    Validate,
}

/// Run a command against a loaded graph and return its JSON output.
pub fn run(graph: Arc<CampusGraph>, limits: SearchLimits, command: Command) -> Result<Value> {
    let service = RouteService::new(graph.clone()).with_limits(limits);

    let output = match command {
        Command::Route {
            from,
            to,
            from_node,
            to_node,
        } => {
            let request = RouteRequest {
                from,
                to,
                from_node,
                to_node,
            };
            let result = service
                .route(&request)
                .with_context(|| format!("routing {} -> {}", request.from, request.to))?;
            serde_json::to_value(result)?
        }
        Command::Indoor { building, from, to } => {
            let route = service
                .indoor_route(&building, &from, &to)
                .with_context(|| format!("indoor routing in {}", building))?;
            serde_json::to_value(route)?
        }
        Command::Buildings => {
            let buildings: Vec<Value> = graph
                .buildings()
                .iter()
                .map(|b| {
                    json!({
                        "id": b.id,
                        "name": b.name,
                        "lat": b.location.lat,
                        "lon": b.location.lon,
                        "indoor": graph.indoor_graph(&b.id).is_some(),
                    })
                })
                .collect();
            json!({ "buildings": buildings })
        }
        Command::Nearest { lat, lon } => {
            anyhow::ensure!(
                GeoPoint::new(lat, lon).is_valid(),
                "invalid coordinate ({}, {})",
                lat,
                lon
            );
            let (building, distance_m) = graph
                .nearest_building(lat, lon)
                .context("no buildings loaded")?;
            json!({
                "building": building.id,
                "name": building.name,
                "distance_m": distance_m,
            })
        }
        Command::Validate => {
            let components = graph.components();
            if components.len() > 1 {
                tracing::warn!(
                    components = components.len(),
                    "campus graph is not connected; some routes will fail"
                );
            }
            json!({
                "buildings": graph.len(),
                "edges": graph.edge_count(),
                "indoor_graphs": graph.indoor_count(),
                "components": components,
            })
        }
    };
    Ok(output)
}
