//! Campus graph snapshots with copy-and-swap reload.

use anyhow::{Context, Result};
use campus_core::{load_campus_dir, CampusGraph, LoadError, RouteService};
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

use crate::config::Config;

/// One immutable, fully loaded version of the campus data.
pub struct Snapshot {
    pub service: RouteService,
    pub version: u64,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn graph(&self) -> &CampusGraph {
        self.service.graph()
    }
}

/// Application state. Requests clone the current snapshot `Arc` and never
/// hold the lock while routing.
pub struct AppState {
    current: RwLock<Arc<Snapshot>>,
    /// Serializes reloads so an older disk read never replaces a newer one
    reload_lock: tokio::sync::Mutex<()>,
    config: Config,
}

impl AppState {
    pub fn new(graph: CampusGraph, config: Config) -> Self {
        let snapshot = Snapshot {
            service: RouteService::new(Arc::new(graph)).with_limits(config.search_limits()),
            version: 1,
            loaded_at: Utc::now(),
        };
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            reload_lock: tokio::sync::Mutex::new(()),
            config,
        }
    }

    /// Load the configured data directory. Fails rather than serving a
    /// partially loaded graph.
    pub fn load(config: Config) -> Result<Self, LoadError> {
        let graph = load_campus_dir(&config.data_dir)?;
        Ok(Self::new(graph, config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Publish a new graph. In-flight requests keep the snapshot they hold.
    ///
    /// The version is assigned under the write lock, so the current
    /// version only ever increases.
    pub fn publish(&self, graph: CampusGraph) -> Arc<Snapshot> {
        let service = RouteService::new(Arc::new(graph)).with_limits(self.config.search_limits());
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let snapshot = Arc::new(Snapshot {
            service,
            version: current.version + 1,
            loaded_at: Utc::now(),
        });
        *current = snapshot.clone();
        snapshot
    }

    /// Rebuild the graph from disk off the async runtime, then swap it in.
    /// On failure the previous snapshot stays current.
    pub async fn reload(&self) -> Result<Arc<Snapshot>> {
        let _guard = self.reload_lock.lock().await;
        let dir = self.config.data_dir.clone();
        let graph = tokio::task::spawn_blocking(move || load_campus_dir(dir))
            .await
            .context("reload task panicked")??;
        let snapshot = self.publish(graph);
        tracing::info!(version = snapshot.version, "campus graph reloaded");
        Ok(snapshot)
    }
}
