// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `GameServer` endpoint source.
//!
//! The source pulls a snapshot of `GameServer`s from a [`GameServerCache`],
//! resolves each one and synthesizes the SRV endpoints. It never mutates the
//! cache and keeps no state between passes.
//!
//! # Architecture
//!
//! In production the cache is a kube-rs reflector [`Store`] kept up to date by a
//! background watch task ([`spawn_reflector`]). The push-based refresh stays an
//! implementation detail of [`ReflectorCache`]; the orchestrator only sees a
//! pull-based `list(namespace)`.
//!
//! # Example
//!
//! ```rust,no_run
//! use gameserver_dns::gameserver::SrvDefaults;
//! use gameserver_dns::source::{list_endpoints, spawn_reflector};
//!
//! # async fn example(client: kube::Client) -> anyhow::Result<()> {
//! let cache = spawn_reflector(client, "default");
//! cache.wait_until_synced().await?;
//!
//! for endpoint in list_endpoints(&cache, "default", &SrvDefaults::default())? {
//!     println!("{} -> {:?}", endpoint.dns_name, endpoint.targets);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use kube::runtime::reflector::{self, Store};
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Client, ResourceExt};
use tracing::{debug, info, warn};

use crate::crd::GameServer;
use crate::endpoint::{synthesize, Endpoint};
use crate::errors::{ResolveError, SourceError};
use crate::gameserver::{classify, GameServerView, Resolution, SkipReason, SrvDefaults};
use crate::metrics;

/// Read-only, namespace-filtered access to synchronized `GameServer`s.
///
/// An empty namespace selects every namespace.
pub trait GameServerCache: Send + Sync {
    /// List the `GameServer`s currently in the cache for `namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot serve a consistent snapshot,
    /// e.g. because it has not finished its initial synchronization.
    fn list(&self, namespace: &str) -> Result<Vec<GameServerView>, SourceError>;
}

fn in_scope(object_namespace: &str, namespace: &str) -> bool {
    namespace.is_empty() || object_namespace == namespace
}

/// [`GameServerCache`] backed by a kube-rs reflector store.
#[derive(Clone)]
pub struct ReflectorCache {
    store: Store<GameServer>,
    synced: Arc<AtomicBool>,
}

impl ReflectorCache {
    #[must_use]
    pub fn new(store: Store<GameServer>) -> Self {
        Self {
            store,
            synced: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wait for the reflector's initial list to land in the store.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::ReflectorStopped`] if the watch task exited first.
    pub async fn wait_until_synced(&self) -> Result<(), SourceError> {
        self.store
            .wait_until_ready()
            .await
            .map_err(|_| SourceError::ReflectorStopped)?;
        self.synced.store(true, Ordering::Release);
        Ok(())
    }

    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }
}

impl GameServerCache for ReflectorCache {
    fn list(&self, namespace: &str) -> Result<Vec<GameServerView>, SourceError> {
        if !self.is_synced() {
            return Err(SourceError::CacheNotSynced);
        }

        Ok(self
            .store
            .state()
            .iter()
            .filter(|gs| in_scope(gs.namespace().as_deref().unwrap_or_default(), namespace))
            .map(|gs| GameServerView::from(gs.as_ref()))
            .collect())
    }
}

/// Start a reflector over `GameServer`s and return its cache.
///
/// The watch runs on a background tokio task with the default backoff; watch
/// errors are logged and retried there, never surfaced to listing callers.
#[must_use]
pub fn spawn_reflector(client: Client, namespace: &str) -> ReflectorCache {
    let api: Api<GameServer> = if namespace.is_empty() {
        Api::all(client)
    } else {
        Api::namespaced(client, namespace)
    };

    let (reader, writer) = reflector::store();
    let stream = reflector::reflector(writer, watcher(api, watcher::Config::default()))
        .default_backoff()
        .for_each(|event| async move {
            match event {
                Ok(event) => debug!(?event, "GameServer watch event"),
                Err(e) => warn!(error = %e, "GameServer watch error"),
            }
        });

    info!(namespace, "Starting GameServer reflector");
    tokio::spawn(stream);

    ReflectorCache::new(reader)
}

/// In-memory [`GameServerCache`] holding a fixed snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    views: Vec<GameServerView>,
    synced: bool,
}

impl MemoryCache {
    #[must_use]
    pub fn new(views: Vec<GameServerView>) -> Self {
        Self {
            views,
            synced: true,
        }
    }

    /// A cache that fails every listing with [`SourceError::CacheNotSynced`].
    #[must_use]
    pub fn unsynced() -> Self {
        Self {
            views: Vec::new(),
            synced: false,
        }
    }

    #[must_use]
    pub fn from_gameservers<'a>(gameservers: impl IntoIterator<Item = &'a GameServer>) -> Self {
        Self::new(gameservers.into_iter().map(GameServerView::from).collect())
    }
}

impl GameServerCache for MemoryCache {
    fn list(&self, namespace: &str) -> Result<Vec<GameServerView>, SourceError> {
        if !self.synced {
            return Err(SourceError::CacheNotSynced);
        }

        Ok(self
            .views
            .iter()
            .filter(|view| in_scope(&view.namespace, namespace))
            .cloned()
            .collect())
    }
}

/// A `GameServer` left out of a pass because it was not publishable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedResource {
    /// `namespace/name` of the `GameServer`
    pub resource: String,
    pub reason: SkipReason,
}

/// Outcome of one listing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingReport {
    /// Endpoints in cache listing order
    pub endpoints: Vec<Endpoint>,
    /// `GameServer`s that were not publishable
    pub skipped: Vec<SkippedResource>,
    /// `GameServer`s that were publishable but malformed
    pub failures: Vec<ResolveError>,
}

/// List SRV endpoints for every publishable `GameServer` in `namespace`.
///
/// Order follows the cache and is not stable across calls.
///
/// # Errors
///
/// Returns the cache's error verbatim; per-resource failures are skipped.
pub fn list_endpoints<C>(
    cache: &C,
    namespace: &str,
    defaults: &SrvDefaults,
) -> Result<Vec<Endpoint>, SourceError>
where
    C: GameServerCache + ?Sized,
{
    list_endpoints_with_report(cache, namespace, defaults).map(|report| report.endpoints)
}

/// Same as [`list_endpoints`], also reporting skipped and failed resources.
///
/// # Errors
///
/// Returns the cache's error verbatim. Malformed `GameServer`s are logged,
/// counted and reported in [`ListingReport::failures`] without failing the pass.
pub fn list_endpoints_with_report<C>(
    cache: &C,
    namespace: &str,
    defaults: &SrvDefaults,
) -> Result<ListingReport, SourceError>
where
    C: GameServerCache + ?Sized,
{
    let started = Instant::now();

    let views = cache.list(namespace).inspect_err(|e| {
        warn!(namespace, error = %e, "Failed to list GameServers");
        metrics::record_listing_error(namespace, started.elapsed());
    })?;

    let mut report = ListingReport::default();
    for view in &views {
        debug!(gameserver = %view.name, namespace = %view.namespace, "Creating endpoint for GameServer");
        match classify(view, defaults) {
            Ok(Resolution::Publish(publication)) => {
                metrics::record_endpoint_synthesized(namespace);
                report.endpoints.push(synthesize(&publication));
            }
            Ok(Resolution::Skip(reason)) => {
                metrics::record_resource_skipped(namespace, reason.as_str());
                report.skipped.push(SkippedResource {
                    resource: format!("{}/{}", view.namespace, view.name),
                    reason,
                });
            }
            Err(e) => {
                warn!(
                    gameserver = %view.name,
                    namespace = %view.namespace,
                    error = %e,
                    "Skipping malformed GameServer"
                );
                metrics::record_resolve_error(namespace, e.kind());
                report.failures.push(e);
            }
        }
    }

    metrics::record_listing_success(namespace, report.endpoints.len(), started.elapsed());
    debug!(
        namespace,
        listed = views.len(),
        endpoints = report.endpoints.len(),
        skipped = report.skipped.len(),
        failed = report.failures.len(),
        "Listed GameServer endpoints"
    );

    Ok(report)
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod source_tests;
