// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Readiness gate and annotation resolution for `GameServer` resources.
//!
//! A `GameServer` is turned into a [`ResolvedPublication`] in two steps:
//!
//! 1. **Gate** - it must carry the hostname and service-name annotations and
//!    must have left the pre-ready states (`PortAllocation`, `Creating`,
//!    `Starting`). Anything else is silently skipped (`Ok(None)`).
//! 2. **Resolve** - the layered overrides are applied:
//!
//! | Attribute | Override                      | Fallback                          |
//! |-----------|-------------------------------|-----------------------------------|
//! | subdomain | custom-subdomain annotation   | hostname annotation               |
//! | fleet     | `agones.dev/fleet` label      | resource name                     |
//! | protocol  | protocol annotation           | first declared port's protocol    |
//! | ttl       | ttl annotation                | [`SrvDefaults::ttl`]              |
//! | port      | -                             | first allocated status port       |
//!
//! Resolution is pure: the same view always yields the same publication.

use std::collections::BTreeMap;
use std::fmt;

use kube::ResourceExt;
use tracing::debug;

use crate::constants::{DEFAULT_DNS_RECORD_TTL_SECS, DEFAULT_SRV_PRIORITY, DEFAULT_SRV_WEIGHT};
use crate::crd::GameServer;
use crate::errors::ResolveError;
use crate::labels::{AnnotationKey, AGONES_FLEET_LABEL};

/// Lifecycle state of a `GameServer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameServerState {
    PortAllocation,
    Creating,
    Starting,
    Scheduled,
    RequestReady,
    Ready,
    Reserved,
    Allocated,
    Shutdown,
    Error,
    Unhealthy,
    Unknown,
}

impl GameServerState {
    /// Parse the `status.state` string written by the Agones controller.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "PortAllocation" => GameServerState::PortAllocation,
            "Creating" => GameServerState::Creating,
            "Starting" => GameServerState::Starting,
            "Scheduled" => GameServerState::Scheduled,
            "RequestReady" => GameServerState::RequestReady,
            "Ready" => GameServerState::Ready,
            "Reserved" => GameServerState::Reserved,
            "Allocated" => GameServerState::Allocated,
            "Shutdown" => GameServerState::Shutdown,
            "Error" => GameServerState::Error,
            "Unhealthy" => GameServerState::Unhealthy,
            _ => GameServerState::Unknown,
        }
    }

    /// True while the pod does not exist yet, so no node or port is known.
    #[must_use]
    pub fn is_before_pod_created(self) -> bool {
        matches!(
            self,
            GameServerState::PortAllocation | GameServerState::Creating | GameServerState::Starting
        )
    }
}

/// Transport protocol of the published service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
    /// Anything else, kept lower-cased (e.g. `tcpudp`).
    Other(String),
}

impl Protocol {
    /// Parse a protocol case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        match lower.as_str() {
            "tcp" => Protocol::Tcp,
            "udp" => Protocol::Udp,
            _ => Protocol::Other(lower),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Other(other) => other,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A port from the `GameServer` spec (requested).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredPort {
    pub name: String,
    pub protocol: Protocol,
}

/// A port from the `GameServer` status (allocated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPort {
    pub name: String,
    pub port: i32,
}

/// Read-only projection of a `GameServer` with the fields DNS cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameServerView {
    pub name: String,
    pub namespace: String,
    pub state: GameServerState,
    pub node_name: Option<String>,
    pub declared_ports: Vec<DeclaredPort>,
    pub status_ports: Vec<StatusPort>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

impl From<&GameServer> for GameServerView {
    fn from(gs: &GameServer) -> Self {
        let status = gs.status.as_ref();
        Self {
            name: gs.name_any(),
            namespace: gs.namespace().unwrap_or_default(),
            state: status
                .and_then(|s| s.state.as_deref())
                .map_or(GameServerState::Unknown, GameServerState::parse),
            node_name: status
                .and_then(|s| s.node_name.clone())
                .filter(|node| !node.is_empty()),
            declared_ports: gs
                .spec
                .ports
                .iter()
                .map(|p| DeclaredPort {
                    name: p.name.clone(),
                    protocol: Protocol::parse(&p.protocol),
                })
                .collect(),
            status_ports: status
                .map(|s| {
                    s.ports
                        .iter()
                        .map(|p| StatusPort {
                            name: p.name.clone(),
                            port: p.port,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            labels: gs.labels().clone(),
            annotations: gs.annotations().clone(),
        }
    }
}

impl GameServerView {
    fn annotation(&self, key: AnnotationKey) -> Option<&str> {
        key.lookup(&self.annotations)
    }
}

/// Policy values applied to every SRV record unless overridden per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrvDefaults {
    pub ttl: u32,
    pub priority: u16,
    pub weight: u16,
}

impl Default for SrvDefaults {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_DNS_RECORD_TTL_SECS,
            priority: DEFAULT_SRV_PRIORITY,
            weight: DEFAULT_SRV_WEIGHT,
        }
    }
}

/// Everything needed to build the SRV endpoint of one `GameServer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPublication {
    /// `namespace/name` of the source resource
    pub resource: String,
    pub hostname: String,
    pub subdomain: String,
    pub fleet: String,
    pub service: String,
    pub protocol: Protocol,
    pub ttl: u32,
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    /// `<node>.<subdomain>`
    pub target_host: String,
}

/// Why a `GameServer` was not published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    /// No hostname annotation
    NoHostname,
    /// Still in `PortAllocation`, `Creating` or `Starting`
    PreReady,
    /// No service-name annotation
    NoService,
}

impl SkipReason {
    /// Short, prometheus-safe label for this reason.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NoHostname => "no_hostname",
            SkipReason::PreReady => "pre_ready",
            SkipReason::NoService => "no_service",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one `GameServer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Publish(ResolvedPublication),
    Skip(SkipReason),
}

/// Resolve a `GameServer` view into a publication.
///
/// # Returns
///
/// - `Ok(None)` when the resource is not publishable: no hostname annotation,
///   still before pod creation, or no service-name annotation
/// - `Ok(Some(_))` with every attribute resolved
///
/// # Errors
///
/// Same as [`classify`].
pub fn resolve(
    view: &GameServerView,
    defaults: &SrvDefaults,
) -> Result<Option<ResolvedPublication>, ResolveError> {
    Ok(match classify(view, defaults)? {
        Resolution::Publish(publication) => Some(publication),
        Resolution::Skip(_) => None,
    })
}

/// Resolve a `GameServer` view, keeping the reason when it is skipped.
///
/// # Errors
///
/// Returns an error if a publishable resource is malformed:
/// - A hostname, subdomain, service or protocol annotation that is empty or
///   contains whitespace
/// - No declared ports and no protocol annotation
/// - No allocated status ports, or a port outside the SRV range
/// - A TTL annotation that is not a non-negative integer
/// - No node name in the status
pub fn classify(
    view: &GameServerView,
    defaults: &SrvDefaults,
) -> Result<Resolution, ResolveError> {
    let Some(hostname) = view.annotation(AnnotationKey::Hostname) else {
        debug!(gameserver = %view.name, namespace = %view.namespace, "No hostname annotation, skipping");
        return Ok(Resolution::Skip(SkipReason::NoHostname));
    };

    if view.state.is_before_pod_created() {
        debug!(
            gameserver = %view.name,
            namespace = %view.namespace,
            state = ?view.state,
            "GameServer not yet addressable, skipping"
        );
        return Ok(Resolution::Skip(SkipReason::PreReady));
    }

    let Some(service) = view.annotation(AnnotationKey::ServiceName) else {
        debug!(gameserver = %view.name, namespace = %view.namespace, "No service name annotation, skipping");
        return Ok(Resolution::Skip(SkipReason::NoService));
    };

    // These end up in the record name or the SRV target, which are
    // whitespace-delimited on the wire
    let hostname = dns_token(view, AnnotationKey::Hostname, hostname)?;
    let service = dns_token(view, AnnotationKey::ServiceName, service)?;

    let subdomain = match view.annotation(AnnotationKey::CustomSubdomain) {
        Some(custom) => dns_token(view, AnnotationKey::CustomSubdomain, custom)?,
        None => hostname,
    };

    let fleet = view
        .labels
        .get(AGONES_FLEET_LABEL)
        .map_or(view.name.as_str(), String::as_str);

    let protocol = resolve_protocol(view)?;
    let port = resolve_port(view)?;
    let ttl = resolve_ttl(view, defaults)?;

    let node = view
        .node_name
        .as_deref()
        .ok_or_else(|| ResolveError::MissingNodeName {
            namespace: view.namespace.clone(),
            name: view.name.clone(),
        })?;

    debug!(
        gameserver = %view.name,
        namespace = %view.namespace,
        hostname,
        subdomain,
        fleet,
        service,
        protocol = %protocol,
        port,
        ttl,
        "Resolved GameServer publication"
    );

    Ok(Resolution::Publish(ResolvedPublication {
        resource: format!("{}/{}", view.namespace, view.name),
        hostname: hostname.to_string(),
        subdomain: subdomain.to_string(),
        fleet: fleet.to_string(),
        service: service.to_string(),
        protocol,
        ttl,
        priority: defaults.priority,
        weight: defaults.weight,
        port,
        target_host: format!("{node}.{subdomain}"),
    }))
}

fn dns_token<'a>(
    view: &GameServerView,
    key: AnnotationKey,
    value: &'a str,
) -> Result<&'a str, ResolveError> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(ResolveError::InvalidAnnotation {
            namespace: view.namespace.clone(),
            name: view.name.clone(),
            key: key.key(),
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn resolve_protocol(view: &GameServerView) -> Result<Protocol, ResolveError> {
    if let Some(protocol) = view.annotation(AnnotationKey::Protocol) {
        return dns_token(view, AnnotationKey::Protocol, protocol).map(Protocol::parse);
    }

    view.declared_ports
        .first()
        .map(|p| p.protocol.clone())
        .ok_or_else(|| ResolveError::NoDeclaredPorts {
            namespace: view.namespace.clone(),
            name: view.name.clone(),
        })
}

fn resolve_port(view: &GameServerView) -> Result<u16, ResolveError> {
    let allocated = view
        .status_ports
        .first()
        .ok_or_else(|| ResolveError::NoStatusPorts {
            namespace: view.namespace.clone(),
            name: view.name.clone(),
        })?;

    u16::try_from(allocated.port).map_err(|_| ResolveError::PortOutOfRange {
        namespace: view.namespace.clone(),
        name: view.name.clone(),
        port: allocated.port,
    })
}

fn resolve_ttl(view: &GameServerView, defaults: &SrvDefaults) -> Result<u32, ResolveError> {
    match view.annotation(AnnotationKey::Ttl) {
        None => Ok(defaults.ttl),
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ResolveError::InvalidTtl {
                namespace: view.namespace.clone(),
                name: view.name.clone(),
                value: raw.to_string(),
            }),
    }
}

#[cfg(test)]
#[path = "gameserver_tests.rs"]
mod gameserver_tests;
