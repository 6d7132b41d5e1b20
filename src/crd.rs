// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource types for the Agones `GameServer`.
//!
//! gameserver-dns does not own this CRD; Agones installs it. Only the fields
//! needed to derive SRV records are modelled, everything else in the object is
//! ignored on deserialization.
//!
//! # Example
//!
//! ```rust
//! use gameserver_dns::crd::{GameServer, GameServerPort, GameServerSpec};
//!
//! let gs = GameServer::new(
//!     "gs-1",
//!     GameServerSpec {
//!         ports: vec![GameServerPort {
//!             name: "default".to_string(),
//!             port_policy: Some("Dynamic".to_string()),
//!             container_port: Some(7654),
//!             host_port: None,
//!             protocol: "UDP".to_string(),
//!         }],
//!     },
//! );
//! assert_eq!(gs.spec.ports.len(), 1);
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `GameServer` spec, restricted to the declared ports.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "agones.dev",
    version = "v1",
    kind = "GameServer",
    namespaced,
    status = "GameServerStatus",
    shortname = "gs",
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.state"}"#,
    printcolumn = r#"{"name":"Node","type":"string","jsonPath":".status.nodeName"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct GameServerSpec {
    /// Ports requested by the game server container.
    #[serde(default)]
    pub ports: Vec<GameServerPort>,
}

/// A port declared in the `GameServer` spec (the requested port).
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameServerPort {
    /// Port name, referenced by the status port of the same name.
    #[serde(default)]
    pub name: String,

    /// `Dynamic`, `Static`, `Passthrough` or `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_policy: Option<String>,

    /// Port the game server binds inside its container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_port: Option<i32>,

    /// Host port, only set up front for the `Static` policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_port: Option<i32>,

    /// `UDP`, `TCP` or `TCPUDP`. Agones defaults this to `UDP`.
    #[serde(default = "default_port_protocol")]
    pub protocol: String,
}

fn default_port_protocol() -> String {
    "UDP".to_string()
}

/// Observed `GameServer` state as reported by the Agones controller.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameServerStatus {
    /// Lifecycle state (`PortAllocation`, `Creating`, `Starting`, `Ready`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Node the game server pod was scheduled on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,

    /// Address of the node, as resolved by Agones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Ports actually allocated to the game server.
    #[serde(default)]
    pub ports: Vec<GameServerStatusPort>,
}

/// A port allocated to the game server (the status port).
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameServerStatusPort {
    /// Name of the spec port this allocation belongs to.
    #[serde(default)]
    pub name: String,

    /// Allocated host port.
    pub port: i32,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
