// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # gameserver-dns - SRV records for Agones GameServers
//!
//! gameserver-dns watches Agones `GameServer` resources and derives SRV records
//! so that clients can discover a game server by service name and protocol.
//!
//! ## Overview
//!
//! Each listing pass:
//!
//! 1. Reads a snapshot of `GameServer`s from a [`source::GameServerCache`]
//! 2. Gates and resolves each one ([`gameserver::resolve`])
//! 3. Synthesizes an SRV [`endpoint::Endpoint`] with an encoded target
//!    ([`srv::encode`])
//!
//! A DNS provider adapter decodes the targets again ([`provider`]) before
//! submitting them to a zone.
//!
//! ## Modules
//!
//! - [`crd`] - Agones `GameServer` resource types
//! - [`gameserver`] - Readiness gate and annotation resolution
//! - [`srv`] - SRV target payload codec
//! - [`endpoint`] - Endpoint synthesis
//! - [`source`] - Cache accessor and listing orchestration
//! - [`provider`] - Provider-side SRV decoding
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust
//! use gameserver_dns::gameserver::{
//!     DeclaredPort, GameServerState, GameServerView, Protocol, SrvDefaults, StatusPort,
//! };
//! use gameserver_dns::labels::{HOSTNAME_ANNOTATION, SERVICE_NAME_ANNOTATION};
//! use gameserver_dns::source::{list_endpoints, MemoryCache};
//!
//! let view = GameServerView {
//!     name: "gs-1".to_string(),
//!     namespace: "default".to_string(),
//!     state: GameServerState::Ready,
//!     node_name: Some("node-7".to_string()),
//!     declared_ports: vec![DeclaredPort { name: "default".to_string(), protocol: Protocol::Udp }],
//!     status_ports: vec![StatusPort { name: "default".to_string(), port: 7777 }],
//!     labels: Default::default(),
//!     annotations: [
//!         (HOSTNAME_ANNOTATION.to_string(), "example.com".to_string()),
//!         (SERVICE_NAME_ANNOTATION.to_string(), "game".to_string()),
//!     ]
//!     .into(),
//! };
//!
//! let cache = MemoryCache::new(vec![view]);
//! let endpoints = list_endpoints(&cache, "default", &SrvDefaults::default()).unwrap();
//! assert_eq!(endpoints[0].dns_name, "_game._udp.gs-1.example.com");
//! assert_eq!(endpoints[0].targets[0], "0 50 7777 node-7.example.com");
//! ```

pub mod constants;
pub mod crd;
pub mod endpoint;
pub mod errors;
pub mod gameserver;
pub mod labels;
pub mod metrics;
pub mod provider;
pub mod source;
pub mod srv;
