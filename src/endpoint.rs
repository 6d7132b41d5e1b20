// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS endpoint synthesis.
//!
//! An [`Endpoint`] is the record description handed to the downstream
//! publisher. Its JSON shape follows the external-dns endpoint model
//! (`dnsName`, `recordType`, `recordTTL`, `targets`, `labels`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::gameserver::ResolvedPublication;
use crate::srv;

/// Endpoint label holding the `namespace/name` of the source `GameServer`
pub const RESOURCE_LABEL_KEY: &str = "resource";

/// DNS record type of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    #[serde(rename = "SRV")]
    Srv,
}

impl RecordType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Srv => "SRV",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS record ready for publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub dns_name: String,
    pub record_type: RecordType,
    #[serde(rename = "recordTTL")]
    pub record_ttl: u32,
    pub targets: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Build the SRV record name `_<service>._<protocol>.<fleet>.<hostname>`.
#[must_use]
pub fn srv_dns_name(service: &str, protocol: &str, fleet: &str, hostname: &str) -> String {
    format!("_{service}._{protocol}.{fleet}.{hostname}")
}

/// Compose a resolved publication into its SRV endpoint.
///
/// # Example
///
/// ```rust
/// use gameserver_dns::endpoint::synthesize;
/// use gameserver_dns::gameserver::{Protocol, ResolvedPublication};
///
/// let publication = ResolvedPublication {
///     resource: "default/gs-1".to_string(),
///     hostname: "example.com".to_string(),
///     subdomain: "example.com".to_string(),
///     fleet: "gs-1".to_string(),
///     service: "game".to_string(),
///     protocol: Protocol::Udp,
///     ttl: 300,
///     priority: 0,
///     weight: 50,
///     port: 7777,
///     target_host: "node-7.example.com".to_string(),
/// };
///
/// let endpoint = synthesize(&publication);
/// assert_eq!(endpoint.dns_name, "_game._udp.gs-1.example.com");
/// assert_eq!(endpoint.targets, vec!["0 50 7777 node-7.example.com".to_string()]);
/// ```
#[must_use]
pub fn synthesize(publication: &ResolvedPublication) -> Endpoint {
    let mut labels = BTreeMap::new();
    labels.insert(
        RESOURCE_LABEL_KEY.to_string(),
        publication.resource.clone(),
    );

    Endpoint {
        dns_name: srv_dns_name(
            &publication.service,
            publication.protocol.as_str(),
            &publication.fleet,
            &publication.hostname,
        ),
        record_type: RecordType::Srv,
        record_ttl: publication.ttl,
        targets: vec![srv::encode(
            publication.priority,
            publication.weight,
            publication.port,
            &publication.target_host,
        )],
        labels,
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod endpoint_tests;
