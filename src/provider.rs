// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider-side conversion of SRV endpoints.
//!
//! A DNS provider adapter receives [`Endpoint`]s over the wire, never the
//! resolved publication, so it must decode the target payload back into SRV
//! fields before it can build a zone update. This module does that decoding
//! and produces either plain [`SrvRecord`]s (for HTTP-style provider APIs) or
//! `hickory-proto` resource records (for RFC 2136 updates).

use std::str::FromStr;

use hickory_proto::rr::{rdata, DNSClass, Name, RData, Record};
use tracing::debug;

use crate::endpoint::{Endpoint, RecordType};
use crate::errors::ProviderError;
use crate::srv::{self, SrvTarget};

/// One SRV record set entry as a provider API expects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvRecord {
    pub name: String,
    pub ttl: u32,
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// Decode every target of an SRV endpoint.
///
/// # Errors
///
/// Returns an error if:
/// - The endpoint is not an SRV record
/// - The endpoint carries no targets
/// - Any target payload fails to decode
pub fn extract_srv_records(endpoint: &Endpoint) -> Result<Vec<SrvRecord>, ProviderError> {
    if endpoint.record_type != RecordType::Srv {
        return Err(ProviderError::UnsupportedRecordType {
            dns_name: endpoint.dns_name.clone(),
            record_type: endpoint.record_type.to_string(),
        });
    }

    if endpoint.targets.is_empty() {
        return Err(ProviderError::NoTargets {
            dns_name: endpoint.dns_name.clone(),
        });
    }

    endpoint
        .targets
        .iter()
        .map(|payload| -> Result<SrvRecord, ProviderError> {
            let SrvTarget {
                priority,
                weight,
                port,
                target,
            } = srv::decode(payload).map_err(|source| ProviderError::Decode {
                dns_name: endpoint.dns_name.clone(),
                source,
            })?;

            Ok(SrvRecord {
                name: endpoint.dns_name.clone(),
                ttl: endpoint.record_ttl,
                priority,
                weight,
                port,
                target,
            })
        })
        .collect()
}

/// Convert an SRV endpoint into `IN` class resource records.
///
/// # Errors
///
/// Returns an error if the endpoint cannot be decoded or if the record name or
/// a target is not a valid DNS name.
pub fn to_resource_records(endpoint: &Endpoint) -> Result<Vec<Record>, ProviderError> {
    let fqdn = parse_name(&endpoint.dns_name)?;

    extract_srv_records(endpoint)?
        .into_iter()
        .map(|srv_record| -> Result<Record, ProviderError> {
            let target = parse_name(&srv_record.target)?;
            let rdata = rdata::SRV::new(
                srv_record.priority,
                srv_record.weight,
                srv_record.port,
                target,
            );

            let mut record = Record::from_rdata(fqdn.clone(), srv_record.ttl, RData::SRV(rdata));
            record.set_dns_class(DNSClass::IN);

            debug!(
                name = %fqdn,
                target = %srv_record.target,
                port = srv_record.port,
                ttl = srv_record.ttl,
                "Built SRV resource record"
            );
            Ok(record)
        })
        .collect()
}

fn parse_name(name: &str) -> Result<Name, ProviderError> {
    Name::from_str(name).map_err(|e| ProviderError::InvalidName {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
