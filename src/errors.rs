// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for gameserver-dns.
//!
//! This module provides specialized error types for:
//! - Resolving a `GameServer` into a publishable SRV record
//! - Decoding SRV target payloads on the provider side
//! - Reading `GameServer` objects from the resource cache
//! - Converting endpoints into provider records
//!
//! A `GameServer` that is simply not ready to be published is not an error;
//! the resolver returns `Ok(None)` for it.

use thiserror::Error;

/// Errors raised while resolving a single `GameServer` into a publication.
///
/// These are per-resource errors. The listing orchestrator logs and counts them
/// and keeps going with the remaining resources.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Annotation that ends up in the record name or target is empty or has whitespace
    #[error("GameServer '{namespace}/{name}' has invalid annotation {key}='{value}'")]
    InvalidAnnotation {
        /// `GameServer` namespace
        namespace: String,
        /// `GameServer` name
        name: String,
        /// Annotation key
        key: &'static str,
        /// Raw annotation value
        value: String,
    },

    /// No declared port to take the protocol from, and no protocol annotation
    #[error("GameServer '{namespace}/{name}' declares no ports and has no protocol annotation")]
    NoDeclaredPorts {
        /// `GameServer` namespace
        namespace: String,
        /// `GameServer` name
        name: String,
    },

    /// No port has been allocated yet in the status
    #[error("GameServer '{namespace}/{name}' has no allocated status ports")]
    NoStatusPorts {
        /// `GameServer` namespace
        namespace: String,
        /// `GameServer` name
        name: String,
    },

    /// Allocated port does not fit the 16-bit SRV port field
    #[error("GameServer '{namespace}/{name}' has allocated port {port}, outside 0-65535")]
    PortOutOfRange {
        /// `GameServer` namespace
        namespace: String,
        /// `GameServer` name
        name: String,
        /// The offending port
        port: i32,
    },

    /// TTL annotation is present but not a non-negative integer
    #[error("GameServer '{namespace}/{name}' has invalid TTL annotation '{value}'")]
    InvalidTtl {
        /// `GameServer` namespace
        namespace: String,
        /// `GameServer` name
        name: String,
        /// Raw annotation value
        value: String,
    },

    /// Status carries no node name, so no target host can be built
    #[error("GameServer '{namespace}/{name}' has no node name in its status")]
    MissingNodeName {
        /// `GameServer` namespace
        namespace: String,
        /// `GameServer` name
        name: String,
    },
}

impl ResolveError {
    /// Short, prometheus-safe label for this error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::InvalidAnnotation { .. } => "invalid_annotation",
            ResolveError::NoDeclaredPorts { .. } => "no_declared_ports",
            ResolveError::NoStatusPorts { .. } => "no_status_ports",
            ResolveError::PortOutOfRange { .. } => "port_out_of_range",
            ResolveError::InvalidTtl { .. } => "invalid_ttl",
            ResolveError::MissingNodeName { .. } => "missing_node_name",
        }
    }
}

/// Errors raised while decoding an SRV target payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload does not split into exactly four whitespace-separated fields
    #[error("Malformed SRV payload '{payload}': expected 4 fields, found {found}")]
    MalformedPayload {
        /// The raw payload
        payload: String,
        /// Number of fields found
        found: usize,
    },

    /// A numeric field is not an unsigned 16-bit integer
    #[error("Invalid SRV {field} '{value}' in payload: {reason}")]
    InvalidInteger {
        /// Which field failed (`priority`, `weight` or `port`)
        field: &'static str,
        /// The raw field value
        value: String,
        /// Parser error message
        reason: String,
    },
}

/// Errors raised by the resource cache accessor.
///
/// These abort the whole listing pass; the orchestrator never retries them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The reflector has not completed its initial list
    #[error("GameServer cache is not synchronized yet")]
    CacheNotSynced,

    /// The reflector writer was dropped before the cache became ready
    #[error("GameServer reflector stopped before the cache synchronized")]
    ReflectorStopped,
}

/// Errors raised when converting an endpoint into provider records.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Endpoint is not an SRV record
    #[error("Endpoint '{dns_name}' has record type {record_type}, expected SRV")]
    UnsupportedRecordType {
        /// Endpoint DNS name
        dns_name: String,
        /// The record type found
        record_type: String,
    },

    /// Endpoint carries no targets at all
    #[error("Endpoint '{dns_name}' has no targets")]
    NoTargets {
        /// Endpoint DNS name
        dns_name: String,
    },

    /// A target payload failed to decode
    #[error("Endpoint '{dns_name}' has an undecodable target: {source}")]
    Decode {
        /// Endpoint DNS name
        dns_name: String,
        /// Underlying decode failure
        #[source]
        source: DecodeError,
    },

    /// A record or target name is not a valid DNS name
    #[error("Invalid DNS name '{name}': {reason}")]
    InvalidName {
        /// The name that failed to parse
        name: String,
        /// Parser error message
        reason: String,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
