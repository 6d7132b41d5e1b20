// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! SRV target payload codec.
//!
//! An SRV endpoint carries its RDATA as a single string target:
//!
//! ```text
//! <priority> <weight> <port> <target>
//! ```
//!
//! The source side [`encode`]s it and a DNS provider adapter, deployed
//! independently, [`decode`]s it again. Field order and the single-space
//! delimiter are a wire contract between the two.
//!
//! Decoding is strict: exactly four fields are accepted. A payload with
//! trailing tokens is rejected rather than silently truncated.

use std::fmt;
use std::str::FromStr;

use crate::constants::SRV_PAYLOAD_FIELDS;
use crate::errors::DecodeError;

/// Structured SRV RDATA, as carried in an endpoint target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SrvTarget {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

impl SrvTarget {
    #[must_use]
    pub fn new(priority: u16, weight: u16, port: u16, target: impl Into<String>) -> Self {
        Self {
            priority,
            weight,
            port,
            target: target.into(),
        }
    }
}

impl fmt::Display for SrvTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.priority, self.weight, self.port, self.target
        )
    }
}

impl FromStr for SrvTarget {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

/// Encode SRV RDATA into its target string.
///
/// `target` must not contain whitespace; the caller guarantees this.
///
/// # Example
///
/// ```rust
/// use gameserver_dns::srv::encode;
///
/// assert_eq!(encode(0, 50, 7777, "node-7.example.com"), "0 50 7777 node-7.example.com");
/// ```
#[must_use]
pub fn encode(priority: u16, weight: u16, port: u16, target: &str) -> String {
    format!("{priority} {weight} {port} {target}")
}

/// Decode an SRV target string back into its fields.
///
/// # Errors
///
/// Returns an error if:
/// - The payload does not contain exactly four whitespace-separated fields
/// - Priority, weight or port is not an unsigned 16-bit integer
pub fn decode(payload: &str) -> Result<SrvTarget, DecodeError> {
    let fields: Vec<&str> = payload.split_whitespace().collect();
    if fields.len() != SRV_PAYLOAD_FIELDS {
        return Err(DecodeError::MalformedPayload {
            payload: payload.to_string(),
            found: fields.len(),
        });
    }

    Ok(SrvTarget {
        priority: parse_field("priority", fields[0])?,
        weight: parse_field("weight", fields[1])?,
        port: parse_field("port", fields[2])?,
        target: fields[3].to_string(),
    })
}

fn parse_field(field: &'static str, value: &str) -> Result<u16, DecodeError> {
    value.parse::<u16>().map_err(|e| DecodeError::InvalidInteger {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "srv_tests.rs"]
mod srv_tests;
