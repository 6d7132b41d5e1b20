// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for gameserver-dns.
//!
//! This module contains the numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group of the Agones `GameServer` resource
pub const AGONES_API_GROUP: &str = "agones.dev";

/// API version of the Agones `GameServer` resource
pub const AGONES_API_VERSION: &str = "v1";

/// Kind name for `GameServer` resource
pub const KIND_GAME_SERVER: &str = "GameServer";

// ============================================================================
// DNS Record Defaults
// ============================================================================

/// Default TTL for published SRV records (5 minutes)
pub const DEFAULT_DNS_RECORD_TTL_SECS: u32 = 300;

/// Default SRV priority for every game server target
pub const DEFAULT_SRV_PRIORITY: u16 = 0;

/// Default SRV weight for every game server target
pub const DEFAULT_SRV_WEIGHT: u16 = 50;

/// Number of whitespace-separated fields in an SRV target payload
pub const SRV_PAYLOAD_FIELDS: usize = 4;

// ============================================================================
// Runtime Defaults
// ============================================================================

/// Default interval between endpoint listing passes
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;

/// Default bind address for the Prometheus `/metrics` endpoint
pub const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8080";

/// Worker threads for the tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;
