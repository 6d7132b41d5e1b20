// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label and annotation keys read from `GameServer` metadata.
//!
//! The annotation keys are a deployment contract: whoever annotates the
//! `GameServer` (usually the fleet template) must use exactly these strings.

use std::collections::BTreeMap;

// ============================================================================
// Agones Labels
// ============================================================================

/// Label Agones sets on every `GameServer` owned by a `Fleet`
pub const AGONES_FLEET_LABEL: &str = "agones.dev/fleet";

// ============================================================================
// external-dns Annotations
// ============================================================================

/// Prefix shared by every annotation this crate reads
pub const ANNOTATION_PREFIX: &str = "external-dns.alpha.kubernetes.io";

/// DNS hostname root; its presence opts the `GameServer` into publication
pub const HOSTNAME_ANNOTATION: &str = "external-dns.alpha.kubernetes.io/hostname";

/// Overrides the subdomain used to build the SRV target host
pub const CUSTOM_SUBDOMAIN_ANNOTATION: &str = "external-dns.alpha.kubernetes.io/custom-subdomain";

/// SRV service name (`_<service>` label of the record name)
pub const SERVICE_NAME_ANNOTATION: &str = "external-dns.alpha.kubernetes.io/gameserver-service";

/// Overrides the protocol taken from the first declared port
pub const PROTOCOL_ANNOTATION: &str = "external-dns.alpha.kubernetes.io/gameserver-protocol";

/// Record TTL in seconds
pub const TTL_ANNOTATION: &str = "external-dns.alpha.kubernetes.io/ttl";

/// Closed set of annotations understood by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKey {
    Hostname,
    CustomSubdomain,
    ServiceName,
    Protocol,
    Ttl,
}

impl AnnotationKey {
    /// Every recognized annotation, in resolution order.
    pub const ALL: [AnnotationKey; 5] = [
        AnnotationKey::Hostname,
        AnnotationKey::CustomSubdomain,
        AnnotationKey::ServiceName,
        AnnotationKey::Protocol,
        AnnotationKey::Ttl,
    ];

    /// The literal metadata key for this annotation.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            AnnotationKey::Hostname => HOSTNAME_ANNOTATION,
            AnnotationKey::CustomSubdomain => CUSTOM_SUBDOMAIN_ANNOTATION,
            AnnotationKey::ServiceName => SERVICE_NAME_ANNOTATION,
            AnnotationKey::Protocol => PROTOCOL_ANNOTATION,
            AnnotationKey::Ttl => TTL_ANNOTATION,
        }
    }

    /// Look this annotation up in a metadata map.
    #[must_use]
    pub fn lookup(self, annotations: &BTreeMap<String, String>) -> Option<&str> {
        annotations.get(self.key()).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_carries_prefix() {
        for key in AnnotationKey::ALL {
            assert!(
                key.key().starts_with(ANNOTATION_PREFIX),
                "{key:?} should use the external-dns prefix"
            );
        }
    }

    #[test]
    fn test_lookup_reads_literal_key() {
        let mut annotations = BTreeMap::new();
        annotations.insert(TTL_ANNOTATION.to_string(), "60".to_string());

        assert_eq!(AnnotationKey::Ttl.lookup(&annotations), Some("60"));
        assert_eq!(AnnotationKey::Hostname.lookup(&annotations), None);
    }
}
