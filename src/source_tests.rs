// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `source.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{GameServer, GameServerSpec, GameServerStatus, GameServerStatusPort};
    use crate::endpoint::{Endpoint, RecordType};
    use crate::errors::{ResolveError, SourceError};
    use crate::gameserver::{SkipReason, SrvDefaults};
    use crate::labels::{
        AGONES_FLEET_LABEL, CUSTOM_SUBDOMAIN_ANNOTATION, HOSTNAME_ANNOTATION, PROTOCOL_ANNOTATION,
        SERVICE_NAME_ANNOTATION, TTL_ANNOTATION,
    };
    use crate::metrics::{ENDPOINTS_SYNTHESIZED_TOTAL, RESOURCES_SKIPPED_TOTAL};
    use crate::provider::extract_srv_records;
    use crate::source::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use kube::runtime::reflector;
    use std::collections::BTreeMap;

    fn create_test_gameserver(
        name: &str,
        namespace: &str,
        state: &str,
        annotations: &[(&str, &str)],
        status_ports: &[i32],
    ) -> GameServer {
        GameServer {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                annotations: Some(
                    annotations
                        .iter()
                        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                        .collect(),
                ),
                ..Default::default()
            },
            spec: GameServerSpec::default(),
            status: Some(GameServerStatus {
                state: Some(state.to_string()),
                node_name: Some("node-7".to_string()),
                address: None,
                ports: status_ports
                    .iter()
                    .map(|port| GameServerStatusPort {
                        name: "default".to_string(),
                        port: *port,
                    })
                    .collect(),
            }),
        }
    }

    const PUBLISHABLE: &[(&str, &str)] = &[
        (HOSTNAME_ANNOTATION, "example.com"),
        (SERVICE_NAME_ANNOTATION, "game"),
        (PROTOCOL_ANNOTATION, "udp"),
    ];

    #[test]
    fn test_end_to_end_single_gameserver() {
        let gs = create_test_gameserver("gs-1", "default", "Ready", PUBLISHABLE, &[7777]);
        let cache = MemoryCache::from_gameservers([&gs]);

        let endpoints = list_endpoints(&cache, "default", &SrvDefaults::default()).unwrap();

        assert_eq!(endpoints.len(), 1);
        let endpoint: &Endpoint = &endpoints[0];
        assert_eq!(endpoint.dns_name, "_game._udp.gs-1.example.com");
        assert_eq!(endpoint.record_type, RecordType::Srv);
        assert_eq!(endpoint.record_ttl, 300);
        assert_eq!(
            endpoint.targets,
            vec!["0 50 7777 node-7.example.com".to_string()]
        );
    }

    #[test]
    fn test_unpublishable_gameservers_are_skipped() {
        let creating = create_test_gameserver("gs-creating", "default", "Creating", PUBLISHABLE, &[]);
        let unannotated = create_test_gameserver("gs-plain", "default", "Ready", &[], &[7000]);
        let ready = create_test_gameserver("gs-ready", "default", "Ready", PUBLISHABLE, &[7001]);
        let cache = MemoryCache::from_gameservers([&creating, &unannotated, &ready]);

        let report = list_endpoints_with_report(&cache, "default", &SrvDefaults::default()).unwrap();

        assert_eq!(report.endpoints.len(), 1);
        assert_eq!(report.endpoints[0].dns_name, "_game._udp.gs-ready.example.com");
        assert_eq!(
            report.skipped,
            vec![
                SkippedResource {
                    resource: "default/gs-creating".to_string(),
                    reason: SkipReason::PreReady,
                },
                SkippedResource {
                    resource: "default/gs-plain".to_string(),
                    reason: SkipReason::NoHostname,
                },
            ]
        );
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_skip_reasons_are_counted() {
        let namespace = "skip-reasons";
        let no_hostname = create_test_gameserver("gs-plain", namespace, "Ready", &[], &[7000]);
        let pre_ready =
            create_test_gameserver("gs-alloc", namespace, "PortAllocation", PUBLISHABLE, &[]);
        let no_service = create_test_gameserver(
            "gs-noservice",
            namespace,
            "Ready",
            &[(HOSTNAME_ANNOTATION, "example.com")],
            &[7001],
        );
        let ready = create_test_gameserver("gs-ready", namespace, "Ready", PUBLISHABLE, &[7002]);
        let cache = MemoryCache::from_gameservers([&no_hostname, &pre_ready, &no_service, &ready]);

        let report = list_endpoints_with_report(&cache, namespace, &SrvDefaults::default()).unwrap();

        let reasons: Vec<SkipReason> = report.skipped.iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::NoHostname,
                SkipReason::PreReady,
                SkipReason::NoService
            ]
        );
        for reason in ["no_hostname", "pre_ready", "no_service"] {
            let counter = RESOURCES_SKIPPED_TOTAL.with_label_values(&[namespace, reason]);
            assert!((counter.get() - 1.0).abs() < f64::EPSILON, "reason {reason}");
        }

        let synthesized = ENDPOINTS_SYNTHESIZED_TOTAL.with_label_values(&[namespace]);
        assert!((synthesized.get() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_whitespace_subdomain_lands_in_failures() {
        let mut annotations = PUBLISHABLE.to_vec();
        annotations.push((CUSTOM_SUBDOMAIN_ANNOTATION, "eu west.example.com"));
        let broken = create_test_gameserver("gs-2", "default", "Ready", &annotations, &[7777]);
        let healthy = create_test_gameserver("gs-3", "default", "Ready", PUBLISHABLE, &[7778]);
        let cache = MemoryCache::from_gameservers([&broken, &healthy]);

        let report = list_endpoints_with_report(&cache, "default", &SrvDefaults::default()).unwrap();

        assert_eq!(
            report.failures,
            vec![ResolveError::InvalidAnnotation {
                namespace: "default".to_string(),
                name: "gs-2".to_string(),
                key: CUSTOM_SUBDOMAIN_ANNOTATION,
                value: "eu west.example.com".to_string(),
            }]
        );
        assert_eq!(report.endpoints.len(), 1);
        // Every endpoint that does get emitted decodes on the provider side
        for endpoint in &report.endpoints {
            assert!(extract_srv_records(endpoint).is_ok(), "{endpoint:?}");
        }
    }

    #[test]
    fn test_empty_protocol_and_service_land_in_failures() {
        let empty_protocol = create_test_gameserver(
            "gs-proto",
            "default",
            "Ready",
            &[
                (HOSTNAME_ANNOTATION, "example.com"),
                (SERVICE_NAME_ANNOTATION, "game"),
                (PROTOCOL_ANNOTATION, ""),
            ],
            &[7000],
        );
        let empty_service = create_test_gameserver(
            "gs-svc",
            "default",
            "Ready",
            &[
                (HOSTNAME_ANNOTATION, "example.com"),
                (SERVICE_NAME_ANNOTATION, ""),
                (PROTOCOL_ANNOTATION, "udp"),
            ],
            &[7001],
        );
        let cache = MemoryCache::from_gameservers([&empty_protocol, &empty_service]);

        let report = list_endpoints_with_report(&cache, "default", &SrvDefaults::default()).unwrap();

        assert!(report.endpoints.is_empty());
        let kinds: Vec<&str> = report.failures.iter().map(ResolveError::kind).collect();
        assert_eq!(kinds, vec!["invalid_annotation", "invalid_annotation"]);
    }

    #[test]
    fn test_malformed_gameserver_does_not_abort_pass() {
        let no_ports = create_test_gameserver("gs-broken", "default", "Ready", PUBLISHABLE, &[]);
        let mut bad_ttl_annotations = PUBLISHABLE.to_vec();
        bad_ttl_annotations.push((TTL_ANNOTATION, "soon"));
        let bad_ttl =
            create_test_gameserver("gs-ttl", "default", "Ready", &bad_ttl_annotations, &[7002]);
        let healthy = create_test_gameserver("gs-ok", "default", "Allocated", PUBLISHABLE, &[7003]);
        let cache = MemoryCache::from_gameservers([&no_ports, &bad_ttl, &healthy]);

        let report = list_endpoints_with_report(&cache, "default", &SrvDefaults::default()).unwrap();

        assert_eq!(report.endpoints.len(), 1);
        assert_eq!(report.endpoints[0].targets[0], "0 50 7003 node-7.example.com");
        assert_eq!(
            report.failures,
            vec![
                ResolveError::NoStatusPorts {
                    namespace: "default".to_string(),
                    name: "gs-broken".to_string(),
                },
                ResolveError::InvalidTtl {
                    namespace: "default".to_string(),
                    name: "gs-ttl".to_string(),
                    value: "soon".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_namespace_scope() {
        let default_gs = create_test_gameserver("gs-a", "default", "Ready", PUBLISHABLE, &[7000]);
        let other_gs = create_test_gameserver("gs-b", "games", "Ready", PUBLISHABLE, &[7001]);
        let cache = MemoryCache::from_gameservers([&default_gs, &other_gs]);

        let scoped = list_endpoints(&cache, "games", &SrvDefaults::default()).unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].dns_name, "_game._udp.gs-b.example.com");

        let all = list_endpoints(&cache, "", &SrvDefaults::default()).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_fleet_members_share_dns_name() {
        let mut first = create_test_gameserver("warriors-1", "default", "Ready", PUBLISHABLE, &[7000]);
        let mut second = create_test_gameserver("warriors-2", "default", "Ready", PUBLISHABLE, &[7001]);
        let labels: BTreeMap<String, String> =
            [(AGONES_FLEET_LABEL.to_string(), "warriors".to_string())].into();
        first.metadata.labels = Some(labels.clone());
        second.metadata.labels = Some(labels);
        let cache = MemoryCache::from_gameservers([&first, &second]);

        let endpoints = list_endpoints(&cache, "default", &SrvDefaults::default()).unwrap();

        assert_eq!(endpoints.len(), 2);
        assert!(endpoints
            .iter()
            .all(|e| e.dns_name == "_game._udp.warriors.example.com"));
    }

    #[test]
    fn test_unsynced_cache_error_propagates() {
        let cache = MemoryCache::unsynced();

        assert_eq!(
            list_endpoints(&cache, "default", &SrvDefaults::default()),
            Err(SourceError::CacheNotSynced)
        );
    }

    #[test]
    fn test_listing_is_repeatable() {
        let gs = create_test_gameserver("gs-1", "default", "Ready", PUBLISHABLE, &[7777]);
        let cache = MemoryCache::from_gameservers([&gs]);

        let first = list_endpoints(&cache, "default", &SrvDefaults::default()).unwrap();
        let second = list_endpoints(&cache, "default", &SrvDefaults::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cache_as_trait_object() {
        let gs = create_test_gameserver("gs-1", "default", "Ready", PUBLISHABLE, &[7777]);
        let cache: Box<dyn GameServerCache> = Box::new(MemoryCache::from_gameservers([&gs]));

        let endpoints = list_endpoints(cache.as_ref(), "default", &SrvDefaults::default()).unwrap();
        assert_eq!(endpoints.len(), 1);
    }

    #[test]
    fn test_reflector_cache_not_synced_before_wait() {
        let (reader, _writer) = reflector::store::<GameServer>();
        let cache = ReflectorCache::new(reader);

        assert!(!cache.is_synced());
        assert_eq!(cache.list("default"), Err(SourceError::CacheNotSynced));
    }

    #[tokio::test]
    async fn test_reflector_cache_stopped_writer() {
        let (reader, writer) = reflector::store::<GameServer>();
        drop(writer);
        let cache = ReflectorCache::new(reader);

        assert_eq!(
            cache.wait_until_synced().await,
            Err(SourceError::ReflectorStopped)
        );
    }

    #[tokio::test]
    async fn test_reflector_cache_lists_after_initial_sync() {
        use kube::runtime::watcher::Event;

        let (reader, mut writer) = reflector::store::<GameServer>();
        let gs = create_test_gameserver("gs-1", "default", "Ready", PUBLISHABLE, &[7777]);
        writer.apply_watcher_event(&Event::Init);
        writer.apply_watcher_event(&Event::InitApply(gs));
        writer.apply_watcher_event(&Event::InitDone);

        let cache = ReflectorCache::new(reader);
        cache.wait_until_synced().await.unwrap();

        let endpoints = list_endpoints(&cache, "default", &SrvDefaults::default()).unwrap();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].dns_name, "_game._udp.gs-1.example.com");
    }
}
