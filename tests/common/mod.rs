// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

use gameserver_dns::crd::{GameServer, GameServerPort, GameServerSpec};
use gameserver_dns::labels::{HOSTNAME_ANNOTATION, SERVICE_NAME_ANNOTATION};
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{
    api::{Api, ApiResource, DeleteParams, DynamicObject, PostParams},
    client::Client,
};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::sleep;

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {}", e);
            None
        }
    }
}

/// Create a test namespace
pub async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let mut labels = BTreeMap::new();
    labels.insert("test".to_string(), "integration".to_string());
    labels.insert("managed-by".to_string(), "gameserver-dns-test".to_string());

    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        ..Default::default()
    };

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            println!("Created test namespace: {}", name);
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("Test namespace already exists: {}", name);
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Cleanup test namespace
pub async fn cleanup_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            println!("Deleted test namespace: {}", name);
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            println!("Test namespace already deleted: {}", name);
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Create an annotated GameServer running the Agones simple-game-server image
pub async fn create_annotated_gameserver(
    client: &Client,
    namespace: &str,
    name: &str,
    hostname: &str,
    service: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let gameservers: Api<DynamicObject> =
        Api::namespaced_with(client.clone(), namespace, &ApiResource::erase::<GameServer>(&()));

    let mut annotations = BTreeMap::new();
    annotations.insert(HOSTNAME_ANNOTATION.to_string(), hostname.to_string());
    annotations.insert(SERVICE_NAME_ANNOTATION.to_string(), service.to_string());

    let mut gs = GameServer::new(
        name,
        GameServerSpec {
            ports: vec![GameServerPort {
                name: "default".to_string(),
                port_policy: Some("Dynamic".to_string()),
                container_port: Some(7654),
                host_port: None,
                protocol: "UDP".to_string(),
            }],
        },
    );
    gs.metadata.namespace = Some(namespace.to_string());
    gs.metadata.annotations = Some(annotations);

    // The modelled spec omits the pod template Agones requires, so post it untyped
    let mut value = serde_json::to_value(&gs)?;
    value["spec"]["template"] = serde_json::json!({
        "spec": {
            "containers": [{
                "name": "simple-game-server",
                "image": "us-docker.pkg.dev/agones-images/examples/simple-game-server:0.27"
            }]
        }
    });

    gameservers
        .create(&PostParams::default(), &serde_json::from_value::<DynamicObject>(value)?)
        .await?;

    println!("Created GameServer: {}/{}", namespace, name);
    Ok(())
}

/// Wait for resources to settle
pub async fn wait_for_ready(duration: Duration) {
    println!("Waiting {} seconds for resources to be ready...", duration.as_secs());
    sleep(duration).await;
}
