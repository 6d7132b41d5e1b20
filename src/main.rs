// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use axum::{http::StatusCode, routing::get, Router};
use clap::Parser;
use gameserver_dns::{
    constants::{
        DEFAULT_DNS_RECORD_TTL_SECS, DEFAULT_METRICS_ADDR, DEFAULT_SRV_PRIORITY,
        DEFAULT_SRV_WEIGHT, DEFAULT_SYNC_INTERVAL_SECS, TOKIO_WORKER_THREADS,
    },
    endpoint::Endpoint,
    gameserver::SrvDefaults,
    metrics::gather_metrics,
    source::{list_endpoints_with_report, spawn_reflector, ReflectorCache},
};
use kube::Client;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Publish SRV records for Agones GameServers.
#[derive(Parser, Debug)]
#[command(name = "gameserver-dns")]
#[command(version, about, long_about = None)]
struct Args {
    /// Namespace to watch; empty for all namespaces
    #[arg(short, long, env = "NAMESPACE", default_value = "default")]
    namespace: String,

    /// Seconds between listing passes
    #[arg(long, env = "SYNC_INTERVAL", default_value_t = DEFAULT_SYNC_INTERVAL_SECS)]
    interval: u64,

    /// Address for the Prometheus /metrics endpoint
    #[arg(long, env = "METRICS_ADDR", default_value = DEFAULT_METRICS_ADDR)]
    metrics_addr: SocketAddr,

    /// Run a single listing pass and exit
    #[arg(long)]
    once: bool,

    /// TTL used when a GameServer has no TTL annotation
    #[arg(long, env = "DEFAULT_TTL", default_value_t = DEFAULT_DNS_RECORD_TTL_SECS)]
    default_ttl: u32,

    /// SRV priority for every target
    #[arg(long, env = "SRV_PRIORITY", default_value_t = DEFAULT_SRV_PRIORITY)]
    srv_priority: u16,

    /// SRV weight for every target
    #[arg(long, env = "SRV_WEIGHT", default_value_t = DEFAULT_SRV_WEIGHT)]
    srv_weight: u16,
}

impl Args {
    fn srv_defaults(&self) -> SrvDefaults {
        SrvDefaults {
            ttl: self.default_ttl,
            priority: self.srv_priority,
            weight: self.srv_weight,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("gameserver-dns")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

fn init_logging() {
    // Respects RUST_LOG, defaulting to INFO.
    // RUST_LOG_FORMAT=json switches to JSON output.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(args: Args) -> Result<()> {
    init_logging();

    info!(
        namespace = %args.namespace,
        interval_secs = args.interval,
        metrics_addr = %args.metrics_addr,
        "Starting gameserver-dns"
    );

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let cache = spawn_reflector(client, &args.namespace);
    cache
        .wait_until_synced()
        .await
        .context("GameServer cache failed to synchronize")?;
    info!("GameServer cache synchronized");

    if args.once {
        return run_pass(&cache, &args);
    }

    tokio::select! {
        result = run_metrics_server(args.metrics_addr) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("metrics server exited unexpectedly without error")
        }
        result = run_sync_loop(&cache, &args) => {
            error!("CRITICAL: sync loop exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("sync loop exited unexpectedly without error")
        }
        result = shutdown_signal() => {
            info!("Shutdown signal received, exiting");
            result
        }
    }
}

/// Run listing passes forever on a fixed interval.
async fn run_sync_loop(cache: &ReflectorCache, args: &Args) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval.max(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if let Err(e) = run_pass(cache, args) {
            // The reflector keeps retrying in the background; try again next tick
            warn!("Listing pass failed: {:#}", e);
        }
    }
}

/// One listing pass; endpoints go to stdout as JSON lines.
fn run_pass(cache: &ReflectorCache, args: &Args) -> Result<()> {
    let report = list_endpoints_with_report(cache, &args.namespace, &args.srv_defaults())?;

    for endpoint in &report.endpoints {
        publish(endpoint)?;
    }

    info!(
        endpoints = report.endpoints.len(),
        skipped = report.skipped.len(),
        failed = report.failures.len(),
        "Listing pass complete"
    );
    Ok(())
}

fn publish(endpoint: &Endpoint) -> Result<()> {
    debug!(
        dns_name = %endpoint.dns_name,
        ttl = endpoint.record_ttl,
        targets = ?endpoint.targets,
        "Publishing endpoint"
    );
    println!("{}", serde_json::to_string(endpoint)?);
    Ok(())
}

/// Serve Prometheus metrics at `/metrics`.
async fn run_metrics_server(addr: SocketAddr) -> Result<()> {
    let app = Router::new().route("/metrics", get(metrics_handler));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind metrics server to {addr}"))?;
    info!(%addr, "Serving metrics");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics_handler() -> Result<String, (StatusCode, String)> {
    gather_metrics().map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Resolve on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
