// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # driftpeer node
//!
//! Entry point for the `driftpeer` binary. Parses CLI arguments, initializes
//! logging, joins the overlay through the compiled-in bootstrap endpoint,
//! and serves the interactive shell and the read-only HTTP status endpoint.
//!
//! Startup sequence:
//! 1.  Parse CLI args
//! 2.  Initialize logging
//! 3.  Create the base directory and load the Metadata Store
//! 4.  Bind the P2P listener
//! 5.  Construct the shared `Node`
//! 6.  Spawn the accept loop, periodic-gossip task, and peer-reaper task
//! 7.  Send the one-shot bootstrap GOSSIP
//! 8.  Spawn the HTTP status server
//! 9.  Spawn join-time replication
//! 10. Run the interactive shell on the main task until `exit`
//! 11. Signal shutdown to the background tasks and return

mod api;
mod cli;
mod logging;
mod shell;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use driftpeer_core::identity::{Endpoint, PeerId};
use driftpeer_core::network::{gossip, server, Node};
use driftpeer_core::operations;
use driftpeer_core::storage::MetadataStore;
use driftpeer_core::{config, network};

use cli::DriftpeerCli;
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DriftpeerCli::parse();

    // --- 2. Initialize logging ---
    let level = if cli.debug { "debug" } else { "info" };
    let log_filter = format!("driftpeer={level},driftpeer_core={level},tower_http=info");
    logging::init_logging(&log_filter, LogFormat::Pretty);

    tracing::info!(
        peer_id = %cli.peer_id,
        host = %cli.host,
        p2p_port = cli.p2p_port,
        http_port = cli.http_port,
        base_path = %cli.base_path.display(),
        "starting driftpeer node"
    );

    // --- 3. Base directory and Metadata Store ---
    std::fs::create_dir_all(&cli.base_path)
        .with_context(|| format!("failed to create base directory {}", cli.base_path.display()))?;
    let metadata_path = cli.base_path.join(config::METADATA_FILE);
    let store = MetadataStore::load(&metadata_path)
        .with_context(|| format!("failed to load metadata store at {}", metadata_path.display()))?;
    let blob_dir = cli.base_path.join(config::BLOB_DIR);

    // --- 4. Bind the P2P listener ---
    let endpoint = Endpoint::new(cli.host.clone(), cli.p2p_port);
    let listener = network::transport::bind(&endpoint)
        .await
        .with_context(|| format!("failed to bind P2P listener on {endpoint}"))?;
    tracing::info!(%endpoint, "P2P listener bound");

    // --- 5. Construct the shared Node ---
    let node = Arc::new(Node::new(
        PeerId::new(cli.peer_id.clone()),
        endpoint,
        cli.base_path.clone(),
        blob_dir,
        store,
    ));

    // --- 6. Spawn lifecycle tasks ---
    let shutdown = Arc::new(AtomicBool::new(false));
    let listener_task = tokio::spawn(server::run_listener(
        Arc::clone(&node),
        listener,
        Arc::clone(&shutdown),
    ));
    let gossip_task = tokio::spawn(server::run_periodic_gossip(Arc::clone(&node), Arc::clone(&shutdown)));
    let reaper_task = tokio::spawn(server::run_peer_reaper(Arc::clone(&node), Arc::clone(&shutdown)));

    // --- 7. Bootstrap join — unconditional, even if unreachable ---
    let bootstrap = Endpoint::new(cli::BOOTSTRAP_HOST, cli::BOOTSTRAP_PORT);
    gossip::bootstrap_join(&node, &bootstrap).await;

    // --- 8. HTTP status server ---
    let http_addr = format!("{}:{}", cli.host, cli.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {http_addr}"))?;
    let router = api::create_router(api::AppState { node: Arc::clone(&node) });
    tracing::info!(addr = %http_addr, "HTTP status endpoint listening");
    let http_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, router).await {
            tracing::error!(error = %e, "HTTP status server exited unexpectedly");
        }
    });

    // --- 9. Join-time replication, in the background so the shell is
    //         usable immediately ---
    tokio::spawn({
        let node = Arc::clone(&node);
        async move { operations::join_time_replication(&node).await }
    });

    // --- 10. Interactive shell on the main task ---
    shell::run(Arc::clone(&node)).await;

    // --- 11. Shut down background tasks ---
    shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
    listener_task.abort();
    gossip_task.abort();
    reaper_task.abort();
    http_task.abort();

    Ok(())
}
