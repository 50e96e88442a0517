// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # CLI Interface
//!
//! Defines the command-line argument structure for `driftpeer` using `clap`
//! derive: the five positional arguments from `spec.md` §6 plus an optional
//! verbose flag. There are no subcommands — the binary has exactly one mode
//! of operation: join the overlay and drop into the interactive shell.

use clap::Parser;
use std::path::PathBuf;

/// The fixed address every node dials first to enter the overlay. Compiled
/// in, per `spec.md` §6 — there is no central tracker to discover it from.
pub const BOOTSTRAP_HOST: &str = "bootstrap.driftpeer.net";
pub const BOOTSTRAP_PORT: u16 = 8270;

/// driftpeer — unstructured peer-to-peer file-sharing node.
///
/// Joins the overlay via the compiled-in bootstrap endpoint, then drops
/// into an interactive shell for publishing, fetching, and deleting files.
#[derive(Parser, Debug)]
#[command(name = "driftpeer", about = "driftpeer P2P file-sharing node", version)]
pub struct DriftpeerCli {
    /// This node's identifier. Unique within the overlay by convention —
    /// nothing authenticates it.
    pub peer_id: String,

    /// Host this node's P2P server binds and advertises.
    pub host: String,

    /// Port this node's P2P server accepts connections on.
    pub p2p_port: u16,

    /// Port the read-only HTTP status endpoint listens on.
    pub http_port: u16,

    /// Base directory for `metadata.json` and the `FileUploads/` blob
    /// directory. Created on first run if it doesn't exist.
    pub base_path: PathBuf,

    /// Enables verbose (debug-level) diagnostics.
    #[arg(long, short = 'v')]
    pub debug: bool,
}
