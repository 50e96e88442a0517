// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Interactive Shell
//!
//! The command surface a node operator drives directly: `help`, `ls`/`list`,
//! `peers`, `push`, `get`, `delete`, `exit`. Every command either prints
//! progress and completes, or prints a single diagnostic line explaining why
//! it couldn't — the shell itself never panics or exits on a failed command.

use std::io::{self, Write};
use std::sync::Arc;

use driftpeer_core::network::Node;
use driftpeer_core::operations;

/// Runs the interactive command loop on stdin/stdout until `exit` is typed
/// or stdin closes. Returns once the clean-exit procedure has run.
pub async fn run(node: Arc<Node>) {
    println!("driftpeer shell — type `help` for commands");
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        if io::stdin().read_line(&mut line).unwrap_or(0) == 0 {
            break; // stdin closed
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if dispatch(&node, line).await {
            break;
        }
    }
}

/// Dispatches one command line. Returns `true` if the shell should exit.
async fn dispatch(node: &Arc<Node>, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("");
    let rest: Vec<&str> = parts.collect();

    match command {
        "help" => print_help(),
        "ls" => print_list(node, "both"),
        "list" => print_list(node, rest.first().copied().unwrap_or("both")),
        "peers" => print_peers(node),
        "push" => match rest.first() {
            Some(path) => push(node, path).await,
            None => println!("usage: push <path>"),
        },
        "get" => match rest.first() {
            Some(content_id) => get(node, content_id).await,
            None => println!("usage: get <content_id>"),
        },
        "delete" => match rest.first() {
            Some(content_id) => delete(node, content_id).await,
            None => println!("usage: delete <content_id>"),
        },
        "exit" => {
            match operations::clean_exit(node) {
                Ok(()) => println!("goodbye"),
                Err(e) => println!("error during exit: {e}"),
            }
            return true;
        }
        other => println!("unknown command: {other} (try `help`)"),
    }
    false
}

fn print_help() {
    println!("commands:");
    println!("  help                   show this message");
    println!("  ls                     alias for `list both`");
    println!("  list [local|remote|both]  list known files");
    println!("  peers                  list tracked peers");
    println!("  push <path>            publish a local file");
    println!("  get <content_id>       fetch a file by content id");
    println!("  delete <content_id>    delete a file this node owns");
    println!("  exit                   rewrite metadata to local state and quit");
}

fn print_list(node: &Node, which: &str) {
    let records = match which {
        "local" => node.store.list_local(&node.blob_dir),
        "remote" => node.store.list_remote(&node.blob_dir),
        "both" => node.store.list_all(),
        other => {
            println!("unknown list filter: {other} (use local, remote, or both)");
            return;
        }
    };
    if records.is_empty() {
        println!("(no files)");
        return;
    }
    for record in records {
        println!(
            "{}  {:>10}  {}  owner={} ts={}",
            record.content_id, record.file_size, record.file_name, record.file_owner, record.file_timestamp
        );
    }
}

fn print_peers(node: &Node) {
    let peers = node.peers.all();
    if peers.is_empty() {
        println!("(no peers)");
        return;
    }
    for peer in peers {
        println!("{}  {}  last_seen={}", peer.peer_id, peer.endpoint, peer.last_seen);
    }
}

async fn push(node: &Node, path: &str) {
    match operations::push(node, std::path::Path::new(path)).await {
        Ok(record) => println!("published {} as {}", record.file_name, record.content_id),
        Err(e) => println!("push failed: {e}"),
    }
}

async fn get(node: &Node, content_id: &str) {
    match operations::fetch(node, content_id).await {
        Ok(()) => println!("fetched {content_id}"),
        Err(e) => println!("get failed: {e}"),
    }
}

async fn delete(node: &Node, content_id: &str) {
    match operations::delete(node, content_id).await {
        Ok(()) => println!("deleted {content_id}"),
        Err(e) => println!("delete failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftpeer_core::identity::{Endpoint, PeerId};
    use driftpeer_core::storage::MetadataStore;
    use tempfile::tempdir;

    fn node() -> (tempfile::TempDir, Arc<Node>) {
        let dir = tempdir().unwrap();
        let store = MetadataStore::load(dir.path().join("metadata.json")).unwrap();
        let node = Arc::new(Node::new(
            PeerId::new("self"),
            Endpoint::new("127.0.0.1", 9000),
            dir.path().to_path_buf(),
            dir.path().join("FileUploads"),
            store,
        ));
        (dir, node)
    }

    #[tokio::test]
    async fn exit_runs_clean_exit_and_signals_stop() {
        let (_dir, node) = node();
        assert!(dispatch(&node, "exit").await);
    }

    #[tokio::test]
    async fn unknown_command_does_not_exit() {
        let (_dir, node) = node();
        assert!(!dispatch(&node, "frobnicate").await);
    }

    #[tokio::test]
    async fn push_then_list_local_reports_the_file() {
        let (dir, node) = node();
        let file_path = dir.path().join("hello.txt");
        std::fs::write(&file_path, b"hello world").unwrap();

        assert!(!dispatch(&node, &format!("push {}", file_path.display())).await);
        assert!(!dispatch(&node, "list local").await);
        assert_eq!(node.store.list_local(&node.blob_dir).len(), 1);
    }

    #[tokio::test]
    async fn push_with_missing_path_does_not_panic() {
        let (_dir, node) = node();
        assert!(!dispatch(&node, "push").await);
    }
}
