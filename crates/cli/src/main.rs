// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mailfs - CLI front-end over the mailfs engine (spec §6.5), grounded in
//! `ifaplib/cli.py`'s command set.

mod commands;
mod creds;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mailfs",
    version,
    about = "A versioned, encrypted filesystem over an append-only mailbox"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in: record the backing maildir, mailbox, and encryption key
    Login {
        /// Path to the maildir root (created if it doesn't exist)
        #[arg(long)]
        backend: PathBuf,
        /// Mailbox (folder) name
        #[arg(long, default_value = "FILE_STORAGE")]
        mailbox: String,
        /// Encryption key material; omit to disable encryption
        #[arg(long)]
        key: Option<String>,
    },
    /// Log out: remove the saved credentials
    Logout,
    /// Upload a local file
    Put {
        /// Local file to read
        local: PathBuf,
        /// Destination path inside mailfs
        path: String,
    },
    /// Download a file to a local path
    Get {
        /// Path inside mailfs
        path: String,
        /// Local destination file
        local: PathBuf,
        /// Fetch a specific version instead of the latest
        #[arg(long)]
        version: Option<u64>,
    },
    /// Print a file's contents to stdout
    Cat {
        /// Path inside mailfs
        path: String,
        /// Fetch a specific version instead of the latest
        #[arg(long)]
        version: Option<u64>,
    },
    /// List files
    Ls {
        /// Directory prefix to list (defaults to the root)
        #[arg(default_value = "")]
        prefix: String,
        /// Show version counts and last-modified time alongside each path
        #[arg(short = 'l', long)]
        long: bool,
    },
    /// Remove a file (tombstoned if retained beyond one version, erased
    /// outright otherwise)
    Rm {
        /// Path inside mailfs
        path: String,
        /// Also discard retained historical versions immediately
        #[arg(long = "all-versions")]
        all_versions: bool,
    },
    /// List the retained version sequence numbers for a file, or set how
    /// many versions it should retain
    Versions {
        /// Path inside mailfs
        path: String,
        /// Set the desired retention count instead of listing versions
        #[arg(long)]
        set: Option<usize>,
    },
    /// Run the synchronization protocol directly
    Sync {
        /// Reclaim versions beyond each file's retention count
        #[arg(long)]
        cleanup: bool,
        /// Force-write a fresh index snapshot
        #[arg(long)]
        snapshot: bool,
    },
}

fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Login { backend, mailbox, key } => commands::login(backend, mailbox, key),
        Commands::Logout => commands::logout(),
        Commands::Put { local, path } => commands::put(&local, &path),
        Commands::Get { path, local, version } => commands::get(&path, &local, version),
        Commands::Cat { path, version } => commands::cat(&path, version),
        Commands::Ls { prefix, long } => commands::ls(&prefix, long),
        Commands::Rm { path, all_versions } => commands::rm(&path, all_versions),
        Commands::Versions { path, set } => commands::versions(&path, set),
        Commands::Sync { cleanup, snapshot } => commands::sync(cleanup, snapshot),
    }
}
