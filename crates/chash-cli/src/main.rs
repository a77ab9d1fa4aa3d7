//! `chash` — explore a consistent hashing ring from the command line.
//!
//! # Usage
//!
//! ```text
//! chash lookup                                  # host1..host3, keys info1..info6
//! chash lookup -n cache-a -n cache-b user:1     # custom nodes and keys
//! chash distribution -n a -n b -n c -s 100000   # keys per node
//! chash diff -n a -n b --add c                  # keys that move when c joins
//! chash -c chash.toml --digest blake3 lookup    # config file plus overrides
//! ```

mod config;
mod telemetry;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chash::{DigestKind, Ring};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "chash", version, about = "Consistent hashing ring explorer")]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Virtual nodes per node (overrides `[ring] replicas`).
    #[arg(short, long, global = true)]
    replicas: Option<usize>,

    /// Digest: `crc32` or `blake3` (overrides `[ring] digest`).
    #[arg(long, global = true)]
    digest: Option<DigestKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the node that owns each key.
    Lookup {
        /// Node to add to the ring. Can be specified multiple times.
        #[arg(short = 'n', long = "node", default_values = ["host1", "host2", "host3"])]
        nodes: Vec<String>,

        /// Keys to look up.
        #[arg(default_values = ["info1", "info2", "info3", "info4", "info5", "info6"])]
        keys: Vec<String>,
    },

    /// Show how sample keys spread across nodes.
    Distribution {
        /// Node to add to the ring. Can be specified multiple times.
        #[arg(short = 'n', long = "node", required = true)]
        nodes: Vec<String>,

        /// Number of sample keys.
        #[arg(short, long, default_value = "10000")]
        samples: usize,
    },

    /// Show which sample keys move when nodes are added.
    Diff {
        /// Node in the starting ring. Can be specified multiple times.
        #[arg(short = 'n', long = "node", required = true)]
        nodes: Vec<String>,

        /// Node added to form the new ring. Can be specified multiple times.
        #[arg(short, long = "add", required = true)]
        add: Vec<String>,

        /// Number of sample keys.
        #[arg(short, long, default_value = "10000")]
        samples: usize,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    telemetry::init(&config.log.level);

    // CLI args override config file values.
    if let Some(replicas) = cli.replicas {
        config.ring.replicas = Some(replicas);
    }
    if let Some(digest) = cli.digest {
        config.ring.digest = digest;
    }
    info!(
        replicas = config.ring.replicas(),
        digest = %config.ring.digest,
        "ring configuration"
    );

    let mut out = io::stdout().lock();
    match cli.command {
        Commands::Lookup { nodes, keys } => cmd_lookup(&config, &nodes, &keys, &mut out),
        Commands::Distribution { nodes, samples } => {
            cmd_distribution(&config, &nodes, samples, &mut out)
        }
        Commands::Diff {
            nodes,
            add,
            samples,
        } => cmd_diff(&config, &nodes, &add, samples, &mut out),
    }
}

/// Build a ring from the config and add `nodes` in one batch.
fn build_ring(config: &CliConfig, nodes: &[String]) -> Ring<DigestKind> {
    let mut ring = config.ring.build();
    ring.add_nodes(nodes);
    debug!(
        nodes = ring.node_count(),
        vnodes = ring.len(),
        "built ring"
    );
    ring
}

/// Sample keys `key-0 .. key-{n-1}`.
fn sample_keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("key-{i}")).collect()
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

// -----------------------------------------------------------------------
// chash lookup
// -----------------------------------------------------------------------

fn cmd_lookup(
    config: &CliConfig,
    nodes: &[String],
    keys: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let ring = build_ring(config, nodes);
    for key in keys {
        let owner = ring.get_node(key).unwrap_or("-");
        writeln!(out, "{key}: {owner}")?;
    }
    Ok(())
}

// -----------------------------------------------------------------------
// chash distribution
// -----------------------------------------------------------------------

fn cmd_distribution(
    config: &CliConfig,
    nodes: &[String],
    samples: usize,
    out: &mut impl Write,
) -> Result<()> {
    let ring = build_ring(config, nodes);
    let counts = ring.distribution(sample_keys(samples));

    writeln!(out, "{:<24} {:>10} {:>8}", "NODE", "KEYS", "SHARE")?;
    for node in ring.nodes() {
        let count = counts.get(node).copied().unwrap_or(0);
        writeln!(
            out,
            "{node:<24} {count:>10} {:>7.2}%",
            percent(count, samples)
        )?;
    }
    Ok(())
}

// -----------------------------------------------------------------------
// chash diff
// -----------------------------------------------------------------------

fn cmd_diff(
    config: &CliConfig,
    nodes: &[String],
    add: &[String],
    samples: usize,
    out: &mut impl Write,
) -> Result<()> {
    let old = build_ring(config, nodes);
    let mut new = old.clone();
    new.add_nodes(add);

    let moves = Ring::diff(&old, &new, sample_keys(samples));

    let mut flows: BTreeMap<(String, String), usize> = BTreeMap::new();
    for m in &moves {
        let from = m.from.clone().unwrap_or_else(|| "-".to_string());
        let to = m.to.clone().unwrap_or_else(|| "-".to_string());
        *flows.entry((from, to)).or_insert(0) += 1;
    }

    writeln!(
        out,
        "{} of {samples} keys moved ({:.2}%)",
        moves.len(),
        percent(moves.len(), samples)
    )?;
    for ((from, to), count) in &flows {
        writeln!(out, "{from} -> {to}: {count}")?;
    }
    Ok(())
}
