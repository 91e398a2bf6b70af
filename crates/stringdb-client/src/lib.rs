//! stringdb client library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Client for the STRING protein-protein interaction database.
//!
//! # Overview
//!
//! - **Identifier resolution**: symbols to STRING ids, via the API or the
//!   local alias table ([`mapping`])
//! - **Remote networks**: rendered images with custom node colors and
//!   enrichment / homology tables ([`network`])
//! - **Bulk tables**: cached downloads of the per-species flat files
//!   ([`tables`])
//! - **Graph algebra**: induced subnetworks, homology filtering and
//!   clustering on the downloaded interaction graph ([`graph`])
//! - **Releases**: version discovery and address selection ([`version`])
//!
//! The `stringdb` binary exposes the common workflows (`download`,
//! `versions`, `map`, `subnetwork`).

pub mod api;
pub mod colors;
pub mod commands;
pub mod config;
pub mod error;
pub mod graph;
pub mod mapping;
pub mod network;
pub mod progress;
pub mod tables;
pub mod version;

// Re-export commonly used types
pub use api::ApiClient;
pub use config::Config;
pub use error::{ClientError, Result};
pub use tables::{Table, TableCache};

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// stringdb - STRING database client
#[derive(Parser, Debug)]
#[command(name = "stringdb")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// API address (a release's stable address)
    #[arg(long, env = "STRINGDB_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Directory for downloaded tables
    #[arg(long, env = "STRINGDB_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// STRING release, e.g. 12.0
    #[arg(long = "string-version", env = "STRINGDB_VERSION", global = true)]
    pub string_version: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Tsv,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a bulk table into the cache
    Download {
        /// NCBI taxon id, e.g. 9606
        taxon: String,

        /// Table kind (info, alias, links, links_full, physical, physical_full,
        /// sequence, homology, enrich, cluster, cluster_tree)
        table: String,
    },

    /// List published STRING releases
    Versions,

    /// Resolve gene symbols to STRING ids
    Map {
        /// NCBI taxon id
        taxon: String,

        /// Symbols to resolve
        #[arg(required = true)]
        ids: Vec<String>,

        /// Matches per symbol
        #[arg(short, long, default_value = "1")]
        limit: u32,

        /// Use the downloaded alias table instead of the API
        #[arg(long)]
        local: bool,

        /// Fail unless every symbol resolves (with --local)
        #[arg(long, requires = "local")]
        strict: bool,
    },

    /// Extract, filter and cluster a subnetwork of the interaction table
    Subnetwork {
        /// NCBI taxon id
        taxon: String,

        /// STRING ids (or symbols with --symbols)
        #[arg(required = true)]
        ids: Vec<String>,

        /// Keep only edges scoring strictly above this value
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Cluster with edge-betweenness, fastgreedy, walktrap or leiden
        #[arg(short, long)]
        cluster: Option<String>,

        /// Drop interactions between homologous proteins
        #[arg(long)]
        remove_homologous: bool,

        /// Minimum bitscore for a homology pair
        #[arg(long, default_value_t = graph::homology::DEFAULT_MIN_BITSCORE)]
        min_bitscore: f64,

        /// Treat ids as symbols: map them with the alias table and label
        /// vertices by symbol
        #[arg(long)]
        symbols: bool,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subnetwork() {
        let cli = Cli::try_parse_from([
            "stringdb",
            "subnetwork",
            "9606",
            "9606.A",
            "9606.B",
            "--threshold",
            "400",
            "--cluster",
            "leiden",
            "--remove-homologous",
        ])
        .unwrap();

        match cli.command {
            Commands::Subnetwork {
                ids,
                threshold,
                cluster,
                remove_homologous,
                min_bitscore,
                ..
            } => {
                assert_eq!(ids, vec!["9606.A", "9606.B"]);
                assert_eq!(threshold, Some(400.0));
                assert_eq!(cluster.as_deref(), Some("leiden"));
                assert!(remove_homologous);
                assert_eq!(min_bitscore, 60.0);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_strict_requires_local() {
        assert!(Cli::try_parse_from(["stringdb", "map", "9606", "TP53", "--strict"]).is_err());
        assert!(Cli::try_parse_from(["stringdb", "map", "9606", "TP53", "--local", "--strict"]).is_ok());
    }
}
