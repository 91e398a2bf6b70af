//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function. Commands print
//! user output to stdout; diagnostics go through `tracing`.

pub mod download;
pub mod map;
pub mod subnetwork;
pub mod versions;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::tables::TableCache;
use crate::{Cli, OutputFormat};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use serde::Serialize;
use stringdb_common::types::TaxonId;

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub format: OutputFormat,
    /// Release requested explicitly on the command line or via env
    pub requested_version: Option<String>,
}

impl Context {
    /// Environment configuration overridden by command-line flags
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = Config::from_env()?;
        if let Some(url) = &cli.api_url {
            config = config.with_api_url(url.clone());
        }
        if let Some(dir) = &cli.cache_dir {
            config = config.with_cache_dir(dir.clone());
        }
        if let Some(version) = &cli.string_version {
            config = config.with_string_version(version.clone());
        }

        Ok(Self {
            config,
            format: cli.format,
            requested_version: cli.string_version.clone(),
        })
    }

    pub fn new(config: Config, format: OutputFormat) -> Self {
        Self {
            config,
            format,
            requested_version: None,
        }
    }

    pub fn client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.config)
    }

    pub fn tables(&self) -> Result<TableCache> {
        Ok(TableCache::new(&self.config, self.client()?))
    }
}

pub(crate) fn parse_taxon(taxon: &str) -> Result<TaxonId> {
    Ok(taxon.parse::<TaxonId>()?)
}

/// Rows rendered as a rounded table, JSON records or TSV
pub(crate) fn render_rows<T: Serialize>(format: OutputFormat, header: &[&str], rows: &[Vec<String>], records: &T) -> Result<String> {
    let out = match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(header.to_vec());
            for row in rows {
                table.add_row(row.clone());
            }
            format!("{}\n", table)
        },
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(records)?),
        OutputFormat::Tsv => {
            let mut out = header.join("\t");
            out.push('\n');
            for row in rows {
                out.push_str(&row.join("\t"));
                out.push('\n');
            }
            out
        },
    };
    Ok(out)
}
