//! STRING bulk tables
//!
//! Flat files published per species and release under the static download
//! host. [`TableCache`] keeps them in the local cache directory and loads the
//! edge lists into [`ProteinGraph`]s.

pub mod download;
pub mod loader;

pub use loader::{load_edge_list, parse_edge_list, EdgeColumns};

use crate::api::{endpoints, ApiClient};
use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::graph::ProteinGraph;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use stringdb_common::types::TaxonId;
use tracing::{debug, info};

/// Kinds of bulk table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Info,
    Alias,
    Links,
    LinksFull,
    Physical,
    PhysicalFull,
    Sequence,
    Homology,
    Enrich,
    Cluster,
    ClusterTree,
}

impl Table {
    pub const ALL: [Table; 11] = [
        Table::Info,
        Table::Alias,
        Table::Links,
        Table::LinksFull,
        Table::Physical,
        Table::PhysicalFull,
        Table::Sequence,
        Table::Homology,
        Table::Enrich,
        Table::Cluster,
        Table::ClusterTree,
    ];

    /// Short name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Table::Info => "info",
            Table::Alias => "alias",
            Table::Links => "links",
            Table::LinksFull => "links_full",
            Table::Physical => "physical",
            Table::PhysicalFull => "physical_full",
            Table::Sequence => "sequence",
            Table::Homology => "homology",
            Table::Enrich => "enrich",
            Table::Cluster => "cluster",
            Table::ClusterTree => "cluster_tree",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Table::Info => "protein.info",
            Table::Alias => "protein.aliases",
            Table::Links => "protein.links.detail",
            Table::LinksFull => "protein.links.full",
            Table::Physical => "protein.physical.links.detail",
            Table::PhysicalFull => "protein.physical.links.full",
            Table::Sequence => "protein.sequences",
            Table::Homology => "protein.homology",
            Table::Enrich => "protein.enrichment.terms",
            Table::Cluster => "clusters.info",
            Table::ClusterTree => "clusters.tree",
        }
    }

    /// File stem for a release, e.g. `protein.links.detail.v12.0`
    pub fn stem(&self, version: &str) -> String {
        format!("{}.v{}", self.prefix(), version)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Table::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| ClientError::UnknownTable(s.to_string()))
    }
}

/// Local store of downloaded bulk tables
pub struct TableCache {
    client: ApiClient,
    cache_dir: PathBuf,
    static_url: String,
    version: String,
    /// Files fetched by this process
    downloaded: Mutex<HashSet<PathBuf>>,
}

impl TableCache {
    pub fn new(config: &Config, client: ApiClient) -> Self {
        Self {
            client,
            cache_dir: config.cache_dir.clone(),
            static_url: config.static_url.clone(),
            version: config.string_version.clone(),
            downloaded: Mutex::new(HashSet::new()),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `<cache_dir>/<taxon>.<stem>.txt.gz`
    pub fn path_for(&self, taxon: TaxonId, table: Table) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}.txt.gz", taxon, table.stem(&self.version)))
    }

    pub fn url_for(&self, taxon: TaxonId, table: Table) -> String {
        endpoints::table_download_url(&self.static_url, taxon, &table.stem(&self.version))
    }

    fn already_downloaded(&self, path: &Path) -> bool {
        self.downloaded
            .lock()
            .map(|set| set.contains(path))
            .unwrap_or(false)
    }

    fn mark_downloaded(&self, path: PathBuf) {
        if let Ok(mut set) = self.downloaded.lock() {
            set.insert(path);
        }
    }

    /// Local path of the table, downloading it when it is not cached yet
    pub async fn ensure(&self, taxon: TaxonId, table: Table) -> Result<PathBuf> {
        let path = self.path_for(taxon, table);
        if self.already_downloaded(&path) || path.is_file() {
            debug!(path = %path.display(), "Using cached table");
            return Ok(path);
        }

        std::fs::create_dir_all(&self.cache_dir)?;
        let url = self.url_for(taxon, table);
        info!(%taxon, %table, url = %url, "Downloading table");

        let bytes = download::download_to(&self.client, &url, &path).await?;
        info!(path = %path.display(), bytes, "Table downloaded");

        self.mark_downloaded(path.clone());
        Ok(path)
    }

    /// Interaction links with `combined_score` as `score`
    pub async fn load_links(&self, taxon: TaxonId) -> Result<ProteinGraph> {
        let path = self.ensure(taxon, Table::Links).await?;
        load_edge_list(&path, &EdgeColumns::links())
    }

    /// Homology pairs with `bitscore >= min_bitscore`
    pub async fn load_homology(&self, taxon: TaxonId, min_bitscore: f64) -> Result<ProteinGraph> {
        let path = self.ensure(taxon, Table::Homology).await?;
        load_edge_list(&path, &EdgeColumns::homology().with_min(min_bitscore))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_table_stems() {
        assert_eq!(Table::Links.stem("12.0"), "protein.links.detail.v12.0");
        assert_eq!(Table::PhysicalFull.stem("11.5"), "protein.physical.links.full.v11.5");
        assert_eq!(Table::Alias.stem("12.0"), "protein.aliases.v12.0");
        assert_eq!(Table::ClusterTree.stem("12.0"), "clusters.tree.v12.0");
    }

    #[test]
    fn test_table_names_round_trip() {
        for table in Table::ALL {
            assert_eq!(table.name().parse::<Table>().unwrap(), table);
        }
        assert_eq!("links-full".parse::<Table>().unwrap(), Table::LinksFull);
        assert!(matches!("edges".parse::<Table>(), Err(ClientError::UnknownTable(_))));
    }

    #[test]
    fn test_cache_paths() {
        let config = Config::default()
            .with_cache_dir("/tmp/stringdb")
            .with_static_url("https://stringdb-downloads.org/download");
        let cache = TableCache::new(&config, ApiClient::new(&config).unwrap());

        assert_eq!(
            cache.path_for(TaxonId::HUMAN, Table::Links),
            PathBuf::from("/tmp/stringdb/9606.protein.links.detail.v12.0.txt.gz")
        );
        assert_eq!(
            cache.url_for(TaxonId::HUMAN, Table::Homology),
            "https://stringdb-downloads.org/download/protein.homology.v12.0/9606.protein.homology.v12.0.txt.gz"
        );
    }
}
