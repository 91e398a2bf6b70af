//! API endpoint URL builders

use stringdb_common::types::TaxonId;

fn trim(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

/// Release listing used for version discovery
pub fn version_url(base_url: &str) -> String {
    format!("{}/api/json/version", trim(base_url))
}

/// `/api/<format>/<method>` for any output format
pub fn method_url(base_url: &str, format: &str, method: &str) -> String {
    format!("{}/api/{}/{}", trim(base_url), format, method)
}

pub fn json_url(base_url: &str, method: &str) -> String {
    method_url(base_url, "json", method)
}

pub fn tsv_url(base_url: &str, method: &str) -> String {
    method_url(base_url, "tsv", method)
}

/// Custom node color upload
pub fn payload_url(base_url: &str) -> String {
    format!("{}/cgi/webservices/post_payload.pl", trim(base_url))
}

/// Bulk table download: `<static><stem>/<taxon>.<stem>.txt.gz`
pub fn table_download_url(static_url: &str, taxon: TaxonId, stem: &str) -> String {
    format!("{}/{}/{}.{}.txt.gz", trim(static_url), stem, taxon, stem)
}
