//! End-to-end tests for the `stringdb` binary
//!
//! Covers:
//! - Release listing against a mocked discovery endpoint
//! - API and alias-table identifier mapping
//! - Subnetwork extraction with threshold, homology removal and clustering
//! - Table downloads into a temporary cache directory
//! - Error reporting and exit codes

use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use wiremock::{
    matchers::{body_string_contains, method, path},
    Mock, MockServer, ResponseTemplate,
};

// ============================================================================
// Fixtures
// ============================================================================

/// Two triangles joined by one weak bridge
const LINKS: &str = "protein1 protein2 combined_score\n\
                     9606.A 9606.B 900\n\
                     9606.B 9606.C 900\n\
                     9606.A 9606.C 900\n\
                     9606.C 9606.D 150\n\
                     9606.D 9606.E 900\n\
                     9606.E 9606.F 900\n\
                     9606.D 9606.F 900\n";

const HOMOLOGY: &str = "#string_protein_id_1 string_protein_id_2 bitscore\n\
                        9606.A 9606.B 120\n\
                        9606.E 9606.F 30\n";

const ALIASES: &str = "#string_protein_id\talias\tsource\n\
                       9606.A\tALPHA\tEnsembl_HGNC\n\
                       9606.B\tBETA\tEnsembl_HGNC\n\
                       9606.C\tGAMMA\tEnsembl_HGNC\n";

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn mock_versions() -> Value {
    json!([
        {"string_version": "12.0", "stable_address": "https://version-12-0.string-db.org"},
        {"string_version": "11.5", "stable_address": "https://version-11-5.string-db.org"}
    ])
}

fn mock_string_ids() -> Value {
    json!([
        {
            "queryIndex": 0,
            "queryItem": "p53",
            "stringId": "9606.ENSP00000269305",
            "ncbiTaxonId": 9606,
            "taxonName": "Homo sapiens",
            "preferredName": "TP53",
            "annotation": "Cellular tumor antigen p53; Acts as a tumor suppressor in many tumor types"
        }
    ])
}

async fn mount_table(server: &MockServer, stem: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{stem}/9606.{stem}.txt.gz")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(body)))
        .mount(server)
        .await;
}

/// Binary pointed at the mock server with an isolated cache directory
fn stringdb(server: &MockServer, cache: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stringdb").unwrap();
    cmd.env("STRINGDB_API_URL", server.uri())
        .env("STRINGDB_DISCOVERY_URL", server.uri())
        .env("STRINGDB_STATIC_URL", format!("{}/download/", server.uri()))
        .env("STRINGDB_CACHE_DIR", cache)
        .env("STRINGDB_RETRIES", "0")
        .env("NO_COLOR", "1")
        .env_remove("STRINGDB_VERSION")
        .env_remove("RUST_LOG");
    for key in ["LOG_LEVEL", "LOG_OUTPUT", "LOG_FORMAT", "LOG_DIR", "LOG_FILE_PREFIX", "LOG_FILTER"] {
        cmd.env_remove(key);
    }
    cmd
}

// ============================================================================
// Basic CLI
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("stringdb").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("subnetwork"))
        .stdout(predicate::str::contains("download"));
}

#[test]
fn test_subnetwork_help_lists_filters() {
    let mut cmd = Command::cargo_bin("stringdb").unwrap();
    cmd.args(["subnetwork", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--threshold"))
        .stdout(predicate::str::contains("--remove-homologous"));
}

// ============================================================================
// versions
// ============================================================================

#[tokio::test]
async fn test_versions_marks_configured_release() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/json/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_versions()))
        .mount(&server)
        .await;

    let cache = tempfile::tempdir().unwrap();
    stringdb(&server, cache.path())
        .arg("versions")
        .assert()
        .success()
        .stdout(predicate::str::contains("12.0"))
        .stdout(predicate::str::contains("https://version-11-5.string-db.org"))
        .stdout(predicate::str::contains("*"));
}

#[tokio::test]
async fn test_versions_json_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/json/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_versions()))
        .mount(&server)
        .await;

    let cache = tempfile::tempdir().unwrap();
    let output = stringdb(&server, cache.path())
        .args(["--format", "json", "versions"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);
    assert_eq!(parsed[0]["string_version"], "12.0");
}

// ============================================================================
// map
// ============================================================================

#[tokio::test]
async fn test_map_through_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/json/get_string_ids"))
        .and(body_string_contains("species=9606"))
        .and(body_string_contains("echo_query=1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_string_ids()))
        .expect(1)
        .mount(&server)
        .await;

    let cache = tempfile::tempdir().unwrap();
    stringdb(&server, cache.path())
        .args(["map", "9606", "p53"])
        .assert()
        .success()
        .stdout(predicate::str::contains("9606.ENSP00000269305"))
        .stdout(predicate::str::contains("TP53"));
}

#[tokio::test]
async fn test_map_api_error_exits_nonzero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/json/get_string_ids"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let cache = tempfile::tempdir().unwrap();
    stringdb(&server, cache.path())
        .args(["map", "9606", "p53"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("500"));
}

#[tokio::test]
async fn test_map_local_reports_conversion_rate() {
    let server = MockServer::start().await;
    mount_table(&server, "protein.aliases.v12.0", ALIASES).await;

    let cache = tempfile::tempdir().unwrap();
    stringdb(&server, cache.path())
        .args(["map", "9606", "ALPHA", "GAMMA", "OMEGA", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("9606.A"))
        .stdout(predicate::str::contains("9606.C"))
        .stdout(predicate::str::contains("0.67"))
        .stdout(predicate::str::contains("(2/3)"))
        .stdout(predicate::str::contains("OMEGA"));
}

#[tokio::test]
async fn test_map_local_strict_fails_on_partial_resolution() {
    let server = MockServer::start().await;
    mount_table(&server, "protein.aliases.v12.0", ALIASES).await;

    let cache = tempfile::tempdir().unwrap();
    stringdb(&server, cache.path())
        .args(["map", "9606", "ALPHA", "OMEGA", "--local", "--strict"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_strict_requires_local() {
    let mut cmd = Command::cargo_bin("stringdb").unwrap();
    cmd.args(["map", "9606", "ALPHA", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--local"));
}

// ============================================================================
// subnetwork
// ============================================================================

#[tokio::test]
async fn test_subnetwork_threshold_drops_bridge() {
    let server = MockServer::start().await;
    mount_table(&server, "protein.links.detail.v12.0", LINKS).await;

    let cache = tempfile::tempdir().unwrap();
    let output = stringdb(&server, cache.path())
        .args([
            "--format", "json", "subnetwork", "9606", "9606.A", "9606.B", "9606.C", "9606.D", "9606.E", "9606.F",
            "9606.Z", "--threshold", "400",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["vertices"], 6);
    assert_eq!(report["interactions"].as_array().unwrap().len(), 6);
    assert_eq!(report["dropped"], json!(["9606.Z"]));
    assert_eq!(report["components"].as_array().unwrap().len(), 2);
    assert!(report.get("partition").is_none());
}

#[tokio::test]
async fn test_subnetwork_clusters_two_triangles() {
    let server = MockServer::start().await;
    mount_table(&server, "protein.links.detail.v12.0", LINKS).await;

    let cache = tempfile::tempdir().unwrap();
    let output = stringdb(&server, cache.path())
        .args([
            "--format", "json", "subnetwork", "9606", "9606.A", "9606.B", "9606.C", "9606.D", "9606.E", "9606.F",
            "--cluster", "fast-greedy",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let partition = &report["partition"];
    assert_eq!(partition["algorithm"], "fastgreedy");

    let membership = partition["membership"].as_array().unwrap();
    let community = |id: &str| {
        membership
            .iter()
            .find(|m| m[0] == id)
            .map(|m| m[1].as_u64().unwrap())
            .unwrap()
    };
    assert_eq!(community("9606.A"), community("9606.B"));
    assert_eq!(community("9606.A"), community("9606.C"));
    assert_eq!(community("9606.D"), community("9606.F"));
    assert_ne!(community("9606.A"), community("9606.D"));
    assert!(partition["modularity"].as_f64().unwrap() > 0.3);
}

#[tokio::test]
async fn test_subnetwork_unknown_algorithm_falls_back() {
    let server = MockServer::start().await;
    mount_table(&server, "protein.links.detail.v12.0", LINKS).await;

    let cache = tempfile::tempdir().unwrap();
    stringdb(&server, cache.path())
        .args(["subnetwork", "9606", "9606.A", "9606.B", "9606.C", "--cluster", "spectral"])
        .assert()
        .success()
        .stdout(predicate::str::contains("edge-betweenness"))
        .stderr(predicate::str::contains("spectral"));
}

#[tokio::test]
async fn test_subnetwork_removes_homologous_pairs() {
    let server = MockServer::start().await;
    mount_table(&server, "protein.links.detail.v12.0", LINKS).await;
    mount_table(&server, "protein.homology.v12.0", HOMOLOGY).await;

    let cache = tempfile::tempdir().unwrap();
    let output = stringdb(&server, cache.path())
        .args([
            "--format",
            "json",
            "subnetwork",
            "9606",
            "9606.A",
            "9606.B",
            "9606.C",
            "9606.E",
            "9606.F",
            "--remove-homologous",
            "--min-bitscore",
            "60",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    // A-B is homologous; E-F falls under the bitscore cutoff
    assert_eq!(report["homologous_removed"], 1);
    assert_eq!(report["vertices"], 5);
    let pairs: Vec<(String, String)> = report["interactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| {
            (
                i["source"].as_str().unwrap().to_string(),
                i["target"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert!(!pairs.contains(&("9606.A".to_string(), "9606.B".to_string())));
    assert!(pairs.contains(&("9606.E".to_string(), "9606.F".to_string())));
    assert_eq!(pairs.len(), 3);
}

#[tokio::test]
async fn test_subnetwork_with_symbols_relabels_vertices() {
    let server = MockServer::start().await;
    mount_table(&server, "protein.links.detail.v12.0", LINKS).await;
    mount_table(&server, "protein.aliases.v12.0", ALIASES).await;

    let cache = tempfile::tempdir().unwrap();
    stringdb(&server, cache.path())
        .args(["--format", "tsv", "subnetwork", "9606", "ALPHA", "BETA", "GAMMA", "--symbols"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ALPHA\tBETA\t900"))
        .stdout(predicate::str::contains("9606.A").not());
}

#[tokio::test]
async fn test_subnetwork_malformed_table_fails() {
    let server = MockServer::start().await;
    mount_table(
        &server,
        "protein.links.detail.v12.0",
        "protein1 protein2 combined_score\n9606.A 9606.B high\n",
    )
    .await;

    let cache = tempfile::tempdir().unwrap();
    stringdb(&server, cache.path())
        .args(["subnetwork", "9606", "9606.A", "9606.B"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("line 2"));
}

// ============================================================================
// download
// ============================================================================

#[tokio::test]
async fn test_download_fetches_table_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/protein.info.v12.0/9606.protein.info.v12.0.txt.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip("#string_protein_id\tpreferred_name\n")))
        .expect(1)
        .mount(&server)
        .await;

    let cache = tempfile::tempdir().unwrap();
    for _ in 0..2 {
        stringdb(&server, cache.path())
            .args(["download", "9606", "info"])
            .assert()
            .success()
            .stdout(predicate::str::contains("9606.protein.info.v12.0"));
    }

    assert!(cache.path().join("9606.protein.info.v12.0.txt.gz").is_file());
}

#[tokio::test]
async fn test_download_unknown_table_fails() {
    let server = MockServer::start().await;
    let cache = tempfile::tempdir().unwrap();

    stringdb(&server, cache.path())
        .args(["download", "9606", "edges"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("edges"));
}

#[tokio::test]
async fn test_download_invalid_taxon_fails() {
    let server = MockServer::start().await;
    let cache = tempfile::tempdir().unwrap();

    stringdb(&server, cache.path())
        .args(["download", "human", "links"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}
