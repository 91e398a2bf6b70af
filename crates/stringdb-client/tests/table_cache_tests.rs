//! Integration tests for bulk table caching and loading
//!
//! A wiremock server stands in for the static download host.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::time::Duration;
use stringdb_client::graph::{extract, homology_reference, remove_homologous_interactions, Interaction};
use stringdb_client::{ApiClient, ClientError, Config, Table, TableCache};
use stringdb_common::types::TaxonId;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const LINKS: &str = "protein1 protein2 neighborhood fusion cooccurence coexpression experimental database textmining combined_score\n\
                     9606.A 9606.B 0 0 0 0 300 0 400 500\n\
                     9606.B 9606.C 0 0 0 0 0 0 200 200\n\
                     9606.A 9606.C 0 0 0 0 700 0 600 800\n";

const HOMOLOGY: &str = "#string_protein_id_1 string_protein_id_2 bitscore\n\
                        9606.A 9606.B 80\n\
                        9606.B 9606.C 40\n";

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn table_path(stem: &str) -> String {
    format!("/download/{stem}/9606.{stem}.txt.gz")
}

fn cache_for(server: &MockServer, dir: &std::path::Path) -> TableCache {
    let config = Config::default()
        .with_static_url(format!("{}/download/", server.uri()))
        .with_cache_dir(dir)
        .with_retries(0);
    let client = ApiClient::new(&config)
        .unwrap()
        .with_retry_backoff(Duration::from_millis(1));
    TableCache::new(&config, client)
}

#[tokio::test]
async fn test_download_happens_at_most_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(table_path("protein.links.detail.v12.0")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(LINKS)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = cache_for(&server, dir.path());

    let first = cache.ensure(TaxonId::HUMAN, Table::Links).await.unwrap();
    let second = cache.ensure(TaxonId::HUMAN, Table::Links).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first, dir.path().join("9606.protein.links.detail.v12.0.txt.gz"));

    // A fresh cache over the same directory reuses the file on disk.
    let other = cache_for(&server, dir.path());
    other.load_links(TaxonId::HUMAN).await.unwrap();
}

#[tokio::test]
async fn test_cache_dir_is_created() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(table_path("protein.links.detail.v12.0")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(LINKS)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested").join("cache");
    let cache = cache_for(&server, &nested);

    let graph = cache.load_links(TaxonId::HUMAN).await.unwrap();
    assert!(nested.is_dir());
    assert_eq!(graph.edge_count(), 3);
}

#[tokio::test]
async fn test_missing_table_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = cache_for(&server, dir.path());

    let err = cache.ensure(TaxonId::MOUSE, Table::Info).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 404, .. }));
    assert!(!cache.path_for(TaxonId::MOUSE, Table::Info).exists());
}

#[tokio::test]
async fn test_malformed_download_fails_whole_parse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(table_path("protein.links.detail.v12.0")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(
            "protein1 protein2 combined_score\n9606.A 9606.B 500\n9606.B 9606.C n/a\n",
        )))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = cache_for(&server, dir.path());

    let err = cache.load_links(TaxonId::HUMAN).await.unwrap_err();
    match err {
        ClientError::MalformedTable { line, path, .. } => {
            assert_eq!(line, 3);
            assert!(path.ends_with("9606.protein.links.detail.v12.0.txt.gz"));
        },
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_threshold_and_homology_pipeline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(table_path("protein.links.detail.v12.0")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(LINKS)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(table_path("protein.homology.v12.0")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(HOMOLOGY)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = cache_for(&server, dir.path());
    let ids = ["9606.A", "9606.B", "9606.C"];

    let links = cache.load_links(TaxonId::HUMAN).await.unwrap();
    let thresholded = extract(&links, &ids, Some(300.0), None).unwrap();
    assert_eq!(
        thresholded.interactions,
        vec![
            Interaction::new("9606.A", "9606.B", 500.0),
            Interaction::new("9606.A", "9606.C", 800.0),
        ]
    );

    let homology = cache.load_homology(TaxonId::HUMAN, 60.0).await.unwrap();
    assert_eq!(homology.edge_count(), 1);

    let sub = extract(&links, &["9606.A", "9606.B"], None, None).unwrap();
    let reference = homology_reference(&homology, sub.ids(), 60.0).unwrap();
    let report = remove_homologous_interactions(&sub, &reference);
    assert_eq!(report.homologous, vec![Interaction::new("9606.A", "9606.B", 500.0)]);
    assert!(report.remaining.is_empty());
    assert_eq!(report.non_homologous.vertex_count(), 2);
}
