//! API response types
//!
//! Field names follow the JSON the service returns.

use serde::{Deserialize, Serialize};

/// One entry of `/api/json/version`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringVersion {
    pub string_version: String,
    pub stable_address: String,
}

/// A resolved identifier from `/api/json/get_string_ids`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringIdMatch {
    /// Position of the query in the submitted list, from 0
    pub query_index: usize,

    /// The submitted symbol (present when `echo_query=1`)
    #[serde(default)]
    pub query_item: Option<String>,

    pub string_id: String,

    pub ncbi_taxon_id: u32,

    pub taxon_name: String,

    pub preferred_name: String,

    #[serde(default)]
    pub annotation: String,
}

/// First record of `/api/json/ppi_enrichment`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpiEnrichment {
    pub number_of_nodes: u64,
    pub number_of_edges: u64,
    pub average_node_degree: f64,
    pub local_clustering_coefficient: f64,
    pub expected_number_of_edges: f64,
    pub p_value: f64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_string_id_match_from_api_json() {
        let json = r#"[{
            "queryIndex": 0,
            "queryItem": "p53",
            "stringId": "9606.ENSP00000269305",
            "ncbiTaxonId": 9606,
            "taxonName": "Homo sapiens",
            "preferredName": "TP53",
            "annotation": "Cellular tumor antigen p53"
        }]"#;

        let matches: Vec<StringIdMatch> = serde_json::from_str(json).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].string_id, "9606.ENSP00000269305");
        assert_eq!(matches[0].query_item.as_deref(), Some("p53"));
        assert_eq!(matches[0].preferred_name, "TP53");
    }

    #[test]
    fn test_ppi_enrichment_from_api_json() {
        let json = r#"{
            "number_of_nodes": 10,
            "number_of_edges": 34,
            "average_node_degree": 6.8,
            "local_clustering_coefficient": 0.91,
            "expected_number_of_edges": 9,
            "p_value": 1.1e-11
        }"#;

        let ppi: PpiEnrichment = serde_json::from_str(json).unwrap();
        assert_eq!(ppi.number_of_edges, 34);
        assert!(ppi.p_value < 1e-10);
    }
}
