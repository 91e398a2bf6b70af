//! Resolving gene symbols to STRING protein identifiers
//!
//! Remotely through `/api/json/get_string_ids`, or offline from the species'
//! alias table.

use crate::api::{ApiClient, Form, StringIdMatch};
use crate::error::{ClientError, Result};
use crate::tables::loader::read_table;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use stringdb_common::types::Identifier;
use tracing::{debug, info, warn};

/// What to do when only some symbols resolve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Log the rate and continue with what resolved
    #[default]
    Warn,
    /// Fail with [`ClientError::PartialIdentifierResolution`]
    Strict,
}

/// Resolve `identifier` with the API; `limit` matches per symbol
pub async fn map_id(client: &ApiClient, identifier: &Identifier, limit: u32) -> Result<Vec<StringIdMatch>> {
    let mut form = Form::new();
    form.insert("identifiers", identifier.serialize()?);
    form.insert("species", identifier.species.to_string());
    form.insert("limit", limit.to_string());
    form.insert("echo_query", "1".to_string());
    form.insert("caller_identity", client.caller_identity().to_string());

    let matches: Vec<StringIdMatch> = client.post_json("get_string_ids", &form).await?;
    debug!(
        requested = identifier.len(),
        matched = matches.len(),
        "Resolved identifiers via API"
    );
    Ok(matches)
}

/// Outcome of an alias-table lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalMapping {
    /// Symbol -> STRING id, ordered by symbol
    pub resolved: BTreeMap<String, String>,
    /// Number of distinct symbols asked for
    pub requested: usize,
    /// Symbols without an alias entry, ordered
    pub unresolved: Vec<String>,
}

impl LocalMapping {
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    /// `resolved / requested`; 0 for an empty request
    pub fn rate(&self) -> f64 {
        if self.requested == 0 {
            0.0
        } else {
            self.resolved.len() as f64 / self.requested as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.resolved.len() == self.requested
    }

    /// STRING ids in symbol order
    pub fn string_ids(&self) -> Vec<String> {
        self.resolved.values().cloned().collect()
    }

    /// STRING id -> symbol, for relabeling extracted subnetworks.
    /// An id reached from several symbols keeps the first in symbol order.
    pub fn labels(&self) -> HashMap<String, String> {
        let mut labels = HashMap::with_capacity(self.resolved.len());
        for (symbol, id) in &self.resolved {
            labels.entry(id.clone()).or_insert_with(|| symbol.clone());
        }
        labels
    }
}

/// Resolve `symbols` from an alias table (`#string_protein_id alias source`).
///
/// The first id listed for an alias wins.
pub fn map_id_local<S: AsRef<str>>(alias_table: &Path, symbols: &[S], policy: ResolutionPolicy) -> Result<LocalMapping> {
    let wanted: BTreeSet<&str> = symbols.iter().map(|s| s.as_ref()).collect();
    let mut resolved: BTreeMap<String, String> = BTreeMap::new();

    if !wanted.is_empty() {
        let mut table = read_table(alias_table)?;
        let id_idx = table.column_index("string_protein_id")?;
        let alias_idx = table.column_index("alias")?;

        let mut record = csv::StringRecord::new();
        while table.records.read_record(&mut record)? {
            let (Some(id), Some(alias)) = (record.get(id_idx), record.get(alias_idx)) else {
                let line = record.position().map(|p| p.line() + 1).unwrap_or(0);
                return Err(ClientError::malformed_table(alias_table, line, "expected string_protein_id and alias columns"));
            };
            if wanted.contains(alias) && !resolved.contains_key(alias) {
                resolved.insert(alias.to_string(), id.to_string());
            }
        }
    }

    let unresolved: Vec<String> = wanted
        .iter()
        .filter(|s| !resolved.contains_key(**s))
        .map(|s| s.to_string())
        .collect();

    let mapping = LocalMapping {
        resolved,
        requested: wanted.len(),
        unresolved,
    };

    info!(
        resolved = mapping.resolved_count(),
        requested = mapping.requested,
        rate = mapping.rate(),
        "Conversion rate"
    );

    if !mapping.is_complete() {
        match policy {
            ResolutionPolicy::Warn => warn!(
                unresolved = ?mapping.unresolved,
                "Some identifiers could not be mapped to STRING ids"
            ),
            ResolutionPolicy::Strict => {
                return Err(ClientError::PartialIdentifierResolution {
                    resolved: mapping.resolved_count(),
                    requested: mapping.requested,
                })
            },
        }
    }

    Ok(mapping)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use stringdb_common::types::TaxonId;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ALIASES: &str = "#string_protein_id\talias\tsource\n\
                           9606.ENSP00000269305\tTP53\tEnsembl_HGNC_symbol\n\
                           9606.ENSP00000269305\tTP53\tBLAST_UniProt_GN\n\
                           9606.ENSP00000258149\tMDM2\tEnsembl_HGNC_symbol\n\
                           9606.ENSP00000999999\tMDM2\tBioMart_HUGO\n\
                           9606.ENSP00000244741\tCDKN1A\tEnsembl_HGNC_symbol\n";

    fn alias_file() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), ALIASES).unwrap();
        file
    }

    #[test]
    fn test_first_id_per_alias_wins() {
        let file = alias_file();
        let mapping = map_id_local(file.path(), &["TP53", "MDM2"], ResolutionPolicy::Warn).unwrap();
        assert_eq!(mapping.resolved["MDM2"], "9606.ENSP00000258149");
        assert_eq!(
            mapping.string_ids(),
            vec!["9606.ENSP00000258149".to_string(), "9606.ENSP00000269305".to_string()]
        );
        assert_eq!(mapping.rate(), 1.0);
    }

    #[test]
    fn test_partial_resolution_rate() {
        let file = alias_file();
        let mapping = map_id_local(file.path(), &["TP53", "MDM2", "CDKN1A", "NOPE"], ResolutionPolicy::Warn).unwrap();
        assert_eq!(mapping.resolved_count(), 3);
        assert_eq!(mapping.requested, 4);
        assert_eq!(mapping.rate(), 0.75);
        assert_eq!(mapping.unresolved, vec!["NOPE".to_string()]);
        assert_eq!(mapping.labels()["9606.ENSP00000244741"], "CDKN1A");
    }

    #[test]
    fn test_strict_policy_fails_on_partial() {
        let file = alias_file();
        let err = map_id_local(file.path(), &["TP53", "NOPE"], ResolutionPolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            ClientError::PartialIdentifierResolution {
                resolved: 1,
                requested: 2
            }
        ));
    }

    #[test]
    fn test_empty_request() {
        let mapping = map_id_local(Path::new("/nonexistent"), &Vec::<String>::new(), ResolutionPolicy::Strict).unwrap();
        assert_eq!(mapping.rate(), 0.0);
        assert!(mapping.resolved.is_empty());
    }

    #[tokio::test]
    async fn test_map_id_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/json/get_string_ids"))
            .and(body_string_contains("identifiers=p53%0Dmdm2"))
            .and(body_string_contains("species=9606"))
            .and(body_string_contains("echo_query=1"))
            .and(body_string_contains("caller_identity=stringdb-client"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"queryIndex":0,"queryItem":"p53","stringId":"9606.ENSP00000269305","ncbiTaxonId":9606,
                    "taxonName":"Homo sapiens","preferredName":"TP53","annotation":"Cellular tumor antigen p53"},
                   {"queryIndex":1,"queryItem":"mdm2","stringId":"9606.ENSP00000258149","ncbiTaxonId":9606,
                    "taxonName":"Homo sapiens","preferredName":"MDM2","annotation":"E3 ubiquitin-protein ligase Mdm2"}]"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&Config::default().with_api_url(server.uri())).unwrap();
        let ids = Identifier::new(TaxonId::HUMAN, ["p53", "mdm2"]);
        let matches = map_id(&client, &ids, 1).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[1].preferred_name, "MDM2");
        assert_eq!(matches[0].query_item.as_deref(), Some("p53"));
    }

    #[tokio::test]
    async fn test_map_id_rejects_empty_identifier() {
        let client = ApiClient::new(&Config::default()).unwrap();
        let ids = Identifier::new(TaxonId::HUMAN, Vec::<String>::new());
        assert!(matches!(map_id(&client, &ids, 1).await, Err(ClientError::Common(_))));
    }
}
