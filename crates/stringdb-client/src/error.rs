//! Error types for the stringdb client
//!
//! Every variant carries a message that tells the user what went wrong and,
//! where possible, what to do about it.

use std::path::PathBuf;
use stringdb_common::CommonError;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure (DNS, connect, timeout, body decoding)
    #[error("Network request failed: {0}. Check your internet connection and the API URL.")]
    NetworkFailure(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("STRING API returned {status} for {url}: {body}")]
    Api {
        status: u16,
        url: String,
        body: String,
    },

    /// Requested database version cannot be mapped to any address
    #[error("Unsupported STRING version '{0}'. Run 'stringdb versions' to list the supported releases.")]
    UnsupportedVersion(String),

    /// Only part of the requested symbols could be resolved under a strict policy
    #[error("Only {resolved} of {requested} identifiers could be mapped to STRING ids. Check the symbols or use the default warning policy.")]
    PartialIdentifierResolution { resolved: usize, requested: usize },

    /// A bulk table row could not be parsed
    #[error("Malformed table '{}' at line {line}: {reason}. Delete the cached file to force a fresh download.", path.display())]
    MalformedTable {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// Relabeling map is not total over the extracted vertices
    #[error("No display label for vertex '{0}'. The label map must cover every extracted identifier.")]
    MissingLabel(String),

    /// Two extracted vertices were given the same display label
    #[error("Display label '{0}' is used for more than one vertex. Labels must be unique.")]
    DuplicateLabel(String),

    /// An operation needed identifier annotations that were not supplied
    #[error("Missing annotation: {0}")]
    MissingAnnotation(String),

    #[error("Unknown table '{0}'. Expected one of: info, alias, links, links_full, physical, physical_full, sequence, homology, enrich, cluster, cluster_tree.")]
    UnknownTable(String),

    #[error("Unknown clustering algorithm '{0}'. Expected one of: edge-betweenness, fastgreedy, walktrap, leiden.")]
    UnknownAlgorithm(String),

    /// Clustering met an edge weight it cannot use
    #[error("Interaction {source_id} - {target_id} has score {score}. Clustering needs finite, non-negative scores; check the interaction table.")]
    InvalidScore {
        source_id: String,
        target_id: String,
        score: f64,
    },

    #[error("Unknown enrichment category '{0}'. Expected one of: all, process, component, function, keyword, kegg, rctm, pfam, smart, interpro.")]
    UnknownCategory(String),

    #[error("Configuration error: {0}. Check your environment variables.")]
    Config(String),

    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse tabular data: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Common(#[from] CommonError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClientError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn malformed_table(path: impl Into<PathBuf>, line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedTable {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    pub fn missing_annotation(msg: impl Into<String>) -> Self {
        Self::MissingAnnotation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_actionable() {
        let err = ClientError::PartialIdentifierResolution {
            resolved: 3,
            requested: 4,
        };
        assert!(err.to_string().contains("3 of 4"));

        let err = ClientError::malformed_table("/tmp/9606.links.txt.gz", 7, "score 'abc' is not a number");
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("9606.links.txt.gz"));
    }

    #[test]
    fn test_common_errors_convert() {
        let err: ClientError = CommonError::EmptyIdentifiers.into();
        assert!(matches!(err, ClientError::Common(CommonError::EmptyIdentifiers)));
    }
}
