//! Common types used across stringdb

use crate::error::{CommonError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Delimiter the STRING API expects between identifiers in form bodies.
pub const IDENTIFIER_DELIMITER: char = '\r';

/// NCBI taxonomy id selecting a species (9606 = Homo sapiens).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonId(pub u32);

impl TaxonId {
    pub const HUMAN: TaxonId = TaxonId(9606);
    pub const MOUSE: TaxonId = TaxonId(10090);
    pub const YEAST: TaxonId = TaxonId(4932);

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TaxonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaxonId {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().parse::<u32>() {
            Ok(0) | Err(_) => Err(CommonError::InvalidTaxon(s.to_string())),
            Ok(id) => Ok(TaxonId(id)),
        }
    }
}

impl From<u32> for TaxonId {
    fn from(id: u32) -> Self {
        TaxonId(id)
    }
}

/// A species plus the gene/protein identifiers a request is about.
///
/// `sig` carries an optional numeric annotation per identifier (for example
/// log fold changes from a differential-expression run) used to color nodes.
/// Identifiers are kept in caller order; duplicates are not rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub species: TaxonId,
    pub ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sig: Option<BTreeMap<String, f64>>,
}

impl Identifier {
    pub fn new<I, S>(species: TaxonId, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            species,
            ids: ids.into_iter().map(Into::into).collect(),
            sig: None,
        }
    }

    /// Attach per-identifier annotation values.
    pub fn with_sig(mut self, sig: BTreeMap<String, f64>) -> Self {
        self.sig = Some(sig);
        self
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Form-body representation of the identifier list.
    ///
    /// A single id is returned verbatim, several ids are joined with `\r`
    /// without a trailing delimiter.
    pub fn serialize(&self) -> Result<String> {
        match self.ids.as_slice() {
            [] => Err(CommonError::EmptyIdentifiers),
            [only] => Ok(only.clone()),
            many => Ok(many.join(&IDENTIFIER_DELIMITER.to_string())),
        }
    }
}

/// Joins arbitrary values with the API delimiter (used for colors, background
/// sets and species lists).
pub fn join_values<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            out.push(IDENTIFIER_DELIMITER);
        }
        out.push_str(value.as_ref());
    }
    out
}
