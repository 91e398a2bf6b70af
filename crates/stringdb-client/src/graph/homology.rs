//! Homology filtering
//!
//! Interactions between paralogous proteins are often artefacts of sequence
//! similarity (text mining and database channels cannot tell the paralogs
//! apart). These helpers compare an extracted subnetwork with the species'
//! homology graph and split its edges into homologous and non-homologous sets.

use super::{extract, Interaction, ProteinGraph, Subnetwork, BITSCORE};
use crate::error::Result;
use petgraph::visit::EdgeRef;
use tracing::info;

/// Default minimum bitscore for a homology pair to count
pub const DEFAULT_MIN_BITSCORE: f64 = 60.0;

/// Outcome of [`remove_homologous_interactions`]
#[derive(Debug, Clone)]
pub struct HomologyReport {
    /// Interaction edges also joined in the homology graph
    pub homologous: Vec<Interaction>,

    /// Subnetwork minus the homologous edges; all vertices kept
    pub non_homologous: ProteinGraph,

    /// Subnetwork rows with every row matching a homologous one removed
    pub remaining: Vec<Interaction>,

    /// Number of rows removed from the interaction table
    pub removed: usize,
}

/// Homology graph restricted to `vertex_ids`, keeping pairs with
/// `bitscore >= min_bitscore`.
pub fn homology_reference<S: AsRef<str>>(
    homology: &ProteinGraph,
    vertex_ids: &[S],
    min_bitscore: f64,
) -> Result<ProteinGraph> {
    let filtered = ProteinGraph::from_edges(
        BITSCORE,
        homology
            .edges()
            .filter(|e| e.value >= min_bitscore)
            .map(|e| (e.source, e.target, e.value)),
    );
    Ok(extract(&filtered, vertex_ids, None, None)?.graph)
}

/// Edges of `subnetwork` whose endpoints are homologous (either direction).
///
/// The homology graph is keyed by reference identifiers, so this also works on
/// relabeled subnetworks.
pub fn homologous_interactions(subnetwork: &Subnetwork, homology: &ProteinGraph) -> Vec<Interaction> {
    split(subnetwork, homology).0
}

fn split(subnetwork: &Subnetwork, homology: &ProteinGraph) -> (Vec<Interaction>, ProteinGraph) {
    let graph = &subnetwork.graph;
    let mut homologous = Vec::new();
    let mut rest = ProteinGraph::new(graph.attribute());
    for name in graph.vertices() {
        rest.add_vertex(name);
    }

    for edge in graph.inner().edge_references() {
        let (s, t) = (edge.source(), edge.target());
        let row = Interaction::new(graph.name(s), graph.name(t), *edge.weight());
        if homology.connects(subnetwork.id_of(s), subnetwork.id_of(t)) {
            homologous.push(row);
        } else {
            rest.add_edge(&row.source, &row.target, row.score);
        }
    }

    (homologous, rest)
}

/// Split `subnetwork` against `homology`.
///
/// The non-homologous graph is the edge-wise difference. Independently the
/// interaction table is filtered: every row equal to a homologous row is
/// dropped, duplicates included.
pub fn remove_homologous_interactions(subnetwork: &Subnetwork, homology: &ProteinGraph) -> HomologyReport {
    let (homologous, non_homologous) = split(subnetwork, homology);

    let remaining: Vec<Interaction> = subnetwork
        .interactions
        .iter()
        .filter(|row| !homologous.contains(row))
        .cloned()
        .collect();
    let removed = subnetwork.interactions.len() - remaining.len();

    info!(
        removed,
        remaining = remaining.len(),
        "Removed homologous interactions"
    );

    HomologyReport {
        homologous,
        non_homologous,
        remaining,
        removed,
    }
}
