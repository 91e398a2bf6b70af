//! Induced subgraph extraction

use super::{Interaction, ProteinGraph};
use crate::error::{ClientError, Result};
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Result of one extraction: the induced subgraph, its edges as rows, and
/// the requested identifiers the reference graph did not contain.
#[derive(Debug, Clone)]
pub struct Subnetwork {
    /// Induced subgraph; vertex names are display labels when relabeled
    pub graph: ProteinGraph,

    /// `(source, target, score)` per retained edge
    pub interactions: Vec<Interaction>,

    /// Requested identifiers absent from the reference graph
    pub dropped: Vec<String>,

    /// Reference identifier of each vertex, indexed like `graph`
    ids: Vec<String>,
}

impl Subnetwork {
    /// Reference identifier behind a vertex (differs from its name after relabeling)
    pub fn id_of(&self, idx: NodeIndex) -> &str {
        &self.ids[idx.index()]
    }

    /// Reference identifiers of all vertices, in vertex order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.graph.vertex_count() == 0
    }
}

/// Induced subgraph of `reference` over `vertex_ids`.
///
/// Identifiers missing from the reference are skipped and reported in
/// [`Subnetwork::dropped`]. With `score_threshold`, only edges scoring strictly
/// above it are kept; vertices are never removed by the threshold. With
/// `labels`, every kept vertex is renamed and a missing label is an error.
pub fn extract<S: AsRef<str>>(
    reference: &ProteinGraph,
    vertex_ids: &[S],
    score_threshold: Option<f64>,
    labels: Option<&HashMap<String, String>>,
) -> Result<Subnetwork> {
    let mut seen = HashSet::new();
    let mut selected: Vec<NodeIndex> = Vec::new();
    let mut dropped = Vec::new();

    for id in vertex_ids {
        let id = id.as_ref();
        if !seen.insert(id) {
            continue;
        }
        match reference.node_index(id) {
            Some(idx) => selected.push(idx),
            None => dropped.push(id.to_string()),
        }
    }

    if !dropped.is_empty() {
        warn!(
            dropped = dropped.len(),
            requested = seen.len(),
            "Identifiers missing from the reference graph were skipped"
        );
    }

    let mut graph = ProteinGraph::new(reference.attribute());
    let mut ids = Vec::with_capacity(selected.len());
    let mut mapped: HashMap<NodeIndex, NodeIndex> = HashMap::with_capacity(selected.len());

    for &old in &selected {
        let id = reference.name(old);
        let name = match labels {
            Some(labels) => labels
                .get(id)
                .ok_or_else(|| ClientError::MissingLabel(id.to_string()))?
                .as_str(),
            None => id,
        };
        if graph.contains(name) {
            return Err(ClientError::DuplicateLabel(name.to_string()));
        }
        mapped.insert(old, graph.add_vertex(name));
        ids.push(id.to_string());
    }

    // Walk only the selected vertices' out-edges, then restore reference order.
    let inner = reference.inner();
    let mut edges: Vec<EdgeIndex> = selected
        .iter()
        .flat_map(|&n| inner.edges(n))
        .filter(|e| mapped.contains_key(&e.target()))
        .filter(|e| score_threshold.map_or(true, |t| *e.weight() > t))
        .map(|e| e.id())
        .collect();
    edges.sort_unstable();

    let mut interactions = Vec::with_capacity(edges.len());
    for edge in edges {
        let Some((s, t)) = inner.edge_endpoints(edge) else {
            continue;
        };
        let value = inner[edge];
        let (s, t) = (mapped[&s], mapped[&t]);
        let source = graph.name(s).to_string();
        let target = graph.name(t).to_string();
        graph.add_edge(&source, &target, value);
        interactions.push(Interaction::new(source, target, value));
    }

    debug!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        threshold = ?score_threshold,
        "Extracted subnetwork"
    );

    Ok(Subnetwork {
        graph,
        interactions,
        dropped,
        ids,
    })
}
