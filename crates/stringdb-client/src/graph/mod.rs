//! Interaction graphs built from STRING bulk tables
//!
//! A [`ProteinGraph`] is a directed multigraph whose vertices are protein
//! identifiers and whose edges carry a single numeric attribute (`score` for
//! interaction links, `bitscore` for homology pairs). Everything else in this
//! module derives values from a reference graph:
//!
//! - [`extract`](extract::extract): induced subgraph, threshold, relabeling
//! - [`homology`]: intersection / difference against a homology graph
//! - [`cluster`](cluster::cluster): community detection
//! - [`Subnetwork::collapse_undirected`] and
//!   [`Subnetwork::connected_components`]: visualization helpers

pub mod cluster;
pub mod components;
pub mod extract;
pub mod homology;

pub use cluster::{cluster, ClusterAlgorithm, Partition};
pub use extract::{extract, Subnetwork};
pub use homology::{homologous_interactions, homology_reference, remove_homologous_interactions, HomologyReport};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Edge attribute name for interaction confidence
pub const SCORE: &str = "score";

/// Edge attribute name for homology confidence
pub const BITSCORE: &str = "bitscore";

/// One row of the tabular interaction form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub source: String,
    pub target: String,
    pub score: f64,
}

impl Interaction {
    pub fn new(source: impl Into<String>, target: impl Into<String>, score: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            score,
        }
    }
}

/// Borrowed view of one edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeView<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub value: f64,
}

/// Directed, attributed protein graph with unique vertex names
#[derive(Debug, Clone)]
pub struct ProteinGraph {
    graph: DiGraph<String, f64>,
    index: HashMap<String, NodeIndex>,
    attribute: &'static str,
}

impl ProteinGraph {
    pub fn new(attribute: &'static str) -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            attribute,
        }
    }

    /// Build from `(source, target, value)` triples
    pub fn from_edges<I, S>(attribute: &'static str, edges: I) -> Self
    where
        I: IntoIterator<Item = (S, S, f64)>,
        S: AsRef<str>,
    {
        let mut graph = Self::new(attribute);
        for (source, target, value) in edges {
            graph.add_edge(source.as_ref(), target.as_ref(), value);
        }
        graph
    }

    /// Name of the edge attribute (`score` or `bitscore`)
    pub fn attribute(&self) -> &'static str {
        self.attribute
    }

    /// Existing index for `name`, or a new vertex
    pub fn add_vertex(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Adds a parallel edge even when one already joins the pair
    pub fn add_edge(&mut self, source: &str, target: &str, value: f64) -> EdgeIndex {
        let s = self.add_vertex(source);
        let t = self.add_vertex(target);
        self.graph.add_edge(s, t, value)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    pub fn name(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    /// Vertex names in insertion order
    pub fn vertices(&self) -> impl Iterator<Item = &str> {
        self.graph.node_indices().map(move |idx| self.graph[idx].as_str())
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> {
        self.graph.edge_references().map(move |e| EdgeView {
            source: &self.graph[e.source()],
            target: &self.graph[e.target()],
            value: *e.weight(),
        })
    }

    /// True when any edge joins `a` and `b`, in either direction
    pub fn connects(&self, a: &str, b: &str) -> bool {
        match (self.node_index(a), self.node_index(b)) {
            (Some(a), Some(b)) => self.graph.contains_edge(a, b) || self.graph.contains_edge(b, a),
            _ => false,
        }
    }

    /// Tabular `(source, target, value)` form in edge order
    pub fn interactions(&self) -> Vec<Interaction> {
        self.edges()
            .map(|e| Interaction::new(e.source, e.target, e.value))
            .collect()
    }

    pub(crate) fn inner(&self) -> &DiGraph<String, f64> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices_are_unique() {
        let mut graph = ProteinGraph::new(SCORE);
        let a = graph.add_vertex("A");
        assert_eq!(graph.add_vertex("A"), a);
        graph.add_edge("A", "B", 1.0);
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.vertices().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let graph = ProteinGraph::from_edges(SCORE, [("A", "B", 500.0), ("A", "B", 500.0), ("B", "A", 500.0)]);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.interactions().len(), 3);
    }

    #[test]
    fn test_connects_ignores_direction() {
        let graph = ProteinGraph::from_edges(BITSCORE, [("A", "B", 80.0)]);
        assert!(graph.connects("A", "B"));
        assert!(graph.connects("B", "A"));
        assert!(!graph.connects("A", "C"));
        assert_eq!(graph.attribute(), "bitscore");
    }
}
