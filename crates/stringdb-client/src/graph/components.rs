//! Undirected views of a subnetwork

use super::Subnetwork;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

impl Subnetwork {
    /// One undirected edge per vertex pair, weighted by the highest score
    /// among the parallel/reciprocal edges. Self loops are dropped.
    ///
    /// Node indices match the subnetwork's vertex indices.
    pub fn collapse_undirected(&self) -> UnGraph<String, f64> {
        let inner = self.graph.inner();
        let mut collapsed = UnGraph::with_capacity(inner.node_count(), inner.edge_count());
        for idx in inner.node_indices() {
            collapsed.add_node(inner[idx].clone());
        }

        let mut pairs: HashMap<(NodeIndex, NodeIndex), petgraph::graph::EdgeIndex> = HashMap::new();
        for edge in inner.edge_references() {
            let (a, b) = (edge.source(), edge.target());
            if a == b {
                continue;
            }
            let key = if a < b { (a, b) } else { (b, a) };
            match pairs.get(&key) {
                Some(&existing) => {
                    if *edge.weight() > collapsed[existing] {
                        collapsed[existing] = *edge.weight();
                    }
                },
                None => {
                    pairs.insert(key, collapsed.add_edge(key.0, key.1, *edge.weight()));
                },
            }
        }

        collapsed
    }

    /// Weakly connected components as vertex-name groups, largest first
    /// (ties keep vertex order).
    pub fn connected_components(&self) -> Vec<Vec<String>> {
        let inner = self.graph.inner();
        let mut sets = UnionFind::<usize>::new(inner.node_count());
        for edge in inner.edge_references() {
            sets.union(edge.source().index(), edge.target().index());
        }

        let mut order: Vec<usize> = Vec::new();
        let mut groups: HashMap<usize, Vec<String>> = HashMap::new();
        for idx in inner.node_indices() {
            let root = sets.find(idx.index());
            groups
                .entry(root)
                .or_insert_with(|| {
                    order.push(root);
                    Vec::new()
                })
                .push(inner[idx].clone());
        }

        let mut components: Vec<Vec<String>> = order
            .into_iter()
            .filter_map(|root| groups.remove(&root))
            .collect();
        components.sort_by(|a, b| b.len().cmp(&a.len()));
        components
    }
}
