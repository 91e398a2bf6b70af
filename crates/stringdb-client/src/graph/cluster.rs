//! Community detection on extracted subnetworks
//!
//! All algorithms run on [`Subnetwork::collapse_undirected`], weighted by
//! score, and report the partition together with its weighted modularity
//! `Q = Σ_c [L_c / m - (D_c / 2m)^2]`.

use super::Subnetwork;
use crate::error::{ClientError, Result};
use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

const EPSILON: f64 = 1e-12;

/// Walk length used by walktrap distances
const WALK_LENGTH: u32 = 4;

/// Upper bound on Leiden move/refine/aggregate rounds
const MAX_LEIDEN_ROUNDS: usize = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterAlgorithm {
    /// Girvan-Newman divisive clustering
    #[default]
    EdgeBetweenness,
    /// Clauset-Newman-Moore greedy modularity
    #[serde(rename = "fastgreedy")]
    FastGreedy,
    /// Pons-Latapy random walks
    Walktrap,
    Leiden,
}

impl ClusterAlgorithm {
    pub const ALL: [ClusterAlgorithm; 4] = [
        ClusterAlgorithm::EdgeBetweenness,
        ClusterAlgorithm::FastGreedy,
        ClusterAlgorithm::Walktrap,
        ClusterAlgorithm::Leiden,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ClusterAlgorithm::EdgeBetweenness => "edge-betweenness",
            ClusterAlgorithm::FastGreedy => "fastgreedy",
            ClusterAlgorithm::Walktrap => "walktrap",
            ClusterAlgorithm::Leiden => "leiden",
        }
    }

    /// Parse `name`, falling back to edge-betweenness for unknown names
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(algorithm = name, "Unknown clustering algorithm, using edge-betweenness");
            ClusterAlgorithm::EdgeBetweenness
        })
    }
}

impl fmt::Display for ClusterAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClusterAlgorithm {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "edge-betweenness" | "edge_betweenness" | "betweenness" => Ok(ClusterAlgorithm::EdgeBetweenness),
            "fastgreedy" | "fast-greedy" | "fast_greedy" => Ok(ClusterAlgorithm::FastGreedy),
            "walktrap" => Ok(ClusterAlgorithm::Walktrap),
            "leiden" => Ok(ClusterAlgorithm::Leiden),
            _ => Err(ClientError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Community assignment for every vertex of a subnetwork
#[derive(Debug, Clone, Serialize)]
pub struct Partition {
    pub algorithm: ClusterAlgorithm,

    /// `(vertex, community)` in vertex order; communities are numbered by
    /// first appearance starting at 0
    pub membership: Vec<(String, usize)>,

    pub modularity: f64,
}

impl Partition {
    pub fn community_count(&self) -> usize {
        self.membership.iter().map(|(_, c)| c + 1).max().unwrap_or(0)
    }

    /// Vertex names grouped by community
    pub fn communities(&self) -> Vec<Vec<String>> {
        let mut groups = vec![Vec::new(); self.community_count()];
        for (vertex, community) in &self.membership {
            groups[*community].push(vertex.clone());
        }
        groups
    }

    pub fn community_of(&self, vertex: &str) -> Option<usize> {
        self.membership
            .iter()
            .find(|(v, _)| v == vertex)
            .map(|(_, c)| *c)
    }
}

/// Partition `subnetwork` into communities
pub fn cluster(subnetwork: &Subnetwork, algorithm: ClusterAlgorithm) -> Result<Partition> {
    let collapsed = subnetwork.collapse_undirected();
    if let Some(bad) = collapsed
        .edge_references()
        .find(|e| !e.weight().is_finite() || *e.weight() < 0.0)
    {
        return Err(ClientError::InvalidScore {
            source_id: collapsed[bad.source()].clone(),
            target_id: collapsed[bad.target()].clone(),
            score: *bad.weight(),
        });
    }
    let weighted = Weighted::from_graph(&collapsed);

    let labels = match algorithm {
        ClusterAlgorithm::EdgeBetweenness => girvan_newman(&weighted),
        ClusterAlgorithm::FastGreedy => fast_greedy(&weighted),
        ClusterAlgorithm::Walktrap => walktrap(&weighted),
        ClusterAlgorithm::Leiden => leiden(&weighted),
    };
    let labels = renumber(&labels);
    let modularity = weighted.modularity(&labels);

    let membership = collapsed
        .node_indices()
        .map(|idx| (collapsed[idx].clone(), labels[idx.index()]))
        .collect::<Vec<_>>();

    let partition = Partition {
        algorithm,
        membership,
        modularity,
    };
    debug!(
        %algorithm,
        communities = partition.community_count(),
        modularity,
        "Clustered subnetwork"
    );
    Ok(partition)
}

/// Undirected weighted graph in adjacency-list form
struct Weighted {
    n: usize,
    edges: Vec<(usize, usize, f64)>,
    adj: Vec<Vec<(usize, f64)>>,
    degree: Vec<f64>,
    /// Total edge weight `m`
    total: f64,
}

impl Weighted {
    fn from_graph(graph: &UnGraph<String, f64>) -> Self {
        let n = graph.node_count();
        let mut adj = vec![Vec::new(); n];
        let mut degree = vec![0.0; n];
        let mut edges = Vec::with_capacity(graph.edge_count());
        let mut total = 0.0;
        for e in graph.edge_references() {
            let (a, b, w) = (e.source().index(), e.target().index(), *e.weight());
            adj[a].push((b, w));
            adj[b].push((a, w));
            degree[a] += w;
            degree[b] += w;
            total += w;
            edges.push((a, b, w));
        }
        Self {
            n,
            edges,
            adj,
            degree,
            total,
        }
    }

    fn modularity(&self, labels: &[usize]) -> f64 {
        if self.total <= EPSILON {
            return 0.0;
        }
        let k = labels.iter().map(|&c| c + 1).max().unwrap_or(0);
        let mut internal = vec![0.0; k];
        let mut degree = vec![0.0; k];
        for (v, &d) in self.degree.iter().enumerate() {
            degree[labels[v]] += d;
        }
        for &(a, b, w) in &self.edges {
            if labels[a] == labels[b] {
                internal[labels[a]] += w;
            }
        }
        let two_m = 2.0 * self.total;
        internal
            .iter()
            .zip(&degree)
            .map(|(l, d)| l / self.total - (d / two_m).powi(2))
            .sum()
    }
}

/// Number communities by first appearance in vertex order
fn renumber(labels: &[usize]) -> Vec<usize> {
    let mut seen: HashMap<usize, usize> = HashMap::new();
    labels
        .iter()
        .map(|&c| {
            let next = seen.len();
            *seen.entry(c).or_insert(next)
        })
        .collect()
}

fn singletons(n: usize) -> Vec<usize> {
    (0..n).collect()
}

// Girvan-Newman

/// Remove the edge of highest (unweighted) betweenness until none remain,
/// keeping the component partition of highest weighted modularity.
fn girvan_newman(g: &Weighted) -> Vec<usize> {
    let mut active = vec![true; g.edges.len()];
    let mut incident: Vec<Vec<(usize, usize)>> = vec![Vec::new(); g.n];
    for (id, &(a, b, _)) in g.edges.iter().enumerate() {
        incident[a].push((b, id));
        incident[b].push((a, id));
    }

    let mut best = components(g.n, &g.edges, &active);
    let mut best_q = g.modularity(&best);
    let mut remaining = g.edges.len();

    while remaining > 0 {
        let scores = edge_betweenness(g.n, &incident, &active);
        let mut target = None;
        let mut top = f64::NEG_INFINITY;
        for (id, &score) in scores.iter().enumerate() {
            if active[id] && score > top + EPSILON {
                top = score;
                target = Some(id);
            }
        }
        let Some(id) = target else {
            break;
        };
        active[id] = false;
        remaining -= 1;

        let labels = components(g.n, &g.edges, &active);
        let q = g.modularity(&labels);
        if q > best_q + EPSILON {
            best_q = q;
            best = labels;
        }
    }

    best
}

fn components(n: usize, edges: &[(usize, usize, f64)], active: &[bool]) -> Vec<usize> {
    let mut sets = petgraph::unionfind::UnionFind::<usize>::new(n);
    for (id, &(a, b, _)) in edges.iter().enumerate() {
        if active[id] {
            sets.union(a, b);
        }
    }
    (0..n).map(|v| sets.find(v)).collect()
}

/// Brandes edge betweenness over unweighted shortest paths
fn edge_betweenness(n: usize, incident: &[Vec<(usize, usize)>], active: &[bool]) -> Vec<f64> {
    let mut scores = vec![0.0; active.len()];
    for source in 0..n {
        let mut order = Vec::with_capacity(n);
        let mut preds: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut dist = vec![usize::MAX; n];
        sigma[source] = 1.0;
        dist[source] = 0;

        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            for &(w, id) in &incident[v] {
                if !active[id] {
                    continue;
                }
                if dist[w] == usize::MAX {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push((v, id));
                }
            }
        }

        let mut delta = vec![0.0; n];
        while let Some(w) = order.pop() {
            for &(v, id) in &preds[w] {
                let share = sigma[v] / sigma[w] * (1.0 + delta[w]);
                scores[id] += share;
                delta[v] += share;
            }
        }
    }
    // Every pair was counted from both ends.
    scores.iter_mut().for_each(|s| *s /= 2.0);
    scores
}

// Clauset-Newman-Moore

/// Greedy agglomeration by largest modularity gain, recording the best cut
fn fast_greedy(g: &Weighted) -> Vec<usize> {
    if g.total <= EPSILON {
        return singletons(g.n);
    }
    let two_m = 2.0 * g.total;

    // e[i][j]: fraction of edge ends joining communities i and j
    let mut e: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); g.n];
    for &(a, b, w) in &g.edges {
        *e[a].entry(b).or_insert(0.0) += w / two_m;
        *e[b].entry(a).or_insert(0.0) += w / two_m;
    }
    let mut a: Vec<f64> = g.degree.iter().map(|d| d / two_m).collect();
    let mut alive = vec![true; g.n];

    let mut labels = singletons(g.n);
    let mut q: f64 = -a.iter().map(|x| x * x).sum::<f64>();
    let mut best = labels.clone();
    let mut best_q = q;

    loop {
        let mut pick: Option<(usize, usize, f64)> = None;
        for i in (0..g.n).filter(|&i| alive[i]) {
            for (&j, &eij) in e[i].range(i + 1..) {
                let gain = 2.0 * (eij - a[i] * a[j]);
                if pick.map_or(true, |(_, _, top)| gain > top + EPSILON) {
                    pick = Some((i, j, gain));
                }
            }
        }
        let Some((i, j, gain)) = pick else {
            break;
        };

        let row = std::mem::take(&mut e[j]);
        for (k, ejk) in row {
            e[k].remove(&j);
            if k == i {
                continue;
            }
            *e[i].entry(k).or_insert(0.0) += ejk;
            *e[k].entry(i).or_insert(0.0) += ejk;
        }
        e[i].remove(&j);
        a[i] += a[j];
        a[j] = 0.0;
        alive[j] = false;
        labels.iter_mut().filter(|c| **c == j).for_each(|c| *c = i);

        q += gain;
        if q > best_q + EPSILON {
            best_q = q;
            best = labels.clone();
        }
    }

    best
}

// Walktrap

/// Ward agglomeration on random-walk distances, keeping the best cut
fn walktrap(g: &Weighted) -> Vec<usize> {
    let n = g.n;
    if g.total <= EPSILON {
        return singletons(n);
    }

    // Row-stochastic transition matrix; isolated vertices stay in place.
    let mut step = vec![vec![0.0; n]; n];
    for v in 0..n {
        if g.degree[v] > 0.0 {
            for &(w, weight) in &g.adj[v] {
                step[v][w] += weight / g.degree[v];
            }
        } else {
            step[v][v] = 1.0;
        }
    }
    let mut walk = step.clone();
    for _ in 1..WALK_LENGTH {
        walk = multiply(&walk, &step);
    }

    struct Community {
        size: f64,
        probs: Vec<f64>,
        neighbors: BTreeSet<usize>,
    }

    let mut communities: Vec<Option<Community>> = (0..n)
        .map(|v| {
            Some(Community {
                size: 1.0,
                probs: walk[v].clone(),
                neighbors: g.adj[v].iter().map(|&(w, _)| w).filter(|&w| w != v).collect(),
            })
        })
        .collect();

    let sigma = |c1: &Community, c2: &Community| {
        let r2: f64 = (0..n)
            .filter(|&k| g.degree[k] > 0.0)
            .map(|k| (c1.probs[k] - c2.probs[k]).powi(2) / g.degree[k])
            .sum();
        (c1.size * c2.size) / (c1.size + c2.size) * r2 / n as f64
    };

    let mut deltas: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for &(a, b, _) in &g.edges {
        let key = (a.min(b), a.max(b));
        if let (Some(c1), Some(c2)) = (&communities[key.0], &communities[key.1]) {
            deltas.entry(key).or_insert_with(|| sigma(c1, c2));
        }
    }

    let mut labels = singletons(n);
    let mut best = labels.clone();
    let mut best_q = g.modularity(&labels);

    loop {
        let mut pick: Option<((usize, usize), f64)> = None;
        for (&key, &delta) in &deltas {
            if pick.map_or(true, |(_, low)| delta < low - EPSILON) {
                pick = Some((key, delta));
            }
        }
        let Some(((i, j), _)) = pick else {
            break;
        };

        let (Some(mut keep), Some(gone)) = (communities[i].take(), communities[j].take()) else {
            break;
        };
        let size = keep.size + gone.size;
        for (p, q) in keep.probs.iter_mut().zip(&gone.probs) {
            *p = (keep.size * *p + gone.size * q) / size;
        }
        keep.size = size;
        keep.neighbors.extend(gone.neighbors);
        keep.neighbors.remove(&i);
        keep.neighbors.remove(&j);

        deltas.retain(|&(x, y), _| x != i && y != i && x != j && y != j);
        for &k in &keep.neighbors {
            if let Some(other) = communities[k].as_mut() {
                other.neighbors.remove(&j);
                other.neighbors.insert(i);
            }
        }
        for &k in &keep.neighbors {
            if let Some(other) = &communities[k] {
                deltas.insert((i.min(k), i.max(k)), sigma(&keep, other));
            }
        }
        communities[i] = Some(keep);

        labels.iter_mut().filter(|c| **c == j).for_each(|c| *c = i);
        let q = g.modularity(&labels);
        if q > best_q + EPSILON {
            best_q = q;
            best = labels.clone();
        }
    }

    best
}

fn multiply(a: &[Vec<f64>], b: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = a.len();
    let mut out = vec![vec![0.0; n]; n];
    for i in 0..n {
        for k in 0..n {
            let aik = a[i][k];
            if aik == 0.0 {
                continue;
            }
            for j in 0..n {
                out[i][j] += aik * b[k][j];
            }
        }
    }
    out
}

// Leiden

/// One level of the Leiden hierarchy
struct Level {
    n: usize,
    /// Neighbors with summed weights; self loops excluded
    adj: Vec<Vec<(usize, f64)>>,
    /// Degree in the original graph of everything folded into the node
    node_weight: Vec<f64>,
}

impl Level {
    fn from_weighted(g: &Weighted) -> Self {
        let mut adj = vec![Vec::new(); g.n];
        for (v, neighbors) in g.adj.iter().enumerate() {
            let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
            for &(w, weight) in neighbors {
                if w != v {
                    *merged.entry(w).or_insert(0.0) += weight;
                }
            }
            adj[v] = merged.into_iter().collect();
        }
        Self {
            n: g.n,
            adj,
            node_weight: g.degree.clone(),
        }
    }

    /// Collapse every group of `groups` into a single node
    fn aggregate(&self, groups: &[usize], count: usize) -> Self {
        let mut merged: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];
        let mut node_weight = vec![0.0; count];
        for v in 0..self.n {
            node_weight[groups[v]] += self.node_weight[v];
            for &(w, weight) in &self.adj[v] {
                let (gv, gw) = (groups[v], groups[w]);
                if gv != gw {
                    *merged[gv].entry(gw).or_insert(0.0) += weight;
                }
            }
        }
        Self {
            n: count,
            adj: merged.into_iter().map(|m| m.into_iter().collect()).collect(),
            node_weight,
        }
    }
}

fn leiden(g: &Weighted) -> Vec<usize> {
    if g.total <= EPSILON {
        return singletons(g.n);
    }
    let two_m = 2.0 * g.total;

    let mut level = Level::from_weighted(g);
    // Node of the current level holding each original vertex
    let mut node_of = singletons(g.n);
    let mut partition = singletons(level.n);

    for round in 0..MAX_LEIDEN_ROUNDS {
        local_moving(&level, &mut partition, two_m);
        let (partition_ids, count) = compact(&partition);
        if count == level.n {
            partition = partition_ids;
            debug!(round, "Leiden converged");
            break;
        }

        let refined = refine(&level, &partition_ids, two_m);
        let (refined, refined_count) = compact(&refined);
        let (groups, group_count) = if refined_count < level.n {
            (refined, refined_count)
        } else {
            (partition_ids.clone(), count)
        };

        // Aggregated nodes start in the community their members moved to.
        let mut next_partition = vec![0; group_count];
        for v in 0..level.n {
            next_partition[groups[v]] = partition_ids[v];
        }

        level = level.aggregate(&groups, group_count);
        for node in node_of.iter_mut() {
            *node = groups[*node];
        }
        partition = next_partition;
    }

    node_of.iter().map(|&node| partition[node]).collect()
}

/// Queue-based local moving of nodes between communities
fn local_moving(level: &Level, partition: &mut [usize], two_m: f64) {
    let n = level.n;
    let mut community_weight = vec![0.0; n];
    let mut members = vec![0usize; n];
    for v in 0..n {
        community_weight[partition[v]] += level.node_weight[v];
        members[partition[v]] += 1;
    }
    let mut empty: Vec<usize> = (0..n).rev().filter(|&c| members[c] == 0).collect();

    let mut queue: VecDeque<usize> = (0..n).collect();
    let mut queued = vec![true; n];

    while let Some(v) = queue.pop_front() {
        queued[v] = false;
        let own = partition[v];
        let k = level.node_weight[v];

        let mut links: BTreeMap<usize, f64> = BTreeMap::new();
        for &(w, weight) in &level.adj[v] {
            *links.entry(partition[w]).or_insert(0.0) += weight;
        }

        community_weight[own] -= k;
        members[own] -= 1;

        let gain = |c: usize, weight: f64| weight - k * community_weight[c] / two_m;
        let mut best = own;
        let mut best_gain = gain(own, links.get(&own).copied().unwrap_or(0.0));
        for (&c, &weight) in &links {
            let candidate = gain(c, weight);
            if candidate > best_gain + EPSILON {
                best = c;
                best_gain = candidate;
            }
        }
        if best_gain < -EPSILON && members[own] > 0 {
            if let Some(c) = empty.pop() {
                best = c;
            }
        }

        community_weight[best] += k;
        members[best] += 1;
        if members[own] == 0 && best != own {
            empty.push(own);
        }
        if best != own {
            partition[v] = best;
            for &(w, _) in &level.adj[v] {
                if partition[w] != best && !queued[w] {
                    queued[w] = true;
                    queue.push_back(w);
                }
            }
        }
    }
}

/// Split each community into well-connected sub-communities, merging
/// singletons greedily into the best well-connected neighbor.
fn refine(level: &Level, partition: &[usize], two_m: f64) -> Vec<usize> {
    let n = level.n;
    let mut refined = singletons(n);
    let mut total = vec![0.0; n];
    for v in 0..n {
        total[partition[v]] += level.node_weight[v];
    }

    let mut weight: Vec<f64> = level.node_weight.clone();
    let mut size = vec![1usize; n];
    // Weight from each refined community to the rest of its community
    let mut external: Vec<f64> = (0..n)
        .map(|v| {
            level.adj[v]
                .iter()
                .filter(|&&(w, _)| partition[w] == partition[v])
                .map(|&(_, weight)| weight)
                .sum()
        })
        .collect();

    let well_connected =
        |ext: f64, w: f64, whole: f64| ext + EPSILON >= w * (whole - w) / two_m;

    for v in 0..n {
        if size[refined[v]] != 1 {
            continue;
        }
        let whole = total[partition[v]];
        let k = level.node_weight[v];
        if !well_connected(external[v], k, whole) {
            continue;
        }

        let mut links: BTreeMap<usize, f64> = BTreeMap::new();
        for &(w, edge) in &level.adj[v] {
            if partition[w] == partition[v] {
                *links.entry(refined[w]).or_insert(0.0) += edge;
            }
        }

        let mut pick: Option<(usize, f64, f64)> = None;
        for (&c, &link) in &links {
            if c == refined[v] || !well_connected(external[c], weight[c], whole) {
                continue;
            }
            let gain = link - k * weight[c] / two_m;
            if gain >= -EPSILON && pick.map_or(true, |(_, top, _)| gain > top + EPSILON) {
                pick = Some((c, gain, link));
            }
        }

        if let Some((c, _, link)) = pick {
            let own = refined[v];
            external[c] = external[c] + external[own] - 2.0 * link;
            weight[c] += k;
            size[c] += 1;
            size[own] = 0;
            refined[v] = c;
        }
    }

    refined
}

/// Relabel to `0..count` by first appearance
fn compact(labels: &[usize]) -> (Vec<usize>, usize) {
    let relabeled = renumber(labels);
    let count = relabeled.iter().map(|&c| c + 1).max().unwrap_or(0);
    (relabeled, count)
}
