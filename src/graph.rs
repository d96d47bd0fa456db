//! Graph model and adapter traits.
//!
//! Walkers and the transition preprocessor only need borrowed, sorted neighbor slices, so
//! they are written against [`GraphRef`] / [`WeightedGraphRef`]. [`AdjacencyGraph`] is the
//! concrete CSR-style graph produced from an edge list.

use crate::{Error, Result};
use tracing::warn;

/// Weight assigned to every edge at construction, and reported for pairs with no stored weight.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// A graph view that can return **borrowed** neighbor slices.
///
/// Requirements:
/// - neighbor slices are sorted ascending by node id
/// - ids outside `0..node_count()` yield an empty slice
pub trait GraphRef {
    fn node_count(&self) -> usize;
    fn neighbors_ref(&self, node: usize) -> &[usize];

    fn out_degree(&self, node: usize) -> usize {
        self.neighbors_ref(node).len()
    }

    fn has_edge(&self, source: usize, target: usize) -> bool {
        self.neighbors_ref(source).binary_search(&target).is_ok()
    }
}

/// A weighted graph view that can return **borrowed** neighbor + weight slices.
///
/// A node has a contiguous neighbor list and a contiguous weight list, with matching indices.
pub trait WeightedGraphRef: GraphRef {
    /// Return `(neighbors, weights)` for a node.
    ///
    /// Requirements:
    /// - `neighbors.len() == weights.len()`
    /// - weights are non-negative
    fn neighbors_and_weights_ref(&self, node: usize) -> (&[usize], &[f64]);

    fn edge_weight(&self, source: usize, target: usize) -> f64 {
        let (nbrs, wts) = self.neighbors_and_weights_ref(source);
        match nbrs.binary_search(&target) {
            Ok(i) => wts[i],
            Err(_) => DEFAULT_EDGE_WEIGHT,
        }
    }
}

/// Undirected graph in compressed sparse row layout.
///
/// Node ids are expected to form the contiguous range `0..n`: embeddings are emitted in this
/// order, so an id that never appears in the edge list still gets a row (as an isolated node).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdjacencyGraph {
    offsets: Vec<usize>,
    targets: Vec<usize>,
    weights: Vec<f64>,
}

impl AdjacencyGraph {
    /// Build from undirected `(a, b)` pairs; the node count is `max id + 1`.
    ///
    /// Storage is proportional to the largest id, not to the number of distinct ids, so a
    /// sparse id space should be relabelled first. Ids of `usize::MAX - 1` and above are
    /// rejected.
    pub fn from_edges<I>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let edges: Vec<(usize, usize)> = edges.into_iter().collect();
        let max_id = edges.iter().map(|&(a, b)| a.max(b)).max();
        let node_count = match max_id {
            None => 0,
            Some(id) => id.checked_add(1).ok_or_else(|| id_too_large(id))?,
        };
        check_node_count(node_count)?;

        let mut seen = vec![false; node_count];
        for &(a, b) in &edges {
            seen[a] = true;
            seen[b] = true;
        }
        let gaps = seen.iter().filter(|&&s| !s).count();
        if gaps > 0 {
            warn!(
                gaps,
                node_count, "node ids are not contiguous; missing ids become isolated nodes"
            );
        }

        Ok(Self::build(node_count, &edges))
    }

    /// Build with an explicit node count, so trailing isolated nodes can exist.
    pub fn with_node_count<I>(node_count: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        check_node_count(node_count)?;
        let edges: Vec<(usize, usize)> = edges.into_iter().collect();
        if let Some(&(a, b)) = edges.iter().find(|&&(a, b)| a >= node_count || b >= node_count) {
            return Err(Error::UnknownNode(if a >= node_count { a } else { b }));
        }
        Ok(Self::build(node_count, &edges))
    }

    fn build(node_count: usize, edges: &[(usize, usize)]) -> Self {
        let mut arcs: Vec<(usize, usize)> = Vec::with_capacity(edges.len() * 2);
        for &(a, b) in edges {
            arcs.push((a, b));
            if a != b {
                arcs.push((b, a));
            }
        }
        arcs.sort_unstable();
        arcs.dedup();

        let mut offsets = vec![0usize; node_count + 1];
        for &(a, _) in &arcs {
            offsets[a + 1] += 1;
        }
        for i in 0..node_count {
            offsets[i + 1] += offsets[i];
        }

        let targets = arcs.iter().map(|&(_, b)| b).collect();
        let weights = vec![DEFAULT_EDGE_WEIGHT; arcs.len()];
        Self { offsets, targets, weights }
    }

    /// Sorted neighbors of `node`.
    pub fn neighbors(&self, node: usize) -> Result<&[usize]> {
        if node >= self.node_count() {
            return Err(Error::UnknownNode(node));
        }
        Ok(&self.targets[self.offsets[node]..self.offsets[node + 1]])
    }

    /// Number of undirected edges (self-loops count once).
    pub fn edge_count(&self) -> usize {
        let loops = (0..self.node_count()).filter(|&v| GraphRef::has_edge(self, v, v)).count();
        (self.targets.len() - loops) / 2 + loops
    }
}

/// The CSR offsets need `node_count + 1` slots.
fn check_node_count(node_count: usize) -> Result<()> {
    if node_count == usize::MAX {
        return Err(id_too_large(node_count - 1));
    }
    Ok(())
}

fn id_too_large(id: usize) -> Error {
    Error::InvalidParameter(format!("node id {id} is too large to index"))
}

impl GraphRef for AdjacencyGraph {
    fn node_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    fn neighbors_ref(&self, node: usize) -> &[usize] {
        self.neighbors(node).unwrap_or(&[])
    }
}

impl WeightedGraphRef for AdjacencyGraph {
    fn neighbors_and_weights_ref(&self, node: usize) -> (&[usize], &[f64]) {
        if node >= self.node_count() {
            return (&[], &[]);
        }
        let range = self.offsets[node]..self.offsets[node + 1];
        (&self.targets[range.clone()], &self.weights[range])
    }
}

#[cfg(feature = "petgraph")]
impl<N, E, Ix> From<&petgraph::graph::UnGraph<N, E, Ix>> for AdjacencyGraph
where
    Ix: petgraph::graph::IndexType,
{
    fn from(graph: &petgraph::graph::UnGraph<N, E, Ix>) -> Self {
        let edges: Vec<(usize, usize)> = graph
            .edge_indices()
            .filter_map(|e| graph.edge_endpoints(e))
            .map(|(a, b)| (a.index(), b.index()))
            .collect();
        Self::build(graph.node_count(), &edges)
    }
}
