//! node2vec transition tables.
//!
//! For every node the unbiased distribution over its neighbors, and for every directed edge
//! `prev -> cur` the second-order distribution over `cur`'s neighbors:
//!
//! - `w(cur, x) / p` when `x == prev` (return)
//! - `w(cur, x)` when `x` is also adjacent to `prev` (triangle)
//! - `w(cur, x) / q` otherwise (move outward)
//!
//! Tables are built once per graph and only read afterwards.

use crate::alias::AliasTable;
use crate::graph::WeightedGraphRef;
use crate::{Error, Result};
use tracing::debug;

/// Precomputed alias tables for second-order walks.
#[derive(Debug, Clone)]
pub struct TransitionTables {
    neighbors: Vec<Vec<usize>>,
    alias_nodes: Vec<Option<AliasTable>>,
    /// `alias_edges[cur][j]` is the table for arriving at `cur` from `neighbors[cur][j]`.
    alias_edges: Vec<Vec<AliasTable>>,
    p: f64,
    q: f64,
}

impl TransitionTables {
    pub fn new<G: WeightedGraphRef + Sync>(graph: &G, p: f64, q: f64) -> Result<Self> {
        check_bias("p", p)?;
        check_bias("q", q)?;

        let n = graph.node_count();

        #[cfg(feature = "parallel")]
        let per_node: Vec<NodeTables> = {
            use rayon::prelude::*;
            (0..n)
                .into_par_iter()
                .map(|cur| node_tables(graph, cur, p, q))
                .collect::<Result<_>>()?
        };
        #[cfg(not(feature = "parallel"))]
        let per_node: Vec<NodeTables> = (0..n)
            .map(|cur| node_tables(graph, cur, p, q))
            .collect::<Result<_>>()?;

        let mut neighbors = Vec::with_capacity(n);
        let mut alias_nodes = Vec::with_capacity(n);
        let mut alias_edges = Vec::with_capacity(n);
        for t in per_node {
            neighbors.push(t.neighbors);
            alias_nodes.push(t.node);
            alias_edges.push(t.edges);
        }

        let tables = Self { neighbors, alias_nodes, alias_edges, p, q };
        debug!(
            nodes = tables.node_table_count(),
            edges = tables.edge_table_count(),
            p,
            q,
            "preprocessed transition tables"
        );
        Ok(tables)
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    /// Sorted neighbors the tables for `node` index into.
    pub fn neighbors(&self, node: usize) -> &[usize] {
        self.neighbors.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First-step table for `node`; `None` for isolated or unknown nodes.
    pub fn node_table(&self, node: usize) -> Option<&AliasTable> {
        self.alias_nodes.get(node).and_then(Option::as_ref)
    }

    /// Table for a step out of `cur` having arrived from `prev`.
    pub fn edge_table(&self, prev: usize, cur: usize) -> Option<&AliasTable> {
        let j = self.neighbors.get(cur)?.binary_search(&prev).ok()?;
        self.alias_edges[cur].get(j)
    }

    pub fn node_distribution(&self, node: usize) -> Option<Vec<f64>> {
        self.node_table(node).map(AliasTable::distribution)
    }

    pub fn edge_distribution(&self, prev: usize, cur: usize) -> Option<Vec<f64>> {
        self.edge_table(prev, cur).map(AliasTable::distribution)
    }

    pub fn node_table_count(&self) -> usize {
        self.alias_nodes.iter().filter(|t| t.is_some()).count()
    }

    /// Number of directed edges with a table (both directions of every undirected edge).
    pub fn edge_table_count(&self) -> usize {
        self.alias_edges.iter().map(Vec::len).sum()
    }
}

struct NodeTables {
    neighbors: Vec<usize>,
    node: Option<AliasTable>,
    edges: Vec<AliasTable>,
}

fn node_tables<G: WeightedGraphRef>(graph: &G, cur: usize, p: f64, q: f64) -> Result<NodeTables> {
    let (nbrs, wts) = graph.neighbors_and_weights_ref(cur);
    debug_assert_eq!(nbrs.len(), wts.len());
    if nbrs.is_empty() {
        return Ok(NodeTables { neighbors: Vec::new(), node: None, edges: Vec::new() });
    }

    let node = AliasTable::from_weights(wts)?;

    let mut common = vec![false; nbrs.len()];
    let mut buf = vec![0.0f64; nbrs.len()];
    let mut edges = Vec::with_capacity(nbrs.len());
    for &prev in nbrs {
        mark_common(nbrs, graph.neighbors_and_weights_ref(prev).0, &mut common);
        for (i, &x) in nbrs.iter().enumerate() {
            buf[i] = if x == prev {
                wts[i] / p
            } else if common[i] {
                wts[i]
            } else {
                wts[i] / q
            };
        }
        edges.push(AliasTable::from_weights(&buf)?);
    }

    Ok(NodeTables { neighbors: nbrs.to_vec(), node: Some(node), edges })
}

/// `out[i]` is set when `cur[i]` also appears in `prev`. Both slices are sorted.
fn mark_common(cur: &[usize], prev: &[usize], out: &mut [bool]) {
    debug_assert_eq!(cur.len(), out.len());
    let mut j = 0usize;
    for (i, &x) in cur.iter().enumerate() {
        while j < prev.len() && prev[j] < x {
            j += 1;
        }
        out[i] = j < prev.len() && prev[j] == x;
    }
}

fn check_bias(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}
