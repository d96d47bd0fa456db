//! Second-order (node2vec) walk generation over precomputed [`TransitionTables`].
//!
//! The first step out of a start node draws from the node table; every later step draws from
//! the table keyed by `(previous, current)`.

use crate::graph::GraphRef;
use crate::random_walk::{Corpus, Walk, WalkConfig, WalkGenerator};
use crate::transition::TransitionTables;
use crate::{Error, Result};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Biased walker; borrows the graph and the tables built from it.
#[derive(Debug, Clone, Copy)]
pub struct SecondOrderWalker<'a, G> {
    graph: &'a G,
    tables: &'a TransitionTables,
}

impl<'a, G: GraphRef> SecondOrderWalker<'a, G> {
    pub fn new(graph: &'a G, tables: &'a TransitionTables) -> Result<Self> {
        if graph.node_count() != tables.node_count() {
            return Err(Error::InvalidParameter(format!(
                "transition tables cover {} nodes but the graph has {}",
                tables.node_count(),
                graph.node_count()
            )));
        }
        Ok(Self { graph, tables })
    }

    pub fn walk<R: Rng + ?Sized>(&self, start: usize, length: usize, rng: &mut R) -> Result<Walk> {
        biased_walk(self.graph, self.tables, start, length, rng)
    }
}

impl<G: GraphRef> WalkGenerator for SecondOrderWalker<'_, G> {
    fn generate_all<R: Rng + ?Sized>(&self, config: WalkConfig, rng: &mut R) -> Result<Corpus> {
        let mut start_nodes: Vec<usize> = (0..self.graph.node_count()).collect();
        let mut walks = Vec::with_capacity(start_nodes.len() * config.walk_number);
        for round in 0..config.walk_number {
            debug!(round = round + 1, rounds = config.walk_number, "biased random walk round");
            start_nodes.shuffle(rng);
            for &node in &start_nodes {
                walks.push(biased_walk(self.graph, self.tables, node, config.walk_length, rng)?);
            }
        }
        Ok(walks)
    }
}

/// Second-order walks from every node, seeded from `config.seed`.
pub fn generate_biased_walks<G: GraphRef>(
    graph: &G,
    tables: &TransitionTables,
    config: WalkConfig,
) -> Result<Corpus> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    SecondOrderWalker::new(graph, tables)?.generate_all(config, &mut rng)
}

/// Deterministic parallel second-order walks.
///
/// Invariant: output is stable for a fixed `seed`, independent of Rayon thread count.
#[cfg(feature = "parallel")]
pub fn generate_biased_walks_parallel<G: GraphRef + Sync>(
    graph: &G,
    tables: &TransitionTables,
    config: WalkConfig,
) -> Result<Corpus> {
    use crate::random_walk::{job_seed, mix64};
    use rayon::prelude::*;

    let walker = SecondOrderWalker::new(graph, tables)?;

    // Shuffle per round using a seed that depends only on (seed, round).
    let mut round_nodes: Vec<usize> = (0..graph.node_count()).collect();
    let mut jobs: Vec<(u32, usize)> = Vec::with_capacity(round_nodes.len() * config.walk_number);
    for round in 0..config.walk_number as u32 {
        let mut rng = ChaCha8Rng::seed_from_u64(mix64(config.seed ^ round as u64));
        round_nodes.shuffle(&mut rng);
        jobs.extend(round_nodes.iter().map(|&node| (round, node)));
    }

    jobs.par_iter()
        .enumerate()
        .map(|(i, &(round, node))| {
            let mut rng = ChaCha8Rng::seed_from_u64(job_seed(config.seed, round, node, i));
            walker.walk(node, config.walk_length, &mut rng)
        })
        .collect()
}

fn biased_walk<G: GraphRef, R: Rng + ?Sized>(
    graph: &G,
    tables: &TransitionTables,
    start: usize,
    length: usize,
    rng: &mut R,
) -> Result<Walk> {
    let mut walk = Vec::with_capacity(length.max(1));
    walk.push(start);
    let mut curr = start;
    let mut prev: Option<usize> = None;

    for _ in 1..length {
        let nbrs = graph.neighbors_ref(curr);
        if nbrs.is_empty() {
            break;
        }

        let table = match prev {
            Some(p) => tables.edge_table(p, curr),
            None => tables.node_table(curr),
        }
        .ok_or(Error::MissingTransition { prev, cur: curr })?;
        debug_assert_eq!(table.len(), nbrs.len());

        let next = nbrs[table.draw(rng)];
        walk.push(next);
        prev = Some(curr);
        curr = next;
    }

    Ok(walk)
}
