//! Random walk generation: shared config, the walker trait, and first-order (uniform) walks.

use crate::graph::GraphRef;
use crate::Result;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// A walk as a sequence of node ids.
pub type Walk = Vec<usize>;

/// Walks in generation order, one per (round, start node).
pub type Corpus = Vec<Walk>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkConfig {
    /// Maximum walk length (in nodes).
    pub walk_length: usize,
    /// Number of rounds; every node starts one walk per round.
    pub walk_number: usize,
    /// Seed for the `ChaCha8Rng` used by the seeded entry points.
    pub seed: u64,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self { walk_length: 80, walk_number: 5, seed: 42 }
    }
}

/// Something that can produce a full corpus of truncated walks.
pub trait WalkGenerator {
    fn generate_all<R: Rng + ?Sized>(&self, config: WalkConfig, rng: &mut R) -> Result<Corpus>;
}

/// Uniform random walks: each step picks a neighbor of the current node uniformly.
#[derive(Debug, Clone, Copy)]
pub struct FirstOrderWalker<'g, G> {
    graph: &'g G,
}

impl<'g, G: GraphRef> FirstOrderWalker<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self { graph }
    }

    pub fn walk<R: Rng + ?Sized>(&self, start: usize, length: usize, rng: &mut R) -> Walk {
        unbiased_walk(self.graph, start, length, rng)
    }
}

impl<G: GraphRef> WalkGenerator for FirstOrderWalker<'_, G> {
    fn generate_all<R: Rng + ?Sized>(&self, config: WalkConfig, rng: &mut R) -> Result<Corpus> {
        let n = self.graph.node_count();
        let mut walks = Vec::with_capacity(n * config.walk_number);
        for round in 0..config.walk_number {
            debug!(round = round + 1, rounds = config.walk_number, "random walk round");
            for node in 0..n {
                walks.push(unbiased_walk(self.graph, node, config.walk_length, rng));
            }
        }
        Ok(walks)
    }
}

/// First-order walks from every node, seeded from `config.seed`.
pub fn generate_walks<G: GraphRef>(graph: &G, config: WalkConfig) -> Result<Corpus> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    FirstOrderWalker::new(graph).generate_all(config, &mut rng)
}

/// Deterministic parallel first-order walks.
///
/// Invariant: output is stable for a fixed `seed`, independent of Rayon thread count.
#[cfg(feature = "parallel")]
pub fn generate_walks_parallel<G: GraphRef + Sync>(graph: &G, config: WalkConfig) -> Corpus {
    use rayon::prelude::*;

    let jobs: Vec<(u32, usize)> = (0..config.walk_number as u32)
        .flat_map(|round| (0..graph.node_count()).map(move |node| (round, node)))
        .collect();

    jobs.par_iter()
        .enumerate()
        .map(|(i, &(round, node))| {
            let mut rng = ChaCha8Rng::seed_from_u64(job_seed(config.seed, round, node, i));
            unbiased_walk(graph, node, config.walk_length, &mut rng)
        })
        .collect()
}

fn unbiased_walk<G: GraphRef, R: Rng + ?Sized>(
    graph: &G,
    start: usize,
    length: usize,
    rng: &mut R,
) -> Walk {
    let mut walk = Vec::with_capacity(length.max(1));
    walk.push(start);
    let mut curr = start;
    for _ in 1..length {
        let Some(&next) = graph.neighbors_ref(curr).choose(rng) else {
            break;
        };
        walk.push(next);
        curr = next;
    }
    walk
}

#[cfg(feature = "parallel")]
pub(crate) fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    x
}

/// Per-walk seed. Each component is mixed in separately so no two can cancel under xor.
#[cfg(feature = "parallel")]
pub(crate) fn job_seed(seed: u64, round: u32, node: usize, job: usize) -> u64 {
    mix64(mix64(mix64(seed ^ round as u64) ^ node as u64) ^ job as u64)
}
