//! `walklets`: multi-scale node embeddings from skipped random walks.
//!
//! Pipeline:
//! 1. [`AdjacencyGraph`] holds an undirected unit-weight graph over ids `0..n`.
//! 2. [`TransitionTables`] precomputes node2vec alias tables (second-order walks only).
//! 3. [`FirstOrderWalker`] / [`SecondOrderWalker`] produce a corpus of truncated walks.
//! 4. [`walk_skips`] splits each walk per scale; an external [`EmbeddingTrainer`] fits each
//!    scale and [`Walklets`] concatenates the per-scale vectors into an [`EmbeddingTable`].
//!
//! Public invariants (must not drift):
//! - **Node order**: embedding rows are indexed by node id \(0..n-1\). Ids are expected to be
//!   contiguous; ingestion is responsible for that.
//! - **Determinism**: given the same graph, config, and RNG state, walks are identical. The
//!   parallel variants are additionally independent of thread count.
//! - **Two-draw alias sampling**: bucket choice and threshold test use separate uniforms.

pub mod alias;
pub mod embedding;
pub mod graph;
pub mod node2vec;
pub mod random_walk;
pub mod skip;
pub mod trainer;
pub mod transition;
pub mod walklets;

pub use alias::AliasTable;
pub use embedding::EmbeddingTable;
pub use graph::{AdjacencyGraph, GraphRef, WeightedGraphRef, DEFAULT_EDGE_WEIGHT};
pub use node2vec::{generate_biased_walks, SecondOrderWalker};
pub use random_walk::{generate_walks, Corpus, FirstOrderWalker, Walk, WalkConfig, WalkGenerator};
pub use skip::{corpus_at_scale, walk_skips};
pub use trainer::{EmbeddingTrainer, TokenVectors, TrainerError, TrainerParams};
pub use transition::TransitionTables;
pub use walklets::{CancelToken, WalkType, WalkletConfig, Walklets};

#[cfg(feature = "parallel")]
pub use node2vec::generate_biased_walks_parallel;
#[cfg(feature = "parallel")]
pub use random_walk::generate_walks_parallel;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown node: {0}")]
    UnknownNode(usize),
    #[error("empty distribution")]
    EmptyDistribution,
    #[error("malformed probabilities: {0}")]
    MalformedProbabilities(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("no transition table for step out of {cur} (previous: {prev:?})")]
    MissingTransition { prev: Option<usize>, cur: usize },
    #[error("embedding trainer failed at scale {scale}")]
    TrainerFailure {
        scale: usize,
        #[source]
        source: TrainerError,
    },
    #[error("trainer returned no vector for node {node} at scale {scale}")]
    MissingEmbedding { node: usize, scale: usize },
    #[error("vector for node {node} at scale {scale} has {got} dimensions, expected {expected}")]
    DimensionMismatch { node: usize, scale: usize, expected: usize, got: usize },
    #[error("cancelled before scale {scale}")]
    Cancelled { scale: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
