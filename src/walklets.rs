//! Multi-scale orchestration.
//!
//! Walks are generated once. For every scale `k` in `1..=window_size` the walks are split by
//! [`corpus_at_scale`], handed to the trainer with window 1, and the returned vectors are laid
//! out by node id and appended to the [`EmbeddingTable`].

use crate::embedding::EmbeddingTable;
use crate::graph::{GraphRef, WeightedGraphRef};
#[cfg(feature = "parallel")]
use crate::node2vec::generate_biased_walks_parallel;
#[cfg(not(feature = "parallel"))]
use crate::node2vec::SecondOrderWalker;
#[cfg(feature = "parallel")]
use crate::random_walk::generate_walks_parallel;
use crate::random_walk::{Corpus, Walk, WalkConfig};
#[cfg(not(feature = "parallel"))]
use crate::random_walk::{FirstOrderWalker, WalkGenerator};
use crate::skip::corpus_at_scale;
use crate::trainer::{EmbeddingTrainer, TokenVectors, TrainerParams};
use crate::transition::TransitionTables;
use crate::{Error, Result};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Random walk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WalkType {
    /// Uniform neighbor choice.
    First,
    /// node2vec walks biased by `p` and `q`.
    #[default]
    Second,
}

impl FromStr for WalkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "second" => Ok(Self::Second),
            other => Err(Error::InvalidParameter(format!(
                "unknown walk type {other:?} (expected \"first\" or \"second\")"
            ))),
        }
    }
}

impl fmt::Display for WalkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::First => "first",
            Self::Second => "second",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WalkletConfig {
    pub walk_type: WalkType,
    /// Maximum walk length (in nodes).
    pub walk_length: usize,
    /// Walks started from every node.
    pub walk_number: usize,
    /// Number of scales; scale `k` relates nodes `k` steps apart.
    pub window_size: usize,
    /// Dimensions per scale.
    pub dimensions: usize,
    pub min_count: usize,
    /// Passed through to the trainer; walk generation does not read it.
    pub workers: usize,
    /// Return parameter (second-order only).
    pub p: f64,
    /// In-out parameter (second-order only).
    pub q: f64,
    pub seed: u64,
}

impl Default for WalkletConfig {
    fn default() -> Self {
        Self {
            walk_type: WalkType::Second,
            walk_length: 80,
            walk_number: 5,
            window_size: 5,
            dimensions: 16,
            min_count: 1,
            workers: 4,
            p: 1.0,
            q: 1.0,
            seed: 42,
        }
    }
}

impl WalkletConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("walk_length", self.walk_length),
            ("walk_number", self.walk_number),
            ("window_size", self.window_size),
            ("dimensions", self.dimensions),
            ("workers", self.workers),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(Error::InvalidParameter(format!("{name} must be positive")));
        }
        if self.walk_type == WalkType::Second {
            for (name, v) in [("p", self.p), ("q", self.q)] {
                if !(v.is_finite() && v > 0.0) {
                    return Err(Error::InvalidParameter(format!(
                        "{name} must be positive and finite, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn walk_config(&self) -> WalkConfig {
        WalkConfig { walk_length: self.walk_length, walk_number: self.walk_number, seed: self.seed }
    }

    pub fn trainer_params(&self) -> TrainerParams {
        TrainerParams {
            dimensions: self.dimensions,
            window: 1,
            min_count: self.min_count,
            workers: self.workers,
        }
    }
}

/// Shared flag checked before each scale is trained.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Walklet embedding pipeline.
#[derive(Debug, Clone)]
pub struct Walklets {
    config: WalkletConfig,
}

impl Walklets {
    pub fn new(config: WalkletConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WalkletConfig {
        &self.config
    }

    /// Generate the corpus with the configured walker.
    ///
    /// With the `parallel` feature the walks are spread over the Rayon pool and `rng` only
    /// supplies one seed for the per-walk streams; otherwise `rng` drives every step.
    pub fn generate_walks<G, R>(&self, graph: &G, rng: &mut R) -> Result<Corpus>
    where
        G: WeightedGraphRef + Sync,
        R: Rng + ?Sized,
    {
        let walk_config = self.config.walk_config();
        let walks = match self.config.walk_type {
            WalkType::First => first_order_walks(graph, walk_config, rng)?,
            WalkType::Second => {
                let tables = TransitionTables::new(graph, self.config.p, self.config.q)?;
                second_order_walks(graph, &tables, walk_config, rng)?
            }
        };
        info!(
            walks = walks.len(),
            walk_type = %self.config.walk_type,
            "random walks generated"
        );
        Ok(walks)
    }

    /// Train every scale on `walks` and concatenate the results for nodes `0..node_count`.
    pub fn embed<T: EmbeddingTrainer>(
        &self,
        node_count: usize,
        walks: &[Walk],
        trainer: &mut T,
        cancel: &CancelToken,
    ) -> Result<EmbeddingTable> {
        let params = self.config.trainer_params();
        let mut table = EmbeddingTable::new(node_count, params.dimensions);

        for scale in 1..=self.config.window_size {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled { scale });
            }
            info!(scale, scales = self.config.window_size, "optimization round");

            let documents = corpus_at_scale(walks, scale);
            debug!(scale, documents = documents.len(), "fitting model");
            let vectors = trainer
                .train(&documents, &params)
                .map_err(|source| Error::TrainerFailure { scale, source })?;

            table.push_scale(order_by_node(vectors, node_count, params.dimensions, scale)?);
        }

        info!(
            rows = table.node_count(),
            columns = table.column_count(),
            "multi-scale embedding assembled"
        );
        Ok(table)
    }

    /// Full run with a `ChaCha8Rng` seeded from the config.
    pub fn fit<G, T>(&self, graph: &G, trainer: &mut T) -> Result<EmbeddingTable>
    where
        G: WeightedGraphRef + Sync,
        T: EmbeddingTrainer,
    {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.fit_with(graph, trainer, &mut rng, &CancelToken::new())
    }

    pub fn fit_with<G, T, R>(
        &self,
        graph: &G,
        trainer: &mut T,
        rng: &mut R,
        cancel: &CancelToken,
    ) -> Result<EmbeddingTable>
    where
        G: WeightedGraphRef + Sync,
        T: EmbeddingTrainer,
        R: Rng + ?Sized,
    {
        let walks = self.generate_walks(graph, rng)?;
        self.embed(graph.node_count(), &walks, trainer, cancel)
    }
}

#[cfg(not(feature = "parallel"))]
fn first_order_walks<G, R>(graph: &G, config: WalkConfig, rng: &mut R) -> Result<Corpus>
where
    G: GraphRef,
    R: Rng + ?Sized,
{
    FirstOrderWalker::new(graph).generate_all(config, rng)
}

#[cfg(feature = "parallel")]
fn first_order_walks<G, R>(graph: &G, config: WalkConfig, rng: &mut R) -> Result<Corpus>
where
    G: GraphRef + Sync,
    R: Rng + ?Sized,
{
    let seed = rng.random::<u64>();
    Ok(generate_walks_parallel(graph, WalkConfig { seed, ..config }))
}

#[cfg(not(feature = "parallel"))]
fn second_order_walks<G, R>(
    graph: &G,
    tables: &TransitionTables,
    config: WalkConfig,
    rng: &mut R,
) -> Result<Corpus>
where
    G: GraphRef,
    R: Rng + ?Sized,
{
    SecondOrderWalker::new(graph, tables)?.generate_all(config, rng)
}

#[cfg(feature = "parallel")]
fn second_order_walks<G, R>(
    graph: &G,
    tables: &TransitionTables,
    config: WalkConfig,
    rng: &mut R,
) -> Result<Corpus>
where
    G: GraphRef + Sync,
    R: Rng + ?Sized,
{
    let seed = rng.random::<u64>();
    generate_biased_walks_parallel(graph, tables, WalkConfig { seed, ..config })
}

fn order_by_node(
    mut vectors: TokenVectors,
    node_count: usize,
    dimensions: usize,
    scale: usize,
) -> Result<Vec<Vec<f32>>> {
    (0..node_count)
        .map(|node| {
            let v = vectors
                .remove(&node.to_string())
                .ok_or(Error::MissingEmbedding { node, scale })?;
            if v.len() != dimensions {
                return Err(Error::DimensionMismatch {
                    node,
                    scale,
                    expected: dimensions,
                    got: v.len(),
                });
            }
            Ok(v)
        })
        .collect()
}
