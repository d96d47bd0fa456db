//! Boundary to the external embedding trainer (skip-gram or similar).
//!
//! The trainer sees one corpus per scale: sentences of stringified node ids. It must return a
//! vector of length `params.dimensions` for every id it kept (ids below `min_count` may be
//! dropped by the trainer, which the orchestrator reports as a missing embedding).

use std::collections::HashMap;

/// Opaque trainer failure.
pub type TrainerError = Box<dyn std::error::Error + Send + Sync>;

/// Token → vector mapping returned by a trainer.
pub type TokenVectors = HashMap<String, Vec<f32>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainerParams {
    pub dimensions: usize,
    /// Context window; walklets always train with 1.
    pub window: usize,
    pub min_count: usize,
    pub workers: usize,
}

pub trait EmbeddingTrainer {
    fn train(
        &mut self,
        corpus: &[Vec<String>],
        params: &TrainerParams,
    ) -> Result<TokenVectors, TrainerError>;
}

impl<F> EmbeddingTrainer for F
where
    F: FnMut(&[Vec<String>], &TrainerParams) -> Result<TokenVectors, TrainerError>,
{
    fn train(
        &mut self,
        corpus: &[Vec<String>],
        params: &TrainerParams,
    ) -> Result<TokenVectors, TrainerError> {
        self(corpus, params)
    }
}
