//! Alias-method sampling for discrete distributions.
//!
//! Walker/Vose alias tables: O(k) construction, O(1) draws.
//!
//! References:
//! - Walker (1974): An efficient method for generating discrete random variables with general distributions.
//! - Vose (1991): A linear algorithm for generating random numbers with a given distribution.

use crate::{Error, Result};
use rand::Rng;

/// How far a probability vector may drift from summing to one.
const SUM_TOLERANCE: f64 = 1e-6;

/// Sampling structure for a `k`-outcome discrete distribution.
///
/// Deserialization goes through [`AliasTable::from_parts`] and fails on inconsistent tables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawAliasTable"))]
pub struct AliasTable {
    threshold: Vec<f64>,
    alias: Vec<usize>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawAliasTable {
    threshold: Vec<f64>,
    alias: Vec<usize>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawAliasTable> for AliasTable {
    type Error = Error;

    fn try_from(raw: RawAliasTable) -> Result<Self> {
        Self::from_parts(raw.threshold, raw.alias)
    }
}

impl AliasTable {
    /// Build from probabilities that already sum to one.
    pub fn new(probabilities: &[f64]) -> Result<Self> {
        let sum = checked_sum(probabilities)?;
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(Error::MalformedProbabilities(format!(
                "probabilities sum to {sum}, expected 1.0"
            )));
        }
        Ok(Self::build(probabilities))
    }

    /// Build from non-negative weights, normalizing by their sum first.
    pub fn from_weights(weights: &[f64]) -> Result<Self> {
        let sum = checked_sum(weights)?;
        let probs: Vec<f64> = weights.iter().map(|&w| w / sum).collect();
        Ok(Self::build(&probs))
    }

    /// Reassemble a table from [`thresholds`](Self::thresholds) and [`aliases`](Self::aliases).
    ///
    /// Both must be non-empty and of equal length, every threshold in `[0, 1]`, and every alias
    /// a valid outcome index.
    pub fn from_parts(threshold: Vec<f64>, alias: Vec<usize>) -> Result<Self> {
        if threshold.is_empty() && alias.is_empty() {
            return Err(Error::EmptyDistribution);
        }
        let k = threshold.len();
        if alias.len() != k {
            return Err(Error::MalformedProbabilities(format!(
                "{k} thresholds but {} aliases",
                alias.len()
            )));
        }
        if let Some(bad) = threshold.iter().find(|t| !(0.0..=1.0).contains(*t)) {
            return Err(Error::MalformedProbabilities(format!(
                "threshold {bad} is outside [0, 1]"
            )));
        }
        if let Some(bad) = alias.iter().find(|&&a| a >= k) {
            return Err(Error::MalformedProbabilities(format!(
                "alias {bad} is out of range for {k} outcomes"
            )));
        }
        Ok(Self { threshold, alias })
    }

    fn build(probs: &[f64]) -> Self {
        let k = probs.len();
        let mut threshold: Vec<f64> = probs.iter().map(|&p| p * k as f64).collect();
        let mut alias: Vec<usize> = (0..k).collect();

        let mut smaller: Vec<usize> = Vec::with_capacity(k);
        let mut larger: Vec<usize> = Vec::with_capacity(k);
        for (kk, &scaled) in threshold.iter().enumerate() {
            if scaled < 1.0 {
                smaller.push(kk);
            } else {
                larger.push(kk);
            }
        }

        loop {
            let (small, large) = match (smaller.last(), larger.last()) {
                (Some(&s), Some(&l)) => (s, l),
                _ => break,
            };
            smaller.pop();
            larger.pop();

            alias[small] = large;
            threshold[large] -= 1.0 - threshold[small];
            if threshold[large] < 1.0 {
                smaller.push(large);
            } else {
                larger.push(large);
            }
        }

        // Whatever is left is (up to rounding) exactly full.
        for kk in smaller.into_iter().chain(larger) {
            threshold[kk] = 1.0;
            alias[kk] = kk;
        }

        Self { threshold, alias }
    }

    pub fn len(&self) -> usize {
        self.threshold.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threshold.is_empty()
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.threshold
    }

    pub fn aliases(&self) -> &[usize] {
        &self.alias
    }

    /// Draw an outcome index from two successive values of `uniform01`.
    ///
    /// The first value picks the bucket, the second is tested against the bucket threshold.
    /// Reusing one value for both skews the distribution.
    pub fn draw_with<F: FnMut() -> f64>(&self, mut uniform01: F) -> usize {
        let k = self.len();
        let kk = ((uniform01() * k as f64) as usize).min(k - 1);
        if uniform01() < self.threshold[kk] {
            kk
        } else {
            self.alias[kk]
        }
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.draw_with(|| rng.random::<f64>())
    }

    /// The distribution this table samples from, recovered from thresholds and aliases.
    pub fn distribution(&self) -> Vec<f64> {
        let k = self.len();
        let mut mass = vec![0.0f64; k];
        for kk in 0..k {
            mass[kk] += self.threshold[kk];
            if self.threshold[kk] < 1.0 {
                mass[self.alias[kk]] += 1.0 - self.threshold[kk];
            }
        }
        for m in &mut mass {
            *m /= k as f64;
        }
        mass
    }
}

fn checked_sum(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::EmptyDistribution);
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(Error::MalformedProbabilities(format!(
            "value {bad} is negative or not finite"
        )));
    }
    let sum: f64 = values.iter().sum();
    if !(sum > 0.0) {
        return Err(Error::MalformedProbabilities(format!(
            "values sum to {sum}, expected a positive total"
        )));
    }
    Ok(sum)
}
