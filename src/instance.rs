//! Random problem instances.
//!
//! An instance of size *n* holds, for every product *i*:
//!
//! | Symbol | Meaning                                     | Distribution      |
//! |--------|---------------------------------------------|-------------------|
//! | `s[i]` | activation cost                             | `U[0, 10)`        |
//! | `e[i]` | raw material consumed once activated        | `U[0, 10)`        |
//! | `c[i]` | profit per produced unit                    | `U[0, 100)`       |
//! | `p[i]` | raw material consumed per produced unit     | `U[0, 100)`       |
//! | `M[i]` | maximum production                          | constant `1`      |
//!
//! plus the raw-material budget `Q ~ U[0, Σ(e[i] + p[i]))`. Vectors are drawn in the
//! order `s`, `e`, `c`, `p`, then `Q`, so a seed fully determines the instance.
//!
//! Runs generate several instances in a row. Each one gets its own generator, seeded
//! from a [`SeedSequence`] that accumulates `n + k` on top of the base seed before
//! iteration `k`.

use anyhow::Result;
use rand::distributions::{Distribution, Uniform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::AppError;

/// Number of instances generated per run.
pub const INSTANCES_PER_RUN: u64 = 5;

const ACTIVATION_COST_MAX: f64 = 10.0;
const ACTIVATION_USAGE_MAX: f64 = 10.0;
const UNIT_PROFIT_MAX: f64 = 100.0;
const UNIT_USAGE_MAX: f64 = 100.0;
const MAX_PRODUCTION: f64 = 1.0;

/// Coefficients of one production-planning instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemInstance {
    activation_cost: Vec<f64>,
    activation_usage: Vec<f64>,
    unit_profit: Vec<f64>,
    unit_usage: Vec<f64>,
    material: f64,
    max_production: Vec<f64>,
}

impl ProblemInstance {
    /// Build an instance from explicit coefficients.
    ///
    /// Every product gets `M[i] = 1`. All vectors must have the length of
    /// `activation_cost`.
    pub fn from_parts(
        activation_cost: Vec<f64>,
        activation_usage: Vec<f64>,
        unit_profit: Vec<f64>,
        unit_usage: Vec<f64>,
        material: f64,
    ) -> Result<Self> {
        let expected = activation_cost.len();
        for (field, found) in [
            ("e", activation_usage.len()),
            ("c", unit_profit.len()),
            ("p", unit_usage.len()),
        ] {
            if found != expected {
                return Err(AppError::MismatchedLengths {
                    field,
                    expected,
                    found,
                }
                .into());
            }
        }

        Ok(Self {
            max_production: vec![MAX_PRODUCTION; expected],
            activation_cost,
            activation_usage,
            unit_profit,
            unit_usage,
            material,
        })
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.activation_cost.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activation_cost.is_empty()
    }

    /// `s`: cost of activating each product.
    pub fn activation_cost(&self) -> &[f64] {
        &self.activation_cost
    }

    /// `e`: raw material consumed by activating each product.
    pub fn activation_usage(&self) -> &[f64] {
        &self.activation_usage
    }

    /// `c`: profit per produced unit.
    pub fn unit_profit(&self) -> &[f64] {
        &self.unit_profit
    }

    /// `p`: raw material consumed per produced unit.
    pub fn unit_usage(&self) -> &[f64] {
        &self.unit_usage
    }

    /// `Q`: raw material available.
    pub fn material(&self) -> f64 {
        self.material
    }

    /// `M`: production cap per product.
    pub fn max_production(&self) -> &[f64] {
        &self.max_production
    }

    /// `Σ(e[i] + p[i])`, the upper end of the budget distribution.
    pub fn total_usage(&self) -> f64 {
        total_usage(&self.activation_usage, &self.unit_usage)
    }
}

fn total_usage(activation_usage: &[f64], unit_usage: &[f64]) -> f64 {
    activation_usage
        .iter()
        .zip(unit_usage)
        .map(|(e, p)| e + p)
        .sum()
}

fn uniform_vector<R: Rng + ?Sized>(n: usize, high: f64, rng: &mut R) -> Vec<f64> {
    let dist = Uniform::new(0.0, high);
    (0..n).map(|_| dist.sample(&mut *rng)).collect()
}

/// Draw an instance of `n` products from `rng`.
///
/// For `n == 0` the instance is empty and `Q` is `0`.
pub fn generate_instance<R: Rng + ?Sized>(n: usize, rng: &mut R) -> ProblemInstance {
    let activation_cost = uniform_vector(n, ACTIVATION_COST_MAX, rng);
    let activation_usage = uniform_vector(n, ACTIVATION_USAGE_MAX, rng);
    let unit_profit = uniform_vector(n, UNIT_PROFIT_MAX, rng);
    let unit_usage = uniform_vector(n, UNIT_USAGE_MAX, rng);

    let total = total_usage(&activation_usage, &unit_usage);
    let material = if total > 0.0 {
        Uniform::new(0.0, total).sample(rng)
    } else {
        0.0
    };

    ProblemInstance {
        max_production: vec![MAX_PRODUCTION; n],
        activation_cost,
        activation_usage,
        unit_profit,
        unit_usage,
        material,
    }
}

/// Deterministic generator for one iteration seed.
///
/// Negative seeds are reinterpreted bit for bit.
pub fn rng_for_seed(seed: i64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed as u64)
}

/// Per-iteration seeds of a run.
///
/// Yields `(k, seed_k)` for `k = 1..=count`, where `seed_0` is the base seed and
/// `seed_k = seed_{k-1} + n + k`. The drift is cumulative, so iteration `k` depends
/// on every earlier offset. The base may be negative, so early seeds can be negative
/// too. Arithmetic wraps on overflow.
#[derive(Debug, Clone)]
pub struct SeedSequence {
    seed: i64,
    size: u64,
    k: u64,
    count: u64,
}

impl SeedSequence {
    pub fn new(base: i64, size: u64, count: u64) -> Self {
        Self {
            seed: base,
            size,
            k: 0,
            count,
        }
    }
}

impl Iterator for SeedSequence {
    type Item = (u64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.k >= self.count {
            return None;
        }

        self.k += 1;
        self.seed = self
            .seed
            .wrapping_add_unsigned(self.size)
            .wrapping_add_unsigned(self.k);
        Some((self.k, self.seed))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.k) as usize;
        (remaining, Some(remaining))
    }
}
