//! Parametric distributions used to draw edge costs and node demand.

use std::fmt;

use rand::Rng;
use rand_distr::{Distribution as RandDistribution, Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Raw `(name, first, second)` triple as it appears in configuration files.
///
/// Serialized as a three element array, e.g. `["normal", 20.0, 5.0]`. The name is
/// only checked when the triple is turned into a [`Distribution`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, f64, f64)", into = "(String, f64, f64)")]
pub struct DistributionSpec {
    pub name: String,
    pub first: f64,
    pub second: f64,
}

impl DistributionSpec {
    pub fn new(name: impl Into<String>, first: f64, second: f64) -> Self {
        Self {
            name: name.into(),
            first,
            second,
        }
    }

    pub fn normal(mean: f64, std_dev: f64) -> Self {
        Self::new("normal", mean, std_dev)
    }

    pub fn uniform(low: f64, high: f64) -> Self {
        Self::new("uniform", low, high)
    }
}

impl From<(String, f64, f64)> for DistributionSpec {
    fn from((name, first, second): (String, f64, f64)) -> Self {
        Self {
            name,
            first,
            second,
        }
    }
}

impl From<DistributionSpec> for (String, f64, f64) {
    fn from(spec: DistributionSpec) -> Self {
        (spec.name, spec.first, spec.second)
    }
}

impl fmt::Display for DistributionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.name, self.first, self.second)
    }
}

/// A validated distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distribution {
    Normal { mean: f64, std_dev: f64 },
    Uniform { low: f64, high: f64 },
}

impl TryFrom<&DistributionSpec> for Distribution {
    type Error = Error;

    fn try_from(spec: &DistributionSpec) -> Result<Self> {
        if !spec.first.is_finite() || !spec.second.is_finite() {
            return Err(Error::configuration(format!(
                "distribution {spec} has non-finite parameters"
            )));
        }
        match spec.name.trim().to_ascii_lowercase().as_str() {
            "normal" | "gaussian" => {
                if spec.second < 0.0 {
                    return Err(Error::configuration(format!(
                        "distribution {spec}: standard deviation must be non-negative"
                    )));
                }
                Ok(Distribution::Normal {
                    mean: spec.first,
                    std_dev: spec.second,
                })
            }
            "uniform" => {
                if spec.first > spec.second {
                    return Err(Error::configuration(format!(
                        "distribution {spec}: low bound exceeds high bound"
                    )));
                }
                Ok(Distribution::Uniform {
                    low: spec.first,
                    high: spec.second,
                })
            }
            other => Err(Error::configuration(format!(
                "unsupported distribution '{other}' (expected 'normal' or 'uniform')"
            ))),
        }
    }
}

impl Distribution {
    /// Build a sampler for this distribution.
    pub fn sampler(&self) -> Result<Sampler> {
        match *self {
            Distribution::Normal { mean, std_dev } => Normal::new(mean, std_dev)
                .map(Sampler::Normal)
                .map_err(|e| Error::configuration(format!("normal({mean}, {std_dev}): {e}"))),
            Distribution::Uniform { low, high } if low == high => Ok(Sampler::Constant(low)),
            Distribution::Uniform { low, high } => Uniform::new(low, high)
                .map(Sampler::Uniform)
                .map_err(|e| Error::configuration(format!("uniform({low}, {high}): {e}"))),
        }
    }
}

/// Ready-to-draw form of a [`Distribution`].
#[derive(Debug, Clone, Copy)]
pub enum Sampler {
    Normal(Normal<f64>),
    Uniform(Uniform<f64>),
    /// Degenerate `uniform(a, a)`; draws nothing from the stream.
    Constant(f64),
}

impl Sampler {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Sampler::Normal(normal) => normal.sample(rng),
            Sampler::Uniform(uniform) => uniform.sample(rng),
            Sampler::Constant(value) => *value,
        }
    }

    /// Draw a transport cost: rounded to the nearest integer and floored at 1.
    pub fn sample_cost<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        self.sample(rng).round().max(1.0) as u32
    }

    /// Draw a demand: absolute value, rounded, floored at 1.
    pub fn sample_demand<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        self.sample(rng).abs().round().max(1.0) as u32
    }
}
