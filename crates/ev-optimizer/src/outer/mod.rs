//! Outer optimizers driving a [`MetaOptimizationProblem`].

mod asynchronous;
mod generational;

use std::sync::Arc;

use ev_engine::components::{Crossover, CrossoverKind, Mutation, MutationKind, RepairStrategy, Variation};
use ev_types::{ConfigError, EvResult, Solution};

use crate::bridge::MetaOptimizationProblem;

pub use asynchronous::{AsyncMetaOptimizer, SharedPopulation};
pub use generational::GenerationalMetaOptimizer;

/// Distribution index shared by the outer SBX crossover and polynomial mutation.
pub const DISTRIBUTION_INDEX: f64 = 20.0;
pub const CROSSOVER_PROBABILITY: f64 = 0.9;

/// A multi-objective search over candidate configurations.
pub trait MetaOptimizer: Send + Sync {
    fn name(&self) -> &str;

    /// Runs until the evaluation budget is spent and returns the final
    /// population.
    fn optimize(&self, problem: Arc<MetaOptimizationProblem>) -> EvResult<Vec<Solution>>;
}

/// Outer optimizer settings shared by both disciplines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaOptimizerSettings {
    pub population_size: usize,
    pub max_evaluations: usize,
    pub cpu_cores: usize,
    pub seed: u64,
}

/// Resolves `NSGAII` or `AsyncNSGAII`.
pub fn meta_optimizer_from_name(name: &str, settings: MetaOptimizerSettings) -> EvResult<Box<dyn MetaOptimizer>> {
    match name.trim().to_uppercase().replace(['-', '_'], "").as_str() {
        "NSGAII" => Ok(Box::new(GenerationalMetaOptimizer::new(settings))),
        "ASYNCNSGAII" => Ok(Box::new(AsyncMetaOptimizer::new(settings))),
        _ => Err(ConfigError::UnknownName {
            kind: "meta-optimizer".to_string(),
            name: name.to_string(),
        }
        .into()),
    }
}

/// SBX plus polynomial mutation with probability `1 / variables`, one child
/// per call.
pub(crate) fn steady_state_variation(variables: usize) -> Variation {
    Variation::CrossoverAndMutation {
        crossover: Crossover::new(
            CrossoverKind::Sbx {
                distribution_index: DISTRIBUTION_INDEX,
            },
            CROSSOVER_PROBABILITY,
            RepairStrategy::Bounds,
        ),
        mutation: Mutation::new(
            MutationKind::Polynomial {
                distribution_index: DISTRIBUTION_INDEX,
            },
            1.0 / variables.max(1) as f64,
            RepairStrategy::Bounds,
        ),
        offspring_size: 1,
    }
}
