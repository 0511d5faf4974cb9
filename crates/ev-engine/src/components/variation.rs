use ev_types::{BuildError, Bounds, EvRng, EvResult, Solution};

use super::crossover::Crossover;
use super::differential_evolution::DifferentialEvolutionCrossover;
use super::mutation::Mutation;

/// Turns a mating pool into offspring.
#[derive(Debug, Clone, PartialEq)]
pub enum Variation {
    CrossoverAndMutation {
        crossover: Crossover,
        mutation: Mutation,
        offspring_size: usize,
    },
    DifferentialEvolution {
        crossover: DifferentialEvolutionCrossover,
        mutation: Mutation,
        offspring_size: usize,
    },
}

impl Variation {
    pub fn offspring_size(&self) -> usize {
        match self {
            Self::CrossoverAndMutation { offspring_size, .. }
            | Self::DifferentialEvolution { offspring_size, .. } => *offspring_size,
        }
    }

    /// Parents needed for one call to [`variate`](Self::variate). Crossover
    /// consumes parents in pairs, so odd offspring counts round up.
    pub fn mating_pool_size(&self) -> usize {
        match self {
            Self::CrossoverAndMutation { offspring_size, .. } => {
                Self::crossover_mating_pool_size(*offspring_size)
            }
            Self::DifferentialEvolution {
                crossover,
                offspring_size,
                ..
            } => crossover.variant.parents() * offspring_size,
        }
    }

    pub fn crossover_mating_pool_size(offspring_size: usize) -> usize {
        offspring_size.div_ceil(Crossover::CHILDREN) * Crossover::PARENTS
    }

    /// Offspring are returned unevaluated. `current` is the target vector of
    /// differential evolution and defaults to the first parent.
    pub fn variate(
        &self,
        mating_pool: &[Solution],
        current: Option<&Solution>,
        bounds: &[Bounds],
        iteration: usize,
        rng: &mut EvRng,
    ) -> EvResult<Vec<Solution>> {
        if mating_pool.len() < self.mating_pool_size() {
            return Err(BuildError::Inconsistent {
                message: format!(
                    "mating pool holds {} solutions, variation needs {}",
                    mating_pool.len(),
                    self.mating_pool_size()
                ),
            }
            .into());
        }

        let mut offspring = Vec::with_capacity(self.offspring_size());
        match self {
            Self::CrossoverAndMutation {
                crossover,
                mutation,
                offspring_size,
            } => {
                for pair in mating_pool.chunks_exact(Crossover::PARENTS) {
                    for mut child in crossover.execute(&pair[0], &pair[1], bounds, rng) {
                        if offspring.len() == *offspring_size {
                            break;
                        }
                        mutation.execute(&mut child, bounds, iteration, rng);
                        offspring.push(child);
                    }
                    if offspring.len() == *offspring_size {
                        break;
                    }
                }
            }
            Self::DifferentialEvolution {
                crossover,
                mutation,
                offspring_size,
            } => {
                let parents = crossover.variant.parents();
                for group in mating_pool.chunks_exact(parents).take(*offspring_size) {
                    let target = current.unwrap_or(&group[0]);
                    let mut child = crossover.execute(target, group, bounds, rng);
                    mutation.execute(&mut child, bounds, iteration, rng);
                    offspring.push(child);
                }
            }
        }
        Ok(offspring)
    }
}
