// Synchronous outer search: NSGA-II assembled by the engine's own builder

use std::sync::Arc;

use ev_engine::{ConfigurableAlgorithmBuilder, NsgaII};
use ev_space::catalogue::OFFSPRING_POPULATION_SIZE;
use ev_space::{ParameterSpace, ParameterValue};
use ev_types::{EvResult, Problem, Solution};
use tracing::info;

use super::{MetaOptimizer, MetaOptimizerSettings, CROSSOVER_PROBABILITY, DISTRIBUTION_INDEX};
use crate::bridge::MetaOptimizationProblem;

/// Generational NSGA-II over the bridge. With more than one core every
/// generation is evaluated on a bounded thread pool and the loop waits for the
/// whole batch before replacement.
#[derive(Debug, Clone)]
pub struct GenerationalMetaOptimizer {
    settings: MetaOptimizerSettings,
}

impl GenerationalMetaOptimizer {
    pub fn new(settings: MetaOptimizerSettings) -> Self {
        Self { settings }
    }

    /// Every structural choice pinned: SBX, polynomial mutation, binary
    /// tournament, offspring equal to the population size.
    pub fn default_space(population_size: usize) -> EvResult<ParameterSpace> {
        let fixed: Vec<(String, ParameterValue)> = [
            ("algorithmResult", ParameterValue::from("population")),
            ("createInitialSolutions", ParameterValue::from("random")),
            (OFFSPRING_POPULATION_SIZE, ParameterValue::Int(population_size as i64)),
            ("variation", ParameterValue::from("crossoverAndMutationVariation")),
            ("crossover", ParameterValue::from("SBX")),
            ("crossoverProbability", ParameterValue::Real(CROSSOVER_PROBABILITY)),
            ("crossoverRepairStrategy", ParameterValue::from("bounds")),
            ("sbxDistributionIndex", ParameterValue::Real(DISTRIBUTION_INDEX)),
            ("mutation", ParameterValue::from("polynomial")),
            ("mutationProbabilityFactor", ParameterValue::Real(1.0)),
            ("mutationRepairStrategy", ParameterValue::from("bounds")),
            ("polynomialMutationDistributionIndex", ParameterValue::Real(DISTRIBUTION_INDEX)),
            ("selection", ParameterValue::from("tournament")),
            ("selectionTournamentSize", ParameterValue::Int(2)),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
        ParameterSpace::with_fixed("NSGAII", Vec::new(), fixed)
    }
}

impl MetaOptimizer for GenerationalMetaOptimizer {
    fn name(&self) -> &str {
        "NSGAII"
    }

    fn optimize(&self, problem: Arc<MetaOptimizationProblem>) -> EvResult<Vec<Solution>> {
        let settings = self.settings;
        let family = NsgaII::with_space(Self::default_space(settings.population_size)?);
        let problem: Arc<dyn Problem> = problem;

        info!(
            population = settings.population_size,
            max_evaluations = settings.max_evaluations,
            cores = settings.cpu_cores,
            variables = problem.number_of_variables(),
            "Starting generational meta-optimization"
        );
        let mut algorithm = ConfigurableAlgorithmBuilder::new(
            Arc::new(family),
            problem,
            settings.population_size,
            settings.max_evaluations,
        )
        .with_seed(settings.seed)
        .with_evaluation_threads(settings.cpu_cores)
        .decode(&[])?
        .build()?;
        algorithm.run()?;

        info!(
            evaluations = algorithm.evaluations(),
            "Generational meta-optimization finished"
        );
        Ok(algorithm.result())
    }
}
