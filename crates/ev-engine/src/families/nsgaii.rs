use std::sync::Arc;

use ev_space::catalogue::{nsgaii_compact_space, nsgaii_space, MATING_POOL_SIZE, OFFSPRING_POPULATION_SIZE};
use ev_space::{AlgorithmConfiguration, ParameterSpace};
use ev_types::EvResult;
use tracing::debug;

use crate::algorithm::{Algorithm, ResultSource};
use crate::builder::{AlgorithmFamily, BuildContext};
use crate::components::{MatingSelection, Replacement, SolutionsCreation, TerminationByEvaluations};

use super::common::{inject_mutation, mating_pool_size, population_and_archive, variation};
use super::evolutionary::EvolutionaryAlgorithm;

/// NSGA-II: ranking and crowding replacement over a generational loop.
pub struct NsgaII {
    space: Arc<ParameterSpace>,
}

impl NsgaII {
    pub fn new() -> EvResult<Self> {
        Ok(Self::with_space(nsgaii_space()?))
    }

    /// The four-parameter variant with every structural choice pinned.
    pub fn compact() -> EvResult<Self> {
        Ok(Self::with_space(nsgaii_compact_space()?))
    }

    pub fn with_space(space: ParameterSpace) -> Self {
        Self {
            space: Arc::new(space),
        }
    }
}

impl AlgorithmFamily for NsgaII {
    fn name(&self) -> &str {
        "NSGAII"
    }

    fn parameter_space(&self) -> &Arc<ParameterSpace> {
        &self.space
    }

    fn inject_non_configurables(
        &self,
        configuration: &AlgorithmConfiguration,
        context: &mut BuildContext,
    ) -> EvResult<()> {
        inject_generational(configuration, context)
    }

    fn assemble(
        &self,
        configuration: &AlgorithmConfiguration,
        context: &BuildContext,
    ) -> EvResult<Box<dyn Algorithm>> {
        assemble_generational(self.name(), Replacement::RankingAndCrowding, configuration, context)
    }
}

pub(crate) fn inject_generational(
    configuration: &AlgorithmConfiguration,
    context: &mut BuildContext,
) -> EvResult<()> {
    let (population_size, _) = population_and_archive(configuration, context.population_size)?;
    let max_iterations = context.max_evaluations / population_size.max(1);
    inject_mutation(context, max_iterations);

    let offspring = configuration.positive(OFFSPRING_POPULATION_SIZE)?;
    context.inject("variation", OFFSPRING_POPULATION_SIZE, offspring as i64);
    let pool = mating_pool_size(configuration, offspring)?;
    context.inject("selection", MATING_POOL_SIZE, pool as i64);
    Ok(())
}

/// Build steps for the generational families, in order: archive and
/// population size, initialization, variation, selection, evaluation,
/// replacement, termination and result source.
pub(crate) fn assemble_generational(
    name: &str,
    replacement: Replacement,
    configuration: &AlgorithmConfiguration,
    context: &BuildContext,
) -> EvResult<Box<dyn Algorithm>> {
    let (population_size, archive) = population_and_archive(configuration, context.population_size)?;
    let creation = SolutionsCreation::from_name(configuration.categorical("createInitialSolutions")?)?;
    let variation = variation(configuration, context)?;

    let mating_pool_size = context.non_configurable_usize("selection", MATING_POOL_SIZE)?;
    let selection = MatingSelection::from_name(configuration.categorical("selection")?, || {
        configuration.positive("selectionTournamentSize")
    })?;

    let evaluation = context.evaluation(archive.is_some())?;
    let termination = TerminationByEvaluations::new(context.max_evaluations);
    let result_source = ResultSource::from_archive(archive);

    debug!(
        family = name,
        population = population_size,
        offspring = variation.offspring_size(),
        mating_pool = mating_pool_size,
        ?selection,
        ?evaluation,
        "Assembled generational algorithm"
    );

    Ok(Box::new(EvolutionaryAlgorithm {
        name: name.to_string(),
        problem: Arc::clone(&context.problem),
        population_size,
        creation,
        variation,
        selection,
        mating_pool_size,
        replacement,
        evaluation,
        termination,
        result_source,
        rng: context.rng(),
        population: Vec::new(),
        evaluations: 0,
        iteration: 0,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ConfigurableAlgorithmBuilder;
    use ev_types::{Problem, Zdt, ZdtVariant};

    fn builder(family: NsgaII, population: usize, evaluations: usize) -> ConfigurableAlgorithmBuilder {
        let problem: Arc<dyn Problem> = Arc::new(Zdt::new(ZdtVariant::Zdt1, 10));
        ConfigurableAlgorithmBuilder::new(Arc::new(family), problem, population, evaluations).with_seed(42)
    }

    #[test]
    fn test_compact_midpoint_runs() {
        let decoded = builder(NsgaII::compact().unwrap(), 20, 600)
            .create_builder_instance()
            .decode(&[0.5, 0.5, 0.5, 0.5])
            .unwrap();
        let configuration = decoded.configuration().clone();
        assert_eq!(configuration.positive("offspringPopulationSize").unwrap(), 101);
        assert_eq!(configuration.positive("selectionTournamentSize").unwrap(), 5);

        let mut algorithm = decoded.build().unwrap();
        algorithm.run().unwrap();
        let result = algorithm.result();
        assert_eq!(result.len(), 20);
        assert!(result.iter().all(|s| s.is_finite()));
        assert!(algorithm.evaluations() >= 600);
        assert!(algorithm.result_front().is_finite());
    }

    #[test]
    fn test_external_archive_result() {
        let tokens = "--algorithmResult externalArchive --populationSizeWithArchive 10 \
                      --externalArchive crowdingDistanceArchive --createInitialSolutions latinHypercubeSampling \
                      --offspringPopulationSize 10 --variation crossoverAndMutationVariation \
                      --crossover SBX --crossoverProbability 0.9 --crossoverRepairStrategy bounds \
                      --sbxDistributionIndex 20.0 --mutation nonUniform --mutationProbabilityFactor 1.0 \
                      --mutationRepairStrategy bounds --nonUniformMutationPerturbation 0.5 \
                      --selection tournament --selectionTournamentSize 2";
        let tokens: Vec<&str> = tokens.split_whitespace().collect();
        let mut algorithm = builder(NsgaII::new().unwrap(), 30, 400)
            .parse(&tokens)
            .unwrap()
            .build()
            .unwrap();
        algorithm.run().unwrap();
        let result = algorithm.result();
        assert!(!result.is_empty());
        assert!(result.len() <= 30);
        assert!(result.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_same_seed_same_front() {
        let run = || {
            let mut algorithm = builder(NsgaII::compact().unwrap(), 10, 200)
                .decode(&[0.1, 0.3, 0.6, 0.2])
                .unwrap()
                .build()
                .unwrap();
            algorithm.run().unwrap();
            algorithm.result_front()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_every_decoded_vector_builds() {
        let family = NsgaII::new().unwrap();
        let dimension = family.parameter_space().dimension();
        for fill in [0.0, 0.35, 0.7, 1.0] {
            let mut algorithm = builder(NsgaII::new().unwrap(), 12, 100)
                .decode(&vec![fill; dimension])
                .unwrap()
                .build()
                .unwrap();
            algorithm.run().unwrap();
            assert!(!algorithm.result().is_empty());
        }
    }
}
