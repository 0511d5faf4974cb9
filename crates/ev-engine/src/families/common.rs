// Configuration readers shared by the family assemblers

use ev_space::catalogue::{
    MAX_ITERATIONS, NUMBER_OF_PROBLEM_VARIABLES, OFFSPRING_POPULATION_SIZE,
};
use ev_space::AlgorithmConfiguration;
use ev_types::EvResult;

use crate::builder::BuildContext;
use crate::components::{
    Archive, ArchiveKind, Crossover, DeVariant, DifferentialEvolutionCrossover, Mutation,
    RepairStrategy, Variation,
};

use super::unsupported;

pub(crate) fn crossover(configuration: &AlgorithmConfiguration) -> EvResult<Crossover> {
    Crossover::from_name(
        configuration.categorical("crossover")?,
        configuration.real("crossoverProbability")?,
        RepairStrategy::from_name(configuration.categorical("crossoverRepairStrategy")?)?,
        |name| configuration.real(name),
    )
}

/// The configured factor is spread over the problem's variables.
pub(crate) fn mutation(configuration: &AlgorithmConfiguration, context: &BuildContext) -> EvResult<Mutation> {
    let variables = context.non_configurable_usize("mutation", NUMBER_OF_PROBLEM_VARIABLES)?;
    let factor = configuration.real("mutationProbabilityFactor")?;
    let probability = (factor / variables.max(1) as f64).min(1.0);
    Mutation::from_name(
        configuration.categorical("mutation")?,
        probability,
        RepairStrategy::from_name(configuration.categorical("mutationRepairStrategy")?)?,
        |name| configuration.real(name),
        || context.non_configurable_usize("nonUniformMutationPerturbation", MAX_ITERATIONS),
    )
}

/// Injections every mutation tree needs.
pub(crate) fn inject_mutation(context: &mut BuildContext, max_iterations: usize) {
    let variables = context.problem.number_of_variables() as i64;
    context.inject("mutation", NUMBER_OF_PROBLEM_VARIABLES, variables);
    context.inject("nonUniformMutationPerturbation", MAX_ITERATIONS, max_iterations as i64);
}

pub(crate) fn variation(configuration: &AlgorithmConfiguration, context: &BuildContext) -> EvResult<Variation> {
    let offspring_size = context.non_configurable_usize("variation", OFFSPRING_POPULATION_SIZE)?;
    match configuration.categorical("variation")? {
        "crossoverAndMutationVariation" => Ok(Variation::CrossoverAndMutation {
            crossover: crossover(configuration)?,
            mutation: mutation(configuration, context)?,
            offspring_size,
        }),
        "differentialEvolutionVariation" => Ok(Variation::DifferentialEvolution {
            crossover: DifferentialEvolutionCrossover::new(
                DeVariant::from_name(configuration.categorical("differentialEvolutionCrossover")?)?,
                configuration.real("CR")?,
                configuration.real("F")?,
            ),
            mutation: mutation(configuration, context)?,
            offspring_size,
        }),
        other => Err(unsupported("variation", other)),
    }
}

/// Parents one variation call consumes, known before the operator exists.
pub(crate) fn mating_pool_size(configuration: &AlgorithmConfiguration, offspring_size: usize) -> EvResult<usize> {
    match configuration.categorical("variation")? {
        "crossoverAndMutationVariation" => Ok(Variation::crossover_mating_pool_size(offspring_size)),
        "differentialEvolutionVariation" => {
            let variant = DeVariant::from_name(configuration.categorical("differentialEvolutionCrossover")?)?;
            Ok(variant.parents() * offspring_size)
        }
        other => Err(unsupported("variation", other)),
    }
}

/// Working population size and the external archive, if one is requested.
/// With an archive the archive keeps the requested population size and the
/// population itself takes `populationSizeWithArchive`.
pub(crate) fn population_and_archive(
    configuration: &AlgorithmConfiguration,
    population_size: usize,
) -> EvResult<(usize, Option<Archive>)> {
    match configuration.categorical("algorithmResult")? {
        "population" => Ok((population_size, None)),
        "externalArchive" => {
            let kind = ArchiveKind::from_name(configuration.categorical("externalArchive")?)?;
            let working = if configuration.is_active("populationSizeWithArchive") {
                configuration.positive("populationSizeWithArchive")?
            } else {
                population_size
            };
            Ok((working, Some(Archive::new(kind, population_size))))
        }
        other => Err(unsupported("algorithmResult", other)),
    }
}
