use ev_types::EvResult;

use crate::parameter::Parameter;
use crate::space::ParameterSpace;

use super::common::{crossover, create_initial_solutions, external_archive_type, mutation};
use super::{MATING_POOL_SIZE, OFFSPRING_POPULATION_SIZE, POPULATION_SIZE};

fn aggregation_function() -> Parameter {
    Parameter::categorical(
        "aggregationFunction",
        &[
            "tschebyscheff",
            "weightedSum",
            "penaltyBoundaryIntersection",
            "modifiedTschebyscheff",
        ],
    )
    .with_global(Parameter::boolean("normalizeObjectives").with_specific(
        "true",
        Parameter::real("epsilonParameterForNormalizing", 1.0e-8, 25.0),
    ))
    .with_specific(
        "penaltyBoundaryIntersection",
        Parameter::real("pbiTheta", 1.0, 200.0),
    )
}

fn variation() -> Parameter {
    Parameter::categorical(
        "variation",
        &["crossoverAndMutationVariation", "differentialEvolutionVariation"],
    )
    .requires(OFFSPRING_POPULATION_SIZE)
    .with_global(mutation())
    .with_specific("crossoverAndMutationVariation", crossover())
    .with_specific(
        "differentialEvolutionVariation",
        Parameter::categorical(
            "differentialEvolutionCrossover",
            &["RAND_1_BIN", "RAND_1_EXP", "RAND_2_BIN"],
        )
        .with_global(Parameter::real("CR", 0.0, 1.0))
        .with_global(Parameter::real("F", 0.0, 1.0)),
    )
}

/// Decomposition-based family. Mating partners come from the neighborhood
/// with probability `neighborhoodSelectionProbability`.
pub fn moead_space() -> EvResult<ParameterSpace> {
    ParameterSpace::new(
        "MOEAD",
        vec![
            Parameter::integer("neighborhoodSize", 5, 50).requires(POPULATION_SIZE),
            Parameter::integer("maximumNumberOfReplacedSolutions", 1, 5),
            aggregation_function(),
            Parameter::categorical("algorithmResult", &["externalArchive", "population"])
                .with_specific("externalArchive", external_archive_type("externalArchive")),
            create_initial_solutions("createInitialSolutions"),
            variation(),
            Parameter::categorical("selection", &["populationAndNeighborhoodMatingPoolSelection"])
                .requires(MATING_POOL_SIZE)
                .with_global(Parameter::real("neighborhoodSelectionProbability", 0.0, 1.0)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension() {
        assert_eq!(moead_space().unwrap().dimension(), 27);
    }

    #[test]
    fn test_differential_evolution_branch() {
        let space = moead_space().unwrap();
        let mut vector = vec![0.0; space.dimension()];
        let variation = space.lookup("variation").unwrap().offset;
        vector[variation] = 1.0;
        let config = space.decode_vector(&vector).unwrap();

        assert_eq!(
            config.categorical("variation").unwrap(),
            "differentialEvolutionVariation"
        );
        assert_eq!(
            config.categorical("differentialEvolutionCrossover").unwrap(),
            "RAND_1_BIN"
        );
        assert!(config.is_active("mutation"));
        assert!(!config.is_active("crossover"));
        assert!(!config.is_active("epsilonParameterForNormalizing"));
    }
}
