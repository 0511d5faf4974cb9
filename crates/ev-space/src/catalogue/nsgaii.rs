use ev_types::EvResult;

use crate::parameter::Parameter;
use crate::space::ParameterSpace;
use crate::value::ParameterValue;

use super::common::{crossover, create_initial_solutions, external_archive_type, mutation, selection};
use super::OFFSPRING_POPULATION_SIZE;

pub const OFFSPRING_SIZES: [i64; 9] = [1, 2, 5, 10, 20, 50, 100, 200, 400];

/// `algorithmResult` shared by the generational families.
pub(crate) fn algorithm_result_with_archive() -> Parameter {
    Parameter::categorical("algorithmResult", &["population", "externalArchive"])
        .with_specific(
            "externalArchive",
            Parameter::integer("populationSizeWithArchive", 10, 200),
        )
        .with_specific("externalArchive", external_archive_type("externalArchive"))
}

pub(crate) fn crossover_and_mutation_variation() -> Parameter {
    Parameter::categorical("variation", &["crossoverAndMutationVariation"])
        .requires(OFFSPRING_POPULATION_SIZE)
        .with_specific("crossoverAndMutationVariation", crossover())
        .with_specific("crossoverAndMutationVariation", mutation())
}

pub fn nsgaii_space() -> EvResult<ParameterSpace> {
    ParameterSpace::new(
        "NSGAII",
        vec![
            algorithm_result_with_archive(),
            create_initial_solutions("createInitialSolutions"),
            Parameter::categorical_integer("offspringPopulationSize", &OFFSPRING_SIZES),
            crossover_and_mutation_variation(),
            selection(),
        ],
    )
}

/// Four tunables with every structural choice pinned: SBX crossover,
/// polynomial mutation and tournament selection over the population.
pub fn nsgaii_compact_space() -> EvResult<ParameterSpace> {
    let fixed: Vec<(String, ParameterValue)> = vec![
        ("algorithmResult", ParameterValue::from("population")),
        ("createInitialSolutions", ParameterValue::from("random")),
        ("variation", ParameterValue::from("crossoverAndMutationVariation")),
        ("crossover", ParameterValue::from("SBX")),
        ("crossoverProbability", ParameterValue::from(0.9)),
        ("crossoverRepairStrategy", ParameterValue::from("bounds")),
        ("mutation", ParameterValue::from("polynomial")),
        ("mutationProbabilityFactor", ParameterValue::from(1.0)),
        ("mutationRepairStrategy", ParameterValue::from("bounds")),
        ("selection", ParameterValue::from("tournament")),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect();

    ParameterSpace::with_fixed(
        "NSGAII",
        vec![
            Parameter::integer("offspringPopulationSize", 1, 200),
            Parameter::integer("selectionTournamentSize", 2, 8),
            Parameter::real("sbxDistributionIndex", 5.0, 400.0),
            Parameter::real("polynomialMutationDistributionIndex", 5.0, 400.0),
        ],
        fixed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_space_dimension() {
        let space = nsgaii_space().unwrap();
        assert_eq!(space.dimension(), 20);
        assert_eq!(space.parameter_names()[0], "algorithmResult");
    }

    #[test]
    fn test_compact_space_midpoint() {
        let space = nsgaii_compact_space().unwrap();
        assert_eq!(space.dimension(), 4);

        let config = space.decode_vector(&[0.5, 0.5, 0.5, 0.5]).unwrap();
        assert_eq!(config.positive("offspringPopulationSize").unwrap(), 101);
        assert_eq!(config.positive("selectionTournamentSize").unwrap(), 5);
        assert!((config.real("sbxDistributionIndex").unwrap() - 202.5).abs() < 1e-9);
        assert!(
            (config.real("polynomialMutationDistributionIndex").unwrap() - 202.5).abs() < 1e-9
        );
        assert_eq!(config.categorical("crossover").unwrap(), "SBX");
        assert_eq!(config.real("crossoverProbability").unwrap(), 0.9);
    }

    #[test]
    fn test_archive_branch_activation() {
        let space = nsgaii_space().unwrap();
        let config = space
            .parse_str(
                "--algorithmResult externalArchive --populationSizeWithArchive 50 \
                 --externalArchive crowdingDistanceArchive --createInitialSolutions random \
                 --offspringPopulationSize 100 --variation crossoverAndMutationVariation \
                 --crossover BLX_ALPHA --crossoverProbability 0.9 \
                 --crossoverRepairStrategy bounds --blxAlphaCrossoverAlphaValue 0.5 \
                 --mutation uniform --mutationProbabilityFactor 1.0 \
                 --mutationRepairStrategy round --uniformMutationPerturbation 0.3 \
                 --selection random",
            )
            .unwrap();
        assert_eq!(config.positive("populationSizeWithArchive").unwrap(), 50);
        assert!(!config.is_active("sbxDistributionIndex"));
        assert!(!config.is_active("selectionTournamentSize"));
        assert_eq!(config.active_names().len(), 15);
    }
}
