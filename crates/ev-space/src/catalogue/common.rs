//! Sub-trees shared by several families.

use crate::parameter::Parameter;

use super::{MATING_POOL_SIZE, MAX_ITERATIONS, NUMBER_OF_PROBLEM_VARIABLES};

pub fn create_initial_solutions(name: &str) -> Parameter {
    Parameter::categorical(
        name,
        &["random", "latinHypercubeSampling", "scatterSearch", "default"],
    )
}

/// How a variable pushed out of its bounds is brought back.
pub fn repair_strategy(name: &str) -> Parameter {
    Parameter::categorical(name, &["random", "round", "bounds"])
}

pub fn crossover() -> Parameter {
    Parameter::categorical("crossover", &["SBX", "BLX_ALPHA", "wholeArithmetic"])
        .with_global(Parameter::real("crossoverProbability", 0.0, 1.0))
        .with_global(repair_strategy("crossoverRepairStrategy"))
        .with_specific("SBX", Parameter::real("sbxDistributionIndex", 5.0, 400.0))
        .with_specific(
            "BLX_ALPHA",
            Parameter::real("blxAlphaCrossoverAlphaValue", 0.0, 1.0),
        )
}

/// Mutation operators. The probability is `factor / numberOfProblemVariables`.
pub fn mutation() -> Parameter {
    Parameter::categorical(
        "mutation",
        &["uniform", "polynomial", "linkedPolynomial", "nonUniform"],
    )
    .requires(NUMBER_OF_PROBLEM_VARIABLES)
    .with_global(Parameter::real("mutationProbabilityFactor", 0.0, 2.0))
    .with_global(repair_strategy("mutationRepairStrategy"))
    .with_specific(
        "uniform",
        Parameter::real("uniformMutationPerturbation", 0.0, 1.0),
    )
    .with_specific(
        "polynomial",
        Parameter::real("polynomialMutationDistributionIndex", 5.0, 400.0),
    )
    .with_specific(
        "linkedPolynomial",
        Parameter::real("linkedPolynomialMutationDistributionIndex", 5.0, 400.0),
    )
    .with_specific(
        "nonUniform",
        Parameter::real("nonUniformMutationPerturbation", 0.0, 1.0).requires(MAX_ITERATIONS),
    )
}

/// Mating selection for the generational families.
pub fn selection() -> Parameter {
    Parameter::categorical("selection", &["tournament", "random"])
        .requires(MATING_POOL_SIZE)
        .with_specific(
            "tournament",
            Parameter::integer("selectionTournamentSize", 2, 10),
        )
}

pub fn external_archive_type(name: &str) -> Parameter {
    Parameter::categorical(name, &["crowdingDistanceArchive", "unboundedArchive"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_branches() {
        let mutation = mutation();
        assert_eq!(mutation.global_sub_parameters.len(), 2);
        assert_eq!(mutation.specific_sub_parameters.len(), 4);
        assert_eq!(
            mutation.specific_for("nonUniform")[0].non_configurable,
            vec![MAX_ITERATIONS.to_string()]
        );
    }

    #[test]
    fn test_crossover_flattening() {
        assert_eq!(crossover().flatten().len(), 5);
    }
}
