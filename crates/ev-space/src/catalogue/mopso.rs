use ev_types::EvResult;

use crate::parameter::Parameter;
use crate::space::ParameterSpace;

use super::common::{create_initial_solutions, mutation};
use super::{MAX_ITERATIONS, SWARM_SIZE};

fn inertia_weight() -> Parameter {
    let weight_min = || Parameter::real("weightMin", 0.1, 0.5);
    let weight_max = || Parameter::real("weightMax", 0.5, 1.0);
    Parameter::categorical(
        "inertiaWeightComputingStrategy",
        &[
            "constantValue",
            "randomSelectedValue",
            "linearIncreasingValue",
            "linearDecreasingValue",
        ],
    )
    .requires(MAX_ITERATIONS)
    .requires(SWARM_SIZE)
    .with_specific("constantValue", Parameter::real("weight", 0.1, 1.0))
    .with_specific("randomSelectedValue", weight_min())
    .with_specific("randomSelectedValue", weight_max())
    .with_specific("linearIncreasingValue", weight_min())
    .with_specific("linearIncreasingValue", weight_max())
    .with_specific("linearDecreasingValue", weight_min())
    .with_specific("linearDecreasingValue", weight_max())
}

fn velocity_update() -> Parameter {
    Parameter::categorical(
        "velocityUpdate",
        &["defaultVelocityUpdate", "constrainedVelocityUpdate"],
    )
    .with_global(Parameter::real("c1Min", 1.0, 2.0))
    .with_global(Parameter::real("c1Max", 2.0, 3.0))
    .with_global(Parameter::real("c2Min", 1.0, 2.0))
    .with_global(Parameter::real("c2Max", 2.0, 3.0))
}

/// Particle swarm family. The leader archive is bounded by the builder's
/// population size.
pub fn mopso_space() -> EvResult<ParameterSpace> {
    ParameterSpace::new(
        "MOPSO",
        vec![
            Parameter::integer("swarmSize", 10, 200),
            Parameter::categorical(
                "leaderArchive",
                &["crowdingDistanceArchive", "hypervolumeArchive"],
            ),
            Parameter::categorical("algorithmResult", &["leaderArchive", "unboundedArchive"]),
            create_initial_solutions("swarmInitialization"),
            Parameter::categorical(
                "velocityInitialization",
                &[
                    "defaultVelocityInitialization",
                    "SPSO2007VelocityInitialization",
                    "SPSO2011VelocityInitialization",
                ],
            ),
            Parameter::categorical("perturbation", &["frequencySelectionMutationBasedPerturbation"])
                .with_specific("frequencySelectionMutationBasedPerturbation", mutation())
                .with_specific(
                    "frequencySelectionMutationBasedPerturbation",
                    Parameter::integer("frequencyOfApplicationOfMutationOperator", 1, 10),
                ),
            inertia_weight(),
            velocity_update(),
            Parameter::categorical("localBestInitialization", &["defaultLocalBestInitialization"]),
            Parameter::categorical("globalBestInitialization", &["defaultGlobalBestInitialization"]),
            Parameter::categorical("globalBestSelection", &["tournament", "random"]).with_specific(
                "tournament",
                Parameter::integer("selectionTournamentSize", 2, 10),
            ),
            Parameter::categorical("globalBestUpdate", &["defaultGlobalBestUpdate"]),
            Parameter::categorical("localBestUpdate", &["defaultLocalBestUpdate"]),
            Parameter::categorical("positionUpdate", &["defaultPositionUpdate"])
                .with_specific(
                    "defaultPositionUpdate",
                    Parameter::real("velocityChangeWhenLowerLimitIsReached", -1.0, 1.0),
                )
                .with_specific(
                    "defaultPositionUpdate",
                    Parameter::real("velocityChangeWhenUpperLimitIsReached", -1.0, 1.0),
                ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_inertia_bounds_flatten_once() {
        let space = mopso_space().unwrap();
        assert_eq!(space.dimension(), 32);
        let names = space.parameter_names();
        assert_eq!(names.iter().filter(|n| **n == "weightMin").count(), 1);
    }

    #[test]
    fn test_linear_inertia_activates_bounds() {
        let space = mopso_space().unwrap();
        let mut vector = vec![0.5; space.dimension()];
        let offset = space.lookup("inertiaWeightComputingStrategy").unwrap().offset;
        vector[offset] = 1.0;
        let config = space.decode_vector(&vector).unwrap();

        assert_eq!(
            config.categorical("inertiaWeightComputingStrategy").unwrap(),
            "linearDecreasingValue"
        );
        assert!(config.is_active("weightMin"));
        assert!(config.is_active("weightMax"));
        assert!(!config.is_active("weight"));
        let required = space.required_non_configurables(&config);
        assert!(required.contains(&(
            "inertiaWeightComputingStrategy".to_string(),
            SWARM_SIZE.to_string()
        )));
    }
}
