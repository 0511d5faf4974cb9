use ev_types::EvResult;

use crate::space::ParameterSpace;
use crate::value::ParameterValue;

use super::common::{create_initial_solutions, selection};
use super::nsgaii::{algorithm_result_with_archive, crossover_and_mutation_variation};
use super::OFFSPRING_POPULATION_SIZE;

/// Steady-state variant of the NSGA-II space: one offspring per step.
pub fn smsemoa_space() -> EvResult<ParameterSpace> {
    ParameterSpace::with_fixed(
        "SMSEMOA",
        vec![
            algorithm_result_with_archive(),
            create_initial_solutions("createInitialSolutions"),
            crossover_and_mutation_variation(),
            selection(),
        ],
        vec![(OFFSPRING_POPULATION_SIZE.to_string(), ParameterValue::Int(1))],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offspring_size_is_pinned() {
        let space = smsemoa_space().unwrap();
        assert_eq!(space.dimension(), 19);
        let config = space.decode_vector(&vec![0.25; space.dimension()]).unwrap();
        assert_eq!(config.positive(OFFSPRING_POPULATION_SIZE).unwrap(), 1);
    }
}
