//! Parameter catalogues for the configurable algorithm families.
//!
//! Each family exposes one full parameter space. NSGA-II also has a compact
//! four-dimensional space with the structural choices pinned.

mod common;
mod moead;
mod mopso;
mod nsgaii;
mod smsemoa;

pub use common::{
    create_initial_solutions, crossover, external_archive_type, mutation, repair_strategy,
    selection,
};
pub use moead::moead_space;
pub use mopso::mopso_space;
pub use nsgaii::{nsgaii_compact_space, nsgaii_space};
pub use smsemoa::smsemoa_space;

use ev_types::{ConfigError, EvResult};

use crate::space::ParameterSpace;

// ----------------------------------------------------------------------------
// Non-configurable values injected by the builder
// ----------------------------------------------------------------------------

pub const NUMBER_OF_PROBLEM_VARIABLES: &str = "numberOfProblemVariables";
pub const MAX_ITERATIONS: &str = "maxIterations";
pub const OFFSPRING_POPULATION_SIZE: &str = "offspringPopulationSize";
pub const MATING_POOL_SIZE: &str = "matingPoolSize";
pub const POPULATION_SIZE: &str = "populationSize";
pub const SWARM_SIZE: &str = "swarmSize";

pub const FAMILY_NAMES: [&str; 4] = ["NSGAII", "MOEAD", "MOPSO", "SMSEMOA"];

/// Canonical family name, accepting any case and an optional `-` separator.
pub fn canonical_family(name: &str) -> EvResult<&'static str> {
    let normalized: String = name
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_ascii_uppercase();
    FAMILY_NAMES
        .iter()
        .find(|family| **family == normalized)
        .copied()
        .ok_or_else(|| {
            ConfigError::UnknownName {
                kind: "configurable algorithm".to_string(),
                name: name.to_string(),
            }
            .into()
        })
}

/// Full parameter space of a family.
pub fn space_for(family: &str) -> EvResult<ParameterSpace> {
    match canonical_family(family)? {
        "NSGAII" => nsgaii_space(),
        "MOEAD" => moead_space(),
        "MOPSO" => mopso_space(),
        _ => smsemoa_space(),
    }
}
