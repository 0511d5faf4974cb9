//! Inner building blocks the builder assembles into runnable algorithms.

pub mod aggregation;
pub mod archive;
pub mod crossover;
pub mod differential_evolution;
pub mod evaluation;
pub mod initialization;
pub mod mutation;
pub mod neighborhood;
pub mod pso;
pub mod ranking;
pub mod repair;
pub mod replacement;
pub mod selection;
pub mod termination;
pub mod variation;

pub use aggregation::{AggregationFunction, AggregationKind, ReferencePoints};
pub use archive::{Archive, ArchiveKind};
pub use crossover::{Crossover, CrossoverKind};
pub use differential_evolution::{DeVariant, DifferentialEvolutionCrossover};
pub use evaluation::Evaluation;
pub use initialization::SolutionsCreation;
pub use mutation::{Mutation, MutationKind};
pub use ranking::{crowding_distance, fast_non_dominated_sort, RankingAndCrowding};
pub use repair::RepairStrategy;
pub use replacement::Replacement;
pub use selection::{MatingSelection, NeighborType, NeighborhoodSelection};
pub use termination::TerminationByEvaluations;
pub use variation::Variation;

use ev_types::{BuildError, EvError};

/// A categorical value with no matching component.
pub(crate) fn unknown_component(kind: &str, name: &str) -> EvError {
    BuildError::UnsupportedValue {
        parameter: kind.to_string(),
        value: name.to_string(),
    }
    .into()
}
