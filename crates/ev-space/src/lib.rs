//! # ev-space
//!
//! Hierarchical parameter spaces for configurable metaheuristics.
//!
//! A [`ParameterSpace`] flattens a tree of [`Parameter`]s with conditional
//! sub-parameters into a fixed-length encoding. Both a token list
//! (`--name value ...`) and a vector of fractions in `[0, 1]` decode into an
//! immutable [`AlgorithmConfiguration`] holding the active parameter values.
//!
//! Spaces load from and write to YAML, and render as irace parameter files.

pub mod catalogue;
mod configuration;
mod domain;
mod irace;
mod parameter;
mod space;
mod value;
mod yaml;

pub use configuration::AlgorithmConfiguration;
pub use domain::Domain;
pub use parameter::Parameter;
pub use space::{FlatParameter, ParameterSpace};
pub use value::ParameterValue;
pub use yaml::{Branch, Literal, OrderedMap, ParameterDefinition, ParameterKind, ValueSet};
