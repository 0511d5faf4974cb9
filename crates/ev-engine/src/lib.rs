//! # ev-engine
//!
//! Configurable multi-objective metaheuristics. Each family exposes a
//! parameter space and assembles a runnable [`Algorithm`] from a decoded
//! configuration through the [`ConfigurableAlgorithmBuilder`].

pub mod algorithm;
pub mod builder;
pub mod components;
pub mod families;

pub use algorithm::{Algorithm, ResultSource};
pub use builder::{AlgorithmFamily, BuildContext, ConfigurableAlgorithmBuilder, DecodedBuilder};
pub use families::{family_for_name, Moead, Mopso, NsgaII, SmsEmoa};
