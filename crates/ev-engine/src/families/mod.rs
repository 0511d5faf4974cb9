//! Algorithm families the builder can assemble.

mod common;
mod evolutionary;
mod moead;
mod mopso;
mod nsgaii;
mod smsemoa;

use std::sync::Arc;

use ev_space::catalogue::canonical_family;
use ev_types::{BuildError, EvError, EvResult};

use crate::builder::AlgorithmFamily;

pub use evolutionary::EvolutionaryAlgorithm;
pub use moead::{Moead, MoeadAlgorithm};
pub use mopso::{Mopso, MopsoAlgorithm};
pub use nsgaii::NsgaII;
pub use smsemoa::SmsEmoa;

pub(crate) fn unsupported(parameter: &str, value: &str) -> EvError {
    BuildError::UnsupportedValue {
        parameter: parameter.to_string(),
        value: value.to_string(),
    }
    .into()
}

/// Resolves a configurable algorithm by name. Separators and case are
/// ignored, so `nsga-ii` and `NSGAII` name the same family.
pub fn family_for_name(name: &str) -> EvResult<Arc<dyn AlgorithmFamily>> {
    let family: Arc<dyn AlgorithmFamily> = match canonical_family(name)? {
        "NSGAII" => Arc::new(NsgaII::new()?),
        "MOEAD" => Arc::new(Moead::new()?),
        "MOPSO" => Arc::new(Mopso::new()?),
        "SMSEMOA" => Arc::new(SmsEmoa::new()?),
        other => return Err(unsupported("configurable algorithm", other)),
    };
    Ok(family)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_lookup() {
        for (name, expected) in [
            ("NSGAII", "NSGAII"),
            ("nsga-ii", "NSGAII"),
            ("MOEAD", "MOEAD"),
            ("mopso", "MOPSO"),
            ("SMS_EMOA", "SMSEMOA"),
        ] {
            let family = family_for_name(name).unwrap();
            assert_eq!(family.name(), expected);
            assert_eq!(family.parameter_space().name(), expected);
        }
        assert!(family_for_name("GDE3").is_err());
    }
}
