use serde::{Deserialize, Serialize};

use crate::domain::Domain;

/// A named tunable with optional conditional children.
///
/// Global sub-parameters are active whenever this parameter is active.
/// Specific sub-parameters are keyed by a literal value of this parameter and
/// are active only when the decoded value renders to that literal.
/// Non-configurable names list values the builder must inject before the
/// component owning this parameter is assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub domain: Domain,
    pub global_sub_parameters: Vec<Parameter>,
    pub specific_sub_parameters: Vec<(String, Vec<Parameter>)>,
    pub non_configurable: Vec<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, domain: Domain) -> Self {
        Self {
            name: name.into(),
            domain,
            global_sub_parameters: Vec::new(),
            specific_sub_parameters: Vec::new(),
            non_configurable: Vec::new(),
        }
    }

    pub fn categorical(name: impl Into<String>, values: &[&str]) -> Self {
        Self::new(name, Domain::categorical(values))
    }

    pub fn categorical_integer(name: impl Into<String>, values: &[i64]) -> Self {
        Self::new(name, Domain::CategoricalInteger(values.to_vec()))
    }

    pub fn real(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self::new(name, Domain::Real { lower, upper })
    }

    pub fn integer(name: impl Into<String>, lower: i64, upper: i64) -> Self {
        Self::new(name, Domain::Integer { lower, upper })
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, Domain::Boolean)
    }

    pub fn real_vector(name: impl Into<String>, lower: f64, upper: f64, dimension: usize) -> Self {
        Self::new(
            name,
            Domain::RealVector {
                lower,
                upper,
                dimension,
            },
        )
    }

    pub fn with_global(mut self, parameter: Parameter) -> Self {
        self.global_sub_parameters.push(parameter);
        self
    }

    /// Attach a sub-parameter active only when this parameter equals `value`.
    pub fn with_specific(mut self, value: &str, parameter: Parameter) -> Self {
        match self
            .specific_sub_parameters
            .iter_mut()
            .find(|(key, _)| key == value)
        {
            Some((_, children)) => children.push(parameter),
            None => self
                .specific_sub_parameters
                .push((value.to_string(), vec![parameter])),
        }
        self
    }

    /// Declare a value that must be injected at build time.
    pub fn requires(mut self, non_configurable: &str) -> Self {
        self.non_configurable.push(non_configurable.to_string());
        self
    }

    pub fn specific_for(&self, literal: &str) -> &[Parameter] {
        self.specific_sub_parameters
            .iter()
            .find(|(key, _)| key == literal)
            .map(|(_, children)| children.as_slice())
            .unwrap_or(&[])
    }

    /// Depth-first flattening: this parameter, its globals, then every
    /// specific branch in declaration order.
    pub fn flatten(&self) -> Vec<&Parameter> {
        let mut out = vec![self];
        for global in &self.global_sub_parameters {
            out.extend(global.flatten());
        }
        for (_, children) in &self.specific_sub_parameters {
            for child in children {
                out.extend(child.flatten());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_crossover() -> Parameter {
        Parameter::categorical("crossover", &["SBX", "BLX_ALPHA"])
            .with_global(Parameter::real("crossoverProbability", 0.0, 1.0))
            .with_specific("SBX", Parameter::real("sbxDistributionIndex", 5.0, 400.0))
            .with_specific("BLX_ALPHA", Parameter::real("blxAlpha", 0.0, 1.0))
            .with_specific("SBX", Parameter::boolean("sbxSymmetric"))
    }

    #[test]
    fn test_flatten_order() {
        let crossover = sample_crossover();
        let names: Vec<&str> = crossover.flatten().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "crossover",
                "crossoverProbability",
                "sbxDistributionIndex",
                "sbxSymmetric",
                "blxAlpha"
            ]
        );
    }

    #[test]
    fn test_specific_lookup() {
        let crossover = sample_crossover();
        assert_eq!(crossover.specific_for("SBX").len(), 2);
        assert_eq!(crossover.specific_for("BLX_ALPHA")[0].name, "blxAlpha");
        assert!(crossover.specific_for("wholeArithmetic").is_empty());
    }
}
