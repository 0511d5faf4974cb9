use std::collections::BTreeMap;

use ev_types::{BuildError, EvResult};
use serde::{Deserialize, Serialize};

use crate::value::ParameterValue;

/// The immutable result of one decode pass.
///
/// `values` holds every value the decode produced, including coordinates of
/// inactive branches. `active` lists, in encoding order, the names reachable
/// from the chosen branches; only those are readable through the typed
/// accessors the builder uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmConfiguration {
    family: String,
    values: BTreeMap<String, ParameterValue>,
    active: Vec<String>,
}

impl AlgorithmConfiguration {
    pub(crate) fn new(
        family: String,
        values: BTreeMap<String, ParameterValue>,
        active: Vec<String>,
    ) -> Self {
        Self {
            family,
            values,
            active,
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.iter().any(|n| n == name)
    }

    /// Active parameter names in encoding order.
    pub fn active_names(&self) -> &[String] {
        &self.active
    }

    /// Every decoded value, active or not.
    pub fn decoded_value(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    /// The value of an active parameter.
    pub fn get(&self, name: &str) -> EvResult<&ParameterValue> {
        if !self.is_active(name) {
            return Err(if self.values.contains_key(name) {
                BuildError::Inactive {
                    parameter: name.to_string(),
                }
            } else {
                BuildError::NotDecoded {
                    parameter: name.to_string(),
                }
            }
            .into());
        }
        self.values.get(name).ok_or_else(|| {
            BuildError::NotDecoded {
                parameter: name.to_string(),
            }
            .into()
        })
    }

    pub fn categorical(&self, name: &str) -> EvResult<&str> {
        match self.get(name)? {
            ParameterValue::Categorical(v) => Ok(v.as_str()),
            other => Err(wrong_kind(name, "categorical", other)),
        }
    }

    pub fn integer(&self, name: &str) -> EvResult<i64> {
        match self.get(name)? {
            ParameterValue::Int(v) => Ok(*v),
            other => Err(wrong_kind(name, "integer", other)),
        }
    }

    /// Integer value that must be at least one.
    pub fn positive(&self, name: &str) -> EvResult<usize> {
        let value = self.integer(name)?;
        if value < 1 {
            return Err(BuildError::UnsupportedValue {
                parameter: name.to_string(),
                value: value.to_string(),
            }
            .into());
        }
        Ok(value as usize)
    }

    /// Real value. Integers are widened.
    pub fn real(&self, name: &str) -> EvResult<f64> {
        match self.get(name)? {
            ParameterValue::Real(v) => Ok(*v),
            ParameterValue::Int(v) => Ok(*v as f64),
            other => Err(wrong_kind(name, "real", other)),
        }
    }

    pub fn boolean(&self, name: &str) -> EvResult<bool> {
        match self.get(name)? {
            ParameterValue::Bool(v) => Ok(*v),
            other => Err(wrong_kind(name, "boolean", other)),
        }
    }

    pub fn real_vector(&self, name: &str) -> EvResult<&[f64]> {
        match self.get(name)? {
            ParameterValue::RealVector(v) => Ok(v.as_slice()),
            other => Err(wrong_kind(name, "real vector", other)),
        }
    }

    /// Active parameters as `--name value` tokens.
    pub fn to_tokens(&self) -> Vec<String> {
        self.active
            .iter()
            .filter_map(|name| self.values.get(name).map(|v| (name, v)))
            .flat_map(|(name, value)| [format!("--{}", name), value.literal()])
            .collect()
    }

    pub fn to_token_string(&self) -> String {
        self.to_tokens().join(" ")
    }

    /// Active parameters as a JSON object in name order.
    pub fn to_json(&self) -> EvResult<String> {
        let active: BTreeMap<&str, &ParameterValue> = self
            .active
            .iter()
            .filter_map(|name| self.values.get(name).map(|v| (name.as_str(), v)))
            .collect();
        Ok(serde_json::to_string(&active)?)
    }
}

impl std::fmt::Display for AlgorithmConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_token_string())
    }
}

fn wrong_kind(name: &str, expected: &str, found: &ParameterValue) -> ev_types::EvError {
    BuildError::WrongValueKind {
        parameter: name.to_string(),
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_configuration() -> AlgorithmConfiguration {
        let mut values = BTreeMap::new();
        values.insert("crossover".to_string(), ParameterValue::from("SBX"));
        values.insert("sbxDistributionIndex".to_string(), ParameterValue::Real(20.0));
        values.insert("blxAlpha".to_string(), ParameterValue::Real(0.5));
        values.insert("offspringPopulationSize".to_string(), ParameterValue::Int(100));
        AlgorithmConfiguration::new(
            "NSGAII".to_string(),
            values,
            vec![
                "offspringPopulationSize".to_string(),
                "crossover".to_string(),
                "sbxDistributionIndex".to_string(),
            ],
        )
    }

    #[test]
    fn test_typed_accessors() {
        let config = sample_configuration();
        assert_eq!(config.categorical("crossover").unwrap(), "SBX");
        assert_eq!(config.real("sbxDistributionIndex").unwrap(), 20.0);
        assert_eq!(config.positive("offspringPopulationSize").unwrap(), 100);
        assert_eq!(config.real("offspringPopulationSize").unwrap(), 100.0);
        assert!(config.integer("crossover").is_err());
    }

    #[test]
    fn test_inactive_values_are_not_readable() {
        let config = sample_configuration();
        assert_eq!(
            config.decoded_value("blxAlpha"),
            Some(&ParameterValue::Real(0.5))
        );
        match config.real("blxAlpha") {
            Err(ev_types::EvError::Build(BuildError::Inactive { parameter })) => {
                assert_eq!(parameter, "blxAlpha")
            }
            other => panic!("Expected inactive error, got {:?}", other),
        }
        assert!(matches!(
            config.real("mutation"),
            Err(ev_types::EvError::Build(BuildError::NotDecoded { .. }))
        ));
    }

    #[test]
    fn test_rendering() {
        let config = sample_configuration();
        assert_eq!(
            config.to_token_string(),
            "--offspringPopulationSize 100 --crossover SBX --sbxDistributionIndex 20"
        );
        let json: serde_json::Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(json["crossover"], "SBX");
        assert!(json.get("blxAlpha").is_none());
    }
}
