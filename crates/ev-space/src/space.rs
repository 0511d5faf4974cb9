//! Parameter spaces and the two decoders.

use std::collections::{BTreeMap, HashMap};

use ev_types::{ConfigError, EvResult};
use serde::Serialize;

use crate::configuration::AlgorithmConfiguration;
use crate::domain::Domain;
use crate::parameter::Parameter;
use crate::value::ParameterValue;

/// One entry of the flattened encoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatParameter {
    pub name: String,
    pub domain: Domain,
    /// Index of the first coordinate this parameter reads.
    pub offset: usize,
}

/// An immutable catalogue of top-level parameters for one algorithm family.
///
/// The flattened list fixes the encoding length: every parameter of every
/// branch owns its coordinates whether or not a decode later activates it.
/// Spaces are shared freely between threads; decoding never mutates them.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSpace {
    name: String,
    top_level: Vec<Parameter>,
    fixed: Vec<(String, ParameterValue)>,
    flattened: Vec<FlatParameter>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    dimension: usize,
}

impl ParameterSpace {
    pub fn new(name: impl Into<String>, top_level: Vec<Parameter>) -> EvResult<Self> {
        Self::with_fixed(name, top_level, Vec::new())
    }

    /// A space whose `fixed` values are part of every configuration but not of
    /// the encoding.
    pub fn with_fixed(
        name: impl Into<String>,
        top_level: Vec<Parameter>,
        fixed: Vec<(String, ParameterValue)>,
    ) -> EvResult<Self> {
        let name = name.into();
        let mut flattened: Vec<FlatParameter> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut dimension = 0;

        for parameter in top_level.iter().flat_map(|p| p.flatten()) {
            parameter.domain.validate(&parameter.name)?;
            for (literal, _) in &parameter.specific_sub_parameters {
                parameter.domain.parse_literal(&parameter.name, literal)?;
            }
            if let Some(&existing) = index.get(&parameter.name) {
                if flattened[existing].domain != parameter.domain {
                    return Err(ConfigError::ConflictingDeclaration {
                        name: parameter.name.clone(),
                    }
                    .into());
                }
                continue;
            }
            index.insert(parameter.name.clone(), flattened.len());
            flattened.push(FlatParameter {
                name: parameter.name.clone(),
                domain: parameter.domain.clone(),
                offset: dimension,
            });
            dimension += parameter.domain.coordinates();
        }

        for (fixed_name, _) in &fixed {
            if index.contains_key(fixed_name) {
                return Err(ConfigError::ConflictingDeclaration {
                    name: fixed_name.clone(),
                }
                .into());
            }
        }

        tracing::info!(
            space = %name,
            parameters = flattened.len(),
            dimension,
            fixed = fixed.len(),
            "Parameter space built"
        );

        Ok(Self {
            name,
            top_level,
            fixed,
            flattened,
            index,
            dimension,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn top_level(&self) -> &[Parameter] {
        &self.top_level
    }

    pub fn flattened(&self) -> &[FlatParameter] {
        &self.flattened
    }

    pub fn fixed(&self) -> &[(String, ParameterValue)] {
        &self.fixed
    }

    /// Length of the real-vector encoding.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.flattened.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn lookup(&self, name: &str) -> Option<&FlatParameter> {
        self.index.get(name).map(|&i| &self.flattened[i])
    }

    // -----------------------------------------------------------------------
    // Vector decode
    // -----------------------------------------------------------------------

    /// Decode a vector of fractions. Every flattened parameter is decoded;
    /// only the branches selected by the decoded values become active.
    pub fn decode_vector(&self, vector: &[f64]) -> EvResult<AlgorithmConfiguration> {
        if vector.len() != self.dimension {
            return Err(ConfigError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            }
            .into());
        }

        let mut values = BTreeMap::new();
        for parameter in &self.flattened {
            let end = parameter.offset + parameter.domain.coordinates();
            let fractions = &vector[parameter.offset..end];
            if let Some(bad) = fractions
                .iter()
                .find(|f| !f.is_finite() || **f < 0.0 || **f > 1.0)
            {
                return Err(ConfigError::FractionOutOfRange {
                    parameter: parameter.name.clone(),
                    value: *bad,
                }
                .into());
            }
            values.insert(parameter.name.clone(), parameter.domain.decode(fractions));
        }

        let active = self.resolve_active(&values)?;
        Ok(AlgorithmConfiguration::new(
            self.name.clone(),
            self.with_fixed_values(values),
            active,
        ))
    }

    // -----------------------------------------------------------------------
    // Token decode
    // -----------------------------------------------------------------------

    /// Decode `--name value` pairs. Every active parameter must be given;
    /// tokens for inactive branches are checked against their domains and
    /// kept as inactive values.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> EvResult<AlgorithmConfiguration> {
        let mut values = BTreeMap::new();
        let mut chunks = tokens.iter().map(|t| t.as_ref());

        while let Some(flag) = chunks.next() {
            let name = flag.strip_prefix("--").filter(|n| !n.is_empty()).ok_or_else(|| {
                ConfigError::MalformedTokens {
                    message: format!("expected '--name', found '{}'", flag),
                }
            })?;
            let literal = chunks.next().ok_or_else(|| ConfigError::MalformedTokens {
                message: format!("missing value after '{}'", flag),
            })?;
            if values.contains_key(name) {
                return Err(ConfigError::MalformedTokens {
                    message: format!("parameter '{}' given more than once", name),
                }
                .into());
            }

            if let Some((_, pinned)) = self.fixed.iter().find(|(n, _)| n == name) {
                if pinned.literal() != literal {
                    return Err(ConfigError::InvalidValue {
                        parameter: name.to_string(),
                        value: literal.to_string(),
                        reason: format!("fixed to {}", pinned),
                    }
                    .into());
                }
                continue;
            }

            let parameter = self
                .lookup(name)
                .ok_or_else(|| ConfigError::UnknownParameter {
                    name: name.to_string(),
                })?;
            let value = parameter.domain.parse_literal(name, literal)?;
            values.insert(name.to_string(), value);
        }

        let active = self.resolve_active(&values)?;
        Ok(AlgorithmConfiguration::new(
            self.name.clone(),
            self.with_fixed_values(values),
            active,
        ))
    }

    /// Split a whitespace separated token string and parse it.
    pub fn parse_str(&self, text: &str) -> EvResult<AlgorithmConfiguration> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        self.parse(&tokens)
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// One number per flattened coordinate: categorical index or interval
    /// value. Parameters without a decoded value render as NaN.
    pub fn numeric_row(&self, configuration: &AlgorithmConfiguration) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.dimension);
        for parameter in &self.flattened {
            match configuration.decoded_value(&parameter.name) {
                Some(value) => row.extend(parameter.domain.to_numeric(value)),
                None => row.extend(std::iter::repeat(f64::NAN).take(parameter.domain.coordinates())),
            }
        }
        row
    }

    /// Header matching [`numeric_row`](Self::numeric_row); vector parameters
    /// get one indexed column per coordinate.
    pub fn numeric_header(&self) -> Vec<String> {
        self.flattened
            .iter()
            .flat_map(|p| match p.domain.coordinates() {
                1 => vec![p.name.clone()],
                n => (0..n).map(|i| format!("{}[{}]", p.name, i)).collect(),
            })
            .collect()
    }

    /// Fractions that decode to the active values of `configuration`.
    /// Inactive or missing coordinates are set to 0.5.
    pub fn encode(&self, configuration: &AlgorithmConfiguration) -> Vec<f64> {
        let mut vector = vec![0.5; self.dimension];
        for parameter in &self.flattened {
            let encoded = configuration
                .decoded_value(&parameter.name)
                .and_then(|value| parameter.domain.encode(value));
            if let Some(fractions) = encoded {
                vector[parameter.offset..parameter.offset + fractions.len()]
                    .copy_from_slice(&fractions);
            }
        }
        vector
    }

    /// The flattened parameter tree as pretty JSON.
    pub fn describe(&self) -> EvResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `(owner, name)` pairs of every non-configurable value the active
    /// parameters of `configuration` declare.
    pub fn required_non_configurables(
        &self,
        configuration: &AlgorithmConfiguration,
    ) -> Vec<(String, String)> {
        let mut required = Vec::new();
        for parameter in self.top_level.iter().flat_map(|p| p.flatten()) {
            if !configuration.is_active(&parameter.name) {
                continue;
            }
            for name in &parameter.non_configurable {
                let pair = (parameter.name.clone(), name.clone());
                if !required.contains(&pair) {
                    required.push(pair);
                }
            }
        }
        required
    }

    // -----------------------------------------------------------------------
    // Active branch resolution
    // -----------------------------------------------------------------------

    fn value_of<'a>(
        &'a self,
        name: &str,
        values: &'a BTreeMap<String, ParameterValue>,
    ) -> Option<&'a ParameterValue> {
        self.fixed
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .or_else(|| values.get(name))
    }

    fn resolve_active(&self, values: &BTreeMap<String, ParameterValue>) -> EvResult<Vec<String>> {
        let mut active: Vec<String> = self.fixed.iter().map(|(n, _)| n.clone()).collect();
        for parameter in &self.top_level {
            self.activate(parameter, None, values, &mut active)?;
        }
        Ok(active)
    }

    /// `branch` names the parent and literal that selected this parameter.
    fn activate(
        &self,
        parameter: &Parameter,
        branch: Option<(&str, &str)>,
        values: &BTreeMap<String, ParameterValue>,
        active: &mut Vec<String>,
    ) -> EvResult<()> {
        let value = self.value_of(&parameter.name, values).ok_or_else(|| match branch {
            Some((parent, literal)) => ConfigError::MissingSpecificSubParameter {
                parameter: parent.to_string(),
                value: literal.to_string(),
                sub_parameter: parameter.name.clone(),
            },
            None => ConfigError::MissingParameter {
                name: parameter.name.clone(),
            },
        })?;
        if !active.contains(&parameter.name) {
            active.push(parameter.name.clone());
        }

        for global in &parameter.global_sub_parameters {
            self.activate(global, branch, values, active)?;
        }
        let literal = value.literal();
        for child in parameter.specific_for(&literal) {
            self.activate(
                child,
                Some((parameter.name.as_str(), literal.as_str())),
                values,
                active,
            )?;
        }
        Ok(())
    }

    fn with_fixed_values(
        &self,
        mut values: BTreeMap<String, ParameterValue>,
    ) -> BTreeMap<String, ParameterValue> {
        for (name, value) in &self.fixed {
            values.insert(name.clone(), value.clone());
        }
        values
    }
}
