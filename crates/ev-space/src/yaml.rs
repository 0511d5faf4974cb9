//! YAML parameter space files.
//!
//! A file is a map from parameter name to definition, in encoding order:
//!
//! ```yaml
//! crossover:
//!   type: categorical
//!   values:
//!     SBX:
//!       conditionalParameters:
//!         sbxDistributionIndex:
//!           type: real
//!           range: [5.0, 400.0]
//!     BLX_ALPHA: {}
//!   globalSubParameters:
//!     crossoverProbability:
//!       type: double
//!       range: [0.0, 1.0]
//! offspringPopulationSize:
//!   type: categorical
//!   values: [1, 2, 5, 10]
//! ```
//!
//! Fixed values are not part of the file.

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use ev_types::{ConfigError, DataError, EvError, EvResult};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::Domain;
use crate::parameter::Parameter;
use crate::space::ParameterSpace;

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

/// Name-keyed map that keeps the order of the file.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map keyed by name")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(OrderedMap::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, V)> = Vec::new();
                while let Some((Key(key), value)) = access.next_entry::<Key, V>()? {
                    if entries.iter().any(|(existing, _)| *existing == key) {
                        return Err(de::Error::custom(format!("duplicate key '{}'", key)));
                    }
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// A map key written as any YAML scalar. `true:` and `5:` key branches of
/// boolean and integer parameters.
struct Key(String);

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = Key;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a scalar key")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Key, E> {
                Ok(Key(value.to_string()))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Key, E> {
                Ok(Key(value))
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Key, E> {
                Ok(Key(value.to_string()))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Key, E> {
                Ok(Key(value.to_string()))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Key, E> {
                Ok(Key(value.to_string()))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Key, E> {
                Ok(Key(value.to_string()))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterKind {
    Categorical,
    #[serde(alias = "int")]
    Integer,
    #[serde(alias = "real")]
    Double,
    Boolean,
    RealVector,
}

/// One entry of a `values` list or a `range` bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Literal {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Real(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    fn render(&self) -> String {
        match self {
            Self::Integer(v) => v.to_string(),
            Self::Real(v) => v.to_string(),
            Self::Text(v) => v.clone(),
        }
    }
}

/// Sub-parameters active when the owner takes one value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Branch {
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub conditional_parameters: OrderedMap<ParameterDefinition>,
}

/// `values:` is either a plain list or a map from value to its branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueSet {
    List(Vec<Literal>),
    Branches(OrderedMap<Option<Branch>>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ParameterDefinition {
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<ValueSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<[Literal; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub global_sub_parameters: OrderedMap<ParameterDefinition>,
}

// ---------------------------------------------------------------------------
// Definition -> parameter tree
// ---------------------------------------------------------------------------

fn invalid(name: &str, message: impl Into<String>) -> EvError {
    ConfigError::InvalidDomain {
        parameter: name.to_string(),
        message: message.into(),
    }
    .into()
}

impl ParameterDefinition {
    pub fn to_parameter(&self, name: &str) -> EvResult<Parameter> {
        let domain = self.domain(name)?;
        let mut parameter = Parameter::new(name, domain);
        for required in &self.requires {
            parameter = parameter.requires(required);
        }
        for (child, definition) in self.global_sub_parameters.iter() {
            parameter = parameter.with_global(definition.to_parameter(child)?);
        }
        if let Some(ValueSet::Branches(branches)) = &self.values {
            for (literal, branch) in branches.iter() {
                let Some(branch) = branch else { continue };
                for (child, definition) in branch.conditional_parameters.iter() {
                    parameter = parameter.with_specific(literal, definition.to_parameter(child)?);
                }
            }
        }
        Ok(parameter)
    }

    fn domain(&self, name: &str) -> EvResult<Domain> {
        if self.dimension.is_some() && self.kind != ParameterKind::RealVector {
            return Err(invalid(name, "only realVector parameters take a dimension"));
        }
        match self.kind {
            ParameterKind::Categorical => {
                if self.range.is_some() {
                    return Err(invalid(name, "categorical parameters take values, not a range"));
                }
                match &self.values {
                    None => Err(invalid(name, "categorical parameters need values")),
                    Some(ValueSet::List(values)) => {
                        let integers: Option<Vec<i64>> = values
                            .iter()
                            .map(|v| match v {
                                Literal::Integer(i) => Some(*i),
                                _ => None,
                            })
                            .collect();
                        Ok(match integers {
                            Some(integers) => Domain::CategoricalInteger(integers),
                            None => Domain::Categorical(values.iter().map(Literal::render).collect()),
                        })
                    }
                    Some(ValueSet::Branches(branches)) => {
                        let keys: Vec<String> = branches.0.iter().map(|(k, _)| k.clone()).collect();
                        let integers: Result<Vec<i64>, _> = keys.iter().map(|k| k.parse::<i64>()).collect();
                        Ok(match integers {
                            Ok(integers) if !integers.is_empty() => Domain::CategoricalInteger(integers),
                            _ => Domain::Categorical(keys),
                        })
                    }
                }
            }
            ParameterKind::Boolean => {
                if self.range.is_some() || matches!(self.values, Some(ValueSet::List(_))) {
                    return Err(invalid(name, "boolean parameters only take value branches"));
                }
                Ok(Domain::Boolean)
            }
            ParameterKind::Integer => {
                if self.values.is_some() {
                    return Err(invalid(name, "integer parameters take a range, not values"));
                }
                match &self.range {
                    Some([Literal::Integer(lower), Literal::Integer(upper)]) => Ok(Domain::Integer {
                        lower: *lower,
                        upper: *upper,
                    }),
                    Some(_) => Err(invalid(name, "integer range bounds must be whole numbers")),
                    None => Err(invalid(name, "integer parameters need a range")),
                }
            }
            ParameterKind::Double | ParameterKind::RealVector => {
                if self.values.is_some() {
                    return Err(invalid(name, "real parameters take a range, not values"));
                }
                let (lower, upper) = match &self.range {
                    Some([lower, upper]) => match (lower.as_f64(), upper.as_f64()) {
                        (Some(lower), Some(upper)) => (lower, upper),
                        _ => return Err(invalid(name, "range bounds must be numbers")),
                    },
                    None => return Err(invalid(name, "real parameters need a range")),
                };
                if self.kind == ParameterKind::Double {
                    return Ok(Domain::Real { lower, upper });
                }
                match self.dimension {
                    Some(dimension) => Ok(Domain::RealVector {
                        lower,
                        upper,
                        dimension,
                    }),
                    None => Err(invalid(name, "realVector parameters need a dimension")),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Parameter tree -> definition
// ---------------------------------------------------------------------------

fn children(parameters: &[Parameter]) -> OrderedMap<ParameterDefinition> {
    OrderedMap(
        parameters
            .iter()
            .map(|p| (p.name.clone(), ParameterDefinition::from(p)))
            .collect(),
    )
}

impl From<&Parameter> for ParameterDefinition {
    fn from(parameter: &Parameter) -> Self {
        // Every domain value becomes a branch key so that the value order survives.
        let branches = |literals: Vec<String>| {
            ValueSet::Branches(OrderedMap(
                literals
                    .into_iter()
                    .map(|literal| {
                        let branch = Branch {
                            conditional_parameters: children(parameter.specific_for(&literal)),
                        };
                        (literal, Some(branch))
                    })
                    .collect(),
            ))
        };
        let has_branches = !parameter.specific_sub_parameters.is_empty();

        let (kind, values, range, dimension) = match &parameter.domain {
            Domain::Categorical(values) => {
                let values = if has_branches {
                    branches(values.clone())
                } else {
                    ValueSet::List(values.iter().cloned().map(Literal::Text).collect())
                };
                (ParameterKind::Categorical, Some(values), None, None)
            }
            Domain::CategoricalInteger(values) => {
                let values = if has_branches {
                    branches(values.iter().map(|v| v.to_string()).collect())
                } else {
                    ValueSet::List(values.iter().copied().map(Literal::Integer).collect())
                };
                (ParameterKind::Categorical, Some(values), None, None)
            }
            Domain::Boolean => {
                let values = has_branches.then(|| {
                    branches(
                        parameter
                            .specific_sub_parameters
                            .iter()
                            .map(|(literal, _)| literal.clone())
                            .collect(),
                    )
                });
                (ParameterKind::Boolean, values, None, None)
            }
            Domain::Integer { lower, upper } => (
                ParameterKind::Integer,
                None,
                Some([Literal::Integer(*lower), Literal::Integer(*upper)]),
                None,
            ),
            Domain::Real { lower, upper } => (
                ParameterKind::Double,
                None,
                Some([Literal::Real(*lower), Literal::Real(*upper)]),
                None,
            ),
            Domain::RealVector {
                lower,
                upper,
                dimension,
            } => (
                ParameterKind::RealVector,
                None,
                Some([Literal::Real(*lower), Literal::Real(*upper)]),
                Some(*dimension),
            ),
        };

        Self {
            kind,
            values,
            range,
            dimension,
            requires: parameter.non_configurable.clone(),
            global_sub_parameters: children(&parameter.global_sub_parameters),
        }
    }
}

// ---------------------------------------------------------------------------
// ParameterSpace entry points
// ---------------------------------------------------------------------------

impl ParameterSpace {
    /// Build a space from YAML text.
    pub fn from_yaml_str(name: impl Into<String>, text: &str) -> EvResult<Self> {
        let definitions: OrderedMap<ParameterDefinition> =
            serde_yaml::from_str(text).map_err(|e| DataError::InvalidFormat {
                message: e.to_string(),
            })?;
        Self::from_definitions(name, &definitions)
    }

    /// Build a space from a YAML file; the file stem names the space.
    pub fn from_yaml_file<P: AsRef<Path>>(file_path: P) -> EvResult<Self> {
        let path = file_path.as_ref();
        tracing::info!("Loading parameter space from: {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|_| DataError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let definitions: OrderedMap<ParameterDefinition> =
            serde_yaml::from_str(&text).map_err(|e| DataError::ParseError {
                path: path.display().to_string(),
                line: e.location().map(|l| l.line()).unwrap_or(0),
                message: e.to_string(),
            })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_definitions(name, &definitions)
    }

    pub fn from_definitions(
        name: impl Into<String>,
        definitions: &OrderedMap<ParameterDefinition>,
    ) -> EvResult<Self> {
        if definitions.is_empty() {
            return Err(DataError::InvalidFormat {
                message: "parameter space file declares no parameters".to_string(),
            }
            .into());
        }
        let top_level = definitions
            .iter()
            .map(|(key, definition)| definition.to_parameter(key))
            .collect::<EvResult<Vec<_>>>()?;
        Self::new(name, top_level)
    }

    pub fn to_definitions(&self) -> OrderedMap<ParameterDefinition> {
        children(self.top_level())
    }

    /// The parameter tree as YAML that [`from_yaml_str`](Self::from_yaml_str)
    /// reads back.
    pub fn to_yaml(&self) -> EvResult<String> {
        serde_yaml::to_string(&self.to_definitions()).map_err(|e| {
            DataError::WritingFailed {
                message: e.to_string(),
            }
            .into()
        })
    }
}
