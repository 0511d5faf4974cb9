use ev_types::{ConfigError, EvResult};
use serde::{Deserialize, Serialize};

use crate::value::ParameterValue;

/// The set of values a parameter may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Domain {
    /// Finite ordered set of names.
    Categorical(Vec<String>),
    /// Finite ordered set of integers.
    CategoricalInteger(Vec<i64>),
    /// Continuous interval [lower, upper].
    Real { lower: f64, upper: f64 },
    /// Integer interval [lower, upper] inclusive.
    Integer { lower: i64, upper: i64 },
    /// Two-valued categorical (`false`, `true`).
    Boolean,
    /// Fixed-size vector of reals, each in [lower, upper].
    RealVector {
        lower: f64,
        upper: f64,
        dimension: usize,
    },
}

impl Domain {
    pub fn categorical(values: &[&str]) -> Self {
        Self::Categorical(values.iter().map(|v| v.to_string()).collect())
    }

    /// Number of encoding coordinates consumed.
    pub fn coordinates(&self) -> usize {
        match self {
            Self::RealVector { dimension, .. } => *dimension,
            _ => 1,
        }
    }

    pub fn validate(&self, parameter: &str) -> EvResult<()> {
        let invalid = |message: &str| -> EvResult<()> {
            Err(ConfigError::InvalidDomain {
                parameter: parameter.to_string(),
                message: message.to_string(),
            }
            .into())
        };
        match self {
            Self::Categorical(values) if values.is_empty() => invalid("no categorical values"),
            Self::CategoricalInteger(values) if values.is_empty() => invalid("no integer values"),
            Self::Real { lower, upper } | Self::RealVector { lower, upper, .. }
                if !(lower.is_finite() && upper.is_finite() && lower <= upper) =>
            {
                invalid("bounds must be finite with lower <= upper")
            }
            Self::RealVector { dimension: 0, .. } => invalid("vector dimension must be positive"),
            Self::Integer { lower, upper } if lower > upper => invalid("lower bound exceeds upper bound"),
            _ => Ok(()),
        }
    }

    /// Map fractions in [0, 1] to a value. Callers supply exactly
    /// [`coordinates`](Self::coordinates) fractions.
    pub fn decode(&self, fractions: &[f64]) -> ParameterValue {
        let f = fractions.first().copied().unwrap_or(0.0);
        match self {
            Self::Categorical(values) => {
                ParameterValue::Categorical(values[categorical_index(f, values.len())].clone())
            }
            Self::CategoricalInteger(values) => {
                ParameterValue::Int(values[categorical_index(f, values.len())])
            }
            Self::Boolean => ParameterValue::Bool(categorical_index(f, 2) == 1),
            Self::Real { lower, upper } => ParameterValue::Real(interpolate(f, *lower, *upper)),
            Self::Integer { lower, upper } => {
                let span = (upper - lower + 1) as f64;
                let value = lower + (f * span).floor() as i64;
                ParameterValue::Int(value.min(*upper))
            }
            Self::RealVector { lower, upper, .. } => ParameterValue::RealVector(
                fractions
                    .iter()
                    .map(|f| interpolate(*f, *lower, *upper))
                    .collect(),
            ),
        }
    }

    /// Parse a textual literal against this domain.
    pub fn parse_literal(&self, parameter: &str, literal: &str) -> EvResult<ParameterValue> {
        let reject = |reason: String| -> EvResult<ParameterValue> {
            Err(ConfigError::InvalidValue {
                parameter: parameter.to_string(),
                value: literal.to_string(),
                reason,
            }
            .into())
        };
        match self {
            Self::Categorical(values) => {
                if values.iter().any(|v| v == literal) {
                    Ok(ParameterValue::Categorical(literal.to_string()))
                } else {
                    reject(format!("expected one of {}", values.join(", ")))
                }
            }
            Self::CategoricalInteger(values) => match literal.parse::<i64>() {
                Ok(v) if values.contains(&v) => Ok(ParameterValue::Int(v)),
                _ => reject(format!("expected one of {:?}", values)),
            },
            Self::Boolean => match literal.to_ascii_lowercase().as_str() {
                "true" => Ok(ParameterValue::Bool(true)),
                "false" => Ok(ParameterValue::Bool(false)),
                _ => reject("expected true or false".to_string()),
            },
            Self::Real { lower, upper } => match literal.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= *lower && v <= *upper => Ok(ParameterValue::Real(v)),
                _ => reject(format!("expected a real in [{}, {}]", lower, upper)),
            },
            Self::Integer { lower, upper } => match literal.parse::<i64>() {
                Ok(v) if v >= *lower && v <= *upper => Ok(ParameterValue::Int(v)),
                _ => reject(format!("expected an integer in [{}, {}]", lower, upper)),
            },
            Self::RealVector {
                lower,
                upper,
                dimension,
            } => {
                let parsed: Result<Vec<f64>, _> =
                    literal.split(',').map(|v| v.trim().parse::<f64>()).collect();
                match parsed {
                    Ok(values)
                        if values.len() == *dimension
                            && values
                                .iter()
                                .all(|v| v.is_finite() && v >= lower && v <= upper) =>
                    {
                        Ok(ParameterValue::RealVector(values))
                    }
                    _ => reject(format!(
                        "expected {} comma separated reals in [{}, {}]",
                        dimension, lower, upper
                    )),
                }
            }
        }
    }

    /// True when `value` belongs to this domain.
    pub fn contains(&self, value: &ParameterValue) -> bool {
        match (self, value) {
            (Self::Categorical(values), ParameterValue::Categorical(v)) => values.contains(v),
            (Self::CategoricalInteger(values), ParameterValue::Int(v)) => values.contains(v),
            (Self::Boolean, ParameterValue::Bool(_)) => true,
            (Self::Real { lower, upper }, ParameterValue::Real(v)) => v >= lower && v <= upper,
            (Self::Integer { lower, upper }, ParameterValue::Int(v)) => v >= lower && v <= upper,
            (
                Self::RealVector {
                    lower,
                    upper,
                    dimension,
                },
                ParameterValue::RealVector(values),
            ) => values.len() == *dimension && values.iter().all(|v| v >= lower && v <= upper),
            _ => false,
        }
    }

    /// Numeric rendering: the index for finite sets, the value for intervals.
    pub fn to_numeric(&self, value: &ParameterValue) -> Vec<f64> {
        match (self, value) {
            (Self::Categorical(values), ParameterValue::Categorical(v)) => {
                vec![values.iter().position(|x| x == v).map_or(f64::NAN, |i| i as f64)]
            }
            (Self::CategoricalInteger(values), ParameterValue::Int(v)) => {
                vec![values.iter().position(|x| x == v).map_or(f64::NAN, |i| i as f64)]
            }
            (_, ParameterValue::Bool(v)) => vec![if *v { 1.0 } else { 0.0 }],
            (_, ParameterValue::Int(v)) => vec![*v as f64],
            (_, ParameterValue::Real(v)) => vec![*v],
            (_, ParameterValue::RealVector(values)) => values.clone(),
            _ => vec![f64::NAN; self.coordinates()],
        }
    }

    /// Fractions that decode back to `value`. Finite sets map to the centre of
    /// the value's bucket so the inverse survives the floor in [`decode`](Self::decode).
    pub fn encode(&self, value: &ParameterValue) -> Option<Vec<f64>> {
        if !self.contains(value) {
            return None;
        }
        let bucket = |index: usize, size: usize| (index as f64 + 0.5) / size as f64;
        let unit = |v: f64, lower: f64, upper: f64| {
            if upper > lower {
                (v - lower) / (upper - lower)
            } else {
                0.0
            }
        };
        let fractions = match (self, value) {
            (Self::Categorical(values), ParameterValue::Categorical(v)) => {
                vec![bucket(values.iter().position(|x| x == v)?, values.len())]
            }
            (Self::CategoricalInteger(values), ParameterValue::Int(v)) => {
                vec![bucket(values.iter().position(|x| x == v)?, values.len())]
            }
            (Self::Boolean, ParameterValue::Bool(v)) => vec![bucket(usize::from(*v), 2)],
            (Self::Real { lower, upper }, ParameterValue::Real(v)) => vec![unit(*v, *lower, *upper)],
            (Self::Integer { lower, upper }, ParameterValue::Int(v)) => {
                vec![bucket((v - lower) as usize, (upper - lower + 1) as usize)]
            }
            (Self::RealVector { lower, upper, .. }, ParameterValue::RealVector(values)) => {
                values.iter().map(|v| unit(*v, *lower, *upper)).collect()
            }
            _ => return None,
        };
        Some(fractions)
    }
}

/// `floor(f * k)`, clamped to `k - 1` so that `f = 1.0` selects the last value.
fn categorical_index(fraction: f64, size: usize) -> usize {
    let index = (fraction * size as f64).floor() as usize;
    index.min(size - 1)
}

fn interpolate(fraction: f64, lower: f64, upper: f64) -> f64 {
    (lower + fraction * (upper - lower)).clamp(lower, upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(domain: &Domain, f: f64) -> usize {
        match (domain, domain.decode(&[f])) {
            (Domain::Categorical(values), ParameterValue::Categorical(v)) => {
                values.iter().position(|x| *x == v).unwrap()
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_categorical_index_is_floor_of_scaled_fraction() {
        let domain = Domain::categorical(&["a", "b", "c", "d", "e"]);
        assert_eq!(index_of(&domain, 0.2), 1);
        assert_eq!(index_of(&domain, 0.39), 1);
        assert_eq!(index_of(&domain, 0.6), 3);
        assert_eq!(index_of(&domain, 0.999_999_999_999_999_9), 4);
        assert_eq!(categorical_index(1.0, 5), 4);
        assert_eq!(categorical_index(1.0, 1), 0);
    }

    #[test]
    fn test_categorical_boundaries_and_monotonicity() {
        let domain = Domain::categorical(&["a", "b", "c", "d", "e"]);
        assert_eq!(index_of(&domain, 0.0), 0);
        assert_eq!(index_of(&domain, 1.0), 4);

        let mut previous = 0;
        for step in 0..=1000 {
            let index = index_of(&domain, step as f64 / 1000.0);
            assert!(index >= previous);
            previous = index;
        }
    }

    #[test]
    fn test_real_boundaries_and_interpolation() {
        let domain = Domain::Real {
            lower: 5.0,
            upper: 400.0,
        };
        assert_eq!(domain.decode(&[0.0]), ParameterValue::Real(5.0));
        assert_eq!(domain.decode(&[1.0]), ParameterValue::Real(400.0));
        assert_eq!(domain.decode(&[0.5]), ParameterValue::Real(202.5));
    }

    #[test]
    fn test_integer_boundaries_are_inclusive() {
        let domain = Domain::Integer { lower: 2, upper: 8 };
        assert_eq!(domain.decode(&[0.0]), ParameterValue::Int(2));
        assert_eq!(domain.decode(&[1.0]), ParameterValue::Int(8));
        assert_eq!(domain.decode(&[0.5]), ParameterValue::Int(5));
        assert_eq!(domain.decode(&[0.99]), ParameterValue::Int(8));
    }

    #[test]
    fn test_boolean_decodes_as_two_values() {
        assert_eq!(Domain::Boolean.decode(&[0.2]), ParameterValue::Bool(false));
        assert_eq!(Domain::Boolean.decode(&[0.5]), ParameterValue::Bool(true));
        assert_eq!(Domain::Boolean.decode(&[1.0]), ParameterValue::Bool(true));
    }

    #[test]
    fn test_categorical_integer() {
        let domain = Domain::CategoricalInteger(vec![1, 2, 5, 10]);
        assert_eq!(domain.decode(&[1.0]), ParameterValue::Int(10));
        assert_eq!(domain.parse_literal("n", "5").unwrap(), ParameterValue::Int(5));
        assert!(domain.parse_literal("n", "3").is_err());
    }

    #[test]
    fn test_parse_literal_rejects_out_of_domain() {
        let domain = Domain::Real {
            lower: 0.0,
            upper: 1.0,
        };
        assert!(domain.parse_literal("p", "0.25").is_ok());
        assert!(domain.parse_literal("p", "1.5").is_err());
        assert!(domain.parse_literal("p", "NaN").is_err());
        assert!(Domain::Integer { lower: 1, upper: 3 }
            .parse_literal("k", "2.5")
            .is_err());
    }

    #[test]
    fn test_real_vector() {
        let domain = Domain::RealVector {
            lower: -1.0,
            upper: 1.0,
            dimension: 3,
        };
        assert_eq!(domain.coordinates(), 3);
        assert_eq!(
            domain.decode(&[0.0, 0.5, 1.0]),
            ParameterValue::RealVector(vec![-1.0, 0.0, 1.0])
        );
        assert!(domain.parse_literal("v", "0.1,0.2,-0.3").is_ok());
        assert!(domain.parse_literal("v", "0.1,0.2").is_err());
        assert!(domain.parse_literal("v", "0.1,0.2,3").is_err());
    }

    #[test]
    fn test_encode_inverts_decode() {
        let domains = vec![
            Domain::categorical(&["x", "y", "z"]),
            Domain::CategoricalInteger(vec![1, 2, 5, 10, 20]),
            Domain::Boolean,
            Domain::Integer { lower: -3, upper: 9 },
        ];
        for domain in domains {
            for step in 0..=20 {
                let value = domain.decode(&[step as f64 / 20.0]);
                let fractions = domain.encode(&value).unwrap();
                assert_eq!(domain.decode(&fractions), value);
            }
        }

        let real = Domain::Real {
            lower: 0.5,
            upper: 2.0,
        };
        let fractions = real.encode(&ParameterValue::Real(1.25)).unwrap();
        assert!((fractions[0] - 0.5).abs() < 1e-12);
        assert!(real.encode(&ParameterValue::Real(3.0)).is_none());
    }

    #[test]
    fn test_invalid_domains() {
        assert!(Domain::Categorical(vec![]).validate("c").is_err());
        assert!(Domain::Integer { lower: 3, upper: 1 }.validate("i").is_err());
        assert!(Domain::Real {
            lower: 0.0,
            upper: f64::INFINITY
        }
        .validate("r")
        .is_err());
        assert!(Domain::Boolean.validate("b").is_ok());
    }
}
