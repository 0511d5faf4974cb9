//! Quality indicators comparing a front with a reference front.
//!
//! Every indicator reports a value to minimize: hypervolume is negated so the
//! outer search never needs to know which indicators grow with quality.

use ev_types::{hypervolume, ConfigError, EvResult};
use serde::{Deserialize, Serialize};

/// Reference point coordinate used on normalized fronts.
pub const HYPERVOLUME_REFERENCE: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityIndicator {
    /// Hypervolume, negated.
    Hypervolume,
    /// `1 - HV(front) / HV(reference)`.
    NormalizedHypervolume,
    /// Additive epsilon.
    Epsilon,
    InvertedGenerationalDistance,
    InvertedGenerationalDistancePlus,
    GenerationalDistance,
}

impl QualityIndicator {
    pub fn from_name(name: &str) -> EvResult<Self> {
        match name.trim().to_uppercase().as_str() {
            "HV" => Ok(Self::Hypervolume),
            "NHV" => Ok(Self::NormalizedHypervolume),
            "EP" => Ok(Self::Epsilon),
            "IGD" => Ok(Self::InvertedGenerationalDistance),
            "IGD+" => Ok(Self::InvertedGenerationalDistancePlus),
            "GD" => Ok(Self::GenerationalDistance),
            _ => Err(ConfigError::UnknownName {
                kind: "quality indicator".to_string(),
                name: name.to_string(),
            }
            .into()),
        }
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> EvResult<Vec<Self>> {
        names.iter().map(|n| Self::from_name(n.as_ref())).collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hypervolume => "HV",
            Self::NormalizedHypervolume => "NHV",
            Self::Epsilon => "EP",
            Self::InvertedGenerationalDistance => "IGD",
            Self::InvertedGenerationalDistancePlus => "IGD+",
            Self::GenerationalDistance => "GD",
        }
    }

    pub fn larger_is_better(&self) -> bool {
        matches!(self, Self::Hypervolume)
    }

    /// Value to minimize for `front` against `reference`. Both are expected
    /// normalized and non-empty.
    pub fn compute(&self, front: &[Vec<f64>], reference: &[Vec<f64>]) -> f64 {
        match self {
            Self::Hypervolume => -hypervolume(front, &reference_point(reference)),
            Self::NormalizedHypervolume => {
                let point = reference_point(reference);
                let reference_volume = hypervolume(reference, &point);
                if reference_volume > 0.0 {
                    1.0 - hypervolume(front, &point) / reference_volume
                } else {
                    1.0
                }
            }
            Self::Epsilon => additive_epsilon(front, reference),
            Self::InvertedGenerationalDistance => mean_distance(reference, front, euclidean),
            Self::InvertedGenerationalDistancePlus => {
                mean_distance(reference, front, |r, a| dominance_distance(a, r))
            }
            Self::GenerationalDistance => mean_distance(front, reference, euclidean),
        }
    }
}

impl std::fmt::Display for QualityIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn reference_point(reference: &[Vec<f64>]) -> Vec<f64> {
    let objectives = reference.first().map(Vec::len).unwrap_or(0);
    vec![HYPERVOLUME_REFERENCE; objectives]
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}

/// Distance from `r` to the region `a` dominates.
fn dominance_distance(a: &[f64], r: &[f64]) -> f64 {
    a.iter()
        .zip(r)
        .map(|(x, y)| (x - y).max(0.0).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Mean over `from` of the distance to the closest point of `to`.
fn mean_distance(from: &[Vec<f64>], to: &[Vec<f64>], distance: impl Fn(&[f64], &[f64]) -> f64) -> f64 {
    if from.is_empty() || to.is_empty() {
        return f64::INFINITY;
    }
    let total: f64 = from
        .iter()
        .map(|p| to.iter().map(|q| distance(p, q)).fold(f64::INFINITY, f64::min))
        .sum();
    total / from.len() as f64
}

/// Smallest shift that makes `front` weakly dominate every reference point.
fn additive_epsilon(front: &[Vec<f64>], reference: &[Vec<f64>]) -> f64 {
    reference
        .iter()
        .map(|r| {
            front
                .iter()
                .map(|a| {
                    a.iter()
                        .zip(r)
                        .map(|(x, y)| x - y)
                        .fold(f64::NEG_INFINITY, f64::max)
                })
                .fold(f64::INFINITY, f64::min)
        })
        .fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> Vec<Vec<f64>> {
        vec![vec![0.0, 1.0], vec![0.5, 0.5], vec![1.0, 0.0]]
    }

    #[test]
    fn test_names_round_trip() {
        for name in ["HV", "NHV", "EP", "IGD", "IGD+", "GD"] {
            assert_eq!(QualityIndicator::from_name(name).unwrap().name(), name);
        }
        assert_eq!(
            QualityIndicator::from_name(" igd+ ").unwrap(),
            QualityIndicator::InvertedGenerationalDistancePlus
        );
        assert!(QualityIndicator::from_name("R2").is_err());
    }

    #[test]
    fn test_reference_scores_itself_perfectly() {
        let reference = reference();
        for indicator in [
            QualityIndicator::NormalizedHypervolume,
            QualityIndicator::Epsilon,
            QualityIndicator::InvertedGenerationalDistance,
            QualityIndicator::InvertedGenerationalDistancePlus,
            QualityIndicator::GenerationalDistance,
        ] {
            let value = indicator.compute(&reference, &reference);
            assert!(value.abs() < 1e-12, "{} gave {}", indicator, value);
        }
    }

    #[test]
    fn test_hypervolume_is_negated() {
        let reference = reference();
        let value = QualityIndicator::Hypervolume.compute(&reference, &reference);
        // Three slabs under (1.1, 1.1).
        let expected = 0.1 * 1.1 + 0.5 * 0.6 + 0.5 * 0.1;
        assert!((value + expected).abs() < 1e-12);
        assert!(QualityIndicator::Hypervolume.larger_is_better());
    }

    #[test]
    fn test_worse_front_scores_higher() {
        let reference = reference();
        let shifted: Vec<Vec<f64>> = reference
            .iter()
            .map(|p| p.iter().map(|v| v + 0.25).collect())
            .collect();
        assert!((QualityIndicator::Epsilon.compute(&shifted, &reference) - 0.25).abs() < 1e-12);
        for indicator in [
            QualityIndicator::Hypervolume,
            QualityIndicator::NormalizedHypervolume,
            QualityIndicator::InvertedGenerationalDistance,
            QualityIndicator::InvertedGenerationalDistancePlus,
            QualityIndicator::GenerationalDistance,
        ] {
            assert!(
                indicator.compute(&shifted, &reference) > indicator.compute(&reference, &reference),
                "{} did not penalize the shifted front",
                indicator
            );
        }
    }
}
