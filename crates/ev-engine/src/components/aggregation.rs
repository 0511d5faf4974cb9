use ev_types::{EvResult, Solution};

use super::unknown_component;

/// Replaces zero weights so every objective keeps some influence.
const MIN_WEIGHT: f64 = 1.0e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregationKind {
    Tschebyscheff,
    WeightedSum,
    PenaltyBoundaryIntersection { theta: f64 },
    ModifiedTschebyscheff,
}

/// Scalarizing function of a decomposition-based algorithm. With
/// `normalization` set, objectives are rescaled by the ideal and nadir
/// points before aggregation, using the value as the denominator epsilon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationFunction {
    pub kind: AggregationKind,
    pub normalization: Option<f64>,
}

impl AggregationFunction {
    pub fn from_name(
        name: &str,
        normalization: Option<f64>,
        theta: impl FnOnce() -> EvResult<f64>,
    ) -> EvResult<Self> {
        let kind = match name {
            "tschebyscheff" => AggregationKind::Tschebyscheff,
            "weightedSum" => AggregationKind::WeightedSum,
            "penaltyBoundaryIntersection" => AggregationKind::PenaltyBoundaryIntersection { theta: theta()? },
            "modifiedTschebyscheff" => AggregationKind::ModifiedTschebyscheff,
            other => return Err(unknown_component("aggregation function", other)),
        };
        Ok(Self { kind, normalization })
    }

    pub fn compute(&self, objectives: &[f64], weights: &[f64], points: &ReferencePoints) -> f64 {
        let values: Vec<f64> = match self.normalization {
            Some(epsilon) => objectives
                .iter()
                .enumerate()
                .map(|(i, f)| (f - points.ideal[i]) / (points.nadir[i] - points.ideal[i] + epsilon))
                .collect(),
            None => objectives
                .iter()
                .enumerate()
                .map(|(i, f)| f - points.ideal[i])
                .collect(),
        };
        let weight = |i: usize| if weights[i] == 0.0 { MIN_WEIGHT } else { weights[i] };

        match self.kind {
            AggregationKind::Tschebyscheff => values
                .iter()
                .enumerate()
                .map(|(i, v)| weight(i) * v.abs())
                .fold(f64::NEG_INFINITY, f64::max),
            AggregationKind::ModifiedTschebyscheff => values
                .iter()
                .enumerate()
                .map(|(i, v)| v.abs() / weight(i))
                .fold(f64::NEG_INFINITY, f64::max),
            AggregationKind::WeightedSum => values.iter().zip(weights).map(|(v, w)| v * w).sum(),
            AggregationKind::PenaltyBoundaryIntersection { theta } => {
                let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
                if norm == 0.0 {
                    return values.iter().map(|v| v * v).sum::<f64>().sqrt();
                }
                let d1 = values.iter().zip(weights).map(|(v, w)| v * w).sum::<f64>().abs() / norm;
                let d2 = values
                    .iter()
                    .zip(weights)
                    .map(|(v, w)| {
                        let diff = v - d1 * w / norm;
                        diff * diff
                    })
                    .sum::<f64>()
                    .sqrt();
                d1 + theta * d2
            }
        }
    }
}

/// Best and worst objective values seen so far.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePoints {
    pub ideal: Vec<f64>,
    pub nadir: Vec<f64>,
}

impl ReferencePoints {
    pub fn new(objectives: usize) -> Self {
        Self {
            ideal: vec![f64::INFINITY; objectives],
            nadir: vec![f64::NEG_INFINITY; objectives],
        }
    }

    pub fn update(&mut self, solution: &Solution) {
        for (i, value) in solution.objectives.iter().enumerate() {
            self.ideal[i] = self.ideal[i].min(*value);
            self.nadir[i] = self.nadir[i].max(*value);
        }
    }

    pub fn update_all(&mut self, solutions: &[Solution]) {
        for solution in solutions {
            self.update(solution);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> ReferencePoints {
        ReferencePoints {
            ideal: vec![0.0, 0.0],
            nadir: vec![1.0, 1.0],
        }
    }

    fn plain(kind: AggregationKind) -> AggregationFunction {
        AggregationFunction {
            kind,
            normalization: None,
        }
    }

    #[test]
    fn test_scalarizations() {
        let f = [0.2, 0.6];
        let w = [0.5, 0.5];
        let p = points();
        assert!((plain(AggregationKind::Tschebyscheff).compute(&f, &w, &p) - 0.3).abs() < 1e-12);
        assert!((plain(AggregationKind::WeightedSum).compute(&f, &w, &p) - 0.4).abs() < 1e-12);
        assert!((plain(AggregationKind::ModifiedTschebyscheff).compute(&f, &w, &p) - 1.2).abs() < 1e-12);

        // On the weight direction the penalty term vanishes.
        let pbi = plain(AggregationKind::PenaltyBoundaryIntersection { theta: 5.0 });
        let on_line = pbi.compute(&[0.4, 0.4], &w, &p);
        assert!((on_line - 0.8 / 2f64.sqrt()).abs() < 1e-12);
        assert!(pbi.compute(&[0.0, 0.8], &w, &p) > on_line);
    }

    #[test]
    fn test_zero_weight_is_replaced() {
        let value = plain(AggregationKind::Tschebyscheff).compute(&[0.5, 0.5], &[1.0, 0.0], &points());
        assert!((value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_normalization_and_reference_points() {
        let mut reference = ReferencePoints::new(2);
        reference.update_all(&[
            Solution {
                variables: vec![],
                objectives: vec![2.0, 10.0],
            },
            Solution {
                variables: vec![],
                objectives: vec![4.0, 20.0],
            },
        ]);
        assert_eq!(reference.ideal, vec![2.0, 10.0]);
        assert_eq!(reference.nadir, vec![4.0, 20.0]);

        let normalized = AggregationFunction {
            kind: AggregationKind::WeightedSum,
            normalization: Some(0.0),
        };
        let value = normalized.compute(&[3.0, 15.0], &[0.5, 0.5], &reference);
        assert!((value - 0.5).abs() < 1e-12);
        assert!(AggregationFunction::from_name("chebyshev", None, || Ok(1.0)).is_err());
    }
}
