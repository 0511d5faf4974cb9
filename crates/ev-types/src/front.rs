use serde::{Deserialize, Serialize};

use crate::errors::{DataError, EvResult};
use crate::solution::{Bounds, Solution};

/// Pareto dominance relation between two objective vectors (minimization).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    Dominates,
    DominatedBy,
    NonDominated,
}

pub fn dominance(a: &[f64], b: &[f64]) -> Dominance {
    let mut a_better = false;
    let mut b_better = false;
    for (x, y) in a.iter().zip(b.iter()) {
        if x < y {
            a_better = true;
        } else if y < x {
            b_better = true;
        }
    }
    match (a_better, b_better) {
        (true, false) => Dominance::Dominates,
        (false, true) => Dominance::DominatedBy,
        _ => Dominance::NonDominated,
    }
}

pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    dominance(a, b) == Dominance::Dominates
}

/// A set of objective vectors, all of the same width.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Front {
    points: Vec<Vec<f64>>,
}

impl Front {
    pub fn new(points: Vec<Vec<f64>>) -> EvResult<Self> {
        if let Some(first) = points.first() {
            let width = first.len();
            if width == 0 {
                return Err(DataError::InvalidFormat {
                    message: "front points must have at least one objective".to_string(),
                }
                .into());
            }
            if let Some(row) = points.iter().position(|p| p.len() != width) {
                return Err(DataError::InvalidFormat {
                    message: format!(
                        "front row {} has {} objectives, expected {}",
                        row,
                        points[row].len(),
                        width
                    ),
                }
                .into());
            }
        }
        Ok(Self { points })
    }

    pub fn from_solutions(solutions: &[Solution]) -> Self {
        Self {
            points: solutions.iter().map(|s| s.objectives.clone()).collect(),
        }
    }

    pub fn points(&self) -> &[Vec<f64>] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Vec<f64>> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn number_of_objectives(&self) -> usize {
        self.points.first().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_finite(&self) -> bool {
        self.points.iter().flatten().all(|v| v.is_finite())
    }

    /// Per-objective minimum and maximum.
    pub fn column_bounds(&self) -> Vec<Bounds> {
        let width = self.number_of_objectives();
        let mut bounds = vec![Bounds::new(f64::INFINITY, f64::NEG_INFINITY); width];
        for point in &self.points {
            for (b, v) in bounds.iter_mut().zip(point.iter()) {
                b.lower = b.lower.min(*v);
                b.upper = b.upper.max(*v);
            }
        }
        bounds
    }

    /// Maps every objective into `(v - min) / (max - min)`.
    ///
    /// A degenerate column (zero width) is only shifted.
    pub fn normalize(&self, bounds: &[Bounds]) -> EvResult<Front> {
        if !self.is_empty() && bounds.len() != self.number_of_objectives() {
            return Err(DataError::InvalidFormat {
                message: format!(
                    "cannot normalize {} objectives with {} bounds",
                    self.number_of_objectives(),
                    bounds.len()
                ),
            }
            .into());
        }
        let points = self
            .points
            .iter()
            .map(|point| {
                point
                    .iter()
                    .zip(bounds.iter())
                    .map(|(v, b)| {
                        let width = b.width();
                        if width > 0.0 {
                            (v - b.lower) / width
                        } else {
                            v - b.lower
                        }
                    })
                    .collect()
            })
            .collect();
        Ok(Front { points })
    }

    /// The non-dominated subset, with exact duplicates removed.
    pub fn non_dominated(&self) -> Front {
        let mut kept: Vec<Vec<f64>> = Vec::new();
        for point in &self.points {
            if kept.iter().any(|k| k == point || dominates(k, point)) {
                continue;
            }
            kept.retain(|k| !dominates(point, k));
            kept.push(point.clone());
        }
        Front { points: kept }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominance() {
        assert_eq!(dominance(&[1.0, 2.0], &[2.0, 3.0]), Dominance::Dominates);
        assert_eq!(dominance(&[2.0, 3.0], &[1.0, 2.0]), Dominance::DominatedBy);
        assert_eq!(dominance(&[1.0, 3.0], &[2.0, 2.0]), Dominance::NonDominated);
        assert_eq!(dominance(&[1.0, 1.0], &[1.0, 1.0]), Dominance::NonDominated);
        assert!(dominates(&[1.0, 1.0], &[1.0, 2.0]));
    }

    #[test]
    fn test_ragged_front_rejected() {
        let result = Front::new(vec![vec![0.0, 1.0], vec![1.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_dominated_filter() {
        let front = Front::new(vec![
            vec![0.0, 1.0],
            vec![0.5, 0.5],
            vec![0.6, 0.6],
            vec![1.0, 0.0],
            vec![0.5, 0.5],
        ])
        .unwrap();
        let filtered = front.non_dominated();
        assert_eq!(filtered.len(), 3);
        assert!(!filtered.points().contains(&vec![0.6, 0.6]));
    }

    #[test]
    fn test_normalize_against_reference_bounds() {
        let reference = Front::new(vec![vec![0.0, 10.0], vec![2.0, 0.0]]).unwrap();
        let bounds = reference.column_bounds();
        assert_eq!(bounds[0], Bounds::new(0.0, 2.0));
        assert_eq!(bounds[1], Bounds::new(0.0, 10.0));

        let front = Front::new(vec![vec![1.0, 5.0], vec![3.0, 20.0]]).unwrap();
        let normalized = front.normalize(&bounds).unwrap();
        assert_eq!(normalized.points()[0], vec![0.5, 0.5]);
        assert_eq!(normalized.points()[1], vec![1.5, 2.0]);
    }

    #[test]
    fn test_normalize_degenerate_column() {
        let bounds = vec![Bounds::new(1.0, 1.0)];
        let front = Front::new(vec![vec![3.0]]).unwrap();
        let normalized = front.normalize(&bounds).unwrap();
        assert_eq!(normalized.points()[0], vec![2.0]);
    }
}
