use serde::{Deserialize, Serialize};

/// Inclusive bounds of a real decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }
}

/// A real-coded candidate solution with its objective values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub variables: Vec<f64>,
    pub objectives: Vec<f64>,
}

impl Solution {
    pub fn new(variables: Vec<f64>, number_of_objectives: usize) -> Self {
        Self {
            variables,
            objectives: vec![0.0; number_of_objectives],
        }
    }

    pub fn number_of_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn number_of_objectives(&self) -> usize {
        self.objectives.len()
    }

    /// True when every objective value is a finite number.
    pub fn is_finite(&self) -> bool {
        self.objectives.iter().all(|v| v.is_finite())
    }
}
