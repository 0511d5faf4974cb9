//! Built-in continuous benchmark problems (ZDT and DTLZ families).

use std::f64::consts::PI;
use std::sync::Arc;

use crate::errors::{ConfigError, EvResult};
use crate::front::Front;
use crate::problem::Problem;
use crate::solution::{Bounds, Solution};
use crate::validation_error;

// ---------------------------------------------------------------------------
// ZDT
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZdtVariant {
    Zdt1,
    Zdt2,
    Zdt3,
    Zdt4,
    Zdt6,
}

/// Two-objective ZDT test problems.
#[derive(Debug, Clone)]
pub struct Zdt {
    variant: ZdtVariant,
    name: String,
    bounds: Vec<Bounds>,
}

impl Zdt {
    pub fn new(variant: ZdtVariant, number_of_variables: usize) -> Self {
        let n = number_of_variables.max(2);
        let bounds = match variant {
            ZdtVariant::Zdt4 => std::iter::once(Bounds::new(0.0, 1.0))
                .chain(std::iter::repeat(Bounds::new(-5.0, 5.0)).take(n - 1))
                .collect(),
            _ => vec![Bounds::new(0.0, 1.0); n],
        };
        let name = match variant {
            ZdtVariant::Zdt1 => "ZDT1",
            ZdtVariant::Zdt2 => "ZDT2",
            ZdtVariant::Zdt3 => "ZDT3",
            ZdtVariant::Zdt4 => "ZDT4",
            ZdtVariant::Zdt6 => "ZDT6",
        };
        Self {
            variant,
            name: name.to_string(),
            bounds,
        }
    }

    /// Standard sizing: 30 variables for ZDT1-3, 10 for ZDT4 and ZDT6.
    pub fn standard(variant: ZdtVariant) -> Self {
        match variant {
            ZdtVariant::Zdt4 | ZdtVariant::Zdt6 => Self::new(variant, 10),
            _ => Self::new(variant, 30),
        }
    }

    pub fn variant(&self) -> ZdtVariant {
        self.variant
    }

    /// Evenly spaced sample of the true Pareto front.
    pub fn pareto_front_sample(&self, points: usize) -> EvResult<Front> {
        let points = points.max(2);
        let (start, end) = match self.variant {
            ZdtVariant::Zdt6 => (0.280_775_319_1, 1.0),
            _ => (0.0, 1.0),
        };
        let raw: Vec<Vec<f64>> = (0..points)
            .map(|i| {
                let f1 = start + (end - start) * i as f64 / (points - 1) as f64;
                let f2 = match self.variant {
                    ZdtVariant::Zdt1 | ZdtVariant::Zdt4 => 1.0 - f1.sqrt(),
                    ZdtVariant::Zdt2 | ZdtVariant::Zdt6 => 1.0 - f1 * f1,
                    ZdtVariant::Zdt3 => 1.0 - f1.sqrt() - f1 * (10.0 * PI * f1).sin(),
                };
                vec![f1, f2]
            })
            .collect();
        Ok(Front::new(raw)?.non_dominated())
    }
}

impl Problem for Zdt {
    fn name(&self) -> &str {
        &self.name
    }

    fn number_of_variables(&self) -> usize {
        self.bounds.len()
    }

    fn number_of_objectives(&self) -> usize {
        2
    }

    fn bounds(&self) -> &[Bounds] {
        &self.bounds
    }

    fn evaluate(&self, solution: &mut Solution) -> EvResult<()> {
        check_shape(self, solution)?;
        let x = &solution.variables;
        let n = x.len();
        let rest = &x[1..];

        let f1 = match self.variant {
            ZdtVariant::Zdt6 => 1.0 - (-4.0 * x[0]).exp() * (6.0 * PI * x[0]).sin().powi(6),
            _ => x[0],
        };
        let g = match self.variant {
            ZdtVariant::Zdt4 => {
                1.0 + 10.0 * (n - 1) as f64
                    + rest
                        .iter()
                        .map(|v| v * v - 10.0 * (4.0 * PI * v).cos())
                        .sum::<f64>()
            }
            ZdtVariant::Zdt6 => 1.0 + 9.0 * (rest.iter().sum::<f64>() / (n - 1) as f64).powf(0.25),
            _ => 1.0 + 9.0 * rest.iter().sum::<f64>() / (n - 1) as f64,
        };
        let ratio = f1 / g;
        let h = match self.variant {
            ZdtVariant::Zdt1 | ZdtVariant::Zdt4 => 1.0 - ratio.sqrt(),
            ZdtVariant::Zdt2 | ZdtVariant::Zdt6 => 1.0 - ratio * ratio,
            ZdtVariant::Zdt3 => 1.0 - ratio.sqrt() - ratio * (10.0 * PI * f1).sin(),
        };

        solution.objectives[0] = f1;
        solution.objectives[1] = g * h;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DTLZ
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtlzVariant {
    Dtlz1,
    Dtlz2,
}

/// Scalable DTLZ test problems.
#[derive(Debug, Clone)]
pub struct Dtlz {
    variant: DtlzVariant,
    name: String,
    objectives: usize,
    bounds: Vec<Bounds>,
}

impl Dtlz {
    pub fn new(variant: DtlzVariant, number_of_variables: usize, objectives: usize) -> Self {
        let objectives = objectives.max(2);
        let n = number_of_variables.max(objectives);
        let name = match variant {
            DtlzVariant::Dtlz1 => "DTLZ1",
            DtlzVariant::Dtlz2 => "DTLZ2",
        };
        Self {
            variant,
            name: name.to_string(),
            objectives,
            bounds: vec![Bounds::new(0.0, 1.0); n],
        }
    }

    /// Three objectives with k = 5 (DTLZ1) or k = 10 (DTLZ2).
    pub fn standard(variant: DtlzVariant) -> Self {
        match variant {
            DtlzVariant::Dtlz1 => Self::new(variant, 7, 3),
            DtlzVariant::Dtlz2 => Self::new(variant, 12, 3),
        }
    }
}

impl Problem for Dtlz {
    fn name(&self) -> &str {
        &self.name
    }

    fn number_of_variables(&self) -> usize {
        self.bounds.len()
    }

    fn number_of_objectives(&self) -> usize {
        self.objectives
    }

    fn bounds(&self) -> &[Bounds] {
        &self.bounds
    }

    fn evaluate(&self, solution: &mut Solution) -> EvResult<()> {
        check_shape(self, solution)?;
        let m = self.objectives;
        let x = &solution.variables;
        let tail = &x[m - 1..];

        let g = match self.variant {
            DtlzVariant::Dtlz1 => {
                100.0
                    * (tail.len() as f64
                        + tail
                            .iter()
                            .map(|v| (v - 0.5).powi(2) - (20.0 * PI * (v - 0.5)).cos())
                            .sum::<f64>())
            }
            DtlzVariant::Dtlz2 => tail.iter().map(|v| (v - 0.5).powi(2)).sum(),
        };

        for i in 0..m {
            let mut f = match self.variant {
                DtlzVariant::Dtlz1 => 0.5 * (1.0 + g),
                DtlzVariant::Dtlz2 => 1.0 + g,
            };
            for v in x.iter().take(m - 1 - i) {
                f *= match self.variant {
                    DtlzVariant::Dtlz1 => *v,
                    DtlzVariant::Dtlz2 => (v * PI / 2.0).cos(),
                };
            }
            if i > 0 {
                let v = x[m - 1 - i];
                f *= match self.variant {
                    DtlzVariant::Dtlz1 => 1.0 - v,
                    DtlzVariant::Dtlz2 => (v * PI / 2.0).sin(),
                };
            }
            solution.objectives[i] = f;
        }
        Ok(())
    }
}

fn check_shape(problem: &dyn Problem, solution: &mut Solution) -> EvResult<()> {
    if solution.variables.len() != problem.number_of_variables() {
        return Err(validation_error!(
            "{} expects {} variables, got {}",
            problem.name(),
            problem.number_of_variables(),
            solution.variables.len()
        ));
    }
    solution.objectives.resize(problem.number_of_objectives(), 0.0);
    Ok(())
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Resolves a benchmark by name. Fully qualified names keep their last
/// dotted segment, so `org.example.zdt.ZDT1` resolves to `ZDT1`.
pub fn problem_from_name(name: &str) -> EvResult<Arc<dyn Problem>> {
    let short = name.trim().rsplit('.').next().unwrap_or(name).to_uppercase();
    let problem: Arc<dyn Problem> = match short.as_str() {
        "ZDT1" => Arc::new(Zdt::standard(ZdtVariant::Zdt1)),
        "ZDT2" => Arc::new(Zdt::standard(ZdtVariant::Zdt2)),
        "ZDT3" => Arc::new(Zdt::standard(ZdtVariant::Zdt3)),
        "ZDT4" => Arc::new(Zdt::standard(ZdtVariant::Zdt4)),
        "ZDT6" => Arc::new(Zdt::standard(ZdtVariant::Zdt6)),
        "DTLZ1" => Arc::new(Dtlz::standard(DtlzVariant::Dtlz1)),
        "DTLZ2" => Arc::new(Dtlz::standard(DtlzVariant::Dtlz2)),
        _ => {
            return Err(ConfigError::UnknownName {
                kind: "problem".to_string(),
                name: name.to_string(),
            }
            .into())
        }
    };
    Ok(problem)
}
