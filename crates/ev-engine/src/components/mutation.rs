use ev_types::{Bounds, EvRng, EvResult, Solution};
use rand::Rng;

use super::repair::RepairStrategy;
use super::unknown_component;

#[derive(Debug, Clone, PartialEq)]
pub enum MutationKind {
    Uniform { perturbation: f64 },
    Polynomial { distribution_index: f64 },
    /// Polynomial mutation sharing one random draw across all variables.
    LinkedPolynomial { distribution_index: f64 },
    /// Step size shrinks as `iteration` approaches `max_iterations`.
    NonUniform { perturbation: f64, max_iterations: usize },
}

/// Per-variable mutation with probability `probability`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub kind: MutationKind,
    pub probability: f64,
    pub repair: RepairStrategy,
}

impl Mutation {
    pub fn new(kind: MutationKind, probability: f64, repair: RepairStrategy) -> Self {
        Self {
            kind,
            probability,
            repair,
        }
    }

    /// `max_iterations` is read only for the non-uniform operator.
    pub fn from_name(
        name: &str,
        probability: f64,
        repair: RepairStrategy,
        real: impl Fn(&str) -> EvResult<f64>,
        max_iterations: impl FnOnce() -> EvResult<usize>,
    ) -> EvResult<Self> {
        let kind = match name {
            "uniform" => MutationKind::Uniform {
                perturbation: real("uniformMutationPerturbation")?,
            },
            "polynomial" => MutationKind::Polynomial {
                distribution_index: real("polynomialMutationDistributionIndex")?,
            },
            "linkedPolynomial" => MutationKind::LinkedPolynomial {
                distribution_index: real("linkedPolynomialMutationDistributionIndex")?,
            },
            "nonUniform" => MutationKind::NonUniform {
                perturbation: real("nonUniformMutationPerturbation")?,
                max_iterations: max_iterations()?,
            },
            other => return Err(unknown_component("mutation", other)),
        };
        Ok(Self::new(kind, probability, repair))
    }

    pub fn execute(&self, solution: &mut Solution, bounds: &[Bounds], iteration: usize, rng: &mut EvRng) {
        let linked_draw = rng.gen::<f64>();
        for (x, b) in solution.variables.iter_mut().zip(bounds) {
            if rng.gen::<f64>() > self.probability {
                continue;
            }
            let mutated = match &self.kind {
                MutationKind::Uniform { perturbation } => *x + (rng.gen::<f64>() - 0.5) * perturbation,
                MutationKind::Polynomial { distribution_index } => {
                    polynomial(*x, b, *distribution_index, rng.gen())
                }
                MutationKind::LinkedPolynomial { distribution_index } => {
                    polynomial(*x, b, *distribution_index, linked_draw)
                }
                MutationKind::NonUniform {
                    perturbation,
                    max_iterations,
                } => {
                    let progress = if *max_iterations == 0 {
                        1.0
                    } else {
                        (iteration as f64 / *max_iterations as f64).min(1.0)
                    };
                    let delta = |y: f64, r: f64| y * (1.0 - r.powf((1.0 - progress).powf(*perturbation)));
                    if rng.gen::<f64>() <= 0.5 {
                        *x + delta(b.upper - *x, rng.gen())
                    } else {
                        *x + delta(b.lower - *x, rng.gen())
                    }
                }
            };
            *x = self.repair.repair(mutated, b, rng);
        }
    }
}

fn polynomial(y: f64, bounds: &Bounds, index: f64, u: f64) -> f64 {
    let (lower, upper) = (bounds.lower, bounds.upper);
    if upper <= lower {
        return lower;
    }
    let delta1 = (y - lower) / (upper - lower);
    let delta2 = (upper - y) / (upper - lower);
    let power = 1.0 / (index + 1.0);
    let delta_q = if u <= 0.5 {
        let xy = 1.0 - delta1;
        let value = 2.0 * u + (1.0 - 2.0 * u) * xy.powf(index + 1.0);
        value.powf(power) - 1.0
    } else {
        let xy = 1.0 - delta2;
        let value = 2.0 * (1.0 - u) + 2.0 * (u - 0.5) * xy.powf(index + 1.0);
        1.0 - value.powf(power)
    };
    y + delta_q * (upper - lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_types::seeded_rng;

    fn all_kinds() -> Vec<MutationKind> {
        vec![
            MutationKind::Uniform { perturbation: 0.5 },
            MutationKind::Polynomial { distribution_index: 20.0 },
            MutationKind::LinkedPolynomial { distribution_index: 20.0 },
            MutationKind::NonUniform {
                perturbation: 0.5,
                max_iterations: 10,
            },
        ]
    }

    #[test]
    fn test_mutants_stay_in_bounds() {
        let bounds = vec![Bounds::new(-5.0, 5.0); 4];
        let mut rng = seeded_rng(17);
        for kind in all_kinds() {
            let mutation = Mutation::new(kind, 1.0, RepairStrategy::Bounds);
            for iteration in 0..20 {
                let mut solution = Solution::new(vec![4.9, -4.9, 0.0, 1.0], 2);
                mutation.execute(&mut solution, &bounds, iteration, &mut rng);
                assert!(solution.variables.iter().all(|x| (-5.0..=5.0).contains(x)));
            }
        }
    }

    #[test]
    fn test_zero_probability_is_identity() {
        let bounds = vec![Bounds::new(0.0, 1.0); 3];
        let mut rng = seeded_rng(2);
        for kind in all_kinds() {
            let mutation = Mutation::new(kind, 0.0, RepairStrategy::Bounds);
            let mut solution = Solution::new(vec![0.1, 0.5, 0.9], 2);
            mutation.execute(&mut solution, &bounds, 0, &mut rng);
            assert_eq!(solution.variables, vec![0.1, 0.5, 0.9]);
        }
    }

    #[test]
    fn test_non_uniform_requires_iterations() {
        let missing = Mutation::from_name(
            "nonUniform",
            0.1,
            RepairStrategy::Bounds,
            |_| Ok(0.5),
            || Err(ev_types::internal_error!("no iterations")),
        );
        assert!(missing.is_err());
        let polynomial = Mutation::from_name(
            "polynomial",
            0.1,
            RepairStrategy::Bounds,
            |_| Ok(20.0),
            || Err(ev_types::internal_error!("not needed")),
        );
        assert!(polynomial.is_ok());
    }
}
