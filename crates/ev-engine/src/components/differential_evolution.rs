use ev_types::{Bounds, EvRng, EvResult, Solution};
use rand::Rng;

use super::unknown_component;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeVariant {
    Rand1Bin,
    Rand1Exp,
    Rand2Bin,
}

impl DeVariant {
    pub fn from_name(name: &str) -> EvResult<Self> {
        match name {
            "RAND_1_BIN" => Ok(Self::Rand1Bin),
            "RAND_1_EXP" => Ok(Self::Rand1Exp),
            "RAND_2_BIN" => Ok(Self::Rand2Bin),
            other => Err(unknown_component("differential evolution crossover", other)),
        }
    }

    pub fn parents(&self) -> usize {
        match self {
            Self::Rand1Bin | Self::Rand1Exp => 3,
            Self::Rand2Bin => 5,
        }
    }
}

/// Differential evolution operator producing one trial vector from a current
/// solution and a set of donor parents.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialEvolutionCrossover {
    pub variant: DeVariant,
    pub cr: f64,
    pub f: f64,
}

impl DifferentialEvolutionCrossover {
    pub fn new(variant: DeVariant, cr: f64, f: f64) -> Self {
        Self { variant, cr, f }
    }

    /// `parents` holds at least [`DeVariant::parents`] solutions.
    pub fn execute(
        &self,
        current: &Solution,
        parents: &[Solution],
        bounds: &[Bounds],
        rng: &mut EvRng,
    ) -> Solution {
        let n = current.number_of_variables();
        let donor = |j: usize| -> f64 {
            let x = |k: usize| parents[k].variables[j];
            match self.variant {
                DeVariant::Rand1Bin | DeVariant::Rand1Exp => x(0) + self.f * (x(1) - x(2)),
                DeVariant::Rand2Bin => x(0) + self.f * (x(1) - x(2)) + self.f * (x(3) - x(4)),
            }
        };

        let mut trial = current.variables.clone();
        if n == 0 {
            return Solution::new(trial, current.number_of_objectives());
        }
        match self.variant {
            DeVariant::Rand1Bin | DeVariant::Rand2Bin => {
                let forced = rng.gen_range(0..n);
                for (j, value) in trial.iter_mut().enumerate() {
                    if j == forced || rng.gen::<f64>() < self.cr {
                        *value = donor(j);
                    }
                }
            }
            DeVariant::Rand1Exp => {
                let start = rng.gen_range(0..n);
                let mut length = 0;
                loop {
                    trial[(start + length) % n] = donor((start + length) % n);
                    length += 1;
                    if length >= n || rng.gen::<f64>() >= self.cr {
                        break;
                    }
                }
            }
        }
        for (value, b) in trial.iter_mut().zip(bounds) {
            *value = b.clamp(*value);
        }
        Solution::new(trial, current.number_of_objectives())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_types::seeded_rng;

    fn parents(count: usize) -> Vec<Solution> {
        (0..count)
            .map(|k| Solution::new(vec![0.1 * k as f64; 4], 2))
            .collect()
    }

    #[test]
    fn test_full_crossover_rate_takes_donor() {
        let current = Solution::new(vec![0.9; 4], 2);
        let parents = parents(3);
        let bounds = vec![Bounds::new(0.0, 1.0); 4];
        let mut rng = seeded_rng(4);
        let de = DifferentialEvolutionCrossover::new(DeVariant::Rand1Bin, 1.0, 0.5);
        let trial = de.execute(&current, &parents, &bounds, &mut rng);
        // 0.0 + 0.5 * (0.1 - 0.2) clamps to the lower bound.
        assert!(trial.variables.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_exponential_changes_at_least_one_variable() {
        let current = Solution::new(vec![0.9; 4], 2);
        let parents = parents(3);
        let bounds = vec![Bounds::new(-1.0, 1.0); 4];
        let mut rng = seeded_rng(9);
        let de = DifferentialEvolutionCrossover::new(DeVariant::Rand1Exp, 0.0, 0.5);
        let trial = de.execute(&current, &parents, &bounds, &mut rng);
        let changed = trial.variables.iter().filter(|x| (**x - 0.9).abs() > 1e-12).count();
        assert_eq!(changed, 1);
    }

    #[test]
    fn test_parent_counts() {
        assert_eq!(DeVariant::from_name("RAND_2_BIN").unwrap().parents(), 5);
        assert_eq!(DeVariant::Rand1Exp.parents(), 3);
        assert!(DeVariant::from_name("BEST_1_BIN").is_err());
    }
}
