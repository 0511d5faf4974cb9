use ev_types::{EvRng, EvResult, Problem, Solution};
use rand::seq::SliceRandom;
use rand::Rng;

use super::unknown_component;

const SCATTER_SUBRANGES: usize = 4;

/// Strategy that creates the initial population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionsCreation {
    Random,
    LatinHypercubeSampling,
    ScatterSearch,
    /// Whatever the problem's own sampler produces.
    Default,
}

impl SolutionsCreation {
    pub fn from_name(name: &str) -> EvResult<Self> {
        match name {
            "random" => Ok(Self::Random),
            "latinHypercubeSampling" => Ok(Self::LatinHypercubeSampling),
            "scatterSearch" => Ok(Self::ScatterSearch),
            "default" => Ok(Self::Default),
            other => Err(unknown_component("solutions creation", other)),
        }
    }

    pub fn create(&self, problem: &dyn Problem, count: usize, rng: &mut EvRng) -> Vec<Solution> {
        match self {
            Self::Default => (0..count).map(|_| problem.create_solution(rng)).collect(),
            Self::Random => (0..count)
                .map(|_| {
                    let variables = problem
                        .bounds()
                        .iter()
                        .map(|b| rng.gen_range(b.lower..=b.upper))
                        .collect();
                    Solution::new(variables, problem.number_of_objectives())
                })
                .collect(),
            Self::LatinHypercubeSampling => latin_hypercube(problem, count, rng),
            Self::ScatterSearch => scatter_search(problem, count, rng),
        }
    }
}

fn latin_hypercube(problem: &dyn Problem, count: usize, rng: &mut EvRng) -> Vec<Solution> {
    let bounds = problem.bounds();
    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(bounds.len());
    for b in bounds {
        let mut strata: Vec<usize> = (0..count).collect();
        strata.shuffle(rng);
        columns.push(
            strata
                .into_iter()
                .map(|s| b.lower + (s as f64 + rng.gen::<f64>()) / count as f64 * b.width())
                .collect(),
        );
    }
    (0..count)
        .map(|i| {
            Solution::new(
                columns.iter().map(|column| column[i]).collect(),
                problem.number_of_objectives(),
            )
        })
        .collect()
}

/// Diversification generator: each variable's range is split into subranges
/// and rarely used subranges are preferred.
fn scatter_search(problem: &dyn Problem, count: usize, rng: &mut EvRng) -> Vec<Solution> {
    let bounds = problem.bounds();
    let mut frequency = vec![[1usize; SCATTER_SUBRANGES]; bounds.len()];
    (0..count)
        .map(|_| {
            let variables = bounds
                .iter()
                .zip(frequency.iter_mut())
                .map(|(b, counts)| {
                    let weights: Vec<f64> = counts.iter().map(|c| 1.0 / *c as f64).collect();
                    let total: f64 = weights.iter().sum();
                    let mut pick = rng.gen::<f64>() * total;
                    let mut range = SCATTER_SUBRANGES - 1;
                    for (k, w) in weights.iter().enumerate() {
                        if pick < *w {
                            range = k;
                            break;
                        }
                        pick -= w;
                    }
                    counts[range] += 1;
                    let width = b.width() / SCATTER_SUBRANGES as f64;
                    b.lower + (range as f64 + rng.gen::<f64>()) * width
                })
                .collect();
            Solution::new(variables, problem.number_of_objectives())
        })
        .collect()
}
