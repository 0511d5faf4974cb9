use rand::Rng;

use crate::errors::EvResult;
use crate::rng::EvRng;
use crate::solution::{Bounds, Solution};

/// A continuous multi-objective minimization problem.
///
/// Implementations are shared read-only between threads, so evaluation takes
/// `&self` and writes the objectives into the solution it is handed.
pub trait Problem: Send + Sync {
    fn name(&self) -> &str;

    fn number_of_variables(&self) -> usize;

    fn number_of_objectives(&self) -> usize;

    fn bounds(&self) -> &[Bounds];

    fn evaluate(&self, solution: &mut Solution) -> EvResult<()>;

    /// Problem-provided sampling used by the `default` initialization strategy.
    fn create_solution(&self, rng: &mut EvRng) -> Solution {
        let variables = self
            .bounds()
            .iter()
            .map(|b| b.lower + rng.gen::<f64>() * b.width())
            .collect();
        Solution::new(variables, self.number_of_objectives())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;

    struct Sphere {
        bounds: Vec<Bounds>,
    }

    impl Problem for Sphere {
        fn name(&self) -> &str {
            "Sphere"
        }

        fn number_of_variables(&self) -> usize {
            self.bounds.len()
        }

        fn number_of_objectives(&self) -> usize {
            1
        }

        fn bounds(&self) -> &[Bounds] {
            &self.bounds
        }

        fn evaluate(&self, solution: &mut Solution) -> EvResult<()> {
            solution.objectives[0] = solution.variables.iter().map(|x| x * x).sum();
            Ok(())
        }
    }

    #[test]
    fn test_default_solution_respects_bounds() {
        let problem = Sphere {
            bounds: vec![Bounds::new(-2.0, 3.0); 4],
        };
        let mut rng = seeded_rng(1);
        for _ in 0..50 {
            let mut solution = problem.create_solution(&mut rng);
            assert_eq!(solution.number_of_variables(), 4);
            assert!(solution
                .variables
                .iter()
                .all(|x| problem.bounds()[0].contains(*x)));
            problem.evaluate(&mut solution).unwrap();
            assert!(solution.is_finite());
        }
    }
}
