use std::sync::Arc;

use ev_types::{BuildError, EvResult, Problem, Solution};
use rayon::prelude::*;

use super::archive::Archive;

/// How a batch of solutions is evaluated.
#[derive(Clone)]
pub enum Evaluation {
    Sequential,
    /// Sequential, feeding every evaluated solution to the algorithm's archive.
    SequentialWithArchive,
    /// Evaluates the batch on a bounded pool and waits for all of it.
    Parallel {
        pool: Arc<rayon::ThreadPool>,
        with_archive: bool,
    },
}

impl std::fmt::Debug for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "Sequential"),
            Self::SequentialWithArchive => write!(f, "SequentialWithArchive"),
            Self::Parallel { pool, with_archive } => write!(
                f,
                "Parallel {{ threads: {}, with_archive: {} }}",
                pool.current_num_threads(),
                with_archive
            ),
        }
    }
}

impl Evaluation {
    pub fn parallel(threads: usize, with_archive: bool) -> EvResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| ev_types::internal_error!("Failed to build evaluation pool: {}", e))?;
        Ok(Self::Parallel {
            pool: Arc::new(pool),
            with_archive,
        })
    }

    pub fn uses_archive(&self) -> bool {
        match self {
            Self::Sequential => false,
            Self::SequentialWithArchive => true,
            Self::Parallel { with_archive, .. } => *with_archive,
        }
    }

    /// Evaluates `solutions` in place and returns how many were evaluated.
    pub fn evaluate(
        &self,
        problem: &dyn Problem,
        solutions: &mut [Solution],
        archive: Option<&mut Archive>,
    ) -> EvResult<usize> {
        match self {
            Self::Sequential | Self::SequentialWithArchive => {
                for solution in solutions.iter_mut() {
                    problem.evaluate(solution)?;
                }
            }
            Self::Parallel { pool, .. } => {
                pool.install(|| {
                    solutions
                        .par_iter_mut()
                        .try_for_each(|solution| problem.evaluate(solution))
                })?;
            }
        }

        if self.uses_archive() {
            let archive = archive.ok_or_else(|| BuildError::Inconsistent {
                message: "evaluation feeds an archive but none was allocated".to_string(),
            })?;
            for solution in solutions.iter() {
                archive.add(solution.clone());
            }
        }
        Ok(solutions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::archive::ArchiveKind;
    use ev_types::{seeded_rng, Zdt, ZdtVariant};

    fn batch(problem: &Zdt, size: usize) -> Vec<Solution> {
        let mut rng = seeded_rng(31);
        (0..size).map(|_| problem.create_solution(&mut rng)).collect()
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let problem = Zdt::new(ZdtVariant::Zdt1, 10);
        let mut sequential = batch(&problem, 16);
        let mut parallel = sequential.clone();

        Evaluation::Sequential.evaluate(&problem, &mut sequential, None).unwrap();
        let count = Evaluation::parallel(4, false)
            .unwrap()
            .evaluate(&problem, &mut parallel, None)
            .unwrap();
        assert_eq!(count, 16);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_archive_is_fed() {
        let problem = Zdt::new(ZdtVariant::Zdt2, 10);
        let mut solutions = batch(&problem, 10);
        let mut archive = Archive::new(ArchiveKind::CrowdingDistance, 100);
        Evaluation::SequentialWithArchive
            .evaluate(&problem, &mut solutions, Some(&mut archive))
            .unwrap();
        assert!(!archive.is_empty());

        let missing = Evaluation::SequentialWithArchive.evaluate(&problem, &mut solutions, None);
        assert!(missing.is_err());
    }
}
