// Runnable optimizers produced by the builder

use ev_types::{EvResult, Front, Solution};

use crate::components::Archive;

/// A fully assembled optimizer. Each instance runs once, owns its random
/// source and is never shared between threads while running.
pub trait Algorithm: Send {
    fn name(&self) -> &str;

    /// Runs to the termination condition.
    fn run(&mut self) -> EvResult<()>;

    /// Final solutions, read from the archive or the population as chosen at
    /// build time.
    fn result(&self) -> Vec<Solution>;

    /// Evaluations spent so far.
    fn evaluations(&self) -> usize;

    fn result_front(&self) -> Front {
        Front::from_solutions(&self.result())
    }
}

/// Where an algorithm's result is read from, decided once at build time.
#[derive(Debug, Clone)]
pub enum ResultSource {
    FromPopulation,
    FromArchive(Archive),
}

impl ResultSource {
    pub fn from_archive(archive: Option<Archive>) -> Self {
        match archive {
            Some(archive) => Self::FromArchive(archive),
            None => Self::FromPopulation,
        }
    }

    pub fn archive(&self) -> Option<&Archive> {
        match self {
            Self::FromArchive(archive) => Some(archive),
            Self::FromPopulation => None,
        }
    }

    pub fn archive_mut(&mut self) -> Option<&mut Archive> {
        match self {
            Self::FromArchive(archive) => Some(archive),
            Self::FromPopulation => None,
        }
    }

    pub fn result(&self, population: &[Solution]) -> Vec<Solution> {
        match self {
            Self::FromArchive(archive) => archive.solutions().to_vec(),
            Self::FromPopulation => population.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ArchiveKind;

    #[test]
    fn test_result_source() {
        let population = vec![
            Solution {
                variables: vec![0.0],
                objectives: vec![1.0, 1.0],
            },
            Solution {
                variables: vec![1.0],
                objectives: vec![2.0, 2.0],
            },
        ];
        assert_eq!(ResultSource::from_archive(None).result(&population).len(), 2);

        let mut source = ResultSource::from_archive(Some(Archive::new(ArchiveKind::Unbounded, 0)));
        for s in &population {
            source.archive_mut().unwrap().add(s.clone());
        }
        assert_eq!(source.result(&population).len(), 1);
    }
}
