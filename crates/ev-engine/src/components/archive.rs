use ev_types::{dominance, hypervolume_contributions, Dominance, EvResult, Solution};

use super::ranking::crowding_distance;
use super::unknown_component;

/// Offset added to the worst value of each objective to place the reference
/// point for hypervolume pruning.
const HYPERVOLUME_OFFSET: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    CrowdingDistance,
    Hypervolume,
    Unbounded,
}

impl ArchiveKind {
    pub fn from_name(name: &str) -> EvResult<Self> {
        match name {
            "crowdingDistanceArchive" => Ok(Self::CrowdingDistance),
            "hypervolumeArchive" => Ok(Self::Hypervolume),
            "unboundedArchive" => Ok(Self::Unbounded),
            other => Err(unknown_component("archive", other)),
        }
    }
}

/// A set of mutually non-dominated solutions.
///
/// Bounded archives drop the member with the smallest density contribution
/// whenever an insertion exceeds the capacity.
#[derive(Debug, Clone)]
pub struct Archive {
    kind: ArchiveKind,
    capacity: usize,
    solutions: Vec<Solution>,
}

impl Archive {
    pub fn new(kind: ArchiveKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            solutions: Vec::new(),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(ArchiveKind::Unbounded, usize::MAX)
    }

    pub fn kind(&self) -> ArchiveKind {
        self.kind
    }

    pub fn capacity(&self) -> Option<usize> {
        match self.kind {
            ArchiveKind::Unbounded => None,
            _ => Some(self.capacity),
        }
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Returns true when `solution` is a member after the insertion.
    pub fn add(&mut self, solution: Solution) -> bool {
        let mut dominated = Vec::new();
        for (i, member) in self.solutions.iter().enumerate() {
            if member.objectives == solution.objectives {
                return false;
            }
            match dominance(&member.objectives, &solution.objectives) {
                Dominance::Dominates => return false,
                Dominance::DominatedBy => dominated.push(i),
                Dominance::NonDominated => {}
            }
        }
        for i in dominated.into_iter().rev() {
            self.solutions.swap_remove(i);
        }

        let objectives = solution.objectives.clone();
        self.solutions.push(solution);
        if let Some(capacity) = self.capacity() {
            while self.solutions.len() > capacity {
                self.prune();
            }
        }
        self.solutions.iter().any(|s| s.objectives == objectives)
    }

    fn prune(&mut self) {
        let density: Vec<f64> = match self.kind {
            ArchiveKind::CrowdingDistance | ArchiveKind::Unbounded => {
                let members: Vec<&Solution> = self.solutions.iter().collect();
                crowding_distance(&members)
            }
            ArchiveKind::Hypervolume => {
                let points: Vec<Vec<f64>> =
                    self.solutions.iter().map(|s| s.objectives.clone()).collect();
                let objectives = points.first().map_or(0, |p| p.len());
                let reference: Vec<f64> = (0..objectives)
                    .map(|m| {
                        points.iter().map(|p| p[m]).fold(f64::NEG_INFINITY, f64::max)
                            + HYPERVOLUME_OFFSET
                    })
                    .collect();
                hypervolume_contributions(&points, &reference)
            }
        };
        if let Some(worst) = density
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
        {
            self.solutions.swap_remove(worst);
        }
    }

    pub fn into_solutions(self) -> Vec<Solution> {
        self.solutions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(objectives: &[f64]) -> Solution {
        Solution {
            variables: Vec::new(),
            objectives: objectives.to_vec(),
        }
    }

    #[test]
    fn test_rejects_dominated_and_duplicates() {
        let mut archive = Archive::unbounded();
        assert!(archive.add(point(&[1.0, 1.0])));
        assert!(!archive.add(point(&[2.0, 2.0])));
        assert!(!archive.add(point(&[1.0, 1.0])));
        assert!(archive.add(point(&[0.5, 3.0])));
        assert!(archive.add(point(&[0.5, 0.5])));
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.capacity(), None);
    }

    #[test]
    fn test_crowding_archive_keeps_extremes() {
        let mut archive = Archive::new(ArchiveKind::CrowdingDistance, 3);
        for p in [[0.0, 4.0], [1.0, 3.0], [1.1, 2.9], [4.0, 0.0]] {
            archive.add(point(&p));
        }
        assert_eq!(archive.len(), 3);
        let objectives: Vec<Vec<f64>> = archive.solutions().iter().map(|s| s.objectives.clone()).collect();
        assert!(objectives.contains(&vec![0.0, 4.0]));
        assert!(objectives.contains(&vec![4.0, 0.0]));
    }

    #[test]
    fn test_hypervolume_archive_drops_smallest_contribution() {
        let mut archive = Archive::new(ArchiveKind::Hypervolume, 3);
        for p in [[0.0, 4.0], [2.0, 2.0], [2.1, 1.95], [4.0, 0.0]] {
            archive.add(point(&p));
        }
        assert_eq!(archive.len(), 3);
        let objectives: Vec<Vec<f64>> = archive.solutions().iter().map(|s| s.objectives.clone()).collect();
        assert!(!objectives.contains(&vec![2.1, 1.95]));
        assert!(objectives.contains(&vec![2.0, 2.0]));
        assert_eq!(ArchiveKind::from_name("hypervolumeArchive").unwrap(), ArchiveKind::Hypervolume);
    }
}
