use ev_types::{EvRng, EvResult, Solution};
use rand::seq::index::sample;
use rand::Rng;

use super::ranking::RankingAndCrowding;
use super::unknown_component;

/// Mating selection driven by rank and crowding distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatingSelection {
    Tournament { size: usize },
    Random,
}

impl MatingSelection {
    pub fn from_name(name: &str, tournament_size: impl FnOnce() -> EvResult<usize>) -> EvResult<Self> {
        match name {
            "tournament" => Ok(Self::Tournament {
                size: tournament_size()?,
            }),
            "random" => Ok(Self::Random),
            other => Err(unknown_component("selection", other)),
        }
    }

    pub fn select(
        &self,
        population: &[Solution],
        ranking: &RankingAndCrowding,
        pool_size: usize,
        rng: &mut EvRng,
    ) -> Vec<Solution> {
        if population.is_empty() {
            return Vec::new();
        }
        (0..pool_size)
            .map(|_| {
                let chosen = match self {
                    Self::Random => rng.gen_range(0..population.len()),
                    Self::Tournament { size } => {
                        let mut best = rng.gen_range(0..population.len());
                        for _ in 1..(*size).max(1) {
                            let rival = rng.gen_range(0..population.len());
                            if ranking.compare(rival, best).is_lt() {
                                best = rival;
                            }
                        }
                        best
                    }
                };
                population[chosen].clone()
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborType {
    Neighbor,
    Population,
}

/// Decomposition mating selection: parents come from the current
/// sub-problem's neighborhood with probability `neighborhood_probability`,
/// otherwise from the whole population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborhoodSelection {
    pub neighborhood_probability: f64,
}

impl NeighborhoodSelection {
    /// Indices of the selected parents, distinct whenever the source is large
    /// enough.
    pub fn select(
        &self,
        population_size: usize,
        neighborhood: &[usize],
        pool_size: usize,
        rng: &mut EvRng,
    ) -> (Vec<usize>, NeighborType) {
        let neighbor_type = if rng.gen::<f64>() < self.neighborhood_probability {
            NeighborType::Neighbor
        } else {
            NeighborType::Population
        };
        let source: Vec<usize> = match neighbor_type {
            NeighborType::Neighbor if !neighborhood.is_empty() => neighborhood.to_vec(),
            _ => (0..population_size).collect(),
        };
        if source.is_empty() {
            return (Vec::new(), neighbor_type);
        }
        let picks = if source.len() >= pool_size {
            sample(rng, source.len(), pool_size).into_vec()
        } else {
            (0..pool_size).map(|_| rng.gen_range(0..source.len())).collect()
        };
        (picks.into_iter().map(|k| source[k]).collect(), neighbor_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_types::seeded_rng;

    fn population() -> Vec<Solution> {
        [[0.0, 1.0], [1.0, 0.0], [2.0, 2.0], [3.0, 3.0]]
            .iter()
            .map(|o| Solution {
                variables: vec![o[0]],
                objectives: o.to_vec(),
            })
            .collect()
    }

    #[test]
    fn test_large_tournament_picks_first_front() {
        let population = population();
        let ranking = RankingAndCrowding::compute(&population);
        let mut rng = seeded_rng(13);
        let pool = MatingSelection::Tournament { size: 30 }.select(&population, &ranking, 20, &mut rng);
        assert_eq!(pool.len(), 20);
        assert!(pool.iter().all(|s| s.objectives[0] <= 1.0));
    }

    #[test]
    fn test_random_selection_size() {
        let population = population();
        let ranking = RankingAndCrowding::compute(&population);
        let mut rng = seeded_rng(13);
        assert_eq!(MatingSelection::Random.select(&population, &ranking, 7, &mut rng).len(), 7);
        assert!(MatingSelection::from_name("roulette", || Ok(2)).is_err());
    }

    #[test]
    fn test_neighborhood_selection() {
        let mut rng = seeded_rng(3);
        let always = NeighborhoodSelection {
            neighborhood_probability: 1.0,
        };
        let (picks, kind) = always.select(50, &[4, 5, 6, 7], 3, &mut rng);
        assert_eq!(kind, NeighborType::Neighbor);
        assert_eq!(picks.len(), 3);
        assert!(picks.iter().all(|p| (4..=7).contains(p)));
        let mut sorted = picks.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);

        let never = NeighborhoodSelection {
            neighborhood_probability: 0.0,
        };
        let (picks, kind) = never.select(50, &[4, 5], 5, &mut rng);
        assert_eq!(kind, NeighborType::Population);
        assert_eq!(picks.len(), 5);
    }
}
