use ev_types::{hypervolume_contributions, Solution};

use super::ranking::RankingAndCrowding;

/// Environmental selection of the generational families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// Best `size` of population plus offspring by rank, then crowding
    /// distance computed once on the split front.
    RankingAndCrowding,
    /// Repeatedly drop the member of the worst front with the smallest
    /// hypervolume contribution.
    HypervolumeContribution,
}

const REFERENCE_OFFSET: f64 = 1.0;

impl Replacement {
    pub fn replace(&self, population: Vec<Solution>, offspring: Vec<Solution>, size: usize) -> Vec<Solution> {
        let mut merged = population;
        merged.extend(offspring);
        if merged.len() <= size {
            return merged;
        }

        match self {
            Self::RankingAndCrowding => {
                let ranking = RankingAndCrowding::compute(&merged);
                let keep = ranking.best(size);
                let mut slots: Vec<Option<Solution>> = merged.into_iter().map(Some).collect();
                keep.into_iter().filter_map(|i| slots[i].take()).collect()
            }
            Self::HypervolumeContribution => {
                while merged.len() > size {
                    let ranking = RankingAndCrowding::compute(&merged);
                    let Some(last) = ranking.fronts.last() else {
                        break;
                    };
                    let victim = if last.len() == 1 {
                        last[0]
                    } else {
                        smallest_contributor(&merged, last)
                    };
                    merged.swap_remove(victim);
                }
                merged
            }
        }
    }
}

fn smallest_contributor(solutions: &[Solution], front: &[usize]) -> usize {
    let points: Vec<Vec<f64>> = front.iter().map(|&i| solutions[i].objectives.clone()).collect();
    let objectives = points[0].len();
    let reference: Vec<f64> = (0..objectives)
        .map(|m| points.iter().map(|p| p[m]).fold(f64::NEG_INFINITY, f64::max) + REFERENCE_OFFSET)
        .collect();
    let contributions = hypervolume_contributions(&points, &reference);
    let position = contributions
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map_or(0, |(i, _)| i);
    front[position]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(objectives: &[f64]) -> Solution {
        Solution {
            variables: vec![objectives[0]],
            objectives: objectives.to_vec(),
        }
    }

    #[test]
    fn test_ranking_and_crowding_keeps_best() {
        let population = vec![point(&[0.0, 4.0]), point(&[3.0, 3.0])];
        let offspring = vec![point(&[4.0, 0.0]), point(&[1.0, 1.0])];
        let survivors = Replacement::RankingAndCrowding.replace(population, offspring, 3);
        assert_eq!(survivors.len(), 3);
        assert!(survivors.iter().all(|s| s.objectives != vec![3.0, 3.0]));
    }

    #[test]
    fn test_hypervolume_removes_dominated_first() {
        let population = vec![point(&[0.0, 4.0]), point(&[1.0, 1.0]), point(&[4.0, 0.0])];
        let offspring = vec![point(&[2.0, 2.0])];
        let survivors = Replacement::HypervolumeContribution.replace(population, offspring, 3);
        assert_eq!(survivors.len(), 3);
        assert!(survivors.iter().all(|s| s.objectives != vec![2.0, 2.0]));
    }

    #[test]
    fn test_hypervolume_drops_crowded_point() {
        let population = vec![point(&[0.0, 4.0]), point(&[2.0, 2.0]), point(&[4.0, 0.0])];
        let offspring = vec![point(&[2.1, 1.95])];
        let survivors = Replacement::HypervolumeContribution.replace(population, offspring, 3);
        assert!(survivors.iter().all(|s| s.objectives != vec![2.1, 1.95]));
    }

    #[test]
    fn test_small_merge_is_kept_whole() {
        let survivors = Replacement::RankingAndCrowding.replace(vec![point(&[1.0, 1.0])], Vec::new(), 5);
        assert_eq!(survivors.len(), 1);
    }
}
