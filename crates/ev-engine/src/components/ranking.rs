//! Non-dominated sorting and crowding distance.

use std::cmp::Ordering;

use ev_types::{dominance, Dominance, Solution};

/// Fronts of indices into `solutions`, best front first.
pub fn fast_non_dominated_sort(solutions: &[Solution]) -> Vec<Vec<usize>> {
    let n = solutions.len();
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut domination_count = vec![0usize; n];

    for p in 0..n {
        for q in (p + 1)..n {
            match dominance(&solutions[p].objectives, &solutions[q].objectives) {
                Dominance::Dominates => {
                    dominated_by[p].push(q);
                    domination_count[q] += 1;
                }
                Dominance::DominatedBy => {
                    dominated_by[q].push(p);
                    domination_count[p] += 1;
                }
                Dominance::NonDominated => {}
            }
        }
    }
    if n == 0 {
        return Vec::new();
    }
    let mut fronts: Vec<Vec<usize>> = vec![(0..n).filter(|&p| domination_count[p] == 0).collect()];

    let mut current = 0;
    loop {
        let mut next = Vec::new();
        for &p in &fronts[current] {
            for &q in &dominated_by[p] {
                domination_count[q] -= 1;
                if domination_count[q] == 0 {
                    next.push(q);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        fronts.push(next);
        current += 1;
    }
    fronts
}

/// Crowding distance of each member of `front`. Boundary points get infinity.
pub fn crowding_distance(front: &[&Solution]) -> Vec<f64> {
    let n = front.len();
    if n < 3 {
        return vec![f64::INFINITY; n];
    }
    let objectives = front[0].number_of_objectives();
    let mut distance = vec![0.0; n];
    let mut order: Vec<usize> = (0..n).collect();

    for m in 0..objectives {
        order.sort_by(|&a, &b| front[a].objectives[m].total_cmp(&front[b].objectives[m]));
        let min = front[order[0]].objectives[m];
        let max = front[order[n - 1]].objectives[m];
        distance[order[0]] = f64::INFINITY;
        distance[order[n - 1]] = f64::INFINITY;
        let span = max - min;
        if span <= 0.0 {
            continue;
        }
        for k in 1..n - 1 {
            let gap = front[order[k + 1]].objectives[m] - front[order[k - 1]].objectives[m];
            distance[order[k]] += gap / span;
        }
    }
    distance
}

/// Rank and crowding distance of every member of a population.
#[derive(Debug, Clone)]
pub struct RankingAndCrowding {
    pub rank: Vec<usize>,
    pub crowding: Vec<f64>,
    pub fronts: Vec<Vec<usize>>,
}

impl RankingAndCrowding {
    pub fn compute(solutions: &[Solution]) -> Self {
        let fronts = fast_non_dominated_sort(solutions);
        let mut rank = vec![0; solutions.len()];
        let mut crowding = vec![0.0; solutions.len()];
        for (r, front) in fronts.iter().enumerate() {
            let members: Vec<&Solution> = front.iter().map(|&i| &solutions[i]).collect();
            for (&i, d) in front.iter().zip(crowding_distance(&members)) {
                rank[i] = r;
                crowding[i] = d;
            }
        }
        Self {
            rank,
            crowding,
            fronts,
        }
    }

    /// `Less` when `a` is preferred: lower rank, then larger crowding distance.
    pub fn compare(&self, a: usize, b: usize) -> Ordering {
        self.rank[a]
            .cmp(&self.rank[b])
            .then_with(|| self.crowding[b].total_cmp(&self.crowding[a]))
    }

    /// Indices of the `count` best members.
    pub fn best(&self, count: usize) -> Vec<usize> {
        let mut chosen = Vec::with_capacity(count);
        for front in &self.fronts {
            if chosen.len() + front.len() <= count {
                chosen.extend_from_slice(front);
            } else {
                let mut last = front.clone();
                last.sort_by(|&a, &b| self.crowding[b].total_cmp(&self.crowding[a]));
                chosen.extend(last.into_iter().take(count - chosen.len()));
            }
            if chosen.len() >= count {
                break;
            }
        }
        chosen
    }
}
