// Steady-state outer search over a fixed worker pool

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::unbounded;
use ev_engine::components::{MatingSelection, RankingAndCrowding, Variation};
use ev_types::{
    internal_error, seeded_rng, Bounds, EvResult, EvRng, EvaluationError, Problem, Solution,
};
use parking_lot::Mutex;
use rand::Rng;
use tracing::{debug, info, warn};

use super::{steady_state_variation, MetaOptimizer, MetaOptimizerSettings};
use crate::bridge::MetaOptimizationProblem;
use crate::trial::EvaluationRecord;

/// Population every worker inserts into as its evaluations finish, and the
/// coordinator breeds from. Inserting past capacity evicts the worst member
/// by rank, then crowding.
#[derive(Debug)]
pub struct SharedPopulation {
    capacity: usize,
    members: Mutex<Vec<Solution>>,
}

impl SharedPopulation {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            members: Mutex::new(Vec::with_capacity(capacity + 1)),
        }
    }

    /// Returns false when `solution` itself was the member evicted.
    pub fn insert_with_eviction(&self, solution: Solution) -> bool {
        let mut members = self.members.lock();
        members.push(solution);
        if members.len() <= self.capacity {
            return true;
        }
        let ranking = RankingAndCrowding::compute(&members);
        let worst = (0..members.len())
            .max_by(|&a, &b| ranking.compare(a, b))
            .unwrap_or(members.len() - 1);
        members.swap_remove(worst);
        worst != members.len()
    }

    pub fn snapshot(&self) -> Vec<Solution> {
        self.members.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }
}

/// Asynchronous steady-state NSGA-II.
///
/// `cpu_cores` workers pull candidates from a queue, score them on the
/// bridge and insert them into the [`SharedPopulation`] in completion order.
/// The coordinator answers every completion with one freshly bred candidate
/// until the budget has been issued. The first failed evaluation stops the
/// run.
#[derive(Debug, Clone)]
pub struct AsyncMetaOptimizer {
    settings: MetaOptimizerSettings,
}

impl AsyncMetaOptimizer {
    pub fn new(settings: MetaOptimizerSettings) -> Self {
        Self { settings }
    }
}

fn random_candidate(bounds: &[Bounds], rng: &mut EvRng) -> Vec<f64> {
    bounds
        .iter()
        .map(|b| b.lower + rng.gen::<f64>() * b.width())
        .collect()
}

fn breed(
    population: &SharedPopulation,
    variation: &Variation,
    bounds: &[Bounds],
    iteration: usize,
    rng: &mut EvRng,
) -> EvResult<Vec<f64>> {
    let members = population.snapshot();
    if members.is_empty() {
        return Ok(random_candidate(bounds, rng));
    }
    let ranking = RankingAndCrowding::compute(&members);
    let parents = MatingSelection::Tournament { size: 2 }.select(
        &members,
        &ranking,
        variation.mating_pool_size(),
        rng,
    );
    let child = variation
        .variate(&parents, None, bounds, iteration, rng)?
        .into_iter()
        .next()
        .ok_or_else(|| internal_error!("variation produced no offspring"))?;
    Ok(child.variables)
}

impl MetaOptimizer for AsyncMetaOptimizer {
    fn name(&self) -> &str {
        "AsyncNSGAII"
    }

    fn optimize(&self, problem: Arc<MetaOptimizationProblem>) -> EvResult<Vec<Solution>> {
        let settings = self.settings;
        let workers = settings.cpu_cores.max(1);
        let bounds = problem.bounds().to_vec();
        let variation = steady_state_variation(bounds.len());
        let population = SharedPopulation::new(settings.population_size);
        let abort = AtomicBool::new(false);
        let mut rng = seeded_rng(settings.seed);

        info!(
            population = settings.population_size,
            max_evaluations = settings.max_evaluations,
            workers,
            variables = bounds.len(),
            "Starting asynchronous meta-optimization"
        );

        let (task_tx, task_rx) = unbounded::<Vec<f64>>();
        let (done_tx, done_rx) = unbounded::<EvResult<(EvaluationRecord, bool)>>();

        std::thread::scope(|scope| -> EvResult<()> {
            let handles: Vec<_> = (0..workers)
                .map(|worker| {
                    let tasks = task_rx.clone();
                    let done = done_tx.clone();
                    let problem = &problem;
                    let population = &population;
                    let abort = &abort;
                    scope.spawn(move || {
                        for candidate in tasks.iter() {
                            if abort.load(Ordering::SeqCst) {
                                break;
                            }
                            let outcome = problem
                                .evaluate_candidate(&candidate, Some(worker))
                                .map(|record| {
                                    let kept = population.insert_with_eviction(Solution {
                                        variables: record.variables.clone(),
                                        objectives: record.objectives.clone(),
                                    });
                                    (record, kept)
                                });
                            if done.send(outcome).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();
            drop(task_rx);
            drop(done_tx);

            let mut issued = 0;
            let mut completed = 0;
            let initial = settings.population_size.min(settings.max_evaluations);
            let mut outcome: EvResult<()> = Ok(());
            while issued < initial {
                if task_tx.send(random_candidate(&bounds, &mut rng)).is_err() {
                    break;
                }
                issued += 1;
            }

            while completed < issued {
                let (record, kept) = match done_rx.recv() {
                    Ok(Ok(completion)) => completion,
                    Ok(Err(e)) => {
                        warn!(error = %e, completed, "Evaluation failed, stopping the run");
                        outcome = Err(e);
                        break;
                    }
                    Err(_) => {
                        outcome = Err(internal_error!(
                            "every worker stopped with {} evaluations outstanding",
                            issued - completed
                        ));
                        break;
                    }
                };
                completed += 1;
                debug!(number = record.number, worker = ?record.worker, kept, completed, "Integrated candidate");

                if issued < settings.max_evaluations {
                    let iteration = completed / settings.population_size.max(1);
                    let child = breed(&population, &variation, &bounds, iteration, &mut rng);
                    match child.map(|c| task_tx.send(c)) {
                        Ok(Ok(())) => issued += 1,
                        Ok(Err(_)) => {
                            outcome = Err(internal_error!("task queue closed"));
                            break;
                        }
                        Err(e) => {
                            outcome = Err(e);
                            break;
                        }
                    }
                }
            }

            if outcome.is_err() {
                abort.store(true, Ordering::SeqCst);
            }
            drop(task_tx);

            for (worker, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    return Err(EvaluationError::WorkerLost { worker }.into());
                }
            }
            outcome
        })?;

        info!(
            evaluations = problem.evaluation_count(),
            population = population.len(),
            "Asynchronous meta-optimization finished"
        );
        Ok(population.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::TargetProblem;
    use crate::indicators::QualityIndicator;
    use ev_engine::{ConfigurableAlgorithmBuilder, Moead, NsgaII};
    use ev_types::{Dtlz, DtlzVariant, Front, Zdt, ZdtVariant};

    fn bridge(reference: Front) -> Arc<MetaOptimizationProblem> {
        let problem: Arc<dyn Problem> = Arc::new(Zdt::new(ZdtVariant::Zdt1, 6));
        let builder = ConfigurableAlgorithmBuilder::new(
            Arc::new(NsgaII::compact().unwrap()),
            Arc::clone(&problem),
            8,
            120,
        );
        Arc::new(
            MetaOptimizationProblem::new(
                builder,
                vec![TargetProblem::new(problem, Arc::new(reference), 120)],
                vec![QualityIndicator::Epsilon, QualityIndicator::InvertedGenerationalDistancePlus],
            )
            .unwrap(),
        )
    }

    fn settings(cpu_cores: usize) -> MetaOptimizerSettings {
        MetaOptimizerSettings {
            population_size: 4,
            max_evaluations: 10,
            cpu_cores,
            seed: 17,
        }
    }

    fn point(objectives: [f64; 2]) -> Solution {
        Solution {
            variables: vec![0.0],
            objectives: objectives.to_vec(),
        }
    }

    #[test]
    fn test_eviction_drops_dominated_member() {
        let population = SharedPopulation::new(2);
        assert!(population.insert_with_eviction(point([0.0, 1.0])));
        assert!(population.insert_with_eviction(point([2.0, 2.0])));
        assert!(population.insert_with_eviction(point([1.0, 0.0])));
        let members = population.snapshot();
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|s| s.objectives != vec![2.0, 2.0]));
        assert!(!population.insert_with_eviction(point([3.0, 3.0])));
    }

    #[test]
    fn test_concurrent_inserts_respect_capacity() {
        let population = Arc::new(SharedPopulation::new(5));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let population = Arc::clone(&population);
                std::thread::spawn(move || {
                    for k in 0..25 {
                        let x = (t * 25 + k) as f64 / 100.0;
                        population.insert_with_eviction(point([x, 1.0 - x]));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(population.len(), 5);
    }

    #[test]
    fn test_budget_is_spent_exactly() {
        let front = Zdt::new(ZdtVariant::Zdt1, 6).pareto_front_sample(40).unwrap();
        let bridge = bridge(front);
        let result = AsyncMetaOptimizer::new(settings(3))
            .optimize(Arc::clone(&bridge))
            .unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(bridge.evaluation_count(), 10);
        let records = bridge.records();
        assert_eq!(records.len(), 10);
        assert!(records.iter().all(|r| r.worker.is_some_and(|w| w < 3)));
    }

    #[test]
    fn test_workers_fill_the_population_with_their_results() {
        let front = Zdt::new(ZdtVariant::Zdt1, 6).pareto_front_sample(40).unwrap();
        let bridge = bridge(front);
        let result = AsyncMetaOptimizer::new(settings(4))
            .optimize(Arc::clone(&bridge))
            .unwrap();
        let records = bridge.records();
        assert_eq!(result.len(), 4);
        for member in &result {
            let record = records
                .iter()
                .find(|r| r.variables == member.variables)
                .unwrap();
            assert_eq!(record.objectives, member.objectives);
        }
    }

    #[test]
    fn test_first_failure_aborts() {
        // Three objectives and no weight-vector directory: every MOEA/D build fails.
        let problem: Arc<dyn Problem> = Arc::new(Dtlz::standard(DtlzVariant::Dtlz2));
        let reference = Front::new(vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ])
        .unwrap();
        let builder = ConfigurableAlgorithmBuilder::new(
            Arc::new(Moead::new().unwrap()),
            Arc::clone(&problem),
            10,
            100,
        );
        let bridge = Arc::new(
            MetaOptimizationProblem::new(
                builder,
                vec![TargetProblem::new(problem, Arc::new(reference), 100)],
                vec![QualityIndicator::Epsilon],
            )
            .unwrap(),
        );

        let result = AsyncMetaOptimizer::new(settings(2)).optimize(Arc::clone(&bridge));
        assert!(result.is_err());
        assert!(bridge.evaluation_count() <= 4);
        assert!(bridge.records().iter().all(|r| r.error.is_some()));
    }
}
