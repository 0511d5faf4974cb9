//! The meta-optimization problem.
//!
//! [`MetaOptimizationProblem`] turns a [`ConfigurableAlgorithmBuilder`] into
//! an ordinary [`Problem`]: its decision vector is the builder's parameter
//! encoding and its objectives are aggregated quality-indicator values
//! measured by running the decoded algorithm on every target problem.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use ev_engine::ConfigurableAlgorithmBuilder;
use ev_space::AlgorithmConfiguration;
use ev_types::{
    derive_seed, seeded_rng, Bounds, ConfigError, EvResult, EvRng, EvaluationError, Front, Problem,
    Solution,
};
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::indicators::QualityIndicator;
use crate::monitor::ProgressEvent;
use crate::trial::EvaluationRecord;

/// Seed stream for inner evaluation budgets, kept apart from the run seed.
const BUDGET_STREAM: u64 = 0xB0D6E7;

/// Inner evaluations granted to one run of a configuration on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationBudget {
    Fixed(usize),
    /// Drawn uniformly from `[min, max]` for every inner run.
    RandomRange { min: usize, max: usize },
}

impl EvaluationBudget {
    pub fn random_range(min: usize, max: usize) -> EvResult<Self> {
        let budget = Self::RandomRange { min, max };
        budget.validate()?;
        Ok(budget)
    }

    pub fn validate(&self) -> EvResult<()> {
        let (min, max) = match *self {
            Self::Fixed(evaluations) => (evaluations, evaluations),
            Self::RandomRange { min, max } => (min, max),
        };
        if min == 0 || max < min {
            return Err(ConfigError::InvalidValue {
                parameter: "max_number_of_evaluations".to_string(),
                value: format!("{}..={}", min, max),
                reason: "budgets must be positive with min <= max".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Largest budget a run can receive.
    pub fn upper(&self) -> usize {
        match *self {
            Self::Fixed(evaluations) => evaluations,
            Self::RandomRange { max, .. } => max,
        }
    }

    /// The budget of one run. Fixed budgets leave `rng` untouched.
    pub fn draw(&self, rng: &mut EvRng) -> usize {
        match *self {
            Self::Fixed(evaluations) => evaluations,
            Self::RandomRange { min, max } => rng.gen_range(min..=max),
        }
    }
}

/// One inner problem with its reference front and evaluation budget.
#[derive(Clone)]
pub struct TargetProblem {
    pub problem: Arc<dyn Problem>,
    pub reference_front: Arc<Front>,
    pub budget: EvaluationBudget,
}

impl TargetProblem {
    pub fn new(problem: Arc<dyn Problem>, reference_front: Arc<Front>, max_evaluations: usize) -> Self {
        Self::with_budget(problem, reference_front, EvaluationBudget::Fixed(max_evaluations))
    }

    pub fn with_budget(problem: Arc<dyn Problem>, reference_front: Arc<Front>, budget: EvaluationBudget) -> Self {
        Self {
            problem,
            reference_front,
            budget,
        }
    }
}

impl std::fmt::Debug for TargetProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetProblem")
            .field("problem", &self.problem.name())
            .field("reference_points", &self.reference_front.len())
            .field("budget", &self.budget)
            .finish()
    }
}

/// How the indicator values of independent runs on one target are combined.
/// Per-target values are always averaged across targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    Mean,
    Median,
}

impl Aggregation {
    pub fn from_name(name: &str) -> EvResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            _ => Err(ConfigError::UnknownName {
                kind: "aggregation".to_string(),
                name: name.to_string(),
            }
            .into()),
        }
    }

    pub fn apply(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        match self {
            Self::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Self::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                let middle = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    (sorted[middle - 1] + sorted[middle]) / 2.0
                } else {
                    sorted[middle]
                }
            }
        }
    }
}

/// Scores candidate configurations by running them.
///
/// Every evaluation works on its own builder instance and its own decoded
/// configuration, so the problem can be evaluated from many threads at once.
/// Inner runs are seeded from the base seed, the encoding, the target index
/// and the run index, which keeps scores independent of scheduling.
pub struct MetaOptimizationProblem {
    name: String,
    builder: ConfigurableAlgorithmBuilder,
    targets: Vec<TargetProblem>,
    indicators: Vec<QualityIndicator>,
    independent_runs: usize,
    aggregation: Aggregation,
    seed: u64,
    bounds: Vec<Bounds>,
    counter: AtomicUsize,
    records: Mutex<Vec<EvaluationRecord>>,
    progress: Option<Sender<ProgressEvent>>,
}

impl MetaOptimizationProblem {
    pub fn new(
        builder: ConfigurableAlgorithmBuilder,
        targets: Vec<TargetProblem>,
        indicators: Vec<QualityIndicator>,
    ) -> EvResult<Self> {
        if targets.is_empty() {
            return Err(ConfigError::MissingParameter {
                name: "problem_names".to_string(),
            }
            .into());
        }
        if indicators.is_empty() {
            return Err(ConfigError::MissingParameter {
                name: "indicators_names".to_string(),
            }
            .into());
        }
        for target in &targets {
            target.budget.validate()?;
            if target.reference_front.is_empty() {
                return Err(EvaluationError::EmptyReferenceFront {
                    problem: target.problem.name().to_string(),
                }
                .into());
            }
            let (front, reference) = (
                target.problem.number_of_objectives(),
                target.reference_front.number_of_objectives(),
            );
            if front != reference {
                return Err(EvaluationError::ObjectiveMismatch {
                    problem: target.problem.name().to_string(),
                    front,
                    reference,
                }
                .into());
            }
        }

        let space = builder.parameter_space();
        let name = format!("Configurable{}", space.name());
        let bounds = vec![Bounds::new(0.0, 1.0); space.dimension()];
        info!(
            problem = %name,
            variables = bounds.len(),
            objectives = indicators.len(),
            targets = targets.len(),
            parameters = ?space.parameter_names(),
            "Meta-optimization problem ready"
        );

        Ok(Self {
            name,
            builder,
            targets,
            indicators,
            independent_runs: 1,
            aggregation: Aggregation::Mean,
            seed: 0,
            bounds,
            counter: AtomicUsize::new(0),
            records: Mutex::new(Vec::new()),
            progress: None,
        })
    }

    pub fn with_independent_runs(mut self, runs: usize) -> Self {
        self.independent_runs = runs.max(1);
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_progress(mut self, sender: Sender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn builder(&self) -> &ConfigurableAlgorithmBuilder {
        &self.builder
    }

    pub fn indicators(&self) -> &[QualityIndicator] {
        &self.indicators
    }

    pub fn targets(&self) -> &[TargetProblem] {
        &self.targets
    }

    /// Evaluations started so far.
    pub fn evaluation_count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    /// Records of every finished evaluation, in completion order.
    pub fn records(&self) -> Vec<EvaluationRecord> {
        self.records.lock().clone()
    }

    /// Decodes an encoding on an owned builder instance.
    pub fn decode(&self, vector: &[f64]) -> EvResult<AlgorithmConfiguration> {
        Ok(self
            .builder
            .create_builder_instance()
            .decode(vector)?
            .into_configuration())
    }

    /// Aggregated indicator values for one encoding.
    pub fn score(&self, vector: &[f64]) -> EvResult<Vec<f64>> {
        let configuration = self.decode(vector)?;
        self.score_configuration(&configuration, self.candidate_seed(vector))
    }

    /// Runs `configuration` on every target `independent_runs` times and
    /// averages the per-target values.
    pub fn score_configuration(&self, configuration: &AlgorithmConfiguration, seed: u64) -> EvResult<Vec<f64>> {
        let per_target = self.score_targets(configuration, seed)?;
        Ok((0..self.indicators.len())
            .map(|i| {
                let column: Vec<f64> = per_target.iter().map(|values| values[i]).collect();
                Aggregation::Mean.apply(&column)
            })
            .collect())
    }

    /// One row per target: indicator values combined across independent runs
    /// with the configured [`Aggregation`].
    pub fn score_targets(&self, configuration: &AlgorithmConfiguration, seed: u64) -> EvResult<Vec<Vec<f64>>> {
        let mut per_target = Vec::with_capacity(self.targets.len());
        for (t, target) in self.targets.iter().enumerate() {
            let mut per_run: Vec<Vec<f64>> =
                vec![Vec::with_capacity(self.independent_runs); self.indicators.len()];
            for run in 0..self.independent_runs {
                let run_seed = derive_seed(seed, &[t as u64, run as u64]);
                let evaluations = target
                    .budget
                    .draw(&mut seeded_rng(derive_seed(run_seed, &[BUDGET_STREAM])));
                let values = self.run_once(configuration, target, evaluations, run_seed)?;
                for (column, value) in per_run.iter_mut().zip(values) {
                    column.push(value);
                }
            }
            per_target.push(per_run.iter().map(|runs| self.aggregation.apply(runs)).collect());
        }
        Ok(per_target)
    }

    fn run_once(
        &self,
        configuration: &AlgorithmConfiguration,
        target: &TargetProblem,
        evaluations: usize,
        seed: u64,
    ) -> EvResult<Vec<f64>> {
        let problem_name = target.problem.name();
        let builder = self
            .builder
            .create_builder_instance_for(Arc::clone(&target.problem), evaluations)
            .with_seed(seed);
        let mut algorithm = builder.build(configuration)?;

        debug!(problem = problem_name, seed, evaluations, "Inner run started");
        algorithm.run().map_err(|e| EvaluationError::InnerRunFailed {
            message: format!("{} on {}: {}", algorithm.name(), problem_name, e),
        })?;

        let front = algorithm.result_front().non_dominated();
        if front.is_empty() {
            return Err(EvaluationError::EmptyFront {
                problem: problem_name.to_string(),
            }
            .into());
        }
        let bounds = target.reference_front.column_bounds();
        let normalized = front.normalize(&bounds)?;
        let reference = target.reference_front.normalize(&bounds)?;

        let mut values = Vec::with_capacity(self.indicators.len());
        for indicator in &self.indicators {
            let value = indicator.compute(normalized.points(), reference.points());
            if !value.is_finite() {
                return Err(EvaluationError::NonFiniteIndicator {
                    indicator: indicator.name().to_string(),
                }
                .into());
            }
            values.push(value);
        }
        debug!(
            problem = problem_name,
            evaluations = algorithm.evaluations(),
            front = front.len(),
            ?values,
            "Inner run finished"
        );
        Ok(values)
    }

    fn candidate_seed(&self, vector: &[f64]) -> u64 {
        let bits: Vec<u64> = vector.iter().map(|v| v.to_bits()).collect();
        derive_seed(self.seed, &bits)
    }

    /// Scores one candidate and keeps its record. A failure is recorded and
    /// returned; nothing is retried or penalized.
    pub fn evaluate_candidate(&self, variables: &[f64], worker: Option<usize>) -> EvResult<EvaluationRecord> {
        let number = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let mut record = EvaluationRecord::new(number, worker, variables.to_vec());
        record.mark_running();

        let outcome = self.decode(variables).and_then(|configuration| {
            record.tokens = configuration.to_token_string();
            self.score_configuration(&configuration, self.candidate_seed(variables))
        });

        match outcome {
            Ok(objectives) => {
                record.mark_completed(objectives);
                self.notify(ProgressEvent::Evaluated {
                    number,
                    worker,
                    objectives: record.objectives.clone(),
                    duration_ms: record.duration_ms().unwrap_or(0),
                });
                self.records.lock().push(record.clone());
                Ok(record)
            }
            Err(e) => {
                record.mark_failed(e.to_string());
                self.notify(ProgressEvent::Failed {
                    number,
                    error: e.to_string(),
                });
                self.records.lock().push(record);
                Err(e)
            }
        }
    }

    fn notify(&self, event: ProgressEvent) {
        if let Some(sender) = &self.progress {
            // A stopped monitor is not a reason to fail an evaluation.
            let _ = sender.send(event);
        }
    }
}

impl Problem for MetaOptimizationProblem {
    fn name(&self) -> &str {
        &self.name
    }

    fn number_of_variables(&self) -> usize {
        self.bounds.len()
    }

    fn number_of_objectives(&self) -> usize {
        self.indicators.len()
    }

    fn bounds(&self) -> &[Bounds] {
        &self.bounds
    }

    fn evaluate(&self, solution: &mut Solution) -> EvResult<()> {
        let record = self.evaluate_candidate(&solution.variables, None)?;
        solution.objectives = record.objectives;
        Ok(())
    }
}
