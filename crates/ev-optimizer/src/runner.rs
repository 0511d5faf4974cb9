//! End-to-end meta-optimization runs driven by a [`MetaRunConfig`].

use std::path::PathBuf;
use std::sync::Arc;

use ev_data::{MetaRunConfig, ReferenceFrontCache};
use ev_engine::{family_for_name, ConfigurableAlgorithmBuilder};
use ev_types::{problem_from_name, EvResult, Solution};
use tracing::{error, info};

use crate::bridge::{Aggregation, EvaluationBudget, MetaOptimizationProblem, TargetProblem};
use crate::indicators::QualityIndicator;
use crate::monitor::{ProgressMonitor, ProgressSummary};
use crate::outer::{meta_optimizer_from_name, MetaOptimizerSettings};
use crate::output::OutputWriter;
use crate::trial::{EvaluationRecord, MetaRunStatus};

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct MetaRunResult {
    pub status: MetaRunStatus,
    pub solutions: Vec<Solution>,
    pub records: Vec<EvaluationRecord>,
    pub progress: ProgressSummary,
    pub output_files: Vec<PathBuf>,
}

pub struct MetaRunner {
    config: MetaRunConfig,
    fronts: ReferenceFrontCache,
}

impl MetaRunner {
    pub fn new(config: MetaRunConfig) -> EvResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            fronts: ReferenceFrontCache::new(),
        })
    }

    pub fn config(&self) -> &MetaRunConfig {
        &self.config
    }

    /// Target problems paired with their reference fronts and budgets.
    pub fn targets(&self) -> EvResult<Vec<TargetProblem>> {
        let config = &self.config;
        config
            .problem_names
            .iter()
            .zip(&config.reference_front_file_names)
            .zip(&config.max_number_of_evaluations)
            .enumerate()
            .map(|(i, ((name, front), max))| {
                let budget = match &config.min_number_of_evaluations {
                    Some(minimums) => {
                        EvaluationBudget::random_range(minimums.get(i).copied().unwrap_or(*max), *max)?
                    }
                    None => EvaluationBudget::Fixed(*max),
                };
                Ok(TargetProblem::with_budget(
                    problem_from_name(name)?,
                    self.fronts.get_or_load(front)?,
                    budget,
                ))
            })
            .collect()
    }

    /// The bridge problem for this configuration. The builder is bound to the
    /// first target; every inner run rebinds it to its own target.
    pub fn bridge(&self) -> EvResult<MetaOptimizationProblem> {
        let config = &self.config;
        let targets = self.targets()?;
        let family = family_for_name(&config.configurable_algorithm)?;
        let first = &targets[0];
        let mut builder = ConfigurableAlgorithmBuilder::new(
            family,
            Arc::clone(&first.problem),
            config.internal_population_size,
            first.budget.upper(),
        )
        .with_seed(config.seed);
        if let Some(directory) = &config.weight_vector_files_directory {
            builder = builder.with_weight_vector_directory(directory);
        }

        Ok(MetaOptimizationProblem::new(
            builder,
            targets,
            QualityIndicator::from_names(&config.indicators_names)?,
        )?
        .with_independent_runs(config.independent_runs)
        .with_aggregation(Aggregation::from_name(&config.aggregation)?)
        .with_seed(config.seed))
    }

    pub fn run(&self) -> EvResult<MetaRunResult> {
        let config = &self.config;
        let mut status = MetaRunStatus::new(&config.meta_optimizer_algorithm, &config.configurable_algorithm);
        let optimizer = meta_optimizer_from_name(
            &config.meta_optimizer_algorithm,
            MetaOptimizerSettings {
                population_size: config.meta_optimizer_population_size,
                max_evaluations: config.meta_optimizer_max_evaluations,
                cpu_cores: config.cpu_cores,
                seed: config.seed,
            },
        )?;

        let monitor = ProgressMonitor::spawn(config.observer_frequency);
        let bridge = Arc::new(self.bridge()?.with_progress(monitor.sender()));
        info!(
            meta_optimizer = optimizer.name(),
            configurable_algorithm = %config.configurable_algorithm,
            problems = ?config.problem_names,
            indicators = ?config.indicators_names,
            cores = config.cpu_cores,
            "Meta-optimization run started"
        );

        status.mark_running();
        let outcome = optimizer.optimize(Arc::clone(&bridge));
        let records = bridge.records();
        for record in &records {
            status.record(record);
        }
        let progress = monitor.finish()?;

        let solutions = match outcome {
            Ok(solutions) => solutions,
            Err(e) => {
                status.mark_failed(e.to_string());
                error!(error = %e, "Meta-optimization run failed");
                return Err(e);
            }
        };

        let indicator_names: Vec<&str> = bridge.indicators().iter().map(|i| i.name()).collect();
        let problem_names: Vec<String> = config
            .problem_names
            .iter()
            .map(|name| name.rsplit('.').next().unwrap_or(name).to_string())
            .collect();
        let writer = OutputWriter::new(
            &config.output_directory,
            optimizer.name(),
            &problem_names,
            &indicator_names,
        )?;
        let output_files = writer.write(bridge.builder().parameter_space(), &solutions, &records)?;
        status.mark_completed();

        info!(
            run = %status.id,
            evaluations = status.evaluations_completed,
            failed = status.evaluations_failed,
            computing_time_ms = status.computing_time_ms().unwrap_or(0),
            "Meta-optimization run finished"
        );
        Ok(MetaRunResult {
            status,
            solutions,
            records,
            progress,
            output_files,
        })
    }
}
