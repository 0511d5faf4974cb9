//! # ev-optimizer
//!
//! Meta-optimization of configurable algorithms. A candidate encoding is
//! decoded into an algorithm configuration, run against every target problem
//! and scored with quality indicators; an outer optimizer searches the
//! encoding space either generation by generation or asynchronously.

pub mod bridge;
pub mod indicators;
pub mod monitor;
pub mod outer;
pub mod output;
pub mod runner;
pub mod trial;

pub use bridge::{Aggregation, EvaluationBudget, MetaOptimizationProblem, TargetProblem};
pub use indicators::{QualityIndicator, HYPERVOLUME_REFERENCE};
pub use monitor::{ProgressEvent, ProgressMonitor, ProgressSummary};
pub use outer::{
    meta_optimizer_from_name, AsyncMetaOptimizer, GenerationalMetaOptimizer, MetaOptimizer,
    MetaOptimizerSettings,
};
pub use output::OutputWriter;
pub use runner::{MetaRunResult, MetaRunner};
pub use trial::{EvaluationRecord, MetaRunId, MetaRunState, MetaRunStatus};
