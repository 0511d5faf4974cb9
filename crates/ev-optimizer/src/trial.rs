//! Evaluation records and meta-run lifecycle tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique meta-optimization run identifier.
pub type MetaRunId = Uuid;

/// Lifecycle state shared by runs and single evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetaRunState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Aggregate status of one meta-optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaRunStatus {
    pub id: MetaRunId,
    pub meta_optimizer: String,
    pub configurable_algorithm: String,
    pub state: MetaRunState,
    pub evaluations_completed: usize,
    pub evaluations_failed: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl MetaRunStatus {
    pub fn new(meta_optimizer: &str, configurable_algorithm: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            meta_optimizer: meta_optimizer.to_string(),
            configurable_algorithm: configurable_algorithm.to_string(),
            state: MetaRunState::Pending,
            evaluations_completed: 0,
            evaluations_failed: 0,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    pub fn mark_running(&mut self) {
        self.state = MetaRunState::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn mark_completed(&mut self) {
        self.state = MetaRunState::Completed;
        self.finished_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, error: String) {
        self.state = MetaRunState::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error);
    }

    /// Count a finished evaluation.
    pub fn record(&mut self, record: &EvaluationRecord) {
        match record.state {
            MetaRunState::Completed => self.evaluations_completed += 1,
            MetaRunState::Failed => self.evaluations_failed += 1,
            _ => {}
        }
    }

    pub fn computing_time_ms(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Single evaluation
// ---------------------------------------------------------------------------

/// One candidate configuration scored by the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: Uuid,
    /// 1-based position in evaluation start order.
    pub number: usize,
    /// Worker thread of the asynchronous optimizer, if any.
    pub worker: Option<usize>,
    pub tokens: String,
    pub variables: Vec<f64>,
    pub objectives: Vec<f64>,
    pub state: MetaRunState,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl EvaluationRecord {
    pub fn new(number: usize, worker: Option<usize>, variables: Vec<f64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            worker,
            tokens: String::new(),
            variables,
            objectives: Vec::new(),
            state: MetaRunState::Pending,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    pub fn mark_running(&mut self) {
        self.state = MetaRunState::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn mark_completed(&mut self, objectives: Vec<f64>) {
        self.state = MetaRunState::Completed;
        self.finished_at = Some(Utc::now());
        self.objectives = objectives;
    }

    pub fn mark_failed(&mut self, error: String) {
        self.state = MetaRunState::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error);
    }

    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_lifecycle() {
        let mut status = MetaRunStatus::new("NSGAII", "MOEAD");
        assert_eq!(status.state, MetaRunState::Pending);
        assert!(status.computing_time_ms().is_none());

        status.mark_running();
        assert_eq!(status.state, MetaRunState::Running);
        assert!(status.started_at.is_some());

        status.mark_completed();
        assert_eq!(status.state, MetaRunState::Completed);
        assert!(status.computing_time_ms().unwrap() >= 0);
    }

    #[test]
    fn record_lifecycle_counts_into_status() {
        let mut status = MetaRunStatus::new("AsyncNSGAII", "NSGAII");

        let mut ok = EvaluationRecord::new(1, Some(0), vec![0.5, 0.5]);
        ok.mark_running();
        assert_eq!(ok.state, MetaRunState::Running);
        ok.mark_completed(vec![-0.4, 0.1]);
        assert_eq!(ok.objectives, vec![-0.4, 0.1]);
        assert!(ok.duration_ms().is_some());

        let mut failed = EvaluationRecord::new(2, Some(1), vec![0.1, 0.9]);
        failed.mark_running();
        failed.mark_failed("inner run failed".into());
        assert_eq!(failed.error.as_deref(), Some("inner run failed"));

        status.record(&ok);
        status.record(&failed);
        assert_eq!(status.evaluations_completed, 1);
        assert_eq!(status.evaluations_failed, 1);
    }

    #[test]
    fn record_serializes() {
        let mut record = EvaluationRecord::new(3, None, vec![0.25]);
        record.tokens = "--selectionTournamentSize 2".to_string();
        let json = serde_json::to_string(&record).unwrap();
        let back: EvaluationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
