/// Stops a run once `max_evaluations` solutions have been evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationByEvaluations {
    pub max_evaluations: usize,
}

impl TerminationByEvaluations {
    pub fn new(max_evaluations: usize) -> Self {
        Self { max_evaluations }
    }

    pub fn is_met(&self, evaluations: usize) -> bool {
        evaluations >= self.max_evaluations
    }
}
