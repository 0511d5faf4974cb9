//! Progress monitor for meta-optimization runs.
//!
//! The bridge emits one [`ProgressEvent`] per finished candidate evaluation.
//! A background thread drains the channel, tracks the best value seen for
//! every indicator and logs a summary every `frequency` evaluations.

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use ev_types::{internal_error, EvResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Evaluated {
        number: usize,
        worker: Option<usize>,
        objectives: Vec<f64>,
        duration_ms: i64,
    },
    Failed {
        number: usize,
        error: String,
    },
    Finished,
}

/// What the monitor saw over a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub evaluations: usize,
    pub failures: usize,
    /// Smallest value observed per indicator.
    pub best: Vec<f64>,
    pub elapsed: Duration,
}

pub struct ProgressMonitor {
    sender: Sender<ProgressEvent>,
    handle: JoinHandle<ProgressSummary>,
}

impl ProgressMonitor {
    pub fn spawn(frequency: usize) -> Self {
        let (sender, receiver) = unbounded();
        let handle = std::thread::spawn(move || drain(receiver, frequency.max(1)));
        Self { sender, handle }
    }

    pub fn sender(&self) -> Sender<ProgressEvent> {
        self.sender.clone()
    }

    /// Stops the monitor and returns its summary.
    pub fn finish(self) -> EvResult<ProgressSummary> {
        // The thread also stops when every sender is gone.
        let _ = self.sender.send(ProgressEvent::Finished);
        self.handle
            .join()
            .map_err(|_| internal_error!("progress monitor thread panicked"))
    }
}

fn drain(receiver: Receiver<ProgressEvent>, frequency: usize) -> ProgressSummary {
    let started = Instant::now();
    let mut summary = ProgressSummary {
        evaluations: 0,
        failures: 0,
        best: Vec::new(),
        elapsed: Duration::ZERO,
    };

    for event in receiver.iter() {
        match event {
            ProgressEvent::Evaluated {
                number,
                worker,
                objectives,
                duration_ms,
            } => {
                summary.evaluations += 1;
                if summary.best.len() != objectives.len() {
                    summary.best = vec![f64::INFINITY; objectives.len()];
                }
                for (best, value) in summary.best.iter_mut().zip(&objectives) {
                    *best = best.min(*value);
                }
                if summary.evaluations % frequency == 0 {
                    info!(
                        evaluations = summary.evaluations,
                        last = number,
                        ?worker,
                        duration_ms,
                        best = ?summary.best,
                        elapsed_s = started.elapsed().as_secs_f64(),
                        "Meta-optimization progress"
                    );
                }
            }
            ProgressEvent::Failed { number, error } => {
                summary.failures += 1;
                warn!(number, %error, "Candidate evaluation failed");
            }
            ProgressEvent::Finished => break,
        }
    }

    summary.elapsed = started.elapsed();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluated(number: usize, objectives: Vec<f64>) -> ProgressEvent {
        ProgressEvent::Evaluated {
            number,
            worker: None,
            objectives,
            duration_ms: 1,
        }
    }

    #[test]
    fn test_summary_tracks_best_values() {
        let monitor = ProgressMonitor::spawn(2);
        let sender = monitor.sender();
        sender.send(evaluated(1, vec![0.5, 0.2])).unwrap();
        sender.send(evaluated(2, vec![0.3, 0.4])).unwrap();
        sender
            .send(ProgressEvent::Failed {
                number: 3,
                error: "boom".into(),
            })
            .unwrap();
        drop(sender);

        let summary = monitor.finish().unwrap();
        assert_eq!(summary.evaluations, 2);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.best, vec![0.3, 0.2]);
    }

    #[test]
    fn test_events_from_other_threads() {
        let monitor = ProgressMonitor::spawn(10);
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let sender = monitor.sender();
                std::thread::spawn(move || {
                    for k in 0..5 {
                        sender
                            .send(evaluated(worker * 5 + k, vec![k as f64]))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let summary = monitor.finish().unwrap();
        assert_eq!(summary.evaluations, 20);
        assert_eq!(summary.best, vec![0.0]);
    }
}
