// ABOUTME: Benchmark dispatch - spawns one task per job and tracks its handle.
// ABOUTME: The task runs the match through a BenchmarkRunner and reports the result.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::jobs::BenchmarkingJob;
use super::pool::WorkerPool;

/// Everything a runner needs to play one benchmarking match.
#[derive(Clone)]
pub struct BenchmarkRequest {
    /// Number of episodes to play.
    pub episodes: u64,

    /// The pairing to benchmark.
    pub job: BenchmarkingJob,

    /// Shared pool for sub-tasks, if the experiment has one.
    pub pool: Option<WorkerPool>,

    /// Job label.
    pub label: String,
}

/// Plays benchmarking matches. Owns its environment factory.
#[async_trait]
pub trait BenchmarkRunner: Send + Sync {
    /// Play the match and return the result cell for the confusion matrix.
    async fn run(&self, request: BenchmarkRequest) -> Result<serde_json::Value, anyhow::Error>;
}

/// Result Queue message: one confusion-matrix cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub label: String,
    pub iteration: u64,
    /// `(scheme,agent)` of the first participant.
    pub row: String,
    /// `(scheme,agent)` of the second participant.
    pub column: String,
    /// Runner-defined result payload.
    pub cell: serde_json::Value,
}

/// How a benchmarking task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BenchmarkOutcome {
    /// The runner finished and its report was sent.
    Completed,
    /// The runner returned an error or the task panicked.
    Failed(String),
}

/// Handle to a spawned benchmarking task.
pub struct BenchmarkHandle {
    label: String,
    handle: JoinHandle<Result<(), String>>,
}

impl BenchmarkHandle {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns true if the task has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task to finish.
    pub async fn join(self) -> BenchmarkOutcome {
        match self.handle.await {
            Ok(Ok(())) => BenchmarkOutcome::Completed,
            Ok(Err(message)) => BenchmarkOutcome::Failed(message),
            Err(e) => BenchmarkOutcome::Failed(e.to_string()),
        }
    }
}

/// Spawn a benchmarking task for `job` and return immediately.
///
/// The report is written to `results` when the runner succeeds. Runner
/// failures are logged and surface only through [`BenchmarkHandle::join`].
pub fn spawn_benchmark(
    runner: Arc<dyn BenchmarkRunner>,
    episodes: u64,
    job: BenchmarkingJob,
    pool: Option<WorkerPool>,
    results: UnboundedSender<BenchmarkReport>,
    label: String,
) -> BenchmarkHandle {
    let request = BenchmarkRequest {
        episodes,
        job,
        pool,
        label: label.clone(),
    };

    let handle = tokio::spawn(async move {
        let iteration = request.job.iteration;
        let row = request.job.participants[0].display_name();
        let column = request.job.participants[1].display_name();
        let label = request.label.clone();

        let cell = match runner.run(request).await {
            Ok(cell) => cell,
            Err(e) => {
                warn!(label = %label, error = %e, "benchmark failed");
                return Err(e.to_string());
            }
        };

        let report = BenchmarkReport {
            label: label.clone(),
            iteration,
            row,
            column,
            cell,
        };
        if results.send(report).is_err() {
            warn!(label = %label, "result queue closed, dropping report");
        }
        debug!(label = %label, "benchmark finished");
        Ok(())
    });

    BenchmarkHandle { label, handle }
}
