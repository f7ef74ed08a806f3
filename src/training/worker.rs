// ABOUTME: TrainingWorker - drives a self-play trainer checkpoint by checkpoint,
// ABOUTME: submitting a cloned agent to the Agent Queue at every checkpoint.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use super::rewards::write_episodic_rewards;
use super::trainer::{SelfPlayTrainer, TrainingRequest};
use crate::error::TrainingError;
use crate::snapshot::{AgentSubmission, Snapshot, TrainingScheme};

/// Sort checkpoint iterations ascending and drop duplicates.
pub fn normalize_checkpoints(checkpoints: &[u64]) -> Vec<u64> {
    let mut sorted = checkpoints.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}

/// Path a worker persists its checkpoint snapshot to.
pub fn snapshot_path(results_path: &Path, worker: &str, iteration: u64) -> PathBuf {
    results_path.join(format!("{}_tp_it{}.pt", worker, iteration))
}

/// Results file for a scheme/agent pair.
pub fn rewards_path(results_path: &Path, scheme: &str, agent: &str) -> PathBuf {
    results_path.join(format!("{}-{}.txt", scheme, agent))
}

/// What a worker did over its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSummary {
    pub worker: String,
    pub completed_iterations: u64,
    pub submitted: Vec<u64>,
}

/// A training worker.
///
/// State is `(completed_iterations, menagerie, current_agent)`; it advances
/// once per checkpoint in ascending order.
pub struct TrainingWorker {
    name: String,
    scheme: Arc<dyn TrainingScheme>,
    trainer: Arc<dyn SelfPlayTrainer>,
    agent: Arc<dyn Snapshot>,
    checkpoints: Vec<u64>,
    agent_queue: UnboundedSender<AgentSubmission>,
    results_path: PathBuf,
}

impl TrainingWorker {
    /// Create a worker. `checkpoints` may be given in any order.
    pub fn new(
        name: impl Into<String>,
        scheme: Arc<dyn TrainingScheme>,
        trainer: Arc<dyn SelfPlayTrainer>,
        agent: Arc<dyn Snapshot>,
        checkpoints: &[u64],
        agent_queue: UnboundedSender<AgentSubmission>,
        results_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            scheme,
            trainer,
            agent,
            checkpoints: normalize_checkpoints(checkpoints),
            agent_queue,
            results_path: results_path.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Train through every checkpoint, then return.
    pub async fn run(self) -> Result<TrainingSummary, TrainingError> {
        info!(worker = %self.name, checkpoints = ?self.checkpoints, "training started");
        let started = Instant::now();

        let mut completed_iterations = 0u64;
        let mut menagerie = Vec::new();
        let mut current_agent = Arc::clone(&self.agent);
        let mut submitted = Vec::with_capacity(self.checkpoints.len());

        for &target_iteration in &self.checkpoints {
            let episodes = target_iteration - completed_iterations;
            let span_started = Instant::now();

            let outcome = self
                .trainer
                .train(TrainingRequest {
                    agent: Arc::clone(&current_agent),
                    scheme: Arc::clone(&self.scheme),
                    menagerie,
                    episodes,
                    start_iteration: completed_iterations,
                })
                .await
                .map_err(|source| TrainingError::Trainer {
                    iteration: completed_iterations,
                    source,
                })?;
            let training_duration = span_started.elapsed();
            completed_iterations += episodes;

            let path = snapshot_path(&self.results_path, &self.name, target_iteration);
            let snapshot = outcome.agent.clone_snapshot(Some(&path))?;
            self.agent_queue
                .send(AgentSubmission::new(
                    target_iteration,
                    Arc::clone(&self.scheme),
                    snapshot,
                ))
                .map_err(|_| TrainingError::QueueClosed {
                    worker: self.name.clone(),
                    iteration: target_iteration,
                })?;
            submitted.push(target_iteration);
            info!(
                worker = %self.name,
                iteration = target_iteration,
                path = %path.display(),
                "submitted agent"
            );
            info!(
                worker = %self.name,
                from = target_iteration - episodes,
                to = target_iteration,
                seconds = training_duration.as_secs_f64(),
                "training span finished"
            );

            let rewards = rewards_path(
                &self.results_path,
                self.scheme.name(),
                current_agent.name(),
            );
            write_episodic_rewards(&rewards, target_iteration - episodes, &outcome.trajectories)
                .await?;

            menagerie = outcome.menagerie;
            current_agent = outcome.agent;
        }

        info!(
            worker = %self.name,
            seconds = started.elapsed().as_secs_f64(),
            "all training completed"
        );
        Ok(TrainingSummary {
            worker: self.name,
            completed_iterations,
            submitted,
        })
    }
}
