// ABOUTME: Experiment driver - wires training workers, the Agent Queue, the
// ABOUTME: shared worker pool and the matchmaking coordinator into one run.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{info, warn};

use crate::config::ExperimentConfig;
use crate::coordinator::{
    BenchmarkReport, BenchmarkRunner, MatchmakingCoordinator, MatchmakingSettings,
    MatchmakingSummary, WorkerPool,
};
use crate::error::{ArenaError, ConfigError};
use crate::training::{TrainingJob, TrainingSummary, spawn_training_workers};

/// Outcome of a full experiment.
#[derive(Debug, Clone)]
pub struct ExperimentSummary {
    pub training: Vec<TrainingSummary>,
    pub matchmaking: MatchmakingSummary,
}

/// A self-play experiment: several training jobs benchmarked against each
/// other at every shared checkpoint.
pub struct Experiment {
    config: ExperimentConfig,
    jobs: Vec<TrainingJob>,
    runner: Arc<dyn BenchmarkRunner>,
}

impl Experiment {
    /// Create an experiment with no training jobs.
    pub fn new(config: ExperimentConfig, runner: Arc<dyn BenchmarkRunner>) -> Self {
        Self {
            config,
            jobs: Vec::new(),
            runner,
        }
    }

    /// Add a training job.
    pub fn training_job(mut self, job: TrainingJob) -> Self {
        self.jobs.push(job);
        self
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Run every worker to completion and wait for the coordinator to finish.
    ///
    /// Benchmark reports are written to `results` as matches complete.
    pub async fn run(
        self,
        results: UnboundedSender<BenchmarkReport>,
    ) -> Result<ExperimentSummary, ArenaError> {
        self.config.validate()?;
        if self.jobs.is_empty() {
            return Err(ConfigError::Invalid("experiment has no training jobs".into()).into());
        }

        let settings = MatchmakingSettings {
            expected_agents: self.config.expected_agents(self.jobs.len()),
            benchmarking_episodes: self.config.benchmarking_episodes,
        };
        info!(
            jobs = self.jobs.len(),
            expected_agents = settings.expected_agents,
            "experiment started"
        );

        let (agent_tx, agent_rx) = mpsc::unbounded_channel();
        let pool = self.config.pool_workers.map(WorkerPool::new);
        let coordinator =
            MatchmakingCoordinator::new(settings, agent_rx, self.runner, results, pool);
        let coordinator = tokio::spawn(coordinator.run());

        // Workers hold the only senders once this one is dropped.
        let spawned = spawn_training_workers(
            &self.jobs,
            &self.config.checkpoints(),
            &agent_tx,
            &self.config.results_path,
        )
        .await;
        drop(agent_tx);

        let workers = match spawned {
            Ok(workers) => workers,
            Err(e) => {
                let _ = coordinator.await;
                return Err(e.into());
            }
        };

        let mut training = Vec::with_capacity(workers.len());
        let mut first_error: Option<ArenaError> = None;
        for joined in futures::future::join_all(workers).await {
            match joined {
                Ok(Ok(summary)) => training.push(summary),
                Ok(Err(e)) => {
                    warn!(error = %e, "training worker failed");
                    first_error.get_or_insert(e.into());
                }
                Err(e) => {
                    warn!(error = %e, "training worker panicked");
                    first_error.get_or_insert(e.into());
                }
            }
        }

        let matchmaking = coordinator.await?;
        if let Some(e) = first_error {
            return Err(e);
        }
        let matchmaking = matchmaking?;

        info!(
            benchmarks = matchmaking.completed_benchmarks,
            "experiment finished"
        );
        Ok(ExperimentSummary {
            training,
            matchmaking,
        })
    }
}
