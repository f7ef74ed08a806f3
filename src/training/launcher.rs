// ABOUTME: Spawns one TrainingWorker task per training job after creating
// ABOUTME: the shared episodic_rewards results directory.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::info;

use super::trainer::SelfPlayTrainer;
use super::worker::{TrainingSummary, TrainingWorker};
use crate::error::TrainingError;
use crate::snapshot::{AgentSubmission, Snapshot, TrainingScheme};

/// Directory under the results path that workers write into.
pub const EPISODIC_REWARDS_DIR: &str = "episodic_rewards";

/// A training algorithm, its starting agent and the scheme to train it with.
#[derive(Clone)]
pub struct TrainingJob {
    pub name: String,
    pub scheme: Arc<dyn TrainingScheme>,
    pub trainer: Arc<dyn SelfPlayTrainer>,
    pub agent: Arc<dyn Snapshot>,
}

impl TrainingJob {
    pub fn new(
        name: impl Into<String>,
        scheme: Arc<dyn TrainingScheme>,
        trainer: Arc<dyn SelfPlayTrainer>,
        agent: Arc<dyn Snapshot>,
    ) -> Self {
        Self {
            name: name.into(),
            scheme,
            trainer,
            agent,
        }
    }
}

/// Create `<results_path>/episodic_rewards/` and spawn a worker per job.
///
/// Returned handles resolve once each worker exhausts its checkpoints.
pub async fn spawn_training_workers(
    jobs: &[TrainingJob],
    checkpoints: &[u64],
    agent_queue: &UnboundedSender<AgentSubmission>,
    results_path: &Path,
) -> Result<Vec<JoinHandle<Result<TrainingSummary, TrainingError>>>, TrainingError> {
    let rewards_dir = results_path.join(EPISODIC_REWARDS_DIR);
    tokio::fs::create_dir_all(&rewards_dir).await?;

    let names: Vec<&str> = jobs.iter().map(|job| job.name.as_str()).collect();
    info!(count = jobs.len(), jobs = %names.join(", "), "spawning training workers");

    let handles = jobs
        .iter()
        .map(|job| {
            let worker = TrainingWorker::new(
                job.name.clone(),
                Arc::clone(&job.scheme),
                Arc::clone(&job.trainer),
                Arc::clone(&job.agent),
                checkpoints,
                agent_queue.clone(),
                rewards_dir.clone(),
            );
            tokio::spawn(worker.run())
        })
        .collect();

    info!("all training workers spawned");
    Ok(handles)
}
