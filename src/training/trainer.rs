// ABOUTME: Defines the SelfPlayTrainer trait - the opaque training algorithm
// ABOUTME: a worker drives between checkpoints, plus its request/outcome types.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::snapshot::{Snapshot, TrainingScheme};

/// One environment step as seen by the results writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Reward for each participant, first participant first.
    pub rewards: Vec<f64>,
}

impl Transition {
    pub fn new(rewards: Vec<f64>) -> Self {
        Self { rewards }
    }
}

/// Transitions of one training episode.
pub type Trajectory = Vec<Transition>;

/// Input to one span of self-play training.
#[derive(Clone)]
pub struct TrainingRequest {
    /// Agent to continue training.
    pub agent: Arc<dyn Snapshot>,

    /// Scheme curating the menagerie of opponents.
    pub scheme: Arc<dyn TrainingScheme>,

    /// Opponents gathered so far.
    pub menagerie: Vec<Arc<dyn Snapshot>>,

    /// Number of additional episodes to train.
    pub episodes: u64,

    /// Episodes already completed before this span.
    pub start_iteration: u64,
}

/// Output of one span of self-play training.
pub struct TrainingOutcome {
    /// Updated menagerie.
    pub menagerie: Vec<Arc<dyn Snapshot>>,

    /// The trained agent. Still owned by the worker; clone before sharing.
    pub agent: Arc<dyn Snapshot>,

    /// One trajectory per episode trained in this span.
    pub trajectories: Vec<Trajectory>,
}

/// A self-play training algorithm.
///
/// Implementations own their environment and learning algorithm.
#[async_trait]
pub trait SelfPlayTrainer: Send + Sync {
    /// Train `request.episodes` more episodes.
    async fn train(&self, request: TrainingRequest) -> Result<TrainingOutcome, anyhow::Error>;
}
