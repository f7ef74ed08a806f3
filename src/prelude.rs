// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use arena::prelude::*;` to get started quickly.

pub use crate::config::ExperimentConfig;
pub use crate::coordinator::{
    BenchmarkReport, BenchmarkRequest, BenchmarkRunner, BenchmarkingJob, MatchmakingCoordinator,
    MatchmakingSettings, MatchmakingSummary, WorkerPool,
};
pub use crate::error::{
    ArenaError, ConfigError, CoordinatorError, PoolError, SnapshotError, TrainingError,
};
pub use crate::experiment::{Experiment, ExperimentSummary};
pub use crate::snapshot::{
    AgentSubmission, NamedScheme, ParameterSnapshot, RecordedAgent, Snapshot, TrainingScheme,
};
pub use crate::training::{
    SelfPlayTrainer, TrainingJob, TrainingOutcome, TrainingRequest, TrainingSummary, Trajectory,
    Transition,
};
