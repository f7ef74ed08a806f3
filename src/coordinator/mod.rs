// ABOUTME: Coordinator module - matchmaking between recorded agents.
// ABOUTME: Contains job deduplication, benchmark dispatch and the shared worker pool.

mod dispatch;
mod jobs;
mod matchmaking;
mod pool;

pub use dispatch::{
    BenchmarkHandle, BenchmarkOutcome, BenchmarkReport, BenchmarkRequest, BenchmarkRunner,
    spawn_benchmark,
};
pub use jobs::{BenchmarkingJob, ScheduledJob, compute_new_jobs, is_job_recorded};
pub use matchmaking::{MatchmakingCoordinator, MatchmakingSettings, MatchmakingSummary};
pub use pool::WorkerPool;
