// ABOUTME: MatchmakingCoordinator - consumes the Agent Queue, schedules
// ABOUTME: deduplicated benchmarks and shuts down once every agent has arrived.

use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::dispatch::{
    BenchmarkHandle, BenchmarkOutcome, BenchmarkReport, BenchmarkRunner, spawn_benchmark,
};
use super::jobs::{BenchmarkingJob, compute_new_jobs};
use super::pool::WorkerPool;
use crate::error::CoordinatorError;
use crate::snapshot::{AgentSubmission, RecordedAgent};

/// Fixed parameters of a matchmaking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchmakingSettings {
    /// Number of agents to receive before shutting down.
    pub expected_agents: usize,

    /// Episodes played by each benchmarking match.
    pub benchmarking_episodes: u64,
}

/// What the coordinator did over its lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchmakingSummary {
    pub received_agents: usize,
    pub scheduled_jobs: usize,
    pub completed_benchmarks: usize,
    pub failed_benchmarks: usize,
}

/// Matchmaking coordinator.
///
/// Single-owner state machine: the registries live in the coordinator and
/// are only touched by [`MatchmakingCoordinator::run`], so no locking is
/// needed. The only suspension point of the main loop is the Agent Queue
/// receive; termination is checked once per received agent, right after
/// that agent's jobs have been dispatched.
pub struct MatchmakingCoordinator {
    settings: MatchmakingSettings,
    agent_queue: UnboundedReceiver<AgentSubmission>,
    runner: Arc<dyn BenchmarkRunner>,
    results: UnboundedSender<BenchmarkReport>,
    pool: Option<WorkerPool>,
    done: watch::Sender<bool>,

    received_count: usize,
    recorded_agents: Vec<RecordedAgent>,
    recorded_jobs: Vec<BenchmarkingJob>,
    live_benchmarks: Vec<BenchmarkHandle>,
}

impl MatchmakingCoordinator {
    /// Create a coordinator reading from `agent_queue`.
    pub fn new(
        settings: MatchmakingSettings,
        agent_queue: UnboundedReceiver<AgentSubmission>,
        runner: Arc<dyn BenchmarkRunner>,
        results: UnboundedSender<BenchmarkReport>,
        pool: Option<WorkerPool>,
    ) -> Self {
        let (done, _) = watch::channel(false);
        Self {
            settings,
            agent_queue,
            runner,
            results,
            pool,
            done,
            received_count: 0,
            recorded_agents: Vec::new(),
            recorded_jobs: Vec::new(),
            live_benchmarks: Vec::new(),
        }
    }

    /// Subscribe to the done signal. Flips to `true` once the coordinator
    /// has joined every benchmark and shut the pool down.
    pub fn subscribe_done(&self) -> watch::Receiver<bool> {
        self.done.subscribe()
    }

    /// Run until the expected number of agents has been received.
    ///
    /// Returns an error if the Agent Queue closes first; outstanding
    /// benchmarks are still joined and the pool is still shut down.
    pub async fn run(mut self) -> Result<MatchmakingSummary, CoordinatorError> {
        info!(
            expected_agents = self.settings.expected_agents,
            "matchmaking started"
        );

        loop {
            let Some(submission) = self.agent_queue.recv().await else {
                let received = self.received_count;
                let expected = self.settings.expected_agents;
                warn!(received, expected, "agent queue closed early");
                self.shutdown().await;
                return Err(CoordinatorError::QueueClosed { received, expected });
            };

            if let Err(e) = self.receive(submission) {
                self.shutdown().await;
                return Err(e);
            }

            if self.termination_due() {
                return Ok(self.shutdown().await);
            }
        }
    }

    /// Record one agent and dispatch the jobs it makes possible.
    fn receive(&mut self, submission: AgentSubmission) -> Result<(), CoordinatorError> {
        self.received_count += 1;
        info!(
            iteration = submission.iteration,
            scheme = %submission.scheme.name(),
            agent = %submission.agent.name(),
            "received agent {}/{}",
            self.received_count,
            self.settings.expected_agents
        );

        let iteration = submission.iteration;
        self.recorded_agents.push(RecordedAgent::record(submission));

        let jobs = compute_new_jobs(&self.recorded_agents, &mut self.recorded_jobs, iteration)?;
        for scheduled in jobs {
            debug!(label = %scheduled.label, "dispatching benchmark");
            let handle = spawn_benchmark(
                Arc::clone(&self.runner),
                self.settings.benchmarking_episodes,
                scheduled.job,
                self.pool.clone(),
                self.results.clone(),
                scheduled.label,
            );
            self.live_benchmarks.push(handle);
        }

        Ok(())
    }

    fn termination_due(&self) -> bool {
        self.received_count >= self.settings.expected_agents
    }

    /// Join every benchmark in registration order, then shut the pool down.
    async fn shutdown(&mut self) -> MatchmakingSummary {
        let mut summary = MatchmakingSummary {
            received_agents: self.received_count,
            scheduled_jobs: self.recorded_jobs.len(),
            ..Default::default()
        };

        info!(
            benchmarks = self.live_benchmarks.len(),
            "waiting for benchmarks to finish"
        );
        for handle in self.live_benchmarks.drain(..) {
            let label = handle.label().to_string();
            match handle.join().await {
                BenchmarkOutcome::Completed => summary.completed_benchmarks += 1,
                BenchmarkOutcome::Failed(error) => {
                    warn!(label = %label, error = %error, "benchmark did not complete");
                    summary.failed_benchmarks += 1;
                }
            }
        }

        if let Some(pool) = &self.pool {
            pool.shutdown().await;
        }

        info!(
            received = summary.received_agents,
            completed = summary.completed_benchmarks,
            failed = summary.failed_benchmarks,
            "matchmaking finished"
        );
        self.done.send_replace(true);
        summary
    }
}
