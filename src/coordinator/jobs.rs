// ABOUTME: BenchmarkingJob and the deduplicating job computation.
// ABOUTME: Jobs compare by iteration plus the unordered bag of participants.

use crate::error::SnapshotError;
use crate::snapshot::{AgentId, RecordedAgent};

/// A scheduled match between two agents recorded at the same iteration.
///
/// Participant order is kept for dispatch and labelling but ignored by
/// equality: `[A, B] == [B, A]`, while `[A, B] != [A, A]`.
#[derive(Debug, Clone)]
pub struct BenchmarkingJob {
    /// Iteration shared by both participants.
    pub iteration: u64,

    /// Ordered participants.
    pub participants: [RecordedAgent; 2],
}

impl BenchmarkingJob {
    /// Create a job for the given pairing.
    pub fn new(iteration: u64, first: RecordedAgent, second: RecordedAgent) -> Self {
        Self {
            iteration,
            participants: [first, second],
        }
    }

    /// Participant identities as a sorted bag.
    fn participant_bag(&self) -> [AgentId; 2] {
        let mut bag = [self.participants[0].id(), self.participants[1].id()];
        bag.sort();
        bag
    }

    /// Human-readable label encoding scheme names, agent names and iteration.
    pub fn label(&self) -> String {
        format!(
            "Benchmark:{} vs {}. iteration: {}",
            self.participants[0].display_name(),
            self.participants[1].display_name(),
            self.iteration
        )
    }

    /// True when an agent is paired with itself.
    pub fn is_self_match(&self) -> bool {
        self.participants[0].id() == self.participants[1].id()
    }
}

impl PartialEq for BenchmarkingJob {
    fn eq(&self, other: &Self) -> bool {
        self.iteration == other.iteration && self.participant_bag() == other.participant_bag()
    }
}

impl Eq for BenchmarkingJob {}

/// A newly scheduled job together with its label.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    pub label: String,
    pub job: BenchmarkingJob,
}

/// Whether an equal job has already been recorded.
pub fn is_job_recorded(job: &BenchmarkingJob, recorded_jobs: &[BenchmarkingJob]) -> bool {
    recorded_jobs.iter().any(|recorded| recorded == job)
}

/// Compute the jobs that become possible once an agent at `iteration` arrives.
///
/// Every agent recorded at `iteration` is cloned once, then the full ordered
/// Cartesian product (self-pairs included) is walked. A candidate not already
/// in `recorded_jobs` is appended there before moving on, so its reverse
/// pairing is rejected later in the same walk. Returned jobs are in the order
/// they were first encountered.
pub fn compute_new_jobs(
    recorded_agents: &[RecordedAgent],
    recorded_jobs: &mut Vec<BenchmarkingJob>,
    iteration: u64,
) -> Result<Vec<ScheduledJob>, SnapshotError> {
    let candidates = recorded_agents
        .iter()
        .filter(|agent| agent.iteration() == iteration)
        .map(RecordedAgent::isolated)
        .collect::<Result<Vec<_>, _>>()?;

    let mut scheduled = Vec::new();
    for first in &candidates {
        for second in &candidates {
            let job = BenchmarkingJob::new(iteration, first.clone(), second.clone());
            if is_job_recorded(&job, recorded_jobs) {
                continue;
            }
            recorded_jobs.push(job.clone());
            scheduled.push(ScheduledJob {
                label: job.label(),
                job,
            });
        }
    }

    Ok(scheduled)
}
