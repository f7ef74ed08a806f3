// ABOUTME: RecordedAgent and AgentSubmission - what training workers send and
// ABOUTME: what the coordinator keeps in its append-only agent registry.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use super::{Snapshot, TrainingScheme};
use crate::error::SnapshotError;

/// Identity of a recorded agent. Survives snapshot cloning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(Uuid);

impl AgentId {
    /// Allocate a fresh identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message carried by the Agent Queue from a training worker to the coordinator.
#[derive(Clone)]
pub struct AgentSubmission {
    /// Checkpoint iteration the agent was trained up to.
    pub iteration: u64,

    /// Scheme the agent was trained with.
    pub scheme: Arc<dyn TrainingScheme>,

    /// Snapshot of the trained agent.
    pub agent: Arc<dyn Snapshot>,
}

impl AgentSubmission {
    /// Create a new submission.
    pub fn new(iteration: u64, scheme: Arc<dyn TrainingScheme>, agent: Arc<dyn Snapshot>) -> Self {
        Self {
            iteration,
            scheme,
            agent,
        }
    }
}

impl fmt::Debug for AgentSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentSubmission")
            .field("iteration", &self.iteration)
            .field("scheme", &self.scheme.name())
            .field("agent", &self.agent.name())
            .finish()
    }
}

/// An agent received by the coordinator. Immutable once recorded.
///
/// Two records are distinct participants whenever their ids differ, even if
/// their snapshots hold identical parameters.
#[derive(Clone)]
pub struct RecordedAgent {
    id: AgentId,
    iteration: u64,
    scheme: Arc<dyn TrainingScheme>,
    agent: Arc<dyn Snapshot>,
}

impl RecordedAgent {
    /// Record a submission under a fresh identity.
    pub fn record(submission: AgentSubmission) -> Self {
        Self {
            id: AgentId::new(),
            iteration: submission.iteration,
            scheme: submission.scheme,
            agent: submission.agent,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn scheme(&self) -> &Arc<dyn TrainingScheme> {
        &self.scheme
    }

    pub fn agent(&self) -> &Arc<dyn Snapshot> {
        &self.agent
    }

    /// Copy of this record holding an independent clone of the snapshot.
    ///
    /// The identity is kept so job equality still recognises the participant.
    pub fn isolated(&self) -> Result<Self, SnapshotError> {
        Ok(Self {
            id: self.id,
            iteration: self.iteration,
            scheme: Arc::clone(&self.scheme),
            agent: self.agent.clone_snapshot(None)?,
        })
    }

    /// `(scheme,agent)` pair used in benchmark labels.
    pub fn display_name(&self) -> String {
        format!("({},{})", self.scheme.name(), self.agent.name())
    }
}

impl fmt::Debug for RecordedAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordedAgent")
            .field("id", &self.id)
            .field("iteration", &self.iteration)
            .field("scheme", &self.scheme.name())
            .field("agent", &self.agent.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{NamedScheme, ParameterSnapshot};

    fn submission(name: &str) -> AgentSubmission {
        AgentSubmission::new(
            5,
            NamedScheme::shared("SP1"),
            ParameterSnapshot::shared(name, vec![1.0, 2.0]),
        )
    }

    #[test]
    fn test_record_assigns_distinct_ids() {
        let a = RecordedAgent::record(submission("A1"));
        let b = RecordedAgent::record(submission("A1"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_isolated_keeps_identity_and_copies_snapshot() {
        let recorded = RecordedAgent::record(submission("A1"));
        let isolated = recorded.isolated().unwrap();

        assert_eq!(isolated.id(), recorded.id());
        assert_eq!(isolated.iteration(), 5);
        assert_eq!(isolated.agent().name(), "A1");
        assert!(!Arc::ptr_eq(isolated.agent(), recorded.agent()));
    }

    #[test]
    fn test_display_name() {
        let recorded = RecordedAgent::record(submission("A1"));
        assert_eq!(recorded.display_name(), "(SP1,A1)");
    }
}
