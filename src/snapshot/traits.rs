// ABOUTME: Defines the Snapshot and TrainingScheme traits - the opaque
// ABOUTME: agent and self-play scheme handles exchanged between workers.

use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use crate::error::SnapshotError;

/// A checkpointed agent that can be handed across tasks.
///
/// Implementations own whatever policy state the agent has. The only
/// operation the coordinator relies on is [`Snapshot::clone_snapshot`],
/// which must return a copy that shares no mutable state with `self`.
pub trait Snapshot: Send + Sync {
    /// Returns the agent's name.
    fn name(&self) -> &str;

    /// Produce an independent copy, optionally persisting it to `path`.
    fn clone_snapshot(&self, path: Option<&Path>) -> Result<Arc<dyn Snapshot>, SnapshotError>;

    /// Access to the concrete type, for trainers and benchmark runners.
    fn as_any(&self) -> &dyn Any;
}

/// A self-play training scheme (menagerie curation policy).
pub trait TrainingScheme: Send + Sync {
    /// Returns the scheme's name.
    fn name(&self) -> &str;
}

/// A training scheme identified only by its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedScheme {
    name: String,
}

impl NamedScheme {
    /// Create a scheme with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Create a scheme wrapped in Arc for sharing.
    pub fn shared(name: impl Into<String>) -> Arc<dyn TrainingScheme> {
        Arc::new(Self::new(name))
    }
}

impl TrainingScheme for NamedScheme {
    fn name(&self) -> &str {
        &self.name
    }
}
