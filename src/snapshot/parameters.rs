// ABOUTME: ParameterSnapshot - a named parameter vector implementing Snapshot.
// ABOUTME: Clones are deep copies, optionally persisted to disk as JSON.

use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Snapshot;
use crate::error::SnapshotError;

/// An agent whose whole state is a flat vector of parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    /// Agent name.
    pub name: String,

    /// Policy parameters.
    pub parameters: Vec<f64>,
}

impl ParameterSnapshot {
    /// Create a new snapshot.
    pub fn new(name: impl Into<String>, parameters: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Create a snapshot wrapped in Arc for sharing.
    pub fn shared(name: impl Into<String>, parameters: Vec<f64>) -> Arc<dyn Snapshot> {
        Arc::new(Self::new(name, parameters))
    }

    /// Load a snapshot previously persisted by [`Snapshot::clone_snapshot`].
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = std::fs::read(path).map_err(|source| SnapshotError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Downcast a shared snapshot, if it is a `ParameterSnapshot`.
    pub fn from_shared(snapshot: &Arc<dyn Snapshot>) -> Option<&Self> {
        snapshot.as_any().downcast_ref::<Self>()
    }
}

impl Snapshot for ParameterSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn clone_snapshot(&self, path: Option<&Path>) -> Result<Arc<dyn Snapshot>, SnapshotError> {
        if let Some(path) = path {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|source| SnapshotError::Persist {
                        path: path.to_path_buf(),
                        source,
                    })?;
                }
            }
            let bytes = serde_json::to_vec(self)?;
            std::fs::write(path, bytes).map_err(|source| SnapshotError::Persist {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(Arc::new(self.clone()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clone_without_path() {
        let original = ParameterSnapshot::new("A1", vec![0.5, -0.5]);
        let copy = original.clone_snapshot(None).unwrap();

        let copy = copy.as_any().downcast_ref::<ParameterSnapshot>().unwrap();
        assert_eq!(copy, &original);
    }

    #[test]
    fn test_clone_persists_and_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("worker_tp_it10.pt");

        let original = ParameterSnapshot::new("A1", vec![1.5]);
        original.clone_snapshot(Some(&path)).unwrap();

        assert!(path.exists());
        let loaded = ParameterSnapshot::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = ParameterSnapshot::load(&dir.path().join("missing.pt"));
        assert!(matches!(result, Err(SnapshotError::Load { .. })));
    }

    #[test]
    fn test_from_shared_downcasts() {
        let shared = ParameterSnapshot::shared("A1", vec![3.0]);
        let concrete = ParameterSnapshot::from_shared(&shared).unwrap();
        assert_eq!(concrete.parameters, vec![3.0]);
    }
}
