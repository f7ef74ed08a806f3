// ABOUTME: Experiment configuration loaded from JSON.
// ABOUTME: Holds the results path, checkpoint schedule, benchmark and pool settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::training::{EPISODIC_REWARDS_DIR, normalize_checkpoints};

fn default_results_path() -> PathBuf {
    PathBuf::from("results")
}

fn default_benchmarking_episodes() -> u64 {
    10
}

/// Settings for one self-play experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Directory all results are written under.
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,

    /// Iterations at which every worker submits an agent.
    pub checkpoint_at_iterations: Vec<u64>,

    /// Episodes played by each benchmarking match.
    #[serde(default = "default_benchmarking_episodes")]
    pub benchmarking_episodes: u64,

    /// Size of the shared worker pool. `None` runs without a pool.
    #[serde(default)]
    pub pool_workers: Option<u32>,
}

impl ExperimentConfig {
    /// Create a config with default results path and episodes.
    pub fn new(checkpoint_at_iterations: Vec<u64>) -> Self {
        Self {
            results_path: default_results_path(),
            checkpoint_at_iterations,
            benchmarking_episodes: default_benchmarking_episodes(),
            pool_workers: None,
        }
    }

    /// Set the results directory.
    pub fn results_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_path = path.into();
        self
    }

    /// Set the episodes per benchmark.
    pub fn benchmarking_episodes(mut self, episodes: u64) -> Self {
        self.benchmarking_episodes = episodes;
        self
    }

    /// Use a shared worker pool of the given size.
    pub fn pool_workers(mut self, workers: u32) -> Self {
        self.pool_workers = Some(workers);
        self
    }

    /// Load and validate a config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the config describes a runnable experiment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.checkpoint_at_iterations.is_empty() {
            return Err(ConfigError::Invalid(
                "checkpoint_at_iterations must not be empty".into(),
            ));
        }
        if self.benchmarking_episodes == 0 {
            return Err(ConfigError::Invalid(
                "benchmarking_episodes must be positive".into(),
            ));
        }
        if self.pool_workers == Some(0) {
            return Err(ConfigError::Invalid("pool_workers must be positive".into()));
        }
        Ok(())
    }

    /// Checkpoints in the order workers reach them.
    pub fn checkpoints(&self) -> Vec<u64> {
        normalize_checkpoints(&self.checkpoint_at_iterations)
    }

    /// Directory training workers write rewards and snapshots into.
    pub fn episodic_rewards_dir(&self) -> PathBuf {
        self.results_path.join(EPISODIC_REWARDS_DIR)
    }

    /// Agents the coordinator should wait for.
    pub fn expected_agents(&self, training_jobs: usize) -> usize {
        training_jobs * self.checkpoints().len()
    }
}
