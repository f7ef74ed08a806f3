// ABOUTME: Command-line driver that runs a self-play experiment end to end.
// ABOUTME: Ships a deterministic demo trainer and benchmark runner.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{Level, info};

use arena::prelude::*;
use arena::telemetry::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "arena", version, about = "Run a self-play benchmarking experiment")]
struct Cli {
    /// JSON experiment config. Flags below override its values.
    #[arg(short, long, env = "ARENA_CONFIG")]
    config: Option<PathBuf>,

    /// Directory results are written under.
    #[arg(long)]
    results_path: Option<PathBuf>,

    /// Comma-separated checkpoint iterations.
    #[arg(long, value_delimiter = ',')]
    checkpoints: Vec<u64>,

    /// Episodes per benchmarking match.
    #[arg(long)]
    episodes: Option<u64>,

    /// Shared worker pool size.
    #[arg(long)]
    workers: Option<u32>,

    /// Number of demo training jobs.
    #[arg(long, default_value_t = 2)]
    trainers: usize,

    /// Emit JSON log lines.
    #[arg(long)]
    json_logs: bool,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn experiment_config(&self) -> Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::from_file(path)?,
            None => ExperimentConfig::new(vec![10, 20, 30]),
        };
        if let Some(path) = &self.results_path {
            config.results_path = path.clone();
        }
        if !self.checkpoints.is_empty() {
            config.checkpoint_at_iterations = self.checkpoints.clone();
        }
        if let Some(episodes) = self.episodes {
            config.benchmarking_episodes = episodes;
        }
        if let Some(workers) = self.workers {
            config.pool_workers = Some(workers);
        }
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Demo trainer
// ============================================================================

/// Moves the agent's single parameter toward a target, one step per episode.
struct DemoTrainer {
    target: f64,
    learning_rate: f64,
    menagerie_size: usize,
}

#[async_trait]
impl SelfPlayTrainer for DemoTrainer {
    async fn train(&self, request: TrainingRequest) -> Result<TrainingOutcome, anyhow::Error> {
        let mut agent = ParameterSnapshot::from_shared(&request.agent)
            .context("demo trainer needs a parameter snapshot")?
            .clone();

        let parameter = agent
            .parameters
            .first_mut()
            .context("demo trainer needs a non-empty parameter vector")?;

        let mut trajectories = Vec::with_capacity(request.episodes as usize);
        for _ in 0..request.episodes {
            let gap = self.target - *parameter;
            *parameter += self.learning_rate * gap;
            trajectories.push(vec![Transition::new(vec![-gap.abs(), gap.abs()])]);
        }

        let mut menagerie = request.menagerie;
        menagerie.push(request.agent.clone_snapshot(None)?);
        if menagerie.len() > self.menagerie_size {
            menagerie.remove(0);
        }

        Ok(TrainingOutcome {
            menagerie,
            agent: Arc::new(agent),
            trajectories,
        })
    }
}

// ============================================================================
// Demo benchmark runner
// ============================================================================

/// Plays each episode on the shared pool. The higher parameter wins unless
/// the episode's noise flips the margin; mirror matches always draw.
struct DemoRunner;

fn play_episode(a: f64, b: f64, episode: u64) -> i8 {
    let noise = (episode as f64 * 1.7).sin();
    let margin = (a - b) * (1.0 + 2.0 * noise);
    if margin > 1e-9 {
        1
    } else if margin < -1e-9 {
        -1
    } else {
        0
    }
}

#[async_trait]
impl BenchmarkRunner for DemoRunner {
    async fn run(&self, request: BenchmarkRequest) -> Result<serde_json::Value, anyhow::Error> {
        let first_parameter = |i: usize| {
            ParameterSnapshot::from_shared(request.job.participants[i].agent())
                .context("demo runner needs parameter snapshots")?
                .parameters
                .first()
                .copied()
                .context("demo runner needs a non-empty parameter vector")
        };
        let (a, b) = (first_parameter(0)?, first_parameter(1)?);

        let mut outcomes = Vec::with_capacity(request.episodes as usize);
        for episode in 0..request.episodes {
            let outcome = match &request.pool {
                Some(pool) => {
                    pool.submit_blocking(move || play_episode(a, b, episode))
                        .await?
                        .await?
                }
                None => play_episode(a, b, episode),
            };
            outcomes.push(outcome);
        }

        let wins = outcomes.iter().filter(|&&o| o > 0).count();
        let losses = outcomes.iter().filter(|&&o| o < 0).count();
        Ok(serde_json::json!({
            "wins": wins,
            "losses": losses,
            "draws": outcomes.len() - wins - losses,
        }))
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json_logs, level);

    let config = cli.experiment_config()?;
    tokio::fs::create_dir_all(&config.results_path)
        .await
        .with_context(|| format!("creating {}", config.results_path.display()))?;

    let mut experiment = Experiment::new(config.clone(), Arc::new(DemoRunner));
    for i in 0..cli.trainers {
        experiment = experiment.training_job(TrainingJob::new(
            format!("demo-{i}"),
            NamedScheme::shared(format!("SP{}", i + 1)),
            Arc::new(DemoTrainer {
                target: (i + 1) as f64,
                learning_rate: 0.05,
                menagerie_size: 5,
            }),
            ParameterSnapshot::shared(format!("A{}", i + 1), vec![0.0]),
        ));
    }

    // Stand-in aggregator: one JSON line per confusion-matrix cell.
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<BenchmarkReport>();
    let report_path = config.results_path.join("benchmarks.jsonl");
    let aggregator = tokio::spawn(async move {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .await?;
        while let Some(report) = result_rx.recv().await {
            let mut line = serde_json::to_string(&report)?;
            line.push('\n');
            file.write_all(line.as_bytes()).await?;
        }
        file.flush().await?;
        Ok::<_, anyhow::Error>(())
    });

    let summary = experiment.run(result_tx).await?;
    aggregator.await??;

    info!(
        agents = summary.matchmaking.received_agents,
        benchmarks = summary.matchmaking.completed_benchmarks,
        failed = summary.matchmaking.failed_benchmarks,
        "done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_checkpoints() {
        let cli = Cli::parse_from(["arena", "--checkpoints", "30,10,20", "--workers", "4"]);
        let config = cli.experiment_config().unwrap();
        assert_eq!(config.checkpoints(), vec![10, 20, 30]);
        assert_eq!(config.pool_workers, Some(4));
    }

    #[test]
    fn test_play_episode_prefers_higher_parameter() {
        assert_eq!(play_episode(2.0, 1.0, 0), 1);
        assert_eq!(play_episode(1.0, 2.0, 0), -1);
        assert_eq!(play_episode(1.0, 1.0, 0), 0);
    }

    #[tokio::test]
    async fn test_demo_trainer_approaches_target() {
        let trainer = DemoTrainer {
            target: 1.0,
            learning_rate: 0.5,
            menagerie_size: 1,
        };
        let outcome = trainer
            .train(TrainingRequest {
                agent: ParameterSnapshot::shared("A1", vec![0.0]),
                scheme: NamedScheme::shared("SP1"),
                menagerie: Vec::new(),
                episodes: 2,
                start_iteration: 0,
            })
            .await
            .unwrap();

        let agent = ParameterSnapshot::from_shared(&outcome.agent).unwrap();
        assert_eq!(agent.parameters, vec![0.75]);
        assert_eq!(outcome.trajectories.len(), 2);
        assert_eq!(outcome.menagerie.len(), 1);
    }

    #[tokio::test]
    async fn test_demo_trainer_rejects_empty_parameters() {
        let trainer = DemoTrainer {
            target: 1.0,
            learning_rate: 0.5,
            menagerie_size: 1,
        };
        let result = trainer
            .train(TrainingRequest {
                agent: ParameterSnapshot::shared("A1", Vec::new()),
                scheme: NamedScheme::shared("SP1"),
                menagerie: Vec::new(),
                episodes: 2,
                start_iteration: 0,
            })
            .await;

        let err = result.err().unwrap();
        assert!(err.to_string().contains("non-empty parameter vector"));
    }

    #[tokio::test]
    async fn test_demo_runner_rejects_empty_parameters() {
        let empty = RecordedAgent::record(AgentSubmission::new(
            1,
            NamedScheme::shared("SP1"),
            ParameterSnapshot::shared("A1", Vec::new()),
        ));
        let request = BenchmarkRequest {
            episodes: 3,
            job: BenchmarkingJob::new(1, empty.clone(), empty),
            pool: None,
            label: "empty".to_string(),
        };

        let err = DemoRunner.run(request).await.unwrap_err();
        assert!(err.to_string().contains("non-empty parameter vector"));
    }

    #[tokio::test]
    async fn test_demo_experiment_writes_reports() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ExperimentConfig::new(vec![3])
            .results_path(dir.path())
            .benchmarking_episodes(3)
            .pool_workers(2);

        let (result_tx, mut result_rx) = mpsc::unbounded_channel();
        let summary = Experiment::new(config, Arc::new(DemoRunner))
            .training_job(TrainingJob::new(
                "demo-0",
                NamedScheme::shared("SP1"),
                Arc::new(DemoTrainer {
                    target: 1.0,
                    learning_rate: 0.1,
                    menagerie_size: 2,
                }),
                ParameterSnapshot::shared("A1", vec![0.0]),
            ))
            .run(result_tx)
            .await
            .unwrap();

        assert_eq!(summary.matchmaking.completed_benchmarks, 1);
        let report = result_rx.recv().await.unwrap();
        assert_eq!(report.cell["draws"], 3);
    }
}
