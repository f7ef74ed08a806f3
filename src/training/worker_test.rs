// ABOUTME: Tests for the training worker driver and worker launcher.
// ABOUTME: Uses a scripted trainer to check checkpoint spans, submissions and results files.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::mpsc;

use super::*;
use crate::error::TrainingError;
use crate::snapshot::{NamedScheme, ParameterSnapshot};

/// Trainer that bumps the first parameter once per episode.
#[derive(Default)]
struct ScriptedTrainer {
    calls: Mutex<Vec<(u64, u64, usize)>>,
    fail_at: Option<u64>,
}

#[async_trait]
impl SelfPlayTrainer for ScriptedTrainer {
    async fn train(&self, request: TrainingRequest) -> Result<TrainingOutcome, anyhow::Error> {
        self.calls.lock().unwrap().push((
            request.start_iteration,
            request.episodes,
            request.menagerie.len(),
        ));
        if self.fail_at == Some(request.start_iteration) {
            anyhow::bail!("diverged");
        }

        let current = ParameterSnapshot::from_shared(&request.agent)
            .ok_or_else(|| anyhow::anyhow!("unexpected agent type"))?;
        let mut trained = current.clone();
        trained.parameters[0] += request.episodes as f64;

        let mut menagerie = request.menagerie;
        menagerie.push(request.agent.clone_snapshot(None)?);

        let trajectories = (0..request.episodes)
            .map(|i| vec![Transition::new(vec![(request.start_iteration + i) as f64, 0.0])])
            .collect();

        Ok(TrainingOutcome {
            menagerie,
            agent: Arc::new(trained),
            trajectories,
        })
    }
}

fn worker(
    trainer: Arc<ScriptedTrainer>,
    checkpoints: &[u64],
    tx: mpsc::UnboundedSender<crate::snapshot::AgentSubmission>,
    dir: &TempDir,
) -> TrainingWorker {
    TrainingWorker::new(
        "worker-1",
        NamedScheme::shared("SP1"),
        trainer,
        ParameterSnapshot::shared("A1", vec![0.0]),
        checkpoints,
        tx,
        dir.path(),
    )
}

#[test]
fn test_normalize_checkpoints() {
    assert_eq!(normalize_checkpoints(&[10, 30, 25]), vec![10, 25, 30]);
    assert_eq!(normalize_checkpoints(&[5, 5, 1]), vec![1, 5]);
    assert!(normalize_checkpoints(&[]).is_empty());
}

#[tokio::test]
async fn test_unsorted_checkpoints_submit_in_ascending_order() {
    let dir = TempDir::new().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let trainer = Arc::new(ScriptedTrainer::default());

    let summary = worker(trainer.clone(), &[10, 30, 25], tx, &dir)
        .run()
        .await
        .unwrap();
    assert_eq!(summary.submitted, vec![10, 25, 30]);
    assert_eq!(summary.completed_iterations, 30);

    let mut iterations = Vec::new();
    while let Ok(submission) = rx.try_recv() {
        assert_eq!(submission.scheme.name(), "SP1");
        iterations.push(submission.iteration);
    }
    assert_eq!(iterations, vec![10, 25, 30]);

    let calls = trainer.calls.lock().unwrap().clone();
    assert_eq!(calls, vec![(0, 10, 0), (10, 15, 1), (25, 5, 2)]);
}

#[tokio::test]
async fn test_results_file_has_one_line_per_step() {
    let dir = TempDir::new().unwrap();
    let (tx, _rx) = mpsc::unbounded_channel();

    worker(Arc::new(ScriptedTrainer::default()), &[10, 30, 25], tx, &dir)
        .run()
        .await
        .unwrap();

    let content = std::fs::read_to_string(dir.path().join("SP1-A1.txt")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 30);
    for (step, line) in lines.iter().enumerate() {
        assert_eq!(*line, format!("{}, {:?}", step, step as f64));
    }
}

#[tokio::test]
async fn test_submitted_snapshots_are_persisted_clones() {
    let dir = TempDir::new().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    worker(Arc::new(ScriptedTrainer::default()), &[10, 25], tx, &dir)
        .run()
        .await
        .unwrap();

    let first = rx.try_recv().unwrap();
    let params = ParameterSnapshot::from_shared(&first.agent).unwrap();
    assert_eq!(params.parameters, vec![10.0]);

    let second = rx.try_recv().unwrap();
    let params = ParameterSnapshot::from_shared(&second.agent).unwrap();
    assert_eq!(params.parameters, vec![25.0]);

    let persisted = ParameterSnapshot::load(&snapshot_path(dir.path(), "worker-1", 25)).unwrap();
    assert_eq!(persisted.parameters, vec![25.0]);
    assert!(snapshot_path(dir.path(), "worker-1", 10).exists());
}

#[tokio::test]
async fn test_trainer_failure_stops_worker() {
    let dir = TempDir::new().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let trainer = Arc::new(ScriptedTrainer {
        calls: Mutex::new(Vec::new()),
        fail_at: Some(10),
    });

    let result = worker(trainer, &[10, 20], tx, &dir).run().await;
    match result {
        Err(TrainingError::Trainer { iteration, .. }) => assert_eq!(iteration, 10),
        other => panic!("Expected Trainer error, got {:?}", other),
    }
    assert_eq!(rx.try_recv().unwrap().iteration, 10);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_closed_queue_is_reported() {
    let dir = TempDir::new().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);

    let result = worker(Arc::new(ScriptedTrainer::default()), &[3], tx, &dir)
        .run()
        .await;
    assert!(matches!(
        result,
        Err(TrainingError::QueueClosed { iteration: 3, .. })
    ));
}

#[tokio::test]
async fn test_spawn_training_workers_creates_rewards_dir() {
    let dir = TempDir::new().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let trainer: Arc<dyn SelfPlayTrainer> = Arc::new(ScriptedTrainer::default());

    let jobs = vec![
        TrainingJob::new(
            "worker-1",
            NamedScheme::shared("SP1"),
            Arc::clone(&trainer),
            ParameterSnapshot::shared("A1", vec![0.0]),
        ),
        TrainingJob::new(
            "worker-2",
            NamedScheme::shared("SP2"),
            Arc::clone(&trainer),
            ParameterSnapshot::shared("A2", vec![0.0]),
        ),
    ];

    let handles = spawn_training_workers(&jobs, &[4, 2], &tx, dir.path())
        .await
        .unwrap();
    drop(tx);
    for handle in handles {
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.submitted, vec![2, 4]);
    }

    let rewards_dir = dir.path().join(EPISODIC_REWARDS_DIR);
    assert!(rewards_dir.join("SP1-A1.txt").exists());
    assert!(rewards_dir.join("SP2-A2.txt").exists());
    assert!(rewards_dir.join("worker-2_tp_it4.pt").exists());

    let mut received = 0;
    while rx.recv().await.is_some() {
        received += 1;
    }
    assert_eq!(received, 4);
}
