// ABOUTME: Episodic reward log - appends one "<step>, <avg reward>" line per
// ABOUTME: trained episode to a worker's results file.

use std::path::Path;

use tokio::io::AsyncWriteExt;

use super::trainer::Trajectory;

/// Average first-participant reward over a trajectory.
///
/// Empty trajectories average to `0.0`.
pub fn first_participant_average(trajectory: &Trajectory) -> f64 {
    if trajectory.is_empty() {
        return 0.0;
    }
    let total: f64 = trajectory
        .iter()
        .map(|t| t.rewards.first().copied().unwrap_or(0.0))
        .sum();
    total / trajectory.len() as f64
}

/// Render one results line.
pub fn format_reward_line(step: u64, average: f64) -> String {
    // Debug keeps a trailing ".0" on whole numbers.
    format!("{}, {:?}\n", step, average)
}

/// Append one line per trajectory, numbered from `first_step`.
///
/// The file is opened in append mode and never truncated.
pub async fn write_episodic_rewards(
    path: &Path,
    first_step: u64,
    trajectories: &[Trajectory],
) -> Result<(), std::io::Error> {
    let mut contents = String::new();
    for (step, trajectory) in (first_step..).zip(trajectories) {
        contents.push_str(&format_reward_line(step, first_participant_average(trajectory)));
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(contents.as_bytes()).await?;
    file.flush().await
}
