// ABOUTME: Training module - checkpointed self-play training workers.
// ABOUTME: Defines the trainer contract, the worker driver and the rewards log.

mod launcher;
mod rewards;
mod trainer;
mod worker;

pub use launcher::*;
pub use rewards::*;
pub use trainer::*;
pub use worker::*;

#[cfg(test)]
mod worker_test;
