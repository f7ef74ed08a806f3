// ABOUTME: Root module for arena - self-play experiment coordination.
// ABOUTME: Re-exports the snapshot, coordinator, training and experiment layers.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod experiment;
pub mod prelude;
pub mod snapshot;
pub mod telemetry;
pub mod training;

pub use error::ArenaError;
