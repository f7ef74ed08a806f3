// ABOUTME: Snapshot module - agent and training-scheme capabilities.
// ABOUTME: Defines the Agent Queue message and the coordinator's agent records.

mod parameters;
mod recorded;
mod traits;

pub use parameters::*;
pub use recorded::*;
pub use traits::*;
