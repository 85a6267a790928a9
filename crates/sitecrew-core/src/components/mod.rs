//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior beyond small accessors - logic lives in systems.

mod agents;
mod zones;

pub use agents::*;
pub use zones::*;
