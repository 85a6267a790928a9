//! Sitecrew Core - Construction Site Simulation Engine
//!
//! An ECS-based simulation of a small construction crew racing to raise a
//! ten-floor building: a builder who turns stockpiled materials into floors,
//! a delivery worker hauling from depots, and a player agent who hands out
//! orders and the occasional coffee.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: The two workers and the player
//! - **Components**: Pure data attached to entities (Body, Navigator, Stamina, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! # Example
//!
//! ```rust,no_run
//! use sitecrew_core::prelude::*;
//! use sitecrew_core::generation::WorldConfig;
//! use sitecrew_logic::constants::TICK_SECONDS;
//!
//! let mut engine = SimulationEngine::new();
//! engine.generate(WorldConfig::default());
//!
//! loop {
//!     engine.update(TICK_SECONDS);
//! }
//! ```

pub mod components;
pub mod engine;
pub mod feed;
pub mod generation;
pub mod snapshot;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::SimulationEngine;
}
