//! Pure simulation logic for Sitecrew.
//!
//! This crate contains all game rules that are independent of the ECS world,
//! the random number generator, and any presentation layer. Functions take
//! plain data and return results, making them unit-testable and portable
//! between the engine crate and the headless harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`clock`] | Fixed-tick simulated clock with a discrete speed ladder |
//! | [`collision`] | Axis-separated movement resolution and arrival detection |
//! | [`constants`] | Centralized tuning values (speeds, costs, timings) |
//! | [`economy`] | Floor requirements, material rules, stock, leveling |
//! | [`fsm`] | Declarative per-role worker state machines |
//! | [`geometry`] | Point/Rect value types and overlap tests |
//! | [`grid`] | Discrete cell grid, cell↔pixel conversion, bounds |
//! | [`pathfinding`] | Grid A* with dynamic blockers, BFS reachability |

pub mod clock;
pub mod collision;
pub mod constants;
pub mod economy;
pub mod fsm;
pub mod geometry;
pub mod grid;
pub mod pathfinding;
