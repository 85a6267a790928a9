//! Centralized tuning constants.
//!
//! All speeds are pixels per simulated second; all durations are simulated
//! seconds. The engine and the harness both read from here so a balance
//! change never has to touch two places.

/// Simulation tick length in seconds (30 ticks per second).
pub const TICK_SECONDS: f32 = 1.0 / 30.0;

/// Number of floors the construction project needs.
pub const MAX_FLOORS: u32 = 10;

// ── Stamina ─────────────────────────────────────────────────────────────

pub const BUILDER_BASE_STAMINA: f32 = 5.0;
pub const DELIVERY_BASE_STAMINA: f32 = 5.0;
/// The delivery worker's capacity grows by this much per completed floor.
pub const DELIVERY_STAMINA_PER_FLOOR: f32 = 2.0;
/// Stamina regained per second while resting in the dorm.
pub const STAMINA_REST_RATE: f32 = 0.25 / 1.5;
/// Stamina charged per completed delivery round trip.
pub const DELIVERY_TRIP_COST: f32 = 0.5;
/// Stamina charged once when a build reservation is made.
pub const STAMINA_BUILD_COST: f32 = 2.5;

// ── Movement ────────────────────────────────────────────────────────────

pub const WORKER_ACTIVE_SPEED: f32 = 85.0;
pub const WORKER_CARRY_SPEED: f32 = 75.0;
pub const WORKER_IDLE_SPEED: f32 = 28.0;
pub const PLAYER_SPEED: f32 = 150.0;
/// Euclidean distance at which an agent counts as having arrived at a point.
pub const APPROACH_BUFFER: f32 = 4.0;
/// Agents are clamped this many pixels inside the world border.
pub const WORLD_EDGE_PADDING: f32 = 2.0;

// ── Pathing ─────────────────────────────────────────────────────────────

/// While actively pursuing a target, force a replan this often.
pub const PATH_REPLAN_INTERVAL: f32 = 1.0;
/// Backoff after a failed path search before retrying the same goal.
pub const PATH_FAILURE_RETRY: f32 = 0.45;

// ── Economy ─────────────────────────────────────────────────────────────

pub const MATERIAL_BASE: u32 = 10;
pub const MATERIAL_PER_FLOOR: u32 = 5;
pub const BUILD_TIME_BASE: f32 = 5.0;
pub const BUILD_TIME_PER_FLOOR: f32 = 5.0;
/// Extra factor applied on top of the floor build time.
pub const BUILD_PROGRESS_SLOWDOWN: f32 = 1.5;
/// Time spent at the depot before cargo is claimed.
pub const DELIVERY_LOAD_TIME: f32 = 1.1;
/// Time spent at the site before cargo is added to stock.
pub const DELIVERY_DROP_TIME: f32 = 0.6;

// ── Player ──────────────────────────────────────────────────────────────

pub const PLAYER_INTERACT_COOLDOWN: f32 = 0.35;

// ── Energy drink buff ───────────────────────────────────────────────────

pub const BUFF_SPAWN_INTERVAL: f64 = 300.0;
pub const BUFF_DURATION: f64 = 60.0;
pub const BUFF_PLAYER_SPEED_MULT: f32 = 2.0;
pub const BUFF_WORKER_SPEED_MULT: f32 = 1.3;
pub const BUFF_BUILD_TIME_MULT: f32 = 0.9;

// ── World shape ─────────────────────────────────────────────────────────

pub const GRID_COLS: i32 = 38;
pub const GRID_ROWS: i32 = 20;
pub const CELL_SIZE: f32 = 30.0;
/// Zones and pickups keep this many cells away from the world border.
pub const EDGE_MARGIN: i32 = 1;

pub const WORKER_BODY_SIZE: f32 = 20.0;
pub const PLAYER_BODY_SIZE: f32 = 26.0;
