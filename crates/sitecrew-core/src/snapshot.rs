//! Read-only snapshots of the running simulation.
//!
//! A snapshot flattens the ECS world and shared resources into plain serde
//! structs, so observers (status displays, headless harnesses, logs) can
//! inspect or serialize the state without touching the engine.

use serde::{Deserialize, Serialize};

use crate::components::{Assignment, Body, CarriedItem, Player, Stamina, Worker};
use crate::engine::SimulationEngine;

/// Full observable state of the simulation at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSnapshot {
    /// Simulated seconds elapsed (frozen at the finish once complete).
    pub time: f64,
    pub speed: f32,
    pub paused: bool,
    pub complete: bool,
    /// Elapsed time at the moment of completion; zero until then.
    pub finish_time: f64,

    /// 1-based number of the floor under construction.
    pub floor: u32,
    /// Units of material the current floor requires.
    pub floor_need: u32,
    /// Build progress on the current floor, 0.0 to 1.0.
    pub floor_progress: f32,
    pub floors_built: u32,
    pub total_floors: u32,
    /// Label of the current floor's material.
    pub material: String,
    /// Stocked units of the current floor's material.
    pub stock: u32,

    pub workers: Vec<WorkerSnapshot>,
    pub player: Option<PlayerSnapshot>,
    pub buff_active: bool,
    /// Most recent status feed entry.
    pub status: Option<String>,
}

/// One worker's observable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSnapshot {
    pub id: String,
    pub name: String,
    pub role: String,
    /// Current job-cycle state name.
    pub state: String,
    pub order: String,
    pub activity: String,
    pub stamina: f32,
    pub max_stamina: f32,
    pub level: u32,
    pub x: f32,
    pub y: f32,
    pub visible: bool,
    pub carrying: u32,
}

/// The player's observable state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub carrying_coffee: bool,
}

impl SimSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl SimulationEngine {
    /// Capture the current state of the simulation.
    pub fn snapshot(&self) -> SimSnapshot {
        let material = self.economy.floor.material();
        let workers = self
            .crew_entities()
            .iter()
            .filter_map(|&entity| {
                let mut query = self
                    .world
                    .query_one::<(&Worker, &Assignment, &Body, &Stamina)>(entity)
                    .ok()?;
                let (worker, assign, body, stamina) = query.get()?;
                let center = body.center();
                Some(WorkerSnapshot {
                    id: worker.id.clone(),
                    name: worker.name.clone(),
                    role: worker.role().label().to_string(),
                    state: worker.fsm.state.name().to_string(),
                    order: assign.order.label().to_string(),
                    activity: assign.activity.label().to_string(),
                    stamina: stamina.current,
                    max_stamina: stamina.max,
                    level: worker.level,
                    x: center.x,
                    y: center.y,
                    visible: assign.visible,
                    carrying: assign.carrying,
                })
            })
            .collect();

        let player = self.player_entity().and_then(|entity| {
            let mut query = self.world.query_one::<(&Player, &Body)>(entity).ok()?;
            let (p, body) = query.get()?;
            let center = body.center();
            Some(PlayerSnapshot {
                x: center.x,
                y: center.y,
                carrying_coffee: p.item == Some(CarriedItem::Coffee),
            })
        });

        SimSnapshot {
            time: self.clock.display_time(),
            speed: self.clock.speed(),
            paused: self.clock.paused,
            complete: self.clock.complete,
            finish_time: self.clock.finish_time,
            floor: self.economy.floor.number,
            floor_need: self.economy.floor.need,
            floor_progress: self.economy.floor.progress,
            floors_built: self.economy.floors_built,
            total_floors: self.economy.total_floors,
            material: material.label().to_string(),
            stock: self.economy.stock_of(material),
            workers,
            player,
            buff_active: self.buff.is_active(self.clock.elapsed),
            status: self.events.latest().map(|event| event.message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::WorldConfig;

    fn generated() -> SimulationEngine {
        let mut engine = SimulationEngine::new();
        engine.generate(WorldConfig {
            seed: 11,
            total_floors: 3,
        });
        engine
    }

    #[test]
    fn snapshot_reflects_fresh_world() {
        let engine = generated();
        let snap = engine.snapshot();
        assert_eq!(snap.floor, 1);
        assert_eq!(snap.floors_built, 0);
        assert_eq!(snap.total_floors, 3);
        assert_eq!(snap.material, "Concrete");
        assert_eq!(snap.stock, 2);
        assert_eq!(snap.workers.len(), 2);
        assert!(snap.player.is_some());
        assert!(!snap.complete);
        assert!(snap.workers.iter().all(|w| w.visible));
        assert_eq!(snap.status.as_deref(), Some("Crew assembled. Awaiting orders."));
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let engine = generated();
        let snap = engine.snapshot();
        let json = snap.to_json().unwrap();
        let back = SimSnapshot::from_json(&json).unwrap();
        assert_eq!(back.workers.len(), snap.workers.len());
        assert_eq!(back.material, snap.material);
        assert_eq!(back.floor, snap.floor);
    }

    #[test]
    fn snapshot_tracks_the_clock() {
        let mut engine = generated();
        for _ in 0..60 {
            engine.update(1.0 / 30.0);
        }
        let snap = engine.snapshot();
        assert!((snap.time - 2.0).abs() < 0.01);
        assert_eq!(snap.speed, 1.0);
    }
}
