//! Simulation engine - main entry point for running the simulation

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use sitecrew_logic::clock::{format_time, SimClock};
use sitecrew_logic::economy::{Economy, FloorCompletion};
use sitecrew_logic::fsm::Role;
use sitecrew_logic::geometry::Point;

use crate::components::{Assignment, Body, Navigator, Order, Player, Stamina, Worker};
use crate::feed::EventLog;
use crate::generation::{generate_site, spawn_crew, spawn_player, SiteLayout, WorldConfig};
use crate::systems::{
    idle_wander_system, player_interact, player_movement_system, run_worker_orders,
    set_worker_order, update_buff, BuffState,
};

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing all entities
    pub world: World,
    /// Simulation clock: elapsed time, speed ladder, pause/completion state
    pub clock: SimClock,
    /// Material stock and floor progress
    pub economy: Economy,
    /// Energy drink pickup state
    pub buff: BuffState,
    /// Rolling status feed
    pub events: EventLog,

    layout: Option<SiteLayout>,
    /// Worker entities in processing order: builder first, then delivery.
    crew: Vec<Entity>,
    player: Option<Entity>,
    rng: StdRng,
    config: WorldConfig,
}

impl SimulationEngine {
    /// Create a new empty simulation
    pub fn new() -> Self {
        Self {
            world: World::new(),
            clock: SimClock::new(),
            economy: Economy::new(WorldConfig::default().total_floors),
            buff: BuffState::default(),
            events: EventLog::default(),
            layout: None,
            crew: Vec::new(),
            player: None,
            rng: StdRng::seed_from_u64(0),
            config: WorldConfig::default(),
        }
    }

    /// Generate the site and spawn the crew
    pub fn generate(&mut self, config: WorldConfig) {
        self.world = World::new();
        self.rng = StdRng::seed_from_u64(config.seed);

        let layout = generate_site(&mut self.world, &mut self.rng);
        self.player = Some(spawn_player(&mut self.world, &layout));
        self.crew = spawn_crew(&mut self.world, &layout);
        self.layout = Some(layout);

        self.economy = Economy::new(config.total_floors);
        self.clock = SimClock::new();
        self.buff = BuffState::default();
        self.events = EventLog::default();
        self.config = config;
        self.events.push("Crew assembled. Awaiting orders.");
    }

    /// Advance the simulation by one tick of `dt` real seconds.
    pub fn update(&mut self, dt: f32) {
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        let scaled = self.clock.advance(dt);
        self.events.set_now(self.clock.elapsed);

        // The interact cooldown keeps draining after completion so the
        // end-screen chatter stays throttled.
        let cooldown_delta = if self.clock.complete { dt } else { scaled };
        if let Some(player) = self.player {
            if let Ok(p) = self.world.query_one_mut::<&mut Player>(player) {
                if p.cooldown > 0.0 {
                    p.cooldown = (p.cooldown - cooldown_delta).max(0.0);
                }
            }
        }

        if scaled <= 0.0 {
            return;
        }

        let modifiers = self.buff.modifiers(self.clock.elapsed);

        if let Some(player) = self.player {
            player_movement_system(
                &mut self.world,
                player,
                layout,
                modifiers.player_speed,
                scaled,
            );
            if let Ok(rect) = self.world.get::<&Body>(player).map(|body| body.rect()) {
                update_buff(
                    &mut self.buff,
                    layout,
                    rect,
                    self.clock.elapsed,
                    &mut self.rng,
                    &mut self.events,
                );
            }
        }

        // Recompute in case the buff just activated or lapsed.
        let modifiers = self.buff.modifiers(self.clock.elapsed);

        let completion = run_worker_orders(
            &mut self.world,
            &self.crew,
            layout,
            &mut self.economy,
            &modifiers,
            scaled,
            &mut self.events,
            &mut self.rng,
        );

        if let Some(FloorCompletion::ProjectComplete { finished }) = completion {
            self.clock.finish();
            self.events.push(format!(
                "All {} floors complete in {}!",
                finished,
                format_time(self.clock.finish_time)
            ));
            return;
        }

        idle_wander_system(
            &mut self.world,
            &self.crew,
            layout,
            modifiers.worker_speed,
            scaled,
            &mut self.rng,
        );
    }

    /// Set the player's movement input, each axis in [-1, 1].
    pub fn set_player_input(&mut self, x: f32, y: f32) {
        if let Some(player) = self.player {
            if let Ok(p) = self.world.query_one_mut::<&mut Player>(player) {
                p.input = Point::new(x, y);
            }
        }
    }

    /// One press of the interact key.
    pub fn interact(&mut self) {
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        let Some(player) = self.player else {
            return;
        };
        player_interact(
            &mut self.world,
            player,
            &self.crew,
            layout,
            &self.economy,
            self.clock.complete,
            &mut self.events,
            &mut self.rng,
        );
    }

    /// Issue an order to the worker with the given role. Refused once the
    /// project is finished, until a restart.
    pub fn order_worker(&mut self, role: Role, order: Order) {
        if self.clock.complete {
            self.events
                .push("Project complete! Restart to assign new orders.");
            return;
        }
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        let Some(entity) = self.worker_by_role(role) else {
            return;
        };
        let Ok((worker, assign, nav, stamina)) = self.world.query_one_mut::<(
            &mut Worker,
            &mut Assignment,
            &mut Navigator,
            &Stamina,
        )>(entity) else {
            return;
        };
        set_worker_order(
            worker,
            assign,
            nav,
            stamina,
            &self.economy,
            layout,
            order,
            None,
            &mut self.events,
            &mut self.rng,
        );
    }

    /// Step to the next simulation speed.
    pub fn cycle_speed(&mut self) {
        match self.clock.cycle_speed() {
            Some(speed) => {
                self.events
                    .push(format!("Simulation speed set to {}x.", speed));
            }
            None => {
                self.events
                    .push("Speed locked: project is already complete.");
            }
        }
    }

    /// Toggle pause.
    pub fn toggle_pause(&mut self) {
        match self.clock.toggle_pause() {
            Some(true) => self.events.push("Simulation paused."),
            Some(false) => self.events.push("Simulation running."),
            None => self.events.push("Project complete! Restart to play again."),
        }
    }

    /// Reset the crew, economy, and clock on the existing site.
    pub fn restart(&mut self) {
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        for entity in self.crew.drain(..) {
            let _ = self.world.despawn(entity);
        }
        if let Some(player) = self.player.take() {
            let _ = self.world.despawn(player);
        }
        self.player = Some(spawn_player(&mut self.world, layout));
        self.crew = spawn_crew(&mut self.world, layout);

        self.economy = Economy::new(self.config.total_floors);
        self.clock = SimClock::new();
        self.buff = BuffState::default();
        self.events = EventLog::default();
        self.events.push("Project reset. Ready for another build!");
    }

    pub fn layout(&self) -> Option<&SiteLayout> {
        self.layout.as_ref()
    }

    pub fn player_entity(&self) -> Option<Entity> {
        self.player
    }

    pub fn crew_entities(&self) -> &[Entity] {
        &self.crew
    }

    pub fn worker_by_role(&self, role: Role) -> Option<Entity> {
        self.crew.iter().copied().find(|&entity| {
            self.world
                .get::<&Worker>(entity)
                .map(|worker| worker.role() == role)
                .unwrap_or(false)
        })
    }

    pub fn is_complete(&self) -> bool {
        self.clock.complete
    }

    /// Count workers in the simulation
    pub fn worker_count(&self) -> usize {
        self.world.query::<&Worker>().iter().count()
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Activity;
    use sitecrew_logic::constants::TICK_SECONDS;
    use sitecrew_logic::economy::Material;

    fn generated() -> SimulationEngine {
        let mut engine = SimulationEngine::new();
        engine.generate(WorldConfig {
            seed: 5,
            total_floors: 2,
        });
        engine
    }

    #[test]
    fn engine_starts_empty() {
        let engine = SimulationEngine::new();
        assert_eq!(engine.worker_count(), 0);
        assert!(engine.layout().is_none());
    }

    #[test]
    fn generate_spawns_player_and_crew() {
        let engine = generated();
        assert_eq!(engine.worker_count(), 2);
        assert!(engine.player_entity().is_some());
        assert!(engine.worker_by_role(Role::Builder).is_some());
        assert!(engine.worker_by_role(Role::Delivery).is_some());
        assert_eq!(engine.economy.stock_of(Material::Concrete), 2);
    }

    #[test]
    fn update_advances_the_clock() {
        let mut engine = generated();
        for _ in 0..30 {
            engine.update(TICK_SECONDS);
        }
        assert!((engine.clock.elapsed - 1.0).abs() < 0.01);
    }

    #[test]
    fn pause_stops_the_world() {
        let mut engine = generated();
        engine.toggle_pause();
        engine.update(TICK_SECONDS);
        assert_eq!(engine.clock.elapsed, 0.0);
    }

    #[test]
    fn build_order_without_stock_is_refused() {
        let mut engine = generated();
        engine.order_worker(Role::Builder, Order::Build);
        let entity = engine.worker_by_role(Role::Builder).unwrap();
        let assign = engine.world.get::<&Assignment>(entity).unwrap();
        assert_eq!(assign.order, Order::Idle);
    }

    #[test]
    fn delivery_order_starts_the_fetch_cycle() {
        let mut engine = generated();
        engine.order_worker(Role::Delivery, Order::Deliver);
        let entity = engine.worker_by_role(Role::Delivery).unwrap();
        let assign = engine.world.get::<&Assignment>(entity).unwrap();
        assert_eq!(assign.order, Order::Deliver);
        assert_eq!(assign.activity, Activity::ToDepot);
    }

    #[test]
    fn restart_resets_progress() {
        let mut engine = generated();
        engine.economy.deposit(Material::Concrete, 50);
        for _ in 0..120 {
            engine.update(TICK_SECONDS);
        }
        engine.restart();
        assert_eq!(engine.clock.elapsed, 0.0);
        assert_eq!(engine.economy.floors_built, 0);
        assert_eq!(engine.economy.stock_of(Material::Concrete), 2);
        assert_eq!(engine.worker_count(), 2);
    }
}
