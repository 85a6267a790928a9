//! Idle wander system - off-duty workers drift around the site.
//!
//! An idle worker waits out a short cooldown, picks a random walkable cell
//! near itself, ambles over at idle speed, and repeats.

use hecs::{Entity, World};
use rand::Rng;

use sitecrew_logic::constants::WORKER_IDLE_SPEED;
use sitecrew_logic::grid::Cell;

use crate::components::{Assignment, Body, Navigator, Order, Stamina, Worker};
use crate::generation::SiteLayout;
use crate::systems::{collision_rects, move_agent, occupied_cells, NavContext};

const PICK_ATTEMPTS: u32 = 20;

pub fn idle_wander_system(
    world: &mut World,
    crew: &[Entity],
    layout: &SiteLayout,
    worker_speed_mult: f32,
    dt: f32,
    rng: &mut impl Rng,
) {
    for &entity in crew {
        let obstacles = collision_rects(world, layout, entity, true);
        let occupied = occupied_cells(world, layout, entity);
        let ctx = NavContext {
            layout,
            obstacles: &obstacles,
            occupied: &occupied,
        };

        let Ok((_worker, assign, nav, body, _stamina)) = world.query_one_mut::<(
            &Worker,
            &mut Assignment,
            &mut Navigator,
            &mut Body,
            &Stamina,
        )>(entity) else {
            continue;
        };

        if assign.order != Order::Idle || !assign.visible {
            continue;
        }

        if assign.idle_cooldown > 0.0 {
            assign.idle_cooldown -= dt;
        } else if nav.target.is_none() {
            if let Some(target) = pick_wander_target(layout, body, rng) {
                nav.set_target(Some(target));
            }
            assign.idle_cooldown = rng.gen::<f32>() * 1.5 + 0.5;
        }

        if let Some(target) = nav.target {
            let speed = WORKER_IDLE_SPEED * worker_speed_mult;
            if move_agent(nav, body, target, speed, dt, &ctx) {
                nav.set_target(None);
            }
        }
    }
}

fn pick_wander_target(
    layout: &SiteLayout,
    body: &Body,
    rng: &mut impl Rng,
) -> Option<sitecrew_logic::geometry::Point> {
    let grid = &layout.grid;
    let center = body.center();
    let base_col = (center.x / grid.cell_size).round() as i32;
    let base_row = (center.y / grid.cell_size).round() as i32;

    for _ in 0..PICK_ATTEMPTS {
        let cell = Cell::new(
            base_col + rng.gen_range(-4..=4),
            base_row + rng.gen_range(-3..=3),
        );
        if grid.contains(cell) && !layout.blocked.contains(&cell) {
            return Some(grid.cell_center(cell));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sitecrew_logic::fsm::Role;
    use sitecrew_logic::grid::GridSpec;
    use std::collections::{HashMap, HashSet};

    fn layout() -> SiteLayout {
        SiteLayout {
            grid: GridSpec::new(10, 10, 30.0),
            zones: Vec::new(),
            decor: Vec::new(),
            blocked: HashSet::new(),
            solids: Vec::new(),
            approaches: HashMap::new(),
            player_spawn: Cell::new(5, 5),
        }
    }

    #[test]
    fn idle_worker_eventually_wanders() {
        let layout = layout();
        let mut world = World::new();
        let entity = world.spawn((
            Worker::new("W1", "Builder", Role::Builder),
            Assignment::default(),
            Navigator::default(),
            Body::at_cell(&layout.grid, Cell::new(5, 5), 20.0),
            Stamina::full(5.0),
        ));
        let crew = vec![entity];
        let mut rng = StdRng::seed_from_u64(9);

        let start = world.get::<&Body>(entity).unwrap().center();
        for _ in 0..300 {
            idle_wander_system(&mut world, &crew, &layout, 1.0, 1.0 / 30.0, &mut rng);
        }
        let end = world.get::<&Body>(entity).unwrap().center();
        assert!(start.distance(&end) > 1.0, "worker never moved");
    }

    #[test]
    fn busy_worker_does_not_wander() {
        let layout = layout();
        let mut world = World::new();
        let entity = world.spawn((
            Worker::new("W1", "Builder", Role::Builder),
            Assignment {
                order: Order::Build,
                ..Default::default()
            },
            Navigator::default(),
            Body::at_cell(&layout.grid, Cell::new(5, 5), 20.0),
            Stamina::full(5.0),
        ));
        let crew = vec![entity];
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..120 {
            idle_wander_system(&mut world, &crew, &layout, 1.0, 1.0 / 30.0, &mut rng);
        }
        let nav = world.get::<&Navigator>(entity).unwrap();
        assert!(nav.target.is_none());
    }
}
