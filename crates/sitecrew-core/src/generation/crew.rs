//! Crew generation - spawns the player and the two workers near the spawn
//! point, nudged onto walkable cells.

use hecs::{Entity, World};

use sitecrew_logic::constants::{
    BUILDER_BASE_STAMINA, DELIVERY_BASE_STAMINA, PLAYER_BODY_SIZE, WORKER_BODY_SIZE,
};
use sitecrew_logic::fsm::Role;
use sitecrew_logic::grid::Cell;
use sitecrew_logic::pathfinding::nearest_walkable;

use crate::components::{Assignment, Body, Navigator, Player, Stamina, Worker};
use crate::generation::SiteLayout;

/// Spawn the player agent at the layout's spawn cell.
pub fn spawn_player(world: &mut World, layout: &SiteLayout) -> Entity {
    let body = Body::at_cell(&layout.grid, layout.player_spawn, PLAYER_BODY_SIZE);
    world.spawn((body, Player::default()))
}

/// Spawn the builder and the delivery worker flanking the player spawn.
/// Returns the entities in that order.
pub fn spawn_crew(world: &mut World, layout: &SiteLayout) -> Vec<Entity> {
    let spawn = layout.player_spawn;
    let builder_cell = crew_cell(layout, Cell::new(spawn.col - 2, spawn.row - 1));
    let delivery_cell = crew_cell(layout, Cell::new(spawn.col + 2, spawn.row - 1));

    vec![
        spawn_worker(world, layout, "W1", "Builder", Role::Builder, builder_cell, BUILDER_BASE_STAMINA),
        spawn_worker(
            world,
            layout,
            "W2",
            "Delivery",
            Role::Delivery,
            delivery_cell,
            DELIVERY_BASE_STAMINA,
        ),
    ]
}

fn crew_cell(layout: &SiteLayout, preferred: Cell) -> Cell {
    if layout.grid.contains(preferred) && !layout.blocked.contains(&preferred) {
        preferred
    } else {
        nearest_walkable(&layout.grid, &layout.blocked, preferred)
    }
}

fn spawn_worker(
    world: &mut World,
    layout: &SiteLayout,
    id: &str,
    name: &str,
    role: Role,
    cell: Cell,
    max_stamina: f32,
) -> Entity {
    world.spawn((
        Worker::new(id, name, role),
        Assignment::default(),
        Navigator::default(),
        Body::at_cell(&layout.grid, cell, WORKER_BODY_SIZE),
        Stamina::full(max_stamina),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::generate_site;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn crew_spawns_on_walkable_cells() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(3);
        let layout = generate_site(&mut world, &mut rng);
        let crew = spawn_crew(&mut world, &layout);
        assert_eq!(crew.len(), 2);
        for entity in crew {
            let body = world.get::<&Body>(entity).unwrap();
            let cell = layout.grid.point_to_cell(body.center());
            assert!(!layout.blocked.contains(&cell));
        }
    }

    #[test]
    fn roles_are_assigned_in_order() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(3);
        let layout = generate_site(&mut world, &mut rng);
        let crew = spawn_crew(&mut world, &layout);
        let builder = world.get::<&Worker>(crew[0]).unwrap();
        let delivery = world.get::<&Worker>(crew[1]).unwrap();
        assert_eq!(builder.role(), Role::Builder);
        assert_eq!(delivery.role(), Role::Delivery);
        assert_eq!(builder.level, 1);
    }
}
