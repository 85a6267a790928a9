//! Navigation system - waypoint planning and collision-aware pursuit.
//!
//! Each worker's navigator replans on a fixed interval while pursuing a
//! target, immediately when its body is refused movement on an axis, and
//! backs off briefly after a failed search. Other agents' cells are advisory
//! blockers so workers route around each other without ever deadlocking.

use std::collections::HashSet;

use hecs::{Entity, World};

use sitecrew_logic::collision::{approach, slide_step, Approach};
use sitecrew_logic::constants::{APPROACH_BUFFER, PATH_FAILURE_RETRY, PATH_REPLAN_INTERVAL};
use sitecrew_logic::geometry::{Point, Rect};
use sitecrew_logic::grid::Cell;
use sitecrew_logic::pathfinding::find_path;

use crate::components::{Assignment, Body, Navigator, Player};
use crate::generation::SiteLayout;

/// Per-worker movement context, snapshotted before the worker is processed.
pub struct NavContext<'a> {
    pub layout: &'a SiteLayout,
    /// Solid rects: site furniture plus the other live agents.
    pub obstacles: &'a [Rect],
    /// Cells currently occupied by other agents.
    pub occupied: &'a [Cell],
}

/// Cells occupied by other visible agents, used as advisory path blockers.
pub fn occupied_cells(world: &World, layout: &SiteLayout, me: Entity) -> Vec<Cell> {
    let mut cells = Vec::new();
    for (entity, (assign, body)) in world.query::<(&Assignment, &Body)>().iter() {
        if entity == me || !assign.visible {
            continue;
        }
        cells.push(layout.grid.point_to_cell(body.center()));
    }
    for (_, (_, body)) in world.query::<(&Player, &Body)>().iter() {
        cells.push(layout.grid.point_to_cell(body.center()));
    }
    cells
}

/// Solid rects an agent collides with: site furniture, other visible
/// workers, and optionally the player.
pub fn collision_rects(
    world: &World,
    layout: &SiteLayout,
    exclude: Entity,
    include_player: bool,
) -> Vec<Rect> {
    let mut rects = layout.solids.clone();
    for (entity, (assign, body)) in world.query::<(&Assignment, &Body)>().iter() {
        if entity == exclude || !assign.visible {
            continue;
        }
        rects.push(body.rect());
    }
    if include_player {
        for (_, (_, body)) in world.query::<(&Player, &Body)>().iter() {
            rects.push(body.rect());
        }
    }
    rects
}

/// Advance the replan and failure-backoff timers for one navigator.
pub fn tick_replan(nav: &mut Navigator, dt: f32) {
    nav.replan_timer += dt;
    if nav.failure_cooldown > 0.0 {
        nav.failure_cooldown = (nav.failure_cooldown - dt).max(0.0);
    }
    if nav.target.is_some() || !nav.path.is_empty() {
        if nav.replan_timer >= PATH_REPLAN_INTERVAL {
            nav.needs_recalc = true;
            nav.replan_timer = 0.0;
        }
    } else {
        nav.replan_timer = 0.0;
    }
}

/// Move an agent toward `target` for one tick. Returns true once the agent
/// is within the approach buffer of the target (and has been snapped to it).
pub fn move_agent(
    nav: &mut Navigator,
    body: &mut Body,
    target: Point,
    speed: f32,
    dt: f32,
    ctx: &NavContext<'_>,
) -> bool {
    if !ensure_path(nav, body.center(), target, ctx) {
        return false;
    }

    if nav.has_active_path() {
        let waypoint = nav.path[nav.path_index];
        if step_body(nav, body, waypoint, speed, dt, ctx) {
            nav.path_index += 1;
        }
        if nav.has_active_path() {
            return false;
        }
    }

    let arrived = step_body(nav, body, target, speed, dt, ctx);
    if arrived {
        nav.reset_plan();
    }
    arrived
}

/// Make sure the navigator holds a usable plan toward `target`. Returns
/// false while the goal is unreachable and the failure backoff is running.
fn ensure_path(nav: &mut Navigator, center: Point, target: Point, ctx: &NavContext<'_>) -> bool {
    let grid = &ctx.layout.grid;
    let goal_cell = grid.point_to_cell(target);
    let current_cell = grid.point_to_cell(center);

    if current_cell == goal_cell {
        nav.path.clear();
        nav.path_index = 0;
        nav.goal = Some(goal_cell);
        nav.needs_recalc = false;
        nav.blocked = false;
        nav.failure_cooldown = 0.0;
        return true;
    }

    let needs_new_path =
        nav.needs_recalc || nav.goal != Some(goal_cell) || (nav.path.is_empty() && nav.goal.is_none());
    if !needs_new_path {
        return true;
    }

    if nav.blocked && nav.failure_cooldown > 0.0 && !nav.needs_recalc && nav.goal == Some(goal_cell)
    {
        return false;
    }

    let dynamic: HashSet<Cell> = ctx
        .occupied
        .iter()
        .copied()
        .filter(|cell| *cell != goal_cell)
        .collect();

    match find_path(grid, &ctx.layout.blocked, &dynamic, current_cell, goal_cell) {
        Some(cells) => {
            nav.path = cells.into_iter().map(|cell| grid.cell_center(cell)).collect();
            nav.path_index = 0;
            nav.blocked = false;
            nav.failure_cooldown = 0.0;
        }
        None => {
            nav.path.clear();
            nav.path_index = 0;
            nav.blocked = true;
            nav.failure_cooldown = PATH_FAILURE_RETRY;
            nav.goal = Some(goal_cell);
            nav.needs_recalc = false;
            nav.replan_timer = 0.0;
            return false;
        }
    }

    nav.goal = Some(goal_cell);
    nav.needs_recalc = false;
    nav.replan_timer = 0.0;
    true
}

/// One collision-aware step toward a point. A refused axis schedules an
/// immediate replan.
fn step_body(
    nav: &mut Navigator,
    body: &mut Body,
    target: Point,
    speed: f32,
    dt: f32,
    ctx: &NavContext<'_>,
) -> bool {
    let world_rect = ctx.layout.grid.world_rect();
    match approach(body.center(), target, speed, dt) {
        Approach::Arrived => {
            body.set_center(target);
            true
        }
        Approach::Step(delta) => {
            let out_x = slide_step(
                body.rect(),
                Point::new(delta.x, 0.0),
                ctx.obstacles,
                world_rect,
            );
            body.pos = out_x.position;
            let out_y = slide_step(
                body.rect(),
                Point::new(0.0, delta.y),
                ctx.obstacles,
                world_rect,
            );
            body.pos = out_y.position;
            if out_x.blocked_x || out_y.blocked_y {
                nav.needs_recalc = true;
                nav.replan_timer = 0.0;
            }
            body.center().distance(&target) <= APPROACH_BUFFER
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitecrew_logic::grid::GridSpec;
    use std::collections::HashMap;

    fn open_layout() -> SiteLayout {
        SiteLayout {
            grid: GridSpec::new(10, 10, 30.0),
            zones: Vec::new(),
            decor: Vec::new(),
            blocked: HashSet::new(),
            solids: Vec::new(),
            approaches: HashMap::new(),
            player_spawn: Cell::new(0, 0),
        }
    }

    fn ctx<'a>(layout: &'a SiteLayout, obstacles: &'a [Rect], occupied: &'a [Cell]) -> NavContext<'a> {
        NavContext {
            layout,
            obstacles,
            occupied,
        }
    }

    #[test]
    fn walks_to_target_across_open_ground() {
        let layout = open_layout();
        let mut nav = Navigator::default();
        let mut body = Body::at_cell(&layout.grid, Cell::new(1, 1), 20.0);
        let target = layout.grid.cell_center(Cell::new(6, 1));
        nav.set_target(Some(target));

        let context = ctx(&layout, &[], &[]);
        let mut arrived = false;
        for _ in 0..600 {
            if move_agent(&mut nav, &mut body, target, 85.0, 1.0 / 30.0, &context) {
                arrived = true;
                break;
            }
        }
        assert!(arrived);
        assert!(body.center().distance(&target) <= APPROACH_BUFFER);
    }

    #[test]
    fn unreachable_goal_sets_backoff() {
        let mut layout = open_layout();
        // Goal ringed by blocked cells
        for cell in Cell::new(5, 5).neighbors() {
            layout.blocked.insert(cell);
        }
        let mut nav = Navigator::default();
        let mut body = Body::at_cell(&layout.grid, Cell::new(1, 1), 20.0);
        let target = layout.grid.cell_center(Cell::new(5, 5));
        nav.set_target(Some(target));

        let context = ctx(&layout, &[], &[]);
        assert!(!move_agent(&mut nav, &mut body, target, 85.0, 1.0 / 30.0, &context));
        assert!(nav.blocked);
        assert!(nav.failure_cooldown > 0.0);
    }

    #[test]
    fn backoff_suppresses_immediate_retry() {
        let mut layout = open_layout();
        for cell in Cell::new(5, 5).neighbors() {
            layout.blocked.insert(cell);
        }
        let mut nav = Navigator::default();
        let mut body = Body::at_cell(&layout.grid, Cell::new(1, 1), 20.0);
        let target = layout.grid.cell_center(Cell::new(5, 5));
        nav.set_target(Some(target));

        let context = ctx(&layout, &[], &[]);
        move_agent(&mut nav, &mut body, target, 85.0, 1.0 / 30.0, &context);
        let cooldown_before = nav.failure_cooldown;
        // Next tick: still cooling down, search is not repeated
        move_agent(&mut nav, &mut body, target, 85.0, 1.0 / 30.0, &context);
        assert!(nav.blocked);
        assert!(nav.failure_cooldown <= cooldown_before);
    }

    #[test]
    fn replan_interval_marks_recalc() {
        let mut nav = Navigator::default();
        nav.set_target(Some(Point::new(100.0, 100.0)));
        nav.needs_recalc = false;
        for _ in 0..29 {
            tick_replan(&mut nav, 1.0 / 30.0);
        }
        assert!(!nav.needs_recalc);
        tick_replan(&mut nav, 1.0 / 30.0);
        assert!(nav.needs_recalc);
        assert_eq!(nav.replan_timer, 0.0);
    }

    #[test]
    fn idle_navigator_timer_stays_zero() {
        let mut nav = Navigator::default();
        for _ in 0..10 {
            tick_replan(&mut nav, 1.0 / 30.0);
        }
        assert_eq!(nav.replan_timer, 0.0);
        assert!(!nav.needs_recalc);
    }

    #[test]
    fn blocked_axis_requests_replan() {
        let mut layout = open_layout();
        // Solid wall covering columns 4..5 across all rows
        let wall = Rect::new(120.0, 0.0, 30.0, 300.0);
        layout.solids.push(wall);
        for row in 0..10 {
            layout.blocked.insert(Cell::new(4, row));
        }
        let mut nav = Navigator::default();
        let mut body = Body::at_cell(&layout.grid, Cell::new(3, 5), 20.0);
        // Pretend a stale straight-line plan runs into the wall
        let target = layout.grid.cell_center(Cell::new(6, 5));
        nav.target = Some(target);
        nav.goal = Some(Cell::new(6, 5));
        nav.path = vec![target];
        nav.path_index = 0;

        let solids = layout.solids.clone();
        let context = ctx(&layout, &solids, &[]);
        let mut requested = false;
        for _ in 0..20 {
            step_body(&mut nav, &mut body, target, 85.0, 1.0 / 30.0, &context);
            if nav.needs_recalc {
                requested = true;
                break;
            }
        }
        assert!(requested);
    }
}
