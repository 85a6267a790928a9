//! Energy drink buff - a periodic pickup that speeds the whole site up.
//!
//! A can appears on a random walkable cell every few minutes. Walking the
//! player over it buffs player speed, worker speed, and build time for a
//! fixed duration.

use rand::Rng;
use serde::{Deserialize, Serialize};

use sitecrew_logic::constants::{
    BUFF_BUILD_TIME_MULT, BUFF_DURATION, BUFF_PLAYER_SPEED_MULT, BUFF_SPAWN_INTERVAL,
    BUFF_WORKER_SPEED_MULT, EDGE_MARGIN,
};
use sitecrew_logic::geometry::Rect;
use sitecrew_logic::grid::Cell;

use crate::feed::EventLog;
use crate::generation::SiteLayout;

const SPAWN_ATTEMPTS: u32 = 400;

/// Multipliers applied across the simulation while the buff runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modifiers {
    pub player_speed: f32,
    pub worker_speed: f32,
    pub build_time: f32,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            player_speed: 1.0,
            worker_speed: 1.0,
            build_time: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuffState {
    pub active: bool,
    pub expires_at: f64,
    /// Cell the uncollected can currently sits on.
    pub tile: Option<Cell>,
    pub next_spawn_at: f64,
}

impl Default for BuffState {
    fn default() -> Self {
        Self {
            active: false,
            expires_at: 0.0,
            tile: None,
            next_spawn_at: BUFF_SPAWN_INTERVAL,
        }
    }
}

impl BuffState {
    pub fn is_active(&self, now: f64) -> bool {
        self.active && now < self.expires_at
    }

    pub fn modifiers(&self, now: f64) -> Modifiers {
        if self.is_active(now) {
            Modifiers {
                player_speed: BUFF_PLAYER_SPEED_MULT,
                worker_speed: BUFF_WORKER_SPEED_MULT,
                build_time: BUFF_BUILD_TIME_MULT,
            }
        } else {
            Modifiers::default()
        }
    }
}

/// Expire, spawn, and collect the energy drink for one tick.
pub fn update_buff(
    state: &mut BuffState,
    layout: &SiteLayout,
    player_rect: Rect,
    now: f64,
    rng: &mut impl Rng,
    events: &mut EventLog,
) {
    if state.active && now >= state.expires_at {
        state.active = false;
    }

    if state.tile.is_none() && now >= state.next_spawn_at {
        state.tile = spawn_cell(layout, rng);
        state.next_spawn_at = now + BUFF_SPAWN_INTERVAL;
    }

    if let Some(cell) = state.tile {
        if layout.grid.cell_rect(cell).overlaps(&player_rect) {
            state.active = true;
            state.expires_at = now + BUFF_DURATION;
            state.tile = None;
            state.next_spawn_at = now + BUFF_SPAWN_INTERVAL;
            events.push("Energy drink collected! Everyone speeds up.");
        }
    }
}

fn spawn_cell(layout: &SiteLayout, rng: &mut impl Rng) -> Option<Cell> {
    let grid = &layout.grid;
    for _ in 0..SPAWN_ATTEMPTS {
        let col = rng.gen_range(EDGE_MARGIN..=grid.cols - EDGE_MARGIN - 1);
        let row = rng.gen_range(EDGE_MARGIN..=grid.rows - EDGE_MARGIN - 1);
        let cell = Cell::new(col, row);
        if !layout.blocked.contains(&cell) {
            return Some(cell);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sitecrew_logic::grid::GridSpec;
    use std::collections::{HashMap, HashSet};

    fn layout() -> SiteLayout {
        SiteLayout {
            grid: GridSpec::new(38, 20, 30.0),
            zones: Vec::new(),
            decor: Vec::new(),
            blocked: HashSet::new(),
            solids: Vec::new(),
            approaches: HashMap::new(),
            player_spawn: Cell::new(1, 1),
        }
    }

    fn far_away() -> Rect {
        Rect::new(-100.0, -100.0, 26.0, 26.0)
    }

    #[test]
    fn no_spawn_before_first_interval() {
        let mut state = BuffState::default();
        let mut events = EventLog::default();
        let mut rng = StdRng::seed_from_u64(1);
        update_buff(&mut state, &layout(), far_away(), 10.0, &mut rng, &mut events);
        assert!(state.tile.is_none());
    }

    #[test]
    fn spawns_after_interval_and_pickup_activates() {
        let mut state = BuffState::default();
        let mut events = EventLog::default();
        let mut rng = StdRng::seed_from_u64(1);
        let layout = layout();

        update_buff(&mut state, &layout, far_away(), 301.0, &mut rng, &mut events);
        let cell = state.tile.expect("can should spawn");
        assert!(!layout.blocked.contains(&cell));

        // Player stands on the can
        let player = layout.grid.cell_rect(cell);
        update_buff(&mut state, &layout, player, 302.0, &mut rng, &mut events);
        assert!(state.tile.is_none());
        assert!(state.is_active(302.0));
        assert!(state.is_active(361.9));
        assert!(!state.is_active(362.1));
        assert_eq!(state.modifiers(303.0).worker_speed, BUFF_WORKER_SPEED_MULT);
    }

    #[test]
    fn modifiers_default_when_inactive() {
        let state = BuffState::default();
        assert_eq!(state.modifiers(0.0), Modifiers::default());
    }

    #[test]
    fn expiry_clears_active_flag() {
        let mut state = BuffState {
            active: true,
            expires_at: 50.0,
            ..Default::default()
        };
        let mut events = EventLog::default();
        let mut rng = StdRng::seed_from_u64(2);
        update_buff(&mut state, &layout(), far_away(), 51.0, &mut rng, &mut events);
        assert!(!state.active);
    }
}
