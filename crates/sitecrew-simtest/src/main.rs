//! Sitecrew Headless Simulation Harness
//!
//! Validates the pure logic and the full engine loop without a frontend.
//! Runs entirely in-process — no rendering, no input devices.
//!
//! Usage:
//!   cargo run -p sitecrew-simtest
//!   cargo run -p sitecrew-simtest -- --verbose

use sitecrew_core::components::Order;
use sitecrew_core::engine::SimulationEngine;
use sitecrew_core::generation::WorldConfig;
use sitecrew_logic::constants::TICK_SECONDS;
use sitecrew_logic::economy::{
    build_time_for_floor, material_for_floor, need_for_floor, Material,
};
use sitecrew_logic::fsm::{next_state, Role, WorkerEvent, WorkerState};
use sitecrew_logic::grid::{Cell, GridSpec};
use sitecrew_logic::pathfinding::{find_path, flood_fill};
use std::collections::HashSet;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Sitecrew Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Material schedule and floor costs
    results.extend(validate_economy_schedule(verbose));

    // 2. Worker state machine sweep
    results.extend(validate_worker_fsm(verbose));

    // 3. Pathfinding on synthetic grids
    results.extend(validate_pathfinding(verbose));

    // 4. Site generation across seeds
    results.extend(validate_site_generation(verbose));

    // 5. Full ten-floor project run
    results.extend(validate_full_project(verbose));

    // 6. Snapshot format
    results.extend(validate_snapshot(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Economy schedule ─────────────────────────────────────────────────

fn validate_economy_schedule(verbose: bool) -> Vec<TestResult> {
    println!("--- Economy Schedule ---");
    let mut results = Vec::new();

    // Material bands: concrete, wood, glass in order, no gaps
    let mut bands_ok = true;
    let mut last = material_for_floor(1);
    let mut switches = 0;
    for floor in 2..=10 {
        let material = material_for_floor(floor);
        if material != last {
            switches += 1;
            // Bands only ever advance concrete → wood → glass
            bands_ok &= matches!(
                (last, material),
                (Material::Concrete, Material::Wood) | (Material::Wood, Material::Glass)
            );
            last = material;
        }
    }
    results.push(TestResult {
        name: "material_bands_ordered".into(),
        passed: bands_ok && switches == 2,
        detail: format!("{} band switches over 10 floors", switches),
    });

    // Needs and build times strictly increase
    let needs: Vec<u32> = (1..=10).map(need_for_floor).collect();
    let monotonic = needs.windows(2).all(|w| w[1] > w[0]);
    let times_monotonic =
        (1..10).all(|f| build_time_for_floor(f + 1) > build_time_for_floor(f));
    results.push(TestResult {
        name: "floor_costs_increase".into(),
        passed: monotonic && times_monotonic,
        detail: format!("needs {:?}", needs),
    });

    // Total project requirement
    let total: u32 = needs.iter().sum();
    results.push(TestResult {
        name: "project_total_material".into(),
        passed: total == 325,
        detail: format!("{} units across the full project", total),
    });

    if verbose {
        for floor in 1..=10 {
            println!(
                "  floor {:2}: {:8} x{:2}  {:4.0}s",
                floor,
                material_for_floor(floor).label(),
                need_for_floor(floor),
                build_time_for_floor(floor)
            );
        }
    }

    results
}

// ── 2. Worker FSM ───────────────────────────────────────────────────────

const ALL_STATES: [WorkerState; 8] = [
    WorkerState::Idle,
    WorkerState::HeadingToSite,
    WorkerState::Building,
    WorkerState::HeadingToDepot,
    WorkerState::Loading,
    WorkerState::Delivering,
    WorkerState::HeadingToDorm,
    WorkerState::Resting,
];

const ALL_EVENTS: [WorkerEvent; 12] = [
    WorkerEvent::Build,
    WorkerEvent::Fetch,
    WorkerEvent::Rest,
    WorkerEvent::Cancel,
    WorkerEvent::ArriveWork,
    WorkerEvent::ArriveSource,
    WorkerEvent::ArriveSite,
    WorkerEvent::LoadComplete,
    WorkerEvent::DropComplete,
    WorkerEvent::Complete,
    WorkerEvent::ArriveRest,
    WorkerEvent::Recovered,
];

fn validate_worker_fsm(verbose: bool) -> Vec<TestResult> {
    println!("--- Worker FSM ---");
    let mut results = Vec::new();

    let mut legal = [0u32; 2];
    for (i, role) in [Role::Builder, Role::Delivery].into_iter().enumerate() {
        for state in ALL_STATES {
            for event in ALL_EVENTS {
                if next_state(role, state, event).is_some() {
                    legal[i] += 1;
                }
            }
        }
    }
    results.push(TestResult {
        name: "fsm_table_size".into(),
        passed: legal == [11, 17],
        detail: format!("builder {} / delivery {} legal transitions", legal[0], legal[1]),
    });

    // Builders never reach the delivery-only states
    let builder_leak = ALL_STATES.iter().any(|&state| {
        ALL_EVENTS.iter().any(|&event| {
            matches!(
                next_state(Role::Builder, state, event),
                Some(WorkerState::HeadingToDepot)
                    | Some(WorkerState::Loading)
                    | Some(WorkerState::Delivering)
            )
        })
    });
    results.push(TestResult {
        name: "fsm_role_separation".into(),
        passed: !builder_leak,
        detail: if builder_leak {
            "builder can enter a delivery state".into()
        } else {
            "builder cycle never touches depot states".into()
        },
    });

    // The dorm cycle cannot be cancelled; every other active state can
    let mut dorm_ok = true;
    for role in [Role::Builder, Role::Delivery] {
        dorm_ok &= next_state(role, WorkerState::HeadingToDorm, WorkerEvent::Cancel).is_none();
        dorm_ok &= next_state(role, WorkerState::Resting, WorkerEvent::Cancel).is_none();
        dorm_ok &= next_state(role, WorkerState::Resting, WorkerEvent::Recovered)
            == Some(WorkerState::Idle);
    }
    results.push(TestResult {
        name: "fsm_dorm_cycle_uninterruptible".into(),
        passed: dorm_ok,
        detail: "rest runs to completion once started".into(),
    });

    if verbose {
        for role in [Role::Builder, Role::Delivery] {
            for state in ALL_STATES {
                let accepted: Vec<&str> = ALL_EVENTS
                    .iter()
                    .filter(|&&e| next_state(role, state, e).is_some())
                    .map(|e| e.name())
                    .collect();
                if !accepted.is_empty() {
                    println!("  {}/{}: {}", role.label(), state.name(), accepted.join(", "));
                }
            }
        }
    }

    results
}

// ── 3. Pathfinding ──────────────────────────────────────────────────────

fn validate_pathfinding(verbose: bool) -> Vec<TestResult> {
    println!("--- Pathfinding ---");
    let mut results = Vec::new();
    let grid = GridSpec::new(38, 20, 30.0);

    // Maze: three staggered walls with single gaps
    let mut blocked: HashSet<Cell> = HashSet::new();
    for row in 0..19 {
        blocked.insert(Cell::new(10, row));
    }
    for row in 1..20 {
        blocked.insert(Cell::new(20, row));
    }
    for row in 0..19 {
        blocked.insert(Cell::new(30, row));
    }

    let path = find_path(
        &grid,
        &blocked,
        &HashSet::new(),
        Cell::new(0, 0),
        Cell::new(37, 0),
    );
    let path_ok = path.as_ref().is_some_and(|p| {
        p.last() == Some(&Cell::new(37, 0))
            && p.windows(2).all(|w| w[0].manhattan(&w[1]) == 1)
            && p.iter().all(|c| !blocked.contains(c))
    });
    results.push(TestResult {
        name: "astar_threads_the_maze".into(),
        passed: path_ok,
        detail: format!(
            "{} waypoints through 3 walls",
            path.as_ref().map(|p| p.len()).unwrap_or(0)
        ),
    });

    // Sealed-off goal fails
    let mut sealed = blocked.clone();
    sealed.insert(Cell::new(10, 19));
    let no_path = find_path(
        &grid,
        &sealed,
        &HashSet::new(),
        Cell::new(0, 0),
        Cell::new(37, 0),
    );
    results.push(TestResult {
        name: "astar_sealed_goal_fails".into(),
        passed: no_path.is_none(),
        detail: "no route invented through a solid wall".into(),
    });

    // Crowd of agents in the way: fallback still routes
    let dynamic: HashSet<Cell> = (0..20).map(|r| Cell::new(5, r)).collect();
    let through = find_path(
        &grid,
        &HashSet::new(),
        &dynamic,
        Cell::new(0, 10),
        Cell::new(9, 10),
    );
    results.push(TestResult {
        name: "astar_agent_wall_fallback".into(),
        passed: through.is_some(),
        detail: "dynamic blockers are advisory, not solid".into(),
    });

    // Flood fill matches A* reachability on the maze
    let reachable = flood_fill(&grid, &blocked, Cell::new(0, 0));
    let fill_ok = reachable.contains(&Cell::new(37, 0)) && !reachable.contains(&Cell::new(10, 5));
    results.push(TestResult {
        name: "flood_fill_consistent".into(),
        passed: fill_ok,
        detail: format!("{} cells reachable", reachable.len()),
    });

    if verbose {
        if let Some(p) = &path {
            println!("  maze path: {} steps", p.len());
        }
    }

    results
}

// ── 4. Site generation ──────────────────────────────────────────────────

fn validate_site_generation(verbose: bool) -> Vec<TestResult> {
    println!("--- Site Generation ---");
    let mut results = Vec::new();

    let mut all_ok = true;
    let mut approach_ok = true;
    let mut spawn_ok = true;
    let mut detail = String::new();

    for seed in 0..20 {
        let mut engine = SimulationEngine::new();
        engine.generate(WorldConfig {
            seed,
            total_floors: 10,
        });
        let Some(layout) = engine.layout() else {
            all_ok = false;
            detail = format!("seed {} produced no layout", seed);
            break;
        };

        if engine.worker_count() != 2 || engine.player_entity().is_none() {
            all_ok = false;
            detail = format!("seed {} spawned a wrong crew", seed);
            break;
        }

        if layout.blocked.contains(&layout.player_spawn) {
            spawn_ok = false;
            detail = format!("seed {} spawned the player inside a rock", seed);
        }

        // Every named zone approach sits on a walkable cell reachable from
        // the player spawn.
        let reachable = flood_fill(&layout.grid, &layout.blocked, layout.player_spawn);
        for (name, point) in &layout.approaches {
            let cell = layout.grid.point_to_cell(*point);
            if layout.blocked.contains(&cell) || !reachable.contains(&cell) {
                approach_ok = false;
                detail = format!("seed {}: {} approach unreachable", seed, name);
            }
        }

        if verbose {
            println!(
                "  seed {:2}: {} blocked cells, {} solids, {} approaches",
                seed,
                layout.blocked.len(),
                layout.solids.len(),
                layout.approaches.len()
            );
        }
    }

    results.push(TestResult {
        name: "generation_spawns_crew".into(),
        passed: all_ok,
        detail: if all_ok {
            "20 seeds: player + 2 workers each".into()
        } else {
            detail.clone()
        },
    });
    results.push(TestResult {
        name: "generation_player_spawn_walkable".into(),
        passed: spawn_ok,
        detail: if spawn_ok {
            "spawn cell open on every seed".into()
        } else {
            detail.clone()
        },
    });
    results.push(TestResult {
        name: "generation_zones_reachable".into(),
        passed: approach_ok,
        detail: if approach_ok {
            "all zone approaches reachable on every seed".into()
        } else {
            detail
        },
    });

    results
}

// ── 5. Full project run ─────────────────────────────────────────────────

fn validate_full_project(verbose: bool) -> Vec<TestResult> {
    println!("--- Full Project Run ---");
    let mut results = Vec::new();

    let mut engine = SimulationEngine::new();
    engine.generate(WorldConfig {
        seed: 4242,
        total_floors: 10,
    });
    // 2× → 4× → 8× → 16×
    for _ in 0..4 {
        engine.cycle_speed();
    }

    let mut ticks: u64 = 0;
    let max_ticks: u64 = 2_000_000;
    while !engine.is_complete() && ticks < max_ticks {
        if ticks % 30 == 0 {
            engine.order_worker(Role::Delivery, Order::Deliver);
            engine.order_worker(Role::Builder, Order::Build);
        }
        engine.update(TICK_SECONDS);
        ticks += 1;

        if verbose && ticks % 100_000 == 0 {
            let snap = engine.snapshot();
            println!(
                "  tick {:7}: floor {}/{}  stock {}  t={:.0}s",
                ticks, snap.floor, snap.total_floors, snap.stock, snap.time
            );
        }
    }

    results.push(TestResult {
        name: "project_completes".into(),
        passed: engine.is_complete(),
        detail: format!(
            "10 floors in {:.0} simulated seconds ({} ticks)",
            engine.clock.finish_time, ticks
        ),
    });

    let snap = engine.snapshot();
    results.push(TestResult {
        name: "completion_state_consistent".into(),
        passed: snap.floors_built == 10
            && snap.floor == 10
            && snap.floor_need == 0
            && (snap.floor_progress - 1.0).abs() < f32::EPSILON,
        detail: format!(
            "floors_built={} floor={} need={} progress={:.2}",
            snap.floors_built, snap.floor, snap.floor_need, snap.floor_progress
        ),
    });

    let delivery = snap.workers.iter().find(|w| w.role == "delivery");
    results.push(TestResult {
        name: "delivery_worker_leveled".into(),
        passed: delivery.is_some_and(|w| w.level == 11 && (w.max_stamina - 25.0).abs() < 0.001),
        detail: delivery
            .map(|w| format!("level {} with {:.0} max stamina", w.level, w.max_stamina))
            .unwrap_or_else(|| "delivery worker missing".into()),
    });

    // The frozen clock refuses further time and controls
    let frozen = engine.clock.elapsed;
    engine.update(TICK_SECONDS);
    results.push(TestResult {
        name: "completion_freezes_clock".into(),
        passed: engine.clock.elapsed == frozen && engine.clock.cycle_speed().is_none(),
        detail: format!("clock latched at {:.0}s", frozen),
    });

    results
}

// ── 6. Snapshot format ──────────────────────────────────────────────────

fn validate_snapshot(verbose: bool) -> Vec<TestResult> {
    println!("--- Snapshot Format ---");
    let mut results = Vec::new();

    let mut engine = SimulationEngine::new();
    engine.generate(WorldConfig {
        seed: 7,
        total_floors: 10,
    });
    for _ in 0..300 {
        engine.update(TICK_SECONDS);
    }

    let snap = engine.snapshot();
    let json = match snap.to_json() {
        Ok(j) => j,
        Err(e) => {
            results.push(TestResult {
                name: "snapshot_serializes".into(),
                passed: false,
                detail: format!("serialization error: {}", e),
            });
            return results;
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&json) {
        Ok(v) => v,
        Err(e) => {
            results.push(TestResult {
                name: "snapshot_serializes".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    let has_fields = ["time", "floor", "workers", "player", "material", "stock"]
        .iter()
        .all(|k| value.get(k).is_some());
    results.push(TestResult {
        name: "snapshot_serializes".into(),
        passed: has_fields,
        detail: format!("{} bytes of JSON", json.len()),
    });

    let workers_ok = value
        .get("workers")
        .and_then(|w| w.as_array())
        .is_some_and(|w| {
            w.len() == 2
                && w.iter().all(|entry| {
                    entry.get("id").is_some()
                        && entry.get("state").is_some()
                        && entry.get("stamina").is_some()
                })
        });
    results.push(TestResult {
        name: "snapshot_worker_entries".into(),
        passed: workers_ok,
        detail: "both workers present with state and stamina".into(),
    });

    if verbose {
        println!("  {}", json);
    }

    results
}
