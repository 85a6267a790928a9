//! Task system - drives each worker through its current order.
//!
//! Workers are processed one at a time in crew order, each against a fresh
//! snapshot of the other agents, so movement earlier in the tick is visible
//! to everyone after. Order handlers mirror the job cycles: builder
//! (site, reserve, build), delivery (depot, load, haul, drop), and the
//! shared rest cycle.

use hecs::{Entity, World};
use rand::Rng;

use sitecrew_logic::constants::{
    DELIVERY_DROP_TIME, DELIVERY_LOAD_TIME, DELIVERY_TRIP_COST, STAMINA_BUILD_COST,
    BUILD_PROGRESS_SLOWDOWN, STAMINA_REST_RATE, WORKER_ACTIVE_SPEED, WORKER_CARRY_SPEED,
};
use sitecrew_logic::economy::{delivery_level, delivery_max_stamina, Economy, FloorCompletion};
use sitecrew_logic::fsm::{Role, WorkerEvent};

use crate::components::{Activity, Assignment, Body, Navigator, Order, Stamina, Worker};
use crate::feed::EventLog;
use crate::generation::{SiteLayout, CONSTRUCTION_SITE_NAME, DORM_NAME};
use crate::systems::{
    apply_fsm_event, collision_rects, move_agent, occupied_cells, set_worker_order, tick_replan,
    Modifiers, NavContext,
};

/// Run every worker's order for one tick. Returns the floor completion if
/// the builder finished one.
pub fn run_worker_orders(
    world: &mut World,
    crew: &[Entity],
    layout: &SiteLayout,
    economy: &mut Economy,
    modifiers: &Modifiers,
    dt: f32,
    events: &mut EventLog,
    rng: &mut impl Rng,
) -> Option<FloorCompletion> {
    let mut completion = None;

    for &entity in crew {
        let obstacles = collision_rects(world, layout, entity, true);
        let occupied = occupied_cells(world, layout, entity);
        let ctx = NavContext {
            layout,
            obstacles: &obstacles,
            occupied: &occupied,
        };

        let Ok((worker, assign, nav, body, stamina)) = world.query_one_mut::<(
            &mut Worker,
            &mut Assignment,
            &mut Navigator,
            &mut Body,
            &mut Stamina,
        )>(entity) else {
            continue;
        };

        tick_replan(nav, dt);

        if assign.order == Order::Rest {
            handle_rest(worker, assign, nav, body, stamina, economy, layout, modifiers, dt, &ctx, events, rng);
            continue;
        }

        if assign.order == Order::Idle {
            assign.activity = Activity::Idle;
            assign.build_reserved = false;
            assign.task_timer = 0.0;
            continue;
        }

        if stamina.is_exhausted() {
            let msg = format!("{} heads to the dorm to recover.", worker.name);
            set_worker_order(
                worker, assign, nav, stamina, economy, layout, Order::Rest, Some(msg), events, rng,
            );
            continue;
        }

        match (worker.role(), assign.order) {
            (Role::Builder, Order::Build) => {
                let outcome = handle_builder(
                    worker, assign, nav, body, stamina, economy, layout, modifiers, dt, &ctx,
                    events, rng,
                );
                if outcome.is_some() {
                    completion = outcome;
                }
            }
            (Role::Delivery, Order::Deliver) => {
                handle_delivery(
                    worker, assign, nav, body, stamina, economy, layout, modifiers, dt, &ctx,
                    events, rng,
                );
            }
            _ => {}
        }
    }

    if let Some(outcome) = completion {
        after_floor_completion(world, crew, layout, economy, events, outcome);
    }
    completion
}

#[allow(clippy::too_many_arguments)]
fn handle_builder(
    worker: &mut Worker,
    assign: &mut Assignment,
    nav: &mut Navigator,
    body: &mut Body,
    stamina: &mut Stamina,
    economy: &mut Economy,
    layout: &SiteLayout,
    modifiers: &Modifiers,
    dt: f32,
    ctx: &NavContext<'_>,
    events: &mut EventLog,
    rng: &mut impl Rng,
) -> Option<FloorCompletion> {
    let approach = layout.approach(CONSTRUCTION_SITE_NAME)?;
    let required = economy.floor.material();

    if assign.activity != Activity::ToSite && assign.activity != Activity::Building {
        assign.activity = Activity::ToSite;
        nav.set_target(Some(approach));
    }

    if assign.activity == Activity::ToSite {
        let speed = WORKER_ACTIVE_SPEED * modifiers.worker_speed;
        if move_agent(nav, body, approach, speed, dt, ctx) {
            apply_fsm_event(worker, WorkerEvent::ArriveWork);
            nav.set_target(None);
            assign.activity = Activity::Building;
            if !assign.build_reserved {
                if !economy.floor.reserved && economy.stock_of(required) < economy.floor.need {
                    set_worker_order(
                        worker,
                        assign,
                        nav,
                        stamina,
                        economy,
                        layout,
                        Order::Idle,
                        Some("Need more material before building.".to_string()),
                        events,
                        rng,
                    );
                    return None;
                }
                if stamina.current < STAMINA_BUILD_COST {
                    let msg = format!("{} needs rest before building.", worker.name);
                    set_worker_order(
                        worker, assign, nav, stamina, economy, layout, Order::Rest, Some(msg),
                        events, rng,
                    );
                    return None;
                }
                economy.reserve_build();
                stamina.drain(STAMINA_BUILD_COST);
                assign.build_reserved = true;
            }
        }
        return None;
    }

    // Building
    if !assign.build_reserved {
        assign.activity = Activity::ToSite;
        nav.set_target(Some(approach));
        return None;
    }

    let effective = economy.floor.build_time * BUILD_PROGRESS_SLOWDOWN * modifiers.build_time;
    let outcome = economy.apply_progress(dt, effective)?;

    assign.build_reserved = false;
    apply_fsm_event(worker, WorkerEvent::Complete);
    if stamina.current < STAMINA_BUILD_COST {
        let msg = format!("{} completes the floor and heads to the dorm.", worker.name);
        set_worker_order(
            worker, assign, nav, stamina, economy, layout, Order::Rest, Some(msg), events, rng,
        );
    } else {
        let msg = format!("{} completes the floor!", worker.name);
        set_worker_order(
            worker, assign, nav, stamina, economy, layout, Order::Idle, Some(msg), events, rng,
        );
    }
    Some(outcome)
}

#[allow(clippy::too_many_arguments)]
fn handle_delivery(
    worker: &mut Worker,
    assign: &mut Assignment,
    nav: &mut Navigator,
    body: &mut Body,
    stamina: &mut Stamina,
    economy: &mut Economy,
    layout: &SiteLayout,
    modifiers: &Modifiers,
    dt: f32,
    ctx: &NavContext<'_>,
    events: &mut EventLog,
    rng: &mut impl Rng,
) {
    let required = economy.floor.material();
    let Some(depot) = layout.approach(required.depot_name()) else {
        return;
    };
    let Some(site) = layout.approach(CONSTRUCTION_SITE_NAME) else {
        return;
    };

    let in_cycle = matches!(
        assign.activity,
        Activity::ToDepot | Activity::Loading | Activity::Hauling | Activity::Delivering
    );
    if !in_cycle {
        assign.activity = Activity::ToDepot;
        nav.set_target(Some(depot));
    }

    match assign.activity {
        Activity::ToDepot => {
            let speed = WORKER_ACTIVE_SPEED * modifiers.worker_speed;
            if move_agent(nav, body, depot, speed, dt, ctx) {
                apply_fsm_event(worker, WorkerEvent::ArriveSource);
                assign.activity = Activity::Loading;
                assign.task_timer = 0.0;
                nav.set_target(None);
            }
        }
        Activity::Loading => {
            assign.task_timer += dt;
            if assign.task_timer >= DELIVERY_LOAD_TIME {
                assign.task_timer = 0.0;
                let carrying_required = assign.cargo == Some(required);
                if economy.remaining_need() == 0 && !carrying_required {
                    let msg = format!("{} already stocked for this floor.", required.label());
                    set_worker_order(
                        worker, assign, nav, stamina, economy, layout, Order::Idle, Some(msg),
                        events, rng,
                    );
                    return;
                }
                assign.carrying = 1;
                assign.cargo = Some(required);
                apply_fsm_event(worker, WorkerEvent::LoadComplete);
                assign.activity = Activity::Hauling;
                nav.set_target(Some(site));
            }
        }
        Activity::Hauling => {
            let speed = WORKER_CARRY_SPEED * modifiers.worker_speed;
            if move_agent(nav, body, site, speed, dt, ctx) {
                apply_fsm_event(worker, WorkerEvent::ArriveSite);
                assign.activity = Activity::Delivering;
                assign.task_timer = 0.0;
            }
        }
        Activity::Delivering => {
            assign.task_timer += dt;
            if assign.task_timer >= DELIVERY_DROP_TIME {
                assign.task_timer = 0.0;
                let Some(cargo) = assign.cargo else {
                    assign.activity = Activity::ToDepot;
                    nav.set_target(Some(depot));
                    return;
                };
                if assign.carrying == 0 {
                    assign.activity = Activity::ToDepot;
                    nav.set_target(Some(depot));
                    return;
                }
                let delivered = assign.carrying;
                economy.deposit(cargo, delivered);
                assign.drop_cargo();
                apply_fsm_event(worker, WorkerEvent::DropComplete);
                stamina.drain(DELIVERY_TRIP_COST);
                events.push(format!(
                    "{} delivered {} {}.",
                    worker.name,
                    delivered,
                    cargo.label().to_lowercase()
                ));
                if stamina.is_exhausted() {
                    let msg = format!("{} is exhausted and heads to the dorm.", worker.name);
                    set_worker_order(
                        worker, assign, nav, stamina, economy, layout, Order::Rest, Some(msg),
                        events, rng,
                    );
                    return;
                }
                assign.activity = Activity::ToDepot;
                nav.set_target(Some(depot));
            }
        }
        _ => {}
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_rest(
    worker: &mut Worker,
    assign: &mut Assignment,
    nav: &mut Navigator,
    body: &mut Body,
    stamina: &mut Stamina,
    economy: &Economy,
    layout: &SiteLayout,
    modifiers: &Modifiers,
    dt: f32,
    ctx: &NavContext<'_>,
    events: &mut EventLog,
    rng: &mut impl Rng,
) {
    let Some(dorm) = layout.approach(DORM_NAME) else {
        return;
    };

    if assign.activity != Activity::ToDorm && assign.activity != Activity::Resting {
        assign.activity = Activity::ToDorm;
        assign.visible = true;
        nav.set_target(Some(dorm));
        assign.rest_anchor = Some(dorm);
    }

    if assign.activity == Activity::ToDorm {
        let speed = WORKER_ACTIVE_SPEED * modifiers.worker_speed;
        if move_agent(nav, body, dorm, speed, dt, ctx) {
            apply_fsm_event(worker, WorkerEvent::ArriveRest);
            nav.set_target(None);
            assign.activity = Activity::Resting;
            assign.visible = false;
        }
        return;
    }

    // Resting
    stamina.current = (stamina.current + STAMINA_REST_RATE * dt).min(stamina.max);
    if stamina.current >= stamina.max - 0.01 {
        stamina.current = stamina.max;
        assign.visible = true;
        if let Some(anchor) = assign.rest_anchor {
            body.set_center(anchor);
        }
        apply_fsm_event(worker, WorkerEvent::Recovered);
        let msg = format!("{} feels refreshed and leaves the dorm.", worker.name);
        set_worker_order(
            worker, assign, nav, stamina, economy, layout, Order::Idle, Some(msg), events, rng,
        );
    }
}

/// Level up the delivery worker and, when the project continues, point any
/// active delivery run at the next floor's depot.
fn after_floor_completion(
    world: &mut World,
    crew: &[Entity],
    layout: &SiteLayout,
    economy: &Economy,
    events: &mut EventLog,
    outcome: FloorCompletion,
) {
    for &entity in crew {
        let Ok((worker, assign, nav, stamina)) = world.query_one_mut::<(
            &mut Worker,
            &mut Assignment,
            &mut Navigator,
            &mut Stamina,
        )>(entity) else {
            continue;
        };
        if worker.role() != Role::Delivery {
            continue;
        }

        stamina.max = delivery_max_stamina(economy.floors_built);
        stamina.current = stamina.max;
        worker.level = delivery_level(economy.floors_built, economy.total_floors);

        if let FloorCompletion::Advanced { .. } = outcome {
            if assign.order == Order::Deliver {
                assign.activity = Activity::ToDepot;
                assign.drop_cargo();
                nav.set_target(layout.approach(economy.floor.material().depot_name()));
            }
        }
    }

    if let FloorCompletion::Advanced { finished, next } = outcome {
        events.push(format!(
            "Floor {} complete! Preparing materials for floor {}.",
            finished, next
        ));
    }
}
