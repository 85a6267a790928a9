//! Order system - applies player-issued orders to workers, with guards.
//!
//! Guard order matters: a build order is refused outright when stock is
//! short (the order stands unchanged), but a tired worker is redirected to
//! rest instead. A worker anywhere on the rest cycle refuses everything
//! except the idle wake-up, and the FSM silently ignores events it does not
//! accept in the current state.

use rand::Rng;

use sitecrew_logic::constants::{DELIVERY_TRIP_COST, STAMINA_BUILD_COST};
use sitecrew_logic::economy::Economy;
use sitecrew_logic::fsm::{Transition, WorkerEvent};

use crate::components::{Activity, Assignment, Navigator, Order, Stamina, Worker};
use crate::feed::EventLog;
use crate::generation::{SiteLayout, CONSTRUCTION_SITE_NAME, DORM_NAME};

/// Apply an FSM event to a worker, logging the transition if it was legal.
pub fn apply_fsm_event(worker: &mut Worker, event: WorkerEvent) -> Option<Transition> {
    let transition = worker.fsm.apply(event)?;
    log::debug!(
        "{} {}: {} -> {}",
        worker.name,
        transition.event.name(),
        transition.from.name(),
        transition.to.name()
    );
    Some(transition)
}

/// Give a worker a new standing order. Re-issuing the current order without
/// an override message is a no-op.
#[allow(clippy::too_many_arguments)]
pub fn set_worker_order(
    worker: &mut Worker,
    assign: &mut Assignment,
    nav: &mut Navigator,
    stamina: &Stamina,
    economy: &Economy,
    layout: &SiteLayout,
    new_order: Order,
    message_override: Option<String>,
    events: &mut EventLog,
    rng: &mut impl Rng,
) {
    if assign.order == new_order && message_override.is_none() {
        return;
    }

    // A worker on the rest cycle only answers the idle wake-up.
    if assign.order == Order::Rest && new_order != Order::Idle {
        events.push(format!("{} is resting and will be back soon.", worker.name));
        return;
    }

    let required = economy.floor.material();

    match new_order {
        Order::Build => {
            if economy.stock_of(required) < economy.floor.need {
                events.push(format!(
                    "Need more {} before building.",
                    required.label().to_lowercase()
                ));
                return;
            }
            if stamina.current < STAMINA_BUILD_COST {
                let msg = format!("{} is too tired to build and heads to the dorm.", worker.name);
                set_worker_order(
                    worker,
                    assign,
                    nav,
                    stamina,
                    economy,
                    layout,
                    Order::Rest,
                    Some(msg),
                    events,
                    rng,
                );
                return;
            }
        }
        Order::Deliver => {
            if stamina.current < DELIVERY_TRIP_COST {
                let msg = format!(
                    "{} needs rest before delivering and walks to the dorm.",
                    worker.name
                );
                set_worker_order(
                    worker,
                    assign,
                    nav,
                    stamina,
                    economy,
                    layout,
                    Order::Rest,
                    Some(msg),
                    events,
                    rng,
                );
                return;
            }
        }
        Order::Rest | Order::Idle => {}
    }

    let previous = assign.order;
    assign.order = new_order;

    if previous != new_order {
        match new_order {
            Order::Build => {
                apply_fsm_event(worker, WorkerEvent::Build);
            }
            Order::Deliver => {
                apply_fsm_event(worker, WorkerEvent::Fetch);
            }
            Order::Rest => {
                apply_fsm_event(worker, WorkerEvent::Rest);
            }
            // A rest cycle ends through Recovered, never Cancel; the FSM
            // stays where it is if the order is revoked mid-dorm.
            Order::Idle if previous != Order::Rest => {
                apply_fsm_event(worker, WorkerEvent::Cancel);
            }
            Order::Idle => {}
        }
    }

    match new_order {
        Order::Idle => {
            nav.set_target(None);
            assign.activity = Activity::Idle;
            assign.task_timer = 0.0;
            assign.build_reserved = false;
            assign.drop_cargo();
            assign.visible = true;
            assign.idle_cooldown = rng.gen::<f32>() * 0.6;
        }
        Order::Build => {
            nav.set_target(None);
            assign.build_reserved = false;
            assign.activity = Activity::ToSite;
            nav.set_target(layout.approach(CONSTRUCTION_SITE_NAME));
        }
        Order::Deliver => {
            nav.set_target(None);
            assign.task_timer = 0.0;
            assign.drop_cargo();
            assign.activity = Activity::ToDepot;
            nav.set_target(layout.approach(required.depot_name()));
        }
        Order::Rest => {
            nav.set_target(None);
            assign.activity = Activity::ToDorm;
            assign.rest_anchor = None;
            assign.visible = true;
            assign.drop_cargo();
            nav.set_target(layout.approach(DORM_NAME));
        }
    }

    let message = message_override.unwrap_or_else(|| match new_order {
        Order::Idle => format!("{} is idling and waiting for orders.", worker.name),
        Order::Build => format!("{} starts building floor {}.", worker.name, economy.floor.number),
        Order::Deliver => format!(
            "{} begins fetching {}.",
            worker.name,
            required.label().to_lowercase()
        ),
        Order::Rest => format!("{} walks to the dorm for a break.", worker.name),
    });
    events.push(message);
}
