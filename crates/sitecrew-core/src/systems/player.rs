//! Player systems - movement and the context-sensitive interact action.
//!
//! Interact resolves in priority order: hand off carried coffee, read a
//! depot, grab coffee at the cafe, check on a nearby worker, read whatever
//! zone is at hand, and finally an empty-handed shrug.

use hecs::{Entity, World};
use rand::Rng;

use sitecrew_logic::constants::{PLAYER_INTERACT_COOLDOWN, PLAYER_SPEED};
use sitecrew_logic::economy::Economy;
use sitecrew_logic::geometry::{Point, Rect};

use crate::components::{
    Assignment, Body, CarriedItem, Navigator, Order, Player, Stamina, Worker, Zone, ZoneKind,
};
use crate::feed::EventLog;
use crate::generation::SiteLayout;
use crate::systems::{collision_rects, set_worker_order};

use sitecrew_logic::collision::slide_step;

/// How far past a zone's edge the player still counts as "at" it.
const ZONE_CONTEXT_PADDING: f32 = 10.0;

/// Move the player along the current input vector for one tick.
pub fn player_movement_system(
    world: &mut World,
    player: Entity,
    layout: &SiteLayout,
    player_speed_mult: f32,
    dt: f32,
) {
    let obstacles = collision_rects(world, layout, player, false);
    let world_rect = layout.grid.world_rect();

    let Ok((p, body)) = world.query_one_mut::<(&Player, &mut Body)>(player) else {
        return;
    };

    let mut ix = p.input.x;
    let mut iy = p.input.y;
    if ix != 0.0 && iy != 0.0 {
        ix *= std::f32::consts::FRAC_1_SQRT_2;
        iy *= std::f32::consts::FRAC_1_SQRT_2;
    }
    let distance = PLAYER_SPEED * player_speed_mult * dt;

    let out = slide_step(body.rect(), Point::new(ix * distance, 0.0), &obstacles, world_rect);
    body.pos = out.position;
    let out = slide_step(body.rect(), Point::new(0.0, iy * distance), &obstacles, world_rect);
    body.pos = out.position;
}

/// Handle one press of the interact key.
#[allow(clippy::too_many_arguments)]
pub fn player_interact(
    world: &mut World,
    player: Entity,
    crew: &[Entity],
    layout: &SiteLayout,
    economy: &Economy,
    complete: bool,
    events: &mut EventLog,
    rng: &mut impl Rng,
) {
    let (player_rect, item) = {
        let Ok((p, body)) = world.query_one_mut::<(&mut Player, &Body)>(player) else {
            return;
        };
        if p.cooldown > 0.0 {
            return;
        }
        p.cooldown = PLAYER_INTERACT_COOLDOWN;
        (body.rect(), p.item)
    };

    if complete {
        events.push("Project complete! Restart to run it again.");
        return;
    }

    let zone = context_zone(world, player_rect);
    let nearby = nearby_worker(world, crew, layout, player_rect);

    if item == Some(CarriedItem::Coffee) {
        if nearby.is_some() {
            deliver_coffee(world, player, crew, layout, economy, events, rng);
            return;
        }
    }

    if let Some(zone) = &zone {
        if let Some(material) = zone.material() {
            events.push(format!(
                "{} depot ready. Delivery worker will fetch.",
                material.label()
            ));
            return;
        }
        if zone.kind == ZoneKind::Cafe {
            if item == Some(CarriedItem::Coffee) {
                events.push("Arms full! Deliver this coffee first.");
            } else if let Ok(p) = world.query_one_mut::<&mut Player>(player) {
                p.item = Some(CarriedItem::Coffee);
                events.push("Hot coffee acquired! Find a worker to perk up.");
            }
            return;
        }
    }

    if let Some(entity) = nearby {
        if let Ok((worker, stamina)) = world.query_one_mut::<(&Worker, &Stamina)>(entity) {
            events.push(format!(
                "{}: {:.1}/{} stamina.",
                worker.name,
                stamina.current,
                format_capacity(stamina.max)
            ));
        }
        return;
    }

    if let Some(zone) = zone {
        events.push(format!("{}: {}", zone.name, zone.description));
        return;
    }

    if item == Some(CarriedItem::Coffee) {
        events.push("You carry coffee. Find a worker to share it.");
    } else {
        events.push("You wave into the quiet night. Nothing happens.");
    }
}

fn format_capacity(max: f32) -> String {
    if max.fract() == 0.0 {
        format!("{}", max as u32)
    } else {
        format!("{:.1}", max)
    }
}

/// The zone whose padded rect the player overlaps, if any.
fn context_zone(world: &World, player_rect: Rect) -> Option<Zone> {
    world
        .query::<&Zone>()
        .iter()
        .find(|(_, zone)| zone.rect.expanded(ZONE_CONTEXT_PADDING).overlaps(&player_rect))
        .map(|(_, zone)| zone.clone())
}

/// The closest visible worker within arm's reach.
fn nearby_worker(
    world: &World,
    crew: &[Entity],
    layout: &SiteLayout,
    player_rect: Rect,
) -> Option<Entity> {
    let reach = layout.grid.cell_size * 1.1;
    let player_center = player_rect.center();
    crew.iter().copied().find(|&entity| {
        let Ok(mut query) = world.query_one::<(&Assignment, &Body)>(entity) else {
            return false;
        };
        let Some((assign, body)) = query.get() else {
            return false;
        };
        assign.visible && player_center.distance(&body.center()) <= reach
    })
}

/// Refill the whole crew's stamina and wake anyone resting.
fn deliver_coffee(
    world: &mut World,
    player: Entity,
    crew: &[Entity],
    layout: &SiteLayout,
    economy: &Economy,
    events: &mut EventLog,
    rng: &mut impl Rng,
) {
    if let Ok(p) = world.query_one_mut::<&mut Player>(player) {
        p.item = None;
    }

    for &entity in crew {
        let Ok((worker, assign, nav, body, stamina)) = world.query_one_mut::<(
            &mut Worker,
            &mut Assignment,
            &mut Navigator,
            &mut Body,
            &mut Stamina,
        )>(entity) else {
            continue;
        };
        stamina.current = stamina.max;
        if assign.order == Order::Rest {
            assign.visible = true;
            if let Some(anchor) = assign.rest_anchor {
                body.set_center(anchor);
            }
            let msg = format!("{} perks up from the latte!", worker.name);
            set_worker_order(
                worker, assign, nav, stamina, economy, layout, Order::Idle, Some(msg), events, rng,
            );
        }
    }

    events.push("Workers refreshed by coffee!");
}
