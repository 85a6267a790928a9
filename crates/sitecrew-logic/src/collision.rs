//! Axis-separated body movement against solid rectangles.
//!
//! Horizontal and vertical components are tested independently, so a body
//! pressed against an obstacle still slides along it on the free axis. The
//! result reports which axes were refused; callers use that to schedule a
//! path replan.

use crate::constants::{APPROACH_BUFFER, WORLD_EDGE_PADDING};
use crate::geometry::{Point, Rect};

/// Movement refusals below this magnitude are noise, not real blockage.
const BLOCK_REPORT_THRESHOLD: f32 = 0.01;

/// Result of one slide step: the new top-left corner plus per-axis refusals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideOutcome {
    pub position: Point,
    pub blocked_x: bool,
    pub blocked_y: bool,
}

impl SlideOutcome {
    pub fn blocked(&self) -> bool {
        self.blocked_x || self.blocked_y
    }
}

/// Move `body` by `delta`, testing each axis separately against `obstacles`
/// and clamping inside `world` with a small edge padding.
pub fn slide_step(body: Rect, delta: Point, obstacles: &[Rect], world: Rect) -> SlideOutcome {
    let mut pos = Point::new(body.x, body.y);
    let mut blocked_x = false;
    let mut blocked_y = false;

    if delta.x != 0.0 {
        let next = Rect::new(pos.x + delta.x, pos.y, body.width, body.height);
        if obstacles.iter().any(|o| next.overlaps(o)) {
            blocked_x = delta.x.abs() > BLOCK_REPORT_THRESHOLD;
        } else {
            pos.x = next.x;
        }
    }

    if delta.y != 0.0 {
        let next = Rect::new(pos.x, pos.y + delta.y, body.width, body.height);
        if obstacles.iter().any(|o| next.overlaps(o)) {
            blocked_y = delta.y.abs() > BLOCK_REPORT_THRESHOLD;
        } else {
            pos.y = next.y;
        }
    }

    pos.x = pos.x.clamp(
        world.x + WORLD_EDGE_PADDING,
        world.x + world.width - body.width - WORLD_EDGE_PADDING,
    );
    pos.y = pos.y.clamp(
        world.y + WORLD_EDGE_PADDING,
        world.y + world.height - body.height - WORLD_EDGE_PADDING,
    );

    SlideOutcome {
        position: pos,
        blocked_x,
        blocked_y,
    }
}

/// One step of point-to-point pursuit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Approach {
    /// Within the approach buffer; the caller should snap to the target.
    Arrived,
    /// Desired displacement for this step.
    Step(Point),
}

/// Head from `center` toward `target` at `speed` for `dt` seconds. The step
/// never overshoots the target.
pub fn approach(center: Point, target: Point, speed: f32, dt: f32) -> Approach {
    let to_target = target - center;
    let distance = to_target.length();
    if distance <= APPROACH_BUFFER {
        return Approach::Arrived;
    }
    let step = speed * dt;
    let ratio = (step / distance).min(1.0);
    Approach::Step(to_target * ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Rect {
        Rect::new(0.0, 0.0, 1140.0, 600.0)
    }

    fn body_at(x: f32, y: f32) -> Rect {
        Rect::new(x, y, 20.0, 20.0)
    }

    #[test]
    fn free_movement_applies_both_axes() {
        let out = slide_step(body_at(100.0, 100.0), Point::new(5.0, -3.0), &[], world());
        assert_eq!(out.position, Point::new(105.0, 97.0));
        assert!(!out.blocked());
    }

    #[test]
    fn wall_slide_keeps_free_axis() {
        // Wall immediately to the right; diagonal input should still move down.
        let wall = Rect::new(120.0, 0.0, 30.0, 600.0);
        let out = slide_step(
            body_at(100.0, 100.0),
            Point::new(5.0, 5.0),
            &[wall],
            world(),
        );
        assert!(out.blocked_x);
        assert!(!out.blocked_y);
        assert_eq!(out.position, Point::new(100.0, 105.0));
    }

    #[test]
    fn clamps_to_world_edge() {
        let out = slide_step(body_at(3.0, 3.0), Point::new(-50.0, -50.0), &[], world());
        assert_eq!(out.position, Point::new(2.0, 2.0));
        let out = slide_step(
            body_at(1100.0, 570.0),
            Point::new(500.0, 500.0),
            &[],
            world(),
        );
        assert_eq!(out.position, Point::new(1118.0, 578.0));
    }

    #[test]
    fn tiny_refusal_is_not_reported() {
        let wall = Rect::new(120.0, 0.0, 30.0, 600.0);
        let out = slide_step(
            body_at(100.5, 100.0),
            Point::new(0.005, 0.0),
            &[wall],
            world(),
        );
        assert!(!out.blocked_x);
    }

    #[test]
    fn approach_snaps_inside_buffer() {
        let center = Point::new(100.0, 100.0);
        let target = Point::new(102.0, 101.0);
        assert_eq!(approach(center, target, 85.0, 1.0 / 30.0), Approach::Arrived);
    }

    #[test]
    fn approach_step_never_overshoots() {
        let center = Point::new(0.0, 0.0);
        let target = Point::new(10.0, 0.0);
        match approach(center, target, 1000.0, 1.0) {
            Approach::Step(step) => {
                assert!((step.x - 10.0).abs() < 1e-4);
                assert_eq!(step.y, 0.0);
            }
            Approach::Arrived => panic!("should step, not snap"),
        }
    }

    #[test]
    fn approach_step_scales_with_speed_and_dt() {
        let center = Point::new(0.0, 0.0);
        let target = Point::new(100.0, 0.0);
        match approach(center, target, 85.0, 0.1) {
            Approach::Step(step) => {
                assert!((step.x - 8.5).abs() < 1e-4);
            }
            Approach::Arrived => panic!("should step"),
        }
    }
}
