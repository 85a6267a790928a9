//! Components for the moving agents: workers and the player.

use serde::{Deserialize, Serialize};

use sitecrew_logic::economy::Material;
use sitecrew_logic::fsm::{Role, StateMachine};
use sitecrew_logic::geometry::{Point, Rect};
use sitecrew_logic::grid::{Cell, GridSpec};

/// Physical extent of an agent. `pos` is the top-left corner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Body {
    pub pos: Point,
    pub width: f32,
    pub height: f32,
}

impl Body {
    /// Spawn a body centered in a grid cell.
    pub fn at_cell(grid: &GridSpec, cell: Cell, size: f32) -> Self {
        let center = grid.cell_center(cell);
        Self {
            pos: Point::new(center.x - size / 2.0, center.y - size / 2.0),
            width: size,
            height: size,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.pos.x + self.width / 2.0,
            self.pos.y + self.height / 2.0,
        )
    }

    pub fn set_center(&mut self, center: Point) {
        self.pos = Point::new(center.x - self.width / 2.0, center.y - self.height / 2.0);
    }
}

/// Depletable work energy. Drained by building and delivery trips, restored
/// in the dorm.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Stamina {
    pub current: f32,
    pub max: f32,
}

impl Stamina {
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn drain(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn is_exhausted(&self) -> bool {
        self.current <= 0.0
    }
}

/// Worker identity: stable id, display name, role, and the job-cycle FSM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub id: String,
    pub name: String,
    pub fsm: StateMachine,
    /// Display level; the delivery worker levels up per completed floor.
    pub level: u32,
}

impl Worker {
    pub fn new(id: &str, name: &str, role: Role) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            fsm: StateMachine::new(role),
            level: 1,
        }
    }

    pub fn role(&self) -> Role {
        self.fsm.role
    }
}

/// Player-issued standing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Idle,
    Build,
    Deliver,
    Rest,
}

impl Order {
    pub fn label(&self) -> &'static str {
        match self {
            Order::Idle => "idle",
            Order::Build => "build",
            Order::Deliver => "deliver",
            Order::Rest => "rest",
        }
    }
}

/// Fine-grained phase within the current order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activity {
    Idle,
    ToSite,
    Building,
    ToDepot,
    Loading,
    /// Carrying cargo from the depot to the site.
    Hauling,
    /// Unloading at the site.
    Delivering,
    ToDorm,
    Resting,
}

impl Activity {
    pub fn label(&self) -> &'static str {
        match self {
            Activity::Idle => "idle",
            Activity::ToSite => "toSite",
            Activity::Building => "building",
            Activity::ToDepot => "toDepot",
            Activity::Loading => "loading",
            Activity::Hauling => "hauling",
            Activity::Delivering => "delivering",
            Activity::ToDorm => "toDorm",
            Activity::Resting => "resting",
        }
    }
}

/// Mutable task-execution state for one worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub order: Order,
    pub activity: Activity,
    /// The builder has claimed materials for the current floor.
    pub build_reserved: bool,
    /// Elapsed time in the current timed phase (loading, dropping).
    pub task_timer: f32,
    pub cargo: Option<Material>,
    pub carrying: u32,
    /// Workers disappear from the site while resting in the dorm.
    pub visible: bool,
    /// Where the worker reappears when rest ends.
    pub rest_anchor: Option<Point>,
    /// Delay before the next idle wander target is picked.
    pub idle_cooldown: f32,
}

impl Default for Assignment {
    fn default() -> Self {
        Self {
            order: Order::Idle,
            activity: Activity::Idle,
            build_reserved: false,
            task_timer: 0.0,
            cargo: None,
            carrying: 0,
            visible: true,
            rest_anchor: None,
            idle_cooldown: 0.0,
        }
    }
}

impl Assignment {
    pub fn drop_cargo(&mut self) {
        self.cargo = None;
        self.carrying = 0;
    }
}

/// Waypoint-following state. A navigator owns the current destination, the
/// planned waypoints toward it, and the replan/backoff bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Navigator {
    pub target: Option<Point>,
    pub path: Vec<Point>,
    pub path_index: usize,
    pub goal: Option<Cell>,
    pub needs_recalc: bool,
    pub replan_timer: f32,
    pub blocked: bool,
    pub failure_cooldown: f32,
}

impl Navigator {
    /// Point at a new destination. Clears all plan state so the next move
    /// recomputes from scratch.
    pub fn set_target(&mut self, target: Option<Point>) {
        match target {
            Some(point) => {
                self.reset_plan();
                self.target = Some(point);
                self.needs_recalc = true;
            }
            None => self.clear(),
        }
    }

    /// Forget the planned waypoints but keep pursuing the target.
    pub fn reset_plan(&mut self) {
        self.path.clear();
        self.path_index = 0;
        self.goal = None;
        self.needs_recalc = false;
        self.replan_timer = 0.0;
        self.blocked = false;
        self.failure_cooldown = 0.0;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn has_active_path(&self) -> bool {
        self.path_index < self.path.len()
    }
}

/// Something the player is carrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarriedItem {
    Coffee,
}

/// The player-controlled agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub item: Option<CarriedItem>,
    /// Seconds until the next interaction is accepted.
    pub cooldown: f32,
    /// Normalized movement input for this tick, each axis in [-1, 1].
    pub input: Point,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            item: None,
            cooldown: 0.0,
            input: Point::ZERO,
        }
    }
}
