//! Systems - logic that operates on components

mod buff;
mod idle;
mod navigation;
mod orders;
mod player;
mod tasks;

pub use buff::*;
pub use idle::*;
pub use navigation::*;
pub use orders::*;
pub use player::*;
pub use tasks::*;
