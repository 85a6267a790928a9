//! World generation - lays out the site and spawns the crew

mod crew;
mod site;

pub use crew::*;
pub use site::*;
