//! Components for the static site furniture: zones and rock formations.

use serde::{Deserialize, Serialize};

use sitecrew_logic::economy::Material;
use sitecrew_logic::geometry::Rect;
use sitecrew_logic::grid::Cell;

/// What a zone is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneKind {
    /// The construction site where floors go up.
    Construction,
    /// Unlimited supply of one material.
    Depot(Material),
    /// Coffee for the player to hand out.
    Cafe,
    /// Where exhausted workers recover.
    Dorm,
}

/// A named solid zone occupying a rectangle of cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub description: String,
    pub kind: ZoneKind,
    pub rect: Rect,
}

impl Zone {
    pub fn material(&self) -> Option<Material> {
        match self.kind {
            ZoneKind::Depot(material) => Some(material),
            _ => None,
        }
    }
}

/// Shape class of a decoration, which decides its look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecorKind {
    Rock,
    Pond,
    Fountain,
}

/// An impassable decoration covering a set of cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decor {
    pub kind: DecorKind,
    pub cells: Vec<Cell>,
}
