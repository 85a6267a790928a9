//! Construction economy: material schedule, floor ledger, stock, and the
//! delivery worker's leveling curve.
//!
//! Build costs are reserved in one shot: when a builder arrives at the site
//! the full floor requirement is deducted from stock and the floor is marked
//! reserved. Progress then accrues against the reservation; nothing is
//! refunded if the builder is interrupted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::{
    BUILD_TIME_BASE, BUILD_TIME_PER_FLOOR, DELIVERY_BASE_STAMINA, DELIVERY_STAMINA_PER_FLOOR,
    MATERIAL_BASE, MATERIAL_PER_FLOOR,
};

/// Construction materials, one per band of floors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Concrete,
    Wood,
    Glass,
}

impl Material {
    pub fn label(&self) -> &'static str {
        match self {
            Material::Concrete => "Concrete",
            Material::Wood => "Wood",
            Material::Glass => "Glass",
        }
    }

    /// The supply zone that stocks this material.
    pub fn depot_name(&self) -> &'static str {
        match self {
            Material::Concrete => "Concrete Depot",
            Material::Wood => "Wood Depot",
            Material::Glass => "Glass Depot",
        }
    }
}

/// Which material a given floor number consumes. Floors past the last band
/// fall through to the final material.
pub fn material_for_floor(floor: u32) -> Material {
    match floor {
        1..=3 => Material::Concrete,
        4..=7 => Material::Wood,
        _ => Material::Glass,
    }
}

/// Units of material a floor requires: 10 for floor 1, +5 per floor after.
pub fn need_for_floor(floor: u32) -> u32 {
    MATERIAL_BASE + MATERIAL_PER_FLOOR * floor.saturating_sub(1)
}

/// Base build duration for a floor in seconds, before slowdown and buffs.
pub fn build_time_for_floor(floor: u32) -> f32 {
    BUILD_TIME_BASE + BUILD_TIME_PER_FLOOR * floor.saturating_sub(1) as f32
}

/// Delivery worker stamina capacity after `floors_built` completions.
pub fn delivery_max_stamina(floors_built: u32) -> f32 {
    DELIVERY_BASE_STAMINA + DELIVERY_STAMINA_PER_FLOOR * floors_built as f32
}

/// Delivery worker display level, capped one above the project size.
pub fn delivery_level(floors_built: u32, total_floors: u32) -> u32 {
    (floors_built + 1).min(total_floors + 1)
}

/// Ledger for the floor currently under construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorState {
    /// 1-based floor number.
    pub number: u32,
    /// Units of the floor's material still required in stock to reserve.
    pub need: u32,
    /// Base build duration for this floor in seconds.
    pub build_time: f32,
    /// Fraction complete, 0.0 to 1.0.
    pub progress: f32,
    /// A builder has claimed materials and is (or was) building this floor.
    pub reserved: bool,
}

impl FloorState {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            need: need_for_floor(number),
            build_time: build_time_for_floor(number),
            progress: 0.0,
            reserved: false,
        }
    }

    pub fn material(&self) -> Material {
        material_for_floor(self.number)
    }
}

/// Result of finishing a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorCompletion {
    /// Construction advanced to the named next floor.
    Advanced { finished: u32, next: u32 },
    /// The final floor is done; the project is complete.
    ProjectComplete { finished: u32 },
}

/// The shared construction economy: material stock, the active floor, and
/// overall progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Economy {
    pub stock: HashMap<Material, u32>,
    pub floor: FloorState,
    pub floors_built: u32,
    pub total_floors: u32,
}

impl Economy {
    pub fn new(total_floors: u32) -> Self {
        let mut stock = HashMap::new();
        // Seed stock: not enough for floor 1, so deliveries matter from tick 0.
        stock.insert(Material::Concrete, 2);
        Self {
            stock,
            floor: FloorState::new(1),
            floors_built: 0,
            total_floors,
        }
    }

    pub fn stock_of(&self, material: Material) -> u32 {
        self.stock.get(&material).copied().unwrap_or(0)
    }

    /// Units still missing before the current floor can be reserved.
    pub fn remaining_need(&self) -> u32 {
        self.floor.need.saturating_sub(self.stock_of(self.floor.material()))
    }

    /// Add delivered units to stock.
    pub fn deposit(&mut self, material: Material, amount: u32) {
        *self.stock.entry(material).or_insert(0) += amount;
    }

    /// Claim the full floor requirement from stock. Fails without touching
    /// stock when the requirement is not met; a floor already reserved needs
    /// no further materials.
    pub fn reserve_build(&mut self) -> bool {
        if self.floor.reserved {
            return true;
        }
        let material = self.floor.material();
        let have = self.stock_of(material);
        if have < self.floor.need {
            return false;
        }
        self.stock.insert(material, have - self.floor.need);
        self.floor.reserved = true;
        true
    }

    /// Accrue build progress. `effective_build_time` is the floor's base
    /// time with slowdown and buffs already applied. Returns the completion
    /// outcome when progress reaches 1.0.
    pub fn apply_progress(&mut self, dt: f32, effective_build_time: f32) -> Option<FloorCompletion> {
        if !self.floor.reserved || effective_build_time <= 0.0 {
            return None;
        }
        self.floor.progress = (self.floor.progress + dt / effective_build_time).min(1.0);
        if self.floor.progress >= 1.0 {
            Some(self.complete_floor())
        } else {
            None
        }
    }

    fn complete_floor(&mut self) -> FloorCompletion {
        let finished = self.floor.number;
        self.floors_built = (self.floors_built + 1).min(self.total_floors);
        self.floor.reserved = false;

        if finished >= self.total_floors {
            self.floor.progress = 1.0;
            self.floor.need = 0;
            FloorCompletion::ProjectComplete { finished }
        } else {
            self.floor = FloorState::new(finished + 1);
            FloorCompletion::Advanced {
                finished,
                next: self.floor.number,
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.floors_built >= self.total_floors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_bands() {
        assert_eq!(material_for_floor(1), Material::Concrete);
        assert_eq!(material_for_floor(3), Material::Concrete);
        assert_eq!(material_for_floor(4), Material::Wood);
        assert_eq!(material_for_floor(7), Material::Wood);
        assert_eq!(material_for_floor(8), Material::Glass);
        assert_eq!(material_for_floor(10), Material::Glass);
        // Past the schedule, the last band applies
        assert_eq!(material_for_floor(14), Material::Glass);
    }

    #[test]
    fn need_and_build_time_scale_linearly() {
        assert_eq!(need_for_floor(1), 10);
        assert_eq!(need_for_floor(2), 15);
        assert_eq!(need_for_floor(10), 55);
        assert!((build_time_for_floor(1) - 5.0).abs() < f32::EPSILON);
        assert!((build_time_for_floor(10) - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn reserve_fails_short_of_need() {
        let mut econ = Economy::new(10);
        assert_eq!(econ.stock_of(Material::Concrete), 2);
        assert!(!econ.reserve_build());
        assert_eq!(econ.stock_of(Material::Concrete), 2);
        assert!(!econ.floor.reserved);
    }

    #[test]
    fn reserve_deducts_full_need_once() {
        let mut econ = Economy::new(10);
        econ.deposit(Material::Concrete, 9);
        assert!(econ.reserve_build());
        assert_eq!(econ.stock_of(Material::Concrete), 1);
        // A second reservation attempt is a no-op on stock
        assert!(econ.reserve_build());
        assert_eq!(econ.stock_of(Material::Concrete), 1);
    }

    #[test]
    fn progress_only_accrues_when_reserved() {
        let mut econ = Economy::new(10);
        assert!(econ.apply_progress(1.0, 7.5).is_none());
        assert_eq!(econ.floor.progress, 0.0);
    }

    #[test]
    fn floor_completion_advances_ledger() {
        let mut econ = Economy::new(10);
        econ.deposit(Material::Concrete, 8);
        assert!(econ.reserve_build());
        let outcome = econ.apply_progress(100.0, 7.5);
        assert_eq!(
            outcome,
            Some(FloorCompletion::Advanced {
                finished: 1,
                next: 2
            })
        );
        assert_eq!(econ.floor.number, 2);
        assert_eq!(econ.floor.need, 15);
        assert_eq!(econ.floor.progress, 0.0);
        assert!(!econ.floor.reserved);
        assert_eq!(econ.floors_built, 1);
    }

    #[test]
    fn final_floor_completes_project() {
        let mut econ = Economy::new(2);
        for _ in 0..2 {
            let need = econ.floor.need;
            econ.deposit(econ.floor.material(), need);
            assert!(econ.reserve_build());
            econ.apply_progress(1000.0, 7.5);
        }
        assert!(econ.is_complete());
        assert_eq!(econ.floor.need, 0);
        assert_eq!(econ.floor.progress, 1.0);
        assert_eq!(econ.floors_built, 2);
    }

    #[test]
    fn tenth_floor_finishes_full_project() {
        let mut econ = Economy::new(10);
        for expected_floor in 1..=10 {
            assert_eq!(econ.floor.number, expected_floor);
            let need = econ.floor.need;
            econ.deposit(econ.floor.material(), need);
            assert!(econ.reserve_build());
            let outcome = econ.apply_progress(10_000.0, 1.0);
            if expected_floor < 10 {
                assert!(matches!(outcome, Some(FloorCompletion::Advanced { .. })));
            } else {
                assert_eq!(
                    outcome,
                    Some(FloorCompletion::ProjectComplete { finished: 10 })
                );
            }
        }
        assert!(econ.is_complete());
    }

    #[test]
    fn delivery_leveling_curve() {
        assert!((delivery_max_stamina(0) - 5.0).abs() < f32::EPSILON);
        assert!((delivery_max_stamina(3) - 11.0).abs() < f32::EPSILON);
        assert_eq!(delivery_level(0, 10), 1);
        assert_eq!(delivery_level(9, 10), 10);
        assert_eq!(delivery_level(10, 10), 11);
        // Level caps at total + 1
        assert_eq!(delivery_level(12, 10), 11);
    }

    #[test]
    fn remaining_need_tracks_stock() {
        let mut econ = Economy::new(10);
        assert_eq!(econ.remaining_need(), 8);
        econ.deposit(Material::Concrete, 5);
        assert_eq!(econ.remaining_need(), 3);
        econ.deposit(Material::Concrete, 10);
        assert_eq!(econ.remaining_need(), 0);
        // Off-material stock does not count
        econ.deposit(Material::Wood, 50);
        assert_eq!(econ.remaining_need(), 0);
    }
}
