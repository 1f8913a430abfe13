#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Resource-density scoring and greedy target allocation.
//!
//! Cells are ranked by the resources in a square window around them, scaled
//! down linearly with their distance from the unit (or rally point) asking.
//! Allocation is strictly greedy: each unit takes the best cell still in the
//! pool and removes it, so no two units ever share a target.

pub mod density;

use std::cmp::Ordering;

use log::debug;
use overmind_core::{Position, ShipId};
use overmind_world::GameMap;
use serde::{Deserialize, Serialize};

pub use density::{density, distance_discount, DensityMap};

/// Window sizes and distance weighting used when ranking cells.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    /// Window radius used by [`get_targets`].
    pub pool_radius: u32,
    /// Window radius used by [`assign_targets`].
    pub assign_radius: u32,
    /// Divisor applied to a cell at the largest possible distance.
    pub distance_scale: f64,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            pool_radius: 1,
            assign_radius: 2,
            distance_scale: 4.0,
        }
    }
}

/// Cell handed to a unit by [`assign_targets`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetAssignment {
    /// Unit receiving the target.
    pub ship: ShipId,
    /// Cell the unit should travel to.
    pub target: Position,
}

/// Ranks every cell as seen from `home` and returns the best `count` of them.
///
/// The result holds distinct cells in descending score order. Equal scores
/// keep the x-major, y-minor scan order of the grid.
#[must_use]
pub fn get_targets(
    map: &GameMap,
    home: Position,
    count: usize,
    config: &TargetingConfig,
) -> Vec<Position> {
    let dimensions = map.dimensions();
    let densities = DensityMap::compute(map, config.pool_radius);
    let max_distance = dimensions.half_diagonal();

    let mut scored: Vec<(Position, f64)> = dimensions
        .positions()
        .map(|cell| {
            let distance = f64::from(dimensions.manhattan_distance(home, cell));
            let divisor = distance_discount(distance, max_distance, config.distance_scale);
            (cell, densities.value(cell) as f64 / divisor)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(count);

    scored.into_iter().map(|(cell, _)| cell).collect()
}

/// Hands each unit, in the order given, the best cell left in the pool.
///
/// `locate` resolves a unit to its current position and returns `None` for
/// units that are no longer alive; those are skipped without consuming a
/// cell. Allocation stops once the pool is exhausted.
pub fn assign_targets<F>(
    map: &GameMap,
    units: &[ShipId],
    locate: F,
    config: &TargetingConfig,
) -> Vec<TargetAssignment>
where
    F: Fn(ShipId) -> Option<Position>,
{
    let dimensions = map.dimensions();
    let densities = DensityMap::compute(map, config.assign_radius);
    let max_distance = dimensions.half_diagonal();

    let mut pool: Vec<(Position, u64)> = dimensions
        .positions()
        .map(|cell| (cell, densities.value(cell)))
        .collect();
    let mut assignments = Vec::new();

    for &ship in units {
        if pool.is_empty() {
            break;
        }
        let Some(origin) = locate(ship) else {
            continue;
        };

        let mut best: Option<(usize, f64)> = None;
        for (index, &(cell, value)) in pool.iter().enumerate() {
            let distance = f64::from(dimensions.manhattan_distance(origin, cell));
            let score =
                value as f64 / distance_discount(distance, max_distance, config.distance_scale);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((index, score));
            }
        }

        let Some((index, score)) = best else {
            break;
        };
        let (target, _) = pool.remove(index);
        debug!(
            "ship {} assigned {:?} (score {:.1})",
            ship.get(),
            target,
            score
        );
        assignments.push(TargetAssignment { ship, target });
    }

    assignments
}
