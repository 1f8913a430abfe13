//! Windowed resource density and distance discounting.

use overmind_core::{Dimensions, Position};
use overmind_world::GameMap;

/// Sum of resources in the `(2 * radius + 1)^2` block centred on `position`.
///
/// Every lookup wraps around the torus, so windows wider than the grid count
/// some cells more than once.
#[must_use]
pub fn density(map: &GameMap, position: Position, radius: u32) -> u64 {
    let radius = i32::try_from(radius).unwrap_or(i32::MAX);
    let mut total = 0u64;

    for dx in -radius..=radius {
        for dy in -radius..=radius {
            let sample = Position::new(position.x() + dx, position.y() + dy);
            total += u64::from(map.halite(sample));
        }
    }

    total
}

/// Divisor in `[1, scale]` that grows linearly with `distance`.
///
/// `max_distance` is normally the grid's half-diagonal. A non-positive
/// `max_distance` disables the discount.
#[must_use]
pub fn distance_discount(distance: f64, max_distance: f64, scale: f64) -> f64 {
    if max_distance <= 0.0 {
        return 1.0;
    }

    1.0 + (distance / max_distance) * (scale - 1.0)
}

/// Window density of every cell, computed once per allocation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DensityMap {
    dimensions: Dimensions,
    values: Vec<u64>,
}

impl DensityMap {
    /// Scores every cell of the map with the provided window radius.
    #[must_use]
    pub fn compute(map: &GameMap, radius: u32) -> Self {
        let dimensions = map.dimensions();
        let mut values = vec![0; dimensions.cell_count()];
        for position in dimensions.positions() {
            values[dimensions.index(position)] = density(map, position, radius);
        }

        Self { dimensions, values }
    }

    /// Density recorded for the provided cell.
    #[must_use]
    pub fn value(&self, position: Position) -> u64 {
        self.values
            .get(self.dimensions.index(position))
            .copied()
            .unwrap_or(0)
    }
}
