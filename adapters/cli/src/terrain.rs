//! Seeded resource layouts for local matches.

use overmind_core::{Dimensions, Position};
use overmind_world::{GameMap, GridError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::scenario::TerrainConfig;

/// Generates a map with noisy background resources and a few rich deposits.
///
/// Deposits fall off linearly with Manhattan distance from their centre and
/// every cell is capped at `cap`. The same seed always yields the same map.
pub fn generate(
    dimensions: Dimensions,
    terrain: &TerrainConfig,
    cap: u32,
    seed: u64,
) -> Result<GameMap, GridError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let low = terrain.min_halite.min(terrain.max_halite);
    let high = terrain.min_halite.max(terrain.max_halite);
    let halite = (0..dimensions.cell_count())
        .map(|_| rng.gen_range(low..=high))
        .collect();
    let mut map = GameMap::from_halite(dimensions, halite)?;

    let width = i32::try_from(dimensions.width()).unwrap_or(i32::MAX);
    let height = i32::try_from(dimensions.height()).unwrap_or(i32::MAX);
    let radius = i32::try_from(terrain.hotspot_radius).unwrap_or(0);
    let reach = u64::from(terrain.hotspot_radius) + 1;

    for _ in 0..terrain.hotspots {
        let centre = Position::new(rng.gen_range(0..width), rng.gen_range(0..height));
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                let cell = dimensions.normalize(Position::new(centre.x() + dx, centre.y() + dy));
                let distance = u64::from(dx.unsigned_abs() + dy.unsigned_abs());
                if distance >= reach {
                    continue;
                }
                let bonus = u64::from(terrain.hotspot_peak) * (reach - distance) / reach;
                let total = (u64::from(map.halite(cell)) + bonus).min(u64::from(cap));
                map.set_halite(cell, u32::try_from(total).unwrap_or(cap));
            }
        }
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_map() {
        let dims = Dimensions::new(20, 14);
        let terrain = TerrainConfig::default();
        let a = generate(dims, &terrain, 1_000, 42).expect("map");
        let b = generate(dims, &terrain, 1_000, 42).expect("map");
        let c = generate(dims, &terrain, 1_000, 43).expect("map");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn cells_respect_the_cap() {
        let dims = Dimensions::new(12, 12);
        let terrain = TerrainConfig {
            hotspots: 30,
            hotspot_peak: 5_000,
            ..TerrainConfig::default()
        };
        let map = generate(dims, &terrain, 1_000, 7).expect("map");
        assert!(dims.positions().all(|cell| map.halite(cell) <= 1_000));
        assert!(dims.positions().any(|cell| map.halite(cell) == 1_000));
    }

    #[test]
    fn flat_terrain_without_deposits() {
        let terrain = TerrainConfig {
            min_halite: 30,
            max_halite: 30,
            hotspots: 0,
            ..TerrainConfig::default()
        };
        let map = generate(Dimensions::new(4, 4), &terrain, 1_000, 1).expect("map");
        assert_eq!(map.total_halite(), 16 * 30);
    }

    #[test]
    fn empty_grid_is_rejected() {
        let result = generate(Dimensions::new(0, 4), &TerrainConfig::default(), 1_000, 1);
        assert!(matches!(result, Err(GridError::Empty { .. })));
    }
}
