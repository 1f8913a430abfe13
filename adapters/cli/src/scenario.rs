//! Scenario files describing a locally simulated match.

use std::{
    fs,
    path::{Path, PathBuf},
};

use overmind_core::{Position, Rules};
use overmind_system_fleet::FleetConfig;
use overmind_world::GridError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest number of fleets a scenario may field.
pub const MAX_FLEETS: usize = 4;

/// Errors raised while loading or running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("failed to read scenario file {}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The scenario file is not valid TOML for a scenario.
    #[error("failed to parse scenario")]
    Parse(#[from] toml::de::Error),
    /// The generated grid or its shipyards were rejected.
    #[error("invalid grid")]
    Grid(#[from] GridError),
    /// The number of fleets lies outside the supported range.
    #[error("scenario needs between 1 and 4 fleets, got {0}")]
    FleetCount(usize),
    /// Fleets must be allowed at least one ship.
    #[error("fleet size must be at least one")]
    EmptyFleet,
    /// The halite range for generated cells is inverted.
    #[error("halite range {min}..={max} is empty")]
    HaliteRange {
        /// Lower bound requested.
        min: u32,
        /// Upper bound requested.
        max: u32,
    },
}

/// Parameters of the seeded resource layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Smallest background quantity per cell.
    pub min_halite: u32,
    /// Largest background quantity per cell.
    pub max_halite: u32,
    /// Number of rich deposits scattered over the grid.
    pub hotspots: u32,
    /// Manhattan reach of each deposit.
    pub hotspot_radius: u32,
    /// Quantity added at the centre of a deposit.
    pub hotspot_peak: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            min_halite: 0,
            max_halite: 150,
            hotspots: 10,
            hotspot_radius: 4,
            hotspot_peak: 900,
        }
    }
}

/// A complete match setup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Grid columns.
    pub width: u32,
    /// Grid rows.
    pub height: u32,
    /// Seed for terrain generation and fleet decisions.
    pub seed: u64,
    /// Ships each fleet keeps on the grid.
    pub fleet_size: usize,
    /// Host constants.
    pub rules: Rules,
    /// Resource layout.
    pub terrain: TerrainConfig,
    /// One entry per competing fleet.
    pub fleets: Vec<FleetConfig>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            seed: 0,
            fleet_size: 12,
            rules: Rules::default(),
            terrain: TerrainConfig::default(),
            fleets: vec![FleetConfig::default(), FleetConfig::default()],
        }
    }
}

impl ScenarioConfig {
    /// Parses and validates a scenario from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ScenarioError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a scenario file.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks the values serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.fleets.is_empty() || self.fleets.len() > MAX_FLEETS {
            return Err(ScenarioError::FleetCount(self.fleets.len()));
        }
        if self.fleet_size == 0 {
            return Err(ScenarioError::EmptyFleet);
        }
        if self.terrain.min_halite > self.terrain.max_halite {
            return Err(ScenarioError::HaliteRange {
                min: self.terrain.min_halite,
                max: self.terrain.max_halite,
            });
        }
        Ok(())
    }

    /// Shipyard of every fleet, spread evenly along the middle row.
    #[must_use]
    pub fn shipyards(&self) -> Vec<Position> {
        let count = u64::try_from(self.fleets.len()).unwrap_or(1).max(1);
        let width = u64::from(self.width);
        let row = i32::try_from(self.height / 2).unwrap_or(0);

        (0..count)
            .map(|slot| {
                let column = width * (2 * slot + 1) / (2 * count);
                Position::new(i32::try_from(column).unwrap_or(0), row)
            })
            .collect()
    }
}
