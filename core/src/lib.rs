#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Overmind fleet controller.
//!
//! This crate defines the value types that connect the per-turn grid snapshot,
//! the pure decision systems, and the local turn resolver. Systems read
//! [`ShipSnapshot`] values and grid cells, plan over [`Position`] values on a
//! periodic grid described by [`Dimensions`], and answer with exactly one
//! [`Directive`] per ship wrapped in an [`Order`]. The resolver consumes
//! [`Command`] values and reports what happened through [`Event`] values.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Location of a single grid cell expressed as signed column and row offsets.
///
/// Positions are not required to lie inside the grid; [`Dimensions::normalize`]
/// folds any pair back into the canonical range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new position from raw coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column component of the position.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row component of the position.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Position one step away in the provided direction, without wrapping.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Cardinal movement directions available to ships.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every cardinal direction in neighbor-scan order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Column and row delta applied by a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn invert(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }
}

/// Size of the periodic grid and the toroidal metrics defined over it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Creates a new grid size descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let width = usize::try_from(self.width).unwrap_or(0);
        let height = usize::try_from(self.height).unwrap_or(0);
        width.saturating_mul(height)
    }

    /// Folds an arbitrary position into `[0, width) x [0, height)`.
    #[must_use]
    pub fn normalize(&self, position: Position) -> Position {
        Position::new(
            wrap(position.x(), self.width),
            wrap(position.y(), self.height),
        )
    }

    /// Reports whether the position already lies inside the canonical range.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.normalize(position) == position
    }

    /// Dense row-major index of the normalized position.
    #[must_use]
    pub fn index(&self, position: Position) -> usize {
        let normalized = self.normalize(position);
        let width = usize::try_from(self.width).unwrap_or(0);
        let column = usize::try_from(normalized.x()).unwrap_or(0);
        let row = usize::try_from(normalized.y()).unwrap_or(0);
        row * width + column
    }

    /// The four normalized cardinal neighbors, ordered North, South, East, West.
    #[must_use]
    pub fn cardinals(&self, position: Position) -> [Position; 4] {
        Direction::ALL.map(|direction| self.normalize(position.offset(direction)))
    }

    /// Iterates every cell of the grid, column by column.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = i32::try_from(self.width).unwrap_or(i32::MAX);
        let height = i32::try_from(self.height).unwrap_or(i32::MAX);
        (0..width).flat_map(move |x| (0..height).map(move |y| Position::new(x, y)))
    }

    /// Per-axis separation measured the short way around the torus.
    #[must_use]
    pub fn axis_offsets(&self, a: Position, b: Position) -> (u32, u32) {
        let a = self.normalize(a);
        let b = self.normalize(b);
        let dx = a.x().abs_diff(b.x());
        let dy = a.y().abs_diff(b.y());
        (dx.min(self.width - dx), dy.min(self.height - dy))
    }

    /// Euclidean distance over the wrapped per-axis offsets.
    #[must_use]
    pub fn toroidal_distance(&self, a: Position, b: Position) -> f64 {
        let (dx, dy) = self.axis_offsets(a, b);
        let dx = f64::from(dx);
        let dy = f64::from(dy);
        (dx * dx + dy * dy).sqrt()
    }

    /// Step count between two cells when only cardinal moves are allowed.
    #[must_use]
    pub fn manhattan_distance(&self, a: Position, b: Position) -> u32 {
        let (dx, dy) = self.axis_offsets(a, b);
        dx + dy
    }

    /// Largest toroidal distance any two cells can have.
    #[must_use]
    pub fn half_diagonal(&self) -> f64 {
        let width = f64::from(self.width);
        let height = f64::from(self.height);
        (width * width / 4.0 + height * height / 4.0).sqrt()
    }
}

fn wrap(value: i32, extent: u32) -> i32 {
    let Ok(extent) = i32::try_from(extent) else {
        return value;
    };
    value.checked_rem_euclid(extent).unwrap_or(0)
}

/// Unique identifier assigned to a ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipId(u32);

impl ShipId {
    /// Creates a new ship identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable representation of a single ship's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipSnapshot {
    /// Unique identifier assigned to the ship.
    pub id: ShipId,
    /// Player that controls the ship.
    pub owner: PlayerId,
    /// Grid cell currently occupied by the ship.
    pub position: Position,
    /// Cargo carried by the ship.
    pub halite: u32,
    /// Maximum cargo the ship can hold.
    pub capacity: u32,
}

impl ShipSnapshot {
    /// Reports whether the cargo hold has no room left.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.halite >= self.capacity
    }

    /// Remaining cargo capacity.
    #[must_use]
    pub const fn cargo_room(&self) -> u32 {
        self.capacity.saturating_sub(self.halite)
    }
}

/// Contents of a single grid cell captured for the current turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Resource quantity available for mining.
    pub halite: u32,
    /// Ship standing on the cell, if any.
    pub occupant: Option<ShipId>,
    /// Player whose shipyard occupies the cell, if any.
    pub shipyard: Option<PlayerId>,
}

impl Cell {
    /// Reports whether a ship currently stands on the cell.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Planned route from a ship's current cell (exclusive) to its goal (inclusive).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    steps: VecDeque<Position>,
}

impl Path {
    /// Creates a path from an ordered list of steps.
    #[must_use]
    pub fn from_steps(steps: Vec<Position>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    /// The next cell the ship intends to enter.
    #[must_use]
    pub fn next(&self) -> Option<Position> {
        self.steps.front().copied()
    }

    /// Final cell of the route.
    #[must_use]
    pub fn goal(&self) -> Option<Position> {
        self.steps.back().copied()
    }

    /// Drops the head of the route once the ship stands on it.
    pub fn consume_arrival(&mut self, position: Position) {
        if self.next() == Some(position) {
            let _ = self.steps.pop_front();
        }
    }

    /// Reports whether the route passes through the provided cell.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.steps.contains(&position)
    }

    /// Number of steps left on the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Reports whether every step has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterator over the remaining steps in travel order.
    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.steps.iter()
    }
}

/// What a ship should do this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Directive {
    /// Step one cell in the provided direction.
    Move(Direction),
    /// Stay in place, mining the current cell.
    Hold,
}

impl Directive {
    /// Wraps an optional navigation result, holding when no step exists.
    #[must_use]
    pub fn from_step(step: Option<Direction>) -> Self {
        step.map_or(Self::Hold, Self::Move)
    }
}

/// Directive addressed to a specific ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    /// Ship receiving the directive.
    pub ship: ShipId,
    /// Directive to execute.
    pub directive: Directive,
}

/// Commands accepted by the local turn resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Queues a directive for the ship named in the order.
    Issue(Order),
    /// Requests a new ship on the owner's shipyard.
    SpawnShip {
        /// Player receiving the ship.
        owner: PlayerId,
    },
    /// Resolves every queued directive and advances the turn counter.
    EndTurn,
}

/// Events reported by the local turn resolver.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// The turn counter advanced.
    TurnAdvanced {
        /// Turn that is now current.
        turn: u32,
    },
    /// A new ship entered the grid.
    ShipSpawned {
        /// Identifier assigned to the ship.
        ship: ShipId,
        /// Player controlling the ship.
        owner: PlayerId,
        /// Cell the ship occupies.
        position: Position,
    },
    /// A ship moved between two cells.
    ShipMoved {
        /// Ship that moved.
        ship: ShipId,
        /// Cell the ship left.
        from: Position,
        /// Cell the ship entered.
        to: Position,
    },
    /// A ship mined the cell it stayed on.
    HaliteMined {
        /// Ship that mined.
        ship: ShipId,
        /// Cargo gained.
        amount: u32,
    },
    /// A ship unloaded its cargo at its owner's shipyard.
    HaliteDeposited {
        /// Ship that unloaded.
        ship: ShipId,
        /// Player credited with the cargo.
        owner: PlayerId,
        /// Cargo delivered.
        amount: u32,
    },
    /// Ships finishing on the same cell were destroyed.
    ShipsCollided {
        /// Ships lost in the collision, in ascending id order.
        ships: Vec<ShipId>,
        /// Cell where the collision happened.
        position: Position,
    },
}

/// Game constants shared by the host engine and the decision systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Largest cargo a ship can hold; also the reference resource scale.
    pub max_halite: u32,
    /// Moving costs `cell / move_cost_ratio` of the departed cell's resource.
    pub move_cost_ratio: u32,
    /// Staying mines `cell / extract_ratio` of the current cell's resource.
    pub extract_ratio: u32,
    /// Number of turns in a game.
    pub max_turns: u32,
}

impl Rules {
    /// Cargo paid to leave a cell holding `cell_halite`.
    #[must_use]
    pub fn move_cost(&self, cell_halite: u32) -> u32 {
        cell_halite.checked_div(self.move_cost_ratio).unwrap_or(0)
    }

    /// Resource a ship extracts from a cell holding `cell_halite`.
    #[must_use]
    pub fn extraction(&self, cell_halite: u32) -> u32 {
        match self.extract_ratio {
            0 => 0,
            ratio => cell_halite.div_ceil(ratio),
        }
    }

    /// Threshold below which a cell is not worth waiting on.
    #[must_use]
    pub fn low_value_floor(&self) -> u32 {
        self.max_halite / 10
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_halite: 1_000,
            move_cost_ratio: 10,
            extract_ratio: 4,
            max_turns: 400,
        }
    }
}
