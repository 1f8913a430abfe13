#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-turn grid state and the local turn resolver for Overmind.
//!
//! [`GameMap`] is the read-only grid snapshot handed to the decision systems
//! each turn, [`Reservations`] carries the provisional same-turn claims those
//! systems make while they plan, and [`Frame`] bundles everything a role needs
//! to act. [`World`] together with [`apply`] resolves issued directives under
//! the host movement, mining, deposit and collision rules so that fleets can be
//! exercised without the host engine.

pub mod navigation;

use std::collections::BTreeMap;

use log::debug;
use overmind_core::{
    Cell, Command, Dimensions, Directive, Event, PlayerId, Position, Rules, ShipId, ShipSnapshot,
};
use thiserror::Error;

/// Reasons a grid snapshot or world could not be constructed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// One of the grid dimensions is zero.
    #[error("grid dimensions {width}x{height} contain no cells")]
    Empty {
        /// Requested column count.
        width: u32,
        /// Requested row count.
        height: u32,
    },
    /// The supplied resource layout does not match the grid size.
    #[error("expected {expected} cells but {actual} were supplied")]
    CellCountMismatch {
        /// Cells implied by the dimensions.
        expected: usize,
        /// Cells actually supplied.
        actual: usize,
    },
    /// A shipyard was placed outside the canonical grid range.
    #[error("shipyard for player {player} at ({x}, {y}) lies outside the grid")]
    ShipyardOutOfBounds {
        /// Player owning the shipyard.
        player: u32,
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
    },
}

/// Dense periodic grid of cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameMap {
    dimensions: Dimensions,
    cells: Vec<Cell>,
}

impl GameMap {
    /// Builds a map from row-major resource quantities.
    pub fn from_halite(dimensions: Dimensions, halite: Vec<u32>) -> Result<Self, GridError> {
        if dimensions.width() == 0 || dimensions.height() == 0 {
            return Err(GridError::Empty {
                width: dimensions.width(),
                height: dimensions.height(),
            });
        }

        let expected = dimensions.cell_count();
        if halite.len() != expected {
            return Err(GridError::CellCountMismatch {
                expected,
                actual: halite.len(),
            });
        }

        let cells = halite
            .into_iter()
            .map(|halite| Cell {
                halite,
                ..Cell::default()
            })
            .collect();
        Ok(Self { dimensions, cells })
    }

    /// Builds a map in which every cell holds the same resource quantity.
    pub fn uniform(dimensions: Dimensions, halite: u32) -> Result<Self, GridError> {
        Self::from_halite(dimensions, vec![halite; dimensions.cell_count()])
    }

    /// Size of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Cell at the provided position, wrapping out-of-range coordinates.
    #[must_use]
    pub fn cell(&self, position: Position) -> &Cell {
        &self.cells[self.dimensions.index(position)]
    }

    /// Resource quantity stored at the provided position.
    #[must_use]
    pub fn halite(&self, position: Position) -> u32 {
        self.cell(position).halite
    }

    /// Reports whether a ship stands on the provided position.
    #[must_use]
    pub fn is_occupied(&self, position: Position) -> bool {
        self.cell(position).is_occupied()
    }

    /// Sum of every cell's resource quantity.
    #[must_use]
    pub fn total_halite(&self) -> u64 {
        self.cells.iter().map(|cell| u64::from(cell.halite)).sum()
    }

    /// Overwrites the resource quantity stored at the provided position.
    pub fn set_halite(&mut self, position: Position, halite: u32) {
        self.cell_mut(position).halite = halite;
    }

    /// Records a ship standing on the provided position.
    pub fn place_ship(&mut self, position: Position, ship: ShipId) {
        self.cell_mut(position).occupant = Some(ship);
    }

    /// Marks the provided position as a player's shipyard.
    pub fn set_shipyard(&mut self, position: Position, owner: PlayerId) {
        self.cell_mut(position).shipyard = Some(owner);
    }

    fn clear_ships(&mut self) {
        for cell in &mut self.cells {
            cell.occupant = None;
        }
    }

    fn cell_mut(&mut self, position: Position) -> &mut Cell {
        let index = self.dimensions.index(position);
        &mut self.cells[index]
    }
}

/// Cells claimed by ships earlier in the current planning pass.
///
/// A fresh ledger is created at the start of every turn. Positions must be
/// normalized before they are recorded or queried.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reservations {
    claims: BTreeMap<Position, ShipId>,
}

impl Reservations {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a cell for the provided ship, replacing any earlier claim.
    pub fn reserve(&mut self, position: Position, ship: ShipId) {
        let _ = self.claims.insert(position, ship);
    }

    /// Reports whether any ship has claimed the cell this turn.
    #[must_use]
    pub fn is_reserved(&self, position: Position) -> bool {
        self.claims.contains_key(&position)
    }

    /// Ship holding the claim on a cell, if any.
    #[must_use]
    pub fn holder(&self, position: Position) -> Option<ShipId> {
        self.claims.get(&position).copied()
    }

    /// Number of claimed cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Reports whether no cell has been claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Read-only combination of map occupancy and same-turn reservations.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    map: &'a GameMap,
    reservations: &'a Reservations,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new view over the provided map and reservation ledger.
    #[must_use]
    pub fn new(map: &'a GameMap, reservations: &'a Reservations) -> Self {
        Self { map, reservations }
    }

    /// Size of the underlying grid.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.map.dimensions()
    }

    /// Reports whether a ship stands on, or has claimed, the provided cell.
    #[must_use]
    pub fn is_occupied(&self, position: Position) -> bool {
        let normalized = self.map.dimensions().normalize(position);
        self.map.is_occupied(normalized) || self.reservations.is_reserved(normalized)
    }

    /// Resource quantity stored at the provided cell.
    #[must_use]
    pub fn halite(&self, position: Position) -> u32 {
        self.map.halite(position)
    }
}

/// Everything a role needs to know about the current turn.
#[derive(Clone, Debug)]
pub struct Frame {
    map: GameMap,
    ships: Vec<ShipSnapshot>,
    me: PlayerId,
    shipyard: Position,
    turn: u32,
    rules: Rules,
}

impl Frame {
    /// Captures a frame, stamping every ship's position onto the map copy.
    #[must_use]
    pub fn new(
        mut map: GameMap,
        mut ships: Vec<ShipSnapshot>,
        me: PlayerId,
        shipyard: Position,
        turn: u32,
        rules: Rules,
    ) -> Self {
        let dimensions = map.dimensions();
        ships.sort_by_key(|ship| ship.id);
        map.clear_ships();
        for ship in &mut ships {
            ship.position = dimensions.normalize(ship.position);
            map.place_ship(ship.position, ship.id);
        }

        Self {
            map,
            ships,
            me,
            shipyard: dimensions.normalize(shipyard),
            turn,
            rules,
        }
    }

    /// Grid snapshot for the turn.
    #[must_use]
    pub fn map(&self) -> &GameMap {
        &self.map
    }

    /// Size of the grid.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.map.dimensions()
    }

    /// Player the frame was captured for.
    #[must_use]
    pub const fn me(&self) -> PlayerId {
        self.me
    }

    /// Rally point where the player's ships deposit cargo.
    #[must_use]
    pub const fn shipyard(&self) -> Position {
        self.shipyard
    }

    /// Current turn number.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Game constants in effect.
    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Turns left before the game ends.
    #[must_use]
    pub fn turns_remaining(&self) -> u32 {
        self.rules.max_turns.saturating_sub(self.turn)
    }

    /// Every ship on the grid in ascending id order.
    #[must_use]
    pub fn ships(&self) -> &[ShipSnapshot] {
        &self.ships
    }

    /// Looks up any ship, friend or foe, by identifier.
    #[must_use]
    pub fn ship(&self, id: ShipId) -> Option<&ShipSnapshot> {
        self.ships
            .binary_search_by_key(&id, |ship| ship.id)
            .ok()
            .map(|index| &self.ships[index])
    }

    /// Looks up one of the player's own ships.
    #[must_use]
    pub fn my_ship(&self, id: ShipId) -> Option<&ShipSnapshot> {
        self.ship(id).filter(|ship| ship.owner == self.me)
    }

    /// The player's own ships in ascending id order.
    pub fn my_ships(&self) -> impl Iterator<Item = &ShipSnapshot> {
        let me = self.me;
        self.ships.iter().filter(move |ship| ship.owner == me)
    }

    /// Ships controlled by other players.
    pub fn enemy_ships(&self) -> impl Iterator<Item = &ShipSnapshot> {
        let me = self.me;
        self.ships.iter().filter(move |ship| ship.owner != me)
    }

    /// Shipyards of the other players, in ascending player order.
    #[must_use]
    pub fn enemy_shipyards(&self) -> Vec<Position> {
        let yards: BTreeMap<PlayerId, Position> = self
            .dimensions()
            .positions()
            .filter_map(|position| match self.map.cell(position).shipyard {
                Some(owner) if owner != self.me => Some((owner, position)),
                _ => None,
            })
            .collect();
        yards.into_values().collect()
    }
}

/// Authoritative state of a locally resolved game.
#[derive(Debug)]
pub struct World {
    map: GameMap,
    rules: Rules,
    shipyards: BTreeMap<PlayerId, Position>,
    ships: BTreeMap<ShipId, ShipSnapshot>,
    pending: BTreeMap<ShipId, Directive>,
    banked: BTreeMap<PlayerId, u64>,
    next_ship: u32,
    turn: u32,
}

impl World {
    /// Creates a world over the provided map with one shipyard per player.
    pub fn new(
        mut map: GameMap,
        shipyards: &[(PlayerId, Position)],
        rules: Rules,
    ) -> Result<Self, GridError> {
        let dimensions = map.dimensions();
        let mut registry = BTreeMap::new();
        let mut banked = BTreeMap::new();

        for &(player, position) in shipyards {
            if !dimensions.contains(position) {
                return Err(GridError::ShipyardOutOfBounds {
                    player: player.get(),
                    x: position.x(),
                    y: position.y(),
                });
            }
            map.set_shipyard(position, player);
            let _ = registry.insert(player, position);
            let _ = banked.insert(player, 0);
        }

        Ok(Self {
            map,
            rules,
            shipyards: registry,
            ships: BTreeMap::new(),
            pending: BTreeMap::new(),
            banked,
            next_ship: 0,
            turn: 1,
        })
    }

    fn spawn(&mut self, owner: PlayerId, out_events: &mut Vec<Event>) {
        let Some(&position) = self.shipyards.get(&owner) else {
            return;
        };
        if self.map.is_occupied(position) {
            return;
        }

        let id = ShipId::new(self.next_ship);
        self.next_ship += 1;
        let _ = self.ships.insert(
            id,
            ShipSnapshot {
                id,
                owner,
                position,
                halite: 0,
                capacity: self.rules.max_halite,
            },
        );
        self.map.place_ship(position, id);
        out_events.push(Event::ShipSpawned {
            ship: id,
            owner,
            position,
        });
    }

    fn resolve_turn(&mut self, out_events: &mut Vec<Event>) {
        let dimensions = self.map.dimensions();
        let mut pending = std::mem::take(&mut self.pending);
        let mut arrivals: BTreeMap<Position, Vec<ShipId>> = BTreeMap::new();

        for ship in self.ships.values_mut() {
            let from = ship.position;
            let cell_halite = self.map.halite(from);
            let directive = pending.remove(&ship.id).unwrap_or(Directive::Hold);

            match directive {
                Directive::Move(direction) => {
                    let cost = self.rules.move_cost(cell_halite);
                    if ship.halite >= cost {
                        ship.halite -= cost;
                        ship.position = dimensions.normalize(from.offset(direction));
                        out_events.push(Event::ShipMoved {
                            ship: ship.id,
                            from,
                            to: ship.position,
                        });
                    }
                }
                Directive::Hold => {
                    let amount = self.rules.extraction(cell_halite).min(ship.cargo_room());
                    if amount > 0 {
                        ship.halite += amount;
                        self.map.set_halite(from, cell_halite - amount);
                        out_events.push(Event::HaliteMined {
                            ship: ship.id,
                            amount,
                        });
                    }
                }
            }

            arrivals.entry(ship.position).or_default().push(ship.id);
        }

        self.map.clear_ships();
        for (position, ids) in arrivals {
            if ids.len() > 1 {
                let mut dropped = 0u32;
                for id in &ids {
                    if let Some(ship) = self.ships.remove(id) {
                        dropped = dropped.saturating_add(ship.halite);
                    }
                }
                match self.map.cell(position).shipyard {
                    Some(owner) => {
                        *self.banked.entry(owner).or_insert(0) += u64::from(dropped);
                    }
                    None => {
                        let halite = self.map.halite(position).saturating_add(dropped);
                        self.map.set_halite(position, halite);
                    }
                }
                debug!("{} ships collided at {:?}", ids.len(), position);
                out_events.push(Event::ShipsCollided {
                    ships: ids,
                    position,
                });
                continue;
            }

            let Some(ship) = ids.first().and_then(|id| self.ships.get_mut(id)) else {
                continue;
            };
            self.map.place_ship(position, ship.id);

            if self.shipyards.get(&ship.owner) == Some(&position) && ship.halite > 0 {
                let amount = ship.halite;
                ship.halite = 0;
                *self.banked.entry(ship.owner).or_insert(0) += u64::from(amount);
                out_events.push(Event::HaliteDeposited {
                    ship: ship.id,
                    owner: ship.owner,
                    amount,
                });
            }
        }

        self.turn = self.turn.saturating_add(1);
        out_events.push(Event::TurnAdvanced { turn: self.turn });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Issue(order) => {
            if world.ships.contains_key(&order.ship) {
                let _ = world.pending.insert(order.ship, order.directive);
            }
        }
        Command::SpawnShip { owner } => world.spawn(owner, out_events),
        Command::EndTurn => world.resolve_turn(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Frame, GameMap, World};
    use overmind_core::{PlayerId, Rules, ShipSnapshot};

    /// Captures the turn snapshot as seen by the provided player.
    #[must_use]
    pub fn frame(world: &World, player: PlayerId) -> Option<Frame> {
        let shipyard = *world.shipyards.get(&player)?;
        Some(Frame::new(
            world.map.clone(),
            world.ships.values().copied().collect(),
            player,
            shipyard,
            world.turn,
            world.rules,
        ))
    }

    /// Provides read-only access to the grid.
    #[must_use]
    pub fn map(world: &World) -> &GameMap {
        &world.map
    }

    /// Game constants the world resolves turns with.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Current turn number.
    #[must_use]
    pub fn turn(world: &World) -> u32 {
        world.turn
    }

    /// Reports whether the final turn has been resolved.
    #[must_use]
    pub fn is_finished(world: &World) -> bool {
        world.turn > world.rules.max_turns
    }

    /// Every ship on the grid in ascending id order.
    #[must_use]
    pub fn ships(world: &World) -> Vec<ShipSnapshot> {
        world.ships.values().copied().collect()
    }

    /// Number of ships the player controls.
    #[must_use]
    pub fn ship_count(world: &World, player: PlayerId) -> usize {
        world
            .ships
            .values()
            .filter(|ship| ship.owner == player)
            .count()
    }

    /// Cargo the player has deposited so far.
    #[must_use]
    pub fn banked(world: &World, player: PlayerId) -> u64 {
        world.banked.get(&player).copied().unwrap_or(0)
    }
}
