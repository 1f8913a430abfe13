//! Single-step navigation helpers mirroring the host SDK.

use overmind_core::{Dimensions, Direction, Position, ShipSnapshot};

use crate::{GameMap, OccupancyView, Reservations};

/// Directions that bring a ship closer to a destination, ignoring occupancy.
///
/// At most one horizontal and one vertical direction are produced, horizontal
/// first. An axis whose direct offset spans at least half the grid is
/// travelled the other way around the torus.
#[must_use]
pub fn unsafe_moves(dimensions: Dimensions, source: Position, destination: Position) -> MoveList {
    let source = dimensions.normalize(source);
    let destination = dimensions.normalize(destination);
    let mut moves = MoveList::default();

    let dx = source.x().abs_diff(destination.x());
    if dx != 0 {
        let toward = if destination.x() > source.x() {
            Direction::East
        } else {
            Direction::West
        };
        moves.push(if 2 * dx < dimensions.width() {
            toward
        } else {
            toward.invert()
        });
    }

    let dy = source.y().abs_diff(destination.y());
    if dy != 0 {
        let toward = if destination.y() > source.y() {
            Direction::South
        } else {
            Direction::North
        };
        moves.push(if 2 * dy < dimensions.height() {
            toward
        } else {
            toward.invert()
        });
    }

    moves
}

/// Picks the first step toward `destination` that enters a free cell.
///
/// The chosen cell is reserved for the ship so that ships planned later in the
/// same pass treat it as occupied. Returns `None` when every candidate is
/// blocked or the ship already stands on the destination.
pub fn naive_navigate(
    map: &GameMap,
    reservations: &mut Reservations,
    ship: &ShipSnapshot,
    destination: Position,
) -> Option<Direction> {
    let dimensions = map.dimensions();
    for direction in unsafe_moves(dimensions, ship.position, destination).iter() {
        let target = dimensions.normalize(ship.position.offset(direction));
        if OccupancyView::new(map, reservations).is_occupied(target) {
            continue;
        }

        reservations.reserve(target, ship.id);
        return Some(direction);
    }

    None
}

/// Up to two candidate directions produced by [`unsafe_moves`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveList {
    buffer: [Option<Direction>; 2],
    len: usize,
}

impl MoveList {
    fn push(&mut self, direction: Direction) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(direction);
            self.len += 1;
        }
    }

    /// Preferred direction, if the destination differs from the source.
    #[must_use]
    pub fn first(&self) -> Option<Direction> {
        self.buffer[0]
    }

    /// Number of candidate directions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Reports whether source and destination coincide.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterator over the candidate directions in preference order.
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.buffer.iter().take(self.len).flatten().copied()
    }
}
