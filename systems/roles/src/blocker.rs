//! Blocker: travel to an assigned cell and park on it.

use log::debug;
use overmind_core::{Directive, Path, Position, ShipId, ShipSnapshot};
use overmind_system_pathfinding::{find_path, PathMode};
use overmind_world::{navigation::naive_navigate, Frame, OccupancyView, Reservations};
use serde::{Deserialize, Serialize};

/// State carried by a blocking ship between turns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocker {
    ship: ShipId,
    target: Option<Position>,
    path: Option<Path>,
}

impl Blocker {
    /// Creates a blocker that waits for a target.
    #[must_use]
    pub fn new(ship: ShipId) -> Self {
        Self {
            ship,
            target: None,
            path: None,
        }
    }

    /// Ship the blocker controls.
    #[must_use]
    pub const fn ship(&self) -> ShipId {
        self.ship
    }

    /// Cell the blocker is heading for.
    #[must_use]
    pub const fn target(&self) -> Option<Position> {
        self.target
    }

    /// Cached route toward the target.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Fixes the cell the blocker parks on.
    pub fn assign_target(&mut self, target: Position) {
        self.target = Some(target);
        self.path = None;
    }

    /// Advances the blocker by one turn.
    ///
    /// A turn spent planning is a turn spent holding; the ship starts moving
    /// on the next update.
    pub fn update(
        &mut self,
        ship: &ShipSnapshot,
        frame: &Frame,
        reservations: &mut Reservations,
    ) -> Directive {
        let Some(target) = self.target else {
            return Directive::Hold;
        };

        let Some(path) = self.path.as_mut() else {
            let view = OccupancyView::new(frame.map(), reservations);
            self.path = find_path(view, ship.position, target, PathMode::Safe);
            debug!(
                "blocker {} planned {:?} -> {:?}: {:?}",
                self.ship.get(),
                ship.position,
                target,
                self.path.as_ref().map(Path::len)
            );
            return Directive::Hold;
        };

        path.consume_arrival(ship.position);
        let Some(next) = path.next() else {
            return Directive::Hold;
        };

        match naive_navigate(frame.map(), reservations, ship, next) {
            Some(direction) => Directive::Move(direction),
            None => {
                self.path = None;
                Directive::Hold
            }
        }
    }
}
