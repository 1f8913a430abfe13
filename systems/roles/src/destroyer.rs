//! Destroyer: pursue one enemy ship and ram it.

use log::{debug, info};
use overmind_core::{Directive, Path, ShipId, ShipSnapshot};
use overmind_system_pathfinding::{find_path, PathMode};
use overmind_world::{
    navigation::{naive_navigate, unsafe_moves},
    Frame, OccupancyView, Reservations,
};
use serde::{Deserialize, Serialize};

/// State carried by a destroyer between turns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destroyer {
    ship: ShipId,
    target: ShipId,
    path: Option<Path>,
    idle: bool,
}

impl Destroyer {
    /// Creates a destroyer hunting the provided ship.
    #[must_use]
    pub fn new(ship: ShipId, target: ShipId) -> Self {
        Self {
            ship,
            target,
            path: None,
            idle: false,
        }
    }

    /// Ship the destroyer controls.
    #[must_use]
    pub const fn ship(&self) -> ShipId {
        self.ship
    }

    /// Ship being hunted.
    #[must_use]
    pub const fn target(&self) -> ShipId {
        self.target
    }

    /// Cached unsafe route toward the hunted ship.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Reports whether the hunted ship has disappeared.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.idle
    }

    /// Advances the pursuit by one turn.
    pub fn update(
        &mut self,
        ship: &ShipSnapshot,
        frame: &Frame,
        reservations: &mut Reservations,
    ) -> Directive {
        let Some(prey) = frame.ship(self.target) else {
            if !self.idle {
                info!(
                    "destroyer {} going idle, target {} is gone",
                    self.ship.get(),
                    self.target.get()
                );
            }
            self.idle = true;
            self.path = None;
            return Directive::Hold;
        };

        let stale = self
            .path
            .as_ref()
            .map_or(true, |path| !path.contains(prey.position));
        if stale {
            let view = OccupancyView::new(frame.map(), reservations);
            self.path = find_path(view, ship.position, prey.position, PathMode::Unsafe);
            debug!(
                "destroyer {} chasing {} at {:?}: {:?}",
                self.ship.get(),
                self.target.get(),
                prey.position,
                self.path.as_ref().map(Path::len)
            );
        }

        let Some(path) = self.path.as_mut() else {
            return Directive::Hold;
        };
        path.consume_arrival(ship.position);
        let Some(next) = path.next() else {
            self.path = None;
            return Directive::Hold;
        };

        let dimensions = frame.dimensions();
        let step = if path.len() == 1 {
            let ram = unsafe_moves(dimensions, ship.position, next).first();
            if ram.is_some() {
                reservations.reserve(next, self.ship);
            }
            ram
        } else {
            naive_navigate(frame.map(), reservations, ship, next)
        };

        match step {
            Some(direction) => Directive::Move(direction),
            None => {
                self.path = None;
                Directive::Hold
            }
        }
    }
}
