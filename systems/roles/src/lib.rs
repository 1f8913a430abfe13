#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-ship behaviour state machines.
//!
//! Every live ship owns exactly one [`Role`]. Each turn the roster hands the
//! role the ship's snapshot, the shared [`Frame`] and the turn's
//! [`Reservations`]; the role answers with a single [`Directive`] and records
//! any cell it intends to enter so ships planned afterwards steer clear.

pub mod blocker;
pub mod destroyer;
pub mod efficiency;
pub mod gatherer;

use overmind_core::{Direction, Directive, ShipId, ShipSnapshot};
use overmind_world::{Frame, OccupancyView, Reservations};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

pub use blocker::Blocker;
pub use destroyer::Destroyer;
pub use gatherer::{Gatherer, Phase};

/// Behaviour attached to a single ship.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Role {
    /// Mines resources and ferries them home.
    Gatherer(Gatherer),
    /// Travels to a fixed cell and parks there.
    Blocker(Blocker),
    /// Rams a specific enemy ship.
    Destroyer(Destroyer),
}

/// Discriminant of a [`Role`] without its state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleKind {
    /// See [`Role::Gatherer`].
    Gatherer,
    /// See [`Role::Blocker`].
    Blocker,
    /// See [`Role::Destroyer`].
    Destroyer,
}

impl Role {
    /// Ship the role belongs to.
    #[must_use]
    pub fn ship(&self) -> ShipId {
        match self {
            Self::Gatherer(role) => role.ship(),
            Self::Blocker(role) => role.ship(),
            Self::Destroyer(role) => role.ship(),
        }
    }

    /// Which behaviour the role carries.
    #[must_use]
    pub fn kind(&self) -> RoleKind {
        match self {
            Self::Gatherer(_) => RoleKind::Gatherer,
            Self::Blocker(_) => RoleKind::Blocker,
            Self::Destroyer(_) => RoleKind::Destroyer,
        }
    }

    /// Advances the role by one turn and returns the ship's directive.
    pub fn update<R>(
        &mut self,
        ship: &ShipSnapshot,
        frame: &Frame,
        reservations: &mut Reservations,
        rng: &mut R,
    ) -> Directive
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Gatherer(role) => role.update(ship, frame, reservations, rng),
            Self::Blocker(role) => role.update(ship, frame, reservations),
            Self::Destroyer(role) => role.update(ship, frame, reservations),
        }
    }
}

/// Steps onto a random free cardinal neighbour and reserves it.
///
/// Holds when every neighbour is occupied or already claimed.
pub(crate) fn random_open_move<R>(
    ship: &ShipSnapshot,
    frame: &Frame,
    reservations: &mut Reservations,
    rng: &mut R,
) -> Directive
where
    R: Rng + ?Sized,
{
    let dimensions = frame.dimensions();
    let view = OccupancyView::new(frame.map(), reservations);
    let open: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&direction| !view.is_occupied(ship.position.offset(direction)))
        .collect();

    let Some(&direction) = open.choose(rng) else {
        return Directive::Hold;
    };
    let target = dimensions.normalize(ship.position.offset(direction));
    reservations.reserve(target, ship.id);
    Directive::Move(direction)
}
