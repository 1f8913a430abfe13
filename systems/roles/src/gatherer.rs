//! Resource gatherer: seek a rich cell, mine around it, carry cargo home.

use log::{debug, info};
use overmind_core::{Directive, Path, Position, ShipId, ShipSnapshot};
use overmind_system_pathfinding::{find_path, PathMode};
use overmind_world::{
    navigation::{naive_navigate, unsafe_moves},
    Frame, OccupancyView, Reservations,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    efficiency::{is_efficient_to_gather, is_efficient_to_seek},
    random_open_move,
};

/// Consecutive failed returns after which the ship shuffles randomly.
const RETURN_RETRY_LIMIT: u32 = 3;

/// Behavioural phase of a gatherer.
///
/// Persisted as a numeric tag; tags outside the known range decode to
/// [`Phase::Gather`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Phase {
    /// Mining around the current cell.
    Gather,
    /// Carrying cargo back to the shipyard.
    Return,
    /// Travelling toward an assigned target.
    #[default]
    Seek,
    /// End-of-game recall; never left once entered.
    Collapse,
}

impl From<u8> for Phase {
    fn from(tag: u8) -> Self {
        match tag {
            0 => Self::Gather,
            1 => Self::Return,
            2 => Self::Seek,
            3 => Self::Collapse,
            _ => Self::Gather,
        }
    }
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Gather => 0,
            Phase::Return => 1,
            Phase::Seek => 2,
            Phase::Collapse => 3,
        }
    }
}

/// State carried by a gathering ship between turns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gatherer {
    ship: ShipId,
    #[serde(default)]
    phase: Phase,
    target: Option<Position>,
    path: Option<Path>,
    idle_turns: u32,
    right_of_way: bool,
    delay: bool,
}

impl Gatherer {
    /// Creates a gatherer that starts out seeking without a target.
    #[must_use]
    pub fn new(ship: ShipId) -> Self {
        Self {
            ship,
            phase: Phase::Seek,
            target: None,
            path: None,
            idle_turns: 0,
            right_of_way: false,
            delay: false,
        }
    }

    /// Ship the gatherer controls.
    #[must_use]
    pub const fn ship(&self) -> ShipId {
        self.ship
    }

    /// Current behavioural phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Cell the gatherer is seeking, if any.
    #[must_use]
    pub const fn target(&self) -> Option<Position> {
        self.target
    }

    /// Cached route toward the target.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Hands the gatherer a new cell to seek and drops any stale route.
    pub fn assign_target(&mut self, target: Position) {
        self.target = Some(target);
        self.path = None;
    }

    /// Advances the state machine by one turn.
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
        if self.phase != Phase::Collapse && should_collapse(ship, frame) {
            info!(
                "ship {} collapsing home at turn {}",
                self.ship.get(),
                frame.turn()
            );
            self.phase = Phase::Collapse;
        }

        match self.phase {
            Phase::Gather => self.gather(ship, frame, reservations, rng),
            Phase::Return => self.return_home(ship, frame, reservations, rng),
            Phase::Seek => self.seek(ship, frame, reservations, rng),
            Phase::Collapse => self.collapse(ship, frame, reservations),
        }
    }

    fn seek<R>(
        &mut self,
        ship: &ShipSnapshot,
        frame: &Frame,
        reservations: &mut Reservations,
        rng: &mut R,
    ) -> Directive
    where
        R: Rng + ?Sized,
    {
        let Some(target) = self.target else {
            self.transition(Phase::Gather);
            return self.gather(ship, frame, reservations, rng);
        };
        let target = frame.dimensions().normalize(target);

        if ship.is_full() {
            self.transition(Phase::Return);
            return self.return_home(ship, frame, reservations, rng);
        }

        if ship.position == target {
            self.target = None;
            self.path = None;
            self.transition(Phase::Gather);
            return self.gather(ship, frame, reservations, rng);
        }

        if self.delay {
            self.delay = false;
            return Directive::Hold;
        }

        if !is_efficient_to_seek(frame.rules(), ship, frame.map().halite(ship.position)) {
            return Directive::Hold;
        }

        if self.right_of_way {
            return self.claim_right_of_way(ship, frame, reservations, rng);
        }

        if let Some(path) = self.path.as_mut() {
            path.consume_arrival(ship.position);
        }
        if self.path.as_ref().map_or(true, Path::is_empty) {
            let view = OccupancyView::new(frame.map(), reservations);
            self.path = find_path(view, ship.position, target, PathMode::Safe);
            debug!(
                "ship {} planned {:?} -> {:?}: {:?}",
                self.ship.get(),
                ship.position,
                target,
                self.path.as_ref().map(Path::len)
            );
        }

        self.seek_step(ship, frame, reservations, rng)
    }

    fn seek_step<R>(
        &mut self,
        ship: &ShipSnapshot,
        frame: &Frame,
        reservations: &mut Reservations,
        rng: &mut R,
    ) -> Directive
    where
        R: Rng + ?Sized,
    {
        let Some(next) = self.path.as_ref().and_then(Path::next) else {
            return random_open_move(ship, frame, reservations, rng);
        };

        if let Some(direction) = naive_navigate(frame.map(), reservations, ship, next) {
            return Directive::Move(direction);
        }

        self.path = None;
        self.right_of_way = true;
        Directive::Hold
    }

    /// Steps aside onto any free neighbour after a stall, then idles a turn.
    ///
    /// A boxed-in ship keeps its claim and tries again next turn.
    fn claim_right_of_way<R>(
        &mut self,
        ship: &ShipSnapshot,
        frame: &Frame,
        reservations: &mut Reservations,
        rng: &mut R,
    ) -> Directive
    where
        R: Rng + ?Sized,
    {
        let directive = random_open_move(ship, frame, reservations, rng);
        if directive != Directive::Hold {
            debug!("ship {} claiming right of way", self.ship.get());
            self.right_of_way = false;
            self.delay = true;
        }
        directive
    }

    fn gather<R>(
        &mut self,
        ship: &ShipSnapshot,
        frame: &Frame,
        reservations: &mut Reservations,
        rng: &mut R,
    ) -> Directive
    where
        R: Rng + ?Sized,
    {
        if ship.is_full() {
            self.transition(Phase::Return);
            return self.return_home(ship, frame, reservations, rng);
        }

        let view = OccupancyView::new(frame.map(), reservations);
        let mut richest: Option<(Position, u32)> = None;
        for neighbor in frame.dimensions().cardinals(ship.position) {
            if view.is_occupied(neighbor) {
                continue;
            }
            let halite = view.halite(neighbor);
            if halite > richest.map_or(0, |(_, best)| best) {
                richest = Some((neighbor, halite));
            }
        }

        let Some((next, halite)) = richest else {
            return Directive::Hold;
        };
        let current = frame.map().halite(ship.position);
        if !is_efficient_to_gather(frame.rules(), ship, current, halite) {
            return Directive::Hold;
        }

        Directive::from_step(naive_navigate(frame.map(), reservations, ship, next))
    }

    fn return_home<R>(
        &mut self,
        ship: &ShipSnapshot,
        frame: &Frame,
        reservations: &mut Reservations,
        rng: &mut R,
    ) -> Directive
    where
        R: Rng + ?Sized,
    {
        let home = frame.shipyard();
        if ship.position == home {
            self.transition(Phase::Seek);
            // Cargo is unloaded at the end of the turn; seeking now would
            // bounce straight back into this phase.
            if ship.is_full() {
                return Directive::Hold;
            }
            return self.seek(ship, frame, reservations, rng);
        }

        let floor = frame.rules().low_value_floor();
        if frame.map().halite(ship.position) >= floor && !ship.is_full() {
            return Directive::Hold;
        }

        if let Some(direction) = naive_navigate(frame.map(), reservations, ship, home) {
            self.idle_turns = 0;
            return Directive::Move(direction);
        }

        self.idle_turns += 1;
        if self.idle_turns < RETURN_RETRY_LIMIT {
            return Directive::Hold;
        }

        debug!("ship {} stuck on the way home, shuffling", self.ship.get());
        self.idle_turns = 0;
        random_open_move(ship, frame, reservations, rng)
    }

    fn collapse(
        &mut self,
        ship: &ShipSnapshot,
        frame: &Frame,
        reservations: &mut Reservations,
    ) -> Directive {
        let home = frame.shipyard();
        if ship.position == home {
            return Directive::Hold;
        }

        if let Some(direction) = naive_navigate(frame.map(), reservations, ship, home) {
            return Directive::Move(direction);
        }

        let dimensions = frame.dimensions();
        if dimensions.manhattan_distance(ship.position, home) == 1 {
            return Directive::from_step(unsafe_moves(dimensions, ship.position, home).first());
        }

        Directive::Hold
    }

    fn transition(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!("ship {} {:?} -> {:?}", self.ship.get(), self.phase, phase);
            self.phase = phase;
        }
    }
}

/// Reports whether the ship must head home now to beat the final turn.
///
/// The margin is four turns on a 32 wide map and grows by one turn for every
/// two extra columns.
#[must_use]
pub fn should_collapse(ship: &ShipSnapshot, frame: &Frame) -> bool {
    let distance = frame
        .dimensions()
        .manhattan_distance(ship.position, frame.shipyard());
    let margin = 4.0 + (f64::from(frame.dimensions().width()) - 32.0) / 2.0;
    f64::from(frame.turns_remaining()) <= f64::from(distance) + margin
}
