#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Roster management for one player's fleet.
//!
//! The [`Fleet`] keeps one [`Role`] per live ship, hands out targets, reacts to
//! enemies near the shipyard and, once per turn, collects exactly one
//! [`Order`] per ship. All same-turn coordination happens through a single
//! [`Reservations`] ledger threaded through every role update in a fixed
//! order: gatherers, then blockers, then destroyers.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
};

use log::{debug, info};
use overmind_core::{Order, Position, ShipId};
use overmind_system_roles::{Blocker, Destroyer, Gatherer, Phase, Role, RoleKind};
use overmind_system_targeting::{assign_targets, get_targets, TargetingConfig};
use overmind_world::{Frame, Reservations};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How targetless gatherers are handed new cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    /// Each gatherer greedily takes the best cell as seen from its own position.
    #[default]
    Greedy,
    /// Gatherers share the best cells as seen from the shipyard.
    Pool,
}

/// Where blockers park.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockerPlacement {
    /// Cardinal neighbours of the first rival shipyard.
    #[default]
    EnemyCardinals,
    /// Every rival shipyard.
    EnemyShipyards,
    /// The cells listed in [`FleetConfig::blocker_targets`].
    Listed,
}

/// Tunables for the roster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Target allocation strategy.
    pub target_mode: TargetMode,
    /// Gatherer count that must be exceeded before blockers are enlisted.
    pub blocker_threshold: usize,
    /// How the cells blockers park on are chosen.
    pub blocker_placement: BlockerPlacement,
    /// Cells used by [`BlockerPlacement::Listed`]; at most one blocker per cell.
    pub blocker_targets: Vec<Position>,
    /// Chebyshev radius around the shipyard that triggers a defense.
    pub defense_radius: u32,
    /// Density scoring parameters.
    pub targeting: TargetingConfig,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            target_mode: TargetMode::Greedy,
            blocker_threshold: 6,
            blocker_placement: BlockerPlacement::EnemyCardinals,
            blocker_targets: Vec::new(),
            defense_radius: 2,
            targeting: TargetingConfig::default(),
        }
    }
}

/// One player's ships and the roles steering them.
#[derive(Clone, Debug, Default)]
pub struct Fleet {
    config: FleetConfig,
    roles: BTreeMap<ShipId, Role>,
}

impl Fleet {
    /// Creates an empty roster.
    #[must_use]
    pub fn new(config: FleetConfig) -> Self {
        Self {
            config,
            roles: BTreeMap::new(),
        }
    }

    /// Configuration the roster runs with.
    #[must_use]
    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Role attached to the provided ship.
    #[must_use]
    pub fn role(&self, ship: ShipId) -> Option<&Role> {
        self.roles.get(&ship)
    }

    /// Every role in ascending ship order.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    /// Number of ships carrying the provided behaviour.
    #[must_use]
    pub fn count(&self, kind: RoleKind) -> usize {
        self.roles.values().filter(|role| role.kind() == kind).count()
    }

    /// Runs one roster pass and returns one order per live ship.
    pub fn update<R>(&mut self, frame: &Frame, rng: &mut R) -> Vec<Order>
    where
        R: Rng + ?Sized,
    {
        let mut reservations = Reservations::new();
        let blocker_targets = self.blocker_targets(frame);

        self.prune(frame);
        self.enlist(frame, blocker_targets.len());
        self.defend(frame);
        self.assign_gatherer_targets(frame);
        self.assign_blocker_targets(&blocker_targets);

        let mut orders = Vec::with_capacity(self.roles.len());
        for kind in [RoleKind::Gatherer, RoleKind::Blocker, RoleKind::Destroyer] {
            for role in self.roles.values_mut().filter(|role| role.kind() == kind) {
                let Some(ship) = frame.my_ship(role.ship()) else {
                    continue;
                };
                let directive = role.update(ship, frame, &mut reservations, rng);
                orders.push(Order {
                    ship: ship.id,
                    directive,
                });
            }
        }

        orders
    }

    fn prune(&mut self, frame: &Frame) {
        let before = self.roles.len();
        self.roles.retain(|&ship, _| frame.my_ship(ship).is_some());
        if self.roles.len() < before {
            debug!("dropped {} lost ships", before - self.roles.len());
        }

        let idle: Vec<ShipId> = self
            .roles
            .values()
            .filter_map(|role| match role {
                Role::Destroyer(destroyer) if destroyer.is_idle() => Some(destroyer.ship()),
                _ => None,
            })
            .collect();
        for ship in idle {
            info!("ship {} returns to gathering", ship.get());
            let _ = self.roles.insert(ship, Role::Gatherer(Gatherer::new(ship)));
        }
    }

    fn blocker_targets(&self, frame: &Frame) -> Vec<Position> {
        match self.config.blocker_placement {
            BlockerPlacement::EnemyCardinals => frame
                .enemy_shipyards()
                .first()
                .map(|&yard| frame.dimensions().cardinals(yard).to_vec())
                .unwrap_or_default(),
            BlockerPlacement::EnemyShipyards => frame.enemy_shipyards(),
            BlockerPlacement::Listed => self.config.blocker_targets.clone(),
        }
    }

    fn enlist(&mut self, frame: &Frame, blocker_slots: usize) {
        let mut gatherers = self.count(RoleKind::Gatherer);
        let mut blockers = self.count(RoleKind::Blocker);

        for ship in frame.my_ships() {
            if self.roles.contains_key(&ship.id) {
                continue;
            }

            let role = if gatherers > self.config.blocker_threshold && blockers < blocker_slots {
                blockers += 1;
                Role::Blocker(Blocker::new(ship.id))
            } else {
                gatherers += 1;
                Role::Gatherer(Gatherer::new(ship.id))
            };
            debug!("ship {} enlisted as {:?}", ship.id.get(), role.kind());
            let _ = self.roles.insert(ship.id, role);
        }
    }

    /// Scans the box around the shipyard column by column, west to east.
    fn defend(&mut self, frame: &Frame) {
        let dimensions = frame.dimensions();
        let home = frame.shipyard();
        let reach = self
            .config
            .defense_radius
            .min(dimensions.width().max(dimensions.height()));
        let radius = i32::try_from(reach).unwrap_or(0);

        for dx in -radius..=radius {
            for dy in -radius..=radius {
                let cell = dimensions.normalize(Position::new(home.x() + dx, home.y() + dy));
                let occupant = frame.map().cell(cell).occupant;
                let Some(intruder) = occupant.and_then(|id| frame.ship(id)) else {
                    continue;
                };
                if intruder.owner == frame.me() || self.is_hunted(intruder.id) {
                    continue;
                }

                let Some(hunter) = self
                    .nearest_gatherer(frame, intruder.position, true)
                    .or_else(|| self.nearest_gatherer(frame, intruder.position, false))
                else {
                    return;
                };
                info!(
                    "ship {} defending against {} at {:?}",
                    hunter.get(),
                    intruder.id.get(),
                    intruder.position
                );
                let _ = self
                    .roles
                    .insert(hunter, Role::Destroyer(Destroyer::new(hunter, intruder.id)));
            }
        }
    }

    fn is_hunted(&self, prey: ShipId) -> bool {
        self.roles.values().any(|role| match role {
            Role::Destroyer(destroyer) => destroyer.target() == prey,
            _ => false,
        })
    }

    fn nearest_gatherer(&self, frame: &Frame, to: Position, seeking: bool) -> Option<ShipId> {
        let dimensions = frame.dimensions();
        self.roles
            .values()
            .filter_map(|role| match role {
                Role::Gatherer(gatherer) if !seeking || gatherer.phase() == Phase::Seek => {
                    frame.my_ship(gatherer.ship())
                }
                _ => None,
            })
            .map(|ship| (ship.id, dimensions.toroidal_distance(ship.position, to)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(ship, _)| ship)
    }

    fn assign_gatherer_targets(&mut self, frame: &Frame) {
        let seekless: Vec<ShipId> = self
            .roles
            .values()
            .filter_map(|role| match role {
                Role::Gatherer(gatherer) if gatherer.target().is_none() => Some(gatherer.ship()),
                _ => None,
            })
            .collect();
        if seekless.is_empty() {
            return;
        }

        let targets: Vec<(ShipId, Position)> = match self.config.target_mode {
            TargetMode::Greedy => assign_targets(
                frame.map(),
                &seekless,
                |ship| frame.my_ship(ship).map(|snapshot| snapshot.position),
                &self.config.targeting,
            )
            .into_iter()
            .map(|assignment| (assignment.ship, assignment.target))
            .collect(),
            TargetMode::Pool => seekless
                .iter()
                .copied()
                .zip(get_targets(
                    frame.map(),
                    frame.shipyard(),
                    seekless.len(),
                    &self.config.targeting,
                ))
                .collect(),
        };

        for (ship, target) in targets {
            if let Some(Role::Gatherer(gatherer)) = self.roles.get_mut(&ship) {
                debug!("gatherer {} seeking {:?}", ship.get(), target);
                gatherer.assign_target(target);
            }
        }
    }

    fn assign_blocker_targets(&mut self, targets: &[Position]) {
        let mut held: BTreeSet<Position> = self
            .roles
            .values()
            .filter_map(|role| match role {
                Role::Blocker(blocker) => blocker.target(),
                _ => None,
            })
            .collect();

        for role in self.roles.values_mut() {
            let Role::Blocker(blocker) = role else {
                continue;
            };
            if blocker.target().is_some() {
                continue;
            }
            let Some(&target) = targets.iter().find(|target| !held.contains(*target)) else {
                break;
            };
            debug!("blocker {} parking on {:?}", blocker.ship().get(), target);
            blocker.assign_target(target);
            let _ = held.insert(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fleet_config_reads_partial_toml() {
        let config: FleetConfig = toml::from_str(
            r#"
                target_mode = "pool"
                blocker_threshold = 3
                blocker_placement = "listed"
                blocker_targets = [{ x = 1, y = 2 }]

                [targeting]
                pool_radius = 0
            "#,
        )
        .expect("valid config");

        assert_eq!(config.target_mode, TargetMode::Pool);
        assert_eq!(config.blocker_threshold, 3);
        assert_eq!(config.blocker_placement, BlockerPlacement::Listed);
        assert_eq!(config.blocker_targets, vec![Position::new(1, 2)]);
        assert_eq!(config.defense_radius, 2);
        assert_eq!(config.targeting.pool_radius, 0);
        assert_eq!(config.targeting.assign_radius, 2);
    }

    #[test]
    fn empty_fleet_counts_nothing() {
        let fleet = Fleet::new(FleetConfig::default());
        assert_eq!(fleet.count(RoleKind::Gatherer), 0);
        assert!(fleet.roles().next().is_none());
        assert_eq!(fleet.config().blocker_threshold, 6);
    }
}
