//! Runs complete matches between fleets on the local turn resolver.

use std::{
    collections::{hash_map::DefaultHasher, BTreeMap},
    hash::{Hash, Hasher},
};

use log::{debug, info};
use overmind_core::{Command, Dimensions, Event, PlayerId};
use overmind_system_fleet::Fleet;
use overmind_world::{apply, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::{
    scenario::{ScenarioConfig, ScenarioError},
    terrain,
};

/// Turns between progress log lines.
const PROGRESS_INTERVAL: u32 = 50;

/// Final standing of one fleet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    /// Player identifier.
    pub player: u32,
    /// Cargo deposited at the shipyard.
    pub banked: u64,
    /// Ships alive at the end of the match.
    pub ships: usize,
    /// Ships spawned over the match.
    pub spawned: usize,
}

/// Outcome of a simulated match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    /// Turns resolved.
    pub turns: u32,
    /// Standing of every fleet in player order.
    pub players: Vec<PlayerSummary>,
    /// Collisions that destroyed ships.
    pub collisions: usize,
    /// Resources left on the grid.
    pub remaining_halite: u64,
    /// Fingerprint of every event the resolver emitted.
    pub digest: u64,
}

/// Plays the scenario to its final turn.
pub fn run_match(config: &ScenarioConfig) -> Result<MatchSummary, ScenarioError> {
    config.validate()?;

    let dimensions = Dimensions::new(config.width, config.height);
    let map = terrain::generate(
        dimensions,
        &config.terrain,
        config.rules.max_halite,
        config.seed,
    )?;
    let players: Vec<PlayerId> = (0..config.fleets.len())
        .map(|index| PlayerId::new(u32::try_from(index).unwrap_or(u32::MAX)))
        .collect();
    let shipyards: Vec<_> = players.iter().copied().zip(config.shipyards()).collect();
    let mut world = World::new(map, &shipyards, config.rules)?;
    info!(
        "starting {}x{} match: {} fleets, {} turns, seed {}",
        config.width,
        config.height,
        players.len(),
        config.rules.max_turns,
        config.seed
    );

    let mut fleets: Vec<(PlayerId, Fleet)> = players
        .iter()
        .copied()
        .zip(config.fleets.iter().cloned().map(Fleet::new))
        .collect();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(1));
    let mut hasher = DefaultHasher::new();
    let mut spawned: BTreeMap<PlayerId, usize> = BTreeMap::new();
    let mut collisions = 0;
    let mut events = Vec::new();
    let mut turns = 0;

    while !query::is_finished(&world) {
        events.clear();

        for &(player, _) in &fleets {
            if query::ship_count(&world, player) < config.fleet_size {
                let spawn = Command::SpawnShip { owner: player };
                apply(&mut world, spawn, &mut events);
            }
        }

        for (player, fleet) in &mut fleets {
            let Some(frame) = query::frame(&world, *player) else {
                continue;
            };
            for order in fleet.update(&frame, &mut rng) {
                apply(&mut world, Command::Issue(order), &mut events);
            }
        }

        apply(&mut world, Command::EndTurn, &mut events);
        turns += 1;

        for event in &events {
            event.hash(&mut hasher);
            match event {
                Event::ShipSpawned { owner, .. } => *spawned.entry(*owner).or_insert(0) += 1,
                Event::ShipsCollided { ships, position } => {
                    collisions += 1;
                    debug!("collision of {} ships at {:?}", ships.len(), position);
                }
                _ => {}
            }
        }

        let turn = query::turn(&world);
        if turn % PROGRESS_INTERVAL == 0 {
            let banked: Vec<u64> = players
                .iter()
                .map(|&player| query::banked(&world, player))
                .collect();
            info!("turn {}: banked {:?}", turn, banked);
        }
    }

    let summary = MatchSummary {
        turns,
        players: players
            .iter()
            .map(|&player| PlayerSummary {
                player: player.get(),
                banked: query::banked(&world, player),
                ships: query::ship_count(&world, player),
                spawned: spawned.get(&player).copied().unwrap_or(0),
            })
            .collect(),
        collisions,
        remaining_halite: query::map(&world).total_halite(),
        digest: hasher.finish(),
    };
    info!("match finished after {} turns", summary.turns);
    Ok(summary)
}
