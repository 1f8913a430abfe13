#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Local match runner behind the `overmind` command-line tool.
//!
//! A [`ScenarioConfig`] describes the grid, the host rules and one
//! [`overmind_system_fleet::FleetConfig`] per competing fleet. [`run_match`]
//! generates the seeded terrain, drives every fleet against the local turn
//! resolver until the final turn and reports a [`MatchSummary`].

pub mod scenario;
pub mod simulation;
pub mod terrain;

pub use scenario::{ScenarioConfig, ScenarioError, TerrainConfig};
pub use simulation::{run_match, MatchSummary, PlayerSummary};
