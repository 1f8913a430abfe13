use overmind_cli::{run_match, ScenarioConfig, TerrainConfig};
use overmind_core::Rules;

fn short_match(seed: u64) -> ScenarioConfig {
    ScenarioConfig {
        width: 24,
        height: 24,
        seed,
        fleet_size: 6,
        rules: Rules {
            max_turns: 120,
            ..Rules::default()
        },
        terrain: TerrainConfig::default(),
        ..ScenarioConfig::default()
    }
}

#[test]
fn seeded_matches_replay_identically() {
    let first = run_match(&short_match(17)).expect("match runs");
    let second = run_match(&short_match(17)).expect("match runs");

    assert_eq!(first, second);
}

#[test]
fn different_seeds_produce_different_matches() {
    let a = run_match(&short_match(1)).expect("match runs");
    let b = run_match(&short_match(2)).expect("match runs");

    assert_ne!(a.digest, b.digest);
}

#[test]
fn match_runs_to_the_final_turn_within_fleet_limits() {
    let config = short_match(5);
    let summary = run_match(&config).expect("match runs");

    assert_eq!(summary.turns, config.rules.max_turns);
    assert_eq!(summary.players.len(), 2);
    for player in &summary.players {
        assert!(player.ships <= config.fleet_size);
        assert!(player.spawned >= 1);
        assert!(player.spawned >= player.ships);
    }
}

#[test]
fn summary_serializes_for_the_json_report() {
    let summary = run_match(&ScenarioConfig {
        rules: Rules {
            max_turns: 10,
            ..Rules::default()
        },
        ..short_match(3)
    })
    .expect("match runs");

    let value = serde_json::to_value(&summary).expect("json");
    assert_eq!(value["turns"], 10);
    assert_eq!(value["players"].as_array().map(Vec::len), Some(2));
    assert!(value["digest"].is_u64());
}

#[test]
fn invalid_scenarios_are_rejected_before_running() {
    let config = ScenarioConfig {
        fleets: Vec::new(),
        ..short_match(1)
    };
    assert!(run_match(&config).is_err());

    let empty = ScenarioConfig {
        width: 0,
        ..short_match(1)
    };
    assert!(run_match(&empty).is_err());
}
