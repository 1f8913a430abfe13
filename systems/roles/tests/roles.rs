use overmind_core::{
    Command, Dimensions, Direction, Directive, Order, PlayerId, Position, Rules, ShipId,
    ShipSnapshot,
};
use overmind_system_roles::{Blocker, Destroyer, Gatherer, Phase, Role, RoleKind};
use overmind_world::{apply, query, Frame, GameMap, Reservations, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const ME: PlayerId = PlayerId::new(0);
const ENEMY: PlayerId = PlayerId::new(1);

fn ship(id: u32, owner: PlayerId, x: i32, y: i32, halite: u32) -> ShipSnapshot {
    ShipSnapshot {
        id: ShipId::new(id),
        owner,
        position: Position::new(x, y),
        halite,
        capacity: 1_000,
    }
}

fn frame(size: u32, deposits: &[((i32, i32), u32)], ships: Vec<ShipSnapshot>, turn: u32) -> Frame {
    let mut map = GameMap::uniform(Dimensions::new(size, size), 0).expect("valid map");
    for &((x, y), halite) in deposits {
        map.set_halite(Position::new(x, y), halite);
    }
    Frame::new(map, ships, ME, Position::new(0, 0), turn, Rules::default())
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(0x5eed)
}

#[test]
fn seeker_reaches_its_target_in_four_turns_then_gathers() {
    let mut map = GameMap::uniform(Dimensions::new(5, 5), 0).expect("valid map");
    map.set_halite(Position::new(2, 2), 500);
    let mut world = World::new(map, &[(ME, Position::new(0, 0))], Rules::default())
        .expect("valid world");
    let mut events = Vec::new();
    apply(&mut world, Command::SpawnShip { owner: ME }, &mut events);

    let id = ShipId::new(0);
    let mut gatherer = Gatherer::new(id);
    gatherer.assign_target(Position::new(2, 2));
    let mut rng = rng();

    for _ in 0..4 {
        let frame = query::frame(&world, ME).expect("frame");
        let snapshot = *frame.my_ship(id).expect("ship alive");
        let mut reservations = Reservations::new();
        let directive = gatherer.update(&snapshot, &frame, &mut reservations, &mut rng);
        assert!(matches!(directive, Directive::Move(_)), "{directive:?}");
        assert_eq!(gatherer.phase(), Phase::Seek);

        apply(
            &mut world,
            Command::Issue(Order {
                ship: id,
                directive,
            }),
            &mut events,
        );
        apply(&mut world, Command::EndTurn, &mut events);
    }

    let frame = query::frame(&world, ME).expect("frame");
    let snapshot = *frame.my_ship(id).expect("ship alive");
    assert_eq!(snapshot.position, Position::new(2, 2));

    let directive = gatherer.update(&snapshot, &frame, &mut Reservations::new(), &mut rng);
    assert_eq!(directive, Directive::Hold);
    assert_eq!(gatherer.phase(), Phase::Gather);
    assert_eq!(gatherer.target(), None);
}

#[test]
fn full_gatherer_turns_for_home() {
    let me = ship(0, ME, 3, 3, 1_000);
    let frame = frame(8, &[], vec![me], 1);
    let mut gatherer = Gatherer::new(me.id);

    let directive = gatherer.update(&me, &frame, &mut Reservations::new(), &mut rng());

    assert_eq!(gatherer.phase(), Phase::Return);
    assert_eq!(directive, Directive::Move(Direction::West));
}

#[test]
fn full_seeker_abandons_its_target_for_home() {
    let me = ship(0, ME, 3, 3, 1_000);
    let frame = frame(8, &[], vec![me], 1);
    let mut gatherer = Gatherer::new(me.id);
    gatherer.assign_target(Position::new(6, 6));

    let directive = gatherer.update(&me, &frame, &mut Reservations::new(), &mut rng());

    assert_eq!(gatherer.phase(), Phase::Return);
    assert_eq!(directive, Directive::Move(Direction::West));
}

#[test]
fn seeker_stays_on_a_cell_too_costly_to_leave() {
    let me = ship(0, ME, 1, 1, 0);
    let frame = frame(8, &[((1, 1), 100)], vec![me], 1);
    let mut gatherer = Gatherer::new(me.id);
    gatherer.assign_target(Position::new(5, 5));
    let mut reservations = Reservations::new();

    let directive = gatherer.update(&me, &frame, &mut reservations, &mut rng());

    assert_eq!(directive, Directive::Hold);
    assert_eq!(gatherer.phase(), Phase::Seek);
    assert!(gatherer.path().is_none());
    assert!(reservations.is_empty());
}

#[test]
fn returning_gatherer_keeps_mining_a_rich_cell() {
    let me = ship(0, ME, 3, 3, 400);
    let frame = frame(8, &[((3, 3), 300)], vec![me], 1);
    let mut gatherer = Gatherer::new(me.id);
    let mut reservations = Reservations::new();
    let mut rng = rng();

    let full = ShipSnapshot {
        halite: 1_000,
        ..me
    };
    let _ = gatherer.update(&full, &frame, &mut reservations, &mut rng);
    assert_eq!(gatherer.phase(), Phase::Return);

    let directive = gatherer.update(&me, &frame, &mut Reservations::new(), &mut rng);
    assert_eq!(directive, Directive::Hold);
    assert_eq!(gatherer.phase(), Phase::Return);
}

#[test]
fn returning_gatherer_shuffles_after_three_blocked_turns() {
    let me = ship(0, ME, 3, 3, 1_000);
    let frame = frame(
        8,
        &[],
        vec![me, ship(1, ME, 2, 3, 0), ship(2, ME, 3, 2, 0)],
        1,
    );
    let mut gatherer = Gatherer::new(me.id);
    let mut rng = rng();

    for _ in 0..2 {
        let directive = gatherer.update(&me, &frame, &mut Reservations::new(), &mut rng);
        assert_eq!(directive, Directive::Hold);
        assert_eq!(gatherer.phase(), Phase::Return);
    }

    let mut reservations = Reservations::new();
    let directive = gatherer.update(&me, &frame, &mut reservations, &mut rng);
    let expected_cell = match directive {
        Directive::Move(Direction::South) => Position::new(3, 4),
        Directive::Move(Direction::East) => Position::new(4, 3),
        other => panic!("expected a shuffle onto a free cell, got {other:?}"),
    };
    assert_eq!(reservations.holder(expected_cell), Some(me.id));

    let directive = gatherer.update(&me, &frame, &mut Reservations::new(), &mut rng);
    assert_eq!(directive, Directive::Hold);
}

#[test]
fn collapse_is_never_left() {
    let me = ship(0, ME, 5, 5, 0);
    let late = frame(32, &[], vec![me], 390);
    let mut gatherer = Gatherer::new(me.id);
    let mut rng = rng();

    let directive = gatherer.update(&me, &late, &mut Reservations::new(), &mut rng);
    assert_eq!(gatherer.phase(), Phase::Collapse);
    assert_eq!(directive, Directive::Move(Direction::West));

    let early = frame(32, &[], vec![me], 1);
    let _ = gatherer.update(&me, &early, &mut Reservations::new(), &mut rng);
    assert_eq!(gatherer.phase(), Phase::Collapse);

    let home = ship(0, ME, 0, 0, 0);
    let at_home = frame(32, &[], vec![home], 395);
    let directive = gatherer.update(&home, &at_home, &mut Reservations::new(), &mut rng);
    assert_eq!(directive, Directive::Hold);
}

#[test]
fn collapsing_ship_rams_an_occupied_shipyard_when_adjacent() {
    let me = ship(0, ME, 1, 0, 300);
    let frame = frame(32, &[], vec![me, ship(1, ME, 0, 0, 0)], 399);
    let mut gatherer = Gatherer::new(me.id);

    let directive = gatherer.update(&me, &frame, &mut Reservations::new(), &mut rng());

    assert_eq!(gatherer.phase(), Phase::Collapse);
    assert_eq!(directive, Directive::Move(Direction::West));
}

#[test]
fn collapsing_ship_waits_when_blocked_further_out() {
    let me = ship(0, ME, 2, 0, 300);
    let frame = frame(32, &[], vec![me, ship(1, ME, 1, 0, 0)], 399);
    let mut gatherer = Gatherer::new(me.id);
    let mut reservations = Reservations::new();

    let directive = gatherer.update(&me, &frame, &mut reservations, &mut rng());

    assert_eq!(gatherer.phase(), Phase::Collapse);
    assert_eq!(directive, Directive::Hold);
    assert!(reservations.is_empty());
}

#[test]
fn gatherers_do_not_claim_the_same_neighbour() {
    let first = ship(0, ME, 2, 2, 0);
    let second = ship(1, ME, 3, 3, 0);
    let frame = frame(8, &[((2, 3), 400)], vec![first, second], 1);
    let mut reservations = Reservations::new();
    let mut rng = rng();

    let mut a = Gatherer::new(first.id);
    let mut b = Gatherer::new(second.id);
    let a_move = a.update(&first, &frame, &mut reservations, &mut rng);
    let b_move = b.update(&second, &frame, &mut reservations, &mut rng);

    assert_eq!(a_move, Directive::Move(Direction::South));
    assert_eq!(reservations.holder(Position::new(2, 3)), Some(first.id));
    assert_eq!(b_move, Directive::Hold);
    assert_eq!(a.phase(), Phase::Gather);
    assert_eq!(b.phase(), Phase::Gather);
}

#[test]
fn stalled_seeker_steps_aside_idles_then_replans() {
    let mut gatherer = Gatherer::new(ShipId::new(0));
    gatherer.assign_target(Position::new(3, 0));
    let mut rng = rng();

    let start = ship(0, ME, 0, 0, 0);
    let open = frame(8, &[], vec![start], 1);
    let directive = gatherer.update(&start, &open, &mut Reservations::new(), &mut rng);
    assert_eq!(directive, Directive::Move(Direction::East));
    assert_eq!(gatherer.path().map(|path| path.len()), Some(3));

    let moved = ship(0, ME, 1, 0, 0);
    let crowded = frame(8, &[], vec![moved, ship(7, ENEMY, 2, 0, 0)], 2);
    let directive = gatherer.update(&moved, &crowded, &mut Reservations::new(), &mut rng);
    assert_eq!(directive, Directive::Hold);
    assert!(gatherer.path().is_none());

    let mut reservations = Reservations::new();
    let directive = gatherer.update(&moved, &crowded, &mut reservations, &mut rng);
    let aside = match directive {
        Directive::Move(Direction::North) => Position::new(1, 7),
        Directive::Move(Direction::South) => Position::new(1, 1),
        Directive::Move(Direction::West) => Position::new(0, 0),
        other => panic!("expected a step onto a free neighbour, got {other:?}"),
    };
    assert_eq!(reservations.holder(aside), Some(moved.id));
    assert_eq!(reservations.len(), 1);

    let mut reservations = Reservations::new();
    let directive = gatherer.update(&moved, &crowded, &mut reservations, &mut rng);
    assert_eq!(directive, Directive::Hold);
    assert!(reservations.is_empty());

    let directive = gatherer.update(&moved, &crowded, &mut Reservations::new(), &mut rng);
    assert!(matches!(directive, Directive::Move(_)), "{directive:?}");
    let path = gatherer.path().expect("replanned route");
    assert!(!path.contains(Position::new(2, 0)));
    assert_eq!(path.goal(), Some(Position::new(3, 0)));
}

#[test]
fn seeker_without_a_route_moves_randomly() {
    let me = ship(0, ME, 0, 0, 0);
    let frame = frame(
        8,
        &[],
        vec![
            me,
            ship(1, ENEMY, 4, 3, 0),
            ship(2, ENEMY, 4, 5, 0),
            ship(3, ENEMY, 3, 4, 0),
            ship(4, ENEMY, 5, 4, 0),
        ],
        1,
    );
    let mut gatherer = Gatherer::new(me.id);
    gatherer.assign_target(Position::new(4, 4));
    let mut reservations = Reservations::new();

    let directive = gatherer.update(&me, &frame, &mut reservations, &mut rng());

    assert!(matches!(directive, Directive::Move(_)), "{directive:?}");
    assert_eq!(reservations.len(), 1);
    assert!(gatherer.path().is_none());
}

#[test]
fn blocker_plans_moves_and_replans_when_blocked() {
    let mut blocker = Blocker::new(ShipId::new(0));
    let start = ship(0, ME, 0, 0, 0);
    let open = frame(8, &[], vec![start], 1);

    assert_eq!(
        blocker.update(&start, &open, &mut Reservations::new()),
        Directive::Hold
    );

    blocker.assign_target(Position::new(3, 0));
    assert_eq!(
        blocker.update(&start, &open, &mut Reservations::new()),
        Directive::Hold
    );
    assert_eq!(blocker.path().map(|path| path.len()), Some(3));
    assert_eq!(
        blocker.update(&start, &open, &mut Reservations::new()),
        Directive::Move(Direction::East)
    );

    let moved = ship(0, ME, 1, 0, 0);
    let crowded = frame(8, &[], vec![moved, ship(5, ENEMY, 2, 0, 0)], 2);
    assert_eq!(
        blocker.update(&moved, &crowded, &mut Reservations::new()),
        Directive::Hold
    );
    assert!(blocker.path().is_none());

    assert_eq!(
        blocker.update(&moved, &crowded, &mut Reservations::new()),
        Directive::Hold
    );
    let path = blocker.path().expect("replanned route");
    assert!(!path.contains(Position::new(2, 0)));
}

#[test]
fn parked_blocker_holds() {
    let mut blocker = Blocker::new(ShipId::new(0));
    blocker.assign_target(Position::new(2, 0));
    let parked = ship(0, ME, 2, 0, 0);
    let frame = frame(8, &[], vec![parked], 1);

    for _ in 0..3 {
        assert_eq!(
            blocker.update(&parked, &frame, &mut Reservations::new()),
            Directive::Hold
        );
    }
}

#[test]
fn destroyer_goes_idle_when_its_target_vanishes() {
    let hunter = ship(0, ME, 2, 2, 0);
    let frame = frame(8, &[], vec![hunter], 1);
    let mut role = Role::Destroyer(Destroyer::new(hunter.id, ShipId::new(99)));

    let directive = role.update(&hunter, &frame, &mut Reservations::new(), &mut rng());

    assert_eq!(directive, Directive::Hold);
    assert_eq!(role.kind(), RoleKind::Destroyer);
    match role {
        Role::Destroyer(destroyer) => assert!(destroyer.is_idle()),
        other => panic!("unexpected role {other:?}"),
    }
}

#[test]
fn destroyer_rams_an_adjacent_target() {
    let hunter = ship(0, ME, 2, 0, 0);
    let prey = ship(9, ENEMY, 3, 0, 0);
    let frame = frame(8, &[], vec![hunter, prey], 1);
    let mut destroyer = Destroyer::new(hunter.id, prey.id);
    let mut reservations = Reservations::new();

    let directive = destroyer.update(&hunter, &frame, &mut reservations);

    assert_eq!(directive, Directive::Move(Direction::East));
    assert_eq!(reservations.holder(Position::new(3, 0)), Some(hunter.id));
    assert!(!destroyer.is_idle());
}

#[test]
fn destroyer_closes_distance_safely_before_ramming() {
    let hunter = ship(0, ME, 2, 0, 0);
    let prey = ship(9, ENEMY, 4, 0, 0);
    let frame = frame(8, &[], vec![hunter, prey], 1);
    let mut destroyer = Destroyer::new(hunter.id, prey.id);
    let mut reservations = Reservations::new();

    let directive = destroyer.update(&hunter, &frame, &mut reservations);

    assert_eq!(directive, Directive::Move(Direction::East));
    assert_eq!(reservations.holder(Position::new(3, 0)), Some(hunter.id));
}

#[test]
fn destroyer_drops_its_route_when_the_next_step_is_taken() {
    let hunter = ship(0, ME, 2, 0, 0);
    let prey = ship(9, ENEMY, 5, 0, 0);
    let frame = frame(8, &[], vec![hunter, prey], 1);
    let mut destroyer = Destroyer::new(hunter.id, prey.id);
    let mut reservations = Reservations::new();
    reservations.reserve(Position::new(3, 0), ShipId::new(4));

    let directive = destroyer.update(&hunter, &frame, &mut reservations);

    assert_eq!(directive, Directive::Hold);
    assert!(destroyer.path().is_none());
    assert_eq!(reservations.len(), 1);
    assert!(!destroyer.is_idle());
}

#[test]
fn destroyer_replans_when_its_target_leaves_the_route() {
    let hunter = ship(0, ME, 2, 0, 0);
    let prey = ship(9, ENEMY, 5, 0, 0);
    let mut destroyer = Destroyer::new(hunter.id, prey.id);

    let start = frame(8, &[], vec![hunter, prey], 1);
    let directive = destroyer.update(&hunter, &start, &mut Reservations::new());
    assert_eq!(directive, Directive::Move(Direction::East));
    assert_eq!(destroyer.path().map(|path| path.len()), Some(3));

    let hunter = ship(0, ME, 3, 0, 0);
    let fled = ship(9, ENEMY, 4, 3, 0);
    let moved = frame(8, &[], vec![hunter, fled], 2);
    let directive = destroyer.update(&hunter, &moved, &mut Reservations::new());

    assert!(matches!(directive, Directive::Move(_)), "{directive:?}");
    let path = destroyer.path().expect("replanned route");
    assert_eq!(path.goal(), Some(fled.position));
    assert_eq!(path.len(), 4);
    assert!(!path.contains(Position::new(5, 0)));
}

#[test]
fn unknown_phase_tags_recover_to_gather() {
    assert_eq!(serde_json::to_string(&Phase::Collapse).expect("json"), "3");
    assert_eq!(
        serde_json::from_str::<Phase>("1").expect("json"),
        Phase::Return
    );
    assert_eq!(
        serde_json::from_str::<Phase>("42").expect("json"),
        Phase::Gather
    );

    let mut state = serde_json::to_value(Gatherer::new(ShipId::new(6))).expect("json");
    state["phase"] = serde_json::json!(17);
    let restored: Gatherer = serde_json::from_value(state).expect("json");
    assert_eq!(restored.phase(), Phase::Gather);
    assert_eq!(restored.ship(), ShipId::new(6));
}
