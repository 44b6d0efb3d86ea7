use std::time::Duration;

use coin_dash::sim::{
    Collection, EntityKind, MoveInput, Round, RoundEvent, RoundPhase, SoundEffect,
};
use coin_dash::{TileColor, Tuning};
use glam::Vec2;

fn field() -> Vec2 {
    Vec2::new(1024.0, 768.0)
}

fn blue_coin(round: &Round) -> coin_dash::sim::EntityId {
    round
        .entities()
        .iter()
        .find(|e| e.kind == EntityKind::BlueCoin)
        .map(|e| e.id)
        .expect("a blue coin is always on the field")
}

#[test]
fn full_round_builds_mosaic_from_counts() {
    let mut round = Round::with_seed(Tuning::default(), field(), 2024).unwrap();

    // Collect five blue coins and whatever green coin shows up at 20s
    for _ in 0..5 {
        let id = blue_coin(&round);
        assert!(round.collect(id).unwrap().is_some());
    }
    round.advance(Duration::from_secs(20));
    let green = round
        .entities()
        .iter()
        .find(|e| e.kind == EntityKind::GreenCoin)
        .map(|e| e.id)
        .expect("green coin spawns every 20s");
    assert!(matches!(
        round.collect(green).unwrap(),
        Some(Collection::Coin { kind: EntityKind::GreenCoin, .. })
    ));

    let counts = round.state().counts();
    assert_eq!((counts.blue, counts.green, counts.red), (5, 1, 0));
    assert_eq!(round.state().score(), 15);
    // 60 + 5 (blue) + 4 (green) - 20 elapsed
    assert_eq!(round.state().time_left(), 49);

    round.advance(Duration::from_secs(49));
    assert_eq!(round.phase(), RoundPhase::Ended);

    let summary = round.summary().expect("summary after round end");
    assert_eq!(summary.score, 15);
    assert_eq!(summary.mosaic.total(), 6);
    assert_eq!(summary.mosaic.side(), 3);
    assert_eq!(summary.mosaic.count(TileColor::Blue), 5);
    assert_eq!(summary.mosaic.count(TileColor::Green), 1);
    assert_eq!(summary.mosaic.count(TileColor::Red), 0);
    assert_eq!(summary.mosaic.rows().count(), 2);
    assert!(!summary.reward_unlocked);
}

#[test]
fn ended_round_stops_spawning() {
    let mut round = Round::with_seed(Tuning::default(), field(), 77).unwrap();
    round.advance(Duration::from_secs(60));
    assert_eq!(round.phase(), RoundPhase::Ended);

    let live = round.live_entity_count();
    round.drain_events();

    // Well past every spawn interval and every expiry
    round.advance(Duration::from_secs(300));
    assert_eq!(round.live_entity_count(), live);
    assert_eq!(round.pending_timers(), 0);
    assert!(round.drain_events().is_empty());
}

#[test]
fn reward_unlocked_at_threshold() {
    let mut tuning = Tuning::default();
    tuning.reward_threshold = 3;
    tuning.round_seconds = 2;
    let mut round = Round::with_seed(tuning, field(), 5).unwrap();

    for _ in 0..3 {
        let id = blue_coin(&round);
        round.collect(id).unwrap();
    }
    // 2 + 3 bonus seconds
    round.advance(Duration::from_secs(5));

    let summary = round.summary().unwrap();
    assert!(summary.reward_unlocked);
    assert_eq!(summary.call_to_action, "You reached 3 points! Generate your mosaic?");
}

#[test]
fn sounds_and_hud_events_follow_collections() {
    let mut round = Round::with_seed(Tuning::default(), field(), 9).unwrap();
    let start = round.drain_events();
    assert!(start.contains(&RoundEvent::TimeChanged(60)));
    assert!(start.iter().any(|e| matches!(e, RoundEvent::Spawned { kind: EntityKind::BlueCoin, .. })));

    round.advance(Duration::from_secs(15));
    let power_up = round.entities().power_up().expect("power-up at 15s");
    round.collect(power_up).unwrap();

    let events = round.drain_events();
    assert!(events.contains(&RoundEvent::Sound(SoundEffect::PowerUp)));
    assert!(events.contains(&RoundEvent::BoostChanged(true)));

    round.advance(Duration::from_secs(5));
    assert!(round.drain_events().contains(&RoundEvent::BoostChanged(false)));
}

#[test]
fn player_stays_inside_field() {
    let mut round = Round::with_seed(Tuning::default(), field(), 11).unwrap();
    let input = MoveInput {
        up: true,
        left: true,
        ..Default::default()
    };
    for _ in 0..600 {
        round.step(&input, 1.0 / 60.0).unwrap();
        let pos = round.player().pos;
        assert!(pos.x >= 0.0 && pos.x <= field().x);
        assert!(pos.y >= 0.0 && pos.y <= field().y);
    }
}
