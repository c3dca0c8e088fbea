use rand::rngs::StdRng;
use rand::SeedableRng;
use space_shooter::config::{SpawnConfig, StageConfig, StageTable};
use space_shooter::entities::ItemKind;
use space_shooter::error::GameError;
use space_shooter::spawn::*;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn table() -> StageTable {
    StageTable::new(
        vec![
            StageConfig {
                spawn: SpawnConfig::new(1.0, 5.0).with_weights(&[(ItemKind::Laser, 1.0)]),
                boss: None,
            },
            StageConfig {
                spawn: SpawnConfig::new(2.0, 3.0).with_enemy_interval(1.5),
                boss: None,
            },
        ],
        30.0,
    )
    .unwrap()
}

fn count(spawns: &[Spawn], wanted: fn(&Spawn) -> bool) -> usize {
    spawns.iter().filter(|s| wanted(s)).count()
}

#[test]
fn nothing_spawns_before_interval() {
    let mut sched = SpawnScheduler::new(&table(), 1).unwrap();
    let mut rng = seeded_rng();
    for _ in 0..3 {
        assert!(sched.update(0.25, &mut rng).is_empty());
    }
    assert_eq!(sched.update(0.25, &mut rng), vec![Spawn::Meteor]);
}

#[test]
fn cadence_follows_cumulative_time() {
    let mut sched = SpawnScheduler::new(&table(), 1).unwrap();
    let mut rng = seeded_rng();
    let mut all = Vec::new();
    for _ in 0..20 {
        all.extend(sched.update(0.25, &mut rng));
    }
    // 5 seconds: five meteors and one item.
    assert_eq!(count(&all, |s| *s == Spawn::Meteor), 5);
    assert_eq!(count(&all, |s| matches!(s, Spawn::Item(_))), 1);
    assert_eq!(count(&all, |s| *s == Spawn::Enemy), 0);
}

#[test]
fn at_most_one_spawn_per_timer_per_frame() {
    let mut sched = SpawnScheduler::new(&table(), 1).unwrap();
    let spawns = sched.update(10.0, &mut seeded_rng());
    assert_eq!(count(&spawns, |s| *s == Spawn::Meteor), 1);
    assert_eq!(count(&spawns, |s| matches!(s, Spawn::Item(_))), 1);
}

#[test]
fn items_follow_weight_table() {
    let mut sched = SpawnScheduler::new(&table(), 1).unwrap();
    let mut rng = seeded_rng();
    for _ in 0..10 {
        for spawn in sched.update(5.0, &mut rng) {
            if let Spawn::Item(kind) = spawn {
                assert_eq!(kind, ItemKind::Laser);
            }
        }
    }
}

#[test]
fn weighted_choice_only_draws_listed_kinds() {
    let config = SpawnConfig::new(100.0, 1.0)
        .with_weights(&[(ItemKind::Shield, 3.0), (ItemKind::Speed, 1.0), (ItemKind::Double, 0.0)]);
    let mut sched = SpawnScheduler::with_config(1, config);
    let mut rng = seeded_rng();
    let mut seen = Vec::new();
    for _ in 0..200 {
        for spawn in sched.update(1.0, &mut rng) {
            if let Spawn::Item(kind) = spawn {
                seen.push(kind);
            }
        }
    }
    assert_eq!(seen.len(), 200);
    assert!(seen.iter().all(|k| matches!(k, ItemKind::Shield | ItemKind::Speed)));
    assert!(seen.contains(&ItemKind::Shield));
    assert!(seen.contains(&ItemKind::Speed));
}

#[test]
fn set_stage_swaps_config_and_restarts_timers() {
    let table = table();
    let mut sched = SpawnScheduler::new(&table, 1).unwrap();
    let mut rng = seeded_rng();
    sched.update(0.75, &mut rng);

    sched.set_stage(&table, 2).unwrap();
    assert_eq!(sched.stage(), 2);
    assert_eq!(sched.config().meteor_interval, 2.0);

    // The 0.75 s from stage 1 does not carry over.
    assert!(sched.update(0.75, &mut rng).is_empty());
    assert_eq!(sched.update(0.75, &mut rng), vec![Spawn::Enemy]);
}

#[test]
fn set_stage_rejects_unknown_stage() {
    let table = table();
    let mut sched = SpawnScheduler::new(&table, 1).unwrap();
    let err = sched.set_stage(&table, 7).unwrap_err();
    assert!(matches!(err, GameError::UnknownStage(7)));
    assert_eq!(sched.stage(), 1);
    assert_eq!(sched.config().meteor_interval, 1.0);
}

#[test]
fn unknown_initial_stage_is_an_error() {
    assert!(SpawnScheduler::new(&table(), 0).is_err());
}
