use approx::assert_relative_eq;
use glam::Vec2;
use space_shooter::assets::Assets;
use space_shooter::boss::*;
use space_shooter::config::{BossConfig, Tuning};
use space_shooter::entities::Body;

fn make_boss(max_hp: u32, fire_interval: f32, bullet_pairs: u32) -> (Boss, Tuning, Vec2) {
    let tuning = Tuning::default();
    let assets = Assets::procedural();
    let bullet_size = assets.boss_bullet[0].size;
    let config = BossConfig { max_hp, fire_interval, bullet_pairs };
    let boss = Boss::new(&config, &tuning, &assets.boss, bullet_size).unwrap();
    (boss, tuning, bullet_size)
}

// ── Damage ────────────────────────────────────────────────────────────────────

#[test]
fn take_damage_reports_death_exactly_once() {
    let (mut boss, _, _) = make_boss(3, 5.0, 1);
    assert!(!boss.take_damage(1));
    assert!(!boss.take_damage(1));
    assert!(boss.take_damage(1));
    assert_eq!(boss.hp(), 0);
    assert!(!boss.is_alive());

    assert!(!boss.take_damage(1));
    assert_eq!(boss.hp(), 0);
}

#[test]
fn overkill_stops_at_zero() {
    let (mut boss, _, _) = make_boss(3, 5.0, 1);
    assert!(boss.take_damage(10));
    assert_eq!(boss.hp(), 0);
}

#[test]
fn zero_damage_changes_nothing() {
    let (mut boss, _, _) = make_boss(3, 5.0, 1);
    assert!(!boss.take_damage(0));
    assert_eq!(boss.hp(), 3);
    assert_eq!(boss.max_hp(), 3);
}

// ── Patrol ────────────────────────────────────────────────────────────────────

#[test]
fn spawns_centered_at_boss_row() {
    let (boss, t, _) = make_boss(10, 5.0, 1);
    assert_eq!(boss.pos.x, t.screen_width / 2.0);
    assert_relative_eq!(boss.bounds().top(), t.boss_top);
}

#[test]
fn patrol_flips_at_right_edge() {
    let (mut boss, t, _) = make_boss(10, 5.0, 1);
    let half = boss.bounds().width() / 2.0;
    boss.pos.x = t.screen_width - half - 1.0;
    boss.patrol(0.1, t.screen_width);
    assert_eq!(boss.bounds().right(), t.screen_width);
    assert_eq!(boss.direction(), -1.0);

    boss.patrol(0.1, t.screen_width);
    assert!(boss.bounds().right() < t.screen_width);
}

#[test]
fn patrol_flips_at_left_edge() {
    let (mut boss, t, _) = make_boss(10, 5.0, 1);
    let half = boss.bounds().width() / 2.0;
    boss.pos.x = t.screen_width - half - 1.0;
    boss.patrol(0.1, t.screen_width);
    boss.pos.x = half + 1.0;
    boss.patrol(0.1, t.screen_width);
    assert_eq!(boss.bounds().left(), 0.0);
    assert_eq!(boss.direction(), 1.0);
}

// ── Volleys ───────────────────────────────────────────────────────────────────

#[test]
fn first_volley_after_full_interval() {
    let (mut boss, _, _) = make_boss(10, 2.0, 1);
    let target = Vec2::new(300.0, 700.0);
    assert!(boss.tick_fire(1.0, target).is_none());
    assert!(boss.tick_fire(1.0, target).is_some());
    assert!(boss.tick_fire(1.0, target).is_none());
}

#[test]
fn single_pair_is_centered() {
    assert_eq!(volley_offsets(1, 40.0), vec![0.0]);
    assert!(volley_offsets(0, 40.0).is_empty());
}

#[test]
fn volley_has_two_bullets_per_pair_symmetric() {
    for pairs in 1..=4 {
        let (boss, _, bullet) = make_boss(10, 2.0, pairs);
        let shots = boss.volley(Vec2::new(300.0, 700.0));
        assert_eq!(shots.len(), 2 * pairs as usize);

        let mut ys: Vec<f32> = shots.iter().map(|s| s.origin.y - boss.pos.y).collect();
        ys.sort_by(f32::total_cmp);
        ys.dedup();
        assert_eq!(ys.len(), pairs as usize);
        let sum: f32 = ys.iter().sum();
        assert_relative_eq!(sum, 0.0, epsilon = 1e-3);

        let min_spacing = 2.0 * bullet.x.max(bullet.y);
        for w in ys.windows(2) {
            assert!(w[1] - w[0] >= min_spacing - 1e-3);
        }
    }
}

#[test]
fn volley_fires_from_both_edges_at_target() {
    let (boss, _, _) = make_boss(10, 2.0, 2);
    let target = Vec2::new(100.0, 700.0);
    let bounds = boss.bounds();
    for shot in boss.volley(target) {
        assert!(shot.origin.x == bounds.left() || shot.origin.x == bounds.right());
        let expected = (target - shot.origin).normalize();
        assert_relative_eq!(shot.direction.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(shot.direction.y, expected.y, epsilon = 1e-5);
    }
}

#[test]
fn dead_boss_stops_firing() {
    let (mut boss, _, _) = make_boss(1, 0.5, 1);
    boss.take_damage(1);
    assert!(boss.tick_fire(1.0, Vec2::ZERO).is_none());
}
