use approx::assert_relative_eq;
use glam::Vec2;
use space_shooter::assets::Assets;
use space_shooter::config::Tuning;
use space_shooter::entities::Body;
use space_shooter::geometry::Rect;
use space_shooter::player::*;

fn field(t: &Tuning) -> Rect {
    Rect { min: Vec2::ZERO, max: Vec2::new(t.screen_width, t.screen_height) }
}

fn make_player() -> (Player, Tuning) {
    let tuning = Tuning::default();
    let assets = Assets::procedural();
    (Player::new(&tuning, &assets.hero).unwrap(), tuning)
}

// ── Spawn ─────────────────────────────────────────────────────────────────────

#[test]
fn spawns_centered_above_bottom_edge() {
    let (p, t) = make_player();
    assert_eq!(p.pos.x, t.screen_width / 2.0);
    assert_relative_eq!(p.bounds().bottom(), t.screen_height - t.hero_spawn_lift);
    assert_eq!(p.velocity, Vec2::ZERO);
    assert!(p.is_alive());
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[test]
fn acceleration_builds_velocity() {
    let (mut p, t) = make_player();
    let start = p.pos;
    p.apply_movement(0.1, Vec2::X, &field(&t));
    assert_relative_eq!(p.velocity.x, 120.0);
    assert_relative_eq!(p.pos.x, start.x + 12.0);
    assert_eq!(p.pos.y, start.y);
}

#[test]
fn diagonal_input_is_normalised() {
    let (mut p, t) = make_player();
    p.apply_movement(0.1, Vec2::new(1.0, -1.0), &field(&t));
    assert_relative_eq!(p.velocity.length(), 120.0, epsilon = 1e-3);
}

#[test]
fn speed_never_exceeds_max() {
    let (mut p, t) = make_player();
    for _ in 0..20 {
        p.apply_movement(0.1, Vec2::NEG_Y, &field(&t));
        assert!(p.velocity.length() <= p.max_speed() + 1e-3);
    }
}

#[test]
fn drag_reaches_exactly_zero() {
    let (mut p, t) = make_player();
    p.velocity = Vec2::new(100.0, 0.0);
    p.apply_movement(0.2, Vec2::ZERO, &field(&t));
    assert_eq!(p.velocity, Vec2::ZERO);

    // And never reverses.
    p.apply_movement(0.2, Vec2::ZERO, &field(&t));
    assert_eq!(p.velocity, Vec2::ZERO);
}

#[test]
fn drag_preserves_direction() {
    let (mut p, t) = make_player();
    p.velocity = Vec2::new(300.0, -400.0);
    p.apply_movement(0.1, Vec2::ZERO, &field(&t));
    assert_relative_eq!(p.velocity.x, 246.0, epsilon = 1e-3);
    assert_relative_eq!(p.velocity.y, -328.0, epsilon = 1e-3);
}

#[test]
fn clamped_to_field_and_wall_velocity_zeroed() {
    let (mut p, t) = make_player();
    p.pos.x = 30.0;
    p.velocity = Vec2::new(-500.0, 0.0);
    p.apply_movement(0.1, Vec2::NEG_X, &field(&t));
    assert_eq!(p.bounds().left(), 0.0);
    assert_eq!(p.velocity.x, 0.0);
}

// ── Buffs ─────────────────────────────────────────────────────────────────────

#[test]
fn speed_boost_raises_cap_then_expires() {
    let (mut p, t) = make_player();
    p.start_speed_boost(5.0, 1.5);
    assert_relative_eq!(p.max_speed(), t.hero_max_speed * 1.5);

    let expiry = p.tick_buffs(4.0);
    assert!(!expiry.speed);
    let expiry = p.tick_buffs(1.0);
    assert!(expiry.speed);
    assert_eq!(p.speed_multiplier(), 1.0);
    assert_relative_eq!(p.max_speed(), t.hero_max_speed);
}

#[test]
fn speed_boosts_keep_the_larger_values() {
    let (mut p, _) = make_player();
    p.start_speed_boost(5.0, 1.5);
    p.start_speed_boost(2.0, 1.2);
    assert_eq!(p.speed_multiplier(), 1.5);
    assert_eq!(p.speed_boost_remaining(), 5.0);
}

#[test]
fn weapon_mode_reverts_after_duration() {
    let (mut p, _) = make_player();
    p.activate_weapon(WeaponMode::Laser, 5.0);
    assert_eq!(p.weapon_mode(), WeaponMode::Laser);

    let expiry = p.tick_buffs(5.0);
    assert_eq!(expiry.weapon, Some(WeaponMode::Laser));
    assert_eq!(p.weapon_mode(), WeaponMode::Normal);

    // Nothing left to expire.
    assert_eq!(p.tick_buffs(1.0), BuffExpiry::default());
}

#[test]
fn activating_normal_cancels_timer() {
    let (mut p, _) = make_player();
    p.activate_weapon(WeaponMode::Spread, 5.0);
    p.activate_weapon(WeaponMode::Normal, 5.0);
    assert_eq!(p.weapon_mode(), WeaponMode::Normal);
    assert_eq!(p.weapon_remaining(), 0.0);
}

// ── Firing ────────────────────────────────────────────────────────────────────

#[test]
fn trigger_respects_cooldown() {
    let (mut p, _) = make_player();
    let volley = p.trigger(0.0, true).expect("first shot fires");
    assert_eq!(volley.mode, WeaponMode::Normal);
    assert_eq!(volley.origins, vec![p.bounds().midtop()]);

    assert!(p.trigger(0.1, true).is_none());
    assert!(p.trigger(0.2, false).is_none());
    assert!(p.trigger(0.3, true).is_some());
}

#[test]
fn spread_volley_uses_offsets() {
    let (mut p, t) = make_player();
    p.activate_weapon(WeaponMode::Spread, 5.0);
    let volley = p.trigger(0.0, true).unwrap();
    let nose = p.bounds().midtop();
    let xs: Vec<f32> = volley.origins.iter().map(|o| o.x - nose.x).collect();
    assert_eq!(xs, t.spread_offsets);
}

#[test]
fn laser_mode_fires_no_bullets() {
    let (mut p, _) = make_player();
    p.activate_weapon(WeaponMode::Laser, 5.0);
    assert!(p.trigger(1.0, true).is_none());
}

#[test]
fn dead_player_cannot_fire() {
    let (mut p, _) = make_player();
    p.kill();
    assert!(p.trigger(1.0, true).is_none());
}
