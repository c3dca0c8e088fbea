//! Game entities other than the player and the boss.
//!
//! Every entity is positioned by its logical center and owns an
//! [`Animator`]; rectangles come from the current frame size.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use rand::Rng;

use crate::animation::{AnimationState, Animator, Frame, FrameSet, Playback};
use crate::audio::{ChannelPool, Voice};
use crate::config::Tuning;
use crate::error::GameError;
use crate::geometry::{Mask, Rect};

// ── Shared behaviour ─────────────────────────────────────────────────────────

/// Anything that takes part in collisions.
pub trait Body {
    fn center(&self) -> Vec2;
    fn frame(&self) -> &Frame;
    fn is_alive(&self) -> bool;
    fn kill(&mut self);

    fn bounds(&self) -> Rect {
        Rect::from_center(self.center(), self.frame().size)
    }

    /// Bounding-circle radius: half the larger frame dimension.
    fn radius(&self) -> f32 {
        let size = self.frame().size;
        size.x.max(size.y) * 0.5
    }

    fn mask(&self) -> &Mask {
        &self.frame().mask
    }
}

macro_rules! animated_body {
    ($ty:ty) => {
        impl Body for $ty {
            fn center(&self) -> Vec2 {
                self.pos
            }

            fn frame(&self) -> &Frame {
                self.animator.frame()
            }

            fn is_alive(&self) -> bool {
                self.alive
            }

            fn kill(&mut self) {
                self.alive = false;
            }
        }
    };
}

/// True once `rect` is entirely outside `field`.
fn off_field(rect: &Rect, field: &Rect) -> bool {
    rect.bottom() < field.top()
        || rect.top() > field.bottom()
        || rect.right() < field.left()
        || rect.left() > field.right()
}

/// Random x for something entering from the top edge, keeping `margin`
/// clear of both sides.  Too-narrow fields spawn at the middle.
fn spawn_x(rng: &mut impl Rng, tuning: &Tuning, width: f32) -> f32 {
    let lo = tuning.spawn_margin_x + width * 0.5;
    let hi = tuning.screen_width - tuning.spawn_margin_x - width * 0.5;
    if lo < hi {
        rng.gen_range(lo..=hi).round()
    } else {
        tuning.screen_width * 0.5
    }
}

// ── Run status ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Menu,
    Playing,
    Paused,
    /// Asking whether to abandon the run from the pause screen.
    ConfirmQuit,
    GameOver,
    Win,
}

// ── Items ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKind {
    /// One escort drone.
    Single,
    /// Two escort drones.
    Double,
    Shield,
    Speed,
    Laser,
    /// Spread volley.
    Buckshot,
}

impl ItemKind {
    pub const ALL: [ItemKind; 6] = [
        ItemKind::Single,
        ItemKind::Double,
        ItemKind::Shield,
        ItemKind::Speed,
        ItemKind::Laser,
        ItemKind::Buckshot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Single => "single",
            ItemKind::Double => "double",
            ItemKind::Shield => "shield",
            ItemKind::Speed => "speed",
            ItemKind::Laser => "laser",
            ItemKind::Buckshot => "buckshot",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ItemKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ItemKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| GameError::UnknownItemKind(s.to_string()))
    }
}

#[derive(Clone, Debug)]
pub struct Item {
    pub pos: Vec2,
    pub kind: ItemKind,
    pub speed: f32,
    animator: Animator,
    alive: bool,
}

impl Item {
    pub const FRAME_DURATION: f32 = 0.12;

    pub fn new(kind: ItemKind, pos: Vec2, speed: f32, frames: &FrameSet) -> Result<Self, GameError> {
        let state = AnimationState::looping(frames.clone(), Self::FRAME_DURATION)?;
        Ok(Self {
            pos,
            kind,
            speed,
            animator: Animator::single(state),
            alive: true,
        })
    }

    /// Drop in just above the top edge at a random column.
    pub fn spawn(
        kind: ItemKind,
        rng: &mut impl Rng,
        tuning: &Tuning,
        frames: &FrameSet,
    ) -> Result<Self, GameError> {
        let mut item = Self::new(kind, Vec2::ZERO, tuning.item_fall_speed, frames)?;
        let size = item.animator.size();
        item.pos = Vec2::new(spawn_x(rng, tuning, size.x), -size.y * 0.5);
        Ok(item)
    }

    pub fn update(&mut self, dt: f32, field: &Rect) {
        self.pos.y += self.speed * dt;
        if self.bounds().top() > field.bottom() {
            self.alive = false;
        }
        self.animator.advance(dt);
    }
}

animated_body!(Item);

// ── Projectiles ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletOwner {
    Player,
    Boss,
}

#[derive(Clone, Debug)]
pub struct Bullet {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub owner: BulletOwner,
    animator: Animator,
    alive: bool,
}

impl Bullet {
    pub const FRAME_DURATION: f32 = 0.06;

    /// Straight-up player shot.
    pub fn player(pos: Vec2, speed: f32, frames: &FrameSet) -> Result<Self, GameError> {
        Self::new(pos, Vec2::new(0.0, -speed), BulletOwner::Player, frames)
    }

    /// Boss shot travelling along `direction` (normalised; zero aims down).
    pub fn boss(pos: Vec2, direction: Vec2, speed: f32, frames: &FrameSet) -> Result<Self, GameError> {
        let dir = direction.try_normalize().unwrap_or(Vec2::Y);
        Self::new(pos, dir * speed, BulletOwner::Boss, frames)
    }

    fn new(pos: Vec2, velocity: Vec2, owner: BulletOwner, frames: &FrameSet) -> Result<Self, GameError> {
        let state = AnimationState::looping(frames.clone(), Self::FRAME_DURATION)?;
        Ok(Self {
            pos,
            velocity,
            owner,
            animator: Animator::single(state),
            alive: true,
        })
    }

    pub fn update(&mut self, dt: f32, field: &Rect) {
        self.pos += self.velocity * dt;
        if off_field(&self.bounds(), field) {
            self.alive = false;
        }
        self.animator.advance(dt);
    }
}

animated_body!(Bullet);

/// The laser weapon: a column rising from the hero's nose to the top edge.
/// It holds the looping sound voice and releases it exactly once.
#[derive(Debug)]
pub struct LaserBeam {
    pub pos: Vec2,
    frame: Frame,
    voice: Option<Voice>,
    alive: bool,
}

impl LaserBeam {
    pub fn new(hero: &Rect, width: f32, voice: Option<Voice>) -> Self {
        let mut beam = Self {
            pos: Vec2::ZERO,
            frame: Frame::new(Mask::filled(width.max(1.0) as u32, 1)),
            voice,
            alive: true,
        };
        beam.follow(hero);
        beam
    }

    /// Span from the top edge of the screen down to the hero's nose.
    pub fn follow(&mut self, hero: &Rect) {
        let height = hero.top().floor().max(1.0);
        if height != self.frame.size.y {
            self.frame = Frame::new(Mask::filled(self.frame.mask.width(), height as u32));
        }
        self.pos = Vec2::new(hero.center().x, hero.top() - height * 0.5);
    }

    pub fn voice(&self) -> Option<Voice> {
        self.voice
    }

    /// Stop the sound (once) and mark the beam dead.
    pub fn shut_down(&mut self, audio: &mut ChannelPool) {
        if let Some(voice) = self.voice.take() {
            audio.stop(voice);
        }
        self.alive = false;
    }
}

impl Body for LaserBeam {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn frame(&self) -> &Frame {
        &self.frame
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn kill(&mut self) {
        self.alive = false;
    }
}

// ── Hazards ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Meteor {
    pub pos: Vec2,
    pub speed: f32,
    animator: Animator,
    alive: bool,
}

impl Meteor {
    pub const FRAME_DURATION: f32 = 0.08;

    pub fn new(pos: Vec2, speed: f32, frames: &FrameSet) -> Result<Self, GameError> {
        let state = AnimationState::looping(frames.clone(), Self::FRAME_DURATION)?;
        Ok(Self {
            pos,
            speed,
            animator: Animator::single(state),
            alive: true,
        })
    }

    pub fn spawn(rng: &mut impl Rng, tuning: &Tuning, frames: &FrameSet) -> Result<Self, GameError> {
        let mut meteor = Self::new(Vec2::ZERO, tuning.meteor_speed, frames)?;
        let size = meteor.animator.size();
        meteor.pos = Vec2::new(spawn_x(rng, tuning, size.x), -size.y * 0.5);
        Ok(meteor)
    }

    pub fn update(&mut self, dt: f32, field: &Rect) {
        self.pos.y += self.speed * dt;
        if self.bounds().top() > field.bottom() {
            self.alive = false;
        }
        self.animator.advance(dt);
    }
}

animated_body!(Meteor);

#[derive(Clone, Debug)]
pub struct Enemy {
    pub pos: Vec2,
    pub velocity: Vec2,
    animator: Animator,
    alive: bool,
}

impl Enemy {
    pub const FRAME_DURATION: f32 = 0.1;

    pub fn new(pos: Vec2, velocity: Vec2, frames: &FrameSet) -> Result<Self, GameError> {
        let state = AnimationState::looping(frames.clone(), Self::FRAME_DURATION)?;
        Ok(Self {
            pos,
            velocity,
            animator: Animator::single(state),
            alive: true,
        })
    }

    /// The sentry that opens every run: parked at the top, centered.
    pub fn sentry(tuning: &Tuning, frames: &FrameSet) -> Result<Self, GameError> {
        let mut enemy = Self::new(Vec2::ZERO, Vec2::ZERO, frames)?;
        let h = enemy.animator.size().y;
        enemy.pos = Vec2::new(tuning.screen_width * 0.5, tuning.enemy_row + h * 0.5);
        Ok(enemy)
    }

    /// A drifter entering from the top edge.
    pub fn drifter(rng: &mut impl Rng, tuning: &Tuning, frames: &FrameSet) -> Result<Self, GameError> {
        let mut enemy = Self::new(Vec2::ZERO, Vec2::new(0.0, tuning.enemy_drift_speed), frames)?;
        let size = enemy.animator.size();
        enemy.pos = Vec2::new(spawn_x(rng, tuning, size.x), -size.y * 0.5);
        Ok(enemy)
    }

    pub fn update(&mut self, dt: f32, field: &Rect) {
        self.pos += self.velocity * dt;
        if self.bounds().top() > field.bottom() {
            self.alive = false;
        }
        self.animator.advance(dt);
    }
}

animated_body!(Enemy);

// ── Effects ──────────────────────────────────────────────────────────────────

/// One-shot blast; removes itself after its last frame.
#[derive(Clone, Debug)]
pub struct Explosion {
    pub pos: Vec2,
    animator: Animator,
    alive: bool,
}

impl Explosion {
    pub fn new(pos: Vec2, frames: &FrameSet, frame_duration: f32) -> Result<Self, GameError> {
        let state = AnimationState::one_shot(frames.clone(), frame_duration)?;
        Ok(Self {
            pos,
            animator: Animator::single(state),
            alive: true,
        })
    }

    pub fn frame_index(&self) -> usize {
        self.animator.index()
    }

    pub fn update(&mut self, dt: f32) {
        if self.animator.advance(dt) == Playback::Expired {
            self.alive = false;
        }
    }
}

animated_body!(Explosion);

/// Exhaust flame shown under the hero during a speed boost.
#[derive(Clone, Debug)]
pub struct SpeedFlame {
    pub pos: Vec2,
    animator: Animator,
    alive: bool,
}

impl SpeedFlame {
    pub const FRAME_DURATION: f32 = 0.08;

    pub fn new(hero: &Rect, overlap: f32, frames: &FrameSet) -> Result<Self, GameError> {
        let state = AnimationState::looping(frames.clone(), Self::FRAME_DURATION)?;
        let mut flame = Self {
            pos: Vec2::ZERO,
            animator: Animator::single(state),
            alive: true,
        };
        flame.follow(hero, overlap);
        Ok(flame)
    }

    /// Top edge sits `overlap` pixels above the hero's bottom edge.
    pub fn follow(&mut self, hero: &Rect, overlap: f32) {
        let h = self.animator.size().y;
        self.pos = Vec2::new(hero.center().x, hero.bottom() - overlap + h * 0.5);
    }

    pub fn update(&mut self, dt: f32, hero: &Rect, overlap: f32) {
        self.follow(hero, overlap);
        self.animator.advance(dt);
    }
}

animated_body!(SpeedFlame);

// ── Escorts ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DroneSide {
    Left,
    Right,
}

impl DroneSide {
    fn sign(self) -> f32 {
        match self {
            DroneSide::Left => -1.0,
            DroneSide::Right => 1.0,
        }
    }
}

/// Escort that flies beside the hero and fires on its own timer.
#[derive(Clone, Debug)]
pub struct Drone {
    pub pos: Vec2,
    pub side: DroneSide,
    fire_cooldown: f32,
    lifetime: f32,
    animator: Animator,
    alive: bool,
}

impl Drone {
    pub const FRAME_DURATION: f32 = 0.08;

    pub fn new(
        side: DroneSide,
        hero_center: Vec2,
        tuning: &Tuning,
        frames: &FrameSet,
    ) -> Result<Self, GameError> {
        let state = AnimationState::looping(frames.clone(), Self::FRAME_DURATION)?;
        let mut drone = Self {
            pos: Vec2::ZERO,
            side,
            fire_cooldown: 0.0,
            lifetime: tuning.drone_lifetime,
            animator: Animator::single(state),
            alive: true,
        };
        drone.follow(hero_center, tuning.drone_offset);
        Ok(drone)
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    fn follow(&mut self, hero_center: Vec2, offset: Vec2) {
        self.pos = hero_center + Vec2::new(offset.x * self.side.sign(), offset.y);
    }

    /// Age, follow and maybe fire.  Returns a bullet when the fire timer
    /// comes round.
    pub fn update(
        &mut self,
        dt: f32,
        hero_center: Vec2,
        tuning: &Tuning,
        bullet_frames: &FrameSet,
    ) -> Result<Option<Bullet>, GameError> {
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.alive = false;
            return Ok(None);
        }
        self.follow(hero_center, tuning.drone_offset);
        self.animator.advance(dt);

        self.fire_cooldown -= dt;
        if self.fire_cooldown > 0.0 {
            return Ok(None);
        }
        self.fire_cooldown = tuning.drone_fire_interval;
        let nose = Vec2::new(self.pos.x, self.bounds().top());
        Bullet::player(nose, tuning.bullet_speed, bullet_frames).map(Some)
    }
}

animated_body!(Drone);

/// Ring that surrounds the hero and absorbs hits until its HP or lifetime
/// runs out.
#[derive(Clone, Debug)]
pub struct Shield {
    pub pos: Vec2,
    hp: i32,
    lifetime: f32,
    animator: Animator,
    alive: bool,
}

impl Shield {
    pub const FRAME_DURATION: f32 = 0.08;

    pub fn new(hero_center: Vec2, tuning: &Tuning, frames: &FrameSet) -> Result<Self, GameError> {
        let state = AnimationState::looping(frames.clone(), Self::FRAME_DURATION)?;
        Ok(Self {
            pos: hero_center,
            hp: tuning.shield_max_hp,
            lifetime: tuning.shield_lifetime,
            animator: Animator::single(state),
            alive: true,
        })
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    /// Every hit counts, even past zero.
    pub fn take_hit(&mut self, damage: i32) {
        self.hp -= damage;
        if self.hp <= 0 {
            self.alive = false;
        }
    }

    pub fn update(&mut self, dt: f32, hero_center: Vec2) {
        self.pos = hero_center;
        self.animator.advance(dt);
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.alive = false;
        }
    }
}

animated_body!(Shield);
