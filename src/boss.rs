//! Stage boss: patrol, aimed volleys and damage.

use glam::Vec2;

use crate::animation::{AnimationState, Animator, Frame, FrameSet};
use crate::config::{BossConfig, Tuning};
use crate::entities::Body;
use crate::error::GameError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossPhase {
    /// Boss stage, appearance time not reached yet (or a stage without one).
    Pending,
    Active,
    Dead,
}

/// One bullet of a volley: spawn point and unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossShot {
    pub origin: Vec2,
    pub direction: Vec2,
}

/// Vertical offsets of `pairs` bullet pairs, centered on zero and
/// `spacing` apart.
pub fn volley_offsets(pairs: u32, spacing: f32) -> Vec<f32> {
    if pairs == 0 {
        return Vec::new();
    }
    let span = (pairs - 1) as f32 * spacing;
    (0..pairs).map(|i| -span * 0.5 + i as f32 * spacing).collect()
}

#[derive(Clone, Debug)]
pub struct Boss {
    pub pos: Vec2,
    hp: u32,
    max_hp: u32,
    speed: f32,
    direction: f32,
    fire_interval: f32,
    fire_timer: f32,
    bullet_pairs: u32,
    pair_spacing: f32,
    animator: Animator,
    alive: bool,
}

impl Boss {
    pub const FRAME_DURATION: f32 = 0.1;

    /// Top edge at `boss_top`, centered, heading right.  The first volley
    /// comes one full `fire_interval` after this.
    pub fn new(
        config: &BossConfig,
        tuning: &Tuning,
        frames: &FrameSet,
        bullet_size: Vec2,
    ) -> Result<Self, GameError> {
        let state = AnimationState::looping(frames.clone(), Self::FRAME_DURATION)?;
        let animator = Animator::single(state);
        let h = animator.size().y;
        let min_spacing = 2.0 * bullet_size.x.max(bullet_size.y);
        Ok(Self {
            pos: Vec2::new(tuning.screen_width * 0.5, tuning.boss_top + h * 0.5),
            hp: config.max_hp.max(1),
            max_hp: config.max_hp.max(1),
            speed: tuning.boss_speed,
            direction: 1.0,
            fire_interval: config.fire_interval,
            fire_timer: config.fire_interval,
            bullet_pairs: config.bullet_pairs,
            pair_spacing: tuning.boss_pair_spacing.max(min_spacing),
            animator,
            alive: true,
        })
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn pair_spacing(&self) -> f32 {
        self.pair_spacing
    }

    /// Subtract `amount` HP (not below zero).  True only on the call that
    /// brings HP to zero; the boss is dead afterwards.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.alive {
            return false;
        }
        self.hp = self.hp.saturating_sub(amount);
        if self.hp == 0 {
            self.alive = false;
            return true;
        }
        false
    }

    /// Patrol horizontally, bouncing off the edges of a `width`-wide field.
    pub fn patrol(&mut self, dt: f32, width: f32) {
        self.pos.x += self.direction * self.speed * dt;
        let half = self.animator.size().x * 0.5;
        if self.pos.x - half < 0.0 {
            self.pos.x = half;
            self.direction = 1.0;
        } else if self.pos.x + half > width {
            self.pos.x = width - half;
            self.direction = -1.0;
        }
    }

    /// Run the fire timer; on expiry, reset it and return a volley aimed at
    /// `target`.
    pub fn tick_fire(&mut self, dt: f32, target: Vec2) -> Option<Vec<BossShot>> {
        if !self.alive {
            return None;
        }
        self.fire_timer -= dt;
        if self.fire_timer > 0.0 {
            return None;
        }
        self.fire_timer = self.fire_interval;
        Some(self.volley(target))
    }

    /// `2 * bullet_pairs` shots from the left and right edges, each aimed
    /// at `target` from its own origin.
    pub fn volley(&self, target: Vec2) -> Vec<BossShot> {
        let bounds = self.bounds();
        let mut shots = Vec::with_capacity(self.bullet_pairs as usize * 2);
        for dy in volley_offsets(self.bullet_pairs, self.pair_spacing) {
            let y = self.pos.y + dy;
            for x in [bounds.left(), bounds.right()] {
                let origin = Vec2::new(x, y);
                let direction = (target - origin).try_normalize().unwrap_or(Vec2::Y);
                shots.push(BossShot { origin, direction });
            }
        }
        shots
    }

    pub fn update(&mut self, dt: f32, width: f32, target: Vec2) -> Option<Vec<BossShot>> {
        self.patrol(dt, width);
        self.animator.advance(dt);
        self.tick_fire(dt, target)
    }
}

impl Body for Boss {
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
