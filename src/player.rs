//! The hero: inertial movement, timed buffs and weapon modes.

use glam::Vec2;

use crate::animation::{AnimationState, Animator, Frame, FrameSet};
use crate::config::Tuning;
use crate::entities::Body;
use crate::error::GameError;
use crate::geometry::Rect;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WeaponMode {
    #[default]
    Normal,
    /// Several bullets side by side per shot.
    Spread,
    /// Continuous beam instead of bullets.
    Laser,
}

/// Something that can take a timed speed boost.
pub trait Buffable {
    /// Boosts stack by keeping the larger remaining time and multiplier.
    fn start_speed_boost(&mut self, duration: f32, multiplier: f32);
    fn speed_multiplier(&self) -> f32;
}

/// Something with switchable, timed weapon modes.
pub trait WeaponModal {
    fn weapon_mode(&self) -> WeaponMode;
    fn activate_weapon(&mut self, mode: WeaponMode, duration: f32);
}

/// Escorts currently attached to the hero, for the HUD.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Loadout {
    pub drones: u32,
    pub shields: u32,
}

/// Buffs that ran out during one update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuffExpiry {
    pub speed: bool,
    /// The mode that was active before reverting to normal.
    pub weapon: Option<WeaponMode>,
}

/// Bullet origins produced by one trigger pull.
#[derive(Clone, Debug, PartialEq)]
pub struct Volley {
    pub mode: WeaponMode,
    pub origins: Vec<Vec2>,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub loadout: Loadout,
    acceleration: f32,
    drag: f32,
    base_max_speed: f32,
    speed_multiplier: f32,
    speed_boost_time: f32,
    weapon_mode: WeaponMode,
    weapon_time: f32,
    cooldown: f32,
    fire_interval: f32,
    spread_offsets: Vec<f32>,
    animator: Animator,
    alive: bool,
}

impl Player {
    pub const FRAME_DURATION: f32 = 0.08;

    /// Centered horizontally, `hero_spawn_lift` above the bottom edge.
    pub fn new(tuning: &Tuning, frames: &FrameSet) -> Result<Self, GameError> {
        let state = AnimationState::looping(frames.clone(), Self::FRAME_DURATION)?;
        let animator = Animator::single(state);
        let h = animator.size().y;
        Ok(Self {
            pos: Vec2::new(
                tuning.screen_width * 0.5,
                tuning.screen_height - tuning.hero_spawn_lift - h * 0.5,
            ),
            velocity: Vec2::ZERO,
            loadout: Loadout::default(),
            acceleration: tuning.hero_acceleration,
            drag: tuning.hero_drag,
            base_max_speed: tuning.hero_max_speed,
            speed_multiplier: 1.0,
            speed_boost_time: 0.0,
            weapon_mode: WeaponMode::Normal,
            weapon_time: 0.0,
            cooldown: 0.0,
            fire_interval: tuning.bullet_cooldown,
            spread_offsets: tuning.spread_offsets.clone(),
            animator,
            alive: true,
        })
    }

    pub fn max_speed(&self) -> f32 {
        self.base_max_speed * self.speed_multiplier
    }

    pub fn speed_boost_remaining(&self) -> f32 {
        self.speed_boost_time.max(0.0)
    }

    pub fn weapon_remaining(&self) -> f32 {
        self.weapon_time.max(0.0)
    }

    /// Count timed buffs down and revert the ones that ran out.
    pub fn tick_buffs(&mut self, dt: f32) -> BuffExpiry {
        let mut expiry = BuffExpiry::default();

        if self.speed_boost_time > 0.0 {
            self.speed_boost_time -= dt;
            if self.speed_boost_time <= 0.0 {
                self.speed_boost_time = 0.0;
                self.speed_multiplier = 1.0;
                expiry.speed = true;
            }
        }

        if self.weapon_mode != WeaponMode::Normal {
            self.weapon_time -= dt;
            if self.weapon_time <= 0.0 {
                expiry.weapon = Some(self.weapon_mode);
                self.weapon_time = 0.0;
                self.weapon_mode = WeaponMode::Normal;
            }
        }
        expiry
    }

    /// Accelerate along `direction`, or coast to a stop under drag when it
    /// is zero; then keep the hero inside `field`.
    pub fn apply_movement(&mut self, dt: f32, direction: Vec2, field: &Rect) {
        match direction.try_normalize() {
            Some(dir) => self.velocity += dir * self.acceleration * dt,
            None => {
                let speed = self.velocity.length();
                if speed > 0.0 {
                    let slowed = (speed - self.drag * dt).max(0.0);
                    self.velocity = if slowed == 0.0 {
                        Vec2::ZERO
                    } else {
                        self.velocity * (slowed / speed)
                    };
                }
            }
        }
        self.velocity = self.velocity.clamp_length_max(self.max_speed());
        self.pos += self.velocity * dt;

        let bounds = self.bounds();
        let clamped = bounds.clamped_within(field);
        if clamped.min.x != bounds.min.x {
            self.velocity.x = 0.0;
        }
        if clamped.min.y != bounds.min.y {
            self.velocity.y = 0.0;
        }
        self.pos = clamped.center();
    }

    /// Buffs, then movement, then animation.
    pub fn update(&mut self, dt: f32, direction: Vec2, field: &Rect) -> BuffExpiry {
        let expiry = self.tick_buffs(dt);
        self.apply_movement(dt, direction, field);
        self.animator.advance(dt);
        expiry
    }

    /// Count the cooldown down and fire if `held` and ready.  The laser
    /// never produces bullets.
    pub fn trigger(&mut self, dt: f32, held: bool) -> Option<Volley> {
        self.cooldown -= dt;
        if !held || self.cooldown > 0.0 || !self.alive {
            return None;
        }
        let nose = self.bounds().midtop();
        let origins = match self.weapon_mode {
            WeaponMode::Laser => return None,
            WeaponMode::Normal => vec![nose],
            WeaponMode::Spread => self
                .spread_offsets
                .iter()
                .map(|dx| Vec2::new(nose.x + dx, nose.y))
                .collect(),
        };
        self.cooldown = self.fire_interval;
        Some(Volley {
            mode: self.weapon_mode,
            origins,
        })
    }
}

impl Buffable for Player {
    fn start_speed_boost(&mut self, duration: f32, multiplier: f32) {
        self.speed_boost_time = self.speed_boost_time.max(duration);
        self.speed_multiplier = self.speed_multiplier.max(multiplier);
    }

    fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }
}

impl WeaponModal for Player {
    fn weapon_mode(&self) -> WeaponMode {
        self.weapon_mode
    }

    fn activate_weapon(&mut self, mode: WeaponMode, duration: f32) {
        if mode == WeaponMode::Normal {
            self.weapon_mode = WeaponMode::Normal;
            self.weapon_time = 0.0;
            return;
        }
        self.weapon_mode = mode;
        self.weapon_time = self.weapon_time.max(duration);
    }
}

impl Body for Player {
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
