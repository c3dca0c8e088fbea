//! Entity groups of one run and the operations that create or retire
//! entities.

use glam::Vec2;
use rand::Rng;
use tracing::debug;

use crate::assets::Assets;
use crate::audio::{ChannelPool, CueRequest};
use crate::boss::{Boss, BossShot};
use crate::config::{BossConfig, Tuning};
use crate::entities::{
    Body, Bullet, Drone, DroneSide, Enemy, Explosion, Item, ItemKind, LaserBeam, Meteor, Shield,
    SpeedFlame,
};
use crate::error::GameError;
use crate::geometry::Rect;
use crate::player::{Buffable, Player, WeaponModal, WeaponMode};
use crate::spawn::Spawn;

#[derive(Debug)]
pub struct World {
    pub field: Rect,
    pub player: Player,
    pub boss: Option<Boss>,
    pub enemies: Vec<Enemy>,
    pub meteors: Vec<Meteor>,
    pub items: Vec<Item>,
    pub bullets: Vec<Bullet>,
    pub boss_bullets: Vec<Bullet>,
    pub drones: Vec<Drone>,
    pub shields: Vec<Shield>,
    pub explosions: Vec<Explosion>,
    pub laser: Option<LaserBeam>,
    pub speed_flame: Option<SpeedFlame>,
}

impl World {
    /// Fresh groups: the hero and the opening sentry enemy.
    pub fn new(tuning: &Tuning, assets: &Assets) -> Result<Self, GameError> {
        Ok(Self {
            field: Rect {
                min: Vec2::ZERO,
                max: Vec2::new(tuning.screen_width, tuning.screen_height),
            },
            player: Player::new(tuning, &assets.hero)?,
            boss: None,
            enemies: vec![Enemy::sentry(tuning, &assets.enemy)?],
            meteors: Vec::new(),
            items: Vec::new(),
            bullets: Vec::new(),
            boss_bullets: Vec::new(),
            drones: Vec::new(),
            shields: Vec::new(),
            explosions: Vec::new(),
            laser: None,
            speed_flame: None,
        })
    }

    pub fn spawn(
        &mut self,
        spawn: Spawn,
        tuning: &Tuning,
        assets: &Assets,
        rng: &mut impl Rng,
    ) -> Result<(), GameError> {
        match spawn {
            Spawn::Meteor => self.meteors.push(Meteor::spawn(rng, tuning, &assets.meteor)?),
            Spawn::Enemy => self.enemies.push(Enemy::drifter(rng, tuning, &assets.enemy)?),
            Spawn::Item(kind) => {
                self.items
                    .push(Item::spawn(kind, rng, tuning, assets.item(kind)?)?);
            }
        }
        Ok(())
    }

    pub fn spawn_boss(
        &mut self,
        config: &BossConfig,
        tuning: &Tuning,
        assets: &Assets,
    ) -> Result<(), GameError> {
        let bullet_size = assets.boss_bullet[0].size;
        self.boss = Some(Boss::new(config, tuning, &assets.boss, bullet_size)?);
        Ok(())
    }

    pub fn fire_boss_volley(
        &mut self,
        shots: &[BossShot],
        tuning: &Tuning,
        assets: &Assets,
    ) -> Result<(), GameError> {
        for shot in shots {
            self.boss_bullets.push(Bullet::boss(
                shot.origin,
                shot.direction,
                tuning.boss_bullet_speed,
                &assets.boss_bullet,
            )?);
        }
        Ok(())
    }

    /// Cosmetic; silently skipped when there are no explosion frames.
    pub fn add_explosion(&mut self, at: Vec2, tuning: &Tuning, assets: &Assets) {
        let Some(frames) = assets.explosion.as_ref() else {
            return;
        };
        match Explosion::new(at, frames, tuning.explosion_frame_duration) {
            Ok(explosion) => self.explosions.push(explosion),
            Err(e) => debug!(error = %e, "explosion skipped"),
        }
    }

    pub fn attach_drone(&mut self, side: DroneSide, tuning: &Tuning, assets: &Assets) -> Result<(), GameError> {
        self.drones
            .push(Drone::new(side, self.player.center(), tuning, &assets.drone)?);
        self.player.loadout.drones += 1;
        Ok(())
    }

    pub fn attach_shield(&mut self, tuning: &Tuning, assets: &Assets) -> Result<(), GameError> {
        self.shields
            .push(Shield::new(self.player.center(), tuning, &assets.shield)?);
        self.player.loadout.shields += 1;
        Ok(())
    }

    /// Dispatch the single effect of a collected item.
    pub fn apply_item(&mut self, kind: ItemKind, tuning: &Tuning, assets: &Assets) -> Result<(), GameError> {
        match kind {
            ItemKind::Single => self.attach_drone(DroneSide::Right, tuning, assets)?,
            ItemKind::Double => {
                self.attach_drone(DroneSide::Left, tuning, assets)?;
                self.attach_drone(DroneSide::Right, tuning, assets)?;
            }
            ItemKind::Shield => self.attach_shield(tuning, assets)?,
            ItemKind::Speed => {
                self.player
                    .start_speed_boost(tuning.buff_duration, tuning.speed_multiplier);
                if self.speed_flame.is_none() {
                    self.speed_flame = Some(SpeedFlame::new(
                        &self.player.bounds(),
                        tuning.flame_overlap,
                        &assets.speed_flame,
                    )?);
                }
            }
            ItemKind::Laser => self.player.activate_weapon(WeaponMode::Laser, tuning.buff_duration),
            ItemKind::Buckshot => self.player.activate_weapon(WeaponMode::Spread, tuning.buff_duration),
        }
        Ok(())
    }

    /// Create the beam while the hero is in laser mode and alive; tear it
    /// down otherwise.
    pub fn sync_laser(&mut self, tuning: &Tuning, audio: &mut ChannelPool) {
        let wants_beam = self.player.is_alive() && self.player.weapon_mode() == WeaponMode::Laser;
        if !wants_beam {
            self.shut_down_laser(audio);
            return;
        }
        let hero = self.player.bounds();
        if let Some(beam) = self.laser.as_mut() {
            beam.follow(&hero);
            return;
        }
        let voice = audio.play(CueRequest::laser());
        self.laser = Some(LaserBeam::new(&hero, tuning.laser_width, voice));
    }

    pub fn shut_down_laser(&mut self, audio: &mut ChannelPool) {
        if let Some(mut beam) = self.laser.take() {
            beam.shut_down(audio);
        }
    }

    /// Escorts cannot outlive the hero.
    pub fn release_escorts(&mut self, audio: &mut ChannelPool) {
        self.drones.iter_mut().for_each(Body::kill);
        self.shields.iter_mut().for_each(Body::kill);
        self.speed_flame = None;
        self.shut_down_laser(audio);
    }

    /// Drop dead entities, keeping the loadout counters in step.
    pub fn reap(&mut self) {
        let drones = self.drones.len();
        self.drones.retain(Body::is_alive);
        let shields = self.shields.len();
        self.shields.retain(Body::is_alive);
        let loadout = &mut self.player.loadout;
        loadout.drones = loadout.drones.saturating_sub((drones - self.drones.len()) as u32);
        loadout.shields = loadout
            .shields
            .saturating_sub((shields - self.shields.len()) as u32);

        self.enemies.retain(Body::is_alive);
        self.meteors.retain(Body::is_alive);
        self.items.retain(Body::is_alive);
        self.bullets.retain(Body::is_alive);
        self.boss_bullets.retain(Body::is_alive);
        self.explosions.retain(Body::is_alive);
        if self.boss.as_ref().is_some_and(|b| !b.is_alive()) {
            self.boss = None;
        }
    }

    pub fn advance_explosions(&mut self, dt: f32) {
        for explosion in &mut self.explosions {
            explosion.update(dt);
        }
        self.explosions.retain(Body::is_alive);
    }
}
