/// The run state machine and the per-frame simulation step.
///
/// `Game::tick` is the only entry point the binary drives: it applies the
/// frame's input to the top-level status and, while playing, advances the
/// world by `dt` seconds.  All randomness comes through the injected RNG so
/// tests can run the simulation from a seeded generator.

use rand::Rng;
use tracing::{debug, info};

use crate::assets::Context;
use crate::audio::CueRequest;
use crate::boss::BossPhase;
use crate::collision::{self, Outcome};
use crate::config::{StageTable, Tuning};
use crate::entities::{Body, Bullet, GameStatus};
use crate::error::GameError;
use crate::input::InputFrame;
use crate::player::WeaponMode;
use crate::spawn::SpawnScheduler;
use crate::world::World;

// ── Run state ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct RunState {
    pub stage: u32,
    pub stage_time: f32,
    pub total_time: f32,
    pub score: u32,
    pub boss_spawned: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            stage: 1,
            stage_time: 0.0,
            total_time: 0.0,
            score: 0,
            boss_spawned: false,
        }
    }
}

// ── Game ─────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Game {
    status: GameStatus,
    run: RunState,
    world: World,
    spawner: SpawnScheduler,
    tuning: Tuning,
    stages: StageTable,
    ctx: Context,
    running: bool,
}

impl Game {
    /// A game sitting at the menu with a fresh stage-1 world behind it.
    pub fn new(tuning: Tuning, stages: StageTable, ctx: Context) -> Result<Self, GameError> {
        ctx.assets.validate()?;
        let world = World::new(&tuning, &ctx.assets)?;
        let spawner = SpawnScheduler::new(&stages, 1)?;
        Ok(Self {
            status: GameStatus::Menu,
            run: RunState::default(),
            world,
            spawner,
            tuning,
            stages,
            ctx,
            running: true,
        })
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct access for scripted scenarios and tests.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn stages(&self) -> &StageTable {
        &self.stages
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn spawner(&self) -> &SpawnScheduler {
        &self.spawner
    }

    /// False once the player chose to quit.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn boss_phase(&self) -> BossPhase {
        match (&self.world.boss, self.run.boss_spawned) {
            (Some(boss), _) if boss.is_alive() => BossPhase::Active,
            (_, true) => BossPhase::Dead,
            _ => BossPhase::Pending,
        }
    }

    /// Reset every entity group and the run state to stage 1 and start
    /// playing.
    pub fn start_run(&mut self) -> Result<(), GameError> {
        self.ctx.audio.stop_all();
        self.world = World::new(&self.tuning, &self.ctx.assets)?;
        self.spawner = SpawnScheduler::new(&self.stages, 1)?;
        self.run = RunState::default();
        self.status = GameStatus::Playing;
        info!(stages = self.stages.max_stage(), "run started");
        Ok(())
    }

    /// Apply the frame's one-shot commands to the top-level status.
    pub fn handle_input(&mut self, input: &InputFrame) -> Result<(), GameError> {
        match self.status {
            GameStatus::Menu => {
                if input.quit {
                    self.running = false;
                } else if input.confirm {
                    self.start_run()?;
                }
            }
            GameStatus::Playing => {
                if input.quit {
                    self.status = GameStatus::ConfirmQuit;
                } else if input.pause {
                    self.status = GameStatus::Paused;
                }
            }
            GameStatus::Paused => {
                if input.quit {
                    self.status = GameStatus::ConfirmQuit;
                } else if input.resume {
                    self.status = GameStatus::Playing;
                }
            }
            GameStatus::ConfirmQuit => {
                if input.confirm {
                    self.running = false;
                } else if input.cancel {
                    self.status = GameStatus::Paused;
                }
            }
            GameStatus::GameOver | GameStatus::Win => {
                if input.quit {
                    self.running = false;
                } else if input.restart {
                    self.start_run()?;
                }
            }
        }
        Ok(())
    }

    /// One frame: status transitions, then the simulation step when
    /// playing.  Sound channels and explosions keep running in the end
    /// screens.
    pub fn tick(&mut self, input: &InputFrame, dt: f32, rng: &mut impl Rng) -> Result<(), GameError> {
        self.handle_input(input)?;
        self.ctx.audio.advance(dt);
        match self.status {
            GameStatus::Playing => self.step(input, dt, rng),
            GameStatus::GameOver | GameStatus::Win => {
                self.world.advance_explosions(dt);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn step(&mut self, input: &InputFrame, dt: f32, rng: &mut impl Rng) -> Result<(), GameError> {
        self.update_stage(dt)?;
        if self.status != GameStatus::Playing {
            self.world.advance_explosions(dt);
            return Ok(());
        }

        self.fire_weapons(input, dt)?;

        for spawn in self.spawner.update(dt, rng) {
            self.world.spawn(spawn, &self.tuning, &self.ctx.assets, rng)?;
        }

        let outcome = collision::resolve(&mut self.world);
        self.apply_outcome(outcome)?;

        self.update_entities(input, dt)?;

        if !self.world.player.is_alive() {
            self.world.release_escorts(&mut self.ctx.audio);
            self.world.reap();
            self.status = GameStatus::GameOver;
            info!(score = self.run.score, stage = self.run.stage, "game over");
        }
        Ok(())
    }

    /// Advance stage/boss timers and apply the stage-advance rule.
    pub fn update_stage(&mut self, dt: f32) -> Result<(), GameError> {
        self.run.stage_time += dt;
        self.run.total_time += dt;

        let stage = self.run.stage;
        match self.stages.boss_config(stage) {
            Some(config) => {
                let appear_at = self.stages.stage_duration() * self.tuning.boss_appear_ratio;
                if !self.run.boss_spawned && self.run.stage_time >= appear_at {
                    self.world.spawn_boss(&config, &self.tuning, &self.ctx.assets)?;
                    self.run.boss_spawned = true;
                    info!(stage, hp = config.max_hp, "boss appeared");
                } else if self.boss_phase() == BossPhase::Dead {
                    info!(stage, "boss defeated");
                    self.advance_stage();
                }
            }
            None => {
                if self.run.stage_time >= self.stages.stage_duration() {
                    self.advance_stage();
                }
            }
        }
        Ok(())
    }

    fn advance_stage(&mut self) {
        let next = self.run.stage + 1;
        if next > self.stages.max_stage() {
            self.status = GameStatus::Win;
            self.world.shut_down_laser(&mut self.ctx.audio);
            info!(score = self.run.score, "all stages cleared");
            return;
        }

        // A missing record is logged by `spawn_config` and replaced by defaults.
        let spawn = self.stages.spawn_config(next).into_inner();
        self.spawner = SpawnScheduler::with_config(next, spawn);
        self.run.stage = next;
        self.run.stage_time = 0.0;
        self.run.boss_spawned = false;
        self.world.boss = None;
        self.world.boss_bullets.clear();
        info!(stage = next, "stage advanced");
    }

    fn fire_weapons(&mut self, input: &InputFrame, dt: f32) -> Result<(), GameError> {
        let Some(volley) = self.world.player.trigger(dt, input.fire) else {
            return Ok(());
        };
        for origin in &volley.origins {
            let bullet = Bullet::player(*origin, self.tuning.bullet_speed, &self.ctx.assets.bullet)?;
            self.world.bullets.push(bullet);
        }
        let volume = if volley.mode == WeaponMode::Spread { 0.8 } else { 0.5 };
        self.ctx.audio.play(CueRequest::bullet(volume));
        Ok(())
    }

    fn apply_outcome(&mut self, outcome: Outcome) -> Result<(), GameError> {
        self.run.score = self.run.score.saturating_add(outcome.score);
        for at in outcome.impacts {
            self.world.add_explosion(at, &self.tuning, &self.ctx.assets);
        }
        for cue in outcome.cues {
            self.ctx.audio.play(cue);
        }
        if self.world.player.is_alive() {
            for kind in outcome.pickups {
                debug!(item = %kind, "item collected");
                self.world.apply_item(kind, &self.tuning, &self.ctx.assets)?;
            }
        }
        if outcome.hero_destroyed {
            debug!("hero destroyed");
        }
        Ok(())
    }

    fn update_entities(&mut self, input: &InputFrame, dt: f32) -> Result<(), GameError> {
        let tuning = &self.tuning;
        let assets = &self.ctx.assets;
        let world = &mut self.world;
        let field = world.field;

        if world.player.is_alive() {
            let expiry = world.player.update(dt, input.direction.to_vec2(), &field);
            if expiry.speed {
                world.speed_flame = None;
            }
            if let Some(mode) = expiry.weapon {
                debug!(?mode, "weapon buff expired");
            }
        }
        let hero = world.player.bounds();
        let hero_center = world.player.pos;

        for enemy in &mut world.enemies {
            enemy.update(dt, &field);
        }
        if let Some(boss) = world.boss.as_mut() {
            if let Some(shots) = boss.update(dt, field.width(), hero_center) {
                world.fire_boss_volley(&shots, tuning, assets)?;
            }
        }
        let mut drone_shots = Vec::new();
        for drone in &mut world.drones {
            if let Some(bullet) = drone.update(dt, hero_center, tuning, &assets.bullet)? {
                drone_shots.push(bullet);
            }
        }
        world.bullets.extend(drone_shots);
        for bullet in world.bullets.iter_mut().chain(world.boss_bullets.iter_mut()) {
            bullet.update(dt, &field);
        }
        for meteor in &mut world.meteors {
            meteor.update(dt, &field);
        }
        for item in &mut world.items {
            item.update(dt, &field);
        }
        for shield in &mut world.shields {
            shield.update(dt, hero_center);
        }
        if let Some(flame) = world.speed_flame.as_mut() {
            flame.update(dt, &hero, tuning.flame_overlap);
        }
        for explosion in &mut world.explosions {
            explosion.update(dt);
        }

        world.sync_laser(tuning, &mut self.ctx.audio);
        world.reap();
        Ok(())
    }
}
