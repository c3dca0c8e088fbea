//! Gameplay tuning and the per-stage configuration table.
//!
//! Runtime options (frame rate, log destination, RNG seed) live with the
//! binary; everything here is gameplay data.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use glam::Vec2;
use serde::Deserialize;
use tracing::warn;

use crate::entities::ItemKind;
use crate::error::GameError;

// ── Tuning ───────────────────────────────────────────────────────────────────

/// Every gameplay constant in one place.  Distances are pixels, times are
/// seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuning {
    pub screen_width: f32,
    pub screen_height: f32,

    pub hero_acceleration: f32,
    pub hero_drag: f32,
    pub hero_max_speed: f32,
    /// Distance of the hero's spawn point above the bottom edge.
    pub hero_spawn_lift: f32,

    pub bullet_speed: f32,
    pub bullet_cooldown: f32,
    /// Horizontal offsets of a spread volley, relative to the hero center.
    pub spread_offsets: Vec<f32>,

    pub meteor_speed: f32,
    pub item_fall_speed: f32,
    pub spawn_margin_x: f32,

    pub enemy_row: f32,
    pub enemy_drift_speed: f32,

    pub drone_fire_interval: f32,
    pub drone_lifetime: f32,
    pub drone_offset: Vec2,

    pub shield_max_hp: i32,
    pub shield_lifetime: f32,

    pub buff_duration: f32,
    pub speed_multiplier: f32,

    pub laser_width: f32,

    pub boss_speed: f32,
    pub boss_top: f32,
    pub boss_bullet_speed: f32,
    /// Lower bound for the gap between volley pairs; never below twice the
    /// larger side of a boss bullet.
    pub boss_pair_spacing: f32,
    pub boss_appear_ratio: f32,

    pub explosion_frame_duration: f32,
    /// Lift of the speed flame's top edge above the hero's bottom edge.
    pub flame_overlap: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            screen_width: 600.0,
            screen_height: 800.0,
            hero_acceleration: 1200.0,
            hero_drag: 900.0,
            hero_max_speed: 500.0,
            hero_spawn_lift: 80.0,
            bullet_speed: 500.0,
            bullet_cooldown: 0.3,
            spread_offsets: vec![-40.0, -20.0, 0.0, 20.0, 40.0],
            meteor_speed: 150.0,
            item_fall_speed: 120.0,
            spawn_margin_x: 60.0,
            enemy_row: 100.0,
            enemy_drift_speed: 60.0,
            drone_fire_interval: 0.4,
            drone_lifetime: 8.0,
            drone_offset: Vec2::new(80.0, -10.0),
            shield_max_hp: 3,
            shield_lifetime: 10.0,
            buff_duration: 5.0,
            speed_multiplier: 1.5,
            laser_width: 16.0,
            boss_speed: 150.0,
            boss_top: 60.0,
            boss_bullet_speed: 250.0,
            boss_pair_spacing: 24.0,
            boss_appear_ratio: 0.7,
            explosion_frame_duration: 0.05,
            flame_overlap: 30.0,
        }
    }
}

// ── Stage records ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnConfig {
    pub meteor_interval: f32,
    pub item_interval: f32,
    /// Positive weights only; see [`SpawnConfig::with_weights`].
    pub item_weights: Vec<(ItemKind, f32)>,
    /// Drifting enemies are only spawned when this is set.
    pub enemy_interval: Option<f32>,
}

impl SpawnConfig {
    pub fn new(meteor_interval: f32, item_interval: f32) -> Self {
        Self {
            meteor_interval,
            item_interval,
            ..Self::default()
        }
    }

    /// Replace the weight table, dropping non-positive entries.  An empty
    /// result falls back to the basic drone item.
    pub fn with_weights(mut self, weights: &[(ItemKind, f32)]) -> Self {
        let kept: Vec<(ItemKind, f32)> = weights
            .iter()
            .copied()
            .filter(|(_, w)| w.is_finite() && *w > 0.0)
            .collect();
        self.item_weights = if kept.is_empty() {
            default_weights()
        } else {
            kept
        };
        self
    }

    pub fn with_enemy_interval(mut self, interval: f32) -> Self {
        self.enemy_interval = Some(interval);
        self
    }
}

fn default_weights() -> Vec<(ItemKind, f32)> {
    vec![(ItemKind::Single, 1.0)]
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            meteor_interval: 1.0,
            item_interval: 5.0,
            item_weights: default_weights(),
            enemy_interval: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct BossConfig {
    pub max_hp: u32,
    pub fire_interval: f32,
    pub bullet_pairs: u32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            max_hp: 50,
            fire_interval: 5.0,
            bullet_pairs: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StageConfig {
    pub spawn: SpawnConfig,
    pub boss: Option<BossConfig>,
}

/// Result of a lookup that may fall back to a default value.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved<T> {
    Found(T),
    Defaulted(T),
}

impl<T> Resolved<T> {
    pub fn is_default(&self) -> bool {
        matches!(self, Resolved::Defaulted(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Resolved::Found(v) | Resolved::Defaulted(v) => v,
        }
    }
}

// ── Stage table ──────────────────────────────────────────────────────────────

pub const DEFAULT_STAGE_DURATION: f32 = 30.0;

/// Stage records keyed 1..=N with no gaps.
#[derive(Clone, Debug, PartialEq)]
pub struct StageTable {
    stages: Vec<StageConfig>,
    stage_duration: f32,
}

impl StageTable {
    pub fn new(stages: Vec<StageConfig>, stage_duration: f32) -> Result<Self, GameError> {
        if stages.is_empty() {
            return Err(GameError::InvalidStageTable("no stages".to_string()));
        }
        if !(stage_duration.is_finite() && stage_duration > 0.0) {
            return Err(GameError::InvalidStageTable(format!(
                "stage duration must be positive, got {stage_duration}"
            )));
        }
        Ok(Self {
            stages,
            stage_duration,
        })
    }

    /// Build from numbered records, rejecting gaps and a missing stage 1.
    pub fn from_numbered(
        numbered: BTreeMap<u32, StageConfig>,
        stage_duration: f32,
    ) -> Result<Self, GameError> {
        for (expected, stage) in (1u32..).zip(numbered.keys()) {
            if *stage != expected {
                return Err(GameError::InvalidStageTable(format!(
                    "stages must be numbered 1..N without gaps; expected {expected}, found {stage}"
                )));
            }
        }
        Self::new(numbered.into_values().collect(), stage_duration)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, GameError> {
        let raw: RawTable = toml::from_str(text)?;
        raw.into_table()
    }

    pub fn load(path: &Path) -> Result<Self, GameError> {
        let text = std::fs::read_to_string(path).map_err(|source| GameError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn stage_duration(&self) -> f32 {
        self.stage_duration
    }

    pub fn max_stage(&self) -> u32 {
        self.stages.len() as u32
    }

    pub fn get(&self, stage: u32) -> Option<&StageConfig> {
        let idx = stage.checked_sub(1)? as usize;
        self.stages.get(idx)
    }

    pub fn has_boss(&self, stage: u32) -> bool {
        self.get(stage).is_some_and(|s| s.boss.is_some())
    }

    pub fn boss_config(&self, stage: u32) -> Option<BossConfig> {
        self.get(stage).and_then(|s| s.boss)
    }

    /// Spawn parameters for `stage`, or the defaults when it is missing.
    pub fn spawn_config(&self, stage: u32) -> Resolved<SpawnConfig> {
        match self.get(stage) {
            Some(s) => Resolved::Found(s.spawn.clone()),
            None => {
                warn!(stage, "no spawn config for stage; using defaults");
                Resolved::Defaulted(SpawnConfig::default())
            }
        }
    }
}

impl Default for StageTable {
    fn default() -> Self {
        use ItemKind::*;
        let full = [
            (Single, 0.4),
            (Double, 0.2),
            (Shield, 0.2),
            (Speed, 0.1),
            (Laser, 0.1),
        ];
        let late = [(Single, 0.4), (Double, 0.3), (Shield, 0.3), (Buckshot, 0.2)];
        let boss = |max_hp, fire_interval, bullet_pairs| {
            Some(BossConfig {
                max_hp,
                fire_interval,
                bullet_pairs,
            })
        };

        let stages = vec![
            StageConfig {
                spawn: SpawnConfig::new(1.0, 5.0).with_weights(&full),
                boss: boss(40, 5.0, 1),
            },
            StageConfig {
                spawn: SpawnConfig::new(0.7, 7.0).with_weights(&full),
                boss: boss(60, 4.0, 2),
            },
            StageConfig {
                spawn: SpawnConfig::new(0.6, 6.0)
                    .with_weights(&late)
                    .with_enemy_interval(6.0),
                boss: boss(80, 3.0, 3),
            },
            StageConfig {
                spawn: SpawnConfig::new(0.55, 6.0)
                    .with_weights(&full)
                    .with_enemy_interval(5.0),
                boss: boss(100, 2.0, 3),
            },
            StageConfig {
                spawn: SpawnConfig::new(0.5, 6.0)
                    .with_weights(&late)
                    .with_enemy_interval(4.0),
                boss: boss(200, 2.0, 3),
            },
            StageConfig {
                spawn: SpawnConfig::new(0.45, 5.0)
                    .with_weights(&full)
                    .with_enemy_interval(3.0),
                boss: boss(300, 2.0, 4),
            },
        ];
        Self {
            stages,
            stage_duration: DEFAULT_STAGE_DURATION,
        }
    }
}

// ── TOML layout ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawTable {
    stage_duration: Option<f32>,
    stages: BTreeMap<String, RawStage>,
}

#[derive(Debug, Deserialize)]
struct RawStage {
    #[serde(default)]
    spawn: RawSpawn,
    boss: Option<BossConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSpawn {
    meteor_interval: Option<f32>,
    item_interval: Option<f32>,
    enemy_interval: Option<f32>,
    #[serde(default)]
    item_weights: BTreeMap<String, f32>,
}

impl RawTable {
    fn into_table(self) -> Result<StageTable, GameError> {
        let mut numbered = BTreeMap::new();
        for (key, raw) in self.stages {
            let stage: u32 = key.trim().parse().map_err(|_| {
                GameError::InvalidStageTable(format!("stage key '{key}' is not a number"))
            })?;
            numbered.insert(stage, raw.into_stage(stage));
        }
        StageTable::from_numbered(
            numbered,
            self.stage_duration.unwrap_or(DEFAULT_STAGE_DURATION),
        )
    }
}

impl RawStage {
    fn into_stage(self, stage: u32) -> StageConfig {
        let defaults = SpawnConfig::default();
        let mut weights = Vec::new();
        for (name, weight) in &self.spawn.item_weights {
            match ItemKind::from_str(name) {
                Ok(kind) => weights.push((kind, *weight)),
                Err(e) => warn!(stage, error = %e, "skipping item weight"),
            }
        }
        let spawn = SpawnConfig {
            meteor_interval: self.spawn.meteor_interval.unwrap_or(defaults.meteor_interval),
            item_interval: self.spawn.item_interval.unwrap_or(defaults.item_interval),
            enemy_interval: self.spawn.enemy_interval,
            ..defaults
        }
        .with_weights(&weights);

        StageConfig {
            spawn,
            boss: self.boss,
        }
    }
}
