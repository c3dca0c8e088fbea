//! Per-stage spawn timers.
//!
//! Each timer keeps the overshoot past its interval, so spawns stay on a
//! fixed cadence regardless of frame length.  A timer fires at most once per
//! frame.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::{debug, warn};

use crate::config::{SpawnConfig, StageTable};
use crate::entities::ItemKind;
use crate::error::GameError;

/// What the scheduler asks the world to create this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Spawn {
    Meteor,
    Item(ItemKind),
    Enemy,
}

#[derive(Clone, Debug)]
pub struct SpawnScheduler {
    stage: u32,
    config: SpawnConfig,
    picker: Option<WeightedIndex<f32>>,
    meteor_elapsed: f32,
    item_elapsed: f32,
    enemy_elapsed: f32,
}

impl SpawnScheduler {
    pub fn new(table: &StageTable, stage: u32) -> Result<Self, GameError> {
        let config = table
            .get(stage)
            .ok_or(GameError::UnknownStage(stage))?
            .spawn
            .clone();
        Ok(Self::with_config(stage, config))
    }

    pub fn with_config(stage: u32, config: SpawnConfig) -> Self {
        let picker = build_picker(&config);
        Self {
            stage,
            config,
            picker,
            meteor_elapsed: 0.0,
            item_elapsed: 0.0,
            enemy_elapsed: 0.0,
        }
    }

    /// Switch to `stage` and restart every timer.  Leaves the scheduler
    /// untouched when the stage is not configured.
    pub fn set_stage(&mut self, table: &StageTable, stage: u32) -> Result<(), GameError> {
        *self = Self::new(table, stage)?;
        debug!(stage, "spawn scheduler switched stage");
        Ok(())
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    pub fn update(&mut self, dt: f32, rng: &mut impl Rng) -> Vec<Spawn> {
        let mut out = Vec::new();

        if expire(&mut self.meteor_elapsed, self.config.meteor_interval, dt) {
            out.push(Spawn::Meteor);
        }
        if expire(&mut self.item_elapsed, self.config.item_interval, dt) {
            out.push(Spawn::Item(self.pick_item(rng)));
        }
        if let Some(interval) = self.config.enemy_interval {
            if expire(&mut self.enemy_elapsed, interval, dt) {
                out.push(Spawn::Enemy);
            }
        }
        out
    }

    fn pick_item(&self, rng: &mut impl Rng) -> ItemKind {
        match &self.picker {
            Some(picker) => self.config.item_weights[picker.sample(rng)].0,
            None => ItemKind::Single,
        }
    }
}

fn build_picker(config: &SpawnConfig) -> Option<WeightedIndex<f32>> {
    match WeightedIndex::new(config.item_weights.iter().map(|(_, w)| *w)) {
        Ok(picker) => Some(picker),
        Err(e) => {
            warn!(error = %e, "unusable item weights; spawning single drones only");
            None
        }
    }
}

/// Advance a carry-over timer; true when it expired on this call.
fn expire(elapsed: &mut f32, interval: f32, dt: f32) -> bool {
    *elapsed += dt;
    if *elapsed < interval {
        return false;
    }
    *elapsed = if interval > 0.0 {
        (*elapsed - interval).min(interval)
    } else {
        0.0
    };
    true
}
