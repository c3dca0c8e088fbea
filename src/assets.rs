//! Frame sets for every entity kind, plus the context that carries them
//! together with the sound channel pool.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::animation::{Frame, FrameSet};
use crate::audio::ChannelPool;
use crate::entities::ItemKind;
use crate::error::GameError;
use crate::geometry::Mask;

#[derive(Clone, Debug)]
pub struct Assets {
    pub hero: FrameSet,
    pub enemy: FrameSet,
    pub boss: FrameSet,
    pub meteor: FrameSet,
    pub bullet: FrameSet,
    pub boss_bullet: FrameSet,
    pub drone: FrameSet,
    pub shield: FrameSet,
    pub speed_flame: FrameSet,
    pub items: HashMap<ItemKind, FrameSet>,
    /// Explosions are cosmetic; without frames they are simply skipped.
    pub explosion: Option<FrameSet>,
}

fn frames(masks: impl IntoIterator<Item = Mask>) -> FrameSet {
    masks.into_iter().map(Frame::new).collect::<Vec<_>>().into()
}

impl Assets {
    /// Shapes drawn from geometric masks, so the game runs without any
    /// image files.
    pub fn procedural() -> Self {
        let hero = frames([Mask::triangle(48, 48), Mask::triangle(48, 52)]);
        let enemy = frames([Mask::ellipse(64, 40), Mask::ellipse(60, 44)]);
        let boss = frames([Mask::ellipse(160, 96), Mask::ellipse(156, 100)]);
        let meteor = frames([Mask::ellipse(36, 36), Mask::ellipse(34, 38), Mask::ellipse(38, 34)]);
        let bullet = frames([Mask::filled(6, 16)]);
        let boss_bullet = frames([Mask::ellipse(10, 20), Mask::ellipse(12, 18)]);
        let drone = frames([Mask::triangle(24, 24), Mask::triangle(22, 26)]);
        let shield = frames([Mask::ellipse(96, 96), Mask::ellipse(100, 100)]);
        let flame = Mask::triangle(16, 32);
        let speed_flame = frames([
            Mask::from_fn(16, 32, |x, y| flame.get(x as i64, 31 - y as i64)),
            Mask::from_fn(16, 28, |x, y| flame.get(x as i64, 31 - y as i64)),
        ]);
        let item_frames = frames([Mask::ellipse(28, 28), Mask::ellipse(24, 28)]);
        let items = ItemKind::ALL
            .into_iter()
            .map(|kind| (kind, Rc::clone(&item_frames)))
            .collect();
        let explosion = frames((1..=6).map(|i| Mask::ellipse(12 * i, 12 * i)));

        Self {
            hero,
            enemy,
            boss,
            meteor,
            bullet,
            boss_bullet,
            drone,
            shield,
            speed_flame,
            items,
            explosion: Some(explosion),
        }
    }

    pub fn item(&self, kind: ItemKind) -> Result<&FrameSet, GameError> {
        self.items
            .get(&kind)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| GameError::EmptyFrames(format!("item '{kind}'")))
    }

    /// Fail on any required frame set that is empty.
    pub fn validate(&self) -> Result<(), GameError> {
        let required: [(&str, &FrameSet); 9] = [
            ("hero", &self.hero),
            ("enemy", &self.enemy),
            ("boss", &self.boss),
            ("meteor", &self.meteor),
            ("bullet", &self.bullet),
            ("boss bullet", &self.boss_bullet),
            ("drone", &self.drone),
            ("shield", &self.shield),
            ("speed flame", &self.speed_flame),
        ];
        for (name, set) in required {
            if set.is_empty() {
                return Err(GameError::EmptyFrames(name.to_string()));
            }
        }
        for kind in ItemKind::ALL {
            self.item(kind)?;
        }
        if self.explosion.as_ref().map_or(true, |f| f.is_empty()) {
            debug!("no explosion frames; explosions disabled");
        }
        Ok(())
    }
}

/// Shared resources handed to the game instead of process-wide globals.
#[derive(Debug)]
pub struct Context {
    pub assets: Assets,
    pub audio: ChannelPool,
}

impl Context {
    pub fn new(assets: Assets, audio: ChannelPool) -> Result<Self, GameError> {
        assets.validate()?;
        Ok(Self { assets, audio })
    }

    /// Procedural assets and a silent pool.
    pub fn headless(channels: usize) -> Self {
        Self {
            assets: Assets::procedural(),
            audio: ChannelPool::silent(channels),
        }
    }
}
