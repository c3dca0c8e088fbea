//! Pairwise collision resolution between entity groups.
//!
//! [`resolve`] runs every pair once per frame, in a fixed order, and marks
//! entities dead in place.  Score, impact points, sound cues and collected
//! items come back in an [`Outcome`] for the caller to apply.

use glam::Vec2;

use crate::audio::CueRequest;
use crate::entities::{Body, ItemKind};
use crate::geometry::{circles_overlap, Precision};
use crate::world::World;

pub mod score {
    pub const BULLET_ENEMY: u32 = 10;
    pub const BULLET_METEOR: u32 = 5;
    pub const BULLET_BOSS: u32 = 15;
    pub const SHIELD_BOSS: u32 = 10;
    pub const LASER_ENEMY: u32 = 10;
    pub const LASER_METEOR: u32 = 5;
    pub const LASER_BOSS: u32 = 15;
    pub const BOSS_KILL: u32 = 50;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Hero,
    Enemy,
    Meteor,
    Item,
    Bullet,
    Boss,
    BossBullet,
    Shield,
    Laser,
}

/// Shields always use circles; bullets and the laser use rectangles;
/// everything else is pixel-accurate.
pub fn precision(a: Category, b: Category) -> Precision {
    use Category::*;
    let either = |c: Category| a == c || b == c;
    if either(Shield) {
        Precision::Circle
    } else if either(Bullet) || either(BossBullet) || either(Laser) {
        Precision::Rect
    } else {
        Precision::Mask
    }
}

pub fn overlaps<A, B>(a: &A, b: &B, precision: Precision) -> bool
where
    A: Body + ?Sized,
    B: Body + ?Sized,
{
    match precision {
        Precision::Circle => circles_overlap(a.center(), a.radius(), b.center(), b.radius()),
        Precision::Rect => a.bounds().intersects(&b.bounds()),
        Precision::Mask => {
            let ra = a.bounds();
            let rb = b.bounds();
            ra.intersects(&rb) && a.mask().overlaps(ra.min, b.mask(), rb.min)
        }
    }
}

/// Side effects produced by one resolution pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outcome {
    pub score: u32,
    /// Where explosions should appear.
    pub impacts: Vec<Vec2>,
    pub cues: Vec<CueRequest>,
    pub pickups: Vec<ItemKind>,
    pub boss_defeated: bool,
    pub hero_destroyed: bool,
}

impl Outcome {
    fn explode(&mut self, at: Vec2) {
        self.impacts.push(at);
        self.cues.push(CueRequest::explosion());
    }
}

/// Each live attacker destroys every live target it touches and is
/// destroyed itself if it touched any.
fn trade<A: Body, B: Body>(
    attackers: &mut [A],
    targets: &mut [B],
    precision: Precision,
    mut on_hit: impl FnMut(&A, &B),
) {
    for attacker in attackers.iter_mut().filter(|a| a.is_alive()) {
        let mut hit = false;
        for target in targets.iter_mut().filter(|t| t.is_alive()) {
            if overlaps(&*attacker, &*target, precision) {
                target.kill();
                on_hit(&*attacker, &*target);
                hit = true;
            }
        }
        if hit {
            attacker.kill();
        }
    }
}

/// Like [`trade`] but the single `hero` is the attacker.
fn hero_trade<H: Body, B: Body>(
    hero: &mut H,
    targets: &mut [B],
    precision: Precision,
    mut on_hit: impl FnMut(&H, &B),
) {
    trade(std::slice::from_mut(hero), targets, precision, |h, t| on_hit(h, t));
}

pub fn resolve(world: &mut World) -> Outcome {
    let mut out = Outcome::default();
    let hero_alive_before = world.player.is_alive();

    // Player bullets against enemies.
    trade(
        &mut world.bullets,
        &mut world.enemies,
        precision(Category::Bullet, Category::Enemy),
        |_, enemy| {
            out.score += score::BULLET_ENEMY;
            out.explode(enemy.center());
        },
    );

    // Hero rams an enemy or meteor: both go, explosion between them.
    hero_trade(
        &mut world.player,
        &mut world.enemies,
        precision(Category::Hero, Category::Enemy),
        |hero, enemy| out.explode(hero.center().lerp(enemy.center(), 0.5)),
    );
    hero_trade(
        &mut world.player,
        &mut world.meteors,
        precision(Category::Hero, Category::Meteor),
        |hero, meteor| out.explode(hero.center().lerp(meteor.center(), 0.5)),
    );

    trade(
        &mut world.bullets,
        &mut world.meteors,
        precision(Category::Bullet, Category::Meteor),
        |_, meteor| {
            out.score += score::BULLET_METEOR;
            out.explode(meteor.center());
        },
    );

    // Pickups never hurt the hero.
    if world.player.is_alive() {
        let p = precision(Category::Hero, Category::Item);
        for item in world.items.iter_mut().filter(|i| i.is_alive()) {
            if overlaps(&world.player, &*item, p) {
                item.kill();
                out.pickups.push(item.kind);
                out.cues.push(CueRequest::pickup());
            }
        }
    }

    // Shields absorb one point per contact and destroy what they touch.
    let p = precision(Category::Shield, Category::Meteor);
    for shield in world.shields.iter_mut().filter(|s| s.is_alive()) {
        for meteor in world.meteors.iter_mut().filter(|m| m.is_alive()) {
            if overlaps(&*shield, &*meteor, p) {
                meteor.kill();
                shield.take_hit(1);
                out.explode(meteor.center());
            }
        }
    }
    let p = precision(Category::Shield, Category::Enemy);
    for shield in world.shields.iter_mut().filter(|s| s.is_alive()) {
        for enemy in world.enemies.iter_mut().filter(|e| e.is_alive()) {
            if overlaps(&*shield, &*enemy, p) {
                enemy.kill();
                shield.take_hit(1);
                out.explode(enemy.center());
            }
        }
    }

    if let Some(boss) = world.boss.as_mut() {
        let p = precision(Category::Bullet, Category::Boss);
        for bullet in world.bullets.iter_mut().filter(|b| b.is_alive()) {
            if !boss.is_alive() {
                break;
            }
            if overlaps(&*bullet, &*boss, p) {
                bullet.kill();
                out.score += score::BULLET_BOSS;
                out.explode(bullet.center());
                if boss.take_damage(1) {
                    out.score += score::BOSS_KILL;
                    out.boss_defeated = true;
                }
            }
        }

        // Contact with the boss is lethal to the hero only.
        if world.player.is_alive()
            && boss.is_alive()
            && overlaps(&world.player, &*boss, precision(Category::Hero, Category::Boss))
        {
            world.player.kill();
            out.explode(world.player.center());
        }

        let p = precision(Category::Shield, Category::Boss);
        for shield in world.shields.iter_mut().filter(|s| s.is_alive()) {
            if !boss.is_alive() {
                break;
            }
            if overlaps(&*shield, &*boss, p) {
                shield.take_hit(1);
                out.score += score::SHIELD_BOSS;
                out.explode(boss.center());
                if boss.take_damage(1) {
                    out.score += score::BOSS_KILL;
                    out.boss_defeated = true;
                }
            }
        }
    }

    hero_trade(
        &mut world.player,
        &mut world.boss_bullets,
        precision(Category::Hero, Category::BossBullet),
        |hero, _| out.explode(hero.center()),
    );

    let p = precision(Category::Shield, Category::BossBullet);
    for shield in world.shields.iter_mut().filter(|s| s.is_alive()) {
        for bullet in world.boss_bullets.iter_mut().filter(|b| b.is_alive()) {
            if overlaps(&*shield, &*bullet, p) {
                bullet.kill();
                shield.take_hit(1);
                out.explode(bullet.center());
            }
        }
    }

    // The beam is never consumed by what it hits.
    if let Some(laser) = world.laser.as_ref().filter(|l| l.is_alive()) {
        let p = precision(Category::Laser, Category::Enemy);
        for enemy in world.enemies.iter_mut().filter(|e| e.is_alive()) {
            if overlaps(laser, &*enemy, p) {
                enemy.kill();
                out.score += score::LASER_ENEMY;
                out.explode(enemy.center());
            }
        }
        let p = precision(Category::Laser, Category::Meteor);
        for meteor in world.meteors.iter_mut().filter(|m| m.is_alive()) {
            if overlaps(laser, &*meteor, p) {
                meteor.kill();
                out.score += score::LASER_METEOR;
                out.explode(meteor.center());
            }
        }
        if let Some(boss) = world.boss.as_mut().filter(|b| b.is_alive()) {
            if overlaps(laser, &*boss, precision(Category::Laser, Category::Boss)) {
                out.score += score::LASER_BOSS;
                out.explode(boss.center());
                if boss.take_damage(1) {
                    out.score += score::BOSS_KILL;
                    out.boss_defeated = true;
                }
            }
        }
    }

    out.hero_destroyed = hero_alive_before && !world.player.is_alive();
    out
}
