/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game.  No game logic is performed; world coordinates are scaled into the
/// bordered play area of the terminal.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam::Vec2;
use space_shooter::compute::Game;
use space_shooter::entities::{Body, BulletOwner, GameStatus, ItemKind};
use space_shooter::player::{Buffable, WeaponModal, WeaponMode};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_STAGE: Color = Color::Cyan;
const C_HUD_LOADOUT: Color = Color::Green;
const C_PLAYER: Color = Color::White;
const C_ENEMY: Color = Color::Green;
const C_BOSS: Color = Color::Red;
const C_METEOR: Color = Color::DarkYellow;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_BOSS: Color = Color::Magenta;
const C_LASER: Color = Color::Cyan;
const C_SHIELD: Color = Color::Blue;
const C_DRONE: Color = Color::White;
const C_EXPLOSION: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;
const C_POWERUP_ACTIVE: Color = Color::Yellow;

/// Maps world pixels onto terminal cells inside the border.
struct Viewport {
    width: u16,
    height: u16,
    scale: Vec2,
}

impl Viewport {
    fn new(width: u16, height: u16, world: Vec2) -> Self {
        let cols = width.saturating_sub(2).max(1) as f32;
        let rows = height.saturating_sub(4).max(1) as f32;
        Self {
            width,
            height,
            scale: Vec2::new(cols / world.x, rows / world.y),
        }
    }

    /// Terminal cell for a world point, or `None` when it falls outside the
    /// play area.
    fn cell(&self, p: Vec2) -> Option<(u16, u16)> {
        let c = p * self.scale;
        if c.x < 0.0 || c.y < 0.0 {
            return None;
        }
        let col = 1 + c.x as u16;
        let row = 2 + c.y as u16;
        (col < self.width.saturating_sub(1) && row < self.height.saturating_sub(2)).then_some((col, row))
    }

    fn put<W: Write>(&self, out: &mut W, p: Vec2, glyph: &str, color: Color) -> std::io::Result<()> {
        if let Some((col, row)) = self.cell(p) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(color))?;
            out.queue(Print(glyph))?;
        }
        Ok(())
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, game: &Game) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let tuning = game.tuning();
    let view = Viewport::new(
        width,
        height,
        Vec2::new(tuning.screen_width, tuning.screen_height),
    );

    out.queue(terminal::Clear(terminal::ClearType::All))?;
    draw_border(out, &view)?;
    draw_hud(out, game, &view)?;

    if game.status() != GameStatus::Menu {
        draw_world(out, game, &view)?;
    }
    draw_controls_hint(out, &view)?;

    match game.status() {
        GameStatus::Menu => draw_overlay(
            out,
            &view,
            "SPACE  SHOOTER",
            Color::Cyan,
            &["ENTER - Start  Q - Quit".to_string()],
        )?,
        GameStatus::Paused => draw_overlay(
            out,
            &view,
            "PAUSED",
            Color::Yellow,
            &["R - Resume  Q - Quit".to_string()],
        )?,
        GameStatus::ConfirmQuit => draw_overlay(
            out,
            &view,
            "QUIT RUN?",
            Color::Yellow,
            &["Y - Yes  N - No".to_string()],
        )?,
        GameStatus::GameOver => draw_overlay(
            out,
            &view,
            "GAME  OVER",
            Color::Red,
            &[
                format!("Final Score: {:>6}", game.run().score),
                "R - Play Again  Q - Quit".to_string(),
            ],
        )?,
        GameStatus::Win => draw_overlay(
            out,
            &view,
            "YOU  WIN",
            Color::Green,
            &[
                format!("Final Score: {:>6}", game.run().score),
                "R - Play Again  Q - Quit".to_string(),
            ],
        )?,
        GameStatus::Playing => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.width as usize;
    let h = view.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, game: &Game, view: &Viewport) -> std::io::Result<()> {
    let run = game.run();
    let player = &game.world().player;

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}", run.score)))?;
    out.queue(style::SetForegroundColor(C_HUD_STAGE))?;
    out.queue(Print(format!("  Stage {}/{}", run.stage, game.stages().max_stage())))?;
    out.queue(style::SetForegroundColor(C_HUD_LOADOUT))?;
    out.queue(Print(format!(
        "  Drones:{} Shields:{}",
        player.loadout.drones, player.loadout.shields
    )))?;

    let mut tags = String::new();
    if player.speed_multiplier() > 1.0 {
        tags.push_str(&format!("[SPD {:>2.0}s] ", player.speed_boost_remaining().ceil()));
    }
    match player.weapon_mode() {
        WeaponMode::Laser => tags.push_str(&format!("[LASER {:>2.0}s]", player.weapon_remaining().ceil())),
        WeaponMode::Spread => tags.push_str(&format!("[SPREAD {:>2.0}s]", player.weapon_remaining().ceil())),
        WeaponMode::Normal => {}
    }
    if !tags.is_empty() {
        let col = view.width.saturating_sub(tags.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(col, 0))?;
        out.queue(style::SetForegroundColor(C_POWERUP_ACTIVE))?;
        out.queue(Print(&tags))?;
    }

    // Boss HP bar sits in the top border while a boss is up.
    if let Some(boss) = game.world().boss.as_ref() {
        let bar_width = (view.width as usize / 3).max(10);
        let filled = (bar_width as u32 * boss.hp()).div_ceil(boss.max_hp().max(1)) as usize;
        let bar = format!(
            "BOSS [{}{}]",
            "█".repeat(filled),
            "░".repeat(bar_width.saturating_sub(filled))
        );
        let col = (view.width / 2).saturating_sub(bar.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, 1))?;
        out.queue(style::SetForegroundColor(C_BOSS))?;
        out.queue(Print(bar))?;
    }
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn item_glyph(kind: ItemKind) -> (&'static str, Color) {
    match kind {
        ItemKind::Single => ("1", Color::White),
        ItemKind::Double => ("2", Color::White),
        ItemKind::Shield => ("◎", Color::Blue),
        ItemKind::Speed => ("»", Color::Green),
        ItemKind::Laser => ("|", Color::Cyan),
        ItemKind::Buckshot => ("★", Color::Yellow),
    }
}

fn draw_world<W: Write>(out: &mut W, game: &Game, view: &Viewport) -> std::io::Result<()> {
    let world = game.world();

    if let Some(laser) = world.laser.as_ref() {
        let bounds = laser.bounds();
        let step = (1.0 / view.scale.y).max(1.0);
        let mut y = bounds.top();
        while y < bounds.bottom() {
            view.put(out, Vec2::new(bounds.center().x, y), "┃", C_LASER)?;
            y += step;
        }
    }
    for shield in &world.shields {
        let r = shield.radius();
        for (dx, dy, glyph) in [(-r, 0.0, "("), (r, 0.0, ")"), (0.0, -r, "‿"), (0.0, r, "‿")] {
            view.put(out, shield.center() + Vec2::new(dx, dy), glyph, C_SHIELD)?;
        }
    }
    for meteor in &world.meteors {
        view.put(out, meteor.center(), "●", C_METEOR)?;
    }
    for item in &world.items {
        let (glyph, color) = item_glyph(item.kind);
        view.put(out, item.center(), glyph, color)?;
    }
    for enemy in &world.enemies {
        view.put(out, enemy.center(), "«▼»", C_ENEMY)?;
    }
    if let Some(boss) = world.boss.as_ref() {
        let b = boss.bounds();
        view.put(out, Vec2::new(b.left(), boss.center().y), "◄███◆███►", C_BOSS)?;
    }
    for bullet in world.bullets.iter().chain(&world.boss_bullets) {
        let (glyph, color) = match bullet.owner {
            BulletOwner::Player => ("║", C_BULLET_PLAYER),
            BulletOwner::Boss => ("•", C_BULLET_BOSS),
        };
        view.put(out, bullet.center(), glyph, color)?;
    }
    for drone in &world.drones {
        view.put(out, drone.center(), "▴", C_DRONE)?;
    }
    if world.player.is_alive() {
        view.put(out, world.player.center(), "▲", C_PLAYER)?;
        if let Some(flame) = world.speed_flame.as_ref() {
            view.put(out, flame.center(), "∵", Color::Red)?;
        }
    }
    for explosion in &world.explosions {
        let glyph = ["·", "*", "✶", "✹", "✺", "░"][explosion.frame_index().min(5)];
        view.put(out, explosion.center(), glyph, C_EXPLOSION)?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("WASD / Arrows : Move   SPACE : Shoot   P : Pause   Q : Quit"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_overlay<W: Write>(
    out: &mut W,
    view: &Viewport,
    title: &str,
    color: Color,
    lines: &[String],
) -> std::io::Result<()> {
    let inner = 20usize.max(title.chars().count() + 4);
    let top = format!("╔{}╗", "═".repeat(inner));
    let middle = format!("║{:^inner$}║", title);
    let bottom = format!("╚{}╝", "═".repeat(inner));

    let cx = view.width / 2;
    let total_rows = 3 + lines.len() as u16;
    let start_row = (view.height / 2).saturating_sub(total_rows / 2);

    for (i, row_text) in [&top, &middle, &bottom].into_iter().enumerate() {
        let col = cx.saturating_sub(row_text.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(row_text))?;
    }
    for (i, line) in lines.iter().enumerate() {
        let col = cx.saturating_sub(line.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + 3 + i as u16))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(line))?;
    }
    Ok(())
}
