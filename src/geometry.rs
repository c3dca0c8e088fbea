//! Bounding volumes and overlap tests.
//!
//! Coordinates are screen pixels with +Y pointing down.  Every entity is
//! positioned by its logical center; rectangles are derived from the center
//! and the current frame size so frames of different sizes stay centered.

use glam::Vec2;

// ── Rectangles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Rectangle whose top edge is centered on `midtop`.
    pub fn from_midtop(midtop: Vec2, size: Vec2) -> Self {
        Self {
            min: Vec2::new(midtop.x - size.x * 0.5, midtop.y),
            max: Vec2::new(midtop.x + size.x * 0.5, midtop.y + size.y),
        }
    }

    /// Rectangle whose bottom edge is centered on `midbottom`.
    pub fn from_midbottom(midbottom: Vec2, size: Vec2) -> Self {
        Self {
            min: Vec2::new(midbottom.x - size.x * 0.5, midbottom.y - size.y),
            max: Vec2::new(midbottom.x + size.x * 0.5, midbottom.y),
        }
    }

    pub fn left(&self) -> f32 {
        self.min.x
    }

    pub fn right(&self) -> f32 {
        self.max.x
    }

    pub fn top(&self) -> f32 {
        self.min.y
    }

    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn midtop(&self) -> Vec2 {
        Vec2::new(self.center().x, self.min.y)
    }

    pub fn midbottom(&self) -> Vec2 {
        Vec2::new(self.center().x, self.max.y)
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Shift so the rectangle lies inside `bounds` (sizes larger than the
    /// bounds pin to the top-left corner).
    pub fn clamped_within(&self, bounds: &Rect) -> Rect {
        let size = self.size();
        let mut min = self.min;
        if min.x + size.x > bounds.max.x {
            min.x = bounds.max.x - size.x;
        }
        if min.y + size.y > bounds.max.y {
            min.y = bounds.max.y - size.y;
        }
        min = min.max(bounds.min);
        Rect {
            min,
            max: min + size,
        }
    }
}

/// Circle test used for shields: each side's radius is half its larger
/// dimension.
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) <= reach * reach
}

// ── Pixel masks ──────────────────────────────────────────────────────────────

/// Row-major bitset of opaque pixels for one animation frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl Mask {
    pub fn empty(width: u32, height: u32) -> Self {
        let words_per_row = (width as usize).div_ceil(64);
        Self {
            width,
            height,
            words_per_row,
            bits: vec![0; words_per_row * height as usize],
        }
    }

    pub fn filled(width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |_, _| true)
    }

    pub fn from_fn(width: u32, height: u32, mut opaque: impl FnMut(u32, u32) -> bool) -> Self {
        let mut mask = Self::empty(width, height);
        for y in 0..height {
            for x in 0..width {
                if opaque(x, y) {
                    mask.set(x, y);
                }
            }
        }
        mask
    }

    /// Ellipse inscribed in the mask's rectangle.
    pub fn ellipse(width: u32, height: u32) -> Self {
        let rx = width as f32 * 0.5;
        let ry = height as f32 * 0.5;
        Self::from_fn(width, height, |x, y| {
            let dx = (x as f32 + 0.5 - rx) / rx;
            let dy = (y as f32 + 0.5 - ry) / ry;
            dx * dx + dy * dy <= 1.0
        })
    }

    /// Upward-pointing triangle: apex at the top center, base along the
    /// bottom row.
    pub fn triangle(width: u32, height: u32) -> Self {
        let half = width as f32 * 0.5;
        Self::from_fn(width, height, |x, y| {
            let reach = half * (y as f32 + 1.0) / height as f32;
            (x as f32 + 0.5 - half).abs() <= reach
        })
    }

    /// Build from text rows where `#` marks an opaque pixel.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
        let mut mask = Self::empty(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c == '#' {
                    mask.set(x as u32, y as u32);
                }
            }
        }
        mask
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set(&mut self, x: u32, y: u32) {
        if x < self.width && y < self.height {
            let idx = y as usize * self.words_per_row + (x as usize / 64);
            self.bits[idx] |= 1u64 << (x % 64);
        }
    }

    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        let idx = y as usize * self.words_per_row + (x as usize / 64);
        self.bits[idx] & (1u64 << (x as u64 % 64)) != 0
    }

    pub fn count(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    /// True when any opaque pixel of `self` placed at `origin` (top-left)
    /// coincides with an opaque pixel of `other` placed at `other_origin`.
    /// Origins are floored to whole pixels.
    pub fn overlaps(&self, origin: Vec2, other: &Mask, other_origin: Vec2) -> bool {
        let ax = origin.x.floor() as i64;
        let ay = origin.y.floor() as i64;
        let bx = other_origin.x.floor() as i64;
        let by = other_origin.y.floor() as i64;

        let left = ax.max(bx);
        let right = (ax + self.width as i64).min(bx + other.width as i64);
        let top = ay.max(by);
        let bottom = (ay + self.height as i64).min(by + other.height as i64);
        if left >= right || top >= bottom {
            return false;
        }

        for y in top..bottom {
            for x in left..right {
                if self.get(x - ax, y - ay) && other.get(x - bx, y - by) {
                    return true;
                }
            }
        }
        false
    }
}

/// Collision test to use for a pair of entity categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precision {
    /// Pixel-accurate; for irregular sprites such as the hero and enemies.
    Mask,
    /// Bounding circles; for shields.
    Circle,
    /// Bounding rectangles; for bullets and the laser.
    Rect,
}
