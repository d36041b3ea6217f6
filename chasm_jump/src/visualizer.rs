//! Software-rendered game window using `minifb`.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ SCORE 12                                          BEST 30    │
//! │        ☁                ☁                  ☁                 │
//! │                                                              │
//! │     ┌─┐                                                      │
//! │     └─┘                                                      │
//! │ ▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀    ▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀     ▀▀▀▀▀▀▀▀▀▀▀  │
//! │ [FIST - JUMP!]                                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Drawing goes into a [`Canvas`] so a whole frame can be rendered and
//! inspected without opening a window.

use std::collections::VecDeque;
use std::sync::mpsc::Sender;
use std::time::Duration;

use chasm_sim::{Player, RunStatus};
use chasm_world::{Platform, Tuning};
use hand_grip::GripSample;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::app::UiCommand;
use crate::error::AppError;
use crate::gesture::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Palette
// ════════════════════════════════════════════════════════════════════════════

const SKY_TOP:     u32 = 0xFF87CEEB;
const SKY_BOTTOM:  u32 = 0xFFE0F7FA;
const CLOUD:       u32 = 0xFFFFFFFF;
const GRASS:       u32 = 0xFF4CAF50;
const DIRT:        u32 = 0xFF795548;
const FLOWER_A:    u32 = 0xFFFFEB3B;
const FLOWER_B:    u32 = 0xFFFF4081;
const BODY:        u32 = 0xFFFF4D4D;
const SKIN:        u32 = 0xFFFFE0B2;
const INK:         u32 = 0xFF000000;
const HUD_TEXT:    u32 = 0xFF1A1A2E;
const BADGE_FIST:  u32 = 0xFF22C55E;
const BADGE_OPEN:  u32 = 0xFFEF4444;
const BADGE_NONE:  u32 = 0xFF6B7280;
const WHITE:       u32 = 0xFFFFFFFF;
const GOLD:        u32 = 0xFFFFD700;

// ════════════════════════════════════════════════════════════════════════════
// Scene — everything one frame needs
// ════════════════════════════════════════════════════════════════════════════

pub struct Scene<'a> {
    pub status:     RunStatus,
    pub player:     &'a Player,
    pub platforms:  &'a VecDeque<Platform>,
    pub scroll:     f32,
    pub score:      u32,
    pub high_score: u32,
    pub grip:       GripSample,
    pub tuning:     &'a Tuning,
    /// Wall-clock seconds, for ambient animation only.
    pub clock:      f32,
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — ARGB framebuffer with clipped primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub width:  usize,
    pub height: usize,
    pub buf:    Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { width, height, buf: vec![SKY_TOP; width * height] }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: u32, alpha: f32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            let i = y as usize * self.width + x as usize;
            self.buf[i] = blend(self.buf[i], color, alpha);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        for row in y0..y1 {
            let base = row as usize * self.width;
            for col in x0..x1 {
                self.buf[base + col as usize] = color;
            }
        }
    }

    fn shade_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32, alpha: f32) {
        for row in y..y + h {
            for col in x..x + w {
                self.blend_pixel(col, row, color, alpha);
            }
        }
    }

    fn fill_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: u32, alpha: f32) {
        let (rx, ry) = (rx.max(1), ry.max(1));
        for dy in -ry..=ry {
            for dx in -rx..=rx {
                let nx = dx as f32 / rx as f32;
                let ny = dy as f32 / ry as f32;
                if nx * nx + ny * ny <= 1.0 {
                    self.blend_pixel(cx + dx, cy + dy, color, alpha);
                }
            }
        }
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        self.fill_ellipse(cx, cy, r, r, color, 1.0);
    }

    /// 3×5 bitmap text, each font pixel drawn as a `scale`-sized block.
    fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: i32, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch).unwrap_or(FALLBACK_GLYPH);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3 {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row as i32 * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
        }
    }

    fn draw_text_centered(&mut self, text: &str, y: i32, scale: i32, color: u32) {
        let x = (self.width as i32 - text_width(text, scale)) / 2;
        self.draw_text(text, x, y, scale, color);
    }
}

pub fn text_width(text: &str, scale: i32) -> i32 {
    let n = text.chars().count() as i32;
    if n == 0 { 0 } else { n * 4 * scale - scale }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame rendering
// ════════════════════════════════════════════════════════════════════════════

/// Render one complete frame of `scene`.
pub fn draw_scene(c: &mut Canvas, scene: &Scene<'_>) {
    draw_sky(c, scene.clock);
    for p in scene.platforms {
        draw_platform(c, p, scene.scroll, scene.tuning);
    }
    draw_player(c, scene.player, scene.tuning);
    draw_hud(c, scene);

    match scene.status {
        RunStatus::Idle    => draw_menu(c),
        RunStatus::Over    => draw_game_over(c, scene.score, scene.high_score),
        RunStatus::Running => {}
    }
}

fn draw_sky(c: &mut Canvas, clock: f32) {
    let h = c.height.max(2) - 1;
    for row in 0..c.height {
        let color = blend(SKY_TOP, SKY_BOTTOM, row as f32 / h as f32);
        c.fill_rect(0, row as i32, c.width as i32, 1, color);
    }

    let span = c.width as f32 + 100.0;
    let t = clock / 2.0;
    for i in 0..3 {
        let fi = i as f32;
        let cx = ((100.0 + fi * 300.0 + (t + fi).sin() * 20.0 + clock * 6.0).rem_euclid(span) - 50.0) as i32;
        let cy = 50 + i * 30;
        c.fill_ellipse(cx,      cy,     20, 20, CLOUD, 0.7);
        c.fill_ellipse(cx + 15, cy - 5, 15, 15, CLOUD, 0.7);
        c.fill_ellipse(cx + 30, cy,     15, 15, CLOUD, 0.7);
    }
}

fn draw_platform(c: &mut Canvas, p: &Platform, scroll: f32, tuning: &Tuning) {
    let x = (p.x - scroll).round() as i32;
    let w = p.width.round() as i32;
    if x + w < 0 || x > c.width as i32 {
        return;
    }
    let y = tuning.ground_top as i32;

    c.fill_rect(x, y + 10, w, 100, DIRT);
    c.fill_rect(x, y, w, 25, GRASS);
    c.fill_circle(x + 20, y + 12, 3, FLOWER_A);
    c.fill_circle(x + w - 25, y + 10, 3, FLOWER_B);
}

fn draw_player(c: &mut Canvas, player: &Player, tuning: &Tuning) {
    let x = tuning.player_screen_x as i32;
    let y = player.y.round() as i32;
    let size = tuning.player_size as i32;
    let mid = x + size / 2;

    c.fill_ellipse(mid, y + size + 5, 20, 5, INK, 0.15);
    c.fill_rect(x + 5, y + 10, size - 10, size - 10, BODY);
    c.fill_circle(mid, y + 15, 12, SKIN);
    c.fill_circle(mid - 4, y + 13, 2, INK);
    c.fill_circle(mid + 4, y + 13, 2, INK);
}

fn draw_hud(c: &mut Canvas, scene: &Scene<'_>) {
    if scene.status != RunStatus::Idle {
        c.draw_text(&format!("SCORE {}", scene.score), 16, 16, 3, HUD_TEXT);
        let best = format!("BEST {}", scene.high_score);
        c.draw_text(&best, c.width as i32 - 16 - text_width(&best, 3), 16, 3, HUD_TEXT);
    }

    let (label, color) = grip_badge(scene.grip);
    let w = text_width(label, 2) + 16;
    let y = c.height as i32 - 34;
    c.fill_rect(12, y, w, 24, color);
    c.draw_text(label, 20, y + 7, 2, WHITE);
}

pub fn grip_badge(grip: GripSample) -> (&'static str, u32) {
    match (grip.hand_visible, grip.gripping) {
        (true, true)  => ("FIST - JUMP!", BADGE_FIST),
        (true, false) => ("MAKE A FIST", BADGE_OPEN),
        (false, _)    => ("NO HAND", BADGE_NONE),
    }
}

pub const MENU_LINES: [&str; 3] = ["CHASM JUMP", "MAKE A FIST TO JUMP", "PRESS ENTER TO START"];
pub const RETRY_LINE: &str = "ENTER = RETRY   M = MENU";

fn draw_menu(c: &mut Canvas) {
    c.shade_rect(0, 0, c.width as i32, c.height as i32, INK, 0.35);
    c.draw_text_centered(MENU_LINES[0], 120, 8, WHITE);
    c.draw_text_centered(MENU_LINES[1], 200, 3, GOLD);
    c.draw_text_centered(MENU_LINES[2], 250, 3, WHITE);
}

fn draw_game_over(c: &mut Canvas, score: u32, high_score: u32) {
    c.shade_rect(0, 0, c.width as i32, c.height as i32, INK, 0.45);
    c.draw_text_centered("GAME OVER", 110, 8, BADGE_OPEN);
    c.draw_text_centered(&format!("SCORE {}", score), 190, 4, WHITE);
    c.draw_text_centered(&format!("BEST {}", high_score), 230, 4, GOLD);
    c.draw_text_centered(RETRY_LINE, 290, 2, WHITE);
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer — the window
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
    sim_tx: Option<Sender<SimInput>>,
}

impl Visualizer {
    /// Open a window matching the playfield.  `sim_tx` receives Space/H
    /// events when the keyboard simulator is the active source.
    pub fn new(tuning: &Tuning, sim_tx: Option<Sender<SimInput>>) -> Result<Self, AppError> {
        let width  = tuning.playfield_width.round() as usize;
        let height = tuning.playfield_height.round() as usize;

        let mut window = Window::new(
            "Chasm Jump - make a fist to jump",
            width,
            height,
            WindowOptions { resize: false, ..WindowOptions::default() },
        )?;
        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer { window, canvas: Canvas::new(width, height), sim_tx })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Translate this frame's key presses.  Space and H go to the simulator,
    /// everything else comes back as UI commands.
    pub fn poll_input(&mut self) -> Vec<UiCommand> {
        let mut cmds = Vec::new();
        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if pressed(Key::Q) || pressed(Key::Escape) {
            cmds.push(UiCommand::Quit);
        }
        if pressed(Key::Enter) || pressed(Key::NumPadEnter) {
            cmds.push(UiCommand::Start);
        }
        if pressed(Key::M) {
            cmds.push(UiCommand::Menu);
        }

        if let Some(tx) = &self.sim_tx {
            if pressed(Key::Space) {
                let _ = tx.send(SimInput::KeyDown(SimKey::Grip));
            }
            if self.window.is_key_released(Key::Space) {
                let _ = tx.send(SimInput::KeyUp(SimKey::Grip));
            }
            if pressed(Key::H) {
                let _ = tx.send(SimInput::KeyDown(SimKey::HideHand));
            }
        }
        cmds
    }

    /// Render one frame and present it.
    pub fn render(&mut self, scene: &Scene<'_>) -> Result<(), AppError> {
        draw_scene(&mut self.canvas, scene);
        self.window
            .update_with_buffer(&self.canvas.buf, self.canvas.width, self.canvas.height)?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

const FALLBACK_GLYPH: [u8; 5] = [0b000, 0b000, 0b010, 0b000, 0b000];

fn char_glyph(c: char) -> Option<[u8; 5]> {
    Some(match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => return None,
    })
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t).round() as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
