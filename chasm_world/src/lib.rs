//! # chasm_world
//!
//! The world of an endless chasm runner: the fixed [`Tuning`] constants and
//! the [`WorldGenerator`] that lays platforms out ahead of the player.
//!
//! Every chasm the generator draws is jumpable.  One full jump arc lasts
//! `2 × |jump_velocity| / gravity` ticks, during which the world scrolls
//! `scroll_speed` per tick, so the widest crossable chasm is
//!
//! ```text
//! max_jump_distance = scroll_speed × 2 × |jump_velocity| / gravity
//! ```
//!
//! Gaps are drawn from `[min_gap, max_gap)` and [`Tuning::validate`]
//! requires `max_gap ≤ max_jump_distance − gap_safety_margin`.
//!
//! ```rust
//! use chasm_world::{Tuning, WorldGenerator};
//! use std::collections::VecDeque;
//!
//! let tuning = Tuning::default();
//! let mut world = WorldGenerator::with_seed(tuning, 7);
//! let mut platforms = VecDeque::new();
//! world.seed(&mut platforms);
//! world.ensure_ahead(&mut platforms, tuning.lookahead_platforms);
//! assert_eq!(platforms.len(), 5);
//! assert_eq!(platforms[0].x, 0.0);
//! ```

use std::collections::VecDeque;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Tuning
// ════════════════════════════════════════════════════════════════════════════

/// Physics, layout and generation constants for one game.
///
/// World units match playfield pixels; `y` grows downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    // ── physics (per tick) ───────────────────────────────────────────────
    pub gravity:           f32,
    /// Vertical velocity applied at a jump; negative is upward.
    pub jump_velocity:     f32,
    pub scroll_speed:      f32,

    // ── layout ───────────────────────────────────────────────────────────
    pub playfield_width:   f32,
    pub playfield_height:  f32,
    /// Height of every platform's top surface.
    pub ground_top:        f32,
    pub player_size:       f32,
    /// Fixed on-screen x of the player's left edge.
    pub player_screen_x:   f32,
    /// Horizontal shrink of the player's hitbox on each side.
    pub hitbox_inset:      f32,
    /// Downward slack below `ground_top` that still counts as a landing.
    pub landing_tolerance: f32,

    // ── generation ───────────────────────────────────────────────────────
    pub first_platform_width: f32,
    pub min_gap:           f32,
    pub max_gap:           f32,
    pub gap_safety_margin: f32,
    pub min_width:         f32,
    pub max_width:         f32,
    /// Platforms kept alive at all times.
    pub lookahead_platforms: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            gravity:           0.45,
            jump_velocity:     -13.0,
            scroll_speed:      2.5,

            playfield_width:   800.0,
            playfield_height:  450.0,
            ground_top:        350.0,
            player_size:       50.0,
            player_screen_x:   100.0,
            hitbox_inset:      5.0,
            landing_tolerance: 25.0,

            first_platform_width: 600.0,
            min_gap:           40.0,
            max_gap:           110.0,
            gap_safety_margin: 30.0,
            min_width:         180.0,
            max_width:         430.0,
            lookahead_platforms: 5,
        }
    }
}

/// A configured constant that would break the game.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    #[error("{name} must be positive (got {value})")]
    NotPositive { name: &'static str, value: f32 },

    #[error("jump_velocity must be negative (upward), got {0}")]
    JumpNotUpward(f32),

    #[error("gap range [{min}, {max}) is empty")]
    EmptyGapRange { min: f32, max: f32 },

    #[error("width range [{min}, {max}] is empty")]
    EmptyWidthRange { min: f32, max: f32 },

    #[error("max_gap {max_gap} exceeds jumpable limit {limit:.1} (max jump {max_jump:.1} − margin)")]
    UnjumpableGap { max_gap: f32, limit: f32, max_jump: f32 },

    #[error("lookahead_platforms must be at least 1")]
    NoLookahead,

    #[error("first_platform_width {width} leaves no room to start (need at least {min})")]
    ShortFirstPlatform { width: f32, min: f32 },

    #[error("landing_tolerance {tolerance} is below the landing speed {landing_speed}")]
    LandingSlack { tolerance: f32, landing_speed: f32 },
}

impl Tuning {
    /// Air time of a full jump arc from and back to the same height, in ticks.
    pub fn air_ticks(&self) -> f32 {
        2.0 * self.jump_velocity.abs() / self.gravity
    }

    /// Widest horizontal distance covered during one jump arc.
    pub fn max_jump_distance(&self) -> f32 {
        self.scroll_speed * self.air_ticks()
    }

    /// Upper bound every generated gap stays strictly below.
    pub fn gap_limit(&self) -> f32 {
        self.max_jump_distance() - self.gap_safety_margin
    }

    /// Player's top edge when standing on a platform.
    pub fn standing_y(&self) -> f32 {
        self.ground_top - self.player_size
    }

    /// Shortest first platform that holds the whole player at scroll 0.
    pub fn start_runway(&self) -> f32 {
        self.player_screen_x + self.player_size
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let positives = [
            ("gravity",              self.gravity),
            ("scroll_speed",         self.scroll_speed),
            ("playfield_width",      self.playfield_width),
            ("playfield_height",     self.playfield_height),
            ("player_size",          self.player_size),
            ("first_platform_width", self.first_platform_width),
            ("landing_tolerance",    self.landing_tolerance),
            ("min_gap",              self.min_gap),
            ("min_width",            self.min_width),
        ];
        for (name, value) in positives {
            // `!(v > 0)` also rejects NaN.
            if !(value > 0.0) {
                return Err(TuningError::NotPositive { name, value });
            }
        }
        if !(self.jump_velocity < 0.0) {
            return Err(TuningError::JumpNotUpward(self.jump_velocity));
        }
        if !(self.min_gap < self.max_gap) {
            return Err(TuningError::EmptyGapRange { min: self.min_gap, max: self.max_gap });
        }
        if !(self.min_width <= self.max_width) {
            return Err(TuningError::EmptyWidthRange { min: self.min_width, max: self.max_width });
        }
        if self.max_gap > self.gap_limit() {
            return Err(TuningError::UnjumpableGap {
                max_gap:  self.max_gap,
                limit:    self.gap_limit(),
                max_jump: self.max_jump_distance(),
            });
        }
        if self.lookahead_platforms == 0 {
            return Err(TuningError::NoLookahead);
        }
        if self.first_platform_width < self.start_runway() {
            return Err(TuningError::ShortFirstPlatform {
                width: self.first_platform_width,
                min:   self.start_runway(),
            });
        }
        // Less slack than the landing speed lets a falling player skip the surface.
        if self.landing_tolerance < self.jump_velocity.abs() {
            return Err(TuningError::LandingSlack {
                tolerance:     self.landing_tolerance,
                landing_speed: self.jump_velocity.abs(),
            });
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Platform
// ════════════════════════════════════════════════════════════════════════════

/// A solid span of ground in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Platform {
    pub x:     f32,
    pub width: f32,
}

impl Platform {
    /// World x of the trailing edge.
    pub fn end(&self) -> f32 { self.x + self.width }

    /// Strict overlap with the open interval `(left, right)`.
    pub fn overlaps(&self, left: f32, right: f32) -> bool {
        right > self.x && left < self.end()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// WorldGenerator
// ════════════════════════════════════════════════════════════════════════════

/// Appends randomly sized platforms behind a moving frontier.
#[derive(Debug)]
pub struct WorldGenerator {
    tuning:   Tuning,
    rng:      StdRng,
    frontier: f32,
}

impl WorldGenerator {
    /// Generator seeded from the operating system.
    pub fn new(tuning: Tuning) -> Self {
        Self::from_rng(tuning, StdRng::from_os_rng())
    }

    /// Deterministic generator; the same seed lays out the same course.
    pub fn with_seed(tuning: Tuning, seed: u64) -> Self {
        Self::from_rng(tuning, StdRng::seed_from_u64(seed))
    }

    fn from_rng(tuning: Tuning, rng: StdRng) -> Self {
        debug_assert!(tuning.validate().is_ok(), "invalid tuning: {:?}", tuning.validate());
        WorldGenerator { tuning, rng, frontier: 0.0 }
    }

    pub fn tuning(&self) -> &Tuning { &self.tuning }

    /// World x where the next chasm starts.
    pub fn frontier(&self) -> f32 { self.frontier }

    /// Reset `platforms` to the single wide starting platform at x = 0.
    pub fn seed(&mut self, platforms: &mut VecDeque<Platform>) {
        platforms.clear();
        let first = Platform { x: 0.0, width: self.tuning.first_platform_width };
        self.frontier = first.end();
        platforms.push_back(first);
    }

    /// Draw one chasm and one platform past the frontier and append it.
    pub fn spawn_next(&mut self, platforms: &mut VecDeque<Platform>) -> Platform {
        let t = &self.tuning;
        let gap   = self.rng.random_range(t.min_gap..t.max_gap);
        let width = self.rng.random_range(t.min_width..=t.max_width);

        let platform = Platform { x: self.frontier + gap, width };
        debug!("spawn platform x={:.1} width={:.1} gap={:.1}", platform.x, width, gap);

        self.frontier = platform.end();
        platforms.push_back(platform);
        platform
    }

    /// Spawn until at least `min_count` platforms exist.  Returns how many
    /// were added.
    pub fn ensure_ahead(&mut self, platforms: &mut VecDeque<Platform>, min_count: usize) -> usize {
        let mut added = 0;
        while platforms.len() < min_count {
            self.spawn_next(platforms);
            added += 1;
        }
        added
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> (WorldGenerator, VecDeque<Platform>) {
        let mut g = WorldGenerator::with_seed(Tuning::default(), seed);
        let mut p = VecDeque::new();
        g.seed(&mut p);
        (g, p)
    }

    #[test]
    fn default_tuning_is_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn max_jump_distance_matches_arc() {
        let t = Tuning::default();
        // 2.5 × 2 × 13 / 0.45 ≈ 144.4
        assert!((t.max_jump_distance() - 144.444).abs() < 0.01);
        assert!(t.max_gap <= t.gap_limit());
    }

    #[test]
    fn validate_rejects_unjumpable_gap() {
        let t = Tuning { max_gap: 130.0, ..Tuning::default() };
        assert!(matches!(t.validate(), Err(TuningError::UnjumpableGap { .. })));
    }

    #[test]
    fn validate_rejects_bad_constants() {
        let t = Tuning { gravity: 0.0, ..Tuning::default() };
        assert!(matches!(t.validate(), Err(TuningError::NotPositive { name: "gravity", .. })));

        let t = Tuning { jump_velocity: 13.0, ..Tuning::default() };
        assert_eq!(t.validate(), Err(TuningError::JumpNotUpward(13.0)));

        let t = Tuning { min_gap: 110.0, ..Tuning::default() };
        assert!(matches!(t.validate(), Err(TuningError::EmptyGapRange { .. })));

        let t = Tuning { min_width: 500.0, ..Tuning::default() };
        assert!(matches!(t.validate(), Err(TuningError::EmptyWidthRange { .. })));

        let t = Tuning { lookahead_platforms: 0, ..Tuning::default() };
        assert_eq!(t.validate(), Err(TuningError::NoLookahead));

        let t = Tuning { scroll_speed: f32::NAN, ..Tuning::default() };
        assert!(t.validate().is_err());

        let t = Tuning { landing_tolerance: -1.0, ..Tuning::default() };
        assert!(matches!(
            t.validate(),
            Err(TuningError::NotPositive { name: "landing_tolerance", .. })
        ));

        let t = Tuning { landing_tolerance: 5.0, ..Tuning::default() };
        assert_eq!(
            t.validate(),
            Err(TuningError::LandingSlack { tolerance: 5.0, landing_speed: 13.0 })
        );

        let t = Tuning { first_platform_width: 50.0, ..Tuning::default() };
        assert_eq!(
            t.validate(),
            Err(TuningError::ShortFirstPlatform { width: 50.0, min: 150.0 })
        );
        let t = Tuning { first_platform_width: 150.0, ..Tuning::default() };
        assert_eq!(t.validate(), Ok(()));
    }

    #[test]
    fn seed_starts_with_wide_platform_at_origin() {
        let (g, p) = seeded(1);
        assert_eq!(p.len(), 1);
        assert_eq!(p[0], Platform { x: 0.0, width: 600.0 });
        assert_eq!(g.frontier(), 600.0);
    }

    #[test]
    fn ensure_ahead_fills_to_target() {
        let (mut g, mut p) = seeded(2);
        assert_eq!(g.ensure_ahead(&mut p, 5), 4);
        assert_eq!(p.len(), 5);
        assert_eq!(g.ensure_ahead(&mut p, 5), 0);
        p.pop_front();
        assert_eq!(g.ensure_ahead(&mut p, 5), 1);
    }

    #[test]
    fn frontier_tracks_last_platform_end() {
        let (mut g, mut p) = seeded(3);
        for _ in 0..10 {
            let plat = g.spawn_next(&mut p);
            assert_eq!(g.frontier(), plat.end());
        }
    }

    #[test]
    fn every_gap_is_jumpable_over_long_runs() {
        let t = Tuning::default();
        for seed in 0..8 {
            let (mut g, mut p) = seeded(seed);
            for _ in 0..5_000 {
                let before = g.frontier();
                let plat = g.spawn_next(&mut p);
                let gap = plat.x - before;
                assert!(gap >= t.min_gap, "gap {} below min", gap);
                assert!(gap < t.gap_limit(), "gap {} not jumpable", gap);
                assert!(gap < t.max_jump_distance());
                assert!(plat.width >= t.min_width && plat.width <= t.max_width);
                p.pop_front();
            }
        }
    }

    #[test]
    fn platforms_stay_ordered_without_overlap() {
        let (mut g, mut p) = seeded(4);
        g.ensure_ahead(&mut p, 50);
        for w in p.iter().collect::<Vec<_>>().windows(2) {
            assert!(w[1].x > w[0].end());
        }
    }

    #[test]
    fn same_seed_same_course() {
        let (mut a, mut pa) = seeded(99);
        let (mut b, mut pb) = seeded(99);
        a.ensure_ahead(&mut pa, 20);
        b.ensure_ahead(&mut pb, 20);
        assert_eq!(pa, pb);
    }

    #[test]
    fn overlap_is_strict() {
        let p = Platform { x: 100.0, width: 50.0 };
        assert!(p.overlaps(90.0, 101.0));
        assert!(!p.overlaps(50.0, 100.0));
        assert!(!p.overlaps(150.0, 200.0));
        assert!(p.overlaps(149.0, 200.0));
    }
}
