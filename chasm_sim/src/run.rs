//! The run state machine.
//!
//! `Simulation` owns every per-run entity (player, scroll, platforms,
//! score) and is advanced by exactly one [`Simulation::tick`] per rendered
//! frame.  It never ticks on its own and does nothing unless Running.

use std::collections::VecDeque;

use chasm_world::{Platform, Tuning, WorldGenerator};
use log::{debug, info};

use crate::events::{NullEvents, RunEvents};
use crate::physics::{self, Player};

// ════════════════════════════════════════════════════════════════════════════
// Status
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus { Idle, Running, Over }

/// Summary of one tick, mostly for the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub jumped:    bool,
    pub scored:    bool,
    pub game_over: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Simulation
// ════════════════════════════════════════════════════════════════════════════

pub struct Simulation<E: RunEvents = NullEvents> {
    tuning:     Tuning,
    world:      WorldGenerator,
    platforms:  VecDeque<Platform>,
    player:     Player,
    scroll:     f32,

    status:     RunStatus,
    score:      u32,
    high_score: u32,
    ticks:      u64,

    events:     E,
}

impl<E: RunEvents> Simulation<E> {
    /// A fresh, Idle simulation with an OS-seeded course.
    pub fn new(tuning: Tuning, events: E) -> Self {
        Self::from_world(WorldGenerator::new(tuning), events)
    }

    /// A fresh, Idle simulation whose courses are reproducible.
    pub fn with_seed(tuning: Tuning, seed: u64, events: E) -> Self {
        Self::from_world(WorldGenerator::with_seed(tuning, seed), events)
    }

    fn from_world(world: WorldGenerator, events: E) -> Self {
        let tuning = *world.tuning();
        let mut sim = Simulation {
            tuning,
            world,
            platforms:  VecDeque::with_capacity(tuning.lookahead_platforms + 1),
            player:     Player::standing(&tuning),
            scroll:     0.0,
            status:     RunStatus::Idle,
            score:      0,
            high_score: 0,
            ticks:      0,
            events,
        };
        // Lay out a course so there is something to draw behind the menu.
        sim.reset_run();
        sim
    }

    fn reset_run(&mut self) {
        self.player = Player::standing(&self.tuning);
        self.scroll = 0.0;
        self.score  = 0;
        self.ticks  = 0;
        self.world.seed(&mut self.platforms);
        self.world.ensure_ahead(&mut self.platforms, self.tuning.lookahead_platforms);
    }

    fn begin_run(&mut self) {
        self.reset_run();
        self.status = RunStatus::Running;
        info!("run started (best so far: {})", self.high_score);
        self.events.on_start();
    }

    // ── commands ──────────────────────────────────────────────────────────

    /// Idle/Over → Running.  Ignored while a run is in progress.
    pub fn start(&mut self) -> bool {
        if self.status == RunStatus::Running {
            debug!("start ignored: already running");
            return false;
        }
        self.begin_run();
        true
    }

    /// Over → Running.
    pub fn restart(&mut self) -> bool {
        if self.status != RunStatus::Over {
            debug!("restart ignored in {:?}", self.status);
            return false;
        }
        self.begin_run();
        true
    }

    /// Over → Idle.
    pub fn return_to_menu(&mut self) -> bool {
        if self.status != RunStatus::Over {
            debug!("return_to_menu ignored in {:?}", self.status);
            return false;
        }
        self.status = RunStatus::Idle;
        true
    }

    // ── per-frame tick ────────────────────────────────────────────────────

    /// Advance one frame with the latest grip level as jump intent.
    pub fn tick(&mut self, jump_intent: bool) -> TickReport {
        if self.status != RunStatus::Running {
            return TickReport::default();
        }
        self.ticks += 1;

        let outcome = physics::step(
            &mut self.player,
            &self.platforms,
            &mut self.scroll,
            jump_intent,
            &self.tuning,
        );
        let mut report = TickReport { jumped: outcome.jumped, ..TickReport::default() };
        if outcome.jumped {
            self.events.on_jump();
        }

        // Retire the lead platform once it is entirely behind the player.
        let front = self.scroll_front();
        if self.platforms.front().is_some_and(|p| p.end() < front) {
            self.platforms.pop_front();
            self.score += 1;
            report.scored = true;
            self.events.on_point(self.score);
        }

        self.world.ensure_ahead(&mut self.platforms, self.tuning.lookahead_platforms);

        if outcome.fell_out {
            self.status = RunStatus::Over;
            self.high_score = self.high_score.max(self.score);
            info!("run over after {} ticks: score {} (best {})", self.ticks, self.score, self.high_score);
            self.events.on_game_over(self.score);
            report.game_over = true;
        }
        report
    }

    // ── accessors for the render loop ─────────────────────────────────────

    pub fn status(&self)     -> RunStatus            { self.status }
    pub fn is_running(&self) -> bool                 { self.status == RunStatus::Running }
    pub fn player(&self)     -> &Player              { &self.player }
    pub fn platforms(&self)  -> &VecDeque<Platform>  { &self.platforms }
    pub fn scroll(&self)     -> f32                  { self.scroll }
    pub fn score(&self)      -> u32                  { self.score }
    pub fn high_score(&self) -> u32                  { self.high_score }
    pub fn ticks(&self)      -> u64                  { self.ticks }
    pub fn tuning(&self)     -> &Tuning              { &self.tuning }
    pub fn events(&self)     -> &E                   { &self.events }
    pub fn events_mut(&mut self) -> &mut E           { &mut self.events }

    /// World x of the player's fixed screen position.
    pub fn scroll_front(&self) -> f32 {
        self.scroll + self.tuning.player_screen_x
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
