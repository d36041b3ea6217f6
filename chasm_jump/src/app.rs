//! Top-level application: the frame loop tying input, simulation, sound
//! and rendering together.
//!
//! `AppState` owns the `Simulation` and the cue player (through
//! [`SoundEvents`]).  Each frame it applies window commands, ticks the
//! simulation with the latest grip sample, and hands a [`Scene`] to the
//! visualizer.

use std::sync::mpsc;
use std::time::Instant;

use chasm_sim::{RunEvents, RunStatus, Simulation, TickReport};
use hand_grip::GripSample;
use log::{debug, info};

use crate::audio::{Cue, CuePlayer};
use crate::config::{AppConfig, SourceKind};
use crate::error::AppError;
use crate::gesture::{spawn_gesture_source, GripReader, JsonLinesSource, SimGestureSource};
use crate::visualizer::{Scene, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// UiCommand — window keys that are not hand input
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// Enter: start from the menu, or retry after a fall.
    Start,
    /// M: back to the menu from the game-over screen.
    Menu,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// SoundEvents — run events → cues
// ════════════════════════════════════════════════════════════════════════════

pub struct SoundEvents {
    cues:     CuePlayer,
    last_cue: Option<Cue>,
}

impl SoundEvents {
    pub fn new(cues: CuePlayer) -> Self {
        SoundEvents { cues, last_cue: None }
    }

    fn cue(&mut self, cue: Cue) {
        self.last_cue = Some(cue);
        self.cues.play(cue);
    }

    pub fn last_cue(&self) -> Option<Cue> { self.last_cue }
}

impl RunEvents for SoundEvents {
    fn on_start(&mut self) {
        self.cue(Cue::Start);
    }

    fn on_jump(&mut self) {
        self.cue(Cue::Jump);
    }

    fn on_point(&mut self, _score: u32) {
        self.cue(Cue::Point);
    }

    fn on_game_over(&mut self, _final_score: u32) {
        self.cue(Cue::Fall);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    sim:  Simulation<SoundEvents>,
    grip: GripSample,
    quit: bool,
}

impl AppState {
    pub fn new(cfg: &AppConfig, cues: CuePlayer) -> Self {
        let events = SoundEvents::new(cues);
        let sim = match cfg.seed {
            Some(seed) => Simulation::with_seed(cfg.tuning, seed, events),
            None       => Simulation::new(cfg.tuning, events),
        };
        AppState { sim, grip: GripSample::default(), quit: false }
    }

    pub fn handle_command(&mut self, cmd: UiCommand) {
        match cmd {
            UiCommand::Start => {
                let accepted = match self.sim.status() {
                    RunStatus::Over => self.sim.restart(),
                    _               => self.sim.start(),
                };
                if !accepted {
                    debug!("start key ignored while {:?}", self.sim.status());
                }
            }
            UiCommand::Menu => {
                self.sim.return_to_menu();
            }
            UiCommand::Quit => self.quit = true,
        }
    }

    /// One frame.  The simulation only advances while Running.
    pub fn tick(&mut self, grip: GripSample) -> TickReport {
        self.grip = grip;
        if self.sim.is_running() {
            self.sim.tick(grip.gripping)
        } else {
            TickReport::default()
        }
    }

    pub fn scene(&self, clock: f32) -> Scene<'_> {
        Scene {
            status:     self.sim.status(),
            player:     self.sim.player(),
            platforms:  self.sim.platforms(),
            scroll:     self.sim.scroll(),
            score:      self.sim.score(),
            high_score: self.sim.high_score(),
            grip:       self.grip,
            tuning:     self.sim.tuning(),
            clock,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn sim(&self)         -> &Simulation<SoundEvents> { &self.sim }
    pub fn grip(&self)        -> GripSample               { self.grip }
    pub fn should_quit(&self) -> bool                     { self.quit }
    pub fn last_cue(&self)    -> Option<Cue>              { self.sim.events().last_cue() }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "leap")]
fn spawn_leap() -> Result<GripReader, AppError> {
    Ok(spawn_gesture_source(crate::gesture::LeapGestureSource))
}

#[cfg(not(feature = "leap"))]
fn spawn_leap() -> Result<GripReader, AppError> {
    Err(AppError::Usage(
        "LeapMotion input needs a build with `--features leap`".to_string(),
    ))
}

/// Run the game until the window closes or the player quits.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    // ── Hand input ────────────────────────────────────────────────────────
    let (sim_tx, mut grip) = match cfg.source {
        SourceKind::Sim => {
            let (tx, rx) = mpsc::channel();
            (Some(tx), spawn_gesture_source(SimGestureSource { rx }))
        }
        SourceKind::Stdin => (None, spawn_gesture_source(JsonLinesSource::stdin())),
        SourceKind::Leap  => (None, spawn_leap()?),
    };
    info!("hand input: {:?}", cfg.source);

    // ── Window and game ───────────────────────────────────────────────────
    let mut vis = Visualizer::new(&cfg.tuning, sim_tx)?;
    let mut app = AppState::new(&cfg, CuePlayer::spawn(&cfg.audio));
    let clock = Instant::now();

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() && !app.should_quit() {
        for cmd in vis.poll_input() {
            app.handle_command(cmd);
        }
        app.tick(grip.latest());
        vis.render(&app.scene(clock.elapsed().as_secs_f32()))?;
    }

    info!("bye (best: {})", app.sim().high_score());
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
