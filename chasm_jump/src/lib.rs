//! # chasm_jump
//!
//! Gesture-controlled endless runner.  The player character runs across a
//! procedurally generated row of platforms; closing your hand into a fist
//! makes it jump the chasm in front of it.
//!
//! ## Hand input
//!
//! | Source | Selected by | Notes |
//! |---|---|---|
//! | Keyboard simulation | `--source sim` (default) | Space = fist, `H` = hand lost |
//! | JSON lines on stdin | `--source stdin` | one landmark frame per line, e.g. from a MediaPipe script |
//! | LeapMotion | `--source leap` | needs the `leap` feature and LeapC installed |
//!
//! Every source reduces to the same [`hand_grip::GripSample`]; a fist is
//! three or more fingers with the tip below its knuckle.
//!
//! ## Window keys
//!
//! | Key | Action |
//! |---|---|
//! | `Enter` | Start from the menu / retry after a fall |
//! | `M` | Back to the menu from the game-over screen |
//! | `Space` | Simulated fist (sim source only) |
//! | `H` | Toggle simulated "hand lost" (sim source only) |
//! | `Q` / `Escape` | Quit |
//!
//! ## Feature flags
//!
//! * (default) keyboard simulation or piped tracker frames, no hardware needed.
//! * `leap` polls a real LeapMotion controller via LeapC.

pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod gesture;
pub mod visualizer;

pub use config::AppConfig;
pub use error::AppError;
