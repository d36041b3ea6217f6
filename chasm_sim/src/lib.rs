//! # chasm_sim
//!
//! Real-time core of the chasm runner: fixed-step physics, forgiving
//! landing resolution, scoring and the Idle → Running → Over state machine.
//!
//! The host calls [`Simulation::tick`] once per rendered frame with the
//! latest grip level as jump intent.  Everything a run reports outward goes
//! through the injected [`RunEvents`] collaborator.
//!
//! ```rust
//! use chasm_sim::{RunEvent, RunStatus, Simulation};
//! use chasm_world::Tuning;
//!
//! let mut sim = Simulation::with_seed(Tuning::default(), 1, Vec::<RunEvent>::new());
//! sim.start();
//! let report = sim.tick(true);
//! assert!(report.jumped);
//! assert_eq!(sim.status(), RunStatus::Running);
//! assert_eq!(sim.events(), &vec![RunEvent::Started, RunEvent::Jumped]);
//! ```
//!
//! ## Tick order
//!
//! 1. scroll by `scroll_speed`
//! 2. jump impulse if intent is held and the player is grounded
//! 3. `vy += gravity; y += vy`
//! 4. land on the first overlapping platform inside the tolerance window
//! 5. retire the lead platform once it is behind the player (+1 point)
//! 6. top the platform buffer back up
//! 7. game over if the player fell below the playfield

pub mod autopilot;
pub mod events;
pub mod physics;
pub mod run;

pub use events::{NullEvents, RunEvent, RunEvents};
pub use physics::{Player, StepOutcome};
pub use run::{RunStatus, Simulation, TickReport};
