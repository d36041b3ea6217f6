//! Headless runs driven by the autopilot, one line per run.
//!
//! Usage: `autopilot [runs] [max_ticks]`

use chasm_sim::{autopilot, RunEvents, RunStatus, Simulation};
use chasm_world::Tuning;

/// Keeps a jump tally instead of an event log.
#[derive(Default)]
struct JumpCounter {
    jumps: u64,
}

impl RunEvents for JumpCounter {
    fn on_jump(&mut self) {
        self.jumps += 1;
    }
}

fn main() {
    let mut args = std::env::args().skip(1);
    let runs: u64      = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);
    let max_ticks: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(36_000);

    println!("\n=== Chasm Autopilot ({} runs, up to {} ticks each) ===\n", runs, max_ticks);

    for seed in 0..runs {
        let mut sim = Simulation::with_seed(Tuning::default(), seed, JumpCounter::default());
        sim.start();
        while sim.status() == RunStatus::Running && sim.ticks() < max_ticks {
            let intent = autopilot::wants_jump(&sim);
            sim.tick(intent);
        }
        println!(
            "   seed {:<3} {:<8} score={:<5} jumps={:<5} distance={:.0}",
            seed,
            format!("{:?}", sim.status()),
            sim.score(),
            sim.events().jumps,
            sim.scroll(),
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chasm_sim::RunEvent;

    #[test]
    fn counter_matches_the_event_log() {
        let mut counted = Simulation::with_seed(Tuning::default(), 3, JumpCounter::default());
        let mut logged  = Simulation::with_seed(Tuning::default(), 3, Vec::<RunEvent>::new());
        counted.start();
        logged.start();
        for _ in 0..2_000 {
            let a = autopilot::wants_jump(&counted);
            let b = autopilot::wants_jump(&logged);
            counted.tick(a);
            logged.tick(b);
        }
        let logged_jumps = logged.events().iter().filter(|e| **e == RunEvent::Jumped).count();
        assert!(counted.events().jumps > 0);
        assert_eq!(counted.events().jumps, logged_jumps as u64);
    }
}
