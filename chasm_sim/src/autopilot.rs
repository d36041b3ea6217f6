//! A trivial scripted player: jump shortly before running out of ground.
//!
//! Used by the `autopilot` binary and by tests that drive long runs to show
//! every generated chasm can be cleared.

use chasm_world::{Platform, Tuning};

use crate::events::RunEvents;
use crate::physics::{hitbox, Player};
use crate::run::Simulation;

/// Remaining ground, in ticks of scrolling, at which the autopilot jumps.
const LEAD_TICKS: f32 = 12.0;

/// Jump intent for the next tick given the current state.
pub fn wants_jump<E: RunEvents>(sim: &Simulation<E>) -> bool {
    should_jump(sim.player(), sim.platforms().iter(), sim.scroll(), sim.tuning())
}

pub fn should_jump<'a, I>(player: &Player, platforms: I, scroll: f32, tuning: &Tuning) -> bool
where
    I: IntoIterator<Item = &'a Platform>,
{
    if !player.grounded {
        return false;
    }
    let (left, right) = hitbox(scroll, tuning);
    platforms
        .into_iter()
        .find(|p| p.overlaps(left, right))
        .is_some_and(|p| p.end() - left <= tuning.scroll_speed * LEAD_TICKS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_while_ground_remains() {
        let t = Tuning::default();
        let plats = [Platform { x: 0.0, width: 600.0 }];
        assert!(!should_jump(&Player::standing(&t), &plats, 0.0, &t));
        // hitbox left = 465 + 105 = 570; 30 units of ground left.
        assert!(should_jump(&Player::standing(&t), &plats, 465.0, &t));
    }

    #[test]
    fn never_jumps_in_the_air() {
        let t = Tuning::default();
        let plats = [Platform { x: 0.0, width: 600.0 }];
        let p = Player { y: 200.0, vy: 1.0, grounded: false };
        assert!(!should_jump(&p, &plats, 480.0, &t));
    }
}
