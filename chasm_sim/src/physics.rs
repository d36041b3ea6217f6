//! Vertical motion and landing resolution.
//!
//! The player never moves horizontally on screen; the world scrolls under
//! it.  One call to [`step`] is one simulation tick: scroll, optional jump
//! impulse, semi-implicit Euler integration, then landing against the
//! platform set.

use std::collections::VecDeque;

use chasm_world::{Platform, Tuning};

// ════════════════════════════════════════════════════════════════════════════
// Player
// ════════════════════════════════════════════════════════════════════════════

/// Vertical state of the runner.  `y` is the top edge, growing downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Player {
    pub y:        f32,
    pub vy:       f32,
    pub grounded: bool,
}

impl Player {
    /// Standing at rest on the platform surface.
    pub fn standing(tuning: &Tuning) -> Self {
        Player { y: tuning.standing_y(), vy: 0.0, grounded: true }
    }

    pub fn bottom(&self, tuning: &Tuning) -> f32 {
        self.y + tuning.player_size
    }

    /// Apply the jump impulse if grounded.  Returns whether a jump started.
    pub fn jump(&mut self, tuning: &Tuning) -> bool {
        if !self.grounded {
            return false;
        }
        self.vy = tuning.jump_velocity;
        self.grounded = false;
        true
    }

    /// One semi-implicit Euler step: velocity first, then position.
    pub fn integrate(&mut self, tuning: &Tuning) {
        self.vy += tuning.gravity;
        self.y += self.vy;
    }

    /// Whether the player's bottom edge is inside the landing window of the
    /// surface while falling or at rest.
    pub fn can_land(&self, tuning: &Tuning) -> bool {
        let bottom = self.bottom(tuning);
        bottom >= tuning.ground_top
            && bottom <= tuning.ground_top + tuning.landing_tolerance
            && self.vy >= 0.0
    }

    /// Land on the first platform (in the given order) overlapping the
    /// hitbox `(left, right)`.  Snaps to the surface and returns the index of
    /// that platform; clears `grounded` when nothing catches the player.
    pub fn resolve_landing<'a, I>(&mut self, platforms: I, left: f32, right: f32, tuning: &Tuning) -> Option<usize>
    where
        I: IntoIterator<Item = &'a Platform>,
    {
        let hit = platforms
            .into_iter()
            .position(|p| p.overlaps(left, right) && self.can_land(tuning));

        match hit {
            Some(_) => {
                self.y = tuning.standing_y();
                self.vy = 0.0;
                self.grounded = true;
            }
            None => self.grounded = false,
        }
        hit
    }

    /// Top edge has dropped below the playfield.
    pub fn fell_out(&self, tuning: &Tuning) -> bool {
        self.y > tuning.playfield_height
    }
}

/// World-space horizontal extent of the player's hitbox at `scroll`.
pub fn hitbox(scroll: f32, tuning: &Tuning) -> (f32, f32) {
    let x = scroll + tuning.player_screen_x;
    (x + tuning.hitbox_inset, x + tuning.player_size - tuning.hitbox_inset)
}

// ════════════════════════════════════════════════════════════════════════════
// step
// ════════════════════════════════════════════════════════════════════════════

/// What happened during one physics step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub jumped:   bool,
    /// Resting on a platform at the end of the step.
    pub landed:   bool,
    pub fell_out: bool,
}

/// Advance `scroll` and `player` by one tick.
pub fn step(
    player:      &mut Player,
    platforms:   &VecDeque<Platform>,
    scroll:      &mut f32,
    jump_intent: bool,
    tuning:      &Tuning,
) -> StepOutcome {
    *scroll += tuning.scroll_speed;

    let jumped = jump_intent && player.jump(tuning);

    player.integrate(tuning);

    let (left, right) = hitbox(*scroll, tuning);
    let landed = player.resolve_landing(platforms, left, right, tuning).is_some();

    StepOutcome { jumped, landed, fell_out: player.fell_out(tuning) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> VecDeque<Platform> {
        VecDeque::from(vec![Platform { x: 0.0, width: 600.0 }])
    }

    fn airborne(bottom: f32, vy: f32, t: &Tuning) -> Player {
        Player { y: bottom - t.player_size, vy, grounded: false }
    }

    #[test]
    fn jump_applies_exact_impulse() {
        let t = Tuning::default();
        let mut p = Player::standing(&t);
        assert!(p.jump(&t));
        assert_eq!(p.vy, -13.0);
        assert!(!p.grounded);
    }

    #[test]
    fn airborne_player_cannot_jump() {
        let t = Tuning::default();
        let mut p = airborne(300.0, -4.0, &t);
        assert!(!p.jump(&t));
        assert_eq!(p.vy, -4.0);
    }

    #[test]
    fn landing_inside_window_snaps_to_surface() {
        let t = Tuning::default();
        let mut p = airborne(t.ground_top + 10.0, 6.0, &t);
        assert_eq!(p.resolve_landing(&ground(), 105.0, 145.0, &t), Some(0));
        assert_eq!(p.bottom(&t), t.ground_top);
        assert_eq!(p.vy, 0.0);
        assert!(p.grounded);
    }

    #[test]
    fn landing_window_edges() {
        let t = Tuning::default();
        let plats = ground();

        // Exactly on the surface at rest.
        let mut p = airborne(t.ground_top, 0.0, &t);
        assert!(p.resolve_landing(&plats, 105.0, 145.0, &t).is_some());

        // Exactly at the bottom of the slack.
        let mut p = airborne(t.ground_top + t.landing_tolerance, 2.0, &t);
        assert!(p.resolve_landing(&plats, 105.0, 145.0, &t).is_some());

        // Just past the slack.
        let mut p = airborne(t.ground_top + t.landing_tolerance + 0.5, 2.0, &t);
        assert!(p.resolve_landing(&plats, 105.0, 145.0, &t).is_none());
        assert!(!p.grounded);

        // Above the surface: no upward slack.
        let mut p = airborne(t.ground_top - 0.5, 2.0, &t);
        assert!(p.resolve_landing(&plats, 105.0, 145.0, &t).is_none());
    }

    #[test]
    fn rising_player_passes_through() {
        let t = Tuning::default();
        let mut p = airborne(t.ground_top + 5.0, -1.0, &t);
        assert!(p.resolve_landing(&ground(), 105.0, 145.0, &t).is_none());
        assert_eq!(p.vy, -1.0);
    }

    #[test]
    fn no_overlap_means_no_landing() {
        let t = Tuning::default();
        let mut p = airborne(t.ground_top + 5.0, 3.0, &t);
        assert!(p.resolve_landing(&ground(), 600.0, 640.0, &t).is_none());
    }

    #[test]
    fn first_overlapping_platform_wins() {
        let t = Tuning::default();
        let plats = VecDeque::from(vec![
            Platform { x: 0.0,   width: 120.0 },
            Platform { x: 130.0, width: 200.0 },
        ]);
        let mut p = airborne(t.ground_top + 3.0, 3.0, &t);
        assert_eq!(p.resolve_landing(&plats, 110.0, 150.0, &t), Some(0));
        let mut p = airborne(t.ground_top + 3.0, 3.0, &t);
        assert_eq!(p.resolve_landing(&plats, 125.0, 165.0, &t), Some(1));
    }

    #[test]
    fn standing_is_idempotent_across_steps() {
        let t = Tuning::default();
        let plats = ground();
        let mut p = Player::standing(&t);
        let mut scroll = 0.0;
        for _ in 0..50 {
            let out = step(&mut p, &plats, &mut scroll, false, &t);
            assert!(out.landed && !out.jumped && !out.fell_out);
            assert_eq!(p, Player::standing(&t));
        }
        assert_eq!(scroll, 125.0);
    }

    #[test]
    fn step_jump_then_integrates() {
        let t = Tuning::default();
        let mut p = Player::standing(&t);
        let mut scroll = 0.0;
        let out = step(&mut p, &ground(), &mut scroll, true, &t);
        assert!(out.jumped && !out.landed);
        assert_eq!(p.vy, t.jump_velocity + t.gravity);
        assert_eq!(p.y, t.standing_y() + p.vy);
    }

    #[test]
    fn walking_off_the_edge_falls_out() {
        let t = Tuning::default();
        let plats = VecDeque::from(vec![Platform { x: 0.0, width: 200.0 }]);
        let mut p = Player::standing(&t);
        let mut scroll = 0.0;
        let mut fell = false;
        for _ in 0..200 {
            if step(&mut p, &plats, &mut scroll, false, &t).fell_out {
                fell = true;
                break;
            }
        }
        assert!(fell);
        assert!(!p.grounded);
    }

    #[test]
    fn hitbox_is_inset() {
        let t = Tuning::default();
        assert_eq!(hitbox(0.0, &t), (105.0, 145.0));
        assert_eq!(hitbox(10.0, &t), (115.0, 155.0));
    }
}
