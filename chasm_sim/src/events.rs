//! Run events delivered to the presentation / audio collaborator.

/// Receiver for everything a run reports outward.
///
/// All methods default to doing nothing so a collaborator only implements
/// what it cares about.
pub trait RunEvents {
    /// A new run began.
    fn on_start(&mut self) {}
    /// The player left the ground.
    fn on_jump(&mut self) {}
    /// A platform scrolled behind the player; `score` is the new total.
    fn on_point(&mut self, _score: u32) {}
    /// The player fell out of the playfield.
    fn on_game_over(&mut self, _final_score: u32) {}
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEvents;

impl RunEvents for NullEvents {}

/// A recorded event; `Vec<RunEvent>` is a ready-made recorder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunEvent {
    Started,
    Jumped,
    Point { score: u32 },
    GameOver { final_score: u32 },
}

impl RunEvents for Vec<RunEvent> {
    fn on_start(&mut self)                   { self.push(RunEvent::Started); }
    fn on_jump(&mut self)                    { self.push(RunEvent::Jumped); }
    fn on_point(&mut self, score: u32)       { self.push(RunEvent::Point { score }); }
    fn on_game_over(&mut self, final_score: u32) {
        self.push(RunEvent::GameOver { final_score });
    }
}

impl<E: RunEvents + ?Sized> RunEvents for &mut E {
    fn on_start(&mut self)                       { (**self).on_start() }
    fn on_jump(&mut self)                        { (**self).on_jump() }
    fn on_point(&mut self, score: u32)           { (**self).on_point(score) }
    fn on_game_over(&mut self, final_score: u32) { (**self).on_game_over(final_score) }
}
