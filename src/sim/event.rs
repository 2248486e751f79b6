/// Events emitted by the engine during ticks and presses.
/// The presentation layers (sound, renderer hints) and the score
/// coordinator consume these; the engine never calls them directly.

use crate::domain::color::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// A fresh game began (session was reset).
    GameStarted,
    /// A new round was generated; its replay is about to run.
    RoundStarted { level: u32 },
    /// A reveal pulse began for this pad.
    FlashStarted { color: Color },
    /// The reveal pulse for this pad fully elapsed.
    FlashEnded { color: Color },
    /// The whole sequence has been shown; input is now open.
    ReplayFinished,
    /// A press passed the input gate (feedback pulse started).
    Pressed { color: Color },
    /// The sequence was fully reproduced at this level.
    RoundWon { level: u32, score: u32 },
    /// A press mismatched. Terminal for the session.
    GameOver { score: u32 },
}
