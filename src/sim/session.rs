/// Session: the complete state of one game, from start to game over.
///
/// ## Ownership
///
/// Exactly one Session is live. It is mutated only by the engine
/// (`sim::engine`) in response to ticks and gated input; the UI layers
/// read it, never write it. The transient message line is the one
/// exception — `set_message` may be called from the main loop, matching
/// how outcome text (new record vs plain game over) is decided there.
///
/// ## Timers
///
/// Every suspension point of a round lives here as a tick counter:
///   - `lead_in_remaining` — pause between round start and the replay
///   - `gap_remaining`     — pause before each replay element
///   - `flash`             — the reveal pulse currently on screen
///   - `feedback`          — the short pulse acknowledging a press
///   - `settle_remaining`  — pause between a won round and the next
///   - `strike_remaining`  — game-over animation (all pads lit)
///
/// Counters are fields, not detached callbacks: `reset()` wipes them
/// wholesale, so a timer belonging to an earlier game can never fire
/// into a newer one.

use crate::config::TimingConfig;
use crate::domain::color::Color;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Title screen / between games. Start control is armed.
    Idle,
    /// The device is replaying the sequence. Input is dropped.
    Presenting,
    /// The player is reproducing the sequence.
    AwaitingInput,
    /// Full sequence matched; settle delay before the next round.
    RoundWon,
    /// Terminal. A new `start` creates a fresh game.
    GameOver,
}

/// A pad pulse in progress: which pad is lit and for how much longer.
#[derive(Clone, Copy, Debug)]
pub struct Flash {
    pub color: Color,
    pub remaining: u32,
}

pub struct Session {
    // ── Authoritative round state ──
    pub sequence: Vec<Color>,
    pub progress: Vec<Color>,
    pub level: u32,
    pub score: u32,
    pub phase: Phase,
    pub tick: u64,

    // ── Replay (Presenting) ──
    pub lead_in_remaining: u32,
    pub replay_index: usize,
    pub gap_remaining: u32,
    pub flash: Option<Flash>,

    // ── Input feedback (outlives phase changes, shorter than reveal) ──
    pub feedback: Option<Flash>,

    // ── Inter-phase delays ──
    pub settle_remaining: u32,
    pub strike_remaining: u32,

    // ── Tunables (from config) ──
    pub timing: TimingConfig,
    pub points_per_level: u32,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl Session {
    pub fn new(timing: TimingConfig, points_per_level: u32) -> Self {
        Session {
            sequence: vec![],
            progress: vec![],
            level: 0,
            score: 0,
            phase: Phase::Idle,
            tick: 0,
            lead_in_remaining: 0,
            replay_index: 0,
            gap_remaining: 0,
            flash: None,
            feedback: None,
            settle_remaining: 0,
            strike_remaining: 0,
            timing,
            points_per_level,
            message: String::new(),
            message_timer: 0,
        }
    }

    /// Wipe all game state and timers, keeping the tunables.
    /// The post-state is a fresh Idle session.
    pub fn reset(&mut self) {
        let timing = self.timing.clone();
        let ppl = self.points_per_level;
        *self = Session::new(timing, ppl);
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Is this pad currently lit, from any source?
    /// Strike animation lights all four.
    pub fn pad_lit(&self, color: Color) -> bool {
        if self.strike_remaining > 0 {
            return true;
        }
        if let Some(f) = self.flash {
            if f.color == color && f.remaining > 0 {
                return true;
            }
        }
        if let Some(f) = self.feedback {
            if f.color == color && f.remaining > 0 {
                return true;
            }
        }
        false
    }
}
