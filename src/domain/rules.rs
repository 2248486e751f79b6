/// Input judgment — truth-table driven.
///
/// Pure functions over the sequence and the player's attempt so far.
/// These encode "what the last press means" without performing any
/// state transition; the engine acts on the verdict.
///
/// ## Judgment Truth Table
///
/// `judge` is called after the press has been appended to the attempt.
/// Let n = attempt.len(), the press under judgment is attempt[n-1].
///
/// ┌───────────────────────────────────┬───────────┐
/// │ Condition (priority order)         │ Verdict   │
/// ├───────────────────────────────────┼───────────┤
/// │ attempt empty or longer than seq   │ Mismatch  │
/// │ attempt[n-1] != sequence[n-1]      │ Mismatch  │
/// │ n == sequence.len()                │ Complete  │
/// │ otherwise                          │ Advance   │
/// └───────────────────────────────────┴───────────┘
///
/// Only the newest element is compared: `is_prefix` guarantees all
/// earlier elements already matched when judgments are applied in order.

use super::color::Color;

/// Outcome of judging the most recent press.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Verdict {
    /// Press matched; more of the sequence remains.
    Advance,
    /// Press matched and the attempt now covers the whole sequence.
    Complete,
    /// Press did not match. Terminal for the round.
    Mismatch,
}

/// Judge the newest element of `attempt` against `sequence`.
pub fn judge(sequence: &[Color], attempt: &[Color]) -> Verdict {
    let n = attempt.len();
    if n == 0 || n > sequence.len() {
        return Verdict::Mismatch;
    }
    if attempt[n - 1] != sequence[n - 1] {
        return Verdict::Mismatch;
    }
    if n == sequence.len() {
        Verdict::Complete
    } else {
        Verdict::Advance
    }
}

/// Is `attempt` a consistent prefix of `sequence`?
/// Session invariant: holds at all times between presses.
pub fn is_prefix(sequence: &[Color], attempt: &[Color]) -> bool {
    attempt.len() <= sequence.len()
        && attempt.iter().zip(sequence.iter()).all(|(a, s)| a == s)
}
