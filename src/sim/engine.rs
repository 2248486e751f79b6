/// The engine: advances the session by one tick and gates player input.
///
/// Processing order per tick:
///   1. Message timer
///   2. Feedback pulse countdown (runs in any phase)
///   3. Phase-specific timers:
///        Presenting  → replay scheduler (lead-in → [gap → flash]*)
///        RoundWon    → settle countdown, then next round
///        GameOver    → strike animation countdown
///
/// ## Replay sequencing
///
/// The replay is strictly sequential by construction: at most one reveal
/// flash exists at a time (`session.flash`), and the gap counter for
/// element i+1 is only armed when element i's flash has fully elapsed.
/// A sequence of length N therefore occupies exactly
/// `lead_in + N * (gap + reveal)` ticks.
///
/// ## Input gate
///
/// `press` is the single entry point for pad input. Outside
/// AwaitingInput it returns without touching the session — dropped
/// input is intentional gating, not an error. An accepted press starts
/// its feedback pulse and emits `Pressed` before the verdict is applied
/// (feedback first, then evaluate).

use rand::Rng;

use crate::domain::color::Color;
use crate::domain::rules::{self, Verdict};
use super::event::GameEvent;
use super::session::{Flash, Phase, Session};

// ══════════════════════════════════════════════════════════════
// Game start / round generation
// ══════════════════════════════════════════════════════════════

/// Reset the session and begin round 1. Valid from any phase; a running
/// game is discarded along with all of its timers.
pub fn start(session: &mut Session, rng: &mut impl Rng) -> Vec<GameEvent> {
    session.reset();
    let mut events = vec![GameEvent::GameStarted];
    next_round(session, rng, &mut events);
    events
}

/// Grow the sequence by one uniformly-random color and schedule its
/// replay from index 0.
fn next_round(session: &mut Session, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    session.level += 1;
    session.progress.clear();
    session.sequence.push(random_color(rng));
    session.phase = Phase::Presenting;
    session.replay_index = 0;
    session.lead_in_remaining = session.timing.lead_in_ticks;
    session.gap_remaining = session.timing.gap_ticks;
    session.flash = None;
    session.set_message("Watch the sequence...", 0);
    events.push(GameEvent::RoundStarted { level: session.level });
}

/// Uniform draw, independent of history.
fn random_color(rng: &mut impl Rng) -> Color {
    Color::ALL[rng.random_range(0..Color::ALL.len())]
}

// ══════════════════════════════════════════════════════════════
// Tick
// ══════════════════════════════════════════════════════════════

pub fn tick(session: &mut Session, rng: &mut impl Rng) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    session.tick += 1;

    if session.message_timer > 0 {
        session.message_timer -= 1;
        if session.message_timer == 0 {
            session.message.clear();
        }
    }

    if let Some(f) = &mut session.feedback {
        f.remaining -= 1;
        if f.remaining == 0 {
            session.feedback = None;
        }
    }

    match session.phase {
        Phase::Presenting => tick_replay(session, &mut events),
        Phase::RoundWon => {
            if session.settle_remaining > 0 {
                session.settle_remaining -= 1;
            }
            if session.settle_remaining == 0 {
                next_round(session, rng, &mut events);
            }
        }
        Phase::GameOver => {
            if session.strike_remaining > 0 {
                session.strike_remaining -= 1;
            }
        }
        Phase::Idle | Phase::AwaitingInput => {}
    }

    events
}

/// One tick of the replay scheduler. See module doc for the timeline.
fn tick_replay(session: &mut Session, events: &mut Vec<GameEvent>) {
    if session.lead_in_remaining > 0 {
        session.lead_in_remaining -= 1;
        return;
    }

    if let Some(f) = &mut session.flash {
        f.remaining -= 1;
        if f.remaining > 0 {
            return;
        }
        let color = f.color;
        session.flash = None;
        events.push(GameEvent::FlashEnded { color });
        session.replay_index += 1;
        if session.replay_index >= session.sequence.len() {
            session.phase = Phase::AwaitingInput;
            session.set_message("Your turn!", 0);
            events.push(GameEvent::ReplayFinished);
        } else {
            session.gap_remaining = session.timing.gap_ticks;
        }
        return;
    }

    if session.gap_remaining > 0 {
        session.gap_remaining -= 1;
    }
    if session.gap_remaining == 0 {
        let color = session.sequence[session.replay_index];
        session.flash = Some(Flash {
            color,
            remaining: session.timing.reveal_ticks.max(1),
        });
        events.push(GameEvent::FlashStarted { color });
    }
}

// ══════════════════════════════════════════════════════════════
// Input gate
// ══════════════════════════════════════════════════════════════

pub fn press(session: &mut Session, color: Color) -> Vec<GameEvent> {
    if session.phase != Phase::AwaitingInput {
        return vec![];
    }

    let mut events = Vec::new();

    // Feedback pulse first, evaluation second.
    session.feedback = Some(Flash {
        color,
        remaining: session.timing.feedback_ticks.max(1),
    });
    events.push(GameEvent::Pressed { color });

    session.progress.push(color);
    match rules::judge(&session.sequence, &session.progress) {
        Verdict::Advance => {
            debug_assert!(rules::is_prefix(&session.sequence, &session.progress));
        }
        Verdict::Complete => {
            session.score += session.level * session.points_per_level;
            session.phase = Phase::RoundWon;
            session.settle_remaining = session.timing.settle_ticks;
            session.set_message("Perfect!", 0);
            events.push(GameEvent::RoundWon {
                level: session.level,
                score: session.score,
            });
        }
        Verdict::Mismatch => {
            session.phase = Phase::GameOver;
            session.strike_remaining = session.timing.strike_ticks;
            session.set_message(&format!("Game Over. Score: {}", session.score), 0);
            events.push(GameEvent::GameOver {
                score: session.score,
            });
        }
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingConfig;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const POINTS: u32 = 10;

    fn timing() -> TimingConfig {
        TimingConfig {
            tick_rate_ms: 25,
            lead_in_ticks: 4,
            gap_ticks: 2,
            reveal_ticks: 3,
            feedback_ticks: 2,
            settle_ticks: 5,
            strike_ticks: 4,
        }
    }

    fn session() -> Session {
        Session::new(timing(), POINTS)
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    /// Tick until input opens, collecting all events along the way.
    /// Panics if the replay never finishes (engine bug).
    fn run_replay(s: &mut Session, rng: &mut SmallRng) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..10_000 {
            events.extend(tick(s, rng));
            if s.phase == Phase::AwaitingInput {
                return events;
            }
        }
        panic!("replay did not finish");
    }

    /// Press the full current sequence correctly, returning all events.
    fn press_full_sequence(s: &mut Session) -> Vec<GameEvent> {
        let seq = s.sequence.clone();
        let mut events = Vec::new();
        for c in seq {
            events.extend(press(s, c));
        }
        events
    }

    fn a_wrong_color(right: Color) -> Color {
        Color::ALL
            .into_iter()
            .find(|&c| c != right)
            .unwrap()
    }

    // ── Round generation ──

    #[test]
    fn start_generates_round_one() {
        let mut s = session();
        let mut r = rng();
        let events = start(&mut s, &mut r);
        assert_eq!(s.level, 1);
        assert_eq!(s.sequence.len(), 1);
        assert!(s.progress.is_empty());
        assert_eq!(s.score, 0);
        assert_eq!(s.phase, Phase::Presenting);
        assert!(events.contains(&GameEvent::GameStarted));
        assert!(events.contains(&GameEvent::RoundStarted { level: 1 }));
    }

    #[test]
    fn sequence_length_equals_round_number() {
        let mut s = session();
        let mut r = rng();
        start(&mut s, &mut r);
        for n in 1..=6 {
            assert_eq!(s.sequence.len(), n);
            run_replay(&mut s, &mut r);
            press_full_sequence(&mut s);
            assert_eq!(s.phase, Phase::RoundWon);
            // run out the settle delay into the next round
            while s.phase == Phase::RoundWon {
                tick(&mut s, &mut r);
            }
        }
        assert_eq!(s.sequence.len(), 7);
        assert_eq!(s.level, 7);
    }

    #[test]
    fn next_round_preserves_earlier_sequence() {
        let mut s = session();
        let mut r = rng();
        start(&mut s, &mut r);
        run_replay(&mut s, &mut r);
        let round1 = s.sequence.clone();
        press_full_sequence(&mut s);
        while s.phase == Phase::RoundWon {
            tick(&mut s, &mut r);
        }
        assert_eq!(s.sequence.len(), 2);
        assert_eq!(s.sequence[0], round1[0]);
    }

    // ── Replay sequencing ──

    #[test]
    fn replay_emits_flashes_in_order_strictly_sequential() {
        let mut s = session();
        let mut r = rng();

        // Build a length-3 sequence by winning two rounds first.
        start(&mut s, &mut r);
        for _ in 0..2 {
            run_replay(&mut s, &mut r);
            press_full_sequence(&mut s);
            while s.phase == Phase::RoundWon {
                tick(&mut s, &mut r);
            }
        }
        assert_eq!(s.sequence.len(), 3);
        let seq = s.sequence.clone();

        let events = run_replay(&mut s, &mut r);
        let pulses: Vec<&GameEvent> = events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    GameEvent::FlashStarted { .. } | GameEvent::FlashEnded { .. }
                )
            })
            .collect();

        // Exactly N started/ended pairs, in original order, never
        // overlapping: Started(i) is always followed by Ended(i) before
        // Started(i+1).
        assert_eq!(pulses.len(), seq.len() * 2);
        for (i, &c) in seq.iter().enumerate() {
            assert_eq!(*pulses[i * 2], GameEvent::FlashStarted { color: c });
            assert_eq!(*pulses[i * 2 + 1], GameEvent::FlashEnded { color: c });
        }
    }

    #[test]
    fn replay_occupies_exact_tick_count() {
        let mut s = session();
        let mut r = rng();
        start(&mut s, &mut r);

        let t = timing();
        let expected = t.lead_in_ticks + t.gap_ticks + t.reveal_ticks;
        let mut ticks = 0;
        while s.phase == Phase::Presenting {
            tick(&mut s, &mut r);
            ticks += 1;
        }
        assert_eq!(ticks, expected);
        assert_eq!(s.phase, Phase::AwaitingInput);
    }

    #[test]
    fn at_most_one_flash_live_during_replay() {
        let mut s = session();
        let mut r = rng();
        start(&mut s, &mut r);
        run_replay(&mut s, &mut r);
        press_full_sequence(&mut s);
        while s.phase == Phase::RoundWon {
            tick(&mut s, &mut r);
        }
        // length-2 replay: count lit pads every tick
        while s.phase == Phase::Presenting {
            tick(&mut s, &mut r);
            let lit = Color::ALL.iter().filter(|&&c| s.pad_lit(c)).count();
            assert!(lit <= 1);
        }
    }

    // ── Input gate ──

    #[test]
    fn press_dropped_while_presenting() {
        let mut s = session();
        let mut r = rng();
        start(&mut s, &mut r);
        assert_eq!(s.phase, Phase::Presenting);

        let events = press(&mut s, Color::Green);
        assert!(events.is_empty());
        assert!(s.progress.is_empty());
        assert_eq!(s.phase, Phase::Presenting);
    }

    #[test]
    fn press_dropped_in_idle_and_game_over() {
        let mut s = session();
        assert_eq!(s.phase, Phase::Idle);
        assert!(press(&mut s, Color::Red).is_empty());
        assert!(s.progress.is_empty());

        let mut r = rng();
        start(&mut s, &mut r);
        run_replay(&mut s, &mut r);
        let wrong = a_wrong_color(s.sequence[0]);
        press(&mut s, wrong);
        assert_eq!(s.phase, Phase::GameOver);

        let before = s.progress.clone();
        assert!(press(&mut s, Color::Blue).is_empty());
        assert_eq!(s.progress, before);
        assert_eq!(s.phase, Phase::GameOver);
    }

    #[test]
    fn accepted_press_starts_feedback_pulse() {
        let mut s = session();
        let mut r = rng();
        start(&mut s, &mut r);
        run_replay(&mut s, &mut r);

        let c = s.sequence[0];
        let events = press(&mut s, c);
        assert!(events.contains(&GameEvent::Pressed { color: c }));
        assert!(s.pad_lit(c));

        // feedback expires after its own (shorter) duration
        for _ in 0..timing().feedback_ticks {
            tick(&mut s, &mut r);
        }
        assert!(s.feedback.is_none());
    }

    // ── Mismatch ──

    #[test]
    fn first_mismatch_is_terminal() {
        let mut s = session();
        let mut r = rng();
        start(&mut s, &mut r);
        run_replay(&mut s, &mut r);

        let wrong = a_wrong_color(s.sequence[0]);
        let events = press(&mut s, wrong);
        assert_eq!(s.phase, Phase::GameOver);
        assert_eq!(s.score, 0);
        assert!(events.contains(&GameEvent::GameOver { score: 0 }));
    }

    #[test]
    fn mismatch_mid_round_keeps_prior_score() {
        let mut s = session();
        let mut r = rng();
        start(&mut s, &mut r);

        // Win round 1: score = 1 * POINTS.
        run_replay(&mut s, &mut r);
        press_full_sequence(&mut s);
        assert_eq!(s.score, POINTS);
        while s.phase == Phase::RoundWon {
            tick(&mut s, &mut r);
        }

        // Round 2: first press right, second press wrong.
        run_replay(&mut s, &mut r);
        let first = s.sequence[0];
        press(&mut s, first);
        assert_eq!(s.phase, Phase::AwaitingInput);
        let wrong = a_wrong_color(s.sequence[1]);
        let events = press(&mut s, wrong);

        assert_eq!(s.phase, Phase::GameOver);
        assert_eq!(s.score, POINTS); // unchanged by the failed round
        assert!(events.contains(&GameEvent::GameOver { score: POINTS }));
    }

    #[test]
    fn strike_animation_lights_all_pads_then_clears() {
        let mut s = session();
        let mut r = rng();
        start(&mut s, &mut r);
        run_replay(&mut s, &mut r);
        let wrong = a_wrong_color(s.sequence[0]);
        press(&mut s, wrong);

        for c in Color::ALL {
            assert!(s.pad_lit(c));
        }
        for _ in 0..timing().strike_ticks {
            tick(&mut s, &mut r);
        }
        // feedback may also have expired by now; nothing stays lit
        for c in Color::ALL {
            assert!(!s.pad_lit(c));
        }
    }

    // ── Round win / scoring ──

    #[test]
    fn completing_level_awards_level_times_points() {
        let mut s = session();
        let mut r = rng();
        start(&mut s, &mut r);

        let mut expected = 0;
        for level in 1..=4u32 {
            run_replay(&mut s, &mut r);
            let events = press_full_sequence(&mut s);
            expected += level * POINTS;
            assert_eq!(s.score, expected);
            assert!(events.contains(&GameEvent::RoundWon {
                level,
                score: expected
            }));
            while s.phase == Phase::RoundWon {
                tick(&mut s, &mut r);
            }
        }
    }

    #[test]
    fn settle_delay_elapses_before_next_round() {
        let mut s = session();
        let mut r = rng();
        start(&mut s, &mut r);
        run_replay(&mut s, &mut r);
        press_full_sequence(&mut s);
        assert_eq!(s.phase, Phase::RoundWon);

        // The round does not advance until the settle delay has elapsed.
        for _ in 0..timing().settle_ticks - 1 {
            let events = tick(&mut s, &mut r);
            assert_eq!(s.phase, Phase::RoundWon);
            assert!(events.is_empty());
        }
        let events = tick(&mut s, &mut r);
        assert_eq!(s.phase, Phase::Presenting);
        assert!(events.contains(&GameEvent::RoundStarted { level: 2 }));
    }

    // ── Restart ──

    #[test]
    fn restart_discards_running_game() {
        let mut s = session();
        let mut r = rng();
        start(&mut s, &mut r);
        run_replay(&mut s, &mut r);
        press_full_sequence(&mut s);
        assert!(s.score > 0);

        // Restart mid-settle: every timer and counter is fresh.
        start(&mut s, &mut r);
        assert_eq!(s.level, 1);
        assert_eq!(s.score, 0);
        assert_eq!(s.sequence.len(), 1);
        assert!(s.progress.is_empty());
        assert_eq!(s.settle_remaining, 0);
        assert!(s.flash.is_none());
        assert!(s.feedback.is_none());
        assert_eq!(s.phase, Phase::Presenting);
    }

    // ── End to end ──

    #[test]
    fn first_round_end_to_end() {
        let mut s = session();
        let mut r = rng();
        start(&mut s, &mut r);
        assert_eq!(s.sequence.len(), 1);

        let shown = run_replay(&mut s, &mut r);
        assert!(shown.contains(&GameEvent::FlashStarted {
            color: s.sequence[0]
        }));

        let c = s.sequence[0];
        press(&mut s, c);
        assert_eq!(s.score, POINTS);
        assert_eq!(s.phase, Phase::RoundWon);

        while s.phase == Phase::RoundWon {
            tick(&mut s, &mut r);
        }
        assert_eq!(s.level, 2);
        assert_eq!(s.sequence.len(), 2);
        assert_eq!(s.sequence[0], c);
    }
}
