/// Score/session coordinator: reacts to game outcomes.
///
/// On game over it compares the session score to the locally stored
/// best, persists an improvement, and mirrors it to the remote
/// leaderboard when a nickname is registered. Without a nickname the
/// submission is parked until the player finishes the nickname prompt.
///
/// All network traffic is fire-and-forget worker threads; results drain
/// through an mpsc channel polled once per frame. Nothing here may
/// block or fail the game — the worst case is a silently stale board.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::net::leaderboard::{
    self, LeaderboardClient, NetEvent, ScoreBoard, ScoreRecord,
};
use super::store::{self, Profile};

/// What a finished game means for the profile. Pure decision, applied
/// and acted on by the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Strictly greater than the stored best (equal does not count).
    pub new_best: bool,
    /// Ready to send: a nickname is registered and the score improved.
    pub submit: Option<ScoreRecord>,
    /// Improved, but no nickname yet — prompt before submitting.
    pub need_nickname: bool,
}

pub fn decide_game_over(profile: &Profile, score: u32) -> Outcome {
    let new_best = score > profile.best;
    if !new_best {
        return Outcome {
            new_best: false,
            submit: None,
            need_nickname: false,
        };
    }
    match &profile.nickname {
        Some(nick) => Outcome {
            new_best: true,
            submit: Some(ScoreRecord {
                nickname: nick.clone(),
                score,
            }),
            need_nickname: false,
        },
        None => Outcome {
            new_best: true,
            submit: None,
            need_nickname: true,
        },
    }
}

const NICKNAME_MAX: usize = 16;

pub struct Coordinator {
    profile: Profile,
    client: Option<LeaderboardClient>,
    tx: Sender<NetEvent>,
    rx: Receiver<NetEvent>,
    board: Option<ScoreBoard>,
    /// Nickname entry in progress (text typed so far).
    prompt: Option<String>,
    /// Score awaiting a nickname before it can be submitted.
    pending_submit: Option<u32>,
}

impl Coordinator {
    pub fn new(profile: Profile, client: Option<LeaderboardClient>) -> Self {
        let (tx, rx) = mpsc::channel();
        Coordinator {
            profile,
            client,
            tx,
            rx,
            board: None,
            prompt: None,
            pending_submit: None,
        }
    }

    // ── Views for the renderer ──

    pub fn best(&self) -> u32 {
        self.profile.best
    }

    pub fn nickname(&self) -> Option<&str> {
        self.profile.nickname.as_deref()
    }

    pub fn board(&self) -> Option<&ScoreBoard> {
        self.board.as_ref()
    }

    pub fn online(&self) -> bool {
        self.client.is_some()
    }

    pub fn prompt_text(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    // ── Outcome handling ──

    /// Handle a finished game. Returns true when the score set a new
    /// local best (the caller renders "New Record").
    pub fn on_game_over(&mut self, score: u32) -> bool {
        let outcome = decide_game_over(&self.profile, score);
        if !outcome.new_best {
            return false;
        }

        self.profile.best = score;
        self.persist();

        if let Some(record) = outcome.submit {
            self.submit(record);
        } else if outcome.need_nickname {
            self.prompt = Some(String::new());
            self.pending_submit = Some(score);
        }
        true
    }

    // ── Nickname prompt ──

    pub fn prompt_push(&mut self, ch: char) {
        if let Some(buf) = &mut self.prompt {
            if buf.chars().count() < NICKNAME_MAX && !ch.is_control() {
                buf.push(ch);
            }
        }
    }

    pub fn prompt_backspace(&mut self) {
        if let Some(buf) = &mut self.prompt {
            buf.pop();
        }
    }

    /// Register the typed nickname, send the parked score, refresh the
    /// board. An all-whitespace entry keeps the prompt open.
    pub fn prompt_commit(&mut self) {
        let Some(buf) = &self.prompt else { return };
        let nick = buf.trim().to_string();
        if nick.is_empty() {
            return;
        }

        self.profile.nickname = Some(nick.clone());
        self.persist();
        self.prompt = None;

        if let Some(score) = self.pending_submit.take() {
            self.submit(ScoreRecord {
                nickname: nick,
                score,
            });
        }
        self.refresh();
    }

    /// Abandon the prompt. The local best is already saved; the parked
    /// score is simply never sent.
    pub fn prompt_cancel(&mut self) {
        self.prompt = None;
        self.pending_submit = None;
    }

    // ── Network ──

    /// Kick off a board fetch (startup, and after prompt completion).
    pub fn refresh(&self) {
        if let Some(client) = &self.client {
            leaderboard::spawn_fetch(client.clone(), self.tx.clone());
        }
    }

    fn submit(&self, record: ScoreRecord) {
        if let Some(client) = &self.client {
            leaderboard::spawn_submit(client.clone(), record, self.tx.clone());
        }
    }

    /// Drain worker results. Called once per frame; never blocks.
    pub fn poll(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                NetEvent::Board(board) => self.board = Some(board),
                // Keep whatever we had; the renderer falls back to the
                // local best when no board has ever arrived.
                NetEvent::BoardUnavailable => {}
                NetEvent::Submitted(_) => self.refresh(),
                NetEvent::SubmitFailed(_) => {}
            }
        }
    }

    fn persist(&self) {
        if let Err(e) = store::save_profile(&self.profile) {
            log::warn!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(best: u32, nickname: Option<&str>) -> Profile {
        Profile {
            best,
            nickname: nickname.map(str::to_string),
        }
    }

    // ── decide_game_over ──

    #[test]
    fn higher_score_with_nickname_submits() {
        let out = decide_game_over(&profile(50, Some("fab")), 60);
        assert!(out.new_best);
        assert!(!out.need_nickname);
        assert_eq!(
            out.submit,
            Some(ScoreRecord {
                nickname: "fab".to_string(),
                score: 60
            })
        );
    }

    #[test]
    fn higher_score_without_nickname_prompts() {
        let out = decide_game_over(&profile(50, None), 60);
        assert!(out.new_best);
        assert!(out.need_nickname);
        assert!(out.submit.is_none());
    }

    #[test]
    fn equal_score_is_not_a_new_best() {
        let out = decide_game_over(&profile(50, Some("fab")), 50);
        assert!(!out.new_best);
        assert!(out.submit.is_none());
        assert!(!out.need_nickname);
    }

    #[test]
    fn lower_score_changes_nothing() {
        let out = decide_game_over(&profile(50, Some("fab")), 10);
        assert!(!out.new_best);
        assert!(out.submit.is_none());
    }

    #[test]
    fn zero_score_on_fresh_profile_is_not_a_best() {
        // First-ever game lost at round 1: 0 is not > 0.
        let out = decide_game_over(&profile(0, None), 0);
        assert!(!out.new_best);
        assert!(!out.need_nickname);
    }

    // ── Prompt editing (offline coordinator: no IO, no threads) ──

    fn prompting() -> Coordinator {
        let mut c = Coordinator::new(profile(0, None), None);
        c.prompt = Some(String::new());
        c.pending_submit = Some(30);
        c
    }

    #[test]
    fn prompt_collects_typed_chars() {
        let mut c = prompting();
        for ch in "fab".chars() {
            c.prompt_push(ch);
        }
        assert_eq!(c.prompt_text(), Some("fab"));
        c.prompt_backspace();
        assert_eq!(c.prompt_text(), Some("fa"));
    }

    #[test]
    fn prompt_caps_length_and_drops_control_chars() {
        let mut c = prompting();
        for _ in 0..NICKNAME_MAX + 5 {
            c.prompt_push('x');
        }
        assert_eq!(c.prompt_text().unwrap().chars().count(), NICKNAME_MAX);
        c.prompt_push('\u{8}');
        assert_eq!(c.prompt_text().unwrap().chars().count(), NICKNAME_MAX);
    }

    #[test]
    fn blank_commit_keeps_prompt_open() {
        let mut c = prompting();
        c.prompt_push(' ');
        c.prompt_commit();
        assert!(c.prompt_text().is_some());
        assert!(c.nickname().is_none());
    }

    #[test]
    fn cancel_drops_pending_submission() {
        let mut c = prompting();
        c.prompt_cancel();
        assert!(c.prompt_text().is_none());
        assert!(c.pending_submit.is_none());
    }

    #[test]
    fn no_prompt_opens_without_improvement() {
        let mut c = Coordinator::new(profile(100, None), None);
        assert!(!c.on_game_over(40));
        assert!(c.prompt_text().is_none());
        assert_eq!(c.best(), 100);
    }
}
