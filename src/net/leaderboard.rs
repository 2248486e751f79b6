/// Remote leaderboard client.
///
/// The service exposes two endpoints:
///   GET  {url}/scores  → { "highest": {nickname, score} | null,
///                          "top_15": [{nickname, score}, …] }
///   POST {url}/score   ← { "nickname": …, "score": … }
///
/// The game loop is synchronous and must never wait on the network, so
/// every request runs on its own worker thread and reports back through
/// an mpsc channel the loop polls once per frame. Failures are logged
/// and reported as events; they never propagate into gameplay.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One leaderboard entry, as the service stores it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreRecord {
    pub nickname: String,
    pub score: u32,
}

/// Response of GET /scores.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ScoreBoard {
    pub highest: Option<ScoreRecord>,
    #[serde(default)]
    pub top_15: Vec<ScoreRecord>,
}

/// Results delivered back to the game loop.
#[derive(Debug)]
pub enum NetEvent {
    Board(ScoreBoard),
    BoardUnavailable,
    Submitted(ScoreRecord),
    SubmitFailed(ScoreRecord),
}

#[derive(Clone)]
pub struct LeaderboardClient {
    base_url: String,
    timeout: Duration,
}

impl LeaderboardClient {
    /// `None` when no URL is configured — the game runs fully offline
    /// and no worker threads are ever spawned.
    pub fn new(base_url: &str, timeout_ms: u64) -> Option<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return None;
        }
        Some(LeaderboardClient {
            base_url,
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    fn http(&self) -> Result<reqwest::blocking::Client, reqwest::Error> {
        reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
    }

    pub fn fetch_board(&self) -> Result<ScoreBoard, reqwest::Error> {
        self.http()?
            .get(format!("{}/scores", self.base_url))
            .send()?
            .error_for_status()?
            .json()
    }

    pub fn submit(&self, record: &ScoreRecord) -> Result<(), reqwest::Error> {
        self.http()?
            .post(format!("{}/score", self.base_url))
            .json(record)
            .send()?
            .error_for_status()?;
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════
// Worker threads
// ══════════════════════════════════════════════════════════════

/// Fetch the board off-thread; the result (or its absence) arrives as a
/// NetEvent. The send can only fail if the game already exited.
pub fn spawn_fetch(client: LeaderboardClient, tx: Sender<NetEvent>) {
    thread::spawn(move || match client.fetch_board() {
        Ok(board) => {
            log::info!("leaderboard fetched ({} entries)", board.top_15.len());
            let _ = tx.send(NetEvent::Board(board));
        }
        Err(e) => {
            log::warn!("leaderboard fetch failed: {}", e);
            let _ = tx.send(NetEvent::BoardUnavailable);
        }
    });
}

/// Submit a score off-thread, fire-and-forget. Failure is logged and
/// reported; nothing retries.
pub fn spawn_submit(client: LeaderboardClient, record: ScoreRecord, tx: Sender<NetEvent>) {
    thread::spawn(move || match client.submit(&record) {
        Ok(()) => {
            log::info!("score submitted: {} by {}", record.score, record.nickname);
            let _ = tx.send(NetEvent::Submitted(record));
        }
        Err(e) => {
            log::warn!(
                "score submit failed ({} by {}): {}",
                record.score,
                record.nickname,
                e
            );
            let _ = tx.send(NetEvent::SubmitFailed(record));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_scores_response() {
        let json = r#"{
            "highest": {"nickname": "fab", "score": 120},
            "top_15": [
                {"nickname": "fab", "score": 120},
                {"nickname": "zoe", "score": 90}
            ]
        }"#;
        let board: ScoreBoard = serde_json::from_str(json).unwrap();
        assert_eq!(
            board.highest,
            Some(ScoreRecord {
                nickname: "fab".to_string(),
                score: 120
            })
        );
        assert_eq!(board.top_15.len(), 2);
        assert_eq!(board.top_15[1].score, 90);
    }

    #[test]
    fn parses_empty_scores_response() {
        // Fresh service: no scores yet.
        let json = r#"{"highest": null, "top_15": []}"#;
        let board: ScoreBoard = serde_json::from_str(json).unwrap();
        assert!(board.highest.is_none());
        assert!(board.top_15.is_empty());
    }

    #[test]
    fn missing_top_15_defaults_to_empty() {
        let json = r#"{"highest": null}"#;
        let board: ScoreBoard = serde_json::from_str(json).unwrap();
        assert!(board.top_15.is_empty());
    }

    #[test]
    fn submit_body_shape() {
        let rec = ScoreRecord {
            nickname: "fab".to_string(),
            score: 30,
        };
        let body = serde_json::to_value(&rec).unwrap();
        assert_eq!(body["nickname"], "fab");
        assert_eq!(body["score"], 30);
    }

    #[test]
    fn empty_url_means_offline() {
        assert!(LeaderboardClient::new("", 1000).is_none());
        assert!(LeaderboardClient::new("   ", 1000).is_none());
        assert!(LeaderboardClient::new("http://localhost:5000", 1000).is_some());
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let c = LeaderboardClient::new("http://localhost:5000/", 1000).unwrap();
        assert_eq!(c.base_url, "http://localhost:5000");
    }
}
