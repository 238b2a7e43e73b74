//! Leaderboard collaborator
//!
//! Two layers:
//! - `ScoreStore`: synchronous storage (in-memory, JSON file, hosted table)
//!   with the fail-soft `submit_score` / `top_scores` / `check_qualification`
//!   operations the game relies on.
//! - `LeaderboardPort`: the asynchronous face the game talks to. Requests go
//!   out tagged with a `Ticket`; replies come back on a later frame and the
//!   game drops any whose ticket is stale.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default number of ranked entries
pub const DEFAULT_LIMIT: usize = 10;

/// A ranked leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(rename = "player_name")]
    pub name: String,
    pub score: u64,
}

/// A validated score submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    #[serde(rename = "player_name")]
    pub name: String,
    pub email: String,
    pub score: u64,
}

/// Why a submission was rejected before reaching the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    MissingName,
    InvalidEmail,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => write!(f, "Please enter your name"),
            Self::InvalidEmail => write!(f, "Please enter a valid email (must include @ and .)"),
        }
    }
}

/// Storage failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Credentials or configuration missing
    Unavailable,
    /// Request never completed
    Transport(String),
    /// Store answered with a non-success status
    Rejected { status: u16, body: String },
    /// Response body could not be decoded
    Decode(String),
    /// Local file could not be read or written
    Io(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "leaderboard store is not configured"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::Rejected { status, body } => write!(f, "store rejected request ({status}): {body}"),
            Self::Decode(e) => write!(f, "could not decode store response: {e}"),
            Self::Io(e) => write!(f, "leaderboard file error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Validate form input and build a submission
///
/// The name must be non-blank; the email must be non-blank and contain both
/// `@` and `.`.
pub fn validate_submission(name: &str, email: &str, score: u64) -> Result<ScoreSubmission, SubmitError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SubmitError::MissingName);
    }
    let email = email.trim();
    if email.is_empty() || !email.contains('@') || !email.contains('.') {
        return Err(SubmitError::InvalidEmail);
    }
    Ok(ScoreSubmission {
        name: name.to_string(),
        email: email.to_string(),
        score,
    })
}

/// Whether `score` earns a place among `top` (sorted descending, already
/// truncated to `limit`)
pub fn qualifies(top: &[LeaderboardEntry], score: u64, limit: usize) -> bool {
    if top.len() < limit {
        return true;
    }
    top.last().map(|e| score > e.score).unwrap_or(true)
}

/// Synchronous score storage
pub trait ScoreStore {
    /// Persist one submission
    fn insert(&mut self, submission: &ScoreSubmission) -> Result<(), StoreError>;

    /// Highest scores first, at most `limit` rows
    fn fetch_top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;

    /// Record a score; `false` on any failure
    fn submit_score(&mut self, name: &str, email: &str, score: u64) -> bool {
        let submission = match validate_submission(name, email, score) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Rejected score submission: {}", e);
                return false;
            }
        };
        match self.insert(&submission) {
            Ok(()) => {
                log::info!("Score {} submitted for {}", score, submission.name);
                true
            }
            Err(e) => {
                log::error!("Error submitting score: {}", e);
                false
            }
        }
    }

    /// Top scores; empty on failure
    fn top_scores(&self, limit: usize) -> Vec<LeaderboardEntry> {
        self.fetch_top(limit).unwrap_or_else(|e| {
            log::error!("Error fetching leaderboard: {}", e);
            Vec::new()
        })
    }

    /// Whether `score` would make the top `limit`; `false` on failure
    fn check_qualification(&self, score: u64, limit: usize) -> bool {
        match self.fetch_top(limit) {
            Ok(top) => qualifies(&top, score, limit),
            Err(e) => {
                log::error!("Error checking leaderboard qualification: {}", e);
                false
            }
        }
    }
}

/// Stored row, newest submissions keep their email for the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredScore {
    pub player_name: String,
    pub email: String,
    pub score: u64,
}

/// In-memory score table, kept sorted descending by score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryScoreStore {
    pub entries: Vec<StoredScore>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table with existing rows (re-sorted)
    pub fn with_entries(mut entries: Vec<StoredScore>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert keeping descending order; equal scores keep submission order
    fn insert_sorted(&mut self, row: StoredScore) -> usize {
        let pos = self
            .entries
            .iter()
            .position(|e| row.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, row);
        pos
    }
}

impl ScoreStore for MemoryScoreStore {
    fn insert(&mut self, submission: &ScoreSubmission) -> Result<(), StoreError> {
        let rank = self.insert_sorted(StoredScore {
            player_name: submission.name.clone(),
            email: submission.email.clone(),
            score: submission.score,
        });
        log::debug!("Stored score {} at rank {}", submission.score, rank + 1);
        Ok(())
    }

    fn fetch_top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Ok(self
            .entries
            .iter()
            .take(limit)
            .map(|e| LeaderboardEntry {
                name: e.player_name.clone(),
                score: e.score,
            })
            .collect())
    }
}

/// Identifies the run a request was issued from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    /// Run generation at dispatch time; bumped on every reset
    pub generation: u32,
    /// Per-game request sequence number
    pub seq: u32,
}

/// Requests the game can issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardRequest {
    CheckQualification { score: u64, limit: usize },
    TopScores { limit: usize },
    Submit(ScoreSubmission),
}

/// Result of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Qualification(bool),
    TopScores(Vec<LeaderboardEntry>),
    Submitted(bool),
    /// No store is configured
    Unavailable,
}

/// A reply delivered back to the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub ticket: Ticket,
    pub outcome: Outcome,
}

/// Asynchronous leaderboard face used by the frame loop
pub trait LeaderboardPort {
    /// Issue a request; never blocks the frame
    fn dispatch(&mut self, ticket: Ticket, request: LeaderboardRequest);

    /// Replies that arrived since the last call
    fn drain(&mut self) -> Vec<Reply>;

    /// Whether a store is configured at all
    fn is_available(&self) -> bool {
        true
    }
}

impl<P: LeaderboardPort + ?Sized> LeaderboardPort for Box<P> {
    fn dispatch(&mut self, ticket: Ticket, request: LeaderboardRequest) {
        (**self).dispatch(ticket, request)
    }

    fn drain(&mut self) -> Vec<Reply> {
        (**self).drain()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// Runs requests against a synchronous store and delivers the replies on the
/// next drain, so results always land on a later frame
#[derive(Debug, Default)]
pub struct QueuedLeaderboard<S: ScoreStore> {
    store: S,
    outbox: VecDeque<Reply>,
    dispatched: usize,
}

impl<S: ScoreStore> QueuedLeaderboard<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            outbox: VecDeque::new(),
            dispatched: 0,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Requests issued so far
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }
}

impl<S: ScoreStore> LeaderboardPort for QueuedLeaderboard<S> {
    fn dispatch(&mut self, ticket: Ticket, request: LeaderboardRequest) {
        self.dispatched += 1;
        let outcome = match request {
            LeaderboardRequest::CheckQualification { score, limit } => {
                Outcome::Qualification(self.store.check_qualification(score, limit))
            }
            LeaderboardRequest::TopScores { limit } => {
                Outcome::TopScores(self.store.top_scores(limit))
            }
            LeaderboardRequest::Submit(s) => {
                Outcome::Submitted(self.store.submit_score(&s.name, &s.email, s.score))
            }
        };
        self.outbox.push_back(Reply { ticket, outcome });
    }

    fn drain(&mut self) -> Vec<Reply> {
        self.outbox.drain(..).collect()
    }
}

/// Stand-in when no store is configured; every request answers `Unavailable`
#[derive(Debug, Default)]
pub struct DisabledLeaderboard {
    outbox: Vec<Reply>,
}

impl DisabledLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeaderboardPort for DisabledLeaderboard {
    fn dispatch(&mut self, ticket: Ticket, _request: LeaderboardRequest) {
        self.outbox.push(Reply {
            ticket,
            outcome: Outcome::Unavailable,
        });
    }

    fn drain(&mut self) -> Vec<Reply> {
        std::mem::take(&mut self.outbox)
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(scores: &[u64]) -> MemoryScoreStore {
        MemoryScoreStore::with_entries(
            scores
                .iter()
                .enumerate()
                .map(|(i, &score)| StoredScore {
                    player_name: format!("p{i}"),
                    email: format!("p{i}@example.com"),
                    score,
                })
                .collect(),
        )
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        assert_eq!(
            validate_submission("   ", "a@b.c", 10),
            Err(SubmitError::MissingName)
        );
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        assert_eq!(validate_submission("bob", "bob", 10), Err(SubmitError::InvalidEmail));
        assert_eq!(validate_submission("bob", "bob@home", 10), Err(SubmitError::InvalidEmail));
        assert_eq!(validate_submission("bob", "bob.home", 10), Err(SubmitError::InvalidEmail));
    }

    #[test]
    fn test_validate_trims() {
        let s = validate_submission("  Ann ", " ann@x.io ", 42).unwrap();
        assert_eq!(s.name, "Ann");
        assert_eq!(s.email, "ann@x.io");
        assert_eq!(s.score, 42);
    }

    #[test]
    fn test_qualification_with_room_left() {
        let store = store_with(&[900, 800, 700]);
        assert!(store.check_qualification(0, 10));
        assert!(MemoryScoreStore::new().check_qualification(0, 10));
    }

    #[test]
    fn test_qualification_when_full() {
        let store = store_with(&[1000, 950, 900, 850, 800, 700, 650, 600, 550, 500]);
        assert!(!store.check_qualification(500, 10));
        assert!(store.check_qualification(501, 10));
    }

    #[test]
    fn test_qualification_ignores_rows_past_limit() {
        let store = store_with(&[1000, 950, 900, 850, 800, 700, 650, 600, 550, 500, 10, 5]);
        assert!(!store.check_qualification(400, 10));
    }

    #[test]
    fn test_top_scores_sorted_and_limited() {
        let mut store = store_with(&[300, 100]);
        assert!(store.submit_score("Zed", "zed@x.io", 200));
        let top = store.top_scores(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].score, 300);
        assert_eq!(top[1].name, "Zed");
    }

    #[test]
    fn test_equal_scores_keep_submission_order() {
        let mut store = MemoryScoreStore::new();
        assert!(store.submit_score("first", "f@x.io", 50));
        assert!(store.submit_score("second", "s@x.io", 50));
        let top = store.top_scores(10);
        assert_eq!(top[0].name, "first");
        assert_eq!(top[1].name, "second");
    }

    #[test]
    fn test_submit_fails_soft_on_invalid_input() {
        let mut store = MemoryScoreStore::new();
        assert!(!store.submit_score("bob", "bob", 10));
        assert!(store.is_empty());
    }

    #[test]
    fn test_queued_replies_arrive_on_drain() {
        let mut port = QueuedLeaderboard::new(MemoryScoreStore::new());
        let ticket = Ticket { generation: 3, seq: 1 };
        port.dispatch(ticket, LeaderboardRequest::CheckQualification { score: 5, limit: 10 });
        let replies = port.drain();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].ticket, ticket);
        assert_eq!(replies[0].outcome, Outcome::Qualification(true));
        assert!(port.drain().is_empty());
        assert_eq!(port.dispatched(), 1);
    }

    #[test]
    fn test_disabled_port_answers_unavailable() {
        let mut port = DisabledLeaderboard::new();
        assert!(!port.is_available());
        let ticket = Ticket { generation: 0, seq: 9 };
        port.dispatch(ticket, LeaderboardRequest::TopScores { limit: 10 });
        assert_eq!(
            port.drain(),
            vec![Reply { ticket, outcome: Outcome::Unavailable }]
        );
    }

    #[test]
    fn test_entry_uses_store_column_names() {
        let json = r#"[{"player_name":"Ann","score":120}]"#;
        let rows: Vec<LeaderboardEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].name, "Ann");
    }
}
