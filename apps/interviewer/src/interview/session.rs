//! Per-interview session state and the process-wide table that owns it.
//!
//! One `SessionState` per interview, reachable only through `SessionStore`.
//! Each session sits behind its own `tokio::sync::Mutex`, so calls for one
//! interview run strictly in arrival order while other interviews proceed in
//! parallel. The outer `RwLock` is only held for map lookups.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::interview::context::InterviewContext;
use crate::interview::orchestrator::QuestionRecord;
use crate::interview::question_bank::{QuestionBank, QuestionCategory};
use crate::interview::question_id::QuestionId;

/// Everything the orchestrator remembers about one interview.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// `(label, answer)` pairs in the order answers arrived.
    pub memory: Vec<(String, String)>,
    /// Built on the first primary question and kept for the interview.
    pub bank: Option<QuestionBank>,
    pub used_categories: HashSet<QuestionCategory>,
    /// Every question handed out so far, follow-ups included.
    pub issued: Vec<(QuestionId, String)>,
    /// Set once the terminal record has been issued; replayed on every later call.
    pub closing: Option<QuestionRecord>,
    pub rng: StdRng,
}

impl SessionState {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible bank order and category picks.
    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            memory: Vec::new(),
            bank: None,
            used_categories: HashSet::new(),
            issued: Vec::new(),
            closing: None,
            rng,
        }
    }

    /// Text of an issued question, if we handed it out.
    pub fn issued_text(&self, id: QuestionId) -> Option<&str> {
        self.issued
            .iter()
            .rev()
            .find(|(issued_id, _)| *issued_id == id)
            .map(|(_, text)| text.as_str())
    }

    pub fn was_issued(&self, text: &str) -> bool {
        let needle = text.trim().to_lowercase();
        self.issued
            .iter()
            .any(|(_, issued)| issued.trim().to_lowercase() == needle)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct Session {
    pub context: Arc<InterviewContext>,
    pub state: SessionState,
}

impl Session {
    pub fn new(context: InterviewContext) -> Self {
        Self {
            context: Arc::new(context),
            state: SessionState::new(),
        }
    }
}

struct Entry {
    session: Arc<Mutex<Session>>,
    touched: Instant,
}

/// Interview id → session. Sessions leave the table through `release` when an
/// interview ends, or through `evict_idle` when a caller never comes back.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, interview_id: Uuid) -> Option<Arc<Mutex<Session>>> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&interview_id).map(|entry| {
            entry.touched = Instant::now();
            entry.session.clone()
        })
    }

    /// Returns the existing session or inserts the one built by `make`.
    /// The flag is true when a new session was created.
    pub async fn get_or_insert<F>(&self, interview_id: Uuid, make: F) -> (Arc<Mutex<Session>>, bool)
    where
        F: FnOnce() -> Session,
    {
        let mut sessions = self.sessions.write().await;
        let mut created = false;
        let entry = sessions.entry(interview_id).or_insert_with(|| {
            created = true;
            Entry {
                session: Arc::new(Mutex::new(make())),
                touched: Instant::now(),
            }
        });
        entry.touched = Instant::now();
        (entry.session.clone(), created)
    }

    /// Drops the session. Returns whether one existed.
    pub async fn release(&self, interview_id: Uuid) -> bool {
        self.sessions.write().await.remove(&interview_id).is_some()
    }

    /// Removes sessions untouched for longer than `max_idle`. A session whose
    /// lock is currently held is mid-call and is left alone.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            entry.touched.elapsed() <= max_idle || entry.session.try_lock().is_err()
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle interview session(s)");
        }
        evicted
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interview::Difficulty;

    fn context() -> InterviewContext {
        InterviewContext {
            job_role: "Backend Engineer".to_string(),
            job_description: "APIs".to_string(),
            difficulty: Difficulty::Medium,
            custom_questions: vec![],
            skills: vec!["sql".to_string()],
        }
    }

    #[tokio::test]
    async fn test_get_or_insert_creates_once() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();

        let (first, created) = store.get_or_insert(id, || Session::new(context())).await;
        assert!(created);
        first.lock().await.state.memory.push(("Question 1".into(), "hi".into()));

        let (second, created) = store.get_or_insert(id, || panic!("must reuse")).await;
        assert!(!created);
        assert_eq!(second.lock().await.state.memory.len(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_release_removes_session() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        store.get_or_insert(id, || Session::new(context())).await;

        assert!(store.release(id).await);
        assert!(!store.release(id).await);
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_idle_skips_recent_and_locked_sessions() {
        let store = SessionStore::new();
        let idle = Uuid::new_v4();
        let busy = Uuid::new_v4();
        let fresh = Uuid::new_v4();

        store.get_or_insert(idle, || Session::new(context())).await;
        let (busy_session, _) = store.get_or_insert(busy, || Session::new(context())).await;
        let _guard = busy_session.lock().await;

        tokio::time::advance(Duration::from_secs(600)).await;
        store.get_or_insert(fresh, || Session::new(context())).await;

        let evicted = store.evict_idle(Duration::from_secs(300)).await;
        assert_eq!(evicted, 1);
        assert!(store.get(idle).await.is_none());
        assert!(store.get(busy).await.is_some());
        assert!(store.get(fresh).await.is_some());
    }

    #[tokio::test]
    async fn test_sessions_for_different_interviews_do_not_block_each_other() {
        let store = SessionStore::new();
        let (a, _) = store.get_or_insert(Uuid::new_v4(), || Session::new(context())).await;
        let (b, _) = store.get_or_insert(Uuid::new_v4(), || Session::new(context())).await;

        let _held = a.lock().await;
        assert!(b.try_lock().is_ok());
    }

    #[test]
    fn test_was_issued_ignores_case_and_padding() {
        let mut state = SessionState::seeded(1);
        state
            .issued
            .push((QuestionId::Primary(1), "What is SQL?".to_string()));
        assert!(state.was_issued("  what is sql? "));
        assert!(!state.was_issued("What is Rust?"));
        assert_eq!(state.issued_text(QuestionId::Primary(1)), Some("What is SQL?"));
        assert_eq!(state.issued_text(QuestionId::Primary(2)), None);
    }
}
