//! Per-user sliding window of recent conversation turns, kept only in
//! process memory.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;

use crate::openai::{Message, Role};

/// Two rounds of user message + model reply.
pub const MAX_TURNS: usize = 4;
const TURNS_PER_ROUND: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Model,
}

/// One message in a conversation. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    role: Speaker,
    content: String,
}

impl Turn {
    pub fn new(role: Speaker, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }

    pub fn role(&self) -> Speaker {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        let role = match turn.role {
            Speaker::User => Role::User,
            Speaker::Model => Role::Assistant,
        };
        Message::new(role, &turn.content)
    }
}

/// Recent turns for a single user, never longer than `MAX_TURNS`.
#[derive(Debug, Default)]
pub struct History {
    turns: VecDeque<Turn>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    fn evict_oldest_round(&mut self) {
        for _ in 0..TURNS_PER_ROUND {
            self.turns.pop_front();
        }
    }

    /// Append a turn, evicting the oldest round first if the push would
    /// exceed the cap.
    pub fn append_turn(&mut self, role: Speaker, content: &str) {
        while self.turns.len() >= MAX_TURNS {
            self.evict_oldest_round();
        }
        self.turns.push_back(Turn::new(role, content));
    }

    /// Evict oldest rounds until there is room for one more round.
    /// Returns the number of turns removed.
    pub fn trim(&mut self) -> usize {
        let before = self.turns.len();
        while self.turns.len() > MAX_TURNS - TURNS_PER_ROUND {
            self.evict_oldest_round();
        }
        before - self.turns.len()
    }
}

/// Handle to one user's history. Holding the lock serialises every
/// read-modify-write for that user.
pub type HistoryEntry = Arc<AsyncMutex<History>>;

/// Process-wide map from user identifier to that user's `History`.
///
/// The outer lock only guards lookup and insertion; each user's
/// history sits behind its own async mutex so that users never wait
/// on each other.
#[derive(Clone, Default)]
pub struct HistoryStore {
    entries: Arc<Mutex<HashMap<String, HistoryEntry>>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `user_id`, creating an empty history on
    /// first use.
    pub fn get_or_create(&self, user_id: &str) -> HistoryEntry {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(History::new())))
            .clone()
    }

    pub async fn append_turn(&self, user_id: &str, role: Speaker, content: &str) {
        let entry = self.get_or_create(user_id);
        entry.lock().await.append_turn(role, content);
    }

    pub async fn trim(&self, user_id: &str) -> usize {
        let entry = self.get_or_create(user_id);
        let removed = entry.lock().await.trim();
        removed
    }

    /// Copy of the turns currently recorded for `user_id`.
    pub async fn snapshot(&self, user_id: &str) -> Vec<Turn> {
        let entry = self.get_or_create(user_id);
        let turns = entry.lock().await.turns();
        turns
    }

    /// Number of users with a history.
    pub fn user_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
