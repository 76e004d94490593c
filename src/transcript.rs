//! Per-user conversation transcripts
//!
//! Each conversation identity owns a bounded FIFO of turns. Access to one
//! identity's transcript is serialized through a fair async mutex so that a
//! whole pipeline run observes and mutates it without interleaving, while
//! different identities never contend with each other.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, MutexGuard, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Default number of turns retained per identity
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Turn role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Stable per-user identifier from the chat platform
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a reset request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Cleared,
    NothingToReset,
}

#[derive(Debug, Default)]
struct Transcript {
    turns: VecDeque<Turn>,
    /// Set when the entry is removed from the map; holders of a stale handle
    /// must look the identity up again.
    retired: bool,
}

type Entry = Arc<Mutex<Transcript>>;

/// Identity-keyed transcript store
///
/// Created once at startup and shared by handle; it lives for the process.
pub struct TranscriptStore {
    max_history: usize,
    entries: std::sync::Mutex<HashMap<UserId, Entry>>,
}

impl TranscriptStore {
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            entries: std::sync::Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<UserId, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire exclusive access to an identity's transcript, creating it on
    /// first use. Waiters are served in arrival order.
    pub async fn lock(&self, user: &UserId) -> Session {
        loop {
            let entry = self
                .entries()
                .entry(user.clone())
                .or_insert_with(Entry::default)
                .clone();

            let guard = entry.lock_owned().await;
            if !guard.retired {
                return Session {
                    max_history: self.max_history,
                    guard,
                };
            }
        }
    }

    /// Append a turn, then drop the oldest turns beyond the bound.
    ///
    /// The orchestrator appends through the `Session` it already holds.
    #[cfg(test)]
    pub async fn append(&self, user: &UserId, turn: Turn) {
        self.lock(user).await.append(turn);
    }

    /// Current turns for an identity, oldest first; empty if unknown
    pub async fn get(&self, user: &UserId) -> Vec<Turn> {
        let entry = self.entries().get(user).cloned();
        let Some(entry) = entry else {
            return Vec::new();
        };
        let guard = entry.lock().await;
        if guard.retired {
            return Vec::new();
        }
        guard.turns.iter().cloned().collect()
    }

    /// Remove an identity's conversation entirely.
    ///
    /// Waits for any in-flight pipeline on the identity to finish first.
    pub async fn reset(&self, user: &UserId) -> ResetOutcome {
        loop {
            let entry = self.entries().get(user).cloned();
            let Some(entry) = entry else {
                return ResetOutcome::NothingToReset;
            };

            let mut guard = entry.clone().lock_owned().await;
            if guard.retired {
                continue;
            }

            guard.retired = true;
            let had_turns = !guard.turns.is_empty();
            guard.turns.clear();

            {
                let mut entries = self.entries();
                if entries.get(user).is_some_and(|e| Arc::ptr_eq(e, &entry)) {
                    entries.remove(user);
                }
            }

            tracing::info!(user_id = %user, had_turns, "Transcript reset");
            return if had_turns {
                ResetOutcome::Cleared
            } else {
                ResetOutcome::NothingToReset
            };
        }
    }

    /// Number of identities with a live transcript
    pub fn identities(&self) -> usize {
        self.entries().len()
    }
}

/// Exclusive handle on one identity's transcript
pub struct Session {
    max_history: usize,
    guard: OwnedMutexGuard<Transcript>,
}

impl Session {
    /// Most recent turns that leave room for one in-progress turn within
    /// the history bound
    pub fn context_turns(&self) -> Vec<Turn> {
        let keep = self.max_history.saturating_sub(1);
        let skip = self.guard.turns.len().saturating_sub(keep);
        self.guard.turns.iter().skip(skip).cloned().collect()
    }

    pub fn stored_len(&self) -> usize {
        self.guard.turns.len()
    }

    pub fn append(&mut self, turn: Turn) {
        let turns = &mut self.guard.turns;
        turns.push_back(turn);
        while turns.len() > self.max_history {
            turns.pop_front();
        }
    }
}
