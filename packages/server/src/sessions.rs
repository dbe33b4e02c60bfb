//! In-memory session store.
//!
//! Sessions live only as long as the process. Creating a session first
//! drops every session idle for longer than the configured limit.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use mobility_map_session::{Message, SessionState, update};
use uuid::Uuid;

/// One session's state plus bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEntry {
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionEntry {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: SessionState::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Thread-safe map of session id to [`SessionEntry`].
pub struct SessionStore {
    sessions: Mutex<BTreeMap<Uuid, SessionEntry>>,
    idle_limit: Duration,
}

impl SessionStore {
    #[must_use]
    pub const fn new(idle_limit: Duration) -> Self {
        Self {
            sessions: Mutex::new(BTreeMap::new()),
            idle_limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Uuid, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new session in the initial state.
    pub fn create(&self) -> (Uuid, SessionEntry) {
        let now = Utc::now();
        let mut sessions = self.lock();

        let before = sessions.len();
        sessions.retain(|_, entry| now - entry.updated_at <= self.idle_limit);
        let dropped = before - sessions.len();
        if dropped > 0 {
            log::info!("Dropped {dropped} idle sessions");
        }

        let id = Uuid::new_v4();
        let entry = SessionEntry::new(now);
        sessions.insert(id, entry.clone());
        log::debug!("Created session {id} ({} live)", sessions.len());
        (id, entry)
    }

    /// A snapshot of session `id`.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<SessionEntry> {
        self.lock().get(&id).cloned()
    }

    /// Applies `messages` to session `id` in order and returns the
    /// resulting snapshot.
    pub fn apply(&self, id: Uuid, messages: impl IntoIterator<Item = Message>) -> Option<SessionEntry> {
        let mut sessions = self.lock();
        let entry = sessions.get_mut(&id)?;
        for message in messages {
            update(&mut entry.state, message);
        }
        entry.updated_at = Utc::now();
        Some(entry.clone())
    }

    /// Removes session `id`; `false` when it did not exist.
    pub fn remove(&self, id: Uuid) -> bool {
        self.lock().remove(&id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobility_map_dataset_models::{Code, Dimension};

    #[test]
    fn sessions_are_independent() {
        let store = SessionStore::new(Duration::hours(1));
        let (a, _) = store.create();
        let (b, _) = store.create();
        assert_ne!(a, b);

        store
            .apply(
                a,
                [
                    Message::SelectionChanged {
                        dimension: Dimension::JunctionType,
                        values: vec![Code::Int(1)],
                    },
                    Message::Submit,
                ],
            )
            .unwrap();

        assert!(store.get(a).unwrap().state.show_features);
        assert!(!store.get(b).unwrap().state.show_features);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn unknown_sessions_are_reported() {
        let store = SessionStore::new(Duration::hours(1));
        let id = Uuid::new_v4();
        assert!(store.get(id).is_none());
        assert!(store.apply(id, [Message::Submit]).is_none());
        assert!(!store.remove(id));
    }

    #[test]
    fn idle_sessions_are_dropped_on_create() {
        let store = SessionStore::new(Duration::zero());
        let (old, _) = store.create();
        if let Some(entry) = store.lock().get_mut(&old) {
            entry.updated_at -= Duration::minutes(5);
        }
        let (new, _) = store.create();
        assert!(store.get(old).is_none());
        assert!(store.get(new).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_deletes_the_session() {
        let store = SessionStore::new(Duration::hours(1));
        let (id, _) = store.create();
        assert!(store.remove(id));
        assert!(store.is_empty());
    }
}
