//! # Session State
//!
//! Short-lived per-entity state used by enchantment effects: cooldowns and
//! hit stacks. Entries carry an optional expiry tick. Reads treat expired
//! entries as absent; [`SessionStore::sweep`] actually frees them.
//!
//! The host calls `sweep` on its own schedule and `remove_entity` when an
//! entity leaves the world.

use std::collections::HashMap;

use parking_lot::Mutex;
use runeforge_shared::events::EntityId;

/// What a session entry tracks.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// Cooldown of a named ability.
    Cooldown(String),
    /// Consecutive-hit counter of an enchantment.
    HitStack(String),
    /// Anything else.
    Custom(String),
}

/// Stored session value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionValue {
    /// Payload.
    pub value: i64,
    /// First tick at which the entry is expired. `None` never expires.
    pub expires_at_tick: Option<u64>,
}

impl SessionValue {
    #[inline]
    fn is_expired(&self, now: u64) -> bool {
        self.expires_at_tick.is_some_and(|at| at <= now)
    }
}

/// Thread-safe per-entity session storage.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: Mutex<HashMap<(EntityId, SessionKey), SessionValue>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes an entry.
    pub fn set(&self, entity: EntityId, key: SessionKey, value: i64, expires_at_tick: Option<u64>) {
        self.entries.lock().insert(
            (entity, key),
            SessionValue {
                value,
                expires_at_tick,
            },
        );
    }

    /// Reads a live entry.
    #[must_use]
    pub fn get(&self, entity: EntityId, key: &SessionKey, now: u64) -> Option<i64> {
        self.entries
            .lock()
            .get(&(entity, key.clone()))
            .filter(|v| !v.is_expired(now))
            .map(|v| v.value)
    }

    /// Adds `by` to an entry (starting from 0 if absent or expired) and
    /// extends its life to `now + ttl`. Returns the new value.
    pub fn increment(&self, entity: EntityId, key: SessionKey, by: i64, now: u64, ttl: u64) -> i64 {
        let mut entries = self.entries.lock();
        let entry = entries.entry((entity, key)).or_insert(SessionValue {
            value: 0,
            expires_at_tick: None,
        });
        if entry.is_expired(now) {
            entry.value = 0;
        }
        entry.value = entry.value.saturating_add(by);
        entry.expires_at_tick = Some(now.saturating_add(ttl));
        entry.value
    }

    /// Starts a cooldown lasting `duration` ticks.
    pub fn start_cooldown(&self, entity: EntityId, name: &str, now: u64, duration: u64) {
        self.set(
            entity,
            SessionKey::Cooldown(name.to_string()),
            1,
            Some(now.saturating_add(duration)),
        );
    }

    /// True if no cooldown named `name` is running.
    #[must_use]
    pub fn cooldown_ready(&self, entity: EntityId, name: &str, now: u64) -> bool {
        self.get(entity, &SessionKey::Cooldown(name.to_string()), now)
            .is_none()
    }

    /// Drops every entry of `entity`. Returns how many were removed.
    pub fn remove_entity(&self, entity: EntityId) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(owner, _), _| *owner != entity);
        before - entries.len()
    }

    /// Drops expired entries. Returns how many were removed.
    pub fn sweep(&self, now: u64) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, value| !value.is_expired(now));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, now, "session entries swept");
        }
        removed
    }

    /// Number of stored entries, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_reads_as_absent() {
        let store = SessionStore::new();
        let key = SessionKey::Custom("x".into());
        store.set(1, key.clone(), 5, Some(10));
        assert_eq!(store.get(1, &key, 9), Some(5));
        assert_eq!(store.get(1, &key, 10), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let store = SessionStore::new();
        store.set(1, SessionKey::Custom("a".into()), 1, Some(5));
        store.set(1, SessionKey::Custom("b".into()), 1, Some(50));
        store.set(2, SessionKey::Custom("c".into()), 1, None);
        assert_eq!(store.sweep(10), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.sweep(10), 0);
    }

    #[test]
    fn test_hit_stacks() {
        let store = SessionStore::new();
        let key = SessionKey::HitStack("frenzy".into());
        assert_eq!(store.increment(1, key.clone(), 1, 0, 20), 1);
        assert_eq!(store.increment(1, key.clone(), 1, 10, 20), 2);
        // Expired at 30, so the stack restarts.
        assert_eq!(store.increment(1, key, 1, 40, 20), 1);
    }

    #[test]
    fn test_cooldowns() {
        let store = SessionStore::new();
        assert!(store.cooldown_ready(1, "blink", 0));
        store.start_cooldown(1, "blink", 0, 100);
        assert!(!store.cooldown_ready(1, "blink", 99));
        assert!(store.cooldown_ready(1, "blink", 100));
        assert!(store.cooldown_ready(2, "blink", 50));
    }

    #[test]
    fn test_remove_entity() {
        let store = SessionStore::new();
        store.set(1, SessionKey::Custom("a".into()), 1, None);
        store.set(1, SessionKey::Custom("b".into()), 1, None);
        store.set(2, SessionKey::Custom("a".into()), 1, None);
        assert_eq!(store.remove_entity(1), 2);
        assert_eq!(store.len(), 1);
    }
}
