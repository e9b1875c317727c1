//! Registry of activated chat connections.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::endpoint::{ConnectionId, Endpoint};

/// A connection that has announced itself under a display name.
pub struct RegistryEntry {
    pub endpoint: Endpoint,
    pub username: String,
}

/// Arena of activated connections keyed by [`ConnectionId`].
///
/// Connections that have not sent an activation frame are not stored here,
/// so they are neither counted nor reached by broadcasts. Display names are
/// not unique.
pub struct ConnectionRegistry {
    entries: DashMap<ConnectionId, RegistryEntry>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Hand out the id for a newly accepted connection.
    pub fn allocate_id(&self) -> ConnectionId {
        ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Insert or overwrite the entry for `endpoint`.
    pub fn register(&self, endpoint: Endpoint, username: String) {
        self.entries
            .insert(endpoint.id(), RegistryEntry { endpoint, username });
    }

    /// Remove the entry for `id`, returning the name it was registered under.
    pub fn unregister(&self, id: ConnectionId) -> Option<String> {
        self.entries.remove(&id).map(|(_, entry)| entry.username)
    }

    /// Call `f` for every registered endpoint that is currently open.
    ///
    /// Iteration order is unspecified. `f` must not call back into the
    /// registry.
    pub fn for_each_open(&self, mut f: impl FnMut(&Endpoint)) {
        for entry in self.entries.iter() {
            if entry.endpoint.is_open() {
                f(&entry.endpoint);
            }
        }
    }

    pub fn username(&self, id: ConnectionId) -> Option<String> {
        self.entries.get(&id).map(|e| e.username.clone())
    }

    pub fn is_registered(&self, id: ConnectionId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
