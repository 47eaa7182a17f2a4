//! In-flight guard for dashboard mutations.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use ndadesk_core::{NdaId, UserId};

/// What an outstanding mutation is holding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PendingKey {
    /// A reminder or lock change on one record.
    Record(NdaId),
    /// A create submitted by one user.
    Create(UserId),
}

impl fmt::Display for PendingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(_) => f.write_str("Another change to this NDA is still in progress"),
            Self::Create(_) => f.write_str("An NDA is already being sent"),
        }
    }
}

/// Keys of mutations that are currently outstanding.
///
/// At most one mutation per key may be in flight. A key is claimed with
/// [`try_begin`](Self::try_begin) and released when the returned
/// [`PendingGuard`] is dropped, including on error or cancellation.
#[derive(Debug, Clone, Default)]
pub struct PendingActions {
    inner: Arc<DashMap<PendingKey, ()>>,
}

impl PendingActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`. Returns `None` if it is already claimed.
    pub fn try_begin(&self, key: PendingKey) -> Option<PendingGuard> {
        match self.inner.entry(key.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                vacant.insert(());
                Some(PendingGuard {
                    inner: Arc::clone(&self.inner),
                    key,
                })
            }
        }
    }

    pub fn is_pending(&self, key: &PendingKey) -> bool {
        self.inner.contains_key(key)
    }

    /// Whether a reminder or lock change on `id` is outstanding.
    pub fn is_record_pending(&self, id: &NdaId) -> bool {
        self.is_pending(&PendingKey::Record(id.clone()))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Releases its key on drop.
#[derive(Debug)]
pub struct PendingGuard {
    inner: Arc<DashMap<PendingKey, ()>>,
    key: PendingKey,
}

impl PendingGuard {
    pub fn key(&self) -> &PendingKey {
        &self.key
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.inner.remove(&self.key);
    }
}
