//! The persistence collaborator contract for invites.
//!
//! The lifecycle never issues raw queries — it only calls this
//! interface. A production deployment implements [`InviteStore`] over
//! its database of choice; [`MemoryStore`] backs tests and
//! single-process embeddings.

use std::collections::HashMap;
use std::sync::Mutex;

use rally_core::{InviteId, PlayerId};

use crate::{Invite, InviteStatus, StoreError};

/// Write-through persistence for invite records.
///
/// Implementations signal transient trouble with
/// [`StoreError::Transient`]; the lifecycle retries those a bounded
/// number of times before surfacing the failure.
pub trait InviteStore: Send + Sync + 'static {
    /// Persists a newly created invite.
    async fn save(&self, invite: &Invite) -> Result<(), StoreError>;

    /// Persists a status transition of an existing invite.
    async fn update(&self, invite: &Invite) -> Result<(), StoreError>;

    /// Fetches an invite by id.
    async fn find_by_id(&self, id: InviteId) -> Result<Option<Invite>, StoreError>;

    /// Fetches every invite where `user` is the invitee and the status
    /// is still `Pending`. TTL filtering is the caller's job — the
    /// store returns rows as persisted.
    async fn find_pending(&self, user: PlayerId) -> Result<Vec<Invite>, StoreError>;
}

/// An in-memory [`InviteStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<InviteId, Invite>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The persisted status of an invite, if the row exists. For
    /// asserting write-through behavior in tests.
    pub fn status_of(&self, id: InviteId) -> Option<InviteStatus> {
        self.rows
            .lock()
            .expect("store lock poisoned")
            .get(&id)
            .map(|row| row.status)
    }

    /// Number of persisted rows.
    pub fn len(&self) -> usize {
        self.rows.lock().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InviteStore for MemoryStore {
    async fn save(&self, invite: &Invite) -> Result<(), StoreError> {
        self.rows
            .lock()
            .expect("store lock poisoned")
            .insert(invite.id, invite.clone());
        Ok(())
    }

    async fn update(&self, invite: &Invite) -> Result<(), StoreError> {
        self.rows
            .lock()
            .expect("store lock poisoned")
            .insert(invite.id, invite.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: InviteId) -> Result<Option<Invite>, StoreError> {
        Ok(self
            .rows
            .lock()
            .expect("store lock poisoned")
            .get(&id)
            .cloned())
    }

    async fn find_pending(&self, user: PlayerId) -> Result<Vec<Invite>, StoreError> {
        Ok(self
            .rows
            .lock()
            .expect("store lock poisoned")
            .values()
            .filter(|row| row.invitee == user && row.status == InviteStatus::Pending)
            .cloned()
            .collect())
    }
}
