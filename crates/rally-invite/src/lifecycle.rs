//! `InviteLifecycle`: validates and applies invite transitions.
//!
//! # Concurrency
//!
//! Each invite gets its own `tokio::Mutex` — the transition lock. Racing
//! `accept`/`decline`/`cancel` calls on the same invite serialize on it,
//! so exactly one caller wins and the rest observe `AlreadyResolved`.
//! Transitions on different invites proceed independently.
//!
//! The outer index (id → transition lock) is also a mutex, but it is
//! held only for map lookups and never across an await point. The
//! persistence collaborator is always called while holding *only* the
//! per-invite lock.
//!
//! # Write-through
//!
//! A transition is persisted first and applied to the in-memory record
//! only on success. Transient store failures are retried with
//! exponential backoff; when retries exhaust, the caller gets
//! [`InviteError::Store`] and the record is exactly as it was — local
//! and persisted state never diverge.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rally_core::{Clock, InviteId, MatchId, PlayerId};
use tokio::sync::Mutex;

use crate::{Invite, InviteError, InviteStatus, InviteStore, StoreError};

/// Counter for generating unique invite IDs.
static NEXT_INVITE_ID: AtomicU64 = AtomicU64::new(1);

/// Tunables for the invite lifecycle.
#[derive(Debug, Clone)]
pub struct InviteConfig {
    /// TTL applied when `create` is called without an explicit one.
    pub default_ttl: Duration,
    /// How many times a store write is attempted before giving up.
    pub persist_attempts: u32,
    /// Backoff before the first retry; doubles on each subsequent one.
    pub persist_backoff: Duration,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(600),
            persist_attempts: 3,
            persist_backoff: Duration::from_millis(50),
        }
    }
}

/// Validates and transitions invite records through their state machine.
pub struct InviteLifecycle<S: InviteStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: InviteConfig,
    /// Per-invite transition locks, keyed by invite id. Held only for
    /// lookups — never across an await. Tracks live invites only:
    /// a terminal resolution evicts the entry, and later lookups are
    /// served from the store.
    entries: Mutex<HashMap<InviteId, Arc<Mutex<Invite>>>>,
}

impl<S: InviteStore> InviteLifecycle<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: InviteConfig) -> Self {
        Self {
            store,
            clock,
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a `pending` invite from `inviter` to `invitee` with
    /// `expires_at = now + ttl` (default TTL when `ttl` is `None`).
    ///
    /// # Errors
    /// - [`InviteError::InvalidParticipants`] when inviter == invitee
    /// - [`InviteError::Store`] when persistence fails after retries;
    ///   nothing is registered locally in that case
    pub async fn create(
        &self,
        game_id: MatchId,
        inviter: PlayerId,
        invitee: PlayerId,
        ttl: Option<Duration>,
    ) -> Result<Invite, InviteError> {
        if inviter == invitee {
            return Err(InviteError::InvalidParticipants(inviter));
        }

        let now = self.clock.now();
        let invite = Invite {
            id: InviteId(NEXT_INVITE_ID.fetch_add(1, Ordering::Relaxed)),
            game_id,
            inviter,
            invitee,
            status: InviteStatus::Pending,
            created_at: now,
            expires_at: now + ttl.unwrap_or(self.config.default_ttl),
        };

        self.retrying(|| self.store.save(&invite)).await?;

        self.entries
            .lock()
            .await
            .insert(invite.id, Arc::new(Mutex::new(invite.clone())));

        tracing::info!(
            invite_id = %invite.id,
            game_id = %game_id,
            %inviter,
            %invitee,
            "invite created"
        );
        Ok(invite)
    }

    /// Accepts a pending invite. On success the invite is `Accepted`
    /// and the caller should signal the room registry to create the
    /// match for `(inviter, invitee)`.
    ///
    /// # Errors
    /// - [`InviteError::NotFound`] — no such invite
    /// - [`InviteError::AlreadyResolved`] — status is not `Pending`
    /// - [`InviteError::Expired`] — TTL elapsed; the invite is
    ///   atomically materialized as `expired` instead of accepted
    pub async fn accept(&self, id: InviteId) -> Result<Invite, InviteError> {
        self.resolve(id, InviteStatus::Accepted, None).await
    }

    /// Declines a pending invite. Same failure modes as [`accept`](Self::accept).
    pub async fn decline(&self, id: InviteId) -> Result<Invite, InviteError> {
        self.resolve(id, InviteStatus::Declined, None).await
    }

    /// Withdraws a pending invite. Only the inviter may cancel;
    /// anyone else gets [`InviteError::Unauthorized`].
    pub async fn cancel(
        &self,
        id: InviteId,
        caller: PlayerId,
    ) -> Result<Invite, InviteError> {
        self.resolve(id, InviteStatus::Cancelled, Some(caller)).await
    }

    /// Lists invites where `user` is the invitee, the status is still
    /// `Pending`, and the TTL has not elapsed.
    ///
    /// Invites past their TTL are filtered out but NOT mutated — a read
    /// never expires state. Expiry is materialized only on a write
    /// attempt against that invite.
    pub async fn list_pending(&self, user: PlayerId) -> Result<Vec<Invite>, InviteError> {
        let now = self.clock.now();
        let rows = self.store.find_pending(user).await?;
        Ok(rows
            .into_iter()
            .filter(|inv| {
                inv.invitee == user
                    && inv.status == InviteStatus::Pending
                    && !inv.is_expired_at(now)
            })
            .collect())
    }

    /// Number of invites currently holding a transition lock. Only live
    /// invites are tracked; resolving one drops its entry. For asserting
    /// eviction in tests.
    pub async fn tracked_invites(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Applies a `Pending → target` transition under the invite's
    /// transition lock.
    async fn resolve(
        &self,
        id: InviteId,
        target: InviteStatus,
        caller: Option<PlayerId>,
    ) -> Result<Invite, InviteError> {
        let cell = self.entry(id).await?;
        let mut invite = cell.lock().await;

        if invite.status.is_terminal() {
            return Err(InviteError::AlreadyResolved(id, invite.status));
        }
        if let Some(caller) = caller {
            if caller != invite.inviter {
                return Err(InviteError::Unauthorized(id, caller));
            }
        }

        if invite.is_expired_at(self.clock.now()) {
            // The write attempt materializes the expiry: persist
            // `expired`, apply it locally, and refuse the transition.
            let mut expired = invite.clone();
            expired.status = InviteStatus::Expired;
            self.retrying(|| self.store.update(&expired)).await?;
            *invite = expired;
            drop(invite);
            self.evict(id).await;
            tracing::info!(invite_id = %id, "invite expired at transition time");
            return Err(InviteError::Expired(id));
        }

        debug_assert!(invite.status.can_resolve_to(target));
        let mut next = invite.clone();
        next.status = target;
        self.retrying(|| self.store.update(&next)).await?;
        *invite = next.clone();
        drop(invite);
        self.evict(id).await;

        tracing::info!(invite_id = %id, status = %target, "invite resolved");
        Ok(next)
    }

    /// Drops the transition lock for a now-terminal invite. A caller
    /// still waiting on the old lock observes the terminal status and
    /// gets `AlreadyResolved`; a later lookup refetches from the store.
    async fn evict(&self, id: InviteId) {
        self.entries.lock().await.remove(&id);
    }

    /// Fetches the transition lock for `id`, falling back to the store
    /// for invites this process hasn't seen (e.g., created before a
    /// restart).
    async fn entry(&self, id: InviteId) -> Result<Arc<Mutex<Invite>>, InviteError> {
        if let Some(cell) = self.entries.lock().await.get(&id) {
            return Ok(Arc::clone(cell));
        }

        let Some(row) = self.store.find_by_id(id).await? else {
            return Err(InviteError::NotFound(id));
        };

        // Terminal rows are never re-tracked: hand back an untracked
        // lock so the caller observes `AlreadyResolved` without the map
        // re-accumulating dead invites.
        if row.status.is_terminal() {
            return Ok(Arc::new(Mutex::new(row)));
        }

        let mut entries = self.entries.lock().await;
        // A racing lookup may have inserted the entry meanwhile; keep
        // the first one so both callers share the same lock.
        let cell = entries
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(row)));
        Ok(Arc::clone(cell))
    }

    /// Runs a store write, retrying transient failures with
    /// exponential backoff up to the configured attempt budget.
    async fn retrying<F, Fut>(&self, mut op: F) -> Result<(), InviteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), StoreError>>,
    {
        let attempts = self.config.persist_attempts.max(1);
        let mut backoff = self.config.persist_backoff;

        for attempt in 1..=attempts {
            match op().await {
                Ok(()) => return Ok(()),
                Err(err) if attempt == attempts => {
                    tracing::error!(
                        error = %err,
                        attempts,
                        "invite persistence failed — giving up"
                    );
                    return Err(err.into());
                }
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "invite persistence failed — retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
        unreachable!("retry loop always returns")
    }
}
