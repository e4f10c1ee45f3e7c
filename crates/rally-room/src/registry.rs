//! The game-room registry: at most one live room per match id.
//!
//! The registry is an explicit, injected object — not ambient global
//! state. Its map is a `DashMap`, so create/remove/get on one match id
//! never block operations on unrelated rooms.
//!
//! Eviction runs in a reaper task: when a room reaches a terminal
//! state, its `MatchResult` arrives on the done channel, is forwarded
//! to the stats recorder, and only then is the map entry removed — a
//! caller never sees a room linger after its result was reported.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rally_core::{MatchId, MatchResult, PlayerId};
use tokio::sync::mpsc;

use crate::room::spawn_room;
use crate::{MatchConfig, MatchRecorder, RoomError, RoomHandle};

/// Counter for match ids minted by [`GameRoomRegistry::allocate_match_id`].
static NEXT_MATCH_ID: AtomicU64 = AtomicU64::new(1);

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Owns the set of live rooms and routes terminal results to the
/// stats recorder.
pub struct GameRoomRegistry {
    rooms: Arc<DashMap<MatchId, RoomHandle>>,
    config: MatchConfig,
    done_tx: mpsc::UnboundedSender<MatchResult>,
}

impl GameRoomRegistry {
    /// Creates a registry and spawns its reaper task. The recorder is
    /// owned by the reaper from here on.
    pub fn new<R: MatchRecorder>(config: MatchConfig, recorder: Arc<R>) -> Self {
        let rooms: Arc<DashMap<MatchId, RoomHandle>> = Arc::new(DashMap::new());
        let (done_tx, done_rx) = mpsc::unbounded_channel();

        tokio::spawn(reap(Arc::clone(&rooms), recorder, done_rx));

        Self {
            rooms,
            config: config.validated(),
            done_tx,
        }
    }

    /// Mints a fresh match id (for invite flows that need the id before
    /// the room exists).
    pub fn allocate_match_id(&self) -> MatchId {
        MatchId(NEXT_MATCH_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates a room for `match_id` seeded with the two participants.
    ///
    /// The entry API makes insertion atomic: a racing create for the
    /// same id sees either nothing or the fully constructed handle,
    /// never a half-built room.
    ///
    /// # Errors
    /// - [`RoomError::InvalidParticipants`] when a == b
    /// - [`RoomError::Conflict`] when a live room already exists
    pub fn create_room(
        &self,
        match_id: MatchId,
        a: PlayerId,
        b: PlayerId,
    ) -> Result<RoomHandle, RoomError> {
        if a == b {
            return Err(RoomError::InvalidParticipants(a));
        }

        match self.rooms.entry(match_id) {
            Entry::Occupied(_) => Err(RoomError::Conflict(match_id)),
            Entry::Vacant(vacant) => {
                let handle = spawn_room(
                    match_id,
                    [a, b],
                    self.config.clone(),
                    self.done_tx.clone(),
                    DEFAULT_CHANNEL_SIZE,
                );
                vacant.insert(handle.clone());
                tracing::info!(%match_id, %a, %b, "room created");
                Ok(handle)
            }
        }
    }

    /// The live room for `match_id`, if any.
    pub fn get(&self, match_id: MatchId) -> Option<RoomHandle> {
        self.rooms.get(&match_id).map(|entry| entry.value().clone())
    }

    /// Removes a room, aborting it if it is still live. Idempotent —
    /// removing an absent or already-removed id is a no-op.
    pub async fn remove(&self, match_id: MatchId) {
        if let Some((_, handle)) = self.rooms.remove(&match_id) {
            handle.abort().await;
            tracing::info!(%match_id, "room removed");
        }
    }

    /// Aborts every live room. For process shutdown.
    pub async fn drain(&self) {
        let handles: Vec<RoomHandle> =
            self.rooms.iter().map(|entry| entry.value().clone()).collect();
        for handle in handles {
            handle.abort().await;
        }
        tracing::info!(rooms = self.rooms.len(), "registry drained");
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Whether a live room exists for `match_id`.
    pub fn contains(&self, match_id: MatchId) -> bool {
        self.rooms.contains_key(&match_id)
    }
}

/// Consumes terminal results: records each one, then evicts the room.
///
/// Recording failures are logged, not propagated — the stats
/// collaborator's availability must not keep dead rooms alive.
async fn reap<R: MatchRecorder>(
    rooms: Arc<DashMap<MatchId, RoomHandle>>,
    recorder: Arc<R>,
    mut done_rx: mpsc::UnboundedReceiver<MatchResult>,
) {
    while let Some(result) = done_rx.recv().await {
        let match_id = result.match_id;
        if let Err(err) = recorder.record_match_result(result).await {
            tracing::error!(
                %match_id,
                error = %err,
                "failed to record match result — evicting anyway"
            );
        }
        rooms.remove(&match_id);
        tracing::info!(%match_id, "room evicted");
    }
}
