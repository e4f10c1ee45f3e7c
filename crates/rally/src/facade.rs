//! `SessionFacade`: the single entry point for session orchestration.
//!
//! The facade is thin composition — it owns an [`InviteLifecycle`] and
//! a [`GameRoomRegistry`] and wires them together at the one place the
//! two layers meet: an accepted invite becomes a room. The layers below
//! don't know about each other.

use std::sync::Arc;
use std::time::Duration;

use rally_core::{Clock, InviteId, MatchId, PlayerId, SystemClock};
use rally_invite::{Invite, InviteConfig, InviteLifecycle, InviteStore};
use rally_room::{
    GameRoomRegistry, MatchConfig, MatchRecorder, PaddleCommand, RoomHandle, StateView,
};

use crate::RallyError;

/// Orchestrates invites and rooms for one process.
///
/// Cheap operations (`get_room_state`, `allocate_game_id`) are sync;
/// everything that touches persistence or a room actor is async.
pub struct SessionFacade<S: InviteStore> {
    invites: InviteLifecycle<S>,
    rooms: GameRoomRegistry,
}

impl<S: InviteStore> SessionFacade<S> {
    /// Builds a facade from its collaborators.
    ///
    /// The store backs invite persistence, the recorder receives every
    /// terminal match result, and the clock drives TTL checks (inject
    /// `ManualClock` in tests).
    pub fn new<R: MatchRecorder>(
        store: Arc<S>,
        recorder: Arc<R>,
        clock: Arc<dyn Clock>,
        invite_config: InviteConfig,
        match_config: MatchConfig,
    ) -> Self {
        Self {
            invites: InviteLifecycle::new(store, clock, invite_config),
            rooms: GameRoomRegistry::new(match_config, recorder),
        }
    }

    /// Facade with the default rules and the system clock.
    pub fn with_defaults<R: MatchRecorder>(store: Arc<S>, recorder: Arc<R>) -> Self {
        Self::new(
            store,
            recorder,
            Arc::new(SystemClock),
            InviteConfig::default(),
            MatchConfig::default(),
        )
    }

    // ---------------------------------------------------------------
    // Matches
    // ---------------------------------------------------------------

    /// Mints a match id without creating anything. Invite flows call
    /// this first so the invite can reference the game it proposes.
    pub fn allocate_game_id(&self) -> MatchId {
        self.rooms.allocate_match_id()
    }

    /// Creates a match directly, skipping the invite flow (rematch
    /// buttons, matchmaking queues).
    pub fn start_game(&self, a: PlayerId, b: PlayerId) -> Result<MatchId, RallyError> {
        let match_id = self.rooms.allocate_match_id();
        self.rooms.create_room(match_id, a, b)?;
        Ok(match_id)
    }

    // ---------------------------------------------------------------
    // Invites
    // ---------------------------------------------------------------

    /// Creates a pending invite from `inviter` to `invitee` for
    /// `game_id` (see [`allocate_game_id`](Self::allocate_game_id)).
    /// `ttl` falls back to the configured default.
    pub async fn create_invite(
        &self,
        game_id: MatchId,
        inviter: PlayerId,
        invitee: PlayerId,
        ttl: Option<Duration>,
    ) -> Result<Invite, RallyError> {
        Ok(self.invites.create(game_id, inviter, invitee, ttl).await?)
    }

    /// Accepts an invite and creates the room it proposed, seeded with
    /// (inviter, invitee). Returns the resolved invite and the match id
    /// the caller should join.
    ///
    /// The invite transition commits before the room exists; if room
    /// creation then fails the invite stays `accepted` and the error is
    /// surfaced, rather than un-accepting a persisted transition.
    pub async fn accept_invite(&self, id: InviteId) -> Result<(Invite, MatchId), RallyError> {
        let invite = self.invites.accept(id).await?;

        let match_id = invite.game_id;
        if let Err(err) = self.rooms.create_room(match_id, invite.inviter, invite.invitee) {
            tracing::error!(
                invite_id = %id,
                %match_id,
                error = %err,
                "invite accepted but room creation failed"
            );
            return Err(err.into());
        }
        Ok((invite, match_id))
    }

    /// Declines a pending invite.
    pub async fn decline_invite(&self, id: InviteId) -> Result<Invite, RallyError> {
        Ok(self.invites.decline(id).await?)
    }

    /// Withdraws a pending invite. Only the inviter may do this.
    pub async fn cancel_invite(
        &self,
        id: InviteId,
        caller: PlayerId,
    ) -> Result<Invite, RallyError> {
        Ok(self.invites.cancel(id, caller).await?)
    }

    /// Live (pending, unexpired) invites addressed to `user`.
    pub async fn list_pending_invites(&self, user: PlayerId) -> Result<Vec<Invite>, RallyError> {
        Ok(self.invites.list_pending(user).await?)
    }

    // ---------------------------------------------------------------
    // Rooms
    // ---------------------------------------------------------------

    /// The latest published view of a live room.
    pub fn get_room_state(&self, match_id: MatchId) -> Result<StateView, RallyError> {
        Ok(self.room(match_id)?.current_state())
    }

    /// Marks a participant ready; the match starts once both are.
    pub async fn mark_ready(&self, match_id: MatchId, player: PlayerId) -> Result<(), RallyError> {
        Ok(self.room(match_id)?.mark_ready(player).await?)
    }

    /// Forwards a paddle command to a live room.
    pub async fn submit_input(
        &self,
        match_id: MatchId,
        player: PlayerId,
        cmd: PaddleCommand,
    ) -> Result<(), RallyError> {
        Ok(self.room(match_id)?.submit_input(player, cmd).await?)
    }

    /// Suspends a match and starts its grace window.
    pub async fn pause_room(&self, match_id: MatchId) -> Result<(), RallyError> {
        Ok(self.room(match_id)?.pause().await?)
    }

    /// Resumes a paused match within its grace window.
    pub async fn resume_room(&self, match_id: MatchId) -> Result<(), RallyError> {
        Ok(self.room(match_id)?.resume().await?)
    }

    /// Explicitly closes a room: aborts it if still live and lets the
    /// registry record and evict it. Idempotent.
    pub async fn record_and_close(&self, match_id: MatchId) {
        self.rooms.remove(match_id).await;
    }

    /// Aborts every live room. For process shutdown.
    pub async fn shutdown(&self) {
        self.rooms.drain().await;
    }

    /// Number of live rooms.
    pub fn live_rooms(&self) -> usize {
        self.rooms.len()
    }

    fn room(&self, match_id: MatchId) -> Result<RoomHandle, RallyError> {
        self.rooms
            .get(match_id)
            .ok_or_else(|| rally_room::RoomError::NotFound(match_id).into())
    }
}
