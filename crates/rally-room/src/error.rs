//! Error types for the room layer.

use rally_core::{MatchId, PlayerId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// A live room already exists for this match id.
    #[error("match {0} already has a live room")]
    Conflict(MatchId),

    /// No live room exists for this match id.
    #[error("match {0} not found")]
    NotFound(MatchId),

    /// A match needs two distinct participants.
    #[error("invalid participants: {0} cannot play themselves")]
    InvalidParticipants(PlayerId),

    /// The player is not one of the room's two participants.
    #[error("player {0} is not a participant of match {1}")]
    NotParticipant(PlayerId, MatchId),

    /// The room is in a state that doesn't allow this operation,
    /// e.g. resuming a match that isn't paused.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// The room's command channel is closed — the actor is gone.
    #[error("match {0} is unavailable")]
    Unavailable(MatchId),
}
