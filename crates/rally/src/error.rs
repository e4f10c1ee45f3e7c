//! The unified error surface of the facade.
//!
//! `RallyError` wraps the layer errors transparently so messages and
//! sources pass through untouched, and adds the one thing the layers
//! don't know about: how each failure maps to an HTTP-style status for
//! whatever boundary sits above the facade.

use rally_invite::InviteError;
use rally_room::RoomError;

/// Any error the session facade can return.
#[derive(Debug, thiserror::Error)]
pub enum RallyError {
    #[error(transparent)]
    Invite(#[from] InviteError),

    #[error(transparent)]
    Room(#[from] RoomError),
}

impl RallyError {
    /// HTTP-style status code for this error.
    ///
    /// The facade has no HTTP surface itself; this is the mapping a
    /// boundary layer is expected to apply:
    ///
    /// - missing record → 404
    /// - lost race (already resolved, duplicate room, wrong state) → 409
    /// - TTL elapsed → 410
    /// - malformed request (self-invite, self-match) → 400
    /// - caller not allowed (not inviter, not a participant) → 401
    /// - infrastructure trouble (store down, actor gone) → 503
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Invite(err) => match err {
                InviteError::NotFound(_) => 404,
                InviteError::AlreadyResolved(..) => 409,
                InviteError::Expired(_) => 410,
                InviteError::InvalidParticipants(_) => 400,
                InviteError::Unauthorized(..) => 401,
                InviteError::Store(_) => 503,
            },
            Self::Room(err) => match err {
                RoomError::NotFound(_) => 404,
                RoomError::Conflict(_) | RoomError::InvalidState(_) => 409,
                RoomError::InvalidParticipants(_) => 400,
                RoomError::NotParticipant(..) => 401,
                RoomError::Unavailable(_) => 503,
            },
        }
    }
}
