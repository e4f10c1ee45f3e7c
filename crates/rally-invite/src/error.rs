//! Error types for the invite layer.

use rally_core::{InviteId, PlayerId};

use crate::InviteStatus;

/// Errors that can occur during invite operations.
///
/// Validation and state-machine violations are terminal for the call —
/// retrying them cannot change a logical-state outcome. Only
/// [`InviteError::Store`] is transient.
#[derive(Debug, thiserror::Error)]
pub enum InviteError {
    /// Inviter and invitee must be two distinct identities.
    #[error("invalid participants: {0} cannot invite themselves")]
    InvalidParticipants(PlayerId),

    /// No invite exists with this id.
    #[error("invite {0} not found")]
    NotFound(InviteId),

    /// The invite already left `Pending`; its current status is attached.
    #[error("invite {0} already resolved ({1})")]
    AlreadyResolved(InviteId, InviteStatus),

    /// The invite's TTL elapsed before the transition. The persisted
    /// status has been materialized as `Expired`.
    #[error("invite {0} expired")]
    Expired(InviteId),

    /// The caller is not allowed to perform this transition
    /// (e.g., cancelling someone else's invite).
    #[error("player {1} may not modify invite {0}")]
    Unauthorized(InviteId, PlayerId),

    /// The persistence collaborator failed after bounded retries.
    /// The in-memory state was left untouched.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors surfaced by an [`InviteStore`](crate::InviteStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A transient failure (connection drop, timeout). The lifecycle
    /// retries these with backoff before giving up.
    #[error("transient persistence failure: {0}")]
    Transient(String),
}
