//! The invite record and its status state machine.

use std::fmt;
use std::time::Instant;

use rally_core::{InviteId, MatchId, PlayerId};
use serde::{Deserialize, Serialize};

/// The status of an invite.
///
/// `Pending` is the only non-terminal state; exactly one of the four
/// terminal states is reachable from it. Terminal states admit no
/// further transition, which [`can_resolve_to`](Self::can_resolve_to)
/// enforces at the type's boundary rather than at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
    Cancelled,
}

impl InviteStatus {
    /// `true` for every state except `Pending`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// `true` if transitioning to `target` is legal.
    pub fn can_resolve_to(&self, target: Self) -> bool {
        matches!(self, Self::Pending) && target.is_terminal()
    }
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Declined => write!(f, "declined"),
            Self::Expired => write!(f, "expired"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A proposal from `inviter` to `invitee` to play a match.
///
/// Immutable once its status is terminal; garbage collection of
/// terminal rows belongs to the persistence collaborator, not to this
/// crate.
#[derive(Debug, Clone, PartialEq)]
pub struct Invite {
    pub id: InviteId,
    /// The match the invite would start. The room created on accept is
    /// keyed by this id.
    pub game_id: MatchId,
    pub inviter: PlayerId,
    pub invitee: PlayerId,
    pub status: InviteStatus,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl Invite {
    /// Whether the TTL has elapsed at `now`.
    ///
    /// A pure read — callers decide whether to materialize the expiry.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_is_not_terminal() {
        assert!(!InviteStatus::Pending.is_terminal());
    }

    #[test]
    fn test_resolved_statuses_are_terminal() {
        for status in [
            InviteStatus::Accepted,
            InviteStatus::Declined,
            InviteStatus::Expired,
            InviteStatus::Cancelled,
        ] {
            assert!(status.is_terminal(), "{status} should be terminal");
        }
    }

    #[test]
    fn test_pending_can_resolve_to_every_terminal_state() {
        for target in [
            InviteStatus::Accepted,
            InviteStatus::Declined,
            InviteStatus::Expired,
            InviteStatus::Cancelled,
        ] {
            assert!(InviteStatus::Pending.can_resolve_to(target));
        }
    }

    #[test]
    fn test_no_transition_out_of_terminal_states() {
        // Status transitions are monotone: once terminal, always terminal.
        for from in [
            InviteStatus::Accepted,
            InviteStatus::Declined,
            InviteStatus::Expired,
            InviteStatus::Cancelled,
        ] {
            for to in [
                InviteStatus::Pending,
                InviteStatus::Accepted,
                InviteStatus::Declined,
                InviteStatus::Expired,
                InviteStatus::Cancelled,
            ] {
                assert!(!from.can_resolve_to(to), "{from} → {to} must be illegal");
            }
        }
    }

    #[test]
    fn test_pending_cannot_resolve_to_pending() {
        assert!(!InviteStatus::Pending.can_resolve_to(InviteStatus::Pending));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&InviteStatus::Accepted).unwrap();
        assert_eq!(json, "\"accepted\"");
    }
}
