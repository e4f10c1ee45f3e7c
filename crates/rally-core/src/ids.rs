//! Identity newtypes.
//!
//! Each identifier is a newtype wrapper around `u64`. The wrapper buys
//! type safety (a `MatchId` can't be passed where an `InviteId` is
//! expected) at zero runtime cost, and `#[serde(transparent)]` keeps
//! the JSON representation a plain number.
//!
//! The core treats player identities as opaque: they come from the
//! caller's identity provider and are never validated here beyond
//! "two distinct identities per match".

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for a player (participant identity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a match — one live paddle game between two
/// players. Doubles as the `game_id` an invite references: the invite
/// that starts a match and the room that runs it share this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

/// A unique identifier for an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteId(pub u64);

impl fmt::Display for InviteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        // `#[serde(transparent)]` means PlayerId(42) → `42`, not `{"0":42}`.
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_deserializes_from_plain_number() {
        let pid: PlayerId = serde_json::from_str("42").unwrap();
        assert_eq!(pid, PlayerId(42));
    }

    #[test]
    fn test_id_display_prefixes() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
        assert_eq!(MatchId(3).to_string(), "M-3");
        assert_eq!(InviteId(12).to_string(), "I-12");
    }

    #[test]
    fn test_match_id_round_trip() {
        let id = MatchId(99);
        let json = serde_json::to_string(&id).unwrap();
        let decoded: MatchId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, decoded);
    }
}
