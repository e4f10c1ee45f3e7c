//! The final record of a match, produced once per terminal room.

use std::time::SystemTime;

use crate::{MatchId, PlayerId};

/// The outcome of a finished or aborted match.
///
/// Produced exactly once when a room reaches a terminal state and
/// consumed exactly once by the stats recorder. `winner` is `None`
/// for aborts and ties.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// The room/match this result belongs to.
    pub match_id: MatchId,
    /// The two participants, in room order (left, right).
    pub players: [PlayerId; 2],
    /// Final scores, indexed like `players`.
    pub scores: [u8; 2],
    /// The winning player, or `None` when the match was aborted
    /// (or ended level).
    pub winner: Option<PlayerId>,
    /// Wall-clock time of the terminal transition. Wall-clock (not the
    /// monotonic [`Clock`](crate::Clock)) because the stats collaborator
    /// persists an absolute timestamp.
    pub ended_at: SystemTime,
}

impl MatchResult {
    /// `true` if the match ran to a scored conclusion (a winner exists).
    pub fn is_decisive(&self) -> bool {
        self.winner.is_some()
    }
}
