//! Core types shared across the Rally backend.
//!
//! This crate is a leaf: it has no knowledge of invites, rooms, or the
//! facade. It provides:
//!
//! - [`PlayerId`], [`MatchId`], [`InviteId`] — identity newtypes
//! - [`Clock`] — the injectable monotonic time source used for every
//!   TTL and grace-window comparison in the core
//! - [`MatchResult`] — the record handed to the stats collaborator
//!   exactly once per terminal room

mod clock;
mod ids;
mod result;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ids::{InviteId, MatchId, PlayerId};
pub use result::MatchResult;
