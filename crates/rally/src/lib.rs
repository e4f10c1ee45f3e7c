//! Rally: session orchestration for a networked two-player paddle game.
//!
//! This meta-crate composes the layers into one embeddable surface:
//!
//! - [`rally_invite`] — the invite state machine and its persistence
//!   contract
//! - [`rally_room`] — match rooms (one actor per match), the registry,
//!   and the authoritative paddle simulation
//! - [`rally_core`] — shared ids, the injectable clock, match results
//!
//! Most embedders only need [`SessionFacade`] plus the two
//! collaborator traits ([`InviteStore`], [`MatchRecorder`]) and map
//! [`RallyError::status_code`] at their transport boundary.
//!
//! ```no_run
//! use std::sync::Arc;
//! use rally::{MemoryRecorder, MemoryStore, PlayerId, SessionFacade};
//!
//! # async fn demo() -> Result<(), rally::RallyError> {
//! let facade =
//!     SessionFacade::with_defaults(Arc::new(MemoryStore::new()), Arc::new(MemoryRecorder::new()));
//!
//! let game_id = facade.allocate_game_id();
//! let invite = facade
//!     .create_invite(game_id, PlayerId(1), PlayerId(2), None)
//!     .await?;
//! let (_invite, match_id) = facade.accept_invite(invite.id).await?;
//! facade.mark_ready(match_id, PlayerId(1)).await?;
//! facade.mark_ready(match_id, PlayerId(2)).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod facade;

pub use error::RallyError;
pub use facade::SessionFacade;

pub use rally_core::{Clock, InviteId, ManualClock, MatchId, MatchResult, PlayerId, SystemClock};
pub use rally_invite::{Invite, InviteConfig, InviteError, InviteStatus, InviteStore, MemoryStore};
pub use rally_room::{
    MatchConfig, MatchRecorder, MemoryRecorder, PaddleCommand, RoomError, RoomState, Snapshot,
    StateView,
};
