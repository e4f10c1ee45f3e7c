//! Match rooms for Rally.
//!
//! Each room runs as an isolated Tokio task (actor model) owning the
//! authoritative paddle simulation, driven by a fixed-timestep tick
//! loop. The [`GameRoomRegistry`] maps each match id to at most one
//! live room and evicts rooms once their result has been handed to the
//! stats recorder.
//!
//! # Key types
//!
//! - [`GameRoomRegistry`] — creates/removes rooms, owns the live set
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomState`] — lifecycle state machine
//! - [`Simulation`] / [`Snapshot`] — the paddle game itself
//! - [`MatchRecorder`] — the stats collaborator contract

mod config;
mod error;
mod recorder;
mod registry;
mod room;
mod sim;

pub use config::{MatchConfig, RoomState};
pub use error::RoomError;
pub use recorder::{MatchRecorder, MemoryRecorder, RecorderError};
pub use registry::GameRoomRegistry;
pub use room::{RoomHandle, StateView};
pub use sim::{PaddleCommand, Side, Simulation, Snapshot};
