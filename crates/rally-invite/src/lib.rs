//! Invite lifecycle for Rally.
//!
//! An invite is a proposal from one player to another to start a match,
//! valid for a bounded TTL. This crate owns the invite state machine:
//!
//! ```text
//!            ┌──→ Accepted
//!            ├──→ Declined
//! Pending ───┼──→ Cancelled   (inviter withdraws)
//!            └──→ Expired     (TTL elapsed at write time)
//! ```
//!
//! All four right-hand states are terminal. Reads never expire an
//! invite — expiry is materialized only on a write attempt, so reads
//! and writes can't race on the status field.
//!
//! # Key types
//!
//! - [`InviteLifecycle`] — validates and applies transitions
//! - [`Invite`] / [`InviteStatus`] — the record and its state machine
//! - [`InviteStore`] — the persistence collaborator contract
//! - [`MemoryStore`] — in-memory store for tests and embedding

#![allow(async_fn_in_trait)]

mod error;
mod invite;
mod lifecycle;
mod store;

pub use error::{InviteError, StoreError};
pub use invite::{Invite, InviteStatus};
pub use lifecycle::{InviteConfig, InviteLifecycle};
pub use store::{InviteStore, MemoryStore};
