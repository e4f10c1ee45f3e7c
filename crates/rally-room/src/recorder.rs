//! The stats/tournament recorder contract.
//!
//! Invoked exactly once per terminal room, fire-and-forget from the
//! core's perspective: a failure is logged by the registry's reaper and
//! the room is evicted regardless.

use std::future::Future;
use std::sync::Mutex;

use rally_core::{MatchId, MatchResult};

/// Error surfaced by a recorder implementation.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    /// The collaborator could not accept the record.
    #[error("stats recorder unavailable: {0}")]
    Unavailable(String),
}

/// The stats-recording collaborator.
///
/// The methods return explicitly `Send` futures (rather than being
/// plain `async fn`s) because the registry's reaper awaits them inside
/// a `tokio::spawn`ed task, generic over the implementation.
pub trait MatchRecorder: Send + Sync + 'static {
    /// Records the final result of a match. Called exactly once per
    /// terminal room.
    fn record_match_result(
        &self,
        result: MatchResult,
    ) -> impl Future<Output = Result<(), RecorderError>> + Send;

    /// Records a tournament-level event for a match. Bracket handling
    /// is the collaborator's business; the default implementation drops
    /// the event.
    fn record_tournament_event(
        &self,
        _match_id: MatchId,
        _event: &str,
    ) -> impl Future<Output = Result<(), RecorderError>> + Send {
        async { Ok(()) }
    }
}

/// An in-memory [`MatchRecorder`] for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    results: Mutex<Vec<MatchResult>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// All results recorded so far.
    pub fn results(&self) -> Vec<MatchResult> {
        self.results.lock().expect("recorder lock poisoned").clone()
    }

    /// Number of results recorded.
    pub fn len(&self) -> usize {
        self.results.lock().expect("recorder lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MatchRecorder for MemoryRecorder {
    async fn record_match_result(&self, result: MatchResult) -> Result<(), RecorderError> {
        self.results
            .lock()
            .expect("recorder lock poisoned")
            .push(result);
        Ok(())
    }
}
