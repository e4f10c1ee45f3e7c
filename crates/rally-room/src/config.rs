//! Match configuration and the room lifecycle state machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MatchConfig
// ---------------------------------------------------------------------------

/// Configuration for a match room.
///
/// The defaults encode the product decisions for a standard ranked
/// match: first to 11 points at 60 Hz, with a 15-second grace window
/// for a paused (disconnected) participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Simulation tick rate in Hz.
    pub tick_rate_hz: u32,

    /// First player to reach this score wins.
    pub win_score: u8,

    /// How long a paused match waits for a resume before aborting.
    pub pause_grace: Duration,

    /// Court width in world units (paddles sit on the x edges).
    pub court_width: f32,

    /// Court height in world units (ball reflects off the y edges).
    pub court_height: f32,

    /// Paddle height in world units.
    pub paddle_height: f32,

    /// Paddle vertical speed, units per second.
    pub paddle_speed: f32,

    /// Ball speed at serve, units per second.
    pub ball_speed: f32,

    /// Multiplier applied to ball speed on each paddle hit.
    pub ball_speedup: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            win_score: 11,
            pause_grace: Duration::from_secs(15),
            court_width: 100.0,
            court_height: 60.0,
            paddle_height: 12.0,
            paddle_speed: 45.0,
            ball_speed: 50.0,
            ball_speedup: 1.05,
        }
    }
}

impl MatchConfig {
    /// Clamp out-of-range values so the config is safe to simulate.
    pub fn validated(mut self) -> Self {
        if self.win_score == 0 {
            self.win_score = 1;
        }
        self.ball_speedup = self.ball_speedup.clamp(1.0, 2.0);
        self.paddle_height = self.paddle_height.clamp(0.0, self.court_height);
        self
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a match room.
///
/// ```text
///                       ┌─────────┐
///            resume ┌──→│ Active  │──→ Finished   (win score reached)
///                   │   └────┬────┘
/// Waiting ──────────┘        │ pause
///    │                  ┌────▼────┐
///    │                  │ Paused  │──→ Aborted    (grace elapsed)
///    │                  └─────────┘
///    └── any non-terminal state ────→ Aborted     (explicit abort / sim error)
/// ```
///
/// `Finished` and `Aborted` are terminal: the snapshot freezes and the
/// room produces its `MatchResult` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    /// Both participants known, waiting for both ready signals.
    Waiting,
    /// Simulation ticking.
    Active,
    /// Tick loop suspended; the grace window is counting down.
    Paused,
    /// A participant reached the win score.
    Finished,
    /// Explicit cancellation, grace timeout, or unrecoverable error.
    Aborted,
}

impl RoomState {
    /// `true` once no further transition is permitted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Aborted)
    }

    /// `true` if transitioning to `target` is legal.
    pub fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Waiting, Self::Active) => true,
            (Self::Active, Self::Paused) => true,
            (Self::Paused, Self::Active) => true,
            (Self::Active, Self::Finished) => true,
            (from, Self::Aborted) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Active => write!(f, "Active"),
            Self::Paused => write!(f, "Paused"),
            Self::Finished => write!(f, "Finished"),
            Self::Aborted => write!(f, "Aborted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions_are_legal() {
        assert!(RoomState::Waiting.can_transition_to(RoomState::Active));
        assert!(RoomState::Active.can_transition_to(RoomState::Paused));
        assert!(RoomState::Paused.can_transition_to(RoomState::Active));
        assert!(RoomState::Active.can_transition_to(RoomState::Finished));
    }

    #[test]
    fn test_every_non_terminal_state_can_abort() {
        assert!(RoomState::Waiting.can_transition_to(RoomState::Aborted));
        assert!(RoomState::Active.can_transition_to(RoomState::Aborted));
        assert!(RoomState::Paused.can_transition_to(RoomState::Aborted));
    }

    #[test]
    fn test_terminal_states_admit_no_transition() {
        for from in [RoomState::Finished, RoomState::Aborted] {
            for to in [
                RoomState::Waiting,
                RoomState::Active,
                RoomState::Paused,
                RoomState::Finished,
                RoomState::Aborted,
            ] {
                assert!(!from.can_transition_to(to), "{from} → {to} must be illegal");
            }
        }
    }

    #[test]
    fn test_waiting_cannot_skip_to_finished_or_paused() {
        assert!(!RoomState::Waiting.can_transition_to(RoomState::Finished));
        assert!(!RoomState::Waiting.can_transition_to(RoomState::Paused));
    }

    #[test]
    fn test_paused_cannot_finish_directly() {
        assert!(!RoomState::Paused.can_transition_to(RoomState::Finished));
    }

    #[test]
    fn test_config_default_values() {
        let config = MatchConfig::default();
        assert_eq!(config.tick_rate_hz, 60);
        assert_eq!(config.win_score, 11);
        assert_eq!(config.pause_grace, Duration::from_secs(15));
    }

    #[test]
    fn test_config_validated_clamps_degenerate_values() {
        let config = MatchConfig {
            win_score: 0,
            ball_speedup: 9.0,
            paddle_height: 500.0,
            ..MatchConfig::default()
        }
        .validated();
        assert_eq!(config.win_score, 1);
        assert_eq!(config.ball_speedup, 2.0);
        assert_eq!(config.paddle_height, config.court_height);
    }
}
