//! End-to-end tests through the session facade: invite → room → result.

use std::sync::Arc;
use std::time::Duration;

use rally::{
    InviteConfig, InviteError, ManualClock, MatchConfig, MemoryRecorder, MemoryStore,
    PaddleCommand, PlayerId, RallyError, RoomError, RoomState, SessionFacade,
};

struct Fixture {
    facade: SessionFacade<MemoryStore>,
    clock: Arc<ManualClock>,
    recorder: Arc<MemoryRecorder>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_match_config(MatchConfig::default())
    }

    fn with_match_config(match_config: MatchConfig) -> Self {
        let clock = Arc::new(ManualClock::new());
        let recorder = Arc::new(MemoryRecorder::new());
        let facade = SessionFacade::new(
            Arc::new(MemoryStore::new()),
            Arc::clone(&recorder),
            Arc::clone(&clock) as Arc<dyn rally::Clock>,
            InviteConfig::default(),
            match_config,
        );
        Self {
            facade,
            clock,
            recorder,
        }
    }
}

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

/// First-to-2 with zero-height paddles: the match finishes on its own.
fn open_goal_config() -> MatchConfig {
    MatchConfig {
        win_score: 2,
        paddle_height: 0.0,
        ..MatchConfig::default()
    }
}

async fn wait_until(what: &str, cond: impl Fn() -> bool) {
    for _ in 0..2_000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {what}");
}

// =========================================================================
// The happy path
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_invite_accept_creates_the_proposed_room() {
    let fx = Fixture::new();

    let game_id = fx.facade.allocate_game_id();
    let invite = fx
        .facade
        .create_invite(game_id, pid(1), pid(2), None)
        .await
        .unwrap();

    let (resolved, match_id) = fx.facade.accept_invite(invite.id).await.unwrap();

    assert_eq!(match_id, game_id);
    assert_eq!(resolved.inviter, pid(1));
    assert_eq!(resolved.invitee, pid(2));
    let view = fx.facade.get_room_state(match_id).unwrap();
    assert_eq!(view.state, RoomState::Waiting);
}

#[tokio::test(start_paused = true)]
async fn test_full_match_through_the_facade() {
    let fx = Fixture::with_match_config(open_goal_config());

    let game_id = fx.facade.allocate_game_id();
    let invite = fx
        .facade
        .create_invite(game_id, pid(1), pid(2), None)
        .await
        .unwrap();
    let (_, match_id) = fx.facade.accept_invite(invite.id).await.unwrap();

    fx.facade.mark_ready(match_id, pid(1)).await.unwrap();
    fx.facade.mark_ready(match_id, pid(2)).await.unwrap();

    wait_until("result recorded", || !fx.recorder.is_empty()).await;
    wait_until("room evicted", || {
        fx.facade.get_room_state(match_id).is_err()
    })
    .await;

    let results = fx.recorder.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].match_id, match_id);
    assert_eq!(results[0].winner, Some(pid(1)));

    // The evicted room now reads as missing, mapped to 404.
    let err = fx.facade.get_room_state(match_id).unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test(start_paused = true)]
async fn test_start_game_skips_the_invite_flow() {
    let fx = Fixture::new();

    let match_id = fx.facade.start_game(pid(5), pid(6)).unwrap();

    let view = fx.facade.get_room_state(match_id).unwrap();
    assert_eq!(view.state, RoomState::Waiting);
    assert_eq!(fx.facade.live_rooms(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_input_flows_through_the_facade() {
    let fx = Fixture::new();
    let match_id = fx.facade.start_game(pid(1), pid(2)).unwrap();
    fx.facade.mark_ready(match_id, pid(1)).await.unwrap();
    fx.facade.mark_ready(match_id, pid(2)).await.unwrap();

    let before = fx.facade.get_room_state(match_id).unwrap().snapshot.paddles[0];
    fx.facade
        .submit_input(match_id, pid(1), PaddleCommand::Up)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let after = fx.facade.get_room_state(match_id).unwrap().snapshot.paddles[0];
    assert!(after > before);
}

// =========================================================================
// Invite failure modes and their status codes
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_decline_leaves_no_room_behind() {
    let fx = Fixture::new();
    let game_id = fx.facade.allocate_game_id();
    let invite = fx
        .facade
        .create_invite(game_id, pid(1), pid(2), None)
        .await
        .unwrap();

    fx.facade.decline_invite(invite.id).await.unwrap();

    assert!(fx.facade.get_room_state(game_id).is_err());
    assert_eq!(fx.facade.live_rooms(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_accept_after_decline_is_conflict() {
    let fx = Fixture::new();
    let game_id = fx.facade.allocate_game_id();
    let invite = fx
        .facade
        .create_invite(game_id, pid(1), pid(2), None)
        .await
        .unwrap();
    fx.facade.decline_invite(invite.id).await.unwrap();

    let err = fx.facade.accept_invite(invite.id).await.unwrap_err();

    assert!(matches!(
        err,
        RallyError::Invite(InviteError::AlreadyResolved(..))
    ));
    assert_eq!(err.status_code(), 409);
    assert_eq!(fx.facade.live_rooms(), 0, "a lost race creates no room");
}

#[tokio::test(start_paused = true)]
async fn test_expired_invite_is_gone_with_410() {
    let fx = Fixture::new();
    let game_id = fx.facade.allocate_game_id();
    let invite = fx
        .facade
        .create_invite(game_id, pid(1), pid(2), Some(Duration::from_secs(60)))
        .await
        .unwrap();

    fx.clock.advance(Duration::from_secs(61));

    let err = fx.facade.accept_invite(invite.id).await.unwrap_err();
    assert!(matches!(err, RallyError::Invite(InviteError::Expired(_))));
    assert_eq!(err.status_code(), 410);
    assert_eq!(fx.facade.live_rooms(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_expired_invites_drop_out_of_the_pending_list() {
    let fx = Fixture::new();
    let short = fx.facade.allocate_game_id();
    let long = fx.facade.allocate_game_id();
    fx.facade
        .create_invite(short, pid(1), pid(2), Some(Duration::from_secs(60)))
        .await
        .unwrap();
    let keeper = fx
        .facade
        .create_invite(long, pid(3), pid(2), Some(Duration::from_secs(3600)))
        .await
        .unwrap();

    fx.clock.advance(Duration::from_secs(61));

    let pending = fx.facade.list_pending_invites(pid(2)).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, keeper.id);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_is_inviter_only() {
    let fx = Fixture::new();
    let game_id = fx.facade.allocate_game_id();
    let invite = fx
        .facade
        .create_invite(game_id, pid(1), pid(2), None)
        .await
        .unwrap();

    let err = fx.facade.cancel_invite(invite.id, pid(2)).await.unwrap_err();
    assert_eq!(err.status_code(), 401);

    fx.facade.cancel_invite(invite.id, pid(1)).await.unwrap();
    let pending = fx.facade.list_pending_invites(pid(2)).await.unwrap();
    assert!(pending.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_self_invite_is_a_bad_request() {
    let fx = Fixture::new();
    let game_id = fx.facade.allocate_game_id();

    let err = fx
        .facade
        .create_invite(game_id, pid(1), pid(1), None)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
}

#[tokio::test(start_paused = true)]
async fn test_self_match_is_a_bad_request() {
    let fx = Fixture::new();
    let err = fx.facade.start_game(pid(1), pid(1)).unwrap_err();
    assert_eq!(err.status_code(), 400);
}

// =========================================================================
// Room forwarding failure modes
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_room_operations_on_unknown_match_are_404() {
    let fx = Fixture::new();
    let ghost = fx.facade.allocate_game_id();

    let err = fx.facade.get_room_state(ghost).unwrap_err();
    assert!(matches!(err, RallyError::Room(RoomError::NotFound(_))));
    assert_eq!(err.status_code(), 404);

    let err = fx.facade.mark_ready(ghost, pid(1)).await.unwrap_err();
    assert_eq!(err.status_code(), 404);

    let err = fx.facade.pause_room(ghost).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test(start_paused = true)]
async fn test_pause_and_resume_through_the_facade() {
    let fx = Fixture::new();
    let match_id = fx.facade.start_game(pid(1), pid(2)).unwrap();
    fx.facade.mark_ready(match_id, pid(1)).await.unwrap();
    fx.facade.mark_ready(match_id, pid(2)).await.unwrap();

    fx.facade.pause_room(match_id).await.unwrap();
    assert_eq!(
        fx.facade.get_room_state(match_id).unwrap().state,
        RoomState::Paused
    );

    fx.facade.resume_room(match_id).await.unwrap();
    assert_eq!(
        fx.facade.get_room_state(match_id).unwrap().state,
        RoomState::Active
    );
}

#[tokio::test(start_paused = true)]
async fn test_record_and_close_aborts_and_records() {
    let fx = Fixture::new();
    let match_id = fx.facade.start_game(pid(1), pid(2)).unwrap();
    fx.facade.mark_ready(match_id, pid(1)).await.unwrap();
    fx.facade.mark_ready(match_id, pid(2)).await.unwrap();

    fx.facade.record_and_close(match_id).await;
    // Closing again is a no-op.
    fx.facade.record_and_close(match_id).await;

    wait_until("abort recorded", || !fx.recorder.is_empty()).await;
    assert_eq!(fx.recorder.len(), 1);
    assert_eq!(fx.recorder.results()[0].winner, None);
    assert!(fx.facade.get_room_state(match_id).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_drains_every_room() {
    let fx = Fixture::new();
    for i in 0..3 {
        let match_id = fx.facade.start_game(pid(10 + i), pid(20 + i)).unwrap();
        fx.facade.mark_ready(match_id, pid(10 + i)).await.unwrap();
        fx.facade.mark_ready(match_id, pid(20 + i)).await.unwrap();
    }

    fx.facade.shutdown().await;

    wait_until("all aborts recorded", || fx.recorder.len() == 3).await;
    wait_until("registry empty", || fx.facade.live_rooms() == 0).await;
}
