//! A headless match between two bots, driven entirely through the
//! session facade: invite → accept → ready → play → result.
//!
//! Run with `RUST_LOG=info cargo run -p paddle-match` to watch the
//! room lifecycle in the logs.

use std::sync::Arc;
use std::time::Duration;

use rally::{
    MatchConfig, MemoryRecorder, MemoryStore, PaddleCommand, PlayerId, RallyError, RoomState,
    SessionFacade,
};

/// A bot that chases the ball: move toward its y, stop when close.
fn chase(paddle_y: f32, ball_y: f32) -> PaddleCommand {
    let diff = ball_y - paddle_y;
    if diff.abs() < 1.0 {
        PaddleCommand::Stop
    } else if diff > 0.0 {
        PaddleCommand::Up
    } else {
        PaddleCommand::Down
    }
}

#[tokio::main]
async fn main() -> Result<(), RallyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let recorder = Arc::new(MemoryRecorder::new());
    let facade = SessionFacade::with_defaults(Arc::new(MemoryStore::new()), Arc::clone(&recorder));

    let alice = PlayerId(1);
    let bob = PlayerId(2);

    // Invite flow.
    let game_id = facade.allocate_game_id();
    let invite = facade.create_invite(game_id, alice, bob, None).await?;
    tracing::info!(invite_id = %invite.id, "alice invited bob");

    let (_, match_id) = facade.accept_invite(invite.id).await?;
    tracing::info!(%match_id, "bob accepted, room created");

    facade.mark_ready(match_id, alice).await?;
    facade.mark_ready(match_id, bob).await?;
    tracing::info!(%match_id, "both ready, match started");

    let first_to = MatchConfig::default().win_score;

    // Drive both bots off the published snapshots until the room ends.
    loop {
        let Ok(view) = facade.get_room_state(match_id) else {
            // Terminal and already evicted.
            break;
        };
        match view.state {
            RoomState::Finished | RoomState::Aborted => break,
            RoomState::Active => {
                let snap = &view.snapshot;
                facade
                    .submit_input(match_id, alice, chase(snap.paddles[0], snap.ball_pos[1]))
                    .await?;
                facade
                    .submit_input(match_id, bob, chase(snap.paddles[1], snap.ball_pos[1]))
                    .await?;
                if snap.tick % 300 == 0 {
                    tracing::info!(
                        tick = snap.tick,
                        scores = ?snap.scores,
                        "rally in progress (first to {first_to})"
                    );
                }
            }
            _ => {}
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    // Let the reaper record and evict, then report.
    while recorder.is_empty() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let result = &recorder.results()[0];
    tracing::info!(
        scores = ?result.scores,
        winner = ?result.winner,
        "match over"
    );

    facade.shutdown().await;
    Ok(())
}
