//! Room actor: an isolated Tokio task that owns one live match.
//!
//! Each room runs in its own task and owns its simulation exclusively —
//! no shared mutable state, just message passing. Commands arrive on an
//! mpsc channel; state observations leave through a `watch` channel, so
//! any number of concurrent readers can take a consistent snapshot
//! without ever blocking the tick loop (or each other).

use std::time::SystemTime;

use rally_core::{MatchId, MatchResult, PlayerId};
use rally_tick::{TickConfig, TickInfo, TickScheduler};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant as TokioInstant;

use crate::{MatchConfig, PaddleCommand, RoomError, RoomState, Side, Simulation, Snapshot};

/// A consistent view of a room: lifecycle state plus the simulation
/// snapshot it was published with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateView {
    pub state: RoomState,
    pub snapshot: Snapshot,
}

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// A participant signals they are ready to play.
    Ready {
        player: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// A paddle movement command (fire-and-forget; invalid senders and
    /// states are logged and dropped, matching the simulation's
    /// latest-input-wins model).
    Input {
        player: PlayerId,
        cmd: PaddleCommand,
    },

    /// Suspend the match (participant disconnect). Starts the grace window.
    Pause {
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Resume a paused match within the grace window.
    Resume {
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Abort the match. Safe to send at any time, including
    /// concurrently with an in-flight tick.
    Abort,
}

/// Handle to a running room actor. Cheap to clone.
///
/// The registry holds one per live room; the facade hands clones to
/// callers.
#[derive(Clone)]
pub struct RoomHandle {
    match_id: MatchId,
    players: [PlayerId; 2],
    sender: mpsc::Sender<RoomCommand>,
    view_rx: watch::Receiver<StateView>,
}

impl RoomHandle {
    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    /// The participants, in side order (left, right).
    pub fn players(&self) -> [PlayerId; 2] {
        self.players
    }

    /// The latest published view of the room.
    ///
    /// This is a borrow-and-clone of the `watch` value: it never blocks
    /// on the next tick and never observes a torn snapshot.
    pub fn current_state(&self) -> StateView {
        self.view_rx.borrow().clone()
    }

    /// Marks a participant ready. The match starts once both are.
    pub async fn mark_ready(&self, player: PlayerId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Ready {
                player,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.match_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.match_id))?
    }

    /// Sends a paddle command (fire-and-forget).
    pub async fn submit_input(
        &self,
        player: PlayerId,
        cmd: PaddleCommand,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Input { player, cmd })
            .await
            .map_err(|_| RoomError::Unavailable(self.match_id))
    }

    /// Suspends the match and starts the grace window.
    pub async fn pause(&self) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Pause { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.match_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.match_id))?
    }

    /// Resumes a paused match.
    pub async fn resume(&self) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Resume { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.match_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.match_id))?
    }

    /// Aborts the match. Returns `Ok` even if the actor is already
    /// gone — aborting a dead room is a no-op, not an error.
    pub async fn abort(&self) {
        let _ = self.sender.send(RoomCommand::Abort).await;
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    match_id: MatchId,
    players: [PlayerId; 2],
    config: MatchConfig,
    state: RoomState,
    ready: [bool; 2],
    sim: Simulation,
    scheduler: TickScheduler,
    /// Deadline for a paused match to resume, else abort.
    grace_deadline: Option<TokioInstant>,
    view_tx: watch::Sender<StateView>,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Terminal results flow to the registry's reaper through this.
    done_tx: mpsc::UnboundedSender<MatchResult>,
}

impl RoomActor {
    /// Runs the actor loop until a terminal state is reached.
    ///
    /// The state check sits at the top of the loop: an abort set by one
    /// branch is observed before the next command or tick is processed,
    /// so cancellation is safe concurrently with an in-flight tick.
    async fn run(mut self) {
        tracing::info!(match_id = %self.match_id, "room actor started");

        while !self.state.is_terminal() {
            let grace = self.grace_deadline;
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    // Registry dropped the last handle — orphaned room.
                    None => self.abort("all handles dropped"),
                },
                tick = self.scheduler.wait_for_tick() => {
                    self.handle_tick(tick);
                }
                _ = grace_timer(grace) => {
                    self.handle_grace_elapsed();
                }
            }
        }

        // Terminal: freeze the snapshot and produce the result exactly
        // once. Eviction and stats recording happen in the reaper.
        self.publish();
        let result = self.build_result();
        tracing::info!(
            match_id = %self.match_id,
            state = %self.state,
            scores = ?result.scores,
            winner = ?result.winner,
            "room reached terminal state"
        );
        let _ = self.done_tx.send(result);
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Ready { player, reply } => {
                let result = self.handle_ready(player);
                let _ = reply.send(result);
            }
            RoomCommand::Input { player, cmd } => {
                self.handle_input(player, cmd);
            }
            RoomCommand::Pause { reply } => {
                let _ = reply.send(self.handle_pause());
            }
            RoomCommand::Resume { reply } => {
                let _ = reply.send(self.handle_resume());
            }
            RoomCommand::Abort => {
                self.abort("explicit abort");
            }
        }
    }

    fn handle_ready(&mut self, player: PlayerId) -> Result<(), RoomError> {
        if self.state != RoomState::Waiting {
            return Err(RoomError::InvalidState(format!(
                "cannot ready up in state {}",
                self.state
            )));
        }
        let Some(side) = self.side_of(player) else {
            return Err(RoomError::NotParticipant(player, self.match_id));
        };

        self.ready[side.index()] = true;
        tracing::info!(
            match_id = %self.match_id,
            %player,
            "participant ready"
        );

        if self.ready == [true, true] {
            self.transition(RoomState::Active);
            self.scheduler.resume();
            tracing::info!(match_id = %self.match_id, "match started");
        }
        Ok(())
    }

    fn handle_input(&mut self, player: PlayerId, cmd: PaddleCommand) {
        if self.state != RoomState::Active {
            tracing::debug!(
                match_id = %self.match_id,
                %player,
                state = %self.state,
                "input outside Active state, ignoring"
            );
            return;
        }
        match self.side_of(player) {
            Some(side) => self.sim.set_paddle(side, cmd),
            None => tracing::warn!(
                match_id = %self.match_id,
                %player,
                "input from non-participant, ignoring"
            ),
        }
    }

    fn handle_pause(&mut self) -> Result<(), RoomError> {
        if self.state != RoomState::Active {
            return Err(RoomError::InvalidState(format!(
                "cannot pause in state {}",
                self.state
            )));
        }
        self.transition(RoomState::Paused);
        self.scheduler.pause();
        self.grace_deadline = Some(TokioInstant::now() + self.config.pause_grace);
        tracing::info!(
            match_id = %self.match_id,
            grace_ms = self.config.pause_grace.as_millis() as u64,
            "match paused, grace window started"
        );
        Ok(())
    }

    fn handle_resume(&mut self) -> Result<(), RoomError> {
        if self.state != RoomState::Paused {
            return Err(RoomError::InvalidState(format!(
                "cannot resume in state {}",
                self.state
            )));
        }
        self.transition(RoomState::Active);
        self.grace_deadline = None;
        self.scheduler.resume();
        tracing::info!(match_id = %self.match_id, "match resumed");
        Ok(())
    }

    fn handle_tick(&mut self, tick: TickInfo) {
        if self.state != RoomState::Active {
            // A pause/abort raced the tick timer; drop the tick.
            return;
        }

        let scored = self.sim.step(tick.dt);

        if !self.sim.is_valid() {
            tracing::error!(
                match_id = %self.match_id,
                tick = tick.tick,
                "simulation produced an invalid snapshot"
            );
            self.abort("invalid simulation state");
            return;
        }

        if let Some(side) = scored {
            tracing::debug!(
                match_id = %self.match_id,
                scorer = %self.players[side.index()],
                score = self.sim.score(side),
                "point scored"
            );
            if self.sim.score(side) >= self.config.win_score {
                self.transition(RoomState::Finished);
            }
        }

        self.publish();
    }

    fn handle_grace_elapsed(&mut self) {
        if self.state == RoomState::Paused {
            tracing::warn!(
                match_id = %self.match_id,
                "grace window elapsed without resume"
            );
            self.abort("pause grace elapsed");
        }
        self.grace_deadline = None;
    }

    fn abort(&mut self, reason: &str) {
        if self.state.is_terminal() {
            return;
        }
        tracing::info!(match_id = %self.match_id, reason, "room aborting");
        self.transition(RoomState::Aborted);
    }

    fn transition(&mut self, next: RoomState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal room transition {} → {}",
            self.state,
            next
        );
        self.state = next;
        self.publish();
    }

    fn publish(&self) {
        let _ = self.view_tx.send(StateView {
            state: self.state,
            snapshot: self.sim.snapshot(),
        });
    }

    fn side_of(&self, player: PlayerId) -> Option<Side> {
        if player == self.players[0] {
            Some(Side::Left)
        } else if player == self.players[1] {
            Some(Side::Right)
        } else {
            None
        }
    }

    fn build_result(&self) -> MatchResult {
        let scores = [self.sim.score(Side::Left), self.sim.score(Side::Right)];
        // A winner exists only for a scored conclusion; aborts and
        // level scores report none.
        let winner = if self.state == RoomState::Finished {
            if scores[0] >= self.config.win_score {
                Some(self.players[0])
            } else if scores[1] >= self.config.win_score {
                Some(self.players[1])
            } else {
                None
            }
        } else {
            None
        };
        MatchResult {
            match_id: self.match_id,
            players: self.players,
            scores,
            winner,
            ended_at: SystemTime::now(),
        }
    }
}

/// Pends until `deadline`, or forever when there is none. Lets the
/// actor's `select!` treat the grace window as an optional branch.
async fn grace_timer(deadline: Option<TokioInstant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Spawns a room actor and returns a handle to it.
///
/// The room starts in `Waiting` with its scheduler paused; the first
/// tick fires only after both participants are ready.
pub(crate) fn spawn_room(
    match_id: MatchId,
    players: [PlayerId; 2],
    config: MatchConfig,
    done_tx: mpsc::UnboundedSender<MatchResult>,
    channel_size: usize,
) -> RoomHandle {
    let config = config.validated();
    let (cmd_tx, cmd_rx) = mpsc::channel(channel_size);

    let sim = Simulation::new(&config);
    let (view_tx, view_rx) = watch::channel(StateView {
        state: RoomState::Waiting,
        snapshot: sim.snapshot(),
    });

    let mut scheduler = TickScheduler::new(TickConfig::with_rate(config.tick_rate_hz));
    scheduler.pause();

    let actor = RoomActor {
        match_id,
        players,
        config,
        state: RoomState::Waiting,
        ready: [false, false],
        sim,
        scheduler,
        grace_deadline: None,
        view_tx,
        receiver: cmd_rx,
        done_tx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        match_id,
        players,
        sender: cmd_tx,
        view_rx,
    }
}
